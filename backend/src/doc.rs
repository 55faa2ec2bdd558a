//! OpenAPI documentation configuration.
//!
//! Defines [`ApiDoc`], the generated specification for the REST API. The
//! document is served through Swagger UI in debug builds.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::dto::{
    CaseFileDto, CaseFileEnvelope, CaseFileListEnvelope, EvidenceItemDto, EvidenceItemEnvelope,
    EvidenceItemPayload, TechnicianDto, TokenResponse, UserDto, UserEnvelope,
};

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "BearerToken",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Token issued by POST /api/auth/login."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "DICRI case file API",
        description = "HTTP interface for forensic case file tracking and review."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerToken" = [])),
    paths(
        crate::inbound::http::auth::register,
        crate::inbound::http::auth::login,
        crate::inbound::http::case_files::create_case_file,
        crate::inbound::http::case_files::list_pending,
        crate::inbound::http::case_files::report,
        crate::inbound::http::case_files::list,
        crate::inbound::http::case_files::approve,
        crate::inbound::http::case_files::reject,
        crate::inbound::http::case_files::get_by_id,
        crate::inbound::http::evidence_items::add_item,
        crate::inbound::http::evidence_items::update_item,
        crate::inbound::http::evidence_items::delete_item,
    ),
    components(schemas(
        Error,
        ErrorCode,
        UserDto,
        UserEnvelope,
        TokenResponse,
        TechnicianDto,
        CaseFileDto,
        CaseFileEnvelope,
        CaseFileListEnvelope,
        EvidenceItemDto,
        EvidenceItemEnvelope,
        EvidenceItemPayload,
    )),
    tags(
        (name = "auth", description = "Registration and login"),
        (name = "expedientes", description = "Case file workflow and reporting"),
        (name = "indicios", description = "Evidence item management")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying endpoint registration in the generated document.
    use super::*;

    #[test]
    fn document_contains_every_endpoint() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        for expected in [
            "/api/auth/register",
            "/api/auth/login",
            "/api/expedientes",
            "/api/expedientes/pendientes",
            "/api/expedientes/reportes",
            "/api/expedientes/{id}/aprobar",
            "/api/expedientes/{id}/rechazar",
            "/api/expedientes/{id}",
            "/api/indicios/agregar/{caseId}",
            "/api/indicios/editar/{caseId}/indicio/{itemId}",
        ] {
            assert!(paths.contains_key(expected), "missing path: {expected}");
        }
    }
}
