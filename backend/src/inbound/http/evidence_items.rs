//! Evidence item API handlers.
//!
//! ```text
//! POST   /api/indicios/agregar/{caseId}                     add item (TECNICO)
//! PATCH  /api/indicios/editar/{caseId}/indicio/{itemId}     update item (TECNICO)
//! DELETE /api/indicios/editar/{caseId}/indicio/{itemId}     delete item (TECNICO)
//! ```
//!
//! Every mutation re-opens the owning case file to `PENDIENTE`.

use actix_web::{HttpResponse, delete, patch, post, web};
use uuid::Uuid;

use crate::domain::{Error, Role, authorize};

use super::ApiResult;
use super::dto::{EvidenceItemDto, EvidenceItemEnvelope, EvidenceItemPayload};
use super::identity::AuthenticatedUser;
use super::state::HttpState;
use super::validation::validation_error;

/// Add an evidence item to a case file.
#[utoipa::path(
    post,
    path = "/api/indicios/agregar/{caseId}",
    params(("caseId" = Uuid, Path, description = "Case file id")),
    request_body = EvidenceItemPayload,
    responses(
        (status = 201, description = "Item added; case file re-opened", body = EvidenceItemEnvelope),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["indicios"],
    operation_id = "addEvidenceItem"
)]
#[post("/agregar/{case_id}")]
pub async fn add_item(
    state: web::Data<HttpState>,
    identity: AuthenticatedUser,
    path: web::Path<Uuid>,
    payload: web::Json<EvidenceItemPayload>,
) -> ApiResult<HttpResponse> {
    let claims = identity.claims();
    authorize(&claims, &[Role::Technician])?;

    let fields = payload.into_inner().into_fields().map_err(validation_error)?;
    let item = state
        .case_files
        .add_item(&claims, path.into_inner(), fields)
        .await?;
    Ok(HttpResponse::Created().json(EvidenceItemEnvelope {
        indicio: EvidenceItemDto::from(&item),
    }))
}

/// Update an evidence item's fields.
#[utoipa::path(
    patch,
    path = "/api/indicios/editar/{caseId}/indicio/{itemId}",
    params(
        ("caseId" = Uuid, Path, description = "Case file id"),
        ("itemId" = Uuid, Path, description = "Evidence item id")
    ),
    request_body = EvidenceItemPayload,
    responses(
        (status = 200, description = "Item updated; case file re-opened", body = EvidenceItemEnvelope),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["indicios"],
    operation_id = "updateEvidenceItem"
)]
#[patch("/editar/{case_id}/indicio/{item_id}")]
pub async fn update_item(
    state: web::Data<HttpState>,
    identity: AuthenticatedUser,
    path: web::Path<(Uuid, Uuid)>,
    payload: web::Json<EvidenceItemPayload>,
) -> ApiResult<HttpResponse> {
    let claims = identity.claims();
    authorize(&claims, &[Role::Technician])?;

    let (case_file_id, item_id) = path.into_inner();
    let fields = payload.into_inner().into_fields().map_err(validation_error)?;
    let item = state
        .case_files
        .update_item(&claims, case_file_id, item_id, fields)
        .await?;
    Ok(HttpResponse::Ok().json(EvidenceItemEnvelope {
        indicio: EvidenceItemDto::from(&item),
    }))
}

/// Delete an evidence item.
///
/// Deleting the last item leaves an empty case file on record.
#[utoipa::path(
    delete,
    path = "/api/indicios/editar/{caseId}/indicio/{itemId}",
    params(
        ("caseId" = Uuid, Path, description = "Case file id"),
        ("itemId" = Uuid, Path, description = "Evidence item id")
    ),
    responses(
        (status = 200, description = "Item deleted; case file re-opened", body = EvidenceItemEnvelope),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["indicios"],
    operation_id = "deleteEvidenceItem"
)]
#[delete("/editar/{case_id}/indicio/{item_id}")]
pub async fn delete_item(
    state: web::Data<HttpState>,
    identity: AuthenticatedUser,
    path: web::Path<(Uuid, Uuid)>,
) -> ApiResult<HttpResponse> {
    let claims = identity.claims();
    authorize(&claims, &[Role::Technician])?;

    let (case_file_id, item_id) = path.into_inner();
    let item = state
        .case_files
        .delete_item(&claims, case_file_id, item_id)
        .await?;
    Ok(HttpResponse::Ok().json(EvidenceItemEnvelope {
        indicio: EvidenceItemDto::from(&item),
    }))
}
