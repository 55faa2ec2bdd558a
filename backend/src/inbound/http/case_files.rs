//! Case file API handlers.
//!
//! ```text
//! POST  /api/expedientes                  create with initial items (TECNICO)
//! GET   /api/expedientes/pendientes       pending queue (COORDINADOR)
//! GET   /api/expedientes/reportes         filtered report (authenticated)
//! GET   /api/expedientes                  role-scoped listing
//! PATCH /api/expedientes/{id}/aprobar     approve (COORDINADOR)
//! PATCH /api/expedientes/{id}/rechazar    reject with justification (COORDINADOR)
//! GET   /api/expedientes/{id}             detail read (authenticated)
//! ```

use actix_web::{HttpResponse, get, patch, post, web};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{CaseState, DateRange, Error, EvidenceItemFields, ReportFilter, Role, authorize};

use super::ApiResult;
use super::dto::{CaseFileDto, CaseFileEnvelope, CaseFileListEnvelope, EvidenceItemPayload};
use super::identity::AuthenticatedUser;
use super::state::HttpState;
use super::validation::{FieldFault, validation_error};

/// Creation request: the initial evidence items.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CreateCaseFileRequest {
    /// Evidence items to open the case file with; at least one is required.
    #[serde(default)]
    pub indicios: Option<Vec<EvidenceItemPayload>>,
}

/// Rejection request body.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct RejectRequest {
    /// Reason for the rejection; must not be blank.
    #[serde(default)]
    pub justificacion: Option<String>,
}

/// Report query parameters.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportQuery {
    /// Optional state filter: `PENDIENTE`, `APROBADO`, or `RECHAZADO`.
    #[serde(default)]
    pub estado: Option<String>,
    /// Range start as a `YYYY-MM-DD` date.
    #[serde(default)]
    pub fecha_inicio: Option<String>,
    /// Range end as a `YYYY-MM-DD` date, included through end of day.
    #[serde(default)]
    pub fecha_fin: Option<String>,
}

/// Validate every submitted item, prefixing faults with the list index.
fn parse_item_list(items: Vec<EvidenceItemPayload>) -> Result<Vec<EvidenceItemFields>, Error> {
    let mut faults = Vec::new();
    let mut parsed = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match item.into_fields() {
            Ok(fields) => parsed.push(fields),
            Err(item_faults) => {
                let prefix = format!("indicios[{index}]");
                faults.extend(
                    item_faults
                        .into_iter()
                        .map(|fault| fault.nested_under(&prefix)),
                );
            }
        }
    }
    if faults.is_empty() {
        Ok(parsed)
    } else {
        Err(validation_error(faults))
    }
}

/// Resolve the report filters, requiring both bounds for a date window.
///
/// A lone bound is ignored, matching the behaviour clients already rely on.
fn parse_report_filter(query: ReportQuery) -> Result<ReportFilter, Error> {
    let ReportQuery {
        estado,
        fecha_inicio,
        fecha_fin,
    } = query;
    let mut faults = Vec::new();

    let state = match estado.as_deref() {
        None => None,
        Some(raw) => match raw.parse::<CaseState>() {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                faults.push(FieldFault::new(
                    "estado",
                    "invalid_state",
                    "estado must be PENDIENTE, APROBADO, or RECHAZADO",
                ));
                None
            }
        },
    };

    let range = match (fecha_inicio.as_deref(), fecha_fin.as_deref()) {
        (Some(from_raw), Some(to_raw)) => {
            let from = super::validation::parse_report_date("fechaInicio", from_raw);
            let to = super::validation::parse_report_date("fechaFin", to_raw);
            match (from, to) {
                (Ok(from), Ok(to)) => match DateRange::new(from, to) {
                    Ok(range) => Some(range),
                    Err(_) => {
                        faults.push(FieldFault::new(
                            "fechaFin",
                            "invalid_date",
                            "fechaFin is out of range",
                        ));
                        None
                    }
                },
                (from, to) => {
                    faults.extend(from.err());
                    faults.extend(to.err());
                    None
                }
            }
        }
        _ => None,
    };

    if faults.is_empty() {
        Ok(ReportFilter { state, range })
    } else {
        Err(validation_error(faults))
    }
}

/// Create a case file with its initial evidence items.
#[utoipa::path(
    post,
    path = "/api/expedientes",
    request_body = CreateCaseFileRequest,
    responses(
        (status = 201, description = "Case file created", body = CaseFileEnvelope),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["expedientes"],
    operation_id = "createCaseFile"
)]
#[post("")]
pub async fn create_case_file(
    state: web::Data<HttpState>,
    identity: AuthenticatedUser,
    payload: web::Json<CreateCaseFileRequest>,
) -> ApiResult<HttpResponse> {
    let claims = identity.claims();
    authorize(&claims, &[Role::Technician])?;

    let items = parse_item_list(payload.into_inner().indicios.unwrap_or_default())?;
    let details = state.case_files.create(claims.user_id, items).await?;
    Ok(HttpResponse::Created().json(CaseFileEnvelope {
        expediente: CaseFileDto::from_details(details),
    }))
}

/// List every pending case file.
#[utoipa::path(
    get,
    path = "/api/expedientes/pendientes",
    responses(
        (status = 200, description = "Pending case files", body = CaseFileListEnvelope),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["expedientes"],
    operation_id = "listPendingCaseFiles"
)]
#[get("/pendientes")]
pub async fn list_pending(
    state: web::Data<HttpState>,
    identity: AuthenticatedUser,
) -> ApiResult<HttpResponse> {
    authorize(&identity.claims(), &[Role::Coordinator])?;

    let details = state.case_files.pending().await?;
    Ok(HttpResponse::Ok().json(CaseFileListEnvelope {
        expedientes: details.into_iter().map(CaseFileDto::from_details).collect(),
    }))
}

/// Report case files filtered by state and creation window.
#[utoipa::path(
    get,
    path = "/api/expedientes/reportes",
    params(
        ("estado" = Option<String>, Query, description = "State filter"),
        ("fechaInicio" = Option<String>, Query, description = "Range start, YYYY-MM-DD"),
        ("fechaFin" = Option<String>, Query, description = "Range end, YYYY-MM-DD, inclusive")
    ),
    responses(
        (status = 200, description = "Matching case files", body = CaseFileListEnvelope),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["expedientes"],
    operation_id = "reportCaseFiles"
)]
#[get("/reportes")]
pub async fn report(
    state: web::Data<HttpState>,
    identity: AuthenticatedUser,
    query: web::Query<ReportQuery>,
) -> ApiResult<HttpResponse> {
    let claims = identity.claims();
    let filter = parse_report_filter(query.into_inner())?;
    let details = state.case_files.report(&claims, filter).await?;
    Ok(HttpResponse::Ok().json(CaseFileListEnvelope {
        expedientes: details.into_iter().map(CaseFileDto::from_details).collect(),
    }))
}

/// List case files visible to the caller.
#[utoipa::path(
    get,
    path = "/api/expedientes",
    responses(
        (status = 200, description = "Visible case files", body = CaseFileListEnvelope),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["expedientes"],
    operation_id = "listCaseFiles"
)]
#[get("")]
pub async fn list(
    state: web::Data<HttpState>,
    identity: AuthenticatedUser,
) -> ApiResult<HttpResponse> {
    let claims = identity.claims();
    authorize(&claims, &[Role::Technician, Role::Coordinator])?;

    let details = state.case_files.list_for(&claims).await?;
    Ok(HttpResponse::Ok().json(CaseFileListEnvelope {
        expedientes: details.into_iter().map(CaseFileDto::from_details).collect(),
    }))
}

/// Approve a case file; approving twice is a no-op success.
#[utoipa::path(
    patch,
    path = "/api/expedientes/{id}/aprobar",
    params(("id" = Uuid, Path, description = "Case file id")),
    responses(
        (status = 200, description = "Case file approved", body = CaseFileEnvelope),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["expedientes"],
    operation_id = "approveCaseFile"
)]
#[patch("/{id}/aprobar")]
pub async fn approve(
    state: web::Data<HttpState>,
    identity: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    authorize(&identity.claims(), &[Role::Coordinator])?;

    let case_file = state.case_files.approve(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(CaseFileEnvelope {
        expediente: CaseFileDto::from_case(&case_file),
    }))
}

/// Reject a case file with a justification.
#[utoipa::path(
    patch,
    path = "/api/expedientes/{id}/rechazar",
    params(("id" = Uuid, Path, description = "Case file id")),
    request_body = RejectRequest,
    responses(
        (status = 200, description = "Case file rejected", body = CaseFileEnvelope),
        (status = 400, description = "Missing justification", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["expedientes"],
    operation_id = "rejectCaseFile"
)]
#[patch("/{id}/rechazar")]
pub async fn reject(
    state: web::Data<HttpState>,
    identity: AuthenticatedUser,
    path: web::Path<Uuid>,
    payload: web::Json<RejectRequest>,
) -> ApiResult<HttpResponse> {
    authorize(&identity.claims(), &[Role::Coordinator])?;

    let justification = payload.into_inner().justificacion.unwrap_or_default();
    let case_file = state
        .case_files
        .reject(path.into_inner(), &justification)
        .await?;
    Ok(HttpResponse::Ok().json(CaseFileEnvelope {
        expediente: CaseFileDto::from_case(&case_file),
    }))
}

/// Fetch one case file with items and technician identity.
#[utoipa::path(
    get,
    path = "/api/expedientes/{id}",
    params(("id" = Uuid, Path, description = "Case file id")),
    responses(
        (status = 200, description = "Case file", body = CaseFileEnvelope),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["expedientes"],
    operation_id = "getCaseFile"
)]
#[get("/{id}")]
pub async fn get_by_id(
    state: web::Data<HttpState>,
    _identity: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let details = state.case_files.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(CaseFileEnvelope {
        expediente: CaseFileDto::from_details(details),
    }))
}
