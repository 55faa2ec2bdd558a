//! HTTP inbound adapter exposing REST endpoints.

pub mod auth;
pub mod case_files;
pub mod dto;
pub mod error;
pub mod evidence_items;
pub mod identity;
pub mod state;
pub mod validation;

use actix_web::{Scope, web};

pub use error::ApiResult;

/// The full `/api` routing tree.
///
/// Registration order matters within `/expedientes`: the literal
/// `/pendientes` and `/reportes` segments must match before `/{id}`.
pub fn routes() -> Scope {
    web::scope("/api")
        .service(
            web::scope("/auth")
                .service(auth::register)
                .service(auth::login),
        )
        .service(
            web::scope("/expedientes")
                .service(case_files::create_case_file)
                .service(case_files::list_pending)
                .service(case_files::report)
                .service(case_files::list)
                .service(case_files::approve)
                .service(case_files::reject)
                .service(case_files::get_by_id),
        )
        .service(
            web::scope("/indicios")
                .service(evidence_items::add_item)
                .service(evidence_items::update_item)
                .service(evidence_items::delete_item),
        )
}
