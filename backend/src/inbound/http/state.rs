//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain services and ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::TokenCodec;
use crate::domain::{AccountService, CaseFileService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Registration and login use-cases.
    pub accounts: AccountService,
    /// Case file lifecycle use-cases.
    pub case_files: CaseFileService,
    /// Token codec used by the bearer extractor.
    pub tokens: Arc<dyn TokenCodec>,
}

impl HttpState {
    /// Bundle the services and the token codec.
    pub fn new(
        accounts: AccountService,
        case_files: CaseFileService,
        tokens: Arc<dyn TokenCodec>,
    ) -> Self {
        Self {
            accounts,
            case_files,
            tokens,
        }
    }
}
