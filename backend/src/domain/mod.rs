//! Domain entities, services, and ports.
//!
//! Everything here is transport and storage agnostic: inbound adapters parse
//! requests into these types, outbound adapters persist them. Invariants are
//! documented on each type and enforced by validated constructors.

pub mod auth;
pub mod case_file;
pub mod error;
pub mod ports;
pub mod user;

mod account_service;
mod case_file_service;

pub use self::account_service::{AccountService, EmptyNameError, Registration};
pub use self::auth::{
    AuthClaims, Credentials, CredentialsValidationError, MIN_PASSWORD_LENGTH, Password,
    PasswordValidationError, authorize,
};
pub use self::case_file::{
    CaseFile, CaseFileDetails, CaseFileIntegrityError, CaseFileQuery, CaseFileScope,
    CaseFileSnapshot, CaseState, CaseStateParseError, DateRange, DateRangeError,
    EvidenceFieldFault, EvidenceItem, EvidenceItemFields, EvidenceValidationError, ReportFilter,
};
pub use self::case_file_service::CaseFileService;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::user::{
    Email, EmailParseError, Role, RoleParseError, TechnicianRef, User, UserRecord,
};
