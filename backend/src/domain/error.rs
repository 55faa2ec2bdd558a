//! Domain-level error type.
//!
//! These errors are transport agnostic. The HTTP adapter maps them to status
//! codes and a JSON envelope; nothing in this module knows about actix.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Stable machine-readable code naming the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The input is malformed or failed validation.
    InvalidRequest,
    /// Credentials or token are missing, wrong, or expired.
    Unauthorized,
    /// Authenticated, but the role does not permit this action.
    Forbidden,
    /// No record exists under the given identifier.
    NotFound,
    /// A unique field collides with an existing record.
    Conflict,
    /// The backing store could not be reached.
    ServiceUnavailable,
    /// Something unexpected failed inside the service.
    InternalError,
}

/// Domain error payload.
///
/// The human-readable text is serialised under the `error` key so clients can
/// render it directly.
///
/// ## Invariants
/// - `message` must be non-empty once trimmed of whitespace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "ErrorBody", into = "ErrorBody")]
pub struct Error {
    #[schema(example = "invalid_request")]
    code: ErrorCode,
    #[schema(example = "Something went wrong")]
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

/// Validation errors emitted by the constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorValidationError {
    /// The message was blank.
    EmptyMessage,
}

impl std::fmt::Display for ErrorValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyMessage => write!(f, "error message must not be empty"),
        }
    }
}

impl std::error::Error for ErrorValidationError {}

impl Error {
    /// Build an error from a code and message, panicking on a blank message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        match Self::try_new(code, message) {
            Ok(value) => value,
            Err(err) => panic!("error messages must satisfy validation: {err}"),
        }
    }

    /// Fallible constructor enforcing the non-blank message invariant.
    pub fn try_new(
        code: ErrorCode,
        message: impl Into<String>,
    ) -> Result<Self, ErrorValidationError> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(ErrorValidationError::EmptyMessage);
        }
        Ok(Self {
            code,
            message,
            details: None,
        })
    }

    /// The failure category.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Text shown to the caller under the `error` key.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Structured detail payload, if any was attached.
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Attach a structured detail payload (e.g. per-field faults).
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Convenience constructor for [`ErrorCode::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Convenience constructor for [`ErrorCode::Unauthorized`].
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    /// Convenience constructor for [`ErrorCode::Forbidden`].
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    /// Convenience constructor for [`ErrorCode::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Convenience constructor for [`ErrorCode::Conflict`].
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    /// Convenience constructor for [`ErrorCode::ServiceUnavailable`].
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    /// Convenience constructor for [`ErrorCode::InternalError`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
struct ErrorBody {
    code: ErrorCode,
    #[serde(rename = "error")]
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl From<Error> for ErrorBody {
    fn from(value: Error) -> Self {
        Self {
            code: value.code,
            message: value.message,
            details: value.details,
        }
    }
}

impl TryFrom<ErrorBody> for Error {
    type Error = ErrorValidationError;

    fn try_from(value: ErrorBody) -> Result<Self, Self::Error> {
        let ErrorBody {
            code,
            message,
            details,
        } = value;

        let mut error = Error::try_new(code, message)?;
        error.details = details;
        Ok(error)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use rstest::rstest;
    use serde_json::{Value, json};

    use super::*;

    #[rstest]
    fn blank_messages_are_rejected() {
        let err = Error::try_new(ErrorCode::NotFound, "   ").expect_err("blank must fail");
        assert_eq!(err, ErrorValidationError::EmptyMessage);
    }

    #[rstest]
    fn serialises_message_under_error_key() {
        let err = Error::not_found("case file not found");
        let value = serde_json::to_value(&err).expect("serialise error");
        assert_eq!(
            value.get("error").and_then(Value::as_str),
            Some("case file not found")
        );
        assert_eq!(value.get("code").and_then(Value::as_str), Some("not_found"));
        assert!(value.get("details").is_none());
    }

    #[rstest]
    fn details_round_trip() {
        let err = Error::invalid_request("bad input").with_details(json!({ "field": "email" }));
        let value = serde_json::to_value(&err).expect("serialise error");
        let back: Error = serde_json::from_value(value).expect("deserialise error");
        assert_eq!(back, err);
    }

    #[rstest]
    #[case(Error::invalid_request("x"), ErrorCode::InvalidRequest)]
    #[case(Error::unauthorized("x"), ErrorCode::Unauthorized)]
    #[case(Error::forbidden("x"), ErrorCode::Forbidden)]
    #[case(Error::not_found("x"), ErrorCode::NotFound)]
    #[case(Error::conflict("x"), ErrorCode::Conflict)]
    #[case(Error::service_unavailable("x"), ErrorCode::ServiceUnavailable)]
    #[case(Error::internal("x"), ErrorCode::InternalError)]
    fn convenience_constructors_set_codes(#[case] err: Error, #[case] code: ErrorCode) {
        assert_eq!(err.code(), code);
    }
}
