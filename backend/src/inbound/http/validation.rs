//! Shared validation helpers for inbound HTTP adapters.
//!
//! Handlers collect every field-level fault before failing so a response can
//! carry the full list, mirroring what form-driven clients expect.

use chrono::NaiveDate;
use serde_json::json;

use crate::domain::{Error, EvidenceValidationError};

/// Wire date format for report bounds.
const REPORT_DATE_FORMAT: &str = "%Y-%m-%d";

/// One field-level failure destined for the error `details` list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FieldFault {
    field: String,
    code: &'static str,
    message: String,
}

impl FieldFault {
    pub(crate) fn new(
        field: impl Into<String>,
        code: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            code,
            message: message.into(),
        }
    }

    /// Fault for a field absent from the payload.
    pub(crate) fn missing(field: impl Into<String>) -> Self {
        let field = field.into();
        let message = format!("missing required field: {field}");
        Self::new(field, "missing_field", message)
    }

    /// Prefix the field path, e.g. `indicios[2].peso`.
    pub(crate) fn nested_under(mut self, prefix: &str) -> Self {
        self.field = format!("{prefix}.{}", self.field);
        self
    }
}

/// Build the 400 response payload from collected faults.
pub(crate) fn validation_error(faults: Vec<FieldFault>) -> Error {
    let errors: Vec<_> = faults
        .into_iter()
        .map(|fault| {
            json!({
                "field": fault.field,
                "code": fault.code,
                "message": fault.message,
            })
        })
        .collect();
    Error::invalid_request("request validation failed").with_details(json!({ "errors": errors }))
}

/// Convert domain evidence faults into wire faults.
pub(crate) fn evidence_faults(error: &EvidenceValidationError) -> Vec<FieldFault> {
    error
        .faults()
        .iter()
        .map(|fault| FieldFault::new(fault.field(), fault.code(), fault.message()))
        .collect()
}

/// Parse a report bound in `YYYY-MM-DD` form.
pub(crate) fn parse_report_date(field: &str, value: &str) -> Result<NaiveDate, FieldFault> {
    NaiveDate::parse_from_str(value, REPORT_DATE_FORMAT).map_err(|_| {
        FieldFault::new(
            field,
            "invalid_date",
            format!("{field} must be a YYYY-MM-DD date"),
        )
    })
}
