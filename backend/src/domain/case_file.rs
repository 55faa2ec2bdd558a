//! Case files, evidence items, and the approval state machine.
//!
//! A case file moves `PENDIENTE -> APROBADO | RECHAZADO` under coordinator
//! review, and any evidence mutation re-opens it to `PENDIENTE`. The
//! transition methods own the one structural invariant: a justification is
//! present exactly when the case file is rejected.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::user::TechnicianRef;

/// Closed set of case file review states.
///
/// The wire representation keeps the legacy uppercase Spanish values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum CaseState {
    /// Awaiting coordinator review.
    #[serde(rename = "PENDIENTE")]
    Pending,
    /// Approved by a coordinator.
    #[serde(rename = "APROBADO")]
    Approved,
    /// Rejected by a coordinator, with a justification on record.
    #[serde(rename = "RECHAZADO")]
    Rejected,
}

impl CaseState {
    /// Wire form of the state.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDIENTE",
            Self::Approved => "APROBADO",
            Self::Rejected => "RECHAZADO",
        }
    }
}

impl fmt::Display for CaseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a state string is outside the closed set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown case state: {value}")]
pub struct CaseStateParseError {
    /// The rejected input.
    pub value: String,
}

impl FromStr for CaseState {
    type Err = CaseStateParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDIENTE" => Ok(Self::Pending),
            "APROBADO" => Ok(Self::Approved),
            "RECHAZADO" => Ok(Self::Rejected),
            other => Err(CaseStateParseError {
                value: other.to_owned(),
            }),
        }
    }
}

/// One field-level failure found while validating evidence item input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvidenceFieldFault {
    /// `descripcion` was missing or blank.
    EmptyDescription,
    /// `color` was missing or blank.
    EmptyColor,
    /// `tamano` was missing or blank.
    EmptySize,
    /// `ubicacion` was missing or blank.
    EmptyLocation,
    /// `peso` was below zero.
    NegativeWeight,
    /// `peso` was NaN or infinite.
    NonFiniteWeight,
}

impl EvidenceFieldFault {
    /// Wire name of the offending field.
    pub fn field(self) -> &'static str {
        match self {
            Self::EmptyDescription => "descripcion",
            Self::EmptyColor => "color",
            Self::EmptySize => "tamano",
            Self::EmptyLocation => "ubicacion",
            Self::NegativeWeight | Self::NonFiniteWeight => "peso",
        }
    }

    /// Stable fault code for structured error details.
    pub fn code(self) -> &'static str {
        match self {
            Self::EmptyDescription | Self::EmptyColor | Self::EmptySize | Self::EmptyLocation => {
                "empty_field"
            }
            Self::NegativeWeight => "negative_weight",
            Self::NonFiniteWeight => "non_finite_weight",
        }
    }

    /// Human-readable description of the fault.
    pub fn message(self) -> String {
        match self {
            Self::NegativeWeight => "peso must be zero or greater".to_owned(),
            Self::NonFiniteWeight => "peso must be a finite number".to_owned(),
            fault => format!("{} must not be empty", fault.field()),
        }
    }
}

/// All field-level failures for one evidence item payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvidenceValidationError {
    faults: Vec<EvidenceFieldFault>,
}

impl EvidenceValidationError {
    /// The collected faults, in field order.
    pub fn faults(&self) -> &[EvidenceFieldFault] {
        &self.faults
    }
}

impl fmt::Display for EvidenceValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for fault in &self.faults {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}", fault.message())?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for EvidenceValidationError {}

/// Validated descriptive fields of an evidence item.
///
/// ## Invariants
/// - all text fields are trimmed and non-empty
/// - `weight` is finite and non-negative
#[derive(Debug, Clone, PartialEq)]
pub struct EvidenceItemFields {
    description: String,
    color: String,
    size: String,
    weight: f64,
    location: String,
}

impl EvidenceItemFields {
    /// Validate raw field values, collecting every fault before failing.
    pub fn new(
        description: &str,
        color: &str,
        size: &str,
        weight: f64,
        location: &str,
    ) -> Result<Self, EvidenceValidationError> {
        let mut faults = Vec::new();
        if description.trim().is_empty() {
            faults.push(EvidenceFieldFault::EmptyDescription);
        }
        if color.trim().is_empty() {
            faults.push(EvidenceFieldFault::EmptyColor);
        }
        if size.trim().is_empty() {
            faults.push(EvidenceFieldFault::EmptySize);
        }
        if !weight.is_finite() {
            faults.push(EvidenceFieldFault::NonFiniteWeight);
        } else if weight < 0.0 {
            faults.push(EvidenceFieldFault::NegativeWeight);
        }
        if location.trim().is_empty() {
            faults.push(EvidenceFieldFault::EmptyLocation);
        }
        if !faults.is_empty() {
            return Err(EvidenceValidationError { faults });
        }
        Ok(Self {
            description: description.trim().to_owned(),
            color: color.trim().to_owned(),
            size: size.trim().to_owned(),
            weight,
            location: location.trim().to_owned(),
        })
    }

    /// What the item is.
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Observed colour.
    pub fn color(&self) -> &str {
        self.color.as_str()
    }

    /// Observed size.
    pub fn size(&self) -> &str {
        self.size.as_str()
    }

    /// Weight in kilograms, non-negative.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Where the item was found or is stored.
    pub fn location(&self) -> &str {
        self.location.as_str()
    }
}

/// One physical item of evidence attached to a case file.
#[derive(Debug, Clone, PartialEq)]
pub struct EvidenceItem {
    id: Uuid,
    case_file_id: Uuid,
    fields: EvidenceItemFields,
}

impl EvidenceItem {
    /// Create a new item with a generated id.
    pub fn new(case_file_id: Uuid, fields: EvidenceItemFields) -> Self {
        Self {
            id: Uuid::new_v4(),
            case_file_id,
            fields,
        }
    }

    /// Restore an item from persisted values.
    pub fn restore(id: Uuid, case_file_id: Uuid, fields: EvidenceItemFields) -> Self {
        Self {
            id,
            case_file_id,
            fields,
        }
    }

    /// Stable identifier.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Owning case file.
    pub fn case_file_id(&self) -> Uuid {
        self.case_file_id
    }

    /// Descriptive fields.
    pub fn fields(&self) -> &EvidenceItemFields {
        &self.fields
    }
}

/// Snapshot of a case file as persisted.
#[derive(Debug, Clone)]
pub struct CaseFileSnapshot {
    /// Stable identifier.
    pub id: Uuid,
    /// Owning technician.
    pub technician_id: Uuid,
    /// Review state.
    pub state: CaseState,
    /// Rejection justification, present only for rejected case files.
    pub justification: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Error returned when a persisted case file violates the justification
/// invariant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("case file {id} violates the justification invariant in state {state}")]
pub struct CaseFileIntegrityError {
    /// Offending case file id.
    pub id: Uuid,
    /// State found on the record.
    pub state: CaseState,
    /// Whether a justification was present.
    pub has_justification: bool,
}

/// The top-level record tracking evidence through the approval workflow.
///
/// State and justification are private so every mutation goes through the
/// transition methods, which keep the pair consistent.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseFile {
    id: Uuid,
    technician_id: Uuid,
    state: CaseState,
    justification: Option<String>,
    created_at: DateTime<Utc>,
}

impl CaseFile {
    /// Open a new pending case file for a technician.
    pub fn open(technician_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            technician_id,
            state: CaseState::Pending,
            justification: None,
            created_at: Utc::now(),
        }
    }

    /// Restore a case file from persisted values, checking the invariant.
    pub fn restore(snapshot: CaseFileSnapshot) -> Result<Self, CaseFileIntegrityError> {
        let CaseFileSnapshot {
            id,
            technician_id,
            state,
            justification,
            created_at,
        } = snapshot;
        let expected = matches!(state, CaseState::Rejected);
        if justification.is_some() != expected {
            return Err(CaseFileIntegrityError {
                id,
                state,
                has_justification: justification.is_some(),
            });
        }
        Ok(Self {
            id,
            technician_id,
            state,
            justification,
            created_at,
        })
    }

    /// Approve the case file. Idempotent; clears any prior justification.
    pub fn approve(&mut self) {
        self.state = CaseState::Approved;
        self.justification = None;
    }

    /// Reject the case file with the given justification.
    pub fn reject(&mut self, justification: String) {
        self.state = CaseState::Rejected;
        self.justification = Some(justification);
    }

    /// Re-open the case file after an evidence mutation.
    pub fn reopen(&mut self) {
        self.state = CaseState::Pending;
        self.justification = None;
    }

    /// Stable identifier.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Owning technician.
    pub fn technician_id(&self) -> Uuid {
        self.technician_id
    }

    /// Review state.
    pub fn state(&self) -> CaseState {
        self.state
    }

    /// Rejection justification, present only for rejected case files.
    pub fn justification(&self) -> Option<&str> {
        self.justification.as_deref()
    }

    /// Creation timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// A case file together with its items and the technician's identity.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseFileDetails {
    /// The case file record.
    pub case_file: CaseFile,
    /// Minimal identity of the owning technician, when the read joins it.
    pub technician: Option<TechnicianRef>,
    /// Evidence items attached to the case file.
    pub items: Vec<EvidenceItem>,
}

/// Visibility scope applied to case file listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseFileScope {
    /// Coordinator view: every case file.
    All,
    /// Technician view: only case files owned by this user.
    OwnedBy(Uuid),
}

/// Error returned for unusable report date bounds.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DateRangeError {
    /// Adding a day to the end date left the calendar.
    #[error("date range end is out of range")]
    OutOfRange,
}

/// Half-open creation window `[start, end)` derived from report dates.
///
/// Both bounds arrive as calendar dates; the window covers the start date
/// from midnight UTC through the whole of the end date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: DateTime<Utc>,
    end_exclusive: DateTime<Utc>,
}

impl DateRange {
    /// Build the window from inclusive calendar dates.
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self, DateRangeError> {
        let day_after = to
            .checked_add_days(Days::new(1))
            .ok_or(DateRangeError::OutOfRange)?;
        Ok(Self {
            start: from.and_time(NaiveTime::MIN).and_utc(),
            end_exclusive: day_after.and_time(NaiveTime::MIN).and_utc(),
        })
    }

    /// Inclusive lower bound.
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Exclusive upper bound.
    pub fn end_exclusive(&self) -> DateTime<Utc> {
        self.end_exclusive
    }

    /// Whether the timestamp falls inside the window.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at < self.end_exclusive
    }
}

/// Caller-supplied report filters, before role scoping is applied.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ReportFilter {
    /// Optional state filter.
    pub state: Option<CaseState>,
    /// Optional creation window.
    pub range: Option<DateRange>,
}

/// Filter and scope for case file listings and reports.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaseFileQuery {
    /// Role-derived visibility scope.
    pub scope: CaseFileScope,
    /// Optional state filter.
    pub state: Option<CaseState>,
    /// Optional creation window.
    pub range: Option<DateRange>,
}

impl CaseFileQuery {
    /// Unfiltered listing for the given scope.
    pub fn scoped(scope: CaseFileScope) -> Self {
        Self {
            scope,
            state: None,
            range: None,
        }
    }

    /// Whether a case file matches the state and range filters and scope.
    pub fn matches(&self, case_file: &CaseFile) -> bool {
        if let CaseFileScope::OwnedBy(owner) = self.scope
            && case_file.technician_id() != owner
        {
            return false;
        }
        if let Some(state) = self.state
            && case_file.state() != state
        {
            return false;
        }
        if let Some(range) = self.range
            && !range.contains(case_file.created_at())
        {
            return false;
        }
        true
    }
}
