//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{case_files, evidence_items, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub name: &'a str,
    pub password_hash: &'a str,
    pub role: &'a str,
    pub created_at: DateTime<Utc>,
}

/// Row struct for reading from the case_files table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = case_files)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CaseFileRow {
    pub id: Uuid,
    pub technician_id: Uuid,
    pub state: String,
    pub justification: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating new case file records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = case_files)]
pub(crate) struct NewCaseFileRow<'a> {
    pub id: Uuid,
    pub technician_id: Uuid,
    pub state: &'a str,
    pub justification: Option<&'a str>,
    pub created_at: DateTime<Utc>,
}

/// Changeset struct for overwriting a case file's review outcome.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = case_files)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct CaseFileReviewUpdate<'a> {
    pub state: &'a str,
    pub justification: Option<&'a str>,
}

/// Row struct for reading from the evidence_items table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = evidence_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct EvidenceItemRow {
    pub id: Uuid,
    pub case_file_id: Uuid,
    pub description: String,
    pub color: String,
    pub size: String,
    pub weight: f64,
    pub location: String,
}

/// Insertable struct for creating new evidence item records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = evidence_items)]
pub(crate) struct NewEvidenceItemRow<'a> {
    pub id: Uuid,
    pub case_file_id: Uuid,
    pub description: &'a str,
    pub color: &'a str,
    pub size: &'a str,
    pub weight: f64,
    pub location: &'a str,
}

/// Changeset struct for updating an evidence item's descriptive fields.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = evidence_items)]
pub(crate) struct EvidenceItemUpdate<'a> {
    pub description: &'a str,
    pub color: &'a str,
    pub size: &'a str,
    pub weight: f64,
    pub location: &'a str,
}
