//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are used
//! by Diesel for compile-time query validation and type-safe SQL generation.

diesel::table! {
    /// User accounts table.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Unique login email.
        email -> Varchar,
        /// Display name.
        name -> Varchar,
        /// Salted one-way password hash.
        password_hash -> Varchar,
        /// Account role, one of the closed wire values.
        role -> Varchar,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Case files table.
    case_files (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Owning technician, references `users.id`.
        technician_id -> Uuid,
        /// Review state, one of the closed wire values.
        state -> Varchar,
        /// Rejection justification; null unless rejected.
        justification -> Nullable<Text>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Evidence items table, cascade-deleted with the owning case file.
    evidence_items (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Owning case file, references `case_files.id`.
        case_file_id -> Uuid,
        /// What the item is.
        description -> Text,
        /// Observed colour.
        color -> Varchar,
        /// Observed size.
        size -> Varchar,
        /// Weight in kilograms, non-negative.
        weight -> Float8,
        /// Where the item was found or is stored.
        location -> Varchar,
    }
}

diesel::joinable!(case_files -> users (technician_id));
diesel::joinable!(evidence_items -> case_files (case_file_id));

diesel::allow_tables_to_appear_in_same_query!(users, case_files, evidence_items);
