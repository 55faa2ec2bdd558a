//! Classification of pool and Diesel failures for the repositories.
//!
//! Each repository reports errors through its own port enum; this module
//! reduces infrastructure failures to the shared [`StoreFault`] categories
//! first so both repositories classify identically.

use tracing::debug;

use super::pool::PoolError;

/// Store-level fault category, mapped into each port's error enum.
#[derive(Debug)]
pub(crate) enum StoreFault {
    /// The database could not be reached or the connection died.
    Connection(&'static str),
    /// The statement itself failed.
    Query(&'static str),
}

impl StoreFault {
    /// Classify a checked-out-connection failure.
    pub(crate) fn from_pool(error: &PoolError) -> Self {
        debug!(error = %error, "connection checkout failed");
        Self::Connection("database connection error")
    }

    /// Classify a failed Diesel statement.
    ///
    /// Row absence is handled with `.optional()` at the call sites, so a
    /// stray `NotFound` here still counts as a query fault rather than a
    /// domain absence.
    pub(crate) fn from_diesel(error: &diesel::result::Error) -> Self {
        use diesel::result::{DatabaseErrorKind, Error as DieselError};

        match error {
            DieselError::DatabaseError(kind, info) => {
                debug!(?kind, message = info.message(), "diesel operation failed");
                if matches!(kind, DatabaseErrorKind::ClosedConnection) {
                    return Self::Connection("database connection error");
                }
                Self::Query("database error")
            }
            DieselError::NotFound => Self::Query("record not found"),
            other => {
                debug!(error = %other, "diesel operation failed");
                Self::Query("database error")
            }
        }
    }
}

/// Whether the error is a unique constraint violation.
pub(crate) fn is_unique_violation(error: &diesel::result::Error) -> bool {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    matches!(
        error,
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)
    )
}
