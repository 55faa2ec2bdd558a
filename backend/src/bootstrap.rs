//! Best-effort database bootstrap.
//!
//! Container orchestration tends to start the API before PostgreSQL accepts
//! connections, so startup retries for a bounded window before giving up.
//! This is the only retry loop in the crate; request handling never retries.

use std::time::Duration;

use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{info, warn};

/// Migrations compiled into the binary from `backend/migrations/`.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

const MAX_ATTEMPTS: u32 = 15;
const RETRY_DELAY: Duration = Duration::from_secs(2);

/// Errors raised while preparing the database.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    /// The database never became reachable within the retry window.
    #[error("database unreachable after {attempts} attempts: {message}")]
    Unreachable {
        /// Attempts made before giving up.
        attempts: u32,
        /// Last connection failure.
        message: String,
    },
    /// Migrations failed to apply.
    #[error("running migrations failed: {message}")]
    Migration {
        /// Underlying failure description.
        message: String,
    },
    /// The blocking task running migrations was cancelled.
    #[error("bootstrap task failed: {message}")]
    Task {
        /// Underlying failure description.
        message: String,
    },
}

/// One connect-and-migrate attempt, run on a blocking thread.
fn connect_and_migrate(database_url: &str) -> Result<(), BootstrapError> {
    let mut conn = PgConnection::establish(database_url).map_err(|err| {
        BootstrapError::Unreachable {
            attempts: 1,
            message: err.to_string(),
        }
    })?;
    conn.run_pending_migrations(MIGRATIONS)
        .map(|applied| {
            if !applied.is_empty() {
                info!(count = applied.len(), "applied pending migrations");
            }
        })
        .map_err(|err| BootstrapError::Migration {
            message: err.to_string(),
        })
}

/// Wait for the database and apply pending migrations.
///
/// Retries connection failures up to 15 times, two seconds apart; migration
/// failures abort immediately.
pub async fn prepare_database(database_url: &str) -> Result<(), BootstrapError> {
    let mut last_message = String::new();
    for attempt in 1..=MAX_ATTEMPTS {
        let url = database_url.to_owned();
        let outcome = tokio::task::spawn_blocking(move || connect_and_migrate(&url))
            .await
            .map_err(|err| BootstrapError::Task {
                message: err.to_string(),
            })?;

        match outcome {
            Ok(()) => {
                info!(attempt, "database ready");
                return Ok(());
            }
            Err(BootstrapError::Unreachable { message, .. }) => {
                warn!(
                    attempt,
                    max_attempts = MAX_ATTEMPTS,
                    error = %message,
                    "database not ready yet"
                );
                last_message = message;
                tokio::time::sleep(RETRY_DELAY).await;
            }
            Err(err) => return Err(err),
        }
    }

    Err(BootstrapError::Unreachable {
        attempts: MAX_ATTEMPTS,
        message: last_message,
    })
}
