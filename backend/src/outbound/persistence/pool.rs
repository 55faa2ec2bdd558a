//! bb8-backed connection pool for the Diesel PostgreSQL adapter.
//!
//! Both repositories share this one checkout path. Failures are flattened
//! into [`PoolError`] so callers never handle bb8 or diesel-async types
//! directly.

use std::time::Duration;

use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};

/// Checkout timeout applied to every `get`.
const CHECKOUT_TIMEOUT: Duration = Duration::from_secs(30);

/// Failures surfaced by the pool wrapper.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// The pool could not be built at startup.
    #[error("building the connection pool failed: {0}")]
    Startup(String),
    /// No connection could be checked out in time.
    #[error("checking out a database connection failed: {0}")]
    Checkout(String),
}

/// A pooled connection handed to a repository for one logical operation.
pub type DbConnection<'a> = PooledConnection<'a, AsyncPgConnection>;

/// Shared async pool of PostgreSQL connections.
#[derive(Clone)]
pub struct DbPool {
    inner: Pool<AsyncPgConnection>,
}

impl DbPool {
    /// Build a pool of at most `max_size` connections to `database_url`.
    ///
    /// # Errors
    ///
    /// [`PoolError::Startup`] when the pool cannot be constructed.
    pub async fn connect(database_url: &str, max_size: u32) -> Result<Self, PoolError> {
        let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url);
        let inner = Pool::builder()
            .max_size(max_size)
            .connection_timeout(CHECKOUT_TIMEOUT)
            .build(manager)
            .await
            .map_err(|err| PoolError::Startup(err.to_string()))?;
        Ok(Self { inner })
    }

    /// Check out one connection.
    ///
    /// # Errors
    ///
    /// [`PoolError::Checkout`] when nothing is available within the timeout.
    pub async fn get(&self) -> Result<DbConnection<'_>, PoolError> {
        self.inner
            .get()
            .await
            .map_err(|err| PoolError::Checkout(err.to_string()))
    }
}
