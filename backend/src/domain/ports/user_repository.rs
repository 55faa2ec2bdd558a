//! Port abstraction for user persistence adapters and their errors.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Email, User};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Another account already uses this email.
        DuplicateEmail => "email is already registered",
    }
}

/// Port for writing and reading user accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a newly registered user.
    ///
    /// Fails with [`UserPersistenceError::DuplicateEmail`] when the unique
    /// email constraint is violated.
    async fn create(&self, user: &User) -> Result<(), UserPersistenceError>;

    /// Fetch a user by login email.
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, UserPersistenceError>;
}

/// Fixture implementation for tests that do not exercise user persistence.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureUserRepository;

#[async_trait]
impl UserRepository for FixtureUserRepository {
    async fn create(&self, _user: &User) -> Result<(), UserPersistenceError> {
        Ok(())
    }

    async fn find_by_email(&self, _email: &Email) -> Result<Option<User>, UserPersistenceError> {
        Ok(None)
    }

    async fn find_by_id(&self, _id: Uuid) -> Result<Option<User>, UserPersistenceError> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[tokio::test]
    async fn fixture_lookups_return_none() {
        let repo = FixtureUserRepository;
        let email = Email::new("missing@example.com").expect("valid email");
        assert!(
            repo.find_by_email(&email)
                .await
                .expect("fixture lookup succeeds")
                .is_none()
        );
        assert!(
            repo.find_by_id(Uuid::new_v4())
                .await
                .expect("fixture lookup succeeds")
                .is_none()
        );
    }
}
