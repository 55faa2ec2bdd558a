//! Account registration and login use-cases.

use std::sync::Arc;

use crate::domain::ports::{
    PasswordHashError, PasswordHasher, TokenCodec, TokenCodecError, UserPersistenceError,
    UserRepository,
};
use crate::domain::{AuthClaims, Credentials, Email, Error, Password, Role, User};

/// Validated registration input.
#[derive(Debug, Clone)]
pub struct Registration {
    /// Unique login email.
    pub email: Email,
    /// Display name, non-empty once trimmed.
    pub name: String,
    /// Plaintext password, length-checked.
    pub password: Password,
    /// Requested role.
    pub role: Role,
}

/// Error returned when the registration name is blank.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("name must not be empty")]
pub struct EmptyNameError;

impl Registration {
    /// Assemble a registration, validating the display name.
    pub fn new(
        email: Email,
        name: &str,
        password: Password,
        role: Role,
    ) -> Result<Self, EmptyNameError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EmptyNameError);
        }
        Ok(Self {
            email,
            name: name.to_owned(),
            password,
            role,
        })
    }
}

/// Registration and login over the user repository and credential ports.
#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenCodec>,
}

/// The one error body for every failed login.
///
/// Unknown email and wrong password must be indistinguishable to the caller.
fn invalid_credentials() -> Error {
    Error::unauthorized("invalid credentials")
}

fn map_user_persistence_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => Error::service_unavailable(message),
        UserPersistenceError::Query { message } => Error::internal(message),
        UserPersistenceError::DuplicateEmail => Error::conflict("email is already registered"),
    }
}

fn map_hash_error(error: PasswordHashError) -> Error {
    Error::internal(error.to_string())
}

fn map_issue_error(error: TokenCodecError) -> Error {
    Error::internal(error.to_string())
}

impl AccountService {
    /// Create the service over its ports.
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenCodec>,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
        }
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// `conflict` when the email is taken; store failures map to
    /// `service_unavailable`/`internal_error`.
    pub async fn register(&self, registration: Registration) -> Result<User, Error> {
        let Registration {
            email,
            name,
            password,
            role,
        } = registration;
        let hash = self
            .hasher
            .hash(password.expose())
            .map_err(map_hash_error)?;
        let user = User::register(email, name, hash, role);
        self.users
            .create(&user)
            .await
            .map_err(map_user_persistence_error)?;
        Ok(user)
    }

    /// Verify credentials and issue a signed session token.
    ///
    /// # Errors
    ///
    /// `unauthorized` with an identical body for unknown email and wrong
    /// password.
    pub async fn login(&self, credentials: &Credentials) -> Result<String, Error> {
        let user = self
            .users
            .find_by_email(credentials.email())
            .await
            .map_err(map_user_persistence_error)?
            .ok_or_else(invalid_credentials)?;

        let verified = self
            .hasher
            .verify(user.password_hash(), credentials.password())
            .map_err(map_hash_error)?;
        if !verified {
            return Err(invalid_credentials());
        }

        let claims = AuthClaims {
            user_id: user.id(),
            role: user.role(),
        };
        self.tokens.issue(&claims).map_err(map_issue_error)
    }
}
