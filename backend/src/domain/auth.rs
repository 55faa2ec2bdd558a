//! Authentication and authorisation primitives.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.
//! The role gate is a pure function so it stays independent of any routing
//! framework.

use std::fmt;

use uuid::Uuid;
use zeroize::Zeroizing;

use super::user::Role;
use super::{Email, Error};

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Domain error returned when a plaintext password is too weak.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasswordValidationError {
    /// The password had fewer than [`MIN_PASSWORD_LENGTH`] characters.
    TooShort,
}

impl fmt::Display for PasswordValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort => write!(
                f,
                "password must have at least {MIN_PASSWORD_LENGTH} characters"
            ),
        }
    }
}

impl std::error::Error for PasswordValidationError {}

/// A plaintext password accepted for registration.
///
/// The wrapped string is zeroised on drop. There is intentionally no `Debug`
/// passthrough or `Display` impl.
#[derive(Clone)]
pub struct Password(Zeroizing<String>);

impl Password {
    /// Validate a candidate password.
    pub fn new(raw: &str) -> Result<Self, PasswordValidationError> {
        if raw.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(PasswordValidationError::TooShort);
        }
        Ok(Self(Zeroizing::new(raw.to_owned())))
    }

    /// Plaintext exposed only to the hashing port.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialsValidationError {
    /// Email failed the shape check.
    MalformedEmail,
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for CredentialsValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedEmail => write!(f, "email must be a valid address"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for CredentialsValidationError {}

/// Validated login credentials used by the account service.
///
/// ## Invariants
/// - `email` passed the shape check.
/// - `password` is non-empty but otherwise kept verbatim so hashing sees
///   exactly what the caller typed.
#[derive(Debug, Clone)]
pub struct Credentials {
    email: Email,
    password: Zeroizing<String>,
}

impl Credentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, CredentialsValidationError> {
        let email = Email::new(email).map_err(|_| CredentialsValidationError::MalformedEmail)?;
        if password.is_empty() {
            return Err(CredentialsValidationError::EmptyPassword);
        }
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Email used for the account lookup.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Verified token claims attached to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthClaims {
    /// Authenticated user id.
    pub user_id: Uuid,
    /// Role carried by the token.
    pub role: Role,
}

/// Role gate: allow the request only when the claim's role is in the list.
///
/// # Errors
///
/// Returns [`Error`] with code `forbidden` when the role is not allowed.
pub fn authorize(claims: &AuthClaims, allowed: &[Role]) -> Result<(), Error> {
    if allowed.contains(&claims.role) {
        Ok(())
    } else {
        Err(Error::forbidden("access denied for this role"))
    }
}
