//! Port for salted one-way password hashing.

use super::define_port_error;

define_port_error! {
    /// Failures raised by password hashing adapters.
    pub enum PasswordHashError {
        /// Hashing the plaintext failed.
        Hash { message: String } => "password hashing failed: {message}",
        /// The stored hash could not be parsed or compared.
        Verify { message: String } => "password verification failed: {message}",
    }
}

/// Port for hashing and verifying passwords.
///
/// A mismatched password is `Ok(false)`, not an error; errors mean the hash
/// itself is unusable.
#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    /// Produce a salted one-way hash of the plaintext.
    fn hash(&self, password: &str) -> Result<String, PasswordHashError>;

    /// Check the plaintext against a stored hash.
    fn verify(&self, stored_hash: &str, password: &str) -> Result<bool, PasswordHashError>;
}

/// Fixture hasher for tests: "hashes" by prefixing a marker.
///
/// Never use outside tests; the output is trivially reversible.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePasswordHasher;

const FIXTURE_PREFIX: &str = "$fixture$";

impl PasswordHasher for FixturePasswordHasher {
    fn hash(&self, password: &str) -> Result<String, PasswordHashError> {
        Ok(format!("{FIXTURE_PREFIX}{password}"))
    }

    fn verify(&self, stored_hash: &str, password: &str) -> Result<bool, PasswordHashError> {
        match stored_hash.strip_prefix(FIXTURE_PREFIX) {
            Some(stored) => Ok(stored == password),
            None => Err(PasswordHashError::verify("unrecognised hash format")),
        }
    }
}
