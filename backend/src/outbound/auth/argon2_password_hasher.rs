//! Argon2id implementation of the password hashing port.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{
    Error as HashParseError, PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
};

use crate::domain::ports::{PasswordHashError, PasswordHasher};

/// Salted Argon2id hasher with the crate's default parameters.
#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2PasswordHasher;

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &str) -> Result<String, PasswordHashError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| PasswordHashError::hash(err.to_string()))
    }

    fn verify(&self, stored_hash: &str, password: &str) -> Result<bool, PasswordHashError> {
        let parsed = PasswordHash::new(stored_hash)
            .map_err(|err| PasswordHashError::verify(err.to_string()))?;
        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(HashParseError::Password) => Ok(false),
            Err(err) => Err(PasswordHashError::verify(err.to_string())),
        }
    }
}
