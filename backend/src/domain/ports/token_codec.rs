//! Port for signing and verifying session tokens.

use crate::domain::AuthClaims;

use super::define_port_error;

define_port_error! {
    /// Failures raised by token codec adapters.
    pub enum TokenCodecError {
        /// Signing the claims failed.
        Issue { message: String } => "token signing failed: {message}",
        /// The token has passed its expiry.
        Expired => "token expired",
        /// The token is malformed or carries a bad signature.
        Invalid => "invalid token",
    }
}

/// Port for issuing and decoding signed, time-limited session tokens.
#[cfg_attr(test, mockall::automock)]
pub trait TokenCodec: Send + Sync {
    /// Sign the claims into a compact token with the configured expiry.
    fn issue(&self, claims: &AuthClaims) -> Result<String, TokenCodecError>;

    /// Verify the signature and expiry, returning the embedded claims.
    fn decode(&self, token: &str) -> Result<AuthClaims, TokenCodecError>;
}

/// Fixture codec for tests: encodes claims as plain text.
///
/// Never use outside tests; tokens are neither signed nor expiring.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureTokenCodec;

impl TokenCodec for FixtureTokenCodec {
    fn issue(&self, claims: &AuthClaims) -> Result<String, TokenCodecError> {
        Ok(format!("{}:{}", claims.user_id, claims.role))
    }

    fn decode(&self, token: &str) -> Result<AuthClaims, TokenCodecError> {
        let (id, role) = token.split_once(':').ok_or(TokenCodecError::Invalid)?;
        let user_id = id.parse().map_err(|_| TokenCodecError::Invalid)?;
        let role = role.parse().map_err(|_| TokenCodecError::Invalid)?;
        Ok(AuthClaims { user_id, role })
    }
}
