//! HS256 JWT implementation of the token codec port.
//!
//! The signing secret and expiry are injected at construction; there is no
//! process-wide default.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::ports::{TokenCodec, TokenCodecError};
use crate::domain::{AuthClaims, Role};

/// Wire shape of the signed claims.
#[derive(Debug, Serialize, Deserialize)]
struct TokenClaims {
    /// Subject: the authenticated user id.
    sub: Uuid,
    /// Role carried by the token.
    role: Role,
    /// Expiry as a Unix timestamp.
    exp: i64,
}

/// HS256 codec over an injected shared secret.
#[derive(Clone)]
pub struct JwtTokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl JwtTokenCodec {
    /// Build the codec from the shared secret and token time-to-live.
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    /// Codec with the standard one-hour expiry.
    pub fn with_default_ttl(secret: &[u8]) -> Self {
        Self::new(secret, Duration::hours(1))
    }
}

impl TokenCodec for JwtTokenCodec {
    fn issue(&self, claims: &AuthClaims) -> Result<String, TokenCodecError> {
        let exp = Utc::now()
            .checked_add_signed(self.ttl)
            .ok_or_else(|| TokenCodecError::issue("token expiry out of range"))?
            .timestamp();
        let payload = TokenClaims {
            sub: claims.user_id,
            role: claims.role,
            exp,
        };
        encode(&Header::new(Algorithm::HS256), &payload, &self.encoding)
            .map_err(|err| TokenCodecError::issue(err.to_string()))
    }

    fn decode(&self, token: &str) -> Result<AuthClaims, TokenCodecError> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<TokenClaims>(token, &self.decoding, &validation).map_err(|err| {
            match err.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenCodecError::Expired,
                _ => TokenCodecError::Invalid,
            }
        })?;
        Ok(AuthClaims {
            user_id: data.claims.sub,
            role: data.claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use rstest::rstest;

    use super::*;

    const SECRET: &[u8] = b"test-signing-secret";

    fn claims() -> AuthClaims {
        AuthClaims {
            user_id: Uuid::new_v4(),
            role: Role::Coordinator,
        }
    }

    #[rstest]
    fn issue_then_decode_round_trips() {
        let codec = JwtTokenCodec::with_default_ttl(SECRET);
        let claims = claims();
        let token = codec.issue(&claims).expect("issuing succeeds");
        assert_eq!(codec.decode(&token).expect("decoding succeeds"), claims);
    }

    #[rstest]
    fn foreign_signatures_are_invalid() {
        let codec = JwtTokenCodec::with_default_ttl(SECRET);
        let forged = JwtTokenCodec::with_default_ttl(b"other-secret")
            .issue(&claims())
            .expect("issuing succeeds");
        let err = codec.decode(&forged).expect_err("forged token");
        assert_eq!(err, TokenCodecError::Invalid);
    }

    #[rstest]
    fn expired_tokens_are_reported_as_expired() {
        // Issue with a TTL far enough in the past to clear the default leeway.
        let codec = JwtTokenCodec::new(SECRET, Duration::seconds(-120));
        let token = codec.issue(&claims()).expect("issuing succeeds");
        let err = codec.decode(&token).expect_err("expired token");
        assert_eq!(err, TokenCodecError::Expired);
    }

    #[rstest]
    #[case("")]
    #[case("not-a-jwt")]
    #[case("aaa.bbb.ccc")]
    fn malformed_tokens_are_invalid(#[case] token: &str) {
        let codec = JwtTokenCodec::with_default_ttl(SECRET);
        let err = codec.decode(token).expect_err("malformed token");
        assert_eq!(err, TokenCodecError::Invalid);
    }
}
