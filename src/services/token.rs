use std::fmt;

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::AppError;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("bad signature")]
    BadSignature,
    #[error("token expired")]
    Expired,
}

/// Claims embedded and signed inside every identity token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub id: i64,
    pub exp: i64,
}

/// HMAC-SHA256 identity token codec.
///
/// - The signing secret is injected at construction (process-wide config).
/// - Tokens are not revocable before expiry; there is no server-side
///   blacklist. Statelessness is the availability trade-off here.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_seconds: u64,
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        f.debug_struct("TokenCodec")
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

impl TokenCodec {
    pub fn new(secret: &str, ttl_seconds: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // A token is valid strictly until its expiry instant.
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl_seconds,
        }
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    /// Sign a token asserting `user_id` until now + TTL.
    pub fn issue(&self, user_id: i64) -> Result<String, AppError> {
        let exp = (Utc::now() + chrono::Duration::seconds(self.ttl_seconds as i64)).timestamp();
        let claims = Claims { id: user_id, exp };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(
            |e| {
                tracing::error!(error = %e, "failed to sign identity token");
                AppError::Internal
            },
        )
    }

    /// Verify signature and expiry, returning the embedded identity.
    ///
    /// Failure order matters to callers: a well-signed but expired token is
    /// `Expired`, never `BadSignature`.
    pub fn verify(&self, token: &str) -> Result<i64, TokenError> {
        match jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => Ok(data.claims.id),
            Err(e) => Err(match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::BadSignature,
                _ => TokenError::Malformed,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> TokenCodec {
        TokenCodec::new("unit-test-secret", 60 * 60 * 24)
    }

    fn sign_with(secret: &str, claims: &Claims) -> String {
        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn verify_returns_issued_identity() {
        let codec = codec();
        let token = codec.issue(42).unwrap();
        assert_eq!(codec.verify(&token), Ok(42));
    }

    #[test]
    fn token_has_three_parts() {
        let token = codec().issue(7).unwrap();
        assert_eq!(token.split('.').count(), 3);
    }

    #[test]
    fn expired_token_fails_as_expired_not_bad_signature() {
        let codec = codec();
        let stale = Claims {
            id: 42,
            exp: (Utc::now() - chrono::Duration::hours(1)).timestamp(),
        };
        let token = sign_with("unit-test-secret", &stale);
        assert_eq!(codec.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn foreign_signature_is_rejected() {
        let codec = codec();
        let claims = Claims {
            id: 42,
            exp: (Utc::now() + chrono::Duration::hours(1)).timestamp(),
        };
        let token = sign_with("some-other-secret", &claims);
        assert_eq!(codec.verify(&token), Err(TokenError::BadSignature));
    }

    #[test]
    fn garbage_is_malformed() {
        let codec = codec();
        assert_eq!(codec.verify("not-a-token"), Err(TokenError::Malformed));
        assert_eq!(codec.verify("one.two"), Err(TokenError::Malformed));
        assert_eq!(codec.verify(""), Err(TokenError::Malformed));
    }

    #[test]
    fn tokens_differ_per_identity() {
        let codec = codec();
        let a = codec.issue(1).unwrap();
        let b = codec.issue(2).unwrap();
        assert_ne!(a, b);
    }
}
