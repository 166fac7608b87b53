/**
 * Session Tokens
 *
 * HS256 JWT minting and verification. A token carries the user id (`sub`),
 * a random `jti` so two logins never mint the same string, and `iat`/`exp`.
 *
 * Verification checks the signature and the `exp` claim with zero leeway.
 * Whether a signed, unexpired token is still trusted is decided by the
 * session store, see `authenticator`.
 */

use chrono::{DateTime, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::backend::error::{BackendError, BackendResult};

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// User ID
    pub sub: String,
    /// Unique token id
    pub jti: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Signs and verifies session tokens with a shared secret
#[derive(Clone)]
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    validity: Duration,
}

impl TokenSigner {
    pub fn new(secret: &str, validity: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            validity,
        }
    }

    pub fn validity(&self) -> Duration {
        self.validity
    }

    /// Mint a token for `user_id`, returning it with its expiry instant
    pub fn sign(&self, user_id: &str) -> BackendResult<(String, DateTime<Utc>)> {
        let now = Utc::now();
        let validity = chrono::Duration::from_std(self.validity)
            .map_err(|e| BackendError::authentication(format!("invalid token validity: {}", e)))?;
        let expires_at = now + validity;

        let claims = Claims {
            sub: user_id.to_string(),
            jti: uuid::Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| BackendError::authentication(format!("failed to sign token: {}", e)))?;

        Ok((token, expires_at))
    }

    /// Verify signature and expiry, returning the claims
    pub fn verify(&self, token: &str) -> BackendResult<Claims> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => BackendError::authentication("token expired"),
                ErrorKind::InvalidSignature => BackendError::authentication("invalid token signature"),
                _ => BackendError::authentication(format!("invalid token: {}", e)),
            })
    }
}
