//! Signed token issuance for the `/token` endpoint.
//!
//! Tokens are HS256 JWTs over a small claim set. The HMAC secret comes from a
//! [`KeyProvider`], so the key source can change without touching the handler.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const TOKEN_ISSUER: &str = "reload-sample";
pub const TOKEN_TTL_HOURS: i64 = 24;

/// Publicly known key used when no signing key is configured. Demo use only.
const DEMO_SIGNING_KEY: &[u8] = b"your-secret-key-change-in-production";

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
    #[error("token rejected: {0}")]
    Verification(#[source] jsonwebtoken::errors::Error),
}

/// Supplies the symmetric secret used to sign and verify tokens.
pub trait KeyProvider: Send + Sync + fmt::Debug {
    fn secret(&self) -> &[u8];

    /// Whether this is the built-in demonstration key.
    fn is_demo(&self) -> bool {
        false
    }
}

pub struct StaticKey {
    secret: Vec<u8>,
    demo: bool,
}

impl StaticKey {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
            demo: false,
        }
    }

    pub fn demo() -> Self {
        Self {
            secret: DEMO_SIGNING_KEY.to_vec(),
            demo: true,
        }
    }
}

impl fmt::Debug for StaticKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticKey")
            .field("secret", &"<redacted>")
            .field("demo", &self.demo)
            .finish()
    }
}

impl KeyProvider for StaticKey {
    fn secret(&self) -> &[u8] {
        &self.secret
    }

    fn is_demo(&self) -> bool {
        self.demo
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub username: String,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub username: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct TokenIssuer {
    keys: Arc<dyn KeyProvider>,
    issuer: String,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(keys: Arc<dyn KeyProvider>) -> Self {
        Self {
            keys,
            issuer: String::from(TOKEN_ISSUER),
            ttl: Duration::hours(TOKEN_TTL_HOURS),
        }
    }

    pub fn uses_demo_key(&self) -> bool {
        self.keys.is_demo()
    }

    pub fn issue(&self, username: &str, now: DateTime<Utc>) -> Result<IssuedToken, TokenError> {
        let expires_at = now + self.ttl;
        let claims = Claims {
            username: username.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            iss: self.issuer.clone(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.keys.secret()),
        )
        .map_err(TokenError::Signing)?;

        Ok(IssuedToken {
            username: claims.username,
            token,
            expires_at,
        })
    }

    /// Checks signature, issuer and expiry, returning the embedded claims.
    #[cfg(test)]
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.issuer.as_str()]);
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.keys.secret()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(TokenError::Verification)
    }
}
