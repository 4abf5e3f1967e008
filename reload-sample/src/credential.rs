//! Salted bcrypt digests for the `/hash` endpoint.
//!
//! Each digest embeds its own random salt and work factor
//! (`$2b$<cost>$<salt><hash>`), so [`verify_secret`] needs only the secret
//! and the digest. Nothing here is stored; digests go straight back to the caller.

use thiserror::Error;

pub const MIN_COST: u32 = 4;
pub const MAX_COST: u32 = 31;

#[derive(Debug, Error)]
pub enum HashError {
    #[error("bcrypt failed: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),
    #[error("hashing task did not complete: {0}")]
    Task(String),
}

/// Hashes `secret` with a fresh random salt at the given bcrypt cost.
///
/// bcrypt only consumes the first 72 bytes of the secret.
pub fn hash_secret(secret: &[u8], cost: u32) -> Result<String, HashError> {
    Ok(bcrypt::hash(secret, cost)?)
}

#[cfg(test)]
pub fn verify_secret(secret: &[u8], digest: &str) -> Result<bool, HashError> {
    Ok(bcrypt::verify(secret, digest)?)
}
