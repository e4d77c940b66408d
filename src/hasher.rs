//! Password hashing.
//!
//! Wraps bcrypt with a configurable cost factor and pushes the work onto
//! the blocking thread pool, since a single hash at cost 10 burns tens of
//! milliseconds of CPU and must not stall the request dispatch path.

use anyhow::{Context, Result};

/// Default bcrypt cost factor.
pub const DEFAULT_HASH_COST: u32 = 10;

/// One-way password hasher with constant-time verification.
#[derive(Debug, Clone)]
pub struct SecretHasher {
    // ---
    cost: u32,
}

impl SecretHasher {
    // ---
    pub fn new(cost: u32) -> Self {
        // ---
        Self { cost }
    }

    /// Hash a plaintext password into a salted bcrypt digest.
    ///
    /// # Errors
    /// Fails if bcrypt rejects the input or the blocking task is cancelled.
    /// A hashing failure is fatal to the registration attempt.
    pub async fn hash(&self, plaintext: &str) -> Result<String> {
        // ---
        let plaintext = plaintext.to_owned();
        let cost = self.cost;

        tokio::task::spawn_blocking(move || bcrypt::hash(plaintext, cost))
            .await
            .context("password hashing task failed")?
            .context("password hashing failed")
    }

    /// Verify a plaintext password against a stored digest.
    ///
    /// Returns `false` for a mismatch or a malformed hash; verification
    /// never errors out. bcrypt's own salt handling makes the comparison
    /// constant-time with respect to the digest.
    pub async fn verify(&self, plaintext: &str, hash: &str) -> bool {
        // ---
        let plaintext = plaintext.to_owned();
        let hash = hash.to_owned();

        tokio::task::spawn_blocking(move || bcrypt::verify(plaintext, &hash).unwrap_or(false))
            .await
            .unwrap_or(false)
    }
}

impl Default for SecretHasher {
    // ---
    fn default() -> Self {
        Self::new(DEFAULT_HASH_COST)
    }
}
