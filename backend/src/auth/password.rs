//! Password hashing using bcrypt
//!
//! Passwords are hashed with bcrypt at cost factor 12 and never stored or
//! returned in plaintext.
//!
//! # Performance Considerations
//!
//! bcrypt is intentionally CPU-intensive. The async variants run on the
//! blocking thread pool so request handlers never stall the runtime.

use anyhow::Result;

/// bcrypt cost factor for all stored password hashes
pub const BCRYPT_COST: u32 = 12;

/// Password hashing service
pub struct PasswordService;

impl PasswordService {
    /// Hash a password (blocking operation)
    pub fn hash(password: &str) -> Result<String> {
        bcrypt::hash(password, BCRYPT_COST)
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))
    }

    /// Hash a password asynchronously (non-blocking)
    ///
    /// Spawns the CPU-intensive work on the blocking thread pool.
    pub async fn hash_async(password: String) -> Result<String> {
        tokio::task::spawn_blocking(move || Self::hash(&password))
            .await
            .map_err(|e| anyhow::anyhow!("Task join error: {}", e))?
    }

    /// Verify a password against a stored hash (blocking operation)
    pub fn verify(password: &str, hash: &str) -> Result<bool> {
        bcrypt::verify(password, hash)
            .map_err(|e| anyhow::anyhow!("Invalid hash format: {}", e))
    }

    /// Verify a password asynchronously (non-blocking)
    pub async fn verify_async(password: String, hash: String) -> Result<bool> {
        tokio::task::spawn_blocking(move || Self::verify(&password, &hash))
            .await
            .map_err(|e| anyhow::anyhow!("Task join error: {}", e))?
    }
}
