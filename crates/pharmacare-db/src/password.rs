//! # Password Hashing
//!
//! Argon2id hashes in PHC string format, one random salt per password.
//!
//! ## Stored Format
//! ```text
//! $argon2id$v=19$m=19456,t=2,p=1$<salt>$<hash>
//!            │     │       │   │
//!            │     │       │   └── parallelism
//!            │     │       └────── iterations
//!            │     └────────────── memory (KiB)
//!            └──────────────────── version
//! ```
//!
//! The parameters travel with the hash, so raising [`PasswordCost`] later
//! only affects new accounts; existing hashes keep verifying.
//!
//! Repositories call the `_blocking` variants, which run the Argon2 work on
//! tokio's blocking pool instead of an executor thread.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

use crate::error::{DbError, DbResult};

/// Work factor for new password hashes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordCost {
    /// Memory in KiB.
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl PasswordCost {
    /// The cheapest cost Argon2 accepts. Tests only.
    pub const fn minimal() -> Self {
        PasswordCost {
            memory_kib: Params::MIN_M_COST,
            iterations: Params::MIN_T_COST,
            parallelism: Params::MIN_P_COST,
        }
    }

    fn hasher(&self) -> DbResult<Argon2<'static>> {
        let params = Params::new(self.memory_kib, self.iterations, self.parallelism, None)
            .map_err(|e| DbError::PasswordHash(e.to_string()))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

impl Default for PasswordCost {
    /// Argon2's recommended defaults (19 MiB, 2 iterations, 1 lane).
    fn default() -> Self {
        PasswordCost {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

/// Hashes `password` with a fresh random salt.
pub fn hash_password(password: &str, cost: PasswordCost) -> DbResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = cost.hasher()?.hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Checks `password` against a stored PHC hash.
///
/// ## Returns
/// * `Ok(true)` - Password matches
/// * `Ok(false)` - Password doesn't match
/// * `Err(DbError::PasswordHash)` - Stored hash is malformed
pub fn verify_password(password: &str, stored_hash: &str) -> DbResult<bool> {
    let parsed = PasswordHash::new(stored_hash)?;

    // Parameters come from the stored hash, not from Argon2::default()
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// [`hash_password`] on the blocking thread pool.
pub async fn hash_password_blocking(password: &str, cost: PasswordCost) -> DbResult<String> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || hash_password(&password, cost))
        .await
        .map_err(|e| DbError::Internal(format!("password hashing task failed: {e}")))?
}

/// [`verify_password`] on the blocking thread pool.
pub async fn verify_password_blocking(password: &str, stored_hash: &str) -> DbResult<bool> {
    let password = password.to_owned();
    let stored_hash = stored_hash.to_owned();
    tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
        .await
        .map_err(|e| DbError::Internal(format!("password verification task failed: {e}")))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("admin123", PasswordCost::minimal()).unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("admin123", &hash).unwrap());
        assert!(!verify_password("admin124", &hash).unwrap());
    }

    #[test]
    fn test_same_password_different_salts() {
        let a = hash_password("secret1", PasswordCost::minimal()).unwrap();
        let b = hash_password("secret1", PasswordCost::minimal()).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        assert!(matches!(
            verify_password("secret1", "not-a-hash"),
            Err(DbError::PasswordHash(_))
        ));
    }

    #[test]
    fn test_invalid_cost_is_an_error() {
        let cost = PasswordCost {
            memory_kib: 1,
            iterations: 0,
            parallelism: 1,
        };
        assert!(matches!(
            hash_password("secret1", cost),
            Err(DbError::PasswordHash(_))
        ));
    }

    #[tokio::test]
    async fn test_blocking_variants_match_sync_ones() {
        let hash = hash_password_blocking("admin123", PasswordCost::minimal())
            .await
            .unwrap();

        assert!(verify_password("admin123", &hash).unwrap());
        assert!(verify_password_blocking("admin123", &hash).await.unwrap());
        assert!(!verify_password_blocking("admin124", &hash).await.unwrap());
        assert!(matches!(
            verify_password_blocking("admin123", "not-a-hash").await,
            Err(DbError::PasswordHash(_))
        ));
    }
}
