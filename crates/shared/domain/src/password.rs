//! Credential hashing.
//!
//! Secrets are hashed with Argon2id into self-describing PHC strings, so the
//! salt and the work parameters travel with the digest.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use thiserror::Error;

use crate::constants::{DEFAULT_HASH_COST, MAX_HASH_COST, MAX_SECRET_BYTES, MIN_HASH_COST};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HashError {
    #[error("secret exceeds {max} bytes")]
    SecretTooLong { max: usize },

    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error("secret does not match digest")]
    Mismatch,
}

/// One-way hashing of account secrets.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait CredentialHasher: Send + Sync {
    /// Hash a secret with a fresh random salt.
    fn hash(&self, secret: &str) -> Result<String, HashError>;

    /// Check a secret against a stored digest. Any failure to match,
    /// including a digest this hasher cannot parse, is [`HashError::Mismatch`].
    fn verify(&self, digest: &str, secret: &str) -> Result<(), HashError>;

    /// Well-formed digest that matches no secret, carrying the same work
    /// parameters as fresh digests. Verified against on login when the account
    /// does not exist, so that path costs the same as a real one.
    fn decoy_digest(&self) -> String;
}

/// Argon2id hasher with a configurable time cost.
#[derive(Clone)]
pub struct Argon2Hasher {
    params: Params,
    decoy: String,
}

impl std::fmt::Debug for Argon2Hasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Argon2Hasher")
            .field("cost", &self.params.t_cost())
            .finish_non_exhaustive()
    }
}

impl Argon2Hasher {
    /// Build a hasher. A cost outside `MIN_HASH_COST..=MAX_HASH_COST` falls
    /// back to `DEFAULT_HASH_COST`.
    pub fn new(cost: u32) -> Self {
        let cost = if (MIN_HASH_COST..=MAX_HASH_COST).contains(&cost) {
            cost
        } else {
            tracing::warn!(
                requested = cost,
                fallback = DEFAULT_HASH_COST,
                "password hash cost out of range, using default"
            );
            DEFAULT_HASH_COST
        };

        // t_cost in range and default memory/lanes are always accepted
        let params = Params::new(Params::DEFAULT_M_COST, cost, Params::DEFAULT_P_COST, None)
            .unwrap_or_default();
        let decoy = decoy_for(&params);

        Self { params, decoy }
    }

    /// Effective time cost after clamping.
    pub fn cost(&self) -> u32 {
        self.params.t_cost()
    }

    #[inline]
    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

/// PHC string with `params`, a random salt and an all-zero output. No secret
/// hashes to zero, so it never verifies, but checking it runs the full hash.
fn decoy_for(params: &Params) -> String {
    let salt = SaltString::generate(&mut OsRng);
    format!(
        "$argon2id$v=19$m={},t={},p={}${}${}",
        params.m_cost(),
        params.t_cost(),
        params.p_cost(),
        salt.as_str(),
        "A".repeat(43)
    )
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self::new(DEFAULT_HASH_COST)
    }
}

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, secret: &str) -> Result<String, HashError> {
        if secret.len() > MAX_SECRET_BYTES {
            return Err(HashError::SecretTooLong {
                max: MAX_SECRET_BYTES,
            });
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(secret.as_bytes(), &salt)
            .map_err(|e| HashError::Hashing(e.to_string()))?;
        Ok(hash.to_string())
    }

    fn verify(&self, digest: &str, secret: &str) -> Result<(), HashError> {
        if secret.len() > MAX_SECRET_BYTES {
            return Err(HashError::Mismatch);
        }

        let parsed = PasswordHash::new(digest).map_err(|_| HashError::Mismatch)?;
        self.argon2()
            .verify_password(secret.as_bytes(), &parsed)
            .map_err(|_| HashError::Mismatch)
    }

    fn decoy_digest(&self) -> String {
        self.decoy.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> Argon2Hasher {
        Argon2Hasher::new(1)
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = hasher();
        let digest = hasher.hash("SecurePassword123!").unwrap();

        assert!(digest.starts_with("$argon2id$"));
        assert_eq!(hasher.verify(&digest, "SecurePassword123!"), Ok(()));
        assert_eq!(
            hasher.verify(&digest, "WrongPassword123"),
            Err(HashError::Mismatch)
        );
    }

    #[test]
    fn test_same_secret_different_salts() {
        let hasher = hasher();
        let first = hasher.hash("SamePassword123").unwrap();
        let second = hasher.hash("SamePassword123").unwrap();

        assert_ne!(first, second);
        assert!(hasher.verify(&first, "SamePassword123").is_ok());
        assert!(hasher.verify(&second, "SamePassword123").is_ok());
    }

    #[test]
    fn test_out_of_range_cost_falls_back_to_default() {
        assert_eq!(Argon2Hasher::new(0).cost(), DEFAULT_HASH_COST);
        assert_eq!(Argon2Hasher::new(MAX_HASH_COST + 1).cost(), DEFAULT_HASH_COST);
        assert_eq!(Argon2Hasher::new(4).cost(), 4);
    }

    #[test]
    fn test_digest_from_other_cost_still_verifies() {
        let digest = Argon2Hasher::new(3).hash("password-one").unwrap();
        assert!(hasher().verify(&digest, "password-one").is_ok());
    }

    #[test]
    fn test_secret_length_limit_is_72_bytes() {
        let hasher = hasher();
        let at_limit = "a".repeat(MAX_SECRET_BYTES);
        let over_limit = "a".repeat(MAX_SECRET_BYTES + 1);

        let digest = hasher.hash(&at_limit).unwrap();
        assert!(hasher.verify(&digest, &at_limit).is_ok());

        assert_eq!(
            hasher.hash(&over_limit),
            Err(HashError::SecretTooLong { max: 72 })
        );
        // No truncation: the 73-byte secret sharing a 72-byte prefix must not match
        assert_eq!(hasher.verify(&digest, &over_limit), Err(HashError::Mismatch));
    }

    #[test]
    fn test_limit_counts_bytes_not_chars() {
        // 25 three-byte characters = 75 bytes
        let secret = "€".repeat(25);
        assert!(matches!(
            hasher().hash(&secret),
            Err(HashError::SecretTooLong { .. })
        ));
    }

    #[test]
    fn test_malformed_digest_is_mismatch() {
        let hasher = hasher();
        for digest in ["", "not-a-hash", "$2a$10$abcdefghijklmnopqrstuv", "$argon2id$"] {
            assert_eq!(
                hasher.verify(digest, "whatever123"),
                Err(HashError::Mismatch),
                "digest {:?}",
                digest
            );
        }
    }

    #[test]
    fn test_decoy_digest_parses_but_never_matches() {
        let hasher = hasher();
        let decoy = hasher.decoy_digest();
        assert!(PasswordHash::new(&decoy).is_ok());
        assert_eq!(hasher.verify(&decoy, "password123"), Err(HashError::Mismatch));
        assert_eq!(hasher.verify(&decoy, ""), Err(HashError::Mismatch));
    }

    #[test]
    fn test_decoy_uses_configured_work_parameters() {
        for cost in [1, DEFAULT_HASH_COST, 5] {
            let hasher = Argon2Hasher::new(cost);
            let real = hasher.hash("password123").unwrap();
            let decoy = hasher.decoy_digest();

            let real = PasswordHash::new(&real).unwrap();
            let decoy = PasswordHash::new(&decoy).unwrap();
            assert_eq!(decoy.algorithm, real.algorithm, "cost {}", cost);
            assert_eq!(decoy.version, real.version, "cost {}", cost);
            assert_eq!(
                decoy.params.to_string(),
                real.params.to_string(),
                "cost {}",
                cost
            );
            assert_eq!(
                decoy.hash.map(|h| h.len()),
                real.hash.map(|h| h.len()),
                "cost {}",
                cost
            );
        }
    }

    #[test]
    fn test_unicode_secret() {
        let hasher = hasher();
        let digest = hasher.hash("pässwörd-密码").unwrap();
        assert!(hasher.verify(&digest, "pässwörd-密码").is_ok());
        assert!(hasher.verify(&digest, "passwörd-密码").is_err());
    }
}
