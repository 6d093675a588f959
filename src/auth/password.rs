//! Argon2id password hashing.
//!
//! Hashes are stored as PHC strings, so the salt and the parameters used at
//! hashing time travel with the hash. Raising the cost later does not break
//! verification of older hashes.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use std::sync::OnceLock;
use thiserror::Error;

/// Argon2 time cost (iterations) used when none is configured.
pub const DEFAULT_HASH_COST: u32 = 3;

#[derive(Debug, Error)]
pub enum HashError {
    #[error("invalid password hashing cost: {0}")]
    InvalidCost(u32),
    #[error("password hashing failed")]
    Hash,
}

#[derive(Clone, Debug)]
pub struct PasswordHasher {
    params: Params,
    // Hash of a throwaway password with `params`, built on first use.
    dummy: OnceLock<String>,
}

impl PasswordHasher {
    /// Build a hasher with the given Argon2 time cost.
    ///
    /// # Errors
    /// Returns `HashError::InvalidCost` if Argon2 rejects the cost (e.g. `0`).
    pub fn new(cost: u32) -> Result<Self, HashError> {
        let params = Params::new(
            Params::DEFAULT_M_COST,
            cost,
            Params::DEFAULT_P_COST,
            None,
        )
        .map_err(|_| HashError::InvalidCost(cost))?;

        Ok(Self {
            params,
            dummy: OnceLock::new(),
        })
    }

    #[must_use]
    pub fn cost(&self) -> u32 {
        self.params.t_cost()
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash `plaintext` with a fresh random salt.
    ///
    /// # Errors
    /// Only fails if the underlying primitive does, which does not happen with
    /// validated parameters.
    pub fn hash(&self, plaintext: &str) -> Result<String, HashError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2()
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|_| HashError::Hash)
    }

    /// Check `plaintext` against a stored PHC hash.
    ///
    /// Any mismatch, including a stored value that does not parse, is `false`.
    /// The digest comparison is constant time.
    #[must_use]
    pub fn verify(&self, plaintext: &str, stored: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(stored) else {
            return false;
        };

        self.argon2()
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }

    /// Run a full verification for an account that does not exist.
    ///
    /// Always `false`. The work matches `verify` against a hash made with the
    /// same parameters, so a caller cannot tell an unknown account from a
    /// wrong password by response time.
    #[must_use]
    pub fn verify_absent(&self, plaintext: &str) -> bool {
        let _ = self.verify(plaintext, self.dummy_hash());
        false
    }

    fn dummy_hash(&self) -> &str {
        self.dummy
            .get_or_init(|| self.hash("evently-absent-account").unwrap_or_default())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // Cheapest valid cost keeps the suite fast.
    fn hasher() -> PasswordHasher {
        PasswordHasher::new(1).unwrap()
    }

    #[test]
    fn verifies_own_hash() {
        let hasher = hasher();
        let hash = hasher.hash("secret123").unwrap();

        assert!(hasher.verify("secret123", &hash));
        assert!(!hasher.verify("wrongpass", &hash));
    }

    #[test]
    fn hash_is_not_plaintext() {
        let hash = hasher().hash("secret123").unwrap();

        assert!(!hash.contains("secret123"));
        assert!(hash.starts_with("$argon2id$"));
    }

    #[test]
    fn fresh_salt_per_call() {
        let hasher = hasher();
        let first = hasher.hash("secret123").unwrap();
        let second = hasher.hash("secret123").unwrap();

        assert_ne!(first, second);
        assert!(hasher.verify("secret123", &first));
        assert!(hasher.verify("secret123", &second));
    }

    #[test]
    fn malformed_hash_is_a_mismatch() {
        let hasher = hasher();

        assert!(!hasher.verify("secret123", ""));
        assert!(!hasher.verify("secret123", "not-a-phc-string"));
        assert!(!hasher.verify("secret123", "$2a$10$abcdefghijklmnopqrstuv"));
    }

    #[test]
    fn older_cost_still_verifies() {
        let cheap = hasher();
        let hash = cheap.hash("secret123").unwrap();

        let stronger = PasswordHasher::new(2).unwrap();
        assert!(stronger.verify("secret123", &hash));
    }

    #[test]
    fn zero_cost_is_rejected() {
        assert!(matches!(
            PasswordHasher::new(0),
            Err(HashError::InvalidCost(0))
        ));
    }

    #[test]
    fn absent_account_runs_a_full_verification() {
        let hasher = PasswordHasher::new(2).unwrap();

        assert!(!hasher.verify_absent("secret123"));
        assert!(!hasher.verify_absent("evently-absent-account"));

        let dummy = PasswordHash::new(hasher.dummy_hash()).unwrap();
        assert_eq!(dummy.algorithm.as_str(), "argon2id");
        let params = Params::try_from(&dummy).unwrap();
        assert_eq!(params.t_cost(), hasher.cost());
        assert_eq!(params.m_cost(), Params::DEFAULT_M_COST);
    }

    #[test]
    fn dummy_hash_is_built_once() {
        let hasher = hasher();
        let first = hasher.dummy_hash().to_string();

        assert_eq!(hasher.dummy_hash(), first);
    }

    #[test]
    fn cost_is_reported() {
        assert_eq!(PasswordHasher::new(4).unwrap().cost(), 4);
    }
}
