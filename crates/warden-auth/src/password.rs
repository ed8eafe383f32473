//! Password hashing and verification using Argon2id.
//!
//! Salt is randomly generated per hash, so identical plaintexts yield
//! different PHC strings. An optional pepper (server-side secret) is
//! prepended to the password before hashing and verification.
//!
//! Both operations are CPU-bound by design. The `*_blocking` variants
//! move them onto tokio's blocking pool so a slow hash never stalls
//! the async workers serving other requests.

use std::sync::Arc;

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};

use crate::config::AuthConfig;
use crate::error::PasswordError;

/// Argon2id hasher configured with cost parameters and an optional
/// pepper. Cheap to clone.
#[derive(Clone)]
pub struct Argon2Hasher {
    params: Params,
    pepper: Option<Arc<str>>,
}

impl std::fmt::Debug for Argon2Hasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Argon2Hasher")
            .field("m_cost", &self.params.m_cost())
            .field("t_cost", &self.params.t_cost())
            .field("p_cost", &self.params.p_cost())
            .field("pepper", &self.pepper.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Argon2Hasher {
    pub fn new(
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
        pepper: Option<&str>,
    ) -> Result<Self, PasswordError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| PasswordError::Hash(format!("argon2 params error: {e}")))?;
        Ok(Self {
            params,
            pepper: pepper.map(Arc::from),
        })
    }

    pub fn from_config(config: &AuthConfig) -> Result<Self, PasswordError> {
        Self::new(
            config.argon2_memory_kib,
            config.argon2_iterations,
            config.argon2_parallelism,
            config.pepper.as_deref(),
        )
    }

    fn peppered(&self, password: &str) -> Vec<u8> {
        match &self.pepper {
            Some(p) => format!("{p}{password}").into_bytes(),
            None => password.as_bytes().to_vec(),
        }
    }

    /// Hash a password into an Argon2id PHC string.
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone());
        let salt = SaltString::generate(&mut OsRng);

        argon2
            .hash_password(&self.peppered(password), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::Hash(e.to_string()))
    }

    /// Verify a plaintext password against a stored PHC string.
    ///
    /// Returns `Ok(true)` on match, `Ok(false)` on mismatch, or
    /// `Err(PasswordError::CorruptHash)` if the stored hash is malformed.
    /// Cost parameters are read from the stored hash, so hashes made
    /// under older settings keep verifying.
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        let parsed_hash =
            PasswordHash::new(hash).map_err(|e| PasswordError::CorruptHash(e.to_string()))?;

        match Argon2::default().verify_password(&self.peppered(password), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(PasswordError::CorruptHash(e.to_string())),
        }
    }

    /// [`hash`](Self::hash) on the blocking thread pool.
    pub async fn hash_blocking(&self, password: String) -> Result<String, PasswordError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| PasswordError::Worker(e.to_string()))?
    }

    /// [`verify`](Self::verify) on the blocking thread pool.
    pub async fn verify_blocking(
        &self,
        password: String,
        hash: String,
    ) -> Result<bool, PasswordError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| PasswordError::Worker(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimum-cost parameters keep unoptimized test builds fast.
    fn cheap(pepper: Option<&str>) -> Argon2Hasher {
        Argon2Hasher::new(1024, 1, 1, pepper).unwrap()
    }

    #[test]
    fn correct_password_matches() {
        let hasher = cheap(None);
        let hash = hasher.hash("hunter2-hunter2").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify("hunter2-hunter2", &hash).unwrap());
    }

    #[test]
    fn wrong_password_does_not_match() {
        let hasher = cheap(None);
        let hash = hasher.hash("hunter2-hunter2").unwrap();
        for wrong in ["hunter3-hunter2", "", "HUNTER2-HUNTER2", "hunter2-hunter2 "] {
            assert!(!hasher.verify(wrong, &hash).unwrap(), "{wrong:?} matched");
        }
    }

    #[test]
    fn identical_plaintexts_hash_differently() {
        let hasher = cheap(None);
        let a = hasher.hash("same-password").unwrap();
        let b = hasher.hash("same-password").unwrap();
        assert_ne!(a, b);
        assert!(hasher.verify("same-password", &a).unwrap());
        assert!(hasher.verify("same-password", &b).unwrap());
    }

    #[test]
    fn pepper_is_applied() {
        let peppered = cheap(Some("pepper!"));
        let hash = peppered.hash("hunter2-hunter2").unwrap();
        assert!(peppered.verify("hunter2-hunter2", &hash).unwrap());
        // Without pepper should fail.
        assert!(!cheap(None).verify("hunter2-hunter2", &hash).unwrap());
    }

    #[test]
    fn malformed_hash_returns_corrupt_hash() {
        let result = cheap(None).verify("pw", "not-a-hash");
        assert!(matches!(result, Err(PasswordError::CorruptHash(_))));
    }

    #[test]
    fn invalid_params_are_rejected() {
        assert!(Argon2Hasher::new(0, 0, 0, None).is_err());
    }

    #[test]
    fn debug_redacts_pepper() {
        let rendered = format!("{:?}", cheap(Some("s3cret")));
        assert!(!rendered.contains("s3cret"));
    }

    #[tokio::test]
    async fn blocking_variants_round_trip() {
        let hasher = cheap(None);
        let hash = hasher.hash_blocking("async-password".into()).await.unwrap();
        assert!(
            hasher
                .verify_blocking("async-password".into(), hash.clone())
                .await
                .unwrap()
        );
        assert!(!hasher.verify_blocking("other".into(), hash).await.unwrap());
    }
}
