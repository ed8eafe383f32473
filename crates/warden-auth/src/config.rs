//! Authentication configuration.

/// Configuration for the authentication service.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Absolute session lifetime in seconds (default: 1200 = 20 minutes).
    pub session_ttl_secs: u64,
    /// Minimum password length in characters (default: 8).
    pub min_password_length: usize,
    /// Optional pepper prepended to passwords before Argon2id hashing.
    pub pepper: Option<String>,
    /// Argon2id memory cost in KiB (default: 19456 = 19 MiB).
    pub argon2_memory_kib: u32,
    /// Argon2id iteration count (default: 2).
    pub argon2_iterations: u32,
    /// Argon2id lanes (default: 1).
    pub argon2_parallelism: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        // OWASP ASVS recommended Argon2id: m=19456, t=2, p=1.
        Self {
            session_ttl_secs: 1200,
            min_password_length: 8,
            pepper: None,
            argon2_memory_kib: 19456,
            argon2_iterations: 2,
            argon2_parallelism: 1,
        }
    }
}
