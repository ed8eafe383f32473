//! Opaque session token generation and hashing.
//!
//! A token is 32 random bytes, base64url-encoded without padding. The
//! server stores only its SHA-256 digest, so reading the session table
//! does not yield usable tokens.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use sha2::{Digest, Sha256};

/// Bearer credential handed to the presentation layer (e.g. as a
/// cookie value). `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// The raw token value, for transport back to the client.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl From<String> for SessionToken {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl From<&str> for SessionToken {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}

/// Generate a cryptographically random session token
/// (32 bytes → base64url-encoded, no padding).
pub fn generate_session_token() -> SessionToken {
    let mut rng = rand::rng();
    let bytes: [u8; 32] = rand::Rng::random(&mut rng);
    SessionToken(URL_SAFE_NO_PAD.encode(bytes))
}

/// SHA-256 hash of a raw session token, hex-encoded.
///
/// This is the value stored in the database as `session.token_hash`.
pub fn hash_session_token(token: &SessionToken) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.0.as_bytes());
    hex::encode(hasher.finalize())
}
