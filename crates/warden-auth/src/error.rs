//! Authentication error types.
//!
//! Each public operation has its own error enum so callers can match
//! exhaustively on the outcomes that operation can actually produce.
//! Store or crypto failures travel as `Internal`.

use thiserror::Error;
use warden_core::error::WardenError;

/// Password hashing failures. A mismatch is not an error.
#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error("stored password hash is malformed: {0}")]
    CorruptHash(String),

    #[error("password worker failed: {0}")]
    Worker(String),
}

#[derive(Debug, Error)]
pub enum RegisterError {
    #[error("password must be at least {min_length} characters")]
    WeakPassword { min_length: usize },

    #[error("identity must not be empty")]
    EmptyIdentity,

    #[error("identity is already registered")]
    DuplicateIdentity,

    #[error(transparent)]
    Internal(WardenError),
}

#[derive(Debug, Error)]
pub enum LoginError {
    /// Unknown identity and wrong password share this variant.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("account is blocked")]
    AccountBlocked,

    #[error(transparent)]
    Internal(WardenError),
}

/// Session resolution failures. Both session variants mean
/// "log in again" to the presentation layer.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no active session")]
    MissingSession,

    #[error("session has expired")]
    ExpiredSession,

    #[error(transparent)]
    Internal(WardenError),
}

impl AuthError {
    /// True for the outcomes that should send the user back to login.
    pub fn requires_login(&self) -> bool {
        matches!(self, AuthError::MissingSession | AuthError::ExpiredSession)
    }
}

#[derive(Debug, Error)]
pub enum ReissueError {
    #[error(transparent)]
    Session(#[from] AuthError),

    #[error("account is blocked")]
    AccountBlocked,

    #[error(transparent)]
    Internal(WardenError),
}

impl From<PasswordError> for WardenError {
    fn from(err: PasswordError) -> Self {
        WardenError::Crypto(err.to_string())
    }
}

impl From<PasswordError> for RegisterError {
    fn from(err: PasswordError) -> Self {
        RegisterError::Internal(err.into())
    }
}

impl From<PasswordError> for LoginError {
    fn from(err: PasswordError) -> Self {
        LoginError::Internal(err.into())
    }
}

impl From<WardenError> for RegisterError {
    fn from(err: WardenError) -> Self {
        match err {
            WardenError::AlreadyExists { .. } => RegisterError::DuplicateIdentity,
            other => RegisterError::Internal(other),
        }
    }
}

impl From<WardenError> for LoginError {
    fn from(err: WardenError) -> Self {
        LoginError::Internal(err)
    }
}

impl From<WardenError> for AuthError {
    fn from(err: WardenError) -> Self {
        AuthError::Internal(err)
    }
}

impl From<WardenError> for ReissueError {
    fn from(err: WardenError) -> Self {
        ReissueError::Internal(err)
    }
}

impl From<RegisterError> for WardenError {
    fn from(err: RegisterError) -> Self {
        match err {
            RegisterError::WeakPassword { .. } | RegisterError::EmptyIdentity => {
                WardenError::Validation {
                    message: err.to_string(),
                }
            }
            RegisterError::DuplicateIdentity => WardenError::AlreadyExists {
                entity: "account".into(),
            },
            RegisterError::Internal(inner) => inner,
        }
    }
}

impl From<LoginError> for WardenError {
    fn from(err: LoginError) -> Self {
        match err {
            LoginError::InvalidCredentials | LoginError::AccountBlocked => {
                WardenError::AuthenticationFailed {
                    reason: err.to_string(),
                }
            }
            LoginError::Internal(inner) => inner,
        }
    }
}

impl From<AuthError> for WardenError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingSession | AuthError::ExpiredSession => {
                WardenError::AuthenticationFailed {
                    reason: err.to_string(),
                }
            }
            AuthError::Internal(inner) => inner,
        }
    }
}
