//! Warden Auth: registration and login rules, Argon2id password
//! hashing, opaque session tokens, and role-based gates.

pub mod config;
pub mod error;
pub mod identity;
pub mod password;
pub mod policy;
pub mod service;
pub mod session;
pub mod token;

pub use config::AuthConfig;
pub use error::{AuthError, LoginError, PasswordError, RegisterError, ReissueError};
pub use policy::{Gate, is_fully_privileged, is_privileged};
pub use service::{AuthService, LoginOutput};
pub use session::{SessionManager, spawn_sweeper};
pub use token::SessionToken;
