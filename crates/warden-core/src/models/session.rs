//! Session domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::account::{Account, AccountId, AccountStatus, Role};

/// Copy of the account fields taken at login time.
///
/// Authorization decisions read this snapshot, not the live account,
/// so it may lag behind administrative changes until re-issued.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub account_id: AccountId,
    pub identity: String,
    pub role: Role,
    pub status: AccountStatus,
}

impl From<&Account> for SessionSnapshot {
    fn from(account: &Account) -> Self {
        Self {
            account_id: account.id,
            identity: account.identity.clone(),
            role: account.role,
            status: account.status,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    /// SHA-256 of the opaque session token, hex-encoded.
    pub token_hash: String,
    pub snapshot: SessionSnapshot,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Expiry is absolute: a session is dead from `expires_at` onward.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[derive(Debug, Clone)]
pub struct CreateSession {
    pub token_hash: String,
    pub snapshot: SessionSnapshot,
    pub expires_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn session(expires_at: DateTime<Utc>) -> Session {
        Session {
            id: Uuid::new_v4(),
            token_hash: "00".into(),
            snapshot: SessionSnapshot {
                account_id: Uuid::new_v4(),
                identity: "alice".into(),
                role: Role::User,
                status: AccountStatus::Active,
            },
            created_at: expires_at - Duration::seconds(1200),
            expires_at,
        }
    }

    #[test]
    fn expiry_boundary_is_inclusive() {
        let now = Utc::now();
        assert!(session(now).is_expired_at(now));
        assert!(session(now - Duration::seconds(1)).is_expired_at(now));
        assert!(!session(now + Duration::seconds(1)).is_expired_at(now));
    }
}
