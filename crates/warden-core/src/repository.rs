//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. The service layer is generic
//! over these traits so it has no dependency on the database crate.

use chrono::{DateTime, Utc};

use crate::error::WardenResult;
use crate::models::{
    account::{Account, AccountId, CreateAccount, UpdateAccount},
    session::{CreateSession, Session},
};

// ---------------------------------------------------------------------------
// Credential store
// ---------------------------------------------------------------------------

pub trait AccountRepository: Send + Sync {
    /// Insert a new account (role `User`, status `Active`).
    ///
    /// Identity uniqueness is enforced by the store itself; a duplicate
    /// yields `WardenError::AlreadyExists`.
    fn create(&self, input: CreateAccount) -> impl Future<Output = WardenResult<Account>> + Send;
    fn get_by_id(&self, id: AccountId) -> impl Future<Output = WardenResult<Account>> + Send;
    fn get_by_identity(
        &self,
        identity: &str,
    ) -> impl Future<Output = WardenResult<Account>> + Send;
    /// Record a successful authentication. Idempotent.
    fn touch_last_login(
        &self,
        id: AccountId,
        at: DateTime<Utc>,
    ) -> impl Future<Output = WardenResult<()>> + Send;
    /// Administrative role/status change.
    fn update(
        &self,
        id: AccountId,
        input: UpdateAccount,
    ) -> impl Future<Output = WardenResult<Account>> + Send;
}

// ---------------------------------------------------------------------------
// Session store
// ---------------------------------------------------------------------------

pub trait SessionRepository: Send + Sync {
    fn create(&self, input: CreateSession) -> impl Future<Output = WardenResult<Session>> + Send;
    fn get_by_token_hash(
        &self,
        token_hash: &str,
    ) -> impl Future<Output = WardenResult<Session>> + Send;
    /// Delete the session with this token hash. Deleting a missing
    /// session is not an error.
    fn delete_by_token_hash(
        &self,
        token_hash: &str,
    ) -> impl Future<Output = WardenResult<()>> + Send;
    /// Remove all sessions whose expiry is at or before `now`.
    /// Returns the number removed.
    fn cleanup_expired(&self, now: DateTime<Utc>) -> impl Future<Output = WardenResult<u64>> + Send;
}
