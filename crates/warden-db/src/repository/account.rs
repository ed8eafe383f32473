//! SurrealDB implementation of [`AccountRepository`].
//!
//! Identity uniqueness is enforced by the `idx_account_identity`
//! UNIQUE index, never by a read-then-write check, so two concurrent
//! registrations for the same identity cannot both succeed.

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::{debug, warn};
use uuid::Uuid;
use warden_core::error::WardenResult;
use warden_core::models::account::{
    Account, AccountId, AccountStatus, CreateAccount, Role, UpdateAccount,
};
use warden_core::repository::AccountRepository;

use crate::error::{DbError, is_unique_violation, is_write_conflict};

/// Optimistic-transaction conflicts are retried this many times before
/// giving up. A retried insert that now collides with a committed row
/// reports a duplicate.
const MAX_CREATE_ATTEMPTS: usize = 3;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct AccountRow {
    identity: String,
    password_hash: String,
    role: String,
    status: String,
    last_login_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct AccountRowWithId {
    record_id: String,
    identity: String,
    password_hash: String,
    role: String,
    status: String,
    last_login_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

pub(crate) fn parse_role(s: &str) -> Result<Role, DbError> {
    match s {
        "user" => Ok(Role::User),
        "admin" => Ok(Role::Admin),
        "administrator" => Ok(Role::Administrator),
        other => Err(DbError::decode("account", format!("unknown role: {other}"))),
    }
}

pub(crate) fn parse_status(s: &str) -> Result<AccountStatus, DbError> {
    match s {
        "active" => Ok(AccountStatus::Active),
        "blocked" => Ok(AccountStatus::Blocked),
        other => Err(DbError::decode(
            "account",
            format!("unknown account status: {other}"),
        )),
    }
}

impl AccountRow {
    fn into_account(self, id: Uuid) -> Result<Account, DbError> {
        Ok(Account {
            id,
            identity: self.identity,
            password_hash: self.password_hash,
            role: parse_role(&self.role)?,
            status: parse_status(&self.status)?,
            last_login_at: self.last_login_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl AccountRowWithId {
    fn try_into_account(self) -> Result<Account, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::decode("account", format!("invalid UUID: {e}")))?;
        Ok(Account {
            id,
            identity: self.identity,
            password_hash: self.password_hash,
            role: parse_role(&self.role)?,
            status: parse_status(&self.status)?,
            last_login_at: self.last_login_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the credential store.
#[derive(Clone)]
pub struct SurrealAccountRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealAccountRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn insert(
        &self,
        id: &str,
        input: &CreateAccount,
    ) -> Result<Vec<AccountRow>, surrealdb::Error> {
        let response = self
            .db
            .query(
                "CREATE type::record('account', $id) SET \
                 identity = $identity, \
                 password_hash = $password_hash, \
                 role = $role, \
                 status = $status, \
                 last_login_at = NONE",
            )
            .bind(("id", id.to_string()))
            .bind(("identity", input.identity.clone()))
            .bind(("password_hash", input.password_hash.clone()))
            .bind(("role", Role::User.as_str().to_string()))
            .bind(("status", AccountStatus::Active.as_str().to_string()))
            .await?;

        let mut response = response.check()?;
        response.take(0)
    }
}

impl<C: Connection> AccountRepository for SurrealAccountRepository<C> {
    async fn create(&self, input: CreateAccount) -> WardenResult<Account> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let mut attempt = 1;
        let rows = loop {
            match self.insert(&id_str, &input).await {
                Ok(rows) => break rows,
                Err(e) if is_unique_violation(&e) => {
                    debug!(identity = %input.identity, "Identity already registered");
                    return Err(DbError::Duplicate {
                        entity: "account".into(),
                    }
                    .into());
                }
                Err(e) if is_write_conflict(&e) && attempt < MAX_CREATE_ATTEMPTS => {
                    warn!(attempt, "Write conflict creating account, retrying");
                    attempt += 1;
                }
                Err(e) => return Err(DbError::from(e).into()),
            }
        };

        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "account".into(),
            id: id_str,
        })?;

        Ok(row.into_account(id)?)
    }

    async fn get_by_id(&self, id: AccountId) -> WardenResult<Account> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('account', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AccountRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "account".into(),
            id: id_str,
        })?;

        Ok(row.into_account(id)?)
    }

    async fn get_by_identity(&self, identity: &str) -> WardenResult<Account> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM account \
                 WHERE identity = $identity",
            )
            .bind(("identity", identity.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AccountRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "account".into(),
            id: format!("identity={identity}"),
        })?;

        Ok(row.try_into_account()?)
    }

    async fn touch_last_login(&self, id: AccountId, at: DateTime<Utc>) -> WardenResult<()> {
        let id_str = id.to_string();

        // A missing record yields no rows.
        let result = self
            .db
            .query(
                "UPDATE type::record('account', $id) SET last_login_at = $at \
                 WHERE identity != NONE",
            )
            .bind(("id", id_str.clone()))
            .bind(("at", at))
            .await
            .map_err(DbError::from)?;
        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<AccountRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(DbError::NotFound {
                entity: "account".into(),
                id: id_str,
            }
            .into());
        }

        Ok(())
    }

    async fn update(&self, id: AccountId, input: UpdateAccount) -> WardenResult<Account> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.role.is_some() {
            sets.push("role = $role");
        }
        if input.status.is_some() {
            sets.push("status = $status");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('account', $id) SET {} \
             WHERE identity != NONE",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(role) = input.role {
            builder = builder.bind(("role", role.as_str().to_string()));
        }
        if let Some(status) = input.status {
            builder = builder.bind(("status", status.as_str().to_string()));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<AccountRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "account".into(),
            id: id_str,
        })?;

        Ok(row.into_account(id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_strings_round_trip() {
        for role in [Role::User, Role::Admin, Role::Administrator] {
            assert_eq!(parse_role(role.as_str()).unwrap(), role);
        }
        assert!(parse_role("superuser").is_err());
    }

    #[test]
    fn status_strings_round_trip() {
        for status in [AccountStatus::Active, AccountStatus::Blocked] {
            assert_eq!(parse_status(status.as_str()).unwrap(), status);
        }
        assert!(parse_status("Active").is_err());
    }
}
