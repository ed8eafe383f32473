//! SurrealDB implementation of [`SessionRepository`].

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;
use warden_core::error::WardenResult;
use warden_core::models::session::{CreateSession, Session, SessionSnapshot};
use warden_core::repository::SessionRepository;

use super::account::{parse_role, parse_status};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct SessionRow {
    token_hash: String,
    account_id: String,
    identity: String,
    role: String,
    status: String,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct SessionRowWithId {
    record_id: String,
    token_hash: String,
    account_id: String,
    identity: String,
    role: String,
    status: String,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

fn row_to_session(row: SessionRow, id: Uuid) -> Result<Session, DbError> {
    let account_id = Uuid::parse_str(&row.account_id)
        .map_err(|e| DbError::decode("session", format!("invalid account UUID: {e}")))?;
    Ok(Session {
        id,
        token_hash: row.token_hash,
        snapshot: SessionSnapshot {
            account_id,
            identity: row.identity,
            role: parse_role(&row.role)?,
            status: parse_status(&row.status)?,
        },
        created_at: row.created_at,
        expires_at: row.expires_at,
    })
}

impl SessionRowWithId {
    fn try_into_session(self) -> Result<Session, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::decode("session", format!("invalid UUID: {e}")))?;
        row_to_session(
            SessionRow {
                token_hash: self.token_hash,
                account_id: self.account_id,
                identity: self.identity,
                role: self.role,
                status: self.status,
                expires_at: self.expires_at,
                created_at: self.created_at,
            },
            id,
        )
    }
}

/// SurrealDB implementation of the session store.
///
/// Only the SHA-256 hash of each token is persisted.
#[derive(Clone)]
pub struct SurrealSessionRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealSessionRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> SessionRepository for SurrealSessionRepository<C> {
    async fn create(&self, input: CreateSession) -> WardenResult<Session> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let snapshot = input.snapshot;

        let result = self
            .db
            .query(
                "CREATE type::record('session', $id) SET \
                 token_hash = $token_hash, \
                 account_id = $account_id, \
                 identity = $identity, \
                 role = $role, \
                 status = $status, \
                 expires_at = $expires_at",
            )
            .bind(("id", id_str.clone()))
            .bind(("token_hash", input.token_hash))
            .bind(("account_id", snapshot.account_id.to_string()))
            .bind(("identity", snapshot.identity))
            .bind(("role", snapshot.role.as_str().to_string()))
            .bind(("status", snapshot.status.as_str().to_string()))
            .bind(("expires_at", input.expires_at))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<SessionRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "session".into(),
            id: id_str,
        })?;

        row_to_session(row, id).map_err(Into::into)
    }

    async fn get_by_token_hash(&self, token_hash: &str) -> WardenResult<Session> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM session \
                 WHERE token_hash = $token_hash",
            )
            .bind(("token_hash", token_hash.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SessionRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "session".into(),
            // Never echo the hash into errors or logs.
            id: "token_hash=<redacted>".into(),
        })?;

        row.try_into_session().map_err(Into::into)
    }

    async fn delete_by_token_hash(&self, token_hash: &str) -> WardenResult<()> {
        self.db
            .query("DELETE session WHERE token_hash = $token_hash")
            .bind(("token_hash", token_hash.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn cleanup_expired(&self, now: DateTime<Utc>) -> WardenResult<u64> {
        let result = self
            .db
            .query("DELETE session WHERE expires_at <= $now RETURN BEFORE")
            .bind(("now", now))
            .await
            .map_err(DbError::from)?;
        let mut result = result.check().map_err(DbError::from)?;

        let removed: Vec<SessionRow> = result.take(0).map_err(DbError::from)?;
        Ok(removed.len() as u64)
    }
}
