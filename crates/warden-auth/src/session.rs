//! Session lifecycle: issue, resolve, destroy, and expired-session
//! housekeeping.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, warn};
use warden_core::error::{WardenError, WardenResult};
use warden_core::models::session::{CreateSession, SessionSnapshot};
use warden_core::repository::SessionRepository;

use crate::error::AuthError;
use crate::token::{self, SessionToken};

/// A freshly issued session.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: SessionToken,
    pub expires_at: DateTime<Utc>,
}

/// Issues and validates sessions against a [`SessionRepository`].
///
/// Expiry is absolute (creation + TTL) and is checked on every
/// [`resolve`](Self::resolve); the periodic sweep only reclaims space.
pub struct SessionManager<S: SessionRepository> {
    repo: S,
    ttl: Duration,
}

/// Longest session lifetime accepted from configuration (30 days).
pub const MAX_SESSION_TTL_SECS: u64 = 30 * 24 * 60 * 60;

/// Convert a configured TTL into a duration, rejecting values above
/// [`MAX_SESSION_TTL_SECS`].
fn ttl_from_secs(ttl_secs: u64) -> WardenResult<Duration> {
    let out_of_range = || WardenError::Validation {
        message: format!(
            "session TTL of {ttl_secs}s exceeds the maximum of {MAX_SESSION_TTL_SECS}s"
        ),
    };

    if ttl_secs > MAX_SESSION_TTL_SECS {
        return Err(out_of_range());
    }
    let secs = i64::try_from(ttl_secs).map_err(|_| out_of_range())?;
    Duration::try_seconds(secs).ok_or_else(out_of_range)
}

fn expiry_after(now: DateTime<Utc>, ttl: Duration) -> WardenResult<DateTime<Utc>> {
    now.checked_add_signed(ttl)
        .ok_or_else(|| WardenError::Internal("session expiry overflows the calendar".into()))
}

impl<S: SessionRepository> SessionManager<S> {
    /// Fails with `Validation` if `ttl_secs` is above
    /// [`MAX_SESSION_TTL_SECS`].
    pub fn new(repo: S, ttl_secs: u64) -> WardenResult<Self> {
        Ok(Self {
            repo,
            ttl: ttl_from_secs(ttl_secs)?,
        })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Create a session bound to `snapshot`, expiring `ttl` from now.
    pub async fn issue(&self, snapshot: SessionSnapshot) -> WardenResult<IssuedSession> {
        let token = token::generate_session_token();
        let expires_at = expiry_after(Utc::now(), self.ttl)?;
        let account_id = snapshot.account_id;

        let session = self
            .repo
            .create(CreateSession {
                token_hash: token::hash_session_token(&token),
                snapshot,
                expires_at,
            })
            .await?;

        debug!(session_id = %session.id, %account_id, %expires_at, "Session issued");

        Ok(IssuedSession { token, expires_at })
    }

    /// Look up the snapshot bound to `token`.
    ///
    /// An expired session is deleted on the spot and reported as
    /// [`AuthError::ExpiredSession`]; it is never honored.
    pub async fn resolve(&self, token: &SessionToken) -> Result<SessionSnapshot, AuthError> {
        let token_hash = token::hash_session_token(token);

        let session = match self.repo.get_by_token_hash(&token_hash).await {
            Ok(session) => session,
            Err(WardenError::NotFound { .. }) => return Err(AuthError::MissingSession),
            Err(e) => return Err(e.into()),
        };

        if session.is_expired_at(Utc::now()) {
            if let Err(e) = self.repo.delete_by_token_hash(&token_hash).await {
                warn!(session_id = %session.id, error = %e, "Failed to purge expired session");
            }
            debug!(session_id = %session.id, "Rejected expired session");
            return Err(AuthError::ExpiredSession);
        }

        Ok(session.snapshot)
    }

    /// Remove the session for `token`. Unknown tokens are ignored.
    pub async fn destroy(&self, token: &SessionToken) -> WardenResult<()> {
        self.repo
            .delete_by_token_hash(&token::hash_session_token(token))
            .await
    }

    /// Delete every session that has already expired.
    pub async fn purge_expired(&self) -> WardenResult<u64> {
        self.repo.cleanup_expired(Utc::now()).await
    }
}

/// Spawn a background task that purges expired sessions every
/// `period`.
///
/// Returns the task handle; abort it to stop sweeping.
pub fn spawn_sweeper<S>(manager: Arc<SessionManager<S>>, period: StdDuration) -> JoinHandle<()>
where
    S: SessionRepository + 'static,
{
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            match manager.purge_expired().await {
                Ok(0) => {}
                Ok(purged) => debug!(purged, "Purged expired sessions"),
                Err(e) => warn!(error = %e, "Session sweep failed"),
            }
        }
    })
}
