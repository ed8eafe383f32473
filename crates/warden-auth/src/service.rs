//! Authentication service: registration, login, session checks and
//! logout orchestration.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};
use warden_core::error::{WardenError, WardenResult};
use warden_core::models::account::{AccountId, AccountStatus, CreateAccount};
use warden_core::models::session::SessionSnapshot;
use warden_core::repository::{AccountRepository, SessionRepository};

use crate::config::AuthConfig;
use crate::error::{AuthError, LoginError, PasswordError, RegisterError, ReissueError};
use crate::identity::normalize_identity;
use crate::password::Argon2Hasher;
use crate::session::SessionManager;
use crate::token::SessionToken;

/// Plaintext hashed once per service to give unknown identities a real
/// hash to verify against.
const TIMING_DUMMY_PASSWORD: &str = "warden-timing-equalizer";

/// Successful login result.
#[derive(Debug, Clone)]
pub struct LoginOutput {
    /// Opaque session token (return to client, only its hash is stored).
    pub token: SessionToken,
    /// Account fields captured into the session.
    pub snapshot: SessionSnapshot,
    /// Session lifetime in seconds.
    pub expires_in: u64,
}

/// Authentication service.
///
/// Generic over repository implementations so that the auth layer
/// has no dependency on the database crate.
pub struct AuthService<A: AccountRepository, S: SessionRepository> {
    accounts: A,
    sessions: Arc<SessionManager<S>>,
    hasher: Argon2Hasher,
    config: AuthConfig,
    dummy_hash: OnceCell<String>,
}

impl<A: AccountRepository, S: SessionRepository> AuthService<A, S> {
    /// Build the service. Fails if the Argon2 cost parameters or the
    /// session TTL in `config` are out of range.
    pub fn new(accounts: A, session_repo: S, config: AuthConfig) -> WardenResult<Self> {
        let hasher = Argon2Hasher::from_config(&config)?;
        let sessions = Arc::new(SessionManager::new(session_repo, config.session_ttl_secs)?);
        Ok(Self {
            accounts,
            sessions,
            hasher,
            config,
            dummy_hash: OnceCell::new(),
        })
    }

    /// Shared handle to the session manager, e.g. for the sweeper task.
    pub fn session_manager(&self) -> Arc<SessionManager<S>> {
        Arc::clone(&self.sessions)
    }

    /// Create an account (role `User`, status `Active`).
    pub async fn register(
        &self,
        raw_identity: &str,
        raw_password: &str,
    ) -> Result<AccountId, RegisterError> {
        // 1. Normalize identity.
        let identity = normalize_identity(raw_identity);
        if identity.is_empty() {
            return Err(RegisterError::EmptyIdentity);
        }

        // 2. Password policy.
        let min_length = self.config.min_password_length;
        if raw_password.chars().count() < min_length {
            return Err(RegisterError::WeakPassword { min_length });
        }

        // 3. Hash off the async workers.
        let password_hash = self.hasher.hash_blocking(raw_password.to_owned()).await?;

        // 4. Insert; the store's unique index decides duplicates.
        let account = self
            .accounts
            .create(CreateAccount {
                identity,
                password_hash,
            })
            .await?;

        info!(account_id = %account.id, "Account registered");

        Ok(account.id)
    }

    /// Verify credentials and open a session.
    ///
    /// Unknown identity and wrong password both yield
    /// [`LoginError::InvalidCredentials`].
    pub async fn login(
        &self,
        raw_identity: &str,
        raw_password: &str,
    ) -> Result<LoginOutput, LoginError> {
        // 1. Normalize identically to registration.
        let identity = normalize_identity(raw_identity);

        // 2. Look up the account.
        let account = match self.accounts.get_by_identity(&identity).await {
            Ok(account) => account,
            Err(WardenError::NotFound { .. }) => {
                // Same hashing cost as a real account so response time
                // does not reveal whether the identity exists.
                let dummy = self.dummy_hash().await?;
                let _ = self
                    .hasher
                    .verify_blocking(raw_password.to_owned(), dummy)
                    .await;
                debug!("Login rejected: unknown identity");
                return Err(LoginError::InvalidCredentials);
            }
            Err(e) => return Err(e.into()),
        };

        // 3. Blocked accounts are told so.
        if account.status == AccountStatus::Blocked {
            info!(account_id = %account.id, "Login rejected: account blocked");
            return Err(LoginError::AccountBlocked);
        }

        // 4. Verify password.
        let valid = self
            .hasher
            .verify_blocking(raw_password.to_owned(), account.password_hash.clone())
            .await?;
        if !valid {
            debug!(account_id = %account.id, "Login rejected: wrong password");
            return Err(LoginError::InvalidCredentials);
        }

        // 5. Open a session, then record the login. A session that
        //    cannot be paired with a last-login write is withdrawn.
        let snapshot = SessionSnapshot::from(&account);
        let issued = self.sessions.issue(snapshot.clone()).await?;

        if let Err(e) = self.accounts.touch_last_login(account.id, Utc::now()).await {
            if let Err(cleanup) = self.sessions.destroy(&issued.token).await {
                warn!(account_id = %account.id, error = %cleanup, "Failed to withdraw session");
            }
            return Err(e.into());
        }

        info!(account_id = %account.id, role = %account.role, "Login succeeded");

        Ok(LoginOutput {
            token: issued.token,
            snapshot,
            expires_in: self.expires_in(),
        })
    }

    /// Resolve a session token to the snapshot captured at login.
    pub async fn authenticate(&self, token: &SessionToken) -> Result<SessionSnapshot, AuthError> {
        self.sessions.resolve(token).await
    }

    /// End the session for `token`. Unknown or already-ended tokens are
    /// accepted silently.
    pub async fn logout(&self, token: &SessionToken) -> WardenResult<()> {
        self.sessions.destroy(token).await
    }

    /// Replace a session with one carrying a fresh account snapshot.
    ///
    /// The old token stops resolving. Use after an administrative role
    /// or status change to bring the session up to date.
    pub async fn reissue(&self, token: &SessionToken) -> Result<LoginOutput, ReissueError> {
        let current = self.sessions.resolve(token).await?;

        let account = match self.accounts.get_by_id(current.account_id).await {
            Ok(account) => account,
            Err(WardenError::NotFound { .. }) => {
                self.sessions.destroy(token).await?;
                return Err(AuthError::MissingSession.into());
            }
            Err(e) => return Err(e.into()),
        };

        self.sessions.destroy(token).await?;

        if account.status == AccountStatus::Blocked {
            info!(account_id = %account.id, "Reissue rejected: account blocked");
            return Err(ReissueError::AccountBlocked);
        }

        let snapshot = SessionSnapshot::from(&account);
        let issued = self.sessions.issue(snapshot.clone()).await?;

        debug!(account_id = %account.id, role = %account.role, "Session reissued");

        Ok(LoginOutput {
            token: issued.token,
            snapshot,
            expires_in: self.expires_in(),
        })
    }

    fn expires_in(&self) -> u64 {
        self.sessions.ttl().num_seconds().unsigned_abs()
    }

    async fn dummy_hash(&self) -> Result<String, PasswordError> {
        self.dummy_hash
            .get_or_try_init(|| self.hasher.hash_blocking(TIMING_DUMMY_PASSWORD.to_owned()))
            .await
            .cloned()
    }
}
