//! Process configuration: built-in defaults overlaid by `WARDEN_*`
//! environment variables.
//!
//! Nested keys use a double underscore, e.g. `WARDEN_DB__URL` or
//! `WARDEN_AUTH__SESSION_TTL_SECS`.

use std::time::Duration;

use config::{Config, ConfigError, Environment};
use serde::Deserialize;
use warden_auth::AuthConfig;
use warden_db::DbConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct DbSettings {
    pub url: String,
    pub namespace: String,
    pub database: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    pub session_ttl_secs: u64,
    pub min_password_length: usize,
    pub pepper: Option<String>,
    pub argon2_memory_kib: u32,
    pub argon2_iterations: u32,
    pub argon2_parallelism: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub db: DbSettings,
    pub auth: AuthSettings,
    /// Seconds between expired-session sweeps.
    pub sweep_interval_secs: u64,
}

impl Settings {
    /// Load from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::build(Environment::with_prefix("WARDEN"))
    }

    fn build(env: Environment) -> Result<Self, ConfigError> {
        let db = DbConfig::default();
        let auth = AuthConfig::default();

        let cfg = Config::builder()
            .set_default("db.url", db.url)?
            .set_default("db.namespace", db.namespace)?
            .set_default("db.database", db.database)?
            .set_default("db.username", db.username)?
            .set_default("db.password", db.password)?
            .set_default("auth.session_ttl_secs", auth.session_ttl_secs)?
            .set_default("auth.min_password_length", auth.min_password_length as u64)?
            .set_default("auth.argon2_memory_kib", auth.argon2_memory_kib)?
            .set_default("auth.argon2_iterations", auth.argon2_iterations)?
            .set_default("auth.argon2_parallelism", auth.argon2_parallelism)?
            .set_default("sweep_interval_secs", 60)?
            .add_source(env.prefix_separator("_").separator("__"))
            .build()?;

        cfg.try_deserialize()
    }

    /// Load from an explicit variable map instead of the process
    /// environment.
    #[cfg(test)]
    pub fn from_vars(vars: std::collections::HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::build(Environment::with_prefix("WARDEN").source(Some(vars)))
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig {
            url: self.db.url.clone(),
            namespace: self.db.namespace.clone(),
            database: self.db.database.clone(),
            username: self.db.username.clone(),
            password: self.db.password.clone(),
        }
    }

    pub fn auth_config(&self) -> AuthConfig {
        AuthConfig {
            session_ttl_secs: self.auth.session_ttl_secs,
            min_password_length: self.auth.min_password_length,
            pepper: self.auth.pepper.clone(),
            argon2_memory_kib: self.auth.argon2_memory_kib,
            argon2_iterations: self.auth.argon2_iterations,
            argon2_parallelism: self.auth.argon2_parallelism,
        }
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_without_overrides() {
        let settings = Settings::from_vars(HashMap::new()).unwrap();

        let auth = settings.auth_config();
        assert_eq!(auth.session_ttl_secs, 1200);
        assert_eq!(auth.min_password_length, 8);
        assert_eq!(auth.argon2_memory_kib, 19456);
        assert!(auth.pepper.is_none());

        let db = settings.db_config();
        assert_eq!(db.namespace, "warden");
        assert_eq!(db.url, "127.0.0.1:8000");

        assert_eq!(settings.sweep_interval(), Duration::from_secs(60));
    }

    #[test]
    fn environment_overrides_nested_keys() {
        let settings = Settings::from_vars(vars(&[
            ("WARDEN_DB__URL", "db.internal:8000"),
            ("WARDEN_AUTH__SESSION_TTL_SECS", "300"),
            ("WARDEN_AUTH__PEPPER", "s3cret-pepper"),
            ("WARDEN_SWEEP_INTERVAL_SECS", "15"),
        ]))
        .unwrap();

        assert_eq!(settings.db_config().url, "db.internal:8000");
        assert_eq!(settings.auth_config().session_ttl_secs, 300);
        assert_eq!(settings.auth_config().pepper.as_deref(), Some("s3cret-pepper"));
        assert_eq!(settings.sweep_interval(), Duration::from_secs(15));
    }

    #[test]
    fn zero_sweep_interval_is_clamped() {
        let settings =
            Settings::from_vars(vars(&[("WARDEN_SWEEP_INTERVAL_SECS", "0")])).unwrap();
        assert_eq!(settings.sweep_interval(), Duration::from_secs(1));
    }

    #[test]
    fn malformed_number_is_rejected() {
        let result = Settings::from_vars(vars(&[("WARDEN_AUTH__SESSION_TTL_SECS", "soon")]));
        assert!(result.is_err());
    }
}
