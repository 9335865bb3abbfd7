//! Site configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `STAYS_HOST` - Bind address (default: 127.0.0.1)
//! - `STAYS_PORT` - Listen port (default: 3000)
//! - `STAYS_STORE` - Storage backend, `file` or `postgres` (default: file)
//! - `STAYS_DATA_DIR` - Directory for the JSON file store (default: ./data)
//! - `STAYS_DATABASE_URL` - `PostgreSQL` connection string, falls back to
//!   `DATABASE_URL`; required when `STAYS_STORE=postgres`
//! - `STAYS_ADMIN_EMAIL` - Seed value for the `admin_email` setting
//!   (default: admin@rentinrjukan.com)
//! - `STAYS_STATIC_DIR` - Stylesheet directory (default: crates/site/static)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use secrecy::SecretString;
use thiserror::Error;

/// Default value for the `admin_email` setting on a fresh store.
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@rentinrjukan.com";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Which storage backend the site runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    /// JSON documents in a data directory.
    File,
    /// A `PostgreSQL` database.
    Postgres,
}

impl FromStr for StoreKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" | "json" => Ok(Self::File),
            "postgres" | "postgresql" | "sql" => Ok(Self::Postgres),
            other => Err(format!("expected `file` or `postgres`, got `{other}`")),
        }
    }
}

/// Storage settings.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Selected backend
    pub kind: StoreKind,
    /// Data directory for the file store
    pub data_dir: PathBuf,
    /// `PostgreSQL` URL (contains password); present when `kind` is `Postgres`
    pub database_url: Option<SecretString>,
    /// Seed value for the `admin_email` setting
    pub admin_email: String,
}

/// Site application configuration.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Storage backend settings
    pub store: StoreConfig,
    /// Directory served under `/static`
    pub static_dir: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl SiteConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is invalid, or if the `PostgreSQL`
    /// backend is selected without a database URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// See [`SiteConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let host = env.parsed("STAYS_HOST", "127.0.0.1")?;
        let port = env.parsed("STAYS_PORT", "3000")?;
        let store = StoreConfig::from_lookup(&env)?;
        let static_dir = PathBuf::from(env.or_default("STAYS_STATIC_DIR", "crates/site/static"));

        Ok(Self {
            host,
            port,
            store,
            static_dir,
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl StoreConfig {
    /// Load only the storage settings from the environment.
    ///
    /// Used by tools that open the store without serving HTTP.
    ///
    /// # Errors
    ///
    /// See [`SiteConfig::from_env`].
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        let lookup = |key: &str| std::env::var(key).ok();
        Self::from_lookup(&Env(&lookup))
    }

    fn from_lookup(env: &Env<'_>) -> Result<Self, ConfigError> {
        let kind: StoreKind = env.parsed("STAYS_STORE", "file")?;
        let database_url = env
            .optional("STAYS_DATABASE_URL")
            .or_else(|| env.optional("DATABASE_URL"))
            .map(SecretString::from);

        if kind == StoreKind::Postgres && database_url.is_none() {
            return Err(ConfigError::MissingEnvVar("STAYS_DATABASE_URL".to_string()));
        }

        Ok(Self {
            kind,
            data_dir: PathBuf::from(env.or_default("STAYS_DATA_DIR", "./data")),
            database_url,
            admin_email: env.or_default("STAYS_ADMIN_EMAIL", DEFAULT_ADMIN_EMAIL),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Env<'_> {
    /// Get an optional variable, treating blank values as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Get a variable with a default value and parse it.
    fn parsed<T>(&self, key: &str, default: &str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.or_default(key, default)
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    }
}
