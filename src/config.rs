//! Runtime configuration.
//!
//! Settings come from `PROJECTDESK_*` environment variables, optionally
//! seeded from a `.env` file. Tests build configurations from an explicit
//! lookup closure instead of the process environment.

use std::time::Duration;
use thiserror::Error;

/// Environment variable holding the `PostgreSQL` connection URL.
pub const DATABASE_URL_VAR: &str = "PROJECTDESK_DATABASE_URL";
/// Environment variable holding the connection pool size.
pub const POOL_MAX_SIZE_VAR: &str = "PROJECTDESK_POOL_MAX_SIZE";
/// Environment variable holding the cancellation cascade bound in
/// milliseconds.
pub const CASCADE_TIMEOUT_VAR: &str = "PROJECTDESK_CASCADE_TIMEOUT_MS";
/// Environment variable selecting the credential comparison scheme.
pub const CREDENTIAL_SCHEME_VAR: &str = "PROJECTDESK_CREDENTIAL_SCHEME";
/// Environment variable holding the tracing filter directive.
pub const LOG_FILTER_VAR: &str = "PROJECTDESK_LOG";

const DEFAULT_POOL_MAX_SIZE: u32 = 8;
const DEFAULT_CASCADE_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_LOG_FILTER: &str = "info";

/// How stored credential secrets are compared with presented ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CredentialScheme {
    /// Secrets are stored and compared verbatim.
    ///
    /// This mirrors the legacy behaviour and is a known weakness: anyone who
    /// can read the `users` table can read every password.
    #[default]
    Plaintext,
    /// Secrets are stored as lowercase hex SHA-256 digests.
    Sha256,
}

impl CredentialScheme {
    /// Returns the canonical configuration value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Plaintext => "plaintext",
            Self::Sha256 => "sha256",
        }
    }
}

impl TryFrom<&str> for CredentialScheme {
    type Error = ConfigError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "plaintext" => Ok(Self::Plaintext),
            "sha256" => Ok(Self::Sha256),
            _ => Err(ConfigError::InvalidValue {
                variable: CREDENTIAL_SCHEME_VAR,
                value: value.to_owned(),
            }),
        }
    }
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable held a value that could not be parsed.
    #[error("invalid value '{value}' for {variable}")]
    InvalidValue {
        /// Variable name.
        variable: &'static str,
        /// Offending raw value.
        value: String,
    },

    /// A `.env` file exists but could not be read.
    #[error("failed to load .env file: {0}")]
    DotEnv(#[from] dotenvy::Error),
}

/// Settings for a projectdesk deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeskConfig {
    /// `PostgreSQL` URL; `None` selects the in-memory adapters.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub pool_max_size: u32,
    /// Upper bound on a single cancellation cascade transaction.
    pub cascade_timeout: Duration,
    /// Credential comparison scheme.
    pub credential_scheme: CredentialScheme,
    /// Tracing filter directive, e.g. `info` or `projectdesk=debug`.
    pub log_filter: String,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            pool_max_size: DEFAULT_POOL_MAX_SIZE,
            cascade_timeout: Duration::from_millis(DEFAULT_CASCADE_TIMEOUT_MS),
            credential_scheme: CredentialScheme::default(),
            log_filter: DEFAULT_LOG_FILTER.to_owned(),
        }
    }
}

impl DeskConfig {
    /// Loads configuration from the process environment.
    ///
    /// A `.env` file in the working directory, when present, is applied first
    /// without overriding variables that are already set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the `.env` file is unreadable or a
    /// variable holds an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!(path = %path.display(), "loaded .env file"),
            Err(err) if err.not_found() => {}
            Err(err) => return Err(ConfigError::DotEnv(err)),
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds configuration from an arbitrary variable lookup.
    ///
    /// Unset or blank variables fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when a variable cannot be
    /// parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };
        let defaults = Self::default();

        let pool_max_size = match read(POOL_MAX_SIZE_VAR) {
            Some(raw) => parse_positive(POOL_MAX_SIZE_VAR, &raw)?,
            None => defaults.pool_max_size,
        };
        let cascade_timeout = match read(CASCADE_TIMEOUT_VAR) {
            Some(raw) => Duration::from_millis(parse_positive(CASCADE_TIMEOUT_VAR, &raw)?),
            None => defaults.cascade_timeout,
        };
        let credential_scheme = match read(CREDENTIAL_SCHEME_VAR) {
            Some(raw) => CredentialScheme::try_from(raw.as_str())?,
            None => defaults.credential_scheme,
        };

        Ok(Self {
            database_url: read(DATABASE_URL_VAR),
            pool_max_size,
            cascade_timeout,
            credential_scheme,
            log_filter: read(LOG_FILTER_VAR).unwrap_or(defaults.log_filter),
        })
    }
}

fn parse_positive<T>(variable: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    raw.parse::<T>()
        .ok()
        .filter(|value| *value > T::default())
        .ok_or_else(|| ConfigError::InvalidValue {
            variable,
            value: raw.to_owned(),
        })
}
