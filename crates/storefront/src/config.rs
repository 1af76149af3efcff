//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `FOODHUB_DATABASE_URL` - `PostgreSQL` connection string for session storage
//!   (falls back to `DATABASE_URL`)
//! - `FOODHUB_BASE_URL` - Public URL for the storefront
//! - `FOODHUB_SESSION_SECRET` - Session signing secret (min 32 chars, high entropy)
//! - `FOODHUB_BACKEND_URL` - Base URL of the remote food ordering actor
//! - `IDENTITY_PROVIDER_URL` - Base URL of the identity provider
//! - `IDENTITY_CLIENT_ID` - Client ID registered with the identity provider
//! - `IDENTITY_CLIENT_SECRET` - Client secret registered with the identity provider
//!
//! ## Optional
//! - `FOODHUB_HOST` - Bind address (default: 127.0.0.1)
//! - `FOODHUB_PORT` - Listen port (default: 3000)
//! - `FOODHUB_BACKEND_PROBE_SECS` - Interval between backend connection probes (default: 5)
//! - `FOODHUB_QUERY_STALE_SECS` - How long a fetched query stays fresh (default: 30)
//! - `FOODHUB_SCOPE_IDLE_SECS` - Idle time before a user's query scope is dropped (default: 1800)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

const MIN_SESSION_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Session signing secret
    pub session_secret: SecretString,
    /// Remote actor settings
    pub backend: BackendConfig,
    /// Identity provider settings
    pub identity: IdentityConfig,
    /// Data-sync cache settings
    pub sync: SyncConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Remote actor configuration.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL; calls go to `{url}/api/{method}`.
    pub url: Url,
    /// Delay between connection probes while the backend is unreachable.
    pub probe_interval: Duration,
}

/// Identity provider configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct IdentityConfig {
    /// Identity provider base URL
    pub provider_url: Url,
    /// Registered client ID
    pub client_id: String,
    /// Registered client secret (server-side only)
    pub client_secret: SecretString,
}

impl std::fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("provider_url", &self.provider_url.as_str())
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

/// Query cache tuning.
#[derive(Debug, Clone, Copy)]
pub struct SyncConfig {
    /// How long a fetched value is served without refetching.
    pub stale_time: Duration,
    /// Idle time after which a user's query scope is evicted.
    pub scope_idle: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            stale_time: Duration::from_secs(30),
            scope_idle: Duration::from_secs(30 * 60),
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("FOODHUB_DATABASE_URL")?;
        let host = parse_env("FOODHUB_HOST", "127.0.0.1")?;
        let port = parse_env("FOODHUB_PORT", "3000")?;
        let base_url = get_required_env("FOODHUB_BASE_URL")?;
        let session_secret = get_validated_secret("FOODHUB_SESSION_SECRET")?;
        validate_session_secret(&session_secret, "FOODHUB_SESSION_SECRET")?;

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            session_secret,
            backend: BackendConfig::from_env()?,
            identity: IdentityConfig::from_env()?,
            sync: SyncConfig::from_env()?,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Identity provider callback URL for this storefront.
    #[must_use]
    pub fn login_callback_url(&self) -> String {
        format!("{}/auth/callback", self.base_url.trim_end_matches('/'))
    }
}

impl BackendConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            url: get_required_url("FOODHUB_BACKEND_URL")?,
            probe_interval: Duration::from_secs(parse_env("FOODHUB_BACKEND_PROBE_SECS", "5")?),
        })
    }
}

impl IdentityConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            provider_url: get_required_url("IDENTITY_PROVIDER_URL")?,
            client_id: get_required_env("IDENTITY_CLIENT_ID")?,
            client_secret: get_validated_secret("IDENTITY_CLIENT_SECRET")?,
        })
    }
}

impl SyncConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            stale_time: Duration::from_secs(parse_env("FOODHUB_QUERY_STALE_SECS", "30")?),
            scope_idle: Duration::from_secs(parse_env("FOODHUB_SCOPE_IDLE_SECS", "1800")?),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a required environment variable and parse it as an absolute URL.
fn get_required_url(key: &str) -> Result<Url, ConfigError> {
    let raw = get_required_env(key)?;
    Url::parse(&raw).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Validate that a session secret meets minimum length requirements.
fn validate_session_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_SESSION_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_SESSION_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}
