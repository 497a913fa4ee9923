//! Site configuration loaded from environment variables.
//!
//! Every variable has a fallback so a bare checkout starts without any
//! setup. Fallback secrets are reported by [`SiteConfig::secret_warnings`]
//! and logged at startup.
//!
//! # Environment Variables
//!
//! - `HOST` - Bind address (default: 0.0.0.0)
//! - `PORT` - Listen port (default: 3000)
//! - `BASE_URL` - Public URL of the site (default: `http://localhost:{PORT}`)
//! - `ADMIN_PASSWORD` - Shared admin password (default: `admin123`)
//! - `SESSION_SECRET` - Session cookie signing secret (default: `otechestvo-secret-key`)
//! - `DATA_DIR` - Directory holding `news.json` (default: `data`)
//! - `STATIC_DIR` - Directory with the static pages (default: `public`)
//! - `VK_ACCESS_TOKEN` - VK API token; the wall mirror is disabled without it
//! - `VK_GROUP_ID` - VK community id (default: 224887019)
//! - `VK_API_BASE` - VK API endpoint (default: `https://api.vk.com/method`)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 1.0)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";
pub const DEFAULT_SESSION_SECRET: &str = "otechestvo-secret-key";
pub const DEFAULT_VK_GROUP_ID: u64 = 224_887_019;
pub const DEFAULT_VK_API_BASE: &str = "https://api.vk.com/method";
pub const VK_API_VERSION: &str = "5.131";

const MIN_SESSION_SECRET_LENGTH: usize = 32;
const MIN_ADMIN_PASSWORD_LENGTH: usize = 8;
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
    "insert",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Site configuration.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL of the site
    pub base_url: String,
    /// Shared admin password
    pub admin_password: SecretString,
    /// Session signing secret
    pub session_secret: SecretString,
    /// Directory holding the news file
    pub data_dir: PathBuf,
    /// Directory with static pages, styles and scripts
    pub static_dir: PathBuf,
    /// VK wall mirror configuration
    pub vk: VkConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate
    pub sentry_sample_rate: f32,
    /// Sentry transaction sample rate
    pub sentry_traces_sample_rate: f32,
}

/// VK API configuration.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone)]
pub struct VkConfig {
    /// Access token; `None` disables the wall mirror
    pub access_token: Option<SecretString>,
    /// Community id (the wall owner is `-group_id`)
    pub group_id: u64,
    /// Base URL of the API methods
    pub api_base: String,
}

impl std::fmt::Debug for VkConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VkConfig")
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("group_id", &self.group_id)
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl SiteConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unparseable value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let host = env.parsed_or_default("HOST", "0.0.0.0")?;
        let port = env.parsed_or_default("PORT", "3000")?;
        let base_url = env
            .optional("BASE_URL")
            .unwrap_or_else(|| format!("http://localhost:{port}"));
        let admin_password =
            SecretString::from(env.or_default("ADMIN_PASSWORD", DEFAULT_ADMIN_PASSWORD));
        let session_secret =
            SecretString::from(env.or_default("SESSION_SECRET", DEFAULT_SESSION_SECRET));
        let data_dir = PathBuf::from(env.or_default("DATA_DIR", "data"));
        let static_dir = PathBuf::from(env.or_default("STATIC_DIR", "public"));

        let vk = VkConfig {
            access_token: env
                .optional("VK_ACCESS_TOKEN")
                .filter(|t| !t.trim().is_empty())
                .map(SecretString::from),
            group_id: env.parsed_or_default("VK_GROUP_ID", &DEFAULT_VK_GROUP_ID.to_string())?,
            api_base: env.or_default("VK_API_BASE", DEFAULT_VK_API_BASE),
        };

        let sentry_dsn = env.optional("SENTRY_DSN");
        let sentry_environment = env.optional("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = env
            .optional("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = env
            .optional("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            host,
            port,
            base_url,
            admin_password,
            session_secret,
            data_dir,
            static_dir,
            vk,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }

    /// Describe every secret that is a fallback default or looks weak.
    ///
    /// The site still starts with such secrets; callers log the warnings.
    #[must_use]
    pub fn secret_warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        let password = self.admin_password.expose_secret();
        if password == DEFAULT_ADMIN_PASSWORD {
            warnings.push("ADMIN_PASSWORD is not set, using the built-in default".to_string());
        } else if password.chars().count() < MIN_ADMIN_PASSWORD_LENGTH {
            warnings.push(format!(
                "ADMIN_PASSWORD is shorter than {MIN_ADMIN_PASSWORD_LENGTH} characters"
            ));
        }

        if self.session_secret.expose_secret() == DEFAULT_SESSION_SECRET {
            warnings.push("SESSION_SECRET is not set, using the built-in default".to_string());
        } else {
            let checks = [
                validate_session_secret(&self.session_secret, "SESSION_SECRET"),
                validate_secret_strength(self.session_secret.expose_secret(), "SESSION_SECRET"),
            ];
            warnings.extend(checks.into_iter().filter_map(Result::err).map(|e| e.to_string()));
        }

        if self.vk.access_token.is_none() {
            warnings.push("VK_ACCESS_TOKEN is not set, the VK wall mirror is disabled".to_string());
        }

        warnings
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Variable lookup with the usual default/parse helpers.
struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Get an optional variable.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key)
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Get a variable with a default value and parse it.
    fn parsed_or_default<T>(&self, key: &str, default: &str) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.or_default(key, default)
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    }
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
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
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
