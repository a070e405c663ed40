//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `MANGAVERSE_API_URL` - External API base URL (default: `http://localhost:5000/api`)
//! - `MANGAVERSE_SITE_URL` - Public URL of this storefront (default: `http://localhost:3000`)
//! - `MANGAVERSE_HOST` - Bind address (default: 127.0.0.1)
//! - `MANGAVERSE_PORT` - Listen port (default: 3000)
//! - `MANGAVERSE_DATA_DIR` - Local storage directory (default: `.mangaverse`)
//! - `MANGAVERSE_HTTP_TIMEOUT_SECS` - API request timeout (default: 15)
//! - `SMTP_HOST` - Mail relay (default: smtp.gmail.com)
//! - `SMTP_PORT` - Mail relay port (default: 587)
//! - `SMTP_USERNAME`, `SMTP_PASSWORD`, `SMTP_FROM` - Mail credentials; set
//!   all three to enable email
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
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

/// Storefront configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL of this storefront
    pub site_url: Url,
    /// External API client settings
    pub api: ApiConfig,
    /// Directory backing the local storage adapter
    pub data_dir: PathBuf,
    /// Mail relay settings, when email sending is enabled
    pub smtp: Option<SmtpConfig>,
    pub sentry_dsn: Option<String>,
}

/// External API client settings.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: Url,
    pub timeout: Duration,
}

/// SMTP relay settings.
#[derive(Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: SecretString,
    /// Sender mailbox, e.g. `MangaVerse <no-reply@mangaverse.io>`
    pub from: String,
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("from", &self.from)
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from the process environment (and `.env`, if present).
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let host = env.parsed("MANGAVERSE_HOST", "127.0.0.1")?;
        let port = env.parsed("MANGAVERSE_PORT", "3000")?;
        let site_url = env.url("MANGAVERSE_SITE_URL", "http://localhost:3000")?;
        let api = ApiConfig {
            base_url: env.url("MANGAVERSE_API_URL", "http://localhost:5000/api")?,
            timeout: Duration::from_secs(env.parsed("MANGAVERSE_HTTP_TIMEOUT_SECS", "15")?),
        };
        let data_dir = PathBuf::from(env.or_default("MANGAVERSE_DATA_DIR", ".mangaverse"));
        let smtp = SmtpConfig::from_env(&env)?;
        let sentry_dsn = env.optional("SENTRY_DSN");

        Ok(Self {
            host,
            port,
            site_url,
            api,
            data_dir,
            smtp,
            sentry_dsn,
        })
    }

    /// Get the socket address for binding.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl SmtpConfig {
    fn from_env(env: &Env<'_>) -> Result<Option<Self>, ConfigError> {
        let credentials = ["SMTP_USERNAME", "SMTP_PASSWORD", "SMTP_FROM"];
        if credentials.iter().all(|key| env.optional(key).is_none()) {
            return Ok(None);
        }

        let password = env.required("SMTP_PASSWORD")?;
        reject_placeholder(&password, "SMTP_PASSWORD")?;

        Ok(Some(Self {
            host: env.or_default("SMTP_HOST", "smtp.gmail.com"),
            port: env.parsed("SMTP_PORT", "587")?,
            username: env.required("SMTP_USERNAME")?,
            password: SecretString::from(password),
            from: env.required("SMTP_FROM")?,
        }))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Variable source. Blank values count as unset.
struct Env<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Env<'_> {
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    fn parsed<T>(&self, key: &str, default: &str) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.or_default(key, default)
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    }

    fn url(&self, key: &str, default: &str) -> Result<Url, ConfigError> {
        let url: Url = self.parsed(key, default)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidEnvVar(
                key.to_string(),
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }
        Ok(url)
    }
}

fn reject_placeholder(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.api.base_url.as_str(), "http://localhost:5000/api");
        assert_eq!(config.site_url.as_str(), "http://localhost:3000/");
        assert_eq!(config.api.timeout, Duration::from_secs(15));
        assert_eq!(config.data_dir, PathBuf::from(".mangaverse"));
        assert!(config.smtp.is_none());
        assert!(config.sentry_dsn.is_none());

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("MANGAVERSE_API_URL", "https://api.mangaverse.io/api"),
            ("MANGAVERSE_PORT", "8080"),
            ("MANGAVERSE_HTTP_TIMEOUT_SECS", "3"),
            ("SENTRY_DSN", "https://key@sentry.io/1"),
        ])
        .unwrap();
        assert_eq!(config.api.base_url.host_str(), Some("api.mangaverse.io"));
        assert_eq!(config.port, 8080);
        assert_eq!(config.api.timeout, Duration::from_secs(3));
        assert!(config.sentry_dsn.is_some());
    }

    #[test]
    fn test_invalid_port() {
        let err = load(&[("MANGAVERSE_PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "MANGAVERSE_PORT"));
    }

    #[test]
    fn test_rejects_non_http_api_url() {
        let err = load(&[("MANGAVERSE_API_URL", "ftp://files.example.com")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_smtp_requires_all_credentials() {
        let err = load(&[("SMTP_USERNAME", "shop@mangaverse.io")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref key) if key == "SMTP_PASSWORD"));
    }

    #[test]
    fn test_smtp_placeholder_rejected() {
        let err = load(&[
            ("SMTP_USERNAME", "shop@mangaverse.io"),
            ("SMTP_PASSWORD", "your-app-password"),
            ("SMTP_FROM", "MangaVerse <shop@mangaverse.io>"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_smtp_config_debug_redacts_password() {
        let config = load(&[
            ("SMTP_USERNAME", "shop@mangaverse.io"),
            ("SMTP_PASSWORD", "qk7Zr2LmW9vT4nBx"),
            ("SMTP_FROM", "MangaVerse <shop@mangaverse.io>"),
        ])
        .unwrap();
        let smtp = config.smtp.unwrap();
        assert_eq!(smtp.host, "smtp.gmail.com");
        assert_eq!(smtp.port, 587);
        assert_eq!(smtp.password.expose_secret(), "qk7Zr2LmW9vT4nBx");

        let debug_output = format!("{smtp:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("qk7Zr2LmW9vT4nBx"));
    }
}
