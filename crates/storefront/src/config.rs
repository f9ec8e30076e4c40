//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Server
//! - `AURA_HOST` - Bind address (default: 127.0.0.1)
//! - `AURA_PORT` - Listen port (default: 3000)
//! - `AURA_BASE_URL` - Public URL for the storefront (default: <http://localhost:3000>)
//! - `AURA_CATALOG_PATH` - Catalog JSON file (default: crates/storefront/data/catalog.json)
//! - `AURA_SHIPPING_FEE` - Flat shipping fee in PKR (default: 99)
//!
//! ## Mail relay (enabled when `SMTP_USER` is set)
//! - `SMTP_HOST` - Relay host (default: smtp.gmail.com)
//! - `SMTP_PORT` - Relay port (default: 587)
//! - `SMTP_SECURE` - `true` for implicit TLS, anything else for STARTTLS
//! - `SMTP_USER` - Relay username
//! - `SMTP_PASS` - Relay password (required with `SMTP_USER`)
//! - `ORDER_NOTIFY_EMAIL` - Store operator inbox (required with `SMTP_USER`)
//! - `MAIL_FROM` - Sender for customer mail
//! - `MAIL_SYSTEM_FROM` - Sender for operator mail
//!
//! ## Optional
//! - `ADMIN_WHATSAPP_NUMBER` - Number orders are relayed to (default: 923360303003)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use aura_core::{Email, Price};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const DEFAULT_CATALOG_PATH: &str = "crates/storefront/data/catalog.json";
const DEFAULT_CUSTOMER_FROM: &str = "\"Aura Sentiments\" <no-reply@aurasentiments.com>";
const DEFAULT_SYSTEM_FROM: &str = "\"Store System\" <system@aurasentiments.com>";
const DEFAULT_WHATSAPP_NUMBER: &str = "923360303003";

/// Blocklist of common placeholder patterns (case-insensitive).
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "xxx",
    "todo",
    "insert",
    "put-your",
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
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Catalog document loaded at startup
    pub catalog_path: PathBuf,
    /// Flat shipping fee added to non-empty orders
    pub shipping_fee: Price,
    /// Mail relay settings, absent when mail is not configured
    pub mail: Option<MailConfig>,
    /// Message-app number orders are relayed to, digits only
    pub whatsapp_number: String,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
}

/// SMTP relay configuration.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    /// Implicit TLS when true, STARTTLS otherwise
    pub smtp_secure: bool,
    pub smtp_username: String,
    pub smtp_password: SecretString,
    /// Store operator inbox receiving order notifications
    pub notify_address: Email,
    /// Sender mailbox for customer confirmations
    pub customer_from: String,
    /// Sender mailbox for operator notifications
    pub system_from: String,
}

impl std::fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_secure", &self.smtp_secure)
            .field("smtp_username", &self.smtp_username)
            .field("smtp_password", &"[REDACTED]")
            .field("notify_address", &self.notify_address)
            .field("customer_from", &self.customer_from)
            .field("system_from", &self.system_from)
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup` instead of the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let host = env.parse_or("AURA_HOST", "127.0.0.1")?;
        let port = env.parse_or("AURA_PORT", "3000")?;
        let base_url = env.get_or("AURA_BASE_URL", "http://localhost:3000");
        url::Url::parse(&base_url)
            .map_err(|e| ConfigError::InvalidEnvVar("AURA_BASE_URL".to_string(), e.to_string()))?;
        let catalog_path = PathBuf::from(env.get_or("AURA_CATALOG_PATH", DEFAULT_CATALOG_PATH));
        let shipping_fee = Price::new(env.parse_or("AURA_SHIPPING_FEE", "99")?);

        let whatsapp_number = env.get_or("ADMIN_WHATSAPP_NUMBER", DEFAULT_WHATSAPP_NUMBER);
        if whatsapp_number.is_empty() || !whatsapp_number.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ConfigError::InvalidEnvVar(
                "ADMIN_WHATSAPP_NUMBER".to_string(),
                "must contain digits only, with country code".to_string(),
            ));
        }

        Ok(Self {
            host,
            port,
            base_url,
            catalog_path,
            shipping_fee,
            mail: MailConfig::from_env(&env)?,
            whatsapp_number,
            sentry_dsn: env.get("SENTRY_DSN"),
            sentry_environment: env.get("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the public URL is served over HTTPS.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl MailConfig {
    fn from_env(env: &Env<'_>) -> Result<Option<Self>, ConfigError> {
        let Some(smtp_username) = env.get("SMTP_USER") else {
            return Ok(None);
        };

        let smtp_password = env.required("SMTP_PASS")?;
        validate_secret_strength(&smtp_password, "SMTP_PASS")?;

        let notify_raw = env.required("ORDER_NOTIFY_EMAIL")?;
        let notify_address = Email::parse(&notify_raw).map_err(|e| {
            ConfigError::InvalidEnvVar("ORDER_NOTIFY_EMAIL".to_string(), e.to_string())
        })?;

        Ok(Some(Self {
            smtp_host: env.get_or("SMTP_HOST", "smtp.gmail.com"),
            smtp_port: env.parse_or("SMTP_PORT", "587")?,
            smtp_secure: env.get("SMTP_SECURE").as_deref() == Some("true"),
            smtp_username,
            smtp_password: SecretString::from(smtp_password),
            notify_address,
            customer_from: env.get_or("MAIL_FROM", DEFAULT_CUSTOMER_FROM),
            system_from: env.get_or("MAIL_SYSTEM_FROM", DEFAULT_SYSTEM_FROM),
        }))
    }

    /// The relay password.
    #[must_use]
    pub fn password(&self) -> &str {
        self.smtp_password.expose_secret()
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Variable lookup with the defaulting and parsing rules used above.
struct Env<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Env<'_> {
    /// A set, non-blank variable.
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.get(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    fn parse_or<T>(&self, key: &str, default: &str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.get_or(key, default)
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    }
}

/// Reject secrets that are obviously placeholders.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
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

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
        assert_eq!(config.base_url, "http://localhost:3000");
        assert_eq!(config.shipping_fee, Price::new(99));
        assert_eq!(config.whatsapp_number, "923360303003");
        assert!(config.mail.is_none());
        assert!(!config.is_secure());
    }

    #[test]
    fn test_invalid_port() {
        let err = load(&[("AURA_PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "AURA_PORT"));
    }

    #[test]
    fn test_invalid_whatsapp_number() {
        let err = load(&[("ADMIN_WHATSAPP_NUMBER", "+92 336")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_mail_requires_password_and_recipient() {
        let err = load(&[("SMTP_USER", "shop@gmail.com")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(key) if key == "SMTP_PASS"));

        let err = load(&[("SMTP_USER", "shop@gmail.com"), ("SMTP_PASS", "qv81hz0wpl2mrt6e")])
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(key) if key == "ORDER_NOTIFY_EMAIL"));
    }

    #[test]
    fn test_mail_config() {
        let config = load(&[
            ("SMTP_USER", "shop@gmail.com"),
            ("SMTP_PASS", "qv81hz0wpl2mrt6e"),
            ("SMTP_SECURE", "true"),
            ("SMTP_PORT", "465"),
            ("ORDER_NOTIFY_EMAIL", "orders@aurasentiments.com"),
        ])
        .unwrap();
        let mail = config.mail.unwrap();
        assert!(mail.smtp_secure);
        assert_eq!(mail.smtp_port, 465);
        assert_eq!(mail.smtp_host, "smtp.gmail.com");
        assert_eq!(mail.customer_from, DEFAULT_CUSTOMER_FROM);
        assert_eq!(mail.password(), "qv81hz0wpl2mrt6e");
    }

    #[test]
    fn test_placeholder_password_rejected() {
        let err = load(&[
            ("SMTP_USER", "shop@gmail.com"),
            ("SMTP_PASS", "changeme"),
            ("ORDER_NOTIFY_EMAIL", "orders@aurasentiments.com"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_mail_config_debug_redacts_password() {
        let config = load(&[
            ("SMTP_USER", "shop@gmail.com"),
            ("SMTP_PASS", "super_secret_relay_pass"),
            ("ORDER_NOTIFY_EMAIL", "orders@aurasentiments.com"),
        ])
        .unwrap();

        let debug_output = format!("{:?}", config.mail.unwrap());
        assert!(debug_output.contains("shop@gmail.com"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_relay_pass"));
    }
}
