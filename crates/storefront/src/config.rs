//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//! - `BACKEND_ENDPOINT` - Backend API endpoint (e.g., <https://backend.example.net/v1>)
//! - `BACKEND_PROJECT_ID` - Backend project identifier
//! - `BACKEND_API_KEY` - Server-side API key for the document store
//! - `BACKEND_DATABASE_ID` - Database holding the product collection
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `BACKEND_PRODUCTS_COLLECTION_ID` - Product collection (default: products)
//! - `CHECKOUT_SHIPPING_FEE` - Flat shipping fee (default: 5.99)
//! - `CHECKOUT_FREE_SHIPPING_THRESHOLD` - Subtotal for free shipping (default: 50.00)
//! - `CHECKOUT_CURRENCY` - ISO 4217 currency code (default: USD)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_TRACES_SAMPLE_RATE` - Sentry performance sample rate (default: 0.0)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use rust_decimal::Decimal;
use rxshop_core::{CurrencyCode, ShippingPolicy};
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

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

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Backend-as-a-service configuration
    pub backend: BackendConfig,
    /// Simulated checkout configuration
    pub checkout: CheckoutConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., production, staging)
    pub sentry_environment: Option<String>,
    /// Sentry performance tracing sample rate
    pub sentry_traces_sample_rate: f32,
}

/// Backend-as-a-service (document store + identity) configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct BackendConfig {
    /// API endpoint, without trailing slash
    pub endpoint: Url,
    /// Project identifier sent with every request
    pub project_id: String,
    /// Server-side API key (never sent to browsers)
    pub api_key: SecretString,
    /// Database holding the product collection
    pub database_id: String,
    /// Product collection id
    pub products_collection_id: String,
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("endpoint", &self.endpoint.as_str())
            .field("project_id", &self.project_id)
            .field("api_key", &"[REDACTED]")
            .field("database_id", &self.database_id)
            .field("products_collection_id", &self.products_collection_id)
            .finish()
    }
}

/// Simulated checkout configuration.
#[derive(Debug, Clone, Copy)]
pub struct CheckoutConfig {
    /// Shipping fee and free-shipping threshold
    pub shipping: ShippingPolicy,
    /// Currency all catalog prices are expressed in
    pub currency: CurrencyCode,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            shipping: ShippingPolicy {
                flat_fee: Decimal::new(599, 2),
                free_threshold: Decimal::new(5000, 2),
            },
            currency: CurrencyCode::USD,
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

        let host = parse_env_or_default::<IpAddr>("STOREFRONT_HOST", "127.0.0.1")?;
        let port = parse_env_or_default::<u16>("STOREFRONT_PORT", "3000")?;
        let base_url = get_required_env("STOREFRONT_BASE_URL")?;
        Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("STOREFRONT_BASE_URL".to_string(), e.to_string())
        })?;

        let backend = BackendConfig::from_env()?;
        let checkout = CheckoutConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_traces_sample_rate =
            parse_env_or_default::<f32>("SENTRY_TRACES_SAMPLE_RATE", "0.0")?;

        Ok(Self {
            host,
            port,
            base_url,
            backend,
            checkout,
            sentry_dsn,
            sentry_environment,
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
    pub fn secure_cookies(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl BackendConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let raw_endpoint = get_required_env("BACKEND_ENDPOINT")?;
        let endpoint = Url::parse(raw_endpoint.trim_end_matches('/')).map_err(|e| {
            ConfigError::InvalidEnvVar("BACKEND_ENDPOINT".to_string(), e.to_string())
        })?;

        Ok(Self {
            endpoint,
            project_id: get_required_env("BACKEND_PROJECT_ID")?,
            api_key: get_validated_secret("BACKEND_API_KEY")?,
            database_id: get_required_env("BACKEND_DATABASE_ID")?,
            products_collection_id: get_env_or_default(
                "BACKEND_PRODUCTS_COLLECTION_ID",
                "products",
            ),
        })
    }
}

impl CheckoutConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let flat_fee = parse_env_or_default::<Decimal>(
            "CHECKOUT_SHIPPING_FEE",
            &defaults.shipping.flat_fee.to_string(),
        )?;
        let free_threshold = parse_env_or_default::<Decimal>(
            "CHECKOUT_FREE_SHIPPING_THRESHOLD",
            &defaults.shipping.free_threshold.to_string(),
        )?;
        if flat_fee.is_sign_negative() || free_threshold.is_sign_negative() {
            return Err(ConfigError::InvalidEnvVar(
                "CHECKOUT_SHIPPING_FEE".to_string(),
                "shipping amounts cannot be negative".to_string(),
            ));
        }
        let currency = parse_env_or_default::<CurrencyCode>("CHECKOUT_CURRENCY", "USD")?;

        Ok(Self {
            shipping: ShippingPolicy {
                flat_fee,
                free_threshold,
            },
            currency,
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

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env_or_default<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
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
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
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

    // Real API keys have high entropy
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated key."
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

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn backend_config() -> BackendConfig {
        BackendConfig {
            endpoint: Url::parse("https://backend.test/v1").unwrap(),
            project_id: "rxshop".to_string(),
            api_key: SecretString::from("super_secret_api_key_value"),
            database_id: "main".to_string(),
            products_collection_id: "products".to_string(),
        }
    }

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        // "ab" has entropy of 1 bit per char (50% a, 50% b)
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-api-key-here", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        let result = validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_socket_addr_and_secure_cookies() {
        let mut config = StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            backend: backend_config(),
            checkout: CheckoutConfig::default(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_traces_sample_rate: 0.0,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
        assert!(!config.secure_cookies());

        config.base_url = "https://shop.test".to_string();
        assert!(config.secure_cookies());
    }

    #[test]
    fn test_backend_config_debug_redacts_api_key() {
        let debug_output = format!("{:?}", backend_config());

        assert!(debug_output.contains("backend.test"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_api_key_value"));
    }

    #[test]
    fn test_default_checkout_policy() {
        let checkout = CheckoutConfig::default();
        assert_eq!(checkout.shipping.flat_fee, Decimal::new(599, 2));
        assert_eq!(checkout.currency, CurrencyCode::USD);
    }
}
