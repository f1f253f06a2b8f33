//! ScanPOS API configuration module.
//!
//! Configuration is loaded from `SCANPOS_*` environment variables with
//! fallback to defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// API server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP port
    pub http_port: u16,

    /// SQLite database file
    pub database_path: String,

    /// JWT secret key for signing tokens
    #[serde(skip_serializing)]
    pub jwt_secret: String,

    /// JWT lifetime in seconds
    pub jwt_lifetime_secs: i64,

    /// Payment gateway key id
    pub payment_key_id: String,

    /// Payment gateway key secret (HMAC key for payment signatures)
    #[serde(skip_serializing)]
    pub payment_key_secret: String,

    /// Upper bound on one payment verification call
    pub gateway_timeout_ms: u64,

    /// How many invoice numbers to try before giving up
    pub invoice_number_attempts: u32,

    pub currency_code: String,

    pub currency_symbol: String,

    /// Shown in notifications and the UPI QR payload
    pub business_name: String,

    /// Payee VPA for the UPI QR payload
    pub upi_id: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            http_port: 8080,
            database_path: "scanpos.db".to_string(),
            // In production, this MUST be set via environment variable
            jwt_secret: "scanpos-dev-secret-change-in-production".to_string(),
            jwt_lifetime_secs: 86_400,
            payment_key_id: "rzp_test_scanpos".to_string(),
            payment_key_secret: "scanpos-dev-payment-secret".to_string(),
            gateway_timeout_ms: 10_000,
            invoice_number_attempts: 5,
            currency_code: "INR".to_string(),
            currency_symbol: "₹".to_string(),
            business_name: "ScanPOS".to_string(),
            upi_id: "scanpos@upi".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = AppConfig::default();

        let config = AppConfig {
            http_port: parse_or(&lookup, "SCANPOS_HTTP_PORT", defaults.http_port)?,
            database_path: lookup("SCANPOS_DATABASE_PATH").unwrap_or(defaults.database_path),
            jwt_secret: lookup("SCANPOS_JWT_SECRET").unwrap_or(defaults.jwt_secret),
            jwt_lifetime_secs: parse_or(
                &lookup,
                "SCANPOS_JWT_LIFETIME_SECS",
                defaults.jwt_lifetime_secs,
            )?,
            payment_key_id: lookup("SCANPOS_PAYMENT_KEY_ID").unwrap_or(defaults.payment_key_id),
            payment_key_secret: lookup("SCANPOS_PAYMENT_KEY_SECRET")
                .unwrap_or(defaults.payment_key_secret),
            gateway_timeout_ms: parse_or(
                &lookup,
                "SCANPOS_GATEWAY_TIMEOUT_MS",
                defaults.gateway_timeout_ms,
            )?,
            invoice_number_attempts: parse_or(
                &lookup,
                "SCANPOS_INVOICE_NUMBER_ATTEMPTS",
                defaults.invoice_number_attempts,
            )?,
            currency_code: lookup("SCANPOS_CURRENCY_CODE").unwrap_or(defaults.currency_code),
            currency_symbol: lookup("SCANPOS_CURRENCY_SYMBOL").unwrap_or(defaults.currency_symbol),
            business_name: lookup("SCANPOS_BUSINESS_NAME").unwrap_or(defaults.business_name),
            upi_id: lookup("SCANPOS_UPI_ID").unwrap_or(defaults.upi_id),
        };

        if config.jwt_secret.is_empty() {
            return Err(ConfigError::MissingRequired("SCANPOS_JWT_SECRET".to_string()));
        }
        if config.payment_key_secret.is_empty() {
            return Err(ConfigError::MissingRequired(
                "SCANPOS_PAYMENT_KEY_SECRET".to_string(),
            ));
        }
        if config.invoice_number_attempts == 0 {
            return Err(ConfigError::InvalidValue(
                "SCANPOS_INVOICE_NUMBER_ATTEMPTS".to_string(),
            ));
        }

        Ok(config)
    }

    pub fn gateway_timeout(&self) -> Duration {
        Duration::from_millis(self.gateway_timeout_ms)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.database_path, "scanpos.db");
        assert_eq!(config.gateway_timeout(), Duration::from_secs(10));
        assert_eq!(config.invoice_number_attempts, 5);
        assert_eq!(config.currency_symbol, "₹");
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("SCANPOS_HTTP_PORT", "9090"),
            ("SCANPOS_BUSINESS_NAME", "Corner Store"),
            ("SCANPOS_GATEWAY_TIMEOUT_MS", "250"),
        ])
        .unwrap();
        assert_eq!(config.http_port, 9090);
        assert_eq!(config.business_name, "Corner Store");
        assert_eq!(config.gateway_timeout(), Duration::from_millis(250));
    }

    #[test]
    fn test_invalid_number() {
        let err = load(&[("SCANPOS_HTTP_PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(key) if key == "SCANPOS_HTTP_PORT"));
    }

    #[test]
    fn test_zero_attempts_rejected() {
        assert!(load(&[("SCANPOS_INVOICE_NUMBER_ATTEMPTS", "0")]).is_err());
    }

    #[test]
    fn test_empty_secret_rejected() {
        let err = load(&[("SCANPOS_JWT_SECRET", "")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequired(_)));
    }

    #[test]
    fn test_payment_secret_not_serialized() {
        let json = serde_json::to_value(load(&[]).unwrap()).unwrap();
        assert!(json.get("payment_key_secret").is_none());
        assert!(json.get("jwt_lifetime_secs").is_some());
    }
}
