//! Application configuration loaded from environment variables.

use std::str::FromStr;

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}

/// How account holds move value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccountTransportMode {
    Withdraw,
    #[default]
    Transfer,
}

impl FromStr for AccountTransportMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "withdraw" => Ok(AccountTransportMode::Withdraw),
            "transfer" => Ok(AccountTransportMode::Transfer),
            other => Err(format!("unknown account transport: {other}")),
        }
    }
}

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `3000`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `LOG_FORMAT`: `text` or `json` (default: `text`)
/// - `DATABASE_URL`: PostgreSQL action store; in-memory when unset
/// - `REDIS_URL`: Redis account number counter; in-memory when unset
/// - `ACCOUNT_NUMBER_KEY_PREFIX`: counter key prefix (default: `"accountNumber"`)
/// - `ACCOUNT_NUMBER_UTC_OFFSET_HOURS`: offset of the issuing calendar day (default: `9`)
/// - `ACCOUNT_TRANSPORT`: `withdraw` or `transfer` (default: `transfer`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    pub database_url: Option<String>,
    pub redis_url: Option<String>,
    pub account_number_key_prefix: String,
    pub account_number_utc_offset_hours: i32,
    pub account_transport: AccountTransportMode,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration from an arbitrary key lookup.
    ///
    /// Unparseable values fall back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            log_format: lookup("LOG_FORMAT")
                .and_then(|f| f.parse().ok())
                .unwrap_or(defaults.log_format),
            database_url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
            redis_url: lookup("REDIS_URL").filter(|url| !url.is_empty()),
            account_number_key_prefix: lookup("ACCOUNT_NUMBER_KEY_PREFIX")
                .unwrap_or(defaults.account_number_key_prefix),
            account_number_utc_offset_hours: lookup("ACCOUNT_NUMBER_UTC_OFFSET_HOURS")
                .and_then(|h| h.parse().ok())
                .unwrap_or(defaults.account_number_utc_offset_hours),
            account_transport: lookup("ACCOUNT_TRANSPORT")
                .and_then(|t| t.parse().ok())
                .unwrap_or(defaults.account_transport),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            database_url: None,
            redis_url: None,
            account_number_key_prefix: "accountNumber".to_string(),
            account_number_utc_offset_hours: 9,
            account_transport: AccountTransportMode::Transfer,
        }
    }
}
