//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Runtime environment.
    #[serde(default)]
    pub environment: RunMode,
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// JWT configuration.
    pub jwt: JwtSettings,
    /// Ledger policy settings.
    #[serde(default)]
    pub ledger: LedgerConfig,
}

/// Runtime environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Local development; error details are returned to clients.
    #[default]
    Development,
    /// Production; error details stay in the logs.
    Production,
}

impl RunMode {
    /// Returns true when internal error details may be sent to clients.
    #[must_use]
    pub const fn exposes_error_details(self) -> bool {
        matches!(self, Self::Development)
    }
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// JWT settings as read from configuration sources.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Secret key for verifying tokens.
    pub secret: String,
    /// Access token expiration in seconds.
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: u64,
}

fn default_access_token_expiry() -> u64 {
    900 // 15 minutes
}

/// Ledger policy settings.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Smallest partner withdrawal accepted, in FCFA.
    #[serde(default = "default_min_withdrawal")]
    pub min_withdrawal: i64,
    /// Partner rebate rate (%) when no rate is configured.
    #[serde(default = "default_partner_rate")]
    pub default_partner_rate: Decimal,
    /// Author royalty rate (%) when no rate is configured.
    #[serde(default = "default_author_rate")]
    pub default_author_rate: Decimal,
}

fn default_min_withdrawal() -> i64 {
    5000
}

fn default_partner_rate() -> Decimal {
    Decimal::from(10)
}

fn default_author_rate() -> Decimal {
    Decimal::from(15)
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            min_withdrawal: default_min_withdrawal(),
            default_partner_rate: default_partner_rate(),
            default_author_rate: default_author_rate(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("FOLIO").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
