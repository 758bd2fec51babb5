//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Identity provider token configuration.
    pub jwt: JwtConfig,
    /// Report image storage. Uploads are disabled when absent.
    #[serde(default)]
    pub storage: Option<StorageSettings>,
    /// Ledger reporting knobs.
    #[serde(default)]
    pub ledger: LedgerConfig,
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

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
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

/// Settings for verifying access tokens minted by the identity provider.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    /// Shared HS256 secret of the identity provider.
    pub secret: String,
    /// Expected `aud` claim.
    #[serde(default = "default_audience")]
    pub audience: String,
    /// Clock skew tolerance in seconds.
    #[serde(default = "default_leeway")]
    pub leeway_secs: u64,
}

fn default_audience() -> String {
    "authenticated".to_string()
}

fn default_leeway() -> u64 {
    30
}

/// Object storage settings for report checkpoint images.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "provider", rename_all = "snake_case")]
pub enum StorageSettings {
    /// S3-compatible bucket (the hosted platform's storage API speaks S3).
    S3 {
        /// S3 endpoint URL.
        endpoint: String,
        /// Bucket name.
        #[serde(default = "default_bucket")]
        bucket: String,
        /// Access key ID.
        access_key_id: String,
        /// Secret access key.
        secret_access_key: String,
        /// Region.
        #[serde(default = "default_region")]
        region: String,
        /// Base URL under which uploaded objects are publicly readable.
        public_base_url: String,
    },
    /// Local directory (development only).
    Local {
        /// Root directory.
        root: String,
        /// Base URL the directory is served from.
        public_base_url: String,
    },
}

fn default_bucket() -> String {
    "case-images".to_string()
}

fn default_region() -> String {
    "auto".to_string()
}

/// Ledger reporting configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Months covered by the monthly report when the caller does not ask.
    #[serde(default = "default_report_window")]
    pub report_window_months: u32,
    /// Upper bound for a caller-requested report window.
    #[serde(default = "default_max_report_window")]
    pub max_report_window_months: u32,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            report_window_months: default_report_window(),
            max_report_window_months: default_max_report_window(),
        }
    }
}

fn default_report_window() -> u32 {
    12
}

fn default_max_report_window() -> u32 {
    60
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
            .add_source(config::Environment::with_prefix("KAFALA").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
