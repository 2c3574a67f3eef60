//! Application configuration.

use serde::Deserialize;
use std::path::Path;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Bearer-token configuration.
    pub auth: AuthConfig,
    /// Payment gateway configuration.
    pub payment: PaymentConfig,
    /// Image storage configuration.
    pub storage: StorageConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Origins allowed to call the API from a browser. Empty = any origin.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Bearer-token configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Token-signing secret. A `base64:` prefix marks a base64-encoded key;
    /// anything else is used as raw UTF-8 bytes.
    pub secret: String,
    /// Token issuer claim.
    #[serde(default = "default_token_party")]
    pub issuer: String,
    /// Token audience claim.
    #[serde(default = "default_token_party")]
    pub audience: String,
    /// Token lifetime in hours.
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,
}

/// Payment gateway configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Gateway API key id (basic-auth username).
    pub key_id: String,
    /// Gateway API secret. Also the HMAC key for signature verification.
    pub key_secret: String,
    /// Gateway API base URL.
    #[serde(default = "default_payment_api_url")]
    pub api_url: String,
    /// Currency code sent with every gateway order.
    #[serde(default = "default_currency")]
    pub currency: String,
}

/// Image storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Base directory for stored objects.
    #[serde(default = "default_storage_path")]
    pub base_path: String,
    /// Public base URL for serving stored objects.
    #[serde(default = "default_storage_url")]
    pub base_url: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_connections() -> u32 {
    100
}

const fn default_min_connections() -> u32 {
    5
}

fn default_token_party() -> String {
    "templatehub".to_string()
}

const fn default_token_ttl_hours() -> i64 {
    2
}

fn default_payment_api_url() -> String {
    "https://api.razorpay.com/v1".to_string()
}

fn default_currency() -> String {
    "INR".to_string()
}

fn default_storage_path() -> String {
    "./files".to_string()
}

fn default_storage_url() -> String {
    "/files".to_string()
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `TEMPLATEHUB_ENV`)
    /// 3. Environment variables with `TEMPLATEHUB_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let env = std::env::var("TEMPLATEHUB_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("TEMPLATEHUB")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("TEMPLATEHUB")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
