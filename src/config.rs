use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info};
use validator::{Validate, ValidationError};

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_PORT: u16 = 8080;
const CONFIG_DIR: &str = "config";
const DEFAULT_MAX_ITEMS_PER_SELLER: u64 = 200;
const DEFAULT_NAME_PREFIX_LENGTH: usize = 16;
const DEFAULT_NAME_HASH_LENGTH: usize = 12;
const DEFAULT_ROUTE_PREFIX: &str = "items";
const DEFAULT_REMOTE_FETCH_TIMEOUT_SECS: u64 = 30;

/// Hub item service configuration
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct HubConfig {
    /// Database connection URL
    pub database_url: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Application environment
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    #[validate(custom = "validate_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// Create missing tables on startup
    #[serde(default)]
    pub auto_migrate: bool,

    /// Items a single seller may own before new saves are refused
    #[serde(default = "default_max_items_per_seller")]
    #[validate(range(min = 1))]
    pub max_items_per_seller: u64,

    /// Characters kept from the standard auto-name
    #[serde(default = "default_name_prefix_length")]
    #[validate(range(min = 1, max = 64))]
    pub name_prefix_length: usize,

    /// Length of the random hash appended to item names
    #[serde(default = "default_name_hash_length")]
    #[validate(range(min = 4, max = 64))]
    pub name_hash_length: usize,

    /// Prefix for generated item routes
    #[serde(default = "default_route_prefix")]
    #[validate(custom = "validate_route_prefix")]
    pub route_prefix: String,

    /// Directory that holds `files/` and `private/files/`
    #[serde(default = "default_files_root")]
    pub files_root: PathBuf,

    /// Reject inline image payloads with an empty file name or content
    #[serde(default)]
    pub strict_image_payloads: bool,

    /// Timeout for remote file downloads (seconds)
    #[serde(default = "default_remote_fetch_timeout_secs")]
    #[validate(range(min = 1))]
    pub remote_fetch_timeout_secs: u64,

    /// Title of the item list page
    #[serde(default = "default_list_page_title")]
    pub list_page_title: String,
}

impl HubConfig {
    /// Creates a configuration with defaults for everything but the database
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            host: default_host(),
            port: default_port(),
            environment: default_environment(),
            log_level: default_log_level(),
            log_json: false,
            auto_migrate: false,
            max_items_per_seller: default_max_items_per_seller(),
            name_prefix_length: default_name_prefix_length(),
            name_hash_length: default_name_hash_length(),
            route_prefix: default_route_prefix(),
            files_root: default_files_root(),
            strict_image_payloads: false,
            remote_fetch_timeout_secs: default_remote_fetch_timeout_secs(),
            list_page_title: default_list_page_title(),
        }
    }

    /// Gets log level reference
    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }

    pub fn remote_fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.remote_fetch_timeout_secs)
    }
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum HubConfigError {
    #[error("Configuration loading failed: {0}")]
    Load(#[from] ConfigError),

    #[error("Configuration validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Default value functions
fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_environment() -> String {
    DEFAULT_ENV.to_string()
}

fn default_max_items_per_seller() -> u64 {
    DEFAULT_MAX_ITEMS_PER_SELLER
}

fn default_name_prefix_length() -> usize {
    DEFAULT_NAME_PREFIX_LENGTH
}

fn default_name_hash_length() -> usize {
    DEFAULT_NAME_HASH_LENGTH
}

fn default_route_prefix() -> String {
    DEFAULT_ROUTE_PREFIX.to_string()
}

fn default_files_root() -> PathBuf {
    PathBuf::from("sites/public")
}

fn default_remote_fetch_timeout_secs() -> u64 {
    DEFAULT_REMOTE_FETCH_TIMEOUT_SECS
}

fn default_list_page_title() -> String {
    "Items".to_string()
}

/// Validates log level values
fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if valid_levels.contains(&level.to_lowercase().as_str()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("log_level");
        err.message = Some("Must be one of: trace, debug, info, warn, error".into());
        Err(err)
    }
}

/// Route prefixes need at least one character besides `/`
fn validate_route_prefix(prefix: &str) -> Result<(), ValidationError> {
    if prefix.trim_matches('/').is_empty() {
        let mut err = ValidationError::new("route_prefix");
        err.message = Some("Must contain a path segment, e.g. \"items\"".into());
        return Err(err);
    }
    Ok(())
}

/// Initializes tracing using the provided log level as the default filter
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_directive = format!("hub_items={},tower_http=debug", level);
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    if json {
        let _ = fmt()
            .with_env_filter(EnvFilter::new(filter_directive))
            .json()
            .try_init();
    } else {
        let _ = fmt()
            .with_env_filter(EnvFilter::new(filter_directive))
            .try_init();
    }
}

/// Loads the service configuration
///
/// Layers configuration sources in this order:
/// 1. Built-in defaults
/// 2. Default config (config/default.toml)
/// 3. Environment-specific config (config/{env}.toml)
/// 4. Environment variables (HUB__*)
pub fn load_config() -> Result<HubConfig, HubConfigError> {
    let run_env = env::var("RUN_ENV").unwrap_or_else(|_| DEFAULT_ENV.to_string());
    info!("Loading configuration for environment: {}", run_env);

    if !Path::new(CONFIG_DIR).exists() {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            CONFIG_DIR
        );
    }

    let config = Config::builder()
        .set_default("database_url", "sqlite://hub.db?mode=rwc")?
        .set_default("environment", run_env.as_str())?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .add_source(File::with_name(&format!("{}/default", CONFIG_DIR)).required(false))
        .add_source(File::with_name(&format!("{}/{}", CONFIG_DIR, run_env)).required(false))
        .add_source(
            Environment::with_prefix("HUB")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let hub_config: HubConfig = config.try_deserialize()?;

    hub_config.validate().map_err(|e| {
        error!("Configuration validation failed: {:?}", e);
        HubConfigError::Validation(e)
    })?;

    info!("Configuration loaded successfully");
    Ok(hub_config)
}
