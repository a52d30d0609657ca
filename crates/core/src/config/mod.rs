//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (CANROUTE_*)
//! 2. TOML config file (if CANROUTE_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (CANROUTE_*)
/// 2. TOML config file (if CANROUTE_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Origin this resolver serves from, e.g. `https://ic0.app`.
    ///
    /// Used as the storage key for reported host info and as the anchor
    /// for gateway-consistency rewrites. Set via CANROUTE_ORIGIN.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Path to the SQLite host database.
    ///
    /// Set via CANROUTE_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Seconds a resolved host stays fresh in the store.
    ///
    /// Set via CANROUTE_TTL_SECS environment variable.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,

    /// Maximum HEAD probe attempts per resolution.
    ///
    /// Set via CANROUTE_PROBE_ATTEMPTS environment variable.
    #[serde(default = "default_probe_attempts")]
    pub probe_attempts: u32,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via CANROUTE_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// User-Agent string for probe requests.
    ///
    /// Set via CANROUTE_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Response header carrying the canister principal.
    ///
    /// Set via CANROUTE_CANISTER_ID_HEADER environment variable.
    #[serde(default = "default_canister_id_header")]
    pub canister_id_header: String,

    /// Response header carrying the gateway hostname.
    ///
    /// Set via CANROUTE_GATEWAY_HEADER environment variable.
    #[serde(default = "default_gateway_header")]
    pub gateway_header: String,

    /// Hostname suffixes that mark a request as an API call.
    ///
    /// Set via CANROUTE_API_GATEWAYS environment variable.
    #[serde(default = "default_api_gateways")]
    pub api_gateways: Vec<String>,

    /// Hostname suffixes that bypass resolution entirely.
    ///
    /// Set via CANROUTE_RAW_SUFFIXES environment variable.
    #[serde(default = "default_raw_suffixes")]
    pub raw_suffixes: Vec<String>,
}

fn default_origin() -> String {
    "https://ic0.app".into()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./canroute-hosts.sqlite")
}

fn default_ttl_secs() -> u64 {
    3600 // 60 minutes
}

fn default_probe_attempts() -> u32 {
    3
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_user_agent() -> String {
    "canroute/0.1".into()
}

fn default_canister_id_header() -> String {
    "x-ic-canister-id".into()
}

fn default_gateway_header() -> String {
    "x-ic-gateway".into()
}

fn default_api_gateways() -> Vec<String> {
    vec!["ic0.app".into(), "icp-api.io".into(), "icp0.io".into()]
}

fn default_raw_suffixes() -> Vec<String> {
    vec![".raw.ic0.app".into(), ".raw.icp0.io".into()]
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            db_path: default_db_path(),
            ttl_secs: default_ttl_secs(),
            probe_attempts: default_probe_attempts(),
            timeout_ms: default_timeout_ms(),
            user_agent: default_user_agent(),
            canister_id_header: default_canister_id_header(),
            gateway_header: default_gateway_header(),
            api_gateways: default_api_gateways(),
            raw_suffixes: default_raw_suffixes(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// TTL as Duration.
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `CANROUTE_`
    /// 2. TOML file from `CANROUTE_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("CANROUTE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("CANROUTE_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
