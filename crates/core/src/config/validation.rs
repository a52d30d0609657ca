//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `origin` is not an absolute URL with a hostname
    /// - `ttl_secs` is 0 or exceeds 30 days
    /// - `probe_attempts` is 0 or exceeds 10
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `user_agent` or a header name is empty
    /// - a raw suffix does not start with `.`
    pub fn validate(&self) -> Result<(), ConfigError> {
        match url::Url::parse(&self.origin) {
            Ok(parsed) if parsed.host_str().is_some() => {}
            Ok(_) => {
                return Err(ConfigError::Invalid { field: "origin".into(), reason: "must include a hostname".into() });
            }
            Err(e) => {
                return Err(ConfigError::Invalid { field: "origin".into(), reason: format!("not a valid URL: {e}") });
            }
        }

        if self.ttl_secs == 0 {
            return Err(ConfigError::Invalid { field: "ttl_secs".into(), reason: "must be greater than 0".into() });
        }
        if self.ttl_secs > 30 * 24 * 3600 {
            return Err(ConfigError::Invalid { field: "ttl_secs".into(), reason: "must not exceed 30 days".into() });
        }

        if self.probe_attempts == 0 {
            return Err(ConfigError::Invalid {
                field: "probe_attempts".into(),
                reason: "must be greater than 0".into(),
            });
        }
        if self.probe_attempts > 10 {
            return Err(ConfigError::Invalid { field: "probe_attempts".into(), reason: "must not exceed 10".into() });
        }

        if self.timeout_ms < 100 {
            return Err(ConfigError::Invalid { field: "timeout_ms".into(), reason: "must be at least 100ms".into() });
        }
        if self.timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        for (field, name) in
            [("canister_id_header", &self.canister_id_header), ("gateway_header", &self.gateway_header)]
        {
            if name.is_empty() || name.chars().any(|c| c.is_whitespace()) {
                return Err(ConfigError::Invalid {
                    field: field.into(),
                    reason: "must be a non-empty header name".into(),
                });
            }
        }

        for suffix in &self.raw_suffixes {
            if !suffix.starts_with('.') {
                return Err(ConfigError::Invalid {
                    field: "raw_suffixes".into(),
                    reason: format!("suffix {suffix:?} must start with '.'"),
                });
            }
        }

        if self.ttl_secs < 60 {
            tracing::warn!(
                ttl_secs = self.ttl_secs,
                "TTL below one minute; resolved hosts will be re-probed almost every request"
            );
        }

        Ok(())
    }
}
