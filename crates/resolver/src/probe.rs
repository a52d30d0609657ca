//! HEAD probe transport.
//!
//! The engine owns retry policy; a transport performs exactly one request
//! per call and reports connection-level failures as `Transport` errors.
//! Response status and headers come back untouched so the engine can apply
//! the canister-header decode itself.

use async_trait::async_trait;
use canroute_core::ResolveError;
use reqwest::header::HeaderMap;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use url::Url;

/// Configuration for the HTTP probe client.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// User agent string (default: "canroute/0.1")
    pub user_agent: String,

    /// Request timeout (default: 10s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 2)
    pub max_redirects: usize,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self { user_agent: "canroute/0.1".to_string(), timeout: Duration::from_millis(10_000), max_redirects: 2 }
    }
}

/// What a probe observed: status and headers, no body.
#[derive(Debug, Clone)]
pub struct ProbeResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
}

/// Transport that answers HEAD probes.
#[async_trait]
pub trait ProbeTransport: Send + Sync {
    async fn head(&self, url: &Url) -> Result<ProbeResponse, ResolveError>;
}

/// reqwest-backed probe transport.
pub struct HttpProbe {
    http: Client,
}

impl HttpProbe {
    /// Create a new probe client with the given configuration.
    pub fn new(config: ProbeConfig) -> Result<Self, ResolveError> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .build()
            .map_err(|e| ResolveError::Transport(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http })
    }
}

#[async_trait]
impl ProbeTransport for HttpProbe {
    async fn head(&self, url: &Url) -> Result<ProbeResponse, ResolveError> {
        let response = self
            .http
            .head(url.as_str())
            .send()
            .await
            .map_err(|e| ResolveError::Transport(format!("network error: {}", e)))?;

        tracing::debug!(%url, status = %response.status(), "probe completed");

        Ok(ProbeResponse { status: response.status(), headers: response.headers().clone() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_config_default() {
        let config = ProbeConfig::default();
        assert_eq!(config.user_agent, "canroute/0.1");
        assert_eq!(config.timeout, Duration::from_millis(10_000));
        assert_eq!(config.max_redirects, 2);
    }

    #[tokio::test]
    async fn test_http_probe_new() {
        let config = ProbeConfig::default();
        let probe = HttpProbe::new(config);
        assert!(probe.is_ok());
    }
}
