//! The resolution engine.
//!
//! [`CanisterResolver`] classifies domains through an ordered pipeline:
//! well-known table, raw-suffix check, hostname-embedded identifier, host
//! store, then a retrying HTTPS HEAD probe. Store-and-probe work for one
//! origin is shared by all concurrent callers, and resolved gateways are
//! rewritten to the serving host's own gateway on request.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use canroute_core::{AppConfig, CanisterLocation, HostRecord, HostStore, Principal, ResolveError, Resolution};
use chrono::Utc;
use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use reqwest::header::HeaderMap;
use url::Url;

use crate::event::HostInfoEvent;
use crate::headers::{LookupHeaders, canister_from_headers};
use crate::hostname;
use crate::probe::ProbeTransport;
use crate::wellknown;

type SharedLookup = Shared<BoxFuture<'static, Result<Resolution, ResolveError>>>;

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Origin the resolver serves from; the anchor for gateway rewrites.
    pub origin: Url,

    /// How long resolved hosts stay fresh in the store.
    pub ttl: Duration,

    /// Maximum HEAD probe attempts per resolution.
    pub probe_attempts: u32,

    /// Names of the canister-id and gateway response headers.
    pub headers: LookupHeaders,

    /// Hostname suffixes recognized as API gateways.
    pub api_gateways: Vec<String>,

    /// Hostname suffixes excluded from resolution.
    pub raw_suffixes: Vec<String>,

    /// Exact-hostname resolutions served without any I/O.
    pub well_known: HashMap<String, Resolution>,
}

impl ResolverConfig {
    /// Stock conventions for the given serving origin.
    pub fn new(origin: Url) -> Result<Self, ResolveError> {
        Ok(Self {
            origin,
            ttl: Duration::from_secs(3600),
            probe_attempts: 3,
            headers: LookupHeaders::default(),
            api_gateways: wellknown::api_gateways(),
            raw_suffixes: wellknown::raw_suffixes(),
            well_known: wellknown::well_known_hosts()?,
        })
    }

    /// Build from loaded application configuration.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, ResolveError> {
        let origin = Url::parse(&config.origin)
            .map_err(|e| ResolveError::MalformedHostname(format!("origin {:?}: {}", config.origin, e)))?;

        Ok(Self {
            origin,
            ttl: config.ttl(),
            probe_attempts: config.probe_attempts,
            headers: LookupHeaders {
                canister_id: config.canister_id_header.clone(),
                gateway: config.gateway_header.clone(),
            },
            api_gateways: config.api_gateways.clone(),
            raw_suffixes: config.raw_suffixes.clone(),
            well_known: wellknown::well_known_hosts()?,
        })
    }
}

/// Domain → canister resolution engine.
///
/// Cheap to clone; all clones share the store, the transport, and the
/// in-flight registry.
#[derive(Clone)]
pub struct CanisterResolver {
    inner: Arc<ResolverInner>,
}

struct ResolverInner {
    config: ResolverConfig,
    store: Arc<dyn HostStore>,
    transport: Arc<dyn ProbeTransport>,
    inflight: Mutex<HashMap<String, SharedLookup>>,
}

/// Cache and dedup key: the ASCII origin (scheme, host, port).
fn origin_key(url: &Url) -> String {
    url.origin().ascii_serialization()
}

impl CanisterResolver {
    pub fn new(config: ResolverConfig, store: Arc<dyn HostStore>, transport: Arc<dyn ProbeTransport>) -> Self {
        Self { inner: Arc::new(ResolverInner { config, store, transport, inflight: Mutex::new(HashMap::new()) }) }
    }

    /// The origin this resolver serves from.
    pub fn origin(&self) -> &Url {
        &self.inner.config.origin
    }

    /// Resolve a domain, rewriting canister gateways to the current gateway.
    pub async fn lookup(&self, domain: &Url) -> Result<Resolution, ResolveError> {
        self.lookup_with(domain, true).await
    }

    /// Resolve a domain.
    ///
    /// With `enforce_current_gateway` set, a canister result whose gateway
    /// differs from the serving hostname has its gateway replaced by the
    /// serving origin's own (see [`Self::current_gateway`]).
    pub async fn lookup_with(
        &self,
        domain: &Url,
        enforce_current_gateway: bool,
    ) -> Result<Resolution, ResolveError> {
        let resolution = match self.resolve_from_url(domain)? {
            Some(resolution) => resolution,
            None => self.resolve_shared(domain).await?,
        };

        if enforce_current_gateway { self.rewrite_gateway(resolution).await } else { Ok(resolution) }
    }

    /// The zero-I/O resolution stages: well-known table, raw suffix,
    /// hostname-embedded identifier, in that order.
    ///
    /// `None` means the URL alone cannot settle the question.
    pub fn resolve_from_url(&self, domain: &Url) -> Result<Option<Resolution>, ResolveError> {
        let config = &self.inner.config;
        let Some(hostname) = domain.host_str() else {
            return Err(ResolveError::MalformedHostname(format!("{domain} has no hostname")));
        };

        if let Some(resolution) = config.well_known.get(hostname) {
            return Ok(Some(resolution.clone()));
        }

        if hostname::is_raw_hostname(hostname, &config.raw_suffixes) {
            return Ok(Some(Resolution::NotCanister));
        }

        Ok(hostname::embedded_canister(domain)?.map(Resolution::Canister))
    }

    /// Fast-path resolution for an inbound request.
    ///
    /// A canister identity carried in the request headers is returned as-is,
    /// with no store, probe, or gateway rewrite. Otherwise the request URL
    /// goes through the full pipeline.
    pub async fn lookup_from_request(&self, url: &Url, headers: &HeaderMap) -> Result<Resolution, ResolveError> {
        if let Some(location) = canister_from_headers(headers, &self.inner.config.headers)? {
            return Ok(Resolution::Canister(location));
        }
        self.lookup(url).await
    }

    /// The gateway of the serving origin itself.
    ///
    /// # Errors
    ///
    /// `ResolveError::CurrentGatewayNotCanister` if the serving origin does
    /// not resolve to a canister.
    pub async fn current_gateway(&self) -> Result<Url, ResolveError> {
        let origin = self.inner.config.origin.clone();
        match Box::pin(self.lookup_with(&origin, false)).await? {
            Resolution::Canister(location) => Ok(location.gateway),
            Resolution::NotCanister => Err(ResolveError::CurrentGatewayNotCanister),
        }
    }

    /// Whether a request targets the API surface.
    ///
    /// The path must sit under the API prefix, and the host must either end
    /// with a known API gateway (the current gateway counts) or the
    /// resolution must be a canister.
    pub fn is_api_call(&self, url: &Url, current_gateway: &Url, resolution: &Resolution) -> bool {
        if !url.path().starts_with(wellknown::API_PATH_PREFIX) {
            return false;
        }
        let Some(hostname) = url.host_str() else {
            return false;
        };

        let on_api_gateway = self
            .inner
            .config
            .api_gateways
            .iter()
            .map(String::as_str)
            .chain(current_gateway.host_str())
            .any(|gateway| hostname.ends_with(gateway));

        on_api_gateway || resolution.is_canister()
    }

    /// Ingest an externally reported identity for the serving origin.
    ///
    /// Fire-and-forget: events without a canister id are ignored, and both
    /// decode and store failures are logged and dropped.
    pub async fn record_host_info(&self, event: HostInfoEvent) {
        let Some(canister_id) = event.canister_id.as_deref() else {
            return;
        };

        let decoded = Principal::from_text(canister_id).map_err(ResolveError::from).and_then(|principal| {
            let gateway = match event.gateway_host.as_deref() {
                Some(host) => hostname::gateway_url(host)?,
                None => wellknown::default_gateway()?,
            };
            Ok(CanisterLocation { principal, gateway })
        });

        let location = match decoded {
            Ok(location) => location,
            Err(e) => {
                tracing::warn!(error = %e, "discarding malformed host info event");
                return;
            }
        };

        let origin = origin_key(&self.inner.config.origin);
        let record = HostRecord::from_resolution(&Resolution::Canister(location));
        let expires_at = Utc::now() + chrono::Duration::seconds(self.inner.config.ttl.as_secs() as i64);
        if let Err(e) = self.inner.store.put(&origin, &record, expires_at).await {
            tracing::warn!(%origin, error = %e, "failed to persist host info event");
        }
    }

    /// Store-and-probe resolution, shared across concurrent callers.
    ///
    /// The first caller for an origin registers a shared future; everyone
    /// arriving while it is pending awaits the same one. The future removes
    /// its own registry entry when it settles, so later callers start fresh.
    async fn resolve_shared(&self, domain: &Url) -> Result<Resolution, ResolveError> {
        let origin = origin_key(domain);

        let shared = {
            let mut inflight = self.lock_inflight();
            if let Some(pending) = inflight.get(&origin) {
                tracing::debug!(%origin, "joining in-flight resolution");
                pending.clone()
            } else {
                let task = self.clone().resolve_origin(domain.clone(), origin.clone()).boxed().shared();
                inflight.insert(origin.clone(), task.clone());
                task
            }
        };

        shared.await
    }

    /// Body of the shared future: deregisters itself exactly once, right
    /// before the outcome reaches any waiter.
    async fn resolve_origin(self, domain: Url, origin: String) -> Result<Resolution, ResolveError> {
        let outcome = self.resolve_uncached(&domain, &origin).await;
        self.lock_inflight().remove(&origin);
        outcome
    }

    async fn resolve_uncached(&self, domain: &Url, origin: &str) -> Result<Resolution, ResolveError> {
        if let Some(record) = self.inner.store.get(origin).await? {
            tracing::debug!(origin, "host store hit");
            return record.to_resolution();
        }

        let resolution = self.probe(domain).await?;

        let record = HostRecord::from_resolution(&resolution);
        let expires_at = Utc::now() + chrono::Duration::seconds(self.inner.config.ttl.as_secs() as i64);
        if let Err(e) = self.inner.store.put(origin, &record, expires_at).await {
            tracing::warn!(origin, error = %e, "failed to persist resolved host");
        }

        Ok(resolution)
    }

    /// Retrying HTTPS HEAD probe.
    ///
    /// Transport failures retry immediately up to the attempt ceiling;
    /// malformed header content is permanent and propagates at once. A
    /// response is a canister only when its status is 2xx and both lookup
    /// headers decode.
    async fn probe(&self, domain: &Url) -> Result<Resolution, ResolveError> {
        let target = hostname::force_https(domain)?;
        let max_attempts = self.inner.config.probe_attempts.max(1);
        let mut attempt = 1;

        loop {
            match self.inner.transport.head(&target).await {
                Ok(response) => {
                    if !response.status.is_success() {
                        return Ok(Resolution::NotCanister);
                    }
                    let location = canister_from_headers(&response.headers, &self.inner.config.headers)?;
                    return Ok(match location {
                        Some(location) => Resolution::Canister(location),
                        None => Resolution::NotCanister,
                    });
                }
                Err(e) if e.is_transient() && attempt < max_attempts => {
                    tracing::debug!(%target, attempt, error = %e, "probe attempt failed, retrying");
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Gateway-consistency rewrite: the serving host decides which gateway
    /// carries canister traffic, not the target domain.
    async fn rewrite_gateway(&self, resolution: Resolution) -> Result<Resolution, ResolveError> {
        let Resolution::Canister(mut location) = resolution else {
            return Ok(Resolution::NotCanister);
        };

        if location.gateway.host_str() != self.inner.config.origin.host_str() {
            location.gateway = self.current_gateway().await?;
        }
        Ok(Resolution::Canister(location))
    }

    // Nothing can panic while the guard is held, so a poisoned lock still
    // holds a consistent map.
    fn lock_inflight(&self) -> MutexGuard<'_, HashMap<String, SharedLookup>> {
        self.inner.inflight.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
