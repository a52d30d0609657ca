//! Externally reported host information.

use serde::Deserialize;

/// A host-info payload delivered from outside the resolver, describing what
/// the serving origin is currently fronting.
///
/// `canister_id` is the trigger: events without one are ignored. A missing
/// `gateway_host` falls back to the default gateway. `ttl_seconds` is
/// accepted for payload compatibility but persistence always uses the
/// engine's own TTL.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HostInfoEvent {
    pub canister_id: Option<String>,
    pub gateway_host: Option<String>,
    pub ttl_seconds: Option<u64>,
}
