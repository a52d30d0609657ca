//! Canister lookup headers.
//!
//! Gateways announce canister content through two response headers: one
//! carrying the canister principal, one the gateway hostname. The same pair
//! appears on inbound requests that were already classified upstream, which
//! is what makes the request fast path possible.

use crate::hostname;
use canroute_core::{CanisterLocation, Principal, ResolveError};
use reqwest::header::HeaderMap;

/// Names of the two lookup headers.
#[derive(Debug, Clone)]
pub struct LookupHeaders {
    pub canister_id: String,
    pub gateway: String,
}

impl Default for LookupHeaders {
    fn default() -> Self {
        Self { canister_id: "x-ic-canister-id".to_string(), gateway: "x-ic-gateway".to_string() }
    }
}

/// Decode a canister location from a header set.
///
/// Both headers must be present to assert anything; a lone header reads as
/// absence. Present-but-invalid values are hard errors, never retried.
pub fn canister_from_headers(
    headers: &HeaderMap,
    names: &LookupHeaders,
) -> Result<Option<CanisterLocation>, ResolveError> {
    let canister_id = headers.get(names.canister_id.as_str()).and_then(|v| v.to_str().ok());
    let gateway_host = headers.get(names.gateway.as_str()).and_then(|v| v.to_str().ok());

    let (Some(canister_id), Some(gateway_host)) = (canister_id, gateway_host) else {
        return Ok(None);
    };

    let principal = Principal::from_text(canister_id)?;
    let gateway = hostname::gateway_url(gateway_host)?;
    Ok(Some(CanisterLocation { principal, gateway }))
}
