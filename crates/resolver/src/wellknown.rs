//! Well-known hosts and network conventions.
//!
//! The constants here mirror the deployed gateway fleet: the hostname
//! suffixes that serve the API directly, the suffixes that opt out of
//! resolution, and a short table of high-traffic dapp hostnames whose
//! canisters are known ahead of time.

use std::collections::HashMap;

use canroute_core::{CanisterLocation, Principal, ResolveError, Resolution};
use url::Url;

/// Gateway assumed when an event or record does not name one.
pub const DEFAULT_GATEWAY_HOST: &str = "ic0.app";

/// Hostname suffixes that serve the API directly.
pub const API_GATEWAY_SUFFIXES: &[&str] = &["ic0.app", "icp-api.io", "icp0.io"];

/// Hostname suffixes excluded from canister resolution.
pub const RAW_HOST_SUFFIXES: &[&str] = &[".raw.ic0.app", ".raw.icp0.io"];

/// Path prefix of the API surface.
pub const API_PATH_PREFIX: &str = "/api/";

const WELL_KNOWN: &[(&str, &str, &str)] = &[
    ("identity.ic0.app", "rdmx6-jaaaa-aaaaa-aaadq-cai", DEFAULT_GATEWAY_HOST),
    ("nns.ic0.app", "qoctq-giaaa-aaaaa-aaaea-cai", DEFAULT_GATEWAY_HOST),
    ("dscvr.one", "h5aet-waaaa-aaaab-qaamq-cai", DEFAULT_GATEWAY_HOST),
    ("personhood.ic0.app", "g3wsl-eqaaa-aaaan-aaaaa-cai", DEFAULT_GATEWAY_HOST),
];

/// Build the static hostname table consulted before any I/O.
pub fn well_known_hosts() -> Result<HashMap<String, Resolution>, ResolveError> {
    let mut hosts = HashMap::with_capacity(WELL_KNOWN.len());
    for (hostname, principal, gateway) in WELL_KNOWN {
        let location = CanisterLocation {
            principal: Principal::from_text(principal)?,
            gateway: crate::hostname::gateway_url(gateway)?,
        };
        hosts.insert((*hostname).to_string(), Resolution::Canister(location));
    }
    Ok(hosts)
}

pub fn api_gateways() -> Vec<String> {
    API_GATEWAY_SUFFIXES.iter().map(|s| (*s).to_string()).collect()
}

pub fn raw_suffixes() -> Vec<String> {
    RAW_HOST_SUFFIXES.iter().map(|s| (*s).to_string()).collect()
}

/// The default gateway as a URL.
pub fn default_gateway() -> Result<Url, ResolveError> {
    crate::hostname::gateway_url(DEFAULT_GATEWAY_HOST)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_known_hosts_parse() {
        let hosts = well_known_hosts().unwrap();
        assert_eq!(hosts.len(), 4);

        let identity = hosts.get("identity.ic0.app").unwrap();
        let location = identity.location().unwrap();
        assert_eq!(location.principal.to_text(), "rdmx6-jaaaa-aaaaa-aaadq-cai");
        assert_eq!(location.gateway.host_str(), Some("ic0.app"));
    }

    #[test]
    fn test_every_entry_is_a_canister() {
        let hosts = well_known_hosts().unwrap();
        assert!(hosts.values().all(Resolution::is_canister));
    }

    #[test]
    fn test_default_gateway() {
        let gateway = default_gateway().unwrap();
        assert_eq!(gateway.as_str(), "https://ic0.app/");
    }
}
