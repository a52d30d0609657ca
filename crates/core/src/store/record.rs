//! Stored form of a resolution.

use crate::error::ResolveError;
use crate::principal::Principal;
use crate::resolution::{CanisterLocation, Resolution};
use url::Url;

/// A resolution flattened into storable strings.
///
/// Records are re-validated on every read. A stored principal or gateway
/// that no longer parses is reported, not silently treated as a miss, so
/// corruption surfaces instead of causing endless re-probing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostRecord {
    pub canister: bool,
    pub principal: Option<String>,
    pub gateway: Option<String>,
}

impl HostRecord {
    pub fn from_resolution(resolution: &Resolution) -> Self {
        match resolution {
            Resolution::NotCanister => Self { canister: false, principal: None, gateway: None },
            Resolution::Canister(location) => Self {
                canister: true,
                principal: Some(location.principal.to_text()),
                gateway: Some(location.gateway.to_string()),
            },
        }
    }

    /// Rebuild the resolution this record was written from.
    ///
    /// # Errors
    ///
    /// - `ResolveError::Store` if a canister record is missing its principal
    ///   or gateway, or the stored gateway is not a URL
    /// - `ResolveError::MalformedPrincipal` if the stored principal no
    ///   longer validates
    pub fn to_resolution(&self) -> Result<Resolution, ResolveError> {
        if !self.canister {
            return Ok(Resolution::NotCanister);
        }

        let (Some(principal), Some(gateway)) = (self.principal.as_deref(), self.gateway.as_deref()) else {
            return Err(ResolveError::Store("canister record missing principal or gateway".into()));
        };

        let principal = Principal::from_text(principal)?;
        let gateway =
            Url::parse(gateway).map_err(|e| ResolveError::Store(format!("stored gateway is not a URL: {e}")))?;

        Ok(Resolution::Canister(CanisterLocation { principal, gateway }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_canister_round_trip() {
        let record = HostRecord::from_resolution(&Resolution::NotCanister);
        assert!(!record.canister);
        assert!(record.principal.is_none());
        assert!(record.gateway.is_none());
        assert_eq!(record.to_resolution().unwrap(), Resolution::NotCanister);
    }

    #[test]
    fn test_canister_round_trip() {
        let resolution = Resolution::Canister(CanisterLocation {
            principal: Principal::from_text("rdmx6-jaaaa-aaaaa-aaadq-cai").unwrap(),
            gateway: Url::parse("https://ic0.app").unwrap(),
        });
        let record = HostRecord::from_resolution(&resolution);
        assert!(record.canister);
        assert_eq!(record.principal.as_deref(), Some("rdmx6-jaaaa-aaaaa-aaadq-cai"));
        assert_eq!(record.to_resolution().unwrap(), resolution);
    }

    #[test]
    fn test_canister_record_missing_fields() {
        let record = HostRecord { canister: true, principal: None, gateway: None };
        assert!(matches!(record.to_resolution(), Err(ResolveError::Store(_))));

        let record = HostRecord {
            canister: true,
            principal: Some("rdmx6-jaaaa-aaaaa-aaadq-cai".into()),
            gateway: None,
        };
        assert!(matches!(record.to_resolution(), Err(ResolveError::Store(_))));
    }

    #[test]
    fn test_corrupt_principal_reported() {
        let record = HostRecord {
            canister: true,
            principal: Some("not-a-principal!".into()),
            gateway: Some("https://ic0.app/".into()),
        };
        assert!(matches!(record.to_resolution(), Err(ResolveError::MalformedPrincipal(_))));
    }

    #[test]
    fn test_corrupt_gateway_reported() {
        let record = HostRecord {
            canister: true,
            principal: Some("rdmx6-jaaaa-aaaaa-aaadq-cai".into()),
            gateway: Some("not a url".into()),
        };
        assert!(matches!(record.to_resolution(), Err(ResolveError::Store(_))));
    }
}
