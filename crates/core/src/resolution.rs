//! Resolution outcome types.

use crate::principal::Principal;
use url::Url;

/// Where a canister lives: its principal and the gateway that serves it.
///
/// The two always travel together; a canister without a gateway is not
/// representable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanisterLocation {
    pub principal: Principal,
    pub gateway: Url,
}

/// The verdict for a domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Ordinary web content; route it untouched.
    NotCanister,
    /// Canister content served through the given gateway.
    Canister(CanisterLocation),
}

impl Resolution {
    pub fn is_canister(&self) -> bool {
        matches!(self, Resolution::Canister(_))
    }

    /// The canister location, if any.
    pub fn location(&self) -> Option<&CanisterLocation> {
        match self {
            Resolution::Canister(location) => Some(location),
            Resolution::NotCanister => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_canister() {
        assert!(!Resolution::NotCanister.is_canister());

        let location = CanisterLocation {
            principal: Principal::from_text("rdmx6-jaaaa-aaaaa-aaadq-cai").unwrap(),
            gateway: Url::parse("https://ic0.app").unwrap(),
        };
        assert!(Resolution::Canister(location).is_canister());
    }

    #[test]
    fn test_location_accessor() {
        assert!(Resolution::NotCanister.location().is_none());

        let location = CanisterLocation {
            principal: Principal::from_text("2vxsx-fae").unwrap(),
            gateway: Url::parse("https://icp0.io").unwrap(),
        };
        let resolution = Resolution::Canister(location.clone());
        assert_eq!(resolution.location(), Some(&location));
    }
}
