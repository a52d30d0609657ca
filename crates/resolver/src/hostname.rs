//! Hostname conventions: raw suffixes, embedded identifiers, gateway URLs.

use canroute_core::{CanisterLocation, Principal, ResolveError};
use url::Url;

/// Whether the hostname carries a raw suffix and is served as plain web
/// content, bypassing resolution entirely.
pub fn is_raw_hostname(hostname: &str, raw_suffixes: &[String]) -> bool {
    raw_suffixes.iter().any(|suffix| hostname.ends_with(suffix.as_str()))
}

/// Build and validate a gateway URL from a bare hostname.
///
/// The input must be nothing but a hostname: anything that smuggles in a
/// scheme, port, path, query, or credentials is rejected.
pub fn gateway_url(hostname: &str) -> Result<Url, ResolveError> {
    let normalized = hostname.trim().to_ascii_lowercase();
    if normalized.is_empty() {
        return Err(ResolveError::MalformedHostname("empty gateway hostname".into()));
    }

    let url = Url::parse(&format!("https://{normalized}"))
        .map_err(|e| ResolveError::MalformedHostname(format!("{hostname:?}: {e}")))?;

    if url.host_str() != Some(normalized.as_str()) {
        return Err(ResolveError::MalformedHostname(format!("{hostname:?} is not a bare hostname")));
    }

    Ok(url)
}

/// Read a canister location embedded in the hostname itself.
///
/// The first label must parse as a principal and the remaining labels name
/// the gateway. A first label that is not a principal means the URL simply
/// does not carry one, so that case is `None` rather than an error; a
/// principal label in front of an invalid gateway is an error.
pub fn embedded_canister(url: &Url) -> Result<Option<CanisterLocation>, ResolveError> {
    let Some(hostname) = url.host_str() else {
        return Ok(None);
    };
    let Some((first, rest)) = hostname.split_once('.') else {
        return Ok(None);
    };
    let Ok(principal) = Principal::from_text(first) else {
        return Ok(None);
    };

    let gateway = gateway_url(rest)?;
    Ok(Some(CanisterLocation { principal, gateway }))
}

/// Rewrite a URL to HTTPS. Probes never go out over plaintext.
pub fn force_https(url: &Url) -> Result<Url, ResolveError> {
    if url.scheme() == "https" {
        return Ok(url.clone());
    }

    let mut secure = url.clone();
    secure
        .set_scheme("https")
        .map_err(|()| ResolveError::MalformedHostname(format!("{url} cannot be probed over https")))?;
    Ok(secure)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn suffixes() -> Vec<String> {
        vec![".raw.ic0.app".into(), ".raw.icp0.io".into()]
    }

    #[test]
    fn test_raw_hostname_matches_suffix() {
        assert!(is_raw_hostname("aaaaa-aa.raw.icp0.io", &suffixes()));
        assert!(is_raw_hostname("my-app.raw.ic0.app", &suffixes()));
    }

    #[test]
    fn test_raw_hostname_requires_subdomain() {
        assert!(!is_raw_hostname("raw.ic0.app", &suffixes()));
        assert!(!is_raw_hostname("ic0.app", &suffixes()));
        assert!(!is_raw_hostname("example.com", &suffixes()));
    }

    #[test]
    fn test_gateway_url_basic() {
        let url = gateway_url("ic0.app").unwrap();
        assert_eq!(url.as_str(), "https://ic0.app/");
    }

    #[test]
    fn test_gateway_url_normalizes_case_and_whitespace() {
        let url = gateway_url("  IC0.App ").unwrap();
        assert_eq!(url.host_str(), Some("ic0.app"));
    }

    #[test]
    fn test_gateway_url_rejects_non_hostnames() {
        for input in ["", "ic0.app/path", "ic0.app:8080", "user@ic0.app", "ic0.app?q=1", "https://ic0.app"] {
            assert!(
                matches!(gateway_url(input), Err(ResolveError::MalformedHostname(_))),
                "accepted {input:?}"
            );
        }
    }

    #[test]
    fn test_embedded_canister_decodes() {
        let url = Url::parse("https://rdmx6-jaaaa-aaaaa-aaadq-cai.ic0.app/about").unwrap();
        let location = embedded_canister(&url).unwrap().unwrap();
        assert_eq!(location.principal.to_text(), "rdmx6-jaaaa-aaaaa-aaadq-cai");
        assert_eq!(location.gateway.as_str(), "https://ic0.app/");
    }

    #[test]
    fn test_embedded_canister_absent_for_plain_hosts() {
        for input in ["https://example.com/", "https://www.example.com/", "https://localhost/"] {
            let url = Url::parse(input).unwrap();
            assert!(embedded_canister(&url).unwrap().is_none());
        }
    }

    #[test]
    fn test_embedded_canister_requires_gateway_labels() {
        // A lone principal hostname has nowhere to point traffic.
        let url = Url::parse("https://aaaaa-aa/").unwrap();
        assert!(embedded_canister(&url).unwrap().is_none());
    }

    #[test]
    fn test_embedded_canister_with_invalid_gateway_is_an_error() {
        let url = Url::parse("https://aaaaa-aa./").unwrap();
        assert!(matches!(embedded_canister(&url), Err(ResolveError::MalformedHostname(_))));
    }

    #[test]
    fn test_force_https() {
        let url = Url::parse("http://example.com/api/v2").unwrap();
        let secure = force_https(&url).unwrap();
        assert_eq!(secure.as_str(), "https://example.com/api/v2");

        let already = Url::parse("https://example.com/").unwrap();
        assert_eq!(force_https(&already).unwrap(), already);
    }
}
