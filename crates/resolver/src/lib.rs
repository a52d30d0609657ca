//! Domain resolution engine for canroute.
//!
//! This crate decides, per domain, whether traffic belongs to ordinary web
//! content or to a canister behind a gateway. It provides the staged lookup
//! pipeline, in-flight deduplication, the retrying HTTPS probe, and the
//! gateway-consistency rewrite.

pub mod engine;
pub mod event;
pub mod headers;
pub mod hostname;
pub mod probe;
pub mod wellknown;

pub use engine::{CanisterResolver, ResolverConfig};
pub use event::HostInfoEvent;
pub use headers::{LookupHeaders, canister_from_headers};
pub use probe::{HttpProbe, ProbeConfig, ProbeResponse, ProbeTransport};
