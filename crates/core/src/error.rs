//! Unified error types for canroute.
//!
//! Every fallible resolution path reports through [`ResolveError`]. The enum
//! is `Clone` because a single in-flight resolution can be awaited by many
//! callers, each of which receives its own copy of the outcome.

use crate::principal::PrincipalError;
use tokio_rusqlite::rusqlite;

/// Unified error type for domain resolution.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ResolveError {
    /// A canister identifier failed validation. Permanent: never retried.
    #[error("MALFORMED_PRINCIPAL: {0}")]
    MalformedPrincipal(#[from] PrincipalError),

    /// A gateway hostname failed validation. Permanent: never retried.
    #[error("MALFORMED_HOSTNAME: {0}")]
    MalformedHostname(String),

    /// The probe transport failed. Retried up to the attempt ceiling.
    #[error("TRANSPORT: {0}")]
    Transport(String),

    /// Host store read or open failed.
    #[error("STORE: {0}")]
    Store(String),

    /// The serving origin does not itself resolve to a canister, so there
    /// is no current gateway to rewrite against.
    #[error("CURRENT_GATEWAY: serving origin does not resolve to a canister")]
    CurrentGatewayNotCanister,
}

impl From<tokio_rusqlite::Error<ResolveError>> for ResolveError {
    fn from(err: tokio_rusqlite::Error<ResolveError>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            other => ResolveError::Store(other.to_string()),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for ResolveError {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        ResolveError::Store(err.to_string())
    }
}

impl From<rusqlite::Error> for ResolveError {
    fn from(err: rusqlite::Error) -> Self {
        ResolveError::Store(err.to_string())
    }
}

impl ResolveError {
    /// Whether another probe attempt could change the outcome.
    ///
    /// Only transport failures are transient; validation failures are
    /// properties of the input and repeat identically.
    pub fn is_transient(&self) -> bool {
        matches!(self, ResolveError::Transport(_))
    }
}
