//! TTL-backed host store.
//!
//! Resolved hosts are cached under their origin key with an absolute expiry.
//! The store enforces expiry itself: an expired entry is indistinguishable
//! from an absent one. Backends:
//!
//! - [`SqliteStore`]: persistent, WAL mode, automatic schema migrations
//! - [`MemoryStore`]: process-local, for embedding and tests

pub mod connection;
pub mod hosts;
pub mod memory;
pub mod migrations;
pub mod record;

pub use crate::ResolveError;

pub use connection::SqliteStore;
pub use memory::MemoryStore;
pub use record::HostRecord;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Keyed TTL storage for resolved hosts.
///
/// Keys are ASCII origin serializations (`scheme://host[:port]`). All
/// methods are cancel-safe; a `put` racing a `get` for the same origin is a
/// last-writer-wins overwrite, which is acceptable because both writers hold
/// an equally fresh resolution.
#[async_trait]
pub trait HostStore: Send + Sync {
    /// Fetch the record for an origin, if present and unexpired.
    async fn get(&self, origin: &str) -> Result<Option<HostRecord>, ResolveError>;

    /// Insert or replace the record for an origin.
    async fn put(&self, origin: &str, record: &HostRecord, expires_at: DateTime<Utc>) -> Result<(), ResolveError>;

    /// Drop expired entries, returning how many were removed.
    async fn purge_expired(&self) -> Result<u64, ResolveError>;
}
