//! In-memory host store.
//!
//! Same contract as the SQLite backend, minus persistence. Useful for
//! embedding the resolver without a database and for tests.

use super::record::HostRecord;
use super::{HostStore, ResolveError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, StoredEntry>>>,
}

#[derive(Debug, Clone)]
struct StoredEntry {
    record: HostRecord,
    expires_at: DateTime<Utc>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HostStore for MemoryStore {
    async fn get(&self, origin: &str) -> Result<Option<HostRecord>, ResolveError> {
        let entries = self.entries.read().await;
        match entries.get(origin) {
            Some(entry) if entry.expires_at > Utc::now() => Ok(Some(entry.record.clone())),
            _ => Ok(None),
        }
    }

    async fn put(&self, origin: &str, record: &HostRecord, expires_at: DateTime<Utc>) -> Result<(), ResolveError> {
        let mut entries = self.entries.write().await;
        entries.insert(origin.to_string(), StoredEntry { record: record.clone(), expires_at });
        Ok(())
    }

    async fn purge_expired(&self) -> Result<u64, ResolveError> {
        let now = Utc::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        Ok((before - entries.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn not_canister() -> HostRecord {
        HostRecord { canister: false, principal: None, gateway: None }
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let store = MemoryStore::new();
        store
            .put("https://dapp.example", &not_canister(), Utc::now() + Duration::hours(1))
            .await
            .unwrap();

        let retrieved = store.get("https://dapp.example").await.unwrap();
        assert_eq!(retrieved, Some(not_canister()));
    }

    #[tokio::test]
    async fn test_expired_entry_is_invisible() {
        let store = MemoryStore::new();
        store
            .put("https://old.example", &not_canister(), Utc::now() - Duration::seconds(1))
            .await
            .unwrap();

        assert!(store.get("https://old.example").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_purge_expired_counts() {
        let store = MemoryStore::new();
        store
            .put("https://old.example", &not_canister(), Utc::now() - Duration::seconds(1))
            .await
            .unwrap();
        store
            .put("https://fresh.example", &not_canister(), Utc::now() + Duration::hours(1))
            .await
            .unwrap();

        assert_eq!(store.purge_expired().await.unwrap(), 1);
        assert!(store.get("https://fresh.example").await.unwrap().is_some());
    }
}
