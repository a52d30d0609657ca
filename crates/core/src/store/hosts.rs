//! Host row queries.
//!
//! Expiry is enforced in SQL: reads only see rows with `expires_at` in the
//! future, so callers never observe a stale record. Timestamps are RFC 3339
//! UTC strings, which order lexicographically.

use super::connection::SqliteStore;
use super::record::HostRecord;
use super::{HostStore, ResolveError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

#[async_trait]
impl HostStore for SqliteStore {
    async fn get(&self, origin: &str) -> Result<Option<HostRecord>, ResolveError> {
        let origin = origin.to_string();
        let now = Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<Option<HostRecord>, ResolveError> {
                let mut stmt = conn.prepare(
                    "SELECT canister, principal, gateway
                     FROM hosts WHERE origin = ?1 AND expires_at > ?2",
                )?;

                let result = stmt.query_row(params![origin, now], |row| {
                    Ok(HostRecord {
                        canister: row.get::<_, i32>(0)? == 1,
                        principal: row.get(1)?,
                        gateway: row.get(2)?,
                    })
                });

                match result {
                    Ok(record) => Ok(Some(record)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(ResolveError::from)
    }

    async fn put(&self, origin: &str, record: &HostRecord, expires_at: DateTime<Utc>) -> Result<(), ResolveError> {
        let origin = origin.to_string();
        let record = record.clone();
        let stored_at = Utc::now().to_rfc3339();
        let expires_at = expires_at.to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), ResolveError> {
                conn.execute(
                    "INSERT INTO hosts (origin, canister, principal, gateway, stored_at, expires_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                     ON CONFLICT(origin) DO UPDATE SET
                        canister = excluded.canister,
                        principal = excluded.principal,
                        gateway = excluded.gateway,
                        stored_at = excluded.stored_at,
                        expires_at = excluded.expires_at",
                    params![origin, record.canister as i32, record.principal, record.gateway, stored_at, expires_at],
                )?;
                Ok(())
            })
            .await
            .map_err(ResolveError::from)
    }

    async fn purge_expired(&self) -> Result<u64, ResolveError> {
        let now = Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<u64, ResolveError> {
                let count = conn.execute("DELETE FROM hosts WHERE expires_at <= ?1", params![now])?;
                Ok(count as u64)
            })
            .await
            .map_err(ResolveError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn canister_record() -> HostRecord {
        HostRecord {
            canister: true,
            principal: Some("rdmx6-jaaaa-aaaaa-aaadq-cai".into()),
            gateway: Some("https://ic0.app/".into()),
        }
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        let record = canister_record();

        store
            .put("https://dapp.example", &record, Utc::now() + Duration::hours(1))
            .await
            .unwrap();

        let retrieved = store.get("https://dapp.example").await.unwrap().unwrap();
        assert_eq!(retrieved, record);
    }

    #[tokio::test]
    async fn test_get_missing() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        let result = store.get("https://nowhere.example").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_expired_row_is_invisible() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        store
            .put("https://old.example", &canister_record(), Utc::now() - Duration::seconds(10))
            .await
            .unwrap();

        assert!(store.get("https://old.example").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        let origin = "https://dapp.example";

        store
            .put(origin, &canister_record(), Utc::now() + Duration::hours(1))
            .await
            .unwrap();

        let flipped = HostRecord { canister: false, principal: None, gateway: None };
        store.put(origin, &flipped, Utc::now() + Duration::hours(1)).await.unwrap();

        let retrieved = store.get(origin).await.unwrap().unwrap();
        assert_eq!(retrieved, flipped);
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        store
            .put("https://old.example", &canister_record(), Utc::now() - Duration::seconds(10))
            .await
            .unwrap();
        store
            .put("https://fresh.example", &canister_record(), Utc::now() + Duration::hours(1))
            .await
            .unwrap();

        let purged = store.purge_expired().await.unwrap();
        assert_eq!(purged, 1);

        assert!(store.get("https://fresh.example").await.unwrap().is_some());
    }
}
