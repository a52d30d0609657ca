//! Database connection management with pragma configuration.
//!
//! This module handles opening the SQLite database, applying required pragmas
//! for performance and concurrency (WAL mode), and running migrations.

use super::migrations;
use crate::ResolveError;
use std::path::Path;
use tokio_rusqlite::Connection;

/// SQLite-backed host store handle.
///
/// Wraps a tokio-rusqlite Connection that runs database operations
/// on a background thread.
#[derive(Clone, Debug)]
pub struct SqliteStore {
    pub(crate) conn: Connection,
}

impl SqliteStore {
    /// Open a database at the specified path.
    ///
    /// Creates the file if it doesn't exist, applies performance pragmas,
    /// and runs any pending migrations.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, ResolveError> {
        let conn = Connection::open(path).await.map_err(ResolveError::from)?;
        Self::prepare(conn).await
    }

    /// Open an in-memory database for testing.
    ///
    /// Creates a temporary in-memory SQLite database with the same
    /// pragma configuration as file-based databases.
    pub async fn open_in_memory() -> Result<Self, ResolveError> {
        let conn = Connection::open_in_memory().await.map_err(ResolveError::from)?;
        Self::prepare(conn).await
    }

    async fn prepare(conn: Connection) -> Result<Self, ResolveError> {
        conn.call(|conn| -> Result<(), ResolveError> {
            conn.execute_batch(
                "PRAGMA journal_mode=WAL;
                 PRAGMA synchronous=NORMAL;
                 PRAGMA temp_store=MEMORY;
                 PRAGMA foreign_keys=ON;",
            )?;
            Ok(())
        })
        .await
        .map_err(ResolveError::from)?;

        migrations::run(&conn).await?;

        Ok(Self { conn })
    }
}
