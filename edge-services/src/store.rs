//! Snapshot Store
//!
//! SQLite-backed registry of the collector's datasets. Each row holds one
//! key, its JSON payload, and the time it was last refreshed. The widget
//! API only reads, except for the fear & greed cache refresh.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use edge_core::{Snapshot, SnapshotMeta};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error for `{key}`: {error}")]
    Serialization { key: String, error: String },

    #[error("IO error: {0}")]
    Io(String),
}

/// Read and write access to stored snapshots
pub trait SnapshotStore: Send + Sync {
    /// Read one snapshot; a missing key is `Ok(None)`
    fn read(&self, key: &str) -> Result<Option<Snapshot>, StoreError>;

    /// Insert or replace a snapshot, stamping it with the current time
    fn upsert(&self, key: &str, payload: &Value) -> Result<(), StoreError>;

    /// Keys and timestamps of every stored snapshot, ordered by key
    fn list(&self) -> Result<Vec<SnapshotMeta>, StoreError>;
}

/// Snapshot registry on a single SQLite connection
#[derive(Clone)]
pub struct SqliteSnapshotStore {
    db: Arc<parking_lot::Mutex<Connection>>,
}

impl SqliteSnapshotStore {
    /// Open (or create) the registry at `db_path`
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self, StoreError> {
        if let Some(parent) = db_path.as_ref().parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Io(format!("Failed to create database directory: {}", e))
            })?;
        }

        let conn = Connection::open(db_path.as_ref())?;
        let store = Self::from_connection(conn)?;

        info!("Opened snapshot store at: {}", db_path.as_ref().display());
        Ok(store)
    }

    /// Create an in-memory store (useful for testing)
    pub fn new_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS edge_dataset_registry (
                dataset_key TEXT PRIMARY KEY,
                payload JSON NOT NULL,
                updated_at INTEGER
            );
            "#,
        )?;

        Ok(Self {
            db: Arc::new(parking_lot::Mutex::new(conn)),
        })
    }

    /// Write a snapshot with an explicit timestamp, as the collector does
    pub fn put_at(
        &self,
        key: &str,
        payload: &Value,
        updated_at: Option<DateTime<Utc>>,
    ) -> Result<(), StoreError> {
        let data = serde_json::to_string(payload).map_err(|e| StoreError::Serialization {
            key: key.to_string(),
            error: e.to_string(),
        })?;

        let conn = self.db.lock();
        conn.execute(
            r#"
            INSERT INTO edge_dataset_registry (dataset_key, payload, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (dataset_key)
            DO UPDATE SET payload = excluded.payload, updated_at = excluded.updated_at
            "#,
            params![key, data, updated_at.map(|ts| ts.timestamp_millis())],
        )?;

        debug!("Stored snapshot: {}", key);
        Ok(())
    }
}

fn from_millis(ms: Option<i64>) -> Option<DateTime<Utc>> {
    ms.and_then(DateTime::from_timestamp_millis)
}

impl SnapshotStore for SqliteSnapshotStore {
    fn read(&self, key: &str) -> Result<Option<Snapshot>, StoreError> {
        let row = {
            let conn = self.db.lock();
            conn.query_row(
                "SELECT payload, updated_at FROM edge_dataset_registry WHERE dataset_key = ?1",
                params![key],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, Option<i64>>(1)?)),
            )
            .optional()?
        };

        let Some((data, updated_at)) = row else {
            return Ok(None);
        };

        let payload = serde_json::from_str(&data).map_err(|e| StoreError::Serialization {
            key: key.to_string(),
            error: e.to_string(),
        })?;

        Ok(Some(Snapshot {
            key: key.to_string(),
            payload,
            updated_at: from_millis(updated_at),
        }))
    }

    fn upsert(&self, key: &str, payload: &Value) -> Result<(), StoreError> {
        self.put_at(key, payload, Some(Utc::now()))
    }

    fn list(&self) -> Result<Vec<SnapshotMeta>, StoreError> {
        let conn = self.db.lock();
        let mut stmt = conn.prepare(
            "SELECT dataset_key, updated_at FROM edge_dataset_registry ORDER BY dataset_key",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(SnapshotMeta {
                key: row.get(0)?,
                updated_at: from_millis(row.get::<_, Option<i64>>(1)?),
            })
        })?;

        let snapshots = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(snapshots)
    }
}
