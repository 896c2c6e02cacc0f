//! Persistence gateway backed by an SQLite table.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use form_schema_core::{PersistenceError, PersistenceGateway};
use rusqlite::{Connection, OptionalExtension, params};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::Result;
use crate::migration::Migration;
use crate::schema::entries_table;

/// Gateway storing each key as one row of `{prefix}entries`.
///
/// Values are stored as JSON text. A save replaces the row for its key in a
/// single statement, so readers see either the old or the new value.
///
/// # Examples
///
/// ```
/// use form_schema_core::PersistenceGateway;
/// use form_schema_sqlite::SqliteGateway;
/// use serde_json::json;
///
/// let gateway = SqliteGateway::open_in_memory("form_").unwrap();
/// let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
/// rt.block_on(async {
///     gateway.save("savedSchemas", json!([])).await.unwrap();
///     assert_eq!(gateway.load("savedSchemas").await.unwrap(), Some(json!([])));
///     assert_eq!(gateway.load("other").await.unwrap(), None);
/// });
/// ```
pub struct SqliteGateway {
    conn: Mutex<Connection>,
    table: String,
}

impl std::fmt::Debug for SqliteGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteGateway")
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}

impl SqliteGateway {
    /// Wraps `conn`, creating the entries table for `prefix` if needed.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteError::InvalidPrefix`](crate::SqliteError::InvalidPrefix)
    /// for a bad prefix, or a database error if the table cannot be created.
    pub fn new(conn: Connection, prefix: impl Into<String>) -> Result<Self> {
        let mut migration = Migration::new(conn, prefix)?;
        migration.up()?;
        Ok(Self::from_migration(migration))
    }

    /// Opens (or creates) the database file at `path`.
    pub fn open(path: impl AsRef<Path>, prefix: impl Into<String>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        let gateway = Self::new(conn, prefix)?;
        info!(path = %path.display(), table = %gateway.table, "opened sqlite store");
        Ok(gateway)
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory(prefix: impl Into<String>) -> Result<Self> {
        Self::new(Connection::open_in_memory()?, prefix)
    }

    /// Uses the connection of an existing migration without re-running it.
    pub fn from_migration(migration: Migration) -> Self {
        let table = entries_table(migration.prefix());
        Self {
            conn: Mutex::new(migration.into_connection()),
            table,
        }
    }

    /// Returns every stored key in ascending order.
    pub fn keys(&self) -> Result<Vec<String>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(&format!("SELECT key FROM {} ORDER BY key", self.table))?;
        let keys = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(keys)
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        // Statements run to completion or roll back, so a poisoned
        // connection is still consistent.
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn upsert(&self, key: &str, text: &str) -> Result<()> {
        let conn = self.lock();
        conn.execute(
            &format!(
                "INSERT INTO {table} (key, value, updated_at) VALUES (?1, ?2, datetime('now')) \
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                table = self.table
            ),
            params![key, text],
        )?;
        Ok(())
    }

    fn select(&self, key: &str) -> Result<Option<String>> {
        let conn = self.lock();
        let text = conn
            .query_row(
                &format!("SELECT value FROM {} WHERE key = ?1", self.table),
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(text)
    }
}

#[async_trait]
impl PersistenceGateway for SqliteGateway {
    async fn save(&self, key: &str, value: Value) -> std::result::Result<(), PersistenceError> {
        let text = serde_json::to_string(&value).map_err(|source| PersistenceError::Malformed {
            key: key.to_string(),
            source,
        })?;
        self.upsert(key, &text)?;
        debug!(key, table = %self.table, bytes = text.len(), "saved row");
        Ok(())
    }

    async fn load(&self, key: &str) -> std::result::Result<Option<Value>, PersistenceError> {
        let Some(text) = self.select(key)? else {
            return Ok(None);
        };
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|source| PersistenceError::Malformed {
                key: key.to_string(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn test_save_replaces_previous_value() {
        let gateway = SqliteGateway::open_in_memory("form_").unwrap();
        gateway.save("k", json!([1])).await.unwrap();
        gateway.save("k", json!([1, 2])).await.unwrap();
        assert_eq!(gateway.load("k").await.unwrap(), Some(json!([1, 2])));
        assert_eq!(gateway.keys().unwrap(), vec!["k".to_string()]);
    }

    #[tokio::test]
    async fn test_corrupt_row_is_malformed() {
        let gateway = SqliteGateway::open_in_memory("form_").unwrap();
        gateway
            .lock()
            .execute(
                "INSERT INTO form_entries (key, value) VALUES ('savedSchemas', 'not json')",
                [],
            )
            .unwrap();
        let err = gateway.load("savedSchemas").await.unwrap_err();
        assert!(matches!(err, PersistenceError::Malformed { .. }));
    }

    #[tokio::test]
    async fn test_dropped_table_is_backend_error() {
        let gateway = SqliteGateway::open_in_memory("form_").unwrap();
        gateway
            .lock()
            .execute_batch("DROP TABLE form_entries;")
            .unwrap();
        let err = gateway.save("k", json!(null)).await.unwrap_err();
        assert!(matches!(err, PersistenceError::Backend(_)));
    }

    #[test]
    fn test_bad_prefix_is_rejected() {
        assert!(SqliteGateway::open_in_memory("bad prefix").is_err());
    }
}
