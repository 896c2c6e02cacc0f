//! Migration lifecycle operations for the SQLite store.
//!
//! Provides [`Migration`] for creating and dropping the entries table and
//! reporting its state. Mutations run inside transactions.
//!
//! # Example
//!
//! ```no_run
//! use form_schema_sqlite::Migration;
//! use rusqlite::Connection;
//!
//! let conn = Connection::open("form-schemas.db").unwrap();
//! let mut migration = Migration::new(conn, "form_").unwrap();
//!
//! // Create tables
//! migration.up().unwrap();
//!
//! // Check status
//! let status = migration.status().unwrap();
//! assert!(status.tables_exist);
//!
//! // Drop everything
//! migration.down().unwrap();
//! ```

use rusqlite::Connection;
use tracing::info;

use crate::error::{Result, SqliteError};
use crate::schema::{entries_table, generate_drop_sql, generate_schema_sql, validate_prefix};

/// Manages the lifecycle of the store's tables.
///
/// Provides operations to create tables ([`up`](Self::up)), drop them
/// ([`down`](Self::down)) and check the current state
/// ([`status`](Self::status)).
pub struct Migration {
    conn: Connection,
    prefix: String,
}

impl Migration {
    /// Creates a migration manager for the given connection and table prefix.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteError::InvalidPrefix`] if the prefix contains invalid characters.
    pub fn new(conn: Connection, prefix: impl Into<String>) -> Result<Self> {
        let prefix = prefix.into();
        validate_prefix(&prefix)?;
        Ok(Self { conn, prefix })
    }

    /// Creates the entries table.
    ///
    /// Uses `CREATE TABLE IF NOT EXISTS` so it is safe to call multiple times.
    pub fn up(&mut self) -> Result<()> {
        let sql = generate_schema_sql(&self.prefix)?;
        let tx = self.conn.transaction()?;
        tx.execute_batch(&sql)
            .map_err(|e| SqliteError::MigrationError(format!("failed to create tables: {e}")))?;
        tx.commit()?;
        info!(prefix = %self.prefix, "migrated up");
        Ok(())
    }

    /// Drops the entries table and every value stored in it.
    ///
    /// Uses `DROP TABLE IF EXISTS` so it is safe to call even if the table
    /// does not exist.
    pub fn down(&mut self) -> Result<()> {
        let sql = generate_drop_sql(&self.prefix)?;
        let tx = self.conn.transaction()?;
        tx.execute_batch(&sql)
            .map_err(|e| SqliteError::MigrationError(format!("failed to drop tables: {e}")))?;
        tx.commit()?;
        info!(prefix = %self.prefix, "migrated down");
        Ok(())
    }

    /// Returns whether the table exists and how many keys it holds.
    pub fn status(&self) -> Result<MigrationStatus> {
        if !self.tables_exist()? {
            return Ok(MigrationStatus {
                tables_exist: false,
                entry_count: 0,
            });
        }

        Ok(MigrationStatus {
            tables_exist: true,
            entry_count: self.count_rows()?,
        })
    }

    /// Returns the table prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns a reference to the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Consumes the migration and returns the underlying connection.
    pub fn into_connection(self) -> Connection {
        self.conn
    }

    fn tables_exist(&self) -> Result<bool> {
        let mut stmt = self
            .conn
            .prepare("SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1")?;
        let count: i64 = stmt.query_row([entries_table(&self.prefix)], |row| row.get(0))?;
        Ok(count > 0)
    }

    fn count_rows(&self) -> Result<usize> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT COUNT(*) FROM {}",
            entries_table(&self.prefix)
        ))?;
        let count: i64 = stmt.query_row([], |row| row.get(0))?;
        row_count(count)
    }
}

fn row_count(count: i64) -> Result<usize> {
    usize::try_from(count)
        .map_err(|_| SqliteError::MigrationError(format!("row count out of range: {count}")))
}

/// Status of the current migration state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStatus {
    /// Whether the entries table exists.
    pub tables_exist: bool,
    /// Number of keys stored.
    pub entry_count: usize,
}
