//! SQLite storage backend for saved form schemas.
//!
//! This crate stores the values of the schema library's key-value contract
//! in a single prefixed SQLite table, with migration lifecycle management.
//!
//! # Architecture
//!
//! - **`schema`**: SQL generation with customizable table prefixes
//! - **`migration`**: lifecycle operations (up/down/status)
//! - **`gateway`**: [`SqliteGateway`], the
//!   [`PersistenceGateway`](form_schema_core::PersistenceGateway)
//!   implementation
//!
//! # Quick start
//!
//! ```no_run
//! use std::sync::Arc;
//! use form_schema_core::SchemaLibrary;
//! use form_schema_sqlite::SqliteGateway;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let gateway = Arc::new(SqliteGateway::open("form-schemas.db", "form_")?);
//! let library = SchemaLibrary::open(gateway).await?;
//! println!("{} saved schemas", library.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Table prefix customization
//!
//! The table name is prefixed with a configurable string, allowing multiple
//! isolated stores within the same SQLite database. Prefixes must contain
//! only ASCII letters, digits and underscores.

mod error;
mod gateway;
mod migration;
mod schema;

pub use error::{Result, SqliteError};
pub use gateway::SqliteGateway;
pub use migration::{Migration, MigrationStatus};
pub use schema::{generate_drop_sql, generate_schema_sql};
