//! File-backed storage, configuration and schema files for the form schema
//! engine.
//!
//! - [`FileGateway`]: a [`PersistenceGateway`](form_schema_core::PersistenceGateway)
//!   keeping one JSON document per key in a directory.
//! - [`BuilderConfig`]: YAML configuration selecting the storage backend and
//!   validation/library settings.
//! - [`read_schema_file`] / [`write_schema_file`]: JSON import and export of
//!   a single schema.
//!
//! # Quick start
//!
//! ```no_run
//! use std::sync::Arc;
//! use form_schema_core::SchemaLibrary;
//! use form_schema_db::{BuilderConfig, FileGateway};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = BuilderConfig::load_or_default("form-schema.yml")?;
//! let gateway = Arc::new(FileGateway::new(config.storage.resolved_path()));
//! let library = SchemaLibrary::open_with(
//!     gateway,
//!     config.library.key.clone(),
//!     config.library.duplicate_names,
//! )
//! .await?;
//! for name in library.names() {
//!     println!("{name}");
//! }
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod file;
mod import;

pub use config::{BuilderConfig, LibraryConfig, StorageBackend, StorageConfig, ValidationConfig};
pub use error::{DatabaseError, Result};
pub use file::{FileGateway, validate_key};
pub use import::{read_schema_file, write_schema_file};
