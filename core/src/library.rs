//! Saved schema library.
//!
//! [`SchemaLibrary`] keeps the in-memory list of saved [`Schema`]s and
//! writes it through a [`PersistenceGateway`] under a single key (by
//! default [`SAVED_SCHEMAS_KEY`]). The stored value is the whole ordered
//! sequence, so every save rewrites it.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use form_schema_core::*;
//!
//! let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! rt.block_on(async {
//!     let gateway = Arc::new(MemoryGateway::new());
//!     let mut library = SchemaLibrary::open(gateway.clone()).await.unwrap();
//!
//!     let fields = vec![Field::new(FieldType::Text, "Name")];
//!     library.save(Schema::new("Survey", fields.clone())).await.unwrap();
//!
//!     // A second library over the same storage sees the saved schema.
//!     let reopened = SchemaLibrary::open(gateway).await.unwrap();
//!     assert_eq!(reopened.names(), vec!["Survey"]);
//!     assert_eq!(reopened.get("Survey").unwrap().fields, fields);
//! });
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{LibraryError, PersistenceError, PersistenceGateway, SAVED_SCHEMAS_KEY, Schema};

/// What to do when saving a schema whose name is already taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateNamePolicy {
    /// Append another entry with the same name (the default).
    #[default]
    Allow,
    /// Refuse the save with [`LibraryError::DuplicateName`].
    Reject,
    /// Drop every existing entry with that name, then append.
    Replace,
}

impl fmt::Display for DuplicateNamePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DuplicateNamePolicy::Allow => "allow",
            DuplicateNamePolicy::Reject => "reject",
            DuplicateNamePolicy::Replace => "replace",
        })
    }
}

impl FromStr for DuplicateNamePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "allow" => Ok(DuplicateNamePolicy::Allow),
            "reject" => Ok(DuplicateNamePolicy::Reject),
            "replace" => Ok(DuplicateNamePolicy::Replace),
            other => Err(format!(
                "unknown duplicate-name policy '{other}' (expected allow, reject or replace)"
            )),
        }
    }
}

/// In-memory view of the saved schemas, written through a gateway.
pub struct SchemaLibrary {
    gateway: Arc<dyn PersistenceGateway>,
    key: String,
    policy: DuplicateNamePolicy,
    schemas: Vec<Schema>,
}

impl fmt::Debug for SchemaLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaLibrary")
            .field("key", &self.key)
            .field("policy", &self.policy)
            .field("schemas", &self.schemas.len())
            .finish()
    }
}

impl SchemaLibrary {
    /// Opens the library stored under [`SAVED_SCHEMAS_KEY`] with the
    /// default duplicate-name policy.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError::Persistence`] if loading fails.
    pub async fn open(gateway: Arc<dyn PersistenceGateway>) -> Result<Self, LibraryError> {
        Self::open_with(gateway, SAVED_SCHEMAS_KEY, DuplicateNamePolicy::default()).await
    }

    /// Opens the library stored under `key` with an explicit policy.
    pub async fn open_with(
        gateway: Arc<dyn PersistenceGateway>,
        key: impl Into<String>,
        policy: DuplicateNamePolicy,
    ) -> Result<Self, LibraryError> {
        let mut library = Self {
            gateway,
            key: key.into(),
            policy,
            schemas: Vec::new(),
        };
        library.refresh().await?;
        Ok(library)
    }

    /// Reloads the schema list from storage.
    ///
    /// A missing value is an empty library. On failure the in-memory list is
    /// left as it was.
    pub async fn refresh(&mut self) -> Result<&[Schema], LibraryError> {
        let loaded = match self.gateway.load(&self.key).await? {
            Some(value) => {
                serde_json::from_value::<Vec<Schema>>(value).map_err(|source| {
                    PersistenceError::Malformed {
                        key: self.key.clone(),
                        source,
                    }
                })?
            }
            None => Vec::new(),
        };
        debug!(key = %self.key, count = loaded.len(), "loaded saved schemas");
        self.schemas = loaded;
        Ok(&self.schemas)
    }

    /// Returns the storage key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the duplicate-name policy.
    pub fn policy(&self) -> DuplicateNamePolicy {
        self.policy
    }

    /// Returns every saved schema in save order.
    pub fn schemas(&self) -> &[Schema] {
        &self.schemas
    }

    /// Returns the schema names in save order (duplicates included).
    pub fn names(&self) -> Vec<&str> {
        self.schemas.iter().map(|s| s.name.as_str()).collect()
    }

    /// Returns the first schema saved under `name`.
    pub fn get(&self, name: &str) -> Option<&Schema> {
        let name = name.trim();
        self.schemas.iter().find(|s| s.name == name)
    }

    /// Returns the number of saved schemas.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Returns `true` if nothing is saved.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Saves `schema`, trimming its name.
    ///
    /// The in-memory list is updated first; if the gateway rejects the
    /// write, that update is undone and the error returned.
    ///
    /// # Errors
    ///
    /// - [`LibraryError::EmptyName`] if the trimmed name is empty.
    /// - [`LibraryError::DuplicateName`] under
    ///   [`DuplicateNamePolicy::Reject`].
    /// - [`LibraryError::Persistence`] if the write fails.
    pub async fn save(&mut self, mut schema: Schema) -> Result<(), LibraryError> {
        schema.name = schema.name.trim().to_string();
        if schema.name.is_empty() {
            return Err(LibraryError::EmptyName);
        }

        let previous = self.schemas.clone();
        let taken = self.schemas.iter().any(|s| s.name == schema.name);
        match (taken, self.policy) {
            (true, DuplicateNamePolicy::Reject) => {
                return Err(LibraryError::DuplicateName(schema.name));
            }
            (true, DuplicateNamePolicy::Replace) => {
                self.schemas.retain(|s| s.name != schema.name);
            }
            _ => {}
        }

        let name = schema.name.clone();
        let field_count = schema.field_count();
        self.schemas.push(schema);

        if let Err(err) = self.persist().await {
            warn!(name = %name, error = %err, "saving schema failed; reverting");
            self.schemas = previous;
            return Err(err);
        }
        info!(name = %name, fields = field_count, "saved schema");
        Ok(())
    }

    /// Deletes every schema named `name` and returns how many were removed.
    ///
    /// # Errors
    ///
    /// - [`LibraryError::NotFound`] if no schema has that name.
    /// - [`LibraryError::Persistence`] if the write fails; the in-memory
    ///   list is restored.
    pub async fn delete(&mut self, name: &str) -> Result<usize, LibraryError> {
        let name = name.trim();
        let previous = self.schemas.clone();
        self.schemas.retain(|s| s.name != name);
        let removed = previous.len() - self.schemas.len();
        if removed == 0 {
            return Err(LibraryError::NotFound(name.to_string()));
        }

        if let Err(err) = self.persist().await {
            warn!(name, error = %err, "deleting schema failed; reverting");
            self.schemas = previous;
            return Err(err);
        }
        info!(name, removed, "deleted schema");
        Ok(removed)
    }

    async fn persist(&self) -> Result<(), LibraryError> {
        let value = serde_json::to_value(&self.schemas).map_err(|source| {
            PersistenceError::Malformed {
                key: self.key.clone(),
                source,
            }
        })?;
        self.gateway.save(&self.key, value).await?;
        Ok(())
    }
}
