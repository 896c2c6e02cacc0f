//! Error types for collection, draft, persistence and library operations.
//!
//! Every error here is recoverable: the operation that raised it leaves the
//! collection or library in its last valid state.

use thiserror::Error;

use crate::{DefinitionViolation, FieldId, MAX_SELECT_OPTIONS};

/// Errors raised by [`FieldCollection`](crate::FieldCollection) mutations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CollectionError {
    /// The field definition failed validation.
    #[error("invalid field definition: {}", join_violations(.0))]
    Validation(Vec<DefinitionViolation>),

    /// No field with this id exists in the collection.
    #[error("field not found: {0}")]
    NotFound(FieldId),

    /// A field with this id is already in the collection.
    #[error("duplicate field id: {0}")]
    DuplicateId(FieldId),

    /// This id belonged to a field that was removed; ids are never reused.
    #[error("field id already used by a removed field: {0}")]
    RetiredId(FieldId),
}

impl CollectionError {
    /// Returns the violation list for [`Validation`](Self::Validation) errors.
    pub fn violations(&self) -> &[DefinitionViolation] {
        match self {
            CollectionError::Validation(violations) => violations,
            _ => &[],
        }
    }
}

fn join_violations(violations: &[DefinitionViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors raised while editing a [`FieldDraft`](crate::FieldDraft).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    /// The draft already holds the maximum number of options.
    #[error("a select field holds at most {max} options", max = MAX_SELECT_OPTIONS)]
    OptionLimit,

    /// No option exists at this index.
    #[error("no option at index {0}")]
    NoSuchOption(usize),
}

/// A save or load call through a
/// [`PersistenceGateway`](crate::PersistenceGateway) failed.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The storage backend rejected the call.
    #[error("persistence backend failed: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The value stored under `key` does not have the expected shape.
    #[error("stored value under '{key}' is malformed: {source}")]
    Malformed {
        /// Storage key that was read or written.
        key: String,
        /// Underlying decode/encode failure.
        #[source]
        source: serde_json::Error,
    },
}

impl PersistenceError {
    /// Wraps any backend error.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        PersistenceError::Backend(Box::new(err))
    }
}

/// Errors raised by [`SchemaLibrary`](crate::SchemaLibrary).
#[derive(Debug, Error)]
pub enum LibraryError {
    /// Reading or writing the saved schema list failed.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// Schema names cannot be empty or whitespace-only.
    #[error("schema name cannot be empty")]
    EmptyName,

    /// A schema with this name exists and the policy rejects duplicates.
    #[error("a schema named '{0}' already exists")]
    DuplicateName(String),

    /// No saved schema has this name.
    #[error("no saved schema named '{0}'")]
    NotFound(String),
}

/// Errors raised by [`BuilderSession`](crate::BuilderSession).
#[derive(Debug, Error)]
pub enum SessionError {
    /// A collection operation failed.
    #[error(transparent)]
    Collection(#[from] CollectionError),

    /// A library operation failed.
    #[error(transparent)]
    Library(#[from] LibraryError),
}
