//! A builder session: the working collection plus the schema library.
//!
//! The working [`FieldCollection`] is process-local and never autosaved.
//! [`BuilderSession::save_as`] snapshots it into the library and clears it
//! only once storage has accepted the write, so a failed save loses
//! nothing.

use tracing::info;

use crate::{FieldCollection, LibraryError, Schema, SchemaLibrary, SessionError};

/// One interactive form-building session.
#[derive(Debug)]
pub struct BuilderSession {
    fields: FieldCollection,
    library: SchemaLibrary,
}

impl BuilderSession {
    /// Starts a session over a working collection and a library.
    pub fn new(fields: FieldCollection, library: SchemaLibrary) -> Self {
        Self { fields, library }
    }

    /// Returns the working collection.
    pub fn fields(&self) -> &FieldCollection {
        &self.fields
    }

    /// Returns the working collection for editing.
    pub fn fields_mut(&mut self) -> &mut FieldCollection {
        &mut self.fields
    }

    /// Returns the schema library.
    pub fn library(&self) -> &SchemaLibrary {
        &self.library
    }

    /// Returns the schema library for direct saves and deletes.
    pub fn library_mut(&mut self) -> &mut SchemaLibrary {
        &mut self.library
    }

    /// Saves the working fields as a schema named `name`, then clears the
    /// working collection.
    ///
    /// # Errors
    ///
    /// Any [`LibraryError`]; the working collection is left intact.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use form_schema_core::*;
    ///
    /// let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
    /// rt.block_on(async {
    ///     let library = SchemaLibrary::open(Arc::new(MemoryGateway::new())).await.unwrap();
    ///     let mut session = BuilderSession::new(FieldCollection::new(), library);
    ///     session.fields_mut().add_field(Field::new(FieldType::Text, "Name")).unwrap();
    ///
    ///     let saved = session.save_as("Contact").await.unwrap();
    ///     assert_eq!(saved.field_count(), 1);
    ///     assert!(session.fields().is_empty());
    ///     assert_eq!(session.library().names(), vec!["Contact"]);
    /// });
    /// ```
    pub async fn save_as(&mut self, name: &str) -> Result<Schema, SessionError> {
        let schema = self.fields.snapshot(name.trim());
        self.library.save(schema.clone()).await?;
        self.fields.clear();
        info!(name = %schema.name, "builder cleared after save");
        Ok(schema)
    }

    /// Replaces the working collection with a copy of the saved schema
    /// `name`.
    ///
    /// # Errors
    ///
    /// - [`LibraryError::NotFound`] if no schema has that name.
    /// - [`CollectionError`](crate::CollectionError) if the stored fields
    ///   fail definition validation under this session's options; the
    ///   working collection is unchanged.
    pub fn open(&mut self, name: &str) -> Result<&FieldCollection, SessionError> {
        let schema = self
            .library
            .get(name)
            .ok_or_else(|| LibraryError::NotFound(name.trim().to_string()))?;
        let options = *self.fields.options();
        self.fields = FieldCollection::from_fields(schema.fields.clone(), options)?;
        Ok(&self.fields)
    }
}
