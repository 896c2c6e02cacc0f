//! The ordered field collection of one builder session.
//!
//! [`FieldCollection`] owns the ordered field list and is the only way to
//! mutate it. Additions and edits are definition-validated before anything
//! changes, so every operation either completes or leaves the collection
//! exactly as it was.
//!
//! # Example
//!
//! ```
//! use form_schema_core::*;
//!
//! let mut form = FieldCollection::new();
//! let name = form.add_field(Field::new(FieldType::Text, "Name")).unwrap();
//! let age = form
//!     .add_field(Field::new(FieldType::Number, "Age").with_range(Some(18.0), None))
//!     .unwrap();
//!
//! form.move_field(age, name).unwrap();
//! let titles: Vec<_> = form.list_fields().iter().map(|f| f.title.as_str()).collect();
//! assert_eq!(titles, ["Age", "Name"]);
//!
//! form.remove_field(name);
//! form.remove_field(name);
//! assert_eq!(form.len(), 1);
//! ```

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::reorder::reorder_by_key;
use crate::{
    CollectionError, Field, FieldId, Schema, ValidationOptions, validate_definition,
};

/// Ordered, identity-keyed list of fields.
#[derive(Debug, Clone, Default)]
pub struct FieldCollection {
    fields: Vec<Field>,
    options: ValidationOptions,
    retired: HashSet<FieldId>,
}

impl FieldCollection {
    /// Creates an empty collection with default validation options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty collection that validates with `options`.
    pub fn with_options(options: ValidationOptions) -> Self {
        Self {
            fields: Vec::new(),
            options,
            retired: HashSet::new(),
        }
    }

    /// Builds a collection from existing fields, e.g. a saved schema opened
    /// for editing.
    ///
    /// # Errors
    ///
    /// Returns the first [`CollectionError::Validation`] or
    /// [`CollectionError::DuplicateId`] encountered, in field order.
    pub fn from_fields(
        fields: Vec<Field>,
        options: ValidationOptions,
    ) -> Result<Self, CollectionError> {
        let mut seen = HashSet::new();
        for field in &fields {
            check_definition(field, &options)?;
            if !seen.insert(field.id) {
                return Err(CollectionError::DuplicateId(field.id));
            }
        }
        Ok(Self {
            fields,
            options,
            retired: HashSet::new(),
        })
    }

    /// Returns the validation options in use.
    pub fn options(&self) -> &ValidationOptions {
        &self.options
    }

    /// Validates `field` and appends it to the end of the collection.
    ///
    /// Returns the id the field is stored under.
    ///
    /// # Errors
    ///
    /// - [`CollectionError::Validation`] with every violation if the
    ///   definition is invalid.
    /// - [`CollectionError::DuplicateId`] if the id is already present.
    /// - [`CollectionError::RetiredId`] if the id belonged to a field that
    ///   was removed or cleared from this collection.
    pub fn add_field(&mut self, field: Field) -> Result<FieldId, CollectionError> {
        check_definition(&field, &self.options)?;
        if self.position(field.id).is_some() {
            return Err(CollectionError::DuplicateId(field.id));
        }
        if self.retired.contains(&field.id) {
            return Err(CollectionError::RetiredId(field.id));
        }

        let id = field.id;
        debug!(%id, title = %field.title, field_type = %field.field_type(), "adding field");
        self.fields.push(field);
        Ok(id)
    }

    /// Replaces the field with `id` in place; its position is unchanged.
    ///
    /// The replacement keeps `id` regardless of the id `definition`
    /// carries.
    ///
    /// # Errors
    ///
    /// - [`CollectionError::NotFound`] if no field has `id`.
    /// - [`CollectionError::Validation`] if the new definition is invalid.
    pub fn update_field(&mut self, id: FieldId, definition: Field) -> Result<(), CollectionError> {
        let index = self.position(id).ok_or(CollectionError::NotFound(id))?;

        let mut field = definition;
        field.id = id;
        check_definition(&field, &self.options)?;

        debug!(%id, index, "updating field");
        self.fields[index] = field;
        Ok(())
    }

    /// Removes the field with `id`.
    ///
    /// Returns `true` if a field was removed. Removing an absent id is a
    /// no-op, so calling this twice has the same effect as calling it once.
    pub fn remove_field(&mut self, id: FieldId) -> bool {
        match self.position(id) {
            Some(index) => {
                let removed = self.fields.remove(index);
                self.retired.insert(id);
                debug!(%id, title = %removed.title, "removed field");
                true
            }
            None => {
                warn!(%id, "remove requested for unknown field");
                false
            }
        }
    }

    /// Moves the field `id` to the position currently held by `target_id`.
    ///
    /// Moving a field onto itself is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::NotFound`] naming the first id that is
    /// absent; the order is unchanged in that case.
    pub fn move_field(&mut self, id: FieldId, target_id: FieldId) -> Result<(), CollectionError> {
        if id == target_id {
            return if self.position(id).is_some() {
                Ok(())
            } else {
                Err(CollectionError::NotFound(id))
            };
        }
        let moved = reorder_by_key(&mut self.fields, &id, &target_id, |field| field.id)
            .map_err(CollectionError::NotFound)?;
        if moved {
            debug!(%id, target = %target_id, "moved field");
        }
        Ok(())
    }

    /// Returns the fields in display order.
    pub fn list_fields(&self) -> &[Field] {
        &self.fields
    }

    /// Looks up a field by id.
    pub fn get(&self, id: FieldId) -> Option<&Field> {
        self.fields.iter().find(|field| field.id == id)
    }

    /// Returns the index of the field with `id`.
    pub fn position(&self, id: FieldId) -> Option<usize> {
        self.fields.iter().position(|field| field.id == id)
    }

    /// Returns the number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the collection holds no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Removes every field. Their ids stay retired.
    pub fn clear(&mut self) {
        self.retired.extend(self.fields.drain(..).map(|field| field.id));
    }

    /// Captures the current fields as a named [`Schema`].
    pub fn snapshot(&self, name: impl Into<String>) -> Schema {
        Schema::new(name, self.fields.clone())
    }
}

fn check_definition(field: &Field, options: &ValidationOptions) -> Result<(), CollectionError> {
    let violations = validate_definition(field, options);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(CollectionError::Validation(violations))
    }
}
