//! Working draft of a field being authored.
//!
//! The builder dialog edits a [`FieldDraft`], not a [`Field`]. The draft
//! keeps flat buffers for every type's attributes so that switching the
//! type back and forth while the dialog is open loses nothing; only
//! [`build`](FieldDraft::build) decides which attributes survive, keeping
//! exactly those of the selected type.
//!
//! # Example
//!
//! ```
//! use form_schema_core::*;
//!
//! let mut draft = FieldDraft::new(FieldType::Select);
//! draft.title = "Fruit".into();
//! draft.add_option("Apple").unwrap();
//! draft.add_option("Banana").unwrap();
//!
//! // Flip to number and back: the options survive while drafting.
//! draft.set_type(FieldType::Number);
//! draft.set_type(FieldType::Select);
//!
//! let field = draft.build();
//! assert_eq!(field.kind.options(), ["Apple", "Banana"]);
//! ```

use crate::{DraftError, Field, FieldId, FieldKind, FieldType, MAX_SELECT_OPTIONS};

/// Mutable, uncommitted field definition.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDraft {
    id: FieldId,
    /// Selected type.
    pub field_type: FieldType,
    /// Caption.
    pub title: String,
    /// Helper line.
    pub helper_text: String,
    /// Required flag.
    pub required: bool,
    /// Hidden flag.
    pub hidden: bool,
    /// Lower bound buffer, used when the type is number.
    pub min_value: Option<f64>,
    /// Upper bound buffer, used when the type is number.
    pub max_value: Option<f64>,
    options: Vec<String>,
}

impl FieldDraft {
    /// Starts a draft for a new field with a fresh id and default
    /// attributes.
    pub fn new(field_type: FieldType) -> Self {
        Self {
            id: FieldId::new(),
            field_type,
            title: String::new(),
            helper_text: String::new(),
            required: false,
            hidden: false,
            min_value: None,
            max_value: None,
            options: Vec::new(),
        }
    }

    /// Opens an existing field for editing. The draft keeps the field's id.
    pub fn from_field(field: &Field) -> Self {
        let (min_value, max_value) = field.kind.bounds();
        Self {
            id: field.id,
            field_type: field.field_type(),
            title: field.title.clone(),
            helper_text: field.helper_text.clone(),
            required: field.required,
            hidden: field.hidden,
            min_value,
            max_value,
            options: field.kind.options().to_vec(),
        }
    }

    /// Returns the id the built field will carry.
    pub fn id(&self) -> FieldId {
        self.id
    }

    /// Changes the selected type. Buffers of other types are kept.
    pub fn set_type(&mut self, field_type: FieldType) {
        self.field_type = field_type;
    }

    /// Returns the option buffer.
    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Appends an option and returns its index.
    ///
    /// # Errors
    ///
    /// Returns [`DraftError::OptionLimit`] when the draft already holds
    /// [`MAX_SELECT_OPTIONS`] options; the buffer is left unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use form_schema_core::*;
    ///
    /// let mut draft = FieldDraft::new(FieldType::Select);
    /// for option in ["a", "b", "c", "d", "e"] {
    ///     draft.add_option(option).unwrap();
    /// }
    /// assert_eq!(draft.add_option("f"), Err(DraftError::OptionLimit));
    /// assert_eq!(draft.options().len(), 5);
    /// ```
    pub fn add_option(&mut self, value: impl Into<String>) -> Result<usize, DraftError> {
        if self.options.len() >= MAX_SELECT_OPTIONS {
            return Err(DraftError::OptionLimit);
        }
        self.options.push(value.into());
        Ok(self.options.len() - 1)
    }

    /// Returns `true` while another option may be added.
    pub fn can_add_option(&self) -> bool {
        self.options.len() < MAX_SELECT_OPTIONS
    }

    /// Replaces the option at `index`.
    pub fn set_option(&mut self, index: usize, value: impl Into<String>) -> Result<(), DraftError> {
        let slot = self
            .options
            .get_mut(index)
            .ok_or(DraftError::NoSuchOption(index))?;
        *slot = value.into();
        Ok(())
    }

    /// Removes and returns the option at `index`.
    pub fn remove_option(&mut self, index: usize) -> Result<String, DraftError> {
        if index >= self.options.len() {
            return Err(DraftError::NoSuchOption(index));
        }
        Ok(self.options.remove(index))
    }

    /// Produces the field definition for the selected type.
    ///
    /// Attributes belonging to other types are dropped. The result is not
    /// validated; committing it through a
    /// [`FieldCollection`](crate::FieldCollection) does that.
    pub fn build(&self) -> Field {
        let kind = match self.field_type {
            FieldType::Text => FieldKind::Text,
            FieldType::Number => FieldKind::Number {
                min_value: self.min_value,
                max_value: self.max_value,
            },
            FieldType::Select => FieldKind::Select {
                options: self.options.clone(),
            },
        };
        Field {
            id: self.id,
            title: self.title.clone(),
            helper_text: self.helper_text.clone(),
            required: self.required,
            hidden: self.hidden,
            kind,
        }
    }
}
