//! Field and schema type definitions.
//!
//! This module defines the data model of a form under construction. Field
//! attributes that only make sense for one type live on that type's
//! [`FieldKind`] variant, so a text field can never carry stale numeric
//! bounds. All types serialize with [`serde`] using the persisted key names
//! (`helperText`, `minValue`, ...) and round-trip through every storage
//! backend.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Maximum number of options a select field may hold.
pub const MAX_SELECT_OPTIONS: usize = 5;

/// Storage key under which the saved schema sequence lives.
pub const SAVED_SCHEMAS_KEY: &str = "savedSchemas";

/// Opaque, stable identifier of a [`Field`].
///
/// Assigned once when a field is created and never changed afterwards.
/// Identity-based operations (edit, delete, reorder) go through this id, so
/// two fields sharing a title stay distinguishable.
///
/// # Examples
///
/// ```
/// use form_schema_core::FieldId;
///
/// let a = FieldId::new();
/// let b = FieldId::new();
/// assert_ne!(a, b);
///
/// let parsed: FieldId = a.to_string().parse().unwrap();
/// assert_eq!(parsed, a);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldId(Uuid);

impl FieldId {
    /// Generates a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for FieldId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for FieldId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// Input type of a field.
///
/// Closed set; adding a variant means adding its validation rule and its
/// [`FieldKind`] shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Free text input (the default).
    #[default]
    Text,
    /// Numeric input with optional bounds.
    Number,
    /// Choice among a fixed list of options.
    Select,
}

impl FieldType {
    /// All variants, in menu order.
    pub const ALL: [FieldType; 3] = [FieldType::Text, FieldType::Number, FieldType::Select];

    /// Returns the lowercase name used in storage and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Number => "number",
            FieldType::Select => "select",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing an unknown field type name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown field type '{0}' (expected text, number or select)")]
pub struct UnknownFieldType(pub String);

impl FromStr for FieldType {
    type Err = UnknownFieldType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(FieldType::Text),
            "number" => Ok(FieldType::Number),
            "select" => Ok(FieldType::Select),
            other => Err(UnknownFieldType(other.to_string())),
        }
    }
}

/// Type-specific attributes of a field.
///
/// Serialized inline with the owning [`Field`], tagged by `type`.
///
/// # Examples
///
/// ```
/// use form_schema_core::{FieldKind, FieldType};
///
/// let kind = FieldKind::Number { min_value: Some(18.0), max_value: Some(60.0) };
/// assert_eq!(kind.field_type(), FieldType::Number);
/// assert!(kind.options().is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldKind {
    /// Text input; no extra attributes.
    #[default]
    Text,
    /// Numeric input. Bounds are independent; no ordering is implied.
    Number {
        /// Inclusive lower bound.
        #[serde(
            rename = "minValue",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        min_value: Option<f64>,
        /// Inclusive upper bound.
        #[serde(
            rename = "maxValue",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        max_value: Option<f64>,
    },
    /// Choice input. Options keep insertion order; duplicates are kept.
    Select {
        #[serde(default)]
        options: Vec<String>,
    },
}

impl FieldKind {
    /// Returns the default attributes for a field type.
    pub fn default_for(field_type: FieldType) -> Self {
        match field_type {
            FieldType::Text => FieldKind::Text,
            FieldType::Number => FieldKind::Number {
                min_value: None,
                max_value: None,
            },
            FieldType::Select => FieldKind::Select {
                options: Vec::new(),
            },
        }
    }

    /// Returns the type this variant describes.
    pub fn field_type(&self) -> FieldType {
        match self {
            FieldKind::Text => FieldType::Text,
            FieldKind::Number { .. } => FieldType::Number,
            FieldKind::Select { .. } => FieldType::Select,
        }
    }

    /// Returns the select options, or an empty slice for other types.
    pub fn options(&self) -> &[String] {
        match self {
            FieldKind::Select { options } => options,
            _ => &[],
        }
    }

    /// Returns `(min, max)` for number fields, `(None, None)` otherwise.
    pub fn bounds(&self) -> (Option<f64>, Option<f64>) {
        match self {
            FieldKind::Number {
                min_value,
                max_value,
            } => (*min_value, *max_value),
            _ => (None, None),
        }
    }
}

/// One form field definition.
///
/// Created through [`Field::new`], which assigns a fresh [`FieldId`] and
/// installs the defaults for the chosen type. Derived equality is
/// structural; use [`is_same_field`](Field::is_same_field) to compare by
/// identity.
///
/// # Examples
///
/// ```
/// use form_schema_core::{Field, FieldType};
///
/// let age = Field::new(FieldType::Number, "Age")
///     .with_helper_text("Enter your age")
///     .with_range(Some(18.0), Some(60.0))
///     .required();
///
/// assert_eq!(age.field_type(), FieldType::Number);
/// assert!(age.required);
/// assert_eq!(age.kind.bounds(), (Some(18.0), Some(60.0)));
///
/// let json = serde_json::to_value(&age).unwrap();
/// assert_eq!(json["type"], "number");
/// assert_eq!(json["minValue"], 18.0);
/// assert_eq!(json["helperText"], "Enter your age");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    /// Stable identity; imported definitions without one get a fresh id.
    #[serde(default)]
    pub id: FieldId,
    /// Display label used as the input caption.
    pub title: String,
    /// Explanatory text shown under the input.
    #[serde(default)]
    pub helper_text: String,
    /// Whether the end user must supply a value.
    #[serde(default)]
    pub required: bool,
    /// Excluded from rendering but kept in the schema.
    #[serde(default)]
    pub hidden: bool,
    /// Type tag plus type-specific attributes.
    #[serde(flatten)]
    pub kind: FieldKind,
}

impl Field {
    /// Creates a field with a fresh id and the defaults for `field_type`.
    ///
    /// # Examples
    ///
    /// ```
    /// use form_schema_core::{Field, FieldType};
    ///
    /// let fruit = Field::new(FieldType::Select, "Fruit");
    /// assert!(fruit.kind.options().is_empty());
    /// assert!(!fruit.required);
    /// assert!(!fruit.hidden);
    /// ```
    pub fn new(field_type: FieldType, title: impl Into<String>) -> Self {
        Self {
            id: FieldId::new(),
            title: title.into(),
            helper_text: String::new(),
            required: false,
            hidden: false,
            kind: FieldKind::default_for(field_type),
        }
    }

    /// Returns the field's type.
    pub fn field_type(&self) -> FieldType {
        self.kind.field_type()
    }

    /// Returns `true` if both values describe the same field identity.
    pub fn is_same_field(&self, other: &Field) -> bool {
        self.id == other.id
    }

    /// Sets the helper text.
    pub fn with_helper_text(mut self, text: impl Into<String>) -> Self {
        self.helper_text = text.into();
        self
    }

    /// Marks the field as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Marks the field as hidden.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Sets numeric bounds. Has no effect on non-number fields.
    pub fn with_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        if let FieldKind::Number {
            min_value,
            max_value,
        } = &mut self.kind
        {
            *min_value = min;
            *max_value = max;
        }
        self
    }

    /// Replaces the select options. Has no effect on non-select fields.
    ///
    /// The option cap is enforced by [`FieldDraft`](crate::FieldDraft) and by
    /// definition validation, not here.
    pub fn with_options<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let FieldKind::Select { options } = &mut self.kind {
            *options = values.into_iter().map(Into::into).collect();
        }
        self
    }
}

/// A named snapshot of a field collection.
///
/// Schemas are immutable once saved; replacing one means saving a new
/// entry.
///
/// # Examples
///
/// ```
/// use form_schema_core::{Field, FieldType, Schema};
///
/// let schema = Schema::new("Survey", vec![Field::new(FieldType::Text, "Name")]);
/// assert_eq!(schema.name, "Survey");
/// assert_eq!(schema.field_count(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Display name; the lookup key in the schema library.
    pub name: String,
    /// Fields in display order.
    pub fields: Vec<Field>,
}

impl Schema {
    /// Creates a schema from a name and an ordered field list.
    pub fn new(name: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    /// Returns the number of fields.
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_new_assigns_distinct_ids() {
        let a = Field::new(FieldType::Text, "Name");
        let b = Field::new(FieldType::Text, "Name");
        assert_ne!(a.id, b.id);
        assert!(!a.is_same_field(&b));
        assert!(a.is_same_field(&a.clone()));
    }

    #[test]
    fn test_type_defaults() {
        assert_eq!(Field::new(FieldType::Text, "t").kind, FieldKind::Text);
        assert_eq!(
            Field::new(FieldType::Number, "n").kind,
            FieldKind::Number {
                min_value: None,
                max_value: None
            }
        );
        assert_eq!(
            Field::new(FieldType::Select, "s").kind,
            FieldKind::Select { options: vec![] }
        );
    }

    #[test]
    fn test_setters_ignore_foreign_attributes() {
        let text = Field::new(FieldType::Text, "Name")
            .with_range(Some(1.0), Some(2.0))
            .with_options(["a"]);
        assert_eq!(text.kind, FieldKind::Text);
    }

    #[test]
    fn test_field_type_parse() {
        assert_eq!("Number".parse::<FieldType>().unwrap(), FieldType::Number);
        assert_eq!(" select ".parse::<FieldType>().unwrap(), FieldType::Select);
        assert!("date".parse::<FieldType>().is_err());
        for ty in FieldType::ALL {
            assert_eq!(ty.to_string().parse::<FieldType>().unwrap(), ty);
        }
    }

    #[test]
    fn test_serialized_layout() {
        let field = Field::new(FieldType::Select, "Fruit")
            .with_helper_text("Pick one")
            .with_options(["Apple", "Banana"])
            .required();
        let value = serde_json::to_value(&field).unwrap();
        assert_eq!(value["type"], "select");
        assert_eq!(value["title"], "Fruit");
        assert_eq!(value["helperText"], "Pick one");
        assert_eq!(value["required"], true);
        assert_eq!(value["hidden"], false);
        assert_eq!(value["options"], json!(["Apple", "Banana"]));
        assert!(value.get("minValue").is_none());
        assert_eq!(value["id"], field.id.to_string());
    }

    #[test]
    fn test_deserialize_source_layout() {
        let raw = json!({
            "id": "5b0f8f3c-2d7e-4c43-9f39-3a2b0f3e9d11",
            "type": "number",
            "title": "Age",
            "required": true,
            "hidden": false,
            "helperText": "Enter your age",
            "minValue": 18,
            "maxValue": 60
        });
        let field: Field = serde_json::from_value(raw).unwrap();
        assert_eq!(field.title, "Age");
        assert_eq!(field.kind.bounds(), (Some(18.0), Some(60.0)));
        assert_eq!(
            field.id.to_string(),
            "5b0f8f3c-2d7e-4c43-9f39-3a2b0f3e9d11"
        );
    }

    #[test]
    fn test_deserialize_drops_attributes_of_other_types() {
        let raw = json!({
            "type": "text",
            "title": "Name",
            "helperText": "",
            "required": false,
            "hidden": false,
            "options": ["stale"]
        });
        let field: Field = serde_json::from_value(raw).unwrap();
        assert_eq!(field.kind, FieldKind::Text);
    }

    #[test]
    fn test_deserialize_missing_id_gets_fresh_one() {
        let raw = json!({ "type": "select", "title": "Fruit" });
        let a: Field = serde_json::from_value(raw.clone()).unwrap();
        let b: Field = serde_json::from_value(raw).unwrap();
        assert_ne!(a.id, b.id);
        assert!(a.kind.options().is_empty());
    }
}
