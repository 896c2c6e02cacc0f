//! Preview of a form as an end user would fill it.
//!
//! Hidden fields stay in the schema but are left out of the preview and
//! out of submission checks.

use std::collections::{BTreeMap, HashMap};

use crate::{Field, FieldId, FieldType, InputError, number_hint, validate_input};

/// One visible field as the renderer shows it.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewItem<'a> {
    /// The underlying field.
    pub field: &'a Field,
    /// Input caption.
    pub caption: &'a str,
    /// Author-provided helper line, if non-empty.
    pub helper_text: Option<&'a str>,
    /// Derived number hint, if the field has both bounds.
    pub hint: Option<String>,
}

impl PreviewItem<'_> {
    /// Returns the field's type.
    pub fn field_type(&self) -> FieldType {
        self.field.field_type()
    }
}

/// Lists the visible fields in display order.
///
/// # Examples
///
/// ```
/// use form_schema_core::*;
///
/// let fields = vec![
///     Field::new(FieldType::Text, "Name"),
///     Field::new(FieldType::Text, "Internal note").hidden(),
///     Field::new(FieldType::Number, "Age").with_range(Some(18.0), Some(60.0)),
/// ];
/// let items = preview(&fields);
/// assert_eq!(items.len(), 2);
/// assert_eq!(items[1].caption, "Age");
/// assert_eq!(items[1].hint.as_deref(), Some("Enter a number between 18 and 60"));
/// ```
pub fn preview(fields: &[Field]) -> Vec<PreviewItem<'_>> {
    fields
        .iter()
        .filter(|field| !field.hidden)
        .map(|field| PreviewItem {
            field,
            caption: &field.title,
            helper_text: Some(field.helper_text.as_str()).filter(|text| !text.is_empty()),
            hint: number_hint(field),
        })
        .collect()
}

/// Checks a filled-in form and returns the failures per field.
///
/// Missing entries in `values` count as empty input. Hidden fields are
/// skipped.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use form_schema_core::*;
///
/// let name = Field::new(FieldType::Text, "Name").required();
/// let age = Field::new(FieldType::Number, "Age").with_range(Some(18.0), None);
/// let fields = vec![name.clone(), age.clone()];
///
/// let mut values = HashMap::new();
/// values.insert(age.id, "12".to_string());
///
/// let failures = check_submission(&fields, &values);
/// assert_eq!(failures.len(), 2);
/// assert_eq!(failures[&name.id].kind, ErrorKind::RequiredMissing);
/// assert_eq!(failures[&age.id].kind, ErrorKind::BelowMinimum);
/// ```
pub fn check_submission(
    fields: &[Field],
    values: &HashMap<FieldId, String>,
) -> BTreeMap<FieldId, InputError> {
    fields
        .iter()
        .filter(|field| !field.hidden)
        .filter_map(|field| {
            let value = values.get(&field.id).map(String::as_str).unwrap_or("");
            validate_input(field, value)
                .error
                .map(|error| (field.id, error))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_keeps_order_and_skips_hidden() {
        let fields = vec![
            Field::new(FieldType::Select, "Fruit").with_options(["Apple"]),
            Field::new(FieldType::Text, "Secret").hidden(),
            Field::new(FieldType::Text, "Name").with_helper_text("Full name"),
        ];
        let items = preview(&fields);
        let captions: Vec<_> = items.iter().map(|item| item.caption).collect();
        assert_eq!(captions, ["Fruit", "Name"]);
        assert_eq!(items[0].helper_text, None);
        assert_eq!(items[1].helper_text, Some("Full name"));
        assert_eq!(items[0].field_type(), FieldType::Select);
    }

    #[test]
    fn test_hidden_required_field_is_not_checked() {
        let hidden = Field::new(FieldType::Text, "Secret").required().hidden();
        let failures = check_submission(&[hidden], &HashMap::new());
        assert!(failures.is_empty());
    }

    #[test]
    fn test_valid_submission_has_no_failures() {
        let fruit = Field::new(FieldType::Select, "Fruit")
            .with_options(["Apple", "Banana", "Cherry"])
            .required();
        let mut values = HashMap::new();
        values.insert(fruit.id, "Banana".to_string());
        assert!(check_submission(&[fruit], &values).is_empty());
    }
}
