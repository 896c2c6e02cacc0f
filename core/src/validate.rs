//! Field definition and input-value validation.
//!
//! Two surfaces, both pure:
//!
//! - [`validate_definition`] checks a field's own declared constraints
//!   before it is committed to a collection (non-empty title, usable select
//!   options, ...).
//! - [`validate_input`] checks an end-user value against a field's
//!   constraints at fill time and returns an [`InputCheck`].
//!
//! # Examples
//!
//! ```
//! use form_schema_core::*;
//!
//! let age = Field::new(FieldType::Number, "Age").with_range(Some(18.0), Some(60.0));
//! assert!(validate_definition(&age, &ValidationOptions::default()).is_empty());
//!
//! let check = validate_input(&age, "17");
//! assert_eq!(check.error.unwrap().kind, ErrorKind::BelowMinimum);
//!
//! let untitled = Field::new(FieldType::Text, "   ");
//! assert_eq!(
//!     validate_definition(&untitled, &ValidationOptions::default()),
//!     vec![DefinitionViolation::EmptyTitle]
//! );
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Field, FieldKind, MAX_SELECT_OPTIONS};

/// Switches for checks whose policy is left to the embedding application.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOptions {
    /// Reject number fields whose `min_value` exceeds `max_value`.
    #[serde(default)]
    pub enforce_range_order: bool,
}

/// A constraint a field definition fails.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DefinitionViolation {
    /// Title is empty or whitespace-only.
    #[error("title cannot be empty")]
    EmptyTitle,
    /// Select field has nothing to choose from.
    #[error("select field needs at least one option")]
    NoOptions,
    /// Select field carries more options than the builder allows.
    #[error("select field has {0} options (at most {max} allowed)", max = MAX_SELECT_OPTIONS)]
    TooManyOptions(usize),
    /// A numeric bound is NaN or infinite.
    #[error("number bound must be finite, got {0}")]
    NonFiniteBound(f64),
    /// `min_value > max_value` while range order is enforced.
    #[error("minimum {min} is greater than maximum {max}")]
    InvertedRange {
        /// Declared minimum.
        min: f64,
        /// Declared maximum.
        max: f64,
    },
}

/// Checks a field definition and returns every violation found.
///
/// Helper text may be empty. Bounds are unordered unless
/// [`ValidationOptions::enforce_range_order`] is set.
///
/// # Examples
///
/// ```
/// use form_schema_core::*;
///
/// let empty_select = Field::new(FieldType::Select, "Fruit");
/// let violations = validate_definition(&empty_select, &ValidationOptions::default());
/// assert_eq!(violations, vec![DefinitionViolation::NoOptions]);
///
/// let inverted = Field::new(FieldType::Number, "Age").with_range(Some(60.0), Some(18.0));
/// assert!(validate_definition(&inverted, &ValidationOptions::default()).is_empty());
/// let strict = ValidationOptions { enforce_range_order: true };
/// assert_eq!(validate_definition(&inverted, &strict).len(), 1);
/// ```
pub fn validate_definition(field: &Field, options: &ValidationOptions) -> Vec<DefinitionViolation> {
    let mut violations = Vec::new();

    if field.title.trim().is_empty() {
        violations.push(DefinitionViolation::EmptyTitle);
    }

    match &field.kind {
        FieldKind::Text => {}
        FieldKind::Select { options } => {
            if options.is_empty() {
                violations.push(DefinitionViolation::NoOptions);
            } else if options.len() > MAX_SELECT_OPTIONS {
                violations.push(DefinitionViolation::TooManyOptions(options.len()));
            }
        }
        FieldKind::Number {
            min_value,
            max_value,
        } => {
            for bound in [min_value, max_value].into_iter().flatten() {
                if !bound.is_finite() {
                    violations.push(DefinitionViolation::NonFiniteBound(*bound));
                }
            }
            if let (Some(min), Some(max)) = (min_value, max_value) {
                if options.enforce_range_order && min > max {
                    violations.push(DefinitionViolation::InvertedRange {
                        min: *min,
                        max: *max,
                    });
                }
            }
        }
    }

    violations
}

/// Category of an input-value failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// A required field has no value.
    RequiredMissing,
    /// A number field's value does not parse as a finite number.
    NotANumber,
    /// The value is below the field's minimum.
    BelowMinimum,
    /// The value is above the field's maximum.
    AboveMaximum,
    /// A select value is not one of the field's options.
    NotAnOption,
}

/// An input-value failure with the message shown to the end user.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct InputError {
    /// Failure category.
    pub kind: ErrorKind,
    /// Human-readable message.
    pub message: String,
}

impl InputError {
    fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    fn required_missing() -> Self {
        Self::new(ErrorKind::RequiredMissing, "This field is required")
    }
}

/// Result of checking one input value against one field.
///
/// `hint` is the derived helper line for number fields with both bounds;
/// an active error takes precedence over it for display.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InputCheck {
    /// The failure, if any.
    pub error: Option<InputError>,
    /// Derived helper text, independent of the value.
    pub hint: Option<String>,
}

impl InputCheck {
    /// Returns `true` if the value passed.
    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }

    /// Returns the line to display under the input: the error message if
    /// present, else the derived hint.
    ///
    /// # Examples
    ///
    /// ```
    /// use form_schema_core::*;
    ///
    /// let age = Field::new(FieldType::Number, "Age").with_range(Some(18.0), Some(60.0));
    /// assert_eq!(
    ///     validate_input(&age, "30").display_message(),
    ///     Some("Enter a number between 18 and 60")
    /// );
    /// assert_eq!(
    ///     validate_input(&age, "61").display_message(),
    ///     Some("Value should be less than or equal to 60")
    /// );
    /// ```
    pub fn display_message(&self) -> Option<&str> {
        self.error
            .as_ref()
            .map(|e| e.message.as_str())
            .or(self.hint.as_deref())
    }
}

/// Returns the derived helper line for a field, if it has one.
///
/// Only number fields with both bounds set produce a hint.
pub fn number_hint(field: &Field) -> Option<String> {
    match field.kind.bounds() {
        (Some(min), Some(max)) => Some(format!("Enter a number between {min} and {max}")),
        _ => None,
    }
}

/// Checks an end-user value against a field's constraints.
///
/// An empty (whitespace-only) value is valid unless the field is required.
/// For number fields the minimum is checked before the maximum, so a value
/// failing both reports only the minimum.
///
/// # Examples
///
/// ```
/// use form_schema_core::*;
///
/// let name = Field::new(FieldType::Text, "Name").required();
/// assert_eq!(validate_input(&name, "").error.unwrap().kind, ErrorKind::RequiredMissing);
/// assert!(validate_input(&name, "Ada").is_valid());
///
/// let fruit = Field::new(FieldType::Select, "Fruit").with_options(["Apple", "Banana"]);
/// assert!(validate_input(&fruit, "Banana").is_valid());
/// assert_eq!(validate_input(&fruit, "Kiwi").error.unwrap().kind, ErrorKind::NotAnOption);
/// ```
pub fn validate_input(field: &Field, value: &str) -> InputCheck {
    InputCheck {
        error: input_error(field, value),
        hint: number_hint(field),
    }
}

fn input_error(field: &Field, value: &str) -> Option<InputError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return field.required.then(InputError::required_missing);
    }

    match &field.kind {
        FieldKind::Text => None,
        FieldKind::Number {
            min_value,
            max_value,
        } => {
            let number = match trimmed.parse::<f64>() {
                Ok(n) if n.is_finite() => n,
                _ => {
                    return Some(InputError::new(
                        ErrorKind::NotANumber,
                        "Value should be a number",
                    ));
                }
            };
            if let Some(min) = min_value {
                if number < *min {
                    return Some(InputError::new(
                        ErrorKind::BelowMinimum,
                        format!("Value should be greater than or equal to {min}"),
                    ));
                }
            }
            if let Some(max) = max_value {
                if number > *max {
                    return Some(InputError::new(
                        ErrorKind::AboveMaximum,
                        format!("Value should be less than or equal to {max}"),
                    ));
                }
            }
            None
        }
        // Members are matched exactly; only emptiness is judged on the
        // trimmed value.
        FieldKind::Select { options } => {
            if options.iter().any(|option| option == value) {
                None
            } else {
                Some(InputError::new(
                    ErrorKind::NotAnOption,
                    "Value should be one of the listed options",
                ))
            }
        }
    }
}
