//! Field schema engine for interactive form builders.
//!
//! This crate holds everything with real invariants in a form builder:
//!
//! - [`Field`] / [`FieldKind`] / [`Schema`]: the data model. Type-specific
//!   attributes live on the type's variant.
//! - [`validate_definition`] and [`validate_input`]: definition checks
//!   before a field is committed, and value checks while a form is filled.
//! - [`FieldCollection`]: the ordered, identity-keyed field list with
//!   add/update/remove/move.
//! - [`move_item`] / [`reorder_by_key`]: the reorder algorithm.
//! - [`FieldDraft`]: the uncommitted field being edited in the builder.
//! - [`PersistenceGateway`], [`SchemaLibrary`], [`BuilderSession`]: saving
//!   and loading named schemas through an injected async key-value store.
//! - [`preview`] / [`check_submission`]: the end-user view of a form.
//!
//! # Example
//!
//! ```
//! use form_schema_core::*;
//!
//! let mut form = FieldCollection::new();
//!
//! let mut draft = FieldDraft::new(FieldType::Select);
//! draft.title = "Favourite fruit".into();
//! draft.required = true;
//! for fruit in ["Apple", "Banana", "Cherry"] {
//!     draft.add_option(fruit).unwrap();
//! }
//! let fruit = form.add_field(draft.build()).unwrap();
//!
//! let age = form
//!     .add_field(Field::new(FieldType::Number, "Age").with_range(Some(18.0), Some(60.0)))
//!     .unwrap();
//! form.move_field(age, fruit).unwrap();
//!
//! let field = form.get(age).unwrap();
//! let check = validate_input(field, "17");
//! assert_eq!(
//!     check.display_message(),
//!     Some("Value should be greater than or equal to 18")
//! );
//! assert_eq!(form.list_fields()[0].title, "Age");
//! ```

mod collection;
mod draft;
mod error;
mod gateway;
mod library;
mod preview;
mod reorder;
mod session;
mod types;
mod validate;

pub use collection::FieldCollection;
pub use draft::FieldDraft;
pub use error::{CollectionError, DraftError, LibraryError, PersistenceError, SessionError};
pub use gateway::{Delayed, MemoryGateway, PersistenceGateway, SimulatedFailure};
pub use library::{DuplicateNamePolicy, SchemaLibrary};
pub use preview::{PreviewItem, check_submission, preview};
pub use reorder::{move_item, reorder_by_key};
pub use session::BuilderSession;
pub use types::*;
pub use validate::{
    DefinitionViolation, ErrorKind, InputCheck, InputError, ValidationOptions, number_hint,
    validate_definition, validate_input,
};
