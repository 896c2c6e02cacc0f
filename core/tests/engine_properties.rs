//! Behavioural checks of the field schema engine through its public API.

use std::sync::Arc;

use form_schema_core::{
    BuilderSession, CollectionError, DraftError, ErrorKind, Field, FieldCollection, FieldDraft,
    FieldId, FieldType, MemoryGateway, Schema, SchemaLibrary, validate_input,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn ids(collection: &FieldCollection) -> Vec<FieldId> {
    collection.list_fields().iter().map(|f| f.id).collect()
}

fn survey_collection() -> FieldCollection {
    let mut collection = FieldCollection::new();
    collection
        .add_field(Field::new(FieldType::Text, "Name").required())
        .unwrap();
    collection
        .add_field(
            Field::new(FieldType::Number, "Age")
                .with_helper_text("Enter your age")
                .with_range(Some(18.0), Some(60.0)),
        )
        .unwrap();
    collection
        .add_field(
            Field::new(FieldType::Select, "Fruit")
                .with_options(["Apple", "Banana", "Cherry"])
                .required(),
        )
        .unwrap();
    collection
}

// ---------------------------------------------------------------------------
// Collection
// ---------------------------------------------------------------------------

#[test]
fn add_then_list_ends_with_added_field() {
    let mut collection = survey_collection();
    let before = ids(&collection);

    let field = Field::new(FieldType::Text, "Email").with_helper_text("Work address");
    let expected = field.clone();
    let id = collection.add_field(field).unwrap();

    assert!(!before.contains(&id));
    assert_eq!(collection.list_fields().last(), Some(&expected));
}

#[test]
fn remove_twice_matches_remove_once() {
    let mut once = survey_collection();
    let target = once.list_fields()[1].id;
    let mut twice = once.clone();

    once.remove_field(target);
    twice.remove_field(target);
    twice.remove_field(target);

    assert_eq!(once.list_fields(), twice.list_fields());
}

#[test]
fn removed_identifier_is_never_handed_out_again() {
    let mut collection = survey_collection();
    let removed = collection.list_fields()[0].clone();
    collection.remove_field(removed.id);

    assert_eq!(
        collection.add_field(removed.clone()),
        Err(CollectionError::RetiredId(removed.id))
    );
    assert!(!ids(&collection).contains(&removed.id));
}

#[test]
fn move_onto_itself_changes_nothing() {
    let mut collection = survey_collection();
    let before = collection.list_fields().to_vec();
    let id = before[2].id;
    collection.move_field(id, id).unwrap();
    assert_eq!(collection.list_fields(), before.as_slice());
}

#[test]
fn moves_are_permutations() {
    let mut collection = survey_collection();
    for title in ["D", "E", "F"] {
        collection
            .add_field(Field::new(FieldType::Text, title))
            .unwrap();
    }
    let mut expected = ids(&collection);

    let order = ids(&collection);
    let plan = [(0, 5), (4, 1), (2, 2), (5, 0), (3, 4), (1, 3)];
    for (moved, reference) in plan {
        collection.move_field(order[moved], order[reference]).unwrap();
    }

    let mut actual = ids(&collection);
    actual.sort();
    expected.sort();
    assert_eq!(actual, expected);
}

#[test]
fn move_with_stale_reference_is_not_found() {
    let mut collection = survey_collection();
    let before = ids(&collection);
    let stale = FieldId::new();
    assert_eq!(
        collection.move_field(before[0], stale),
        Err(CollectionError::NotFound(stale))
    );
    assert_eq!(ids(&collection), before);
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[test]
fn number_bounds_messages() {
    let collection = survey_collection();
    let age = &collection.list_fields()[1];

    let low = validate_input(age, "17").error.unwrap();
    assert_eq!(low.kind, ErrorKind::BelowMinimum);
    assert_eq!(low.message, "Value should be greater than or equal to 18");

    let high = validate_input(age, "61").error.unwrap();
    assert_eq!(high.kind, ErrorKind::AboveMaximum);
    assert_eq!(high.message, "Value should be less than or equal to 60");

    assert!(validate_input(age, "30").error.is_none());
}

#[test]
fn select_required_and_member() {
    let collection = survey_collection();
    let fruit = &collection.list_fields()[2];
    assert_eq!(
        validate_input(fruit, "").error.unwrap().kind,
        ErrorKind::RequiredMissing
    );
    assert!(validate_input(fruit, "Banana").is_valid());
}

#[test]
fn text_required() {
    let collection = survey_collection();
    let name = &collection.list_fields()[0];
    assert_eq!(
        validate_input(name, "").error.unwrap().kind,
        ErrorKind::RequiredMissing
    );
    assert!(validate_input(name, "Ada Lovelace").is_valid());
}

#[test]
fn sixth_option_is_refused() {
    let mut draft = FieldDraft::new(FieldType::Select);
    draft.title = "Pick".into();
    for option in ["1", "2", "3", "4", "5"] {
        draft.add_option(option).unwrap();
    }
    assert_eq!(draft.add_option("6"), Err(DraftError::OptionLimit));
    assert_eq!(draft.build().kind.options().len(), 5);
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

#[tokio::test]
async fn save_then_load_round_trip() {
    let gateway = Arc::new(MemoryGateway::new());
    let library = SchemaLibrary::open(gateway.clone()).await.unwrap();
    let mut session = BuilderSession::new(survey_collection(), library);
    let fields = session.fields().list_fields().to_vec();

    session.save_as("Survey").await.unwrap();

    let reloaded = SchemaLibrary::open(gateway).await.unwrap();
    assert_eq!(
        reloaded.schemas(),
        [Schema::new("Survey", fields)].as_slice()
    );
}
