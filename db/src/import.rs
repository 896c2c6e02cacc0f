//! JSON import and export of single schemas.
//!
//! An import file holds either a full schema object
//! (`{ "name": ..., "fields": [...] }`) or just the array of fields, as
//! produced by a JSON editor. Fields without an `id` receive a fresh one.

use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use form_schema_core::{Field, Schema};
use serde::Deserialize;
use tracing::debug;

use crate::error::Result;

#[derive(Deserialize)]
#[serde(untagged)]
enum SchemaDocument {
    Schema(Schema),
    Fields(Vec<Field>),
}

/// Reads a schema from a JSON file.
///
/// A bare field array is named `default_name`.
///
/// # Errors
///
/// Returns [`IoError`](crate::DatabaseError::IoError) if the file cannot be
/// read, or [`JsonError`](crate::DatabaseError::JsonError) if it holds
/// neither shape.
///
/// # Examples
///
/// ```
/// use form_schema_db::read_schema_file;
///
/// let dir = tempfile::tempdir().unwrap();
/// let path = dir.path().join("fields.json");
/// std::fs::write(&path, r#"[{ "type": "text", "title": "Name", "required": true }]"#).unwrap();
///
/// let schema = read_schema_file(&path, "Contact").unwrap();
/// assert_eq!(schema.name, "Contact");
/// assert!(schema.fields[0].required);
/// ```
pub fn read_schema_file(path: impl AsRef<Path>, default_name: &str) -> Result<Schema> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)?;
    let reader = BufReader::new(file);
    let document: SchemaDocument = serde_json::from_reader(reader)?;
    let schema = match document {
        SchemaDocument::Schema(schema) => schema,
        SchemaDocument::Fields(fields) => Schema::new(default_name, fields),
    };
    debug!(path = %path.display(), name = %schema.name, fields = schema.field_count(), "read schema file");
    Ok(schema)
}

/// Writes `schema` to `path` as pretty-printed JSON.
///
/// # Errors
///
/// Returns [`IoError`](crate::DatabaseError::IoError) if the file cannot be
/// written, or [`JsonError`](crate::DatabaseError::JsonError) if
/// serialization fails.
pub fn write_schema_file(path: impl AsRef<Path>, schema: &Schema) -> Result<()> {
    let file = std::fs::File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, schema)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
