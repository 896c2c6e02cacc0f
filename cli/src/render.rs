//! Plain-text rendering of fields, schemas and previews.

use std::fmt::Write as _;

use form_schema_core::{Field, FieldId, FieldKind, PreviewItem, Schema};

/// Resolves a field reference: a 1-based position or a field id.
///
/// Ids are not checked against `fields`, so stale ids reach the collection
/// operations unchanged.
pub fn resolve_field(fields: &[Field], reference: &str) -> Result<FieldId, String> {
    if let Ok(position) = reference.parse::<usize>() {
        return position
            .checked_sub(1)
            .and_then(|index| fields.get(index))
            .map(|field| field.id)
            .ok_or_else(|| format!("no field at position {position}"));
    }
    reference
        .parse::<FieldId>()
        .map_err(|_| format!("'{reference}' is neither a field position nor a field id"))
}

/// Summarises a field's type-specific attributes.
pub fn attributes(field: &Field) -> String {
    match &field.kind {
        FieldKind::Text => String::new(),
        FieldKind::Number {
            min_value,
            max_value,
        } => match (min_value, max_value) {
            (None, None) => String::new(),
            (min, max) => format!(
                "range {}..{}",
                min.map(|v| v.to_string()).unwrap_or_default(),
                max.map(|v| v.to_string()).unwrap_or_default()
            ),
        },
        FieldKind::Select { options } => format!("options {}", options.join(" | ")),
    }
}

fn flags(field: &Field) -> String {
    let mut flags = Vec::new();
    if field.required {
        flags.push("required");
    }
    if field.hidden {
        flags.push("hidden");
    }
    flags.join(",")
}

/// Renders the working field list, one line per field.
pub fn field_list(fields: &[Field]) -> String {
    if fields.is_empty() {
        return "(no fields)\n".to_string();
    }
    let mut out = String::new();
    for (index, field) in fields.iter().enumerate() {
        let _ = write!(
            out,
            "{}. [{}] {}",
            index + 1,
            field.field_type(),
            field.title
        );
        let flags = flags(field);
        if !flags.is_empty() {
            let _ = write!(out, " ({flags})");
        }
        let attributes = attributes(field);
        if !attributes.is_empty() {
            let _ = write!(out, " {attributes}");
        }
        let _ = writeln!(out, "  id={}", field.id);
    }
    out
}

/// Renders a schema as an aligned table.
pub fn schema_table(schema: &Schema) -> String {
    let headers = ["#", "TYPE", "TITLE", "FLAGS", "ATTRIBUTES"];
    let rows: Vec<[String; 5]> = schema
        .fields
        .iter()
        .enumerate()
        .map(|(index, field)| {
            [
                (index + 1).to_string(),
                field.field_type().to_string(),
                field.title.clone(),
                flags(field),
                attributes(field),
            ]
        })
        .collect();

    let mut widths = headers.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = format!("{} ({} fields)\n", schema.name, schema.field_count());
    let mut push_row = |cells: [&str; 5]| {
        let line: Vec<String> = cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect();
        let _ = writeln!(out, "{}", line.join("  ").trim_end());
    };
    push_row(headers);
    for row in &rows {
        push_row(row.each_ref().map(String::as_str));
    }
    out
}

/// Renders the preview of a form.
pub fn preview(items: &[PreviewItem<'_>]) -> String {
    if items.is_empty() {
        return "(nothing to preview)\n".to_string();
    }
    let mut out = String::new();
    for item in items {
        let marker = if item.field.required { " *" } else { "" };
        let _ = writeln!(out, "{}{marker} [{}]", item.caption, item.field_type());
        if let Some(helper) = item.helper_text {
            let _ = writeln!(out, "    {helper}");
        }
        if let Some(hint) = &item.hint {
            let _ = writeln!(out, "    {hint}");
        }
        for option in item.field.kind.options() {
            let _ = writeln!(out, "    ( ) {option}");
        }
    }
    out
}
