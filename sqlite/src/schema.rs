//! SQL schema generation with customizable table prefixes.
//!
//! Saved values live in a single key-value table:
//!
//! - `{prefix}entries`: one row per storage key, holding the JSON document
//!   and the time of the last write.
//!
//! # Custom prefix
//!
//! Prefixes must contain only ASCII letters, digits and underscores. This
//! enables multiple isolated stores (e.g., `prod_`, `test_`) within the same
//! SQLite database.

use crate::error::{Result, SqliteError};

/// Validates that a table prefix contains only ASCII letters, digits and
/// underscores.
pub(crate) fn validate_prefix(prefix: &str) -> Result<()> {
    if prefix.is_empty() {
        return Err(SqliteError::InvalidPrefix(prefix.to_string()));
    }
    if !prefix.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(SqliteError::InvalidPrefix(prefix.to_string()));
    }
    Ok(())
}

/// Returns the name of the entries table for `prefix`.
pub(crate) fn entries_table(prefix: &str) -> String {
    format!("{prefix}entries")
}

/// Generates the SQL creating the entries table with the given prefix.
///
/// # Errors
///
/// Returns [`SqliteError::InvalidPrefix`] if the prefix contains characters
/// other than ASCII alphanumerics and underscores, or if it is empty.
pub fn generate_schema_sql(prefix: &str) -> Result<String> {
    validate_prefix(prefix)?;

    let sql = format!(
        r#"
CREATE TABLE IF NOT EXISTS {prefix}entries (
    key TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#
    );

    Ok(sql)
}

/// Generates the SQL dropping every table created by
/// [`generate_schema_sql`].
///
/// # Errors
///
/// Returns [`SqliteError::InvalidPrefix`] if the prefix is invalid.
pub fn generate_drop_sql(prefix: &str) -> Result<String> {
    validate_prefix(prefix)?;
    Ok(format!("DROP TABLE IF EXISTS {prefix}entries;\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_prefix() {
        assert!(validate_prefix("form_").is_ok());
        assert!(validate_prefix("test123").is_ok());
        assert!(validate_prefix("A_B_C").is_ok());
    }

    #[test]
    fn test_invalid_prefix_empty() {
        assert!(validate_prefix("").is_err());
    }

    #[test]
    fn test_invalid_prefix_special_chars() {
        assert!(validate_prefix("drop;--").is_err());
        assert!(validate_prefix("hello world").is_err());
        assert!(validate_prefix("test-prefix").is_err());
        assert!(validate_prefix("préfixe").is_err());
    }

    #[test]
    fn test_generate_schema_sql_contains_table() {
        let sql = generate_schema_sql("form_").unwrap();
        assert!(sql.contains("CREATE TABLE IF NOT EXISTS form_entries"));
        assert!(sql.contains("key TEXT PRIMARY KEY"));
        assert!(sql.contains("updated_at"));
    }

    #[test]
    fn test_generate_drop_sql() {
        let sql = generate_drop_sql("form_").unwrap();
        assert!(sql.contains("DROP TABLE IF EXISTS form_entries"));
        assert!(generate_drop_sql("").is_err());
    }

    #[test]
    fn test_key_is_unique() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch(&generate_schema_sql("t_").unwrap())
            .unwrap();
        conn.execute(
            "INSERT INTO t_entries (key, value) VALUES ('savedSchemas', '[]')",
            [],
        )
        .unwrap();
        assert!(
            conn.execute(
                "INSERT INTO t_entries (key, value) VALUES ('savedSchemas', '[]')",
                [],
            )
            .is_err()
        );
    }
}
