//! Builder configuration.
//!
//! Defines the YAML-serializable configuration that selects the storage
//! backend, the definition-validation options and the schema library
//! settings. Every section has defaults, so an empty file (or no file at
//! all, via [`BuilderConfig::load_or_default`]) is a valid configuration.
//!
//! # Example YAML
//!
//! ```yaml
//! storage:
//!   backend: sqlite
//!   path: forms.db
//!   prefix: form_
//!   latency_ms: 0
//! validation:
//!   enforce_range_order: true
//! library:
//!   key: savedSchemas
//!   duplicate_names: reject
//! ```

use std::fmt;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use form_schema_core::{DuplicateNamePolicy, SAVED_SCHEMAS_KEY, ValidationOptions};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{DatabaseError, Result};
use crate::file::validate_key;

/// Where saved schemas are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// One JSON file per key in a directory.
    #[default]
    File,
    /// A single SQLite database file.
    Sqlite,
    /// Process memory; nothing survives exit.
    Memory,
}

impl StorageBackend {
    /// Returns the lowercase name used in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageBackend::File => "file",
            StorageBackend::Sqlite => "sqlite",
            StorageBackend::Memory => "memory",
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageBackend {
    type Err = DatabaseError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "file" => Ok(StorageBackend::File),
            "sqlite" => Ok(StorageBackend::Sqlite),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(DatabaseError::InvalidConfig(format!(
                "unknown storage backend '{other}' (expected file, sqlite or memory)"
            ))),
        }
    }
}

/// Storage backend settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Backend kind.
    pub backend: StorageBackend,
    /// Directory (file backend) or database file (sqlite backend). When
    /// unset, a backend-specific default in the working directory is used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Table prefix for the sqlite backend.
    pub prefix: String,
    /// Artificial delay added to every storage call, in milliseconds.
    pub latency_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::File,
            path: None,
            prefix: "form_".to_string(),
            latency_ms: 0,
        }
    }
}

impl StorageConfig {
    /// Returns the configured path, or the default for the backend.
    ///
    /// # Examples
    ///
    /// ```
    /// # use form_schema_db::{StorageBackend, StorageConfig};
    /// let mut storage = StorageConfig::default();
    /// assert_eq!(storage.resolved_path().to_str(), Some("form-schemas"));
    /// storage.backend = StorageBackend::Sqlite;
    /// assert_eq!(storage.resolved_path().to_str(), Some("form-schemas.db"));
    /// ```
    pub fn resolved_path(&self) -> PathBuf {
        match &self.path {
            Some(path) => path.clone(),
            None => match self.backend {
                StorageBackend::Sqlite => PathBuf::from("form-schemas.db"),
                StorageBackend::File | StorageBackend::Memory => PathBuf::from("form-schemas"),
            },
        }
    }

    /// Returns the artificial latency, if any.
    pub fn latency(&self) -> Option<Duration> {
        (self.latency_ms > 0).then(|| Duration::from_millis(self.latency_ms))
    }
}

/// Definition-validation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Reject number fields whose minimum exceeds their maximum.
    pub enforce_range_order: bool,
}

impl From<ValidationConfig> for ValidationOptions {
    fn from(config: ValidationConfig) -> Self {
        ValidationOptions {
            enforce_range_order: config.enforce_range_order,
        }
    }
}

/// Schema library settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Storage key holding the saved schema sequence.
    pub key: String,
    /// What to do when a schema is saved under an existing name.
    pub duplicate_names: DuplicateNamePolicy,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            key: SAVED_SCHEMAS_KEY.to_string(),
            duplicate_names: DuplicateNamePolicy::default(),
        }
    }
}

/// Top-level builder configuration.
///
/// Loaded from a YAML file (typically `form-schema.yml` in the working
/// directory).
///
/// # Examples
///
/// ```
/// use form_schema_db::{BuilderConfig, StorageBackend};
///
/// let config: BuilderConfig = serde_yaml::from_str("storage: { backend: memory }").unwrap();
/// assert_eq!(config.storage.backend, StorageBackend::Memory);
/// assert_eq!(config.library.key, "savedSchemas");
/// assert!(!config.validation.enforce_range_order);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    /// Storage backend settings.
    pub storage: StorageConfig,
    /// Definition-validation settings.
    pub validation: ValidationConfig,
    /// Schema library settings.
    pub library: LibraryConfig,
}

impl BuilderConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](DatabaseError::IoError) if the file cannot be
    /// read, [`YamlError`](DatabaseError::YamlError) if parsing fails, or
    /// [`InvalidConfig`](DatabaseError::InvalidConfig) if [`validate`](Self::validate)
    /// rejects the result.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config: Self = serde_yaml::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from `path`, or returns the defaults if the file
    /// does not exist.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "no configuration file, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](DatabaseError::IoError) if the file cannot be
    /// written, or [`YamlError`](DatabaseError::YamlError) if serialization
    /// fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Checks settings that parse but cannot be used.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidConfig`](DatabaseError::InvalidConfig) if the library
    /// key is not a valid storage key or the sqlite prefix is empty.
    pub fn validate(&self) -> Result<()> {
        validate_key(&self.library.key)
            .map_err(|err| DatabaseError::InvalidConfig(format!("library.key: {err}")))?;
        if self.storage.backend == StorageBackend::Sqlite && self.storage.prefix.is_empty() {
            return Err(DatabaseError::InvalidConfig(
                "storage.prefix must not be empty for the sqlite backend".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the definition-validation options.
    pub fn validation_options(&self) -> ValidationOptions {
        self.validation.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_yaml() -> &'static str {
        r#"
storage:
  backend: sqlite
  path: forms.db
  prefix: app_
  latency_ms: 250
validation:
  enforce_range_order: true
library:
  key: surveyForms
  duplicate_names: replace
"#
    }

    #[test]
    fn test_deserialize_complete() {
        let config: BuilderConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        assert_eq!(config.storage.backend, StorageBackend::Sqlite);
        assert_eq!(config.storage.resolved_path(), PathBuf::from("forms.db"));
        assert_eq!(config.storage.prefix, "app_");
        assert_eq!(config.storage.latency(), Some(Duration::from_millis(250)));
        assert!(config.validation_options().enforce_range_order);
        assert_eq!(config.library.key, "surveyForms");
        assert_eq!(config.library.duplicate_names, DuplicateNamePolicy::Replace);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_document_is_default() {
        let config: BuilderConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, BuilderConfig::default());
        assert_eq!(config.storage.latency(), None);
        assert_eq!(config.library.duplicate_names, DuplicateNamePolicy::Allow);
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        let result: std::result::Result<BuilderConfig, _> =
            serde_yaml::from_str("storage: { backend: redis }");
        assert!(result.is_err());
        assert!("redis".parse::<StorageBackend>().is_err());
        assert_eq!("sqlite".parse::<StorageBackend>().unwrap(), StorageBackend::Sqlite);
    }

    #[test]
    fn test_validate_rejects_bad_key() {
        let mut config = BuilderConfig::default();
        config.library.key = "../escape".to_string();
        assert!(matches!(
            config.validate(),
            Err(DatabaseError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_validate_rejects_empty_sqlite_prefix() {
        let mut config = BuilderConfig::default();
        config.storage.backend = StorageBackend::Sqlite;
        config.storage.prefix.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_or_default_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = BuilderConfig::load_or_default(dir.path().join("absent.yml")).unwrap();
        assert_eq!(config, BuilderConfig::default());
    }

    #[test]
    fn test_load_save_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("form-schema.yml");

        let original: BuilderConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        original.save(&path).unwrap();

        let loaded = BuilderConfig::load(&path).unwrap();
        assert_eq!(loaded, original);
    }
}
