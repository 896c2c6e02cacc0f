//! Directory-backed persistence gateway.
//!
//! Each key is stored as `<dir>/<key>.json`. Writes go to a temporary file in
//! the same directory which is then renamed over the target, so a reader
//! never sees a half-written document.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use form_schema_core::{PersistenceError, PersistenceGateway};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{DatabaseError, Result};

/// Checks that `key` can be used as a file stem.
///
/// Keys must be non-empty and made of ASCII letters, digits, `_` and `-`.
///
/// # Examples
///
/// ```
/// # use form_schema_db::validate_key;
/// assert!(validate_key("savedSchemas").is_ok());
/// assert!(validate_key("saved-schemas_2").is_ok());
/// assert!(validate_key("").is_err());
/// assert!(validate_key("../etc/passwd").is_err());
/// ```
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty()
        || !key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(DatabaseError::InvalidKey(key.to_string()));
    }
    Ok(())
}

/// Gateway storing one pretty-printed JSON document per key.
///
/// # Examples
///
/// ```
/// use form_schema_core::PersistenceGateway;
/// use form_schema_db::FileGateway;
/// use serde_json::json;
///
/// let dir = tempfile::tempdir().unwrap();
/// let gateway = FileGateway::new(dir.path());
///
/// let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
/// rt.block_on(async {
///     gateway.save("savedSchemas", json!([])).await.unwrap();
///     assert_eq!(gateway.load("savedSchemas").await.unwrap(), Some(json!([])));
/// });
/// assert!(dir.path().join("savedSchemas.json").exists());
/// ```
#[derive(Debug)]
pub struct FileGateway {
    dir: PathBuf,
    writes: AtomicU64,
}

impl FileGateway {
    /// Creates a gateway rooted at `dir`. The directory is created on the
    /// first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            writes: AtomicU64::new(0),
        }
    }

    /// Returns the storage directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the file holding `key`.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::InvalidKey`] if the key is not a valid file
    /// stem.
    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.json")))
    }

    async fn write(&self, key: &str, value: &Value) -> Result<()> {
        let target = self.path_for(key)?;
        tokio::fs::create_dir_all(&self.dir).await?;

        let seq = self.writes.fetch_add(1, Ordering::Relaxed);
        let temp = self
            .dir
            .join(format!(".{key}.{}.{seq}.tmp", std::process::id()));
        let bytes = serde_json::to_vec_pretty(value)?;

        tokio::fs::write(&temp, &bytes).await?;
        if let Err(err) = tokio::fs::rename(&temp, &target).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(err.into());
        }
        debug!(path = %target.display(), bytes = bytes.len(), "wrote document");
        Ok(())
    }

    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

#[async_trait]
impl PersistenceGateway for FileGateway {
    async fn save(&self, key: &str, value: Value) -> std::result::Result<(), PersistenceError> {
        self.write(key, &value).await?;
        info!(key, dir = %self.dir.display(), "saved to file store");
        Ok(())
    }

    async fn load(&self, key: &str) -> std::result::Result<Option<Value>, PersistenceError> {
        let Some(bytes) = self.read(key).await? else {
            debug!(key, "no document stored");
            return Ok(None);
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| PersistenceError::Malformed {
                key: key.to_string(),
                source,
            })
    }
}
