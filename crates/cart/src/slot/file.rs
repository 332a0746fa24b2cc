//! File-backed slot.
//!
//! Each key is stored as `<data_dir>/<base64url(key)>.json`. Writes go to a
//! temporary file first and are then renamed over the target, so the file is
//! always either the old or the new snapshot, never a partial write.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use tokio::fs;
use tracing::{debug, instrument};

use super::DurableSlot;
use crate::error::StorageError;

/// Slot storing one file per key in a directory.
#[derive(Debug, Clone)]
pub struct FileSlot {
    dir: PathBuf,
}

impl FileSlot {
    /// Open a slot in `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    /// Directory holding the snapshot files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file storing `key`.
    ///
    /// Keys such as `@gomarketplace:products` are not valid file names on
    /// every platform, so the name is the key in unpadded URL-safe base64.
    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", URL_SAFE_NO_PAD.encode(key)))
    }
}

#[async_trait]
impl DurableSlot for FileSlot {
    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self, value), fields(bytes = value.len()))]
    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        let path = self.path_for(key);
        let tmp_path = path.with_extension("json.tmp");

        fs::write(&tmp_path, value.as_bytes()).await?;
        fs::rename(&tmp_path, &path).await?;

        debug!(path = %path.display(), "Snapshot file replaced");
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "file"
    }
}
