//! Record store adapter
//!
//! The post collection lives in a single JSON document that is read once
//! at batch start and, when anything changed, replaced wholesale at batch
//! end. Saves write a sibling temp file and rename it over the original so
//! a later load never observes a partially written document.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, StoreError};
use crate::types::PostCollection;

pub struct PostStore {
    path: PathBuf,
}

impl PostStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load and validate the post collection.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the file is absent (the batch
    /// aborts before touching any post) and `StoreError::Parse` for a
    /// document that does not match the expected shape.
    pub fn load(&self) -> Result<PostCollection> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(self.path.clone()).into());
            }
            Err(e) => return Err(StoreError::Io(e).into()),
        };

        let collection: PostCollection =
            serde_json::from_str(&raw).map_err(StoreError::Parse)?;

        debug!(
            path = %self.path.display(),
            posts = collection.posts.len(),
            "loaded post collection"
        );

        Ok(collection)
    }

    /// Atomically replace the persisted collection.
    pub fn save(&self, collection: &PostCollection) -> Result<()> {
        let json = serde_json::to_string_pretty(collection).map_err(StoreError::Parse)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(StoreError::Io)?;
            }
        }

        let tmp = self.tmp_path();
        fs::write(&tmp, json).map_err(StoreError::Io)?;
        fs::rename(&tmp, &self.path).map_err(StoreError::Io)?;

        debug!(path = %self.path.display(), "saved post collection");
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
