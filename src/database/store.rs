use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::{Builder, NamedTempFile};
use thiserror::Error;

/// Logical documents kept on disk, one JSON file each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Posts,
    Users,
    Site,
}

impl Collection {
    /// Path of the document relative to the data directory.
    pub fn relative_path(self) -> &'static str {
        match self {
            Collection::Posts => "posts/posts.json",
            Collection::Users => "users/users.json",
            Collection::Site => "posts/site.json",
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("malformed JSON in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to encode document for {path}: {source}")]
    Serialize {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
}

/// Whole-document JSON storage rooted at a data directory.
///
/// Writes never leave a half-written file at the destination: the document is
/// written to a `.tmp-*.json` sibling, synced, then renamed over the target.
#[derive(Debug, Clone)]
pub struct JsonStore {
    root: PathBuf,
}

impl JsonStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        JsonStore { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_of(&self, collection: Collection) -> PathBuf {
        self.root.join(collection.relative_path())
    }

    /// Load a document, falling back to `T::default()` only when the file does not exist.
    pub fn load<T>(&self, collection: Collection) -> Result<T, StoreError>
    where
        T: DeserializeOwned + Default,
    {
        let path = self.path_of(collection);
        let raw = match fs::read(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(T::default()),
            Err(source) => return Err(StoreError::Read { path, source }),
        };

        // Each comment reply nests two JSON levels. Depth is bounded on write.
        let mut de = serde_json::Deserializer::from_slice(&raw);
        de.disable_recursion_limit();
        T::deserialize(&mut de)
            .and_then(|document| de.end().map(|()| document))
            .map_err(|source| StoreError::Parse { path, source })
    }

    pub fn save<T: Serialize>(&self, collection: Collection, document: &T) -> Result<(), StoreError> {
        self.stage(collection, document)?.commit()
    }

    /// Write the document to a temp file beside the target without touching the target.
    ///
    /// Dropping the returned [`StagedWrite`] without committing removes the temp file.
    pub fn stage<T: Serialize>(
        &self,
        collection: Collection,
        document: &T,
    ) -> Result<StagedWrite, StoreError> {
        let target = self.path_of(collection);
        let dir = target
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.root.clone());

        let write_err = |source: io::Error| StoreError::Write {
            path: target.clone(),
            source,
        };

        fs::create_dir_all(&dir).map_err(write_err)?;
        let tmp = Builder::new()
            .prefix(".tmp-")
            .suffix(".json")
            .tempfile_in(&dir)
            .map_err(write_err)?;

        {
            let mut writer = BufWriter::new(tmp.as_file());
            serde_json::to_writer_pretty(&mut writer, document).map_err(|source| {
                StoreError::Serialize {
                    path: target.clone(),
                    source,
                }
            })?;
            writer.flush().map_err(write_err)?;
        }
        tmp.as_file().sync_all().map_err(write_err)?;

        Ok(StagedWrite { tmp, target })
    }
}

/// A fully written temp file waiting to replace its target.
#[derive(Debug)]
pub struct StagedWrite {
    tmp: NamedTempFile,
    target: PathBuf,
}

impl StagedWrite {
    pub fn temp_path(&self) -> &Path {
        self.tmp.path()
    }

    /// Atomically rename the temp file over the target.
    pub fn commit(self) -> Result<(), StoreError> {
        let target = self.target;
        self.tmp
            .persist(&target)
            .map_err(|e| StoreError::Write {
                path: target.clone(),
                source: e.error,
            })?;
        Ok(())
    }
}
