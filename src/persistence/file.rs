use std::borrow::Cow;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use super::{KeyValueStore, StoreResult};

/// One JSON file per key under a data directory.
///
/// Writes go to a temporary sibling first and are renamed into place, so a
/// crash mid-write leaves the previous value readable.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", encode_key(key)))
    }
}

/// Percent-encodes everything outside `[A-Za-z0-9_.~-]`, so no key can
/// produce a path separator.
fn encode_key(key: &str) -> Cow<'_, str> {
    urlencoding::encode(key)
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(payload) => Ok(Some(payload)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn put(&self, key: &str, value: String) -> StoreResult<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        let target = self.path_for(key);
        let temp = self
            .root
            .join(format!(".{}.{}.tmp", encode_key(key), Uuid::new_v4().simple()));

        if let Err(err) = tokio::fs::write(&temp, value.as_bytes()).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(err.into());
        }
        if let Err(err) = tokio::fs::rename(&temp, &target).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(err.into());
        }
        debug!(key, path = %target.display(), bytes = value.len(), "value written");
        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
