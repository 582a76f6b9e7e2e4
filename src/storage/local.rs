use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::FileStore;

pub struct LocalDirStore {
    dir: PathBuf,
}

impl LocalDirStore {
    /// Creates the directory if it does not exist yet.
    pub async fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("failed to create directory '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl FileStore for LocalDirStore {
    async fn put(&self, name: &str, bytes: &[u8]) -> Result<PathBuf> {
        // Names are generated server-side; never accept a path here.
        if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
            anyhow::bail!("invalid file name '{name}'");
        }

        let path = self.dir.join(name);
        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("failed to write '{}'", path.display()))?;
        debug!(path = %path.display(), bytes = bytes.len(), "File stored");
        Ok(path)
    }
}
