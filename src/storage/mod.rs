//! Where uploaded and exported files end up.
//!
//! [`FileStore`] is the async seam; [`LocalDirStore`] writes into a local
//! directory (the `uploads` folder by default).

mod local;

pub use local::LocalDirStore;

use anyhow::Result;
use std::path::PathBuf;

#[async_trait::async_trait]
pub trait FileStore: Send + Sync {
    /// Stores `bytes` under `name` and returns the resulting path.
    async fn put(&self, name: &str, bytes: &[u8]) -> Result<PathBuf>;
}
