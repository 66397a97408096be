//! Downloads directory: landing zone for uploads and root for downloads

use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

const FALLBACK_NAME: &str = "upload";

/// An upload written to the downloads directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedUpload {
    /// Generated file name, also the download key
    pub name: String,
    pub path: PathBuf,
}

/// Handle to the downloads directory
#[derive(Debug, Clone)]
pub struct UploadDir {
    root: PathBuf,
}

impl UploadDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the directory if it doesn't exist
    pub async fn ensure(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.root).await
    }

    /// Store `bytes` under a fresh unique name derived from `original_name`
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> io::Result<SavedUpload> {
        let name = unique_name(original_name);
        let path = self.root.join(&name);
        tokio::fs::write(&path, bytes).await?;

        debug!(file = %name, size = bytes.len(), "stored upload");
        Ok(SavedUpload { name, path })
    }

    /// Path for a download request, or None if `name` could escape the directory
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        if name.contains(['/', '\\', '\0']) {
            return None;
        }

        let mut components = Path::new(name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Some(self.root.join(name)),
            _ => None,
        }
    }

    /// Read a stored file; missing files, directories and unsafe names are `NotFound`
    pub async fn read(&self, name: &str) -> io::Result<Vec<u8>> {
        let path = self
            .resolve(name)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "invalid file name"))?;

        let metadata = tokio::fs::metadata(&path).await?;
        if !metadata.is_file() {
            return Err(io::Error::new(io::ErrorKind::NotFound, "not a file"));
        }
        tokio::fs::read(&path).await
    }
}

/// Random hex prefix plus the final component of the client's file name
pub fn unique_name(original_name: &str) -> String {
    format!("{}_{}", Uuid::new_v4().simple(), base_name(original_name))
}

fn base_name(original_name: &str) -> &str {
    let name = original_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    match name {
        "" | "." | ".." => FALLBACK_NAME,
        name => name,
    }
}
