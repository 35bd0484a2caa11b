use crate::domain::ports::DocumentStore;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::fs;
use std::path::PathBuf;

/// Filesystem-backed document store. Each document is a single JSON file
/// under `base_dir`, rewritten whole on every save.
#[derive(Debug, Clone)]
pub struct FileDocumentStore {
    base_dir: PathBuf,
}

impl FileDocumentStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }
}

#[async_trait]
impl DocumentStore for FileDocumentStore {
    async fn load(&self, name: &str) -> Result<Option<Vec<u8>>> {
        let path = self.base_dir.join(name);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn save(&self, name: &str, bytes: &[u8]) -> Result<()> {
        let path = self.base_dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, bytes)?;
        tracing::debug!(document = name, bytes = bytes.len(), "document written");
        Ok(())
    }
}
