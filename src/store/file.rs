//! File-backed configuration store: one JSON document per server name.

use std::fs;
use std::path::{Path, PathBuf};

use crate::document::ConfigurationDocument;
use crate::store::{ConfigStoreConnector, StoreError};

/// Provider identifier used in store connection descriptors.
pub const PROVIDER: &str = "file";

/// Stores each server's document as `<root>/<server name>.json`.
pub struct FileConfigStore {
    root: PathBuf,
}

impl FileConfigStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn document_path(&self, server_name: &str) -> Result<PathBuf, StoreError> {
        // Server names become file names; anything that could escape the
        // root directory is refused.
        if server_name.contains(['/', '\\']) || server_name.contains("..") {
            return Err(StoreError::InvalidKey(format!(
                "server name `{server_name}` is not a valid store key"
            )));
        }
        Ok(self.root.join(format!("{server_name}.json")))
    }
}

impl ConfigStoreConnector for FileConfigStore {
    fn read(&self, server_name: &str) -> Result<Option<ConfigurationDocument>, StoreError> {
        let path = self.document_path(server_name)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, server_name: &str, doc: &ConfigurationDocument) -> Result<(), StoreError> {
        let path = self.document_path(server_name)?;
        fs::create_dir_all(&self.root)?;
        let content = serde_json::to_string_pretty(doc)?;

        // Write-then-rename so a crashed write never leaves a torn document.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn delete(&self, server_name: &str) -> Result<(), StoreError> {
        let path = self.document_path(server_name)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn list_all(&self) -> Result<Vec<ConfigurationDocument>, StoreError> {
        let mut documents = Vec::new();
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(documents),
            Err(e) => return Err(e.into()),
        };
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let content = fs::read_to_string(&path)?;
            match serde_json::from_str(&content) {
                Ok(doc) => documents.push(doc),
                Err(e) => {
                    tracing::warn!(path = %display_path(&path), error = %e, "Skipping unreadable configuration document");
                }
            }
        }
        Ok(documents)
    }
}

fn display_path(path: &Path) -> String {
    path.display().to_string()
}
