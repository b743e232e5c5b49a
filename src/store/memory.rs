//! In-memory configuration store, used by tests and as a throwaway backend.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::document::ConfigurationDocument;
use crate::store::{ConfigStoreConnector, StoreError};

/// Provider identifier used in store connection descriptors.
pub const PROVIDER: &str = "memory";

#[derive(Default)]
pub struct InMemoryConfigStore {
    documents: Mutex<HashMap<String, ConfigurationDocument>>,
}

impl InMemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConfigStoreConnector for InMemoryConfigStore {
    fn read(&self, server_name: &str) -> Result<Option<ConfigurationDocument>, StoreError> {
        let documents = self.documents.lock().expect("config store mutex poisoned");
        Ok(documents.get(server_name).cloned())
    }

    fn write(&self, server_name: &str, doc: &ConfigurationDocument) -> Result<(), StoreError> {
        let mut documents = self.documents.lock().expect("config store mutex poisoned");
        documents.insert(server_name.to_string(), doc.clone());
        Ok(())
    }

    fn delete(&self, server_name: &str) -> Result<(), StoreError> {
        let mut documents = self.documents.lock().expect("config store mutex poisoned");
        documents.remove(server_name);
        Ok(())
    }

    fn list_all(&self) -> Result<Vec<ConfigurationDocument>, StoreError> {
        let documents = self.documents.lock().expect("config store mutex poisoned");
        Ok(documents.values().cloned().collect())
    }
}
