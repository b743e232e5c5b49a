//! Configuration document store.
//!
//! # Data Flow
//! ```text
//! admin operation
//!     → ConfigStoreHandle (name guard, version guard, error mapping)
//!     → StoreResolver (process-wide connection override, read per call)
//!     → ConfigStoreConnector backend (file / in-memory / custom)
//! ```
//!
//! # Design Decisions
//! - Backends implement a four-operation contract; enumeration is optional
//!   and fails with a distinct "unsupported" error when absent
//! - Storing a `None` document is defined as delete, so no empty records
//!   are left behind
//! - The platform-wide connection override is explicit shared state behind
//!   an `ArcSwap`; every call resolves the backend through it, and changing
//!   it never migrates already-active server instances

pub mod file;
pub mod memory;

pub use file::FileConfigStore;
pub use memory::InMemoryConfigStore;

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use thiserror::Error;

use crate::document::{ConfigurationDocument, Connection};
use crate::error::{AdminError, AdminResult, ConfigErrorKind};
use crate::validation;

/// Failures raised by store backends.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// The backend does not implement the requested capability.
    #[error("operation not supported by this store backend: {0}")]
    Unsupported(&'static str),

    #[error("invalid store key: {0}")]
    InvalidKey(String),
}

/// Pluggable persistence backend, keyed by server name.
pub trait ConfigStoreConnector: Send + Sync {
    /// Read the document for a server name; `None` when absent.
    fn read(&self, server_name: &str) -> Result<Option<ConfigurationDocument>, StoreError>;

    fn write(&self, server_name: &str, doc: &ConfigurationDocument) -> Result<(), StoreError>;

    /// Delete the document for a server name. Deleting an absent document
    /// is not an error.
    fn delete(&self, server_name: &str) -> Result<(), StoreError>;

    /// Enumerate every stored document. Optional capability; backends
    /// without enumeration keep this default.
    fn list_all(&self) -> Result<Vec<ConfigurationDocument>, StoreError> {
        Err(StoreError::Unsupported("list_all"))
    }
}

/// One resolved binding of connection descriptor to live backend.
struct StoreBinding {
    connection: Connection,
    connector: Arc<dyn ConfigStoreConnector>,
}

/// Resolves the backend for every store call, honoring the process-wide
/// connection override.
pub struct StoreResolver {
    default_connector: Arc<dyn ConfigStoreConnector>,
    override_binding: ArcSwapOption<StoreBinding>,
}

impl StoreResolver {
    pub fn new(default_connector: Arc<dyn ConfigStoreConnector>) -> Self {
        Self {
            default_connector,
            override_binding: ArcSwapOption::empty(),
        }
    }

    /// Install a platform-wide store connection, replacing any previous
    /// override. Subsequent reads and writes use the new backend; documents
    /// are not migrated.
    pub fn set_connection(&self, connection: Connection) -> AdminResult<()> {
        let connector = build_connector(&connection)?;
        tracing::info!(
            provider = %connection.provider,
            endpoint = %connection.endpoint,
            "Configuration store connection changed"
        );
        self.override_binding
            .store(Some(Arc::new(StoreBinding { connection, connector })));
        Ok(())
    }

    /// Drop the override and fall back to the default backend.
    pub fn clear_connection(&self) {
        tracing::info!("Configuration store connection reset to default");
        self.override_binding.store(None);
    }

    /// The currently-installed override connection, if any.
    pub fn current_connection(&self) -> Option<Connection> {
        self.override_binding
            .load_full()
            .map(|b| b.connection.clone())
    }

    /// Backend for this call. Read once per operation, never cached by
    /// callers across operations.
    pub fn resolve(&self) -> Arc<dyn ConfigStoreConnector> {
        match self.override_binding.load_full() {
            Some(binding) => binding.connector.clone(),
            None => self.default_connector.clone(),
        }
    }
}

/// Build a backend from a connection descriptor. The provider set is closed.
fn build_connector(connection: &Connection) -> AdminResult<Arc<dyn ConfigStoreConnector>> {
    match connection.provider.as_str() {
        file::PROVIDER => Ok(Arc::new(file::FileConfigStore::new(
            connection.endpoint.clone().into(),
        ))),
        memory::PROVIDER => Ok(Arc::new(memory::InMemoryConfigStore::new())),
        other => Err(AdminError::invalid_parameter(
            "<platform>",
            "set-configuration-store-connection",
            format!("unknown configuration store provider `{other}`"),
        )),
    }
}

/// Guarded access to the document store used by all admin operations.
///
/// Enforces the `server_name == document.server_name` invariant on both
/// read and write, rejects incompatible document versions on read, and maps
/// backend failures into the admin error taxonomy.
#[derive(Clone)]
pub struct ConfigStoreHandle {
    resolver: Arc<StoreResolver>,
}

impl ConfigStoreHandle {
    pub fn new(resolver: Arc<StoreResolver>) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &Arc<StoreResolver> {
        &self.resolver
    }

    /// Read the document for a server; `None` when absent.
    pub fn retrieve(
        &self,
        server_name: &str,
        operation: &'static str,
    ) -> AdminResult<Option<ConfigurationDocument>> {
        let connector = self.resolver.resolve();
        let doc = connector
            .read(server_name)
            .map_err(|e| map_store_error(server_name, operation, e))?;

        if let Some(doc) = &doc {
            if doc.server_name != server_name {
                return Err(AdminError::invalid_parameter(
                    server_name,
                    operation,
                    format!(
                        "stored document is for server `{}`, not `{server_name}`",
                        doc.server_name
                    ),
                ));
            }
            validation::validate_version_compatible(doc, operation)?;
        }
        Ok(doc)
    }

    /// Persist a document, or delete it when `doc` is `None`.
    pub fn store(
        &self,
        server_name: &str,
        operation: &'static str,
        doc: Option<&ConfigurationDocument>,
    ) -> AdminResult<()> {
        let connector = self.resolver.resolve();
        match doc {
            Some(doc) => {
                if doc.server_name != server_name {
                    return Err(AdminError::invalid_parameter(
                        server_name,
                        operation,
                        format!(
                            "document names server `{}`, not `{server_name}`",
                            doc.server_name
                        ),
                    ));
                }
                connector
                    .write(server_name, doc)
                    .map_err(|e| map_store_error(server_name, operation, e))
            }
            None => connector
                .delete(server_name)
                .map_err(|e| map_store_error(server_name, operation, e)),
        }
    }

    pub fn delete(&self, server_name: &str, operation: &'static str) -> AdminResult<()> {
        self.store(server_name, operation, None)
    }

    /// Enumerate all stored documents, when the backend supports it.
    pub fn retrieve_all(&self, operation: &'static str) -> AdminResult<Vec<ConfigurationDocument>> {
        let connector = self.resolver.resolve();
        connector
            .list_all()
            .map_err(|e| map_store_error("<platform>", operation, e))
    }
}

fn map_store_error(server_name: &str, operation: &'static str, err: StoreError) -> AdminError {
    match err {
        StoreError::Unsupported(capability) => AdminError::configuration(
            server_name,
            operation,
            ConfigErrorKind::UnsupportedOperation,
            format!("store backend does not support {capability}"),
        ),
        StoreError::InvalidKey(message) => {
            AdminError::invalid_parameter(server_name, operation, message)
        }
        other => AdminError::store_failed(server_name, operation, other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ConfigurationDocument;

    struct NoEnumerationStore(memory::InMemoryConfigStore);

    impl ConfigStoreConnector for NoEnumerationStore {
        fn read(&self, name: &str) -> Result<Option<ConfigurationDocument>, StoreError> {
            self.0.read(name)
        }
        fn write(&self, name: &str, doc: &ConfigurationDocument) -> Result<(), StoreError> {
            self.0.write(name, doc)
        }
        fn delete(&self, name: &str) -> Result<(), StoreError> {
            self.0.delete(name)
        }
    }

    fn memory_handle() -> ConfigStoreHandle {
        let resolver = Arc::new(StoreResolver::new(Arc::new(
            memory::InMemoryConfigStore::new(),
        )));
        ConfigStoreHandle::new(resolver)
    }

    #[test]
    fn name_guard_rejects_mismatched_document() {
        let handle = memory_handle();
        let doc = ConfigurationDocument::new("other");
        let err = handle.store("srv1", "write", Some(&doc)).unwrap_err();
        assert_eq!(err.kind_code(), "INVALID_PARAMETER");
    }

    #[test]
    fn storing_none_deletes_the_document() {
        let handle = memory_handle();
        let doc = ConfigurationDocument::new("srv1");
        handle.store("srv1", "write", Some(&doc)).unwrap();
        assert!(handle.retrieve("srv1", "read").unwrap().is_some());

        handle.store("srv1", "write", None).unwrap();
        assert!(handle.retrieve("srv1", "read").unwrap().is_none());
    }

    #[test]
    fn incompatible_stored_version_is_rejected_on_read() {
        let handle = memory_handle();
        let mut doc = ConfigurationDocument::new("srv1");
        doc.version_id = "V0.1".to_string();
        handle.store("srv1", "write", Some(&doc)).unwrap();

        let err = handle.retrieve("srv1", "read").unwrap_err();
        assert_eq!(err.config_kind(), Some(ConfigErrorKind::IncompatibleVersion));
    }

    #[test]
    fn enumeration_is_a_distinct_unsupported_error_when_absent() {
        let resolver = Arc::new(StoreResolver::new(Arc::new(NoEnumerationStore(
            memory::InMemoryConfigStore::new(),
        ))));
        let handle = ConfigStoreHandle::new(resolver);
        let err = handle.retrieve_all("list").unwrap_err();
        assert_eq!(
            err.config_kind(),
            Some(ConfigErrorKind::UnsupportedOperation)
        );
    }

    #[test]
    fn override_switches_backend_without_migrating() {
        let resolver = Arc::new(StoreResolver::new(Arc::new(
            memory::InMemoryConfigStore::new(),
        )));
        let handle = ConfigStoreHandle::new(resolver.clone());
        let doc = ConfigurationDocument::new("srv1");
        handle.store("srv1", "write", Some(&doc)).unwrap();

        resolver
            .set_connection(Connection::new("test override", memory::PROVIDER, ""))
            .unwrap();
        assert!(handle.retrieve("srv1", "read").unwrap().is_none());

        resolver.clear_connection();
        assert!(handle.retrieve("srv1", "read").unwrap().is_some());
    }
}
