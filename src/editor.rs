//! Configuration document editing.
//!
//! # Data Flow
//! ```text
//! configure call
//!     → validation.rs (inputs, before any store access)
//!     → store read (or fresh default document, gated on authorization)
//!     → fragment merge (replace-by-identity within the owning list)
//!     → audit trail append (one line per action)
//!     → store write (persisted before the call returns)
//! ```
//!
//! # Design Decisions
//! - The whole read-modify-write runs under the per-server-name lock
//! - Fragments are replaced wholesale by identity, never merged field-wise
//! - An emptied fragment list is stored as absent so activation treats
//!   "cleared" and "never configured" identically
//! - A store failure mid-write leaves the document in whatever state the
//!   backend defines; there is no two-phase commit

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;

use crate::document::{
    AccessServiceConfig, ConfigurationDocument, EngineServiceConfig, EnterpriseAccessConfig,
    ServiceStatus, ViewServiceConfig,
};
use crate::error::{AdminError, AdminResult};
use crate::eventbus::{self, EventBusConnectorFactory};
use crate::locks::{self, ServerNameLocks};
use crate::registry::Registration;
use crate::runtime::security::{self, SecurityVerifier};
use crate::store::ConfigStoreHandle;
use crate::validation;

/// Audit-trail timestamp format. Monotonic non-decreasing per server is
/// guaranteed by the per-name lock, not by the clock itself.
fn audit_timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Merge logic shared by every "set X config" operation.
pub struct ConfigurationEditor {
    store: ConfigStoreHandle,
    locks: Arc<ServerNameLocks>,
    platform_security: Arc<dyn SecurityVerifier>,
}

impl ConfigurationEditor {
    pub fn new(
        store: ConfigStoreHandle,
        locks: Arc<ServerNameLocks>,
        platform_security: Arc<dyn SecurityVerifier>,
    ) -> Self {
        Self {
            store,
            locks,
            platform_security,
        }
    }

    pub fn store(&self) -> &ConfigStoreHandle {
        &self.store
    }

    /// One transactional read-modify-write.
    ///
    /// The mutator returns the action descriptions to append to the audit
    /// trail: one per logical action, so combined operations append two
    /// lines. The updated document is persisted before this returns.
    pub fn update_document(
        &self,
        user_id: &str,
        server_name: &str,
        operation: &'static str,
        mutate: impl FnOnce(&mut ConfigurationDocument) -> AdminResult<Vec<String>>,
    ) -> AdminResult<()> {
        validation::validate_server_name(server_name, operation)?;
        validation::validate_user_id(user_id, server_name, operation)?;

        let lock = self.locks.for_server(server_name);
        let _guard = locks::lock_server(&lock);

        let mut doc = match self.store.retrieve(server_name, operation)? {
            Some(doc) => {
                let verifier = security::verifier_for_connection(
                    doc.server_security_connection.as_ref(),
                    server_name,
                    operation,
                )?;
                verifier.validate_user_as_server_admin(user_id, server_name, operation)?;
                doc
            }
            None => {
                self.platform_security
                    .validate_user_for_new_server(user_id, server_name, operation)?;
                ConfigurationDocument::new(server_name)
            }
        };

        let actions = mutate(&mut doc)?;
        for action in actions {
            doc.audit_trail
                .push(format!("{} {} {}", audit_timestamp(), user_id, action));
        }

        self.store.store(server_name, operation, Some(&doc))
    }

    /// Read a document without mutating it. `None` when the server has
    /// never been configured.
    pub fn read_document(
        &self,
        user_id: &str,
        server_name: &str,
        operation: &'static str,
    ) -> AdminResult<Option<ConfigurationDocument>> {
        validation::validate_server_name(server_name, operation)?;
        validation::validate_user_id(user_id, server_name, operation)?;
        self.store.retrieve(server_name, operation)
    }

    /// Remove the whole document ("clear all").
    pub fn delete_document(
        &self,
        user_id: &str,
        server_name: &str,
        operation: &'static str,
    ) -> AdminResult<()> {
        validation::validate_server_name(server_name, operation)?;
        validation::validate_user_id(user_id, server_name, operation)?;

        let lock = self.locks.for_server(server_name);
        let _guard = locks::lock_server(&lock);

        if let Some(doc) = self.store.retrieve(server_name, operation)? {
            let verifier = security::verifier_for_connection(
                doc.server_security_connection.as_ref(),
                server_name,
                operation,
            )?;
            verifier.validate_user_as_server_admin(user_id, server_name, operation)?;
            self.store.store(server_name, operation, None)?;
        }
        Ok(())
    }
}

/// Replace-by-identity within a fragment list.
///
/// Removes any entry whose identity matches, appends the replacement when
/// one is supplied, and collapses an emptied list to absent.
pub fn replace_by_identity<T>(
    list: &mut Option<Vec<T>>,
    matches: impl Fn(&T) -> bool,
    replacement: Option<T>,
) {
    let mut entries = list.take().unwrap_or_default();
    entries.retain(|entry| !matches(entry));
    if let Some(new_entry) = replacement {
        entries.push(new_entry);
    }
    *list = if entries.is_empty() { None } else { Some(entries) };
}

/// Build an access service fragment from its registration, deriving the
/// event channels from the document's event bus settings.
pub fn build_access_service_config(
    registration: &Registration,
    options: Option<HashMap<String, Value>>,
    doc: &ConfigurationDocument,
    factory: &dyn EventBusConnectorFactory,
) -> AccessServiceConfig {
    let topics = doc.event_bus.as_ref().map(|bus| {
        (
            factory.topic_connection(
                bus,
                &eventbus::access_service_in_topic_qualifier(
                    &doc.server_name,
                    registration.url_marker,
                ),
            ),
            factory.topic_connection(
                bus,
                &eventbus::access_service_out_topic_qualifier(
                    &doc.server_name,
                    registration.url_marker,
                ),
            ),
        )
    });
    let (in_topic, out_topic) = match topics {
        Some((in_topic, out_topic)) => (Some(in_topic), Some(out_topic)),
        None => (None, None),
    };
    AccessServiceConfig {
        id: registration.id,
        name: registration.name.to_string(),
        full_name: registration.full_name.to_string(),
        url_marker: registration.url_marker.to_string(),
        description: registration.description.to_string(),
        wiki: registration.wiki.to_string(),
        status: ServiceStatus::Enabled,
        options,
        in_topic,
        out_topic,
    }
}

/// Build a view service fragment targeting a metadata server.
pub fn build_view_service_config(
    registration: &Registration,
    target_server_name: &str,
    target_platform_url: &str,
    options: Option<HashMap<String, Value>>,
) -> ViewServiceConfig {
    ViewServiceConfig {
        id: registration.id,
        name: registration.name.to_string(),
        full_name: registration.full_name.to_string(),
        url_marker: registration.url_marker.to_string(),
        description: registration.description.to_string(),
        wiki: registration.wiki.to_string(),
        status: ServiceStatus::Enabled,
        target_server_name: target_server_name.to_string(),
        target_platform_url: target_platform_url.to_string(),
        options,
    }
}

/// Build an engine service fragment hosting the named engines.
pub fn build_engine_service_config(
    registration: &Registration,
    target_server_name: &str,
    target_platform_url: &str,
    engines: Vec<String>,
    options: Option<HashMap<String, Value>>,
) -> EngineServiceConfig {
    EngineServiceConfig {
        id: registration.id,
        name: registration.name.to_string(),
        full_name: registration.full_name.to_string(),
        url_marker: registration.url_marker.to_string(),
        description: registration.description.to_string(),
        wiki: registration.wiki.to_string(),
        status: ServiceStatus::Enabled,
        target_server_name: target_server_name.to_string(),
        target_platform_url: target_platform_url.to_string(),
        engines,
        options,
    }
}

/// Establish the default enterprise (federated) access configuration when
/// the first access service is configured. Returns `true` when a default
/// was created; clearing the last access service never removes it.
pub fn ensure_enterprise_access(
    doc: &mut ConfigurationDocument,
    factory: &dyn EventBusConnectorFactory,
) -> bool {
    if doc.enterprise_access.is_some() {
        return false;
    }
    let enterprise_topic = doc.event_bus.as_ref().map(|bus| {
        factory.topic_connection(
            bus,
            &eventbus::enterprise_topic_qualifier(&doc.server_name),
        )
    });
    doc.enterprise_access = Some(EnterpriseAccessConfig {
        metadata_collection_name: format!(
            "Enterprise Metadata Collection for {}",
            doc.server_name
        ),
        metadata_collection_id: uuid::Uuid::new_v4().to_string(),
        enterprise_topic,
    });
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eventbus::DefaultEventBusFactory;
    use crate::runtime::security::OpenSecurityVerifier;
    use crate::store::memory::InMemoryConfigStore;
    use crate::store::StoreResolver;

    fn editor() -> ConfigurationEditor {
        let resolver = Arc::new(StoreResolver::new(Arc::new(InMemoryConfigStore::new())));
        ConfigurationEditor::new(
            ConfigStoreHandle::new(resolver),
            Arc::new(ServerNameLocks::new()),
            Arc::new(OpenSecurityVerifier),
        )
    }

    #[test]
    fn each_update_appends_exactly_the_returned_actions() {
        let editor = editor();
        editor
            .update_document("garygeeke", "srv1", "set-server-type", |doc| {
                doc.server_type = Some("Metadata Server".into());
                Ok(vec!["set server type to Metadata Server".into()])
            })
            .unwrap();
        editor
            .update_document("erinoverview", "srv1", "set-organization", |doc| {
                doc.organization_name = Some("Coco Pharmaceuticals".into());
                Ok(vec!["set organization name".into()])
            })
            .unwrap();

        let doc = editor
            .read_document("garygeeke", "srv1", "get-config")
            .unwrap()
            .unwrap();
        assert_eq!(doc.audit_trail.len(), 2);
        assert!(doc.audit_trail[0].contains("garygeeke"));
        assert!(doc.audit_trail[0].contains("set server type"));
        assert!(doc.audit_trail[1].contains("erinoverview"));
    }

    #[test]
    fn validation_failure_writes_nothing() {
        let editor = editor();
        let err = editor
            .update_document("", "srv1", "set-server-type", |_| Ok(vec![]))
            .unwrap_err();
        assert_eq!(err.kind_code(), "INVALID_PARAMETER");
        assert!(editor
            .read_document("garygeeke", "srv1", "get-config")
            .unwrap()
            .is_none());
    }

    #[test]
    fn replace_by_identity_keeps_one_entry_per_identity() {
        let mut list: Option<Vec<(u32, &str)>> = Some(vec![(1, "a"), (2, "b")]);
        replace_by_identity(&mut list, |e| e.0 == 1, Some((1, "c")));
        let entries = list.clone().unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.contains(&(1, "c")));

        replace_by_identity(&mut list, |e| e.0 == 1, None);
        replace_by_identity(&mut list, |e| e.0 == 2, None);
        assert!(list.is_none());
    }

    #[test]
    fn enterprise_access_default_is_created_once_and_kept() {
        let factory = DefaultEventBusFactory;
        let mut doc = ConfigurationDocument::new("srv1");
        assert!(ensure_enterprise_access(&mut doc, &factory));
        let id = doc
            .enterprise_access
            .as_ref()
            .unwrap()
            .metadata_collection_id
            .clone();
        assert!(!ensure_enterprise_access(&mut doc, &factory));
        assert_eq!(
            doc.enterprise_access.unwrap().metadata_collection_id,
            id
        );
    }
}
