//! Admin operation surface.
//!
//! # Data Flow
//! ```text
//! REST / CLI caller
//!     → AdminServices (validation, authorization, metrics)
//!     → editor.rs (configuration read-modify-write)
//!     → runtime::orchestrator (activation / deactivation)
//!     → store / instance map
//! ```
//!
//! # Design Decisions
//! - One façade owns every collaborator; handlers hold an `Arc<AdminServices>`
//! - Operations are synchronous and run to completion on the calling thread
//! - Every operation records a metrics counter keyed by operation name

pub mod governance;
pub mod operations;
pub mod server_config;
pub mod subsystems;

use std::sync::Arc;

use serde::Serialize;

use crate::document::Connection;
use crate::editor::ConfigurationEditor;
use crate::error::AdminResult;
use crate::eventbus::{DefaultEventBusFactory, EventBusConnectorFactory};
use crate::locks::ServerNameLocks;
use crate::observability::metrics;
use crate::runtime::admins::AdminRegistry;
use crate::runtime::instance_map::PlatformInstanceMap;
use crate::runtime::orchestrator::ServerLifecycleOrchestrator;
use crate::runtime::security::{OpenSecurityVerifier, SecurityVerifier};
use crate::store::{ConfigStoreConnector, ConfigStoreHandle, StoreResolver};

/// Identity summary of one configured subsystem, as returned by the
/// `get_configured_*` operations. Options are deliberately not included;
/// they are visible only through the full configuration calls.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ServiceSummary {
    pub id: u32,
    pub name: String,
    pub full_name: String,
    pub url_marker: String,
    pub description: String,
}

/// Known/active summary for one server name.
#[derive(Debug, Clone, Serialize)]
pub struct ServerStatusSummary {
    pub server_name: String,
    pub is_active: bool,
    pub stored_configuration_exists: bool,
    /// Started subsystems in start order, when active.
    pub active_subsystems: Vec<String>,
}

/// The administrative control-plane façade.
pub struct AdminServices {
    editor: ConfigurationEditor,
    orchestrator: ServerLifecycleOrchestrator,
    instance_map: Arc<PlatformInstanceMap>,
    store: ConfigStoreHandle,
    resolver: Arc<StoreResolver>,
    event_bus_factory: Arc<dyn EventBusConnectorFactory>,
    platform_security: Arc<dyn SecurityVerifier>,
}

impl AdminServices {
    pub fn new(
        default_store: Arc<dyn ConfigStoreConnector>,
        admin_registry: AdminRegistry,
        platform_security: Arc<dyn SecurityVerifier>,
    ) -> Self {
        let resolver = Arc::new(StoreResolver::new(default_store));
        let store = ConfigStoreHandle::new(resolver.clone());
        let locks = Arc::new(ServerNameLocks::new());
        let instance_map = Arc::new(PlatformInstanceMap::new());
        Self {
            editor: ConfigurationEditor::new(
                store.clone(),
                locks.clone(),
                platform_security.clone(),
            ),
            orchestrator: ServerLifecycleOrchestrator::new(
                Arc::new(admin_registry),
                instance_map.clone(),
                store.clone(),
                locks,
            ),
            instance_map,
            store,
            resolver,
            event_bus_factory: Arc::new(DefaultEventBusFactory),
            platform_security,
        }
    }

    /// Façade with the built-in admin registry and an open platform
    /// verifier, over the given default store backend.
    pub fn with_defaults(default_store: Arc<dyn ConfigStoreConnector>) -> Self {
        Self::new(
            default_store,
            AdminRegistry::with_builtin_admins(),
            Arc::new(OpenSecurityVerifier),
        )
    }

    pub(crate) fn editor(&self) -> &ConfigurationEditor {
        &self.editor
    }

    pub(crate) fn orchestrator(&self) -> &ServerLifecycleOrchestrator {
        &self.orchestrator
    }

    pub(crate) fn instance_map(&self) -> &Arc<PlatformInstanceMap> {
        &self.instance_map
    }

    pub(crate) fn store(&self) -> &ConfigStoreHandle {
        &self.store
    }

    pub(crate) fn event_bus_factory_arc(&self) -> Arc<dyn EventBusConnectorFactory> {
        self.event_bus_factory.clone()
    }

    /// Install the platform-wide configuration store connection. Affects
    /// all subsequent reads and writes for every server; already-active
    /// instances are not migrated.
    pub fn set_configuration_store_connection(
        &self,
        user_id: &str,
        connection: Connection,
    ) -> AdminResult<()> {
        metrics::record_operation("set-configuration-store-connection");
        self.platform_security
            .validate_user_as_operator_for_platform(user_id, "set-configuration-store-connection")?;
        self.resolver.set_connection(connection)
    }

    /// Drop the platform-wide store connection override.
    pub fn clear_configuration_store_connection(&self, user_id: &str) -> AdminResult<()> {
        metrics::record_operation("clear-configuration-store-connection");
        self.platform_security.validate_user_as_operator_for_platform(
            user_id,
            "clear-configuration-store-connection",
        )?;
        self.resolver.clear_connection();
        Ok(())
    }

    /// The currently-installed store connection override, if any.
    pub fn get_configuration_store_connection(
        &self,
        user_id: &str,
    ) -> AdminResult<Option<Connection>> {
        self.platform_security.validate_user_as_operator_for_platform(
            user_id,
            "get-configuration-store-connection",
        )?;
        Ok(self.resolver.current_connection())
    }
}
