//! Process-wide registry of active server instances.
//!
//! # Responsibilities
//! - Hold the runtime instance for every active server name
//! - Enforce at-most-one active instance per server name
//! - Gate admission on the server's security verifier
//!
//! # Design Decisions
//! - Instances are owned exclusively by the map while active; in-flight
//!   operations borrow through short closure-scoped access, never holding a
//!   reference across operations
//! - Admitting a name that is already active forces the previous instance
//!   down first; the map never holds two instances for one name

use std::sync::Arc;

use dashmap::DashMap;

use crate::document::{ConfigurationDocument, Connection};
use crate::error::AdminResult;
use crate::runtime::instance::RuntimeInstance;
use crate::runtime::security::{self, SecurityVerifier};

#[derive(Default)]
pub struct PlatformInstanceMap {
    instances: DashMap<String, RuntimeInstance>,
}

impl PlatformInstanceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self, server_name: &str) -> bool {
        self.instances.contains_key(server_name)
    }

    /// Names of all active servers, unordered.
    pub fn active_servers(&self) -> Vec<String> {
        self.instances.iter().map(|e| e.key().clone()).collect()
    }

    /// Copy of the document an active server was started from.
    pub fn active_document(&self, server_name: &str) -> Option<ConfigurationDocument> {
        self.instances.get(server_name).map(|i| i.document.clone())
    }

    /// Security verifier of the active instance for a name, if any.
    pub fn verifier(&self, server_name: &str) -> Option<Arc<dyn SecurityVerifier>> {
        self.instances.get(server_name).map(|i| i.security.clone())
    }

    /// Run a closure against the active instance for a name, if any. The
    /// borrow ends when the closure returns.
    pub fn with_instance_mut<T>(
        &self,
        server_name: &str,
        f: impl FnOnce(&mut RuntimeInstance) -> T,
    ) -> Option<T> {
        self.instances.get_mut(server_name).map(|mut i| f(&mut i))
    }

    /// Validate authorization and build the security verifier before any
    /// subsystem starts. If an instance is somehow still registered for the
    /// name, it is forced down first.
    pub fn start_up_server_instance(
        &self,
        user_id: &str,
        server_name: &str,
        security_connection: Option<&Connection>,
        operation: &'static str,
    ) -> AdminResult<Arc<dyn SecurityVerifier>> {
        let verifier = security::verifier_for_connection(security_connection, server_name, operation)?;
        verifier.validate_user_as_server_admin(user_id, server_name, operation)?;

        if let Some((_, mut previous)) = self.instances.remove(server_name) {
            tracing::warn!(
                server_name = %server_name,
                "Previous instance still registered at startup; forcing it down"
            );
            force_shutdown(&mut previous);
        }
        Ok(verifier)
    }

    /// Admit a fully-started instance. Replaces (after forced shutdown) any
    /// instance registered for the same name.
    pub fn register(&self, instance: RuntimeInstance) {
        if let Some(mut previous) = self
            .instances
            .insert(instance.server_name.clone(), instance)
        {
            tracing::warn!(
                server_name = %previous.server_name,
                "Replaced an active instance; forcing the previous one down"
            );
            force_shutdown(&mut previous);
        }
    }

    /// Remove the instance for a name, handing ownership to the caller for
    /// teardown. `None` when the name is not active.
    pub fn shutdown_server_instance(&self, server_name: &str) -> Option<RuntimeInstance> {
        self.instances.remove(server_name).map(|(_, instance)| instance)
    }
}

/// Best-effort reverse-order shutdown used when the map must evict an
/// instance itself.
fn force_shutdown(instance: &mut RuntimeInstance) {
    for subsystem in instance.started.iter_mut().rev() {
        if let Err(e) = subsystem.shutdown(false) {
            tracing::warn!(
                server_name = %instance.server_name,
                subsystem = %subsystem.name,
                error = %e,
                "Forced shutdown of subsystem failed"
            );
        }
    }
}
