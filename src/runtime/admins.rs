//! Subsystem admin contracts and the compile-time admin registry.
//!
//! # Responsibilities
//! - Define the initialize/shutdown contracts the orchestrator drives
//! - Map subsystem identities to admin constructors at compile time, so the
//!   set of admin implementations is closed and statically checkable while
//!   the configuration document still selects which ones run
//!
//! # Design Decisions
//! - Admins are black boxes to the orchestrator: they complete or they
//!   raise, with no retry
//! - Built-in in-process admins stand in for the real domain services,
//!   which live outside this crate

use std::collections::HashMap;

use thiserror::Error;

use crate::document::{
    AccessServiceConfig, ConformanceSuiteConfig, Connection, EngineServiceConfig,
    EnterpriseAccessConfig, GovernanceServerConfig, GovernanceServerKind,
    RepositoryServicesConfig, ViewServiceConfig,
};
use crate::registry;

/// Failure raised by a subsystem's initialize or shutdown call.
#[derive(Debug, Error)]
#[error("{subsystem}: {message}")]
pub struct SubsystemError {
    pub subsystem: String,
    pub message: String,
}

impl SubsystemError {
    pub fn new(subsystem: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            subsystem: subsystem.into(),
            message: message.into(),
        }
    }
}

/// Server-level context handed to every subsystem at initialization.
pub struct InitContext<'a> {
    pub server_name: &'a str,
    pub local_server_user_id: &'a str,
    pub max_page_size: u32,

    /// Audit log destinations from the repository services fragment.
    pub audit_destinations: &'a [Connection],
}

/// Admin contract for access services.
pub trait AccessServiceAdmin: Send + Sync {
    fn initialize(
        &mut self,
        config: &AccessServiceConfig,
        enterprise_topic: Option<&Connection>,
        ctx: &InitContext<'_>,
    ) -> Result<(), SubsystemError>;

    fn shutdown(&mut self) -> Result<(), SubsystemError>;
}

/// Admin contract for view services.
pub trait ViewServiceAdmin: Send + Sync {
    fn initialize(
        &mut self,
        config: &ViewServiceConfig,
        ctx: &InitContext<'_>,
    ) -> Result<(), SubsystemError>;

    fn shutdown(&mut self) -> Result<(), SubsystemError>;
}

/// Admin contract for engine services.
pub trait EngineServiceAdmin: Send + Sync {
    fn initialize(
        &mut self,
        config: &EngineServiceConfig,
        ctx: &InitContext<'_>,
    ) -> Result<(), SubsystemError>;

    fn shutdown(&mut self) -> Result<(), SubsystemError>;
}

/// Admin contract for governance servers. Termination distinguishes a
/// temporary stop from a permanent decommission.
pub trait GovernanceServerAdmin: Send + Sync {
    fn initialize(
        &mut self,
        config: &GovernanceServerConfig,
        ctx: &InitContext<'_>,
    ) -> Result<(), SubsystemError>;

    fn terminate(&mut self, permanent: bool) -> Result<(), SubsystemError>;
}

/// Handle to the enterprise event topic. Started only after every access
/// service has registered its listeners; delivery runs on the event-bus
/// connector's own threads, outside this crate.
pub trait EnterpriseTopicHandle: Send + Sync {
    fn start(&mut self) -> Result<(), SubsystemError>;
    fn stop(&mut self) -> Result<(), SubsystemError>;
}

/// Runtime handle for the mandatory repository services subsystem.
pub struct RepositoryServicesRuntime {
    server_name: String,
    archives_loaded: Vec<String>,
}

impl RepositoryServicesRuntime {
    pub fn initialize(
        config: &RepositoryServicesConfig,
        ctx: &InitContext<'_>,
    ) -> Result<Self, SubsystemError> {
        tracing::info!(
            server_name = %ctx.server_name,
            audit_destinations = config.audit_log_destinations.len(),
            cohorts = config.cohorts.len(),
            local_repository = config.local_repository.is_some(),
            "Repository services initialized"
        );
        let mut runtime = Self {
            server_name: ctx.server_name.to_string(),
            archives_loaded: Vec::new(),
        };
        for archive in &config.open_metadata_archives {
            runtime.load_archive(&archive.endpoint)?;
        }
        Ok(runtime)
    }

    /// Load one open metadata archive into the running repository.
    pub fn load_archive(&mut self, file_name: &str) -> Result<(), SubsystemError> {
        tracing::info!(
            server_name = %self.server_name,
            file_name = %file_name,
            "Open metadata archive loaded"
        );
        self.archives_loaded.push(file_name.to_string());
        Ok(())
    }

    pub fn archives_loaded(&self) -> &[String] {
        &self.archives_loaded
    }

    pub fn shutdown(&mut self, permanent: bool) -> Result<(), SubsystemError> {
        tracing::info!(server_name = %self.server_name, permanent, "Repository services shut down");
        Ok(())
    }
}

/// Runtime handle for the OCF/common metadata services, started only when
/// enterprise (federated) access is configured.
pub struct CommonServicesRuntime {
    server_name: String,
}

impl CommonServicesRuntime {
    pub fn initialize(
        enterprise: &EnterpriseAccessConfig,
        ctx: &InitContext<'_>,
    ) -> Result<Self, SubsystemError> {
        tracing::info!(
            server_name = %ctx.server_name,
            metadata_collection = %enterprise.metadata_collection_name,
            "Common metadata services initialized"
        );
        Ok(Self {
            server_name: ctx.server_name.to_string(),
        })
    }

    pub fn shutdown(&mut self) -> Result<(), SubsystemError> {
        tracing::info!(server_name = %self.server_name, "Common metadata services shut down");
        Ok(())
    }
}

/// Runtime handle for the conformance suite service.
pub struct ConformanceSuiteRuntime {
    server_name: String,
}

impl ConformanceSuiteRuntime {
    pub fn initialize(
        config: &ConformanceSuiteConfig,
        ctx: &InitContext<'_>,
    ) -> Result<Self, SubsystemError> {
        tracing::info!(
            server_name = %ctx.server_name,
            workbenches = config.workbenches.len(),
            "Conformance suite initialized"
        );
        Ok(Self {
            server_name: ctx.server_name.to_string(),
        })
    }

    pub fn shutdown(&mut self) -> Result<(), SubsystemError> {
        tracing::info!(server_name = %self.server_name, "Conformance suite shut down");
        Ok(())
    }
}

/// Built-in in-process admin used for every service this crate hosts itself.
struct InProcessAdmin {
    service_name: &'static str,
    running: bool,
}

impl InProcessAdmin {
    fn start(&mut self, server_name: &str) -> Result<(), SubsystemError> {
        tracing::info!(server_name = %server_name, service = %self.service_name, "Service initialized");
        self.running = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), SubsystemError> {
        self.running = false;
        tracing::info!(service = %self.service_name, "Service shut down");
        Ok(())
    }
}

impl AccessServiceAdmin for InProcessAdmin {
    fn initialize(
        &mut self,
        _config: &AccessServiceConfig,
        _enterprise_topic: Option<&Connection>,
        ctx: &InitContext<'_>,
    ) -> Result<(), SubsystemError> {
        self.start(ctx.server_name)
    }

    fn shutdown(&mut self) -> Result<(), SubsystemError> {
        self.stop()
    }
}

impl ViewServiceAdmin for InProcessAdmin {
    fn initialize(
        &mut self,
        _config: &ViewServiceConfig,
        ctx: &InitContext<'_>,
    ) -> Result<(), SubsystemError> {
        self.start(ctx.server_name)
    }

    fn shutdown(&mut self) -> Result<(), SubsystemError> {
        self.stop()
    }
}

impl EngineServiceAdmin for InProcessAdmin {
    fn initialize(
        &mut self,
        _config: &EngineServiceConfig,
        ctx: &InitContext<'_>,
    ) -> Result<(), SubsystemError> {
        self.start(ctx.server_name)
    }

    fn shutdown(&mut self) -> Result<(), SubsystemError> {
        self.stop()
    }
}

impl GovernanceServerAdmin for InProcessAdmin {
    fn initialize(
        &mut self,
        _config: &GovernanceServerConfig,
        ctx: &InitContext<'_>,
    ) -> Result<(), SubsystemError> {
        self.start(ctx.server_name)
    }

    fn terminate(&mut self, permanent: bool) -> Result<(), SubsystemError> {
        tracing::info!(service = %self.service_name, permanent, "Governance server terminating");
        self.stop()
    }
}

/// In-process enterprise topic handle.
struct LoggingEnterpriseTopic {
    connection: Connection,
    started: bool,
}

impl EnterpriseTopicHandle for LoggingEnterpriseTopic {
    fn start(&mut self) -> Result<(), SubsystemError> {
        tracing::info!(topic = %self.connection.endpoint, "Enterprise event topic started");
        self.started = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), SubsystemError> {
        if self.started {
            tracing::info!(topic = %self.connection.endpoint, "Enterprise event topic stopped");
            self.started = false;
        }
        Ok(())
    }
}

type AccessCtor = Box<dyn Fn() -> Box<dyn AccessServiceAdmin> + Send + Sync>;
type ViewCtor = Box<dyn Fn() -> Box<dyn ViewServiceAdmin> + Send + Sync>;
type EngineCtor = Box<dyn Fn() -> Box<dyn EngineServiceAdmin> + Send + Sync>;
type GovernanceCtor = Box<dyn Fn() -> Box<dyn GovernanceServerAdmin> + Send + Sync>;
type TopicCtor = Box<dyn Fn(Connection) -> Box<dyn EnterpriseTopicHandle> + Send + Sync>;

/// Compile-time registry mapping subsystem identities to admin constructors.
///
/// Replaces instantiate-by-class-name: the identity in the configuration
/// document selects an entry here, and an unmapped identity is a
/// configuration error rather than a load failure.
pub struct AdminRegistry {
    access: HashMap<u32, AccessCtor>,
    view: HashMap<u32, ViewCtor>,
    engine: HashMap<u32, EngineCtor>,
    governance: HashMap<GovernanceServerKind, GovernanceCtor>,
    enterprise_topic: TopicCtor,
}

impl AdminRegistry {
    /// Registry with the built-in in-process admin bound to every enabled
    /// catalog entry and every governance server kind.
    pub fn with_builtin_admins() -> Self {
        let mut registry = Self {
            access: HashMap::new(),
            view: HashMap::new(),
            engine: HashMap::new(),
            governance: HashMap::new(),
            enterprise_topic: Box::new(|connection| {
                Box::new(LoggingEnterpriseTopic {
                    connection,
                    started: false,
                })
            }),
        };
        for reg in registry::list_enabled(registry::ACCESS_SERVICES) {
            let name = reg.full_name;
            registry.register_access_service(
                reg.id,
                Box::new(move || {
                    Box::new(InProcessAdmin {
                        service_name: name,
                        running: false,
                    })
                }),
            );
        }
        for reg in registry::list_enabled(registry::VIEW_SERVICES) {
            let name = reg.full_name;
            registry.register_view_service(
                reg.id,
                Box::new(move || {
                    Box::new(InProcessAdmin {
                        service_name: name,
                        running: false,
                    })
                }),
            );
        }
        for reg in registry::list_enabled(registry::ENGINE_SERVICES) {
            let name = reg.full_name;
            registry.register_engine_service(
                reg.id,
                Box::new(move || {
                    Box::new(InProcessAdmin {
                        service_name: name,
                        running: false,
                    })
                }),
            );
        }
        for kind in GovernanceServerKind::ALL {
            let name = kind.display_name();
            registry.register_governance_server(
                kind,
                Box::new(move || {
                    Box::new(InProcessAdmin {
                        service_name: name,
                        running: false,
                    })
                }),
            );
        }
        registry
    }

    pub fn register_access_service(&mut self, id: u32, ctor: AccessCtor) {
        self.access.insert(id, ctor);
    }

    pub fn register_view_service(&mut self, id: u32, ctor: ViewCtor) {
        self.view.insert(id, ctor);
    }

    pub fn register_engine_service(&mut self, id: u32, ctor: EngineCtor) {
        self.engine.insert(id, ctor);
    }

    pub fn register_governance_server(&mut self, kind: GovernanceServerKind, ctor: GovernanceCtor) {
        self.governance.insert(kind, ctor);
    }

    pub fn set_enterprise_topic_ctor(&mut self, ctor: TopicCtor) {
        self.enterprise_topic = ctor;
    }

    pub fn access_admin(&self, id: u32) -> Option<Box<dyn AccessServiceAdmin>> {
        self.access.get(&id).map(|ctor| ctor())
    }

    pub fn view_admin(&self, id: u32) -> Option<Box<dyn ViewServiceAdmin>> {
        self.view.get(&id).map(|ctor| ctor())
    }

    pub fn engine_admin(&self, id: u32) -> Option<Box<dyn EngineServiceAdmin>> {
        self.engine.get(&id).map(|ctor| ctor())
    }

    pub fn governance_admin(&self, kind: GovernanceServerKind) -> Option<Box<dyn GovernanceServerAdmin>> {
        self.governance.get(&kind).map(|ctor| ctor())
    }

    pub fn enterprise_topic(&self, connection: Connection) -> Box<dyn EnterpriseTopicHandle> {
        (self.enterprise_topic)(connection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_registry_covers_enabled_catalog_entries() {
        let registry = AdminRegistry::with_builtin_admins();
        assert!(registry.access_admin(1003).is_some()); // Asset Consumer
        assert!(registry.access_admin(1008).is_none()); // Data Science is disabled
        assert!(registry
            .governance_admin(GovernanceServerKind::Stewardship)
            .is_some());
    }
}
