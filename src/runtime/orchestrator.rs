//! Server lifecycle orchestration.
//!
//! # Data Flow
//! ```text
//! Activation:
//!     document → validate (empty? repository services present?)
//!         → implicit temporary deactivation when already active
//!         → authorization + security verifier
//!         → subsystems in dependency order
//!         → register RuntimeInstance → success summary
//!
//! Deactivation:
//!     instance lookup (absent → no-op success)
//!         → reverse-order shutdown, collect-and-continue
//!         → always unregister → permanent? delete document
//! ```
//!
//! # Design Decisions
//! - Ordered startup, fail fast: the first subsystem failure aborts the
//!   whole activation and no instance is registered
//! - No automatic rollback mid-activation: subsystems that already started
//!   stay up in memory and the caller deactivates to clean up
//! - Shutdown failures never stop the remaining subsystems from being asked
//!   to shut down; the first error is surfaced after all attempts

use std::sync::Arc;

use crate::document::{ConfigurationDocument, Connection};
use crate::error::{AdminError, AdminResult, ConfigErrorKind};
use crate::locks::{self, ServerNameLocks};
use crate::runtime::admins::{
    AdminRegistry, CommonServicesRuntime, ConformanceSuiteRuntime, InitContext,
    RepositoryServicesRuntime,
};
use crate::runtime::instance::{RuntimeInstance, StartedSubsystem, SubsystemHandle};
use crate::runtime::instance_map::PlatformInstanceMap;
use crate::runtime::security;
use crate::store::ConfigStoreHandle;

const ACTIVATE_OP: &str = "activate-server";
const DEACTIVATE_OP: &str = "deactivate-server";

pub struct ServerLifecycleOrchestrator {
    admin_registry: Arc<AdminRegistry>,
    instance_map: Arc<PlatformInstanceMap>,
    store: ConfigStoreHandle,
    locks: Arc<ServerNameLocks>,
}

impl ServerLifecycleOrchestrator {
    pub fn new(
        admin_registry: Arc<AdminRegistry>,
        instance_map: Arc<PlatformInstanceMap>,
        store: ConfigStoreHandle,
        locks: Arc<ServerNameLocks>,
    ) -> Self {
        Self {
            admin_registry,
            instance_map,
            store,
            locks,
        }
    }

    pub fn instance_map(&self) -> &Arc<PlatformInstanceMap> {
        &self.instance_map
    }

    /// Activate a server from a resolved configuration document.
    ///
    /// Returns the display names of the subsystems that started, in start
    /// order. Activating an already-active server first runs the full
    /// temporary deactivation path, so back-to-back activations always
    /// leave exactly one instance reflecting the latest document.
    pub fn activate(
        &self,
        user_id: &str,
        server_name: &str,
        doc: ConfigurationDocument,
    ) -> AdminResult<Vec<String>> {
        let lock = self.locks.for_server(server_name);
        let _guard = locks::lock_server(&lock);
        self.activate_locked(user_id, server_name, doc)
    }

    fn activate_locked(
        &self,
        user_id: &str,
        server_name: &str,
        doc: ConfigurationDocument,
    ) -> AdminResult<Vec<String>> {
        if doc.configured_subsystem_count() == 0 {
            return Err(AdminError::configuration(
                server_name,
                ACTIVATE_OP,
                ConfigErrorKind::EmptyConfiguration,
                "the configuration document configures no subsystems",
            ));
        }
        if doc.repository_services.is_none() {
            return Err(AdminError::configuration(
                server_name,
                ACTIVATE_OP,
                ConfigErrorKind::MissingRepositoryServices,
                "subsystems are configured but the mandatory repository services fragment is missing",
            ));
        }

        if self.instance_map.is_active(server_name) {
            tracing::info!(server_name = %server_name, "Server already active; restarting");
            self.deactivate_locked(user_id, server_name, false)?;
        }

        // Authorization and security-verifier construction happen before
        // any subsystem starts, so a refused caller leaves no partial state.
        let verifier = self.instance_map.start_up_server_instance(
            user_id,
            server_name,
            doc.server_security_connection.as_ref(),
            ACTIVATE_OP,
        )?;

        let repository_config = doc
            .repository_services
            .as_ref()
            .cloned()
            .unwrap_or_default();
        let ctx = InitContext {
            server_name,
            local_server_user_id: &doc.local_server_user_id,
            max_page_size: doc.max_page_size,
            audit_destinations: &repository_config.audit_log_destinations,
        };

        let mut started: Vec<StartedSubsystem> = Vec::new();

        // 1. Repository services: everything else depends on them.
        let repository =
            RepositoryServicesRuntime::initialize(&repository_config, &ctx).map_err(|e| {
                self.start_failure(server_name, "Open Metadata Repository Services", e)
            })?;
        started.push(StartedSubsystem {
            name: "Open Metadata Repository Services".to_string(),
            handle: SubsystemHandle::RepositoryServices(repository),
        });
        tracing::debug!(server_name = %server_name, "Server security verifier wired");

        // 2. OCF/common metadata services, only with federated access.
        if let Some(enterprise) = &doc.enterprise_access {
            let common = CommonServicesRuntime::initialize(enterprise, &ctx)
                .map_err(|e| self.start_failure(server_name, "Common Metadata Services", e))?;
            started.push(StartedSubsystem {
                name: "Common Metadata Services".to_string(),
                handle: SubsystemHandle::CommonServices(common),
            });
        }

        let enterprise_topic_connection: Option<Connection> = doc
            .enterprise_access
            .as_ref()
            .and_then(|e| e.enterprise_topic.clone());

        // 3. Access services, in list order.
        if let Some(access_services) = &doc.access_services {
            for config in access_services {
                if config.status == crate::document::ServiceStatus::Disabled {
                    tracing::info!(
                        server_name = %server_name,
                        service = %config.full_name,
                        "Access service fragment is disabled; skipping"
                    );
                    continue;
                }
                let mut admin = match self.admin_registry.access_admin(config.id) {
                    Some(admin) => admin,
                    None => {
                        return Err(self.access_start_failure(
                            server_name,
                            config,
                            "no admin implementation registered for this service identity",
                        ));
                    }
                };
                if let Err(e) =
                    admin.initialize(config, enterprise_topic_connection.as_ref(), &ctx)
                {
                    return Err(self.access_start_failure(server_name, config, &e.to_string()));
                }
                started.push(StartedSubsystem {
                    name: config.full_name.clone(),
                    handle: SubsystemHandle::AccessService(admin),
                });
            }
        }

        // 4. View services, in list order.
        if let Some(view_services) = &doc.view_services {
            for config in view_services {
                if config.status == crate::document::ServiceStatus::Disabled {
                    continue;
                }
                let mut admin = self.admin_registry.view_admin(config.id).ok_or_else(|| {
                    self.start_failure_msg(
                        server_name,
                        &config.full_name,
                        "no admin implementation registered for this service identity",
                    )
                })?;
                admin
                    .initialize(config, &ctx)
                    .map_err(|e| self.start_failure(server_name, &config.full_name, e))?;
                started.push(StartedSubsystem {
                    name: config.full_name.clone(),
                    handle: SubsystemHandle::ViewService(admin),
                });
            }
        }

        // 5. Engine services, in list order.
        if let Some(engine_services) = &doc.engine_services {
            for config in engine_services {
                if config.status == crate::document::ServiceStatus::Disabled {
                    continue;
                }
                let mut admin = self.admin_registry.engine_admin(config.id).ok_or_else(|| {
                    self.start_failure_msg(
                        server_name,
                        &config.full_name,
                        "no admin implementation registered for this service identity",
                    )
                })?;
                admin
                    .initialize(config, &ctx)
                    .map_err(|e| self.start_failure(server_name, &config.full_name, e))?;
                started.push(StartedSubsystem {
                    name: config.full_name.clone(),
                    handle: SubsystemHandle::EngineService(admin),
                });
            }
        }

        // 6. Conformance suite.
        if let Some(config) = &doc.conformance_suite {
            let runtime = ConformanceSuiteRuntime::initialize(config, &ctx)
                .map_err(|e| self.start_failure(server_name, "Conformance Suite", e))?;
            started.push(StartedSubsystem {
                name: "Conformance Suite".to_string(),
                handle: SubsystemHandle::ConformanceSuite(runtime),
            });
        }

        // 7. Enterprise event topic, started only after every access
        // service has registered its listeners so no events are lost.
        if let Some(connection) = enterprise_topic_connection {
            let mut topic = self.admin_registry.enterprise_topic(connection);
            topic.start().map_err(|e| {
                AdminError::configuration(
                    server_name,
                    ACTIVATE_OP,
                    ConfigErrorKind::TopicStartFailed,
                    format!("enterprise event topic failed to start: {e}"),
                )
            })?;
            started.push(StartedSubsystem {
                name: "Enterprise Event Topic".to_string(),
                handle: SubsystemHandle::EnterpriseTopic(topic),
            });
        }

        // 8. Governance servers, in their fixed order.
        for (kind, config) in doc.governance_configs() {
            let mut admin = self.admin_registry.governance_admin(kind).ok_or_else(|| {
                self.start_failure_msg(
                    server_name,
                    kind.display_name(),
                    "no admin implementation registered for this governance server kind",
                )
            })?;
            admin
                .initialize(config, &ctx)
                .map_err(|e| self.start_failure(server_name, kind.display_name(), e))?;
            started.push(StartedSubsystem {
                name: kind.display_name().to_string(),
                handle: SubsystemHandle::GovernanceServer(admin),
            });
        }

        let summary = started.iter().map(|s| s.name.clone()).collect::<Vec<_>>();
        self.instance_map.register(RuntimeInstance {
            server_name: server_name.to_string(),
            document: doc,
            started,
            security: verifier,
        });

        tracing::info!(
            server_name = %server_name,
            subsystems = ?summary,
            "Server activated"
        );
        Ok(summary)
    }

    /// Deactivate a server. A name with no active instance is a no-op
    /// success; a permanent deactivation additionally deletes the stored
    /// configuration document.
    pub fn deactivate(
        &self,
        user_id: &str,
        server_name: &str,
        permanent: bool,
    ) -> AdminResult<()> {
        let lock = self.locks.for_server(server_name);
        let _guard = locks::lock_server(&lock);
        self.deactivate_locked(user_id, server_name, permanent)
    }

    fn deactivate_locked(
        &self,
        user_id: &str,
        server_name: &str,
        permanent: bool,
    ) -> AdminResult<()> {
        if let Some(verifier) = self.instance_map.verifier(server_name) {
            verifier.validate_user_as_server_admin(user_id, server_name, DEACTIVATE_OP)?;
        } else if permanent {
            // No live instance to ask, but the stored document still names
            // its security connection and it guards the delete below.
            if let Some(doc) = self.store.retrieve(server_name, DEACTIVATE_OP)? {
                let verifier = security::verifier_for_connection(
                    doc.server_security_connection.as_ref(),
                    server_name,
                    DEACTIVATE_OP,
                )?;
                verifier.validate_user_as_server_admin(user_id, server_name, DEACTIVATE_OP)?;
            }
        }

        // The instance leaves the map before teardown, so it is unregistered
        // whatever the shutdown calls do.
        let mut first_error: Option<AdminError> = None;
        if let Some(mut instance) = self.instance_map.shutdown_server_instance(server_name) {
            for subsystem in instance.started.iter_mut().rev() {
                if let Err(e) = subsystem.shutdown(permanent) {
                    tracing::error!(
                        server_name = %server_name,
                        subsystem = %subsystem.name,
                        error = %e,
                        "Subsystem shutdown failed; continuing with remaining subsystems"
                    );
                    if first_error.is_none() {
                        first_error = Some(AdminError::configuration(
                            server_name,
                            DEACTIVATE_OP,
                            ConfigErrorKind::SubsystemStartFailed,
                            format!("subsystem `{}` failed to shut down: {e}", subsystem.name),
                        ));
                    }
                }
            }
            tracing::info!(server_name = %server_name, permanent, "Server deactivated");
        }

        if permanent {
            self.store.delete(server_name, DEACTIVATE_OP)?;
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn start_failure(
        &self,
        server_name: &str,
        subsystem: &str,
        cause: impl std::fmt::Display,
    ) -> AdminError {
        self.start_failure_msg(server_name, subsystem, &cause.to_string())
    }

    fn start_failure_msg(&self, server_name: &str, subsystem: &str, cause: &str) -> AdminError {
        tracing::error!(
            server_name = %server_name,
            subsystem = %subsystem,
            cause = %cause,
            "Subsystem failed to initialize; aborting activation"
        );
        AdminError::configuration(
            server_name,
            ACTIVATE_OP,
            ConfigErrorKind::SubsystemStartFailed,
            format!("subsystem `{subsystem}` failed to initialize: {cause}"),
        )
    }

    /// Access-service failures log the fragment contents to the service's
    /// own audit destination before aborting, so the failure stays
    /// attributable to one subsystem.
    fn access_start_failure(
        &self,
        server_name: &str,
        config: &crate::document::AccessServiceConfig,
        cause: &str,
    ) -> AdminError {
        let fragment = serde_json::to_string(config).unwrap_or_else(|_| "<unserializable>".into());
        tracing::error!(
            server_name = %server_name,
            subsystem = %config.full_name,
            fragment = %fragment,
            cause = %cause,
            "Access service failed to initialize; aborting activation"
        );
        AdminError::configuration(
            server_name,
            ACTIVATE_OP,
            ConfigErrorKind::SubsystemStartFailed,
            format!(
                "access service `{}` failed to initialize: {cause}",
                config.full_name
            ),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{
        AccessServiceConfig, RepositoryServicesConfig, ServiceStatus,
    };
    use crate::registry::{self, ACCESS_SERVICES};
    use crate::runtime::admins::{AccessServiceAdmin, SubsystemError};
    use crate::store::memory::InMemoryConfigStore;
    use crate::store::StoreResolver;

    struct FailingAccessAdmin;

    impl AccessServiceAdmin for FailingAccessAdmin {
        fn initialize(
            &mut self,
            config: &AccessServiceConfig,
            _enterprise_topic: Option<&Connection>,
            _ctx: &InitContext<'_>,
        ) -> Result<(), SubsystemError> {
            Err(SubsystemError::new(config.full_name.clone(), "boom"))
        }

        fn shutdown(&mut self) -> Result<(), SubsystemError> {
            Ok(())
        }
    }

    fn orchestrator(registry: AdminRegistry) -> ServerLifecycleOrchestrator {
        let resolver = Arc::new(StoreResolver::new(Arc::new(InMemoryConfigStore::new())));
        ServerLifecycleOrchestrator::new(
            Arc::new(registry),
            Arc::new(PlatformInstanceMap::new()),
            ConfigStoreHandle::new(resolver),
            Arc::new(ServerNameLocks::new()),
        )
    }

    fn access_fragment(url_marker: &str) -> AccessServiceConfig {
        let reg = registry::lookup_by_url_marker(ACCESS_SERVICES, url_marker).unwrap();
        AccessServiceConfig {
            id: reg.id,
            name: reg.name.to_string(),
            full_name: reg.full_name.to_string(),
            url_marker: reg.url_marker.to_string(),
            description: reg.description.to_string(),
            wiki: reg.wiki.to_string(),
            status: ServiceStatus::Enabled,
            options: None,
            in_topic: None,
            out_topic: None,
        }
    }

    fn doc_with_repo(server_name: &str) -> ConfigurationDocument {
        let mut doc = ConfigurationDocument::new(server_name);
        doc.repository_services = Some(RepositoryServicesConfig::default());
        doc
    }

    #[test]
    fn empty_document_is_rejected() {
        let orch = orchestrator(AdminRegistry::with_builtin_admins());
        let doc = ConfigurationDocument::new("srv1");
        let err = orch.activate("garygeeke", "srv1", doc).unwrap_err();
        assert_eq!(err.config_kind(), Some(ConfigErrorKind::EmptyConfiguration));
        assert!(!orch.instance_map().is_active("srv1"));
    }

    #[test]
    fn missing_repository_services_is_rejected() {
        let orch = orchestrator(AdminRegistry::with_builtin_admins());
        let mut doc = ConfigurationDocument::new("srv1");
        doc.access_services = Some(vec![access_fragment("asset-consumer")]);
        let err = orch.activate("garygeeke", "srv1", doc).unwrap_err();
        assert_eq!(
            err.config_kind(),
            Some(ConfigErrorKind::MissingRepositoryServices)
        );
        assert!(!orch.instance_map().is_active("srv1"));
    }

    #[test]
    fn activation_reports_started_subsystems_in_order() {
        let orch = orchestrator(AdminRegistry::with_builtin_admins());
        let mut doc = doc_with_repo("srv1");
        doc.access_services = Some(vec![
            access_fragment("asset-consumer"),
            access_fragment("asset-owner"),
        ]);

        let summary = orch.activate("garygeeke", "srv1", doc).unwrap();
        assert_eq!(
            summary,
            vec![
                "Open Metadata Repository Services",
                "Asset Consumer OMAS",
                "Asset Owner OMAS"
            ]
        );
        assert!(orch.instance_map().is_active("srv1"));
    }

    #[test]
    fn failed_subsystem_aborts_without_registering_an_instance() {
        let mut registry = AdminRegistry::with_builtin_admins();
        registry.register_access_service(1003, Box::new(|| Box::new(FailingAccessAdmin)));
        let orch = orchestrator(registry);

        let mut doc = doc_with_repo("srv1");
        doc.access_services = Some(vec![access_fragment("asset-consumer")]);

        let err = orch.activate("garygeeke", "srv1", doc).unwrap_err();
        assert_eq!(err.config_kind(), Some(ConfigErrorKind::SubsystemStartFailed));
        assert!(err.to_string().contains("Asset Consumer OMAS"));
        assert!(!orch.instance_map().is_active("srv1"));
    }

    #[test]
    fn second_activation_replaces_the_first_instance() {
        let orch = orchestrator(AdminRegistry::with_builtin_admins());

        let mut first = doc_with_repo("srv1");
        first.access_services = Some(vec![access_fragment("asset-consumer")]);
        orch.activate("garygeeke", "srv1", first).unwrap();

        let mut second = doc_with_repo("srv1");
        second.access_services = Some(vec![access_fragment("asset-owner")]);
        orch.activate("garygeeke", "srv1", second).unwrap();

        let doc = orch.instance_map().active_document("srv1").unwrap();
        let services = doc.access_services.unwrap();
        assert_eq!(services.len(), 1);
        assert_eq!(services[0].full_name, "Asset Owner OMAS");
    }

    #[test]
    fn deactivating_an_inactive_server_is_a_no_op() {
        let orch = orchestrator(AdminRegistry::with_builtin_admins());
        orch.deactivate("garygeeke", "srv1", false).unwrap();
        orch.deactivate("garygeeke", "srv1", false).unwrap();
    }
}
