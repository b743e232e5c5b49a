//! The in-memory record of one activated server.

use std::sync::Arc;

use crate::document::ConfigurationDocument;
use crate::runtime::admins::{
    AccessServiceAdmin, CommonServicesRuntime, ConformanceSuiteRuntime, EngineServiceAdmin,
    EnterpriseTopicHandle, GovernanceServerAdmin, RepositoryServicesRuntime, SubsystemError,
    ViewServiceAdmin,
};
use crate::runtime::security::SecurityVerifier;

/// Runtime handle for one successfully-started subsystem.
pub enum SubsystemHandle {
    RepositoryServices(RepositoryServicesRuntime),
    CommonServices(CommonServicesRuntime),
    AccessService(Box<dyn AccessServiceAdmin>),
    ViewService(Box<dyn ViewServiceAdmin>),
    EngineService(Box<dyn EngineServiceAdmin>),
    ConformanceSuite(ConformanceSuiteRuntime),
    EnterpriseTopic(Box<dyn EnterpriseTopicHandle>),
    GovernanceServer(Box<dyn GovernanceServerAdmin>),
}

/// A subsystem that started, in activation order.
pub struct StartedSubsystem {
    /// Display name reported in activation summaries.
    pub name: String,
    pub handle: SubsystemHandle,
}

impl StartedSubsystem {
    /// Ask the subsystem to shut down. Best-effort; the caller decides what
    /// to do with the error.
    pub fn shutdown(&mut self, permanent: bool) -> Result<(), SubsystemError> {
        match &mut self.handle {
            SubsystemHandle::RepositoryServices(runtime) => runtime.shutdown(permanent),
            SubsystemHandle::CommonServices(runtime) => runtime.shutdown(),
            SubsystemHandle::AccessService(admin) => admin.shutdown(),
            SubsystemHandle::ViewService(admin) => admin.shutdown(),
            SubsystemHandle::EngineService(admin) => admin.shutdown(),
            SubsystemHandle::ConformanceSuite(runtime) => runtime.shutdown(),
            SubsystemHandle::EnterpriseTopic(handle) => handle.stop(),
            SubsystemHandle::GovernanceServer(admin) => admin.terminate(permanent),
        }
    }
}

/// Everything that successfully started for one active server.
///
/// Exists only between a successful activation and the next deactivation,
/// and is owned exclusively by the platform instance map while active.
pub struct RuntimeInstance {
    pub server_name: String,

    /// The document this instance was started from.
    pub document: ConfigurationDocument,

    /// Started subsystems in activation order. Deactivation walks this in
    /// reverse.
    pub started: Vec<StartedSubsystem>,

    /// Verifier built from the document's security connection.
    pub security: Arc<dyn SecurityVerifier>,
}

impl RuntimeInstance {
    /// Display names of started subsystems, in start order.
    pub fn started_subsystems(&self) -> Vec<String> {
        self.started.iter().map(|s| s.name.clone()).collect()
    }

    /// The repository services runtime, present on every active instance.
    pub fn repository_services_mut(&mut self) -> Option<&mut RepositoryServicesRuntime> {
        self.started.iter_mut().find_map(|s| match &mut s.handle {
            SubsystemHandle::RepositoryServices(runtime) => Some(runtime),
            _ => None,
        })
    }
}
