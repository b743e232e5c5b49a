//! Configuration document schema.
//!
//! This module defines the versioned configuration document stored once per
//! logical server, plus the per-subsystem config fragments it carries. All
//! types derive Serde traits; documents are persisted as JSON by the store.
//!
//! The document is the single source of truth for activation: the lifecycle
//! orchestrator consults nothing outside the document and the static
//! subsystem registry.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Version tag written into newly created documents.
pub const CURRENT_VERSION: &str = "V2.0";

/// Version tags this build can read. Anything else is rejected on read.
pub const COMPATIBLE_VERSIONS: &[&str] = &["V1.0", "V2.0"];

/// Default maximum page size for paged metadata queries.
pub const DEFAULT_MAX_PAGE_SIZE: u32 = 50;

/// Operational status of an optional subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
pub enum ServiceStatus {
    #[default]
    Enabled,
    Disabled,
}

/// Connection descriptor for a pluggable connector (event topic, audit log
/// destination, repository, security verifier, archive store).
///
/// The core never opens these connections itself; it only stores and routes
/// the descriptors to the subsystems that do.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Connection {
    /// Human-readable name for logs and summaries.
    pub display_name: String,

    /// Connector provider identifier (closed set, resolved by the consumer).
    pub provider: String,

    /// Endpoint address (topic name, file path, URL).
    pub endpoint: String,

    /// Connector-specific options.
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub config_properties: HashMap<String, Value>,
}

impl Connection {
    pub fn new(display_name: &str, provider: &str, endpoint: &str) -> Self {
        Self {
            display_name: display_name.to_string(),
            provider: provider.to_string(),
            endpoint: endpoint.to_string(),
            config_properties: HashMap::new(),
        }
    }
}

/// Platform-shared event bus settings used to derive per-subsystem topic
/// connections. Must be set before any fragment that needs an event channel.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct EventBusConfig {
    /// Connector provider for all derived topic connections.
    pub connector_provider: String,

    /// Root prepended to every logical topic name.
    pub topic_url_root: String,

    /// Options copied into every derived connection.
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub config_properties: HashMap<String, Value>,
}

/// How the local metadata repository is backed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
pub enum LocalRepositoryMode {
    #[default]
    InMemory,
    Graph,
    ReadOnly,
    PluginConnector,
}

/// Local repository settings within the repository services fragment.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct LocalRepositoryConfig {
    pub mode: LocalRepositoryMode,

    /// Connector for `PluginConnector` mode; ignored otherwise.
    pub connection: Option<Connection>,

    /// Unique id of the metadata collection held by this repository.
    pub metadata_collection_id: String,
}

/// Membership of one open metadata repository cohort.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CohortConfig {
    pub cohort_name: String,

    /// Topic carrying the cohort's registration and instance events.
    pub topic_connection: Connection,
}

/// Mandatory fragment: the repository services every other subsystem
/// transitively depends on.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RepositoryServicesConfig {
    /// Audit log destinations, tried in order.
    pub audit_log_destinations: Vec<Connection>,

    pub local_repository: Option<LocalRepositoryConfig>,

    /// Cohorts this server registers with on activation.
    pub cohorts: Vec<CohortConfig>,

    /// Open metadata archives loaded at startup.
    pub open_metadata_archives: Vec<Connection>,
}

/// Config fragment for one access service (domain API + event listener).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AccessServiceConfig {
    /// Numeric identity from the subsystem registry.
    pub id: u32,

    /// Short name, e.g. "Asset Consumer".
    pub name: String,

    /// Display name, e.g. "Asset Consumer OMAS".
    pub full_name: String,

    /// URL fragment identifying the service in REST paths.
    pub url_marker: String,

    pub description: String,

    pub wiki: String,

    pub status: ServiceStatus,

    /// Service-specific options, passed through opaquely.
    pub options: Option<HashMap<String, Value>>,

    /// Inbound event channel, derived from the event bus config.
    pub in_topic: Option<Connection>,

    /// Outbound event channel, derived from the event bus config.
    pub out_topic: Option<Connection>,
}

/// Config fragment for one view service. View services are clients of a
/// (possibly remote) metadata server, so they carry the target coordinates.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ViewServiceConfig {
    pub id: u32,
    pub name: String,
    pub full_name: String,
    pub url_marker: String,
    pub description: String,
    pub wiki: String,
    pub status: ServiceStatus,

    /// Name of the metadata server this view service calls.
    pub target_server_name: String,

    /// Root URL of the platform hosting the target server.
    pub target_platform_url: String,

    pub options: Option<HashMap<String, Value>>,
}

/// Config fragment for one engine service hosted by this server.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EngineServiceConfig {
    pub id: u32,
    pub name: String,
    pub full_name: String,
    pub url_marker: String,
    pub description: String,
    pub wiki: String,
    pub status: ServiceStatus,

    /// Metadata server the hosted engines read their definitions from.
    pub target_server_name: String,
    pub target_platform_url: String,

    /// Names of the governance engines to run.
    pub engines: Vec<String>,

    pub options: Option<HashMap<String, Value>>,
}

/// The governance-server classes, in their fixed activation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum GovernanceServerKind {
    Discovery,
    OpenLineage,
    SecuritySync,
    SecurityOfficer,
    Virtualization,
    DataEngineProxy,
    Stewardship,
    DataPlatform,
}

impl GovernanceServerKind {
    /// Activation order. Deactivation runs this in reverse.
    pub const ALL: [GovernanceServerKind; 8] = [
        GovernanceServerKind::Discovery,
        GovernanceServerKind::OpenLineage,
        GovernanceServerKind::SecuritySync,
        GovernanceServerKind::SecurityOfficer,
        GovernanceServerKind::Virtualization,
        GovernanceServerKind::DataEngineProxy,
        GovernanceServerKind::Stewardship,
        GovernanceServerKind::DataPlatform,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            GovernanceServerKind::Discovery => "Discovery Server",
            GovernanceServerKind::OpenLineage => "Open Lineage Server",
            GovernanceServerKind::SecuritySync => "Security Sync Server",
            GovernanceServerKind::SecurityOfficer => "Security Officer Server",
            GovernanceServerKind::Virtualization => "Virtualization Server",
            GovernanceServerKind::DataEngineProxy => "Data Engine Proxy",
            GovernanceServerKind::Stewardship => "Stewardship Server",
            GovernanceServerKind::DataPlatform => "Data Platform Server",
        }
    }

    pub fn from_url_marker(url_marker: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.url_marker() == url_marker)
    }

    pub fn url_marker(&self) -> &'static str {
        match self {
            GovernanceServerKind::Discovery => "discovery-server",
            GovernanceServerKind::OpenLineage => "open-lineage",
            GovernanceServerKind::SecuritySync => "security-sync",
            GovernanceServerKind::SecurityOfficer => "security-officer",
            GovernanceServerKind::Virtualization => "virtualization",
            GovernanceServerKind::DataEngineProxy => "data-engine-proxy",
            GovernanceServerKind::Stewardship => "stewardship",
            GovernanceServerKind::DataPlatform => "data-platform",
        }
    }
}

/// Config fragment for one governance server class (zero-or-one per kind).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GovernanceServerConfig {
    /// Metadata server this governance server partners with.
    pub target_server_name: String,
    pub target_platform_url: String,

    /// Connector to the governed third-party technology, where relevant.
    pub connection: Option<Connection>,

    pub options: Option<HashMap<String, Value>>,
}

/// Federated (enterprise) repository access settings, created automatically
/// when the first access service is configured.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct EnterpriseAccessConfig {
    /// Name of the federated metadata collection.
    pub metadata_collection_name: String,

    /// Unique id of the federated metadata collection.
    pub metadata_collection_id: String,

    /// Topic distributing enterprise events to registered listeners.
    pub enterprise_topic: Option<Connection>,
}

/// Conformance suite settings (test workbenches run against the cohort).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ConformanceSuiteConfig {
    pub workbenches: Vec<String>,
    pub options: Option<HashMap<String, Value>>,
}

/// The configuration document for one logical server.
///
/// `server_name` is immutable once set and must equal the name used to
/// store and retrieve the document; the store enforces this.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ConfigurationDocument {
    pub server_name: String,

    pub server_type: Option<String>,
    pub organization_name: Option<String>,
    pub local_server_user_id: String,
    pub local_server_url: String,
    pub max_page_size: u32,

    /// Schema version tag; must be in [`COMPATIBLE_VERSIONS`].
    pub version_id: String,

    /// Append-only: `"<timestamp> <userId> <action>"`, one line per
    /// configuration call. Never reordered, never trimmed.
    pub audit_trail: Vec<String>,

    /// Shared event bus settings used to derive topic connections.
    pub event_bus: Option<EventBusConfig>,

    /// Connector authorizing admin operations against this server.
    pub server_security_connection: Option<Connection>,

    // Subsystem fragments. Presence means "configured to start".
    pub repository_services: Option<RepositoryServicesConfig>,
    pub enterprise_access: Option<EnterpriseAccessConfig>,
    pub access_services: Option<Vec<AccessServiceConfig>>,
    pub view_services: Option<Vec<ViewServiceConfig>>,
    pub engine_services: Option<Vec<EngineServiceConfig>>,
    pub conformance_suite: Option<ConformanceSuiteConfig>,

    pub discovery_server: Option<GovernanceServerConfig>,
    pub open_lineage_server: Option<GovernanceServerConfig>,
    pub security_sync_server: Option<GovernanceServerConfig>,
    pub security_officer_server: Option<GovernanceServerConfig>,
    pub virtualization_server: Option<GovernanceServerConfig>,
    pub data_engine_proxy: Option<GovernanceServerConfig>,
    pub stewardship_server: Option<GovernanceServerConfig>,
    pub data_platform_server: Option<GovernanceServerConfig>,
}

impl ConfigurationDocument {
    /// A fresh default document for a new server name.
    pub fn new(server_name: &str) -> Self {
        Self {
            server_name: server_name.to_string(),
            server_type: None,
            organization_name: None,
            local_server_user_id: "metaplane-server".to_string(),
            local_server_url: "https://localhost:9443".to_string(),
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
            version_id: CURRENT_VERSION.to_string(),
            ..Default::default()
        }
    }

    /// Whether this document's schema version can be processed by this build.
    pub fn is_version_compatible(&self) -> bool {
        COMPATIBLE_VERSIONS.contains(&self.version_id.as_str())
    }

    /// Governance-server fragments present in the document, in activation order.
    pub fn governance_configs(&self) -> Vec<(GovernanceServerKind, &GovernanceServerConfig)> {
        GovernanceServerKind::ALL
            .iter()
            .filter_map(|kind| self.governance_config(*kind).map(|cfg| (*kind, cfg)))
            .collect()
    }

    pub fn governance_config(&self, kind: GovernanceServerKind) -> Option<&GovernanceServerConfig> {
        match kind {
            GovernanceServerKind::Discovery => self.discovery_server.as_ref(),
            GovernanceServerKind::OpenLineage => self.open_lineage_server.as_ref(),
            GovernanceServerKind::SecuritySync => self.security_sync_server.as_ref(),
            GovernanceServerKind::SecurityOfficer => self.security_officer_server.as_ref(),
            GovernanceServerKind::Virtualization => self.virtualization_server.as_ref(),
            GovernanceServerKind::DataEngineProxy => self.data_engine_proxy.as_ref(),
            GovernanceServerKind::Stewardship => self.stewardship_server.as_ref(),
            GovernanceServerKind::DataPlatform => self.data_platform_server.as_ref(),
        }
    }

    pub fn set_governance_config(
        &mut self,
        kind: GovernanceServerKind,
        config: Option<GovernanceServerConfig>,
    ) {
        let slot = match kind {
            GovernanceServerKind::Discovery => &mut self.discovery_server,
            GovernanceServerKind::OpenLineage => &mut self.open_lineage_server,
            GovernanceServerKind::SecuritySync => &mut self.security_sync_server,
            GovernanceServerKind::SecurityOfficer => &mut self.security_officer_server,
            GovernanceServerKind::Virtualization => &mut self.virtualization_server,
            GovernanceServerKind::DataEngineProxy => &mut self.data_engine_proxy,
            GovernanceServerKind::Stewardship => &mut self.stewardship_server,
            GovernanceServerKind::DataPlatform => &mut self.data_platform_server,
        };
        *slot = config;
    }

    /// Number of subsystems activation would attempt to start.
    ///
    /// Counts repository services, each service list that is present and
    /// non-empty, the conformance suite, and each governance server.
    pub fn configured_subsystem_count(&self) -> usize {
        let mut count = 0;
        if self.repository_services.is_some() {
            count += 1;
        }
        if self.access_services.as_ref().is_some_and(|l| !l.is_empty()) {
            count += 1;
        }
        if self.view_services.as_ref().is_some_and(|l| !l.is_empty()) {
            count += 1;
        }
        if self.engine_services.as_ref().is_some_and(|l| !l.is_empty()) {
            count += 1;
        }
        if self.conformance_suite.is_some() {
            count += 1;
        }
        count + self.governance_configs().len()
    }

    /// Whether anything beyond repository services is configured.
    pub fn has_dependent_subsystems(&self) -> bool {
        let repo = usize::from(self.repository_services.is_some());
        self.configured_subsystem_count() > repo
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_document_has_current_version_and_defaults() {
        let doc = ConfigurationDocument::new("srv1");
        assert_eq!(doc.server_name, "srv1");
        assert_eq!(doc.version_id, CURRENT_VERSION);
        assert_eq!(doc.max_page_size, DEFAULT_MAX_PAGE_SIZE);
        assert!(doc.is_version_compatible());
        assert_eq!(doc.configured_subsystem_count(), 0);
    }

    #[test]
    fn governance_configs_follow_fixed_order() {
        let mut doc = ConfigurationDocument::new("srv1");
        let cfg = GovernanceServerConfig {
            target_server_name: "mds1".into(),
            target_platform_url: "https://localhost:9443".into(),
            connection: None,
            options: None,
        };
        doc.set_governance_config(GovernanceServerKind::Stewardship, Some(cfg.clone()));
        doc.set_governance_config(GovernanceServerKind::Discovery, Some(cfg));

        let kinds: Vec<_> = doc.governance_configs().iter().map(|(k, _)| *k).collect();
        assert_eq!(
            kinds,
            vec![GovernanceServerKind::Discovery, GovernanceServerKind::Stewardship]
        );
    }

    #[test]
    fn empty_service_list_does_not_count_as_configured() {
        let mut doc = ConfigurationDocument::new("srv1");
        doc.access_services = Some(Vec::new());
        assert_eq!(doc.configured_subsystem_count(), 0);
        assert!(!doc.has_dependent_subsystems());
    }

    #[test]
    fn document_round_trips_through_json() {
        let mut doc = ConfigurationDocument::new("srv1");
        doc.event_bus = Some(EventBusConfig {
            connector_provider: "kafka".into(),
            topic_url_root: "metaplane".into(),
            config_properties: HashMap::new(),
        });
        let json = serde_json::to_string(&doc).unwrap();
        let back: ConfigurationDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(doc, back);
    }
}
