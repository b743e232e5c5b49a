//! Static catalog of optional subsystems.
//!
//! # Responsibilities
//! - Enumerate the access, view and engine services this build knows about
//! - Resolve a URL marker to a registration
//! - Drive "enable all" operations via the enabled subset
//!
//! # Design Decisions
//! - The catalog is compiled in and never changes at runtime
//! - A registration carries enough identity to fabricate a default fragment
//! - "Not recognized" (no entry) and "not enabled" (entry present but
//!   disabled) are distinct failure modes, checked by the validator

use crate::document::ServiceStatus;

/// Identity and status of one optional subsystem known to this build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registration {
    /// Stable numeric identity, unique within the catalog.
    pub id: u32,

    /// Short name, e.g. "Asset Consumer".
    pub name: &'static str,

    /// Display name, e.g. "Asset Consumer OMAS".
    pub full_name: &'static str,

    /// URL fragment identifying the subsystem in REST paths.
    pub url_marker: &'static str,

    pub description: &'static str,

    /// Link to the subsystem's documentation page.
    pub wiki: &'static str,

    /// Whether this build allows the subsystem to be configured.
    pub status: ServiceStatus,
}

/// Access services (domain APIs with event listeners), in registration order.
pub const ACCESS_SERVICES: &[Registration] = &[
    Registration {
        id: 1001,
        name: "Asset Catalog",
        full_name: "Asset Catalog OMAS",
        url_marker: "asset-catalog",
        description: "Search and understand your assets",
        wiki: "https://metaplane.dev/services/asset-catalog",
        status: ServiceStatus::Enabled,
    },
    Registration {
        id: 1003,
        name: "Asset Consumer",
        full_name: "Asset Consumer OMAS",
        url_marker: "asset-consumer",
        description: "Access assets through connectors",
        wiki: "https://metaplane.dev/services/asset-consumer",
        status: ServiceStatus::Enabled,
    },
    Registration {
        id: 1004,
        name: "Asset Owner",
        full_name: "Asset Owner OMAS",
        url_marker: "asset-owner",
        description: "Manage an asset's lifecycle and feedback",
        wiki: "https://metaplane.dev/services/asset-owner",
        status: ServiceStatus::Enabled,
    },
    Registration {
        id: 1006,
        name: "Community Profile",
        full_name: "Community Profile OMAS",
        url_marker: "community-profile",
        description: "Manage personal profiles and communities",
        wiki: "https://metaplane.dev/services/community-profile",
        status: ServiceStatus::Enabled,
    },
    Registration {
        id: 1008,
        name: "Data Science",
        full_name: "Data Science OMAS",
        url_marker: "data-science",
        description: "Manage analytical models and notebooks",
        wiki: "https://metaplane.dev/services/data-science",
        status: ServiceStatus::Disabled,
    },
    Registration {
        id: 1011,
        name: "Governance Engine",
        full_name: "Governance Engine OMAS",
        url_marker: "governance-engine",
        description: "Distribute governance engine definitions",
        wiki: "https://metaplane.dev/services/governance-engine",
        status: ServiceStatus::Enabled,
    },
    Registration {
        id: 1012,
        name: "Governance Program",
        full_name: "Governance Program OMAS",
        url_marker: "governance-program",
        description: "Define and track governance programs",
        wiki: "https://metaplane.dev/services/governance-program",
        status: ServiceStatus::Enabled,
    },
    Registration {
        id: 1017,
        name: "Subject Area",
        full_name: "Subject Area OMAS",
        url_marker: "subject-area",
        description: "Author glossaries and subject area definitions",
        wiki: "https://metaplane.dev/services/subject-area",
        status: ServiceStatus::Enabled,
    },
];

/// View services (presentation-layer clients of a metadata server).
pub const VIEW_SERVICES: &[Registration] = &[
    Registration {
        id: 3001,
        name: "Glossary Browser",
        full_name: "Glossary Browser OMVS",
        url_marker: "glossary-browser",
        description: "Browse glossary terms and categories",
        wiki: "https://metaplane.dev/services/glossary-browser",
        status: ServiceStatus::Enabled,
    },
    Registration {
        id: 3002,
        name: "Repository Explorer",
        full_name: "Repository Explorer OMVS",
        url_marker: "repository-explorer",
        description: "Explore metadata instances across a cohort",
        wiki: "https://metaplane.dev/services/repository-explorer",
        status: ServiceStatus::Enabled,
    },
    Registration {
        id: 3003,
        name: "Type Explorer",
        full_name: "Type Explorer OMVS",
        url_marker: "type-explorer",
        description: "Explore the open metadata type system",
        wiki: "https://metaplane.dev/services/type-explorer",
        status: ServiceStatus::Enabled,
    },
    Registration {
        id: 3004,
        name: "Server Author",
        full_name: "Server Author OMVS",
        url_marker: "server-author",
        description: "Author server configuration documents",
        wiki: "https://metaplane.dev/services/server-author",
        status: ServiceStatus::Disabled,
    },
];

/// Engine services (governance engine hosts), in registration order.
pub const ENGINE_SERVICES: &[Registration] = &[
    Registration {
        id: 4001,
        name: "Asset Analysis",
        full_name: "Asset Analysis OMES",
        url_marker: "asset-analysis",
        description: "Run discovery services to analyse assets",
        wiki: "https://metaplane.dev/services/asset-analysis",
        status: ServiceStatus::Enabled,
    },
    Registration {
        id: 4002,
        name: "Governance Action",
        full_name: "Governance Action OMES",
        url_marker: "governance-action",
        description: "Run governance action services",
        wiki: "https://metaplane.dev/services/governance-action",
        status: ServiceStatus::Enabled,
    },
    Registration {
        id: 4003,
        name: "Repository Governance",
        full_name: "Repository Governance OMES",
        url_marker: "repository-governance",
        description: "Run dynamic governance of open metadata repositories",
        wiki: "https://metaplane.dev/services/repository-governance",
        status: ServiceStatus::Disabled,
    },
];

/// Look up a registration by URL marker within one catalog.
pub fn lookup_by_url_marker(
    catalog: &'static [Registration],
    url_marker: &str,
) -> Option<&'static Registration> {
    catalog.iter().find(|r| r.url_marker == url_marker)
}

/// Registrations this build allows to be configured, in catalog order.
pub fn list_enabled(catalog: &'static [Registration]) -> Vec<&'static Registration> {
    catalog
        .iter()
        .filter(|r| r.status == ServiceStatus::Enabled)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_consumer_is_registered_and_enabled() {
        let reg = lookup_by_url_marker(ACCESS_SERVICES, "asset-consumer").unwrap();
        assert_eq!(reg.full_name, "Asset Consumer OMAS");
        assert_eq!(reg.status, ServiceStatus::Enabled);
    }

    #[test]
    fn unknown_marker_is_not_found() {
        assert!(lookup_by_url_marker(ACCESS_SERVICES, "no-such-service").is_none());
    }

    #[test]
    fn list_enabled_excludes_disabled_entries() {
        let enabled = list_enabled(ACCESS_SERVICES);
        assert!(enabled.iter().all(|r| r.status == ServiceStatus::Enabled));
        assert!(enabled.iter().any(|r| r.url_marker == "asset-consumer"));
        assert!(!enabled.iter().any(|r| r.url_marker == "data-science"));
    }

    #[test]
    fn catalog_ids_are_unique() {
        let mut ids: Vec<u32> = ACCESS_SERVICES
            .iter()
            .chain(VIEW_SERVICES)
            .chain(ENGINE_SERVICES)
            .map(|r| r.id)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(
            ids.len(),
            ACCESS_SERVICES.len() + VIEW_SERVICES.len() + ENGINE_SERVICES.len()
        );
    }
}
