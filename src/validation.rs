//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic checks on admin-operation inputs before any mutation
//! - Registered/enabled checks against the static subsystem catalog
//! - Fail-fast event-bus presence check ahead of merge work
//!
//! # Design Decisions
//! - Every validator is a pure function returning a specific error kind,
//!   never silently defaulting
//! - Validators run before the store is touched, so a validation failure
//!   leaves no partial state

use url::Url;

use crate::document::{ConfigurationDocument, ServiceStatus};
use crate::error::{AdminError, AdminResult, ConfigErrorKind};
use crate::registry::{self, Registration};

/// Reject an empty or whitespace-only server name.
pub fn validate_server_name(server_name: &str, operation: &'static str) -> AdminResult<()> {
    if server_name.trim().is_empty() {
        return Err(AdminError::invalid_parameter(
            server_name,
            operation,
            "server name must not be empty",
        ));
    }
    Ok(())
}

/// Reject an empty or whitespace-only calling user id.
pub fn validate_user_id(
    user_id: &str,
    server_name: &str,
    operation: &'static str,
) -> AdminResult<()> {
    if user_id.trim().is_empty() {
        return Err(AdminError::invalid_parameter(
            server_name,
            operation,
            "user id must not be empty",
        ));
    }
    Ok(())
}

/// Reject a malformed URL in a named field.
pub fn validate_url(
    value: &str,
    field: &str,
    server_name: &str,
    operation: &'static str,
) -> AdminResult<()> {
    if value.trim().is_empty() {
        return Err(AdminError::invalid_parameter(
            server_name,
            operation,
            format!("{field} must not be empty"),
        ));
    }
    Url::parse(value).map_err(|e| {
        AdminError::invalid_parameter(
            server_name,
            operation,
            format!("{field} is not a valid URL: {e}"),
        )
    })?;
    Ok(())
}

/// Checks for fragments that act as clients of another server: the target
/// server name and target platform root URL must both be present and valid.
pub fn validate_client_config(
    target_server_name: &str,
    target_platform_url: &str,
    server_name: &str,
    operation: &'static str,
) -> AdminResult<()> {
    if target_server_name.trim().is_empty() {
        return Err(AdminError::invalid_parameter(
            server_name,
            operation,
            "target server name must not be empty",
        ));
    }
    validate_url(target_platform_url, "target platform URL", server_name, operation)
}

/// Resolve a URL marker against a catalog, distinguishing "not recognized"
/// (no such subsystem in this build) from "not enabled" (known but disabled).
pub fn validate_subsystem_enabled(
    catalog: &'static [Registration],
    url_marker: &str,
    server_name: &str,
    operation: &'static str,
) -> AdminResult<&'static Registration> {
    let registration = registry::lookup_by_url_marker(catalog, url_marker).ok_or_else(|| {
        AdminError::invalid_parameter(
            server_name,
            operation,
            format!("subsystem `{url_marker}` is not recognized by this build"),
        )
    })?;
    if registration.status != ServiceStatus::Enabled {
        return Err(AdminError::invalid_parameter(
            server_name,
            operation,
            format!("subsystem `{url_marker}` is registered but not enabled in this build"),
        ));
    }
    Ok(registration)
}

/// Fail fast when a fragment needs an event channel but the document has no
/// event bus configured yet. Runs before any merge work.
pub fn validate_event_bus_present(
    doc: &ConfigurationDocument,
    operation: &'static str,
) -> AdminResult<()> {
    if doc.event_bus.is_none() {
        return Err(AdminError::configuration(
            &doc.server_name,
            operation,
            ConfigErrorKind::MissingEventBus,
            "an event bus must be configured before subsystems that use event channels",
        ));
    }
    Ok(())
}

/// Reject a document whose schema version this build cannot process.
pub fn validate_version_compatible(
    doc: &ConfigurationDocument,
    operation: &'static str,
) -> AdminResult<()> {
    if !doc.is_version_compatible() {
        return Err(AdminError::configuration(
            &doc.server_name,
            operation,
            ConfigErrorKind::IncompatibleVersion,
            format!("document version `{}` is not supported", doc.version_id),
        ));
    }
    Ok(())
}

pub fn validate_cohort_name(
    cohort_name: &str,
    server_name: &str,
    operation: &'static str,
) -> AdminResult<()> {
    if cohort_name.trim().is_empty() {
        return Err(AdminError::invalid_parameter(
            server_name,
            operation,
            "cohort name must not be empty",
        ));
    }
    Ok(())
}

pub fn validate_file_name(
    file_name: &str,
    server_name: &str,
    operation: &'static str,
) -> AdminResult<()> {
    if file_name.trim().is_empty() {
        return Err(AdminError::invalid_parameter(
            server_name,
            operation,
            "file name must not be empty",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ACCESS_SERVICES;

    #[test]
    fn empty_server_name_is_rejected() {
        let err = validate_server_name("  ", "set-server-type").unwrap_err();
        assert_eq!(err.kind_code(), "INVALID_PARAMETER");
    }

    #[test]
    fn not_recognized_and_not_enabled_are_distinct() {
        let missing =
            validate_subsystem_enabled(ACCESS_SERVICES, "nope", "srv1", "configure").unwrap_err();
        assert!(missing.to_string().contains("not recognized"));

        let disabled =
            validate_subsystem_enabled(ACCESS_SERVICES, "data-science", "srv1", "configure")
                .unwrap_err();
        assert!(disabled.to_string().contains("not enabled"));
    }

    #[test]
    fn event_bus_check_fails_fast_on_unconfigured_document() {
        let doc = ConfigurationDocument::new("srv1");
        let err = validate_event_bus_present(&doc, "configure-access-service").unwrap_err();
        assert_eq!(err.config_kind(), Some(ConfigErrorKind::MissingEventBus));
    }

    #[test]
    fn client_config_requires_valid_target_url() {
        assert!(validate_client_config("mds1", "https://localhost:9443", "srv1", "op").is_ok());
        assert!(validate_client_config("", "https://localhost:9443", "srv1", "op").is_err());
        assert!(validate_client_config("mds1", "not a url", "srv1", "op").is_err());
    }

    #[test]
    fn incompatible_version_is_rejected() {
        let mut doc = ConfigurationDocument::new("srv1");
        doc.version_id = "V9.9".to_string();
        let err = validate_version_compatible(&doc, "read").unwrap_err();
        assert_eq!(err.config_kind(), Some(ConfigErrorKind::IncompatibleVersion));
    }
}
