//! Integration tests for security verification and shutdown error
//! surfacing, using custom admin registrations.

mod common;

use std::sync::Arc;

use serde_json::json;

use common::{admin_services, configure_minimal_server, ADMIN_USER};
use metaplane::document::Connection;
use metaplane::error::ConfigErrorKind;
use metaplane::runtime::admins::{
    AccessServiceAdmin, AdminRegistry, InitContext, SubsystemError,
};
use metaplane::runtime::security::{OpenSecurityVerifier, ALLOW_LIST_PROVIDER};
use metaplane::store::InMemoryConfigStore;
use metaplane::AdminServices;

fn allow_list_connection(admins: &[&str]) -> Connection {
    let mut conn = Connection::new("Server security", ALLOW_LIST_PROVIDER, "");
    conn.config_properties.insert("admins".into(), json!(admins));
    conn
}

#[test]
fn allow_list_gates_edits_once_installed() {
    let admin = admin_services();
    configure_minimal_server(&admin, "srv1");
    admin
        .set_server_security_connection(
            ADMIN_USER,
            "srv1",
            Some(allow_list_connection(&[ADMIN_USER])),
        )
        .unwrap();

    // The listed admin can keep editing; anyone else is refused before
    // any mutation.
    admin
        .set_organization_name(ADMIN_USER, "srv1", Some("Coco Pharmaceuticals".into()))
        .unwrap();
    let err = admin
        .set_organization_name("intruder", "srv1", Some("Hacked Inc".into()))
        .unwrap_err();
    assert_eq!(err.kind_code(), "NOT_AUTHORIZED");

    let doc = admin.get_server_config(ADMIN_USER, "srv1").unwrap();
    assert_eq!(
        doc.organization_name.as_deref(),
        Some("Coco Pharmaceuticals")
    );
}

#[test]
fn allow_list_gates_activation_and_deactivation() {
    let admin = admin_services();
    configure_minimal_server(&admin, "srv1");
    admin
        .set_server_security_connection(
            ADMIN_USER,
            "srv1",
            Some(allow_list_connection(&[ADMIN_USER])),
        )
        .unwrap();

    let err = admin
        .activate_with_stored_config("intruder", "srv1")
        .unwrap_err();
    assert_eq!(err.kind_code(), "NOT_AUTHORIZED");
    assert!(admin.get_active_servers(ADMIN_USER).unwrap().is_empty());

    admin
        .activate_with_stored_config(ADMIN_USER, "srv1")
        .unwrap();
    let err = admin
        .deactivate_temporarily("intruder", "srv1")
        .unwrap_err();
    assert_eq!(err.kind_code(), "NOT_AUTHORIZED");
    assert_eq!(
        admin.get_active_servers(ADMIN_USER).unwrap(),
        vec!["srv1".to_string()]
    );
}

#[test]
fn allow_list_guards_permanent_deactivation_of_an_inactive_server() {
    let admin = admin_services();
    configure_minimal_server(&admin, "srv1");
    admin
        .set_server_security_connection(
            ADMIN_USER,
            "srv1",
            Some(allow_list_connection(&[ADMIN_USER])),
        )
        .unwrap();

    // Never activated, so the stored document is the only guard on the
    // delete.
    let err = admin
        .deactivate_permanently("intruder", "srv1")
        .unwrap_err();
    assert_eq!(err.kind_code(), "NOT_AUTHORIZED");
    assert!(admin.get_server_config(ADMIN_USER, "srv1").is_ok());

    admin.deactivate_permanently(ADMIN_USER, "srv1").unwrap();
    assert!(admin.get_known_servers(ADMIN_USER).unwrap().is_empty());
}

/// Starts fine, refuses to shut down.
struct StubbornAccessAdmin;

impl AccessServiceAdmin for StubbornAccessAdmin {
    fn initialize(
        &mut self,
        _config: &metaplane::document::AccessServiceConfig,
        _enterprise_topic: Option<&Connection>,
        _ctx: &InitContext<'_>,
    ) -> Result<(), SubsystemError> {
        Ok(())
    }

    fn shutdown(&mut self) -> Result<(), SubsystemError> {
        Err(SubsystemError::new("Asset Consumer OMAS", "listener wedged"))
    }
}

#[test]
fn shutdown_failures_are_surfaced_but_never_block_unregistration() {
    let mut registry = AdminRegistry::with_builtin_admins();
    registry.register_access_service(1003, Box::new(|| Box::new(StubbornAccessAdmin)));
    let admin = AdminServices::new(
        Arc::new(InMemoryConfigStore::new()),
        registry,
        Arc::new(OpenSecurityVerifier),
    );

    configure_minimal_server(&admin, "srv1");
    admin
        .set_event_bus(
            ADMIN_USER,
            "srv1",
            metaplane::document::EventBusConfig {
                connector_provider: "in-memory-topic".into(),
                topic_url_root: "metaplane.omag".into(),
                config_properties: Default::default(),
            },
        )
        .unwrap();
    admin
        .configure_access_service(ADMIN_USER, "srv1", "asset-consumer", None)
        .unwrap();
    admin
        .activate_with_stored_config(ADMIN_USER, "srv1")
        .unwrap();

    let err = admin.deactivate_temporarily(ADMIN_USER, "srv1").unwrap_err();
    assert_eq!(
        err.config_kind(),
        Some(ConfigErrorKind::SubsystemStartFailed)
    );
    assert!(err.to_string().contains("Asset Consumer OMAS"));

    // The instance is gone despite the error, and the configuration
    // survives for a later activation.
    assert!(admin.get_active_servers(ADMIN_USER).unwrap().is_empty());
    assert!(admin.get_server_config(ADMIN_USER, "srv1").is_ok());
}
