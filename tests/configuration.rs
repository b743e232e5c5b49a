//! Integration tests for configuration editing: fragment merges, audit
//! trail behavior and store round-trips.

mod common;

use std::collections::HashMap;

use serde_json::json;

use common::{admin_services, admin_services_on_disk, ADMIN_USER};
use metaplane::document::EventBusConfig;

fn event_bus() -> EventBusConfig {
    EventBusConfig {
        connector_provider: "in-memory-topic".to_string(),
        topic_url_root: "metaplane.omag".to_string(),
        config_properties: HashMap::new(),
    }
}

fn options(key: &str, value: &str) -> Option<HashMap<String, serde_json::Value>> {
    let mut map = HashMap::new();
    map.insert(key.to_string(), json!(value));
    Some(map)
}

#[test]
fn reconfiguring_access_service_replaces_options_wholesale() {
    let admin = admin_services();
    admin.set_event_bus(ADMIN_USER, "srv1", event_bus()).unwrap();

    admin
        .configure_access_service(ADMIN_USER, "srv1", "asset-consumer", options("foo", "bar"))
        .unwrap();
    admin
        .configure_access_service(ADMIN_USER, "srv1", "asset-consumer", options("foo", "baz"))
        .unwrap();

    // Summaries carry identity only.
    let summaries = admin
        .get_configured_access_services(ADMIN_USER, "srv1")
        .unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].full_name, "Asset Consumer OMAS");
    assert_eq!(summaries[0].url_marker, "asset-consumer");

    // The full configuration shows the second options map, not a merge.
    let configs = admin
        .get_access_services_configuration(ADMIN_USER, "srv1")
        .unwrap();
    assert_eq!(configs.len(), 1);
    let opts = configs[0].options.as_ref().unwrap();
    assert_eq!(opts.get("foo"), Some(&json!("baz")));
}

#[test]
fn access_service_topics_derive_from_event_bus() {
    let admin = admin_services();
    admin.set_event_bus(ADMIN_USER, "srv1", event_bus()).unwrap();
    admin
        .configure_access_service(ADMIN_USER, "srv1", "asset-consumer", None)
        .unwrap();

    let configs = admin
        .get_access_services_configuration(ADMIN_USER, "srv1")
        .unwrap();
    let in_topic = configs[0].in_topic.as_ref().unwrap();
    assert!(in_topic.endpoint.starts_with("metaplane.omag."));
    assert!(in_topic.endpoint.contains("asset-consumer"));
}

#[test]
fn access_service_requires_event_bus_first() {
    let admin = admin_services();
    let err = admin
        .configure_access_service(ADMIN_USER, "srv1", "asset-consumer", None)
        .unwrap_err();
    assert_eq!(err.kind_code(), "MISSING_EVENT_BUS");

    // The failed call must not have created a document.
    assert!(admin.get_server_config(ADMIN_USER, "srv1").is_err());
}

#[test]
fn unknown_and_disabled_markers_are_distinct_errors() {
    let admin = admin_services();
    admin.set_event_bus(ADMIN_USER, "srv1", event_bus()).unwrap();

    let err = admin
        .configure_access_service(ADMIN_USER, "srv1", "no-such-service", None)
        .unwrap_err();
    assert_eq!(err.kind_code(), "INVALID_PARAMETER");
    assert!(err.to_string().contains("not recognized"));

    // Registered but not enabled in this build.
    let err = admin
        .configure_access_service(ADMIN_USER, "srv1", "data-science", None)
        .unwrap_err();
    assert_eq!(err.kind_code(), "INVALID_PARAMETER");
    assert!(err.to_string().contains("not enabled"));
}

#[test]
fn setting_null_access_service_list_clears_it() {
    let admin = admin_services();
    admin.set_event_bus(ADMIN_USER, "srv1", event_bus()).unwrap();
    admin
        .configure_all_access_services(ADMIN_USER, "srv1", None)
        .unwrap();
    assert!(!admin
        .get_configured_access_services(ADMIN_USER, "srv1")
        .unwrap()
        .is_empty());

    admin
        .set_access_services_config(ADMIN_USER, "srv1", None)
        .unwrap();
    assert!(admin
        .get_configured_access_services(ADMIN_USER, "srv1")
        .unwrap()
        .is_empty());

    // "Cleared" and "never configured" serialize identically.
    let doc = admin.get_server_config(ADMIN_USER, "srv1").unwrap();
    assert!(doc.access_services.is_none());
}

#[test]
fn enterprise_access_survives_clearing_the_last_access_service() {
    let admin = admin_services();
    admin.set_event_bus(ADMIN_USER, "srv1", event_bus()).unwrap();
    admin
        .configure_access_service(ADMIN_USER, "srv1", "asset-consumer", None)
        .unwrap();

    let doc = admin.get_server_config(ADMIN_USER, "srv1").unwrap();
    let collection_id = doc
        .enterprise_access
        .as_ref()
        .unwrap()
        .metadata_collection_id
        .clone();

    admin
        .clear_access_service(ADMIN_USER, "srv1", "asset-consumer")
        .unwrap();
    let doc = admin.get_server_config(ADMIN_USER, "srv1").unwrap();
    assert!(doc.access_services.is_none());
    assert_eq!(
        doc.enterprise_access.unwrap().metadata_collection_id,
        collection_id
    );
}

#[test]
fn audit_trail_is_append_only_across_operations() {
    let admin = admin_services();
    admin
        .set_server_type(ADMIN_USER, "srv1", Some("Metadata Server".into()))
        .unwrap();
    admin.set_event_bus(ADMIN_USER, "srv1", event_bus()).unwrap();
    admin
        .configure_access_service("erinoverview", "srv1", "asset-consumer", None)
        .unwrap();

    let doc = admin.get_server_config(ADMIN_USER, "srv1").unwrap();
    // set-server-type, set-event-bus, then two actions from the combined
    // configure (fragment + enterprise access default).
    assert_eq!(doc.audit_trail.len(), 4);
    assert!(doc.audit_trail[0].contains(ADMIN_USER));
    assert!(doc.audit_trail[2].contains("erinoverview"));
    assert!(doc.audit_trail[2].contains("Asset Consumer OMAS"));
    assert!(doc.audit_trail[3].contains("enterprise access"));
}

#[test]
fn view_service_requires_target_coordinates() {
    let admin = admin_services();
    let err = admin
        .configure_view_service(ADMIN_USER, "srv1", "glossary-browser", "", "", None)
        .unwrap_err();
    assert_eq!(err.kind_code(), "INVALID_PARAMETER");

    admin
        .configure_view_service(
            ADMIN_USER,
            "srv1",
            "glossary-browser",
            "metadata1",
            "https://platform.example:9443",
            None,
        )
        .unwrap();
    let configs = admin
        .get_view_services_configuration(ADMIN_USER, "srv1")
        .unwrap();
    assert_eq!(configs[0].target_server_name, "metadata1");
}

#[test]
fn engine_service_keeps_its_engine_list() {
    let admin = admin_services();
    admin
        .configure_engine_service(
            ADMIN_USER,
            "srv1",
            "asset-analysis",
            "metadata1",
            "https://platform.example:9443",
            vec!["quality-engine".into()],
            None,
        )
        .unwrap();

    let configs = admin
        .get_engine_services_configuration(ADMIN_USER, "srv1")
        .unwrap();
    assert_eq!(configs[0].engines, vec!["quality-engine".to_string()]);
}

#[test]
fn cohort_registration_needs_an_event_bus() {
    let admin = admin_services();
    admin
        .set_default_repository_services(ADMIN_USER, "srv1")
        .unwrap();

    let err = admin
        .add_cohort_registration(ADMIN_USER, "srv1", "cocoCohort")
        .unwrap_err();
    assert_eq!(err.kind_code(), "MISSING_EVENT_BUS");

    admin.set_event_bus(ADMIN_USER, "srv1", event_bus()).unwrap();
    admin
        .add_cohort_registration(ADMIN_USER, "srv1", "cocoCohort")
        .unwrap();

    let doc = admin.get_server_config(ADMIN_USER, "srv1").unwrap();
    let cohorts = &doc.repository_services.as_ref().unwrap().cohorts;
    assert_eq!(cohorts.len(), 1);
    assert_eq!(cohorts[0].cohort_name, "cocoCohort");
}

#[test]
fn max_page_size_must_be_positive() {
    let admin = admin_services();
    let err = admin.set_max_page_size(ADMIN_USER, "srv1", 0).unwrap_err();
    assert_eq!(err.kind_code(), "INVALID_PARAMETER");

    admin.set_max_page_size(ADMIN_USER, "srv1", 200).unwrap();
    let doc = admin.get_server_config(ADMIN_USER, "srv1").unwrap();
    assert_eq!(doc.max_page_size, 200);
}

#[test]
fn documents_survive_a_platform_restart_on_the_file_store() {
    let dir = tempfile::tempdir().unwrap();

    {
        let admin = admin_services_on_disk(dir.path());
        admin
            .set_organization_name(ADMIN_USER, "srv1", Some("Coco Pharmaceuticals".into()))
            .unwrap();
    }

    // A fresh façade over the same directory sees the same document.
    let admin = admin_services_on_disk(dir.path());
    let doc = admin.get_server_config(ADMIN_USER, "srv1").unwrap();
    assert_eq!(doc.organization_name.as_deref(), Some("Coco Pharmaceuticals"));
    assert_eq!(
        admin.get_known_servers(ADMIN_USER).unwrap(),
        vec!["srv1".to_string()]
    );

    admin.clear_server_config(ADMIN_USER, "srv1").unwrap();
    assert!(admin.get_known_servers(ADMIN_USER).unwrap().is_empty());
}

#[test]
fn invalid_server_names_are_rejected_before_any_write() {
    let admin = admin_services();
    for bad in ["", "  "] {
        let err = admin
            .set_server_type(ADMIN_USER, bad, Some("Metadata Server".into()))
            .unwrap_err();
        assert_eq!(err.kind_code(), "INVALID_PARAMETER", "name `{bad}`");
    }
    assert!(admin.get_known_servers(ADMIN_USER).unwrap().is_empty());
}

#[test]
fn file_store_refuses_path_escaping_server_names() {
    let dir = tempfile::tempdir().unwrap();
    let admin = admin_services_on_disk(dir.path());
    for bad in ["a/b", "a\\b", ".."] {
        let err = admin
            .set_server_type(ADMIN_USER, bad, Some("Metadata Server".into()))
            .unwrap_err();
        assert_eq!(err.kind_code(), "INVALID_PARAMETER", "name `{bad}`");
    }
    assert!(admin.get_known_servers(ADMIN_USER).unwrap().is_empty());
}
