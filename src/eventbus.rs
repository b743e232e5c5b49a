//! Event-bus connection derivation.
//!
//! The core never sends or receives events. It only derives connection
//! descriptors from the platform's shared event-bus configuration so that
//! subsystems can open their own channels. Topic names are
//! `<topic url root>.<qualifier>`, with qualifiers scoped by server name.

use crate::document::{Connection, EventBusConfig};

/// Builds topic connections from the shared event-bus settings.
pub trait EventBusConnectorFactory: Send + Sync {
    /// Connection for one logical topic under the configured topic root.
    fn topic_connection(&self, event_bus: &EventBusConfig, qualifier: &str) -> Connection;
}

/// Default factory: carries the event bus provider and options through to
/// every derived connection.
#[derive(Default)]
pub struct DefaultEventBusFactory;

impl EventBusConnectorFactory for DefaultEventBusFactory {
    fn topic_connection(&self, event_bus: &EventBusConfig, qualifier: &str) -> Connection {
        let topic_name = if event_bus.topic_url_root.is_empty() {
            qualifier.to_string()
        } else {
            format!("{}.{}", event_bus.topic_url_root, qualifier)
        };
        Connection {
            display_name: format!("Event topic {topic_name}"),
            provider: event_bus.connector_provider.clone(),
            endpoint: topic_name,
            config_properties: event_bus.config_properties.clone(),
        }
    }
}

/// Qualifier for an access service's inbound topic.
pub fn access_service_in_topic_qualifier(server_name: &str, url_marker: &str) -> String {
    format!("server.{server_name}.{url_marker}.inTopic")
}

/// Qualifier for an access service's outbound topic.
pub fn access_service_out_topic_qualifier(server_name: &str, url_marker: &str) -> String {
    format!("server.{server_name}.{url_marker}.outTopic")
}

/// Qualifier for the server's enterprise (federated) event topic.
pub fn enterprise_topic_qualifier(server_name: &str) -> String {
    format!("server.{server_name}.enterprise")
}

/// Qualifier for a cohort's registration/instance topic.
pub fn cohort_topic_qualifier(cohort_name: &str) -> String {
    format!("cohort.{cohort_name}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn derived_connection_carries_provider_and_root() {
        let factory = DefaultEventBusFactory;
        let bus = EventBusConfig {
            connector_provider: "kafka".into(),
            topic_url_root: "metaplane".into(),
            config_properties: HashMap::new(),
        };
        let conn = factory.topic_connection(&bus, &access_service_in_topic_qualifier("srv1", "asset-consumer"));
        assert_eq!(conn.provider, "kafka");
        assert_eq!(conn.endpoint, "metaplane.server.srv1.asset-consumer.inTopic");
    }

    #[test]
    fn empty_root_uses_bare_qualifier() {
        let factory = DefaultEventBusFactory;
        let bus = EventBusConfig::default();
        let conn = factory.topic_connection(&bus, "server.srv1.enterprise");
        assert_eq!(conn.endpoint, "server.srv1.enterprise");
    }
}
