//! Whole-server configuration properties.
//!
//! Each operation is one transactional read-modify-write through the
//! configuration editor: validate, merge, append an audit line, persist.

use crate::document::{
    CohortConfig, ConfigurationDocument, Connection, EventBusConfig, LocalRepositoryConfig,
    LocalRepositoryMode, RepositoryServicesConfig,
};
use crate::error::{AdminError, AdminResult, ConfigErrorKind};
use crate::eventbus;
use crate::observability::metrics;
use crate::ops::AdminServices;
use crate::validation;

impl AdminServices {
    pub fn set_server_type(
        &self,
        user_id: &str,
        server_name: &str,
        server_type: Option<String>,
    ) -> AdminResult<()> {
        metrics::record_operation("set-server-type");
        self.editor()
            .update_document(user_id, server_name, "set-server-type", |doc| {
                let action = match &server_type {
                    Some(t) => format!("set server type to `{t}`"),
                    None => "cleared server type".to_string(),
                };
                doc.server_type = server_type;
                Ok(vec![action])
            })
    }

    pub fn set_organization_name(
        &self,
        user_id: &str,
        server_name: &str,
        organization_name: Option<String>,
    ) -> AdminResult<()> {
        metrics::record_operation("set-organization-name");
        self.editor()
            .update_document(user_id, server_name, "set-organization-name", |doc| {
                let action = match &organization_name {
                    Some(o) => format!("set organization name to `{o}`"),
                    None => "cleared organization name".to_string(),
                };
                doc.organization_name = organization_name;
                Ok(vec![action])
            })
    }

    pub fn set_local_server_user_id(
        &self,
        user_id: &str,
        server_name: &str,
        local_server_user_id: &str,
    ) -> AdminResult<()> {
        metrics::record_operation("set-local-server-user-id");
        validation::validate_user_id(local_server_user_id, server_name, "set-local-server-user-id")?;
        let value = local_server_user_id.to_string();
        self.editor()
            .update_document(user_id, server_name, "set-local-server-user-id", move |doc| {
                doc.local_server_user_id = value.clone();
                Ok(vec![format!("set local server user id to `{value}`")])
            })
    }

    pub fn set_local_server_url(
        &self,
        user_id: &str,
        server_name: &str,
        local_server_url: &str,
    ) -> AdminResult<()> {
        metrics::record_operation("set-local-server-url");
        validation::validate_url(
            local_server_url,
            "local server URL",
            server_name,
            "set-local-server-url",
        )?;
        let value = local_server_url.to_string();
        self.editor()
            .update_document(user_id, server_name, "set-local-server-url", move |doc| {
                doc.local_server_url = value.clone();
                Ok(vec![format!("set local server URL to `{value}`")])
            })
    }

    pub fn set_max_page_size(
        &self,
        user_id: &str,
        server_name: &str,
        max_page_size: u32,
    ) -> AdminResult<()> {
        metrics::record_operation("set-max-page-size");
        if max_page_size == 0 {
            return Err(AdminError::invalid_parameter(
                server_name,
                "set-max-page-size",
                "max page size must be greater than zero",
            ));
        }
        self.editor()
            .update_document(user_id, server_name, "set-max-page-size", move |doc| {
                doc.max_page_size = max_page_size;
                Ok(vec![format!("set max page size to {max_page_size}")])
            })
    }

    /// Install the shared event bus settings used to derive every
    /// subsequently-configured event channel.
    pub fn set_event_bus(
        &self,
        user_id: &str,
        server_name: &str,
        event_bus: EventBusConfig,
    ) -> AdminResult<()> {
        metrics::record_operation("set-event-bus");
        if event_bus.connector_provider.trim().is_empty() {
            return Err(AdminError::invalid_parameter(
                server_name,
                "set-event-bus",
                "event bus connector provider must not be empty",
            ));
        }
        self.editor()
            .update_document(user_id, server_name, "set-event-bus", move |doc| {
                let action = format!(
                    "configured event bus `{}` with topic root `{}`",
                    event_bus.connector_provider, event_bus.topic_url_root
                );
                doc.event_bus = Some(event_bus);
                Ok(vec![action])
            })
    }

    /// Install (or clear) the connector authorizing admin operations
    /// against this server.
    pub fn set_server_security_connection(
        &self,
        user_id: &str,
        server_name: &str,
        connection: Option<Connection>,
    ) -> AdminResult<()> {
        metrics::record_operation("set-server-security-connection");
        self.editor().update_document(
            user_id,
            server_name,
            "set-server-security-connection",
            move |doc| {
                let action = match &connection {
                    Some(c) => format!("set server security connection `{}`", c.display_name),
                    None => "cleared server security connection".to_string(),
                };
                doc.server_security_connection = connection;
                Ok(vec![action])
            },
        )
    }

    /// Configure the local metadata repository within repository services,
    /// creating the repository services fragment if needed.
    pub fn set_local_repository(
        &self,
        user_id: &str,
        server_name: &str,
        mode: LocalRepositoryMode,
        connection: Option<Connection>,
    ) -> AdminResult<()> {
        metrics::record_operation("set-local-repository");
        if mode == LocalRepositoryMode::PluginConnector && connection.is_none() {
            return Err(AdminError::invalid_parameter(
                server_name,
                "set-local-repository",
                "a repository connection is required for plugin connector mode",
            ));
        }
        self.editor()
            .update_document(user_id, server_name, "set-local-repository", move |doc| {
                let repository = doc.repository_services.get_or_insert_with(Default::default);
                repository.local_repository = Some(LocalRepositoryConfig {
                    mode,
                    connection,
                    metadata_collection_id: uuid::Uuid::new_v4().to_string(),
                });
                Ok(vec![format!("set local repository mode to {mode:?}")])
            })
    }

    /// Clear the local repository, leaving the rest of repository services.
    pub fn clear_local_repository(&self, user_id: &str, server_name: &str) -> AdminResult<()> {
        metrics::record_operation("clear-local-repository");
        self.editor()
            .update_document(user_id, server_name, "clear-local-repository", |doc| {
                if let Some(repository) = &mut doc.repository_services {
                    repository.local_repository = None;
                }
                Ok(vec!["cleared local repository".to_string()])
            })
    }

    /// Register this server with a cohort, deriving the cohort topic from
    /// the event bus settings.
    pub fn add_cohort_registration(
        &self,
        user_id: &str,
        server_name: &str,
        cohort_name: &str,
    ) -> AdminResult<()> {
        metrics::record_operation("add-cohort-registration");
        validation::validate_cohort_name(cohort_name, server_name, "add-cohort-registration")?;
        let cohort = cohort_name.to_string();
        let factory = self.event_bus_factory_arc();
        self.editor()
            .update_document(user_id, server_name, "add-cohort-registration", move |doc| {
                validation::validate_event_bus_present(doc, "add-cohort-registration")?;
                let bus = doc.event_bus.as_ref().cloned().unwrap_or_default();
                let topic_connection =
                    factory.topic_connection(&bus, &eventbus::cohort_topic_qualifier(&cohort));
                let repository = doc.repository_services.get_or_insert_with(Default::default);
                // Replace-by-identity within the cohort list.
                repository.cohorts.retain(|c| c.cohort_name != cohort);
                repository.cohorts.push(CohortConfig {
                    cohort_name: cohort.clone(),
                    topic_connection,
                });
                Ok(vec![format!("registered with cohort `{cohort}`")])
            })
    }

    pub fn clear_cohort_registration(
        &self,
        user_id: &str,
        server_name: &str,
        cohort_name: &str,
    ) -> AdminResult<()> {
        metrics::record_operation("clear-cohort-registration");
        validation::validate_cohort_name(cohort_name, server_name, "clear-cohort-registration")?;
        let cohort = cohort_name.to_string();
        self.editor().update_document(
            user_id,
            server_name,
            "clear-cohort-registration",
            move |doc| {
                if let Some(repository) = &mut doc.repository_services {
                    repository.cohorts.retain(|c| c.cohort_name != cohort);
                }
                Ok(vec![format!("unregistered from cohort `{cohort}`")])
            },
        )
    }

    /// Install default repository services (audit log to console, no local
    /// repository) if none are configured yet.
    pub fn set_default_repository_services(
        &self,
        user_id: &str,
        server_name: &str,
    ) -> AdminResult<()> {
        metrics::record_operation("set-default-repository-services");
        self.editor().update_document(
            user_id,
            server_name,
            "set-default-repository-services",
            |doc| {
                if doc.repository_services.is_none() {
                    doc.repository_services = Some(RepositoryServicesConfig {
                        audit_log_destinations: vec![Connection::new(
                            "Console audit log",
                            "console-audit-log",
                            "stdout",
                        )],
                        ..Default::default()
                    });
                }
                Ok(vec!["set default repository services".to_string()])
            },
        )
    }

    /// The stored configuration document for a server.
    pub fn get_server_config(
        &self,
        user_id: &str,
        server_name: &str,
    ) -> AdminResult<ConfigurationDocument> {
        self.editor()
            .read_document(user_id, server_name, "get-server-config")?
            .ok_or_else(|| {
                AdminError::configuration(
                    server_name,
                    "get-server-config",
                    ConfigErrorKind::UnknownServer,
                    "no configuration document is stored for this server",
                )
            })
    }

    /// Remove the whole configuration document ("clear all").
    pub fn clear_server_config(&self, user_id: &str, server_name: &str) -> AdminResult<()> {
        metrics::record_operation("clear-server-config");
        self.editor()
            .delete_document(user_id, server_name, "clear-server-config")
    }
}
