//! Access, view and engine service configuration.
//!
//! The same shape for every kind: a `configure` that fabricates or replaces
//! one fragment by identity, an `enable all`, a wholesale `set` (null
//! clears), per-service and whole-list `clear`, a summary `get_configured`
//! and a full-fragment `get_configuration`.

use std::collections::HashMap;

use serde_json::Value;

use crate::document::{AccessServiceConfig, EngineServiceConfig, ViewServiceConfig};
use crate::editor::{
    build_access_service_config, build_engine_service_config, build_view_service_config,
    ensure_enterprise_access, replace_by_identity,
};
use crate::error::AdminResult;
use crate::observability::metrics;
use crate::ops::{AdminServices, ServiceSummary};
use crate::registry::{ACCESS_SERVICES, ENGINE_SERVICES, VIEW_SERVICES};
use crate::validation;

impl From<&AccessServiceConfig> for ServiceSummary {
    fn from(config: &AccessServiceConfig) -> Self {
        Self {
            id: config.id,
            name: config.name.clone(),
            full_name: config.full_name.clone(),
            url_marker: config.url_marker.clone(),
            description: config.description.clone(),
        }
    }
}

impl From<&ViewServiceConfig> for ServiceSummary {
    fn from(config: &ViewServiceConfig) -> Self {
        Self {
            id: config.id,
            name: config.name.clone(),
            full_name: config.full_name.clone(),
            url_marker: config.url_marker.clone(),
            description: config.description.clone(),
        }
    }
}

impl From<&EngineServiceConfig> for ServiceSummary {
    fn from(config: &EngineServiceConfig) -> Self {
        Self {
            id: config.id,
            name: config.name.clone(),
            full_name: config.full_name.clone(),
            url_marker: config.url_marker.clone(),
            description: config.description.clone(),
        }
    }
}

impl AdminServices {
    // ----- access services ------------------------------------------------

    /// Configure one access service, replacing any previous fragment with
    /// the same identity. The first access service configured for a server
    /// also establishes the default enterprise access configuration.
    pub fn configure_access_service(
        &self,
        user_id: &str,
        server_name: &str,
        url_marker: &str,
        options: Option<HashMap<String, Value>>,
    ) -> AdminResult<()> {
        metrics::record_operation("configure-access-service");
        let registration = validation::validate_subsystem_enabled(
            ACCESS_SERVICES,
            url_marker,
            server_name,
            "configure-access-service",
        )?;
        let factory = self.event_bus_factory_arc();
        self.editor().update_document(
            user_id,
            server_name,
            "configure-access-service",
            move |doc| {
                // Access services need event channels: fail before merging.
                validation::validate_event_bus_present(doc, "configure-access-service")?;

                let fragment =
                    build_access_service_config(registration, options, doc, factory.as_ref());
                replace_by_identity(
                    &mut doc.access_services,
                    |existing: &AccessServiceConfig| existing.id == registration.id,
                    Some(fragment),
                );

                let mut actions = vec![format!("configured access service `{}`", registration.full_name)];
                if ensure_enterprise_access(doc, factory.as_ref()) {
                    actions.push("established default enterprise access configuration".to_string());
                }
                Ok(actions)
            },
        )
    }

    /// Configure every enabled access service in one call.
    pub fn configure_all_access_services(
        &self,
        user_id: &str,
        server_name: &str,
        options: Option<HashMap<String, Value>>,
    ) -> AdminResult<()> {
        metrics::record_operation("configure-all-access-services");
        let factory = self.event_bus_factory_arc();
        self.editor().update_document(
            user_id,
            server_name,
            "configure-all-access-services",
            move |doc| {
                validation::validate_event_bus_present(doc, "configure-all-access-services")?;

                let fragments: Vec<AccessServiceConfig> =
                    crate::registry::list_enabled(ACCESS_SERVICES)
                        .into_iter()
                        .map(|reg| {
                            build_access_service_config(
                                reg,
                                options.clone(),
                                doc,
                                factory.as_ref(),
                            )
                        })
                        .collect();
                doc.access_services = if fragments.is_empty() {
                    None
                } else {
                    Some(fragments)
                };

                let mut actions = vec!["configured all enabled access services".to_string()];
                if ensure_enterprise_access(doc, factory.as_ref()) {
                    actions.push("established default enterprise access configuration".to_string());
                }
                Ok(actions)
            },
        )
    }

    /// Wholesale replacement of the access service list. `None` clears it;
    /// the enterprise access configuration is left untouched either way.
    pub fn set_access_services_config(
        &self,
        user_id: &str,
        server_name: &str,
        configs: Option<Vec<AccessServiceConfig>>,
    ) -> AdminResult<()> {
        metrics::record_operation("set-access-services-config");
        self.editor().update_document(
            user_id,
            server_name,
            "set-access-services-config",
            move |doc| {
                let action = match &configs {
                    Some(list) => format!("set {} access service configurations", list.len()),
                    None => "cleared access service configurations".to_string(),
                };
                doc.access_services = match configs {
                    Some(list) if list.is_empty() => None,
                    other => other,
                };
                Ok(vec![action])
            },
        )
    }

    /// Remove one access service fragment by URL marker.
    pub fn clear_access_service(
        &self,
        user_id: &str,
        server_name: &str,
        url_marker: &str,
    ) -> AdminResult<()> {
        metrics::record_operation("clear-access-service");
        let marker = url_marker.to_string();
        self.editor()
            .update_document(user_id, server_name, "clear-access-service", move |doc| {
                replace_by_identity(
                    &mut doc.access_services,
                    |existing: &AccessServiceConfig| existing.url_marker == marker,
                    None,
                );
                Ok(vec![format!("cleared access service `{marker}`")])
            })
    }

    /// Remove every access service fragment. Deliberately leaves the
    /// enterprise access configuration in place.
    pub fn clear_access_services(&self, user_id: &str, server_name: &str) -> AdminResult<()> {
        self.set_access_services_config(user_id, server_name, None)
    }

    /// Identity summaries of the configured access services.
    pub fn get_configured_access_services(
        &self,
        user_id: &str,
        server_name: &str,
    ) -> AdminResult<Vec<ServiceSummary>> {
        let doc = self
            .editor()
            .read_document(user_id, server_name, "get-configured-access-services")?;
        Ok(doc
            .and_then(|d| d.access_services)
            .map(|list| list.iter().map(ServiceSummary::from).collect())
            .unwrap_or_default())
    }

    /// Full access service fragments, including options and event channels.
    pub fn get_access_services_configuration(
        &self,
        user_id: &str,
        server_name: &str,
    ) -> AdminResult<Vec<AccessServiceConfig>> {
        let doc = self.editor().read_document(
            user_id,
            server_name,
            "get-access-services-configuration",
        )?;
        Ok(doc.and_then(|d| d.access_services).unwrap_or_default())
    }

    // ----- view services --------------------------------------------------

    /// Configure one view service as a client of the given metadata server.
    pub fn configure_view_service(
        &self,
        user_id: &str,
        server_name: &str,
        url_marker: &str,
        target_server_name: &str,
        target_platform_url: &str,
        options: Option<HashMap<String, Value>>,
    ) -> AdminResult<()> {
        metrics::record_operation("configure-view-service");
        let registration = validation::validate_subsystem_enabled(
            VIEW_SERVICES,
            url_marker,
            server_name,
            "configure-view-service",
        )?;
        validation::validate_client_config(
            target_server_name,
            target_platform_url,
            server_name,
            "configure-view-service",
        )?;
        let fragment = build_view_service_config(
            registration,
            target_server_name,
            target_platform_url,
            options,
        );
        self.editor()
            .update_document(user_id, server_name, "configure-view-service", move |doc| {
                replace_by_identity(
                    &mut doc.view_services,
                    |existing: &ViewServiceConfig| existing.id == registration.id,
                    Some(fragment),
                );
                Ok(vec![format!("configured view service `{}`", registration.full_name)])
            })
    }

    /// Configure every enabled view service against one metadata server.
    pub fn configure_all_view_services(
        &self,
        user_id: &str,
        server_name: &str,
        target_server_name: &str,
        target_platform_url: &str,
    ) -> AdminResult<()> {
        metrics::record_operation("configure-all-view-services");
        validation::validate_client_config(
            target_server_name,
            target_platform_url,
            server_name,
            "configure-all-view-services",
        )?;
        let fragments: Vec<ViewServiceConfig> = crate::registry::list_enabled(VIEW_SERVICES)
            .into_iter()
            .map(|reg| build_view_service_config(reg, target_server_name, target_platform_url, None))
            .collect();
        self.editor().update_document(
            user_id,
            server_name,
            "configure-all-view-services",
            move |doc| {
                doc.view_services = if fragments.is_empty() {
                    None
                } else {
                    Some(fragments)
                };
                Ok(vec!["configured all enabled view services".to_string()])
            },
        )
    }

    /// Wholesale replacement of the view service list. `None` clears it.
    pub fn set_view_services_config(
        &self,
        user_id: &str,
        server_name: &str,
        configs: Option<Vec<ViewServiceConfig>>,
    ) -> AdminResult<()> {
        metrics::record_operation("set-view-services-config");
        self.editor().update_document(
            user_id,
            server_name,
            "set-view-services-config",
            move |doc| {
                let action = match &configs {
                    Some(list) => format!("set {} view service configurations", list.len()),
                    None => "cleared view service configurations".to_string(),
                };
                doc.view_services = match configs {
                    Some(list) if list.is_empty() => None,
                    other => other,
                };
                Ok(vec![action])
            },
        )
    }

    pub fn clear_view_service(
        &self,
        user_id: &str,
        server_name: &str,
        url_marker: &str,
    ) -> AdminResult<()> {
        metrics::record_operation("clear-view-service");
        let marker = url_marker.to_string();
        self.editor()
            .update_document(user_id, server_name, "clear-view-service", move |doc| {
                replace_by_identity(
                    &mut doc.view_services,
                    |existing: &ViewServiceConfig| existing.url_marker == marker,
                    None,
                );
                Ok(vec![format!("cleared view service `{marker}`")])
            })
    }

    pub fn clear_view_services(&self, user_id: &str, server_name: &str) -> AdminResult<()> {
        metrics::record_operation("clear-view-services");
        self.editor()
            .update_document(user_id, server_name, "clear-view-services", |doc| {
                doc.view_services = None;
                Ok(vec!["cleared view service configurations".to_string()])
            })
    }

    pub fn get_configured_view_services(
        &self,
        user_id: &str,
        server_name: &str,
    ) -> AdminResult<Vec<ServiceSummary>> {
        let doc = self
            .editor()
            .read_document(user_id, server_name, "get-configured-view-services")?;
        Ok(doc
            .and_then(|d| d.view_services)
            .map(|list| list.iter().map(ServiceSummary::from).collect())
            .unwrap_or_default())
    }

    pub fn get_view_services_configuration(
        &self,
        user_id: &str,
        server_name: &str,
    ) -> AdminResult<Vec<ViewServiceConfig>> {
        let doc = self.editor().read_document(
            user_id,
            server_name,
            "get-view-services-configuration",
        )?;
        Ok(doc.and_then(|d| d.view_services).unwrap_or_default())
    }

    // ----- engine services ------------------------------------------------

    /// Configure one engine service hosting the named governance engines.
    pub fn configure_engine_service(
        &self,
        user_id: &str,
        server_name: &str,
        url_marker: &str,
        target_server_name: &str,
        target_platform_url: &str,
        engines: Vec<String>,
        options: Option<HashMap<String, Value>>,
    ) -> AdminResult<()> {
        metrics::record_operation("configure-engine-service");
        let registration = validation::validate_subsystem_enabled(
            ENGINE_SERVICES,
            url_marker,
            server_name,
            "configure-engine-service",
        )?;
        validation::validate_client_config(
            target_server_name,
            target_platform_url,
            server_name,
            "configure-engine-service",
        )?;
        let fragment = build_engine_service_config(
            registration,
            target_server_name,
            target_platform_url,
            engines,
            options,
        );
        self.editor().update_document(
            user_id,
            server_name,
            "configure-engine-service",
            move |doc| {
                replace_by_identity(
                    &mut doc.engine_services,
                    |existing: &EngineServiceConfig| existing.id == registration.id,
                    Some(fragment),
                );
                Ok(vec![format!("configured engine service `{}`", registration.full_name)])
            },
        )
    }

    /// Wholesale replacement of the engine service list. `None` clears it.
    pub fn set_engine_services_config(
        &self,
        user_id: &str,
        server_name: &str,
        configs: Option<Vec<EngineServiceConfig>>,
    ) -> AdminResult<()> {
        metrics::record_operation("set-engine-services-config");
        self.editor().update_document(
            user_id,
            server_name,
            "set-engine-services-config",
            move |doc| {
                let action = match &configs {
                    Some(list) => format!("set {} engine service configurations", list.len()),
                    None => "cleared engine service configurations".to_string(),
                };
                doc.engine_services = match configs {
                    Some(list) if list.is_empty() => None,
                    other => other,
                };
                Ok(vec![action])
            },
        )
    }

    pub fn clear_engine_service(
        &self,
        user_id: &str,
        server_name: &str,
        url_marker: &str,
    ) -> AdminResult<()> {
        metrics::record_operation("clear-engine-service");
        let marker = url_marker.to_string();
        self.editor()
            .update_document(user_id, server_name, "clear-engine-service", move |doc| {
                replace_by_identity(
                    &mut doc.engine_services,
                    |existing: &EngineServiceConfig| existing.url_marker == marker,
                    None,
                );
                Ok(vec![format!("cleared engine service `{marker}`")])
            })
    }

    pub fn clear_engine_services(&self, user_id: &str, server_name: &str) -> AdminResult<()> {
        metrics::record_operation("clear-engine-services");
        self.editor()
            .update_document(user_id, server_name, "clear-engine-services", |doc| {
                doc.engine_services = None;
                Ok(vec!["cleared engine service configurations".to_string()])
            })
    }

    pub fn get_configured_engine_services(
        &self,
        user_id: &str,
        server_name: &str,
    ) -> AdminResult<Vec<ServiceSummary>> {
        let doc = self
            .editor()
            .read_document(user_id, server_name, "get-configured-engine-services")?;
        Ok(doc
            .and_then(|d| d.engine_services)
            .map(|list| list.iter().map(ServiceSummary::from).collect())
            .unwrap_or_default())
    }

    pub fn get_engine_services_configuration(
        &self,
        user_id: &str,
        server_name: &str,
    ) -> AdminResult<Vec<EngineServiceConfig>> {
        let doc = self.editor().read_document(
            user_id,
            server_name,
            "get-engine-services-configuration",
        )?;
        Ok(doc.and_then(|d| d.engine_services).unwrap_or_default())
    }
}
