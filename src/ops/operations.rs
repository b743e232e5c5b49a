//! Whole-server operational calls: activation, deactivation, the active
//! configuration, archive loading and platform-wide summaries.

use crate::document::ConfigurationDocument;
use crate::error::{AdminError, AdminResult, ConfigErrorKind};
use crate::observability::metrics;
use crate::ops::{AdminServices, ServerStatusSummary};
use crate::validation;

impl AdminServices {
    /// Activate a server from its stored configuration document.
    ///
    /// Returns the started subsystems in start order. If the server is
    /// already active, the previous instance is deactivated (temporarily)
    /// first, so the result always reflects the stored document.
    pub fn activate_with_stored_config(
        &self,
        user_id: &str,
        server_name: &str,
    ) -> AdminResult<Vec<String>> {
        metrics::record_operation("activate-with-stored-config");
        validation::validate_server_name(server_name, "activate-with-stored-config")?;
        validation::validate_user_id(user_id, server_name, "activate-with-stored-config")?;

        let doc = self
            .store()
            .retrieve(server_name, "activate-with-stored-config")?
            .ok_or_else(|| {
                AdminError::configuration(
                    server_name,
                    "activate-with-stored-config",
                    ConfigErrorKind::UnknownServer,
                    "no configuration document is stored for this server",
                )
            })?;

        let result = self.orchestrator().activate(user_id, server_name, doc);
        metrics::record_activation(result.is_ok());
        metrics::set_active_servers(self.instance_map().active_servers().len());
        result
    }

    /// Persist a supplied configuration document and activate from it.
    pub fn activate_with_supplied_config(
        &self,
        user_id: &str,
        server_name: &str,
        doc: ConfigurationDocument,
    ) -> AdminResult<Vec<String>> {
        metrics::record_operation("activate-with-supplied-config");
        validation::validate_server_name(server_name, "activate-with-supplied-config")?;
        validation::validate_user_id(user_id, server_name, "activate-with-supplied-config")?;
        if doc.server_name != server_name {
            return Err(AdminError::invalid_parameter(
                server_name,
                "activate-with-supplied-config",
                format!(
                    "supplied document names server `{}`, not `{server_name}`",
                    doc.server_name
                ),
            ));
        }
        validation::validate_version_compatible(&doc, "activate-with-supplied-config")?;

        // Deploy the supplied document, then activate from it. The editor
        // appends the audit line and persists before activation begins.
        let deployed = doc.clone();
        self.editor().update_document(
            user_id,
            server_name,
            "activate-with-supplied-config",
            move |stored| {
                let audit_trail = std::mem::take(&mut stored.audit_trail);
                *stored = deployed;
                // The stored audit trail wins, even when empty: supplied
                // documents must not rewrite history.
                stored.audit_trail = audit_trail;
                Ok(vec!["deployed supplied configuration document".to_string()])
            },
        )?;

        let doc = self
            .store()
            .retrieve(server_name, "activate-with-supplied-config")?
            .ok_or_else(|| {
                AdminError::configuration(
                    server_name,
                    "activate-with-supplied-config",
                    ConfigErrorKind::UnknownServer,
                    "document disappeared between deployment and activation",
                )
            })?;
        let result = self.orchestrator().activate(user_id, server_name, doc);
        metrics::record_activation(result.is_ok());
        metrics::set_active_servers(self.instance_map().active_servers().len());
        result
    }

    /// Shut the server down but keep its configuration document, so a later
    /// activation reconstructs the same instance.
    pub fn deactivate_temporarily(&self, user_id: &str, server_name: &str) -> AdminResult<()> {
        metrics::record_operation("deactivate-temporarily");
        validation::validate_server_name(server_name, "deactivate-temporarily")?;
        validation::validate_user_id(user_id, server_name, "deactivate-temporarily")?;
        let result = self.orchestrator().deactivate(user_id, server_name, false);
        metrics::set_active_servers(self.instance_map().active_servers().len());
        result
    }

    /// Shut the server down and delete its configuration document.
    pub fn deactivate_permanently(&self, user_id: &str, server_name: &str) -> AdminResult<()> {
        metrics::record_operation("deactivate-permanently");
        validation::validate_server_name(server_name, "deactivate-permanently")?;
        validation::validate_user_id(user_id, server_name, "deactivate-permanently")?;
        let result = self.orchestrator().deactivate(user_id, server_name, true);
        metrics::set_active_servers(self.instance_map().active_servers().len());
        result
    }

    /// The configuration document the active instance was started from.
    /// This can differ from the stored document if edits happened since
    /// activation.
    pub fn get_active_configuration(
        &self,
        user_id: &str,
        server_name: &str,
    ) -> AdminResult<ConfigurationDocument> {
        validation::validate_server_name(server_name, "get-active-configuration")?;
        validation::validate_user_id(user_id, server_name, "get-active-configuration")?;
        self.instance_map()
            .active_document(server_name)
            .ok_or_else(|| {
                AdminError::configuration(
                    server_name,
                    "get-active-configuration",
                    ConfigErrorKind::UnknownServer,
                    "server is not active",
                )
            })
    }

    /// Load an open metadata archive into the running server's repository.
    pub fn add_open_metadata_archive_file(
        &self,
        user_id: &str,
        server_name: &str,
        file_name: &str,
    ) -> AdminResult<()> {
        metrics::record_operation("add-open-metadata-archive-file");
        validation::validate_server_name(server_name, "add-open-metadata-archive-file")?;
        validation::validate_user_id(user_id, server_name, "add-open-metadata-archive-file")?;
        validation::validate_file_name(file_name, server_name, "add-open-metadata-archive-file")?;

        if let Some(verifier) = self.instance_map().verifier(server_name) {
            verifier.validate_user_as_server_admin(
                user_id,
                server_name,
                "add-open-metadata-archive-file",
            )?;
        }

        let loaded = self.instance_map().with_instance_mut(server_name, |instance| {
            match instance.repository_services_mut() {
                Some(repository) => repository
                    .load_archive(file_name)
                    .map_err(|e| {
                        AdminError::configuration(
                            server_name,
                            "add-open-metadata-archive-file",
                            ConfigErrorKind::SubsystemStartFailed,
                            format!("archive load failed: {e}"),
                        )
                    }),
                None => Err(AdminError::configuration(
                    server_name,
                    "add-open-metadata-archive-file",
                    ConfigErrorKind::MissingRepositoryServices,
                    "active instance has no repository services runtime",
                )),
            }
        });
        match loaded {
            Some(result) => result,
            None => Err(AdminError::configuration(
                server_name,
                "add-open-metadata-archive-file",
                ConfigErrorKind::UnknownServer,
                "server is not active",
            )),
        }
    }

    /// Known/active summary for one server name.
    pub fn get_server_status(
        &self,
        user_id: &str,
        server_name: &str,
    ) -> AdminResult<ServerStatusSummary> {
        validation::validate_server_name(server_name, "get-server-status")?;
        validation::validate_user_id(user_id, server_name, "get-server-status")?;
        let stored = self.store().retrieve(server_name, "get-server-status")?;
        let active_subsystems = self
            .instance_map()
            .with_instance_mut(server_name, |instance| instance.started_subsystems())
            .unwrap_or_default();
        Ok(ServerStatusSummary {
            server_name: server_name.to_string(),
            is_active: self.instance_map().is_active(server_name),
            stored_configuration_exists: stored.is_some(),
            active_subsystems,
        })
    }

    /// Names of every server with a stored configuration document.
    /// Fails with a distinct error when the store cannot enumerate.
    pub fn get_known_servers(&self, user_id: &str) -> AdminResult<Vec<String>> {
        validation::validate_user_id(user_id, "<platform>", "get-known-servers")?;
        let mut names: Vec<String> = self
            .store()
            .retrieve_all("get-known-servers")?
            .into_iter()
            .map(|doc| doc.server_name)
            .collect();
        names.sort();
        Ok(names)
    }

    /// Names of every currently-active server.
    pub fn get_active_servers(&self, user_id: &str) -> AdminResult<Vec<String>> {
        validation::validate_user_id(user_id, "<platform>", "get-active-servers")?;
        let mut names = self.instance_map().active_servers();
        names.sort();
        Ok(names)
    }
}
