//! Governance server configuration (zero-or-one fragment per kind).

use crate::document::{GovernanceServerConfig, GovernanceServerKind};
use crate::error::{AdminError, AdminResult};
use crate::observability::metrics;
use crate::ops::AdminServices;
use crate::validation;

impl AdminServices {
    /// Resolve a governance-server URL marker to its kind.
    pub fn governance_kind(
        &self,
        url_marker: &str,
        server_name: &str,
        operation: &'static str,
    ) -> AdminResult<GovernanceServerKind> {
        GovernanceServerKind::from_url_marker(url_marker).ok_or_else(|| {
            AdminError::invalid_parameter(
                server_name,
                operation,
                format!("governance server kind `{url_marker}` is not recognized"),
            )
        })
    }

    /// Install the fragment for one governance server kind, replacing any
    /// previous fragment of that kind.
    pub fn set_governance_server_config(
        &self,
        user_id: &str,
        server_name: &str,
        kind: GovernanceServerKind,
        config: GovernanceServerConfig,
    ) -> AdminResult<()> {
        metrics::record_operation("set-governance-server-config");
        validation::validate_client_config(
            &config.target_server_name,
            &config.target_platform_url,
            server_name,
            "set-governance-server-config",
        )?;
        self.editor().update_document(
            user_id,
            server_name,
            "set-governance-server-config",
            move |doc| {
                doc.set_governance_config(kind, Some(config));
                Ok(vec![format!("configured {}", kind.display_name())])
            },
        )
    }

    pub fn clear_governance_server_config(
        &self,
        user_id: &str,
        server_name: &str,
        kind: GovernanceServerKind,
    ) -> AdminResult<()> {
        metrics::record_operation("clear-governance-server-config");
        self.editor().update_document(
            user_id,
            server_name,
            "clear-governance-server-config",
            move |doc| {
                doc.set_governance_config(kind, None);
                Ok(vec![format!("cleared {}", kind.display_name())])
            },
        )
    }

    pub fn get_governance_server_config(
        &self,
        user_id: &str,
        server_name: &str,
        kind: GovernanceServerKind,
    ) -> AdminResult<Option<GovernanceServerConfig>> {
        let doc = self
            .editor()
            .read_document(user_id, server_name, "get-governance-server-config")?;
        Ok(doc.and_then(|d| d.governance_config(kind).cloned()))
    }
}
