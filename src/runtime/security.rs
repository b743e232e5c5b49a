//! Server security verification.
//!
//! # Responsibilities
//! - Authorize admin operations before any document or instance mutation
//! - Build a verifier from the document's security connection descriptor
//!
//! # Design Decisions
//! - The verifier set is closed: an open (allow-all) verifier and an
//!   allow-list verifier driven by connection properties
//! - Authorization failures surface as NotAuthorized, raised before any
//!   side effect

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;

use crate::document::Connection;
use crate::error::{AdminError, AdminResult};

/// Provider identifier for the allow-list verifier.
pub const ALLOW_LIST_PROVIDER: &str = "user-allowlist";

/// Authorization checks consulted by the admin services.
pub trait SecurityVerifier: Send + Sync {
    /// May this user create a configuration document for a new server?
    fn validate_user_for_new_server(
        &self,
        user_id: &str,
        server_name: &str,
        operation: &'static str,
    ) -> AdminResult<()>;

    /// May this user administer an existing server?
    fn validate_user_as_server_admin(
        &self,
        user_id: &str,
        server_name: &str,
        operation: &'static str,
    ) -> AdminResult<()>;

    /// May this user change platform-wide settings?
    fn validate_user_as_operator_for_platform(
        &self,
        user_id: &str,
        operation: &'static str,
    ) -> AdminResult<()>;
}

/// Verifier admitting every authenticated user. Used when a server has no
/// security connection configured.
pub struct OpenSecurityVerifier;

impl SecurityVerifier for OpenSecurityVerifier {
    fn validate_user_for_new_server(&self, _: &str, _: &str, _: &'static str) -> AdminResult<()> {
        Ok(())
    }

    fn validate_user_as_server_admin(&self, _: &str, _: &str, _: &'static str) -> AdminResult<()> {
        Ok(())
    }

    fn validate_user_as_operator_for_platform(&self, _: &str, _: &'static str) -> AdminResult<()> {
        Ok(())
    }
}

/// Verifier driven by an `admins` list in the connection's properties.
pub struct AllowListSecurityVerifier {
    admins: HashSet<String>,
}

impl AllowListSecurityVerifier {
    pub fn from_connection(connection: &Connection) -> Self {
        let admins = connection
            .config_properties
            .get("admins")
            .and_then(Value::as_array)
            .map(|list| {
                list.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        Self { admins }
    }

    fn check(&self, user_id: &str, server_name: &str, operation: &'static str) -> AdminResult<()> {
        if self.admins.contains(user_id) {
            Ok(())
        } else {
            Err(AdminError::not_authorized(server_name, operation, user_id))
        }
    }
}

impl SecurityVerifier for AllowListSecurityVerifier {
    fn validate_user_for_new_server(
        &self,
        user_id: &str,
        server_name: &str,
        operation: &'static str,
    ) -> AdminResult<()> {
        self.check(user_id, server_name, operation)
    }

    fn validate_user_as_server_admin(
        &self,
        user_id: &str,
        server_name: &str,
        operation: &'static str,
    ) -> AdminResult<()> {
        self.check(user_id, server_name, operation)
    }

    fn validate_user_as_operator_for_platform(
        &self,
        user_id: &str,
        operation: &'static str,
    ) -> AdminResult<()> {
        self.check(user_id, "<platform>", operation)
    }
}

/// Build the verifier for a server from its security connection, falling
/// back to the open verifier when none is configured.
pub fn verifier_for_connection(
    connection: Option<&Connection>,
    server_name: &str,
    operation: &'static str,
) -> AdminResult<Arc<dyn SecurityVerifier>> {
    match connection {
        None => Ok(Arc::new(OpenSecurityVerifier)),
        Some(conn) if conn.provider == ALLOW_LIST_PROVIDER => {
            Ok(Arc::new(AllowListSecurityVerifier::from_connection(conn)))
        }
        Some(conn) => Err(AdminError::invalid_parameter(
            server_name,
            operation,
            format!("unknown security verifier provider `{}`", conn.provider),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn allow_list_connection(admins: &[&str]) -> Connection {
        let mut conn = Connection::new("security", ALLOW_LIST_PROVIDER, "");
        conn.config_properties
            .insert("admins".into(), json!(admins));
        conn
    }

    #[test]
    fn allow_list_rejects_unknown_user() {
        let conn = allow_list_connection(&["garygeeke"]);
        let verifier = verifier_for_connection(Some(&conn), "srv1", "op").unwrap();
        assert!(verifier
            .validate_user_as_server_admin("garygeeke", "srv1", "op")
            .is_ok());
        let err = verifier
            .validate_user_as_server_admin("intruder", "srv1", "op")
            .unwrap_err();
        assert_eq!(err.kind_code(), "NOT_AUTHORIZED");
    }

    #[test]
    fn missing_connection_falls_back_to_open_verifier() {
        let verifier = verifier_for_connection(None, "srv1", "op").unwrap();
        assert!(verifier.validate_user_for_new_server("anyone", "srv1", "op").is_ok());
    }

    #[test]
    fn unknown_provider_is_invalid_parameter() {
        let conn = Connection::new("security", "mystery", "");
        let err = verifier_for_connection(Some(&conn), "srv1", "op")
            .err()
            .unwrap();
        assert_eq!(err.kind_code(), "INVALID_PARAMETER");
    }
}
