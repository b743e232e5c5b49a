//! REST surface over the admin operations.
//!
//! # Responsibilities
//! - Create the Axum router with all admin handlers
//! - Wire up middleware (tracing, timeout, bearer-token auth)
//! - Map admin errors to HTTP status codes and JSON bodies
//!
//! # Design Decisions
//! - The wire format is a thin JSON projection of the ops façade
//! - The caller's user id rides in the `x-user-id` header; authentication
//!   of the channel itself is the bearer token

pub mod auth;
pub mod handlers;

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::error::{AdminError, ConfigErrorKind};
use crate::ops::AdminServices;

use self::auth::admin_auth_middleware;
use self::handlers::*;

/// State injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub admin: Arc<AdminServices>,
    pub api_key: Arc<str>,
}

/// Build the admin router with all middleware layers.
pub fn admin_router(state: AppState) -> Router {
    Router::new()
        .route("/admin/status", get(get_platform_status))
        .route("/admin/servers", get(get_known_servers))
        .route("/admin/servers/active", get(get_active_servers))
        .route("/admin/stores/connection", post(set_store_connection))
        .route("/admin/stores/connection", delete(clear_store_connection))
        .route("/admin/stores/connection", get(get_store_connection))
        .route("/admin/servers/{server}/status", get(get_server_status))
        .route(
            "/admin/servers/{server}/configuration",
            get(get_server_config).delete(clear_server_config),
        )
        .route("/admin/servers/{server}/server-type", post(set_server_type))
        .route("/admin/servers/{server}/organization", post(set_organization))
        .route("/admin/servers/{server}/server-user-id", post(set_server_user_id))
        .route("/admin/servers/{server}/server-url", post(set_server_url))
        .route("/admin/servers/{server}/max-page-size", post(set_max_page_size))
        .route("/admin/servers/{server}/event-bus", post(set_event_bus))
        .route(
            "/admin/servers/{server}/security-connection",
            post(set_security_connection).delete(clear_security_connection),
        )
        .route("/admin/servers/{server}/local-repository", post(set_local_repository))
        .route(
            "/admin/servers/{server}/repository-services/defaults",
            post(set_default_repository_services),
        )
        .route(
            "/admin/servers/{server}/cohorts/{cohort}",
            post(add_cohort).delete(clear_cohort),
        )
        .route(
            "/admin/servers/{server}/access-services",
            get(get_configured_access_services)
                .post(configure_all_access_services)
                .put(set_access_services_config)
                .delete(clear_access_services),
        )
        .route(
            "/admin/servers/{server}/access-services/configuration",
            get(get_access_services_configuration),
        )
        .route(
            "/admin/servers/{server}/access-services/{marker}",
            post(configure_access_service).delete(clear_access_service),
        )
        .route(
            "/admin/servers/{server}/view-services",
            get(get_configured_view_services)
                .post(configure_all_view_services)
                .put(set_view_services_config)
                .delete(clear_view_services),
        )
        .route(
            "/admin/servers/{server}/view-services/configuration",
            get(get_view_services_configuration),
        )
        .route(
            "/admin/servers/{server}/view-services/{marker}",
            post(configure_view_service).delete(clear_view_service),
        )
        .route(
            "/admin/servers/{server}/engine-services",
            get(get_configured_engine_services)
                .put(set_engine_services_config)
                .delete(clear_engine_services),
        )
        .route(
            "/admin/servers/{server}/engine-services/configuration",
            get(get_engine_services_configuration),
        )
        .route(
            "/admin/servers/{server}/engine-services/{marker}",
            post(configure_engine_service).delete(clear_engine_service),
        )
        .route(
            "/admin/servers/{server}/governance-servers/{marker}",
            post(set_governance_server)
                .get(get_governance_server)
                .delete(clear_governance_server),
        )
        .route(
            "/admin/servers/{server}/instance",
            post(activate_with_stored_config).delete(deactivate_temporarily),
        )
        .route("/admin/servers/{server}", delete(deactivate_permanently))
        .route(
            "/admin/servers/{server}/instance/configuration",
            post(activate_with_supplied_config).get(get_active_configuration),
        )
        .route(
            "/admin/servers/{server}/instance/open-metadata-archives/file",
            post(add_open_metadata_archive_file),
        )
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// JSON error body carrying the machine-checkable kind.
pub struct ApiError(pub AdminError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            AdminError::InvalidParameter { .. } => StatusCode::BAD_REQUEST,
            AdminError::NotAuthorized { .. } => StatusCode::FORBIDDEN,
            AdminError::Configuration { kind, .. } => match kind {
                ConfigErrorKind::UnknownServer => StatusCode::NOT_FOUND,
                _ => StatusCode::CONFLICT,
            },
            AdminError::Unexpected { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(serde_json::json!({
            "kind": self.0.kind_code(),
            "server_name": self.0.server_name(),
            "message": self.0.to_string(),
        }));
        (status, body).into_response()
    }
}

impl From<AdminError> for ApiError {
    fn from(err: AdminError) -> Self {
        Self(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Axum handlers require the shared state to cross worker threads.
    #[test]
    fn app_state_is_shareable_across_worker_threads() {
        fn assert_send_sync<T: Send + Sync + 'static>() {}
        assert_send_sync::<AppState>();
    }
}
