//! Request handlers for the admin router.
//!
//! Each handler pulls the caller identity from the `x-user-id` header,
//! delegates to [`AdminServices`](crate::ops::AdminServices) and converts
//! the outcome to JSON. Handlers contain no business logic of their own.

use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use crate::document::{
    AccessServiceConfig, ConfigurationDocument, Connection, EngineServiceConfig, EventBusConfig,
    GovernanceServerConfig, LocalRepositoryMode, ViewServiceConfig, CURRENT_VERSION,
};
use crate::error::AdminError;
use crate::http::{ApiError, AppState};
use crate::ops::{ServerStatusSummary, ServiceSummary};

type ApiResult<T> = Result<T, ApiError>;

const USER_ID_HEADER: &str = "x-user-id";

fn caller(headers: &HeaderMap) -> ApiResult<String> {
    headers
        .get(USER_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
        .ok_or_else(|| {
            ApiError(AdminError::invalid_parameter(
                "<platform>",
                "extract-caller",
                format!("missing `{USER_ID_HEADER}` header"),
            ))
        })
}

// ---------------------------------------------------------------------------
// Platform-wide handlers
// ---------------------------------------------------------------------------

pub async fn get_platform_status(
    headers: HeaderMap,
    State(state): State<AppState>,
) -> ApiResult<Json<Value>> {
    let user_id = caller(&headers)?;
    let active = state.admin.get_active_servers(&user_id)?;
    let known = state.admin.get_known_servers(&user_id)?;
    Ok(Json(serde_json::json!({
        "version": CURRENT_VERSION,
        "known_servers": known.len(),
        "active_servers": active.len(),
    })))
}

pub async fn get_known_servers(
    headers: HeaderMap,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<String>>> {
    let user_id = caller(&headers)?;
    Ok(Json(state.admin.get_known_servers(&user_id)?))
}

pub async fn get_active_servers(
    headers: HeaderMap,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<String>>> {
    let user_id = caller(&headers)?;
    Ok(Json(state.admin.get_active_servers(&user_id)?))
}

pub async fn set_store_connection(
    headers: HeaderMap,
    State(state): State<AppState>,
    Json(connection): Json<Connection>,
) -> ApiResult<StatusCode> {
    let user_id = caller(&headers)?;
    state
        .admin
        .set_configuration_store_connection(&user_id, connection)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn clear_store_connection(
    headers: HeaderMap,
    State(state): State<AppState>,
) -> ApiResult<StatusCode> {
    let user_id = caller(&headers)?;
    state.admin.clear_configuration_store_connection(&user_id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_store_connection(
    headers: HeaderMap,
    State(state): State<AppState>,
) -> ApiResult<Json<Option<Connection>>> {
    let user_id = caller(&headers)?;
    Ok(Json(state.admin.get_configuration_store_connection(&user_id)?))
}

// ---------------------------------------------------------------------------
// Basic server properties
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct TextBody {
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct OptionalTextBody {
    pub value: Option<String>,
}

pub async fn get_server_status(
    headers: HeaderMap,
    State(state): State<AppState>,
    Path(server): Path<String>,
) -> ApiResult<Json<ServerStatusSummary>> {
    let user_id = caller(&headers)?;
    Ok(Json(state.admin.get_server_status(&user_id, &server)?))
}

pub async fn get_server_config(
    headers: HeaderMap,
    State(state): State<AppState>,
    Path(server): Path<String>,
) -> ApiResult<Json<ConfigurationDocument>> {
    let user_id = caller(&headers)?;
    Ok(Json(state.admin.get_server_config(&user_id, &server)?))
}

pub async fn clear_server_config(
    headers: HeaderMap,
    State(state): State<AppState>,
    Path(server): Path<String>,
) -> ApiResult<StatusCode> {
    let user_id = caller(&headers)?;
    state.admin.clear_server_config(&user_id, &server)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_server_type(
    headers: HeaderMap,
    State(state): State<AppState>,
    Path(server): Path<String>,
    Json(body): Json<OptionalTextBody>,
) -> ApiResult<StatusCode> {
    let user_id = caller(&headers)?;
    state.admin.set_server_type(&user_id, &server, body.value)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_organization(
    headers: HeaderMap,
    State(state): State<AppState>,
    Path(server): Path<String>,
    Json(body): Json<OptionalTextBody>,
) -> ApiResult<StatusCode> {
    let user_id = caller(&headers)?;
    state
        .admin
        .set_organization_name(&user_id, &server, body.value)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_server_user_id(
    headers: HeaderMap,
    State(state): State<AppState>,
    Path(server): Path<String>,
    Json(body): Json<TextBody>,
) -> ApiResult<StatusCode> {
    let user_id = caller(&headers)?;
    state
        .admin
        .set_local_server_user_id(&user_id, &server, &body.value)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_server_url(
    headers: HeaderMap,
    State(state): State<AppState>,
    Path(server): Path<String>,
    Json(body): Json<TextBody>,
) -> ApiResult<StatusCode> {
    let user_id = caller(&headers)?;
    state
        .admin
        .set_local_server_url(&user_id, &server, &body.value)?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct MaxPageSizeBody {
    pub max_page_size: u32,
}

pub async fn set_max_page_size(
    headers: HeaderMap,
    State(state): State<AppState>,
    Path(server): Path<String>,
    Json(body): Json<MaxPageSizeBody>,
) -> ApiResult<StatusCode> {
    let user_id = caller(&headers)?;
    state
        .admin
        .set_max_page_size(&user_id, &server, body.max_page_size)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_event_bus(
    headers: HeaderMap,
    State(state): State<AppState>,
    Path(server): Path<String>,
    Json(event_bus): Json<EventBusConfig>,
) -> ApiResult<StatusCode> {
    let user_id = caller(&headers)?;
    state.admin.set_event_bus(&user_id, &server, event_bus)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_security_connection(
    headers: HeaderMap,
    State(state): State<AppState>,
    Path(server): Path<String>,
    Json(connection): Json<Connection>,
) -> ApiResult<StatusCode> {
    let user_id = caller(&headers)?;
    state
        .admin
        .set_server_security_connection(&user_id, &server, Some(connection))?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn clear_security_connection(
    headers: HeaderMap,
    State(state): State<AppState>,
    Path(server): Path<String>,
) -> ApiResult<StatusCode> {
    let user_id = caller(&headers)?;
    state
        .admin
        .set_server_security_connection(&user_id, &server, None)?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Repository services
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct LocalRepositoryBody {
    pub mode: LocalRepositoryMode,
    #[serde(default)]
    pub connection: Option<Connection>,
}

pub async fn set_local_repository(
    headers: HeaderMap,
    State(state): State<AppState>,
    Path(server): Path<String>,
    Json(body): Json<LocalRepositoryBody>,
) -> ApiResult<StatusCode> {
    let user_id = caller(&headers)?;
    state
        .admin
        .set_local_repository(&user_id, &server, body.mode, body.connection)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_default_repository_services(
    headers: HeaderMap,
    State(state): State<AppState>,
    Path(server): Path<String>,
) -> ApiResult<StatusCode> {
    let user_id = caller(&headers)?;
    state
        .admin
        .set_default_repository_services(&user_id, &server)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_cohort(
    headers: HeaderMap,
    State(state): State<AppState>,
    Path((server, cohort)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    let user_id = caller(&headers)?;
    state
        .admin
        .add_cohort_registration(&user_id, &server, &cohort)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn clear_cohort(
    headers: HeaderMap,
    State(state): State<AppState>,
    Path((server, cohort)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    let user_id = caller(&headers)?;
    state
        .admin
        .clear_cohort_registration(&user_id, &server, &cohort)?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Access services
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct OptionsBody {
    #[serde(default)]
    pub options: Option<HashMap<String, Value>>,
}

pub async fn configure_access_service(
    headers: HeaderMap,
    State(state): State<AppState>,
    Path((server, marker)): Path<(String, String)>,
    Json(body): Json<OptionsBody>,
) -> ApiResult<StatusCode> {
    let user_id = caller(&headers)?;
    state
        .admin
        .configure_access_service(&user_id, &server, &marker, body.options)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn configure_all_access_services(
    headers: HeaderMap,
    State(state): State<AppState>,
    Path(server): Path<String>,
    Json(body): Json<OptionsBody>,
) -> ApiResult<StatusCode> {
    let user_id = caller(&headers)?;
    state
        .admin
        .configure_all_access_services(&user_id, &server, body.options)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_access_services_config(
    headers: HeaderMap,
    State(state): State<AppState>,
    Path(server): Path<String>,
    Json(configs): Json<Option<Vec<AccessServiceConfig>>>,
) -> ApiResult<StatusCode> {
    let user_id = caller(&headers)?;
    state
        .admin
        .set_access_services_config(&user_id, &server, configs)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn clear_access_service(
    headers: HeaderMap,
    State(state): State<AppState>,
    Path((server, marker)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    let user_id = caller(&headers)?;
    state
        .admin
        .clear_access_service(&user_id, &server, &marker)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn clear_access_services(
    headers: HeaderMap,
    State(state): State<AppState>,
    Path(server): Path<String>,
) -> ApiResult<StatusCode> {
    let user_id = caller(&headers)?;
    state.admin.clear_access_services(&user_id, &server)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_configured_access_services(
    headers: HeaderMap,
    State(state): State<AppState>,
    Path(server): Path<String>,
) -> ApiResult<Json<Vec<ServiceSummary>>> {
    let user_id = caller(&headers)?;
    Ok(Json(
        state
            .admin
            .get_configured_access_services(&user_id, &server)?,
    ))
}

pub async fn get_access_services_configuration(
    headers: HeaderMap,
    State(state): State<AppState>,
    Path(server): Path<String>,
) -> ApiResult<Json<Vec<AccessServiceConfig>>> {
    let user_id = caller(&headers)?;
    Ok(Json(
        state
            .admin
            .get_access_services_configuration(&user_id, &server)?,
    ))
}

// ---------------------------------------------------------------------------
// View services
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ViewServiceBody {
    pub target_server_name: String,
    pub target_platform_url: String,
    #[serde(default)]
    pub options: Option<HashMap<String, Value>>,
}

pub async fn configure_all_view_services(
    headers: HeaderMap,
    State(state): State<AppState>,
    Path(server): Path<String>,
    Json(body): Json<ViewServiceBody>,
) -> ApiResult<StatusCode> {
    let user_id = caller(&headers)?;
    state.admin.configure_all_view_services(
        &user_id,
        &server,
        &body.target_server_name,
        &body.target_platform_url,
    )?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn configure_view_service(
    headers: HeaderMap,
    State(state): State<AppState>,
    Path((server, marker)): Path<(String, String)>,
    Json(body): Json<ViewServiceBody>,
) -> ApiResult<StatusCode> {
    let user_id = caller(&headers)?;
    state.admin.configure_view_service(
        &user_id,
        &server,
        &marker,
        &body.target_server_name,
        &body.target_platform_url,
        body.options,
    )?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_view_services_config(
    headers: HeaderMap,
    State(state): State<AppState>,
    Path(server): Path<String>,
    Json(configs): Json<Option<Vec<ViewServiceConfig>>>,
) -> ApiResult<StatusCode> {
    let user_id = caller(&headers)?;
    state
        .admin
        .set_view_services_config(&user_id, &server, configs)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn clear_view_service(
    headers: HeaderMap,
    State(state): State<AppState>,
    Path((server, marker)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    let user_id = caller(&headers)?;
    state.admin.clear_view_service(&user_id, &server, &marker)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn clear_view_services(
    headers: HeaderMap,
    State(state): State<AppState>,
    Path(server): Path<String>,
) -> ApiResult<StatusCode> {
    let user_id = caller(&headers)?;
    state.admin.clear_view_services(&user_id, &server)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_configured_view_services(
    headers: HeaderMap,
    State(state): State<AppState>,
    Path(server): Path<String>,
) -> ApiResult<Json<Vec<ServiceSummary>>> {
    let user_id = caller(&headers)?;
    Ok(Json(
        state
            .admin
            .get_configured_view_services(&user_id, &server)?,
    ))
}

pub async fn get_view_services_configuration(
    headers: HeaderMap,
    State(state): State<AppState>,
    Path(server): Path<String>,
) -> ApiResult<Json<Vec<ViewServiceConfig>>> {
    let user_id = caller(&headers)?;
    Ok(Json(
        state
            .admin
            .get_view_services_configuration(&user_id, &server)?,
    ))
}

// ---------------------------------------------------------------------------
// Engine services
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct EngineServiceBody {
    pub target_server_name: String,
    pub target_platform_url: String,
    #[serde(default)]
    pub engines: Vec<String>,
    #[serde(default)]
    pub options: Option<HashMap<String, Value>>,
}

pub async fn configure_engine_service(
    headers: HeaderMap,
    State(state): State<AppState>,
    Path((server, marker)): Path<(String, String)>,
    Json(body): Json<EngineServiceBody>,
) -> ApiResult<StatusCode> {
    let user_id = caller(&headers)?;
    state.admin.configure_engine_service(
        &user_id,
        &server,
        &marker,
        &body.target_server_name,
        &body.target_platform_url,
        body.engines,
        body.options,
    )?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_engine_services_config(
    headers: HeaderMap,
    State(state): State<AppState>,
    Path(server): Path<String>,
    Json(configs): Json<Option<Vec<EngineServiceConfig>>>,
) -> ApiResult<StatusCode> {
    let user_id = caller(&headers)?;
    state
        .admin
        .set_engine_services_config(&user_id, &server, configs)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn clear_engine_service(
    headers: HeaderMap,
    State(state): State<AppState>,
    Path((server, marker)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    let user_id = caller(&headers)?;
    state
        .admin
        .clear_engine_service(&user_id, &server, &marker)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn clear_engine_services(
    headers: HeaderMap,
    State(state): State<AppState>,
    Path(server): Path<String>,
) -> ApiResult<StatusCode> {
    let user_id = caller(&headers)?;
    state.admin.clear_engine_services(&user_id, &server)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_configured_engine_services(
    headers: HeaderMap,
    State(state): State<AppState>,
    Path(server): Path<String>,
) -> ApiResult<Json<Vec<ServiceSummary>>> {
    let user_id = caller(&headers)?;
    Ok(Json(
        state
            .admin
            .get_configured_engine_services(&user_id, &server)?,
    ))
}

pub async fn get_engine_services_configuration(
    headers: HeaderMap,
    State(state): State<AppState>,
    Path(server): Path<String>,
) -> ApiResult<Json<Vec<EngineServiceConfig>>> {
    let user_id = caller(&headers)?;
    Ok(Json(
        state
            .admin
            .get_engine_services_configuration(&user_id, &server)?,
    ))
}

// ---------------------------------------------------------------------------
// Governance servers
// ---------------------------------------------------------------------------

pub async fn set_governance_server(
    headers: HeaderMap,
    State(state): State<AppState>,
    Path((server, marker)): Path<(String, String)>,
    Json(config): Json<GovernanceServerConfig>,
) -> ApiResult<StatusCode> {
    let user_id = caller(&headers)?;
    let kind = state
        .admin
        .governance_kind(&marker, &server, "set-governance-server-config")?;
    state
        .admin
        .set_governance_server_config(&user_id, &server, kind, config)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn clear_governance_server(
    headers: HeaderMap,
    State(state): State<AppState>,
    Path((server, marker)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    let user_id = caller(&headers)?;
    let kind = state
        .admin
        .governance_kind(&marker, &server, "clear-governance-server-config")?;
    state
        .admin
        .clear_governance_server_config(&user_id, &server, kind)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_governance_server(
    headers: HeaderMap,
    State(state): State<AppState>,
    Path((server, marker)): Path<(String, String)>,
) -> ApiResult<Json<Option<GovernanceServerConfig>>> {
    let user_id = caller(&headers)?;
    let kind = state
        .admin
        .governance_kind(&marker, &server, "get-governance-server-config")?;
    Ok(Json(
        state
            .admin
            .get_governance_server_config(&user_id, &server, kind)?,
    ))
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

pub async fn activate_with_stored_config(
    headers: HeaderMap,
    State(state): State<AppState>,
    Path(server): Path<String>,
) -> ApiResult<Json<Vec<String>>> {
    let user_id = caller(&headers)?;
    Ok(Json(
        state.admin.activate_with_stored_config(&user_id, &server)?,
    ))
}

pub async fn activate_with_supplied_config(
    headers: HeaderMap,
    State(state): State<AppState>,
    Path(server): Path<String>,
    Json(doc): Json<ConfigurationDocument>,
) -> ApiResult<Json<Vec<String>>> {
    let user_id = caller(&headers)?;
    Ok(Json(state.admin.activate_with_supplied_config(
        &user_id, &server, doc,
    )?))
}

pub async fn deactivate_temporarily(
    headers: HeaderMap,
    State(state): State<AppState>,
    Path(server): Path<String>,
) -> ApiResult<StatusCode> {
    let user_id = caller(&headers)?;
    state.admin.deactivate_temporarily(&user_id, &server)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn deactivate_permanently(
    headers: HeaderMap,
    State(state): State<AppState>,
    Path(server): Path<String>,
) -> ApiResult<StatusCode> {
    let user_id = caller(&headers)?;
    state.admin.deactivate_permanently(&user_id, &server)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_active_configuration(
    headers: HeaderMap,
    State(state): State<AppState>,
    Path(server): Path<String>,
) -> ApiResult<Json<ConfigurationDocument>> {
    let user_id = caller(&headers)?;
    Ok(Json(
        state.admin.get_active_configuration(&user_id, &server)?,
    ))
}

#[derive(Debug, Deserialize)]
pub struct ArchiveFileBody {
    pub file_name: String,
}

pub async fn add_open_metadata_archive_file(
    headers: HeaderMap,
    State(state): State<AppState>,
    Path(server): Path<String>,
    Json(body): Json<ArchiveFileBody>,
) -> ApiResult<StatusCode> {
    let user_id = caller(&headers)?;
    state
        .admin
        .add_open_metadata_archive_file(&user_id, &server, &body.file_name)?;
    Ok(StatusCode::NO_CONTENT)
}
