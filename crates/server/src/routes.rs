//! Transport adapters over the tool dispatcher.
//!
//! Endpoints:
//! - `GET  /tools`         — discovery: registered descriptors, verbatim
//! - `POST /tools/{name}`  — path-segment shape; body is the argument map
//! - `POST /call`          — body shape `{tool, arguments}`
//! - `GET  /invoke`        — query shape `?tool=...&<arg>=...`
//!
//! Adapters only extract a tool call and pick an envelope; no tool-specific
//! logic lives here.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::info;
use uuid::Uuid;

use bookery_core::domain::tool::{ToolCall, ToolResult};
use bookery_core::errors::DispatchError;
use bookery_tools::format::{json_envelope, text_envelope};
use bookery_tools::ToolRegistry;

#[derive(Clone)]
pub struct ApiState {
    registry: Arc<ToolRegistry>,
}

type ApiError = (StatusCode, Json<Value>);

pub fn router(registry: Arc<ToolRegistry>) -> Router {
    Router::new()
        .route("/tools", get(list_tools))
        .route("/tools/{name}", post(call_tool_by_path))
        .route("/call", post(call_tool_by_body))
        .route("/invoke", get(call_tool_by_query))
        .with_state(ApiState { registry })
}

/// Body shape for `POST /call`. `name` is accepted as an alias for `tool`
/// since integrations disagree on the field name.
#[derive(Debug, Default, Deserialize)]
pub struct ToolCallRequest {
    #[serde(default, alias = "name")]
    pub tool: Option<String>,
    #[serde(default)]
    pub arguments: Option<Map<String, Value>>,
}

async fn list_tools(State(state): State<ApiState>) -> Json<Value> {
    Json(json!({ "tools": state.registry.descriptors() }))
}

async fn call_tool_by_path(
    State(state): State<ApiState>,
    Path(name): Path<String>,
    body: Option<Json<Map<String, Value>>>,
) -> Result<Json<Value>, ApiError> {
    let call = ToolCall { name, arguments: body.map(|Json(map)| map).unwrap_or_default() };
    let result = dispatch(&state, &call, "path").await?;
    Ok(Json(text_envelope(&result)))
}

async fn call_tool_by_body(
    State(state): State<ApiState>,
    Json(request): Json<ToolCallRequest>,
) -> Result<Json<Value>, ApiError> {
    let call = ToolCall {
        name: request.tool.unwrap_or_default(),
        arguments: request.arguments.unwrap_or_default(),
    };
    let result = dispatch(&state, &call, "body").await?;
    Ok(Json(json_envelope(&result)))
}

async fn call_tool_by_query(
    State(state): State<ApiState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    let mut params = params;
    let name = params.remove("tool").unwrap_or_default();
    let arguments: Map<String, Value> =
        params.into_iter().map(|(key, value)| (key, Value::String(value))).collect();
    let call = ToolCall { name, arguments };
    let result = dispatch(&state, &call, "query").await?;
    Ok(Json(json_envelope(&result)))
}

async fn dispatch(
    state: &ApiState,
    call: &ToolCall,
    shape: &'static str,
) -> Result<ToolResult, ApiError> {
    let correlation_id = Uuid::new_v4();
    info!(
        event_name = "api.tool_call",
        correlation_id = %correlation_id,
        tool = %call.name,
        shape,
        "dispatching inbound tool call"
    );

    state.registry.dispatch(&call.name, &call.arguments).await.map_err(|error| {
        let status = match &error {
            DispatchError::UnknownTool(_) => StatusCode::NOT_FOUND,
            DispatchError::MissingToolName
            | DispatchError::MissingParameter(_)
            | DispatchError::InvalidArgument { .. } => StatusCode::BAD_REQUEST,
        };
        (status, Json(json!({ "error": error.to_string() })))
    })
}
