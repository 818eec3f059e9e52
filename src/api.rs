//! HTTP surface for the tool runtime.
//!
//! - `POST /runtime/webhooks/mcp_extension` – Invoke the tool named by `toolName`; the whole
//!   body (`{"toolName": ..., "arguments": {...}}`) is the trigger context.
//! - `POST /tools/:name` – Invoke a tool with the raw request body as the trigger context, so a
//!   body that is not JSON yields `Invalid request payload`.
//! - `GET /tools` – Tool catalogue with argument descriptions.
//!
//! When a function key is configured, every route requires it as the `code` query parameter or
//! the `x-functions-key` header. Tool results are returned as `text/plain`.

use crate::runtime::ToolRuntime;
use crate::tools::{TOOLS, ToolError, TriggerPayload};
use axum::{
    Json, Router,
    extract::{Path, Query, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Header carrying the function key.
pub const FUNCTION_KEY_HEADER: &str = "x-functions-key";

#[derive(Clone)]
struct ApiState {
    runtime: Arc<ToolRuntime>,
    function_key: Option<Arc<str>>,
}

/// Build the HTTP router; `function_key` enables key checks on every route.
pub fn create_router(runtime: Arc<ToolRuntime>, function_key: Option<String>) -> Router {
    let state = ApiState {
        runtime,
        function_key: function_key.map(Arc::from),
    };
    Router::new()
        .route("/runtime/webhooks/mcp_extension", post(webhook))
        .route("/tools", get(list_tools))
        .route("/tools/:name", post(invoke_tool))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_function_key,
        ))
        .with_state(state)
}

#[derive(Deserialize)]
struct KeyQuery {
    code: Option<String>,
}

async fn require_function_key(
    State(state): State<ApiState>,
    Query(query): Query<KeyQuery>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = state.function_key.as_deref() else {
        return next.run(request).await;
    };
    let supplied = query.code.or_else(|| {
        headers
            .get(FUNCTION_KEY_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    });
    if supplied.as_deref() == Some(expected) {
        next.run(request).await
    } else {
        tracing::warn!(path = %request.uri().path(), "Rejected request without a valid function key");
        (StatusCode::UNAUTHORIZED, "Missing or invalid function key").into_response()
    }
}

/// Invoke a tool through the webhook envelope.
async fn webhook(
    State(state): State<ApiState>,
    Json(body): Json<Value>,
) -> Result<String, AppError> {
    let tool = body
        .get("toolName")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(AppError::MissingToolName)?;
    tracing::info!(tool = %tool, "Webhook invocation");
    Ok(state
        .runtime
        .invoke(&tool, TriggerPayload::from(body))
        .await?)
}

/// Invoke a tool with the raw body as trigger context.
async fn invoke_tool(
    State(state): State<ApiState>,
    Path(name): Path<String>,
    body: String,
) -> Result<String, AppError> {
    Ok(state
        .runtime
        .invoke(&name, TriggerPayload::Text(body))
        .await?)
}

/// Catalogue entry describing one tool.
#[derive(Serialize)]
struct ToolDescriptor {
    name: &'static str,
    title: &'static str,
    description: &'static str,
    arguments: Vec<ArgumentDescriptor>,
}

#[derive(Serialize)]
struct ArgumentDescriptor {
    name: &'static str,
    #[serde(rename = "type")]
    property_type: &'static str,
    description: &'static str,
    required: bool,
}

/// Response body for `GET /tools`.
#[derive(Serialize)]
struct ToolsResponse {
    tools: Vec<ToolDescriptor>,
}

async fn list_tools(State(state): State<ApiState>) -> Json<ToolsResponse> {
    let registry = state.runtime.registry();
    let tools = TOOLS
        .iter()
        .filter(|spec| registry.get(spec.name).is_some())
        .map(|spec| ToolDescriptor {
            name: spec.name,
            title: spec.title,
            description: spec.description,
            arguments: spec
                .properties
                .iter()
                .map(|property| ArgumentDescriptor {
                    name: property.name,
                    property_type: property.property_type,
                    description: property.description,
                    required: property.required,
                })
                .collect(),
        })
        .collect();
    Json(ToolsResponse { tools })
}

enum AppError {
    MissingToolName,
    Tool(ToolError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::MissingToolName => {
                (StatusCode::BAD_REQUEST, "Missing toolName").into_response()
            }
            Self::Tool(err @ ToolError::UnknownTool(_)) => {
                (StatusCode::NOT_FOUND, err.to_string()).into_response()
            }
            Self::Tool(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response(),
        }
    }
}

impl From<ToolError> for AppError {
    fn from(inner: ToolError) -> Self {
        Self::Tool(inner)
    }
}
