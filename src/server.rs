//! Tool server: JSON HTTP API plus an MCP streamable-HTTP endpoint.
//!
//! All tools are registered in one [`ToolRegistry`] and dispatched through
//! the same [`ToolContext`], whichever surface the call arrives on.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/tools/list` | List all registered tools with schemas |
//! | `POST` | `/tools/{name}` | Call a tool by name |
//! | `GET`  | `/health` | Health check (returns version) |
//! | any    | `/mcp` | MCP JSON-RPC over streamable HTTP |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "missing required parameter: topic" } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404), `upstream` (502),
//! `internal` (500).
//!
//! # MCP client configuration
//!
//! ```json
//! {
//!   "mcpServers": {
//!     "research-papers": { "url": "http://127.0.0.1:7332/mcp" }
//!   }
//! }
//! ```

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use rmcp::transport::streamable_http_server::{
    session::local::LocalSessionManager, StreamableHttpService,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::config::Config;
use crate::error::PaperError;
use crate::mcp::McpBridge;
use crate::traits::{validate_params, ToolContext, ToolInfo, ToolRegistry};

/// Shared state passed to all route handlers.
#[derive(Clone)]
struct AppState {
    ctx: Arc<ToolContext>,
    tools: Arc<ToolRegistry>,
}

/// Starts the tool server on `[server].bind` and runs until the process
/// is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let ctx = Arc::new(ToolContext::from_config(config)?);
    let tools = Arc::new(ToolRegistry::with_builtins());

    println!("{} tools registered:", tools.len());
    for t in tools.tools() {
        println!("  POST /tools/{}  {}", t.name(), t.description());
    }

    let app = build_router(ctx, tools);
    let bind_addr = config.server.bind.clone();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    info!(bind = %bind_addr, root = %config.storage.root.display(), "tool server listening");
    println!("Tool server listening on http://{} (MCP at /mcp)", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}

/// Builds the full router. Exposed so callers can serve it on their own
/// listener with a custom [`ToolContext`].
pub fn build_router(ctx: Arc<ToolContext>, tools: Arc<ToolRegistry>) -> Router {
    let bridge = McpBridge::new(ctx.clone(), tools.clone());
    let mcp_service = StreamableHttpService::new(
        move || Ok(bridge.clone()),
        LocalSessionManager::default().into(),
        Default::default(),
    );

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/tools/list", get(handle_list_tools))
        .route("/tools/{name}", post(handle_tool_call))
        .route("/health", get(handle_health))
        .with_state(AppState { ctx, tools })
        .nest_service("/mcp", mcp_service)
        .layer(cors)
}

/// JSON error envelope: `{ "error": { "code", "message" } }`.
#[derive(Serialize)]
struct ErrorBody<'a> {
    error: ErrorDetail<'a>,
}

#[derive(Serialize)]
struct ErrorDetail<'a> {
    code: &'a str,
    message: &'a str,
}

struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl AppError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "bad_request", message)
    }

    fn unknown_tool(name: &str) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            "not_found",
            format!("no tool registered with name: {}", name),
        )
    }

    /// Maps a tool failure to a status, using the typed error when the
    /// failure came from the library.
    fn from_tool_failure(tool_name: &str, err: anyhow::Error) -> Self {
        let message = format!("{}: {}", tool_name, err);
        match err.downcast_ref::<PaperError>() {
            Some(PaperError::InvalidArgument(_)) => Self::bad_request(message),
            Some(PaperError::Upstream(_)) => {
                Self::new(StatusCode::BAD_GATEWAY, "upstream", message)
            }
            _ => Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", message),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: &self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
struct ToolListResponse {
    tools: Vec<ToolInfo>,
}

async fn handle_list_tools(State(state): State<AppState>) -> Json<ToolListResponse> {
    let tools = state
        .tools
        .tools()
        .iter()
        .map(|t| ToolInfo::of(t.as_ref()))
        .collect();
    Json(ToolListResponse { tools })
}

/// Looks the tool up, validates the body against its schema, and executes
/// it. The tool's return value is wrapped as `{ "result": ... }`.
async fn handle_tool_call(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(params): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, AppError> {
    let tool = state
        .tools
        .find(&name)
        .ok_or_else(|| AppError::unknown_tool(&name))?;

    let validated_params = validate_params(&tool.parameters_schema(), &params)
        .map_err(|e| AppError::bad_request(e.to_string()))?;

    let result = tool
        .execute(validated_params, &state.ctx)
        .await
        .map_err(|e| {
            warn!(tool = %name, error = %e, "tool call failed");
            AppError::from_tool_failure(&name, e)
        })?;

    Ok(Json(serde_json::json!({ "result": result })))
}
