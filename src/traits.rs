//! Tool trait, execution context, and the built-in paper tools.
//!
//! Every operation exposed to remote callers is a [`Tool`] registered in a
//! [`ToolRegistry`]. The HTTP API ([`server`](crate::server)) and the MCP
//! bridge ([`mcp`](crate::mcp)) both dispatch through the same registry, so
//! the two surfaces always expose identical tools.
//!
//! ```text
//! ┌────────────────────────────────────────────┐
//! │                ToolRegistry                │
//! │  search_papers  extract_info  extract_text │
//! └──────────────┬─────────────────────────────┘
//!                ▼
//!     POST /tools/{name}   ·   MCP call_tool
//! ```
//!
//! # Usage
//!
//! ```rust
//! use paper_harness::traits::ToolRegistry;
//!
//! let tools = ToolRegistry::with_builtins();
//! assert!(tools.find("search_papers").is_some());
//! ```

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

use crate::arxiv::{ArxivClient, PaperSource};
use crate::config::Config;
use crate::error::PaperError;
use crate::extract::{extract_text_file, ExtractOutcome};
use crate::resolve::{not_found_message, resolve_paper, Resolution};
use crate::search::{search_papers, DEFAULT_MAX_RESULTS};
use crate::store::PaperStore;

// ═══════════════════════════════════════════════════════════════════════
// Tool Trait
// ═══════════════════════════════════════════════════════════════════════

/// An operation that remote callers can discover and invoke.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use anyhow::Result;
/// use serde_json::{json, Value};
/// use paper_harness::traits::{Tool, ToolContext};
///
/// pub struct TopicCountTool;
///
/// #[async_trait]
/// impl Tool for TopicCountTool {
///     fn name(&self) -> &str { "topic_count" }
///     fn description(&self) -> &str { "Count stored topics" }
///
///     fn parameters_schema(&self) -> Value {
///         json!({ "type": "object", "properties": {} })
///     }
///
///     async fn execute(&self, _params: Value, ctx: &ToolContext) -> Result<Value> {
///         Ok(json!(ctx.store().topic_names()?.len()))
///     }
/// }
/// ```
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name, used as the route path (`POST /tools/{name}`) and MCP tool name.
    fn name(&self) -> &str;

    /// One-line description for discovery.
    fn description(&self) -> &str;

    /// Whether this tool is one of the built-ins. Defaults to `false`.
    fn is_builtin(&self) -> bool {
        false
    }

    /// Whether the tool leaves the corpus and filesystem untouched.
    fn is_read_only(&self) -> bool {
        false
    }

    /// JSON Schema of the parameters object.
    fn parameters_schema(&self) -> Value;

    /// Execute the tool with parameters already checked by [`validate_params`].
    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<Value>;
}

// ═══════════════════════════════════════════════════════════════════════
// ToolContext
// ═══════════════════════════════════════════════════════════════════════

/// Everything a tool needs at execution time: the record store and the
/// search provider. Built once at server startup and shared.
pub struct ToolContext {
    store: PaperStore,
    source: Arc<dyn PaperSource>,
}

impl ToolContext {
    pub fn new(store: PaperStore, source: Arc<dyn PaperSource>) -> Self {
        Self { store, source }
    }

    /// Context backed by the configured corpus root and the arXiv client.
    pub fn from_config(config: &Config) -> Result<Self> {
        let source = ArxivClient::new(&config.arxiv)?;
        Ok(Self::new(config.paper_store(), Arc::new(source)))
    }

    pub fn store(&self) -> &PaperStore {
        &self.store
    }

    pub fn source(&self) -> &dyn PaperSource {
        self.source.as_ref()
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Built-in Tool Implementations
// ═══════════════════════════════════════════════════════════════════════

/// Searches arXiv for a topic and stores the hits. Delegates to [`search_papers`].
pub struct SearchPapersTool;

#[async_trait]
impl Tool for SearchPapersTool {
    fn name(&self) -> &str {
        "search_papers"
    }

    fn description(&self) -> &str {
        "Search for papers on arXiv based on a topic and store their information"
    }

    fn is_builtin(&self) -> bool {
        true
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "topic": { "type": "string", "description": "The topic to search for" },
                "max_results": {
                    "type": "integer",
                    "description": "Maximum number of results to retrieve",
                    "minimum": 1,
                    "default": DEFAULT_MAX_RESULTS
                }
            },
            "required": ["topic"]
        })
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<Value> {
        let topic = params["topic"].as_str().unwrap_or("");
        let max_results = params["max_results"]
            .as_u64()
            .map(|n| n as usize)
            .unwrap_or(DEFAULT_MAX_RESULTS);

        let ids = search_papers(ctx.store(), ctx.source(), topic, max_results).await?;
        Ok(serde_json::json!(ids))
    }
}

/// Looks a paper up across all topic stores. Delegates to [`resolve_paper`].
pub struct ExtractInfoTool;

#[async_trait]
impl Tool for ExtractInfoTool {
    fn name(&self) -> &str {
        "extract_info"
    }

    fn description(&self) -> &str {
        "Search for information about a specific paper across all topic directories"
    }

    fn is_builtin(&self) -> bool {
        true
    }

    fn is_read_only(&self) -> bool {
        true
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "paper_id": { "type": "string", "description": "The ID of the paper to look for" }
            },
            "required": ["paper_id"]
        })
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<Value> {
        let id = non_blank(&params, "paper_id")?;

        match resolve_paper(ctx.store(), id)? {
            Resolution::Found { record, .. } => Ok(serde_json::to_value(&record)?),
            Resolution::NotFound { id } => Ok(Value::String(not_found_message(&id))),
        }
    }
}

/// Converts a local PDF into a sibling `.txt` file. Delegates to
/// [`extract_text_file`]. Returns the output path, or `null` on failure.
pub struct ExtractTextTool;

#[async_trait]
impl Tool for ExtractTextTool {
    fn name(&self) -> &str {
        "extract_text_paper"
    }

    fn description(&self) -> &str {
        "Extract text content from a PDF file and save it as a text file"
    }

    fn is_builtin(&self) -> bool {
        true
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "paper_path": { "type": "string", "description": "Path to the PDF file to extract text from" }
            },
            "required": ["paper_path"]
        })
    }

    async fn execute(&self, params: Value, _ctx: &ToolContext) -> Result<Value> {
        let path = non_blank(&params, "paper_path")?;

        match extract_text_file(Path::new(path))? {
            ExtractOutcome::Success(output) => Ok(Value::String(output.display().to_string())),
            ExtractOutcome::Failure(_) => Ok(Value::Null),
        }
    }
}

/// A string parameter that must carry non-whitespace content.
fn non_blank<'a>(params: &'a Value, key: &str) -> Result<&'a str> {
    match params[key].as_str() {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(PaperError::InvalidArgument(format!("{} must not be empty", key)).into()),
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Registry
// ═══════════════════════════════════════════════════════════════════════

/// Ordered collection of tools.
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolRegistry {
    /// Create an empty tool registry.
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Registry pre-loaded with `search_papers`, `extract_info`, and `extract_text_paper`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(SearchPapersTool));
        registry.register(Box::new(ExtractInfoTool));
        registry.register(Box::new(ExtractTextTool));
        registry
    }

    pub fn register(&mut self, tool: Box<dyn Tool>) {
        self.tools.push(tool);
    }

    pub fn tools(&self) -> &[Box<dyn Tool>] {
        &self.tools
    }

    pub fn find(&self, name: &str) -> Option<&dyn Tool> {
        self.tools
            .iter()
            .find(|t| t.name() == name)
            .map(|t| t.as_ref())
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Serializable tool descriptor for `GET /tools/list`.
#[derive(Debug, Clone, Serialize)]
pub struct ToolInfo {
    pub name: String,
    pub description: String,
    pub builtin: bool,
    pub parameters: Value,
}

impl ToolInfo {
    pub fn of(tool: &dyn Tool) -> Self {
        Self {
            name: tool.name().to_string(),
            description: tool.description().to_string(),
            builtin: tool.is_builtin(),
            parameters: tool.parameters_schema(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Parameter validation
// ═══════════════════════════════════════════════════════════════════════

/// Checks `params` against a tool's schema and injects defaults.
///
/// Enforces `required`, each property's `type`, `enum`, and `minimum`.
/// Unknown properties pass through untouched.
pub fn validate_params(schema: &Value, params: &Value) -> Result<Value> {
    let params_obj = match params {
        Value::Object(map) => map.clone(),
        Value::Null => serde_json::Map::new(),
        other => bail!("parameters must be an object, got {}", json_type_name(other)),
    };

    let properties = schema
        .get("properties")
        .and_then(|p| p.as_object())
        .cloned()
        .unwrap_or_default();

    let required: Vec<String> = schema
        .get("required")
        .and_then(|r| r.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str().map(|s| s.to_string()))
                .collect()
        })
        .unwrap_or_default();

    let mut result = params_obj.clone();

    for req_field in &required {
        if !params_obj.contains_key(req_field) {
            bail!("missing required parameter: {}", req_field);
        }
    }

    for (prop_name, prop_schema) in &properties {
        if let Some(value) = params_obj.get(prop_name) {
            if let Some(expected_type) = prop_schema.get("type").and_then(|t| t.as_str()) {
                let type_ok = match expected_type {
                    "string" => value.is_string(),
                    "integer" => value.is_i64() || value.is_u64(),
                    "number" => value.is_number(),
                    "boolean" => value.is_boolean(),
                    "array" => value.is_array(),
                    "object" => value.is_object(),
                    _ => true,
                };
                if !type_ok {
                    bail!(
                        "parameter '{}' must be of type '{}', got {}",
                        prop_name,
                        expected_type,
                        json_type_name(value)
                    );
                }
            }

            if let Some(enum_values) = prop_schema.get("enum").and_then(|e| e.as_array()) {
                if !enum_values.contains(value) {
                    let allowed: Vec<String> = enum_values.iter().map(|v| v.to_string()).collect();
                    bail!(
                        "parameter '{}' must be one of [{}], got {}",
                        prop_name,
                        allowed.join(", "),
                        value
                    );
                }
            }

            if let (Some(minimum), Some(actual)) = (
                prop_schema.get("minimum").and_then(|m| m.as_f64()),
                value.as_f64(),
            ) {
                if actual < minimum {
                    bail!(
                        "parameter '{}' must be >= {}, got {}",
                        prop_name,
                        minimum,
                        value
                    );
                }
            }
        } else if let Some(default) = prop_schema.get("default") {
            result.insert(prop_name.clone(), default.clone());
        }
    }

    Ok(Value::Object(result))
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
