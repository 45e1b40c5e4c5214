//! Tools module - tool backends the agent can call
//!
//! Contains the [`Tool`] contract, the built-in lookup tools (arXiv,
//! Wikipedia, Tavily web search) and the registry that dispatches calls by name.

pub mod arxiv;
pub mod registry;
pub mod tavily;
pub mod wikipedia;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::core::{MindError, Result, ToolDefinition};

pub use arxiv::ArxivTool;
pub use registry::{ToolRegistry, ToolRegistryBuilder};
pub use tavily::TavilySearchTool;
pub use wikipedia::WikipediaTool;

/// Longest query forwarded to the lookup backends
pub const MAX_QUERY_CHARS: usize = 300;

/// A callable tool: name and description for the model, `invoke` for the loop
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name the model uses to request this tool
    fn name(&self) -> &str;

    /// Description the model reads to decide when to call it
    fn description(&self) -> &str;

    /// JSON Schema of the arguments
    fn parameters_schema(&self) -> Value {
        query_schema("The search query")
    }

    /// Run the tool and return its text output
    async fn invoke(&self, args: &Value) -> Result<String>;

    /// Definition bound into model requests
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::function(self.name(), self.description(), self.parameters_schema())
    }
}

/// The closed set of tools that can be enabled from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuiltinTool {
    /// Academic paper lookup
    #[serde(rename = "arxiv")]
    Arxiv,
    /// Encyclopedia lookup
    #[serde(rename = "wikipedia")]
    Wikipedia,
    /// Web search
    #[serde(rename = "tavily_search_results_json")]
    TavilySearch,
}

impl BuiltinTool {
    /// Every built-in tool, in default registration order
    pub const ALL: [BuiltinTool; 3] = [
        BuiltinTool::Arxiv,
        BuiltinTool::Wikipedia,
        BuiltinTool::TavilySearch,
    ];

    /// Name the tool registers under
    pub fn name(&self) -> &'static str {
        match self {
            BuiltinTool::Arxiv => arxiv::NAME,
            BuiltinTool::Wikipedia => wikipedia::NAME,
            BuiltinTool::TavilySearch => tavily::NAME,
        }
    }
}

impl std::fmt::Display for BuiltinTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Schema for tools that take a single free-text query
pub fn query_schema(description: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            "query": {
                "type": "string",
                "description": description
            }
        },
        "required": ["query"]
    })
}

/// Pull the `query` argument out of a call, accepting a bare JSON string too
pub fn query_arg(tool: &str, args: &Value) -> Result<String> {
    let query = match args {
        Value::String(s) => Some(s.as_str()),
        _ => args.get("query").and_then(|v| v.as_str()),
    }
    .map(str::trim)
    .filter(|q| !q.is_empty())
    .ok_or_else(|| MindError::tool(tool, "missing 'query' argument"))?;

    Ok(truncate_chars(query, MAX_QUERY_CHARS).to_string())
}

/// Cut `text` to at most `max` characters without splitting a code point
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Collapse runs of whitespace (feeds wrap titles and abstracts)
pub(crate) fn squash_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
