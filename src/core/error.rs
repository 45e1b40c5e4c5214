//! Custom error types for MultiToolMind
//!
//! Provides a unified error handling system across all modules.

use std::time::Duration;

use thiserror::Error;

/// Main error type for MultiToolMind operations
#[derive(Error, Debug)]
pub enum MindError {
    /// Model service errors (bad status, unparseable reply)
    #[error("Model error: {0}")]
    Model(String),

    /// A tool backend failed
    #[error("Tool '{tool}' failed: {message}")]
    ToolInvocation { tool: String, message: String },

    /// The model asked for a tool that is not registered
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// A tool did not answer in time
    #[error("Tool '{tool}' timed out after {timeout:?}")]
    ToolTimeout { tool: String, timeout: Duration },

    /// The model kept requesting tools past the turn limit
    #[error("Max turns exceeded: the model was still requesting tools after {max_turns} turns")]
    MaxTurnsExceeded { max_turns: usize },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required credential is not set
    #[error("Missing credential: set the {0} environment variable (or add it to .env)")]
    MissingCredential(&'static str),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error for other cases
    #[error("{0}")]
    Other(String),
}

/// Convenience Result type for MultiToolMind operations
pub type Result<T> = std::result::Result<T, MindError>;

impl MindError {
    /// Create a model error
    pub fn model(msg: impl Into<String>) -> Self {
        Self::Model(msg.into())
    }

    /// Create a tool invocation error
    pub fn tool(tool: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::ToolInvocation {
            tool: tool.into(),
            message: msg.into(),
        }
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether the agent loop can recover from this error by reporting it
    /// back to the model as a tool result.
    pub fn is_tool_failure(&self) -> bool {
        matches!(
            self,
            Self::ToolInvocation { .. } | Self::UnknownTool(_) | Self::ToolTimeout { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_failures_are_recoverable() {
        assert!(MindError::tool("arxiv", "503").is_tool_failure());
        assert!(MindError::UnknownTool("nope".into()).is_tool_failure());
        assert!(MindError::ToolTimeout {
            tool: "wikipedia".into(),
            timeout: Duration::from_secs(3)
        }
        .is_tool_failure());
        assert!(!MindError::model("boom").is_tool_failure());
        assert!(!MindError::MaxTurnsExceeded { max_turns: 2 }.is_tool_failure());
    }

    #[test]
    fn test_display() {
        let err = MindError::tool("arxiv", "service unavailable");
        assert_eq!(err.to_string(), "Tool 'arxiv' failed: service unavailable");

        let err = MindError::ToolTimeout {
            tool: "wikipedia".into(),
            timeout: Duration::from_secs(30),
        };
        assert_eq!(err.to_string(), "Tool 'wikipedia' timed out after 30s");

        let err = MindError::MissingCredential("GROQ_API_KEY");
        assert!(err.to_string().contains("GROQ_API_KEY"));
    }
}
