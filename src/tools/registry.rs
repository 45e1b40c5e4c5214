//! Tool registry - manages and dispatches tool calls
//!
//! Tools are registered once through [`ToolRegistryBuilder`]; the built
//! registry is immutable and routes calls by name.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use crate::core::config::ToolsConfig;
use crate::core::{Credentials, MindError, Result, ToolDefinition};
use crate::tools::{ArxivTool, BuiltinTool, TavilySearchTool, Tool, WikipediaTool};

/// Registry of available tools
pub struct ToolRegistry {
    /// Tools in registration order
    tools: Vec<Arc<dyn Tool>>,
    /// Name -> position in `tools`
    index: HashMap<String, usize>,
    /// Per-call timeout
    timeout: Option<Duration>,
}

/// Collects tools at startup; `build` freezes them into a [`ToolRegistry`]
#[derive(Default)]
pub struct ToolRegistryBuilder {
    tools: Vec<Arc<dyn Tool>>,
    timeout: Option<Duration>,
}

impl ToolRegistryBuilder {
    /// Register a tool
    pub fn register(self, tool: impl Tool + 'static) -> Self {
        self.register_arc(Arc::new(tool))
    }

    /// Register a shared tool
    pub fn register_arc(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }

    /// Bound every invocation by `timeout`
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Freeze the registry; duplicate names are a configuration error
    pub fn build(self) -> Result<ToolRegistry> {
        let mut index = HashMap::with_capacity(self.tools.len());

        for (pos, tool) in self.tools.iter().enumerate() {
            if index.insert(tool.name().to_string(), pos).is_some() {
                return Err(MindError::config(format!(
                    "tool '{}' registered twice",
                    tool.name()
                )));
            }
        }

        Ok(ToolRegistry {
            tools: self.tools,
            index,
            timeout: self.timeout,
        })
    }
}

impl ToolRegistry {
    /// Start building a registry
    pub fn builder() -> ToolRegistryBuilder {
        ToolRegistryBuilder::default()
    }

    /// Build the registry of enabled built-in tools
    pub fn from_config(config: &ToolsConfig, credentials: &Credentials) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("multitoolmind/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let mut builder =
            Self::builder().timeout(Duration::from_secs(config.timeout_secs.max(1)));

        for tool in &config.enabled {
            builder = match tool {
                BuiltinTool::Arxiv => {
                    builder.register(ArxivTool::new(client.clone(), config.arxiv.clone()))
                }
                BuiltinTool::Wikipedia => {
                    builder.register(WikipediaTool::new(client.clone(), config.wikipedia.clone()))
                }
                BuiltinTool::TavilySearch => builder.register(TavilySearchTool::new(
                    client.clone(),
                    config.tavily.clone(),
                    credentials.tavily_api_key.clone(),
                )),
            };
        }

        builder.build()
    }

    /// Tool definitions in registration order, for binding into the model
    pub fn list(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.definition()).collect()
    }

    /// Registered tool names in registration order
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Look up a tool by name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.index.get(name).map(|&pos| &self.tools[pos])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Invoke a tool by name
    ///
    /// Every failure comes back as a tool-failure variant of [`MindError`]
    /// (`UnknownTool`, `ToolTimeout` or `ToolInvocation`).
    pub async fn invoke(&self, name: &str, args: &Value) -> Result<String> {
        let tool = self
            .get(name)
            .ok_or_else(|| MindError::UnknownTool(name.to_string()))?;

        debug!(tool = name, %args, "invoking tool");

        let outcome = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, tool.invoke(args))
                .await
                .map_err(|_| MindError::ToolTimeout {
                    tool: name.to_string(),
                    timeout: limit,
                })?,
            None => tool.invoke(args).await,
        };

        outcome.map_err(|e| {
            warn!(tool = name, error = %e, "tool failed");
            if e.is_tool_failure() {
                e
            } else {
                MindError::tool(name, e.to_string())
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    struct Echo;

    #[async_trait]
    impl Tool for Echo {
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "Echo the query back"
        }
        async fn invoke(&self, args: &Value) -> Result<String> {
            Ok(format!("echo: {}", crate::tools::query_arg("echo", args)?))
        }
    }

    struct Broken;

    #[async_trait]
    impl Tool for Broken {
        fn name(&self) -> &str {
            "broken"
        }
        fn description(&self) -> &str {
            "Always fails"
        }
        async fn invoke(&self, _args: &Value) -> Result<String> {
            Err(MindError::Other("backend exploded".into()))
        }
    }

    struct Slow;

    #[async_trait]
    impl Tool for Slow {
        fn name(&self) -> &str {
            "slow"
        }
        fn description(&self) -> &str {
            "Never answers in time"
        }
        async fn invoke(&self, _args: &Value) -> Result<String> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok("late".into())
        }
    }

    #[test]
    fn test_list_keeps_registration_order() {
        let registry = ToolRegistry::builder()
            .register(Echo)
            .register(Broken)
            .build()
            .unwrap();

        let names: Vec<String> = registry.list().iter().map(|d| d.name().to_string()).collect();
        assert_eq!(names, vec!["echo", "broken"]);
        assert_eq!(registry.names(), vec!["echo", "broken"]);
        assert_eq!(registry.len(), 2);
        assert!(registry.contains("echo"));
        assert!(!registry.contains("arxiv"));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let result = ToolRegistry::builder().register(Echo).register(Echo).build();
        assert!(matches!(result, Err(MindError::Config(_))));
    }

    #[tokio::test]
    async fn test_invoke_is_repeatable() {
        let registry = ToolRegistry::builder().register(Echo).build().unwrap();
        let args = json!({"query": "2+2"});

        let first = registry.invoke("echo", &args).await.unwrap();
        let second = registry.invoke("echo", &args).await.unwrap();
        assert_eq!(first, "echo: 2+2");
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let registry = ToolRegistry::builder().register(Echo).build().unwrap();
        let err = registry.invoke("calculator", &json!({})).await.unwrap_err();
        assert!(matches!(err, MindError::UnknownTool(ref n) if n == "calculator"));
    }

    #[tokio::test]
    async fn test_backend_error_becomes_tool_invocation_error() {
        let registry = ToolRegistry::builder().register(Broken).build().unwrap();
        let err = registry.invoke("broken", &json!({"query": "x"})).await.unwrap_err();
        match err {
            MindError::ToolInvocation { tool, message } => {
                assert_eq!(tool, "broken");
                assert!(message.contains("backend exploded"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_timeout() {
        let registry = ToolRegistry::builder()
            .register(Slow)
            .timeout(Duration::from_millis(50))
            .build()
            .unwrap();

        let err = registry.invoke("slow", &json!({"query": "x"})).await.unwrap_err();
        assert!(matches!(err, MindError::ToolTimeout { ref tool, .. } if tool == "slow"));
        assert_eq!(err.to_string(), "Tool 'slow' timed out after 50ms");
    }

    #[test]
    fn test_from_config_respects_enabled_list() {
        let mut config = ToolsConfig::default();
        config.enabled = vec![BuiltinTool::Wikipedia, BuiltinTool::Arxiv];
        let credentials = Credentials {
            groq_api_key: "gsk".into(),
            tavily_api_key: "tvly".into(),
        };

        let registry = ToolRegistry::from_config(&config, &credentials).unwrap();
        assert_eq!(registry.names(), vec!["wikipedia", "arxiv"]);
    }
}
