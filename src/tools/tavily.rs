//! Tavily web search
//!
//! Returns the search hits as a JSON array of `{url, content}` objects.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::core::config::TavilyConfig;
use crate::core::{MindError, Result};
use crate::tools::{query_arg, Tool};

pub const NAME: &str = "tavily_search_results_json";

/// Searches the web through the Tavily API
pub struct TavilySearchTool {
    client: Client,
    config: TavilyConfig,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: usize,
    search_depth: &'a str,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SearchHit {
    url: String,
    #[serde(default)]
    content: String,
}

impl TavilySearchTool {
    pub fn new(client: Client, config: TavilyConfig, api_key: impl Into<String>) -> Self {
        Self {
            client,
            config,
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl Tool for TavilySearchTool {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "A search engine optimized for comprehensive, accurate, and trusted results. \
         Useful for when you need to answer questions about current events. \
         Input should be a search query."
    }

    async fn invoke(&self, args: &Value) -> Result<String> {
        let query = query_arg(NAME, args)?;

        let request = SearchRequest {
            api_key: &self.api_key,
            query: &query,
            max_results: self.config.max_results,
            search_depth: "advanced",
        };

        let response = self
            .client
            .post(format!("{}/search", self.config.base_url.trim_end_matches('/')))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(MindError::tool(
                NAME,
                format!("Tavily API error ({}): {}", status, error_text),
            ));
        }

        let body: SearchResponse = response.json().await?;
        debug!(hits = body.results.len(), "tavily search complete");

        Ok(serde_json::to_string(&body.results)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn tool_for(server: &MockServer) -> TavilySearchTool {
        TavilySearchTool::new(
            Client::new(),
            TavilyConfig {
                base_url: server.uri(),
                max_results: 3,
            },
            "tvly-test",
        )
    }

    #[tokio::test]
    async fn test_invoke_returns_url_content_pairs() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .and(body_partial_json(json!({
                "api_key": "tvly-test",
                "query": "top AI paper today",
                "max_results": 3
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "query": "top AI paper today",
                "results": [
                    {"title": "A", "url": "https://a.example", "content": "first", "score": 0.9},
                    {"title": "B", "url": "https://b.example", "content": "second", "score": 0.5}
                ]
            })))
            .mount(&server)
            .await;

        let text = tool_for(&server)
            .invoke(&json!({"query": "top AI paper today"}))
            .await
            .unwrap();

        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(
            parsed,
            json!([
                {"url": "https://a.example", "content": "first"},
                {"url": "https://b.example", "content": "second"}
            ])
        );
    }

    #[tokio::test]
    async fn test_invoke_reports_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
            .mount(&server)
            .await;

        let err = tool_for(&server)
            .invoke(&json!({"query": "anything"}))
            .await
            .unwrap_err();
        match err {
            MindError::ToolInvocation { tool, message } => {
                assert_eq!(tool, NAME);
                assert!(message.contains("401"));
                assert!(message.contains("invalid api key"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_query_never_hits_network() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = tool_for(&server).invoke(&json!({})).await.unwrap_err();
        assert!(err.is_tool_failure());
    }
}
