//! Wikipedia lookup
//!
//! Searches the MediaWiki API for matching pages, then fetches a plain-text
//! intro extract for each hit.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

use crate::core::config::WikipediaConfig;
use crate::core::{MindError, Result};
use crate::tools::{query_arg, truncate_chars, Tool};

pub const NAME: &str = "wikipedia";

const NO_RESULT: &str = "No good Wikipedia Search Result was found";

/// Looks up encyclopedia pages
pub struct WikipediaTool {
    client: Client,
    config: WikipediaConfig,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    query: Option<SearchQuery>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ExtractResponse {
    #[serde(default)]
    query: Option<ExtractQuery>,
}

#[derive(Debug, Deserialize)]
struct ExtractQuery {
    #[serde(default)]
    pages: HashMap<String, Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    title: String,
    #[serde(default)]
    extract: Option<String>,
}

impl WikipediaTool {
    pub fn new(client: Client, config: WikipediaConfig) -> Self {
        Self { client, config }
    }

    async fn get_json<T: DeserializeOwned>(&self, params: &[(&str, &str)]) -> Result<T> {
        let response = self
            .client
            .get(&self.config.base_url)
            .query(params)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(MindError::tool(
                NAME,
                format!("Wikipedia API returned {}", response.status()),
            ));
        }

        Ok(response.json().await?)
    }

    async fn search(&self, query: &str) -> Result<Vec<String>> {
        let limit = self.config.top_k_results.to_string();
        let response: SearchResponse = self
            .get_json(&[
                ("action", "query"),
                ("list", "search"),
                ("format", "json"),
                ("srsearch", query),
                ("srlimit", limit.as_str()),
            ])
            .await?;

        Ok(response
            .query
            .map(|q| q.search.into_iter().map(|hit| hit.title).collect())
            .unwrap_or_default())
    }

    /// Intro extract of one page; `None` when the page has no text
    async fn summary(&self, title: &str) -> Result<Option<(String, String)>> {
        let response: ExtractResponse = self
            .get_json(&[
                ("action", "query"),
                ("prop", "extracts"),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("redirects", "1"),
                ("format", "json"),
                ("titles", title),
            ])
            .await?;

        Ok(response
            .query
            .and_then(|q| q.pages.into_values().next())
            .and_then(|page| {
                let extract = page.extract?.trim().to_string();
                (!extract.is_empty()).then_some((page.title, extract))
            }))
    }
}

#[async_trait]
impl Tool for WikipediaTool {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "A wrapper around Wikipedia. Useful for when you need to answer general questions \
         about people, places, companies, facts, historical events, or other subjects. \
         Input should be a search query."
    }

    async fn invoke(&self, args: &Value) -> Result<String> {
        let query = query_arg(NAME, args)?;

        let mut summaries = Vec::new();
        for title in self.search(&query).await? {
            if let Some((title, extract)) = self.summary(&title).await? {
                summaries.push(format!("Page: {}\nSummary: {}", title, extract));
            }
        }

        if summaries.is_empty() {
            return Ok(NO_RESULT.to_string());
        }

        let text = summaries.join("\n\n");
        Ok(truncate_chars(&text, self.config.doc_content_chars_max).to_string())
    }
}
