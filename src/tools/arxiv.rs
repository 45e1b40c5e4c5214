//! arXiv paper lookup
//!
//! Queries the arXiv Atom API and renders the top entries as plain text.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use url::Url;

use crate::core::config::ArxivConfig;
use crate::core::{MindError, Result};
use crate::tools::{query_arg, squash_whitespace, truncate_chars, Tool};

pub const NAME: &str = "arxiv";

const NO_RESULT: &str = "No good Arxiv Result was found";

/// Looks up papers on arXiv
pub struct ArxivTool {
    client: Client,
    config: ArxivConfig,
}

/// One paper from the feed
#[derive(Debug, Clone, PartialEq)]
struct Paper {
    /// Date of the latest version
    date: String,
    title: String,
    authors: Vec<String>,
    summary: String,
}

impl ArxivTool {
    pub fn new(client: Client, config: ArxivConfig) -> Self {
        Self { client, config }
    }

    fn query_url(&self, query: &str) -> Result<Url> {
        let endpoint = format!("{}/query", self.config.base_url.trim_end_matches('/'));
        let max_results = self.config.top_k_results.to_string();

        Url::parse_with_params(
            &endpoint,
            &[
                ("search_query", query),
                ("start", "0"),
                ("max_results", max_results.as_str()),
            ],
        )
        .map_err(|e| MindError::config(format!("invalid arxiv base_url: {}", e)))
    }

    fn render(&self, papers: &[Paper]) -> String {
        if papers.is_empty() {
            return NO_RESULT.to_string();
        }

        let text = papers
            .iter()
            .map(|p| {
                format!(
                    "Published: {}\nTitle: {}\nAuthors: {}\nSummary: {}",
                    p.date,
                    p.title,
                    p.authors.join(", "),
                    p.summary
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        truncate_chars(&text, self.config.doc_content_chars_max).to_string()
    }
}

#[async_trait]
impl Tool for ArxivTool {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Query arxiv papers"
    }

    async fn invoke(&self, args: &Value) -> Result<String> {
        let query = query_arg(NAME, args)?;
        let url = self.query_url(&query)?;

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(MindError::tool(
                NAME,
                format!("arXiv API returned {}", response.status()),
            ));
        }

        let feed = response.text().await?;
        let papers = parse_feed(&feed)?;
        Ok(self.render(&papers))
    }
}

/// Extract entries from an Atom feed
///
/// arXiv reports a malformed query as a single entry titled `Error`.
fn parse_feed(feed: &str) -> Result<Vec<Paper>> {
    let mut papers = Vec::new();

    for chunk in feed.split("<entry>").skip(1) {
        let entry = chunk.split("</entry>").next().unwrap_or(chunk);

        let title = squash_whitespace(&xml_decode(tag_text(entry, "title").unwrap_or_default()));
        let summary =
            squash_whitespace(&xml_decode(tag_text(entry, "summary").unwrap_or_default()));

        if title == "Error" {
            return Err(MindError::tool(NAME, summary));
        }

        let date = tag_text(entry, "updated")
            .or_else(|| tag_text(entry, "published"))
            .map(|d| d.trim().chars().take(10).collect::<String>())
            .unwrap_or_default();

        let authors = entry
            .split("<author>")
            .skip(1)
            .filter_map(|a| tag_text(a, "name"))
            .map(|n| squash_whitespace(&xml_decode(n)))
            .collect();

        papers.push(Paper {
            date,
            title,
            authors,
            summary,
        });
    }

    Ok(papers)
}

/// Text between `<tag ...>` and `</tag>`, first occurrence
fn tag_text<'a>(xml: &'a str, tag: &str) -> Option<&'a str> {
    let open = format!("<{}", tag);
    let close = format!("</{}>", tag);

    let mut search = xml;
    loop {
        let start = search.find(&open)?;
        let rest = &search[start + open.len()..];
        // Skip longer tag names sharing the prefix, e.g. <name> vs <namespace>
        match rest.chars().next() {
            Some('>') | Some(' ') | Some('\n') | Some('\t') => {
                let body_start = rest.find('>')? + 1;
                let body = &rest[body_start..];
                let end = body.find(&close)?;
                return Some(&body[..end]);
            }
            _ => search = rest,
        }
    }
}

/// Basic XML entity decoding.
fn xml_decode(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title type="html">ArXiv Query: search_query=all:attention</title>
  <entry>
    <id>http://arxiv.org/abs/1706.03762v7</id>
    <updated>2023-08-02T00:41:18Z</updated>
    <published>2017-06-12T17:57:34Z</published>
    <title>Attention Is All
      You Need</title>
    <summary>  The dominant sequence transduction models are based on complex
recurrent or convolutional neural networks &amp; attention.</summary>
    <author>
      <name>Ashish Vaswani</name>
    </author>
    <author>
      <name>Noam Shazeer</name>
    </author>
  </entry>
  <entry>
    <id>http://arxiv.org/abs/1810.04805v2</id>
    <published>2018-10-11T00:50:01Z</published>
    <title>BERT</title>
    <summary>Deep bidirectional transformers.</summary>
    <author><name>Jacob Devlin</name></author>
  </entry>
</feed>"#;

    fn tool_for(server: &MockServer, chars_max: usize) -> ArxivTool {
        ArxivTool::new(
            Client::new(),
            ArxivConfig {
                base_url: server.uri(),
                top_k_results: 2,
                doc_content_chars_max: chars_max,
            },
        )
    }

    #[test]
    fn test_parse_feed() {
        let papers = parse_feed(FEED).unwrap();
        assert_eq!(papers.len(), 2);
        assert_eq!(papers[0].title, "Attention Is All You Need");
        assert_eq!(papers[0].date, "2023-08-02");
        assert_eq!(papers[1].date, "2018-10-11");
        assert_eq!(papers[0].authors, vec!["Ashish Vaswani", "Noam Shazeer"]);
        assert!(papers[0].summary.ends_with("neural networks & attention."));
        assert_eq!(papers[1].authors, vec!["Jacob Devlin"]);
    }

    #[test]
    fn test_error_entry() {
        let feed = "<feed><entry><title>Error</title><summary>incorrect id format</summary></entry></feed>";
        let err = parse_feed(feed).unwrap_err();
        assert!(err.to_string().contains("incorrect id format"));
    }

    #[test]
    fn test_tag_text_skips_prefixed_tags() {
        let xml = "<names>x</names><name>Ada</name>";
        assert_eq!(tag_text(xml, "name"), Some("Ada"));
        assert_eq!(tag_text(xml, "missing"), None);
    }

    #[tokio::test]
    async fn test_invoke_renders_papers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/query"))
            .and(query_param("search_query", "attention"))
            .and(query_param("max_results", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_string(FEED))
            .mount(&server)
            .await;

        let tool = tool_for(&server, 10_000);
        let text = tool.invoke(&json!({"query": "attention"})).await.unwrap();

        assert!(text.starts_with(
            "Published: 2023-08-02\nTitle: Attention Is All You Need\nAuthors: Ashish Vaswani, Noam Shazeer\nSummary: "
        ));
        assert!(text.contains("\n\nPublished: 2018-10-11\nTitle: BERT"));
    }

    #[tokio::test]
    async fn test_invoke_truncates_output() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/query"))
            .respond_with(ResponseTemplate::new(200).set_body_string(FEED))
            .mount(&server)
            .await;

        let text = tool_for(&server, 40)
            .invoke(&json!({"query": "attention"}))
            .await
            .unwrap();
        assert_eq!(text.chars().count(), 40);
    }

    #[tokio::test]
    async fn test_invoke_no_results() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/query"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<feed></feed>"))
            .mount(&server)
            .await;

        let text = tool_for(&server, 500)
            .invoke(&json!({"query": "zzzz"}))
            .await
            .unwrap();
        assert_eq!(text, NO_RESULT);
    }

    #[tokio::test]
    async fn test_invoke_http_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = tool_for(&server, 500)
            .invoke(&json!({"query": "attention"}))
            .await
            .unwrap_err();
        assert!(matches!(err, MindError::ToolInvocation { .. }));
    }
}
