//! Web search over DuckDuckGo's HTML endpoint.

use std::borrow::Cow;
use std::collections::HashMap;
use std::time::Duration;
use async_trait::async_trait;
use serde_json::{json, Value};

use super::{required_str, Tool};

#[derive(Debug, Clone)]
pub struct WebSearchConfig {
    pub endpoint:     String,
    pub max_results:  usize,
    pub timeout_secs: u64,
}

impl Default for WebSearchConfig {
    fn default() -> Self {
        Self {
            endpoint:     "https://html.duckduckgo.com/html/".to_string(),
            max_results:  5,
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct SearchHit {
    title:   String,
    url:     String,
    snippet: String,
}

pub struct WebSearchTool {
    config: WebSearchConfig,
    http:   reqwest::Client,
}

impl WebSearchTool {
    pub fn new(config: WebSearchConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent("Mozilla/5.0 (compatible; newsagent/0.1)")
            .build()?;
        Ok(Self { config, http })
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, reqwest::Error> {
        let html = self.http
            .get(&self.config.endpoint)
            .query(&[("q", query)])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(parse_results(&html, self.config.max_results))
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str { "web_search" }

    fn description(&self) -> &str {
        "Search the internet. Use it for recent events or anything you do not know."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query to look up"
                }
            },
            "required": ["query"]
        })
    }

    async fn call(&self, args: &HashMap<String, Value>) -> Result<String, String> {
        let query = required_str(args, "query")?;
        tracing::info!(query, "web search");

        let hits = self.search(query).await
            .map_err(|e| format!("search request failed: {}", e))?;

        if hits.is_empty() {
            return Ok(format!("No results found for '{}'", query));
        }
        Ok(hits.iter()
            .map(|h| format!("{} — {} ({})", h.title, h.snippet, h.url))
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

/// Pulls result titles, links and snippets out of the HTML results page.
///
/// Each result is an `<a class="result__a" href=…>title</a>` followed by an
/// element with class `result__snippet`.
fn parse_results(html: &str, max_results: usize) -> Vec<SearchHit> {
    let mut hits = Vec::new();

    for chunk in html.split("class=\"result__a\"").skip(1) {
        if hits.len() >= max_results {
            break;
        }

        let url = chunk
            .split("href=\"")
            .nth(1)
            .and_then(|s| s.split('"').next())
            .map(html_decode)
            .unwrap_or_default();

        let title = chunk
            .split_once('>')
            .and_then(|(_, rest)| rest.split("</a>").next())
            .map(|t| html_decode(&strip_tags(t)))
            .unwrap_or_default();

        let snippet = chunk
            .split("result__snippet")
            .nth(1)
            .and_then(|s| s.split_once('>'))
            .and_then(|(_, rest)| rest.split("</a>").next())
            .map(|t| html_decode(&strip_tags(t)))
            .unwrap_or_default();

        if !url.is_empty() && !title.is_empty() {
            hits.push(SearchHit {
                title:   title.trim().to_string(),
                url:     resolve_redirect(&url),
                snippet: snippet.trim().to_string(),
            });
        }
    }

    hits
}

/// DuckDuckGo wraps targets as `//duckduckgo.com/l/?uddg=<encoded>&…`.
/// A target that does not decode to UTF-8 is left wrapped.
fn resolve_redirect(url: &str) -> String {
    let Some((_, query)) = url.split_once("uddg=") else {
        return url.to_string();
    };
    let encoded = query.split('&').next().unwrap_or(query);
    urlencoding::decode(encoded)
        .map(Cow::into_owned)
        .unwrap_or_else(|_| url.to_string())
}

fn strip_tags(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;
    for c in s.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

fn html_decode(s: &str) -> String {
    s.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&#39;", "'")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <div class="result">
          <a rel="nofollow" class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com%2Fa&amp;rut=x">Rust <b>1.90</b> released</a>
          <a class="result__snippet" href="x">The <b>Rust</b> team is happy &amp; proud.</a>
        </div>
        <div class="result">
          <a rel="nofollow" class="result__a" href="https://example.org/b">Second</a>
          <a class="result__snippet" href="y">Another snippet</a>
        </div>
    "#;

    #[test]
    fn parses_titles_links_and_snippets() {
        let hits = parse_results(PAGE, 5);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].title, "Rust 1.90 released");
        assert_eq!(hits[0].url, "https://example.com/a");
        assert_eq!(hits[0].snippet, "The Rust team is happy & proud.");
        assert_eq!(hits[1].url, "https://example.org/b");
    }

    #[test]
    fn respects_max_results() {
        assert_eq!(parse_results(PAGE, 1).len(), 1);
        assert!(parse_results("<html>nothing</html>", 5).is_empty());
    }

    #[test]
    fn redirect_keeps_plus_signs_and_rejects_broken_utf8() {
        assert_eq!(
            resolve_redirect("//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com%2Fsearch%3Fq%3Da+b&rut=x"),
            "https://example.com/search?q=a+b"
        );
        assert_eq!(
            resolve_redirect("//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com%2F%E3%81%82"),
            "https://example.com/あ"
        );

        let truncated = "//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com%2F%E3%81";
        assert_eq!(resolve_redirect(truncated), truncated);
        assert_eq!(resolve_redirect("https://example.org/b"), "https://example.org/b");
    }

    #[tokio::test]
    async fn missing_query_is_reported() {
        let tool = WebSearchTool::new(WebSearchConfig::default()).unwrap();
        let err = tool.call(&HashMap::new()).await.unwrap_err();
        assert!(err.contains("query"));
    }
}
