//! Fetched pages and the fetchers that produce them

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Node};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::collapse_whitespace;

/// Elements whose text never reaches the reader
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template", "svg"];

/// A fetched offers page
#[derive(Debug, Clone)]
pub struct Page {
    pub url: String,
    pub html: String,
}

impl Page {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
        }
    }

    /// Parse into a queryable document. `Html` is not `Send`; keep it out of
    /// async state.
    pub fn document(&self) -> Html {
        Html::parse_document(&self.html)
    }

    /// Visible text, one line per text block, scripts and styles dropped
    pub fn text_view(&self) -> String {
        let document = self.document();
        let mut lines: Vec<String> = Vec::new();
        for node in document.root_element().descendants() {
            let Node::Text(text) = node.value() else {
                continue;
            };
            let hidden = node.ancestors().any(|ancestor| {
                ancestor
                    .value()
                    .as_element()
                    .is_some_and(|e| HIDDEN_ELEMENTS.contains(&e.name()))
            });
            if hidden {
                continue;
            }
            let line = collapse_whitespace(text);
            if !line.is_empty() {
                lines.push(line);
            }
        }
        lines.join("\n")
    }

    /// Contents of every `<script>` element
    pub fn scripts(&self) -> Vec<String> {
        let document = self.document();
        let Ok(selector) = scraper::Selector::parse("script") else {
            return Vec::new();
        };
        document
            .select(&selector)
            .map(|script| script.text().collect::<String>())
            .filter(|content| !content.trim().is_empty())
            .collect()
    }
}

/// Page-fetch collaborator
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Page>;
}

/// Plain HTTP fetcher
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub const USER_AGENT: &'static str =
        "Mozilla/5.0 (compatible; tilbod/0.1; restaurant offer collector)";

    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(Self::USER_AGENT)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Page> {
        let fetch_error = |reason: String| Error::Fetch {
            url: url.to_string(),
            reason,
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(fetch_error(format!("HTTP {}", status)));
        }
        let html = response
            .text()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;
        debug!(url = %url, bytes = html.len(), "Fetched page");
        Ok(Page::new(url, html))
    }
}

/// Serves pages from memory; unknown URLs fail like a network error
#[derive(Debug, Clone, Default)]
pub struct StaticFetcher {
    pages: HashMap<String, String>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<Page> {
        self.pages
            .get(url)
            .map(|html| Page::new(url, html.as_str()))
            .ok_or_else(|| Error::Fetch {
                url: url.to_string(),
                reason: "no such page".into(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HTML: &str = r#"<html><head><style>.a { color: red }</style></head>
        <body><h1>Tilboð</h1><script>var x = "hidden";</script>
        <div><p>Stór pizza   og gos</p><p>2.990 kr.</p></div></body></html>"#;

    #[test]
    fn test_text_view_skips_scripts() {
        let text = Page::new("https://example.is", HTML).text_view();
        assert_eq!(text, "Tilboð\nStór pizza og gos\n2.990 kr.");
    }

    #[test]
    fn test_scripts() {
        let scripts = Page::new("https://example.is", HTML).scripts();
        assert_eq!(scripts, vec![r#"var x = "hidden";"#.to_string()]);
    }

    #[tokio::test]
    async fn test_static_fetcher() {
        let fetcher = StaticFetcher::new().with_page("https://a.is", "<p>a</p>");
        assert_eq!(fetcher.fetch("https://a.is").await.unwrap().html, "<p>a</p>");
        assert!(matches!(
            fetcher.fetch("https://b.is").await,
            Err(Error::Fetch { .. })
        ));
    }
}
