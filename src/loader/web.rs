use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::{Client, ClientBuilder, header::CONTENT_TYPE};
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;

use crate::config::LoaderSettings;
use crate::document::Document;
use crate::error::{AppError, Result};
use super::ContentLoader;

// Create static selectors to avoid recompiling them each time
static BODY_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("body").expect("Failed to parse body selector")
});

static TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("title").expect("Failed to parse title selector")
});

static BLOCK_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("h1, h2, h3, h4, h5, h6, p, li, pre, blockquote, td, th, dt, dd, figcaption")
        .expect("Failed to parse block selector")
});

const HIDDEN_TAGS: [&str; 6] = ["script", "style", "noscript", "template", "svg", "head"];

/// Single-page loader for anything that is not a YouTube video.
pub struct UrlLoader {
    client: Client,
    ssl_verify: bool,
}

pub struct FetchedPage {
    pub content_type: Option<String>,
    pub body: String,
}

pub struct ExtractedPage {
    pub title: Option<String>,
    pub text: String,
}

impl UrlLoader {
    pub fn new(settings: &LoaderSettings) -> Result<Self> {
        if !settings.ssl_verify {
            tracing::warn!("TLS certificate verification is disabled for page fetches (LOADER_SSL_VERIFY=false)");
        }

        let client = ClientBuilder::new()
            .user_agent(settings.user_agent.as_str())
            .timeout(settings.fetch_timeout)
            .connect_timeout(settings.fetch_timeout.min(Duration::from_secs(10)))
            .danger_accept_invalid_certs(!settings.ssl_verify)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            ssl_verify: settings.ssl_verify,
        })
    }

    pub async fn fetch_page(&self, url: &str) -> Result<FetchedPage> {
        if !self.ssl_verify {
            tracing::warn!(url, "fetching without TLS certificate verification");
        }
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Fetch(format!("{} returned HTTP {}", url, status)));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_ascii_lowercase());
        let body = response.text().await?;

        Ok(FetchedPage { content_type, body })
    }
}

#[async_trait]
impl ContentLoader for UrlLoader {
    async fn load(&self, url: &str) -> Result<Vec<Document>> {
        let page = self.fetch_page(url).await?;

        let is_plain_text = page
            .content_type
            .as_deref()
            .is_some_and(|ct| ct.starts_with("text/plain"));

        let document = if is_plain_text {
            Document::new(normalize_lines(&page.body))
        } else {
            let extracted = extract_text(&page.body);
            let mut document = Document::new(extracted.text);
            if let Some(title) = extracted.title {
                document = document.with_metadata("title", title);
            }
            document
        };

        tracing::debug!(url, words = document.word_count(), "page loaded");
        Ok(vec![document.with_metadata("source", url)])
    }
}

/// Pulls the readable text out of an HTML document.
///
/// Block-level elements become one line each. Pages without any of them fall
/// back to every visible text node under `<body>`.
pub fn extract_text(html: &str) -> ExtractedPage {
    let document = Html::parse_document(html);

    let title = document
        .select(&TITLE_SELECTOR)
        .next()
        .map(|t| collapse_whitespace(&t.text().collect::<String>()))
        .filter(|t| !t.is_empty());

    let blocks: Vec<String> = document
        .select(&BLOCK_SELECTOR)
        .filter(|el| !is_hidden(el) && !has_block_ancestor(el))
        .map(|el| collapse_whitespace(&visible_text(el, " ")))
        .filter(|text| !text.is_empty())
        .collect();

    let text = if blocks.is_empty() {
        document
            .select(&BODY_SELECTOR)
            .next()
            .map(|body| normalize_lines(&visible_text(body, "\n")))
            .unwrap_or_default()
    } else {
        blocks.join("\n\n")
    };

    ExtractedPage { title, text }
}

fn visible_text(element: ElementRef<'_>, separator: &str) -> String {
    let mut parts = Vec::new();
    for node in element.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|a| HIDDEN_TAGS.contains(&a.value().name()));
        if !hidden && !text.trim().is_empty() {
            parts.push(text.trim().to_string());
        }
    }
    parts.join(separator)
}

fn is_hidden(element: &ElementRef<'_>) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|a| HIDDEN_TAGS.contains(&a.value().name()))
}

fn has_block_ancestor(element: &ElementRef<'_>) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|a| BLOCK_SELECTOR.matches(&a))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Trims every line and drops the empty ones.
pub fn normalize_lines(text: &str) -> String {
    let mut result = String::with_capacity(text.len());

    for line in text.lines() {
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            if !result.is_empty() {
                result.push('\n');
            }
            result.push_str(trimmed);
        }
    }

    result
}
