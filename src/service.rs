use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::llm::{HuggingFaceEndpoint, TextGenerator};
use crate::loader::{ContentLoader, LoaderKind, UrlLoader, YoutubeLoader};
use crate::summarize::{PromptTemplate, SummarizeChain};
use crate::validate::validate_url;

/// One submission: the URL typed by the user and the credential to call the
/// model with. Lives for a single request.
#[derive(Debug, Clone)]
pub struct SummarizationRequest {
    pub url: String,
    pub api_key: String,
}

impl SummarizationRequest {
    pub fn new(url: impl Into<String>, api_key: Option<&str>) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.unwrap_or_default().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub url: String,
    pub loader: LoaderKind,
    pub text: String,
    pub word_count: usize,
    pub documents: Vec<Map<String, Value>>,
}

/// Validate, load, summarize.
pub struct Summarizer {
    youtube: Arc<dyn ContentLoader>,
    web: Arc<dyn ContentLoader>,
    chain: SummarizeChain,
}

impl Summarizer {
    pub fn from_config(config: &Config) -> Result<Self> {
        let prompt = PromptTemplate::new(config.model.prompt_template.clone())?;
        let llm = HuggingFaceEndpoint::new(&config.model, config.loader.fetch_timeout)?;

        Ok(Self::new(
            Arc::new(YoutubeLoader::new(&config.loader)),
            Arc::new(UrlLoader::new(&config.loader)?),
            Arc::new(llm),
            prompt,
        ))
    }

    pub fn new(
        youtube: Arc<dyn ContentLoader>,
        web: Arc<dyn ContentLoader>,
        llm: Arc<dyn TextGenerator>,
        prompt: PromptTemplate,
    ) -> Self {
        Self {
            youtube,
            web,
            chain: SummarizeChain::new(llm, prompt),
        }
    }

    /// Runs the whole flow for one request.
    ///
    /// The credential and the URL are checked before any loader is touched, so
    /// validation failures never reach the network.
    pub async fn summarize(&self, request: &SummarizationRequest) -> Result<Summary> {
        if request.api_key.trim().is_empty() {
            return Err(AppError::MissingCredential);
        }
        validate_url(&request.url)?;

        let url = request.url.trim();
        let kind = LoaderKind::for_url(url);
        let loader = match kind {
            LoaderKind::Youtube => &self.youtube,
            LoaderKind::Web => &self.web,
        };

        tracing::info!(url, loader = kind.as_str(), "loading content");
        let load_start = Instant::now();
        let docs = loader.load(url).await.inspect_err(|err| {
            tracing::warn!(url, loader = kind.as_str(), error = %err, "loader failed");
        })?;
        tracing::info!(
            url,
            documents = docs.len(),
            elapsed_ms = load_start.elapsed().as_millis() as u64,
            "content loaded"
        );

        let llm_start = Instant::now();
        let text = self.chain.run(&request.api_key, &docs).await?;
        tracing::info!(
            url,
            elapsed_ms = llm_start.elapsed().as_millis() as u64,
            "summary generated"
        );

        Ok(Summary {
            url: url.to_string(),
            loader: kind,
            word_count: text.split_whitespace().count(),
            text,
            documents: docs.into_iter().map(|doc| doc.metadata).collect(),
        })
    }
}
