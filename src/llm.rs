use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use reqwest::Client;
use std::time::Duration;

use crate::config::ModelSettings;
use crate::error::{Result, AppError};

/// A remote model that turns a prompt into text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, api_key: &str, prompt: &str) -> Result<String>;
}

#[derive(Serialize)]
struct Parameters {
    max_new_tokens: u32,
    temperature: f32,
    return_full_text: bool,
}

#[derive(Serialize)]
struct Options {
    wait_for_model: bool,
}

#[derive(Serialize)]
struct GenerationRequest<'a> {
    inputs: &'a str,
    parameters: Parameters,
    options: Options,
}

#[derive(Deserialize)]
struct Generation {
    generated_text: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum GenerationResponse {
    Batch(Vec<Generation>),
    Single(Generation),
    Error { error: String },
}

/// Client for a model served by the Hugging Face inference API.
pub struct HuggingFaceEndpoint {
    client: Client,
    endpoint_url: String,
    max_new_tokens: u32,
    temperature: f32,
}

impl HuggingFaceEndpoint {
    pub fn new(settings: &ModelSettings, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint_url: format!(
                "{}/{}",
                settings.inference_url.trim_end_matches('/'),
                settings.repo_id
            ),
            max_new_tokens: settings.max_new_tokens,
            temperature: settings.temperature,
        })
    }

    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }
}

#[async_trait]
impl TextGenerator for HuggingFaceEndpoint {
    async fn generate(&self, api_key: &str, prompt: &str) -> Result<String> {
        let body = GenerationRequest {
            inputs: prompt,
            parameters: Parameters {
                max_new_tokens: self.max_new_tokens,
                temperature: self.temperature,
                return_full_text: false,
            },
            options: Options { wait_for_model: true },
        };

        let res = self
            .client
            .post(&self.endpoint_url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| match AppError::from(e) {
                AppError::Fetch(msg) => AppError::Llm(msg),
                other => other,
            })?;

        let status = res.status();
        let text = res
            .text()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to read endpoint response: {}", e)))?;

        let parsed: Option<GenerationResponse> = serde_json::from_str(&text).ok();
        let generated = match parsed {
            Some(GenerationResponse::Error { error }) => {
                return Err(AppError::Llm(format!("Endpoint returned HTTP {}: {}", status, error)));
            }
            _ if !status.is_success() => {
                return Err(AppError::Llm(format!("Endpoint returned HTTP {}: {}", status, text.trim())));
            }
            Some(GenerationResponse::Single(generation)) => generation.generated_text,
            Some(GenerationResponse::Batch(generations)) => generations
                .into_iter()
                .next()
                .map(|g| g.generated_text)
                .ok_or_else(|| AppError::Llm("Endpoint returned no generations".to_string()))?,
            None => {
                return Err(AppError::Llm("Invalid response format from endpoint".to_string()));
            }
        };

        let reply = generated.trim().to_string();
        if reply.is_empty() {
            return Err(AppError::Llm("Endpoint returned an empty summary".to_string()));
        }

        Ok(reply)
    }
}
