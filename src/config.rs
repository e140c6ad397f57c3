use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;
use crate::error::{AppError, Result};

pub const DEFAULT_MODEL_ID: &str = "mistralai/Mistral-7B-Instruct-v0.3";
pub const DEFAULT_INFERENCE_URL: &str = "https://api-inference.huggingface.co/models";
pub const DEFAULT_PROMPT: &str =
    "Provide a summary of the following content in 300 words:\nContent: {text}";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 13_5_1) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/116.0.0.0 Safari/537.36";

/// Settings for the hosted text-generation endpoint.
#[derive(Clone, Debug)]
pub struct ModelSettings {
    pub repo_id: String,
    pub inference_url: String,
    pub max_new_tokens: u32,
    pub temperature: f32,
    pub prompt_template: String,
}

/// Settings shared by the content loaders.
#[derive(Clone, Debug)]
pub struct LoaderSettings {
    pub user_agent: String,
    /// When false the generic loader accepts any TLS certificate.
    pub ssl_verify: bool,
    pub youtube_languages: Vec<String>,
    pub add_video_info: bool,
    pub fetch_timeout: Duration,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: SocketAddr,
    /// `None` when `HF_TOKEN` is unset or blank; reported on every submission.
    pub hf_token: Option<String>,
    pub model: ModelSettings,
    pub loader: LoaderSettings,
    pub request_timeout: Duration,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load environment variables from .env file if it exists
        dotenv::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let host = var("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = parse_or(var("PORT"), "PORT", 3000u16)?;
        let ip = IpAddr::from_str(&host).map_err(|e| AppError::Config(format!("Invalid host address: {}", e)))?;

        let prompt_template = lookup("SUMMARY_PROMPT")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PROMPT.to_string());

        let model = ModelSettings {
            repo_id: var("HF_MODEL_ID").unwrap_or_else(|| DEFAULT_MODEL_ID.to_string()),
            inference_url: var("HF_INFERENCE_URL").unwrap_or_else(|| DEFAULT_INFERENCE_URL.to_string()),
            max_new_tokens: parse_or(var("SUMMARY_MAX_NEW_TOKENS"), "SUMMARY_MAX_NEW_TOKENS", 150)?,
            temperature: parse_or(var("SUMMARY_TEMPERATURE"), "SUMMARY_TEMPERATURE", 0.7)?,
            prompt_template,
        };

        let youtube_languages = var("YOUTUBE_LANGUAGES")
            .map(|langs| {
                langs
                    .split(',')
                    .map(|l| l.trim().to_string())
                    .filter(|l| !l.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|langs| !langs.is_empty())
            .unwrap_or_else(|| vec!["en".to_string()]);

        let loader = LoaderSettings {
            user_agent: var("LOADER_USER_AGENT").unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            ssl_verify: parse_bool(var("LOADER_SSL_VERIFY"), "LOADER_SSL_VERIFY", false)?,
            youtube_languages,
            add_video_info: parse_bool(var("YOUTUBE_VIDEO_INFO"), "YOUTUBE_VIDEO_INFO", true)?,
            fetch_timeout: Duration::from_secs(parse_or(var("FETCH_TIMEOUT_SECS"), "FETCH_TIMEOUT_SECS", 30)?),
        };

        Ok(Config {
            server_addr: SocketAddr::new(ip, port),
            hf_token: var("HF_TOKEN"),
            model,
            loader,
            request_timeout: Duration::from_secs(parse_or(var("REQUEST_TIMEOUT_SECS"), "REQUEST_TIMEOUT_SECS", 90)?),
        })
    }
}

fn parse_or<T>(value: Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|e| AppError::Config(format!("Invalid {}: {}", key, e))),
        None => Ok(default),
    }
}

fn parse_bool(value: Option<String>, key: &str, default: bool) -> Result<bool> {
    match value.as_deref().map(str::to_ascii_lowercase).as_deref() {
        None => Ok(default),
        Some("1" | "true" | "yes" | "on") => Ok(true),
        Some("0" | "false" | "no" | "off") => Ok(false),
        Some(other) => Err(AppError::Config(format!("Invalid {}: {}", key, other))),
    }
}
