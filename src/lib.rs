pub mod api;
pub mod config;
pub mod document;
pub mod error;
pub mod llm;
pub mod loader;
pub mod service;
pub mod summarize;
pub mod validate;

use std::sync::Arc;
use config::Config;
use service::Summarizer;

/// Application state that will be shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub summarizer: Arc<Summarizer>,
}

impl AppState {
    pub fn from_config(config: Config) -> error::Result<Self> {
        let summarizer = Summarizer::from_config(&config)?;
        Ok(Self {
            config: Arc::new(config),
            summarizer: Arc::new(summarizer),
        })
    }
}
