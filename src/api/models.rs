use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use chrono::{DateTime, Utc};

use crate::loader::LoaderKind;
use crate::service::Summary;

/// Body of `POST /api/summarize`, also used for the HTML form.
#[derive(Deserialize)]
pub struct SummarizeRequest {
    #[serde(default)]
    pub url: String,
}

#[derive(Serialize)]
pub struct SummarizeResponse {
    pub url: String,
    pub summary: String,
    pub loader: LoaderKind,
    pub word_count: usize,
    pub documents: Vec<Map<String, Value>>,
    pub summarized_at: DateTime<Utc>,
}

impl From<Summary> for SummarizeResponse {
    fn from(summary: Summary) -> Self {
        Self {
            url: summary.url,
            summary: summary.text,
            loader: summary.loader,
            word_count: summary.word_count,
            documents: summary.documents,
            summarized_at: Utc::now(),
        }
    }
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub credential_configured: bool,
}
