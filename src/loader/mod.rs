pub mod web;
pub mod youtube;

use async_trait::async_trait;
use serde::Serialize;

use crate::document::Document;
use crate::error::Result;

pub use web::UrlLoader;
pub use youtube::YoutubeLoader;

/// Fetches a URL and turns it into documents.
#[async_trait]
pub trait ContentLoader: Send + Sync {
    async fn load(&self, url: &str) -> Result<Vec<Document>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoaderKind {
    Youtube,
    Web,
}

impl LoaderKind {
    /// Any URL containing `youtube.com`, wherever it appears, goes to the
    /// YouTube loader.
    pub fn for_url(url: &str) -> Self {
        if url.contains("youtube.com") {
            LoaderKind::Youtube
        } else {
            LoaderKind::Web
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LoaderKind::Youtube => "youtube",
            LoaderKind::Web => "web",
        }
    }
}
