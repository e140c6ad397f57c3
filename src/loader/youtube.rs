use async_trait::async_trait;
use std::time::Duration;
use url::Url;
use yt_transcript_rs::api::YouTubeTranscriptApi;

use crate::config::LoaderSettings;
use crate::document::Document;
use crate::error::{AppError, Result};
use super::ContentLoader;

const YOUTUBE_HOSTS: [&str; 6] = [
    "youtube.com",
    "www.youtube.com",
    "m.youtube.com",
    "music.youtube.com",
    "youtube-nocookie.com",
    "www.youtube-nocookie.com",
];

const SHORT_HOST: &str = "youtu.be";

const ID_PATH_PREFIXES: [&str; 4] = ["embed", "v", "shorts", "live"];

/// Loads the transcript of a YouTube video, optionally with its details.
pub struct YoutubeLoader {
    languages: Vec<String>,
    add_video_info: bool,
    fetch_timeout: Duration,
}

/// Video details copied into the transcript document's metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoInfo {
    pub title: String,
    pub description: String,
    pub author: String,
    pub channel_id: String,
    pub view_count: String,
    pub length: String,
}

impl YoutubeLoader {
    pub fn new(settings: &LoaderSettings) -> Self {
        Self {
            languages: settings.youtube_languages.clone(),
            add_video_info: settings.add_video_info,
            fetch_timeout: settings.fetch_timeout,
        }
    }
}

#[async_trait]
impl ContentLoader for YoutubeLoader {
    async fn load(&self, url: &str) -> Result<Vec<Document>> {
        let video_id = extract_video_id(url)?;
        let api = YouTubeTranscriptApi::new(None, None, None)
            .map_err(|e| AppError::Youtube(format!("Failed to initialise transcript client: {}", e)))?;

        let languages: Vec<&str> = self.languages.iter().map(String::as_str).collect();
        let transcript = within(self.fetch_timeout, "transcript", api.fetch_transcript(&video_id, &languages, false))
            .await?
            .map_err(|e| AppError::Youtube(format!("Could not retrieve a transcript for video {}: {}", video_id, e)))?;

        let info = if self.add_video_info {
            let details = within(self.fetch_timeout, "video details", api.fetch_video_details(&video_id))
                .await?
                .map_err(|e| AppError::Youtube(format!("Could not retrieve details for video {}: {}", video_id, e)))?;
            Some(VideoInfo {
                title: details.title.to_string(),
                description: details.short_description.to_string(),
                author: details.author.to_string(),
                channel_id: details.channel_id.to_string(),
                view_count: details.view_count.to_string(),
                length: details.length_seconds.to_string(),
            })
        } else {
            None
        };

        let document = transcript_document(&video_id, transcript.text(), info);
        tracing::debug!(video_id = %video_id, words = document.word_count(), "transcript loaded");
        Ok(vec![document])
    }
}

/// Bounds one YouTube call by the per-call fetch timeout.
async fn within<F: Future>(limit: Duration, what: &str, call: F) -> Result<F::Output> {
    tokio::time::timeout(limit, call).await.map_err(|_| {
        AppError::Timeout(format!("YouTube {} request exceeded {} seconds", what, limit.as_secs()))
    })
}

/// Builds the transcript document. Details are only added when loaded.
pub fn transcript_document(video_id: &str, text: String, info: Option<VideoInfo>) -> Document {
    let document = Document::new(text).with_metadata("source", video_id);
    match info {
        Some(info) => document
            .with_metadata("title", info.title)
            .with_metadata("description", info.description)
            .with_metadata("author", info.author)
            .with_metadata("channel_id", info.channel_id)
            .with_metadata("view_count", info.view_count)
            .with_metadata("length", info.length),
        None => document,
    }
}

/// Finds the video id in the usual YouTube URL shapes.
pub fn extract_video_id(raw: &str) -> Result<String> {
    let not_found = || AppError::Youtube(format!("Could not determine the video ID for the URL {}", raw));

    let url = Url::parse(raw.trim()).map_err(|_| not_found())?;
    let host = url.host_str().ok_or_else(not_found)?.to_ascii_lowercase();
    let mut segments = url.path_segments().into_iter().flatten().filter(|s| !s.is_empty());

    let id = if host == SHORT_HOST {
        segments.next().map(str::to_string)
    } else if YOUTUBE_HOSTS.contains(&host.as_str()) {
        match segments.next() {
            Some("watch") => url
                .query_pairs()
                .find(|(key, _)| key == "v")
                .map(|(_, value)| value.into_owned()),
            Some(prefix) if ID_PATH_PREFIXES.contains(&prefix) => segments.next().map(str::to_string),
            _ => None,
        }
    } else {
        None
    };

    id.filter(|id| is_plausible_id(id)).ok_or_else(not_found)
}

fn is_plausible_id(id: &str) -> bool {
    !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn info() -> VideoInfo {
        VideoInfo {
            title: "Rust in 100 Seconds".to_string(),
            description: "A quick tour".to_string(),
            author: "Fireship".to_string(),
            channel_id: "UCsBjURrPoezykLs9EqgamOA".to_string(),
            view_count: "1200000".to_string(),
            length: "156".to_string(),
        }
    }

    #[test]
    fn transcript_document_carries_video_details() {
        let document = transcript_document("5C_HPTJg5ek", "hello rust".to_string(), Some(info()));

        assert_eq!(document.page_content, "hello rust");
        assert_eq!(document.metadata["source"], json!("5C_HPTJg5ek"));
        assert_eq!(document.metadata["title"], json!("Rust in 100 Seconds"));
        assert_eq!(document.metadata["description"], json!("A quick tour"));
        assert_eq!(document.metadata["author"], json!("Fireship"));
        assert_eq!(document.metadata["channel_id"], json!("UCsBjURrPoezykLs9EqgamOA"));
        assert_eq!(document.metadata["view_count"], json!("1200000"));
        assert_eq!(document.metadata["length"], json!("156"));
    }

    #[test]
    fn transcript_document_without_details_has_only_source() {
        let document = transcript_document("5C_HPTJg5ek", "hello rust".to_string(), None);

        assert_eq!(document.metadata.len(), 1);
        assert_eq!(document.metadata["source"], json!("5C_HPTJg5ek"));
        assert!(!document.metadata.contains_key("title"));
    }

    #[tokio::test]
    async fn slow_youtube_call_times_out() {
        let slow = tokio::time::sleep(Duration::from_secs(5));
        let err = within(Duration::from_millis(20), "transcript", slow).await.unwrap_err();

        assert!(matches!(err, AppError::Timeout(_)));
        assert!(err.to_string().contains("YouTube transcript request"));
    }

    #[test]
    fn extracts_ids() {
        let cases = [
            ("https://www.youtube.com/watch?v=abc123", "abc123"),
            ("https://youtube.com/watch?feature=share&v=dQw4w9WgXcQ", "dQw4w9WgXcQ"),
            ("https://m.youtube.com/watch?v=a-b_c", "a-b_c"),
            ("https://www.youtube.com/embed/abc123?start=10", "abc123"),
            ("https://www.youtube.com/shorts/abc123def45", "abc123def45"),
            ("https://www.youtube.com/live/xyz789", "xyz789"),
            ("https://www.youtube.com/v/xyz789", "xyz789"),
            ("https://youtu.be/dQw4w9WgXcQ?t=30", "dQw4w9WgXcQ"),
            ("https://www.youtube-nocookie.com/embed/abc123", "abc123"),
        ];
        for (url, expected) in cases {
            assert_eq!(extract_video_id(url).unwrap(), expected, "{}", url);
        }
    }

    #[test]
    fn rejects_urls_without_an_id() {
        for url in [
            "https://www.youtube.com/",
            "https://www.youtube.com/watch",
            "https://www.youtube.com/playlist?list=PLrAXtmRdnEQy",
            "https://www.youtube.com/watch?v=",
            "https://notyoutube.com/watch?v=abc123",
            "https://example.com/?ref=youtube.com",
            "https://www.youtube.com/watch?v=<script>",
        ] {
            let err = extract_video_id(url).unwrap_err();
            assert!(matches!(err, AppError::Youtube(_)), "{}", url);
            assert!(err.to_string().contains("Could not determine the video ID"), "{}", url);
        }
    }
}
