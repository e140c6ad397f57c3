use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::Value;
use tokio::net::TcpListener;
use url_summarizer::api::page::{BUTTON_LABEL, PAGE_TITLE};
use url_summarizer::api::routes::create_router;
use url_summarizer::config::{Config, DEFAULT_PROMPT};
use url_summarizer::document::Document;
use url_summarizer::error::{
    AppError, Result, EMPTY_URL_MESSAGE, INVALID_URL_MESSAGE, MISSING_TOKEN_MESSAGE,
};
use url_summarizer::llm::TextGenerator;
use url_summarizer::loader::ContentLoader;
use url_summarizer::service::Summarizer;
use url_summarizer::summarize::PromptTemplate;
use url_summarizer::AppState;

#[derive(Default)]
struct CountingLoader {
    calls: AtomicUsize,
    fail_with_timeout: bool,
}

#[async_trait]
impl ContentLoader for CountingLoader {
    async fn load(&self, url: &str) -> Result<Vec<Document>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_with_timeout {
            return Err(AppError::Timeout("network timeout".to_string()));
        }
        Ok(vec![Document::new(format!("content of {}", url)).with_metadata("source", url)])
    }
}

struct StaticGenerator;

#[async_trait]
impl TextGenerator for StaticGenerator {
    async fn generate(&self, _api_key: &str, _prompt: &str) -> Result<String> {
        Ok("A concise <summary> of the page.".to_string())
    }
}

struct TestApp {
    base: String,
    client: reqwest::Client,
    youtube: Arc<CountingLoader>,
    web: Arc<CountingLoader>,
}

impl TestApp {
    fn loader_calls(&self) -> usize {
        self.youtube.calls.load(Ordering::SeqCst) + self.web.calls.load(Ordering::SeqCst)
    }

    async fn submit_form(&self, url: &str) -> String {
        self.client
            .post(format!("{}/summarize", self.base))
            .form(&[("url", url)])
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap()
    }

    async fn submit_json(&self, url: &str) -> (u16, Value) {
        let res = self
            .client
            .post(format!("{}/api/summarize", self.base))
            .json(&serde_json::json!({ "url": url }))
            .send()
            .await
            .unwrap();
        let status = res.status().as_u16();
        (status, res.json().await.unwrap())
    }
}

async fn spawn_app(token: Option<&str>, failing_web_loader: bool) -> TestApp {
    let token = token.map(str::to_string);
    let config = Config::from_lookup(|key| match key {
        "HF_TOKEN" => token.clone(),
        _ => None,
    })
    .unwrap();

    let youtube = Arc::new(CountingLoader::default());
    let web = Arc::new(CountingLoader {
        calls: AtomicUsize::new(0),
        fail_with_timeout: failing_web_loader,
    });
    let summarizer = Summarizer::new(
        youtube.clone(),
        web.clone(),
        Arc::new(StaticGenerator),
        PromptTemplate::new(DEFAULT_PROMPT).unwrap(),
    );
    let state = AppState {
        config: Arc::new(config),
        summarizer: Arc::new(summarizer),
    };

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, create_router(state)).await.unwrap();
    });

    TestApp {
        base: format!("http://{}", addr),
        client: reqwest::Client::new(),
        youtube,
        web,
    }
}

#[tokio::test]
async fn index_renders_form() {
    let app = spawn_app(Some("hf_test"), false).await;
    let body = app.client.get(&app.base).send().await.unwrap().text().await.unwrap();

    assert!(body.contains(PAGE_TITLE));
    assert!(body.contains(BUTTON_LABEL));
    assert!(!body.contains(MISSING_TOKEN_MESSAGE));
}

#[tokio::test]
async fn index_warns_about_missing_token() {
    let app = spawn_app(None, false).await;
    let body = app.client.get(&app.base).send().await.unwrap().text().await.unwrap();

    assert!(body.contains(MISSING_TOKEN_MESSAGE));
}

#[tokio::test]
async fn form_summarizes_web_page() {
    let app = spawn_app(Some("hf_test"), false).await;
    let body = app.submit_form("https://example.com/article").await;

    assert!(body.contains("region success"));
    assert!(body.contains("A concise &lt;summary&gt; of the page."));
    assert_eq!(app.web.calls.load(Ordering::SeqCst), 1);
    assert_eq!(app.youtube.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn form_rejects_blank_and_invalid_urls() {
    let app = spawn_app(Some("hf_test"), false).await;

    let body = app.submit_form("   ").await;
    assert!(body.contains(EMPTY_URL_MESSAGE));

    let body = app.submit_form("not a url").await;
    assert!(body.contains(INVALID_URL_MESSAGE));
    assert!(body.contains("value=\"not a url\""));

    assert_eq!(app.loader_calls(), 0);
}

#[tokio::test]
async fn form_without_token_makes_no_calls() {
    let app = spawn_app(None, false).await;
    let body = app.submit_form("https://www.youtube.com/watch?v=abc123").await;

    assert!(body.contains(MISSING_TOKEN_MESSAGE));
    assert!(!body.contains("region success"));
    assert_eq!(app.loader_calls(), 0);
}

#[tokio::test]
async fn form_shows_loader_exception_and_stays_usable() {
    let app = spawn_app(Some("hf_test"), true).await;

    let body = app.submit_form("https://example.com/slow").await;
    assert!(body.contains("region exception"));
    assert!(body.contains("Exception: Timed out: network timeout"));
    assert!(body.contains(BUTTON_LABEL));

    // The next submission is handled normally.
    let body = app.submit_form("https://www.youtube.com/watch?v=abc123").await;
    assert!(body.contains("region success"));
}

#[tokio::test]
async fn json_api_success_envelope() {
    let app = spawn_app(Some("hf_test"), false).await;
    let (status, body) = app.submit_json("https://www.youtube.com/watch?v=abc123").await;

    assert_eq!(status, 200);
    assert_eq!(body["meta"]["status"], "success");
    assert_eq!(body["data"]["loader"], "youtube");
    assert_eq!(body["data"]["summary"], "A concise <summary> of the page.");
    assert_eq!(body["data"]["word_count"], 6);
    assert_eq!(
        body["data"]["documents"][0]["source"],
        "https://www.youtube.com/watch?v=abc123"
    );
}

#[tokio::test]
async fn json_api_error_envelopes() {
    let app = spawn_app(Some("hf_test"), true).await;

    let (status, body) = app.submit_json("").await;
    assert_eq!(status, 400);
    assert_eq!(body["meta"]["error_kind"], "validation");
    assert_eq!(body["meta"]["message"], EMPTY_URL_MESSAGE);
    assert!(body["data"].is_null());

    let (status, body) = app.submit_json("https://example.com/slow").await;
    assert_eq!(status, 504);
    assert_eq!(body["meta"]["error_kind"], "runtime");

    let app = spawn_app(None, false).await;
    let (status, body) = app.submit_json("https://example.com/").await;
    assert_eq!(status, 503);
    assert_eq!(body["meta"]["message"], MISSING_TOKEN_MESSAGE);
    assert_eq!(app.loader_calls(), 0);
}

#[tokio::test]
async fn json_api_rejects_unparseable_bodies_with_envelope() {
    let app = spawn_app(Some("hf_test"), false).await;
    let endpoint = format!("{}/api/summarize", app.base);

    let bodies = [
        ("text/plain", "url=https://example.com/"),
        ("application/json", "{\"url\": "),
    ];
    for (content_type, payload) in bodies {
        let res = app
            .client
            .post(&endpoint)
            .header("content-type", content_type)
            .body(payload)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status().as_u16(), 400, "{}", content_type);

        let body: Value = res.json().await.unwrap();
        assert_eq!(body["meta"]["status"], "error");
        assert_eq!(body["meta"]["error_kind"], "validation");
        assert!(body["data"].is_null());
        let message = body["meta"]["message"].as_str().unwrap();
        assert!(message.starts_with("Invalid request body"), "{}", message);
    }

    assert_eq!(app.loader_calls(), 0);
}

#[tokio::test]
async fn health_reports_credential_state() {
    let app = spawn_app(None, false).await;
    let body: Value = app
        .client
        .get(format!("{}/health", app.base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["credential_configured"], false);
}
