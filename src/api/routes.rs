use axum::{
    routing::{get, post},
    Router,
    extract::{rejection::JsonRejection, Form, Json, State},
    response::{Html, IntoResponse},
};
use tower_http::cors::{CorsLayer, Any};
use std::time::Instant;

use crate::error::{Result, AppError};
use crate::api::models::{HealthResponse, SummarizeRequest, SummarizeResponse};
use crate::api::page::{self, Outcome, PageView};
use crate::api::response::ApiResponse;
use crate::service::{SummarizationRequest, Summary};
use crate::AppState;

pub fn create_router(app_state: AppState) -> Router {
    let api = Router::new()
        .route("/api/summarize", post(api_summarize_handler))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    Router::new()
        .route("/", get(index_handler))
        .route("/summarize", post(form_handler))
        .route("/health", get(health_handler))
        .merge(api)
        .with_state(app_state)
}

async fn index_handler(State(state): State<AppState>) -> Result<Html<String>> {
    render_page(&state, "", Outcome::Idle)
}

async fn form_handler(
    State(state): State<AppState>,
    Form(req): Form<SummarizeRequest>,
) -> Result<Html<String>> {
    let result = run_summarization(&state, &req.url).await;
    render_page(&state, &req.url, Outcome::from_result(&result))
}

async fn api_summarize_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SummarizeRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(req) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            tracing::info!(error = %rejection.body_text(), "rejected request body");
            return AppError::InvalidBody(rejection.body_text()).into_response();
        }
    };

    match run_summarization(&state, &req.url).await {
        Ok(summary) => ApiResponse::success(SummarizeResponse::from(summary)).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    ApiResponse::success(HealthResponse {
        status: "ok",
        credential_configured: state.config.hf_token.is_some(),
    })
}

fn render_page(state: &AppState, url: &str, outcome: Outcome) -> Result<Html<String>> {
    page::render(&PageView {
        url,
        outcome,
        credential_configured: state.config.hf_token.is_some(),
        ssl_verify: state.config.loader.ssl_verify,
    })
}

/// Runs one submission under the overall request timeout and logs the outcome.
async fn run_summarization(state: &AppState, url: &str) -> Result<Summary> {
    let request = SummarizationRequest::new(url, state.config.hf_token.as_deref());
    let timeout = state.config.request_timeout;
    tracing::info!(url = %request.url.trim(), "processing request");
    let start_time = Instant::now();

    let result = match tokio::time::timeout(timeout, state.summarizer.summarize(&request)).await {
        Ok(result) => result,
        Err(_) => Err(AppError::Timeout(format!(
            "Request processing timed out after {} seconds",
            timeout.as_secs()
        ))),
    };

    let elapsed_ms = start_time.elapsed().as_millis() as u64;
    match &result {
        Ok(summary) => tracing::info!(
            url = %summary.url,
            loader = summary.loader.as_str(),
            words = summary.word_count,
            elapsed_ms,
            "request completed"
        ),
        Err(err) if err.is_validation() => tracing::info!(error = %err, elapsed_ms, "request rejected"),
        Err(err) => tracing::error!(error = %err, elapsed_ms, "request failed"),
    }

    result
}
