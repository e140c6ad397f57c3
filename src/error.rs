use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
};

use crate::api::response::ApiResponse;

pub const MISSING_TOKEN_MESSAGE: &str =
    "HuggingFace API token is missing. Please set it in the .env file.";
pub const EMPTY_URL_MESSAGE: &str = "Please provide a URL to summarize.";
pub const INVALID_URL_MESSAGE: &str =
    "Please enter a valid URL. It can be a YouTube video URL or a website URL.";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{}", MISSING_TOKEN_MESSAGE)]
    MissingCredential,

    #[error("{}", EMPTY_URL_MESSAGE)]
    EmptyUrl,

    #[error("{}", INVALID_URL_MESSAGE)]
    InvalidUrl,

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("Failed to fetch data: {0}")]
    Fetch(String),

    #[error("Failed to load YouTube video: {0}")]
    Youtube(String),

    #[error("Error parsing content: {0}")]
    Parse(String),

    #[error("LLM processing error: {0}")]
    Llm(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Errors caught before any loader is built or any network call is made.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AppError::MissingCredential
                | AppError::EmptyUrl
                | AppError::InvalidUrl
                | AppError::InvalidBody(_)
        )
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingCredential => StatusCode::SERVICE_UNAVAILABLE,
            AppError::EmptyUrl | AppError::InvalidUrl | AppError::InvalidBody(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Fetch(_) | AppError::Youtube(_) | AppError::Llm(_) => StatusCode::BAD_GATEWAY,
            AppError::Parse(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        ApiResponse::<()>::failure(&self).into_response()
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::Timeout(err.to_string())
        } else {
            AppError::Fetch(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
