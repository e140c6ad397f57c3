use serde::Serialize;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};

use crate::error::AppError;

/// Envelope for every JSON response: `{ "data": ..., "meta": ... }`.
#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub data: Option<T>,
    pub meta: ResponseMeta,
}

#[derive(Serialize)]
pub struct ResponseMeta {
    pub status: &'static str,
    pub status_code: u16,
    pub timestamp: DateTime<Utc>,
    /// `validation` or `runtime`; absent on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<&'static str>,
    pub message: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            meta: ResponseMeta {
                status: "success",
                status_code: StatusCode::OK.as_u16(),
                timestamp: Utc::now(),
                error_kind: None,
                message: None,
            },
        }
    }

    pub fn failure(err: &AppError) -> Self {
        let error_kind = if err.is_validation() { "validation" } else { "runtime" };
        Self {
            data: None,
            meta: ResponseMeta {
                status: "error",
                status_code: err.status_code().as_u16(),
                timestamp: Utc::now(),
                error_kind: Some(error_kind),
                message: Some(err.to_string()),
            },
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.meta.status_code)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}
