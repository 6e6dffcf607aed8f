//! HTTP rejection glue for `ApiError`.
//!
//! Core stays framework-free; this is the one place an error becomes an axum
//! response. Body shape is `{"detail": ..., "code": ...}` with a stable code.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use kanary_core::ApiError;

pub struct Rejection(pub ApiError);

impl From<ApiError> for Rejection {
    fn from(e: ApiError) -> Self {
        Self(e)
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = json!({
            "detail": self.0.to_string(),
            "code": self.0.client_code().as_str(),
        });
        (status, Json(body)).into_response()
    }
}
