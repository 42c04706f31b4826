use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use nt_core::Error;
use serde_json::json;
use tracing::error;

/// Maps pipeline errors onto `{ "error": ".." }` responses.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl ApiError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self(Error::InvalidInput(message.into()))
    }

    fn status(&self) -> StatusCode {
        match &self.0 {
            Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Error::Embedding(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match &self.0 {
            Error::InvalidInput(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if !self.0.is_caller_fault() {
            error!(error = %self.0, "❌ Request failed");
        }
        (status, Json(json!({ "error": self.message() }))).into_response()
    }
}
