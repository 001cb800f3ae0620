use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::error::DumpReaderError;

pub type ServerResult<T,> = Result<T, ServerError,>;

/// Errors surfaced to HTTP clients as `{"error": "<message>"}`.
#[derive(Debug, thiserror::Error,)]
pub enum ServerError {
    #[error("{0}")]
    BadRequest(String,),

    #[error("Could not fetch XML: {0}")]
    Fetch(String,),

    #[error("Malformed XML")]
    MalformedDocument,

    #[error("{0}")]
    NotFound(String,),

    #[error("Internal server error: {0}")]
    Internal(String,),
}

impl ServerError {
    fn status_code(&self,) -> StatusCode {
        match self {
            ServerError::BadRequest(_,) | ServerError::Fetch(_,) | ServerError::MalformedDocument => {
                StatusCode::BAD_REQUEST
            },
            ServerError::NotFound(_,) => StatusCode::NOT_FOUND,
            ServerError::Internal(_,) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self,) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, %status, "request rejected");
        }

        (status, Json(json!({ "error": self.to_string() }),),).into_response()
    }
}

impl From<DumpReaderError,> for ServerError {
    fn from(err: DumpReaderError,) -> Self {
        match err {
            DumpReaderError::MalformedDocument { .. } => ServerError::MalformedDocument,
            DumpReaderError::FetchError { reason, .. } => ServerError::Fetch(reason,),
            DumpReaderError::InvalidImage(message,) => ServerError::BadRequest(message,),
            other => ServerError::Internal(other.to_string(),),
        }
    }
}

impl From<tokio::task::JoinError,> for ServerError {
    fn from(err: tokio::task::JoinError,) -> Self {
        ServerError::Internal(format!("summarizer task failed: {err}"),)
    }
}
