use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::models::song::SongId;

/// Failures raised by a `SongStore` implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A write would leave two documents sharing one business `id`.
    #[error("duplicate song id")]
    Duplicate,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("document encoding error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Everything a song route can answer with besides success.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Song with id {0} not found")]
    SongNotFound(SongId),

    /// Update and delete share a shorter message than get-by-id.
    #[error("song not found")]
    NotFound,

    #[error("Song with id {0} already exists")]
    Conflict(SongId),

    #[error("{0}")]
    BadRequest(String),

    /// Path or body refused by an axum extractor, keeping its status.
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::SongNotFound(_) | ApiError::NotFound => (
                StatusCode::NOT_FOUND,
                Json(json!({ "message": self.to_string() })),
            )
                .into_response(),
            ApiError::Conflict(_) => (
                StatusCode::CONFLICT,
                Json(json!({ "Code": "CONN_CONFLICT", "Message": self.to_string() })),
            )
                .into_response(),
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "message": message }))).into_response()
            }
            ApiError::Rejected { status, message } => {
                (status, Json(json!({ "message": message }))).into_response()
            }
            ApiError::Store(e) => {
                error!("Store operation failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "message": "internal store error" })),
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), 64 * 1024)
            .await
            .unwrap_or_else(|e| panic!("failed to read body: {e}"));
        serde_json::from_slice(&bytes).unwrap_or_else(|e| panic!("body is not JSON: {e}"))
    }

    #[tokio::test]
    async fn conflict_uses_code_and_message_keys() {
        let response = ApiError::Conflict(SongId(7)).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(
            body_json(response).await,
            json!({ "Code": "CONN_CONFLICT", "Message": "Song with id 7 already exists" })
        );
    }

    #[tokio::test]
    async fn not_found_messages_differ_by_operation() {
        let by_id = ApiError::SongNotFound(SongId(3)).into_response();
        assert_eq!(by_id.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(by_id).await,
            json!({ "message": "Song with id 3 not found" })
        );

        let plain = ApiError::NotFound.into_response();
        assert_eq!(plain.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(plain).await, json!({ "message": "song not found" }));
    }

    #[tokio::test]
    async fn store_failures_hide_details_behind_500() {
        let response = ApiError::from(StoreError::Database(sqlx::Error::PoolTimedOut)).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({ "message": "internal store error" })
        );
    }
}
