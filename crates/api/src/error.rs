//! Mapping from domain errors to HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use snapfeed_core::post::PostError;
use snapfeed_shared::AppError;

/// Handler error rendered as `{ "error": CODE, "message": text }`.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl ApiError {
    /// Malformed request.
    #[must_use]
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(AppError::BadRequest(msg.into()))
    }

    /// Underlying application error.
    #[must_use]
    pub fn inner(&self) -> &AppError {
        &self.0
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<PostError> for ApiError {
    fn from(err: PostError) -> Self {
        let message = err.to_string();
        Self(match err {
            // A malformed identifier can never match a post.
            PostError::Validation(_) | PostError::NotFound(_) => AppError::NotFound(message),
            PostError::Staging(_) => AppError::Internal(message),
            PostError::RemoteUpload(_) | PostError::UploadIncomplete => {
                AppError::ExternalService(message)
            }
            PostError::Persistence(_) => AppError::Database(message),
        })
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        (
            status,
            Json(json!({
                "error": self.0.error_code(),
                "message": self.0.message(),
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snapfeed_core::storage::StorageError;
    use uuid::Uuid;

    fn status_of(err: PostError) -> u16 {
        ApiError::from(err).inner().status_code()
    }

    #[test]
    fn test_client_errors_map_to_not_found() {
        assert_eq!(status_of(PostError::validation("invalid post id: x")), 404);
        assert_eq!(status_of(PostError::NotFound(Uuid::new_v4())), 404);
    }

    #[test]
    fn test_internal_errors_map_to_500() {
        assert_eq!(status_of(PostError::staging("disk full")), 500);
        assert_eq!(
            status_of(PostError::RemoteUpload(StorageError::Transport(
                "timed out".to_string()
            ))),
            500
        );
        assert_eq!(status_of(PostError::UploadIncomplete), 500);
        assert_eq!(status_of(PostError::repository("locked")), 500);
    }

    #[test]
    fn test_message_carries_underlying_text() {
        let err = ApiError::from(PostError::repository("database is locked"));
        assert_eq!(err.inner().error_code(), "DATABASE_ERROR");
        assert!(err.inner().message().contains("database is locked"));
    }

    #[test]
    fn test_into_response_status() {
        let response = ApiError::bad_request("missing file").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
