//! Error types for the REST surface.
//!
//! Every handler returns `Result<_, ApiError>`; the `IntoResponse` impl maps
//! the error to an HTTP status and the `{ "success": false, "message": ... }`
//! JSON shape the SPA's fetch wrappers expect.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use backbar_core::CoreError;
use backbar_db::DbError;

/// REST API errors.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unprocessable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({
            "success": false,
            "message": self.to_string(),
        }));
        (status, body).into_response()
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            DbError::Duplicate { .. } => ApiError::Conflict(err.to_string()),
            DbError::Core(core) => core.into(),
            DbError::ConnectionFailed(_) | DbError::MigrationFailed(_) | DbError::Sqlx(_) => {
                // Don't leak SQL details to the browser.
                tracing::error!(error = %err, "Database failure");
                ApiError::Internal("database failure".to_string())
            }
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(_) | CoreError::InvalidBusinessDate(_) => {
                ApiError::BadRequest(err.to_string())
            }
            CoreError::AllocationMismatch { .. } => ApiError::Unprocessable(err.to_string()),
            CoreError::StoreClosed { .. } => ApiError::Conflict(err.to_string()),
            CoreError::ItemNotFound(_)
            | CoreError::StoreNotFound(_)
            | CoreError::LedgerNotFound(_) => ApiError::NotFound(err.to_string()),
            other => ApiError::Unprocessable(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_error_mapping() {
        let err: ApiError = DbError::not_found("Store", "S042").into();
        assert!(matches!(err, ApiError::NotFound(_)));

        let err: ApiError = DbError::duplicate("Item", "IT001").into();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[test]
    fn test_core_error_mapping() {
        let err: ApiError = CoreError::AllocationMismatch {
            total_paise: 10,
            allocated_paise: 9,
        }
        .into();
        assert!(matches!(err, ApiError::Unprocessable(_)));
    }
}
