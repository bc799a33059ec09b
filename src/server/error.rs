//! Mapping content errors onto HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::admin::SaveOutcome;
use crate::error::ContentError;

/// Wrapper so handlers can return `ContentError` with `?`.
#[derive(Debug)]
pub struct ApiError(pub ContentError);

pub fn status_for(err: &ContentError) -> StatusCode {
    match err {
        ContentError::DataSourceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        ContentError::Validation(_) => StatusCode::BAD_REQUEST,
        ContentError::WriteConflict(_) => StatusCode::CONFLICT,
        ContentError::Persistence(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ContentError::NotFound(_) => StatusCode::NOT_FOUND,
        ContentError::Unauthorized(_) => StatusCode::FORBIDDEN,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (status_for(&self.0), Json(SaveOutcome::failed(&self.0))).into_response()
    }
}

impl From<ContentError> for ApiError {
    fn from(err: ContentError) -> Self {
        Self(err)
    }
}
