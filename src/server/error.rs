use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::error;

use crate::db::StoreError;

pub type Result<T, E = AppError> = std::result::Result<T, E>;

/// API错误类型
pub struct AppError {
    pub status: StatusCode,
    pub error: anyhow::Error,
}

impl AppError {
    pub fn bad_request(err: impl Into<anyhow::Error>) -> Self {
        Self { status: StatusCode::BAD_REQUEST, error: err.into() }
    }

    pub fn unauthorized() -> Self {
        Self { status: StatusCode::UNAUTHORIZED, error: anyhow::anyhow!("invalid token") }
    }

    pub fn not_found(err: impl Into<anyhow::Error>) -> Self {
        Self { status: StatusCode::NOT_FOUND, error: err.into() }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!("请求处理失败: {:#}", self.error);
            return (self.status, format!("Something went wrong: {}", self.error)).into_response();
        }
        (self.status, self.error.to_string()).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let error = err.into();
        let status = match error.downcast_ref::<StoreError>() {
            Some(StoreError::Read(_) | StoreError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            Some(StoreError::EmptyImage) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self { status, error }
    }
}
