mod api;
mod error;
mod state;
mod types;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post};
use tower_http::limit::RequestBodyLimitLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use self::state::*;
pub use self::types::{DeleteResponse, DetectResponse, HistoryEntry};

#[derive(OpenApi)]
#[openapi(
    paths(
        api::history_handler,
        api::history_image_handler,
        api::delete_handler,
        api::detect_handler,
    ),
    components(schemas(types::DetectForm, types::HistoryEntry, types::DeleteResponse, types::DetectResponse))
)]
pub struct ApiDoc;

/// 构建API服务器
pub fn create_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/history", get(api::history_handler))
        .route("/history/{id}", delete(api::delete_handler))
        .route("/history/{id}/image", get(api::history_image_handler))
        .route("/detect", post(api::detect_handler))
        .route("/metrics", get(api::metrics_handler))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(DefaultBodyLimit::disable())
        // 上传限制：10M
        .layer(RequestBodyLimitLayer::new(1024 * 1024 * 10))
        .with_state(state)
}
