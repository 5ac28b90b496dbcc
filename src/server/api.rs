use std::sync::Arc;
use std::time::Instant;

use anyhow::anyhow;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum_auth::AuthBearer;
use axum_typed_multipart::TypedMultipart;
use log::info;

use super::error::{AppError, Result};
use super::state::AppState;
use super::types::*;
use crate::detector::{Confidence, SourceKind};
use crate::metrics;

/// 列出检测历史
#[utoipa::path(
    get,
    path = "/history",
    responses(
        (status = 200, body = Vec<HistoryEntry>),
    )
)]
pub async fn history_handler(State(state): State<Arc<AppState>>) -> Result<Json<Vec<HistoryEntry>>> {
    let history = state.service.store().summaries().await?;
    Ok(Json(history.into_iter().map(HistoryEntry::from).collect()))
}

/// 获取检测记录中的标注图片
#[utoipa::path(
    get,
    path = "/history/{id}/image",
    params(("id" = i64, Path, description = "检测记录 ID")),
    responses(
        (status = 200, description = "标注图片，Content-Type 按文件头识别"),
        (status = 404, description = "记录不存在"),
    )
)]
pub async fn history_image_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Response> {
    let record = state
        .service
        .store()
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("检测记录 {id} 不存在")))?;
    let content_type = image_content_type(&record.detected_image);
    Ok(([(header::CONTENT_TYPE, content_type)], record.detected_image).into_response())
}

/// 删除一条检测历史，记录不存在时返回 `deleted: false`
#[utoipa::path(
    delete,
    path = "/history/{id}",
    params(("id" = i64, Path, description = "检测记录 ID")),
    responses(
        (status = 200, body = DeleteResponse),
    )
)]
pub async fn delete_handler(
    State(state): State<Arc<AppState>>,
    AuthBearer(token): AuthBearer,
    Path(id): Path<i64>,
) -> Result<Json<DeleteResponse>> {
    state.check_token(&token)?;
    let deleted = state.service.store().delete(id).await?;
    if deleted {
        metrics::inc_deleted();
        info!("已删除检测记录 {id}");
    }
    Ok(Json(DeleteResponse { deleted }))
}

/// 检测一张图片并写入历史
#[utoipa::path(
    post,
    path = "/detect",
    request_body(content = DetectForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, body = DetectResponse),
    )
)]
pub async fn detect_handler(
    State(state): State<Arc<AppState>>,
    AuthBearer(token): AuthBearer,
    TypedMultipart(data): TypedMultipart<DetectRequest>,
) -> Result<Json<DetectResponse>> {
    state.check_token(&token)?;

    let confidence = match data.confidence {
        Some(value) => Confidence::new(value).map_err(AppError::bad_request)?,
        None => state.confidence,
    };
    let kind = match &data.source_type {
        Some(kind) => kind.parse::<SourceKind>().map_err(AppError::bad_request)?,
        None => SourceKind::Image,
    };
    let file_name = match &data.file.metadata.file_name {
        Some(file_name) => file_name.clone(),
        None => return Err(AppError::bad_request(anyhow!("文件名不能为空"))),
    };
    if data.file.contents.is_empty() {
        return Err(AppError::bad_request(anyhow!("文件内容不能为空")));
    }

    info!("正在检测上传图片 {file_name}");

    let start = Instant::now();
    let outcome =
        state.service.detect(kind, &file_name, data.file.contents.to_vec(), confidence).await?;

    Ok(Json(DetectResponse {
        time: start.elapsed().as_millis() as u64,
        record_id: outcome.record_id,
        detections: outcome.detections,
    }))
}

/// 导出 Prometheus 指标
pub async fn metrics_handler() -> Result<Response> {
    let body = metrics::gather_text()?;
    Ok(([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body).into_response())
}

/// 根据文件头识别图片格式，无法识别时返回 `application/octet-stream`
fn image_content_type(image: &[u8]) -> &'static str {
    match image {
        [0x89, b'P', b'N', b'G', ..] => "image/png",
        [0xff, 0xd8, 0xff, ..] => "image/jpeg",
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => "image/webp",
        [b'G', b'I', b'F', b'8', ..] => "image/gif",
        [b'B', b'M', ..] => "image/bmp",
        _ => "application/octet-stream",
    }
}
