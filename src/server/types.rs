use axum::body::Bytes;
use axum_typed_multipart::{FieldData, TryFromMultipart};
use serde::Serialize;
use utoipa::ToSchema;

use crate::db::DetectionSummary;
use crate::detector::Detection;

/// 检测请求参数
#[derive(TryFromMultipart)]
pub struct DetectRequest {
    #[form_data(limit = "10MiB")]
    pub file: FieldData<Bytes>,
    pub confidence: Option<f32>,
    pub source_type: Option<String>,
}

/// 检测表单（用于API文档）
#[derive(Debug, ToSchema)]
#[allow(unused)]
pub struct DetectForm {
    /// 上传的图片文件
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
    /// 模型置信度阈值，范围 0.25 到 1.0
    pub confidence: Option<f32>,
    /// 来源类型：Image、Webcam 或 Video，默认为 Image
    pub source_type: Option<String>,
}

/// 检测响应
#[derive(Debug, Serialize, ToSchema)]
pub struct DetectResponse {
    /// 检测耗时，单位为毫秒
    pub time: u64,
    /// 历史记录 ID，保存失败时为空
    pub record_id: Option<i64>,
    pub detections: Vec<Detection>,
}

/// 检测历史条目
#[derive(Debug, Serialize, ToSchema)]
pub struct HistoryEntry {
    pub id: i64,
    pub source_type: String,
    pub source_path: String,
    /// 标注图片字节数
    pub image_size: i64,
    /// 标注图片地址
    pub image_url: String,
}

impl From<DetectionSummary> for HistoryEntry {
    fn from(summary: DetectionSummary) -> Self {
        Self {
            image_url: format!("/history/{}/image", summary.id),
            id: summary.id,
            source_type: summary.source_type,
            source_path: summary.source_path,
            image_size: summary.image_size,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteResponse {
    /// 记录不存在时为 false
    pub deleted: bool,
}
