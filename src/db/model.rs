use serde::Serialize;
use sqlx::FromRow;

/// 检测历史记录
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct DetectionRecord {
    /// 记录 ID，由数据库分配，删除后不会复用
    pub id: i64,
    /// 检测来源类型，如 `Image`、`Webcam`、`Video`
    pub source_type: String,
    /// 来源文件名或地址，不校验是否存在
    pub source_path: String,
    /// 标注后的图片（已编码）
    pub detected_image: Vec<u8>,
}

/// 不含图片数据的记录摘要，用于列表展示
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct DetectionSummary {
    pub id: i64,
    pub source_type: String,
    pub source_path: String,
    /// 图片字节数
    pub image_size: i64,
}
