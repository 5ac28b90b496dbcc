use std::fmt;
use std::str::FromStr;

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 检测框，坐标为像素，左上角 `(x1, y1)`，右下角 `(x2, y2)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

/// 单个检测结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Detection {
    /// 类别名称，如 `vest`、`no-vest`
    pub class_name: String,
    pub confidence: f32,
    pub bbox: BoundingBox,
}

/// 目标检测模型
///
/// 模型推理和结果绘制都是同步且耗时的操作，调用方负责把它们放到阻塞线程池中执行。
pub trait Detector: Send + Sync {
    /// 对一张已编码的图片进行推理，只返回置信度不低于 `confidence` 的结果
    fn predict(&self, image: &[u8], confidence: f32) -> Result<Vec<Detection>>;

    /// 在图片上绘制检测框，返回编码后的标注图片
    ///
    /// 返回值会原样写入检测历史，读取时按文件头识别格式，推荐使用 PNG 编码。
    fn render(&self, image: &[u8], detections: &[Detection]) -> Result<Vec<u8>>;
}

/// 未接入模型时使用的检测器：不产生任何检测结果，原样返回输入图片
///
/// 标注结果保持上传时的编码格式，不会转换为 PNG。
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDetector;

impl Detector for NoopDetector {
    fn predict(&self, _image: &[u8], _confidence: f32) -> Result<Vec<Detection>> {
        Ok(vec![])
    }

    fn render(&self, image: &[u8], _detections: &[Detection]) -> Result<Vec<u8>> {
        Ok(image.to_vec())
    }
}

/// 检测来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Image,
    Webcam,
    Video,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "Image",
            Self::Webcam => "Webcam",
            Self::Video => "Video",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Image" | "image" => Ok(Self::Image),
            "Webcam" | "webcam" => Ok(Self::Webcam),
            "Video" | "video" => Ok(Self::Video),
            _ => Err(anyhow!("未知的来源类型: {s}")),
        }
    }
}

/// 模型置信度阈值，取值范围 `[0.25, 1.0]`
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Confidence(f32);

impl Confidence {
    pub const MIN: f32 = 0.25;
    pub const MAX: f32 = 1.0;

    pub fn new(value: f32) -> Result<Self> {
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(anyhow!(
                "置信度 {value} 超出范围 [{}, {}]",
                Self::MIN,
                Self::MAX
            ));
        }
        Ok(Self(value))
    }

    pub fn get(&self) -> f32 {
        self.0
    }
}

impl Default for Confidence {
    fn default() -> Self {
        Self(0.40)
    }
}

impl FromStr for Confidence {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.trim().parse()?)
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}
