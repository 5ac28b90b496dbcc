use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use log::{error, info};
use serde::Serialize;
use tokio::task::spawn_blocking;

use crate::db::DetectionStore;
use crate::detector::{Confidence, Detection, Detector, SourceKind};
use crate::metrics;

/// 一次检测的结果
#[derive(Debug, Clone, Serialize)]
pub struct DetectionOutcome {
    /// 历史记录 ID，保存失败时为 `None`
    pub record_id: Option<i64>,
    pub detections: Vec<Detection>,
    #[serde(skip)]
    pub annotated_image: Vec<u8>,
}

/// 执行检测并把标注结果写入历史
#[derive(Clone)]
pub struct DetectionService {
    store: DetectionStore,
    detector: Arc<dyn Detector>,
}

impl DetectionService {
    pub fn new(store: DetectionStore, detector: Arc<dyn Detector>) -> Self {
        Self { store, detector }
    }

    pub fn store(&self) -> &DetectionStore {
        &self.store
    }

    pub fn detector(&self) -> Arc<dyn Detector> {
        self.detector.clone()
    }

    /// 检测一张图片并保存标注结果
    ///
    /// 模型出错时直接返回错误，不写入历史。
    /// 保存失败只记录日志，检测结果照常返回，此时 `record_id` 为 `None`。
    pub async fn detect(
        &self,
        kind: SourceKind,
        source_path: &str,
        image: Vec<u8>,
        confidence: Confidence,
    ) -> Result<DetectionOutcome> {
        let start = Instant::now();
        let detector = self.detector.clone();
        let (detections, annotated_image) = spawn_blocking(move || -> Result<_> {
            let detections = detector.predict(&image, confidence.get())?;
            let annotated = detector.render(&image, &detections)?;
            Ok((detections, annotated))
        })
        .await??;

        metrics::observe_detection(kind, start.elapsed().as_secs_f64(), detections.len());
        info!("{kind} {source_path}: 检测到 {} 个目标", detections.len());

        let record_id =
            match self.store.save(kind.as_str(), source_path, &annotated_image).await {
                Ok(record) => {
                    metrics::inc_saved(kind);
                    Some(record.id)
                }
                Err(e) => {
                    metrics::inc_save_failed(kind);
                    error!("保存检测记录失败: {e}");
                    None
                }
            };

        Ok(DetectionOutcome { record_id, detections, annotated_image })
    }
}
