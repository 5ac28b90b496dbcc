use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Result, bail};
use clap::Parser;

use crate::cli::{SubCommandExtend, open_store};
use crate::config::{DetectOptions, Opts};
use crate::detector::{NoopDetector, SourceKind};
use crate::service::DetectionService;

#[derive(Parser, Debug, Clone)]
pub struct DetectCommand {
    #[command(flatten)]
    pub detect: DetectOptions,
    /// 图片路径
    pub image: PathBuf,
}

impl SubCommandExtend for DetectCommand {
    async fn run(&self, opts: &Opts) -> Result<()> {
        let image = tokio::fs::read(&self.image).await?;
        if image.is_empty() {
            bail!("图片文件为空: {}", self.image.display());
        }
        let source_path = self
            .image
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.image.display().to_string());

        let store = open_store(opts).await?;
        let service = DetectionService::new(store, Arc::new(NoopDetector));
        let outcome = service
            .detect(SourceKind::Image, &source_path, image, self.detect.confidence)
            .await?;

        if outcome.detections.is_empty() {
            println!("No objects detected.");
        }
        for detection in &outcome.detections {
            println!("Class: {}, Confidence: {:.2}", detection.class_name, detection.confidence);
        }
        match outcome.record_id {
            Some(id) => println!("recorded as {id}"),
            None => println!("detection was not recorded"),
        }
        Ok(())
    }
}
