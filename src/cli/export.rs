use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::Parser;
use log::info;

use crate::cli::{SubCommandExtend, open_store};
use crate::config::Opts;

#[derive(Parser, Debug, Clone)]
pub struct ExportCommand {
    /// 检测记录 ID
    pub id: i64,
    /// 标注图片的保存路径
    pub output: PathBuf,
}

impl SubCommandExtend for ExportCommand {
    async fn run(&self, opts: &Opts) -> Result<()> {
        let store = open_store(opts).await?;
        let record =
            store.get(self.id).await?.ok_or_else(|| anyhow!("检测记录 {} 不存在", self.id))?;
        tokio::fs::write(&self.output, &record.detected_image).await?;
        info!("已导出 {} 到 {}", record.source_path, self.output.display());
        Ok(())
    }
}
