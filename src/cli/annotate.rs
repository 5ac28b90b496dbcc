use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use log::{error, info};
use tokio::task::block_in_place;

use crate::cli::SubCommandExtend;
use crate::config::{DetectOptions, Opts};
use crate::detector::NoopDetector;
use crate::frames::{FrameDir, annotate_frames};

#[derive(Parser, Debug, Clone)]
pub struct AnnotateCommand {
    #[command(flatten)]
    pub detect: DetectOptions,
    /// 视频帧所在目录
    pub frames: PathBuf,
    /// 标注结果输出目录
    pub output: PathBuf,
    /// 扫描的文件后缀名，多个后缀用逗号分隔
    #[arg(short, long, default_value = "jpg,png,webp")]
    pub suffix: String,
}

impl SubCommandExtend for AnnotateCommand {
    async fn run(&self, _opts: &Opts) -> Result<()> {
        std::fs::create_dir_all(&self.output)?;
        let source = FrameDir::open(&self.frames, &self.suffix)?;

        let written = block_in_place(|| -> Result<usize> {
            let mut written = 0;
            for frame in annotate_frames(source, &NoopDetector, self.detect.confidence) {
                match frame {
                    Ok(frame) => {
                        let path = self.output.join(format!("frame_{:06}.png", frame.index));
                        std::fs::write(path, &frame.image)?;
                        written += 1;
                    }
                    Err(e) => error!("标注失败: {e}"),
                }
            }
            Ok(written)
        })?;

        info!("已标注 {written} 帧");
        println!("annotated {written} frames");
        Ok(())
    }
}
