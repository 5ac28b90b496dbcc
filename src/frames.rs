//! 视频帧来源与逐帧标注
//!
//! 帧来源是一个惰性的、只能消费一次的迭代器，上传的视频是有限的，摄像头则可能是无限的。
//! 逐帧标注的结果只用于展示，不写入检测历史。

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use log::{debug, warn};
use walkdir::WalkDir;

use crate::detector::{Confidence, Detection, Detector};

/// 标注后的单帧
#[derive(Debug, Clone)]
pub struct AnnotatedFrame {
    /// 帧序号，从 0 开始
    pub index: usize,
    pub detections: Vec<Detection>,
    pub image: Vec<u8>,
}

/// 从目录中按文件名顺序读取已编码的帧，例如从上传视频中抽出的帧
pub struct FrameDir {
    paths: std::vec::IntoIter<PathBuf>,
}

impl FrameDir {
    /// 扫描目录，`suffix` 为逗号分隔的扩展名列表，大小写不敏感
    pub fn open(dir: impl AsRef<Path>, suffix: &str) -> Result<Self> {
        let suffix = suffix
            .split(',')
            .map(|s| s.trim().to_ascii_lowercase())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let mut paths = vec![];
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let matched = entry
                .path()
                .extension()
                .map(|ext| suffix.contains(&ext.to_string_lossy().to_ascii_lowercase()))
                .unwrap_or(false);
            if matched {
                paths.push(entry.into_path());
            }
        }
        paths.sort();
        debug!("找到 {} 帧", paths.len());

        Ok(Self { paths: paths.into_iter() })
    }
}

impl Iterator for FrameDir {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        let path = self.paths.next()?;
        Some(fs::read(&path).map_err(|e| anyhow::anyhow!("读取帧 {} 失败: {e}", path.display())))
    }
}

/// 逐帧检测并绘制检测框
///
/// 来源读取失败时序列结束，与读取视频失败后释放设备的行为一致；
/// 模型出错的帧以 `Err` 返回，后续帧继续处理。
pub fn annotate_frames<'a, I>(
    frames: I,
    detector: &'a dyn Detector,
    confidence: Confidence,
) -> impl Iterator<Item = Result<AnnotatedFrame>> + 'a
where
    I: IntoIterator<Item = Result<Vec<u8>>>,
    I::IntoIter: 'a,
{
    frames
        .into_iter()
        .map_while(|frame| match frame {
            Ok(frame) => Some(frame),
            Err(e) => {
                warn!("帧来源结束: {e}");
                None
            }
        })
        .enumerate()
        .map(move |(index, frame)| {
            let detections = detector.predict(&frame, confidence.get())?;
            let image = detector.render(&frame, &detections)?;
            Ok(AnnotatedFrame { index, detections, image })
        })
}
