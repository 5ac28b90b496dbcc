use std::sync::Arc;

use super::error::{AppError, Result};
use crate::cli::server::ServerCommand;
use crate::detector::Confidence;
use crate::service::DetectionService;

/// 应用状态
pub struct AppState {
    /// 检测服务，持有检测历史数据库
    pub service: DetectionService,
    /// 请求未指定置信度时使用的默认值
    pub confidence: Confidence,
    /// 鉴权 token
    pub token: String,
}

impl AppState {
    /// 创建新的应用状态
    pub fn new(service: DetectionService, opts: ServerCommand) -> Arc<Self> {
        Arc::new(AppState { service, confidence: opts.detect.confidence, token: opts.token })
    }

    pub fn check_token(&self, token: &str) -> Result<()> {
        if token != self.token {
            return Err(AppError::unauthorized());
        }
        Ok(())
    }
}
