use std::sync::Arc;

use clap::Parser;
use log::{error, info};
use rand::distr::{Alphanumeric, SampleString};
use tokio::net::TcpListener;

use crate::cli::{SubCommandExtend, open_store};
use crate::config::DetectOptions;
use crate::detector::NoopDetector;
use crate::service::DetectionService;
use crate::{Opts, server};

#[derive(Parser, Debug, Clone)]
pub struct ServerCommand {
    #[command(flatten)]
    pub detect: DetectOptions,
    /// 监听地址
    #[arg(long, default_value = "127.0.0.1:8000")]
    pub addr: String,
    /// 请求验证 token，不填则随机生成
    #[arg(long, default_value_t = String::new())]
    pub token: String,
}

impl SubCommandExtend for ServerCommand {
    async fn run(&self, opts: &Opts) -> anyhow::Result<()> {
        let store = open_store(opts).await?;
        info!("已加载 {} 条检测记录", store.count().await?);

        let mut self_clone = self.clone();
        if self_clone.token.is_empty() {
            self_clone.token = Alphanumeric.sample_string(&mut rand::rng(), 32);
            info!("鉴权 token: {}", self_clone.token);
        }

        // 创建应用状态
        let service = DetectionService::new(store.clone(), Arc::new(NoopDetector));
        let state = server::AppState::new(service, self_clone);

        // 创建应用
        let app = server::create_app(state);

        // 启动服务器
        info!("服务器启动：http://{}", &self.addr);
        let listener = TcpListener::bind(&self.addr).await?;
        axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

        info!("服务器已停止，关闭数据库连接");
        store.close().await;

        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("监听退出信号失败: {e}");
        std::future::pending::<()>().await;
    }
}
