mod annotate;
mod delete;
mod detect;
mod export;
mod list;
pub mod server;

pub use annotate::*;
pub use delete::*;
pub use detect::*;
pub use export::*;
pub use list::*;
pub use server::*;

use crate::config::Opts;
use crate::db::DetectionStore;

pub trait SubCommandExtend {
    fn run(&self, opts: &Opts) -> impl std::future::Future<Output = anyhow::Result<()>> + Send;
}

/// 按全局参数打开检测历史数据库
pub async fn open_store(opts: &Opts) -> anyhow::Result<DetectionStore> {
    let url = opts.database_url()?;
    Ok(DetectionStore::connect(&url).await?)
}
