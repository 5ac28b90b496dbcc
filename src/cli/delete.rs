use anyhow::Result;
use clap::Parser;
use log::info;

use crate::cli::{SubCommandExtend, open_store};
use crate::config::Opts;

#[derive(Parser, Debug, Clone)]
pub struct DeleteCommand {
    /// 检测记录 ID
    pub id: i64,
}

impl SubCommandExtend for DeleteCommand {
    async fn run(&self, opts: &Opts) -> Result<()> {
        let store = open_store(opts).await?;
        if store.delete(self.id).await? {
            info!("已删除检测记录 {}", self.id);
            println!("deleted {}", self.id);
        } else {
            println!("record {} not found", self.id);
        }
        Ok(())
    }
}
