use std::str::FromStr;

use log::{debug, info};
use sqlx::SqlitePool;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
};

pub mod crud;
mod error;
mod model;

pub use error::*;
pub use model::*;

/// 检测历史存储
///
/// 每个操作都从连接池取出一个独立的短事务，结束后立即归还连接，
/// 出错时事务随 drop 回滚。句柄可以廉价 clone，在多个调用方之间共享同一个连接池。
#[derive(Debug, Clone)]
pub struct DetectionStore {
    pool: SqlitePool,
}

impl DetectionStore {
    /// 打开数据库并初始化表结构
    ///
    /// `url` 可以是 `sqlite://path/to/history.db`、文件路径或 `sqlite::memory:`，
    /// 文件不存在时自动创建。
    pub async fn connect(url: &str) -> Result<Self> {
        info!("初始化数据库连接: {url}");

        let options = SqliteConnectOptions::from_str(url)
            .map_err(StoreError::unavailable)?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .create_if_missing(true);

        // 内存数据库在最后一个连接关闭时消失，因此只保留一个常驻连接
        let pool_options = if is_memory_url(url) {
            SqlitePoolOptions::new().max_connections(1).idle_timeout(None).max_lifetime(None)
        } else {
            SqlitePoolOptions::new()
        };

        let pool = pool_options.connect_with(options).await.map_err(StoreError::unavailable)?;

        let store = Self { pool };
        store.initialize().await?;
        Ok(store)
    }

    /// 确保表结构存在，可重复调用
    pub async fn initialize(&self) -> Result<()> {
        info!("检查数据库迁移");
        sqlx::migrate!().run(&self.pool).await.map_err(StoreError::unavailable)
    }

    /// 保存一条检测记录
    pub async fn save(
        &self,
        source_type: &str,
        source_path: &str,
        image_bytes: &[u8],
    ) -> Result<DetectionRecord> {
        if image_bytes.is_empty() {
            return Err(StoreError::EmptyImage);
        }

        let mut tx = self.pool.begin().await.map_err(StoreError::Write)?;
        let id = crud::add_detection(&mut *tx, source_type, source_path, image_bytes)
            .await
            .map_err(StoreError::Write)?;
        tx.commit().await.map_err(StoreError::Write)?;

        debug!("保存检测记录 {id}: {source_type} {source_path} ({} bytes)", image_bytes.len());

        Ok(DetectionRecord {
            id,
            source_type: source_type.to_owned(),
            source_path: source_path.to_owned(),
            detected_image: image_bytes.to_vec(),
        })
    }

    /// 按 ID 升序列出所有记录
    pub async fn list(&self) -> Result<Vec<DetectionRecord>> {
        let mut tx = self.pool.begin().await.map_err(StoreError::Read)?;
        let records = crud::list_detections(&mut *tx).await.map_err(StoreError::Read)?;
        tx.commit().await.map_err(StoreError::Read)?;
        Ok(records)
    }

    /// 与 [`list`](Self::list) 顺序一致，但不读取图片数据
    pub async fn summaries(&self) -> Result<Vec<DetectionSummary>> {
        let mut tx = self.pool.begin().await.map_err(StoreError::Read)?;
        let summaries = crud::list_summaries(&mut *tx).await.map_err(StoreError::Read)?;
        tx.commit().await.map_err(StoreError::Read)?;
        Ok(summaries)
    }

    pub async fn get(&self, id: i64) -> Result<Option<DetectionRecord>> {
        let mut tx = self.pool.begin().await.map_err(StoreError::Read)?;
        let record = crud::get_detection(&mut *tx, id).await.map_err(StoreError::Read)?;
        tx.commit().await.map_err(StoreError::Read)?;
        Ok(record)
    }

    /// 删除记录
    ///
    /// 记录不存在时不做任何修改并返回 `false`。
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let mut tx = self.pool.begin().await.map_err(StoreError::Write)?;
        let deleted = crud::delete_detection(&mut *tx, id).await.map_err(StoreError::Write)?;

        if !deleted {
            tx.rollback().await.map_err(StoreError::Write)?;
            debug!("检测记录 {id} 不存在");
            return Ok(false);
        }

        tx.commit().await.map_err(StoreError::Write)?;
        debug!("删除检测记录 {id}");
        Ok(true)
    }

    pub async fn count(&self) -> Result<u64> {
        let count = crud::count_detections(&self.pool).await.map_err(StoreError::Read)?;
        Ok(count as u64)
    }

    /// 关闭连接池，等待所有连接归还
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn is_memory_url(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}
