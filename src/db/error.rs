use thiserror::Error;

pub type Result<T, E = StoreError> = std::result::Result<T, E>;

/// 检测历史存储错误
#[derive(Error, Debug)]
pub enum StoreError {
    /// 数据库无法打开或创建，通常发生在启动阶段
    #[error("storage unavailable: {0}")]
    Unavailable(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// 写入、删除或提交失败，事务已回滚
    #[error("storage write failed: {0}")]
    Write(#[source] sqlx::Error),

    /// 查询失败
    #[error("storage read failed: {0}")]
    Read(#[source] sqlx::Error),

    #[error("detected image must not be empty")]
    EmptyImage,
}

impl StoreError {
    pub(super) fn unavailable<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Unavailable(err.into())
    }
}
