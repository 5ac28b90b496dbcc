use sqlx::{Executor, Result, Sqlite};

use super::{DetectionRecord, DetectionSummary};

/// 添加检测记录，返回新分配的 ID
pub async fn add_detection<'c, E>(
    executor: E,
    source_type: &str,
    source_path: &str,
    detected_image: &[u8],
) -> Result<i64>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO detection_history (source_type, source_path, detected_image)
        VALUES (?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(source_type)
    .bind(source_path)
    .bind(detected_image)
    .fetch_one(executor)
    .await
}

/// 按 ID 顺序获取所有检测记录
pub async fn list_detections<'c, E>(executor: E) -> Result<Vec<DetectionRecord>>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query_as::<_, DetectionRecord>(
        r#"
        SELECT id, source_type, source_path, detected_image
        FROM detection_history
        ORDER BY id ASC
        "#,
    )
    .fetch_all(executor)
    .await
}

/// 按 ID 顺序获取所有记录摘要，不读取图片数据
pub async fn list_summaries<'c, E>(executor: E) -> Result<Vec<DetectionSummary>>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query_as::<_, DetectionSummary>(
        r#"
        SELECT id, source_type, source_path, length(detected_image) AS image_size
        FROM detection_history
        ORDER BY id ASC
        "#,
    )
    .fetch_all(executor)
    .await
}

pub async fn get_detection<'c, E>(executor: E, id: i64) -> Result<Option<DetectionRecord>>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query_as::<_, DetectionRecord>(
        r#"
        SELECT id, source_type, source_path, detected_image
        FROM detection_history
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

/// 删除检测记录，返回是否有记录被删除
pub async fn delete_detection<'c, E>(executor: E, id: i64) -> Result<bool>
where
    E: Executor<'c, Database = Sqlite>,
{
    let result = sqlx::query(r#"DELETE FROM detection_history WHERE id = ?"#)
        .bind(id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn count_detections<'c, E>(executor: E) -> Result<i64>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query_scalar::<_, i64>(r#"SELECT COUNT(*) FROM detection_history"#)
        .fetch_one(executor)
        .await
}
