use std::collections::HashSet;

use anyhow::Result;
use rstest::*;
use tempfile::TempDir;
use vestwatch::{DetectionRecord, DetectionStore, StoreError};

#[fixture]
fn temp_dir() -> TempDir {
    TempDir::new().unwrap()
}

fn db_url(dir: &TempDir) -> String {
    format!("sqlite://{}", dir.path().join("history.db").display())
}

async fn open(dir: &TempDir) -> DetectionStore {
    DetectionStore::connect(&db_url(dir)).await.unwrap()
}

#[rstest]
#[tokio::test]
async fn test_empty_store_lists_nothing(temp_dir: TempDir) {
    let store = open(&temp_dir).await;
    assert!(store.list().await.unwrap().is_empty());
    assert_eq!(store.count().await.unwrap(), 0);
}

#[rstest]
#[tokio::test]
async fn test_save_list_delete_scenario(temp_dir: TempDir) {
    let store = open(&temp_dir).await;

    let record = store.save("Image", "worker1.jpg", b"<png-bytes>").await.unwrap();
    assert_eq!(
        record,
        DetectionRecord {
            id: 1,
            source_type: "Image".to_string(),
            source_path: "worker1.jpg".to_string(),
            detected_image: b"<png-bytes>".to_vec(),
        }
    );

    assert_eq!(store.list().await.unwrap(), vec![record]);
    assert!(store.delete(1).await.unwrap());
    assert!(store.list().await.unwrap().is_empty());
}

#[rstest]
#[tokio::test]
async fn test_delete_missing_returns_false(temp_dir: TempDir) {
    let store = open(&temp_dir).await;
    assert!(!store.delete(999).await.unwrap());
}

#[rstest]
#[tokio::test]
async fn test_delete_twice(temp_dir: TempDir) {
    let store = open(&temp_dir).await;
    let keep = store.save("Image", "a.jpg", b"a").await.unwrap();
    let gone = store.save("Image", "b.jpg", b"b").await.unwrap();

    assert!(store.delete(gone.id).await.unwrap());
    assert!(!store.delete(gone.id).await.unwrap());

    let ids = store.list().await.unwrap().into_iter().map(|r| r.id).collect::<Vec<_>>();
    assert_eq!(ids, vec![keep.id]);
}

#[rstest]
#[tokio::test]
async fn test_identical_saves_are_not_deduplicated(temp_dir: TempDir) {
    let store = open(&temp_dir).await;
    let first = store.save("Image", "worker1.jpg", b"png").await.unwrap();
    let second = store.save("Image", "worker1.jpg", b"png").await.unwrap();

    assert_ne!(first.id, second.id);
    assert_eq!(store.list().await.unwrap(), vec![first, second]);
}

#[rstest]
#[tokio::test]
async fn test_ids_are_never_reused(temp_dir: TempDir) {
    let store = open(&temp_dir).await;
    let mut seen = HashSet::new();

    for i in 0..3 {
        let record = store.save("Video", &format!("clip{i}.mp4"), b"frame").await.unwrap();
        assert!(seen.insert(record.id));
    }

    // 删除最大 ID 后，新记录也不能复用它
    let last = *seen.iter().max().unwrap();
    assert!(store.delete(last).await.unwrap());
    let record = store.save("Video", "clip3.mp4", b"frame").await.unwrap();
    assert!(seen.insert(record.id));
    assert!(record.id > last);
}

#[rstest]
#[case::empty_strings("", "")]
#[case::webcam("Webcam", "0")]
#[case::unicode("Image", "工地/工人 1.png")]
#[tokio::test]
async fn test_save_keeps_fields(temp_dir: TempDir, #[case] source_type: &str, #[case] source_path: &str) {
    let store = open(&temp_dir).await;
    let image = vec![0x89, b'P', b'N', b'G', 0x00, 0xff];

    let record = store.save(source_type, source_path, &image).await.unwrap();
    let loaded = store.get(record.id).await.unwrap().unwrap();

    assert_eq!(loaded.source_type, source_type);
    assert_eq!(loaded.source_path, source_path);
    assert_eq!(loaded.detected_image, image);
}

#[rstest]
#[tokio::test]
async fn test_empty_image_rejected(temp_dir: TempDir) {
    let store = open(&temp_dir).await;
    let result = store.save("Image", "worker1.jpg", b"").await;
    assert!(matches!(result, Err(StoreError::EmptyImage)));
    assert!(store.list().await.unwrap().is_empty());
}

#[rstest]
#[tokio::test]
async fn test_initialize_is_idempotent(temp_dir: TempDir) -> Result<()> {
    let store = open(&temp_dir).await;
    store.save("Image", "worker1.jpg", b"png").await?;

    store.initialize().await?;
    store.initialize().await?;
    store.close().await;

    // 重新打开同一个文件也会再次初始化
    let store = open(&temp_dir).await;
    assert_eq!(store.list().await?.len(), 1);
    Ok(())
}

#[rstest]
#[tokio::test]
async fn test_list_order_is_stable(temp_dir: TempDir) -> Result<()> {
    let store = open(&temp_dir).await;
    for path in ["c.jpg", "a.jpg", "b.jpg"] {
        store.save("Image", path, path.as_bytes()).await?;
    }

    let first = store.list().await?;
    let second = store.list().await?;
    assert_eq!(first, second);
    assert_eq!(
        first.iter().map(|r| r.source_path.as_str()).collect::<Vec<_>>(),
        vec!["c.jpg", "a.jpg", "b.jpg"]
    );

    let summaries = store.summaries().await?;
    assert_eq!(summaries.iter().map(|s| s.id).collect::<Vec<_>>(), first.iter().map(|r| r.id).collect::<Vec<_>>());
    assert!(summaries.iter().all(|s| s.image_size == 5));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_saves(temp_dir: TempDir) -> Result<()> {
    let store = open(&temp_dir).await;

    let tasks = (0..16)
        .map(|i| {
            let store = store.clone();
            tokio::spawn(async move { store.save("Image", &format!("{i}.jpg"), b"png").await })
        })
        .collect::<Vec<_>>();

    let mut ids = HashSet::new();
    for task in tasks {
        ids.insert(task.await??.id);
    }

    assert_eq!(ids.len(), 16);
    assert_eq!(store.count().await?, 16);
    Ok(())
}

#[tokio::test]
async fn test_in_memory_store() -> Result<()> {
    let store = DetectionStore::connect("sqlite::memory:").await?;
    let record = store.save("Webcam", "0", b"frame").await?;
    assert_eq!(store.get(record.id).await?, Some(record));
    assert!(store.delete(1).await?);
    assert_eq!(store.get(1).await?, None);
    Ok(())
}

#[rstest]
#[tokio::test]
async fn test_unreachable_storage(temp_dir: TempDir) {
    // 数据库路径指向一个已存在的目录
    let url = format!("sqlite://{}", temp_dir.path().display());
    let result = DetectionStore::connect(&url).await;
    assert!(matches!(result, Err(StoreError::Unavailable(_))));
}

#[rstest]
#[tokio::test]
async fn test_closed_store_surfaces_errors(temp_dir: TempDir) {
    let store = open(&temp_dir).await;
    store.save("Image", "worker1.jpg", b"png").await.unwrap();
    store.close().await;

    assert!(matches!(store.list().await, Err(StoreError::Read(_))));
    assert!(matches!(store.save("Image", "x.jpg", b"png").await, Err(StoreError::Write(_))));
    assert!(matches!(store.delete(1).await, Err(StoreError::Write(_))));

    // 失败的删除不影响已有记录
    let store = open(&temp_dir).await;
    assert_eq!(store.count().await.unwrap(), 1);
}

/// 通过另一个连接池直接修改表结构，模拟事务内部的写入失败
async fn exec_raw(dir: &TempDir, sql: &str) -> Result<()> {
    let pool = sqlx::SqlitePool::connect(&db_url(dir)).await?;
    sqlx::query(sql).execute(&pool).await?;
    pool.close().await;
    Ok(())
}

#[rstest]
#[tokio::test]
async fn test_failed_insert_leaves_no_row(temp_dir: TempDir) -> Result<()> {
    let store = open(&temp_dir).await;
    exec_raw(
        &temp_dir,
        "CREATE TRIGGER reject_insert AFTER INSERT ON detection_history \
         BEGIN SELECT RAISE(ABORT, 'insert rejected'); END",
    )
    .await?;

    let result = store.save("Image", "worker1.jpg", b"png").await;
    assert!(matches!(result, Err(StoreError::Write(_))));
    assert!(store.list().await?.is_empty());

    // 失败的写入不会占住连接或留下未结束的事务
    exec_raw(&temp_dir, "DROP TRIGGER reject_insert").await?;
    let record = store.save("Image", "worker1.jpg", b"png").await?;
    assert_eq!(store.list().await?, vec![record]);
    Ok(())
}

#[rstest]
#[tokio::test]
async fn test_failed_delete_keeps_row(temp_dir: TempDir) -> Result<()> {
    let store = open(&temp_dir).await;
    let record = store.save("Image", "worker1.jpg", b"png").await?;
    exec_raw(
        &temp_dir,
        "CREATE TRIGGER reject_delete AFTER DELETE ON detection_history \
         BEGIN SELECT RAISE(ABORT, 'delete rejected'); END",
    )
    .await?;

    let result = store.delete(record.id).await;
    assert!(matches!(result, Err(StoreError::Write(_))));
    assert_eq!(store.list().await?, vec![record.clone()]);

    exec_raw(&temp_dir, "DROP TRIGGER reject_delete").await?;
    assert!(store.delete(record.id).await?);
    assert!(store.list().await?.is_empty());
    Ok(())
}
