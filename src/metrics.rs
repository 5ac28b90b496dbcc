use std::sync::LazyLock;

use prometheus::*;

use crate::detector::SourceKind;

static METRIC_DETECTION_COUNT: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!(
        "vest_detection_count",
        "count of the detections run",
        &["source_type"]
    )
    .unwrap()
});

static METRIC_DETECTION_DURATION: LazyLock<HistogramVec> = LazyLock::new(|| {
    register_histogram_vec!(
        "vest_detection_duration",
        "duration of the model inference and rendering in seconds",
        &["source_type"]
    )
    .unwrap()
});

static METRIC_DETECTION_OBJECTS: LazyLock<HistogramVec> = LazyLock::new(|| {
    register_histogram_vec!(
        "vest_detection_objects",
        "number of objects found per detection",
        &["source_type"],
        vec![0.0, 1.0, 2.0, 5.0, 10.0, 20.0, 50.0]
    )
    .unwrap()
});

static METRIC_HISTORY_SAVED: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!(
        "vest_history_saved",
        "count of detection records written to history",
        &["source_type", "result"]
    )
    .unwrap()
});

static METRIC_HISTORY_DELETED: LazyLock<IntCounter> = LazyLock::new(|| {
    register_int_counter!("vest_history_deleted", "count of detection records deleted").unwrap()
});

/// 记录一次检测的耗时和目标数量
pub fn observe_detection(kind: SourceKind, duration: f64, objects: usize) {
    let kind = kind.as_str();
    METRIC_DETECTION_COUNT.with_label_values(&[kind]).inc();
    METRIC_DETECTION_DURATION.with_label_values(&[kind]).observe(duration);
    METRIC_DETECTION_OBJECTS.with_label_values(&[kind]).observe(objects as f64);
}

pub fn inc_saved(kind: SourceKind) {
    METRIC_HISTORY_SAVED.with_label_values(&[kind.as_str(), "ok"]).inc();
}

pub fn inc_save_failed(kind: SourceKind) {
    METRIC_HISTORY_SAVED.with_label_values(&[kind.as_str(), "error"]).inc();
}

pub fn inc_deleted() {
    METRIC_HISTORY_DELETED.inc();
}

/// 以 Prometheus 文本格式导出所有指标
pub fn gather_text() -> Result<String> {
    // 确保指标在首次使用前已注册
    LazyLock::force(&METRIC_DETECTION_COUNT);
    LazyLock::force(&METRIC_HISTORY_SAVED);
    LazyLock::force(&METRIC_HISTORY_DELETED);

    TextEncoder::new().encode_to_string(&gather())
}
