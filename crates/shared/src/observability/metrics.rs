//! 指标定义模块
//!
//! 基于 metrics crate 描述级联操作相关指标。
//! 具体的 recorder（如 Prometheus）由宿主进程安装，未安装时指标调用为空操作。

/// 级联操作次数，标签：operation, outcome
pub const CASCADES_TOTAL: &str = "hierarchy_cascades_total";

/// 级联操作影响的行数，标签：operation, table
pub const CASCADE_ROWS_TOTAL: &str = "hierarchy_cascade_rows_total";

/// 级联操作耗时（秒），标签：operation
pub const CASCADE_DURATION_SECONDS: &str = "hierarchy_cascade_duration_seconds";

/// 注册级联相关指标描述
pub fn register_cascade_metrics(service_name: &str) {
    metrics::describe_counter!(CASCADES_TOTAL, "Total number of cascade operations");
    metrics::describe_counter!(
        CASCADE_ROWS_TOTAL,
        "Rows deactivated or deleted by cascade operations"
    );
    metrics::describe_histogram!(
        CASCADE_DURATION_SECONDS,
        "Cascade operation duration in seconds"
    );

    metrics::counter!("service_starts_total", "service" => service_name.to_string()).increment(1);
}

/// 记录一次级联操作
pub fn record_cascade(operation: &str, outcome: &str, duration_secs: f64) {
    metrics::counter!(
        CASCADES_TOTAL,
        "operation" => operation.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);

    metrics::histogram!(CASCADE_DURATION_SECONDS, "operation" => operation.to_string())
        .record(duration_secs);
}

/// 记录级联在某张表上影响的行数
pub fn record_cascade_rows(operation: &str, table: &str, rows: u64) {
    if rows == 0 {
        return;
    }

    metrics::counter!(
        CASCADE_ROWS_TOTAL,
        "operation" => operation.to_string(),
        "table" => table.to_string()
    )
    .increment(rows);
}
