//! Prometheus metrics recording and background collection.

use metrics::{counter, gauge, histogram};
use seamaster_core::store::Store;
use std::time::Duration;

/// Records HTTP request metrics.
pub fn record_request(method: &str, path: &str, status: u16, duration: Duration) {
    let labels = [
        ("method", method.to_string()),
        ("path", path.to_string()),
        ("status", status.to_string()),
    ];
    counter!("http_requests_total", &labels).increment(1);
    histogram!("http_request_duration_seconds", &labels).record(duration.as_secs_f64());
}

/// Records a dataset write operation.
pub fn record_store_operation(operation: &str) {
    counter!(
        "seamaster_store_operations_total",
        "operation" => operation.to_string()
    )
    .increment(1);
}

/// Records a read query and its match count.
pub fn record_query(matched: usize) {
    counter!("seamaster_queries_total").increment(1);
    histogram!("seamaster_query_matches").record(matched as f64);
}

/// Updates the dataset-level Prometheus gauges.
pub fn update_store_metrics(store: &Store) {
    gauge!("seamaster_records_total").set(store.len() as f64);
    if let Ok((size, _)) = store.file_stats() {
        gauge!("seamaster_data_file_bytes").set(size as f64);
    }
}
