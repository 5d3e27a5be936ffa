//! Request and response data transfer objects for the REST API.
//!
//! All types derive `Serialize` and/or `Deserialize` for JSON marshalling via
//! Axum. Responses use camelCase field names where the dashboard expects
//! them.

use seamaster_core::record::Record;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Query parameters for `GET /api/data`.
///
/// `offset` and `limit` arrive as raw strings so that non-numeric values can
/// be ignored (treated as absent) rather than rejected by the extractor.
#[derive(Debug, Default, Deserialize)]
pub struct DataQuery {
    pub search: Option<String>,
    pub offset: Option<String>,
    pub limit: Option<String>,
}

/// Response body for `GET /api/data`.
#[derive(Debug, Serialize)]
pub struct DataResponse {
    pub data: Vec<Record>,
    pub total: usize,
    pub filtered: usize,
    /// Server time in unix milliseconds.
    pub timestamp: u64,
}

/// Body of `POST /api/save` and `POST /save`: either the full envelope or a
/// bare array. `user` and `timestamp` are logged for audit purposes only —
/// there is no optimistic-concurrency check behind them.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SaveRequest {
    Envelope {
        data: serde_json::Value,
        #[serde(default)]
        user: Option<String>,
        #[serde(default)]
        timestamp: Option<serde_json::Value>,
    },
    Raw(serde_json::Value),
}

/// Response body for save and upload operations.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveResponse {
    pub success: bool,
    pub message: String,
    pub item_count: usize,
}

/// Response body for `GET /health` and `GET /api/health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub environment: String,
    pub record_count: usize,
}

/// Response body for `GET /api/stats`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total_records: usize,
    /// Backing file size in bytes; absent when the file cannot be statted.
    pub file_size_bytes: Option<u64>,
    /// Backing file mtime in unix seconds; absent when the file cannot be statted.
    pub file_modified: Option<u64>,
    /// Count-by-value of the conventional status field, present only when the
    /// first record carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_distribution: Option<BTreeMap<String, usize>>,
}

/// Response body for `GET /debug`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugResponse {
    pub environment: String,
    pub data_file: String,
    pub data_file_exists: bool,
    pub record_count: usize,
    pub working_dir: String,
}

/// One entry of `GET /debug/files`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugFileEntry {
    pub name: String,
    pub size_bytes: u64,
}

/// Response body for `GET /debug/files`.
#[derive(Debug, Serialize)]
pub struct DebugFilesResponse {
    pub dir: String,
    pub files: Vec<DebugFileEntry>,
}
