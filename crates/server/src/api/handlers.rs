//! HTTP request handlers and shared application state.
//!
//! Each public async function corresponds to an API route registered in
//! [`create_router`](crate::api::create_router). Handlers extract query/body
//! parameters via Axum extractors and delegate to the
//! [`Store`](seamaster_core::store::Store) and the query layer, returning
//! JSON responses or [`ApiError`](crate::api::errors::ApiError) on failure.
//!
//! Writes validate the payload before touching the store; the store commits
//! memory only after the disk rename succeeds, so a failed save leaves
//! nothing changed.

use crate::api::auth::AdminCredentials;
use crate::api::errors::ApiError;
use crate::api::metrics;
use crate::api::models::*;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::Json;
use metrics_exporter_prometheus::PrometheusHandle;
use seamaster_core::ingest::{self, UploadFormat};
use seamaster_core::query::{run_query, QueryParams};
use seamaster_core::record::{dataset_from_value, field_text};
use seamaster_core::store::Store;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// Shared application state passed to every handler via Axum's `State`
/// extractor.
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub data_dir: PathBuf,
    pub static_dir: PathBuf,
    pub environment: String,
    /// `None` disables the Basic-Auth gate (dev mode).
    pub admin: Option<AdminCredentials>,
    pub prometheus_handle: PrometheusHandle,
    pub start_time: Instant,
}

/// `GET /api/data` — the dataset with optional search/offset/limit applied.
///
/// Non-numeric `offset`/`limit` values are ignored. `total` is the unfiltered
/// dataset size, `filtered` the match count before pagination.
pub async fn get_data(
    State(state): State<AppState>,
    Query(query): Query<DataQuery>,
) -> Json<DataResponse> {
    let params = QueryParams {
        search: query.search,
        offset: QueryParams::parse_index(query.offset.as_deref()),
        limit: QueryParams::parse_index(query.limit.as_deref()),
    };

    let snapshot = state.store.snapshot();
    let result = run_query(&snapshot, &params);
    metrics::record_query(result.filtered);

    Json(DataResponse {
        data: result.records,
        total: result.total,
        filtered: result.filtered,
        timestamp: unix_millis(),
    })
}

/// `POST /api/save` — wholesale dataset replacement.
pub async fn save(
    State(state): State<AppState>,
    Json(req): Json<SaveRequest>,
) -> Result<Json<SaveResponse>, ApiError> {
    let count = apply_save(&state, req)?;
    Ok(Json(SaveResponse {
        success: true,
        message: format!("Saved {count} records"),
        item_count: count,
    }))
}

/// `POST /save` — legacy alias with a plain-text response.
pub async fn save_legacy(
    State(state): State<AppState>,
    Json(req): Json<SaveRequest>,
) -> (StatusCode, String) {
    match apply_save(&state, req) {
        Ok(count) => (StatusCode::OK, format!("OK: saved {count} records")),
        Err(SaveError::Validation(msg)) => (StatusCode::BAD_REQUEST, msg),
        Err(SaveError::Io(_)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Write failed".to_string(),
        ),
    }
}

enum SaveError {
    Validation(String),
    Io(io::Error),
}

impl From<SaveError> for ApiError {
    fn from(e: SaveError) -> Self {
        match e {
            SaveError::Validation(msg) => ApiError::BadRequest(msg),
            SaveError::Io(_) => ApiError::Internal("Write failed".into()),
        }
    }
}

fn apply_save(state: &AppState, req: SaveRequest) -> Result<usize, SaveError> {
    let (payload, user, timestamp) = match req {
        SaveRequest::Envelope {
            data,
            user,
            timestamp,
        } => (data, user, timestamp),
        SaveRequest::Raw(value) => (value, None, None),
    };

    let dataset = dataset_from_value(payload).map_err(SaveError::Validation)?;
    let count = state.store.replace(dataset).map_err(|e| {
        tracing::error!("Dataset write failed: {}", e);
        SaveError::Io(e)
    })?;

    metrics::record_store_operation("save");
    tracing::info!(
        records = count,
        user = user.as_deref().unwrap_or("unknown"),
        client_timestamp = ?timestamp,
        "Dataset replaced"
    );
    Ok(count)
}

/// `POST /api/upload` — bulk import from a raw JSON array or CSV body.
///
/// The body is classified by `Content-Type`, falling back to sniffing the
/// first non-whitespace byte. Either way the result replaces the dataset
/// wholesale, like a save.
pub async fn upload(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<SaveResponse>, ApiError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());

    let dataset = match ingest::classify(content_type, &body) {
        UploadFormat::Json => {
            let value: serde_json::Value = serde_json::from_str(&body)
                .map_err(|e| ApiError::BadRequest(format!("Invalid JSON body: {e}")))?;
            dataset_from_value(value).map_err(ApiError::BadRequest)?
        }
        UploadFormat::Csv => ingest::parse_csv(&body).map_err(ApiError::BadRequest)?,
    };

    let count = state.store.replace(dataset).map_err(|e| {
        tracing::error!("Dataset write failed: {}", e);
        ApiError::Internal("Write failed".into())
    })?;

    metrics::record_store_operation("upload");
    tracing::info!(records = count, "Upload imported");
    Ok(Json(SaveResponse {
        success: true,
        message: format!("Imported {count} records"),
        item_count: count,
    }))
}

/// `GET /health` and `GET /api/health` — process status and record count.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        environment: state.environment.clone(),
        record_count: state.store.len(),
    })
}

/// `GET /api/stats` — dataset size, backing file stats, and the status
/// breakdown when the first record carries a conventional status field.
pub async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let snapshot = state.store.snapshot();

    let (file_size_bytes, file_modified) = match state.store.file_stats() {
        Ok((size, mtime)) => (Some(size), Some(unix_secs(mtime))),
        Err(e) => {
            tracing::warn!("Could not stat data file: {}", e);
            (None, None)
        }
    };

    // The status key of the first record decides the breakdown field for the
    // whole dataset; records without it are skipped.
    let status_distribution = snapshot
        .first()
        .and_then(|r| r.status_key().map(str::to_owned))
        .map(|key| {
            let mut counts = BTreeMap::new();
            for record in &snapshot {
                if let Some(value) = record.0.get(&key) {
                    *counts.entry(field_text(value)).or_insert(0) += 1;
                }
            }
            counts
        });

    Json(StatsResponse {
        total_records: snapshot.len(),
        file_size_bytes,
        file_modified,
        status_distribution,
    })
}

/// `GET /debug` — diagnostic snapshot of the process environment.
pub async fn debug_info(State(state): State<AppState>) -> Json<DebugResponse> {
    Json(DebugResponse {
        environment: state.environment.clone(),
        data_file: state.store.path().display().to_string(),
        data_file_exists: state.store.path().exists(),
        record_count: state.store.len(),
        working_dir: std::env::current_dir()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| "<unknown>".to_string()),
    })
}

/// `GET /debug/files` — names and sizes of files in the data directory.
pub async fn debug_files(
    State(state): State<AppState>,
) -> Result<Json<DebugFilesResponse>, ApiError> {
    let entries = fs::read_dir(&state.data_dir).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ApiError::NotFound("Data directory does not exist".to_string()),
        _ => ApiError::Internal(format!("Cannot read data dir: {e}")),
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ApiError::Internal(e.to_string()))?;
        let meta = entry
            .metadata()
            .map_err(|e| ApiError::Internal(e.to_string()))?;
        if meta.is_file() {
            files.push(DebugFileEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                size_bytes: meta.len(),
            });
        }
    }
    files.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(Json(DebugFilesResponse {
        dir: state.data_dir.display().to_string(),
        files,
    }))
}

/// `GET /metrics` — returns Prometheus-formatted metrics.
pub async fn metrics_endpoint(State(state): State<AppState>) -> String {
    state.prometheus_handle.render()
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn unix_secs(t: SystemTime) -> u64 {
    t.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
