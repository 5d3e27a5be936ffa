//! seamaster-server — HTTP server for the SEA MASTER record store.
//!
//! Provides the REST API and static dashboard serving.
//! Core dataset logic lives in `seamaster-core`.

/// REST API layer: Axum router, HTTP handlers, models, auth, metrics.
pub mod api;
