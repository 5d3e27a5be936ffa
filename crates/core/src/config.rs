//! Global configuration constants for the record store.
//!
//! Compile-time defaults and input limits are defined here; runtime
//! configuration is handled via CLI arguments and environment variables
//! in `main.rs`.

/// Default HTTP server port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default directory for the data file and recovery backups.
pub const DEFAULT_DATA_DIR: &str = "./data";

/// File name of the dataset inside the data directory.
pub const DATA_FILE_NAME: &str = "data.json";

/// Default directory of the static dashboard assets.
pub const DEFAULT_STATIC_DIR: &str = "./static";

/// Default environment name reported by the health and debug endpoints.
pub const DEFAULT_ENVIRONMENT: &str = "development";

/// The single admin account name checked by Basic Authentication.
pub const ADMIN_USERNAME: &str = "admin";

/// Authentication realm sent with 401 challenges.
pub const AUTH_REALM: &str = "SEA MASTER Dashboard";

/// Maximum HTTP request body size in bytes (10 MB).
pub const MAX_REQUEST_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Per-request timeout in seconds.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum number of concurrent in-flight requests.
pub const MAX_CONCURRENT_REQUESTS: usize = 512;

/// Global rate limit in requests per second.
pub const RATE_LIMIT_RPS: u64 = 100;
