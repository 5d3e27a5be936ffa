use clap::Parser;
use seamaster_core::config;
use seamaster_core::store::Store;
use seamaster_server::api::auth::AdminCredentials;
use seamaster_server::api::handlers::AppState;
use seamaster_server::api::{create_router, metrics};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "seamaster", about = "Flat-file record store and dashboard")]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = config::DEFAULT_PORT)]
    port: u16,

    /// Directory holding the data file and recovery backups
    #[arg(short, long, env = "DATA_DIR", default_value = config::DEFAULT_DATA_DIR)]
    data_dir: String,

    /// Data file name inside the data directory
    #[arg(long, default_value = config::DATA_FILE_NAME)]
    data_file: String,

    /// Directory of the static dashboard assets
    #[arg(long, env = "STATIC_DIR", default_value = config::DEFAULT_STATIC_DIR)]
    static_dir: String,

    /// Environment name reported by health and debug endpoints
    #[arg(long, env = "APP_ENV", default_value = config::DEFAULT_ENVIRONMENT)]
    environment: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(
                    "seamaster_server=info"
                        .parse()
                        .expect("valid directive literal"),
                )
                .add_directive(
                    "seamaster_core=info"
                        .parse()
                        .expect("valid directive literal"),
                ),
        )
        .init();

    let args = Args::parse();

    if args.port == 0 {
        eprintln!("Error: port must be > 0");
        std::process::exit(1);
    }
    let data_path = std::path::Path::new(&args.data_dir);
    if data_path.exists() && !data_path.is_dir() {
        eprintln!(
            "Error: data_dir '{}' exists but is not a directory",
            args.data_dir
        );
        std::process::exit(1);
    }

    let data_file = PathBuf::from(&args.data_dir).join(&args.data_file);
    let store = Store::open(&data_file)?;

    // The admin password comes from the environment only, never argv.
    let admin = match std::env::var("SEAMASTER_ADMIN_PASSWORD") {
        Ok(password) if !password.is_empty() => {
            tracing::info!("Basic Authentication enabled");
            Some(AdminCredentials::new(password))
        }
        _ => {
            tracing::info!("SEAMASTER_ADMIN_PASSWORD not set — running in dev mode (no auth)");
            None
        }
    };

    let prometheus_handle =
        metrics_exporter_prometheus::PrometheusBuilder::new().install_recorder()?;

    let state = AppState {
        store: store.clone(),
        data_dir: PathBuf::from(&args.data_dir),
        static_dir: PathBuf::from(&args.static_dir),
        environment: args.environment.clone(),
        admin,
        prometheus_handle,
        start_time: Instant::now(),
    };

    // Uncaught panics flush the dataset before the process dies.
    let panic_store = store.clone();
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        tracing::error!("Panic: {info}; flushing dataset");
        panic_store.flush();
        default_hook(info);
    }));

    let app = create_router(state);
    let addr = format!("0.0.0.0:{}", args.port);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        port = args.port,
        data_file = %data_file.display(),
        static_dir = %args.static_dir,
        environment = %args.environment,
        records = store.len(),
        auth = std::env::var("SEAMASTER_ADMIN_PASSWORD").is_ok(),
        "seamaster ready"
    );

    // Refresh the dataset gauges in the background.
    let metrics_store = store.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(15));
        loop {
            interval.tick().await;
            metrics::update_store_metrics(&metrics_store);
        }
    });

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_signal())
        .await?;

    tracing::info!("All requests drained, flushing data...");
    store.flush();

    Ok(())
}

async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received SIGINT"),
        _ = terminate => tracing::info!("Received SIGTERM"),
    }

    tracing::info!("Shutting down gracefully, draining in-flight requests...");
}
