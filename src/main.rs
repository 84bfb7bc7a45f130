use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use gcp_inventory::config::{Config, FileConfig, Overrides};
use gcp_inventory::gcp::auth::GcpCredentials;
use gcp_inventory::gcp::{GcpClient, Inventory};
use gcp_inventory::server::{build_router, AppState};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::signal;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// HTTP API listing GCP instances and disks across all zones
#[derive(Parser, Debug)]
#[command(name = "gcp-inventory", version = gcp_inventory::VERSION, about, long_about = None)]
struct Args {
    /// GCP project to inventory
    #[arg(short, long, env = "GCP_INVENTORY_PROJECT")]
    project: Option<String>,

    /// Pin the single-resource endpoint to this resource name
    #[arg(long, env = "GCP_INVENTORY_RESOURCE_ID")]
    id: Option<String>,

    /// Address to listen on [default: 0.0.0.0:8080]
    #[arg(short, long, env = "GCP_INVENTORY_BIND")]
    bind: Option<String>,

    /// Per-request deadline for the zone fan-out, in seconds [default: 30]
    #[arg(long, env = "GCP_INVENTORY_TIMEOUT")]
    request_timeout: Option<u64>,

    /// Compute Engine API endpoint
    #[arg(long, env = "GCP_INVENTORY_COMPUTE_ENDPOINT")]
    compute_endpoint: Option<String>,

    /// Use this access token instead of Application Default Credentials
    #[arg(long, env = "GCP_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    /// Config file [default: <config dir>/gcp-inventory/config.json]
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (RUST_LOG takes precedence)
    #[arg(long, value_enum, default_value = "info")]
    log_level: LogLevel,

    /// Write logs to this file instead of stdout
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

fn setup_logging(level: LogLevel, log_file: Option<&Path>) -> Result<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_directive()));

    let (writer, guard) = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_appender::non_blocking(file)
        }
        None => tracing_appender::non_blocking(std::io::stdout()),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(log_file.is_none())
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level, args.log_file.as_deref())?;

    let file = FileConfig::load(args.config.as_deref())?;
    let config = Config::resolve(
        Overrides {
            project_id: args.project,
            resource_id: args.id,
            bind_addr: args.bind,
            request_timeout_secs: args.request_timeout,
            compute_endpoint: args.compute_endpoint,
        },
        file,
    )?;

    tracing::info!(
        "gcp-inventory {} using project: {}, endpoint: {}",
        gcp_inventory::VERSION,
        config.project_id,
        config.compute_endpoint
    );
    if let Some(id) = &config.pinned_resource_id {
        tracing::info!("Pinned to resource: {}", id);
    }

    let credentials = match args.access_token {
        Some(token) => GcpCredentials::from_access_token(token),
        None => GcpCredentials::new()
            .await
            .context("Failed to initialize GCP credentials")?,
    };
    let client = GcpClient::with_credentials(&config.project_id, credentials)?
        .with_endpoint(config.compute_endpoint.as_str());
    let inventory: Arc<dyn Inventory> = Arc::new(client);

    let bind_addr = config.bind_addr;
    let app = build_router(AppState::new(inventory, config));

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;
    tracing::info!("Listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down gracefully");
        },
        () = terminate => {
            tracing::info!("Received SIGTERM, shutting down gracefully");
        },
    }
}
