//! CLI entry point for the saturation monitor.
//!
//! `serve` runs the dashboard and JSON API. `aggregate` and `routes` work
//! offline against a CSV file and the route table.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use saturation_monitor::api;
use saturation_monitor::model::RouteRegistry;
use saturation_monitor::output::history_to_csv;
use saturation_monitor::parser::parse_history;
use saturation_monitor::state::{AppState, Monitor};
use saturation_monitor::storage::LocalDirStore;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "saturation_monitor")]
#[command(about = "Transit route saturation monitor", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the dashboard and JSON API
    Serve {
        /// Address to bind
        #[arg(long, env = "HOST", default_value = "0.0.0.0")]
        host: String,

        /// Port to listen on
        #[arg(short, long, env = "PORT", default_value_t = 5000)]
        port: u16,

        /// Directory receiving uploaded and exported CSV files
        #[arg(short, long, env = "UPLOADS_DIR", default_value = "uploads")]
        uploads_dir: PathBuf,

        /// JSON file overriding the built-in route table
        #[arg(long, env = "ROUTES_FILE")]
        routes_file: Option<PathBuf>,
    },
    /// Aggregate a historical CSV offline and log the resulting route states
    Aggregate {
        /// CSV file with route,date,time,saturation,estimated_minutes columns
        #[arg(value_name = "CSV")]
        source: PathBuf,

        /// Optionally write the validated rows back out in canonical form
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// JSON file overriding the built-in route table
        #[arg(long, env = "ROUTES_FILE")]
        routes_file: Option<PathBuf>,
    },
    /// Log the configured route table
    Routes {
        /// JSON file overriding the built-in route table
        #[arg(long, env = "ROUTES_FILE")]
        routes_file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/saturation_monitor.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("saturation_monitor.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            host,
            port,
            uploads_dir,
            routes_file,
        } => {
            serve(&host, port, uploads_dir, routes_file.as_deref()).await?;
        }
        Commands::Aggregate {
            source,
            output,
            routes_file,
        } => {
            let bytes = std::fs::read(&source)
                .with_context(|| format!("failed to read '{}'", source.display()))?;
            let records = parse_history(&bytes)?;

            if let Some(output) = output {
                std::fs::write(&output, history_to_csv(&records)?)?;
                info!(path = %output.display(), "Canonical CSV written");
            }

            let mut monitor = Monitor::new(load_routes(routes_file.as_deref())?);
            let summary = monitor.ingest(records);
            for route in monitor.routes().iter() {
                let updated = summary.aggregate.routes_updated.contains(&route.code);
                info!(
                    route = %route.code,
                    saturation = %route.saturation,
                    minutes = route.estimated_minutes.get(),
                    updated,
                    "Route"
                );
            }
            if !summary.aggregate.unknown_routes.is_empty() {
                warn!(
                    codes = ?summary.aggregate.unknown_routes,
                    "Records for unknown routes were ignored"
                );
            }
            info!(records = summary.records_count, "Aggregation summary");
        }
        Commands::Routes { routes_file } => {
            let routes = load_routes(routes_file.as_deref())?;
            for route in routes.iter() {
                info!(
                    route = %route.code,
                    name = %route.name,
                    saturation = %route.saturation,
                    minutes = route.estimated_minutes.get(),
                    path_points = route.path.len(),
                    "Route"
                );
            }
            info!(total = routes.len(), "Route table");
        }
    }

    Ok(())
}

/// Built-in table unless a JSON override is given.
fn load_routes(path: Option<&Path>) -> Result<RouteRegistry> {
    match path {
        Some(path) => RouteRegistry::load(path)
            .with_context(|| format!("failed to load routes from '{}'", path.display())),
        None => Ok(RouteRegistry::default()),
    }
}

#[tracing::instrument(skip(uploads_dir, routes_file))]
async fn serve(
    host: &str,
    port: u16,
    uploads_dir: PathBuf,
    routes_file: Option<&Path>,
) -> Result<()> {
    let routes = load_routes(routes_file)?;
    let files = LocalDirStore::create(&uploads_dir).await?;
    info!(uploads_dir = %files.dir().display(), "Upload folder ready");

    let state = AppState::new(Monitor::new(routes), files);
    let app = api::router(state);

    let listener = TcpListener::bind((host, port))
        .await
        .with_context(|| format!("failed to bind {host}:{port}"))?;
    info!(address = %listener.local_addr()?, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown requested");
        })
        .await?;

    Ok(())
}
