//! Sentinel agent daemon
//!
//! Runs the orchestration loop and the HTTP exposition service in one
//! process: a background task executes the browser suite on a schedule and
//! publishes snapshots; the web server reads whatever is currently
//! published.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod orchestrator;
mod report;

use config::AgentConfig;
use orchestrator::Orchestrator;
use report::ReportBuilder;
use sentinel_common::SnapshotStore;
use sentinel_runner::{ProcessRunner, ProcessRunnerConfig};
use sentinel_web::{ArtifactRoots, WebServer};

#[derive(Parser)]
#[command(name = "sentineld")]
#[command(about = "Sentinel daemon - synthetic browser monitoring")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "SENTINEL_CONFIG", default_value = "sentinel.toml")]
    config: PathBuf,

    /// Minutes to sleep between suite executions
    #[arg(long, env = "SENTINEL_SLEEP_MINS")]
    sleep_mins: Option<u64>,

    /// Glob selecting the scenario files to execute
    #[arg(long, env = "SENTINEL_SPEC_PATTERN")]
    spec_pattern: Option<String>,

    /// HTTP listen port
    #[arg(short, long, env = "SENTINEL_PORT")]
    port: Option<u16>,

    /// Kill a run after this many seconds
    #[arg(long, env = "SENTINEL_RUN_TIMEOUT_SECS")]
    run_timeout_secs: Option<u64>,

    /// Root directory for run artifacts
    #[arg(short, long, env = "SENTINEL_WORK_DIR")]
    work_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    info!("Sentinel daemon v{}", env!("CARGO_PKG_VERSION"));

    let mut config = AgentConfig::load(&cli.config)?;
    if let Some(mins) = cli.sleep_mins {
        config.sleep_mins = mins;
    }
    if let Some(pattern) = cli.spec_pattern {
        config.spec_pattern = pattern;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(secs) = cli.run_timeout_secs {
        config.runner.run_timeout_secs = Some(secs);
    }
    if let Some(dir) = cli.work_dir {
        config.work_dir = dir;
    }
    info!(
        sleep_mins = config.sleep_mins,
        spec = %config.spec_pattern,
        port = config.port,
        "config loaded"
    );

    // Ensure the evidence directories exist so listings work before the
    // first run completes
    tokio::fs::create_dir_all(config.videos_dir()).await?;
    tokio::fs::create_dir_all(config.screenshots_dir()).await?;
    tokio::fs::create_dir_all(config.report_dir()).await?;

    let store = SnapshotStore::new();

    let runner = Arc::new(ProcessRunner::new(ProcessRunnerConfig {
        program: config.runner.program.clone(),
        args: config.runner.args.clone(),
        working_dir: None,
        run_timeout: config.run_timeout(),
    }));

    let orchestrator = Orchestrator::new(
        runner,
        store.clone(),
        ReportBuilder::new(config.results_dir(), config.report_dir()),
        config.results_dir(),
        config.spec_pattern.clone(),
        config.sleep_interval(),
    );
    let orchestrator_handle = tokio::spawn(async move { orchestrator.run().await });

    let addr: SocketAddr = ([0, 0, 0, 0], config.port).into();
    let server = WebServer::new(
        store,
        ArtifactRoots {
            videos: config.videos_dir(),
            screenshots: config.screenshots_dir(),
            report: config.report_dir(),
        },
    )?;
    let server_handle = tokio::spawn(server.serve(addr));

    info!("Sentinel listening at http://localhost:{}", config.port);

    // Wait for shutdown signal
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
        }
        result = server_handle => {
            if let Err(e) = result {
                tracing::error!("Web server error: {}", e);
            }
        }
        result = orchestrator_handle => {
            if let Err(e) = result {
                tracing::error!("Orchestrator error: {}", e);
            }
        }
    }

    info!("Sentinel shutdown complete");
    Ok(())
}
