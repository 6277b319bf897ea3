use anyhow::{Context, Result};
use clap::Parser;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use winery_supervisor::{LauncherConfig, Supervisor, SupervisorEvent};

/// Winery Launcher - runs a local Winery for a repository
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path (YAML)
    #[arg(short, long, value_name = "FILE", env = "WINERY_LAUNCHER_CONFIG")]
    config: PathBuf,

    /// Repository directory served by the Winery
    #[arg(short, long, value_name = "DIR")]
    repository: PathBuf,

    /// Data directory (overrides config)
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Run duration in seconds (for testing)
    #[arg(long)]
    run_duration: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = LauncherConfig::load_from_file(&args.config)?;
    if let Some(data_dir) = args.data_dir {
        config.launcher.data_dir = data_dir;
    }

    let paths = config.paths();
    std::fs::create_dir_all(&paths.data_dir)
        .with_context(|| format!("Failed to create data directory: {}", paths.data_dir.display()))?;

    initialize_logging(args.debug, &paths.backend_log)?;

    info!("Starting Winery Launcher");
    info!("Config file: {}", args.config.display());
    info!("Data directory: {}", paths.data_dir.display());

    let supervisor = Supervisor::new(config)
        .with_context(|| format!("Failed to open service log: {}", paths.service_log.display()))?;
    let mut events = supervisor.subscribe();

    // Set up signal handlers for graceful shutdown
    let shutdown_signal = setup_signal_handlers();

    if let Err(e) = supervisor.start(&args.repository).await {
        error!("Failed to start the Winery: {}", e);
        return Err(anyhow::anyhow!("Start failed: {}", e));
    }

    info!("Winery available at {}", supervisor.backend_url()?);
    info!("Repository: {}", args.repository.display());

    let run_duration = async {
        match args.run_duration {
            Some(duration) => {
                info!("Running for {} seconds (test mode)", duration);
                tokio::time::sleep(tokio::time::Duration::from_secs(duration)).await;
            }
            None => std::future::pending::<()>().await,
        }
    };

    let crashed = async {
        loop {
            match events.recv().await {
                Ok(SupervisorEvent::UnexpectedExit { error, exit }) => {
                    error!("Winery stopped unexpectedly ({}): {}", exit, error);
                    return error;
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Missed {} supervisor events", skipped);
                }
                Err(RecvError::Closed) => std::future::pending::<()>().await,
            }
        }
    };

    tokio::select! {
        _ = shutdown_signal => {}
        _ = run_duration => {}
        error = crashed => {
            return Err(anyhow::anyhow!("Winery exited: {}", error));
        }
    }

    info!("Shutting down the Winery...");
    supervisor.stop().await;
    info!("Winery Launcher shut down successfully");

    Ok(())
}

/// Console output plus an append-only `backend.log` in the data directory.
fn initialize_logging(debug: bool, log_file: &Path) -> Result<()> {
    let level = if debug { "debug" } else { "info" };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("Failed to open log file: {}", log_file.display()))?;

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with(fmt::layer().with_target(false).with_thread_ids(true))
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();

    Ok(())
}

async fn setup_signal_handlers() {
    use tokio::signal;

    #[cfg(unix)]
    {
        let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to create SIGTERM handler");
        let mut sigint = signal::unix::signal(signal::unix::SignalKind::interrupt())
            .expect("Failed to create SIGINT handler");

        tokio::select! {
            _ = sigterm.recv() => {
                info!("Received SIGTERM signal");
            }
            _ = sigint.recv() => {
                info!("Received SIGINT signal");
            }
        }
    }

    #[cfg(windows)]
    {
        let _ = signal::ctrl_c().await;
        info!("Received Ctrl+C signal");
    }
}
