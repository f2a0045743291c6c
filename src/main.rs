#![forbid(unsafe_code)]

//! `firstchar-server` — answers `first_char` calls on the message bus.
//!
//! Claims the server well-known name (failing if another instance holds
//! it) and serves until SIGINT/SIGTERM or a fatal bus error.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use firstchar_bus::config::BusKind;
use firstchar_bus::logging::{init_tracing, LogFormat};
use firstchar_bus::{bus, responder, AppError, Config, Result};

#[derive(Debug, Parser)]
#[command(name = "firstchar-server", about = "first_char responder on the message bus", version, long_about = None)]
struct Cli {
    /// Optional TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Bus to connect to, overriding the config file.
    #[arg(long, value_enum)]
    bus: Option<BusKind>,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

fn main() -> ExitCode {
    let args = Cli::parse();
    if let Err(err) = init_tracing(args.log_format, "info") {
        eprintln!("{err}");
        return ExitCode::FAILURE;
    }

    let outcome = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))
        .and_then(|runtime| runtime.block_on(run(args)));

    match outcome {
        Ok(()) => {
            info!("firstchar-server shut down");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(%err, "firstchar-server failed");
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Cli) -> Result<()> {
    let mut config = Config::load(args.config.as_deref())?;
    if let Some(kind) = args.bus {
        config.bus = kind;
    }
    info!(config = ?args.config, "configuration loaded");

    let conn = bus::connect(&config).await?;

    let ct = CancellationToken::new();
    let signal_ct = ct.clone();
    tokio::spawn(async move {
        let signal = shutdown_signal().await;
        info!(signal, "shutdown signal received, releasing server name");
        signal_ct.cancel();
    });

    responder::serve(&conn, &config.address, ct).await
}

/// Resolve on SIGINT or SIGTERM so `serve` can release the server name.
async fn shutdown_signal() -> &'static str {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    let signal = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
        Ok(mut sigterm) => tokio::select! {
            _ = ctrl_c => "SIGINT",
            _ = sigterm.recv() => "SIGTERM",
        },
        Err(err) => {
            tracing::warn!(%err, "failed to register SIGTERM handler, using ctrl-c only");
            let _ = ctrl_c.await;
            "SIGINT"
        }
    };

    #[cfg(not(unix))]
    let signal = {
        if let Err(err) = ctrl_c.await {
            tracing::error!(%err, "ctrl-c signal handler failed");
        }
        "ctrl-c"
    };

    signal
}
