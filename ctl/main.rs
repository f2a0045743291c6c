#![forbid(unsafe_code)]

//! `firstchar-ctl` — interactive requester for `firstchar-server`.
//!
//! Reads lines from stdin, sends each to the server's `first_char` method,
//! and prints the reply. Exits 0 at end-of-input, 1 on any fatal error.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tokio::io::BufReader;

use firstchar_bus::bus::{self, ZbusTransport};
use firstchar_bus::config::BusKind;
use firstchar_bus::logging::{init_tracing, LogFormat};
use firstchar_bus::requester::{run_input_loop, LoopSummary, Requester};
use firstchar_bus::{AppError, Config, Result};

#[derive(Debug, Parser)]
#[command(
    name = "firstchar-ctl",
    about = "Send lines to firstchar-server and print its replies",
    version,
    long_about = None
)]
struct Cli {
    /// Optional TOML configuration file (must match the server's `[address]`).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Bus to connect to, overriding the config file.
    #[arg(long, value_enum)]
    bus: Option<BusKind>,

    /// Seconds to wait for each reply, overriding the config file.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    timeout_seconds: Option<u64>,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

fn main() -> ExitCode {
    let args = Cli::parse();
    if let Err(err) = init_tracing(args.log_format, "warn") {
        eprintln!("{err}");
        return ExitCode::FAILURE;
    }

    let outcome = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))
        .and_then(|runtime| runtime.block_on(run(args)));

    match outcome {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Cli) -> Result<LoopSummary> {
    let mut config = Config::load(args.config.as_deref())?;
    if let Some(kind) = args.bus {
        config.bus = kind;
    }
    if let Some(seconds) = args.timeout_seconds {
        config.reply_timeout_seconds = seconds;
    }

    let conn = bus::connect(&config).await?;
    let requester = Requester::from_config(Arc::new(ZbusTransport::new(conn)), &config);

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    run_input_loop(stdin, &mut stdout, &requester).await
}
