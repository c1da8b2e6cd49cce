//! Challenge solver.
//!
//! # Flow
//!
//! ```text
//!  solver.toml ──▶ config ──▶ network profile (--local?)
//!                                  │
//!      env var ──▶ wallet ─────────┤
//!                                  ▼
//!                          BlockchainClient ──▶ TxBuilder
//!                                                   │
//!                                                   ▼
//!   for each challenge:  isSolved? ──yes──▶ skip
//!                           │ no
//!                           ▼
//!                        exploit ──▶ TxIntent ──▶ sign, send, confirm ──▶ isSolved?
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use ctf_solver::blockchain::{BlockchainClient, TxBuilder, Wallet};
use ctf_solver::config::load_config;
use ctf_solver::observability::logging;
use ctf_solver::runner::{self, NonInteractive, Prompt, Runner, StdinPrompt};

#[derive(Parser)]
#[command(name = "ctf-solver")]
#[command(about = "Solve on-chain security challenges and mint their completion tokens", long_about = None)]
struct Cli {
    /// Use the local network profile and its key.
    #[arg(long)]
    local: bool,

    /// Configuration file.
    #[arg(short, long, default_value = "solver.toml")]
    config: PathBuf,

    /// Only run these challenge ids (repeatable).
    #[arg(short = 'n', long = "challenge")]
    challenges: Vec<u32>,

    /// Never prompt; continue past failures.
    #[arg(short, long)]
    yes: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!(error = %e, "Fatal error");
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<bool, Box<dyn std::error::Error>> {
    let config = load_config(&cli.config)?;
    logging::init(&config.observability.log_level);

    let profile = config.profile(cli.local).clone();
    tracing::info!(
        profile = if cli.local { "local" } else { "network" },
        rpc_url = %profile.rpc_url,
        chain_id = profile.chain_id,
        "Configuration loaded"
    );

    let selected = runner::select(&config.challenges, &cli.challenges)
        .map_err(|id| format!("challenge {} is not configured", id))?;

    let wallet = Wallet::from_env(&profile.private_key_env, profile.chain_id)?;
    let client = BlockchainClient::new(profile)?;
    if let Err(e) = client.verify_chain_id().await {
        // Keep going: a misconfigured chain id shows up again when signing.
        tracing::warn!(error = %e, "Chain verification failed");
    }

    let tx = TxBuilder::new(
        client,
        wallet,
        Duration::from_millis(config.runner.poll_interval_ms),
    );
    let solver = Runner::new(tx, config.runner.clone());

    let mut prompt: Box<dyn Prompt> = if cli.yes || !config.runner.interactive {
        Box::new(NonInteractive)
    } else {
        Box::new(StdinPrompt::stdin())
    };

    let report = solver.run_all(&selected, prompt.as_mut()).await;
    print!("{}", report);
    Ok(report.all_succeeded())
}
