use alloy::primitives::{hex, B256};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

use ctf_solver::header::{block_hash, reconstruct, HeaderField, HeaderFields};
use ctf_solver::observability::logging;

#[derive(Parser)]
#[command(name = "header-tool")]
#[command(about = "Offline block header reconstruction from saved JSON-RPC blocks", long_about = None)]
struct Cli {
    /// Log level when RUST_LOG is unset.
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find the RLP header encoding that hashes to the block hash
    Reconstruct {
        /// Block JSON (`eth_getBlockByNumber` result or full response)
        file: PathBuf,

        /// Target hash; defaults to the block's `hash` field
        #[arg(long)]
        hash: Option<B256>,
    },
    /// Print every field's canonical bytes
    Fields {
        file: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init(&cli.log_level);

    match cli.command {
        Commands::Reconstruct { file, hash } => {
            let block = read_block(&file)?;
            let target = match hash {
                Some(hash) => hash,
                None => block_hash(&block)?,
            };

            let fields = HeaderFields::from_json(&block)?;
            let found = reconstruct(target, &fields)?;
            let output = json!({
                "hash": target.to_string(),
                "included": found.included.iter().map(ToString::to_string).collect::<Vec<_>>(),
                "attempts": found.attempts,
                "rlp": hex::encode_prefixed(&found.encoding),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Commands::Fields { file } => {
            let fields = HeaderFields::from_json(&read_block(&file)?)?;
            for field in HeaderField::MANDATORY.into_iter().chain(HeaderField::OPTIONAL) {
                match fields.get(field) {
                    Some(value) => println!("{:<22} {}", field, hex::encode_prefixed(value.canonical())),
                    None => println!("{:<22} (absent)", field),
                }
            }
        }
    }

    Ok(())
}

/// Accepts a bare block object or a JSON-RPC response wrapping one.
fn read_block(path: &Path) -> Result<Value, Box<dyn std::error::Error>> {
    let json: Value = serde_json::from_str(&std::fs::read_to_string(path)?)?;
    match json.get("result") {
        Some(result) if result.is_object() => Ok(result.clone()),
        _ => Ok(json),
    }
}
