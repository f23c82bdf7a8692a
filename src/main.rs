use std::path::PathBuf;
use std::process::ExitCode;

use alloy::primitives::Address;
use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use lspscope::{config, Context};

#[derive(Debug, Parser)]
#[command(
    name = "lspscope",
    version,
    about = "Decode calldata and discover LUKSO digital assets"
)]
struct Args {
    /// HTTP JSON-RPC endpoint (e.g. https://rpc.testnet.lukso.network)
    #[arg(long, global = true)]
    rpc: Option<String>,

    /// WebSocket endpoint (e.g. wss://ws-rpc.testnet.lukso.network)
    #[arg(long, global = true)]
    ws: Option<String>,

    /// IPC path. Unix only.
    #[arg(long, global = true)]
    ipc: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Describe raw calldata as a function call
    Decode {
        /// Hex calldata, with or without 0x
        calldata: String,
    },
    /// Show the asset registry of an account
    Assets {
        owner: Address,
        /// Rebuild even if a persisted registry is still valid
        #[arg(long)]
        refresh: bool,
    },
    /// Classify a single contract
    Classify {
        address: Address,
        /// Account whose balance and ownership are reported
        #[arg(long)]
        owner: Option<Address>,
    },
    /// Track a token deployed from this machine
    Track { address: Address },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Args::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let mut config = config::load();
    if let Some(rpc) = args.rpc {
        config.rpc = Some(rpc);
    }
    if let Some(ws) = args.ws {
        config.ws = Some(ws);
    }
    if let Some(ipc) = args.ipc {
        config.ipc = Some(ipc.display().to_string());
    }

    let context = Context::open(&config).await?;
    tracing::debug!(endpoint = %context.endpoint_name(), "context ready");

    match args.command {
        Command::Decode { calldata } => print_json(&context.decode_calldata(&calldata).await?),
        Command::Assets { owner, refresh } => {
            let registry = if refresh {
                context.reconcile_assets(owner).await?
            } else {
                context.connect(owner).await?
            };
            print_json(&registry)
        }
        Command::Classify { address, owner } => {
            print_json(&context.classify_asset(address, owner).await)
        }
        Command::Track { address } => {
            let added = context.track_created_token(address)?;
            if !added {
                tracing::info!(%address, "token already tracked");
            }
            print_json(&context.created_tokens()?)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
