// File: src/main.rs
// Stand-in Bitcoin node: load a captured dataset and answer JSON-RPC queries from it

use std::net::IpAddr;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

use btc_mock_node::web_server;
use btc_mock_node::{AppConfig, DataStore};

/// Command-line interface for the mock node
#[derive(Parser)]
#[command(name = "btc-mock-node")]
#[command(about = "Answers Bitcoin JSON-RPC chain queries from a pre-captured dataset")]
#[command(version)]
pub struct Cli {
    /// Path to the JSON dataset (block_headers, transactions, networkinfo)
    #[arg(value_name = "DATASET")]
    pub dataset: PathBuf,

    /// Bind address
    #[arg(short, long, default_value = "127.0.0.1")]
    pub bind: IpAddr,

    /// Server port
    #[arg(short, long, default_value = "8332")]
    pub port: u16,

    /// Enable CORS for browser clients
    #[arg(short, long)]
    pub cors: bool,

    /// Reload the dataset when the file changes
    #[arg(short, long)]
    pub watch: bool,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let config = AppConfig {
        dataset_path: cli.dataset,
        bind: cli.bind,
        port: cli.port,
        enable_cors: cli.cors,
        watch_dataset: cli.watch,
    };

    // Serving never starts on a missing or corrupt dataset
    let store = DataStore::load(&config.dataset_path)?;
    info!(best_height = ?store.block_count().ok(), "starting mock node");

    web_server::run_rpc_server(&config, store).await
}
