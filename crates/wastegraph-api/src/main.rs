//! WasteGraph server binary
//!
//! Starts the HTTP server for the waste-collection road network.

use anyhow::Context;
use clap::Parser;
use std::process;
use wastegraph_api::{config::ServerConfig, start_server};

/// WasteGraph - road network service for waste collection
#[derive(Debug, Parser)]
#[command(name = "wastegraph")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Configuration file path (TOML)
    #[arg(short, long, env = "WASTEGRAPH_CONFIG")]
    config: Option<String>,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match cli.config {
        Some(path) => ServerConfig::from_file(&path)
            .with_context(|| format!("loading configuration from {}", path))?,
        None => {
            eprintln!("Warning: No config file specified, using default development configuration");
            eprintln!("Usage: wastegraph --config <path-to-config.toml>");
            eprintln!();
            ServerConfig::default_test_config()
        }
    };

    start_server(config).await?;

    Ok(())
}
