//! Binary crate for the `weather-archive` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive configuration
//! - Reading the city list and printing progress

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    init_tracing();

    let cmd = cli::Cli::parse();
    if let Err(err) = cmd.run().await {
        println!("An error occurred: {err:#}");
    }
}
