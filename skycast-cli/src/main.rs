//! Binary crate for the `skycast` terminal weather widget.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - The interactive prompt loop and its state machine
//! - Rendering the weather card

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod app;
mod cli;
mod display;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cmd = cli::Cli::parse();
    cmd.run().await
}
