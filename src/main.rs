// src/main.rs

mod api;
mod cli;
mod host;
mod settings;
mod sprites;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

fn main() {
    // .env first so RUST_LOG and the SPRITEDB_* overrides are visible
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = cli::Cli::parse();
    if let Err(e) = cli::run(cli) {
        error!("{}", e);
        std::process::exit(1);
    }
}
