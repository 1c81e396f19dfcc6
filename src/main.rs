// src/main.rs
use anyhow::Result;
use clap::Parser;

use reverbcheckr::cli::{self, Cli};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp_millis()
        .init();

    cli::run(cli)
}
