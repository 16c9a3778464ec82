//! guidegen CLI: turns a guide description into a publishable sfguides archive.
//!
//! Also exposes the validator, the category table, the learning-environment
//! constraint checks and a thin REST API client.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
