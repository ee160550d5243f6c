use anyhow::Result;
use clap::Parser;

use odplan::cli::{Cli, Commands};
use odplan::commands;

fn main() -> Result<()> {
    let cli = Cli::parse();
    match &cli.command {
        Commands::Plan(args) => commands::plan(&cli, args),
    }
}
