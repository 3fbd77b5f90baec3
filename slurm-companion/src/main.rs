mod command;
mod commands;
mod config;
mod display;
mod infrastructure;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use crate::command::{Cli, Command};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("{}: {e:#}", "Error".red().bold());
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Nodes(args) => commands::nodes::execute(args).await,
        Command::Queue(args) => commands::queue::execute(args).await,
        Command::Run(args) => commands::run::execute(args).await,
        Command::Cancel(args) => commands::cancel::execute(args).await,
        Command::Logs(args) => commands::logs::execute(args).await,
    }
}
