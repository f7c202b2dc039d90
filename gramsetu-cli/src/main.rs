//! gramsetu-cli entry point

mod api;
mod cli;
mod config;
mod import;

use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use env_logger::Env;
use is_terminal::IsTerminal;

use cli::{Cli, Commands};
use config::Config;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    if !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    match run().await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {:#}", "Error:".red().bold(), err);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Import(args) => cli::commands::import::handle_import_command(args, config).await,
    }
}
