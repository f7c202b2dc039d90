//! Command-line interface definition

pub mod commands;

use clap::{Parser, Subcommand};

use commands::import::ImportCommands;

#[derive(Parser, Debug)]
#[command(
    name = "gramsetu-cli",
    version,
    about = "Bulk resident import for the GramSetu citizen services platform"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Import residents from an Excel sheet
    #[command(subcommand)]
    Import(ImportCommands),
}
