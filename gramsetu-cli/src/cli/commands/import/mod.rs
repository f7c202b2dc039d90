//! Import subcommand arguments

mod handler;

pub use handler::handle_import_command;

use std::path::PathBuf;

use clap::Subcommand;

#[derive(Subcommand, Debug)]
pub enum ImportCommands {
    /// Parse and validate a resident sheet without submitting anything
    Validate {
        /// Path to the .xlsx sheet
        #[arg(short, long)]
        file: PathBuf,

        /// Show only rows that carry validation errors
        #[arg(long)]
        errors_only: bool,

        /// Write an Excel validation report to this path
        #[arg(long, value_name = "PATH")]
        report: Option<PathBuf>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Validate a resident sheet and submit it to the backend in batches
    Submit {
        /// Path to the .xlsx sheet
        #[arg(short, long)]
        file: PathBuf,

        /// API base URL (overrides config file and GRAMSETU_API_URL)
        #[arg(long, value_name = "URL")]
        api_url: Option<String>,

        /// Records per batch (overrides config file and GRAMSETU_BATCH_SIZE)
        #[arg(long, value_name = "N")]
        batch_size: Option<usize>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },
}
