pub mod columns;
pub mod config;
pub mod inspect;
pub mod read;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "ledgerline",
    version,
    about = "Normalize bank statement exports into plain transaction lines."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print one normalized line per transaction.
    Read {
        /// Path to a CSV, XLS or XLSX file
        file: String,
        /// Declared file type, overrides the extension (e.g. csv)
        #[arg(long)]
        format: Option<String>,
        /// Truncate output to this many characters
        #[arg(long = "max-chars")]
        max_chars: Option<usize>,
    },
    /// Show how a file was read: delimiter, header row, tier, column mapping.
    Inspect {
        /// Path to a CSV, XLS or XLSX file
        file: String,
        /// Declared file type, overrides the extension (e.g. csv)
        #[arg(long)]
        format: Option<String>,
    },
    /// Print the normalized name for each header cell.
    Columns {
        /// Header cells, e.g. "Txn Date" Memo Debit Credit
        #[arg(required = true)]
        headers: Vec<String>,
    },
    /// Show settings, or write a default settings file.
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Write default settings to the settings file.
    Init {
        /// Overwrite an existing settings file
        #[arg(long)]
        force: bool,
    },
}
