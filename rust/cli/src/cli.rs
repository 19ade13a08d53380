use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "handledger",
    version,
    about = "Settle poker hands from their action sequence and keep a hand history"
)]
pub struct HandLedgerCli {
    /// Log to stderr (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// SQLite database to use instead of the configured one
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Settle one hand given as JSON and print the record
    Settle {
        /// JSON file with the hand, or `-` for stdin
        #[arg(long, value_name = "FILE")]
        input: String,
        /// Keep the record in the hand history
        #[arg(long)]
        store: bool,
    },
    /// Check an action sequence without settling anything
    Validate {
        /// e.g. "r80 c / Flop: [2s,3d,5h] / x x"
        sequence: String,
    },
    /// List stored hands
    List,
    /// Print one stored hand
    Show {
        /// Hand id
        id: String,
    },
    /// Display the resolved configuration and where each value came from
    Cfg,
}

impl Commands {
    pub fn uses_history(&self) -> bool {
        matches!(
            self,
            Commands::Settle { store: true, .. } | Commands::List | Commands::Show { .. }
        )
    }
}
