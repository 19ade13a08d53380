//! # Hand ledger CLI
//!
//! Command-line front end to the hand ledger: settle hands given as JSON,
//! check action sequences, and browse the SQLite hand history.
//!
//! The entry point is [`run`], which parses arguments, dispatches to a
//! subcommand and returns the process exit code.
//!
//! ```no_run
//! use std::io;
//! let args = vec!["handledger", "validate", "r80 c / Flop: [2s,3d,5h] / x x"];
//! let code = handledger_cli::run(args, &mut io::stdout(), &mut io::stderr());
//! assert_eq!(code, 0);
//! ```
//!
//! ## Subcommands
//!
//! - `settle --input FILE|- [--store]`: settle one hand and print its record
//! - `validate SEQUENCE`: print `valid` or why the sequence is malformed
//! - `list`: stored hands, one per line
//! - `show ID`: one stored hand as JSON
//! - `cfg`: resolved configuration with value sources

use clap::Parser;
use handledger_engine::history::HandRepository;
use std::io::Write;
use tracing_subscriber::EnvFilter;

pub mod cli;
mod commands;
pub mod config;
mod error;
pub mod store;

use cli::{Commands, HandLedgerCli};
use commands::{
    handle_cfg_command, handle_list_command, handle_settle_command, handle_show_command,
    handle_validate_command,
};
use config::ConfigResolved;

pub use error::{CliError, EXIT_FAILURE, EXIT_SUCCESS};
pub use store::SqliteHistory;

/// Parses `args` and runs the chosen subcommand.
///
/// Help and version go to `out` with exit code `0`. Any failure is written to
/// `err` as `Error: ...` and yields `2`.
pub fn run<I, S>(args: I, out: &mut dyn Write, err: &mut dyn Write) -> i32
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let argv: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();

    let cli = match HandLedgerCli::try_parse_from(&argv) {
        Ok(cli) => cli,
        Err(e) => {
            use clap::error::ErrorKind;

            // Help and version should print to stdout and exit 0
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    if write!(out, "{}", e).is_err() {
                        return EXIT_FAILURE;
                    }
                    EXIT_SUCCESS
                }
                _ => {
                    let _ = writeln!(err, "{}", e);
                    EXIT_FAILURE
                }
            };
        }
    };

    match dispatch(cli, out) {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            let _ = writeln!(err, "Error: {}", e);
            e.exit_code()
        }
    }
}

fn dispatch(cli: HandLedgerCli, out: &mut dyn Write) -> Result<(), CliError> {
    let resolved = config::load_with_sources()?.with_database_flag(cli.db);
    init_logging(cli.verbose, &resolved.config.log_filter);

    let history = if cli.cmd.uses_history() {
        Some(open_history(&resolved)?)
    } else {
        None
    };
    let history = history.as_ref().map(|h| h as &dyn HandRepository);

    match cli.cmd {
        Commands::Settle { input, .. } => {
            let mut stdin = std::io::stdin().lock();
            handle_settle_command(&input, history, &mut stdin, out)
        }
        Commands::Validate { sequence } => handle_validate_command(&sequence, out),
        Commands::List => handle_list_command(require(history)?, out),
        Commands::Show { id } => handle_show_command(&id, require(history)?, out),
        Commands::Cfg => handle_cfg_command(&resolved, out),
    }
}

fn open_history(resolved: &ConfigResolved) -> Result<SqliteHistory, CliError> {
    tracing::debug!(database = %resolved.config.database.display(), "opening hand history");
    Ok(SqliteHistory::open(&resolved.config.database)?)
}

fn require(history: Option<&dyn HandRepository>) -> Result<&dyn HandRepository, CliError> {
    history.ok_or_else(|| CliError::InvalidInput("no hand history configured".into()))
}

/// Logs go to stderr. `-v` and `-vv` override the configured filter.
fn init_logging(verbose: u8, configured: &str) {
    let filter = match verbose {
        0 => EnvFilter::try_new(configured).unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    // a subscriber may already be installed when `run` is called twice in one process
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
