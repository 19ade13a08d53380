use crate::error::CliError;
use handledger_engine::validation::validate_sequence;
use std::io::Write;
use tracing::debug;

/// Prints `valid` when `sequence` parses and validates.
pub fn handle_validate_command(sequence: &str, out: &mut dyn Write) -> Result<(), CliError> {
    let parsed = validate_sequence(sequence)?;
    debug!(streets = parsed.streets().len(), "sequence validated");
    writeln!(out, "valid")?;
    Ok(())
}
