//! `cfg`: the resolved configuration, one entry per setting.
//!
//! ```json
//! {
//!   "database": { "value": "handledger.db", "source": "default" },
//!   "log_filter": { "value": "warn", "source": "default" }
//! }
//! ```

use crate::config::ConfigResolved;
use crate::error::CliError;
use std::io::Write;

pub fn handle_cfg_command(resolved: &ConfigResolved, out: &mut dyn Write) -> Result<(), CliError> {
    let ConfigResolved { config, sources } = resolved;
    let display = serde_json::json!({
        "database": {
            "value": config.database,
            "source": sources.database,
        },
        "log_filter": {
            "value": config.log_filter,
            "source": sources.log_filter,
        },
    });
    let json_str = serde_json::to_string_pretty(&display).map_err(std::io::Error::other)?;
    writeln!(out, "{}", json_str)?;
    Ok(())
}
