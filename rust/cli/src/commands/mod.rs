//! Command handlers.
//!
//! Each handler takes its output streams as `&mut dyn Write` and returns
//! `Result<(), CliError>`; the caller turns the error into an exit code.

mod cfg;
mod history;
mod settle;
mod validate;

pub use cfg::handle_cfg_command;
pub use history::{handle_list_command, handle_show_command};
pub use settle::handle_settle_command;
pub use validate::handle_validate_command;
