//! `list` and `show` over the stored hand history.

use crate::error::CliError;
use chrono::SecondsFormat;
use handledger_engine::history::HandRepository;
use handledger_engine::record::HandRecord;
use std::io::Write;
use uuid::Uuid;

/// One line per stored hand, oldest first: id, creation time, winnings.
pub fn handle_list_command(
    history: &dyn HandRepository,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let hands = history.fetch_all()?;
    if hands.is_empty() {
        writeln!(out, "no hands stored")?;
        return Ok(());
    }
    for hand in &hands {
        writeln!(out, "{}", summary_line(hand))?;
    }
    Ok(())
}

pub fn handle_show_command(
    id: &str,
    history: &dyn HandRepository,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let id = Uuid::parse_str(id)
        .map_err(|_| CliError::InvalidInput(format!("`{}` is not a hand id", id)))?;
    let record = history.fetch_by_id(&id)?;
    let json = serde_json::to_string_pretty(&record).map_err(std::io::Error::other)?;
    writeln!(out, "{}", json)?;
    Ok(())
}

fn summary_line(hand: &HandRecord) -> String {
    let winnings: Vec<String> = hand
        .winnings
        .iter()
        .map(|(player, amount)| format!("{}:{:+}", player, amount))
        .collect();
    format!(
        "{}  {}  {}",
        hand.id,
        hand.created_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        winnings.join(" ")
    )
}
