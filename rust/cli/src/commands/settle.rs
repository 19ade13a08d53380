//! `settle`: one hand from JSON to a record.

use crate::error::CliError;
use handledger_engine::engine::NoLimitHoldem;
use handledger_engine::events::TracingSink;
use handledger_engine::history::HandRepository;
use handledger_engine::record::{HandInput, process_hand};
use std::io::{Read, Write};
use tracing::info;

/// Settles the hand read from `input` (`-` for `stdin`) and prints the
/// record as pretty JSON.
///
/// When `history` is given the record is stored before it is printed, so a
/// printed record with `--store` is always a stored one.
///
/// # Errors
///
/// - `CliError::InvalidInput` if the input cannot be read or is not a hand
/// - `CliError::Settle` if the hand cannot be settled; nothing is stored
/// - `CliError::History` if storing fails
pub fn handle_settle_command(
    input: &str,
    history: Option<&dyn HandRepository>,
    stdin: &mut dyn Read,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let text = read_input(input, stdin)?;
    let hand: HandInput = serde_json::from_str(&text)
        .map_err(|e| CliError::InvalidInput(format!("{} is not a hand: {}", input, e)))?;
    hand.check_schema()
        .map_err(|e| CliError::InvalidInput(e.to_string()))?;

    let record = process_hand::<NoLimitHoldem>(hand, &mut TracingSink)?;
    if let Some(history) = history {
        history.store(record.clone())?;
        info!(hand_id = %record.id, "hand recorded");
    }

    let json = serde_json::to_string_pretty(&record).map_err(std::io::Error::other)?;
    writeln!(out, "{}", json)?;
    Ok(())
}

fn read_input(input: &str, stdin: &mut dyn Read) -> Result<String, CliError> {
    let read = if input == "-" {
        let mut text = String::new();
        stdin.read_to_string(&mut text).map(|_| text)
    } else {
        std::fs::read_to_string(input)
    };
    read.map_err(|e| CliError::InvalidInput(format!("Failed to read {}: {}", input, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use handledger_engine::errors::SettleError;
    use handledger_engine::history::MemoryHistory;
    use handledger_engine::record::HandRecord;
    use std::io::Cursor;

    const HEADS_UP: &str = r#"{
        "stack_settings": {"A": 1000, "B": 1000},
        "player_roles": {"big_blind": "A", "small_blind": "B"},
        "hole_cards": {"A": ["As", "Ad"], "B": ["7c", "2d"]},
        "action_sequence": "r80 c / Flop: [2s,3d,5h] / x x / Turn: [9c] / x x / River: [Kd] / x x"
    }"#;

    fn settle_stdin(body: &str, history: Option<&dyn HandRepository>) -> Result<String, CliError> {
        let mut out = Vec::new();
        handle_settle_command("-", history, &mut Cursor::new(body.as_bytes()), &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn prints_the_settled_record() {
        let printed = settle_stdin(HEADS_UP, None).unwrap();
        let record: HandRecord = serde_json::from_str(&printed).unwrap();
        assert_eq!(record.winnings.get("A"), Some(&80));
        assert_eq!(record.winnings.get("B"), Some(&-80));
    }

    #[test]
    fn store_flag_keeps_the_record() {
        let history = MemoryHistory::new();
        let printed = settle_stdin(HEADS_UP, Some(&history)).unwrap();
        let record: HandRecord = serde_json::from_str(&printed).unwrap();
        assert_eq!(history.fetch_by_id(&record.id).unwrap(), record);
    }

    #[test]
    fn illegal_hand_is_not_stored() {
        let history = MemoryHistory::new();
        let body = HEADS_UP.replace("r80 c / Flop", "c f / Flop");
        let err = settle_stdin(&body, Some(&history)).unwrap_err();
        assert!(matches!(err, CliError::Settle(SettleError::Engine { .. })));
        assert!(history.is_empty().unwrap());
    }

    #[test]
    fn reads_from_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hand.json");
        std::fs::write(&path, HEADS_UP).unwrap();

        let mut out = Vec::new();
        handle_settle_command(
            path.to_str().unwrap(),
            None,
            &mut std::io::empty(),
            &mut out,
        )
        .unwrap();
        assert!(String::from_utf8(out).unwrap().contains("\"winnings\""));
    }

    #[test]
    fn unreadable_or_malformed_input_is_invalid() {
        let err = handle_settle_command(
            "/no/such/hand.json",
            None,
            &mut std::io::empty(),
            &mut Vec::new(),
        )
        .unwrap_err();
        assert!(matches!(err, CliError::InvalidInput(_)));

        let err = settle_stdin("{\"stack_settings\": 3}", None).unwrap_err();
        assert!(matches!(err, CliError::InvalidInput(_)));

        let three_cards = HEADS_UP.replace(r#"["As", "Ad"]"#, r#"["As", "Ad", "Ac"]"#);
        let err = settle_stdin(&three_cards, None).unwrap_err();
        assert!(err.to_string().contains("exactly two hole cards"));
    }
}
