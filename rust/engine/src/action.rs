//! Action-sequence notation.
//!
//! A hand is written as `/`-separated streets, e.g.
//! `r80 c / Flop: [2s,3d,5h] / x x / Turn: [9c] / x x / River: [Kd] / x x`.
//! [`parse_sequence`] only splits the text into [`RawStreet`]s; turning them
//! into typed [`Street`]s is the job of [`crate::validation`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::Chips;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoardKind {
    Flop,
    Turn,
    River,
}

impl BoardKind {
    pub fn expected_cards(self) -> usize {
        match self {
            BoardKind::Flop => 3,
            BoardKind::Turn | BoardKind::River => 1,
        }
    }

    /// Board streets are recognised by name anywhere in the street text.
    fn detect(street: &str) -> Option<BoardKind> {
        if street.contains("Flop") {
            Some(BoardKind::Flop)
        } else if street.contains("Turn") {
            Some(BoardKind::Turn)
        } else if street.contains("River") {
            Some(BoardKind::River)
        } else {
            None
        }
    }
}

impl fmt::Display for BoardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BoardKind::Flop => "Flop",
            BoardKind::Turn => "Turn",
            BoardKind::River => "River",
        })
    }
}

/// A street as written, before any token is checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawStreet {
    Betting(Vec<String>),
    Board {
        kind: BoardKind,
        text: String,
        /// `None` when the street has no `[...]` group.
        cards: Option<Vec<String>>,
    },
}

/// A single betting decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// `f`
    Fold,
    /// `x` or `c`
    CheckOrCall,
    /// `b<n>` or `r<n>`: commit up to `n` chips on this street
    RaiseTo(Chips),
    /// `allin`: raise to the actor's remaining stack
    AllIn,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Fold => f.write_str("f"),
            Action::CheckOrCall => f.write_str("c"),
            Action::RaiseTo(n) => write!(f, "r{n}"),
            Action::AllIn => f.write_str("allin"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Street {
    Betting(Vec<Action>),
    Board { kind: BoardKind, cards: Vec<Card> },
}

/// A sequence that passed validation. Only [`crate::validation`] builds one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionSequence {
    pub(crate) streets: Vec<Street>,
}

impl ActionSequence {
    pub fn streets(&self) -> &[Street] {
        &self.streets
    }

    /// Actions of the opening betting street.
    pub fn preflop(&self) -> &[Action] {
        match self.streets.first() {
            Some(Street::Betting(actions)) => actions,
            _ => &[],
        }
    }
}

pub fn parse_sequence(input: &str) -> Vec<RawStreet> {
    input
        .split('/')
        .map(str::trim)
        .filter(|street| !street.is_empty())
        .map(parse_street)
        .collect()
}

fn parse_street(street: &str) -> RawStreet {
    match BoardKind::detect(street) {
        Some(kind) => RawStreet::Board {
            kind,
            text: street.to_string(),
            cards: bracketed(street).map(|list| {
                list.split(',')
                    .map(|card| card.trim().to_string())
                    .collect()
            }),
        },
        None => RawStreet::Betting(street.split_whitespace().map(String::from).collect()),
    }
}

/// Contents of the first non-empty `[...]` group.
fn bracketed(street: &str) -> Option<&str> {
    street.match_indices('[').find_map(|(open, _)| {
        let rest = &street[open + 1..];
        let first = rest.chars().next()?;
        let close = rest[first.len_utf8()..].find(']')? + first.len_utf8();
        Some(&rest[..close])
    })
}
