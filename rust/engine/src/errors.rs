use std::fmt;

use thiserror::Error;

use crate::action::BoardKind;
use crate::Chips;

/// Rejections raised by a betting-state engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("a table needs at least two seats, got {0}")]
    NotEnoughSeats(usize),
    #[error("seat {seat} has a non-positive starting stack {stack}")]
    InvalidStack { seat: usize, stack: Chips },
    #[error("the stacks at this table add up to more chips than can be counted")]
    ChipOverflow,
    #[error("seat {0} does not exist")]
    NoSuchSeat(usize),
    #[error("seat {0} already holds hole cards")]
    HoleCardsAlreadyDealt(usize),
    #[error("cannot {operation} while {phase}")]
    WrongPhase {
        operation: &'static str,
        phase: &'static str,
    },
    #[error("there is no player to act")]
    NoActor,
    #[error("seat {0} has no reason to fold")]
    NeedlessFold(usize),
    #[error("raise to {amount} is below the minimum of {minimum}")]
    RaiseTooSmall { amount: Chips, minimum: Chips },
    #[error("raise to {amount} exceeds the {available} chips seat {seat} can commit")]
    InsufficientChips {
        seat: usize,
        amount: Chips,
        available: Chips,
    },
    #[error("seat {0} cannot raise: no other player can respond")]
    NoOneToRaise(usize),
    #[error("seat {0} cannot raise: a short all-in does not reopen the betting")]
    RaiseNotReopened(usize),
    #[error("deck is exhausted")]
    DeckExhausted,
    #[error("payoffs are not final until the hand is complete")]
    HandNotComplete,
}

/// Why an action sequence was refused before any replay.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("action sequence is empty")]
    Empty,
    #[error("first street must be a betting street, found `{0}`")]
    BoardBeforePreflop(String),
    #[error("board street `{0}` has no bracketed card list")]
    MissingCardList(String),
    #[error("{street} needs {expected} card(s), found {found}")]
    WrongCardCount {
        street: BoardKind,
        expected: usize,
        found: usize,
    },
    #[error("invalid card `{0}`")]
    InvalidCard(String),
    #[error("invalid action `{0}`")]
    InvalidAction(String),
    #[error("invalid amount format in action `{0}`")]
    InvalidAmount(String),
    #[error("amount must be positive in action `{0}`")]
    NonPositiveAmount(String),
}

/// Stacks and hole cards that cannot describe one table.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("a hand needs at least two players, got {0}")]
    TooFewPlayers(usize),
    #[error("{stacks} players have stacks but {hole_cards} have hole cards")]
    PlayerCountMismatch { stacks: usize, hole_cards: usize },
    #[error("stack for {player} must be positive, got {stack}")]
    NonPositiveStack { player: String, stack: Chips },
    #[error("hole cards given for unknown player {0}")]
    UnknownPlayer(String),
    #[error("{player} must hold exactly two hole cards, got {count}")]
    HoleCardCount { player: String, count: usize },
    #[error("stacks add up to more than {} chips", Chips::MAX)]
    TotalStackOverflow,
}

/// Where in the replay an engine error surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    StateCreation,
    HoleCardDealing,
    ActionProcessing,
    PayoffExtraction,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::StateCreation => "state creation",
            Stage::HoleCardDealing => "hole-card dealing",
            Stage::ActionProcessing => "action processing",
            Stage::PayoffExtraction => "payoff extraction",
        })
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SettleError {
    #[error("invalid action sequence: {0}")]
    Validation(#[from] ValidationError),
    #[error("inconsistent hand input: {0}")]
    Input(#[from] InputError),
    #[error("engine rejected {stage}: {source}")]
    Engine {
        stage: Stage,
        #[source]
        source: EngineError,
    },
}

impl SettleError {
    /// Replay stage the error surfaced in; `None` before replay starts.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            SettleError::Engine { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    pub(crate) fn at(stage: Stage) -> impl FnOnce(EngineError) -> SettleError {
        move |source| SettleError::Engine { stage, source }
    }
}
