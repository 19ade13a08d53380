//! Structured events emitted while a hand is settled.
//!
//! Settlement never logs on its own; callers hand it an [`EventSink`] and
//! decide what happens to each event.

use crate::action::{Action, BoardKind};
use crate::cards::Card;
use crate::errors::Stage;
use crate::Chips;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettlementEvent {
    SequenceValidated {
        streets: usize,
    },
    /// Winnings were taken from the all-fold convention without a replay.
    ShortcutApplied,
    ReplayStarted {
        players: usize,
    },
    HoleCardsDealt {
        player: String,
        seat: usize,
    },
    BoardDealt {
        kind: BoardKind,
        cards: Vec<Card>,
    },
    ActionApplied {
        seat: usize,
        action: Action,
    },
    Settled {
        winnings: Vec<(String, Chips)>,
    },
    Failed {
        stage: Option<Stage>,
        reason: String,
    },
}

pub trait EventSink {
    fn emit(&mut self, event: SettlementEvent);
}

/// Collects every event, in order.
impl EventSink for Vec<SettlementEvent> {
    fn emit(&mut self, event: SettlementEvent) {
        self.push(event);
    }
}

/// Forwards events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&mut self, event: SettlementEvent) {
        match event {
            SettlementEvent::SequenceValidated { streets } => {
                tracing::debug!(streets, "action sequence validated");
            }
            SettlementEvent::ShortcutApplied => {
                tracing::info!("all-fold shortcut applied");
            }
            SettlementEvent::ReplayStarted { players } => {
                tracing::debug!(players, "replaying hand");
            }
            SettlementEvent::HoleCardsDealt { player, seat } => {
                tracing::trace!(%player, seat, "hole cards dealt");
            }
            SettlementEvent::BoardDealt { kind, cards } => {
                tracing::debug!(street = %kind, ?cards, "board dealt");
            }
            SettlementEvent::ActionApplied { seat, action } => {
                tracing::trace!(seat, %action, "action applied");
            }
            SettlementEvent::Settled { winnings } => {
                tracing::info!(?winnings, "hand settled");
            }
            SettlementEvent::Failed { stage, reason } => match stage {
                Some(stage) => tracing::warn!(%stage, %reason, "settlement failed"),
                None => tracing::warn!(%reason, "settlement failed"),
            },
        }
    }
}

/// Drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: SettlementEvent) {}
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn emit(&mut self, event: SettlementEvent) {
        (**self).emit(event);
    }
}
