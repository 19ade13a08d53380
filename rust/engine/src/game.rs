use serde::{Deserialize, Serialize};

use crate::Chips;

pub const SMALL_BLIND: Chips = 20;
pub const BIG_BLIND: Chips = 40;
pub const MIN_BET: Chips = 40;

/// Forced bets and sizing of a no-limit table.
///
/// Every recorded hand is played with [`TableConfig::default`]: no antes,
/// 20/40 blinds, minimum bet 40.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConfig {
    pub ante: Chips,
    pub small_blind: Chips,
    pub big_blind: Chips,
    pub min_bet: Chips,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            ante: 0,
            small_blind: SMALL_BLIND,
            big_blind: BIG_BLIND,
            min_bet: MIN_BET,
        }
    }
}

impl TableConfig {
    /// Seats posting (small, big) blind. Heads-up the button posts the small blind.
    pub fn blind_seats(&self, seats: usize) -> (usize, usize) {
        if seats == 2 {
            (1, 0)
        } else {
            (0, 1)
        }
    }

    /// First seat to act before the flop.
    pub fn preflop_opener(&self, seats: usize) -> usize {
        if seats == 2 {
            1
        } else {
            2 % seats
        }
    }
}
