use std::collections::VecDeque;

use tracing::{debug, warn};

use crate::action::Action;
use crate::cards::Card;
use crate::deck::Deck;
use crate::errors::EngineError;
use crate::game::TableConfig;
use crate::hand::evaluate_holding;
use crate::player::Seat;
use crate::pot::{award, side_pots};
use crate::rules::{validate_action, BettingView, ValidatedAction};
use crate::Chips;

/// Capability settlement needs from a betting-state machine.
///
/// The engine owns turn order, legality and pot arithmetic; callers only
/// feed it cards and decisions in the order they happened and read the
/// result back. Any operation may be refused with an [`EngineError`].
pub trait BettingEngine: Sized {
    /// Seats one player per entry of `stacks` and posts forced bets.
    fn create(config: TableConfig, stacks: &[Chips]) -> Result<Self, EngineError>;

    fn deal_hole(&mut self, seat: usize, cards: [Card; 2]) -> Result<(), EngineError>;

    fn burn_card(&mut self) -> Result<(), EngineError>;

    fn deal_board(&mut self, card: Card) -> Result<(), EngineError>;

    /// Folds the current actor.
    fn fold(&mut self) -> Result<(), EngineError>;

    /// Checks, or calls the current bet, for the current actor.
    fn check_or_call(&mut self) -> Result<(), EngineError>;

    /// Bets or raises the current actor to `amount` chips on this street.
    fn raise_to(&mut self, amount: Chips) -> Result<(), EngineError>;

    fn actor_index(&self) -> Result<usize, EngineError>;

    /// Chips behind, per seat.
    fn stacks(&self) -> Vec<Chips>;

    /// Net result per seat; only available once the hand is over.
    fn payoffs(&self) -> Result<Vec<Chips>, EngineError>;
}

const DEFAULT_SEED: u64 = 0xA1A2_A3A4;

/// Board cards revealed when entering flop, turn and river.
const BOARD_COUNTS: [usize; 4] = [0, 3, 1, 1];
const RIVER: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    HoleDealing,
    Betting,
    Burning,
    BoardDealing { remaining: usize },
    Complete,
}

impl Phase {
    fn describe(self) -> &'static str {
        match self {
            Phase::HoleDealing => "dealing hole cards",
            Phase::Betting => "betting",
            Phase::Burning => "waiting for a burn card",
            Phase::BoardDealing { .. } => "dealing the board",
            Phase::Complete => "the hand is complete",
        }
    }
}

/// No-limit Texas Hold'em betting-state machine.
///
/// Blinds are posted on creation, bets are collected when a round closes,
/// and pots are pushed to the winners as soon as the hand is decided, by
/// folds or at showdown after the river.
///
/// # Examples
///
/// ```
/// use handledger_engine::engine::{BettingEngine, NoLimitHoldem};
/// use handledger_engine::game::TableConfig;
///
/// let mut table = NoLimitHoldem::create(TableConfig::default(), &[1000, 1000]).unwrap();
/// table.deal_hole(0, ["As".parse().unwrap(), "Ad".parse().unwrap()]).unwrap();
/// table.deal_hole(1, ["7c".parse().unwrap(), "2d".parse().unwrap()]).unwrap();
///
/// // heads-up the small blind (seat 1) acts first and gives up
/// assert_eq!(table.actor_index().unwrap(), 1);
/// table.fold().unwrap();
/// assert_eq!(table.payoffs().unwrap(), vec![20, -20]);
/// ```
#[derive(Debug)]
pub struct NoLimitHoldem {
    config: TableConfig,
    deck: Deck,
    seats: Vec<Seat>,
    board: Vec<Card>,
    street: usize,
    phase: Phase,
    actors: VecDeque<usize>,
    min_increment: Chips,
    /// Seats that acted since the last full raise on this street.
    acted: Vec<bool>,
    /// Seats a short all-in did not reopen the betting for.
    raise_closed: Vec<bool>,
}

impl NoLimitHoldem {
    pub fn with_seed(
        config: TableConfig,
        stacks: &[Chips],
        seed: u64,
    ) -> Result<Self, EngineError> {
        if stacks.len() < 2 {
            return Err(EngineError::NotEnoughSeats(stacks.len()));
        }
        if let Some((seat, &stack)) = stacks.iter().enumerate().find(|(_, s)| **s <= 0) {
            return Err(EngineError::InvalidStack { seat, stack });
        }
        if stacks.iter().try_fold(0 as Chips, |total, &s| total.checked_add(s)).is_none() {
            return Err(EngineError::ChipOverflow);
        }

        let mut seats: Vec<Seat> = stacks.iter().map(|&s| Seat::new(s)).collect();
        if config.ante > 0 {
            for seat in &mut seats {
                seat.put_in(config.ante);
                seat.collect_bet();
            }
        }
        let (sb, bb) = config.blind_seats(seats.len());
        seats[sb].put_in(config.small_blind);
        seats[bb].put_in(config.big_blind);

        Ok(Self {
            config,
            deck: Deck::new_with_seed(seed),
            seats,
            board: Vec::with_capacity(5),
            street: 0,
            phase: Phase::HoleDealing,
            actors: VecDeque::new(),
            min_increment: config.min_bet,
            acted: vec![false; stacks.len()],
            raise_closed: vec![false; stacks.len()],
        })
    }

    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    pub fn board(&self) -> &[Card] {
        &self.board
    }

    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Complete
    }

    fn expect_phase(&self, operation: &'static str, ok: bool) -> Result<(), EngineError> {
        if ok {
            Ok(())
        } else {
            Err(EngineError::WrongPhase {
                operation,
                phase: self.phase.describe(),
            })
        }
    }

    fn max_bet(&self) -> Chips {
        self.seats.iter().map(Seat::bet).max().unwrap_or(0)
    }

    fn players_in_hand(&self) -> usize {
        self.seats.iter().filter(|s| s.in_hand()).count()
    }

    /// Seats after `from` in table order, wrapping around, `from` last.
    fn rotation(&self, from: usize) -> impl Iterator<Item = usize> {
        let n = self.seats.len();
        (1..=n).map(move |k| (from + k) % n)
    }

    fn take_from_deck(&mut self, card: Card) {
        if !self.deck.take(card) {
            warn!(%card, "card is not in the deck, dealing it anyway");
        }
    }

    fn open_betting(&mut self) {
        self.phase = Phase::Betting;
        self.min_increment = self.config.min_bet;
        self.acted.fill(false);
        self.raise_closed.fill(false);

        let n = self.seats.len();
        let first = if self.street == 0 {
            self.config.preflop_opener(n)
        } else {
            0
        };
        let max_bet = self.max_bet();
        let live: Vec<usize> = self
            .rotation(first + n - 1)
            .filter(|&i| self.seats[i].can_act())
            .collect();
        self.actors = if live.len() <= 1 {
            // a lone player left with chips only acts if still owing
            live.into_iter()
                .filter(|&i| self.seats[i].bet() < max_bet)
                .collect()
        } else {
            live.into()
        };
        debug!(street = self.street, actors = ?self.actors, "betting round opened");

        if self.actors.is_empty() {
            self.close_round();
        }
    }

    fn close_round(&mut self) {
        for seat in &mut self.seats {
            seat.collect_bet();
        }
        if self.players_in_hand() <= 1 || self.street == RIVER {
            self.finish();
        } else {
            self.phase = Phase::Burning;
        }
    }

    fn finish(&mut self) {
        let contributions: Vec<Chips> = self.seats.iter().map(Seat::contribution).collect();
        let in_hand: Vec<bool> = self.seats.iter().map(Seat::in_hand).collect();
        let pots = side_pots(&contributions, &in_hand);

        let board: Option<[Card; 5]> = self.board.as_slice().try_into().ok();
        let seats = &self.seats;
        let won = award(&pots, seats.len(), |i| {
            let hole = seats[i].hole_cards()?;
            board.as_ref().map(|b| evaluate_holding(hole, b))
        });
        for (seat, amount) in self.seats.iter_mut().zip(won) {
            seat.add_chips(amount);
        }
        self.actors.clear();
        self.phase = Phase::Complete;
        debug!(pots = pots.len(), "hand complete");
    }

    fn view(&self) -> Result<BettingView, EngineError> {
        self.expect_phase("act", self.phase == Phase::Betting)?;
        let seat = self.actor_index()?;
        Ok(BettingView {
            seat,
            bet: self.seats[seat].bet(),
            stack: self.seats[seat].stack(),
            max_bet: self.max_bet(),
            min_increment: self.min_increment,
            others_can_respond: self
                .seats
                .iter()
                .enumerate()
                .any(|(i, s)| i != seat && s.can_act()),
            may_raise: !self.raise_closed[seat],
        })
    }

    fn apply(&mut self, action: Action) -> Result<(), EngineError> {
        let view = self.view()?;
        let seat = view.seat;
        match validate_action(&view, action)? {
            ValidatedAction::Fold => {
                self.seats[seat].fold();
                self.actors.pop_front();
                if self.players_in_hand() == 1 {
                    self.close_round();
                    return Ok(());
                }
            }
            ValidatedAction::Check => {
                self.actors.pop_front();
            }
            ValidatedAction::Call(amount) => {
                self.seats[seat].put_in(amount);
                self.actors.pop_front();
            }
            ValidatedAction::RaiseTo { amount, full } => {
                self.seats[seat].put_in(amount - view.bet);
                if full {
                    self.min_increment = self.min_increment.max(amount - view.max_bet);
                    self.acted.fill(false);
                    self.raise_closed.fill(false);
                } else {
                    // seats that already acted may only call the extra chips
                    for (closed, &acted) in self.raise_closed.iter_mut().zip(&self.acted) {
                        *closed |= acted;
                    }
                }
                self.actors = self
                    .rotation(seat)
                    .filter(|&i| i != seat && self.seats[i].can_act())
                    .collect();
            }
        }
        self.acted[seat] = true;
        debug!(seat, %action, "action applied");

        if self.actors.is_empty() {
            self.close_round();
        }
        Ok(())
    }
}

impl BettingEngine for NoLimitHoldem {
    fn create(config: TableConfig, stacks: &[Chips]) -> Result<Self, EngineError> {
        Self::with_seed(config, stacks, DEFAULT_SEED)
    }

    fn deal_hole(&mut self, seat: usize, cards: [Card; 2]) -> Result<(), EngineError> {
        self.expect_phase("deal hole cards", self.phase == Phase::HoleDealing)?;
        let target = self.seats.get(seat).ok_or(EngineError::NoSuchSeat(seat))?;
        if target.hole_cards().is_some() {
            return Err(EngineError::HoleCardsAlreadyDealt(seat));
        }
        for card in cards {
            self.take_from_deck(card);
        }
        self.seats[seat]
            .give_cards(cards)
            .map_err(|_| EngineError::HoleCardsAlreadyDealt(seat))?;

        if self.seats.iter().all(|s| s.hole_cards().is_some()) {
            self.open_betting();
        }
        Ok(())
    }

    fn burn_card(&mut self) -> Result<(), EngineError> {
        self.expect_phase("burn a card", self.phase == Phase::Burning)?;
        self.deck.draw().ok_or(EngineError::DeckExhausted)?;
        self.phase = Phase::BoardDealing {
            remaining: BOARD_COUNTS[self.street + 1],
        };
        Ok(())
    }

    fn deal_board(&mut self, card: Card) -> Result<(), EngineError> {
        let remaining = match self.phase {
            Phase::BoardDealing { remaining } => remaining,
            _ => return self.expect_phase("deal a board card", false),
        };
        self.take_from_deck(card);
        self.board.push(card);

        if remaining > 1 {
            self.phase = Phase::BoardDealing {
                remaining: remaining - 1,
            };
        } else {
            self.street += 1;
            self.open_betting();
        }
        Ok(())
    }

    fn fold(&mut self) -> Result<(), EngineError> {
        self.apply(Action::Fold)
    }

    fn check_or_call(&mut self) -> Result<(), EngineError> {
        self.apply(Action::CheckOrCall)
    }

    fn raise_to(&mut self, amount: Chips) -> Result<(), EngineError> {
        self.apply(Action::RaiseTo(amount))
    }

    fn actor_index(&self) -> Result<usize, EngineError> {
        self.actors.front().copied().ok_or(EngineError::NoActor)
    }

    fn stacks(&self) -> Vec<Chips> {
        self.seats.iter().map(Seat::stack).collect()
    }

    fn payoffs(&self) -> Result<Vec<Chips>, EngineError> {
        if !self.is_complete() {
            return Err(EngineError::HandNotComplete);
        }
        Ok(self.seats.iter().map(Seat::payoff).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cards(a: &str, b: &str) -> [Card; 2] {
        [a.parse().unwrap(), b.parse().unwrap()]
    }

    fn deal_street(table: &mut NoLimitHoldem, tokens: &[&str]) {
        table.burn_card().unwrap();
        for t in tokens {
            table.deal_board(t.parse().unwrap()).unwrap();
        }
    }

    fn table(stacks: &[Chips], holes: &[[Card; 2]]) -> NoLimitHoldem {
        let mut table = NoLimitHoldem::create(TableConfig::default(), stacks).unwrap();
        for (seat, &hole) in holes.iter().enumerate() {
            table.deal_hole(seat, hole).unwrap();
        }
        table
    }

    #[test]
    fn blinds_are_posted_on_creation() {
        let t = NoLimitHoldem::create(TableConfig::default(), &[1000, 1000, 1000]).unwrap();
        assert_eq!(t.stacks(), vec![980, 960, 1000]);
        let hu = NoLimitHoldem::create(TableConfig::default(), &[1000, 1000]).unwrap();
        assert_eq!(hu.stacks(), vec![960, 980]);
    }

    #[test]
    fn creation_rejects_bad_tables() {
        assert_eq!(
            NoLimitHoldem::create(TableConfig::default(), &[1000]).unwrap_err(),
            EngineError::NotEnoughSeats(1)
        );
        assert_eq!(
            NoLimitHoldem::create(TableConfig::default(), &[1000, 0]).unwrap_err(),
            EngineError::InvalidStack { seat: 1, stack: 0 }
        );
    }

    #[test]
    fn heads_up_showdown_pays_the_best_hand() {
        let mut t = table(&[1000, 1000], &[cards("Ah", "Ad"), cards("7c", "2d")]);
        t.raise_to(80).unwrap();
        t.check_or_call().unwrap();
        deal_street(&mut t, &["2s", "3d", "5h"]);
        assert_eq!(t.actor_index().unwrap(), 0);
        t.check_or_call().unwrap();
        t.check_or_call().unwrap();
        deal_street(&mut t, &["9c"]);
        t.check_or_call().unwrap();
        t.check_or_call().unwrap();
        deal_street(&mut t, &["Kd"]);
        t.check_or_call().unwrap();
        assert!(t.payoffs().is_err());
        t.check_or_call().unwrap();
        assert_eq!(t.payoffs().unwrap(), vec![80, -80]);
    }

    #[test]
    fn all_in_players_run_out_the_board_into_side_pots() {
        let mut t = table(
            &[100, 300, 300],
            &[cards("Ac", "Ad"), cards("Kc", "Kd"), cards("Qc", "Qd")],
        );
        assert_eq!(t.actor_index().unwrap(), 2);
        t.raise_to(300).unwrap();
        t.check_or_call().unwrap();
        t.check_or_call().unwrap();
        deal_street(&mut t, &["2c", "7d", "9h"]);
        assert_eq!(t.actor_index(), Err(EngineError::NoActor));
        deal_street(&mut t, &["Js"]);
        deal_street(&mut t, &["3s"]);
        assert_eq!(t.payoffs().unwrap(), vec![200, 100, -300]);
    }

    #[test]
    fn last_player_standing_takes_the_pot() {
        let mut t = table(
            &[1000; 6],
            &[
                cards("As", "Kd"),
                cards("7h", "7d"),
                cards("9s", "9c"),
                cards("Qc", "Qh"),
                cards("2s", "2d"),
                cards("Jh", "Jd"),
            ],
        );
        t.raise_to(80).unwrap();
        for _ in 0..5 {
            t.check_or_call().unwrap();
        }
        deal_street(&mut t, &["2c", "3d", "5h"]);
        t.raise_to(160).unwrap();
        for _ in 0..5 {
            t.fold().unwrap();
        }
        assert_eq!(t.payoffs().unwrap(), vec![400, -80, -80, -80, -80, -80]);
    }

    #[test]
    fn folding_is_refused_when_checking_is_free() {
        let mut t = table(&[1000, 1000], &[cards("Ah", "Ad"), cards("7c", "2d")]);
        t.check_or_call().unwrap();
        assert_eq!(t.fold(), Err(EngineError::NeedlessFold(0)));
    }

    #[test]
    fn operations_out_of_phase_are_refused() {
        let mut t = NoLimitHoldem::create(TableConfig::default(), &[1000, 1000]).unwrap();
        assert!(matches!(t.fold(), Err(EngineError::WrongPhase { .. })));
        t.deal_hole(0, cards("Ah", "Ad")).unwrap();
        assert_eq!(
            t.deal_hole(0, cards("Kh", "Kd")),
            Err(EngineError::HoleCardsAlreadyDealt(0))
        );
        assert_eq!(t.deal_hole(5, cards("Kh", "Kd")), Err(EngineError::NoSuchSeat(5)));
        t.deal_hole(1, cards("7c", "2d")).unwrap();
        assert!(matches!(t.burn_card(), Err(EngineError::WrongPhase { .. })));
        assert!(matches!(
            t.deal_board("2s".parse().unwrap()),
            Err(EngineError::WrongPhase { .. })
        ));
    }

    #[test]
    fn raise_over_stack_is_refused() {
        let mut t = table(&[1000, 500], &[cards("Ah", "Ad"), cards("7c", "2d")]);
        assert_eq!(
            t.raise_to(600),
            Err(EngineError::InsufficientChips {
                seat: 1,
                amount: 600,
                available: 500
            })
        );
    }

    #[test]
    fn short_all_in_does_not_reopen_betting() {
        let mut t = table(
            &[150, 1000, 1000],
            &[cards("Ac", "Ad"), cards("Kc", "Kd"), cards("Qc", "Qd")],
        );
        t.raise_to(100).unwrap();
        // small blind shoves 150, short of the 160 a full raise needs
        t.raise_to(150).unwrap();
        assert_eq!(t.actor_index().unwrap(), 1);
        t.check_or_call().unwrap();

        assert_eq!(t.actor_index().unwrap(), 2);
        assert_eq!(t.raise_to(400), Err(EngineError::RaiseNotReopened(2)));
        t.check_or_call().unwrap();
        assert_eq!(t.stacks(), vec![0, 850, 850]);
    }

    #[test]
    fn full_raise_after_short_all_in_reopens_betting() {
        let mut t = table(
            &[150, 1000, 1000],
            &[cards("Ac", "Ad"), cards("Kc", "Kd"), cards("Qc", "Qd")],
        );
        t.raise_to(100).unwrap();
        t.raise_to(150).unwrap();
        // the big blind had not acted yet, so it may still raise
        t.raise_to(400).unwrap();
        assert_eq!(t.actor_index().unwrap(), 2);
        t.raise_to(800).unwrap();
        t.check_or_call().unwrap();
        assert_eq!(t.stacks(), vec![0, 200, 200]);
    }

    #[test]
    fn tables_whose_chips_overflow_are_refused() {
        assert_eq!(
            NoLimitHoldem::create(TableConfig::default(), &[Chips::MAX, 1]).unwrap_err(),
            EngineError::ChipOverflow
        );
        let half = Chips::MAX / 2;
        let t = NoLimitHoldem::create(TableConfig::default(), &[half, half]).unwrap();
        assert_eq!(t.stacks(), vec![half - 40, half - 20]);
    }
}
