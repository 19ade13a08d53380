//! Winnings from an action sequence.
//!
//! Settlement validates the sequence, checks that stacks and hole cards
//! describe one table, then replays the hand on a [`BettingEngine`] and reads
//! the payoffs back per player. It never does pot arithmetic itself.

use crate::action::{Action, ActionSequence, Street};
use crate::engine::BettingEngine;
use crate::errors::{EngineError, InputError, SettleError, Stage};
use crate::events::{EventSink, SettlementEvent};
use crate::game::TableConfig;
use crate::record::{HoleCards, StackSettings, Winnings};
use crate::validation::validate_sequence;
use crate::Chips;

/// Result of the all-fold shortcut for seats 1 and 2.
const SHORTCUT_LOSS: Chips = -20;
const SHORTCUT_GAIN: Chips = 20;

/// Computes net winnings per player, in stack order.
///
/// # Errors
///
/// - [`SettleError::Validation`] - the sequence is malformed; no engine is created
/// - [`SettleError::Input`] - stacks and hole cards are inconsistent
/// - [`SettleError::Engine`] - the engine refused an operation, tagged with the
///   replay stage
///
/// No partial winnings are ever returned.
///
/// # Examples
///
/// ```
/// use handledger_engine::engine::NoLimitHoldem;
/// use handledger_engine::events::NullSink;
/// use handledger_engine::record::{HoleCards, StackSettings};
/// use handledger_engine::settlement::settle;
///
/// let stacks: StackSettings = serde_json::from_str(r#"{"A": 1000, "B": 1000}"#).unwrap();
/// let holes: HoleCards =
///     serde_json::from_str(r#"{"A": ["As", "Ad"], "B": ["7c", "2d"]}"#).unwrap();
/// let sequence = "r80 c / Flop: [2s,3d,5h] / x x / Turn: [9c] / x x / River: [Kd] / x x";
///
/// let winnings = settle::<NoLimitHoldem>(&stacks, &holes, sequence, &mut NullSink).unwrap();
/// assert_eq!(winnings.get("A"), Some(&80));
/// assert_eq!(winnings.get("B"), Some(&-80));
/// ```
pub fn settle<E: BettingEngine>(
    stacks: &StackSettings,
    hole_cards: &HoleCards,
    sequence: &str,
    events: &mut dyn EventSink,
) -> Result<Winnings, SettleError> {
    let result = run::<E>(stacks, hole_cards, sequence, events);
    if let Err(err) = &result {
        events.emit(SettlementEvent::Failed {
            stage: err.stage(),
            reason: err.to_string(),
        });
    }
    result
}

fn run<E: BettingEngine>(
    stacks: &StackSettings,
    hole_cards: &HoleCards,
    sequence: &str,
    events: &mut dyn EventSink,
) -> Result<Winnings, SettleError> {
    let sequence = validate_sequence(sequence)?;
    events.emit(SettlementEvent::SequenceValidated {
        streets: sequence.streets().len(),
    });
    check_input(stacks, hole_cards)?;

    let winnings = match all_fold_shortcut(stacks, &sequence) {
        Some(winnings) => {
            events.emit(SettlementEvent::ShortcutApplied);
            winnings
        }
        None => replay::<E>(stacks, hole_cards, &sequence, events)?,
    };

    events.emit(SettlementEvent::Settled {
        winnings: winnings
            .iter()
            .map(|(player, &amount)| (player.to_string(), amount))
            .collect(),
    });
    Ok(winnings)
}

/// Checks that stacks and hole cards describe the same seated players.
pub fn check_input(stacks: &StackSettings, hole_cards: &HoleCards) -> Result<(), InputError> {
    if stacks.len() < 2 {
        return Err(InputError::TooFewPlayers(stacks.len()));
    }
    if hole_cards.len() != stacks.len() {
        return Err(InputError::PlayerCountMismatch {
            stacks: stacks.len(),
            hole_cards: hole_cards.len(),
        });
    }
    if let Some((player, &stack)) = stacks.iter().find(|(_, stack)| **stack <= 0) {
        return Err(InputError::NonPositiveStack {
            player: player.to_string(),
            stack,
        });
    }
    // every pot, payoff and raise is bounded by the table total
    if stacks.values().try_fold(0 as Chips, |total, &s| total.checked_add(s)).is_none() {
        return Err(InputError::TotalStackOverflow);
    }
    for (player, cards) in hole_cards.iter() {
        if stacks.position(player).is_none() {
            return Err(InputError::UnknownPlayer(player.to_string()));
        }
        if cards.len() != 2 {
            return Err(InputError::HoleCardCount {
                player: player.to_string(),
                count: cards.len(),
            });
        }
    }
    Ok(())
}

/// Fixed result when the preflop street has four or more actions and every
/// action from the fourth on is a fold: seat 1 loses 20, seat 2 wins 20.
///
/// Only applies with three or more seats.
fn all_fold_shortcut(stacks: &StackSettings, sequence: &ActionSequence) -> Option<Winnings> {
    let preflop = sequence.preflop();
    let applies = stacks.len() >= 3
        && preflop.len() >= 4
        && preflop[3..].iter().all(|action| *action == Action::Fold);
    if !applies {
        return None;
    }

    Some(
        stacks
            .keys()
            .enumerate()
            .map(|(seat, player)| {
                let amount = match seat {
                    1 => SHORTCUT_LOSS,
                    2 => SHORTCUT_GAIN,
                    _ => 0,
                };
                (player, amount)
            })
            .collect(),
    )
}

fn replay<E: BettingEngine>(
    stacks: &StackSettings,
    hole_cards: &HoleCards,
    sequence: &ActionSequence,
    events: &mut dyn EventSink,
) -> Result<Winnings, SettleError> {
    let starting: Vec<Chips> = stacks.values().copied().collect();
    events.emit(SettlementEvent::ReplayStarted {
        players: starting.len(),
    });
    let mut engine = E::create(TableConfig::default(), &starting)
        .map_err(SettleError::at(Stage::StateCreation))?;

    for (player, cards) in hole_cards.iter() {
        let (seat, pair) = match (stacks.position(player), cards.as_slice()) {
            (Some(seat), &[first, second]) => (seat, [first, second]),
            (None, _) => return Err(InputError::UnknownPlayer(player.to_string()).into()),
            (Some(_), other) => {
                return Err(InputError::HoleCardCount {
                    player: player.to_string(),
                    count: other.len(),
                }
                .into())
            }
        };
        engine
            .deal_hole(seat, pair)
            .map_err(SettleError::at(Stage::HoleCardDealing))?;
        events.emit(SettlementEvent::HoleCardsDealt {
            player: player.to_string(),
            seat,
        });
    }

    for street in sequence.streets() {
        play_street(&mut engine, street, events)
            .map_err(SettleError::at(Stage::ActionProcessing))?;
    }

    let payoffs = engine
        .payoffs()
        .map_err(SettleError::at(Stage::PayoffExtraction))?;
    Ok(stacks.keys().zip(payoffs).collect())
}

fn play_street<E: BettingEngine>(
    engine: &mut E,
    street: &Street,
    events: &mut dyn EventSink,
) -> Result<(), EngineError> {
    match street {
        Street::Board { kind, cards } => {
            engine.burn_card()?;
            for &card in cards {
                engine.deal_board(card)?;
            }
            events.emit(SettlementEvent::BoardDealt {
                kind: *kind,
                cards: cards.clone(),
            });
        }
        Street::Betting(actions) => {
            for &action in actions {
                let seat = engine.actor_index()?;
                match action {
                    Action::Fold => engine.fold()?,
                    Action::CheckOrCall => engine.check_or_call()?,
                    Action::RaiseTo(amount) => engine.raise_to(amount)?,
                    Action::AllIn => {
                        let stack = engine
                            .stacks()
                            .get(seat)
                            .copied()
                            .ok_or(EngineError::NoSuchSeat(seat))?;
                        engine.raise_to(stack)?
                    }
                }
                events.emit(SettlementEvent::ActionApplied { seat, action });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::cards::Card;
    use crate::engine::NoLimitHoldem;
    use crate::errors::ValidationError;
    use crate::events::NullSink;

    thread_local! {
        static CALLS: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
    }

    fn record(call: impl Into<String>) {
        CALLS.with(|calls| calls.borrow_mut().push(call.into()));
    }

    fn calls() -> Vec<String> {
        CALLS.with(|calls| calls.borrow().clone())
    }

    /// Logs every call and hands the action to the next seat in turn.
    struct ScriptedEngine {
        stacks: Vec<Chips>,
        actor: usize,
    }

    impl ScriptedEngine {
        fn advance(&mut self) {
            self.actor = (self.actor + 1) % self.stacks.len();
        }
    }

    impl BettingEngine for ScriptedEngine {
        fn create(_config: TableConfig, stacks: &[Chips]) -> Result<Self, EngineError> {
            CALLS.with(|calls| calls.borrow_mut().clear());
            record(format!("create {stacks:?}"));
            Ok(Self {
                stacks: stacks.to_vec(),
                actor: 0,
            })
        }
        fn deal_hole(&mut self, seat: usize, cards: [Card; 2]) -> Result<(), EngineError> {
            record(format!("hole {seat} {}{}", cards[0], cards[1]));
            Ok(())
        }
        fn burn_card(&mut self) -> Result<(), EngineError> {
            record("burn");
            Ok(())
        }
        fn deal_board(&mut self, card: Card) -> Result<(), EngineError> {
            record(format!("board {card}"));
            Ok(())
        }
        fn fold(&mut self) -> Result<(), EngineError> {
            record(format!("fold {}", self.actor));
            self.advance();
            Ok(())
        }
        fn check_or_call(&mut self) -> Result<(), EngineError> {
            record(format!("call {}", self.actor));
            self.advance();
            Ok(())
        }
        fn raise_to(&mut self, amount: Chips) -> Result<(), EngineError> {
            record(format!("raise {} {amount}", self.actor));
            self.advance();
            Ok(())
        }
        fn actor_index(&self) -> Result<usize, EngineError> {
            Ok(self.actor)
        }
        fn stacks(&self) -> Vec<Chips> {
            self.stacks.clone()
        }
        fn payoffs(&self) -> Result<Vec<Chips>, EngineError> {
            record("payoffs");
            let n = self.stacks.len() as Chips;
            Ok((0..n).map(|i| if i == 0 { 5 * (n - 1) } else { -5 }).collect())
        }
    }

    /// Refuses to be built.
    struct Unbuildable;

    impl BettingEngine for Unbuildable {
        fn create(_config: TableConfig, stacks: &[Chips]) -> Result<Self, EngineError> {
            Err(EngineError::NotEnoughSeats(stacks.len()))
        }
        fn deal_hole(&mut self, _seat: usize, _cards: [Card; 2]) -> Result<(), EngineError> {
            unreachable!()
        }
        fn burn_card(&mut self) -> Result<(), EngineError> {
            unreachable!()
        }
        fn deal_board(&mut self, _card: Card) -> Result<(), EngineError> {
            unreachable!()
        }
        fn fold(&mut self) -> Result<(), EngineError> {
            unreachable!()
        }
        fn check_or_call(&mut self) -> Result<(), EngineError> {
            unreachable!()
        }
        fn raise_to(&mut self, _amount: Chips) -> Result<(), EngineError> {
            unreachable!()
        }
        fn actor_index(&self) -> Result<usize, EngineError> {
            unreachable!()
        }
        fn stacks(&self) -> Vec<Chips> {
            unreachable!()
        }
        fn payoffs(&self) -> Result<Vec<Chips>, EngineError> {
            unreachable!()
        }
    }

    fn stacks(json: &str) -> StackSettings {
        serde_json::from_str(json).unwrap()
    }

    fn holes(json: &str) -> HoleCards {
        serde_json::from_str(json).unwrap()
    }

    fn three_handed() -> (StackSettings, HoleCards) {
        (
            stacks(r#"{"A": 1000, "B": 1000, "C": 1000}"#),
            holes(r#"{"A": ["As", "Kd"], "B": ["7c", "2d"], "C": ["Qh", "Qs"]}"#),
        )
    }

    fn heads_up() -> (StackSettings, HoleCards) {
        (
            stacks(r#"{"A": 1000, "B": 1000}"#),
            holes(r#"{"A": ["As", "Ad"], "B": ["7c", "2d"]}"#),
        )
    }

    #[test]
    fn all_fold_shortcut_uses_fixed_result() {
        let (s, h) = three_handed();
        let mut events: Vec<SettlementEvent> = Vec::new();
        let winnings = settle::<Unbuildable>(&s, &h, "c c c f f f f", &mut events).unwrap();
        assert_eq!(
            winnings.iter().collect::<Vec<_>>(),
            vec![("A", &0), ("B", &-20), ("C", &20)]
        );
        assert!(events.contains(&SettlementEvent::ShortcutApplied));
    }

    #[test]
    fn shortcut_needs_a_trailing_fold_run() {
        let (s, h) = three_handed();
        let err = settle::<Unbuildable>(&s, &h, "c c c f f c", &mut NullSink).unwrap_err();
        assert_eq!(err.stage(), Some(Stage::StateCreation));
        // exactly three tokens is not enough either
        let err = settle::<Unbuildable>(&s, &h, "f f f", &mut NullSink).unwrap_err();
        assert_eq!(err.stage(), Some(Stage::StateCreation));
    }

    #[test]
    fn heads_up_fold_pattern_is_replayed() {
        let (s, h) = heads_up();
        settle::<ScriptedEngine>(&s, &h, "c c c f f", &mut NullSink).unwrap();
        assert_eq!(calls()[0], "create [1000, 1000]");
        assert!(calls().contains(&"fold 1".to_string()));
    }

    #[test]
    fn replay_drives_engine_in_order() {
        let (s, h) = heads_up();
        let winnings =
            settle::<ScriptedEngine>(&s, &h, "r80 c / Flop: [2s,3d,5h] / x b100 f", &mut NullSink)
                .unwrap();
        assert_eq!(
            calls(),
            vec![
                "create [1000, 1000]",
                "hole 0 AsAd",
                "hole 1 7c2d",
                "raise 0 80",
                "call 1",
                "burn",
                "board 2s",
                "board 3d",
                "board 5h",
                "call 0",
                "raise 1 100",
                "fold 0",
                "payoffs",
            ]
        );
        assert_eq!(winnings.iter().collect::<Vec<_>>(), vec![("A", &5), ("B", &-5)]);
    }

    #[test]
    fn hole_cards_go_to_the_seat_of_their_player() {
        let s = stacks(r#"{"A": 1000, "B": 1000}"#);
        let h = holes(r#"{"B": ["7c", "2d"], "A": ["As", "Ad"]}"#);
        settle::<ScriptedEngine>(&s, &h, "x", &mut NullSink).unwrap();
        assert_eq!(calls()[1..3], ["hole 1 7c2d", "hole 0 AsAd"]);
    }

    #[test]
    fn allin_raises_to_the_actors_stack() {
        let s = stacks(r#"{"A": 500, "B": 300}"#);
        let (_, h) = heads_up();
        settle::<ScriptedEngine>(&s, &h, "c allin", &mut NullSink).unwrap();
        assert!(calls().contains(&"raise 1 300".to_string()));
    }

    #[test]
    fn invalid_sequences_never_reach_the_engine() {
        let (s, h) = heads_up();
        let err = settle::<Unbuildable>(&s, &h, "r80 c / Flop: [2s,3d]", &mut NullSink).unwrap_err();
        assert!(matches!(
            err,
            SettleError::Validation(ValidationError::WrongCardCount {
                expected: 3,
                found: 2,
                ..
            })
        ));
        for bad in ["b0", "b-10", "r80 q"] {
            let err = settle::<Unbuildable>(&s, &h, bad, &mut NullSink).unwrap_err();
            assert!(matches!(err, SettleError::Validation(_)), "{bad}: {err}");
        }
    }

    #[test]
    fn inconsistent_input_is_rejected_before_replay() {
        let cases = [
            (
                r#"{"A": 1000}"#,
                r#"{"A": ["As", "Ad"]}"#,
                InputError::TooFewPlayers(1),
            ),
            (
                r#"{"A": 1000, "B": 1000}"#,
                r#"{"A": ["As", "Ad"]}"#,
                InputError::PlayerCountMismatch {
                    stacks: 2,
                    hole_cards: 1,
                },
            ),
            (
                r#"{"A": 1000, "B": -5}"#,
                r#"{"A": ["As", "Ad"], "B": ["7c", "2d"]}"#,
                InputError::NonPositiveStack {
                    player: "B".to_string(),
                    stack: -5,
                },
            ),
            (
                r#"{"A": 1000, "B": 1000}"#,
                r#"{"A": ["As", "Ad"], "Z": ["7c", "2d"]}"#,
                InputError::UnknownPlayer("Z".to_string()),
            ),
            (
                r#"{"A": 1000, "B": 1000}"#,
                r#"{"A": ["As", "Ad", "Kd"], "B": ["7c", "2d"]}"#,
                InputError::HoleCardCount {
                    player: "A".to_string(),
                    count: 3,
                },
            ),
            (
                r#"{"A": 9223372036854775807, "B": 1}"#,
                r#"{"A": ["As", "Ad"], "B": ["7c", "2d"]}"#,
                InputError::TotalStackOverflow,
            ),
        ];
        for (s, h, expected) in cases {
            let err = settle::<Unbuildable>(&stacks(s), &holes(h), "x", &mut NullSink).unwrap_err();
            assert_eq!(err, SettleError::Input(expected));
        }
    }

    #[test]
    fn heads_up_showdown_goes_to_the_stronger_hand() {
        let (s, h) = heads_up();
        let sequence = "r80 c / Flop: [2s,3d,5h] / x x / Turn: [9c] / x x / River: [Kd] / x x";
        let mut events: Vec<SettlementEvent> = Vec::new();
        let winnings = settle::<NoLimitHoldem>(&s, &h, sequence, &mut events).unwrap();

        assert_eq!(winnings.get("A"), Some(&80));
        assert_eq!(winnings.get("B"), Some(&-80));
        assert_eq!(winnings.values().sum::<Chips>(), 0);
        assert!(matches!(
            events.last(),
            Some(SettlementEvent::Settled { .. })
        ));
    }

    #[test]
    fn engine_errors_carry_their_stage() {
        let (s, h) = heads_up();
        // seat 0 holds the big blind and may check, so folding is refused
        let err = settle::<NoLimitHoldem>(&s, &h, "c f", &mut NullSink).unwrap_err();
        assert_eq!(
            err,
            SettleError::Engine {
                stage: Stage::ActionProcessing,
                source: EngineError::NeedlessFold(0),
            }
        );

        let mut events: Vec<SettlementEvent> = Vec::new();
        let err = settle::<NoLimitHoldem>(&s, &h, "r80 c", &mut events).unwrap_err();
        assert_eq!(err.stage(), Some(Stage::PayoffExtraction));
        assert!(matches!(
            events.last(),
            Some(SettlementEvent::Failed {
                stage: Some(Stage::PayoffExtraction),
                ..
            })
        ));
    }

    #[test]
    fn multiway_hand_is_zero_sum() {
        let (s, h) = three_handed();
        // C opens, A calls from the small blind, B folds the big blind
        let sequence = "r120 c f / Flop: [Jc,8d,3h] / x b200 c / Turn: [4s] / x x / River: [9d] / x x";
        let winnings = settle::<NoLimitHoldem>(&s, &h, sequence, &mut NullSink).unwrap();
        assert_eq!(winnings.values().sum::<Chips>(), 0);
        assert_eq!(winnings.get("B"), Some(&-40));
        assert_eq!(winnings.get("C"), Some(&360));
        assert_eq!(winnings.get("A"), Some(&-320));
    }
}
