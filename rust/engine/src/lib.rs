//! # handledger-engine: Hold'em hand settlement core
//!
//! Records no-limit Texas Hold'em hands written in a compact action notation
//! and computes each player's net chip result by replaying the hand against a
//! betting-state engine.
//!
//! ## Core Modules
//!
//! - [`action`] - Action-sequence notation and its raw street shapes
//! - [`validation`] - Turns raw streets into a typed [`action::ActionSequence`]
//! - [`settlement`] - Replays a validated sequence and derives winnings
//! - [`record`] - Hand input/record types and hand assembly
//! - [`engine`] - [`engine::BettingEngine`] capability and the bundled [`engine::NoLimitHoldem`]
//! - [`rules`] - No-limit betting legality
//! - [`pot`] - Main and side pots
//! - [`hand`] - Seven-card hand evaluation
//! - [`cards`] / [`deck`] - Card tokens and the seeded deck
//! - [`history`] - Persistence boundary and an in-memory store
//! - [`events`] - Settlement events and sinks
//! - [`errors`] - Error types for every stage
//!
//! ## Quick Start
//!
//! ```rust
//! use handledger_engine::engine::NoLimitHoldem;
//! use handledger_engine::events::SettlementEvent;
//! use handledger_engine::record::PlayerMap;
//! use handledger_engine::settlement::settle;
//!
//! let stacks: PlayerMap<i64> =
//!     serde_json::from_str(r#"{"A": 1000, "B": 1000, "C": 1000}"#).unwrap();
//! let holes = serde_json::from_str(
//!     r#"{"A": ["As", "Kd"], "B": ["7c", "2d"], "C": ["Qh", "Qs"]}"#,
//! )
//! .unwrap();
//!
//! let mut events: Vec<SettlementEvent> = Vec::new();
//! let winnings = settle::<NoLimitHoldem>(&stacks, &holes, "c c c f f f f", &mut events).unwrap();
//! assert_eq!(winnings.get("B"), Some(&-20));
//! assert_eq!(winnings.get("C"), Some(&20));
//! ```
//!
//! ## Validating Without Settling
//!
//! ```rust
//! use handledger_engine::validation::is_valid;
//!
//! assert!(is_valid("r80 c / Flop: [2s,3d,5h] / x x"));
//! assert!(!is_valid("b0"));
//! ```

pub mod action;
pub mod cards;
pub mod deck;
pub mod engine;
pub mod errors;
pub mod events;
pub mod game;
pub mod hand;
pub mod history;
pub mod player;
pub mod pot;
pub mod record;
pub mod rules;
pub mod settlement;
pub mod validation;

/// Chip amounts; stacks and raises are positive, results are signed.
pub type Chips = i64;
