//! Hand input and the immutable record produced once a hand settles.

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

use chrono::{DateTime, Utc};
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::cards::Card;
use crate::engine::BettingEngine;
use crate::errors::{InputError, SettleError};
use crate::events::EventSink;
use crate::settlement::settle;
use crate::Chips;

/// Player-keyed map that keeps insertion order.
///
/// Key order is meaningful: the n-th key of a hand's stacks sits in seat n.
/// Serialized as a JSON object in that order; duplicate keys are refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerMap<V> {
    entries: Vec<(String, V)>,
}

impl<V> PlayerMap<V> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Appends `player`; gives the value back if the player is already present.
    pub fn insert(&mut self, player: impl Into<String>, value: V) -> Result<(), V> {
        let player = player.into();
        if self.position(&player).is_some() {
            return Err(value);
        }
        self.entries.push((player, value));
        Ok(())
    }

    pub fn get(&self, player: &str) -> Option<&V> {
        self.entries
            .iter()
            .find(|(p, _)| p == player)
            .map(|(_, v)| v)
    }

    /// Seat index of `player`.
    pub fn position(&self, player: &str) -> Option<usize> {
        self.entries.iter().position(|(p, _)| p == player)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(p, _)| p.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(p, v)| (p.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> Default for PlayerMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Keys are expected to be unique. The first value for a player is kept and
/// later duplicates are dropped; use [`PlayerMap::insert`] to detect them.
impl<K: Into<String>, V> FromIterator<(K, V)> for PlayerMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = PlayerMap::new();
        for (k, v) in iter {
            let _ = map.insert(k, v);
        }
        map
    }
}

impl<V: Serialize> Serialize for PlayerMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (player, value) in &self.entries {
            map.serialize_entry(player, value)?;
        }
        map.end()
    }
}

struct PlayerMapVisitor<V>(PhantomData<V>);

impl<'de, V: Deserialize<'de>> Visitor<'de> for PlayerMapVisitor<V> {
    type Value = PlayerMap<V>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map keyed by player id")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut map = PlayerMap::new();
        while let Some((player, value)) = access.next_entry::<String, V>()? {
            if map.position(&player).is_some() {
                return Err(de::Error::custom(format!("duplicate player `{player}`")));
            }
            map.entries.push((player, value));
        }
        Ok(map)
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for PlayerMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(PlayerMapVisitor(PhantomData))
    }
}

pub type StackSettings = PlayerMap<Chips>;
pub type HoleCards = PlayerMap<Vec<Card>>;
pub type Winnings = PlayerMap<Chips>;
/// Role name (e.g. `"dealer"`) to player id. Informational only.
pub type PlayerRoles = BTreeMap<String, String>;

/// A hand as submitted, before settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandInput {
    pub stack_settings: StackSettings,
    pub player_roles: PlayerRoles,
    pub hole_cards: HoleCards,
    pub action_sequence: String,
}

impl HandInput {
    /// Field-level checks a submitted hand must pass before it is settled:
    /// every stack positive and every hole-card entry exactly two cards.
    pub fn check_schema(&self) -> Result<(), InputError> {
        for (player, &stack) in self.stack_settings.iter() {
            if stack <= 0 {
                return Err(InputError::NonPositiveStack {
                    player: player.to_string(),
                    stack,
                });
            }
        }
        for (player, cards) in self.hole_cards.iter() {
            if cards.len() != 2 {
                return Err(InputError::HoleCardCount {
                    player: player.to_string(),
                    count: cards.len(),
                });
            }
        }
        Ok(())
    }
}

/// A settled hand. Built once by [`process_hand`] and never changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandRecord {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub stack_settings: StackSettings,
    pub player_roles: PlayerRoles,
    pub hole_cards: HoleCards,
    pub action_sequence: String,
    pub winnings: Winnings,
}

/// Settles `input` with engine `E` and assembles the record.
///
/// Nothing is assembled when settlement fails; the error is returned as is.
pub fn process_hand<E: BettingEngine>(
    input: HandInput,
    events: &mut dyn EventSink,
) -> Result<HandRecord, SettleError> {
    let id = Uuid::new_v4();
    let created_at = Utc::now();
    let winnings = settle::<E>(
        &input.stack_settings,
        &input.hole_cards,
        &input.action_sequence,
        events,
    )?;

    Ok(HandRecord {
        id,
        created_at,
        stack_settings: input.stack_settings,
        player_roles: input.player_roles,
        hole_cards: input.hole_cards,
        action_sequence: input.action_sequence,
        winnings,
    })
}
