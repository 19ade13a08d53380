//! Seven-card hand ranking used at showdown.

use std::cmp::Ordering;

use crate::cards::{Card, Suit};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub enum Category {
    HighCard = 0,
    OnePair = 1,
    TwoPair = 2,
    ThreeOfAKind = 3,
    Straight = 4,
    Flush = 5,
    FullHouse = 6,
    FourOfAKind = 7,
    StraightFlush = 8,
}

/// Strength of the best five-card hand found in seven cards.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct HandStrength {
    pub category: Category,
    // ordered high -> low for tiebreaks
    pub kickers: [u8; 5],
}

impl HandStrength {
    fn new(category: Category, ranks: &[u8]) -> Self {
        let mut kickers = [0u8; 5];
        for (slot, r) in kickers.iter_mut().zip(ranks) {
            *slot = *r;
        }
        Self { category, kickers }
    }
}

impl Ord for HandStrength {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_hands(self, other)
    }
}

impl PartialOrd for HandStrength {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Rank two hole cards plus a five-card board.
pub fn evaluate_holding(hole: &[Card; 2], board: &[Card; 5]) -> HandStrength {
    let mut cards = [hole[0]; 7];
    cards[1] = hole[1];
    cards[2..].copy_from_slice(board);
    evaluate_hand(&cards)
}

pub fn evaluate_hand(cards: &[Card; 7]) -> HandStrength {
    let mut rank_counts = [0u8; 15]; // 2..14 used
    let mut suit_masks = [0u16; 4];
    let mut suit_counts = [0u8; 4];
    for c in cards {
        let r = c.rank as u8;
        rank_counts[r as usize] += 1;
        let s = suit_index(c.suit);
        suit_counts[s] += 1;
        suit_masks[s] |= 1 << r;
    }

    let flush_suit = suit_counts.iter().position(|&n| n >= 5);

    if let Some(s) = flush_suit {
        if let Some(high) = straight_high_from_mask(suit_masks[s]) {
            return HandStrength::new(Category::StraightFlush, &[high]);
        }
    }

    // ranks grouped by multiplicity, each list high -> low
    let mut quads = Vec::new();
    let mut trips = Vec::new();
    let mut pairs = Vec::new();
    let mut singles = Vec::new();
    for r in (2..=14u8).rev() {
        match rank_counts[r as usize] {
            4 => quads.push(r),
            3 => trips.push(r),
            2 => pairs.push(r),
            1 => singles.push(r),
            _ => {}
        }
    }

    if let Some(&q) = quads.first() {
        let kicker = (2..=14u8)
            .rev()
            .find(|&r| r != q && rank_counts[r as usize] > 0)
            .unwrap_or(0);
        return HandStrength::new(Category::FourOfAKind, &[q, kicker]);
    }

    if let Some(&t) = trips.first() {
        // a second set of trips plays as the pair
        let pair = trips.get(1).copied().into_iter().chain(pairs.first().copied()).max();
        if let Some(p) = pair {
            return HandStrength::new(Category::FullHouse, &[t, p]);
        }
    }

    if let Some(s) = flush_suit {
        let ranks: Vec<u8> = (2..=14u8)
            .rev()
            .filter(|&r| suit_masks[s] & (1 << r) != 0)
            .take(5)
            .collect();
        return HandStrength::new(Category::Flush, &ranks);
    }

    let rank_mask = (2..=14u8)
        .filter(|&r| rank_counts[r as usize] > 0)
        .fold(0u16, |m, r| m | (1 << r));
    if let Some(high) = straight_high_from_mask(rank_mask) {
        return HandStrength::new(Category::Straight, &[high]);
    }

    if let Some(&t) = trips.first() {
        let mut ranks = vec![t];
        ranks.extend(highest_excluding(&rank_counts, &[t], 2));
        return HandStrength::new(Category::ThreeOfAKind, &ranks);
    }
    if pairs.len() >= 2 {
        let (high, low) = (pairs[0], pairs[1]);
        let mut ranks = vec![high, low];
        ranks.extend(highest_excluding(&rank_counts, &[high, low], 1));
        return HandStrength::new(Category::TwoPair, &ranks);
    }
    if let Some(&p) = pairs.first() {
        let mut ranks = vec![p];
        ranks.extend(highest_excluding(&rank_counts, &[p], 3));
        return HandStrength::new(Category::OnePair, &ranks);
    }

    HandStrength::new(Category::HighCard, &singles)
}

pub fn compare_hands(a: &HandStrength, b: &HandStrength) -> Ordering {
    match a.category.cmp(&b.category) {
        Ordering::Equal => a.kickers.cmp(&b.kickers),
        ord => ord,
    }
}

fn suit_index(s: Suit) -> usize {
    match s {
        Suit::Clubs => 0,
        Suit::Diamonds => 1,
        Suit::Hearts => 2,
        Suit::Spades => 3,
    }
}

fn highest_excluding(rank_counts: &[u8; 15], used: &[u8], n: usize) -> Vec<u8> {
    (2..=14u8)
        .rev()
        .filter(|r| rank_counts[*r as usize] > 0 && !used.contains(r))
        .take(n)
        .collect()
}

fn straight_high_from_mask(mask: u16) -> Option<u8> {
    let mut m = mask;
    // wheel: Ace also counts as 1
    if (m & (1 << 14)) != 0 {
        m |= 1 << 1;
    }
    (5..=14u8).rev().find(|&high| {
        let window = 0b11111u16 << (high - 4);
        m & window == window
    })
}
