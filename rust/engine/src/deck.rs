use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use crate::cards::{full_deck, Card};

/// Undealt cards of one hand.
///
/// Cards named by the action sequence are pulled out with [`Deck::take`];
/// burns draw whatever comes next in the shuffled order.
#[derive(Debug)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    pub fn new_with_seed(seed: u64) -> Self {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let mut cards = full_deck();
        cards.shuffle(&mut rng);
        Self { cards }
    }

    /// Removes a specific card. Returns `false` when it was already dealt.
    pub fn take(&mut self, card: Card) -> bool {
        match self.cards.iter().position(|&c| c == card) {
            Some(i) => {
                self.cards.remove(i);
                true
            }
            None => false,
        }
    }

    pub fn draw(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    pub fn remaining(&self) -> usize {
        self.cards.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_draws_same_cards() {
        let mut a = Deck::new_with_seed(7);
        let mut b = Deck::new_with_seed(7);
        for _ in 0..10 {
            assert_eq!(a.draw(), b.draw());
        }
    }

    #[test]
    fn taken_card_cannot_be_taken_again() {
        let mut deck = Deck::new_with_seed(1);
        let ace: Card = "As".parse().unwrap();
        assert!(deck.take(ace));
        assert!(!deck.take(ace));
        assert_eq!(deck.remaining(), 51);
        while let Some(c) = deck.draw() {
            assert_ne!(c, ace);
        }
    }
}
