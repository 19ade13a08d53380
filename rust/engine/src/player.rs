use crate::cards::Card;
use crate::Chips;

/// One seat at the table for the length of a hand.
#[derive(Debug, Clone)]
pub struct Seat {
    starting_stack: Chips,
    stack: Chips,
    /// Chips put in on the current street, not yet collected.
    bet: Chips,
    /// Chips collected into the pot on earlier streets.
    committed: Chips,
    folded: bool,
    hole: Option<[Card; 2]>,
}

impl Seat {
    pub fn new(stack: Chips) -> Self {
        Self {
            starting_stack: stack,
            stack,
            bet: 0,
            committed: 0,
            folded: false,
            hole: None,
        }
    }

    pub fn stack(&self) -> Chips {
        self.stack
    }
    pub fn bet(&self) -> Chips {
        self.bet
    }
    pub fn starting_stack(&self) -> Chips {
        self.starting_stack
    }
    pub fn hole_cards(&self) -> Option<&[Card; 2]> {
        self.hole.as_ref()
    }

    /// Total chips this seat has put in during the hand.
    pub fn contribution(&self) -> Chips {
        self.committed + self.bet
    }

    /// Still contesting the pot.
    pub fn in_hand(&self) -> bool {
        !self.folded
    }

    /// Still able to make betting decisions.
    pub fn can_act(&self) -> bool {
        !self.folded && self.stack > 0
    }

    pub fn give_cards(&mut self, cards: [Card; 2]) -> Result<(), [Card; 2]> {
        if self.hole.is_some() {
            return Err(cards);
        }
        self.hole = Some(cards);
        Ok(())
    }

    pub fn fold(&mut self) {
        self.folded = true;
    }

    /// Moves up to `amount` chips from the stack into the street bet; returns what moved.
    pub fn put_in(&mut self, amount: Chips) -> Chips {
        let moved = amount.clamp(0, self.stack);
        self.stack -= moved;
        self.bet += moved;
        moved
    }

    pub fn collect_bet(&mut self) {
        self.committed += self.bet;
        self.bet = 0;
    }

    pub fn add_chips(&mut self, amount: Chips) {
        self.stack += amount;
    }

    pub fn payoff(&self) -> Chips {
        self.stack - self.starting_stack
    }
}
