//! Main and side pots built from what each seat put in.

use crate::hand::HandStrength;
use crate::Chips;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pot {
    pub amount: Chips,
    /// Seats still in the hand that contributed up to this pot's level.
    pub eligible: Vec<usize>,
}

/// Layers contributions into pots, smallest level first.
///
/// A level nobody live reached (only folded seats put that much in) is
/// merged into the pot below it.
pub fn side_pots(contributions: &[Chips], in_hand: &[bool]) -> Vec<Pot> {
    let mut levels: Vec<Chips> = contributions.iter().copied().filter(|&c| c > 0).collect();
    levels.sort_unstable();
    levels.dedup();

    let mut pots: Vec<Pot> = Vec::new();
    let mut previous = 0;
    let mut carry = 0;
    for level in levels {
        let amount: Chips = contributions
            .iter()
            .map(|&c| c.min(level) - c.min(previous))
            .sum();
        let eligible: Vec<usize> = (0..contributions.len())
            .filter(|&i| in_hand[i] && contributions[i] >= level)
            .collect();
        previous = level;

        if !eligible.is_empty() {
            pots.push(Pot {
                amount: amount + carry,
                eligible,
            });
            carry = 0;
        } else if let Some(last) = pots.last_mut() {
            last.amount += amount;
        } else {
            carry += amount;
        }
    }
    if carry > 0 {
        // no live seat put anything in
        pots.push(Pot {
            amount: carry,
            eligible: (0..in_hand.len()).filter(|&i| in_hand[i]).collect(),
        });
    }
    pots
}

/// Splits every pot among its best hands.
///
/// `strength` is only consulted for pots with more than one eligible seat.
/// Odd chips of a split go to the lowest seats first.
pub fn award<F>(pots: &[Pot], seats: usize, mut strength: F) -> Vec<Chips>
where
    F: FnMut(usize) -> Option<HandStrength>,
{
    let mut won = vec![0; seats];
    for pot in pots {
        let winners: Vec<usize> = if pot.eligible.len() == 1 {
            pot.eligible.clone()
        } else {
            let ranked: Vec<(usize, HandStrength)> = pot
                .eligible
                .iter()
                .filter_map(|&i| strength(i).map(|s| (i, s)))
                .collect();
            match ranked.iter().map(|(_, s)| s).max() {
                Some(best) => ranked
                    .iter()
                    .filter(|(_, s)| s == best)
                    .map(|(i, _)| *i)
                    .collect(),
                None => pot.eligible.clone(),
            }
        };
        if winners.is_empty() {
            continue;
        }

        let share = pot.amount / winners.len() as Chips;
        let mut odd = pot.amount % winners.len() as Chips;
        for &w in &winners {
            won[w] += share;
            if odd > 0 {
                won[w] += 1;
                odd -= 1;
            }
        }
    }
    won
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hand::{Category, HandStrength};

    fn strength(category: Category, high: u8) -> HandStrength {
        HandStrength {
            category,
            kickers: [high, 0, 0, 0, 0],
        }
    }

    #[test]
    fn short_all_in_creates_a_side_pot() {
        let pots = side_pots(&[100, 300, 300], &[true, true, true]);
        assert_eq!(
            pots,
            vec![
                Pot {
                    amount: 300,
                    eligible: vec![0, 1, 2]
                },
                Pot {
                    amount: 400,
                    eligible: vec![1, 2]
                },
            ]
        );
    }

    #[test]
    fn folded_chips_stay_in_the_pot() {
        let pots = side_pots(&[40, 80, 80], &[false, true, true]);
        assert_eq!(pots.len(), 2);
        assert_eq!(pots[0].eligible, vec![1, 2]);
        assert_eq!(pots.iter().map(|p| p.amount).sum::<Chips>(), 200);
    }

    #[test]
    fn short_stack_wins_only_the_main_pot() {
        let pots = side_pots(&[100, 300, 300], &[true, true, true]);
        let hands = [
            strength(Category::Flush, 10),
            strength(Category::OnePair, 9),
            strength(Category::OnePair, 5),
        ];
        let won = award(&pots, 3, |i| Some(hands[i].clone()));
        assert_eq!(won, vec![300, 400, 0]);
    }

    #[test]
    fn split_pot_gives_odd_chip_to_lowest_seat() {
        let pots = vec![Pot {
            amount: 81,
            eligible: vec![0, 2],
        }];
        let tie = strength(Category::Straight, 9);
        let won = award(&pots, 3, |_| Some(tie.clone()));
        assert_eq!(won, vec![41, 0, 40]);
    }
}
