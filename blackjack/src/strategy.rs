pub mod counting;
pub mod interactive;

use crate::{
    simulation::{Card, Hand},
    Decision,
};

pub use counting::CountingStrategy;
pub use interactive::{Actor, InteractiveStrategy, Request};

/// A player at the table. The table asks it for bets and decisions, and
/// tells it about every card that becomes visible.
///
/// `choice` is never called on a hand totaling 21 or more, and the returned
/// decision must be one of `simulation::legal_decisions(hand)`.
pub trait Strategy {
    fn make_bet(&mut self) -> f64;

    fn choose_insurance(&mut self, _hand: &Hand, _dealer_up_card: Card) -> bool {
        false
    }

    fn choose_surrender(&mut self, _hand: &Hand, _dealer_up_card: Card) -> bool {
        false
    }

    fn choice(&mut self, hand: &Hand, dealer_up_card: Card) -> Decision;

    fn start_round(&mut self) {}

    /// Called right before `hand` is split in two.
    fn split_hand(&mut self, _hand: &Hand) {}

    fn end_hand(&mut self, _hand: &Hand) {}

    /// `result` is +1, 0 or -1 for a net win, draw or loss.
    fn end_round(&mut self, _result: i8) {}

    fn deck_shuffled(&mut self, _number_of_decks: u8) {}

    /// Called exactly once for every card this player gets to see.
    fn view_card(&mut self, _card: Card) {}
}

/// Never takes a card.
#[derive(Debug, Clone)]
pub struct StandOnlyStrategy {
    bet: f64,
}

impl StandOnlyStrategy {
    pub fn new(bet: f64) -> Self {
        StandOnlyStrategy { bet }
    }
}

impl Strategy for StandOnlyStrategy {
    fn make_bet(&mut self) -> f64 {
        self.bet
    }

    fn choice(&mut self, _: &Hand, _: Card) -> Decision {
        Decision::Stand
    }
}

/// Plays a fixed table on the hand total and the dealer's up card, with a
/// fixed bet. Never splits.
#[derive(Debug, Clone)]
pub struct BasicStrategy {
    bet: f64,
}

impl BasicStrategy {
    pub fn new(bet: f64) -> Self {
        BasicStrategy { bet }
    }
}

impl Strategy for BasicStrategy {
    fn make_bet(&mut self) -> f64 {
        self.bet
    }

    fn choice(&mut self, hand: &Hand, dealer_up_card: Card) -> Decision {
        let up = dealer_up_card.base_value();
        let decision = match hand.total() {
            17.. => Decision::Stand,
            13..=16 if (2..=6).contains(&up) => Decision::Stand,
            12 if (4..=6).contains(&up) => Decision::Stand,
            11 if up == 11 => Decision::Hit,
            10 if up >= 10 => Decision::Hit,
            9..=11 => Decision::Double,
            _ => Decision::Hit,
        };

        // Doubling is only open on the first two cards.
        if decision == Decision::Double && hand.len() != 2 {
            Decision::Hit
        } else {
            decision
        }
    }
}
