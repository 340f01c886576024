use log::debug;

use super::Strategy;
use crate::{
    simulation::{legal_decisions, Card, Hand},
    Decision,
};

const MIN_BET: f64 = 10.0;
const MAX_BET: f64 = 10000.0;
/// True counts are mapped linearly onto the bet range over [0, MAX_TRUE_COUNT].
const MAX_TRUE_COUNT: f64 = 10.0;
const INSURANCE_TRUE_COUNT: f64 = 3.0;

/// (decision, fallback when the decision is not legal on this hand)
type Cell = (Decision, Decision);

const H: Cell = (Decision::Hit, Decision::Hit);
const S: Cell = (Decision::Stand, Decision::Stand);
const P: Cell = (Decision::Split, Decision::Hit);
const DH: Cell = (Decision::Double, Decision::Hit);
const DS: Cell = (Decision::Double, Decision::Stand);

// Columns are the dealer's up card: 2, 3, 4, 5, 6, 7, 8, 9, 10, A.

static PAIR_CHART: [[Cell; 10]; 10] = [
    [P, P, P, P, P, P, H, H, H, H], // Double 2
    [P, P, P, P, P, P, H, H, H, H],
    [H, H, H, P, P, H, H, H, H, H],
    [DH, DH, DH, DH, DH, DH, DH, DH, H, H],
    [P, P, P, P, P, H, H, H, H, H],
    [P, P, P, P, P, P, H, H, H, H],
    [P, P, P, P, P, P, P, P, P, P],
    [P, P, P, P, P, S, P, P, S, S],
    [S, S, S, S, S, S, S, S, S, S], // Double 10
    [P, P, P, P, P, P, P, P, P, P], // Double Ace
];

static SOFT_CHART: [[Cell; 10]; 8] = [
    [H, H, H, DH, DH, H, H, H, H, H], // Soft 13
    [H, H, H, DH, DH, H, H, H, H, H],
    [H, H, DH, DH, DH, H, H, H, H, H],
    [H, H, DH, DH, DH, H, H, H, H, H],
    [H, DH, DH, DH, DH, H, H, H, H, H],
    [DS, DS, DS, DS, DS, S, S, H, H, H],
    [S, S, S, S, DS, S, S, S, S, S],
    [S, S, S, S, S, S, S, S, S, S], // Soft 20
];

static HARD_CHART: [[Cell; 10]; 10] = [
    [H, H, H, H, H, H, H, H, H, H], // 8 and below
    [H, DH, DH, DH, DH, H, H, H, H, H],
    [DH, DH, DH, DH, DH, DH, DH, DH, H, H],
    [DH, DH, DH, DH, DH, DH, DH, DH, DH, DH],
    [H, H, S, S, S, H, H, H, H, H],
    [S, S, S, S, S, H, H, H, H, H],
    [S, S, S, S, S, H, H, H, H, H],
    [S, S, S, S, S, H, H, H, H, H],
    [S, S, S, S, S, H, H, H, H, H],
    [S, S, S, S, S, S, S, S, S, S], // 17 and above
];

/// Hi-Lo card counter. Sizes its bet from the true count and plays a chart
/// split into pairs, soft totals and hard totals.
#[derive(Debug, Clone)]
pub struct CountingStrategy {
    number_of_decks: u8,
    running_count: i32,
    cards_played: u32,
}

impl CountingStrategy {
    pub fn new(number_of_decks: u8) -> Self {
        CountingStrategy {
            number_of_decks,
            running_count: 0,
            cards_played: 0,
        }
    }

    pub fn running_count(&self) -> i32 {
        self.running_count
    }

    pub fn cards_played(&self) -> u32 {
        self.cards_played
    }

    /// Whole decks not yet dealt, estimated from the cards seen.
    pub fn decks_remaining(&self) -> i32 {
        self.number_of_decks as i32 - (self.cards_played / 52) as i32
    }

    /// Running count per remaining deck. Once less than a whole deck is left
    /// the running count itself is used.
    pub fn true_count(&self) -> f64 {
        let decks_remaining = self.decks_remaining();
        if decks_remaining < 1 {
            self.running_count as f64
        } else {
            self.running_count as f64 / decks_remaining as f64
        }
    }

    pub fn bet_for_true_count(true_count: f64) -> f64 {
        let clamped = true_count.clamp(0.0, MAX_TRUE_COUNT);
        MIN_BET + (MAX_BET - MIN_BET) * clamped / MAX_TRUE_COUNT
    }

    fn chart_cell(hand: &Hand, dealer_up_card: Card) -> Cell {
        let col = (dealer_up_card.base_value() - 2) as usize;
        let total = hand.total();
        if hand.can_split() {
            let row = (hand.cards()[0].base_value() - 2) as usize;
            PAIR_CHART[row][col]
        } else if hand.is_soft() {
            match total {
                13..=20 => SOFT_CHART[(total - 13) as usize][col],
                21.. => S,
                // A lone pair of Aces that can no longer be split.
                _ => H,
            }
        } else {
            let row = (total.clamp(8, 17) - 8) as usize;
            HARD_CHART[row][col]
        }
    }
}

impl Strategy for CountingStrategy {
    fn make_bet(&mut self) -> f64 {
        let true_count = self.true_count();
        let bet = Self::bet_for_true_count(true_count);
        debug!(
            "running count {}, true count {:.2}, betting {:.2}",
            self.running_count, true_count, bet
        );
        bet
    }

    fn choose_insurance(&mut self, _: &Hand, _: Card) -> bool {
        self.true_count() >= INSURANCE_TRUE_COUNT
    }

    fn choose_surrender(&mut self, hand: &Hand, dealer_up_card: Card) -> bool {
        let up = dealer_up_card.base_value();
        match hand.total() {
            16 => up >= 9,
            15 => up == 10,
            _ => false,
        }
    }

    fn choice(&mut self, hand: &Hand, dealer_up_card: Card) -> Decision {
        let (decision, fallback) = Self::chart_cell(hand, dealer_up_card);
        if legal_decisions(hand).contains(&decision) {
            decision
        } else {
            fallback
        }
    }

    fn deck_shuffled(&mut self, number_of_decks: u8) {
        self.number_of_decks = number_of_decks;
        self.running_count = 0;
        self.cards_played = 0;
    }

    fn view_card(&mut self, card: Card) {
        self.running_count += card.count_value() as i32;
        self.cards_played += 1;
    }
}
