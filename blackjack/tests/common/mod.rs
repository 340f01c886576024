#![allow(dead_code)]

use std::collections::VecDeque;

use blackjack::simulation::{Card, Hand, HandId, Table};
use blackjack::strategy::Strategy;
use blackjack::{Decision, Rule};

/// Plays back a fixed list of decisions and records what the table tells it.
#[derive(Debug, Default)]
pub struct Scripted {
    pub bet: f64,
    pub insurance: bool,
    pub surrender: bool,
    pub decisions: VecDeque<Decision>,

    pub choices: usize,
    pub viewed: Vec<Card>,
    pub viewed_at_first_choice: Option<usize>,
    pub split_hands: Vec<HandId>,
    pub ended_hands: Vec<HandId>,
    pub results: Vec<i8>,
    pub rounds_started: usize,
    pub shuffles: usize,
}

impl Scripted {
    pub fn new(bet: f64, decisions: &[Decision]) -> Self {
        Scripted {
            bet,
            decisions: decisions.iter().copied().collect(),
            ..Default::default()
        }
    }
}

impl Strategy for Scripted {
    fn make_bet(&mut self) -> f64 {
        self.bet
    }

    fn choose_insurance(&mut self, _: &Hand, _: Card) -> bool {
        self.insurance
    }

    fn choose_surrender(&mut self, _: &Hand, _: Card) -> bool {
        self.surrender
    }

    fn choice(&mut self, hand: &Hand, _: Card) -> Decision {
        assert!(hand.total() < 21, "asked to play a finished hand {}", hand);
        self.choices += 1;
        self.viewed_at_first_choice.get_or_insert(self.viewed.len());
        self.decisions.pop_front().unwrap_or(Decision::Stand)
    }

    fn start_round(&mut self) {
        self.rounds_started += 1;
    }

    fn split_hand(&mut self, hand: &Hand) {
        self.split_hands.push(hand.id());
    }

    fn end_hand(&mut self, hand: &Hand) {
        self.ended_hands.push(hand.id());
    }

    fn end_round(&mut self, result: i8) {
        self.results.push(result);
    }

    fn deck_shuffled(&mut self, _: u8) {
        self.shuffles += 1;
    }

    fn view_card(&mut self, card: Card) {
        self.viewed.push(card);
    }
}

pub fn single_deck_rule() -> Rule {
    Rule {
        number_of_decks: 1,
        shuffle_threshold: 0.5,
        ..Default::default()
    }
}

/// A one-deck table whose shoe starts with cards of the given values, in
/// dealing order: player, dealer up, player, dealer hole, then draws.
pub fn rigged_table(firsts: &[u8]) -> Table {
    let mut table = Table::new(&single_deck_rule(), Some(17)).unwrap();
    table.shoe_mut().shuffle_with_firsts(firsts);
    table
}
