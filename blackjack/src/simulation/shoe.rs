use super::{Card, Suit};
use crate::{Error, Result};

use strum::IntoEnumIterator;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Represents a shoe in the real world.
#[derive(Debug, Clone)]
pub struct Shoe {
    number_of_decks: u8,
    shuffle_threshold: f64,
    cards: Vec<Card>,
    current_index: usize,
    rng: StdRng,
}

impl Shoe {
    /// Creates a new shoe with ordered cards. Shuffling draws from a
    /// generator seeded with `seed`, or from entropy when none is given.
    pub fn new(number_of_decks: u8, shuffle_threshold: f64, seed: Option<u64>) -> Shoe {
        let mut cards = Vec::with_capacity(number_of_decks as usize * 52);
        for _ in 0..number_of_decks {
            for suit in Suit::iter() {
                for rank in 0..13 {
                    cards.push(Card::new(suit, rank));
                }
            }
        }
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Shoe {
            number_of_decks,
            shuffle_threshold,
            cards,
            current_index: 0,
            rng,
        }
    }

    /// Returns all dealt cards back into the shoe and shuffles.
    pub fn shuffle(&mut self) {
        self.cards.shuffle(&mut self.rng);
        self.current_index = 0;
    }

    /// Returns the dealt cards back into the shoe, and shuffles. This method makes sure the given first few cards
    /// will be at the frontmost positions of the shoe. Panics if requirement cannot be met.
    /// Note that the cards are given in base values (i.e., 11 stands for A. 10 stands for 10, J, Q and K).
    pub fn shuffle_with_firsts(&mut self, firsts: &[u8]) {
        let mut counts = [self.number_of_decks; 52];
        self.current_index = 0;

        let mut idx = 0;
        for base_value in firsts {
            let card_integer = find_suitable_card(&counts, *base_value)
                .expect("The given first cards are invalid");
            counts[card_integer as usize] -= 1;
            self.cards[idx] = Card::try_from(card_integer).expect("card integer is below 52");
            idx += 1;
        }

        for suit in Suit::iter() {
            for rank in 0..13 {
                let card = Card::new(suit, rank);
                let card_integer: u8 = card.into();
                for _ in 0..counts[card_integer as usize] {
                    self.cards[idx] = card;
                    idx += 1;
                }
            }
        }

        self.cards[firsts.len()..].shuffle(&mut self.rng);
    }

    /// Deals the next card. Running dry in the middle of a round means the
    /// reshuffle threshold was not honored.
    pub fn deal_card(&mut self) -> Result<Card> {
        let card = self
            .cards
            .get(self.current_index)
            .copied()
            .ok_or(Error::ShoeExhausted)?;
        self.current_index += 1;
        Ok(card)
    }

    /// Checks if so few cards remain that the shoe must be rebuilt before
    /// the next round.
    pub fn needs_reshuffle(&self) -> bool {
        let capacity = self.cards.len() as f64;
        (self.remaining() as f64) < capacity * self.shuffle_threshold
    }

    pub fn remaining(&self) -> usize {
        self.cards.len() - self.current_index
    }

    pub fn dealt(&self) -> usize {
        self.current_index
    }

    pub fn number_of_decks(&self) -> u8 {
        self.number_of_decks
    }

    pub fn preview_next_few_cards(&self, number: usize) -> &[Card] {
        let end = usize::min(self.cards.len(), self.current_index + number);
        &self.cards[self.current_index..end]
    }
}

fn find_suitable_card(counts: &[u8; 52], base_value: u8) -> std::result::Result<u8, ()> {
    let (lo, hi) = match base_value {
        11 => (0, 0),
        10 => (9, 12),
        2..=9 => (base_value - 1, base_value - 1),
        _ => return Err(()),
    };

    for rank in lo..=hi {
        for suit in Suit::iter() {
            let card: u8 = Card::new(suit, rank).into();
            if counts[card as usize] > 0 {
                return Ok(card);
            }
        }
    }

    Err(())
}
