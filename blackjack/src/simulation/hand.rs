use serde::Serialize;

use super::Card;
use crate::{Error, Result};

/// Identity tag of a hand within a table. Split hands get fresh ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct HandId(pub u32);

/// A group of cards with an incrementally tracked total.
///
/// At most one Ace counts as 11 at any time. `soft` is true exactly when
/// such an Ace is part of `total`.
#[derive(Debug, Clone, PartialEq)]
pub struct Hand {
    id: HandId,
    cards: Vec<Card>,
    total: u8,
    soft: bool,
    generation: u8,
    bet: f64,
}

impl Hand {
    pub fn new(id: HandId, bet: f64) -> Hand {
        Hand {
            id,
            cards: Vec::with_capacity(3),
            total: 0,
            soft: false,
            generation: 0,
            bet,
        }
    }

    /// The hand receives a card.
    pub fn add_card(&mut self, card: Card) {
        let mut value = card.base_value();
        if card.is_ace() {
            if self.soft {
                // Only one Ace may stay unreduced.
                value -= 10;
            } else {
                self.soft = true;
            }
        }
        self.total += value;
        if self.total > 21 && self.soft {
            self.total -= 10;
            self.soft = false;
        }
        self.cards.push(card);
    }

    pub fn can_split(&self) -> bool {
        self.generation == 0
            && self.cards.len() == 2
            && self.cards[0].base_value() == self.cards[1].base_value()
    }

    /// Splits a pair into two one-card hands carrying the same bet. Each of
    /// them must receive a card before being played.
    pub fn split(self, first_id: HandId, second_id: HandId) -> Result<(Hand, Hand)> {
        if !self.can_split() {
            return Err(Error::Invariant(format!("hand {} cannot be split", self)));
        }
        let generation = self.generation + 1;
        let bet = self.bet;
        let mut halves = self.cards.into_iter().zip([first_id, second_id]).map(|(card, id)| {
            let mut hand = Hand::new(id, bet);
            hand.generation = generation;
            hand.add_card(card);
            hand
        });
        match (halves.next(), halves.next()) {
            (Some(first), Some(second)) => Ok((first, second)),
            _ => Err(Error::Invariant(String::from("split lost a card"))),
        }
    }

    /// Doubles the stake. The doubled bet stands even if the next card busts.
    pub fn double_bet(&mut self) {
        self.bet *= 2.0;
    }

    pub fn is_bust(&self) -> bool {
        self.total > 21
    }

    /// A natural: 21 with the first two cards of an unsplit hand.
    pub fn is_blackjack(&self) -> bool {
        self.total == 21 && self.cards.len() == 2 && self.generation == 0
    }

    pub fn id(&self) -> HandId {
        self.id
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn total(&self) -> u8 {
        self.total
    }

    pub fn is_soft(&self) -> bool {
        self.soft
    }

    pub fn generation(&self) -> u8 {
        self.generation
    }

    pub fn bet(&self) -> f64 {
        self.bet
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

impl std::fmt::Display for Hand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for card in &self.cards {
            write!(f, "{} ", card)?;
        }
        if self.soft {
            write!(f, "(soft {})", self.total)
        } else {
            write!(f, "({})", self.total)
        }
    }
}

/// The dealer's cards. The second card stays face down until revealed.
#[derive(Debug, Clone, PartialEq)]
pub struct DealerHand {
    hand: Hand,
    hole_revealed: bool,
}

impl DealerHand {
    pub fn new() -> DealerHand {
        DealerHand {
            hand: Hand::new(HandId(0), 0.0),
            hole_revealed: false,
        }
    }

    pub fn add_card(&mut self, card: Card) {
        self.hand.add_card(card);
    }

    pub fn up_card(&self) -> Option<Card> {
        self.hand.cards().first().copied()
    }

    /// Turns the hole card face up. Returns the card only the first time, so
    /// that it is shown to the strategy exactly once.
    pub fn reveal_hole_card(&mut self) -> Option<Card> {
        if self.hole_revealed {
            return None;
        }
        let hole = self.hand.cards().get(1).copied()?;
        self.hole_revealed = true;
        Some(hole)
    }

    pub fn is_hole_revealed(&self) -> bool {
        self.hole_revealed
    }

    /// The dealer draws on 16 or less and stands on every 17.
    pub fn must_draw(&self) -> bool {
        self.hand.total() < 17
    }

    pub fn hand(&self) -> &Hand {
        &self.hand
    }

    pub fn clear(&mut self) {
        *self = DealerHand::new();
    }
}

impl Default for DealerHand {
    fn default() -> Self {
        DealerHand::new()
    }
}
