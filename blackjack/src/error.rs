use thiserror::Error;

use crate::simulation::{GamePhase, HandId};
use crate::Decision;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("{operation} is only allowed in {expected:?} phase, table is in {actual:?}")]
    WrongPhase {
        operation: &'static str,
        expected: GamePhase,
        actual: GamePhase,
    },
    #[error("Invalid rule: {0}")]
    InvalidRule(String),
    #[error("Invalid bet: {0}")]
    InvalidBet(f64),
    #[error("Invalid money amount: {0}")]
    InvalidMoney(f64),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Shoe ran out of cards in the middle of a round")]
    ShoeExhausted,
    #[error("{decision} is not a legal action for hand {hand:?}")]
    IllegalDecision { hand: HandId, decision: Decision },
    #[error("Invariant violated: {0}")]
    Invariant(String),
}
