use log::warn;

use super::Strategy;
use crate::{
    simulation::{legal_decisions, Card, Hand},
    Decision, Error, Result,
};

/// A question put to whoever plays the interactive strategy.
#[derive(Debug, Clone, PartialEq)]
pub enum Request<'a> {
    Bet,
    Insurance {
        hand: &'a Hand,
        dealer_up_card: Card,
    },
    Surrender {
        hand: &'a Hand,
        dealer_up_card: Card,
    },
    Action {
        hand: &'a Hand,
        dealer_up_card: Card,
        legal: &'a [Decision],
    },
}

/// Someone outside the engine who answers requests synchronously, e.g. a
/// person at a terminal. Answers are raw text and get validated by the
/// strategy.
pub trait Actor {
    fn respond(&mut self, request: &Request<'_>) -> String;

    /// Told why the last response was refused, right before being asked again.
    fn reject(&mut self, _request: &Request<'_>, _reason: &str) {}
}

/// Defers every decision to an `Actor`, asking again until the answer is valid.
#[derive(Debug)]
pub struct InteractiveStrategy<A: Actor> {
    actor: A,
}

impl<A: Actor> InteractiveStrategy<A> {
    pub fn new(actor: A) -> Self {
        InteractiveStrategy { actor }
    }

    pub fn actor(&self) -> &A {
        &self.actor
    }

    fn ask<T>(&mut self, request: &Request<'_>, parse: impl Fn(&str) -> Result<T>) -> T {
        loop {
            let response = self.actor.respond(request);
            match parse(&response) {
                Ok(value) => return value,
                Err(err) => {
                    warn!("rejected response {:?}: {}", response, err);
                    self.actor.reject(request, &err.to_string());
                }
            }
        }
    }
}

fn parse_bet(response: &str) -> Result<f64> {
    let bet: f64 = response
        .trim()
        .parse()
        .map_err(|_| Error::InvalidResponse(format!("'{}' is not an amount", response.trim())))?;
    if !bet.is_finite() || bet <= 0.0 {
        return Err(Error::InvalidResponse(String::from(
            "the bet must be a positive amount",
        )));
    }
    Ok(bet)
}

fn parse_yes_no(response: &str) -> Result<bool> {
    match response.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Ok(true),
        "n" | "no" => Ok(false),
        other => Err(Error::InvalidResponse(format!(
            "'{}' is neither yes nor no",
            other
        ))),
    }
}

impl<A: Actor> Strategy for InteractiveStrategy<A> {
    fn make_bet(&mut self) -> f64 {
        self.ask(&Request::Bet, parse_bet)
    }

    fn choose_insurance(&mut self, hand: &Hand, dealer_up_card: Card) -> bool {
        let request = Request::Insurance {
            hand,
            dealer_up_card,
        };
        self.ask(&request, parse_yes_no)
    }

    fn choose_surrender(&mut self, hand: &Hand, dealer_up_card: Card) -> bool {
        let request = Request::Surrender {
            hand,
            dealer_up_card,
        };
        self.ask(&request, parse_yes_no)
    }

    fn choice(&mut self, hand: &Hand, dealer_up_card: Card) -> Decision {
        let legal = legal_decisions(hand);
        let request = Request::Action {
            hand,
            dealer_up_card,
            legal: &legal,
        };
        self.ask(&request, |response| {
            let decision: Decision = response.parse()?;
            if legal.contains(&decision) {
                Ok(decision)
            } else {
                Err(Error::InvalidResponse(format!(
                    "{} is not allowed on this hand",
                    decision
                )))
            }
        })
    }
}
