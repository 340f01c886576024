use serde::Serialize;

use super::{Card, HandId};

/// How a round was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RoundOutcome {
    PlayerBlackjack,
    DealerBlackjack,
    BothBlackjack,
    Surrendered,
    /// Every player hand busted, so the dealer never drew.
    AllBusted,
    DealerBust,
    /// Live hands were compared against the dealer's total.
    Compared,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HandResult {
    Blackjack,
    Win,
    Push,
    Loss,
    Bust,
    Surrender,
}

impl HandResult {
    pub fn multiplier(&self, payout_blackjack: f64) -> f64 {
        match self {
            HandResult::Blackjack => payout_blackjack,
            HandResult::Win => 1.0,
            HandResult::Push => 0.0,
            HandResult::Loss | HandResult::Bust => -1.0,
            HandResult::Surrender => -0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HandReport {
    pub id: HandId,
    pub cards: Vec<Card>,
    pub total: u8,
    pub bet: f64,
    pub result: HandResult,
    pub delta: f64,
}

/// Everything that happened in one round, emitted once settlement is done.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundReport {
    pub round: u64,
    pub reshuffled: bool,
    pub outcome: RoundOutcome,
    pub hands: Vec<HandReport>,
    pub dealer_cards: Vec<Card>,
    pub dealer_total: u8,
    pub insurance_bet: f64,
    pub insurance_delta: f64,
    /// Net change of the bankroll, insurance included.
    pub delta: f64,
}

impl RoundReport {
    /// +1 for a net win, -1 for a net loss, 0 for a draw.
    pub fn result(&self) -> i8 {
        if self.delta > 0.0 {
            1
        } else if self.delta < 0.0 {
            -1
        } else {
            0
        }
    }

    pub fn total_bet(&self) -> f64 {
        self.hands.iter().map(|hand| hand.bet).sum::<f64>() + self.insurance_bet
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(delta: f64) -> RoundReport {
        RoundReport {
            round: 1,
            reshuffled: false,
            outcome: RoundOutcome::Compared,
            hands: vec![HandReport {
                id: HandId(1),
                cards: Vec::new(),
                total: 20,
                bet: 10.0,
                result: HandResult::Win,
                delta,
            }],
            dealer_cards: Vec::new(),
            dealer_total: 18,
            insurance_bet: 5.0,
            insurance_delta: 0.0,
            delta,
        }
    }

    #[test]
    fn result_follows_sign_of_delta() {
        assert_eq!(report(10.0).result(), 1);
        assert_eq!(report(-5.0).result(), -1);
        assert_eq!(report(0.0).result(), 0);
    }

    #[test]
    fn total_bet_includes_insurance() {
        assert_eq!(report(10.0).total_bet(), 15.0);
    }

    #[test]
    fn multipliers() {
        assert_eq!(HandResult::Blackjack.multiplier(1.5), 1.5);
        assert_eq!(HandResult::Surrender.multiplier(1.5), -0.5);
        assert_eq!(HandResult::Bust.multiplier(1.5), -1.0);
    }
}
