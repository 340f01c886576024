pub mod simulation;
pub mod strategy;

mod error;

use serde::Serialize;
use serde_enum_str::{Deserialize_enum_str, Serialize_enum_str};

pub use error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rule {
    pub number_of_decks: u8,
    /// The shoe is rebuilt before a round once fewer than
    /// `number_of_decks * 52 * shuffle_threshold` cards remain.
    pub shuffle_threshold: f64,
    pub payout_blackjack: f64,
    pub payout_insurance: f64,
    /// Insurance stake as a fraction of the main bet.
    pub insurance_fraction: f64,
}

impl Rule {
    pub fn validate(&self) -> Result<()> {
        if self.number_of_decks == 0 {
            return Err(Error::InvalidRule(String::from(
                "number_of_decks must be at least 1",
            )));
        }
        if !(self.shuffle_threshold > 0.0 && self.shuffle_threshold <= 1.0) {
            return Err(Error::InvalidRule(format!(
                "shuffle_threshold must be in (0, 1], got {}",
                self.shuffle_threshold
            )));
        }
        for (name, value) in [
            ("payout_blackjack", self.payout_blackjack),
            ("payout_insurance", self.payout_insurance),
            ("insurance_fraction", self.insurance_fraction),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidRule(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

impl Default for Rule {
    fn default() -> Self {
        Rule {
            number_of_decks: 1,
            shuffle_threshold: 0.5,
            payout_blackjack: 1.5,
            payout_insurance: 2.0,
            insurance_fraction: 0.5,
        }
    }
}

/// The strategies a session can be played with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize_enum_str, Deserialize_enum_str)]
pub enum StrategyKind {
    StandOnly,
    BasicRules,
    Counting,
    Interactive,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Decision {
    Hit,
    Stand,
    Double,
    Split,
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Decision::Hit => "Hit",
            Decision::Stand => "Stand",
            Decision::Double => "Double",
            Decision::Split => "Split",
        };
        write!(f, "{}", name)
    }
}

impl std::str::FromStr for Decision {
    type Err = Error;

    /// Accepts the full name, its first letter, or the menu number
    /// (0: Hit, 1: Stand, 2: Double, 3: Split).
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "0" | "h" | "hit" => Ok(Decision::Hit),
            "1" | "s" | "stand" => Ok(Decision::Stand),
            "2" | "d" | "double" | "double down" => Ok(Decision::Double),
            "3" | "p" | "split" => Ok(Decision::Split),
            other => Err(Error::InvalidResponse(format!(
                "'{}' is not an action",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rule_is_valid() {
        assert!(Rule::default().validate().is_ok());
    }

    #[test]
    fn rule_rejects_bad_threshold_and_decks() {
        let mut rule = Rule::default();
        rule.shuffle_threshold = 0.0;
        assert!(matches!(rule.validate(), Err(Error::InvalidRule(_))));
        rule.shuffle_threshold = 1.5;
        assert!(rule.validate().is_err());
        rule.shuffle_threshold = 1.0;
        assert!(rule.validate().is_ok());
        rule.number_of_decks = 0;
        assert!(rule.validate().is_err());
    }

    #[test]
    fn decision_parses_aliases() {
        assert_eq!("hit".parse::<Decision>().unwrap(), Decision::Hit);
        assert_eq!(" S ".parse::<Decision>().unwrap(), Decision::Stand);
        assert_eq!("2".parse::<Decision>().unwrap(), Decision::Double);
        assert_eq!("split".parse::<Decision>().unwrap(), Decision::Split);
        assert!("surrender".parse::<Decision>().is_err());
    }

    #[test]
    fn strategy_kind_parses_from_config_string() {
        let kind: StrategyKind = "Counting".parse().unwrap();
        assert_eq!(kind, StrategyKind::Counting);
        assert!("Martingale".parse::<StrategyKind>().is_err());
    }
}
