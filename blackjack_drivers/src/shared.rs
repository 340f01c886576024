use anyhow::Context;
use blackjack::{self, StrategyKind};
use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub rule: ConfigRule,
    pub blackjack_simulator: ConfigBlackjackSimulator,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigRule {
    pub number_of_decks: u8,
    pub shuffle_threshold: f64,
    #[serde(default = "default_payout_blackjack")]
    pub payout_blackjack: f64,
    #[serde(default = "default_payout_insurance")]
    pub payout_insurance: f64,
    #[serde(default = "default_insurance_fraction")]
    pub insurance_fraction: f64,
}

fn default_payout_blackjack() -> f64 {
    blackjack::Rule::default().payout_blackjack
}

fn default_payout_insurance() -> f64 {
    blackjack::Rule::default().payout_insurance
}

fn default_insurance_fraction() -> f64 {
    blackjack::Rule::default().insurance_fraction
}

impl Default for ConfigRule {
    fn default() -> Self {
        let rule = blackjack::Rule::default();
        ConfigRule {
            number_of_decks: rule.number_of_decks,
            shuffle_threshold: rule.shuffle_threshold,
            payout_blackjack: rule.payout_blackjack,
            payout_insurance: rule.payout_insurance,
            insurance_fraction: rule.insurance_fraction,
        }
    }
}

impl TryFrom<ConfigRule> for blackjack::Rule {
    type Error = blackjack::Error;

    fn try_from(config_rule: ConfigRule) -> Result<Self, Self::Error> {
        let blackjack_rule = blackjack::Rule {
            number_of_decks: config_rule.number_of_decks,
            shuffle_threshold: config_rule.shuffle_threshold,
            payout_blackjack: config_rule.payout_blackjack,
            payout_insurance: config_rule.payout_insurance,
            insurance_fraction: config_rule.insurance_fraction,
        };
        blackjack_rule.validate()?;
        Ok(blackjack_rule)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigBlackjackSimulator {
    pub strategy: String,
    pub fixed_bet: f64,
    pub rounds: u64,
    #[serde(default)]
    pub starting_bankroll: f64,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub quiet: bool,
}

impl ConfigBlackjackSimulator {
    pub fn strategy_kind(&self) -> Result<StrategyKind, serde::de::value::Error> {
        self.strategy.parse()
    }
}

impl Default for ConfigBlackjackSimulator {
    fn default() -> Self {
        ConfigBlackjackSimulator {
            strategy: String::from("BasicRules"),
            fixed_bet: 10.0,
            rounds: 100,
            starting_bankroll: 100.0,
            seed: None,
            quiet: false,
        }
    }
}

/// Reads the content of a given config file and parses it to a Config.
pub fn parse_config_from_file(filename: &str) -> anyhow::Result<Config> {
    let file_content = fs::read_to_string(filename)
        .with_context(|| format!("cannot read config file {}", filename))?;
    parse_config(&file_content).with_context(|| format!("invalid config file {}", filename))
}

pub fn parse_config(content: &str) -> anyhow::Result<Config> {
    Ok(serde_yaml::from_str(content)?)
}

/// Sets up terminal logging. Quiet mode only lets warnings through.
pub fn init_logger(quiet: bool) -> anyhow::Result<()> {
    let level = if quiet {
        log::LevelFilter::Warn
    } else {
        log::LevelFilter::Info
    };
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    simplelog::TermLogger::init(
        level,
        config,
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_typical_config_rule() -> ConfigRule {
        ConfigRule {
            number_of_decks: 6,
            shuffle_threshold: 0.25,
            payout_blackjack: 1.5,
            payout_insurance: 2.0,
            insurance_fraction: 0.5,
        }
    }

    #[test]
    fn can_convert_rule() {
        let config_rule = get_typical_config_rule();
        let converted_rule: blackjack::Rule = config_rule.try_into().unwrap();
        assert_eq!(converted_rule.number_of_decks, 6);
        assert_eq!(converted_rule.shuffle_threshold, 0.25);
        assert_eq!(converted_rule.payout_blackjack, 1.5);
    }

    #[test]
    fn should_return_error_when_converting_rule() {
        let mut config_rule = get_typical_config_rule();
        config_rule.shuffle_threshold = 0.0;
        let convert_result: Result<blackjack::Rule, blackjack::Error> = config_rule.try_into();
        assert!(convert_result.is_err());
    }

    #[test]
    fn parses_yaml_with_defaults() {
        let config = parse_config(
            r#"
rule:
  number_of_decks: 4
  shuffle_threshold: 0.5
blackjack_simulator:
  strategy: Counting
  fixed_bet: 10
  rounds: 1000
"#,
        )
        .unwrap();
        assert_eq!(config.rule.number_of_decks, 4);
        assert_eq!(config.rule.payout_blackjack, 1.5);
        assert_eq!(config.blackjack_simulator.rounds, 1000);
        assert_eq!(config.blackjack_simulator.seed, None);
        assert!(!config.blackjack_simulator.quiet);
        assert_eq!(
            config.blackjack_simulator.strategy_kind().unwrap(),
            StrategyKind::Counting
        );
    }

    #[test]
    fn unknown_strategy_is_an_error() {
        let mut config = Config::default();
        config.blackjack_simulator.strategy = String::from("Martingale");
        assert!(config.blackjack_simulator.strategy_kind().is_err());
        config.blackjack_simulator.strategy = String::from("StandOnly");
        assert_eq!(
            config.blackjack_simulator.strategy_kind().unwrap(),
            StrategyKind::StandOnly
        );
    }

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();
        let rule: Result<blackjack::Rule, _> = config.rule.try_into();
        assert!(rule.is_ok());
        assert!(config.blackjack_simulator.strategy_kind().is_ok());
    }
}
