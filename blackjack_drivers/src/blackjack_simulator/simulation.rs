use blackjack::simulation::{
    Card, Hand, HandId, RoundReport, Session, Shoe, Statistics, TableEventHandler,
};
use blackjack::strategy::Strategy;
use blackjack::Decision;
use blackjack_drivers::ConfigBlackjackSimulator;

/// Prints each round as it is played.
#[derive(Debug, Clone, Default)]
pub struct Handler {
    verbose: bool,
    bankroll: f64,
    cards_in_shoe_before_round: usize,
    top_cards_before_round: Vec<Card>,
    decisions: Vec<(HandId, Vec<String>)>,
}

impl Handler {
    pub fn new(verbose: bool, bankroll: f64) -> Self {
        Handler {
            verbose,
            bankroll,
            ..Default::default()
        }
    }

    fn decisions_of(&mut self, hand: HandId) -> &mut Vec<String> {
        let index = match self.decisions.iter().position(|(id, _)| *id == hand) {
            Some(index) => index,
            None => {
                self.decisions.push((hand, Vec::new()));
                self.decisions.len() - 1
            }
        };
        &mut self.decisions[index].1
    }
}

fn cards_to_string(cards: &[Card]) -> String {
    cards
        .iter()
        .map(|card| card.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

impl TableEventHandler for Handler {
    fn on_shuffle(&mut self, number_of_decks: u8) {
        if self.verbose {
            println!("Shuffling a new shoe of {} deck(s)", number_of_decks);
        }
    }

    fn on_round_begin(&mut self, shoe: &Shoe) {
        self.cards_in_shoe_before_round = shoe.remaining();
        self.top_cards_before_round = shoe.preview_next_few_cards(10).to_vec();
        self.decisions.clear();
    }

    fn on_deal(&mut self, player_hand: &Hand, dealer_up_card: Card) {
        if self.verbose {
            println!("Player {} / dealer shows {}", player_hand, dealer_up_card);
        }
    }

    fn on_decision(&mut self, hand: &Hand, decision: Decision) {
        let label = match decision {
            Decision::Double => String::from("~~DOUBLE~~"),
            _ => decision.to_string(),
        };
        self.decisions_of(hand.id()).push(label);
    }

    fn on_split(&mut self, first: &Hand, second: &Hand) {
        self.decisions_of(first.id());
        self.decisions_of(second.id());
    }

    fn on_bust(&mut self, hand: &Hand) {
        self.decisions_of(hand.id()).push(String::from("BUST"));
    }

    fn on_round_end(&mut self, report: &RoundReport) {
        self.bankroll += report.delta;
        if !self.verbose {
            return;
        }

        println!("Round #{}", report.round);
        if report.reshuffled {
            println!("(fresh shoe)");
        } else {
            println!(
                "Top {} (of {}) cards: {}",
                self.top_cards_before_round.len(),
                self.cards_in_shoe_before_round,
                cards_to_string(&self.top_cards_before_round)
            );
        }
        for (id, decisions) in &self.decisions {
            println!("Decisions for hand {}: {}", id.0, decisions.join(" "));
        }
        println!(
            "Dealer: {} ({})",
            cards_to_string(&report.dealer_cards),
            report.dealer_total
        );
        for hand in &report.hands {
            println!(
                "Hand {}: {} ({}) bet {:.2} {:?} {:+.2}",
                hand.id.0,
                cards_to_string(&hand.cards),
                hand.total,
                hand.bet,
                hand.result,
                hand.delta
            );
        }
        if report.insurance_bet > 0.0 {
            println!(
                "Insurance {:.2}: {:+.2}",
                report.insurance_bet, report.insurance_delta
            );
        }
        println!(
            "{:?}. Round {:+.2}, bankroll {:.2}",
            report.outcome, report.delta, self.bankroll
        );
        println!("----------------------------------------------------");
    }
}

pub fn simulate(
    rule: &blackjack::Rule,
    simulator_config: &ConfigBlackjackSimulator,
    strategy: Box<dyn Strategy>,
) -> blackjack::Result<Statistics> {
    let mut handler = Handler::new(!simulator_config.quiet, simulator_config.starting_bankroll);
    let mut session = Session::new(
        rule,
        strategy,
        simulator_config.starting_bankroll,
        simulator_config.seed,
    )?;
    let stat = *session.run(simulator_config.rounds, &mut handler)?;
    Ok(stat)
}

#[cfg(test)]
mod tests {
    use super::*;
    use blackjack::simulation::{NoopHandler, Table};
    use blackjack::strategy::{BasicStrategy, StandOnlyStrategy};

    #[test]
    fn handler_keeps_running_bankroll() {
        let config = ConfigBlackjackSimulator {
            rounds: 30,
            starting_bankroll: 200.0,
            seed: Some(4),
            quiet: true,
            ..Default::default()
        };
        let rule = blackjack::Rule::default();
        let stat = simulate(&rule, &config, Box::new(StandOnlyStrategy::new(10.0))).unwrap();
        assert_eq!(stat.get_rounds(), 30);

        let mut handler = Handler::new(false, 200.0);
        let mut session =
            Session::new(&rule, Box::new(StandOnlyStrategy::new(10.0)), 200.0, Some(4)).unwrap();
        session.run(30, &mut handler).unwrap();
        assert_eq!(handler.bankroll, stat.get_bankroll());
    }

    #[test]
    fn reports_and_statistics_serialize_to_yaml() {
        let rule = blackjack::Rule::default();
        let mut table = Table::new(&rule, Some(12)).unwrap();
        let mut strategy = BasicStrategy::new(10.0);
        let report = table.play_round(&mut strategy, &mut NoopHandler).unwrap();

        let yaml = serde_yaml::to_string(&report).unwrap();
        assert!(yaml.contains("round: 1"));
        assert!(yaml.contains(&format!("outcome: {:?}", report.outcome)));
        assert!(yaml.contains(&format!("dealer_total: {}", report.dealer_total)));
        assert!(yaml.contains("hands:"));
        assert!(yaml.contains("suit:"));

        let mut stat = Statistics::with_bankroll(50.0);
        stat.record(&report).unwrap();
        let yaml = serde_yaml::to_string(&stat).unwrap();
        assert!(yaml.contains("rounds: 1"));
        assert!(yaml.contains("starting_bankroll: 50.0"));

        let yaml = serde_yaml::to_string(&table.phase()).unwrap();
        assert_eq!(yaml.trim(), "StartNewShoe");
    }
}
