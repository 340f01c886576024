use log::info;
use serde::Serialize;

use super::{HandResult, RoundReport, Table, TableEventHandler};
use crate::{strategy::Strategy, Error, Result, Rule};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Statistics {
    starting_bankroll: f64,
    bankroll: f64,
    min_bankroll: f64,
    total_bet: f64,

    rounds: u64,
    wins: u64,
    losses: u64,
    draws: u64,

    hand_results: [u64; 6],
}

impl Statistics {
    pub fn with_bankroll(bankroll: f64) -> Self {
        Statistics {
            starting_bankroll: bankroll,
            bankroll,
            min_bankroll: bankroll,
            ..Default::default()
        }
    }

    pub fn record(&mut self, report: &RoundReport) -> Result<()> {
        if !report.delta.is_finite() {
            return Err(Error::InvalidMoney(report.delta));
        }
        self.total_bet += report.total_bet();
        self.bankroll += report.delta;
        if self.min_bankroll > self.bankroll {
            self.min_bankroll = self.bankroll;
        }

        self.rounds += 1;
        match report.result() {
            1 => self.wins += 1,
            -1 => self.losses += 1,
            _ => self.draws += 1,
        }
        for hand in &report.hands {
            self.hand_results[hand.result as usize] += 1;
        }
        Ok(())
    }

    pub fn get_bankroll(&self) -> f64 {
        self.bankroll
    }

    pub fn get_profit(&self) -> f64 {
        self.bankroll - self.starting_bankroll
    }

    pub fn get_min_bankroll(&self) -> f64 {
        self.min_bankroll
    }

    pub fn get_total_bet(&self) -> f64 {
        self.total_bet
    }

    /// Profit per unit wagered.
    pub fn get_rate(&self) -> f64 {
        if self.total_bet == 0.0 {
            0.0
        } else {
            self.get_profit() / self.total_bet
        }
    }

    pub fn get_rounds(&self) -> u64 {
        self.rounds
    }

    pub fn get_wins(&self) -> u64 {
        self.wins
    }

    pub fn get_losses(&self) -> u64 {
        self.losses
    }

    pub fn get_draws(&self) -> u64 {
        self.draws
    }

    /// Number of settled hands, split halves counted separately, that ended with `result`.
    pub fn get_hand_results(&self, result: HandResult) -> u64 {
        self.hand_results[result as usize]
    }
}

/// Plays rounds one after another against one shoe with one strategy.
pub struct Session {
    table: Table,
    strategy: Box<dyn Strategy>,
    statistics: Statistics,
}

impl Session {
    pub fn new(
        rule: &Rule,
        strategy: Box<dyn Strategy>,
        starting_bankroll: f64,
        seed: Option<u64>,
    ) -> Result<Self> {
        let table = Table::new(rule, seed)?;
        Ok(Self::with_table(table, strategy, starting_bankroll))
    }

    pub fn with_table(table: Table, strategy: Box<dyn Strategy>, starting_bankroll: f64) -> Self {
        Session {
            table,
            strategy,
            statistics: Statistics::with_bankroll(starting_bankroll),
        }
    }

    pub fn play_round<U: TableEventHandler + ?Sized>(
        &mut self,
        handler: &mut U,
    ) -> Result<RoundReport> {
        let report = self.table.play_round(self.strategy.as_mut(), handler)?;
        self.statistics.record(&report)?;
        Ok(report)
    }

    pub fn run<U: TableEventHandler + ?Sized>(
        &mut self,
        rounds: u64,
        handler: &mut U,
    ) -> Result<&Statistics> {
        for _ in 0..rounds {
            self.play_round(handler)?;
        }
        let stat = &self.statistics;
        info!(
            "{} rounds: {} won, {} lost, {} drawn, bankroll {:.2} (min {:.2}), rate {:.2}%",
            stat.get_rounds(),
            stat.get_wins(),
            stat.get_losses(),
            stat.get_draws(),
            stat.get_bankroll(),
            stat.get_min_bankroll(),
            stat.get_rate() * 100.0,
        );
        Ok(&self.statistics)
    }

    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut Table {
        &mut self.table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::{HandId, HandReport, NoopHandler, RoundOutcome};
    use crate::strategy::StandOnlyStrategy;

    fn report(delta: f64, bet: f64) -> RoundReport {
        RoundReport {
            round: 1,
            reshuffled: false,
            outcome: RoundOutcome::Compared,
            hands: vec![HandReport {
                id: HandId(1),
                cards: Vec::new(),
                total: 18,
                bet,
                result: HandResult::Win,
                delta,
            }],
            dealer_cards: Vec::new(),
            dealer_total: 17,
            insurance_bet: 0.0,
            insurance_delta: 0.0,
            delta,
        }
    }

    #[test]
    fn statistics_track_bankroll_and_results() {
        let mut stat = Statistics::with_bankroll(100.0);
        stat.record(&report(10.0, 10.0)).unwrap();
        stat.record(&report(-20.0, 20.0)).unwrap();
        stat.record(&report(0.0, 10.0)).unwrap();
        assert_eq!(stat.get_bankroll(), 90.0);
        assert_eq!(stat.get_profit(), -10.0);
        assert_eq!(stat.get_min_bankroll(), 90.0);
        assert_eq!(stat.get_total_bet(), 40.0);
        assert_eq!(stat.get_rate(), -0.25);
        assert_eq!(
            (stat.get_wins(), stat.get_losses(), stat.get_draws()),
            (1, 1, 1)
        );
        assert_eq!(stat.get_rounds(), 3);
        assert_eq!(stat.get_hand_results(HandResult::Win), 3);
        assert_eq!(stat.get_hand_results(HandResult::Bust), 0);
    }

    #[test]
    fn non_finite_delta_is_rejected() {
        let mut stat = Statistics::default();
        assert!(matches!(
            stat.record(&report(f64::NAN, 10.0)),
            Err(Error::InvalidMoney(_))
        ));
        assert_eq!(stat.get_rounds(), 0);
    }

    #[test]
    fn session_counts_every_round() {
        let rule = Rule {
            number_of_decks: 1,
            shuffle_threshold: 0.5,
            ..Default::default()
        };
        let mut session =
            Session::new(&rule, Box::new(StandOnlyStrategy::new(10.0)), 1000.0, Some(5)).unwrap();
        let stat = *session.run(50, &mut NoopHandler).unwrap();
        assert_eq!(stat.get_rounds(), 50);
        assert_eq!(stat.get_wins() + stat.get_losses() + stat.get_draws(), 50);
        assert!(stat.get_min_bankroll() <= stat.get_bankroll());
        assert_eq!(session.table().round(), 50);
    }

    #[test]
    fn zero_rounds_is_a_no_op() {
        let mut session = Session::new(
            &Rule::default(),
            Box::new(StandOnlyStrategy::new(10.0)),
            0.0,
            Some(5),
        )
        .unwrap();
        let stat = session.run(0, &mut NoopHandler).unwrap();
        assert_eq!(stat.get_rounds(), 0);
        assert_eq!(stat.get_bankroll(), 0.0);
    }
}
