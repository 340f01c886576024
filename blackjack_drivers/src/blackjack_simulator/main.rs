mod simulation;
mod terminal;

use anyhow::{bail, Context};
use blackjack::simulation::HandResult;
use blackjack::strategy::{
    BasicStrategy, CountingStrategy, InteractiveStrategy, StandOnlyStrategy, Strategy,
};
use blackjack::StrategyKind;
use blackjack_drivers::{init_logger, parse_config_from_file, Config, ConfigBlackjackSimulator};
use clap::Parser;
use log::info;

const DEFAULT_CONFIG_PATH: &str = "~/.blackjack.yml";

#[derive(Debug, Parser)]
#[command(author, about, long_about = None)]
struct CommandLineArgs {
    /// The path of the config file. Built-in defaults are used when the
    /// default file does not exist.
    #[arg(short, long, default_value_t = String::from(DEFAULT_CONFIG_PATH))]
    config: String,

    /// Number of rounds to play
    #[arg(short, long)]
    rounds: Option<u64>,

    /// StandOnly, BasicRules, Counting or Interactive
    #[arg(short, long)]
    strategy: Option<String>,

    /// Seed for the shoe's shuffles
    #[arg(long)]
    seed: Option<u64>,

    /// Only print the final summary
    #[arg(short, long)]
    quiet: bool,
}

fn load_config(args: &CommandLineArgs) -> anyhow::Result<Config> {
    let mut config = if args.config == DEFAULT_CONFIG_PATH {
        let home_dir = home::home_dir().context("cannot find home directory")?;
        let config_file_path = home_dir.join(".blackjack.yml");
        if config_file_path.is_dir() {
            bail!("{} should be a file rather than a directory", config_file_path.display());
        }
        if config_file_path.exists() {
            let path = config_file_path
                .to_str()
                .context("config path is not valid UTF-8")?;
            parse_config_from_file(path)?
        } else {
            Config::default()
        }
    } else {
        parse_config_from_file(&args.config)?
    };

    let simulator_config = &mut config.blackjack_simulator;
    if let Some(rounds) = args.rounds {
        simulator_config.rounds = rounds;
    }
    if let Some(strategy) = &args.strategy {
        simulator_config.strategy = strategy.clone();
    }
    if args.seed.is_some() {
        simulator_config.seed = args.seed;
    }
    simulator_config.quiet |= args.quiet;
    Ok(config)
}

fn build_strategy(
    kind: StrategyKind,
    rule: &blackjack::Rule,
    simulator_config: &ConfigBlackjackSimulator,
) -> anyhow::Result<Box<dyn Strategy>> {
    let fixed_bet = simulator_config.fixed_bet;
    if matches!(kind, StrategyKind::StandOnly | StrategyKind::BasicRules)
        && !(fixed_bet.is_finite() && fixed_bet > 0.0)
    {
        bail!("fixed_bet must be a positive amount, got {}", fixed_bet);
    }
    Ok(match kind {
        StrategyKind::StandOnly => Box::new(StandOnlyStrategy::new(fixed_bet)),
        StrategyKind::BasicRules => Box::new(BasicStrategy::new(fixed_bet)),
        StrategyKind::Counting => Box::new(CountingStrategy::new(rule.number_of_decks)),
        StrategyKind::Interactive => Box::new(InteractiveStrategy::new(terminal::TerminalActor)),
    })
}

fn main() -> anyhow::Result<()> {
    let args = CommandLineArgs::parse();
    let config = load_config(&args)?;
    let simulator_config = config.blackjack_simulator;
    init_logger(simulator_config.quiet)?;

    let rule: blackjack::Rule = config.rule.try_into().context("invalid rule")?;
    let kind = simulator_config
        .strategy_kind()
        .with_context(|| format!("unknown strategy {}", simulator_config.strategy))?;
    let strategy = build_strategy(kind, &rule, &simulator_config)?;
    info!(
        "playing {} rounds with {:?} on {} deck(s)",
        simulator_config.rounds, kind, rule.number_of_decks
    );

    let stat = simulation::simulate(&rule, &simulator_config, strategy)?;
    println!(
        "Rounds: {}. Won: {}. Lost: {}. Drawn: {}.",
        stat.get_rounds(),
        stat.get_wins(),
        stat.get_losses(),
        stat.get_draws()
    );
    println!(
        "Bankroll: {:.2} ({:+.2}). Total bet: {:.2}. Rate: {:.2}%. Min bankroll: {:.2}.",
        stat.get_bankroll(),
        stat.get_profit(),
        stat.get_total_bet(),
        stat.get_rate() * 100.0,
        stat.get_min_bankroll()
    );
    println!(
        "Hands: {} blackjack, {} won, {} pushed, {} lost, {} bust, {} surrendered.",
        stat.get_hand_results(HandResult::Blackjack),
        stat.get_hand_results(HandResult::Win),
        stat.get_hand_results(HandResult::Push),
        stat.get_hand_results(HandResult::Loss),
        stat.get_hand_results(HandResult::Bust),
        stat.get_hand_results(HandResult::Surrender)
    );
    Ok(())
}
