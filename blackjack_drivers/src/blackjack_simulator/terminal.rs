use blackjack::strategy::{Actor, Request};
use dialoguer::Input;
use log::error;

/// Answers the interactive strategy from stdin.
///
/// Closing stdin (or any other terminal read failure) ends the process with
/// exit code 1 right away, without the session summary: the strategy cannot
/// settle a round it never got an answer for.
#[derive(Debug, Default)]
pub struct TerminalActor;

fn prompt_for(request: &Request<'_>) -> String {
    match request {
        Request::Bet => String::from("Bet"),
        Request::Insurance {
            hand,
            dealer_up_card,
        } => format!(
            "You hold {} against {}. Insurance? (y/n)",
            hand, dealer_up_card
        ),
        Request::Surrender {
            hand,
            dealer_up_card,
        } => format!(
            "You hold {} against {}. Surrender? (y/n)",
            hand, dealer_up_card
        ),
        Request::Action {
            hand,
            dealer_up_card,
            legal,
        } => {
            let options = legal
                .iter()
                .map(|decision| format!("{}: {}", *decision as u8, decision))
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                "You hold {} against {}. {}",
                hand, dealer_up_card, options
            )
        }
    }
}

impl Actor for TerminalActor {
    fn respond(&mut self, request: &Request<'_>) -> String {
        match Input::<String>::new()
            .with_prompt(prompt_for(request))
            .interact_text()
        {
            Ok(response) => response,
            Err(err) => {
                error!("cannot read from the terminal: {}", err);
                std::process::exit(1);
            }
        }
    }

    fn reject(&mut self, _: &Request<'_>, reason: &str) {
        println!("{}, try again.", reason);
    }
}
