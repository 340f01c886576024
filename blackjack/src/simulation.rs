pub mod hand;
pub mod report;
pub mod session;
pub mod shoe;

use std::collections::BTreeSet;

use blackjack_macros::allowed_phase;
use log::{debug, info, warn};
use serde::Serialize;
use strum_macros::EnumIter;

use crate::{strategy::Strategy, Decision, Error, Result, Rule};

pub use self::hand::{DealerHand, Hand, HandId};
pub use self::report::{HandReport, HandResult, RoundOutcome, RoundReport};
pub use self::session::{Session, Statistics};
pub use self::shoe::Shoe;

static RANK_TO_BASE_VALUE: [u8; 13] = [11, 2, 3, 4, 5, 6, 7, 8, 9, 10, 10, 10, 10];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Serialize)]
pub enum Suit {
    Diamond = 0,
    Club,
    Heart,
    Spade,
}

/// Represents a card in the real world with a suit and a rank.
///
/// Rank 0 is the Ace, ranks 1 to 8 are the pips 2 to 9, ranks 9 to 12 are
/// 10, J, Q and K.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Card {
    suit: Suit,
    rank: u8,
    base_value: u8,
    count_value: i8,
}

impl Card {
    pub fn new(suit: Suit, rank: u8) -> Card {
        if rank > 12 {
            panic!("Invalid card rank! It must be in [0, 12]")
        }
        let base_value = RANK_TO_BASE_VALUE[rank as usize];
        let count_value = match base_value {
            2..=6 => 1,
            10 | 11 => -1,
            _ => 0,
        };
        Card {
            suit,
            rank,
            base_value,
            count_value,
        }
    }

    pub fn suit(&self) -> Suit {
        self.suit
    }

    pub fn rank(&self) -> u8 {
        self.rank
    }

    /// Blackjack value with the Ace counted as 11.
    pub fn base_value(&self) -> u8 {
        self.base_value
    }

    /// Hi-Lo counting value.
    pub fn count_value(&self) -> i8 {
        self.count_value
    }

    pub fn is_ace(&self) -> bool {
        self.rank == 0
    }
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let suit = match self.suit {
            Suit::Diamond => 'D',
            Suit::Club => 'C',
            Suit::Heart => 'H',
            Suit::Spade => 'S',
        };
        let value = match self.rank {
            0 => 'A',
            9 => 'T',
            10 => 'J',
            11 => 'Q',
            12 => 'K',
            pip => (b'1' + pip) as char,
        };
        write!(f, "{}{}", suit, value)
    }
}

impl From<Card> for u8 {
    fn from(card: Card) -> u8 {
        card.suit as u8 * 13 + card.rank
    }
}

impl TryFrom<u8> for Card {
    type Error = ();

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        if value >= 52 {
            return Err(());
        }
        let suit = match value / 13 {
            0 => Suit::Diamond,
            1 => Suit::Club,
            2 => Suit::Heart,
            _ => Suit::Spade,
        };
        Ok(Card::new(suit, value % 13))
    }
}

/// The actions a strategy may take on `hand` right now. Hit and Stand are
/// always open, Double needs exactly two cards, Split needs a splittable pair.
pub fn legal_decisions(hand: &Hand) -> Vec<Decision> {
    let mut decisions = vec![Decision::Hit, Decision::Stand];
    if hand.len() == 2 {
        decisions.push(Decision::Double);
    }
    if hand.can_split() {
        decisions.push(Decision::Split);
    }
    decisions
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GamePhase {
    StartNewShoe,
    PlaceBets,
    DealInitialCards,
    Insurance,
    Naturals,
    Surrender,
    Play,
    DealerPlay,
    Settlement,
}

/// Simulates a Blackjack table with a single seat.
///
/// A round can be driven with `play_round`, or step by step through the
/// phase methods; each of them is only allowed in its own phase.
pub struct Table {
    rule: Rule,
    current_game_phase: GamePhase,
    shoe: Shoe,
    round: u64,
    reshuffled: bool,
    next_hand_id: u32,

    dealer_hand: DealerHand,
    insurance_bet: f64,
    insurance_delta: f64,

    // Player state of the current round
    player_hand: Option<Hand>,
    finished_hands: Vec<(Hand, Option<HandResult>)>,
    active_hands: BTreeSet<HandId>,
    early_outcome: Option<RoundOutcome>,
}

impl Table {
    pub fn new(rule: &Rule, seed: Option<u64>) -> Result<Self> {
        rule.validate()?;
        let mut shoe = Shoe::new(rule.number_of_decks, rule.shuffle_threshold, seed);
        shoe.shuffle();
        Ok(Self {
            rule: *rule,
            current_game_phase: GamePhase::StartNewShoe,
            shoe,
            round: 0,
            reshuffled: false,
            next_hand_id: 1,
            dealer_hand: DealerHand::new(),
            insurance_bet: 0.0,
            insurance_delta: 0.0,
            player_hand: None,
            finished_hands: Vec::with_capacity(2),
            active_hands: BTreeSet::new(),
            early_outcome: None,
        })
    }

    /// Plays one full round with the given strategy, reporting every step to
    /// `handler`.
    ///
    /// If a step fails, the round is abandoned: its stakes are dropped
    /// without settlement and the table goes back to `StartNewShoe`, so the
    /// next call starts a fresh round. A `WrongPhase` error leaves the table
    /// untouched.
    pub fn play_round<T, U>(&mut self, strategy: &mut T, handler: &mut U) -> Result<RoundReport>
    where
        T: Strategy + ?Sized,
        U: TableEventHandler + ?Sized,
    {
        handler.on_round_begin(&self.shoe);
        match self.run_round(strategy, handler) {
            Ok(report) => {
                handler.on_round_end(&report);
                Ok(report)
            }
            Err(err) => {
                if !matches!(err, Error::WrongPhase { .. }) {
                    warn!("round {} abandoned: {}", self.round, err);
                    self.new_round();
                    self.current_game_phase = GamePhase::StartNewShoe;
                }
                Err(err)
            }
        }
    }

    fn run_round<T, U>(&mut self, strategy: &mut T, handler: &mut U) -> Result<RoundReport>
    where
        T: Strategy + ?Sized,
        U: TableEventHandler + ?Sized,
    {
        if self.start_new_shoe_if_necessary(strategy)? {
            handler.on_shuffle(self.rule.number_of_decks);
        }

        let bet = self.place_bet(strategy)?;
        handler.on_bet(self.round, bet);

        self.deal_initial_cards(strategy)?;
        handler.on_deal(self.player_hand()?, self.dealer_up_card()?);

        let insurance_bet = self.offer_insurance(strategy)?;
        if insurance_bet > 0.0 {
            handler.on_insurance(insurance_bet);
        }

        if self.check_naturals(strategy)?.is_none() && !self.offer_surrender(strategy)? {
            self.play_hands(strategy, handler)?;
            if self.current_game_phase == GamePhase::DealerPlay {
                self.dealer_plays(strategy)?;
            }
        }

        self.settle(strategy)
    }

    /// Can be called at StartNewShoe phase.
    /// Rebuilds and shuffles the shoe if too few cards remain. Returns true if it did.
    #[allowed_phase(StartNewShoe)]
    pub fn start_new_shoe_if_necessary<T: Strategy + ?Sized>(
        &mut self,
        strategy: &mut T,
    ) -> Result<bool> {
        self.reshuffled = self.shoe.needs_reshuffle();
        if self.reshuffled {
            info!(
                "reshuffling {} deck(s) before round {} ({} cards left)",
                self.rule.number_of_decks,
                self.round + 1,
                self.shoe.remaining()
            );
            self.shoe.shuffle();
            strategy.deck_shuffled(self.rule.number_of_decks);
        }
        self.current_game_phase = GamePhase::PlaceBets;
        Ok(self.reshuffled)
    }

    /// Can be called at PlaceBets phase.
    /// Asks the strategy for its bet and opens the player's hand. Returns the bet.
    #[allowed_phase(PlaceBets)]
    pub fn place_bet<T: Strategy + ?Sized>(&mut self, strategy: &mut T) -> Result<f64> {
        strategy.start_round();
        let bet = strategy.make_bet();
        if !bet.is_finite() || bet <= 0.0 {
            return Err(Error::InvalidBet(bet));
        }

        let hand = Hand::new(self.new_hand_id(), bet);
        self.active_hands.insert(hand.id());
        self.player_hand = Some(hand);
        self.round += 1;
        self.current_game_phase = GamePhase::DealInitialCards;
        Ok(bet)
    }

    /// Can be called at DealInitialCards phase.
    /// Deals player, dealer, player, dealer. The dealer's second card stays hidden.
    #[allowed_phase(DealInitialCards)]
    pub fn deal_initial_cards<T: Strategy + ?Sized>(&mut self, strategy: &mut T) -> Result<()> {
        let player_first = self.deal_face_up(strategy)?;
        let up_card = self.deal_face_up(strategy)?;
        let player_second = self.deal_face_up(strategy)?;
        let hole_card = self.shoe.deal_card()?;

        let hand = self.player_hand_mut()?;
        hand.add_card(player_first);
        hand.add_card(player_second);
        self.dealer_hand.add_card(up_card);
        self.dealer_hand.add_card(hole_card);

        self.current_game_phase = GamePhase::Insurance;
        Ok(())
    }

    /// Can be called at Insurance phase.
    /// Offers insurance when the dealer shows an Ace. Returns the insurance stake.
    #[allowed_phase(Insurance)]
    pub fn offer_insurance<T: Strategy + ?Sized>(&mut self, strategy: &mut T) -> Result<f64> {
        let up_card = self.dealer_up_card()?;
        if up_card.is_ace() {
            let hand = self.player_hand()?;
            let stake = hand.bet() * self.rule.insurance_fraction;
            let insure = strategy.choose_insurance(hand, up_card);
            if insure {
                self.insurance_bet = stake;
            }
        }
        self.current_game_phase = GamePhase::Naturals;
        Ok(self.insurance_bet)
    }

    /// Can be called at Naturals phase.
    /// Settles insurance and ends the round if either side holds blackjack.
    /// Returns the outcome when the round ended here.
    #[allowed_phase(Naturals)]
    pub fn check_naturals<T: Strategy + ?Sized>(
        &mut self,
        strategy: &mut T,
    ) -> Result<Option<RoundOutcome>> {
        let player_blackjack = self.player_hand()?.is_blackjack();
        let dealer_blackjack = self.dealer_hand.hand().is_blackjack();

        if self.insurance_bet > 0.0 {
            self.insurance_delta = if dealer_blackjack {
                self.insurance_bet * self.rule.payout_insurance
            } else {
                -self.insurance_bet
            };
        }
        if dealer_blackjack {
            self.reveal_hole_card(strategy);
        }

        let decided = match (player_blackjack, dealer_blackjack) {
            (true, true) => Some((RoundOutcome::BothBlackjack, HandResult::Push)),
            (true, false) => Some((RoundOutcome::PlayerBlackjack, HandResult::Blackjack)),
            (false, true) => Some((RoundOutcome::DealerBlackjack, HandResult::Loss)),
            (false, false) => None,
        };

        match decided {
            Some((outcome, result)) => {
                debug!("round {} decided by naturals: {:?}", self.round, outcome);
                let hand = self.take_player_hand()?;
                self.finish_hand(hand, Some(result), strategy)?;
                self.early_outcome = Some(outcome);
                self.current_game_phase = GamePhase::Settlement;
            }
            None => self.current_game_phase = GamePhase::Surrender,
        }
        Ok(self.early_outcome)
    }

    /// Can be called at Surrender phase.
    /// Offers late surrender before any card is drawn. Returns true if the player surrendered.
    #[allowed_phase(Surrender)]
    pub fn offer_surrender<T: Strategy + ?Sized>(&mut self, strategy: &mut T) -> Result<bool> {
        let up_card = self.dealer_up_card()?;
        let surrender = strategy.choose_surrender(self.player_hand()?, up_card);
        if surrender {
            debug!("round {}: player surrenders", self.round);
            let hand = self.take_player_hand()?;
            self.finish_hand(hand, Some(HandResult::Surrender), strategy)?;
            self.early_outcome = Some(RoundOutcome::Surrendered);
            self.current_game_phase = GamePhase::Settlement;
        } else {
            self.current_game_phase = GamePhase::Play;
        }
        Ok(surrender)
    }

    /// Can be called at Play phase.
    /// Plays the player's hand, and both halves of it after a split, to completion.
    #[allowed_phase(Play)]
    pub fn play_hands<T, U>(&mut self, strategy: &mut T, handler: &mut U) -> Result<()>
    where
        T: Strategy + ?Sized,
        U: TableEventHandler + ?Sized,
    {
        let hand = self.take_player_hand()?;
        self.resolve_hand(hand, strategy, handler)?;

        let all_busted = self.finished_hands.iter().all(|(hand, _)| hand.is_bust());
        self.current_game_phase = if all_busted {
            GamePhase::Settlement
        } else {
            GamePhase::DealerPlay
        };
        Ok(())
    }

    /// Can be called at DealerPlay phase.
    /// Reveals the hole card and draws until 17 or more. Returns the dealer's total.
    #[allowed_phase(DealerPlay)]
    pub fn dealer_plays<T: Strategy + ?Sized>(&mut self, strategy: &mut T) -> Result<u8> {
        self.reveal_hole_card(strategy);
        while self.dealer_hand.must_draw() {
            let card = self.deal_face_up(strategy)?;
            self.dealer_hand.add_card(card);
        }
        debug!("dealer stands with {}", self.dealer_hand.hand());
        self.current_game_phase = GamePhase::Settlement;
        Ok(self.dealer_hand.hand().total())
    }

    /// Can be called at Settlement phase.
    /// Pays out every hand and closes the round.
    #[allowed_phase(Settlement)]
    pub fn settle<T: Strategy + ?Sized>(&mut self, strategy: &mut T) -> Result<RoundReport> {
        self.reveal_hole_card(strategy);
        if !self.active_hands.is_empty() {
            return Err(Error::Invariant(format!(
                "hands {:?} are still active at settlement",
                self.active_hands
            )));
        }

        let dealer = self.dealer_hand.hand();
        let dealer_total = dealer.total();
        let dealer_bust = dealer.is_bust();
        let payout_blackjack = self.rule.payout_blackjack;

        let hands: Vec<HandReport> = self
            .finished_hands
            .drain(..)
            .map(|(hand, decided)| {
                let result = decided.unwrap_or_else(|| {
                    if hand.is_bust() {
                        HandResult::Bust
                    } else if dealer_bust {
                        HandResult::Win
                    } else {
                        match hand.total().cmp(&dealer_total) {
                            std::cmp::Ordering::Greater => HandResult::Win,
                            std::cmp::Ordering::Less => HandResult::Loss,
                            std::cmp::Ordering::Equal => HandResult::Push,
                        }
                    }
                });
                HandReport {
                    id: hand.id(),
                    cards: hand.cards().to_vec(),
                    total: hand.total(),
                    bet: hand.bet(),
                    delta: hand.bet() * result.multiplier(payout_blackjack),
                    result,
                }
            })
            .collect();
        if hands.is_empty() {
            return Err(Error::Invariant(String::from(
                "round settled without any player hand",
            )));
        }

        let outcome = self.early_outcome.unwrap_or_else(|| {
            if hands.iter().all(|hand| hand.result == HandResult::Bust) {
                RoundOutcome::AllBusted
            } else if dealer_bust {
                RoundOutcome::DealerBust
            } else {
                RoundOutcome::Compared
            }
        });

        let delta = hands.iter().map(|hand| hand.delta).sum::<f64>() + self.insurance_delta;
        if !delta.is_finite() {
            return Err(Error::InvalidMoney(delta));
        }

        let report = RoundReport {
            round: self.round,
            reshuffled: self.reshuffled,
            outcome,
            hands,
            dealer_cards: self.dealer_hand.hand().cards().to_vec(),
            dealer_total,
            insurance_bet: self.insurance_bet,
            insurance_delta: self.insurance_delta,
            delta,
        };
        debug!(
            "round {} settled: {:?}, delta {}",
            report.round, report.outcome, report.delta
        );
        strategy.end_round(report.result());

        self.new_round();
        self.current_game_phase = GamePhase::StartNewShoe;
        Ok(report)
    }

    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    pub fn phase(&self) -> GamePhase {
        self.current_game_phase
    }

    pub fn round(&self) -> u64 {
        self.round
    }

    pub fn shoe(&self) -> &Shoe {
        &self.shoe
    }

    pub fn shoe_mut(&mut self) -> &mut Shoe {
        &mut self.shoe
    }

    pub fn dealer_hand(&self) -> &DealerHand {
        &self.dealer_hand
    }

    pub fn dealer_up_card(&self) -> Result<Card> {
        self.dealer_hand
            .up_card()
            .ok_or_else(|| Error::Invariant(String::from("dealer has no up card")))
    }

    /// The player's hand before it is played.
    pub fn player_hand(&self) -> Result<&Hand> {
        self.player_hand
            .as_ref()
            .ok_or_else(|| Error::Invariant(String::from("no player hand in this phase")))
    }

    fn player_hand_mut(&mut self) -> Result<&mut Hand> {
        self.player_hand
            .as_mut()
            .ok_or_else(|| Error::Invariant(String::from("no player hand in this phase")))
    }

    fn take_player_hand(&mut self) -> Result<Hand> {
        self.player_hand
            .take()
            .ok_or_else(|| Error::Invariant(String::from("no player hand in this phase")))
    }

    fn resolve_hand<T, U>(&mut self, mut hand: Hand, strategy: &mut T, handler: &mut U) -> Result<()>
    where
        T: Strategy + ?Sized,
        U: TableEventHandler + ?Sized,
    {
        let up_card = self.dealer_up_card()?;
        // A hand at 21 stands by itself; a hand above 21 is bust.
        while hand.total() < 21 {
            let decision = strategy.choice(&hand, up_card);
            if !legal_decisions(&hand).contains(&decision) {
                return Err(Error::IllegalDecision {
                    hand: hand.id(),
                    decision,
                });
            }
            debug!("hand {:?} {} vs {}: {}", hand.id(), hand, up_card, decision);
            handler.on_decision(&hand, decision);

            match decision {
                Decision::Stand => break,
                Decision::Hit => {
                    let card = self.deal_face_up(strategy)?;
                    hand.add_card(card);
                }
                Decision::Double => {
                    hand.double_bet();
                    let card = self.deal_face_up(strategy)?;
                    hand.add_card(card);
                    break;
                }
                Decision::Split => return self.split_and_resolve(hand, strategy, handler),
            }
        }

        if hand.is_bust() {
            debug!("hand {:?} busts with {}", hand.id(), hand);
            handler.on_bust(&hand);
        }
        self.finish_hand(hand, None, strategy)
    }

    fn split_and_resolve<T, U>(&mut self, hand: Hand, strategy: &mut T, handler: &mut U) -> Result<()>
    where
        T: Strategy + ?Sized,
        U: TableEventHandler + ?Sized,
    {
        let parent = hand.id();
        strategy.split_hand(&hand);
        let first_id = self.new_hand_id();
        let second_id = self.new_hand_id();
        let (mut first, mut second) = hand.split(first_id, second_id)?;

        if !self.active_hands.remove(&parent) {
            return Err(Error::Invariant(format!("split hand {:?} was not active", parent)));
        }
        self.active_hands.insert(first_id);
        self.active_hands.insert(second_id);

        first.add_card(self.deal_face_up(strategy)?);
        second.add_card(self.deal_face_up(strategy)?);
        handler.on_split(&first, &second);

        self.resolve_hand(first, strategy, handler)?;
        self.resolve_hand(second, strategy, handler)
    }

    fn finish_hand<T: Strategy + ?Sized>(
        &mut self,
        hand: Hand,
        result: Option<HandResult>,
        strategy: &mut T,
    ) -> Result<()> {
        if !self.active_hands.remove(&hand.id()) {
            return Err(Error::Invariant(format!(
                "hand {:?} finished but was not active",
                hand.id()
            )));
        }
        strategy.end_hand(&hand);
        self.finished_hands.push((hand, result));
        Ok(())
    }

    fn deal_face_up<T: Strategy + ?Sized>(&mut self, strategy: &mut T) -> Result<Card> {
        let card = self.shoe.deal_card()?;
        strategy.view_card(card);
        Ok(card)
    }

    fn reveal_hole_card<T: Strategy + ?Sized>(&mut self, strategy: &mut T) {
        if let Some(card) = self.dealer_hand.reveal_hole_card() {
            debug!("dealer reveals {}", card);
            strategy.view_card(card);
        }
    }

    fn new_hand_id(&mut self) -> HandId {
        let id = HandId(self.next_hand_id);
        self.next_hand_id += 1;
        id
    }

    fn new_round(&mut self) {
        self.dealer_hand.clear();
        self.insurance_bet = 0.0;
        self.insurance_delta = 0.0;
        self.player_hand = None;
        self.finished_hands.clear();
        self.active_hands.clear();
        self.early_outcome = None;
        self.next_hand_id = 1;
    }
}

/// Receives the structured events of a round, e.g. to render them.
pub trait TableEventHandler {
    /// Called before the reshuffle check, with the shoe as the last round left it.
    fn on_round_begin(&mut self, _shoe: &Shoe) {}
    fn on_shuffle(&mut self, _number_of_decks: u8) {}
    fn on_bet(&mut self, _round: u64, _bet: f64) {}
    fn on_deal(&mut self, _player_hand: &Hand, _dealer_up_card: Card) {}
    fn on_insurance(&mut self, _insurance_bet: f64) {}
    fn on_decision(&mut self, _hand: &Hand, _decision: Decision) {}
    fn on_split(&mut self, _first: &Hand, _second: &Hand) {}
    fn on_bust(&mut self, _hand: &Hand) {}
    fn on_round_end(&mut self, _report: &RoundReport) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHandler;

impl TableEventHandler for NoopHandler {}
