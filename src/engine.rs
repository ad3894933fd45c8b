//! The hand state machine.
//!
//! A [`BettingEngine`] owns the seats, the deck and the board. Each hand runs
//! `new_hand` followed by one `apply_action` per decision until the stage
//! reaches [`Stage::Complete`]; streets are dealt and pots settled
//! automatically as betting rounds close.

use std::collections::BTreeMap;
use std::fmt;

use log::{debug, info};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::action::{Action, ActionKind, ActionRecord};
use crate::cards::{Card, Deck, HoleCards};
use crate::config::TableConfig;
use crate::error::{ActionRule, HoldemError, HoldemResult};
use crate::hand_evaluator::{HandEvaluator, StandardEvaluator};
use crate::history::{HandRecord, TableSnapshot};
use crate::seat::Seat;
use crate::showdown::{apply_awards, distribute, PotAward};
use crate::side_pots::build_pot_layers;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Preflop,
    Flop,
    Turn,
    River,
    Complete,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Preflop => "preflop",
            Stage::Flop => "flop",
            Stage::Turn => "turn",
            Stage::River => "river",
            Stage::Complete => "complete",
        };
        write!(f, "{}", name)
    }
}

pub struct BettingEngine<E: HandEvaluator = StandardEvaluator> {
    config: TableConfig,
    evaluator: E,
    rng: ChaCha8Rng,
    deck: Deck,
    seats: Vec<Seat>,
    stage: Stage,
    board: Vec<Card>,
    pot: u32,
    current_bet: u32,
    turn: Option<usize>,
    last_aggressor: usize,
    button: Option<usize>,
    small_blind_seat: usize,
    big_blind_seat: usize,
    total_chips: u64,
    record: Option<HandRecord>,
    last_settlement: Option<HandRecord>,
    hands_played: u64,
}

impl BettingEngine<StandardEvaluator> {
    pub fn standard(config: TableConfig) -> HoldemResult<Self> {
        BettingEngine::new(config, StandardEvaluator)
    }
}

impl<E: HandEvaluator> BettingEngine<E> {
    pub fn new(config: TableConfig, evaluator: E) -> HoldemResult<Self> {
        config.validate()?;
        let seed = config.seed.unwrap_or_else(rand::random);
        let seats: Vec<Seat> = config.initial_stacks().into_iter().map(Seat::new).collect();
        let total_chips = seats.iter().map(|s| u64::from(s.stack)).sum();
        Ok(Self {
            config,
            evaluator,
            rng: ChaCha8Rng::seed_from_u64(seed),
            deck: Deck::new(),
            seats,
            stage: Stage::Complete,
            board: Vec::new(),
            pot: 0,
            current_bet: 0,
            turn: None,
            last_aggressor: 0,
            button: None,
            small_blind_seat: 0,
            big_blind_seat: 0,
            total_chips,
            record: None,
            last_settlement: None,
            hands_played: 0,
        })
    }

    /// Starts the next hand: moves the button, posts blinds and deals hole
    /// cards. Returns the dealt cards keyed by seat.
    ///
    /// Seats with no chips sit the hand out. If the blinds leave nobody able
    /// to bet, the board is run out and the hand is settled before returning.
    pub fn new_hand(&mut self) -> HoldemResult<BTreeMap<usize, HoleCards>> {
        if self.stage != Stage::Complete {
            return Err(HoldemError::HandInProgress);
        }
        if self.seats.iter().filter(|s| s.stack > 0).count() < 2 {
            return Err(HoldemError::NotEnoughPlayers);
        }

        let button = match self.button {
            None => self.next_funded(self.seats.len() - 1),
            Some(b) => self.next_funded(b),
        };
        let small_blind = self.next_funded(button);
        let big_blind = self.next_funded(small_blind);
        self.button = Some(button);
        self.small_blind_seat = small_blind;
        self.big_blind_seat = big_blind;

        let starting_stacks: Vec<u32> = self.seats.iter().map(|s| s.stack).collect();
        for seat in &mut self.seats {
            seat.reset_for_hand();
        }
        self.board.clear();
        self.pot = 0;
        self.current_bet = 0;
        self.stage = Stage::Preflop;
        self.record = Some(HandRecord::open(
            self.hands_played + 1,
            button,
            small_blind,
            big_blind,
            starting_stacks,
        ));
        info!(
            "hand #{}: button {}, blinds {}/{} from seats {}/{}",
            self.hands_played + 1,
            button,
            self.config.small_blind,
            self.config.big_blind,
            small_blind,
            big_blind
        );

        self.post_blind(small_blind, self.config.small_blind);
        self.post_blind(big_blind, self.config.big_blind);
        self.current_bet = self.config.big_blind;
        self.last_aggressor = big_blind;

        self.deck = Deck::new();
        self.deck.shuffle(&mut self.rng);
        let mut dealt = BTreeMap::new();
        for index in 0..self.seats.len() {
            if self.seats[index].folded {
                continue;
            }
            let cards = self.deck.draw(2)?;
            let hole = [cards[0], cards[1]];
            self.seats[index].hole_cards = Some(hole);
            dealt.insert(index, hole);
        }
        if let Some(record) = self.record.as_mut() {
            record.hole_cards = dealt.clone();
        }

        self.advance(big_blind)?;
        Ok(dealt)
    }

    /// Applies `action` for the seat whose turn it is.
    ///
    /// The action is checked against the betting rules before anything
    /// changes, so a rejected action leaves the table untouched.
    pub fn apply_action(&mut self, action: Action) -> HoldemResult<()> {
        let index = match (self.stage, self.turn) {
            (Stage::Complete, _) | (_, None) => {
                return Err(HoldemError::InvalidAction(ActionRule::HandNotInProgress))
            }
            (_, Some(index)) => index,
        };
        let owed = self.check_action(index, action)?;

        let seat = &mut self.seats[index];
        let moved = match action {
            Action::Fold => {
                seat.folded = true;
                0
            }
            Action::Check => 0,
            Action::Call => seat.commit(owed),
            Action::Bet(amount) => seat.commit(amount),
            Action::Raise(amount) => seat.commit(owed.saturating_add(amount)),
        };
        seat.acted = true;
        let street_bet = seat.street_bet;
        self.pot += moved;

        // only a real increase reopens the betting
        if street_bet > self.current_bet {
            self.current_bet = street_bet;
            self.last_aggressor = index;
            for (other, seat) in self.seats.iter_mut().enumerate() {
                if other != index {
                    seat.acted = false;
                }
            }
        }

        debug!(
            "{} seat {}: {} ({} chips, pot {}, bet {})",
            self.stage, index, action, moved, self.pot, self.current_bet
        );
        self.log_action(index, action.kind(), moved);
        debug_assert_eq!(self.pot, self.committed_total());

        self.advance(index)
    }

    /// Validates `action` for `index` and returns the chips it owes.
    fn check_action(&self, index: usize, action: Action) -> HoldemResult<u32> {
        let seat = &self.seats[index];
        if seat.folded {
            return Err(HoldemError::InvalidAction(ActionRule::SeatFolded));
        }
        if seat.all_in {
            return Err(HoldemError::InvalidAction(ActionRule::SeatAllIn));
        }
        let owed = seat.to_call(self.current_bet);
        match action {
            Action::Check if owed > 0 => Err(HoldemError::InvalidAction(ActionRule::CheckFacingBet)),
            Action::Bet(_) if owed > 0 => Err(HoldemError::InvalidAction(ActionRule::BetFacingBet)),
            Action::Bet(0) | Action::Raise(0) => {
                Err(HoldemError::InvalidAction(ActionRule::NonPositiveAmount))
            }
            Action::Raise(_) if owed == 0 => {
                Err(HoldemError::InvalidAction(ActionRule::RaiseWithoutBet))
            }
            _ => Ok(owed),
        }
    }

    fn post_blind(&mut self, index: usize, amount: u32) {
        let posted = self.seats[index].commit(amount);
        self.pot += posted;
        self.log_action(index, ActionKind::Blind, posted);
    }

    fn log_action(&mut self, seat: usize, kind: ActionKind, amount: u32) {
        if let Some(record) = self.record.as_mut() {
            record.actions.push(ActionRecord {
                seat,
                stage: self.stage,
                kind,
                amount,
            });
        }
    }

    /// Moves play forward after `from` acted: awards an uncontested pot,
    /// passes the turn, or closes the street.
    fn advance(&mut self, from: usize) -> HoldemResult<()> {
        if self.seats.iter().filter(|s| s.in_hand()).count() == 1 {
            return self.award_uncontested();
        }
        if !self.round_closed() {
            if let Some(next) = self.next_to_act(from) {
                self.turn = Some(next);
                return Ok(());
            }
        }
        self.close_street()
    }

    /// Nobody who can still act owes chips, and either at most one seat can
    /// act or every such seat has acted since the last raise.
    fn round_closed(&self) -> bool {
        let actors: Vec<&Seat> = self.seats.iter().filter(|s| s.can_act()).collect();
        if actors.iter().any(|s| s.street_bet < self.current_bet) {
            return false;
        }
        actors.len() <= 1 || actors.iter().all(|s| s.acted)
    }

    fn next_to_act(&self, from: usize) -> Option<usize> {
        let n = self.seats.len();
        (1..=n).map(|offset| (from + offset) % n).find(|&i| {
            let seat = &self.seats[i];
            seat.can_act() && (!seat.acted || seat.street_bet < self.current_bet)
        })
    }

    fn next_funded(&self, from: usize) -> usize {
        let n = self.seats.len();
        (1..=n)
            .map(|offset| (from + offset) % n)
            .find(|&i| self.seats[i].stack > 0)
            .unwrap_or((from + 1) % n)
    }

    fn first_actor_after_button(&self) -> Option<usize> {
        let n = self.seats.len();
        let button = self.button.unwrap_or(0);
        (1..=n)
            .map(|offset| (button + offset) % n)
            .find(|&i| self.seats[i].can_act())
    }

    /// Deals the next street, and keeps dealing while no betting is possible.
    /// Closing the river settles the hand.
    fn close_street(&mut self) -> HoldemResult<()> {
        loop {
            for seat in &mut self.seats {
                seat.reset_for_street();
            }
            self.current_bet = 0;
            let (next, count) = match self.stage {
                Stage::Preflop => (Stage::Flop, 3),
                Stage::Flop => (Stage::Turn, 1),
                Stage::Turn => (Stage::River, 1),
                Stage::River => return self.showdown(),
                Stage::Complete => return Ok(()),
            };
            self.deck.burn()?;
            let cards = self.deck.draw(count)?;
            self.board.extend(cards);
            self.stage = next;
            info!(
                "{}: {} (pot {})",
                next,
                self.board.iter().map(|c| c.to_string()).collect::<Vec<_>>().join(" "),
                self.pot
            );

            if let Some(first) = self.first_actor_after_button() {
                if !self.round_closed() {
                    self.turn = Some(first);
                    self.last_aggressor = first;
                    return Ok(());
                }
            }
            debug!("no betting possible on the {}, dealing on", next);
        }
    }

    fn award_uncontested(&mut self) -> HoldemResult<()> {
        let Some(winner) = self.seats.iter().position(|s| s.in_hand()) else {
            return Err(HoldemError::NoEligibleWinner { layer: 0 });
        };
        let award = PotAward::uncontested(winner, self.pot);
        info!("seat {} wins {} uncontested", winner, self.pot);
        apply_awards(&mut self.seats, std::slice::from_ref(&award));
        self.finish_hand(vec![award]);
        Ok(())
    }

    fn showdown(&mut self) -> HoldemResult<()> {
        let contributions: Vec<u32> = self.seats.iter().map(|s| s.total_committed).collect();
        let layers = build_pot_layers(&contributions);
        let awards = distribute(&layers, &self.seats, &self.board, &self.evaluator)?;
        apply_awards(&mut self.seats, &awards);
        for award in &awards {
            info!(
                "{} chips to {:?}{}",
                award.amount,
                award.winners,
                award.hand.map(|h| format!(" with {}", h)).unwrap_or_default()
            );
        }
        self.finish_hand(awards);
        Ok(())
    }

    fn finish_hand(&mut self, awards: Vec<PotAward>) {
        self.pot = 0;
        self.current_bet = 0;
        self.turn = None;
        self.stage = Stage::Complete;
        self.hands_played += 1;
        if let Some(mut record) = self.record.take() {
            record.board = self.board.clone();
            record.awards = awards;
            record.final_stacks = self.seats.iter().map(|s| s.stack).collect();
            self.last_settlement = Some(record);
        }
        debug_assert_eq!(self.chip_total(), self.total_chips);
    }

    fn committed_total(&self) -> u32 {
        self.seats.iter().map(|s| s.total_committed).sum()
    }

    pub fn snapshot(&self) -> TableSnapshot {
        TableSnapshot {
            stage: self.stage,
            button: self.button,
            small_blind_seat: self.small_blind_seat,
            big_blind_seat: self.big_blind_seat,
            board: self.board.clone(),
            pot: self.pot,
            current_bet: self.current_bet,
            turn: self.turn,
            last_aggressor: self.last_aggressor,
            seats: self.seats.clone(),
            last_settlement: self.last_settlement.clone(),
        }
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn board(&self) -> &[Card] {
        &self.board
    }

    pub fn pot(&self) -> u32 {
        self.pot
    }

    pub fn current_bet(&self) -> u32 {
        self.current_bet
    }

    pub fn turn(&self) -> Option<usize> {
        self.turn
    }

    pub fn last_aggressor(&self) -> usize {
        self.last_aggressor
    }

    pub fn button(&self) -> Option<usize> {
        self.button
    }

    pub fn small_blind_seat(&self) -> usize {
        self.small_blind_seat
    }

    pub fn big_blind_seat(&self) -> usize {
        self.big_blind_seat
    }

    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    /// Chips `seat` must put in to call, capped by its stack.
    pub fn to_call(&self, seat: usize) -> u32 {
        self.seats
            .get(seat)
            .map_or(0, |s| s.to_call(self.current_bet).min(s.stack))
    }

    /// Action kinds that make sense for the seat to act. Empty when no hand
    /// is running.
    pub fn legal_actions(&self) -> Vec<ActionKind> {
        let Some(index) = self.turn else {
            return Vec::new();
        };
        if self.stage == Stage::Complete {
            return Vec::new();
        }
        let seat = &self.seats[index];
        let owed = seat.to_call(self.current_bet);
        if owed == 0 {
            vec![ActionKind::Fold, ActionKind::Check, ActionKind::Bet]
        } else if seat.stack > owed {
            vec![ActionKind::Fold, ActionKind::Call, ActionKind::Raise]
        } else {
            vec![ActionKind::Fold, ActionKind::Call]
        }
    }

    /// Record of the hand in progress.
    pub fn current_record(&self) -> Option<&HandRecord> {
        self.record.as_ref()
    }

    pub fn last_settlement(&self) -> Option<&HandRecord> {
        self.last_settlement.as_ref()
    }

    pub fn hands_played(&self) -> u64 {
        self.hands_played
    }

    /// Stacks plus the pot; constant for the life of the engine.
    pub fn chip_total(&self) -> u64 {
        self.seats.iter().map(|s| u64::from(s.stack)).sum::<u64>() + u64::from(self.pot)
    }
}
