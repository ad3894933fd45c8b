//! A simple equity-driven bot.
//!
//! The policy reads the table, estimates the acting seat's equity against
//! the other live seats holding random cards, and compares it with the price
//! of continuing. It only ever returns actions the engine will accept.

use log::debug;

use crate::action::Action;
use crate::cards::HoleCards;
use crate::config::EstimatorConfig;
use crate::engine::BettingEngine;
use crate::equity::{EquityEstimator, EquityRequest, Opponents};
use crate::error::{ActionRule, HoldemError, HoldemResult};
use crate::hand_evaluator::{HandEvaluator, StandardEvaluator};
use crate::odds::{call_ev, pot_odds, shove_ev};

/// Chip EV of the three basic lines, relative to folding now.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActionValues {
    pub fold: f64,
    pub call: f64,
    pub shove: f64,
}

impl ActionValues {
    pub fn best(&self) -> f64 {
        self.fold.max(self.call).max(self.shove)
    }

    /// EV given up by `action` against the best line. Checks count as calls,
    /// bets and raises as the shove.
    pub fn ev_loss(&self, action: Action) -> f64 {
        let chosen = match action {
            Action::Fold => self.fold,
            Action::Check | Action::Call => self.call,
            Action::Bet(_) | Action::Raise(_) => self.shove,
        };
        self.best() - chosen
    }
}

/// The state a decision is made from.
struct Spot {
    hole: HoleCards,
    stack: u32,
    to_call: u32,
    pot: u32,
    equity: f64,
}

pub struct HeuristicPolicy<E: HandEvaluator = StandardEvaluator> {
    estimator: EquityEstimator<E>,
    config: EstimatorConfig,
    seed: Option<u64>,
    /// Minimum equity to raise when facing a bet
    pub raise_threshold: f64,
    /// Minimum equity to open the betting
    pub bet_threshold: f64,
    /// Bet and raise sizes as a fraction of the pot
    pub sizing: f64,
    /// Assumed fold frequency when valuing a shove
    pub shove_fold_pct: f64,
}

impl HeuristicPolicy<StandardEvaluator> {
    pub fn standard() -> Self {
        HeuristicPolicy::new(EquityEstimator::standard(), EstimatorConfig::default())
    }
}

impl<E: HandEvaluator> HeuristicPolicy<E> {
    pub fn new(estimator: EquityEstimator<E>, config: EstimatorConfig) -> Self {
        Self {
            estimator,
            config,
            seed: None,
            raise_threshold: 0.7,
            bet_threshold: 0.6,
            sizing: 0.5,
            shove_fold_pct: 0.0,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_thresholds(mut self, bet_threshold: f64, raise_threshold: f64) -> Self {
        self.bet_threshold = bet_threshold;
        self.raise_threshold = raise_threshold;
        self
    }

    pub fn estimator(&self) -> &EquityEstimator<E> {
        &self.estimator
    }

    /// Picks an action for the seat whose turn it is.
    pub fn decide<F: HandEvaluator>(&self, engine: &BettingEngine<F>) -> HoldemResult<Action> {
        let spot = self.spot(engine)?;
        let size = ((f64::from(spot.pot) * self.sizing).round() as u32).max(1);

        let action = if spot.to_call > 0 {
            if spot.equity < pot_odds(spot.pot, spot.to_call)? {
                Action::Fold
            } else if spot.equity >= self.raise_threshold && spot.stack > spot.to_call {
                Action::Raise(size)
            } else {
                Action::Call
            }
        } else if spot.equity >= self.bet_threshold {
            Action::Bet(size)
        } else {
            Action::Check
        };
        debug!(
            "{}{}: equity {:.3}, to call {} into {}, {}",
            spot.hole[0], spot.hole[1], spot.equity, spot.to_call, spot.pot, action
        );
        Ok(action)
    }

    pub fn action_values<F: HandEvaluator>(
        &self,
        engine: &BettingEngine<F>,
    ) -> HoldemResult<ActionValues> {
        let spot = self.spot(engine)?;
        Ok(ActionValues {
            fold: 0.0,
            call: call_ev(spot.equity, spot.pot, spot.to_call)?,
            shove: shove_ev(spot.equity, spot.pot, spot.stack, self.shove_fold_pct)?,
        })
    }

    fn spot<F: HandEvaluator>(&self, engine: &BettingEngine<F>) -> HoldemResult<Spot> {
        let not_running = HoldemError::InvalidAction(ActionRule::HandNotInProgress);
        let Some(index) = engine.turn() else {
            return Err(not_running);
        };
        let seats = engine.seats();
        let Some(hole) = seats[index].hole_cards else {
            return Err(not_running);
        };
        let opponents = seats
            .iter()
            .enumerate()
            .filter(|(i, s)| *i != index && s.in_hand())
            .count();

        let mut request = EquityRequest::new(hole, Opponents::Random(opponents))
            .with_board(engine.board())
            .with_iterations(self.config.iterations);
        request.seed = self.seed;
        request.time_budget = self.config.time_budget();
        let equity = self.estimator.estimate(&request)?.equity();

        Ok(Spot {
            hole,
            stack: seats[index].stack,
            to_call: engine.to_call(index),
            pot: engine.pot(),
            equity,
        })
    }
}
