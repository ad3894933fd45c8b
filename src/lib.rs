//! Texas Hold'em hand engine.
//!
//! [`BettingEngine`] runs hands from the blinds to settlement: legal action
//! checks, street dealing, side pots and showdown. [`EquityEstimator`] gives
//! Monte Carlo equity against random or range-constrained opponents, and
//! [`HeuristicPolicy`] turns that equity into a betting decision.

pub mod action;
pub mod cards;
pub mod config;
pub mod engine;
pub mod equity;
pub mod error;
pub mod hand_evaluator;
pub mod history;
pub mod odds;
pub mod policy;
pub mod ranges;
pub mod seat;
pub mod showdown;
pub mod side_pots;

pub use action::{Action, ActionKind, ActionRecord};
pub use cards::{Card, Deck, HoleCards, Rank, Suit};
pub use config::{EstimatorConfig, TableConfig, MAX_SEATS};
pub use engine::{BettingEngine, Stage};
pub use equity::{EquityEstimator, EquityRequest, EquityResult, Opponents};
pub use error::{ActionRule, HoldemError, HoldemResult};
pub use hand_evaluator::{HandCategory, HandEvaluator, HandStrength, StandardEvaluator};
pub use history::{HandRecord, TableSnapshot};
pub use policy::{ActionValues, HeuristicPolicy};
pub use ranges::HandRange;
pub use seat::Seat;
pub use showdown::PotAward;
pub use side_pots::PotLayer;
