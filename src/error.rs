use std::fmt;

use thiserror::Error;

use crate::cards::Card;

/// The betting rule an action broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionRule {
    HandNotInProgress,
    SeatFolded,
    SeatAllIn,
    CheckFacingBet,
    BetFacingBet,
    RaiseWithoutBet,
    NonPositiveAmount,
}

impl fmt::Display for ActionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionRule::HandNotInProgress => write!(f, "no hand is in progress"),
            ActionRule::SeatFolded => write!(f, "seat has already folded"),
            ActionRule::SeatAllIn => write!(f, "seat is all-in and cannot act"),
            ActionRule::CheckFacingBet => write!(f, "cannot check when facing a bet"),
            ActionRule::BetFacingBet => write!(f, "cannot bet when a bet already exists"),
            ActionRule::RaiseWithoutBet => write!(f, "cannot raise when there is no bet to call"),
            ActionRule::NonPositiveAmount => write!(f, "bet and raise amounts must be positive"),
        }
    }
}

#[derive(Error, Debug)]
pub enum HoldemError {
    #[error("Invalid action: {0}")]
    InvalidAction(ActionRule),

    #[error("Illegal configuration: {0}")]
    IllegalConfiguration(String),

    #[error("Cannot deal {requested} cards, only {available} remaining")]
    DeckExhaustion { requested: usize, available: usize },

    #[error("Pot layer {layer} has no eligible seat")]
    NoEligibleWinner { layer: usize },

    #[error("A hand is already in progress")]
    HandInProgress,

    #[error("At least two seats need chips to start a hand")]
    NotEnoughPlayers,

    #[error("Invalid rank: {0}")]
    InvalidRank(char),

    #[error("Invalid suit: {0}")]
    InvalidSuit(char),

    #[error("Invalid card notation: {0}")]
    InvalidCardNotation(String),

    #[error("Invalid board notation: {0}")]
    InvalidBoardNotation(String),

    #[error("Invalid hand notation: {0}")]
    InvalidHandNotation(String),

    #[error("Need at least {need} cards, got {got}")]
    NotEnoughCards { need: usize, got: usize },

    #[error("At most {max} cards can be evaluated, got {got}")]
    TooManyCards { max: usize, got: usize },

    #[error("Card {0} appears more than once")]
    DuplicateCard(Card),

    #[error("Board must hold at most 5 cards, got {0}")]
    InvalidBoardSize(usize),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("No valid villain combos after removing dead cards")]
    NoValidCombos,

    #[error("Time budget expired before any rollout completed")]
    InsufficientData,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type HoldemResult<T> = Result<T, HoldemError>;
