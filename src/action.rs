use std::fmt;

use serde::{Deserialize, Serialize};

use crate::engine::Stage;

/// A betting decision for the seat whose turn it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Fold,
    Check,
    /// Match the current bet, or go all-in for less.
    Call,
    /// Open the betting for this many chips. Only legal when nobody has bet.
    Bet(u32),
    /// Raise by this many chips *on top of* the amount needed to call.
    /// Only valid when facing a bet.
    /// Clamped to the stack; a short all-in raise never lowers the bet.
    Raise(u32),
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Fold => ActionKind::Fold,
            Action::Check => ActionKind::Check,
            Action::Call => ActionKind::Call,
            Action::Bet(_) => ActionKind::Bet,
            Action::Raise(_) => ActionKind::Raise,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Fold => write!(f, "fold"),
            Action::Check => write!(f, "check"),
            Action::Call => write!(f, "call"),
            Action::Bet(n) => write!(f, "bet {}", n),
            Action::Raise(n) => write!(f, "raise {}", n),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Blind,
    Fold,
    Check,
    Call,
    Bet,
    Raise,
}

/// One entry of a hand's action log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub seat: usize,
    pub stage: Stage,
    pub kind: ActionKind,
    /// Chips actually moved into the pot
    pub amount: u32,
}
