use serde::{Deserialize, Serialize};

use crate::cards::{Card, HoleCards};

/// Per-player chip and card state at one table position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    /// Chips not yet wagered
    pub stack: u32,
    /// Chips committed this betting round
    pub street_bet: u32,
    /// Chips committed this hand
    pub total_committed: u32,
    pub folded: bool,
    pub all_in: bool,
    /// Acted voluntarily since the last increase of the bet on this street
    pub acted: bool,
    pub hole_cards: Option<HoleCards>,
}

impl Seat {
    pub fn new(stack: u32) -> Self {
        Self {
            stack,
            street_bet: 0,
            total_committed: 0,
            folded: false,
            all_in: false,
            acted: false,
            hole_cards: None,
        }
    }

    pub(crate) fn reset_for_hand(&mut self) {
        self.street_bet = 0;
        self.total_committed = 0;
        self.all_in = false;
        self.acted = false;
        self.hole_cards = None;
        // an empty seat sits the hand out
        self.folded = self.stack == 0;
    }

    pub(crate) fn reset_for_street(&mut self) {
        self.street_bet = 0;
        self.acted = false;
    }

    /// Moves up to `amount` chips from the stack into the pot and returns
    /// the amount actually moved.
    pub(crate) fn commit(&mut self, amount: u32) -> u32 {
        let actual = amount.min(self.stack);
        self.stack -= actual;
        self.street_bet += actual;
        self.total_committed += actual;
        if self.stack == 0 && !self.folded {
            self.all_in = true;
        }
        actual
    }

    pub(crate) fn award(&mut self, amount: u32) {
        self.stack += amount;
    }

    /// Still contesting the pot.
    pub fn in_hand(&self) -> bool {
        !self.folded
    }

    /// Able to take a betting action.
    pub fn can_act(&self) -> bool {
        !self.folded && !self.all_in
    }

    pub fn to_call(&self, current_bet: u32) -> u32 {
        current_bet.saturating_sub(self.street_bet)
    }

    pub fn hole(&self) -> &[Card] {
        match &self.hole_cards {
            Some(hole) => hole,
            None => &[],
        }
    }
}
