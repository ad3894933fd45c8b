use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::action::ActionRecord;
use crate::cards::{Card, HoleCards};
use crate::engine::Stage;
use crate::error::HoldemResult;
use crate::seat::Seat;
use crate::showdown::PotAward;

/// Summary of one finished hand, produced at settlement for outer layers
/// (rendering, persistence) to consume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandRecord {
    pub hand_number: u64,
    pub button: usize,
    pub small_blind: usize,
    pub big_blind: usize,
    pub starting_stacks: Vec<u32>,
    pub hole_cards: BTreeMap<usize, HoleCards>,
    pub actions: Vec<ActionRecord>,
    pub board: Vec<Card>,
    pub awards: Vec<PotAward>,
    pub final_stacks: Vec<u32>,
}

impl HandRecord {
    pub(crate) fn open(
        hand_number: u64,
        button: usize,
        small_blind: usize,
        big_blind: usize,
        starting_stacks: Vec<u32>,
    ) -> Self {
        Self {
            hand_number,
            button,
            small_blind,
            big_blind,
            starting_stacks,
            hole_cards: BTreeMap::new(),
            actions: Vec::new(),
            board: Vec::new(),
            awards: Vec::new(),
            final_stacks: Vec::new(),
        }
    }

    pub fn winners(&self) -> BTreeSet<usize> {
        self.awards
            .iter()
            .filter(|a| !a.returned)
            .flat_map(|a| a.winners.iter().copied())
            .collect()
    }

    /// Chips paid to `seat` across all layers.
    pub fn winnings(&self, seat: usize) -> u32 {
        self.awards
            .iter()
            .filter_map(|a| a.shares.get(&seat))
            .sum()
    }

    pub fn pot_total(&self) -> u32 {
        self.awards.iter().map(|a| a.amount).sum()
    }

    /// Net chip change per seat.
    pub fn deltas(&self) -> Vec<i64> {
        self.starting_stacks
            .iter()
            .zip(&self.final_stacks)
            .map(|(&start, &end)| end as i64 - start as i64)
            .collect()
    }

    pub fn went_to_showdown(&self) -> bool {
        self.awards.iter().any(|a| a.hand.is_some())
    }

    pub fn to_json(&self) -> HoldemResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Read-only view of the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSnapshot {
    pub stage: Stage,
    pub button: Option<usize>,
    pub small_blind_seat: usize,
    pub big_blind_seat: usize,
    pub board: Vec<Card>,
    pub pot: u32,
    pub current_bet: u32,
    /// Seat to act; `None` once the hand is complete
    pub turn: Option<usize>,
    pub last_aggressor: usize,
    pub seats: Vec<Seat>,
    pub last_settlement: Option<HandRecord>,
}

impl TableSnapshot {
    pub fn to_call(&self, seat: usize) -> u32 {
        self.seats
            .get(seat)
            .map_or(0, |s| s.to_call(self.current_bet).min(s.stack))
    }

    pub fn live_seats(&self) -> Vec<usize> {
        self.seats
            .iter()
            .enumerate()
            .filter(|(_, s)| s.in_hand())
            .map(|(i, _)| i)
            .collect()
    }
}
