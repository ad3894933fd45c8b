use std::collections::BTreeMap;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::error::{HoldemError, HoldemResult};
use crate::hand_evaluator::{HandCategory, HandEvaluator, HandStrength};
use crate::seat::Seat;
use crate::side_pots::PotLayer;

/// How one pot layer was paid out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PotAward {
    pub amount: u32,
    /// Seats that won the layer, ascending
    pub winners: Vec<usize>,
    /// Chips paid to each winner; sums to `amount`
    pub shares: BTreeMap<usize, u32>,
    /// Winning hand category, `None` when nobody had to show
    pub hand: Option<HandCategory>,
    /// Layer nobody still in the hand could claim, handed back to its contributor
    pub returned: bool,
}

impl PotAward {
    pub fn uncontested(seat: usize, amount: u32) -> Self {
        Self {
            amount,
            winners: vec![seat],
            shares: BTreeMap::from([(seat, amount)]),
            hand: None,
            returned: false,
        }
    }
}

/// Splits `amount` evenly; odd chips go one each to the earliest winners.
pub fn split_pot(amount: u32, winners: &[usize]) -> BTreeMap<usize, u32> {
    let mut shares = BTreeMap::new();
    if winners.is_empty() {
        return shares;
    }
    let share = amount / winners.len() as u32;
    let remainder = (amount % winners.len() as u32) as usize;
    let mut ordered = winners.to_vec();
    ordered.sort_unstable();
    for (i, seat) in ordered.into_iter().enumerate() {
        let extra = u32::from(i < remainder);
        *shares.entry(seat).or_insert(0) += share + extra;
    }
    shares
}

/// Decides the winners of every layer. Does not move chips.
///
/// Only seats still in the hand are evaluated. A layer whose eligible seats
/// have all folded goes back to the eligible seat that put in the most.
pub fn distribute<E: HandEvaluator + ?Sized>(
    layers: &[PotLayer],
    seats: &[Seat],
    board: &[Card],
    evaluator: &E,
) -> HoldemResult<Vec<PotAward>> {
    let mut strengths: BTreeMap<usize, HandStrength> = BTreeMap::new();
    for (index, seat) in seats.iter().enumerate().filter(|(_, s)| s.in_hand()) {
        let mut cards = Vec::with_capacity(7);
        cards.extend_from_slice(seat.hole());
        cards.extend_from_slice(board);
        strengths.insert(index, evaluator.evaluate(&cards)?);
    }

    let mut awards = Vec::with_capacity(layers.len());
    for (layer_index, layer) in layers.iter().enumerate() {
        if layer.eligible.is_empty() {
            return Err(HoldemError::NoEligibleWinner { layer: layer_index });
        }

        let contenders: Vec<(usize, HandStrength)> = layer
            .eligible
            .iter()
            .filter_map(|seat| strengths.get(seat).map(|s| (*seat, *s)))
            .collect();

        let Some(best) = contenders.iter().map(|(_, s)| *s).max() else {
            let owner = layer
                .eligible
                .iter()
                .copied()
                .max_by(|a, b| {
                    let committed = |i: usize| seats.get(i).map_or(0, |s| s.total_committed);
                    committed(*a).cmp(&committed(*b)).then(b.cmp(a))
                })
                .ok_or(HoldemError::NoEligibleWinner { layer: layer_index })?;
            warn!(
                "layer {} ({} chips) has no live contender, returning it to seat {}",
                layer_index, layer.amount, owner
            );
            awards.push(PotAward {
                amount: layer.amount,
                winners: vec![owner],
                shares: BTreeMap::from([(owner, layer.amount)]),
                hand: None,
                returned: true,
            });
            continue;
        };

        let winners: Vec<usize> = contenders
            .iter()
            .filter(|(_, s)| *s == best)
            .map(|(seat, _)| *seat)
            .collect();
        debug!(
            "layer {}: {} chips to {:?} with {}",
            layer_index, layer.amount, winners, best
        );
        awards.push(PotAward {
            amount: layer.amount,
            shares: split_pot(layer.amount, &winners),
            winners,
            hand: Some(best.category()),
            returned: false,
        });
    }
    Ok(awards)
}

/// Credits every award to the seats' stacks.
pub fn apply_awards(seats: &mut [Seat], awards: &[PotAward]) {
    for award in awards {
        for (&seat, &chips) in &award.shares {
            if let Some(s) = seats.get_mut(seat) {
                s.award(chips);
            }
        }
    }
}
