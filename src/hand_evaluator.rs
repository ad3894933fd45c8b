use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::cards::{card_mask, Card};
use crate::error::{HoldemError, HoldemResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HandCategory {
    HighCard = 0,
    OnePair = 1,
    TwoPair = 2,
    ThreeOfAKind = 3,
    Straight = 4,
    Flush = 5,
    FullHouse = 6,
    FourOfAKind = 7,
    StraightFlush = 8,
    RoyalFlush = 9,
}

impl HandCategory {
    fn from_code(code: u32) -> HandCategory {
        match code {
            1 => HandCategory::OnePair,
            2 => HandCategory::TwoPair,
            3 => HandCategory::ThreeOfAKind,
            4 => HandCategory::Straight,
            5 => HandCategory::Flush,
            6 => HandCategory::FullHouse,
            7 => HandCategory::FourOfAKind,
            8 => HandCategory::StraightFlush,
            9 => HandCategory::RoyalFlush,
            _ => HandCategory::HighCard,
        }
    }
}

impl fmt::Display for HandCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandCategory::HighCard => write!(f, "High Card"),
            HandCategory::OnePair => write!(f, "One Pair"),
            HandCategory::TwoPair => write!(f, "Two Pair"),
            HandCategory::ThreeOfAKind => write!(f, "Three of a Kind"),
            HandCategory::Straight => write!(f, "Straight"),
            HandCategory::Flush => write!(f, "Flush"),
            HandCategory::FullHouse => write!(f, "Full House"),
            HandCategory::FourOfAKind => write!(f, "Four of a Kind"),
            HandCategory::StraightFlush => write!(f, "Straight Flush"),
            HandCategory::RoyalFlush => write!(f, "Royal Flush"),
        }
    }
}

/// Totally ordered hand value; higher is better, equal values split the pot.
///
/// Layout: category in bits 20..24, then up to five tie-break ranks of
/// four bits each, most significant first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HandStrength(u32);

impl HandStrength {
    fn pack(category: HandCategory, kickers: &[u8]) -> HandStrength {
        let mut value = (category as u32) << 20;
        for (i, &k) in kickers.iter().take(5).enumerate() {
            value |= (k as u32) << (16 - 4 * i);
        }
        HandStrength(value)
    }

    pub fn from_raw(value: u32) -> HandStrength {
        HandStrength(value)
    }

    pub fn raw(&self) -> u32 {
        self.0
    }

    pub fn category(&self) -> HandCategory {
        HandCategory::from_code(self.0 >> 20)
    }

    pub fn kickers(&self) -> Vec<u8> {
        (0..5)
            .map(|i| ((self.0 >> (16 - 4 * i)) & 0xF) as u8)
            .take_while(|&k| k != 0)
            .collect()
    }
}

impl fmt::Display for HandStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.category())
    }
}

/// Maps 5 to 7 cards onto a comparable strength.
///
/// Implementations must be consistent: the same card set always yields the
/// same value, whatever the input order.
pub trait HandEvaluator: Send + Sync {
    fn evaluate(&self, cards: &[Card]) -> HoldemResult<HandStrength>;
}

impl<E: HandEvaluator + ?Sized> HandEvaluator for &E {
    fn evaluate(&self, cards: &[Card]) -> HoldemResult<HandStrength> {
        (**self).evaluate(cards)
    }
}

impl<E: HandEvaluator + ?Sized> HandEvaluator for Box<E> {
    fn evaluate(&self, cards: &[Card]) -> HoldemResult<HandStrength> {
        (**self).evaluate(cards)
    }
}

impl<E: HandEvaluator + ?Sized> HandEvaluator for Arc<E> {
    fn evaluate(&self, cards: &[Card]) -> HoldemResult<HandStrength> {
        (**self).evaluate(cards)
    }
}

/// Best-five-of-N evaluator over every 5-card subset.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardEvaluator;

impl HandEvaluator for StandardEvaluator {
    fn evaluate(&self, cards: &[Card]) -> HoldemResult<HandStrength> {
        if cards.len() < 5 {
            return Err(HoldemError::NotEnoughCards {
                need: 5,
                got: cards.len(),
            });
        }
        if cards.len() > 7 {
            return Err(HoldemError::TooManyCards {
                max: 7,
                got: cards.len(),
            });
        }
        card_mask(cards).map_err(HoldemError::DuplicateCard)?;

        let best = cards
            .iter()
            .combinations(5)
            .map(|combo| rank_five([*combo[0], *combo[1], *combo[2], *combo[3], *combo[4]]))
            .max();
        best.ok_or(HoldemError::NotEnoughCards {
            need: 5,
            got: cards.len(),
        })
    }
}

fn straight_high(values: &[u8; 5]) -> Option<u8> {
    // values are sorted descending
    if values.windows(2).all(|w| w[0] == w[1] + 1) {
        return Some(values[0]);
    }
    // Wheel: A-2-3-4-5
    if *values == [14, 5, 4, 3, 2] {
        return Some(5);
    }
    None
}

fn rank_five(cards: [Card; 5]) -> HandStrength {
    let mut values = cards.map(|c| c.value());
    values.sort_unstable_by(|a, b| b.cmp(a));

    let flush = cards.windows(2).all(|w| w[0].suit == w[1].suit);
    let straight = straight_high(&values);

    if let (true, Some(high)) = (flush, straight) {
        let category = if high == 14 {
            HandCategory::RoyalFlush
        } else {
            HandCategory::StraightFlush
        };
        return HandStrength::pack(category, &[high]);
    }

    let mut counts = [0u8; 15];
    for &v in &values {
        counts[v as usize] += 1;
    }

    // (count, value) sorted by count desc, then value desc
    let mut groups: Vec<(u8, u8)> = (2..=14u8)
        .rev()
        .filter(|&v| counts[v as usize] > 0)
        .map(|v| (counts[v as usize], v))
        .collect();
    groups.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.cmp(&a.1)));
    let ordered: Vec<u8> = groups.iter().map(|&(_, v)| v).collect();

    let category = match (groups[0].0, groups.get(1).map_or(0, |g| g.0)) {
        (4, _) => HandCategory::FourOfAKind,
        (3, 2) => HandCategory::FullHouse,
        _ if flush => HandCategory::Flush,
        _ if straight.is_some() => HandCategory::Straight,
        (3, _) => HandCategory::ThreeOfAKind,
        (2, 2) => HandCategory::TwoPair,
        (2, _) => HandCategory::OnePair,
        _ => HandCategory::HighCard,
    };

    match (category, straight) {
        (HandCategory::Straight, Some(high)) => HandStrength::pack(category, &[high]),
        (HandCategory::Flush, _) | (HandCategory::HighCard, _) => HandStrength::pack(category, &values),
        _ => HandStrength::pack(category, &ordered),
    }
}

/// Evaluates hole cards plus board with the standard evaluator.
pub fn evaluate_hand(hole_cards: &[Card], board: &[Card]) -> HoldemResult<HandStrength> {
    let mut all_cards: Vec<Card> = Vec::with_capacity(hole_cards.len() + board.len());
    all_cards.extend_from_slice(hole_cards);
    all_cards.extend_from_slice(board);
    StandardEvaluator.evaluate(&all_cards)
}

pub fn compare_hands(hand1: &[Card], hand2: &[Card], board: &[Card]) -> HoldemResult<Ordering> {
    let r1 = evaluate_hand(hand1, board)?;
    let r2 = evaluate_hand(hand2, board)?;
    Ok(r1.cmp(&r2))
}
