use std::collections::{HashMap, HashSet};

use itertools::Itertools;
use once_cell::sync::Lazy;
use rand::Rng;

use crate::cards::{full_deck, hand_combos, HoleCards, RANKS_STR};
use crate::error::{HoldemError, HoldemResult};

/// All 169 starting-hand classes, strongest first.
pub const HAND_RANKING: &[&str] = &[
    "AA", "KK", "QQ", "AKs", "JJ", "AQs", "KQs", "AJs", "KJs", "TT",
    "AKo", "ATs", "QJs", "KTs", "QTs", "JTs", "99", "AQo", "A9s", "KQo",
    "K9s", "T9s", "J9s", "Q9s", "A8s", "88", "A5s", "A7s", "A4s", "A6s",
    "A3s", "K8s", "T8s", "A2s", "98s", "J8s", "77", "Q8s", "K7s", "AJo",
    "87s", "66", "K6s", "ATo", "97s", "76s", "T7s", "K5s", "Q5s", "55",
    "J7s", "86s", "KJo", "65s", "Q7s", "K4s", "K3s", "K2s", "96s", "44",
    "QJo", "75s", "54s", "A9o", "T6s", "KTo", "J6s", "Q6s", "33", "85s",
    "64s", "QTo", "22", "53s", "JTo", "K9o", "J9o", "T9o", "Q9o", "74s",
    "43s", "A8o", "A5o", "A7o", "A4o", "A6o", "A3o", "95s", "63s", "A2o",
    "52s", "84s", "42s", "T8o", "98o", "J8o", "Q8o", "73s", "87o", "32s",
    "62s", "97o", "76o", "K8o", "86o", "65o", "94s", "93s", "92s", "T7o",
    "Q4s", "Q3s", "Q2s", "J5s", "J4s", "J3s", "J2s", "T5s", "T4s", "T3s",
    "T2s", "54o", "83s", "75o", "82s", "K7o", "K6o", "72s", "96o", "J7o",
    "K5o", "T6o", "K4o", "K3o", "K2o", "85o", "Q7o", "64o", "53o", "J6o",
    "Q6o", "Q5o", "Q4o", "Q3o", "Q2o", "74o", "43o", "95o", "63o", "84o",
    "42o", "T5o", "T4o", "T3o", "T2o", "52o", "J5o", "J4o", "J3o", "J2o",
    "73o", "32o", "62o", "94o", "93o", "92o", "83o", "82o", "72o",
];

pub const TOTAL_COMBOS: u32 = 1326;

static RANKING_INDEX: Lazy<HashMap<&'static str, usize>> =
    Lazy::new(|| HAND_RANKING.iter().enumerate().map(|(i, &h)| (h, i)).collect());

pub fn combo_count(notation: &str) -> u32 {
    let chars: Vec<char> = notation.chars().collect();
    match chars.len() {
        2 if chars[0] == chars[1] => 6,
        3 if chars[2] == 's' => 4,
        3 if chars[2] == 'o' => 12,
        _ => 0,
    }
}

/// Expands range notation (`"TT+, AQs+, KJo-KQo, AsKh"`) into hand classes,
/// strongest first.
pub fn parse_range(range_str: &str) -> Vec<String> {
    let mut hands = HashSet::new();
    for part in range_str.replace(' ', "").split(',') {
        if part.is_empty() {
            continue;
        }
        if let Some(base) = part.strip_suffix('+') {
            hands.extend(expand_plus(base));
        } else if part.contains('-') && part.len() > 3 {
            hands.extend(expand_dash(part));
        } else {
            hands.insert(part.to_string());
        }
    }
    let mut result: Vec<String> = hands.into_iter().collect();
    result.sort_by(|a, b| hand_strength_index(a).cmp(&hand_strength_index(b)).then(a.cmp(b)));
    result
}

fn expand_plus(base: &str) -> Vec<String> {
    let chars: Vec<char> = base.chars().collect();
    let ranks: Vec<char> = RANKS_STR.chars().collect();

    // Pair: "TT+"
    if chars.len() == 2 && chars[0] == chars[1] {
        if let Some(rank_idx) = RANKS_STR.find(chars[0]) {
            return (rank_idx..ranks.len())
                .map(|i| format!("{}{}", ranks[i], ranks[i]))
                .collect();
        }
        return vec![base.to_string()];
    }

    // Suited/offsuit: "ATs+"
    if chars.len() == 3 {
        let (high, low, kind) = (chars[0], chars[1], chars[2]);
        if let (Some(low_idx), Some(high_idx)) = (RANKS_STR.find(low), RANKS_STR.find(high)) {
            return (low_idx..high_idx)
                .map(|i| format!("{}{}{}", high, ranks[i], kind))
                .collect();
        }
    }

    vec![base.to_string()]
}

fn expand_dash(range_str: &str) -> Vec<String> {
    let Some((start, end)) = range_str.split_once('-') else {
        return vec![range_str.to_string()];
    };
    let start_chars: Vec<char> = start.chars().collect();
    let end_chars: Vec<char> = end.chars().collect();
    let ranks: Vec<char> = RANKS_STR.chars().collect();

    // Pair range: "77-TT"
    if start_chars.len() == 2
        && end_chars.len() == 2
        && start_chars[0] == start_chars[1]
        && end_chars[0] == end_chars[1]
    {
        if let (Some(si), Some(ei)) = (RANKS_STR.find(start_chars[0]), RANKS_STR.find(end_chars[0])) {
            let (lo, hi) = (si.min(ei), si.max(ei));
            return (lo..=hi).map(|i| format!("{}{}", ranks[i], ranks[i])).collect();
        }
    }

    // Suited/offsuit range: "KTs-KQs"
    if start_chars.len() == 3
        && end_chars.len() == 3
        && start_chars[0] == end_chars[0]
        && start_chars[2] == end_chars[2]
    {
        let (high, kind) = (start_chars[0], start_chars[2]);
        if let (Some(si), Some(ei)) = (RANKS_STR.find(start_chars[1]), RANKS_STR.find(end_chars[1])) {
            let (lo, hi) = (si.min(ei), si.max(ei));
            return (lo..=hi)
                .map(|i| format!("{}{}{}", high, ranks[i], kind))
                .collect();
        }
    }

    vec![range_str.to_string()]
}

fn hand_strength_index(hand: &str) -> usize {
    RANKING_INDEX.get(hand).copied().unwrap_or(HAND_RANKING.len())
}

/// The strongest classes covering roughly `pct` percent of all combos.
pub fn range_from_top_pct(pct: f64) -> HoldemResult<Vec<String>> {
    if pct <= 0.0 || pct > 100.0 {
        return Err(HoldemError::InvalidValue(
            "Percentage must be between 0 and 100".to_string(),
        ));
    }
    let target = TOTAL_COMBOS as f64 * (pct / 100.0);
    let mut result = Vec::new();
    let mut running = 0u32;
    for &hand in HAND_RANKING {
        let count = combo_count(hand);
        if (running + count) as f64 > target && running > 0 {
            break;
        }
        result.push(hand.to_string());
        running += count;
        if running as f64 >= target {
            break;
        }
    }
    Ok(result)
}

/// A set of concrete hole-card combos an opponent may hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandRange {
    combos: Vec<HoleCards>,
}

impl HandRange {
    pub fn parse(range_str: &str) -> HoldemResult<HandRange> {
        let classes = parse_range(range_str);
        if classes.is_empty() {
            return Err(HoldemError::InvalidHandNotation(range_str.to_string()));
        }
        let mut combos = Vec::new();
        for class in &classes {
            combos.extend(hand_combos(class)?);
        }
        Ok(HandRange::from_combos(combos))
    }

    pub fn top_percent(pct: f64) -> HoldemResult<HandRange> {
        let classes = range_from_top_pct(pct)?;
        HandRange::parse(&classes.join(","))
    }

    /// Every two-card combo.
    pub fn any() -> HandRange {
        let combos = full_deck()
            .into_iter()
            .tuple_combinations()
            .map(|(a, b)| [a, b])
            .collect();
        HandRange { combos }
    }

    pub fn from_combos(combos: Vec<HoleCards>) -> HandRange {
        let mut seen = HashSet::new();
        let combos = combos
            .into_iter()
            .filter(|h| h[0] != h[1] && seen.insert(combo_key(h)))
            .collect();
        HandRange { combos }
    }

    pub fn combos(&self) -> &[HoleCards] {
        &self.combos
    }

    pub fn len(&self) -> usize {
        self.combos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.combos.is_empty()
    }

    pub fn contains(&self, hole: &HoleCards) -> bool {
        let key = combo_key(hole);
        self.combos.iter().any(|h| combo_key(h) == key)
    }

    /// Combos sharing no card with `dead_mask`.
    pub fn live_combos(&self, dead_mask: u64) -> Vec<HoleCards> {
        self.combos
            .iter()
            .filter(|h| (h[0].mask() | h[1].mask()) & dead_mask == 0)
            .copied()
            .collect()
    }

    pub fn pct(&self) -> f64 {
        self.combos.len() as f64 / TOTAL_COMBOS as f64 * 100.0
    }
}

/// Order-independent id of a combo in 0..52*52.
fn combo_key(hole: &HoleCards) -> u16 {
    let (a, b) = (hole[0].index() as u16, hole[1].index() as u16);
    a.min(b) * 52 + a.max(b)
}

/// Uniformly picks a combo that avoids `used`, trying a few blind draws
/// before filtering the whole list.
pub(crate) fn sample_combo<R: Rng + ?Sized>(
    combos: &[HoleCards],
    used: u64,
    rng: &mut R,
) -> Option<HoleCards> {
    if combos.is_empty() {
        return None;
    }
    let free = |h: &HoleCards| (h[0].mask() | h[1].mask()) & used == 0;
    for _ in 0..16 {
        let hole = combos[rng.gen_range(0..combos.len())];
        if free(&hole) {
            return Some(hole);
        }
    }
    let candidates: Vec<&HoleCards> = combos.iter().filter(|h| free(h)).collect();
    if candidates.is_empty() {
        return None;
    }
    Some(*candidates[rng.gen_range(0..candidates.len())])
}
