use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A slice of the pot and the seats entitled to win it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PotLayer {
    pub amount: u32,
    pub eligible: BTreeSet<usize>,
}

/// Peels pot layers off the per-seat hand contributions.
///
/// `contributions[seat]` is everything that seat put in this hand, folded
/// seats included. Layers come back main pot first; each contributor is
/// eligible for every layer up to its own level, and the layer amounts sum
/// to the total contributed.
pub fn build_pot_layers(contributions: &[u32]) -> Vec<PotLayer> {
    let mut levels: Vec<u32> = contributions.iter().copied().filter(|&c| c > 0).collect();
    levels.sort_unstable();
    levels.dedup();

    let mut layers = Vec::with_capacity(levels.len());
    let mut prev_level = 0u32;
    for level in levels {
        let eligible: BTreeSet<usize> = contributions
            .iter()
            .enumerate()
            .filter(|(_, &c)| c >= level)
            .map(|(seat, _)| seat)
            .collect();
        layers.push(PotLayer {
            amount: (level - prev_level) * eligible.len() as u32,
            eligible,
        });
        prev_level = level;
    }
    layers
}

/// Total chips across layers.
pub fn layers_total(layers: &[PotLayer]) -> u32 {
    layers.iter().map(|l| l.amount).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_level_is_one_main_pot() {
        let layers = build_pot_layers(&[50, 50, 50]);
        assert_eq!(layers.len(), 1);
        assert_eq!(layers[0].amount, 150);
        assert_eq!(layers[0].eligible.len(), 3);
    }

    #[test]
    fn zero_contributors_are_ignored() {
        let layers = build_pot_layers(&[0, 20, 0, 20]);
        assert_eq!(layers.len(), 1);
        assert_eq!(layers[0].eligible, BTreeSet::from([1, 3]));
    }

    #[test]
    fn no_contributions_no_layers() {
        assert!(build_pot_layers(&[0, 0]).is_empty());
    }
}
