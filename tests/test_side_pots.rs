use std::collections::BTreeSet;

use holdem_engine::side_pots::*;

#[test]
fn test_three_way_all_in_layers() {
    let layers = build_pot_layers(&[98, 199, 202]);
    let amounts: Vec<u32> = layers.iter().map(|l| l.amount).collect();
    assert_eq!(amounts, vec![294, 202, 3]);
    assert_eq!(layers[0].eligible, BTreeSet::from([0, 1, 2]));
    assert_eq!(layers[1].eligible, BTreeSet::from([1, 2]));
    assert_eq!(layers[2].eligible, BTreeSet::from([2]));
}

#[test]
fn test_layers_sum_to_contributions() {
    let contributions = [40, 0, 250, 250, 17, 1000];
    let layers = build_pot_layers(&contributions);
    assert_eq!(layers_total(&layers), contributions.iter().sum::<u32>());
    assert!(layers.iter().all(|l| l.amount > 0));
}

#[test]
fn test_every_contributor_eligible_up_to_its_level() {
    let contributions = [30, 10, 60, 10];
    let layers = build_pot_layers(&contributions);
    let mut level = 0;
    for layer in &layers {
        let width = layer.amount / layer.eligible.len() as u32;
        level += width;
        for (seat, &c) in contributions.iter().enumerate() {
            assert_eq!(layer.eligible.contains(&seat), c >= level);
        }
    }
    assert_eq!(level, 60);
}

#[test]
fn test_equal_contributions_single_pot() {
    let layers = build_pot_layers(&[100, 100]);
    assert_eq!(layers.len(), 1);
    assert_eq!(layers[0].amount, 200);
}

#[test]
fn test_folded_chips_stay_in_their_layer() {
    // seat 0 folded after putting in 20; it is still listed where it paid
    let layers = build_pot_layers(&[20, 100, 100]);
    assert_eq!(layers[0].amount, 60);
    assert!(layers[0].eligible.contains(&0));
    assert_eq!(layers[1].amount, 160);
    assert!(!layers[1].eligible.contains(&0));
}
