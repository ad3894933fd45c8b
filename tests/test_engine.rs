use holdem_engine::action::{Action, ActionKind};
use holdem_engine::cards::card_mask;
use holdem_engine::config::TableConfig;
use holdem_engine::engine::{BettingEngine, Stage};
use holdem_engine::error::{ActionRule, HoldemError};
use holdem_engine::history::TableSnapshot;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn engine(config: TableConfig) -> BettingEngine {
    BettingEngine::standard(config).unwrap()
}

fn heads_up(seed: u64) -> BettingEngine {
    engine(TableConfig::heads_up(100, 1, 2).with_seed(seed))
}

fn act(engine: &mut BettingEngine, actions: &[Action]) {
    for &action in actions {
        engine.apply_action(action).unwrap();
    }
}

fn stacks(engine: &BettingEngine) -> Vec<u32> {
    engine.seats().iter().map(|s| s.stack).collect()
}

#[test]
fn test_fresh_engine_waits_for_first_hand() {
    let e = heads_up(1);
    assert_eq!(e.stage(), Stage::Complete);
    assert_eq!(e.turn(), None);
    assert_eq!(e.hands_played(), 0);
    assert!(e.legal_actions().is_empty());
}

#[test]
fn test_invalid_config_rejected() {
    let result = BettingEngine::standard(TableConfig::new(1, 100, 1, 2));
    assert!(matches!(result, Err(HoldemError::IllegalConfiguration(_))));
}

#[test]
fn test_new_hand_posts_blinds_and_deals() {
    let mut e = engine(TableConfig::new(4, 1000, 10, 20).with_seed(5));
    let dealt = e.new_hand().unwrap();
    assert_eq!(dealt.len(), 4);
    assert_eq!(e.button(), Some(0));
    assert_eq!(e.small_blind_seat(), 1);
    assert_eq!(e.big_blind_seat(), 2);
    assert_eq!(e.pot(), 30);
    assert_eq!(e.current_bet(), 20);
    assert_eq!(e.turn(), Some(3));
    assert_eq!(e.last_aggressor(), 2);
    assert_eq!(stacks(&e), vec![1000, 990, 980, 1000]);

    let cards: Vec<_> = dealt.values().flat_map(|h| h.iter().copied()).collect();
    assert!(card_mask(&cards).is_ok());
    for (seat, hole) in &dealt {
        assert_eq!(e.seats()[*seat].hole_cards, Some(*hole));
    }
}

#[test]
fn test_button_moves_each_hand() {
    let mut e = engine(TableConfig::new(3, 1000, 10, 20).with_seed(2));
    e.new_hand().unwrap();
    assert_eq!(e.button(), Some(0));
    act(&mut e, &[Action::Fold, Action::Fold]);
    e.new_hand().unwrap();
    assert_eq!(e.button(), Some(1));
    assert_eq!(e.small_blind_seat(), 2);
    assert_eq!(e.big_blind_seat(), 0);
    assert_eq!(e.hands_played(), 1);
}

#[test]
fn test_new_hand_while_running_fails() {
    let mut e = heads_up(3);
    e.new_hand().unwrap();
    assert!(matches!(e.new_hand(), Err(HoldemError::HandInProgress)));
}

#[test]
fn test_simple_showdown_conserves_chips() {
    let mut e = heads_up(7);
    e.new_hand().unwrap();
    // seat 0 has the button and the big blind heads-up; seat 1 acts first
    assert_eq!(e.small_blind_seat(), 1);
    assert_eq!(e.big_blind_seat(), 0);
    assert_eq!(e.turn(), Some(1));

    act(&mut e, &[Action::Call]);
    assert_eq!(e.stage(), Stage::Preflop);
    assert_eq!(e.turn(), Some(0));
    act(&mut e, &[Action::Check]);
    assert_eq!(e.stage(), Stage::Flop);
    assert_eq!(e.board().len(), 3);
    assert_eq!(e.current_bet(), 0);
    assert_eq!(e.turn(), Some(1));

    act(&mut e, &[Action::Check, Action::Check]);
    assert_eq!(e.stage(), Stage::Turn);
    assert_eq!(e.board().len(), 4);
    act(&mut e, &[Action::Check, Action::Check]);
    assert_eq!(e.stage(), Stage::River);
    assert_eq!(e.board().len(), 5);
    act(&mut e, &[Action::Check, Action::Check]);

    assert_eq!(e.stage(), Stage::Complete);
    assert_eq!(e.pot(), 0);
    assert_eq!(e.chip_total(), 200);
    let record = e.last_settlement().unwrap();
    assert_eq!(record.pot_total(), 4);
    assert_eq!(record.board.len(), 5);
    assert!(record.went_to_showdown());
    assert_eq!(record.deltas().iter().sum::<i64>(), 0);
    let final_stacks = stacks(&e);
    assert!(
        final_stacks == vec![102, 98]
            || final_stacks == vec![98, 102]
            || final_stacks == vec![100, 100]
    );
}

#[test]
fn test_fold_to_one_pays_small_blind_to_big_blind() {
    let mut e = heads_up(11);
    e.new_hand().unwrap();
    act(&mut e, &[Action::Fold]);
    assert_eq!(e.stage(), Stage::Complete);
    assert!(e.board().is_empty());
    assert_eq!(stacks(&e), vec![101, 99]);

    let record = e.last_settlement().unwrap();
    assert_eq!(record.winnings(0), 3);
    assert_eq!(record.awards.len(), 1);
    assert_eq!(record.awards[0].hand, None);
    assert!(!record.went_to_showdown());
}

#[test]
fn test_multiway_fold_to_big_blind() {
    let mut e = engine(TableConfig::new(3, 1000, 10, 20).with_seed(4));
    e.new_hand().unwrap();
    act(&mut e, &[Action::Fold, Action::Fold]);
    assert_eq!(stacks(&e), vec![1000, 990, 1010]);
}

#[test]
fn test_big_blind_keeps_option() {
    let mut e = engine(TableConfig::new(3, 1000, 10, 20).with_seed(9));
    e.new_hand().unwrap();
    act(&mut e, &[Action::Call, Action::Call]);
    // everyone matched, but the big blind has not acted yet
    assert_eq!(e.stage(), Stage::Preflop);
    assert_eq!(e.turn(), Some(2));
    assert_eq!(
        e.legal_actions(),
        vec![ActionKind::Fold, ActionKind::Check, ActionKind::Bet]
    );

    act(&mut e, &[Action::Bet(40)]);
    assert_eq!(e.current_bet(), 60);
    assert_eq!(e.last_aggressor(), 2);
    assert_eq!(e.turn(), Some(0));
    act(&mut e, &[Action::Call, Action::Call]);
    assert_eq!(e.stage(), Stage::Flop);
    assert_eq!(e.pot(), 180);
    assert_eq!(e.turn(), Some(1));
}

#[test]
fn test_raise_amount_is_on_top_of_call() {
    let mut e = engine(TableConfig::new(3, 1000, 10, 20).with_seed(6));
    e.new_hand().unwrap();
    act(&mut e, &[Action::Raise(50)]);
    let seat = &e.seats()[0];
    assert_eq!(seat.street_bet, 70);
    assert_eq!(seat.stack, 930);
    assert_eq!(e.current_bet(), 70);
    assert_eq!(e.to_call(1), 60);
}

#[test]
fn test_short_all_in_raise_keeps_bet() {
    let mut e = engine(TableConfig::with_stacks(vec![1000, 60, 1000], 10, 20).with_seed(13));
    e.new_hand().unwrap();
    act(&mut e, &[Action::Raise(80)]);
    assert_eq!(e.current_bet(), 100);

    // small blind has 50 behind and tries to raise
    act(&mut e, &[Action::Raise(100)]);
    let sb = &e.seats()[1];
    assert!(sb.all_in);
    assert_eq!(sb.street_bet, 60);
    assert_eq!(e.current_bet(), 100);
    assert_eq!(e.last_aggressor(), 0);
    assert_eq!(e.turn(), Some(2));

    act(&mut e, &[Action::Call]);
    // the original raiser already acted and is matched
    assert_eq!(e.stage(), Stage::Flop);
    assert_eq!(e.pot(), 260);
    assert_eq!(e.turn(), Some(2));
}

#[test]
fn test_short_call_goes_all_in() {
    let mut e = engine(TableConfig::with_stacks(vec![1000, 1000, 50], 10, 20).with_seed(21));
    e.new_hand().unwrap();
    act(&mut e, &[Action::Raise(180), Action::Fold, Action::Call]);
    let bb = &e.seats()[2];
    assert!(bb.all_in);
    assert_eq!(bb.total_committed, 50);
    assert_eq!(e.current_bet(), 0);
    // one seat left able to act: the board runs out to showdown
    assert_eq!(e.stage(), Stage::Complete);
    assert_eq!(e.board().len(), 5);
    assert_eq!(e.chip_total(), 2050);
    let record = e.last_settlement().unwrap();
    // layers: 10 from everyone, 40 more from seats 0 and 2, and the
    // unmatched 150 that only seat 0 can win
    let amounts: Vec<u32> = record.awards.iter().map(|a| a.amount).collect();
    assert_eq!(amounts, vec![30, 80, 150]);
    assert_eq!(record.awards[2].winners, vec![0]);
}

#[test]
fn test_three_way_all_in_builds_side_pots() {
    let mut e = engine(TableConfig::with_stacks(vec![98, 199, 202], 1, 2).with_seed(37));
    e.new_hand().unwrap();
    assert_eq!(e.turn(), Some(0));
    act(&mut e, &[Action::Raise(1000), Action::Raise(1000), Action::Raise(1000)]);

    assert_eq!(e.stage(), Stage::Complete);
    assert_eq!(e.board().len(), 5);
    assert_eq!(e.chip_total(), 499);
    let record = e.last_settlement().unwrap();
    let amounts: Vec<u32> = record.awards.iter().map(|a| a.amount).collect();
    assert_eq!(amounts, vec![294, 202, 3]);
    // nobody else covers the top 3 chips
    assert_eq!(record.awards[2].winners, vec![2]);
    assert!(!record.awards[2].returned);
    assert_eq!(record.final_stacks.iter().sum::<u32>(), 499);
    assert_eq!(record.deltas().iter().sum::<i64>(), 0);
}

#[test]
fn test_stacks_at_pot_limit_play_all_in() {
    let half = u32::MAX / 2;
    let mut e = engine(TableConfig::with_stacks(vec![half, half + 1], 1, 2).with_seed(43));
    e.new_hand().unwrap();
    act(&mut e, &[Action::Raise(u32::MAX), Action::Call]);
    assert_eq!(e.stage(), Stage::Complete);
    assert_eq!(e.chip_total(), u64::from(u32::MAX));
    let record = e.last_settlement().unwrap();
    let awarded: u64 = record.awards.iter().map(|a| u64::from(a.amount)).sum();
    assert_eq!(awarded, u64::from(u32::MAX));
}

#[test]
fn test_stacks_past_pot_limit_rejected() {
    for stacks in [vec![u32::MAX, u32::MAX], vec![u32::MAX, 1]] {
        let result = BettingEngine::standard(TableConfig::with_stacks(stacks, 1, 2));
        assert!(matches!(result, Err(HoldemError::IllegalConfiguration(_))));
    }
}

#[test]
fn test_all_in_preflop_runs_out_board() {
    let mut e = heads_up(17);
    e.new_hand().unwrap();
    act(&mut e, &[Action::Raise(1000), Action::Call]);
    assert_eq!(e.stage(), Stage::Complete);
    assert_eq!(e.board().len(), 5);
    assert_eq!(e.chip_total(), 200);
    let s = stacks(&e);
    assert!(s == vec![200, 0] || s == vec![0, 200] || s == vec![100, 100]);
}

#[test]
fn test_blinds_all_in_settle_immediately() {
    let mut e = engine(TableConfig::with_stacks(vec![100, 1], 1, 2).with_seed(19));
    e.new_hand().unwrap();
    assert_eq!(e.stage(), Stage::Complete);
    assert_eq!(e.board().len(), 5);
    assert_eq!(e.hands_played(), 1);
    assert_eq!(e.chip_total(), 101);
}

#[test]
fn test_check_facing_bet_rejected_without_change() {
    let mut e = engine(TableConfig::new(3, 1000, 10, 20).with_seed(8));
    e.new_hand().unwrap();
    let before: TableSnapshot = e.snapshot();
    assert!(matches!(
        e.apply_action(Action::Check),
        Err(HoldemError::InvalidAction(ActionRule::CheckFacingBet))
    ));
    assert!(matches!(
        e.apply_action(Action::Bet(40)),
        Err(HoldemError::InvalidAction(ActionRule::BetFacingBet))
    ));
    assert!(matches!(
        e.apply_action(Action::Raise(0)),
        Err(HoldemError::InvalidAction(ActionRule::NonPositiveAmount))
    ));
    assert_eq!(e.snapshot(), before);
}

#[test]
fn test_raise_without_bet_rejected() {
    let mut e = heads_up(31);
    e.new_hand().unwrap();
    act(&mut e, &[Action::Call]);
    // big blind option: nothing to call, so only a bet opens
    let before = e.snapshot();
    assert!(matches!(
        e.apply_action(Action::Raise(10)),
        Err(HoldemError::InvalidAction(ActionRule::RaiseWithoutBet))
    ));
    assert_eq!(e.snapshot(), before);
    assert!(!e.legal_actions().contains(&ActionKind::Raise));

    act(&mut e, &[Action::Bet(10), Action::Call]);
    assert_eq!(e.stage(), Stage::Flop);
    let first = e.turn().unwrap();
    assert!(matches!(
        e.apply_action(Action::Raise(5)),
        Err(HoldemError::InvalidAction(ActionRule::RaiseWithoutBet))
    ));
    act(&mut e, &[Action::Bet(5)]);
    let kinds: Vec<ActionKind> = e
        .current_record()
        .unwrap()
        .actions
        .iter()
        .filter(|a| a.seat == first && a.stage == Stage::Flop)
        .map(|a| a.kind)
        .collect();
    assert_eq!(kinds, vec![ActionKind::Bet]);
}

#[test]
fn test_zero_bet_rejected() {
    let mut e = heads_up(23);
    e.new_hand().unwrap();
    act(&mut e, &[Action::Call, Action::Check]);
    assert!(matches!(
        e.apply_action(Action::Bet(0)),
        Err(HoldemError::InvalidAction(ActionRule::NonPositiveAmount))
    ));
    act(&mut e, &[Action::Bet(10)]);
    assert_eq!(e.current_bet(), 10);
    assert_eq!(e.last_aggressor(), 1);
}

#[test]
fn test_action_after_hand_rejected() {
    let mut e = heads_up(29);
    assert!(matches!(
        e.apply_action(Action::Check),
        Err(HoldemError::InvalidAction(ActionRule::HandNotInProgress))
    ));
    e.new_hand().unwrap();
    act(&mut e, &[Action::Fold]);
    assert!(matches!(
        e.apply_action(Action::Call),
        Err(HoldemError::InvalidAction(ActionRule::HandNotInProgress))
    ));
}

#[test]
fn test_call_with_nothing_owed_moves_nothing() {
    let mut e = heads_up(31);
    e.new_hand().unwrap();
    act(&mut e, &[Action::Call, Action::Call]);
    assert_eq!(e.stage(), Stage::Flop);
    assert_eq!(e.pot(), 4);
}

#[test]
fn test_action_log_records_blinds_and_actions() {
    let mut e = engine(TableConfig::new(3, 1000, 10, 20).with_seed(37));
    e.new_hand().unwrap();
    act(&mut e, &[Action::Raise(40), Action::Fold, Action::Call]);
    let record = e.current_record().unwrap();
    let kinds: Vec<ActionKind> = record.actions.iter().map(|a| a.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ActionKind::Blind,
            ActionKind::Blind,
            ActionKind::Raise,
            ActionKind::Fold,
            ActionKind::Call
        ]
    );
    assert_eq!(record.actions[2].amount, 60);
    assert_eq!(record.actions[4].amount, 40);
    assert!(record.actions.iter().all(|a| a.stage == Stage::Preflop));
}

#[test]
fn test_busted_seat_sits_out() {
    let mut e = engine(TableConfig::with_stacks(vec![10, 1000, 1000], 1, 2).with_seed(41));
    for _ in 0..200 {
        if e.seats()[0].stack == 0 {
            break;
        }
        e.new_hand().unwrap();
        while let Some(turn) = e.turn() {
            let action = if turn == 0 && e.to_call(turn) > 0 {
                Action::Raise(1000)
            } else if turn == 0 {
                Action::Bet(1000)
            } else if e.to_call(turn) > 0 {
                Action::Call
            } else {
                Action::Check
            };
            e.apply_action(action).unwrap();
        }
    }
    assert_eq!(e.seats()[0].stack, 0);

    let dealt = e.new_hand().unwrap();
    assert_eq!(dealt.len(), 2);
    assert!(!dealt.contains_key(&0));
    assert!(e.seats()[0].folded);
    assert_eq!(e.seats()[0].hole_cards, None);
    assert_ne!(e.small_blind_seat(), 0);
    assert_ne!(e.big_blind_seat(), 0);
    assert_eq!(e.chip_total(), 2010);
}

#[test]
fn test_not_enough_players() {
    let mut e = heads_up(43);
    e.new_hand().unwrap();
    act(&mut e, &[Action::Raise(1000), Action::Call]);
    if stacks(&e).contains(&0) {
        assert!(matches!(e.new_hand(), Err(HoldemError::NotEnoughPlayers)));
    } else {
        assert!(e.new_hand().is_ok());
    }
}

#[test]
fn test_snapshot_serializes() {
    let mut e = engine(TableConfig::new(3, 1000, 10, 20).with_seed(47));
    e.new_hand().unwrap();
    act(&mut e, &[Action::Call]);
    let snapshot = e.snapshot();
    assert_eq!(snapshot.to_call(1), 10);
    assert_eq!(snapshot.live_seats(), vec![0, 1, 2]);
    let json = serde_json::to_string(&snapshot).unwrap();
    let back: TableSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(back, snapshot);
}

#[test]
fn test_hand_record_json() {
    let mut e = heads_up(53);
    e.new_hand().unwrap();
    act(&mut e, &[Action::Fold]);
    let json = e.last_settlement().unwrap().to_json().unwrap();
    assert!(json.contains("\"blind\""));
    assert!(json.contains("\"fold\""));
    assert!(json.contains("\"preflop\""));
}

#[test]
fn test_same_seed_same_cards() {
    let mut a = engine(TableConfig::new(6, 1000, 10, 20).with_seed(99));
    let mut b = engine(TableConfig::new(6, 1000, 10, 20).with_seed(99));
    assert_eq!(a.new_hand().unwrap(), b.new_hand().unwrap());
}

/// Plays random legal actions and checks the accounting after every step.
fn random_session(seed: u64, seats: usize) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let starting: Vec<u32> = (0..seats).map(|_| rng.gen_range(20..=400)).collect();
    let total: u64 = starting.iter().map(|&s| u64::from(s)).sum();
    let mut e = engine(TableConfig::with_stacks(starting, 2, 4).with_seed(seed));

    for _ in 0..12 {
        match e.new_hand() {
            Ok(_) => {}
            Err(HoldemError::NotEnoughPlayers) => break,
            Err(err) => panic!("new_hand failed: {}", err),
        }
        let mut steps = 0;
        while let Some(turn) = e.turn() {
            steps += 1;
            assert!(steps < 10_000, "hand did not terminate");
            let stage = e.stage();
            let legal = e.legal_actions();
            let kind = legal[rng.gen_range(0..legal.len())];
            let stack = e.seats()[turn].stack;
            let action = match kind {
                ActionKind::Fold => Action::Fold,
                ActionKind::Check => Action::Check,
                ActionKind::Call => Action::Call,
                ActionKind::Bet => Action::Bet(rng.gen_range(1..=stack)),
                ActionKind::Raise => Action::Raise(rng.gen_range(1..=stack)),
                ActionKind::Blind => unreachable!(),
            };
            e.apply_action(action).unwrap();

            assert_eq!(e.chip_total(), total);
            let committed: u32 = e.seats().iter().map(|s| s.total_committed).sum();
            if e.stage() != Stage::Complete {
                assert_eq!(e.pot(), committed);
            }
            if e.stage() != stage && e.stage() != Stage::Complete {
                // a closed street leaves every active seat level with the top contribution
                let top = e
                    .seats()
                    .iter()
                    .filter(|s| s.in_hand())
                    .map(|s| s.total_committed)
                    .max()
                    .unwrap();
                for s in e.seats().iter().filter(|s| s.can_act()) {
                    assert_eq!(s.total_committed, top);
                }
            }
        }

        assert_eq!(e.stage(), Stage::Complete);
        assert_eq!(e.pot(), 0);
        let record = e.last_settlement().unwrap();
        assert_eq!(record.deltas().iter().sum::<i64>(), 0);
        let mut cards: Vec<_> = record.hole_cards.values().flat_map(|h| h.iter().copied()).collect();
        cards.extend_from_slice(&record.board);
        assert!(card_mask(&cards).is_ok());
    }
}

#[test]
fn test_random_play_conserves_chips() {
    for seed in 0..40 {
        random_session(seed, 2 + (seed as usize % 5));
    }
}

#[test]
fn test_random_play_full_table() {
    for seed in 100..105 {
        random_session(seed, 9);
    }
}
