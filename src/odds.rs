use crate::error::{HoldemError, HoldemResult};

fn check_equity(equity: f64) -> HoldemResult<()> {
    if !(0.0..=1.0).contains(&equity) {
        return Err(HoldemError::InvalidValue(format!(
            "Equity must be between 0 and 1, got {}",
            equity
        )));
    }
    Ok(())
}

/// Share of the final pot a call has to win to break even:
/// `to_call / (pot + to_call)`, where `pot` already holds the bet faced.
pub fn pot_odds(pot: u32, to_call: u32) -> HoldemResult<f64> {
    if to_call == 0 {
        return Err(HoldemError::InvalidValue(
            "Nothing to call".to_string(),
        ));
    }
    Ok(f64::from(to_call) / (f64::from(pot) + f64::from(to_call)))
}

/// Chip EV of calling relative to folding.
pub fn call_ev(equity: f64, pot: u32, to_call: u32) -> HoldemResult<f64> {
    check_equity(equity)?;
    let pot = f64::from(pot);
    let to_call = f64::from(to_call);
    Ok(equity * pot - (1.0 - equity) * to_call)
}

/// Chip EV of moving all-in for `shove` more chips when opponents fold with
/// probability `fold_pct` and otherwise call and play for `equity`.
pub fn shove_ev(equity: f64, pot: u32, shove: u32, fold_pct: f64) -> HoldemResult<f64> {
    check_equity(equity)?;
    if !(0.0..=1.0).contains(&fold_pct) {
        return Err(HoldemError::InvalidValue(format!(
            "Fold probability must be between 0 and 1, got {}",
            fold_pct
        )));
    }
    let pot = f64::from(pot);
    let shove = f64::from(shove);
    let called = equity * (pot + shove) - (1.0 - equity) * shove;
    Ok(fold_pct * pot + (1.0 - fold_pct) * called)
}

/// Fold frequency that makes a pure bluff of `bet` into `pot` break even.
pub fn break_even_fold_pct(pot: u32, bet: u32) -> HoldemResult<f64> {
    if pot == 0 && bet == 0 {
        return Err(HoldemError::InvalidValue(
            "Pot and bet cannot both be empty".to_string(),
        ));
    }
    Ok(f64::from(bet) / (f64::from(pot) + f64::from(bet)))
}

/// Second-largest stack: the most that can change hands.
pub fn effective_stack(stacks: &[u32]) -> HoldemResult<u32> {
    if stacks.len() < 2 {
        return Err(HoldemError::InvalidValue(
            "Need at least 2 stacks".to_string(),
        ));
    }
    let mut sorted = stacks.to_vec();
    sorted.sort_unstable();
    Ok(sorted[sorted.len() - 2])
}

/// Stack-to-pot ratio.
pub fn spr(stack: u32, pot: u32) -> HoldemResult<f64> {
    if pot == 0 {
        return Err(HoldemError::InvalidValue("Pot must be positive".to_string()));
    }
    Ok(f64::from(stack) / f64::from(pot))
}
