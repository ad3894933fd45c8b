//! Table and estimator settings.
//!
//! Both structs deserialize from JSON with every field optional; missing
//! fields take the defaults below.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{HoldemError, HoldemResult};

/// Two hole cards per seat plus five board cards and three burns must fit in one deck.
pub const MAX_SEATS: usize = 22;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    #[serde(alias = "num_players")]
    pub seats: usize,
    pub starting_stack: u32,
    #[serde(alias = "sb_amt")]
    pub small_blind: u32,
    #[serde(alias = "bb_amt")]
    pub big_blind: u32,
    /// Per-seat starting stacks; overrides `starting_stack` when present
    pub stacks: Option<Vec<u32>>,
    /// Shuffle seed; a random seed is drawn when absent
    pub seed: Option<u64>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            seats: 6,
            starting_stack: 1000,
            small_blind: 10,
            big_blind: 20,
            stacks: None,
            seed: None,
        }
    }
}

impl TableConfig {
    pub fn new(seats: usize, starting_stack: u32, small_blind: u32, big_blind: u32) -> Self {
        Self {
            seats,
            starting_stack,
            small_blind,
            big_blind,
            ..Self::default()
        }
    }

    pub fn heads_up(starting_stack: u32, small_blind: u32, big_blind: u32) -> Self {
        Self::new(2, starting_stack, small_blind, big_blind)
    }

    /// One seat per entry in `stacks`.
    pub fn with_stacks(stacks: Vec<u32>, small_blind: u32, big_blind: u32) -> Self {
        Self {
            seats: stacks.len(),
            starting_stack: stacks.iter().copied().max().unwrap_or(0),
            small_blind,
            big_blind,
            stacks: Some(stacks),
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn initial_stacks(&self) -> Vec<u32> {
        match &self.stacks {
            Some(stacks) => stacks.clone(),
            None => vec![self.starting_stack; self.seats],
        }
    }

    pub fn validate(&self) -> HoldemResult<()> {
        let illegal = |msg: String| Err(HoldemError::IllegalConfiguration(msg));
        if self.seats < 2 {
            return illegal(format!("need at least 2 seats, got {}", self.seats));
        }
        if self.seats > MAX_SEATS {
            return illegal(format!("at most {} seats fit one deck, got {}", MAX_SEATS, self.seats));
        }
        if self.small_blind == 0 || self.big_blind == 0 {
            return illegal("blinds must be positive".to_string());
        }
        if self.small_blind > self.big_blind {
            return illegal(format!(
                "small blind {} exceeds big blind {}",
                self.small_blind, self.big_blind
            ));
        }
        match &self.stacks {
            Some(stacks) if stacks.len() != self.seats => {
                return illegal(format!(
                    "{} stacks given for {} seats",
                    stacks.len(),
                    self.seats
                ))
            }
            Some(stacks) if stacks.iter().any(|&s| s == 0) => {
                return illegal("starting stacks must be positive".to_string())
            }
            None if self.starting_stack == 0 => {
                return illegal("starting stack must be positive".to_string())
            }
            _ => {}
        }
        // the pot and every side pot are counted in u32
        let total: u64 = self.initial_stacks().iter().map(|&s| u64::from(s)).sum();
        if total > u64::from(u32::MAX) {
            return illegal(format!(
                "{} chips on the table, at most {} fit one pot",
                total,
                u32::MAX
            ));
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> HoldemResult<Self> {
        let config: TableConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> HoldemResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    /// Rollouts per estimate
    pub iterations: usize,
    /// Rollouts per parallel work unit; each unit owns one RNG stream
    pub chunk_size: usize,
    pub time_budget_ms: Option<u64>,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            iterations: 1000,
            chunk_size: 250,
            time_budget_ms: None,
        }
    }
}

impl EstimatorConfig {
    pub fn time_budget(&self) -> Option<Duration> {
        self.time_budget_ms.map(Duration::from_millis)
    }

    pub fn validate(&self) -> HoldemResult<()> {
        if self.iterations == 0 {
            return Err(HoldemError::InvalidValue("iterations must be positive".to_string()));
        }
        if self.chunk_size == 0 {
            return Err(HoldemError::InvalidValue("chunk size must be positive".to_string()));
        }
        Ok(())
    }
}
