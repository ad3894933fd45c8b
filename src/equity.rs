use std::cmp::Ordering;
use std::fmt;
use std::time::{Duration, Instant};

use log::{debug, trace};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::cards::{card_mask, Card, Deck, HoleCards};
use crate::config::EstimatorConfig;
use crate::error::{HoldemError, HoldemResult};
use crate::hand_evaluator::{HandEvaluator, HandStrength, StandardEvaluator};
use crate::ranges::{sample_combo, HandRange};

const DEFAULT_CHUNK_SIZE: usize = 250;
const MAX_DEAL_ATTEMPTS: usize = 1000;

/// Who the hero is up against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Opponents {
    /// This many opponents holding any two unseen cards
    Random(usize),
    /// One opponent per range
    Ranges(Vec<HandRange>),
}

impl Opponents {
    pub fn count(&self) -> usize {
        match self {
            Opponents::Random(n) => *n,
            Opponents::Ranges(ranges) => ranges.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquityRequest {
    pub hero: HoleCards,
    /// Known board cards, 0 to 5
    pub board: Vec<Card>,
    pub opponents: Opponents,
    pub iterations: usize,
    /// Fixes the rollouts; a random seed is drawn when absent
    pub seed: Option<u64>,
    pub time_budget: Option<Duration>,
}

impl EquityRequest {
    pub fn new(hero: HoleCards, opponents: Opponents) -> Self {
        Self {
            hero,
            board: Vec::new(),
            opponents,
            iterations: EstimatorConfig::default().iterations,
            seed: None,
            time_budget: None,
        }
    }

    pub fn with_board(mut self, board: &[Card]) -> Self {
        self.board = board.to_vec();
        self
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = Some(budget);
        self
    }
}

/// Win/tie/loss counts over the completed rollouts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquityResult {
    pub wins: u64,
    pub ties: u64,
    pub losses: u64,
    pub iterations: u64,
}

impl EquityResult {
    fn record(&mut self, outcome: Ordering) {
        match outcome {
            Ordering::Greater => self.wins += 1,
            Ordering::Equal => self.ties += 1,
            Ordering::Less => self.losses += 1,
        }
        self.iterations += 1;
    }

    fn merge(self, other: EquityResult) -> EquityResult {
        EquityResult {
            wins: self.wins + other.wins,
            ties: self.ties + other.ties,
            losses: self.losses + other.losses,
            iterations: self.iterations + other.iterations,
        }
    }

    fn ratio(&self, count: u64) -> f64 {
        if self.iterations == 0 {
            return 0.0;
        }
        count as f64 / self.iterations as f64
    }

    pub fn win(&self) -> f64 {
        self.ratio(self.wins)
    }

    pub fn tie(&self) -> f64 {
        self.ratio(self.ties)
    }

    pub fn lose(&self) -> f64 {
        self.ratio(self.losses)
    }

    pub fn equity(&self) -> f64 {
        self.win() + self.tie() / 2.0
    }
}

impl fmt::Display for EquityResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Win {:.1}% | Tie {:.1}% | Lose {:.1}% (equity: {:.1}%)",
            self.win() * 100.0,
            self.tie() * 100.0,
            self.lose() * 100.0,
            self.equity() * 100.0,
        )
    }
}

/// Everything one rollout needs, resolved once per request.
struct RolloutContext<'a> {
    hero: HoleCards,
    board: &'a [Card],
    dead_mask: u64,
    /// Live combos per ranged opponent
    ranges: Vec<Vec<HoleCards>>,
    random_opponents: usize,
    /// Unseen cards, in a fixed order
    stub: Vec<Card>,
}

/// Monte Carlo equity over random board run-outs.
///
/// Rollouts are split into fixed-size chunks run on the rayon pool. Chunk `i`
/// draws from stream `i` of a ChaCha generator seeded with the request seed,
/// so a seeded estimate is reproducible whatever the thread count.
pub struct EquityEstimator<E: HandEvaluator = StandardEvaluator> {
    evaluator: E,
    chunk_size: usize,
}

impl EquityEstimator<StandardEvaluator> {
    pub fn standard() -> Self {
        EquityEstimator::new(StandardEvaluator)
    }
}

impl<E: HandEvaluator> EquityEstimator<E> {
    pub fn new(evaluator: E) -> Self {
        Self {
            evaluator,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn from_config(evaluator: E, config: &EstimatorConfig) -> HoldemResult<Self> {
        config.validate()?;
        Ok(Self::new(evaluator).with_chunk_size(config.chunk_size))
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn estimate(&self, request: &EquityRequest) -> HoldemResult<EquityResult> {
        let context = self.prepare(request)?;
        let seed = request.seed.unwrap_or_else(rand::random);
        let deadline = request.time_budget.map(|budget| Instant::now() + budget);

        let tallies: Vec<EquityResult> = self
            .chunks(request.iterations)
            .into_par_iter()
            .enumerate()
            .map(|(index, size)| -> HoldemResult<EquityResult> {
                let mut rng = chunk_rng(seed, index);
                let mut tally = EquityResult::default();
                for _ in 0..size {
                    if deadline.is_some_and(|d| Instant::now() >= d) {
                        break;
                    }
                    tally.record(self.rollout(&context, &mut rng)?);
                }
                trace!("chunk {}: {} of {} rollouts", index, tally.iterations, size);
                Ok(tally)
            })
            .collect::<HoldemResult<_>>()?;

        let total = tallies
            .into_iter()
            .fold(EquityResult::default(), EquityResult::merge);
        if total.iterations == 0 {
            return Err(HoldemError::InsufficientData);
        }
        debug!(
            "{}{} vs {} opponents: {}",
            request.hero[0],
            request.hero[1],
            request.opponents.count(),
            total
        );
        Ok(total)
    }

    /// Hero equity against `opponents` random hands.
    pub fn hand_strength(
        &self,
        hero: HoleCards,
        board: &[Card],
        opponents: usize,
        iterations: usize,
        seed: Option<u64>,
    ) -> HoldemResult<f64> {
        let mut request = EquityRequest::new(hero, Opponents::Random(opponents))
            .with_board(board)
            .with_iterations(iterations);
        request.seed = seed;
        Ok(self.estimate(&request)?.equity())
    }

    /// Share of the pot each range wins, in input order. Every rollout deals
    /// each player a combo from their own range; a tie splits the point.
    pub fn range_equities(
        &self,
        ranges: &[HandRange],
        board: &[Card],
        iterations: usize,
        seed: Option<u64>,
    ) -> HoldemResult<Vec<f64>> {
        if ranges.len() < 2 {
            return Err(HoldemError::InvalidValue(
                "Need at least 2 ranges".to_string(),
            ));
        }
        if iterations == 0 {
            return Err(HoldemError::InvalidValue(
                "Iterations must be positive".to_string(),
            ));
        }
        if board.len() > 5 {
            return Err(HoldemError::InvalidBoardSize(board.len()));
        }
        if 5 + 2 * ranges.len() > 52 {
            return Err(HoldemError::IllegalConfiguration(format!(
                "{} ranges need {} cards, the deck has 52",
                ranges.len(),
                5 + 2 * ranges.len()
            )));
        }
        let dead_mask = card_mask(board).map_err(HoldemError::DuplicateCard)?;
        let live: Vec<Vec<HoleCards>> = ranges.iter().map(|r| r.live_combos(dead_mask)).collect();
        if live.iter().any(|combos| combos.is_empty()) {
            return Err(HoldemError::NoValidCombos);
        }
        let stub = Deck::without(board).cards().to_vec();
        let seed = seed.unwrap_or_else(rand::random);
        let players = ranges.len();

        let shares: Vec<(Vec<f64>, u64)> = self
            .chunks(iterations)
            .into_par_iter()
            .enumerate()
            .map(|(index, size)| -> HoldemResult<(Vec<f64>, u64)> {
                let mut rng = chunk_rng(seed, index);
                let mut points = vec![0.0; players];
                let mut strengths = Vec::with_capacity(players);
                let mut cards = Vec::with_capacity(7);
                for _ in 0..size {
                    let (hands, used) = deal_from_ranges(&live, dead_mask, &mut rng)?;
                    let mut runout: Vec<Card> =
                        stub.iter().filter(|c| used & c.mask() == 0).copied().collect();
                    let needed = 5 - board.len();
                    let (drawn, _) = runout.partial_shuffle(&mut rng, needed);

                    strengths.clear();
                    for hole in &hands {
                        cards.clear();
                        cards.extend_from_slice(hole);
                        cards.extend_from_slice(board);
                        cards.extend_from_slice(drawn);
                        strengths.push(self.evaluator.evaluate(&cards)?);
                    }
                    let best = strengths.iter().copied().max();
                    let winners: Vec<usize> = (0..players)
                        .filter(|&i| Some(strengths[i]) == best)
                        .collect();
                    let share = 1.0 / winners.len() as f64;
                    for i in winners {
                        points[i] += share;
                    }
                }
                Ok((points, size as u64))
            })
            .collect::<HoldemResult<_>>()?;

        let mut totals = vec![0.0; players];
        let mut completed = 0u64;
        for (points, size) in shares {
            for (total, p) in totals.iter_mut().zip(points) {
                *total += p;
            }
            completed += size;
        }
        Ok(totals.into_iter().map(|t| t / completed as f64).collect())
    }

    fn prepare<'a>(&self, request: &'a EquityRequest) -> HoldemResult<RolloutContext<'a>> {
        if request.board.len() > 5 {
            return Err(HoldemError::InvalidBoardSize(request.board.len()));
        }
        let mut known = request.hero.to_vec();
        known.extend_from_slice(&request.board);
        let dead_mask = card_mask(&known).map_err(HoldemError::DuplicateCard)?;

        let opponents = request.opponents.count();
        if opponents == 0 {
            return Err(HoldemError::InvalidValue(
                "Need at least 1 opponent".to_string(),
            ));
        }
        if request.iterations == 0 {
            return Err(HoldemError::InvalidValue(
                "Iterations must be positive".to_string(),
            ));
        }
        // hero, full board, two cards per opponent
        let needed = 7 + 2 * opponents;
        if needed > 52 {
            return Err(HoldemError::IllegalConfiguration(format!(
                "{} opponents need {} cards, the deck has 52",
                opponents, needed
            )));
        }

        let (ranges, random_opponents) = match &request.opponents {
            Opponents::Random(n) => (Vec::new(), *n),
            Opponents::Ranges(ranges) => {
                let live: Vec<Vec<HoleCards>> =
                    ranges.iter().map(|r| r.live_combos(dead_mask)).collect();
                if live.iter().any(|combos| combos.is_empty()) {
                    return Err(HoldemError::NoValidCombos);
                }
                (live, 0)
            }
        };

        Ok(RolloutContext {
            hero: request.hero,
            board: &request.board,
            dead_mask,
            ranges,
            random_opponents,
            stub: Deck::without(&known).cards().to_vec(),
        })
    }

    /// Sizes of the work units for `iterations` rollouts.
    fn chunks(&self, iterations: usize) -> Vec<usize> {
        let full = iterations / self.chunk_size;
        let mut sizes = vec![self.chunk_size; full];
        if iterations % self.chunk_size > 0 {
            sizes.push(iterations % self.chunk_size);
        }
        sizes
    }

    /// Plays one run-out and compares hero with the best opponent.
    fn rollout<R: Rng + ?Sized>(
        &self,
        context: &RolloutContext<'_>,
        rng: &mut R,
    ) -> HoldemResult<Ordering> {
        let mut used = context.dead_mask;
        let mut opponents: Vec<HoleCards> =
            Vec::with_capacity(context.ranges.len() + context.random_opponents);
        for combos in &context.ranges {
            let hole = sample_combo(combos, used, rng).ok_or(HoldemError::NoValidCombos)?;
            used |= hole[0].mask() | hole[1].mask();
            opponents.push(hole);
        }

        let mut deck: Vec<Card> = context
            .stub
            .iter()
            .filter(|c| used & c.mask() == 0)
            .copied()
            .collect();
        let missing = 5 - context.board.len();
        let (drawn, _) = deck.partial_shuffle(rng, missing + 2 * context.random_opponents);

        let mut board: Vec<Card> = Vec::with_capacity(5);
        board.extend_from_slice(context.board);
        board.extend_from_slice(&drawn[..missing]);
        for pair in drawn[missing..].chunks_exact(2) {
            opponents.push([pair[0], pair[1]]);
        }

        let hero = self.strength(&context.hero, &board)?;
        let mut best: Option<HandStrength> = None;
        for hole in &opponents {
            let strength = self.strength(hole, &board)?;
            best = best.max(Some(strength));
        }
        Ok(best.map_or(Ordering::Greater, |villain| hero.cmp(&villain)))
    }

    fn strength(&self, hole: &HoleCards, board: &[Card]) -> HoldemResult<HandStrength> {
        let mut cards = Vec::with_capacity(7);
        cards.extend_from_slice(hole);
        cards.extend_from_slice(board);
        self.evaluator.evaluate(&cards)
    }
}

fn chunk_rng(seed: u64, index: usize) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(index as u64);
    rng
}

/// Deals one combo per range with no shared cards. On a collision the whole
/// deal is redrawn, so every compatible assignment is equally likely.
fn deal_from_ranges<R: Rng + ?Sized>(
    live: &[Vec<HoleCards>],
    dead_mask: u64,
    rng: &mut R,
) -> HoldemResult<(Vec<HoleCards>, u64)> {
    'attempt: for _ in 0..MAX_DEAL_ATTEMPTS {
        let mut used = dead_mask;
        let mut hands = Vec::with_capacity(live.len());
        for combos in live {
            let hole = combos[rng.gen_range(0..combos.len())];
            let mask = hole[0].mask() | hole[1].mask();
            if used & mask != 0 {
                continue 'attempt;
            }
            used |= mask;
            hands.push(hole);
        }
        return Ok((hands, used));
    }
    Err(HoldemError::NoValidCombos)
}
