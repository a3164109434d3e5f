//! Level generators for new skip-list nodes.
//!
//! Node heights are drawn from a geometric distribution: start at 1 and keep
//! promoting with probability `p` until a draw fails or the cap is reached.
//! The generator sits behind [`LevelGenerator`] so tests can pin exact heights.

use crate::config::SkipListConfig;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;

/// Source of node heights. Returned levels must lie in `1..=max_level()`.
pub trait LevelGenerator: fmt::Debug + Send + Sync {
    /// Draw the height for the next inserted node.
    fn next_level(&mut self) -> usize;

    /// Upper bound on any level this generator returns.
    fn max_level(&self) -> usize;
}

/// Geometric level generator backed by a seedable `StdRng`.
pub struct RandomLevel {
    rng: StdRng,
    probability: f64,
    max_level: usize,
}

impl RandomLevel {
    /// Creates a generator seeded from OS entropy.
    pub fn new(probability: f64, max_level: usize) -> Self {
        Self::with_rng(StdRng::from_entropy(), probability, max_level)
    }

    /// Creates a deterministic generator: equal seeds yield equal level sequences.
    pub fn seeded(seed: u64, probability: f64, max_level: usize) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed), probability, max_level)
    }

    /// Builds the generator described by a (validated) config.
    pub fn from_config(config: &SkipListConfig) -> Self {
        match config.seed {
            Some(seed) => Self::seeded(seed, config.probability, config.max_level),
            None => Self::new(config.probability, config.max_level),
        }
    }

    fn with_rng(rng: StdRng, probability: f64, max_level: usize) -> Self {
        Self {
            rng,
            probability,
            max_level: max_level.max(1),
        }
    }
}

impl fmt::Debug for RandomLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RandomLevel")
            .field("probability", &self.probability)
            .field("max_level", &self.max_level)
            .finish_non_exhaustive()
    }
}

impl LevelGenerator for RandomLevel {
    fn next_level(&mut self) -> usize {
        let mut level = 1;
        while level < self.max_level && self.rng.gen::<f64>() < self.probability {
            level += 1;
        }
        level
    }

    fn max_level(&self) -> usize {
        self.max_level
    }
}

/// Replays a fixed sequence of heights, cycling when exhausted.
///
/// Gives reproducible node layouts, e.g. for asserting exact spans.
#[derive(Debug, Clone)]
pub struct SequenceLevels {
    levels: Vec<usize>,
    pos: usize,
    max_level: usize,
}

impl SequenceLevels {
    /// `levels` must be non-empty; each entry is clamped into `1..=max_level`.
    pub fn new(levels: Vec<usize>, max_level: usize) -> Self {
        let max_level = max_level.max(1);
        let levels = if levels.is_empty() { vec![1] } else { levels };
        Self {
            levels,
            pos: 0,
            max_level,
        }
    }
}

impl LevelGenerator for SequenceLevels {
    fn next_level(&mut self) -> usize {
        let level = self.levels[self.pos % self.levels.len()];
        self.pos += 1;
        level.clamp(1, self.max_level)
    }

    fn max_level(&self) -> usize {
        self.max_level
    }
}
