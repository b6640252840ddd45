//! # Injectable Randomness and Time
//!
//! The simulator draws every random number through [`RandomSource`] and reads
//! time through [`Clock`], so tests can replay exact sequences.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Uniform random source
pub trait RandomSource {
    /// Uniform draw in `[min, max)`
    fn uniform(&mut self, min: f64, max: f64) -> f64;
}

/// `StdRng` backed source, reproducible when seeded
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    /// Random seed for reproducibility (None = entropy)
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }
}

impl RandomSource for SeededRandom {
    fn uniform(&mut self, min: f64, max: f64) -> f64 {
        if max <= min {
            return min;
        }
        self.rng.gen_range(min..max)
    }
}

/// Replays a fixed list of unit fractions, cycling when exhausted.
///
/// Each fraction `u` in `[0, 1)` is mapped to `min + u * (max - min)`.
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    fractions: Vec<f64>,
    cursor: usize,
}

impl ScriptedRandom {
    pub fn new(fractions: impl Into<Vec<f64>>) -> Self {
        Self {
            fractions: fractions.into(),
            cursor: 0,
        }
    }

    /// Number of draws taken so far
    pub fn draws(&self) -> usize {
        self.cursor
    }
}

impl RandomSource for ScriptedRandom {
    fn uniform(&mut self, min: f64, max: f64) -> f64 {
        if self.fractions.is_empty() {
            return min;
        }
        let u = self.fractions[self.cursor % self.fractions.len()].clamp(0.0, 1.0);
        self.cursor += 1;
        min + u * (max - min)
    }
}

/// Source of timestamps for new measurements and alerts
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always returns the same instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
