//! Injectable randomness for every roll the rules make
//!
//! Every random decision (hit rolls, damage spread, body part, activation chances)
//! goes through [`Dice`], so a seeded or scripted source reproduces a whole fight.

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Source of uniform integer rolls
pub trait Dice {
    /// Uniform integer in `[min, max]` (both inclusive). Returns `min` when `max <= min`.
    fn range(&mut self, min: i64, max: i64) -> i64;

    /// Percentile roll, 1-100
    fn d100(&mut self) -> i64 {
        self.range(1, 100)
    }

    /// Attribute roll, 1-10
    fn d10(&mut self) -> i64 {
        self.range(1, 10)
    }

    /// Index into a non-empty slice of `len` elements
    fn pick(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.range(0, len as i64 - 1) as usize
    }
}

/// Deterministic dice backed by ChaCha8
#[derive(Debug, Clone)]
pub struct SeededDice {
    rng: ChaCha8Rng,
}

impl SeededDice {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Dice for SeededDice {
    fn range(&mut self, min: i64, max: i64) -> i64 {
        if max <= min {
            return min;
        }
        self.rng.gen_range(min..=max)
    }
}

/// Dice replaying a fixed script of results
///
/// Each call consumes the next scripted value, clamped into the requested range.
/// Once the script runs dry every roll returns the range minimum.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDice {
    script: VecDeque<i64>,
    rolled: usize,
}

impl ScriptedDice {
    pub fn new(script: impl IntoIterator<Item = i64>) -> Self {
        Self {
            script: script.into_iter().collect(),
            rolled: 0,
        }
    }

    /// Number of rolls made so far
    pub fn rolled(&self) -> usize {
        self.rolled
    }

    /// Scripted values not consumed yet
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl Dice for ScriptedDice {
    fn range(&mut self, min: i64, max: i64) -> i64 {
        self.rolled += 1;
        let value = self.script.pop_front().unwrap_or(min);
        if max <= min {
            return min;
        }
        value.clamp(min, max)
    }
}
