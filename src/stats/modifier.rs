//! Stat modifiers carried by items and effects, and clamped deltas from rule tables

use serde::{Deserialize, Serialize};

use crate::core::dice::Dice;
use crate::core::error::{ensure, Result};
use crate::stats::ids::StatId;

/// `(stat, raw, min, max)`: resolves to `random(min, max) + raw`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modifier {
    pub stat: StatId,
    #[serde(default)]
    pub raw: f64,
    #[serde(default)]
    pub min: i64,
    #[serde(default)]
    pub max: i64,
}

impl Modifier {
    /// Fixed modifier
    pub fn new(stat: impl Into<StatId>, raw: f64) -> Self {
        Self {
            stat: stat.into(),
            raw,
            min: 0,
            max: 0,
        }
    }

    /// Modifier with a random spread added to `raw`
    pub fn spread(stat: impl Into<StatId>, raw: f64, min: i64, max: i64) -> Result<Self> {
        let modifier = Self {
            stat: stat.into(),
            raw,
            min,
            max,
        };
        modifier.validate()?;
        Ok(modifier)
    }

    pub fn validate(&self) -> Result<()> {
        ensure(
            self.min <= self.max,
            format!(
                "modifier on {} has min ({}) greater than max ({})",
                self.stat, self.min, self.max
            ),
        )
    }

    pub fn is_random(&self) -> bool {
        self.min < self.max
    }

    /// Concrete delta; only spread modifiers consume a roll
    pub fn resolve(&self, dice: &mut dyn Dice) -> f64 {
        let spread = if self.is_random() {
            dice.range(self.min, self.max)
        } else {
            self.min
        };
        self.raw + spread as f64
    }
}

/// Table entry: add `value`, then clamp to the optional bounds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatDelta {
    pub stat: StatId,
    pub value: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl StatDelta {
    pub const fn new(stat: StatId, value: f64) -> Self {
        Self {
            stat,
            value,
            min: None,
            max: None,
        }
    }

    pub const fn at_least(stat: StatId, value: f64, min: f64) -> Self {
        Self {
            stat,
            value,
            min: Some(min),
            max: None,
        }
    }
}
