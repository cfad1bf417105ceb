//! Dense `StatId -> value` lookup table

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::error::RulesError;
use crate::stats::ids::{Leveled, Protection, Secondary, Skill, Special, StatId, EDITABLE_STAT_COUNT};
use crate::stats::race::Race;

/// Value of every editable stat
///
/// Serialized as a map of stat codes, omitting zeroes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "BTreeMap<String, f64>", try_from = "BTreeMap<String, f64>")]
pub struct StatBlock {
    values: Vec<f64>,
}

impl Default for StatBlock {
    fn default() -> Self {
        Self {
            values: vec![0.0; EDITABLE_STAT_COUNT],
        }
    }
}

impl StatBlock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of an editable stat; general stats read as zero
    pub fn get(&self, stat: impl Into<StatId>) -> f64 {
        let stat: StatId = stat.into();
        stat.index().map(|i| self.values[i]).unwrap_or(0.0)
    }

    pub fn set(&mut self, stat: impl Into<StatId>, value: f64) {
        let stat: StatId = stat.into();
        if let Some(i) = stat.index() {
            self.values[i] = value;
        }
    }

    pub fn add(&mut self, stat: impl Into<StatId>, delta: f64) {
        let stat: StatId = stat.into();
        if let Some(i) = stat.index() {
            self.values[i] += delta;
        }
    }

    /// Builder-style setter
    pub fn with(mut self, stat: impl Into<StatId>, value: f64) -> Self {
        self.set(stat, value);
        self
    }

    /// Add `delta` and clamp the result
    ///
    /// Bounds come from `min`/`max` when given, else from the racial template,
    /// else from the stat's natural floor.
    pub fn change(
        &mut self,
        stat: StatId,
        delta: f64,
        min: Option<f64>,
        max: Option<f64>,
        race: Race,
    ) -> f64 {
        let Some(i) = stat.index() else {
            return 0.0;
        };
        let racial = race.entry(stat);
        let lo = min
            .or_else(|| racial.and_then(|e| e.min))
            .or_else(|| stat.floor())
            .unwrap_or(f64::NEG_INFINITY);
        let hi = max
            .or_else(|| racial.and_then(|e| e.max))
            .unwrap_or(f64::INFINITY);
        let value = (self.values[i] + delta).max(lo).min(hi);
        self.values[i] = value;
        value
    }

    pub fn iter(&self) -> impl Iterator<Item = (StatId, f64)> + '_ {
        StatId::editable()
            .into_iter()
            .zip(self.values.iter().copied())
    }

    // Typed shortcuts used all over the rules

    pub fn special(&self, special: Special) -> f64 {
        self.get(special)
    }

    pub fn skill(&self, skill: Skill) -> f64 {
        self.get(skill)
    }

    pub fn secondary(&self, secondary: Secondary) -> f64 {
        self.get(secondary)
    }

    pub fn leveled(&self, leveled: Leveled) -> f64 {
        self.get(leveled)
    }

    pub fn resistance(&self, kind: Protection) -> f64 {
        self.get(StatId::Resistance(kind))
    }

    pub fn threshold(&self, kind: Protection) -> f64 {
        self.get(StatId::Threshold(kind))
    }
}

impl From<StatBlock> for BTreeMap<String, f64> {
    fn from(block: StatBlock) -> Self {
        block
            .iter()
            .filter(|(_, value)| *value != 0.0)
            .map(|(stat, value)| (stat.to_string(), value))
            .collect()
    }
}

impl TryFrom<BTreeMap<String, f64>> for StatBlock {
    type Error = RulesError;

    fn try_from(map: BTreeMap<String, f64>) -> Result<Self, Self::Error> {
        let mut block = StatBlock::default();
        for (code, value) in map {
            let stat: StatId = code.parse()?;
            if !stat.is_editable() {
                return Err(RulesError::violation(format!(
                    "'{code}' is not an editable stat"
                )));
            }
            block.set(stat, value);
        }
        Ok(block)
    }
}
