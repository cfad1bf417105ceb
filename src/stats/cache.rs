//! Caller-owned cache of derived statistics

use std::collections::hash_map::Entry;

use ahash::AHashMap;

use crate::core::dice::Dice;
use crate::core::error::Result;
use crate::core::types::CharacterId;
use crate::effects::effect::ActiveEffect;
use crate::entity::character::Character;
use crate::stats::calculator::{DerivedStats, StatsCalculator};

/// Derived stats keyed by character, valid until invalidated
///
/// Anything that changes a character's inputs (equipment, effects, needs,
/// level) must be followed by [`StatsCache::invalidate`].
#[derive(Debug, Default)]
pub struct StatsCache {
    entries: AHashMap<CharacterId, DerivedStats>,
}

impl StatsCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: CharacterId) -> Option<&DerivedStats> {
        self.entries.get(&id)
    }

    /// Cached stats, computing them on a miss
    pub fn get_or_compute(
        &mut self,
        calculator: &StatsCalculator<'_>,
        character: &Character,
        campaign_effects: &[ActiveEffect],
        dice: &mut dyn Dice,
    ) -> Result<&DerivedStats> {
        match self.entries.entry(character.id) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let stats = calculator.compute(character, campaign_effects, dice)?;
                Ok(entry.insert(stats))
            }
        }
    }

    pub fn invalidate(&mut self, id: CharacterId) {
        self.entries.remove(&id);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::RulesConfig;
    use crate::core::dice::ScriptedDice;
    use crate::rules::loader::Catalog;
    use crate::stats::ids::{Secondary, Special};
    use crate::stats::race::Race;

    #[test]
    fn test_cache_hit_until_invalidated() {
        let config = RulesConfig::default();
        let catalog = Catalog::new();
        let calculator = StatsCalculator::new(&config, &catalog);
        let mut dice = ScriptedDice::new([]);
        let mut cache = StatsCache::new();

        let mut character = Character::new("Cached", Race::Human);
        let first = cache
            .get_or_compute(&calculator, &character, &[], &mut dice)
            .unwrap()
            .secondary(Secondary::MaxHealth);
        assert_eq!(first, 30.0);

        character.base.set(Special::Strength, 8.0);
        let stale = cache
            .get_or_compute(&calculator, &character, &[], &mut dice)
            .unwrap()
            .secondary(Secondary::MaxHealth);
        assert_eq!(stale, 30.0);

        cache.invalidate(character.id);
        assert!(cache.is_empty());
        let fresh = cache
            .get_or_compute(&calculator, &character, &[], &mut dice)
            .unwrap()
            .secondary(Secondary::MaxHealth);
        assert_eq!(fresh, 33.0);
    }
}
