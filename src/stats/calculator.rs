//! Derived statistics of a character
//!
//! The pipeline runs in a fixed order:
//! 1. base values from the character sheet
//! 2. racial template (bonus, then racial bounds)
//! 3. tag skill bonus
//! 4. formula table on the values so far, giving the "base" view
//! 5. survival need tiers
//! 6. modifiers of equipped items, character effects, campaign effects
//! 7. carry weight from the modified strength, then the encumbrance tier
//! 8. every other formula on the post-modifier values
//! 9. diff against the base view for display
//!
//! Steps 5 to 8 work on the base view, so bounded penalties clamp the full
//! value and step 8 only adds how much each formula moved.
//!
//! The calculator never mutates its inputs. Deltas on character-side values
//! (health, needs, money...) are reported in [`DerivedStats::general_deltas`]
//! and committed by [`crate::entity::lifecycle::settle`].

use std::ops::Deref;

use serde::Serialize;

use crate::core::config::RulesConfig;
use crate::core::dice::Dice;
use crate::core::error::Result;
use crate::core::types::CharacterId;
use crate::effects::effect::ActiveEffect;
use crate::entity::character::Character;
use crate::entity::needs::{tier_deltas, NEEDS};
use crate::rules::loader::Catalog;
use crate::stats::block::StatBlock;
use crate::stats::formulas::{formula, COMPUTED_STATS};
use crate::stats::ids::{General, Secondary, Special, StatId};
use crate::stats::modifier::{Modifier, StatDelta};
use crate::stats::race::Race;

const CARRY_WEIGHT: StatId = StatId::Secondary(Secondary::CarryWeight);

/// Lower bounds of the `charge / carry_weight` tiers
const ENCUMBRANCE_BOUNDS: [f64; 4] = [0.0, 1.0, 1.5, 2.0];

const ENCUMBRANCE_TIERS: [&[StatDelta]; 4] = [
    &[],
    &[
        StatDelta::at_least(StatId::Special(Special::Agility), -1.0, 1.0),
        StatDelta::new(StatId::Secondary(Secondary::MaxActionPoints), -1.0),
    ],
    &[
        StatDelta::at_least(StatId::Special(Special::Agility), -2.0, 1.0),
        StatDelta::new(StatId::Secondary(Secondary::MaxActionPoints), -2.0),
    ],
    &[
        StatDelta::at_least(StatId::Special(Special::Agility), -4.0, 1.0),
        StatDelta::new(StatId::Secondary(Secondary::MaxActionPoints), -4.0),
    ],
];

/// Penalties for carrying `charge` with a given capacity
pub fn encumbrance_deltas(charge: f64, carry_weight: f64) -> &'static [StatDelta] {
    let ratio = if carry_weight > 0.0 {
        charge / carry_weight
    } else if charge > 0.0 {
        f64::INFINITY
    } else {
        0.0
    };
    let tier = ENCUMBRANCE_BOUNDS
        .iter()
        .rposition(|bound| ratio >= *bound)
        .unwrap_or(0);
    ENCUMBRANCE_TIERS[tier]
}

/// Fully computed statistics of one character
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedStats {
    pub character: CharacterId,
    /// Final values
    pub stats: StatBlock,
    /// Values before needs and modifiers
    pub base: StatBlock,
    /// `stats - base` for every stat that differs
    pub modifiers: Vec<(StatId, f64)>,
    /// Deltas aimed at character-side values, for the caller to commit
    pub general_deltas: Vec<(General, f64)>,
    /// Total weight carried
    pub charge: f64,
}

impl Deref for DerivedStats {
    type Target = StatBlock;

    fn deref(&self) -> &StatBlock {
        &self.stats
    }
}

impl DerivedStats {
    pub fn modifier(&self, stat: StatId) -> f64 {
        self.modifiers
            .iter()
            .find(|(s, _)| *s == stat)
            .map(|(_, v)| *v)
            .unwrap_or(0.0)
    }

    /// Signed luck as an integer, for roll thresholds
    pub fn luck(&self) -> i64 {
        self.special(Special::Luck) as i64
    }

    pub fn max_health(&self) -> f64 {
        self.secondary(Secondary::MaxHealth)
    }

    pub fn max_action_points(&self) -> f64 {
        self.secondary(Secondary::MaxActionPoints)
    }
}

/// Working state of one computation
struct Sheet {
    race: Race,
    stats: StatBlock,
    general: Vec<(General, f64)>,
}

impl Sheet {
    fn apply(&mut self, stat: StatId, value: f64, min: Option<f64>, max: Option<f64>) {
        match stat {
            StatId::General(general) => self.general.push((general, value)),
            _ => {
                self.stats.change(stat, value, min, max, self.race);
            }
        }
    }

    fn apply_delta(&mut self, delta: &StatDelta) {
        self.apply(delta.stat, delta.value, delta.min, delta.max);
    }

    /// Replace the formula contribution computed on `base` with one computed on the current values
    fn recompute(&mut self, stat: StatId, base: &StatBlock, level: u32) {
        let now = formula(stat, &self.stats, level);
        let before = formula(stat, base, level);
        if let (Some(now), Some(before)) = (now, before) {
            self.apply(stat, now - before, None, None);
        }
    }

    fn apply_modifier(&mut self, modifier: &Modifier, scale: f64, dice: &mut dyn Dice) {
        let value = modifier.resolve(dice) * scale;
        self.apply(modifier.stat, value, None, None);
    }
}

/// Computes [`DerivedStats`] from a character and the catalog
pub struct StatsCalculator<'a> {
    config: &'a RulesConfig,
    catalog: &'a Catalog,
}

impl<'a> StatsCalculator<'a> {
    pub fn new(config: &'a RulesConfig, catalog: &'a Catalog) -> Self {
        Self { config, catalog }
    }

    pub fn compute(
        &self,
        character: &Character,
        campaign_effects: &[ActiveEffect],
        dice: &mut dyn Dice,
    ) -> Result<DerivedStats> {
        let race = character.race;
        let level = character.level;
        let mut sheet = Sheet {
            race,
            stats: character.base.clone(),
            general: Vec::new(),
        };

        // Racial template
        for (stat, entry) in race.entries() {
            sheet.apply(stat, entry.bonus, None, None);
        }

        // Tag skills, unclamped
        for (i, skill) in character.tag_skills.iter().enumerate() {
            if !character.tag_skills[..i].contains(skill) {
                sheet.stats.add(*skill, self.config.tag_skill_bonus as f64);
            }
        }

        // Base view: formulas on the values so far; the working sheet starts from it
        let mut base = sheet.stats.clone();
        for stat in COMPUTED_STATS {
            if let Some(value) = formula(stat, &base, level) {
                base.change(stat, value, None, None, race);
            }
        }
        sheet.stats = base.clone();

        // Survival needs
        for need in NEEDS {
            for delta in tier_deltas(need, character.general(need)) {
                sheet.apply_delta(delta);
            }
        }

        // Equipment, then character effects, then campaign effects
        for equipment in character.inventory.iter().filter(|e| e.is_equipped()) {
            let item = self.catalog.item(equipment.item)?;
            for modifier in &item.modifiers {
                sheet.apply_modifier(modifier, equipment.quantity.max(1) as f64, dice);
            }
        }
        for active in character.effects.iter().chain(campaign_effects) {
            let effect = self.catalog.effect(active.effect)?;
            for modifier in &effect.modifiers {
                sheet.apply_modifier(modifier, 1.0, dice);
            }
        }

        // Carry weight and encumbrance
        sheet.recompute(CARRY_WEIGHT, &base, level);
        let mut charge = 0.0;
        for equipment in &character.inventory {
            charge += equipment.charge(self.catalog.item(equipment.item)?);
        }
        let carry_weight = sheet.stats.secondary(Secondary::CarryWeight);
        for delta in encumbrance_deltas(charge, carry_weight) {
            sheet.apply_delta(delta);
        }

        // Everything else from the modified values
        for stat in COMPUTED_STATS {
            if stat != CARRY_WEIGHT {
                sheet.recompute(stat, &base, level);
            }
        }

        let modifiers = sheet
            .stats
            .iter()
            .zip(base.iter())
            .filter_map(|((stat, value), (_, from_base))| {
                let diff = value - from_base;
                (diff.abs() > f64::EPSILON).then_some((stat, diff))
            })
            .collect();

        tracing::trace!(character = %character.name, charge, "stats computed");

        Ok(DerivedStats {
            character: character.id,
            stats: sheet.stats,
            base,
            modifiers,
            general_deltas: sheet.general,
            charge,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dice::ScriptedDice;
    use crate::core::types::{EffectId, ItemId};
    use crate::effects::effect::Effect;
    use crate::items::equipment::Equipment;
    use crate::items::item::{Item, ItemType};
    use crate::stats::ids::{Leveled, Protection, Skill};

    fn compute(character: &Character, catalog: &Catalog) -> DerivedStats {
        let config = RulesConfig::default();
        let mut dice = ScriptedDice::new([]);
        StatsCalculator::new(&config, catalog)
            .compute(character, &[], &mut dice)
            .unwrap()
    }

    #[test]
    fn test_average_human() {
        let character = Character::new("Vault Dweller", Race::Human);
        let stats = compute(&character, &Catalog::new());
        assert_eq!(stats.max_health(), 30.0);
        assert_eq!(stats.max_action_points(), 7.0);
        assert_eq!(stats.secondary(Secondary::CarryWeight), 30.0);
        assert_eq!(stats.skill(Skill::Unarmed), 50.0);
        assert_eq!(stats.resistance(Protection::Electricity), 30.0);
        assert_eq!(stats.leveled(Leveled::PerkRate), 2.0);
        assert!(stats.modifiers.is_empty());
    }

    #[test]
    fn test_tag_skill_bonus() {
        let mut character = Character::new("Sniper", Race::Human);
        character.tag_skills = vec![Skill::SmallGuns];
        let stats = compute(&character, &Catalog::new());
        assert_eq!(stats.skill(Skill::SmallGuns), 45.0);
        assert_eq!(stats.base.skill(Skill::SmallGuns), 45.0);
    }

    #[test]
    fn test_ghoul_racial_bounds() {
        let character = Character::new("Ghoul", Race::Ghoul)
            .with_special(Special::Endurance, 10.0)
            .with_special(Special::Strength, 10.0);
        let stats = compute(&character, &Catalog::new());
        assert_eq!(stats.special(Special::Strength), 8.0);
        // 80 racial + 2 x END, capped by the racial maximum
        assert_eq!(stats.resistance(Protection::Radiation), 100.0);
    }

    #[test]
    fn test_robot_never_heals() {
        let character = Character::new("Robobrain", Race::Robot)
            .with_special(Special::Endurance, 12.0);
        let stats = compute(&character, &Catalog::new());
        assert_eq!(stats.secondary(Secondary::HealingRate), 0.0);
        assert_eq!(stats.leveled(Leveled::HitPointsPerLevel), 0.0);
    }

    #[test]
    fn test_need_tier_penalty_shows_as_modifier() {
        let mut character = Character::new("Thirsty", Race::Human);
        character.thirst = 450.0;
        let stats = compute(&character, &Catalog::new());
        assert_eq!(stats.special(Special::Perception), 4.0);
        assert_eq!(stats.special(Special::Endurance), 3.0);
        assert_eq!(stats.modifier(StatId::Special(Special::Endurance)), -2.0);
        // Derived stats follow the reduced endurance
        assert_eq!(stats.max_health(), 26.0);
    }

    #[test]
    fn test_equipment_modifiers_and_charge() {
        let mut catalog = Catalog::new();
        let mut armor = Item::new(ItemId(1), "Power Armor", ItemType::Armor);
        armor.weight = 20.0;
        armor.modifiers = vec![Modifier::new(Special::Strength, 3.0)];
        catalog.insert_item(armor.clone()).unwrap();

        let mut character = Character::new("Paladin", Race::Human);
        let mut stack = Equipment::new(&armor, 1);
        stack.slot = Some(ItemType::Armor);
        character.inventory.push(stack);

        let stats = compute(&character, &catalog);
        assert_eq!(stats.special(Special::Strength), 8.0);
        assert_eq!(stats.secondary(Secondary::CarryWeight), 45.0);
        assert_eq!(stats.charge, 20.0);
        assert_eq!(stats.modifier(StatId::Special(Special::Strength)), 3.0);
    }

    #[test]
    fn test_unequipped_items_only_weigh() {
        let mut catalog = Catalog::new();
        let mut armor = Item::new(ItemId(1), "Power Armor", ItemType::Armor);
        armor.weight = 50.0;
        armor.modifiers = vec![Modifier::new(Special::Strength, 3.0)];
        catalog.insert_item(armor.clone()).unwrap();

        let mut character = Character::new("Mule", Race::Human);
        character.inventory.push(Equipment::new(&armor, 1));

        let stats = compute(&character, &catalog);
        assert_eq!(stats.special(Special::Strength), 5.0);
        // 50 / 30 lands in the second encumbrance tier
        assert_eq!(stats.special(Special::Agility), 3.0);
        assert_eq!(stats.max_action_points(), 4.0);
    }

    #[test]
    fn test_effect_modifiers_and_general_deltas() {
        let mut catalog = Catalog::new();
        let mut effect = Effect::new(EffectId(1), "Buffout");
        effect.modifiers = vec![
            Modifier::new(Special::Endurance, 2.0),
            Modifier::new(General::Rads, 5.0),
        ];
        catalog.insert_effect(effect).unwrap();

        let mut character = Character::new("Junkie", Race::Human);
        character.effects.push(ActiveEffect::pending(EffectId(1)));

        let stats = compute(&character, &catalog);
        assert_eq!(stats.special(Special::Endurance), 7.0);
        assert_eq!(stats.general_deltas, vec![(General::Rads, 5.0)]);
    }

    #[test]
    fn test_campaign_effects_apply() {
        let mut catalog = Catalog::new();
        let mut storm = Effect::new(EffectId(2), "Dust storm");
        storm.modifiers = vec![Modifier::new(Special::Perception, -2.0)];
        catalog.insert_effect(storm).unwrap();

        let config = RulesConfig::default();
        let character = Character::new("Scout", Race::Human);
        let mut dice = ScriptedDice::new([]);
        let stats = StatsCalculator::new(&config, &catalog)
            .compute(&character, &[ActiveEffect::pending(EffectId(2))], &mut dice)
            .unwrap();
        assert_eq!(stats.special(Special::Perception), 3.0);
        assert_eq!(stats.secondary(Secondary::Sequence), 6.0);
    }

    #[test]
    fn test_unknown_item_is_an_error() {
        let mut character = Character::new("Ghost", Race::Human);
        let phantom = Item::new(ItemId(77), "Phantom", ItemType::Misc);
        character.inventory.push(Equipment::new(&phantom, 1));
        let config = RulesConfig::default();
        let catalog = Catalog::new();
        let mut dice = ScriptedDice::new([]);
        assert!(StatsCalculator::new(&config, &catalog)
            .compute(&character, &[], &mut dice)
            .is_err());
    }

    #[test]
    fn test_encumbrance_tiers() {
        assert!(encumbrance_deltas(10.0, 30.0).is_empty());
        assert_eq!(encumbrance_deltas(30.0, 30.0).len(), 2);
        assert_eq!(encumbrance_deltas(60.0, 30.0)[1].value, -4.0);
        assert_eq!(encumbrance_deltas(1.0, 0.0)[1].value, -4.0);
        assert!(encumbrance_deltas(0.0, 0.0).is_empty());
    }
}
