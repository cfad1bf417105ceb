//! Damage pipeline
//!
//! Raw damage goes through the worn armor (threshold, then resistance), then
//! through the target's own threshold and resistance, and finally lands on
//! the resource the damage type drains: health, a need counter, money or karma.

use crate::combat::body_part::BodyPart;
use crate::combat::damage_type::DamageType;
use crate::core::dice::Dice;
use crate::core::error::{ensure, Result};
use crate::entity::character::Character;
use crate::history::DamageHistory;
use crate::items::item::{DamageProfile, ItemType};
use crate::rules::context::RulesContext;
use crate::stats::calculator::DerivedStats;
use crate::stats::ids::{General, Protection};

/// Everything needed to apply one damage amount
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageRequest {
    pub kind: DamageType,
    pub raw: f64,
    pub min: i64,
    pub max: i64,
    pub body_part: BodyPart,
    /// Flat threshold added to armor and target threshold
    pub threshold_modifier: f64,
    /// Percentage scaling both thresholds
    pub threshold_rate_modifier: f64,
    /// Percentage scaling armor resistance and target resistance
    pub resistance_modifier: f64,
}

impl DamageRequest {
    pub fn new(kind: DamageType, raw: f64) -> Self {
        Self {
            kind,
            raw,
            min: 0,
            max: 0,
            body_part: BodyPart::Torso,
            threshold_modifier: 0.0,
            threshold_rate_modifier: 0.0,
            resistance_modifier: 0.0,
        }
    }

    pub fn from_profile(profile: &DamageProfile) -> Self {
        Self::new(profile.kind, profile.raw).spread(profile.min, profile.max)
    }

    pub fn spread(mut self, min: i64, max: i64) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    pub fn on(mut self, body_part: BodyPart) -> Self {
        self.body_part = body_part;
        self
    }

    pub fn modifiers(mut self, threshold: f64, threshold_rate: f64, resistance: f64) -> Self {
        self.threshold_modifier = threshold;
        self.threshold_rate_modifier = threshold_rate;
        self.resistance_modifier = resistance;
        self
    }

    /// Threshold multiplier; the rate is rounded to two decimals
    fn threshold_scale(&self) -> f64 {
        1.0 + self.threshold_rate_modifier.round() / 100.0
    }

    /// Resistance multiplier, unrounded
    fn resistance_scale(&self) -> f64 {
        1.0 + self.resistance_modifier / 100.0
    }
}

/// Apply `request` to `character`, whose current derived stats are `stats`
///
/// Mutates the target resource and the condition of the armor that absorbed
/// the blow. Returns one record holding every intermediate value.
pub fn resolve_damage(
    ctx: &RulesContext<'_>,
    character: &mut Character,
    stats: &DerivedStats,
    request: &DamageRequest,
    dice: &mut dyn Dice,
) -> Result<DamageHistory> {
    ensure(
        request.min <= request.max,
        format!(
            "damage range {}..{} is inverted",
            request.min, request.max
        ),
    )?;

    let kind = request.kind;
    let mut history = DamageHistory::empty(character.id, ctx.now, kind);
    history.body_part = request.body_part;
    history.raw_damage = request.raw;
    history.min_damage = request.min;
    history.max_damage = request.max;

    if !kind.is_heal() && !character.is_alive() {
        return Ok(history);
    }

    let base = request.raw + dice.range(request.min, request.max) as f64;
    history.base_damage = base;
    let mut total = base;

    if let Some(protection) = kind.protection() {
        let max_resistance = ctx.config.max_damage_resistance;

        // Armor
        let slot = if request.body_part.covered_by_helmet() || kind == DamageType::GasInhaled {
            ItemType::Helmet
        } else {
            ItemType::Armor
        };
        if let Some((equipment_id, item_id, condition)) =
            character.equipped(slot).map(|e| (e.id, e.item, e.wear()))
        {
            let armor = ctx.catalog.item(item_id)?;
            let before = total;

            let threshold = ((armor.threshold(protection) * condition + request.threshold_modifier)
                * request.threshold_scale())
            .max(0.0);
            total = (total - threshold).max(0.0);
            let resistance = (armor.resistance(protection) * condition * request.resistance_scale())
                .min(max_resistance);
            total *= 1.0 - resistance / 100.0;

            history.armor = Some(item_id);
            history.armor_threshold = threshold;
            history.armor_resistance = resistance;

            if kind.is_physical() && armor.durability > 0.0 {
                let absorbed = (before - total).max(0.0);
                let wear = absorbed / armor.durability * (1.0 + armor.condition_modifier);
                let equipment = character.equipment_mut(equipment_id)?;
                equipment.condition = Some((condition - wear).max(0.0));
                history.armor_damage = condition - equipment.wear();
            }
        }

        // Target
        let mut threshold = stats.threshold(protection);
        let mut resistance = stats.resistance(protection);
        if kind.is_physical() {
            threshold += stats.threshold(Protection::Damage);
            resistance += stats.resistance(Protection::Damage);
        }
        let threshold =
            ((threshold + request.threshold_modifier) * request.threshold_scale()).max(0.0);
        let resistance = (resistance * request.resistance_scale()).min(max_resistance);
        total = (total - threshold).max(0.0);
        total *= 1.0 - resistance / 100.0;

        history.damage_threshold = threshold;
        history.damage_resistance = resistance;
    }

    if !kind.is_additive() {
        total = total.max(0.0);
    }
    let mut amount = total.round() as i64;
    if kind.is_heal() {
        amount = -amount;
    }

    let health_before = character.health;
    history.real_damage = apply_amount(ctx, character, stats, kind, amount);
    if kind.resource() == General::Health && history.real_damage > 0 {
        let max_health = stats.max_health();
        if max_health > 0.0 {
            let dealt = history.real_damage.min(health_before.max(0));
            history.damage_rate = dealt as f64 / max_health;
        }
    }

    tracing::debug!(
        character = %character.name,
        kind = ?kind,
        base,
        real = history.real_damage,
        "damage applied"
    );
    Ok(history)
}

/// Move `amount` onto the resource drained by `kind`; returns the signed delta applied
///
/// Positive values hurt: lost health, gained rads or need. Money and karma
/// simply receive the amount.
fn apply_amount(
    ctx: &RulesContext<'_>,
    character: &mut Character,
    stats: &DerivedStats,
    kind: DamageType,
    amount: i64,
) -> i64 {
    let resource = kind.resource();
    match resource {
        General::Health => {
            if amount < 0 {
                let room = (stats.max_health() as i64 - character.health).max(0);
                let healed = (-amount).min(room);
                character.health += healed;
                -healed
            } else {
                character.health -= amount;
                amount
            }
        }
        General::Money | General::Karma => {
            character.change_general(resource, amount as f64, ctx.config) as i64
        }
        _ => character
            .change_general(resource, amount as f64, ctx.config)
            .round() as i64,
    }
}

/// Compute fresh stats for `character`, then apply `request`
pub fn damage(
    ctx: &RulesContext<'_>,
    character: &mut Character,
    request: &DamageRequest,
    dice: &mut dyn Dice,
) -> Result<DamageHistory> {
    let stats = ctx.stats(character, dice)?;
    resolve_damage(ctx, character, &stats, request, dice)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::RulesConfig;
    use crate::core::dice::ScriptedDice;
    use crate::core::types::ItemId;
    use crate::items::equipment::Equipment;
    use crate::items::item::{Guard, Item};
    use crate::rules::loader::Catalog;
    use crate::stats::race::Race;

    fn armored_catalog() -> Catalog {
        let mut catalog = Catalog::new();
        let mut armor = Item::new(ItemId(1), "Leather Armor", ItemType::Armor);
        armor.durability = 100.0;
        armor.protection.insert(
            Protection::Normal,
            Guard {
                threshold: 2.0,
                resistance: 25.0,
            },
        );
        catalog.insert_item(armor).unwrap();
        catalog
    }

    fn healthy(name: &str) -> Character {
        let mut character = Character::new(name, Race::Human);
        character.health = 30;
        character
    }

    #[test]
    fn test_unarmored_normal_damage() {
        let config = RulesConfig::default();
        let catalog = Catalog::new();
        let ctx = RulesContext::new(&config, &catalog);
        let mut character = healthy("Target");
        let mut dice = ScriptedDice::new([4]);

        let request = DamageRequest::new(DamageType::Normal, 6.0).spread(1, 6);
        let history = damage(&ctx, &mut character, &request, &mut dice).unwrap();
        assert_eq!(history.base_damage, 10.0);
        assert_eq!(history.real_damage, 10);
        assert_eq!(character.health, 20);
        assert!((history.damage_rate - 10.0 / 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_armor_threshold_then_resistance() {
        let config = RulesConfig::default();
        let catalog = armored_catalog();
        let ctx = RulesContext::new(&config, &catalog);
        let mut character = healthy("Guard");
        let armor = catalog.item(ItemId(1)).unwrap();
        let mut stack = Equipment::new(armor, 1);
        stack.slot = Some(ItemType::Armor);
        character.inventory.push(stack);
        let mut dice = ScriptedDice::new([]);

        let request = DamageRequest::new(DamageType::Normal, 18.0);
        let history = damage(&ctx, &mut character, &request, &mut dice).unwrap();
        // (18 - 2) x 0.75
        assert_eq!(history.real_damage, 12);
        assert_eq!(history.armor, Some(ItemId(1)));
        assert_eq!(history.armor_threshold, 2.0);
        assert_eq!(history.armor_resistance, 25.0);
        // 6 absorbed over 100 durability
        assert!((history.armor_damage - 0.06).abs() < 1e-9);
        let worn = character.equipped(ItemType::Armor).unwrap().wear();
        assert!((worn - 0.94).abs() < 1e-9);
    }

    #[test]
    fn test_head_hits_skip_body_armor() {
        let config = RulesConfig::default();
        let catalog = armored_catalog();
        let ctx = RulesContext::new(&config, &catalog);
        let mut character = healthy("Helmetless");
        let armor = catalog.item(ItemId(1)).unwrap();
        let mut stack = Equipment::new(armor, 1);
        stack.slot = Some(ItemType::Armor);
        character.inventory.push(stack);
        let mut dice = ScriptedDice::new([]);

        let request = DamageRequest::new(DamageType::Normal, 18.0).on(BodyPart::Head);
        let history = damage(&ctx, &mut character, &request, &mut dice).unwrap();
        assert_eq!(history.armor, None);
        assert_eq!(history.real_damage, 18);
    }

    #[test]
    fn test_threshold_rate_is_rounded() {
        let request = DamageRequest::new(DamageType::Normal, 0.0).modifiers(0.0, 12.345, 12.345);
        assert!((request.threshold_scale() - 1.12).abs() < 1e-9);
        assert!((request.resistance_scale() - 1.12345).abs() < 1e-9);
    }

    #[test]
    fn test_dead_characters_take_nothing() {
        let config = RulesConfig::default();
        let catalog = Catalog::new();
        let ctx = RulesContext::new(&config, &catalog);
        let mut character = Character::new("Corpse", Race::Human);
        let mut dice = ScriptedDice::new([]);
        let history = damage(
            &ctx,
            &mut character,
            &DamageRequest::new(DamageType::Fire, 50.0),
            &mut dice,
        )
        .unwrap();
        assert_eq!(history.real_damage, 0);
        assert_eq!(dice.rolled(), 0);
    }

    #[test]
    fn test_heal_caps_at_max_health() {
        let config = RulesConfig::default();
        let catalog = Catalog::new();
        let ctx = RulesContext::new(&config, &catalog);
        let mut character = healthy("Patient");
        character.health = 25;
        let mut dice = ScriptedDice::new([]);
        let history = damage(
            &ctx,
            &mut character,
            &DamageRequest::new(DamageType::Heal, 20.0),
            &mut dice,
        )
        .unwrap();
        assert_eq!(history.real_damage, -5);
        assert_eq!(character.health, 30);
    }

    #[test]
    fn test_radiation_goes_to_rads_through_resistance() {
        let config = RulesConfig::default();
        let catalog = Catalog::new();
        let ctx = RulesContext::new(&config, &catalog);
        let mut character = healthy("Wanderer");
        let mut dice = ScriptedDice::new([]);
        // END 5 gives 10% radiation resistance
        let history = damage(
            &ctx,
            &mut character,
            &DamageRequest::new(DamageType::Radiation, 100.0),
            &mut dice,
        )
        .unwrap();
        assert_eq!(history.real_damage, 90);
        assert_eq!(character.rads, 90.0);
        assert_eq!(character.health, 30);
        assert_eq!(history.damage_rate, 0.0);
    }

    #[test]
    fn test_money_and_karma_are_signed() {
        let config = RulesConfig::default();
        let catalog = Catalog::new();
        let ctx = RulesContext::new(&config, &catalog);
        let mut character = healthy("Trader");
        let mut dice = ScriptedDice::new([]);
        damage(
            &ctx,
            &mut character,
            &DamageRequest::new(DamageType::Money, 40.0),
            &mut dice,
        )
        .unwrap();
        damage(
            &ctx,
            &mut character,
            &DamageRequest::new(DamageType::Karma, -15.0),
            &mut dice,
        )
        .unwrap();
        assert_eq!(character.money, 40);
        assert_eq!(character.karma, -15);
    }

    #[test]
    fn test_overkill_rate_counts_remaining_health() {
        let config = RulesConfig::default();
        let catalog = Catalog::new();
        let ctx = RulesContext::new(&config, &catalog);
        let mut character = healthy("Doomed");
        character.health = 6;
        let mut dice = ScriptedDice::new([]);
        let history = damage(
            &ctx,
            &mut character,
            &DamageRequest::new(DamageType::Normal, 15.0),
            &mut dice,
        )
        .unwrap();
        assert_eq!(history.real_damage, 15);
        assert_eq!(character.health, -9);
        assert!((history.damage_rate - 6.0 / 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_inverted_range_is_a_violation() {
        let config = RulesConfig::default();
        let catalog = Catalog::new();
        let ctx = RulesContext::new(&config, &catalog);
        let mut character = healthy("Target");
        let mut dice = ScriptedDice::new([]);
        let request = DamageRequest::new(DamageType::Normal, 1.0).spread(6, 1);
        assert!(damage(&ctx, &mut character, &request, &mut dice).is_err());
    }
}
