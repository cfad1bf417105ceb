//! Single attack resolution
//!
//! One call resolves one attack of an attacker on a defender: early exits,
//! body part, hit chance, roll, damage with criticals, on-hit effects, ammo
//! and wear, action points and experience. Normal-play failures are statuses
//! on the returned [`FightHistory`], never errors.

use crate::combat::body_part::BodyPart;
use crate::combat::damage::{resolve_damage, DamageRequest};
use crate::combat::damage_type::DamageType;
use crate::core::config::RulesConfig;
use crate::core::dice::Dice;
use crate::core::error::{ensure, Result};
use crate::effects::engine::affect;
use crate::entity::character::Character;
use crate::history::{FightHistory, FightStatus};
use crate::items::equipment::Equipment;
use crate::items::item::{Item, ItemType};
use crate::progression::add_experience;
use crate::rules::context::RulesContext;
use crate::stats::calculator::DerivedStats;
use crate::stats::ids::{Secondary, Skill, Special};

/// Caller-side parameters of an attack
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FightRequest {
    /// Distance to the target, in cells
    pub range: i64,
    /// Aimed body part; random when `None`
    pub body_part: Option<BodyPart>,
    /// Situational modifier (light, cover...)
    pub hit_modifier: i64,
    /// Slot the attack is made with: weapon or grenade
    pub weapon_slot: ItemType,
    /// Spend action points
    pub is_action: bool,
}

impl Default for FightRequest {
    fn default() -> Self {
        Self {
            range: 1,
            body_part: None,
            hit_modifier: 0,
            weapon_slot: ItemType::Weapon,
            is_action: true,
        }
    }
}

impl FightRequest {
    pub fn at(range: i64) -> Self {
        Self {
            range,
            ..Self::default()
        }
    }

    pub fn aimed(mut self, body_part: BodyPart) -> Self {
        self.body_part = Some(body_part);
        self
    }

    pub fn modifier(mut self, hit_modifier: i64) -> Self {
        self.hit_modifier = hit_modifier;
        self
    }

    pub fn with_grenade(mut self) -> Self {
        self.weapon_slot = ItemType::Grenade;
        self
    }

    /// Do not spend action points
    pub fn free(mut self) -> Self {
        self.is_action = false;
        self
    }
}

/// Position of an attack inside a burst
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Shot {
    pub burst: bool,
    /// 0-based shot number
    pub index: u32,
    /// Spend ammunition and wear the weapon
    pub consume: bool,
    /// Skip the roll and hit
    pub forced: bool,
}

impl Shot {
    pub const SINGLE: Shot = Shot {
        burst: false,
        index: 0,
        consume: true,
        forced: false,
    };
}

/// What an attacker holds for one attack
#[derive(Debug, Clone)]
pub(crate) struct Loadout<'c> {
    pub weapon: Option<(&'c Item, Equipment)>,
    pub ammo: Option<(&'c Item, Equipment)>,
}

impl<'c> Loadout<'c> {
    pub fn load(ctx: &RulesContext<'c>, character: &Character, slot: ItemType) -> Result<Self> {
        ensure(
            matches!(slot, ItemType::Weapon | ItemType::Grenade),
            format!("cannot attack with the {slot:?} slot"),
        )?;
        let weapon = match character.equipped(slot) {
            Some(stack) => Some((ctx.catalog.item(stack.item)?, stack.clone())),
            None => None,
        };
        let ammo = match (&weapon, character.equipped(ItemType::Ammo)) {
            (Some((item, _)), Some(stack)) if item.uses_clip() && item.accepts(stack.item) => {
                Some((ctx.catalog.item(stack.item)?, stack.clone()))
            }
            _ => None,
        };
        Ok(Self { weapon, ammo })
    }

    pub fn weapon_item(&self) -> Option<&'c Item> {
        self.weapon.as_ref().map(|(item, _)| *item)
    }

    pub fn ammo_item(&self) -> Option<&'c Item> {
        self.ammo.as_ref().map(|(item, _)| *item)
    }

    /// Weapon and ammunition templates
    pub fn items(&self) -> impl Iterator<Item = &'c Item> {
        self.weapon_item().into_iter().chain(self.ammo_item())
    }

    fn sum(&self, field: impl Fn(&Item) -> f64) -> f64 {
        self.items().map(field).sum()
    }

    pub fn skill(&self) -> Skill {
        self.weapon_item()
            .map(Item::weapon_skill)
            .unwrap_or(Skill::Unarmed)
    }

    /// Unarmed attacks count as melee
    pub fn is_melee(&self) -> bool {
        self.weapon_item()
            .map_or(true, |w| w.is_melee() && !w.is_throwable())
    }

    pub fn condition(&self) -> f64 {
        self.weapon.as_ref().map_or(1.0, |(_, stack)| stack.wear())
    }

    /// Early exit owed to the weapon itself
    fn blocked(&self, slot: ItemType) -> Option<FightStatus> {
        let Some((item, stack)) = &self.weapon else {
            return (slot == ItemType::Grenade).then_some(FightStatus::NoMoreAmmo);
        };
        if (item.uses_clip() && stack.rounds() <= 0) || (item.is_throwable() && stack.quantity <= 0) {
            return Some(FightStatus::NoMoreAmmo);
        }
        if stack.condition.is_some_and(|c| c <= 0.0) {
            return Some(FightStatus::WeaponBroken);
        }
        None
    }
}

/// Hit chance lost to the distance, or `None` when the target is out of reach
///
/// Melee reach is `max(max_range, 1)`. Ranged weapons reach `max_range` times
/// their mode multiplier, thrown weapons `max_range + ranged_bonus_mult x STR`.
/// Inside the absolute reach, being closer than `min_range` or farther than
/// `max_range` costs hit chance per cell.
pub fn range_penalty(config: &RulesConfig, weapon: Option<&Item>, strength: f64, range: i64) -> Option<i64> {
    let Some(weapon) = weapon.filter(|w| w.is_throwable() || !w.is_melee()) else {
        let reach = weapon.map_or(1, |w| w.max_range.max(1));
        return (range <= reach).then_some(0);
    };
    let reach = if weapon.is_throwable() {
        weapon.max_range + config.ranged_bonus_mult * strength as i64
    } else {
        weapon.max_range * config.range_mult(weapon.mode)
    };
    if range > reach {
        return None;
    }
    let penalty = if range < weapon.min_range {
        (weapon.min_range - range) * config.ranged_bonus_mult
    } else if range > weapon.max_range {
        (range - weapon.max_range) * config.ranged_malus_mult
    } else {
        0
    };
    Some(penalty)
}

/// Everything the hit formula reads
struct HitContext<'h, 'c> {
    attacker: &'h Character,
    attacker_stats: &'h DerivedStats,
    loadout: &'h Loadout<'c>,
    defender_stats: &'h DerivedStats,
    defender_armor: Option<&'c Item>,
}

impl HitContext<'_, '_> {
    fn chance(&self, config: &RulesConfig, request: &FightRequest) -> i64 {
        let stats = self.attacker_stats;
        let strength = stats.special(Special::Strength);
        let Some(penalty) = range_penalty(config, self.loadout.weapon_item(), strength, request.range)
        else {
            return 0;
        };

        let mut skill = stats.skill(self.loadout.skill());
        if self.attacker.race.is_creature() {
            skill = skill.max((self.attacker.level as i64 * config.leveled_stats_mult) as f64);
        }
        let mut chance = skill;

        let weapon = self.loadout.weapon_item();
        chance += stats.secondary(if weapon.is_some_and(Item::is_two_handed) {
            Secondary::TwoHandsAccuracy
        } else {
            Secondary::OneHandAccuracy
        });
        if let Some(weapon) = weapon {
            chance += (strength - weapon.min_strength as f64).min(0.0) * config.min_strength_malus as f64;
            chance += (skill - weapon.min_skill as f64).min(0.0) * config.min_skill_malus as f64;
        }
        chance -= penalty as f64;
        chance += self.loadout.sum(|i| i.hit_chance_modifier as f64) * self.loadout.condition();

        let luck_excess = (self.attacker_stats.luck() - 5).max(0) as f64;
        let armor_class = self.defender_stats.secondary(Secondary::ArmorClass)
            + self.defender_armor.map_or(0.0, |a| a.armor_class as f64)
            - luck_excess
            - self.loadout.sum(|i| i.armor_class_modifier as f64);
        chance -= armor_class.max(0.0);

        if let Some(part) = request.body_part {
            chance += part.hit_modifier(self.loadout.is_melee()) as f64;
        }
        chance += request.hit_modifier as f64;

        (chance.floor() as i64).clamp(0, config.max_hit_chance)
    }
}

/// Action points an attack costs; later burst shots are free
fn ap_cost(config: &RulesConfig, weapon: Option<&Item>, aimed: bool, shot: &Shot, stats: &DerivedStats) -> i64 {
    if shot.burst && shot.index > 0 {
        return 0;
    }
    let cost = weapon
        .map(|w| {
            if shot.burst {
                w.ap_cost_burst
            } else if aimed {
                w.ap_cost_target
            } else {
                w.ap_cost_normal
            }
        })
        .filter(|cost| *cost > 0)
        .unwrap_or(config.ap_cost_fight);
    (cost + stats.secondary(Secondary::ApCostModifier) as i64).max(0)
}

/// Spend `shots` worth of ammunition and wear on the attacker's weapon
///
/// Thrown weapons lose quantity and do not wear; clip-fed weapons lose
/// rounds; anything else only wears.
pub(crate) fn expend(attacker: &mut Character, loadout: &Loadout<'_>, shots: i64) -> Result<()> {
    let Some((weapon, stack)) = &loadout.weapon else {
        return Ok(());
    };
    if shots <= 0 {
        return Ok(());
    }
    let wear_rate = if weapon.durability > 0.0 {
        (1.0 + loadout.sum(|i| i.condition_modifier)) / weapon.durability
    } else {
        0.0
    };
    let equipment = attacker.equipment_mut(stack.id)?;
    if weapon.is_throwable() {
        equipment.quantity -= shots;
        attacker.prune_inventory();
        return Ok(());
    }
    if weapon.uses_clip() {
        equipment.clip_count = Some((equipment.rounds() - shots).max(0));
    }
    if let Some(condition) = equipment.condition {
        equipment.condition = Some((condition - wear_rate * shots as f64).max(0.0));
    }
    Ok(())
}

/// Resolve one attack of `attacker` on `defender`
///
/// On a critical failure the attack may land on `secondary` instead, as a
/// forced hit recorded in [`FightHistory::redirected`].
pub fn fight(
    ctx: &RulesContext<'_>,
    attacker: &mut Character,
    defender: &mut Character,
    secondary: Option<&mut Character>,
    request: &FightRequest,
    dice: &mut dyn Dice,
) -> Result<FightHistory> {
    fight_shot(ctx, attacker, defender, secondary, request, Shot::SINGLE, dice)
}

pub(crate) fn fight_shot(
    ctx: &RulesContext<'_>,
    attacker: &mut Character,
    defender: &mut Character,
    secondary: Option<&mut Character>,
    request: &FightRequest,
    shot: Shot,
    dice: &mut dyn Dice,
) -> Result<FightHistory> {
    let config = ctx.config;
    let loadout = Loadout::load(ctx, attacker, request.weapon_slot)?;

    let mut history = FightHistory::new(attacker.id, defender.id, ctx.now);
    history.attacker_weapon = loadout.weapon_item().map(|i| i.id);
    history.attacker_ammo = loadout.ammo_item().map(|i| i.id);
    history.range = request.range;
    history.aimed = request.body_part.is_some();
    history.burst = shot.burst;
    history.hit_count = shot.index + 1;
    history.hit_modifier = request.hit_modifier;

    // Early exits
    let early = if !defender.is_alive() {
        Some(FightStatus::TargetDead)
    } else {
        loadout.blocked(request.weapon_slot)
    };
    if let Some(status) = early {
        history.status = status;
        return Ok(history);
    }
    let attacker_stats = ctx.stats(attacker, dice)?;
    let cost = if request.is_action && !shot.forced {
        ap_cost(config, loadout.weapon_item(), history.aimed, &shot, &attacker_stats)
    } else {
        0
    };
    if cost > attacker.action_points {
        history.status = FightStatus::NotEnoughAp;
        return Ok(history);
    }

    // Body part and defender protection
    let body_part = match request.body_part {
        Some(part) => part,
        None => BodyPart::random(dice, attacker_stats.luck()),
    };
    history.body_part = body_part;
    let armor_slot = if body_part.covered_by_helmet() {
        ItemType::Helmet
    } else {
        ItemType::Armor
    };
    let defender_armor = match defender.equipped(armor_slot) {
        Some(stack) => Some(ctx.catalog.item(stack.item)?),
        None => None,
    };
    history.defender_armor = defender_armor.map(|i| i.id);
    let defender_stats = ctx.stats(defender, dice)?;

    // Roll
    let hit = HitContext {
        attacker,
        attacker_stats: &attacker_stats,
        loadout: &loadout,
        defender_stats: &defender_stats,
        defender_armor,
    };
    history.hit_chance = hit.chance(config, request);
    let luck = attacker_stats.luck();
    if shot.forced {
        history.success = true;
    } else {
        let roll = dice.d100();
        history.hit_roll = roll;
        history.success = roll <= history.hit_chance;
        history.critical = if history.success {
            roll <= luck
        } else {
            roll >= config.critical_fail_d100 - 5 + luck
        };
    }

    if history.success {
        let part = body_part.modifiers();
        let mut amount: f64 = loadout
            .items()
            .filter_map(|i| i.damage.as_ref())
            .map(|profile| profile.roll(dice))
            .sum();
        if loadout.is_melee() {
            amount += attacker_stats.secondary(Secondary::MeleeDamage);
        }
        let mut kind = loadout
            .ammo_item()
            .and_then(|i| i.damage)
            .or_else(|| loadout.weapon_item().and_then(|i| i.damage))
            .map_or(DamageType::Normal, |profile| profile.kind);
        amount *= 1.0
            + (loadout.sum(|i| i.damage_modifier) + attacker_stats.secondary(Secondary::DamageModifier))
                / 100.0;

        if history.critical {
            let chance = attacker_stats.secondary(Secondary::CriticalChance) as i64
                + part.critical
                + loadout.sum(|i| i.critical_modifier as f64) as i64;
            if dice.d100() <= chance {
                amount *= 1.0
                    + (loadout.sum(|i| i.critical_damage)
                        + attacker_stats.secondary(Secondary::CriticalDamage)
                        + part.critical_damage as f64)
                        / 100.0;
                amount += loadout.sum(|i| i.critical_bonus_damage);
                if dice.d100() <= attacker_stats.secondary(Secondary::CriticalRawChance) as i64 {
                    kind = DamageType::Raw;
                }
            } else {
                history.critical = false;
            }
        }

        let damage_request = DamageRequest::new(kind, amount).on(body_part).modifiers(
            loadout.sum(|i| i.threshold_modifier),
            loadout.sum(|i| i.threshold_rate_modifier),
            loadout.sum(|i| i.resistance_modifier),
        );
        history.damage = Some(resolve_damage(ctx, defender, &defender_stats, &damage_request, dice)?);
        history.status = if defender.is_alive() {
            FightStatus::HitSucceed
        } else {
            FightStatus::TargetKilled
        };

        // On-hit effects
        let on_hit: Vec<_> = loadout
            .items()
            .chain(defender_armor)
            .flat_map(|i| i.effects.iter().copied())
            .collect();
        for effect in on_hit {
            let outcome = affect(ctx, defender, effect, false, dice)?;
            history.effect_damages.extend(outcome.damages);
        }
    } else if history.critical && !shot.forced {
        if let Some(secondary) = secondary.filter(|c| c.is_alive()) {
            let redirect = FightRequest {
                body_part: None,
                is_action: false,
                ..*request
            };
            let forced = Shot {
                consume: false,
                forced: true,
                ..shot
            };
            let redirected = fight_shot(ctx, attacker, secondary, None, &redirect, forced, dice)?;
            history.redirected = Some(Box::new(redirected));
        }
    }

    if shot.consume {
        expend(attacker, &loadout, 1)?;
    }
    attacker.action_points -= cost;
    history.ap_cost = cost;

    // A redirected hit is part of the failed attack and earns nothing
    if !shot.forced {
        let per_level = if shot.burst {
            config.xp_gain_burst
        } else if history.success {
            config.xp_gain_fight_hit
        } else {
            config.xp_gain_fight_miss
        };
        let levels = (defender.level as i64 - attacker.level as i64).max(1);
        history.experience =
            levels * per_level + (defender.reward as f64 * history.damage_rate()).round() as i64;
        add_experience(config, attacker, &attacker_stats, history.experience);
    }

    tracing::debug!(
        attacker = %attacker.name,
        defender = %defender.name,
        status = ?history.status,
        hit_chance = history.hit_chance,
        roll = history.hit_roll,
        damage = history.real_damage(),
        "fight resolved"
    );
    Ok(history)
}
