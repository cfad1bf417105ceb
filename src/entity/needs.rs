//! Survival needs: radiation, thirst, hunger and sleep
//!
//! Counters grow with elapsed time and map onto penalty tiers read by the
//! stats calculator. Ambient radiation goes through the damage pipeline so
//! armor and resistances apply.

use crate::combat::damage::{resolve_damage, DamageRequest};
use crate::combat::damage_type::DamageType;
use crate::core::dice::Dice;
use crate::core::error::Result;
use crate::entity::character::Character;
use crate::history::DamageHistory;
use crate::rules::context::RulesContext;
use crate::stats::calculator::DerivedStats;
use crate::stats::ids::{General, Secondary, Special, StatId};
use crate::stats::modifier::StatDelta;

const STR: StatId = StatId::Special(Special::Strength);
const PER: StatId = StatId::Special(Special::Perception);
const END: StatId = StatId::Special(Special::Endurance);
const CHA: StatId = StatId::Special(Special::Charisma);
const INT: StatId = StatId::Special(Special::Intelligence);
const AGI: StatId = StatId::Special(Special::Agility);
const HEALING: StatId = StatId::Secondary(Secondary::HealingRate);
const MAX_HEALTH: StatId = StatId::Secondary(Secondary::MaxHealth);

const fn down(stat: StatId, value: f64) -> StatDelta {
    StatDelta::new(stat, -value)
}

/// Penalty that never drops the stat below `floor`
const fn down_to(stat: StatId, value: f64, floor: f64) -> StatDelta {
    StatDelta::at_least(stat, -value, floor)
}

/// Lower bounds of the tiers; a tier covers `[bound, next bound)`
pub const TIER_BOUNDS: [f64; 6] = [0.0, 200.0, 400.0, 600.0, 800.0, 1000.0];

const RADS_TIERS: [&[StatDelta]; 6] = [
    &[],
    &[down(STR, 1.0)],
    &[down_to(HEALING, 3.0, 0.0), down_to(STR, 1.0, 1.0), down_to(AGI, 1.0, 1.0)],
    &[
        down_to(HEALING, 5.0, 0.0),
        down_to(MAX_HEALTH, 5.0, 0.0),
        down_to(STR, 2.0, 1.0),
        down_to(END, 1.0, 1.0),
        down_to(AGI, 2.0, 1.0),
    ],
    &[
        down_to(HEALING, 10.0, 0.0),
        down_to(MAX_HEALTH, 15.0, 0.0),
        down_to(STR, 4.0, 1.0),
        down_to(PER, 3.0, 1.0),
        down_to(END, 3.0, 1.0),
        down_to(CHA, 3.0, 1.0),
        down_to(INT, 1.0, 1.0),
        down_to(AGI, 5.0, 1.0),
    ],
    &[
        down(HEALING, 10.0),
        down(MAX_HEALTH, 20.0),
        down_to(STR, 6.0, 1.0),
        down_to(PER, 5.0, 1.0),
        down_to(END, 5.0, 1.0),
        down_to(CHA, 5.0, 1.0),
        down_to(INT, 3.0, 1.0),
        down_to(AGI, 6.0, 1.0),
    ],
];

const THIRST_TIERS: [&[StatDelta]; 6] = [
    &[],
    &[down_to(END, 1.0, 1.0)],
    &[down_to(PER, 1.0, 1.0), down_to(END, 2.0, 1.0)],
    &[down_to(PER, 2.0, 1.0), down_to(END, 2.0, 1.0), down_to(INT, 1.0, 1.0)],
    &[
        down_to(PER, 2.0, 1.0),
        down_to(END, 3.0, 1.0),
        down_to(INT, 1.0, 1.0),
        down_to(AGI, 2.0, 1.0),
    ],
    &[down(MAX_HEALTH, 1000.0)],
];

const HUNGER_TIERS: [&[StatDelta]; 6] = [
    &[],
    &[down_to(STR, 1.0, 1.0)],
    &[down_to(STR, 2.0, 1.0), down_to(CHA, 1.0, 1.0)],
    &[down_to(STR, 3.0, 1.0), down_to(PER, 1.0, 1.0), down_to(CHA, 2.0, 1.0)],
    &[down_to(STR, 3.0, 1.0), down_to(PER, 2.0, 1.0), down_to(CHA, 2.0, 1.0)],
    &[down(MAX_HEALTH, 1000.0)],
];

const SLEEP_TIERS: [&[StatDelta]; 6] = [
    &[],
    &[down_to(AGI, 1.0, 1.0)],
    &[down_to(INT, 1.0, 1.0), down_to(AGI, 2.0, 1.0)],
    &[down_to(END, 1.0, 1.0), down_to(INT, 2.0, 1.0), down_to(AGI, 3.0, 1.0)],
    &[down_to(END, 2.0, 1.0), down_to(INT, 2.0, 1.0), down_to(AGI, 3.0, 1.0)],
    &[down(MAX_HEALTH, 1000.0)],
];

/// The four survival counters
pub const NEEDS: [General; 4] = [General::Rads, General::Thirst, General::Hunger, General::Sleep];

/// Index of the half-open tier containing `value`
pub fn tier(value: f64) -> usize {
    TIER_BOUNDS
        .iter()
        .rposition(|bound| value >= *bound)
        .unwrap_or(0)
}

/// Stat deltas of the tier `value` falls in; empty for non-need stats
pub fn tier_deltas(need: General, value: f64) -> &'static [StatDelta] {
    let tiers = match need {
        General::Rads => &RADS_TIERS,
        General::Thirst => &THIRST_TIERS,
        General::Hunger => &HUNGER_TIERS,
        General::Sleep => &SLEEP_TIERS,
        _ => return &[],
    };
    tiers[tier(value)]
}

/// Hourly growth of a need for a given endurance
pub fn hourly_rate(need: General, endurance: f64) -> f64 {
    match need {
        General::Thirst => (20.0 - endurance).max(1.0),
        General::Hunger => (15.0 - endurance).max(1.0),
        General::Sleep => (10.0 - endurance).max(1.0),
        _ => 0.0,
    }
}

/// Advance the survival counters by `hours`
///
/// Returns the damage records produced by ambient radiation (at most one).
pub fn update_needs(
    ctx: &RulesContext<'_>,
    character: &mut Character,
    stats: &DerivedStats,
    hours: f64,
    radiation_per_hour: f64,
    resting: bool,
    dice: &mut dyn Dice,
) -> Result<Vec<DamageHistory>> {
    let config = ctx.config;
    let resting = resting || character.is_resting;
    let rate = if resting {
        config.needs_resting_rate
    } else {
        config.needs_normal_rate
    };
    let endurance = stats.special(Special::Endurance);

    for need in [General::Thirst, General::Hunger] {
        let delta = hourly_rate(need, endurance) * hours * rate;
        character.change_general(need, delta, config);
    }
    let sleep = hourly_rate(General::Sleep, endurance) * hours * rate;
    character.change_general(General::Sleep, if resting { -sleep } else { sleep }, config);

    let mut damages = Vec::new();
    if radiation_per_hour > 0.0 && hours > 0.0 {
        let request = DamageRequest::new(DamageType::Radiation, radiation_per_hour * hours);
        damages.push(resolve_damage(ctx, character, stats, &request, dice)?);
    }

    let healing = stats.secondary(Secondary::HealingRate).max(0.0) * hours / 24.0;
    character.regeneration += if resting {
        healing * config.healing_rate_resting_mult
    } else {
        healing
    };

    tracing::trace!(
        character = %character.name,
        hours,
        thirst = character.thirst,
        hunger = character.hunger,
        sleep = character.sleep,
        rads = character.rads,
        "needs updated"
    );
    Ok(damages)
}

/// Credit whole points of regeneration to health, capped at `max_health`
///
/// Returns the health actually gained.
pub fn credit_regeneration(character: &mut Character, max_health: f64) -> i64 {
    if character.regeneration < 1.0 {
        return 0;
    }
    let points = character.regeneration.floor();
    character.regeneration -= points;
    let cap = max_health as i64;
    if character.health >= cap {
        return 0;
    }
    let gained = (points as i64).min(cap - character.health);
    character.health += gained;
    gained
}
