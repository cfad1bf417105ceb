//! Lifecycle of active effects
//!
//! An instance is pending until attached, active until its end date, and
//! expired afterwards. Expiry chains into `next_effect`; attaching removes
//! `cancel_effect`. Every loop is bounded by the engine limits of
//! [`RulesConfig`](crate::core::config::RulesConfig).

use crate::combat::damage::{resolve_damage, DamageRequest};
use crate::core::dice::Dice;
use crate::core::error::Result;
use crate::core::types::{EffectId, GameDate};
use crate::effects::effect::{ActiveEffect, Effect};
use crate::entity::character::Character;
use crate::history::DamageHistory;
use crate::rules::context::RulesContext;

/// Result of attaching an effect
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EffectOutcome {
    /// The activation roll succeeded (or was forced)
    pub attached: bool,
    /// Damage dealt right away by the new instance
    pub damages: Vec<DamageHistory>,
}

/// Attach `effect` to an effect list, returning the index of the instance
///
/// Fails silently (returns `None`) when the activation roll misses. A sure
/// effect (chance 100) does not roll.
pub fn attach(
    ctx: &RulesContext<'_>,
    effects: &mut Vec<ActiveEffect>,
    effect: &Effect,
    forced: bool,
    dice: &mut dyn Dice,
) -> Option<usize> {
    if !forced && effect.chance < 100 && dice.d100() > effect.chance {
        return None;
    }
    if let Some(cancel) = effect.cancel_effect {
        effects.retain(|active| active.effect != cancel);
    }

    let start = ctx.now;
    let end = effect.duration.map(|span| start + span.roll(dice));
    let next = match effect.interval {
        Some(interval) if !effect.apply_immediately => start + interval,
        _ => start,
    };

    let index = match effects.iter().position(|a| a.effect == effect.id) {
        Some(index) => index,
        None => {
            effects.push(ActiveEffect::pending(effect.id));
            effects.len() - 1
        }
    };
    let active = &mut effects[index];
    active.start_date = Some(start);
    active.end_date = end;
    active.next_date = Some(next);
    tracing::trace!(effect = %effect.name, start, "effect attached");
    Some(index)
}

/// Advance `next_date` past every tick owed up to `now`, returning their dates
fn due_ticks(active: &mut ActiveEffect, effect: &Effect, now: GameDate, limit: usize) -> Vec<GameDate> {
    let mut dates = Vec::new();
    if effect.damage.is_none() {
        return dates;
    }
    while let Some(next) = active.next_date {
        if next > now || dates.len() >= limit {
            break;
        }
        if effect.interval.is_none() && active.start_date != Some(now) {
            break;
        }
        if active.end_date.is_some_and(|end| next > end) {
            break;
        }
        dates.push(next);
        match effect.interval {
            Some(interval) => active.next_date = Some(next + interval),
            None => {
                active.next_date = None;
                break;
            }
        }
    }
    dates
}

/// Resolve one damage tick per date on `character`
fn deal_ticks(
    ctx: &RulesContext<'_>,
    character: &mut Character,
    effect: &Effect,
    dates: &[GameDate],
    dice: &mut dyn Dice,
) -> Result<Vec<DamageHistory>> {
    let Some(profile) = &effect.damage else {
        return Ok(Vec::new());
    };
    if dates.is_empty() {
        return Ok(Vec::new());
    }
    let stats = ctx.stats(character, dice)?;
    let request = DamageRequest::from_profile(profile);
    let mut damages = Vec::with_capacity(dates.len());
    for date in dates {
        let mut history = resolve_damage(ctx, character, &stats, &request, dice)?;
        history.game_date = *date;
        damages.push(history);
    }
    Ok(damages)
}

/// Tick the instance at `index` of the character's own effects
fn tick_at(
    ctx: &RulesContext<'_>,
    character: &mut Character,
    index: usize,
    dice: &mut dyn Dice,
) -> Result<Vec<DamageHistory>> {
    let effect = ctx.catalog.effect(character.effects[index].effect)?;
    let dates = due_ticks(
        &mut character.effects[index],
        effect,
        ctx.now,
        ctx.config.max_effect_ticks,
    );
    deal_ticks(ctx, character, effect, &dates, dice)
}

/// Attach an effect to a character and deal its immediate damage
pub fn affect(
    ctx: &RulesContext<'_>,
    character: &mut Character,
    effect_id: EffectId,
    forced: bool,
    dice: &mut dyn Dice,
) -> Result<EffectOutcome> {
    let effect = ctx.catalog.effect(effect_id)?;
    let Some(index) = attach(ctx, &mut character.effects, effect, forced, dice) else {
        return Ok(EffectOutcome::default());
    };
    let damages = tick_at(ctx, character, index, dice)?;
    tracing::debug!(character = %character.name, effect = %effect.name, "effect applied");
    Ok(EffectOutcome {
        attached: true,
        damages,
    })
}

/// Deal every damage tick owed by the character's effects up to `now`
pub fn tick_character(
    ctx: &RulesContext<'_>,
    character: &mut Character,
    dice: &mut dyn Dice,
) -> Result<Vec<DamageHistory>> {
    let mut damages = Vec::new();
    for index in 0..character.effects.len() {
        damages.extend(tick_at(ctx, character, index, dice)?);
    }
    Ok(damages)
}

/// Remove every instance of `effect_id`; returns whether one existed
pub fn remove(effects: &mut Vec<ActiveEffect>, effect_id: EffectId) -> bool {
    let before = effects.len();
    effects.retain(|active| active.effect != effect_id);
    effects.len() != before
}

/// Expired, uncontrolled instances, with the effect they chain into
fn take_expired(
    ctx: &RulesContext<'_>,
    effects: &mut Vec<ActiveEffect>,
) -> Result<Vec<(EffectId, Option<EffectId>)>> {
    let mut expired = Vec::new();
    let mut kept = Vec::with_capacity(effects.len());
    for active in effects.drain(..) {
        let effect = ctx.catalog.effect(active.effect)?;
        if active.is_expired(ctx.now) && !effect.controlled {
            expired.push((effect.id, effect.next_effect));
        } else {
            kept.push(active);
        }
    }
    *effects = kept;
    Ok(expired)
}

/// Drop expired character effects and attach what they chain into
///
/// A chained effect that is itself already expired is followed at most
/// `max_effect_chain` times.
pub fn expire_character(
    ctx: &RulesContext<'_>,
    character: &mut Character,
    dice: &mut dyn Dice,
) -> Result<Vec<DamageHistory>> {
    let mut damages = Vec::new();
    for _ in 0..ctx.config.max_effect_chain {
        let expired = take_expired(ctx, &mut character.effects)?;
        if expired.is_empty() {
            break;
        }
        for (id, next) in expired {
            tracing::debug!(character = %character.name, effect = ?id, "effect expired");
            if let Some(next) = next {
                damages.extend(affect(ctx, character, next, false, dice)?.damages);
            }
        }
    }
    Ok(damages)
}

/// Attach an effect to a campaign and deal its immediate damage to every active character
pub fn affect_campaign(
    ctx: &RulesContext<'_>,
    campaign_effects: &mut Vec<ActiveEffect>,
    characters: &mut [&mut Character],
    effect_id: EffectId,
    forced: bool,
    dice: &mut dyn Dice,
) -> Result<EffectOutcome> {
    let effect = ctx.catalog.effect(effect_id)?;
    let Some(index) = attach(ctx, campaign_effects, effect, forced, dice) else {
        return Ok(EffectOutcome::default());
    };
    let dates = due_ticks(
        &mut campaign_effects[index],
        effect,
        ctx.now,
        ctx.config.max_effect_ticks,
    );
    let mut damages = Vec::new();
    for character in characters.iter_mut().filter(|c| c.is_active) {
        damages.extend(deal_ticks(ctx, character, effect, &dates, dice)?);
    }
    Ok(EffectOutcome {
        attached: true,
        damages,
    })
}

/// Deal every tick owed by campaign effects to every active character
pub fn tick_campaign(
    ctx: &RulesContext<'_>,
    campaign_effects: &mut [ActiveEffect],
    characters: &mut [&mut Character],
    dice: &mut dyn Dice,
) -> Result<Vec<DamageHistory>> {
    let mut damages = Vec::new();
    for active in campaign_effects.iter_mut() {
        let effect = ctx.catalog.effect(active.effect)?;
        let dates = due_ticks(active, effect, ctx.now, ctx.config.max_effect_ticks);
        for character in characters.iter_mut().filter(|c| c.is_active) {
            damages.extend(deal_ticks(ctx, character, effect, &dates, dice)?);
        }
    }
    Ok(damages)
}

/// Drop expired campaign effects and attach what they chain into
pub fn expire_campaign(
    ctx: &RulesContext<'_>,
    campaign_effects: &mut Vec<ActiveEffect>,
    characters: &mut [&mut Character],
    dice: &mut dyn Dice,
) -> Result<Vec<DamageHistory>> {
    let mut damages = Vec::new();
    for _ in 0..ctx.config.max_effect_chain {
        let expired = take_expired(ctx, campaign_effects)?;
        if expired.is_empty() {
            break;
        }
        for (_, next) in expired {
            if let Some(next) = next {
                let outcome = affect_campaign(ctx, campaign_effects, characters, next, false, dice)?;
                damages.extend(outcome.damages);
            }
        }
    }
    Ok(damages)
}
