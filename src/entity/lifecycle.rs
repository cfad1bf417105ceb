//! Bookkeeping after a character changed
//!
//! [`settle`] commits general-stat modifiers, credits regeneration, runs the
//! level loop and clamps health and action points. What it cannot do itself (cache, loot, activity) comes back
//! as [`Intent`]s for the owner of the character to carry out.

use serde::{Deserialize, Serialize};

use crate::core::config::RulesConfig;
use crate::core::dice::Dice;
use crate::core::error::Result;
use crate::core::types::CharacterId;
use crate::entity::character::Character;
use crate::entity::needs::credit_regeneration;
use crate::progression::check_level;
use crate::rules::context::RulesContext;
use crate::stats::calculator::DerivedStats;

/// Follow-up work requested by [`settle`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Cached derived stats are stale
    InvalidateStats(CharacterId),
    /// Move the inventory to the campaign's loot
    LootCharacter(CharacterId),
    /// Leave the turn order
    Deactivate(CharacterId),
}

/// Settle a character after any change
///
/// Modifiers aimed at health, needs, money and the other stored values are
/// committed once per settle, before anything is clamped. Health and action
/// points that sat at their maximum follow the new maximum (level up,
/// equipment); otherwise they are clamped to `[0, max]`. A dead, active
/// non-player character asks to be looted and deactivated.
pub fn settle(ctx: &RulesContext<'_>, character: &mut Character, dice: &mut dyn Dice) -> Result<Vec<Intent>> {
    let mut before = ctx.stats(character, dice)?;
    if commit_general_deltas(ctx.config, character, &before) {
        before = ctx.stats(character, dice)?;
    }
    credit_regeneration(character, before.max_health());
    let at_max_health = character.health == before.max_health() as i64;
    let at_max_ap = character.action_points == before.max_action_points() as i64;

    let progress = check_level(ctx.config, character, &before);
    let after = if progress.leveled_up {
        ctx.stats(character, dice)?
    } else {
        before
    };
    let max_health = after.max_health() as i64;
    let max_ap = after.max_action_points() as i64;

    character.health = if at_max_health && character.health > 0 {
        max_health
    } else {
        character.health.clamp(0, max_health.max(0))
    };
    character.action_points = if at_max_ap && character.action_points > 0 {
        max_ap
    } else {
        character.action_points.clamp(0, max_ap.max(0))
    };

    let mut intents = vec![Intent::InvalidateStats(character.id)];
    if character.is_active && !character.is_alive() && !character.is_player {
        intents.push(Intent::LootCharacter(character.id));
        intents.push(Intent::Deactivate(character.id));
        tracing::debug!(character = %character.name, "character down");
    }
    Ok(intents)
}

/// Apply the general deltas of `stats`; true when a stored value moved
fn commit_general_deltas(config: &RulesConfig, character: &mut Character, stats: &DerivedStats) -> bool {
    let mut moved = false;
    for &(stat, delta) in &stats.general_deltas {
        moved |= character.change_general(stat, delta, config).abs() > f64::EPSILON;
    }
    moved
}
