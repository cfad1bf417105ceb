//! Experience, levels and skill point spending

use serde::{Deserialize, Serialize};

use crate::core::config::RulesConfig;
use crate::core::dice::Dice;
use crate::core::error::{ensure, Result};
use crate::entity::character::Character;
use crate::rules::context::RulesContext;
use crate::stats::block::StatBlock;
use crate::stats::ids::{Leveled, Skill};

/// Level reached after an experience change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelProgress {
    pub level: u32,
    /// Experience needed for the next level
    pub required: i64,
    pub leveled_up: bool,
}

/// Total experience needed to reach `level`
///
/// `sum((l - 1) * base_xp for l in 2..=level)`: 0 for level 1, 1000 for level 2,
/// 3000 for level 3 with the default unit.
pub fn required_experience(config: &RulesConfig, level: u32) -> i64 {
    let level = level as i64;
    if level < 2 {
        return 0;
    }
    config.base_xp * level * (level - 1) / 2
}

/// Gain every level the current experience allows
///
/// Each level grants the per-level skill points and hit points, and a perk
/// point on multiples of the perk rate. `stats` are the character's derived
/// stats.
pub fn check_level(config: &RulesConfig, character: &mut Character, stats: &StatBlock) -> LevelProgress {
    let start = character.level;
    let skill_points = stats.leveled(Leveled::SkillPointsPerLevel) as i64;
    let hit_points = stats.leveled(Leveled::HitPointsPerLevel) as i64;
    let perk_rate = stats.leveled(Leveled::PerkRate) as u32;

    while character.experience >= required_experience(config, character.level + 1) {
        character.level += 1;
        character.skill_points += skill_points;
        character.health += hit_points;
        if perk_rate > 0 && character.level % perk_rate == 0 {
            character.perk_points += 1;
        }
        tracing::debug!(character = %character.name, level = character.level, "level gained");
    }

    LevelProgress {
        level: character.level,
        required: required_experience(config, character.level + 1),
        leveled_up: character.level > start,
    }
}

/// Add experience and run the level loop
pub fn add_experience(
    config: &RulesConfig,
    character: &mut Character,
    stats: &StatBlock,
    amount: i64,
) -> LevelProgress {
    character.experience += amount;
    check_level(config, character, stats)
}

/// Spend skill points on a skill; tag skills gain double
///
/// Returns the new base value of the skill.
pub fn levelup(character: &mut Character, skill: Skill, points: i64) -> Result<f64> {
    ensure(points > 0, "at least one skill point must be spent")?;
    ensure(
        points <= character.skill_points,
        format!(
            "{} skill points requested, {} available",
            points, character.skill_points
        ),
    )?;
    let gain = if character.tag_skills.contains(&skill) {
        points * 2
    } else {
        points
    };
    character.base.add(skill, gain as f64);
    character.skill_points -= points;
    Ok(character.base.skill(skill))
}

/// Skill points spent so far, tag skills counting half
pub fn used_skill_points(character: &Character) -> f64 {
    Skill::all()
        .into_iter()
        .map(|skill| {
            let rate = if character.tag_skills.contains(&skill) {
                0.5
            } else {
                1.0
            };
            character.base.skill(skill) * rate
        })
        .sum()
}

/// Rebuild a character at `level`, spending every skill point at random
///
/// `rate` is the share of points poured into tag skills. Health and action
/// points end at their maximum.
pub fn randomize(
    ctx: &RulesContext<'_>,
    character: &mut Character,
    level: Option<u32>,
    rate: f64,
    dice: &mut dyn Dice,
) -> Result<()> {
    ensure(
        (0.0..=1.0).contains(&rate),
        format!("tag skill rate {rate} must be between 0 and 1"),
    )?;
    let level = level.unwrap_or(character.level).max(1);
    character.level = 1;
    character.experience = required_experience(ctx.config, level);
    let stats = ctx.stats(character, dice)?;
    check_level(ctx.config, character, &stats);

    let mut points = character.skill_points;
    if !character.tag_skills.is_empty() {
        let tagged = (points as f64 * rate) as i64;
        for _ in 0..tagged {
            let skill = character.tag_skills[dice.pick(character.tag_skills.len())];
            character.base.add(skill, 2.0);
            points -= 1;
        }
    }

    let pool: Vec<Skill> = if rate > 0.0 {
        Skill::all()
            .into_iter()
            .filter(|skill| !character.tag_skills.contains(skill))
            .collect()
    } else {
        Skill::all().to_vec()
    };
    while points > 0 && !pool.is_empty() {
        let skill = pool[dice.pick(pool.len())];
        let gain = if character.tag_skills.contains(&skill) {
            2.0
        } else {
            1.0
        };
        character.base.add(skill, gain);
        points -= 1;
    }
    character.skill_points = points;

    let stats = ctx.stats(character, dice)?;
    character.health = stats.max_health() as i64;
    character.action_points = stats.max_action_points() as i64;
    Ok(())
}
