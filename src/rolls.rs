//! Skill and attribute checks

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::dice::Dice;
use crate::core::error::Result;
use crate::entity::character::Character;
use crate::history::RollHistory;
use crate::progression::add_experience;
use crate::rules::context::RulesContext;
use crate::stats::ids::StatId;

/// Roll against a stat of `character`
///
/// S.P.E.C.I.A.L. attributes roll a d10. Everything else rolls
/// `1..=(100 - random(0, luck))`, so lucky characters roll lower. The roll
/// succeeds when it does not exceed `value + modifier`. Experience is granted
/// either way, more for a failure.
pub fn roll(
    ctx: &RulesContext<'_>,
    character: &mut Character,
    stat: StatId,
    modifier: i64,
    dice: &mut dyn Dice,
) -> Result<RollHistory> {
    let config = ctx.config;
    let stats = ctx.stats(character, dice)?;
    let luck = stats.luck().max(0);
    let value = match stat {
        StatId::General(general) => character.general(general),
        _ => stats.get(stat),
    } as i64;

    let special = stat.is_special();
    let roll = if special {
        dice.d10()
    } else {
        let shift = dice.range(0, luck * config.luck_roll_mult);
        dice.range(1, (100 - shift).max(1))
    };

    let (critical_success, critical_fail) = if special {
        (config.critical_success_d10, config.critical_fail_d10)
    } else {
        (luck, config.critical_fail_d100)
    };
    let success = roll <= value + modifier;
    let critical = if success {
        roll <= critical_success
    } else {
        roll >= critical_fail
    };

    let experience = if success {
        config.xp_gain_roll_success
    } else {
        config.xp_gain_roll_fail
    };
    add_experience(config, character, &stats, experience);

    tracing::debug!(
        character = %character.name,
        %stat,
        value,
        modifier,
        roll,
        success,
        critical,
        "roll"
    );

    Ok(RollHistory {
        character: character.id,
        game_date: ctx.now,
        stat,
        value,
        modifier,
        roll,
        success,
        critical,
        experience,
    })
}

/// Outcome counts of a series of rolls
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollStats {
    pub critical_successes: u32,
    pub successes: u32,
    pub failures: u32,
    pub critical_failures: u32,
}

impl RollStats {
    pub fn add(&mut self, success: bool, critical: bool) {
        match (success, critical) {
            (true, true) => self.critical_successes += 1,
            (true, false) => self.successes += 1,
            (false, false) => self.failures += 1,
            (false, true) => self.critical_failures += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.critical_successes + self.successes + self.failures + self.critical_failures
    }

    /// Share of successful rolls, critical or not
    pub fn success_rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        (self.critical_successes + self.successes) as f64 / total as f64
    }

    /// Aggregate histories per rolled stat
    pub fn by_stat<'h>(histories: impl IntoIterator<Item = &'h RollHistory>) -> AHashMap<StatId, RollStats> {
        let mut stats: AHashMap<StatId, RollStats> = AHashMap::new();
        for history in histories {
            stats
                .entry(history.stat)
                .or_default()
                .add(history.success, history.critical);
        }
        stats
    }
}
