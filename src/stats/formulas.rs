//! Computed-stat formula table
//!
//! Formulas are evaluated in table order; later entries read the values written
//! by earlier ones (max health reads hit points per level).

use crate::stats::block::StatBlock;
use crate::stats::ids::{Leveled, Protection, Secondary, Skill, Special, StatId};

/// Stats produced by a formula, in evaluation order
pub const COMPUTED_STATS: [StatId; 33] = [
    StatId::Leveled(Leveled::HitPointsPerLevel),
    StatId::Leveled(Leveled::SkillPointsPerLevel),
    StatId::Secondary(Secondary::MaxHealth),
    StatId::Secondary(Secondary::MaxActionPoints),
    StatId::Secondary(Secondary::ArmorClass),
    StatId::Secondary(Secondary::CarryWeight),
    StatId::Secondary(Secondary::MeleeDamage),
    StatId::Secondary(Secondary::Sequence),
    StatId::Secondary(Secondary::HealingRate),
    StatId::Secondary(Secondary::CriticalChance),
    StatId::Secondary(Secondary::CriticalRawChance),
    StatId::Resistance(Protection::Radiation),
    StatId::Resistance(Protection::Poison),
    StatId::Skill(Skill::SmallGuns),
    StatId::Skill(Skill::BigGuns),
    StatId::Skill(Skill::EnergyWeapons),
    StatId::Skill(Skill::Unarmed),
    StatId::Skill(Skill::MeleeWeapons),
    StatId::Skill(Skill::Throwing),
    StatId::Skill(Skill::FirstAid),
    StatId::Skill(Skill::Doctor),
    StatId::Skill(Skill::Chems),
    StatId::Skill(Skill::Sneak),
    StatId::Skill(Skill::Lockpick),
    StatId::Skill(Skill::Steal),
    StatId::Skill(Skill::Traps),
    StatId::Skill(Skill::Explosives),
    StatId::Skill(Skill::Science),
    StatId::Skill(Skill::Repair),
    StatId::Skill(Skill::Speech),
    StatId::Skill(Skill::Barter),
    StatId::Skill(Skill::Survival),
    StatId::Skill(Skill::Knowledge),
];

fn half(value: f64) -> f64 {
    (value / 2.0).floor()
}

/// Evaluate the formula for `stat` against current values, or `None` if the stat has no formula
pub fn formula(stat: StatId, s: &StatBlock, level: u32) -> Option<f64> {
    let st = s.special(Special::Strength);
    let pe = s.special(Special::Perception);
    let en = s.special(Special::Endurance);
    let ch = s.special(Special::Charisma);
    let int = s.special(Special::Intelligence);
    let ag = s.special(Special::Agility);
    let lk = s.special(Special::Luck);

    let value = match stat {
        StatId::Leveled(Leveled::HitPointsPerLevel) => 3.0 + half(en),
        StatId::Leveled(Leveled::SkillPointsPerLevel) => (5.0 + 2.0 * int) * 2.0,
        StatId::Secondary(Secondary::MaxHealth) => {
            let per_level = s.leveled(Leveled::HitPointsPerLevel);
            15.0 + st + 2.0 * en + (level.max(1) - 1) as f64 * per_level
        }
        StatId::Secondary(Secondary::MaxActionPoints) => 5.0 + half(ag),
        StatId::Secondary(Secondary::ArmorClass) => ag,
        StatId::Secondary(Secondary::CarryWeight) => ((15.0 + 15.0 * st) / 3.0).floor(),
        StatId::Secondary(Secondary::MeleeDamage) => (st - 5.0).max(1.0) * 2.0,
        StatId::Secondary(Secondary::Sequence) => 2.0 * pe,
        StatId::Secondary(Secondary::HealingRate) => (en / 3.0).floor(),
        StatId::Secondary(Secondary::CriticalChance) => lk,
        StatId::Secondary(Secondary::CriticalRawChance) => (lk - 5.0).max(1.0),
        StatId::Resistance(Protection::Radiation) => 2.0 * en,
        StatId::Resistance(Protection::Poison) => 5.0 * en,
        StatId::Skill(skill) => match skill {
            Skill::SmallGuns => 5.0 + 4.0 * ag,
            Skill::BigGuns => 2.0 * ag,
            Skill::EnergyWeapons => 2.0 * ag,
            Skill::Unarmed => 30.0 + 2.0 * (st + ag),
            Skill::MeleeWeapons => 20.0 + 2.0 * (st + ag),
            Skill::Throwing => 4.0 * ag,
            Skill::FirstAid => 2.0 * (pe + en),
            Skill::Doctor => 5.0 + pe + int,
            Skill::Chems => 10.0 + 2.0 * int,
            Skill::Sneak => 5.0 + 3.0 * ag,
            Skill::Lockpick => 10.0 + pe + ag,
            Skill::Steal => 3.0 * ag,
            Skill::Traps => 10.0 + 2.0 * pe,
            Skill::Explosives => 2.0 * pe,
            Skill::Science => 4.0 * int,
            Skill::Repair => 3.0 * int,
            Skill::Speech => 5.0 * ch,
            Skill::Barter => 4.0 * ch,
            Skill::Survival => 2.0 * (en + int),
            Skill::Knowledge => 5.0 * int,
        },
        _ => return None,
    };
    Some(value)
}
