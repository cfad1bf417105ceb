//! Fixed enumeration of every statistic the rules know about
//!
//! Stats are addressed through [`StatId`], never by name lookups, so a typo is a
//! compile error rather than a silently defaulted zero. The string codes
//! (`"strength"`, `"small_guns"`, `"fire_resistance"`) are only used at the
//! serialization boundary.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::error::RulesError;

/// The seven primary attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Special {
    Strength,
    Perception,
    Endurance,
    Charisma,
    Intelligence,
    Agility,
    Luck,
}

impl Special {
    pub fn all() -> [Special; 7] {
        [
            Special::Strength,
            Special::Perception,
            Special::Endurance,
            Special::Charisma,
            Special::Intelligence,
            Special::Agility,
            Special::Luck,
        ]
    }

    pub fn code(&self) -> &'static str {
        match self {
            Special::Strength => "strength",
            Special::Perception => "perception",
            Special::Endurance => "endurance",
            Special::Charisma => "charisma",
            Special::Intelligence => "intelligence",
            Special::Agility => "agility",
            Special::Luck => "luck",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Skill {
    SmallGuns,
    BigGuns,
    EnergyWeapons,
    Unarmed,
    MeleeWeapons,
    Throwing,
    FirstAid,
    Doctor,
    Chems,
    Sneak,
    Lockpick,
    Steal,
    Traps,
    Explosives,
    Science,
    Repair,
    Speech,
    Barter,
    Survival,
    Knowledge,
}

impl Skill {
    pub fn all() -> [Skill; 20] {
        [
            Skill::SmallGuns,
            Skill::BigGuns,
            Skill::EnergyWeapons,
            Skill::Unarmed,
            Skill::MeleeWeapons,
            Skill::Throwing,
            Skill::FirstAid,
            Skill::Doctor,
            Skill::Chems,
            Skill::Sneak,
            Skill::Lockpick,
            Skill::Steal,
            Skill::Traps,
            Skill::Explosives,
            Skill::Science,
            Skill::Repair,
            Skill::Speech,
            Skill::Barter,
            Skill::Survival,
            Skill::Knowledge,
        ]
    }

    pub fn code(&self) -> &'static str {
        match self {
            Skill::SmallGuns => "small_guns",
            Skill::BigGuns => "big_guns",
            Skill::EnergyWeapons => "energy_weapons",
            Skill::Unarmed => "unarmed",
            Skill::MeleeWeapons => "melee_weapons",
            Skill::Throwing => "throwing",
            Skill::FirstAid => "first_aid",
            Skill::Doctor => "doctor",
            Skill::Chems => "chems",
            Skill::Sneak => "sneak",
            Skill::Lockpick => "lockpick",
            Skill::Steal => "steal",
            Skill::Traps => "traps",
            Skill::Explosives => "explosives",
            Skill::Science => "science",
            Skill::Repair => "repair",
            Skill::Speech => "speech",
            Skill::Barter => "barter",
            Skill::Survival => "survival",
            Skill::Knowledge => "knowledge",
        }
    }

    /// Close-combat skills add melee damage and never fire beyond reach
    pub fn is_melee(&self) -> bool {
        matches!(self, Skill::Unarmed | Skill::MeleeWeapons)
    }
}

/// Secondary statistics, mostly derived from S.P.E.C.I.A.L.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Secondary {
    MaxHealth,
    MaxActionPoints,
    CarryWeight,
    ArmorClass,
    MeleeDamage,
    Sequence,
    HealingRate,
    ApCostModifier,
    OneHandAccuracy,
    TwoHandsAccuracy,
    DamageModifier,
    CriticalChance,
    CriticalRawChance,
    CriticalDamage,
}

impl Secondary {
    pub fn all() -> [Secondary; 14] {
        [
            Secondary::MaxHealth,
            Secondary::MaxActionPoints,
            Secondary::CarryWeight,
            Secondary::ArmorClass,
            Secondary::MeleeDamage,
            Secondary::Sequence,
            Secondary::HealingRate,
            Secondary::ApCostModifier,
            Secondary::OneHandAccuracy,
            Secondary::TwoHandsAccuracy,
            Secondary::DamageModifier,
            Secondary::CriticalChance,
            Secondary::CriticalRawChance,
            Secondary::CriticalDamage,
        ]
    }

    pub fn code(&self) -> &'static str {
        match self {
            Secondary::MaxHealth => "max_health",
            Secondary::MaxActionPoints => "max_action_points",
            Secondary::CarryWeight => "carry_weight",
            Secondary::ArmorClass => "armor_class",
            Secondary::MeleeDamage => "melee_damage",
            Secondary::Sequence => "sequence",
            Secondary::HealingRate => "healing_rate",
            Secondary::ApCostModifier => "ap_cost_modifier",
            Secondary::OneHandAccuracy => "one_hand_accuracy",
            Secondary::TwoHandsAccuracy => "two_hands_accuracy",
            Secondary::DamageModifier => "damage_modifier",
            Secondary::CriticalChance => "critical_chance",
            Secondary::CriticalRawChance => "critical_raw_chance",
            Secondary::CriticalDamage => "critical_damage",
        }
    }

    /// Modifier-style stats may legitimately go negative
    pub fn is_signed(&self) -> bool {
        matches!(
            self,
            Secondary::ApCostModifier
                | Secondary::OneHandAccuracy
                | Secondary::TwoHandsAccuracy
                | Secondary::DamageModifier
                | Secondary::CriticalDamage
        )
    }
}

/// Stats driving level-up rewards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Leveled {
    HitPointsPerLevel,
    SkillPointsPerLevel,
    PerkRate,
}

impl Leveled {
    pub fn all() -> [Leveled; 3] {
        [
            Leveled::HitPointsPerLevel,
            Leveled::SkillPointsPerLevel,
            Leveled::PerkRate,
        ]
    }

    pub fn code(&self) -> &'static str {
        match self {
            Leveled::HitPointsPerLevel => "hit_points_per_level",
            Leveled::SkillPointsPerLevel => "skill_points_per_level",
            Leveled::PerkRate => "perk_rate",
        }
    }
}

/// Protection channels: one resistance and one threshold each
///
/// `Damage` is the generic channel added on top of the physical ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Protection {
    Damage,
    Normal,
    Laser,
    Plasma,
    Explosive,
    Fire,
    Electricity,
    Poison,
    Radiation,
    GasContact,
    GasInhaled,
}

impl Protection {
    pub fn all() -> [Protection; 11] {
        [
            Protection::Damage,
            Protection::Normal,
            Protection::Laser,
            Protection::Plasma,
            Protection::Explosive,
            Protection::Fire,
            Protection::Electricity,
            Protection::Poison,
            Protection::Radiation,
            Protection::GasContact,
            Protection::GasInhaled,
        ]
    }

    pub fn code(&self) -> &'static str {
        match self {
            Protection::Damage => "damage",
            Protection::Normal => "normal",
            Protection::Laser => "laser",
            Protection::Plasma => "plasma",
            Protection::Explosive => "explosive",
            Protection::Fire => "fire",
            Protection::Electricity => "electricity",
            Protection::Poison => "poison",
            Protection::Radiation => "radiation",
            Protection::GasContact => "gas_contact",
            Protection::GasInhaled => "gas_inhaled",
        }
    }

    fn from_code(code: &str) -> Option<Protection> {
        Protection::all().into_iter().find(|p| p.code() == code)
    }
}

/// Character-side values that are not part of the derived view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum General {
    Health,
    ActionPoints,
    Thirst,
    Hunger,
    Sleep,
    Rads,
    Experience,
    SkillPoints,
    PerkPoints,
    Karma,
    Money,
}

impl General {
    pub fn all() -> [General; 11] {
        [
            General::Health,
            General::ActionPoints,
            General::Thirst,
            General::Hunger,
            General::Sleep,
            General::Rads,
            General::Experience,
            General::SkillPoints,
            General::PerkPoints,
            General::Karma,
            General::Money,
        ]
    }

    pub fn code(&self) -> &'static str {
        match self {
            General::Health => "health",
            General::ActionPoints => "action_points",
            General::Thirst => "thirst",
            General::Hunger => "hunger",
            General::Sleep => "sleep",
            General::Rads => "rads",
            General::Experience => "experience",
            General::SkillPoints => "skill_points",
            General::PerkPoints => "perk_points",
            General::Karma => "karma",
            General::Money => "money",
        }
    }
}

/// Any statistic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum StatId {
    Special(Special),
    Skill(Skill),
    Secondary(Secondary),
    Leveled(Leveled),
    Resistance(Protection),
    Threshold(Protection),
    General(General),
}

/// Number of stats held in a [`crate::stats::StatBlock`]
pub const EDITABLE_STAT_COUNT: usize = 7 + 20 + 14 + 3 + 11 + 11;

impl StatId {
    /// Every stat that lives in the derived view, in block order
    pub fn editable() -> Vec<StatId> {
        let mut stats = Vec::with_capacity(EDITABLE_STAT_COUNT);
        stats.extend(Special::all().into_iter().map(StatId::Special));
        stats.extend(Skill::all().into_iter().map(StatId::Skill));
        stats.extend(Secondary::all().into_iter().map(StatId::Secondary));
        stats.extend(Leveled::all().into_iter().map(StatId::Leveled));
        stats.extend(Protection::all().into_iter().map(StatId::Resistance));
        stats.extend(Protection::all().into_iter().map(StatId::Threshold));
        stats
    }

    pub fn is_editable(&self) -> bool {
        !matches!(self, StatId::General(_))
    }

    /// Slot of an editable stat in a [`crate::stats::StatBlock`]
    pub fn index(&self) -> Option<usize> {
        match self {
            StatId::Special(s) => Some(*s as usize),
            StatId::Skill(s) => Some(7 + *s as usize),
            StatId::Secondary(s) => Some(27 + *s as usize),
            StatId::Leveled(s) => Some(41 + *s as usize),
            StatId::Resistance(p) => Some(44 + *p as usize),
            StatId::Threshold(p) => Some(55 + *p as usize),
            StatId::General(_) => None,
        }
    }

    /// Lowest value a modified stat may take when no explicit or racial bound applies
    pub fn floor(&self) -> Option<f64> {
        match self {
            StatId::Secondary(s) if s.is_signed() => None,
            StatId::Resistance(_) | StatId::Threshold(_) => None,
            StatId::General(General::Karma) | StatId::General(General::Money) => None,
            _ => Some(0.0),
        }
    }

    pub fn is_special(&self) -> bool {
        matches!(self, StatId::Special(_))
    }
}

impl fmt::Display for StatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatId::Special(s) => f.write_str(s.code()),
            StatId::Skill(s) => f.write_str(s.code()),
            StatId::Secondary(s) => f.write_str(s.code()),
            StatId::Leveled(s) => f.write_str(s.code()),
            StatId::Resistance(p) => write!(f, "{}_resistance", p.code()),
            StatId::Threshold(p) => write!(f, "{}_threshold", p.code()),
            StatId::General(g) => f.write_str(g.code()),
        }
    }
}

impl FromStr for StatId {
    type Err = RulesError;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        if let Some(kind) = code.strip_suffix("_resistance").and_then(Protection::from_code) {
            return Ok(StatId::Resistance(kind));
        }
        if let Some(kind) = code.strip_suffix("_threshold").and_then(Protection::from_code) {
            return Ok(StatId::Threshold(kind));
        }
        if let Some(s) = Special::all().into_iter().find(|s| s.code() == code) {
            return Ok(StatId::Special(s));
        }
        if let Some(s) = Skill::all().into_iter().find(|s| s.code() == code) {
            return Ok(StatId::Skill(s));
        }
        if let Some(s) = Secondary::all().into_iter().find(|s| s.code() == code) {
            return Ok(StatId::Secondary(s));
        }
        if let Some(s) = Leveled::all().into_iter().find(|s| s.code() == code) {
            return Ok(StatId::Leveled(s));
        }
        if let Some(g) = General::all().into_iter().find(|g| g.code() == code) {
            return Ok(StatId::General(g));
        }
        Err(RulesError::violation(format!("unknown stat '{code}'")))
    }
}

impl TryFrom<String> for StatId {
    type Error = RulesError;

    fn try_from(code: String) -> Result<Self, Self::Error> {
        code.parse()
    }
}

impl From<StatId> for String {
    fn from(stat: StatId) -> Self {
        stat.to_string()
    }
}

impl From<Special> for StatId {
    fn from(s: Special) -> Self {
        StatId::Special(s)
    }
}

impl From<Skill> for StatId {
    fn from(s: Skill) -> Self {
        StatId::Skill(s)
    }
}

impl From<Secondary> for StatId {
    fn from(s: Secondary) -> Self {
        StatId::Secondary(s)
    }
}

impl From<Leveled> for StatId {
    fn from(s: Leveled) -> Self {
        StatId::Leveled(s)
    }
}

impl From<General> for StatId {
    fn from(g: General) -> Self {
        StatId::General(g)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_are_dense_and_unique() {
        let stats = StatId::editable();
        assert_eq!(stats.len(), EDITABLE_STAT_COUNT);
        for (expected, stat) in stats.iter().enumerate() {
            assert_eq!(stat.index(), Some(expected), "{stat}");
        }
        assert_eq!(StatId::General(General::Health).index(), None);
    }

    #[test]
    fn test_codes_parse_back() {
        for stat in StatId::editable() {
            let parsed: StatId = stat.to_string().parse().unwrap();
            assert_eq!(parsed, stat);
        }
        for general in General::all() {
            let parsed: StatId = general.code().parse().unwrap();
            assert_eq!(parsed, StatId::General(general));
        }
    }

    #[test]
    fn test_resistance_codes() {
        assert_eq!(
            "gas_inhaled_resistance".parse::<StatId>().unwrap(),
            StatId::Resistance(Protection::GasInhaled)
        );
        assert_eq!(
            StatId::Threshold(Protection::Damage).to_string(),
            "damage_threshold"
        );
        assert!("charm".parse::<StatId>().is_err());
    }

    #[test]
    fn test_floors() {
        assert_eq!(StatId::Special(Special::Luck).floor(), Some(0.0));
        assert_eq!(StatId::Secondary(Secondary::OneHandAccuracy).floor(), None);
        assert_eq!(StatId::Resistance(Protection::Electricity).floor(), None);
    }
}
