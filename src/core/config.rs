//! Rule constants with documented defaults
//!
//! Every magic number of the ruleset lives here. The defaults reproduce the
//! tabletop rules; a campaign may override any of them from TOML.

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, RulesError};

/// Tunable constants for the rules engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    // === CHARACTER CREATION ===
    /// Points distributed over S.P.E.C.I.A.L. at creation
    pub special_points: i64,

    /// Flat bonus added to every tagged skill
    pub tag_skill_bonus: i64,

    /// Maximum number of tag skills a character may choose
    pub max_tag_skills: usize,

    // === PROGRESSION ===
    /// Experience unit for level thresholds
    ///
    /// Level n requires `sum((l - 1) * base_xp for l in 2..=n)`, so level 2 needs
    /// 1000 and level 3 needs 3000 at the default value.
    pub base_xp: i64,

    /// Multiplier turning a creature's level into a baseline skill
    pub leveled_stats_mult: i64,

    // === ROLLS ===
    /// Highest d10 result counting as a critical success on S.P.E.C.I.A.L. rolls
    pub critical_success_d10: i64,

    /// Lowest d10 result counting as a critical failure on S.P.E.C.I.A.L. rolls
    pub critical_fail_d10: i64,

    /// Highest d100 result counting as a critical success for average luck (5)
    pub critical_success_d100: i64,

    /// Lowest d100 result counting as a critical failure for average luck (5)
    pub critical_fail_d100: i64,

    /// How strongly luck shrinks the d100 range on skill rolls
    pub luck_roll_mult: i64,

    // === SURVIVAL ===
    /// Consumption multiplier while resting
    pub needs_resting_rate: f64,

    /// Consumption multiplier while active
    pub needs_normal_rate: f64,

    /// Healing rate multiplier while resting
    pub healing_rate_resting_mult: f64,

    /// Upper bound of every need counter
    pub max_need: f64,

    // === COMBAT ===
    /// Hit chance never exceeds this percentage
    pub max_hit_chance: i64,

    /// Resistances never exceed this percentage
    pub max_damage_resistance: f64,

    /// Hit chance lost per cell closer than a weapon's minimum range
    pub ranged_bonus_mult: i64,

    /// Hit chance lost per cell beyond a weapon's optimal range
    pub ranged_malus_mult: i64,

    /// Absolute range multiplier for ranged fire
    pub range_normal_mult: i64,

    /// Absolute range multiplier for long-range weapons
    pub range_long_mult: i64,

    /// Absolute range multiplier for scoped weapons
    pub range_scoped_mult: i64,

    /// Hit chance lost per missing point of strength
    pub min_strength_malus: i64,

    /// Hit chance lost per missing point of skill
    pub min_skill_malus: i64,

    // === ACTION POINTS ===
    /// Attack cost when the weapon defines none (and unarmed)
    pub ap_cost_fight: i64,
    pub ap_cost_equip: i64,
    pub ap_cost_use: i64,
    pub ap_cost_drop: i64,
    pub ap_cost_take: i64,
    pub ap_cost_repair: i64,

    // === EXPERIENCE ===
    pub xp_gain_roll_fail: i64,
    pub xp_gain_roll_success: i64,
    /// Per-level multiplier for a missed attack
    pub xp_gain_fight_miss: i64,
    /// Per-level multiplier for a landed attack
    pub xp_gain_fight_hit: i64,
    /// Per-level multiplier for each burst entry
    pub xp_gain_burst: i64,

    // === TIME ===
    /// Seconds consumed by a combat turn
    pub turn_time: i64,

    // === ENGINE BOUNDS ===
    /// Upper bound of damage ticks processed for one effect in one call
    ///
    /// Catch-up ticking is already bounded by elapsed time; this guards against
    /// absurd clock jumps with tiny intervals.
    pub max_effect_ticks: usize,

    /// Upper bound of `next_effect` links followed in one expiry pass
    pub max_effect_chain: usize,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            special_points: 40,
            tag_skill_bonus: 20,
            max_tag_skills: 5,

            base_xp: 1000,
            leveled_stats_mult: 10,

            critical_success_d10: 1,
            critical_fail_d10: 10,
            critical_success_d100: 5,
            critical_fail_d100: 96,
            luck_roll_mult: 1,

            needs_resting_rate: 0.75,
            needs_normal_rate: 1.0,
            healing_rate_resting_mult: 4.0,
            max_need: 1000.0,

            max_hit_chance: 95,
            max_damage_resistance: 95.0,
            ranged_bonus_mult: 2,
            ranged_malus_mult: 4,
            range_normal_mult: 2,
            range_long_mult: 4,
            range_scoped_mult: 5,
            min_strength_malus: 20,
            min_skill_malus: 1,

            ap_cost_fight: 5,
            ap_cost_equip: 4,
            ap_cost_use: 3,
            ap_cost_drop: 2,
            ap_cost_take: 2,
            ap_cost_repair: 5,

            xp_gain_roll_fail: 5,
            xp_gain_roll_success: 3,
            xp_gain_fight_miss: 5,
            xp_gain_fight_hit: 3,
            xp_gain_burst: 2,

            turn_time: 30,

            max_effect_ticks: 10_000,
            max_effect_chain: 16,
        }
    }
}

impl RulesConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a (possibly partial) TOML document; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: RulesConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.base_xp <= 0 {
            return Err(RulesError::Config("base_xp must be positive".into()));
        }

        if self.critical_success_d100 >= self.critical_fail_d100 {
            return Err(RulesError::Config(format!(
                "critical_success_d100 ({}) should be < critical_fail_d100 ({})",
                self.critical_success_d100, self.critical_fail_d100
            )));
        }

        if self.critical_success_d10 >= self.critical_fail_d10 {
            return Err(RulesError::Config(format!(
                "critical_success_d10 ({}) should be < critical_fail_d10 ({})",
                self.critical_success_d10, self.critical_fail_d10
            )));
        }

        if !(0..=100).contains(&self.max_hit_chance) {
            return Err(RulesError::Config(format!(
                "max_hit_chance ({}) must be a percentage",
                self.max_hit_chance
            )));
        }

        if !(0.0..=100.0).contains(&self.max_damage_resistance) {
            return Err(RulesError::Config(format!(
                "max_damage_resistance ({}) must be a percentage",
                self.max_damage_resistance
            )));
        }

        if self.max_need <= 0.0 {
            return Err(RulesError::Config("max_need must be positive".into()));
        }

        if self.max_effect_ticks == 0 || self.max_effect_chain == 0 {
            return Err(RulesError::Config("effect bounds must be at least 1".into()));
        }

        Ok(())
    }

    /// Absolute range multiplier for a firing mode
    pub fn range_mult(&self, mode: crate::items::WeaponMode) -> i64 {
        use crate::items::WeaponMode;
        match mode {
            WeaponMode::Ranged => self.range_normal_mult,
            WeaponMode::Long => self.range_long_mult,
            WeaponMode::Scoped => self.range_scoped_mult,
            WeaponMode::Melee | WeaponMode::Throw => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(RulesConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = RulesConfig::from_toml_str("base_xp = 500\nmax_hit_chance = 90\n").unwrap();
        assert_eq!(config.base_xp, 500);
        assert_eq!(config.max_hit_chance, 90);
        assert_eq!(config.tag_skill_bonus, 20);
        assert_eq!(config.critical_fail_d100, 96);
    }

    #[test]
    fn test_invalid_critical_bounds() {
        let config = RulesConfig {
            critical_success_d100: 97,
            ..RulesConfig::default()
        };
        assert!(matches!(config.validate(), Err(RulesError::Config(_))));
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let result = RulesConfig::from_toml_str("base_xp = \"lots\"");
        assert!(matches!(result, Err(RulesError::Toml(_))));
    }
}
