//! Immutable records of resolved actions
//!
//! One record is produced per roll, damage application or attack. Records are
//! never mutated after being returned; persisting them is up to the caller.

use serde::{Deserialize, Serialize};

use crate::combat::body_part::BodyPart;
use crate::combat::damage_type::DamageType;
use crate::core::types::{CharacterId, GameDate, ItemId};
use crate::stats::ids::StatId;

/// Outcome of a skill or attribute roll
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollHistory {
    pub character: CharacterId,
    pub game_date: GameDate,
    pub stat: StatId,
    pub value: i64,
    pub modifier: i64,
    pub roll: i64,
    pub success: bool,
    pub critical: bool,
    pub experience: i64,
}

impl RollHistory {
    pub fn label(&self) -> &'static str {
        match (self.success, self.critical) {
            (true, true) => "critical success",
            (true, false) => "success",
            (false, false) => "failure",
            (false, true) => "critical failure",
        }
    }
}

/// Every intermediate value of one damage application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageHistory {
    pub character: CharacterId,
    pub game_date: GameDate,
    pub damage_type: DamageType,
    pub body_part: BodyPart,
    pub raw_damage: f64,
    pub min_damage: i64,
    pub max_damage: i64,
    /// `raw + random(min, max)` before any protection
    pub base_damage: f64,
    pub armor: Option<ItemId>,
    pub armor_threshold: f64,
    pub armor_resistance: f64,
    /// Condition the armor lost
    pub armor_damage: f64,
    pub damage_threshold: f64,
    pub damage_resistance: f64,
    /// Signed delta applied to the target resource (negative for heals)
    pub real_damage: i64,
    /// Share of maximum health removed, for experience scaling
    pub damage_rate: f64,
}

impl DamageHistory {
    pub(crate) fn empty(character: CharacterId, game_date: GameDate, damage_type: DamageType) -> Self {
        Self {
            character,
            game_date,
            damage_type,
            body_part: BodyPart::Torso,
            raw_damage: 0.0,
            min_damage: 0,
            max_damage: 0,
            base_damage: 0.0,
            armor: None,
            armor_threshold: 0.0,
            armor_resistance: 0.0,
            armor_damage: 0.0,
            damage_threshold: 0.0,
            damage_resistance: 0.0,
            real_damage: 0,
            damage_rate: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FightStatus {
    HitSucceed,
    HitFailed,
    NotEnoughAp,
    NoMoreAmmo,
    TargetDead,
    TargetKilled,
    WeaponBroken,
}

impl FightStatus {
    /// Statuses ending a burst early
    pub fn stops_burst(&self) -> bool {
        matches!(
            self,
            FightStatus::NotEnoughAp | FightStatus::NoMoreAmmo | FightStatus::WeaponBroken
        )
    }

    /// Statuses decided before any roll
    pub fn is_early_exit(&self) -> bool {
        matches!(
            self,
            FightStatus::NotEnoughAp
                | FightStatus::NoMoreAmmo
                | FightStatus::TargetDead
                | FightStatus::WeaponBroken
        )
    }
}

/// One attack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FightHistory {
    pub attacker: CharacterId,
    pub defender: CharacterId,
    pub game_date: GameDate,
    pub attacker_weapon: Option<ItemId>,
    pub attacker_ammo: Option<ItemId>,
    pub defender_armor: Option<ItemId>,
    pub range: i64,
    pub body_part: BodyPart,
    /// The attacker aimed at `body_part`
    pub aimed: bool,
    pub burst: bool,
    /// 1-based shot number inside a burst
    pub hit_count: u32,
    pub hit_modifier: i64,
    pub hit_chance: i64,
    pub hit_roll: i64,
    pub success: bool,
    pub critical: bool,
    pub status: FightStatus,
    pub ap_cost: i64,
    pub experience: i64,
    pub damage: Option<DamageHistory>,
    /// Immediate ticks of on-hit effects
    pub effect_damages: Vec<DamageHistory>,
    /// Forced attack on the secondary target after a critical failure
    pub redirected: Option<Box<FightHistory>>,
}

impl FightHistory {
    pub(crate) fn new(attacker: CharacterId, defender: CharacterId, game_date: GameDate) -> Self {
        Self {
            attacker,
            defender,
            game_date,
            attacker_weapon: None,
            attacker_ammo: None,
            defender_armor: None,
            range: 0,
            body_part: BodyPart::Torso,
            aimed: false,
            burst: false,
            hit_count: 1,
            hit_modifier: 0,
            hit_chance: 0,
            hit_roll: 0,
            success: false,
            critical: false,
            status: FightStatus::HitFailed,
            ap_cost: 0,
            experience: 0,
            damage: None,
            effect_damages: Vec::new(),
            redirected: None,
        }
    }

    /// Damage dealt to the defender, 0 on a miss
    pub fn real_damage(&self) -> i64 {
        self.damage.as_ref().map(|d| d.real_damage).unwrap_or(0)
    }

    pub fn damage_rate(&self) -> f64 {
        self.damage.as_ref().map(|d| d.damage_rate).unwrap_or(0.0)
    }
}
