//! Item templates from the catalog

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::combat::damage_type::DamageType;
use crate::core::dice::Dice;
use crate::core::error::{ensure, Result};
use crate::core::types::{EffectId, ItemId};
use crate::stats::ids::{Protection, Skill};
use crate::stats::modifier::Modifier;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Weapon,
    Ammo,
    Armor,
    Helmet,
    Grenade,
    Food,
    Chem,
    Tool,
    Book,
    #[default]
    Misc,
}

impl ItemType {
    pub fn all() -> [ItemType; 10] {
        [
            ItemType::Weapon,
            ItemType::Ammo,
            ItemType::Armor,
            ItemType::Helmet,
            ItemType::Grenade,
            ItemType::Food,
            ItemType::Chem,
            ItemType::Tool,
            ItemType::Book,
            ItemType::Misc,
        ]
    }

    /// Types that occupy an equipment slot of their own name
    pub fn is_equipable(&self) -> bool {
        matches!(
            self,
            ItemType::Weapon | ItemType::Ammo | ItemType::Armor | ItemType::Helmet | ItemType::Grenade
        )
    }

    pub fn is_usable(&self) -> bool {
        matches!(self, ItemType::Food | ItemType::Chem)
    }

    /// Repairable items carry a condition and never stack
    pub fn is_repairable(&self) -> bool {
        matches!(self, ItemType::Weapon | ItemType::Armor | ItemType::Helmet)
    }
}

/// How a weapon reaches its target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponMode {
    #[default]
    Melee,
    Ranged,
    Long,
    Scoped,
    Throw,
}

impl WeaponMode {
    pub fn all() -> [WeaponMode; 5] {
        [
            WeaponMode::Melee,
            WeaponMode::Ranged,
            WeaponMode::Long,
            WeaponMode::Scoped,
            WeaponMode::Throw,
        ]
    }

    /// Skill used when the item does not name one
    pub fn default_skill(&self) -> Skill {
        match self {
            WeaponMode::Melee => Skill::MeleeWeapons,
            WeaponMode::Throw => Skill::Throwing,
            WeaponMode::Ranged | WeaponMode::Long | WeaponMode::Scoped => Skill::SmallGuns,
        }
    }
}

/// `raw + random(min, max)` of a given type
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageProfile {
    #[serde(default)]
    pub raw: f64,
    #[serde(default)]
    pub min: i64,
    #[serde(default)]
    pub max: i64,
    #[serde(rename = "type", default)]
    pub kind: DamageType,
}

impl DamageProfile {
    pub fn new(kind: DamageType, raw: f64, min: i64, max: i64) -> Self {
        Self { raw, min, max, kind }
    }

    pub fn validate(&self) -> Result<()> {
        ensure(
            self.min <= self.max,
            format!("damage range {}..{} is inverted", self.min, self.max),
        )
    }

    pub fn roll(&self, dice: &mut dyn Dice) -> f64 {
        self.raw + dice.range(self.min, self.max) as f64
    }
}

/// Threshold (flat) and resistance (percent) against one protection channel
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Guard {
    #[serde(default)]
    pub threshold: f64,
    #[serde(default)]
    pub resistance: f64,
}

/// Static item template
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ItemType,
    pub value: i64,
    pub weight: f64,
    pub damage: Option<DamageProfile>,
    pub protection: AHashMap<Protection, Guard>,

    // Weapon
    pub mode: WeaponMode,
    pub hands: u8,
    pub skill: Option<Skill>,
    pub min_strength: i64,
    pub min_skill: i64,
    pub min_range: i64,
    pub max_range: i64,
    pub clip_size: i64,
    pub burst_count: i64,
    pub ap_cost_normal: i64,
    pub ap_cost_target: i64,
    pub ap_cost_burst: i64,
    pub ap_cost_reload: i64,

    // Weapon and ammunition adjustments
    pub hit_chance_modifier: i64,
    pub armor_class_modifier: i64,
    pub critical_modifier: i64,
    /// Percentage added to critical damage
    pub critical_damage: f64,
    /// Flat damage added on a critical hit
    pub critical_bonus_damage: f64,
    /// Percentage added to base damage
    pub damage_modifier: f64,
    pub threshold_modifier: f64,
    pub threshold_rate_modifier: f64,
    pub resistance_modifier: f64,

    // Protection
    pub armor_class: i64,
    /// Uses before a pristine item breaks; 0 never wears
    pub durability: f64,
    pub condition_modifier: f64,

    /// Effects on use (food, chems) or on hit (weapons, ammunition, armor)
    pub effects: Vec<EffectId>,
    /// Stat modifiers while equipped
    pub modifiers: Vec<Modifier>,
    /// Ammunition a weapon accepts
    pub ammunition: Vec<ItemId>,
}

impl Item {
    pub fn new(id: ItemId, name: impl Into<String>, kind: ItemType) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            hands: 1,
            ..Default::default()
        }
    }

    pub fn guard(&self, kind: Protection) -> Guard {
        self.protection.get(&kind).copied().unwrap_or_default()
    }

    pub fn threshold(&self, kind: Protection) -> f64 {
        self.guard(kind).threshold
    }

    pub fn resistance(&self, kind: Protection) -> f64 {
        self.guard(kind).resistance
    }

    /// Skill trained by this weapon
    pub fn weapon_skill(&self) -> Skill {
        self.skill.unwrap_or_else(|| self.mode.default_skill())
    }

    pub fn is_melee(&self) -> bool {
        self.mode == WeaponMode::Melee
    }

    pub fn is_throwable(&self) -> bool {
        self.mode == WeaponMode::Throw || self.kind == ItemType::Grenade
    }

    pub fn uses_clip(&self) -> bool {
        self.kind == ItemType::Weapon && !self.is_melee() && !self.is_throwable() && self.clip_size > 0
    }

    pub fn is_two_handed(&self) -> bool {
        self.hands >= 2
    }

    pub fn accepts(&self, ammo: ItemId) -> bool {
        self.ammunition.contains(&ammo)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(damage) = &self.damage {
            damage.validate()?;
        }
        for modifier in &self.modifiers {
            modifier.validate()?;
        }
        ensure(self.weight >= 0.0, format!("{} has a negative weight", self.name))?;
        ensure(
            self.min_range <= self.max_range || self.max_range == 0,
            format!("{} has min_range above max_range", self.name),
        )?;
        ensure(
            self.durability >= 0.0,
            format!("{} has a negative durability", self.name),
        )
    }
}
