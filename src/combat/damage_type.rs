//! Damage types and the resource each one drains

use serde::{Deserialize, Serialize};

use crate::stats::ids::{General, Protection};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageType {
    #[default]
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
    /// Bypasses every threshold and resistance
    Raw,
    Heal,
    HealRad,
    Thirst,
    Hunger,
    Sleep,
    Money,
    Karma,
}

impl DamageType {
    pub fn all() -> [DamageType; 18] {
        [
            DamageType::Normal,
            DamageType::Laser,
            DamageType::Plasma,
            DamageType::Explosive,
            DamageType::Fire,
            DamageType::Electricity,
            DamageType::Poison,
            DamageType::Radiation,
            DamageType::GasContact,
            DamageType::GasInhaled,
            DamageType::Raw,
            DamageType::Heal,
            DamageType::HealRad,
            DamageType::Thirst,
            DamageType::Hunger,
            DamageType::Sleep,
            DamageType::Money,
            DamageType::Karma,
        ]
    }

    /// Protection channel checked against armor and the target, if any
    pub fn protection(&self) -> Option<Protection> {
        match self {
            DamageType::Normal => Some(Protection::Normal),
            DamageType::Laser => Some(Protection::Laser),
            DamageType::Plasma => Some(Protection::Plasma),
            DamageType::Explosive => Some(Protection::Explosive),
            DamageType::Fire => Some(Protection::Fire),
            DamageType::Electricity => Some(Protection::Electricity),
            DamageType::Poison => Some(Protection::Poison),
            DamageType::Radiation => Some(Protection::Radiation),
            DamageType::GasContact => Some(Protection::GasContact),
            DamageType::GasInhaled => Some(Protection::GasInhaled),
            _ => None,
        }
    }

    /// Physical damage also meets the generic damage threshold/resistance and wears armor
    pub fn is_physical(&self) -> bool {
        matches!(
            self,
            DamageType::Normal
                | DamageType::Laser
                | DamageType::Plasma
                | DamageType::Explosive
                | DamageType::Fire
        )
    }

    pub fn is_heal(&self) -> bool {
        matches!(self, DamageType::Heal | DamageType::HealRad)
    }

    /// Resource receiving the final amount
    pub fn resource(&self) -> General {
        match self {
            DamageType::Radiation | DamageType::HealRad => General::Rads,
            DamageType::Thirst => General::Thirst,
            DamageType::Hunger => General::Hunger,
            DamageType::Sleep => General::Sleep,
            DamageType::Money => General::Money,
            DamageType::Karma => General::Karma,
            _ => General::Health,
        }
    }

    /// Money and karma add their signed amount instead of draining a pool
    pub fn is_additive(&self) -> bool {
        matches!(self, DamageType::Money | DamageType::Karma)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_physical_types_have_protection() {
        for kind in DamageType::all() {
            if kind.is_physical() {
                assert!(kind.protection().is_some(), "{kind:?}");
            }
        }
        assert_eq!(DamageType::Raw.protection(), None);
        assert_eq!(DamageType::Heal.protection(), None);
    }

    #[test]
    fn test_resources() {
        assert_eq!(DamageType::Radiation.resource(), General::Rads);
        assert_eq!(DamageType::HealRad.resource(), General::Rads);
        assert_eq!(DamageType::Plasma.resource(), General::Health);
        assert_eq!(DamageType::Heal.resource(), General::Health);
        assert!(DamageType::Karma.is_additive());
    }

    #[test]
    fn test_serde_codes() {
        let json = serde_json::to_string(&DamageType::GasInhaled).unwrap();
        assert_eq!(json, "\"gas_inhaled\"");
    }
}
