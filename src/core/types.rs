//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CharacterId(pub Uuid);

impl CharacterId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CharacterId {
    fn default() -> Self {
        Self::new()
    }
}

/// Unique identifier for a campaign
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CampaignId(pub Uuid);

impl CampaignId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CampaignId {
    fn default() -> Self {
        Self::new()
    }
}

/// Identifier of one inventory stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EquipmentId(pub Uuid);

impl EquipmentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EquipmentId {
    fn default() -> Self {
        Self::new()
    }
}

/// Identifier of a loot stack lying in a campaign
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LootId(pub Uuid);

impl LootId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for LootId {
    fn default() -> Self {
        Self::new()
    }
}

/// Catalog key of an item template
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub u32);

/// Catalog key of an effect template
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EffectId(pub u32);

/// Catalog key of a loot template
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LootTemplateId(pub u32);

/// Logical campaign time, in seconds since the campaign epoch
pub type GameDate = i64;

/// Logical duration, in seconds
pub type GameSeconds = i64;

pub const MINUTE: GameSeconds = 60;
pub const HOUR: GameSeconds = 60 * MINUTE;
pub const DAY: GameSeconds = 24 * HOUR;

/// Hours covered by a span of game seconds
pub fn hours(seconds: GameSeconds) -> f64 {
    seconds as f64 / HOUR as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(CharacterId::new(), CharacterId::new());
        assert_ne!(EquipmentId::new(), EquipmentId::new());
    }

    #[test]
    fn test_hours() {
        assert_eq!(hours(HOUR), 1.0);
        assert_eq!(hours(30 * MINUTE), 0.5);
        assert_eq!(hours(DAY), 24.0);
    }
}
