//! An item stack owned by a character

use serde::{Deserialize, Serialize};

use crate::core::types::{EquipmentId, ItemId};
use crate::items::item::{Item, ItemType};

/// Binds one catalog item to one character
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    pub id: EquipmentId,
    pub item: ItemId,
    /// Slot the stack is equipped in; `None` while carried
    pub slot: Option<ItemType>,
    pub quantity: i64,
    /// 0.0 (broken) to 1.0 (pristine); `None` for non-repairable items
    pub condition: Option<f64>,
    /// Rounds loaded; `None` for anything but clip-fed weapons
    pub clip_count: Option<i64>,
}

impl Equipment {
    /// Fresh stack of `item`, unequipped, in pristine condition
    pub fn new(item: &Item, quantity: i64) -> Self {
        let mut equipment = Self {
            id: EquipmentId::new(),
            item: item.id,
            slot: None,
            quantity,
            condition: Some(1.0),
            clip_count: Some(0),
        };
        equipment.normalize(item);
        equipment
    }

    pub fn with_condition(mut self, condition: f64, item: &Item) -> Self {
        self.condition = Some(condition);
        self.normalize(item);
        self
    }

    pub fn is_equipped(&self) -> bool {
        self.slot.is_some()
    }

    /// Current condition, 1.0 for items without one
    pub fn wear(&self) -> f64 {
        self.condition.unwrap_or(1.0)
    }

    pub fn rounds(&self) -> i64 {
        self.clip_count.unwrap_or(0)
    }

    pub fn charge(&self, item: &Item) -> f64 {
        item.weight * self.quantity as f64
    }

    pub fn value(&self, item: &Item) -> f64 {
        item.value as f64 * self.quantity as f64 * self.wear()
    }

    /// Re-establish the per-type field shape after a mutation
    pub fn normalize(&mut self, item: &Item) {
        self.quantity = self.quantity.max(0);
        self.condition = if item.kind.is_repairable() {
            Some(self.condition.unwrap_or(1.0).clamp(0.0, 1.0))
        } else {
            None
        };
        self.clip_count = if item.uses_clip() {
            Some(self.clip_count.unwrap_or(0).max(0))
        } else {
            None
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::item::WeaponMode;

    #[test]
    fn test_shape_follows_type() {
        let stimpak = Item::new(ItemId(1), "Stimpak", ItemType::Chem);
        let stack = Equipment::new(&stimpak, 3);
        assert_eq!(stack.condition, None);
        assert_eq!(stack.clip_count, None);

        let mut rifle = Item::new(ItemId(2), "Hunting Rifle", ItemType::Weapon);
        rifle.mode = WeaponMode::Long;
        rifle.clip_size = 5;
        let rifle_stack = Equipment::new(&rifle, 1);
        assert_eq!(rifle_stack.condition, Some(1.0));
        assert_eq!(rifle_stack.clip_count, Some(0));
    }

    #[test]
    fn test_condition_clamped() {
        let armor = Item::new(ItemId(3), "Leather Armor", ItemType::Armor);
        let stack = Equipment::new(&armor, 1).with_condition(1.7, &armor);
        assert_eq!(stack.condition, Some(1.0));
        let stack = Equipment::new(&armor, 1).with_condition(-0.2, &armor);
        assert_eq!(stack.wear(), 0.0);
    }

    #[test]
    fn test_value_and_charge() {
        let mut armor = Item::new(ItemId(3), "Leather Armor", ItemType::Armor);
        armor.value = 100;
        armor.weight = 8.0;
        let stack = Equipment::new(&armor, 1).with_condition(0.5, &armor);
        assert_eq!(stack.value(&armor), 50.0);
        assert_eq!(stack.charge(&armor), 8.0);
    }
}
