//! Loot lying on the ground and loot templates

use serde::{Deserialize, Serialize};

use crate::core::dice::Dice;
use crate::core::error::{ensure, Result, RulesError};
use crate::core::types::{EquipmentId, ItemId, LootId, LootTemplateId};
use crate::entity::character::Character;
use crate::items::equipment::Equipment;
use crate::items::item::Item;
use crate::rules::context::RulesContext;
use crate::rules::loader::Catalog;

fn default_chance() -> i64 {
    100
}

fn default_quantity() -> i64 {
    1
}

fn default_condition() -> f64 {
    1.0
}

/// One possible drop of a template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootEntry {
    pub item: ItemId,
    /// Percent chance to drop, before luck
    #[serde(default = "default_chance")]
    pub chance: i64,
    #[serde(default = "default_quantity")]
    pub min_quantity: i64,
    #[serde(default = "default_quantity")]
    pub max_quantity: i64,
    #[serde(default = "default_condition")]
    pub min_condition: f64,
    #[serde(default = "default_condition")]
    pub max_condition: f64,
}

impl LootEntry {
    pub fn new(item: ItemId) -> Self {
        Self {
            item,
            chance: default_chance(),
            min_quantity: 1,
            max_quantity: 1,
            min_condition: 1.0,
            max_condition: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootTemplate {
    pub id: LootTemplateId,
    pub name: String,
    #[serde(default)]
    pub entries: Vec<LootEntry>,
}

impl LootTemplate {
    pub fn validate(&self) -> Result<()> {
        for entry in &self.entries {
            ensure(
                (0..=100).contains(&entry.chance),
                format!("{}: chance {} is not a percentage", self.name, entry.chance),
            )?;
            ensure(
                0 <= entry.min_quantity && entry.min_quantity <= entry.max_quantity,
                format!(
                    "{}: quantity range {}..{} is invalid",
                    self.name, entry.min_quantity, entry.max_quantity
                ),
            )?;
            ensure(
                0.0 <= entry.min_condition
                    && entry.min_condition <= entry.max_condition
                    && entry.max_condition <= 1.0,
                format!(
                    "{}: condition range {}..{} is invalid",
                    self.name, entry.min_condition, entry.max_condition
                ),
            )?;
        }
        Ok(())
    }
}

/// An item stack lying in a campaign
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loot {
    pub id: LootId,
    pub item: ItemId,
    pub quantity: i64,
    /// `None` for non-repairable items
    pub condition: Option<f64>,
}

impl Loot {
    pub fn value(&self, item: &Item) -> f64 {
        item.value as f64 * self.quantity as f64 * self.condition.unwrap_or(1.0)
    }

    pub fn charge(&self, item: &Item) -> f64 {
        item.weight * self.quantity as f64
    }
}

/// Every loot of a campaign
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LootPile {
    loots: Vec<Loot>,
}

impl LootPile {
    pub fn get(&self, id: LootId) -> Result<&Loot> {
        self.loots
            .iter()
            .find(|l| l.id == id)
            .ok_or(RulesError::UnknownLoot(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Loot> {
        self.loots.iter()
    }

    pub fn len(&self) -> usize {
        self.loots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loots.is_empty()
    }

    /// Drop everything nobody claimed
    pub fn clear(&mut self) {
        self.loots.clear();
    }

    /// Put `quantity` of `item` on the ground
    ///
    /// Non-repairable items merge into an existing loot of the same item.
    pub fn create(&mut self, item: &Item, quantity: i64, condition: Option<f64>) -> LootId {
        if !item.kind.is_repairable() {
            if let Some(loot) = self.loots.iter_mut().find(|l| l.item == item.id) {
                loot.quantity += quantity;
                return loot.id;
            }
        }
        let condition = item
            .kind
            .is_repairable()
            .then(|| condition.unwrap_or(1.0).clamp(0.0, 1.0));
        let loot = Loot {
            id: LootId::new(),
            item: item.id,
            quantity: quantity.max(0),
            condition,
        };
        let id = loot.id;
        self.loots.push(loot);
        id
    }

    /// Move up to `quantity` units of a loot into a character's inventory
    ///
    /// Non-repairable items stack onto what the character already carries.
    /// Returns the receiving equipment.
    pub fn take(
        &mut self,
        ctx: &RulesContext<'_>,
        id: LootId,
        character: &mut Character,
        quantity: i64,
        is_action: bool,
    ) -> Result<EquipmentId> {
        let cost = ctx.config.ap_cost_take;
        ensure(quantity > 0, "at least one item must be taken")?;
        ensure(
            !is_action || character.action_points >= cost,
            format!("{} needs {} action points to take loot", character.name, cost),
        )?;
        let index = self
            .loots
            .iter()
            .position(|l| l.id == id)
            .ok_or(RulesError::UnknownLoot(id))?;
        let loot = &mut self.loots[index];
        let item = ctx.catalog.item(loot.item)?;
        let taken = quantity.min(loot.quantity);

        let stacked = if item.kind.is_repairable() {
            None
        } else {
            character
                .inventory
                .iter_mut()
                .find(|e| e.item == item.id)
        };
        let equipment = match stacked {
            Some(stack) => {
                stack.quantity += taken;
                stack.id
            }
            None => {
                let mut stack = Equipment::new(item, taken);
                if let Some(condition) = loot.condition {
                    stack = stack.with_condition(condition, item);
                }
                let id = stack.id;
                character.inventory.push(stack);
                id
            }
        };

        loot.quantity -= taken;
        if loot.quantity <= 0 {
            self.loots.remove(index);
        }
        if is_action {
            character.action_points -= cost;
        }
        tracing::debug!(character = %character.name, item = %item.name, taken, "loot taken");
        Ok(equipment)
    }

    /// Empty a character's inventory onto the ground
    pub fn loot_character(&mut self, catalog: &Catalog, character: &mut Character) -> Result<Vec<LootId>> {
        let mut created = Vec::with_capacity(character.inventory.len());
        for stack in &character.inventory {
            let item = catalog.item(stack.item)?;
            created.push(self.create(item, stack.quantity, stack.condition));
        }
        character.inventory.clear();
        tracing::debug!(character = %character.name, loots = created.len(), "character looted");
        Ok(created)
    }

    /// Roll every entry of a template
    ///
    /// Each entry drops when `1..=(100 - 2 x random(0, luck))` does not exceed
    /// its chance, so luck only ever helps.
    pub fn instantiate(
        &mut self,
        catalog: &Catalog,
        template: LootTemplateId,
        luck: i64,
        dice: &mut dyn Dice,
    ) -> Result<Vec<LootId>> {
        let template = catalog.loot_template(template)?;
        let mut created = Vec::new();
        for entry in &template.entries {
            let shift = dice.range(0, luck.max(0)) * 2;
            if dice.range(1, (100 - shift).max(1)) > entry.chance {
                continue;
            }
            let item = catalog.item(entry.item)?;
            let quantity = dice.range(entry.min_quantity, entry.max_quantity);
            let condition = dice.range(
                (entry.min_condition * 100.0).round() as i64,
                (entry.max_condition * 100.0).round() as i64,
            ) as f64
                / 100.0;
            created.push(self.create(item, quantity, Some(condition)));
        }
        Ok(created)
    }
}
