//! Load item, effect and loot catalogs from TOML

use std::fs;
use std::path::Path;

use ahash::AHashMap;
use serde::Deserialize;

use crate::core::error::{Result, RulesError};
use crate::core::types::{EffectId, ItemId, LootTemplateId};
use crate::effects::effect::Effect;
use crate::items::item::{Item, ItemType};
use crate::loot::LootTemplate;

/// Raw layout of a catalog file
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CatalogFile {
    item: Vec<Item>,
    effect: Vec<Effect>,
    loot_template: Vec<LootTemplate>,
}

/// Every static template the rules read, keyed by id
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: AHashMap<ItemId, Item>,
    effects: AHashMap<EffectId, Effect>,
    loot_templates: AHashMap<LootTemplateId, LootTemplate>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and cross-check a catalog document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(content)?;
        let mut catalog = Catalog::new();
        for item in file.item {
            catalog.insert_item(item)?;
        }
        for effect in file.effect {
            catalog.insert_effect(effect)?;
        }
        for template in file.loot_template {
            catalog.insert_loot_template(template)?;
        }
        catalog.validate()?;
        tracing::debug!(
            items = catalog.items.len(),
            effects = catalog.effects.len(),
            loot_templates = catalog.loot_templates.len(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn insert_item(&mut self, item: Item) -> Result<()> {
        item.validate()?;
        if self.items.contains_key(&item.id) {
            return Err(RulesError::Config(format!("duplicate item id {:?}", item.id)));
        }
        self.items.insert(item.id, item);
        Ok(())
    }

    pub fn insert_effect(&mut self, effect: Effect) -> Result<()> {
        effect.validate()?;
        if self.effects.contains_key(&effect.id) {
            return Err(RulesError::Config(format!("duplicate effect id {:?}", effect.id)));
        }
        self.effects.insert(effect.id, effect);
        Ok(())
    }

    pub fn insert_loot_template(&mut self, template: LootTemplate) -> Result<()> {
        template.validate()?;
        if self.loot_templates.contains_key(&template.id) {
            return Err(RulesError::Config(format!(
                "duplicate loot template id {:?}",
                template.id
            )));
        }
        self.loot_templates.insert(template.id, template);
        Ok(())
    }

    pub fn item(&self, id: ItemId) -> Result<&Item> {
        self.items.get(&id).ok_or(RulesError::UnknownItem(id))
    }

    pub fn effect(&self, id: EffectId) -> Result<&Effect> {
        self.effects.get(&id).ok_or(RulesError::UnknownEffect(id))
    }

    pub fn loot_template(&self, id: LootTemplateId) -> Result<&LootTemplate> {
        self.loot_templates
            .get(&id)
            .ok_or(RulesError::UnknownLootTemplate(id))
    }

    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    pub fn effects(&self) -> impl Iterator<Item = &Effect> {
        self.effects.values()
    }

    /// Check every id reference between templates
    pub fn validate(&self) -> Result<()> {
        for item in self.items.values() {
            for ammo in &item.ammunition {
                let target = self.item(*ammo)?;
                if target.kind != ItemType::Ammo {
                    return Err(RulesError::Config(format!(
                        "{} lists {} as ammunition",
                        item.name, target.name
                    )));
                }
            }
            for effect in &item.effects {
                self.effect(*effect)?;
            }
        }
        for effect in self.effects.values() {
            if let Some(next) = effect.next_effect {
                self.effect(next)?;
            }
            if let Some(cancel) = effect.cancel_effect {
                self.effect(cancel)?;
            }
            self.check_chain(effect)?;
        }
        for template in self.loot_templates.values() {
            for entry in &template.entries {
                self.item(entry.item)?;
            }
        }
        Ok(())
    }

    /// `next_effect` links must end; a cycle would re-arm forever
    fn check_chain(&self, start: &Effect) -> Result<()> {
        let mut seen = vec![start.id];
        let mut current = start.next_effect;
        while let Some(id) = current {
            if seen.contains(&id) {
                return Err(RulesError::Config(format!(
                    "effect chain starting at {} loops back to {:?}",
                    start.name, id
                )));
            }
            seen.push(id);
            current = self.effect(id)?.next_effect;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"
        [[item]]
        id = 1
        name = "10mm Pistol"
        type = "weapon"
        mode = "ranged"
        clip_size = 12
        ammunition = [2]
        damage = { min = 5, max = 12, type = "normal" }

        [[item]]
        id = 2
        name = "10mm JHP"
        type = "ammo"

        [[effect]]
        id = 10
        name = "Poisoned"
        interval = 600
        next_effect = 11

        [[effect]]
        id = 11
        name = "Weakened"

        [[loot_template]]
        id = 1
        name = "Raider stash"
        entries = [{ item = 2, chance = 50, min_quantity = 5, max_quantity = 10 }]
    "#;

    #[test]
    fn test_parse_catalog() {
        let catalog = Catalog::from_toml_str(CATALOG).unwrap();
        assert_eq!(catalog.item(ItemId(1)).unwrap().name, "10mm Pistol");
        assert_eq!(catalog.effect(EffectId(10)).unwrap().next_effect, Some(EffectId(11)));
        assert!(catalog.loot_template(LootTemplateId(1)).is_ok());
        assert!(matches!(
            catalog.item(ItemId(99)),
            Err(RulesError::UnknownItem(ItemId(99)))
        ));
    }

    #[test]
    fn test_dangling_ammunition_rejected() {
        let broken = CATALOG.replace("ammunition = [2]", "ammunition = [3]");
        assert!(Catalog::from_toml_str(&broken).is_err());
    }

    #[test]
    fn test_effect_cycle_rejected() {
        let broken = CATALOG.replace("name = \"Weakened\"", "name = \"Weakened\"\nnext_effect = 10");
        let err = Catalog::from_toml_str(&broken).unwrap_err();
        assert!(matches!(err, RulesError::Config(_)));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut catalog = Catalog::new();
        catalog.insert_item(Item::new(ItemId(1), "A", ItemType::Misc)).unwrap();
        assert!(catalog.insert_item(Item::new(ItemId(1), "B", ItemType::Misc)).is_err());
    }
}
