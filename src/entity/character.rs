//! Character sheet: identity, base stats, pools, needs, inventory and effects

use serde::{Deserialize, Serialize};

use crate::core::config::RulesConfig;
use crate::core::error::{ensure, Result, RulesError};
use crate::core::types::{CampaignId, CharacterId, EquipmentId, ItemId};
use crate::effects::effect::ActiveEffect;
use crate::items::equipment::Equipment;
use crate::items::item::ItemType;
use crate::stats::block::StatBlock;
use crate::stats::ids::{General, Skill, Special};
use crate::stats::race::Race;

/// A player or non-player character
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    pub race: Race,
    pub campaign: Option<CampaignId>,
    pub level: u32,
    pub is_player: bool,
    pub is_active: bool,
    pub is_resting: bool,

    /// Raw values before race, tag skills, needs and equipment
    pub base: StatBlock,
    pub tag_skills: Vec<Skill>,

    // === POOLS ===
    pub health: i64,
    pub action_points: i64,
    pub experience: i64,
    pub skill_points: i64,
    pub perk_points: i64,
    pub karma: i64,
    pub money: i64,

    // === NEEDS ===
    pub rads: f64,
    pub thirst: f64,
    pub hunger: f64,
    pub sleep: f64,
    /// Fractional healing waiting to be credited
    pub regeneration: f64,

    /// Experience granted to whoever damages this character
    pub reward: i64,

    pub inventory: Vec<Equipment>,
    pub effects: Vec<ActiveEffect>,
}

impl Character {
    /// Level 1 character with 5 in every S.P.E.C.I.A.L. attribute
    pub fn new(name: impl Into<String>, race: Race) -> Self {
        let mut base = StatBlock::new();
        for special in Special::all() {
            base.set(special, 5.0);
        }
        Self {
            id: CharacterId::new(),
            name: name.into(),
            race,
            campaign: None,
            level: 1,
            is_player: false,
            is_active: true,
            is_resting: false,
            base,
            tag_skills: Vec::new(),
            health: 0,
            action_points: 0,
            experience: 0,
            skill_points: 0,
            perk_points: 0,
            karma: 0,
            money: 0,
            rads: 0.0,
            thirst: 0.0,
            hunger: 0.0,
            sleep: 0.0,
            regeneration: 0.0,
            reward: 0,
            inventory: Vec::new(),
            effects: Vec::new(),
        }
    }

    pub fn with_special(mut self, special: Special, value: f64) -> Self {
        self.base.set(special, value);
        self
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Replace the tag skills; at most `max_tag_skills`, no duplicates
    pub fn set_tag_skills(&mut self, skills: &[Skill], config: &RulesConfig) -> Result<()> {
        ensure(
            skills.len() <= config.max_tag_skills,
            format!(
                "{} tag skills chosen, at most {} allowed",
                skills.len(),
                config.max_tag_skills
            ),
        )?;
        for (i, skill) in skills.iter().enumerate() {
            ensure(
                !skills[..i].contains(skill),
                format!("{} is tagged twice", skill.code()),
            )?;
        }
        self.tag_skills = skills.to_vec();
        Ok(())
    }

    /// Sum of the base S.P.E.C.I.A.L. values
    pub fn special_points(&self) -> f64 {
        Special::all()
            .into_iter()
            .map(|s| self.base.special(s))
            .sum()
    }

    // === GENERAL STATS ===

    pub fn general(&self, stat: General) -> f64 {
        match stat {
            General::Health => self.health as f64,
            General::ActionPoints => self.action_points as f64,
            General::Thirst => self.thirst,
            General::Hunger => self.hunger,
            General::Sleep => self.sleep,
            General::Rads => self.rads,
            General::Experience => self.experience as f64,
            General::SkillPoints => self.skill_points as f64,
            General::PerkPoints => self.perk_points as f64,
            General::Karma => self.karma as f64,
            General::Money => self.money as f64,
        }
    }

    /// Add `delta` to a character-side value; need counters clamp to `[0, max_need]`
    ///
    /// Returns the value actually added.
    pub fn change_general(&mut self, stat: General, delta: f64, config: &RulesConfig) -> f64 {
        let before = self.general(stat);
        let need = |value: f64| (value + delta).clamp(0.0, config.max_need);
        match stat {
            General::Health => self.health += delta.round() as i64,
            General::ActionPoints => self.action_points += delta.round() as i64,
            General::Thirst => self.thirst = need(self.thirst),
            General::Hunger => self.hunger = need(self.hunger),
            General::Sleep => self.sleep = need(self.sleep),
            General::Rads => self.rads = need(self.rads),
            General::Experience => self.experience += delta.round() as i64,
            General::SkillPoints => self.skill_points += delta.round() as i64,
            General::PerkPoints => self.perk_points += delta.round() as i64,
            General::Karma => self.karma += delta.round() as i64,
            General::Money => self.money += delta.round() as i64,
        }
        self.general(stat) - before
    }

    // === INVENTORY ===

    pub fn equipment(&self, id: EquipmentId) -> Result<&Equipment> {
        self.inventory
            .iter()
            .find(|e| e.id == id)
            .ok_or(RulesError::UnknownEquipment(id))
    }

    pub fn equipment_mut(&mut self, id: EquipmentId) -> Result<&mut Equipment> {
        self.inventory
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(RulesError::UnknownEquipment(id))
    }

    /// Stack equipped in `slot`
    pub fn equipped(&self, slot: ItemType) -> Option<&Equipment> {
        self.inventory.iter().find(|e| e.slot == Some(slot))
    }

    pub fn equipped_mut(&mut self, slot: ItemType) -> Option<&mut Equipment> {
        self.inventory.iter_mut().find(|e| e.slot == Some(slot))
    }

    /// First carried stack of `item`
    pub fn stack_of(&self, item: ItemId) -> Option<&Equipment> {
        self.inventory.iter().find(|e| e.item == item)
    }

    /// Drop stacks whose quantity reached zero
    pub fn prune_inventory(&mut self) {
        self.inventory.retain(|e| e.quantity > 0);
    }
}
