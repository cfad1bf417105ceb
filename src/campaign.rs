//! Campaign clock, turn order and campaign-wide state

use serde::{Deserialize, Serialize};

use crate::core::config::RulesConfig;
use crate::core::dice::Dice;
use crate::core::error::{ensure, Result};
use crate::core::types::{
    hours, CampaignId, CharacterId, EffectId, EquipmentId, GameDate, GameSeconds, LootId,
    LootTemplateId,
};
use crate::effects::effect::ActiveEffect;
use crate::effects::engine::{self, EffectOutcome};
use crate::entity::character::Character;
use crate::entity::lifecycle::{settle, Intent};
use crate::entity::needs::update_needs;
use crate::history::DamageHistory;
use crate::loot::LootPile;
use crate::rules::context::RulesContext;
use crate::rules::loader::Catalog;
use crate::stats::ids::Secondary;

/// Outcome of [`Campaign::next_turn`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TurnReport {
    /// Character whose turn starts, if anyone can act
    pub next: Option<CharacterId>,
    pub game_date: GameDate,
    /// Radiation and effect damage dealt while the clock advanced
    pub damages: Vec<DamageHistory>,
    /// Work left to the caller (stats invalidation)
    pub intents: Vec<Intent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    pub id: CampaignId,
    pub name: String,
    pub current_game_date: GameDate,
    /// Ambient radiation absorbed per hour by every active character
    pub radiation_per_hour: f64,
    pub effects: Vec<ActiveEffect>,
    pub current_character: Option<CharacterId>,
    pub loots: LootPile,
}

impl Campaign {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: CampaignId::new(),
            name: name.into(),
            current_game_date: 0,
            radiation_per_hour: 0.0,
            effects: Vec::new(),
            current_character: None,
            loots: LootPile::default(),
        }
    }

    /// Rules context at the campaign's current date
    pub fn context<'a>(&'a self, config: &'a RulesConfig, catalog: &'a Catalog) -> RulesContext<'a> {
        RulesContext::new(config, catalog)
            .at(self.current_game_date)
            .with_campaign_effects(&self.effects)
    }

    pub fn join(&mut self, character: &mut Character) {
        character.campaign = Some(self.id);
        self.current_character = None;
    }

    fn is_member(&self, character: &Character) -> bool {
        character.campaign == Some(self.id)
    }

    /// Active, living members by descending sequence; ties keep their order
    pub fn turn_order(
        &self,
        config: &RulesConfig,
        catalog: &Catalog,
        characters: &[Character],
        dice: &mut dyn Dice,
    ) -> Result<Vec<CharacterId>> {
        let ctx = self.context(config, catalog);
        let mut order = Vec::new();
        for character in characters {
            if self.is_member(character) && character.is_active && character.is_alive() {
                let sequence = ctx.stats(character, dice)?.secondary(Secondary::Sequence);
                order.push((character.id, sequence));
            }
        }
        order.sort_by(|a, b| b.1.total_cmp(&a.1));
        Ok(order.into_iter().map(|(id, _)| id).collect())
    }

    /// End the current turn after `seconds` of game time
    ///
    /// The next character in the turn order gets its action points back. When
    /// time passes, every active member's needs advance and character and
    /// campaign effects tick and expire. Every active member is then settled,
    /// so general-stat modifiers land once per turn; fallen non-player
    /// characters are looted and deactivated on the spot.
    pub fn next_turn(
        &mut self,
        config: &RulesConfig,
        catalog: &Catalog,
        characters: &mut [Character],
        seconds: GameSeconds,
        resting: bool,
        dice: &mut dyn Dice,
    ) -> Result<TurnReport> {
        ensure(seconds >= 0, "time cannot flow backwards")?;
        let order = self.turn_order(config, catalog, characters, dice)?;
        let next = match self.current_character.and_then(|id| order.iter().position(|c| *c == id)) {
            Some(index) => order.get((index + 1) % order.len()).copied(),
            None => order.first().copied(),
        };

        self.current_game_date += seconds;
        let mut report = TurnReport {
            next,
            game_date: self.current_game_date,
            ..TurnReport::default()
        };

        if seconds > 0 {
            // The context reads a snapshot while the live list is ticked
            let snapshot = self.effects.clone();
            let ctx = RulesContext::new(config, catalog)
                .at(self.current_game_date)
                .with_campaign_effects(&snapshot);
            let id = self.id;
            let mut members: Vec<&mut Character> = characters
                .iter_mut()
                .filter(|c| c.campaign == Some(id))
                .collect();
            report
                .damages
                .extend(engine::tick_campaign(&ctx, &mut self.effects, &mut members, dice)?);
            report
                .damages
                .extend(engine::expire_campaign(&ctx, &mut self.effects, &mut members, dice)?);
        }

        let elapsed = hours(seconds);
        let ctx = self.context(config, catalog);
        let mut fallen = Vec::new();
        for character in characters.iter_mut() {
            if !self.is_member(character) || !character.is_active {
                continue;
            }
            if seconds > 0 {
                let stats = ctx.stats(character, dice)?;
                report.damages.extend(update_needs(
                    &ctx,
                    character,
                    &stats,
                    elapsed,
                    self.radiation_per_hour,
                    resting,
                    dice,
                )?);
                report.damages.extend(engine::tick_character(&ctx, character, dice)?);
                report.damages.extend(engine::expire_character(&ctx, character, dice)?);
            }
            for intent in settle(&ctx, character, dice)? {
                match intent {
                    Intent::LootCharacter(_) | Intent::Deactivate(_) => fallen.push(intent),
                    Intent::InvalidateStats(_) => report.intents.push(intent),
                }
            }
        }
        self.carry_out(catalog, characters, &fallen)?;

        self.current_character = next;
        if let Some(id) = next {
            let ctx = self.context(config, catalog);
            if let Some(character) = characters.iter_mut().find(|c| c.id == id) {
                character.action_points = ctx.stats(character, dice)?.max_action_points() as i64;
            }
        }
        tracing::debug!(
            campaign = %self.name,
            game_date = self.current_game_date,
            next = ?report.next,
            "turn ended"
        );
        Ok(report)
    }

    /// Apply loot and deactivation intents to the characters they name
    pub fn carry_out(&mut self, catalog: &Catalog, characters: &mut [Character], intents: &[Intent]) -> Result<()> {
        for intent in intents {
            match *intent {
                Intent::LootCharacter(id) => {
                    if let Some(character) = characters.iter_mut().find(|c| c.id == id) {
                        self.loots.loot_character(catalog, character)?;
                    }
                }
                Intent::Deactivate(id) => {
                    if let Some(character) = characters.iter_mut().find(|c| c.id == id) {
                        character.is_active = false;
                    }
                    if self.current_character == Some(id) {
                        self.current_character = None;
                    }
                }
                Intent::InvalidateStats(_) => {}
            }
        }
        Ok(())
    }

    /// Attach a campaign-wide effect, dealing its immediate damage to active members
    pub fn affect(
        &mut self,
        config: &RulesConfig,
        catalog: &Catalog,
        characters: &mut [Character],
        effect: EffectId,
        forced: bool,
        dice: &mut dyn Dice,
    ) -> Result<EffectOutcome> {
        let snapshot = self.effects.clone();
        let ctx = RulesContext::new(config, catalog)
            .at(self.current_game_date)
            .with_campaign_effects(&snapshot);
        let id = self.id;
        let mut members: Vec<&mut Character> = characters
            .iter_mut()
            .filter(|c| c.campaign == Some(id))
            .collect();
        engine::affect_campaign(&ctx, &mut self.effects, &mut members, effect, forced, dice)
    }

    /// A member picks up loot lying in this campaign
    pub fn take_loot(
        &mut self,
        config: &RulesConfig,
        catalog: &Catalog,
        loot: LootId,
        character: &mut Character,
        quantity: i64,
        is_action: bool,
    ) -> Result<EquipmentId> {
        ensure(
            self.is_member(character),
            format!("{} is not part of {}", character.name, self.name),
        )?;
        let ctx = RulesContext::new(config, catalog).at(self.current_game_date);
        self.loots.take(&ctx, loot, character, quantity, is_action)
    }

    /// Roll a loot template, helped by the luck of `character` when given
    pub fn spawn_loot(
        &mut self,
        config: &RulesConfig,
        catalog: &Catalog,
        template: LootTemplateId,
        character: Option<&Character>,
        dice: &mut dyn Dice,
    ) -> Result<Vec<LootId>> {
        let luck = match character {
            Some(character) => {
                ensure(
                    self.is_member(character),
                    format!("{} is not part of {}", character.name, self.name),
                )?;
                self.context(config, catalog).stats(character, dice)?.luck()
            }
            None => 0,
        };
        self.loots.instantiate(catalog, template, luck, dice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::damage_type::DamageType;
    use crate::core::dice::ScriptedDice;
    use crate::core::types::{ItemId, HOUR};
    use crate::effects::effect::Effect;
    use crate::items::equipment::Equipment;
    use crate::items::item::{DamageProfile, Item, ItemType};
    use crate::stats::ids::Special;
    use crate::stats::race::Race;

    fn member(campaign: &mut Campaign, name: &str, perception: f64) -> Character {
        let mut character = Character::new(name, Race::Human).with_special(Special::Perception, perception);
        character.health = 30;
        campaign.join(&mut character);
        character
    }

    #[test]
    fn test_turn_order_cycles_by_sequence() {
        let config = RulesConfig::default();
        let catalog = Catalog::new();
        let mut dice = ScriptedDice::new([]);
        let mut campaign = Campaign::new("Wasteland");
        let mut characters = vec![
            member(&mut campaign, "Slow", 3.0),
            member(&mut campaign, "Fast", 8.0),
            member(&mut campaign, "Middle", 5.0),
        ];
        let ids: Vec<_> = characters.iter().map(|c| c.id).collect();

        let order = campaign.turn_order(&config, &catalog, &characters, &mut dice).unwrap();
        assert_eq!(order, vec![ids[1], ids[2], ids[0]]);

        let mut seen = Vec::new();
        for _ in 0..4 {
            let report = campaign
                .next_turn(&config, &catalog, &mut characters, 0, false, &mut dice)
                .unwrap();
            seen.push(report.next.unwrap());
        }
        assert_eq!(seen, vec![ids[1], ids[2], ids[0], ids[1]]);
        assert_eq!(characters[1].action_points, 7);
    }

    #[test]
    fn test_time_advances_needs_and_radiation() {
        let config = RulesConfig::default();
        let catalog = Catalog::new();
        let mut dice = ScriptedDice::new([]);
        let mut campaign = Campaign::new("Glow");
        campaign.radiation_per_hour = 10.0;
        let mut characters = vec![member(&mut campaign, "Walker", 5.0)];

        let report = campaign
            .next_turn(&config, &catalog, &mut characters, 2 * HOUR, false, &mut dice)
            .unwrap();
        assert_eq!(report.game_date, 2 * HOUR);
        assert_eq!(report.damages.len(), 1);
        let walker = &characters[0];
        // radiation resistance 2 x END = 10%
        assert!((walker.rads - 18.0).abs() < 1e-9);
        assert!(walker.thirst > 0.0 && walker.hunger > 0.0);
        assert!(report.intents.contains(&Intent::InvalidateStats(walker.id)));
    }

    #[test]
    fn test_fallen_npc_is_looted_and_deactivated() {
        let config = RulesConfig::default();
        let mut catalog = Catalog::new();
        let knife = Item::new(ItemId(1), "Knife", ItemType::Weapon);
        let mut poison = Effect::new(EffectId(1), "Deadly Poison");
        poison.damage = Some(DamageProfile::new(DamageType::Raw, 100.0, 0, 0));
        catalog.insert_item(knife.clone()).unwrap();
        catalog.insert_effect(poison).unwrap();
        let mut dice = ScriptedDice::new([]);
        let mut campaign = Campaign::new("Ambush");
        let mut raider = member(&mut campaign, "Raider", 5.0);
        raider.inventory.push(Equipment::new(&knife, 1));
        let mut characters = vec![raider];

        let outcome = campaign
            .affect(&config, &catalog, &mut characters, EffectId(1), true, &mut dice)
            .unwrap();
        assert_eq!(outcome.damages.len(), 1);
        assert!(!characters[0].is_alive());

        campaign
            .next_turn(&config, &catalog, &mut characters, HOUR, false, &mut dice)
            .unwrap();
        assert!(!characters[0].is_active);
        assert!(characters[0].inventory.is_empty());
        assert_eq!(campaign.loots.len(), 1);
    }

    #[test]
    fn test_outsiders_cannot_take_loot() {
        let config = RulesConfig::default();
        let mut catalog = Catalog::new();
        let stimpak = Item::new(ItemId(1), "Stimpak", ItemType::Chem);
        catalog.insert_item(stimpak.clone()).unwrap();
        let mut campaign = Campaign::new("Vault");
        let loot = campaign.loots.create(&stimpak, 2, None);
        let mut stranger = Character::new("Stranger", Race::Human);
        assert!(campaign
            .take_loot(&config, &catalog, loot, &mut stranger, 1, false)
            .is_err());
        let mut dweller = member(&mut campaign, "Dweller", 5.0);
        campaign
            .take_loot(&config, &catalog, loot, &mut dweller, 1, false)
            .unwrap();
        assert_eq!(dweller.inventory[0].quantity, 1);
    }
}
