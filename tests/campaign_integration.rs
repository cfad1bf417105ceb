//! Campaign integration tests: clock, needs, campaign effects and loot

use std::path::PathBuf;

use wasteland_rules::combat::{fight, BodyPart, FightRequest};
use wasteland_rules::effects::Effect;
use wasteland_rules::core::types::{EffectId, ItemId, HOUR};
use wasteland_rules::entity::Intent;
use wasteland_rules::items::{equip, Equipment, ItemType};
use wasteland_rules::stats::{General, Modifier, Race};
use wasteland_rules::{Campaign, Catalog, Character, FightStatus, RulesConfig, ScriptedDice};

const KNIFE: ItemId = ItemId(3);
const RADROACH_VENOM: EffectId = EffectId(12);

fn bundled() -> Catalog {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data/catalog.toml");
    Catalog::load(&path).unwrap()
}

fn recruit(campaign: &mut Campaign, name: &str) -> Character {
    let mut character = Character::new(name, Race::Human);
    character.health = 30;
    character.action_points = 7;
    campaign.join(&mut character);
    character
}

#[test]
fn test_resting_in_a_hot_zone() {
    let config = RulesConfig::default();
    let catalog = bundled();
    let mut campaign = Campaign::new("Glowing Sea");
    campaign.radiation_per_hour = 10.0;
    let mut sleeper = recruit(&mut campaign, "Sleeper");
    sleeper.is_player = true;
    sleeper.health = 20;
    let mut characters = vec![sleeper];
    let mut dice = ScriptedDice::new([]);

    for _ in 0..8 {
        let report = campaign
            .next_turn(&config, &catalog, &mut characters, HOUR, true, &mut dice)
            .unwrap();
        assert_eq!(report.next, Some(characters[0].id));
        assert_eq!(report.damages.len(), 1);
        assert!(report.intents.contains(&Intent::InvalidateStats(characters[0].id)));
    }

    let sleeper = &characters[0];
    assert_eq!(campaign.current_game_date, 8 * HOUR);
    // 10 rads per hour, 10% resisted
    assert_eq!(sleeper.rads, 72.0);
    assert!(sleeper.thirst > 0.0 && sleeper.hunger > 0.0);
    assert_eq!(sleeper.sleep, 0.0);
    assert!(sleeper.health > 20);
    assert!(sleeper.is_active);
}

#[test]
fn test_campaign_venom_hits_every_active_member() {
    let config = RulesConfig::default();
    let catalog = bundled();
    let mut campaign = Campaign::new("Nest");
    let first = recruit(&mut campaign, "First");
    let second = recruit(&mut campaign, "Second");
    let mut benched = recruit(&mut campaign, "Benched");
    benched.is_active = false;
    let stranger = Character::new("Stranger", Race::Human);
    let mut characters = vec![first, second, benched, stranger];
    let mut dice = ScriptedDice::new([]);

    let outcome = campaign
        .affect(&config, &catalog, &mut characters, RADROACH_VENOM, true, &mut dice)
        .unwrap();
    assert!(outcome.attached);
    assert_eq!(outcome.damages.len(), 2);
    assert_eq!(campaign.effects.len(), 1);
    // 1 poison, 25% resisted, rounds back to 1
    assert_eq!(characters[0].health, 29);
    assert_eq!(characters[1].health, 29);
    assert_eq!(characters[2].health, 30);
    assert_eq!(characters[3].health, 0);
}

#[test]
fn test_fallout_cloud_irradiates_every_turn() {
    let config = RulesConfig::default();
    let mut catalog = bundled();
    let mut fallout = Effect::new(EffectId(90), "Fallout Cloud");
    fallout.controlled = true;
    fallout.modifiers = vec![Modifier::new(General::Rads, 5.0)];
    catalog.insert_effect(fallout).unwrap();

    let mut campaign = Campaign::new("Crater");
    let scout = recruit(&mut campaign, "Scout");
    let mut benched = recruit(&mut campaign, "Benched");
    benched.is_active = false;
    let mut characters = vec![scout, benched];
    let mut dice = ScriptedDice::new([]);
    campaign
        .affect(&config, &catalog, &mut characters, EffectId(90), true, &mut dice)
        .unwrap();
    assert_eq!(characters[0].rads, 0.0);

    for _ in 0..3 {
        campaign
            .next_turn(&config, &catalog, &mut characters, 0, false, &mut dice)
            .unwrap();
    }
    assert_eq!(characters[0].rads, 15.0);
    assert_eq!(characters[1].rads, 0.0);
}

#[test]
fn test_fallen_raider_drops_the_knife() {
    let config = RulesConfig::default();
    let catalog = bundled();
    let mut campaign = Campaign::new("Ambush");
    let mut wanderer = recruit(&mut campaign, "Wanderer");
    wanderer.is_player = true;
    let mut raider = recruit(&mut campaign, "Raider");
    raider.health = 1;
    raider.reward = 40;
    let knife = Equipment::new(catalog.item(KNIFE).unwrap(), 1);
    let knife_id = knife.id;
    raider.inventory.push(knife);
    {
        let ctx = campaign.context(&config, &catalog);
        equip(&ctx, &mut raider, knife_id, false).unwrap();
    }

    // A punch: hit roll, damage spread
    let mut dice = ScriptedDice::new([10, 0]);
    let history = {
        let ctx = campaign.context(&config, &catalog);
        let request = FightRequest::at(1).aimed(BodyPart::Torso);
        fight(&ctx, &mut wanderer, &mut raider, None, &request, &mut dice).unwrap()
    };
    assert_eq!(history.status, FightStatus::TargetKilled);
    assert!(history.experience > config.xp_gain_fight_hit);

    let mut characters = vec![wanderer, raider];
    campaign
        .next_turn(&config, &catalog, &mut characters, 60, false, &mut dice)
        .unwrap();
    assert!(!characters[1].is_active);
    assert!(characters[1].inventory.is_empty());
    assert_eq!(campaign.loots.len(), 1);

    let loot = campaign.loots.iter().next().unwrap().id;
    let (wanderer, _) = characters.split_first_mut().unwrap();
    let taken = campaign
        .take_loot(&config, &catalog, loot, wanderer, 1, false)
        .unwrap();
    let stack = wanderer.equipment(taken).unwrap();
    assert_eq!(stack.item, KNIFE);
    assert!(stack.slot.is_none());
    assert!(campaign.loots.is_empty());

    let ctx = campaign.context(&config, &catalog);
    equip(&ctx, wanderer, taken, false).unwrap();
    assert!(wanderer.equipped(ItemType::Weapon).is_some());
}

#[test]
fn test_turns_skip_the_fallen() {
    let config = RulesConfig::default();
    let catalog = bundled();
    let mut campaign = Campaign::new("Arena");
    let first = recruit(&mut campaign, "First");
    let mut second = recruit(&mut campaign, "Second");
    second.health = 0;
    let third = recruit(&mut campaign, "Third");
    let mut characters = vec![first, second, third];
    let mut dice = ScriptedDice::new([]);

    let order = campaign
        .turn_order(&config, &catalog, &characters, &mut dice)
        .unwrap();
    assert_eq!(order, vec![characters[0].id, characters[2].id]);

    let mut seen = Vec::new();
    for _ in 0..4 {
        let report = campaign
            .next_turn(&config, &catalog, &mut characters, 0, false, &mut dice)
            .unwrap();
        seen.push(report.next.unwrap());
    }
    assert_eq!(
        seen,
        vec![characters[0].id, characters[2].id, characters[0].id, characters[2].id]
    );
}
