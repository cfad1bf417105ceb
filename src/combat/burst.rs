//! Burst fire and grenade blasts over several targets

use crate::combat::fight::{expend, fight_shot, FightRequest, Loadout, Shot};
use crate::core::dice::Dice;
use crate::core::error::{ensure, Result};
use crate::entity::character::Character;
use crate::history::FightHistory;
use crate::items::item::ItemType;
use crate::rules::context::RulesContext;

/// One character caught in a burst and its distance to the attacker
#[derive(Debug)]
pub struct BurstTarget<'c> {
    pub character: &'c mut Character,
    pub range: i64,
}

impl<'c> BurstTarget<'c> {
    pub fn new(character: &'c mut Character, range: i64) -> Self {
        Self { character, range }
    }
}

/// Resolve a burst against `targets`
///
/// With the grenade slot every target is attacked once and a single grenade
/// is used up. Otherwise the weapon fires up to its burst count, each shot at
/// a random living target and at the requested body part (random when
/// unset). The burst stops early on a lack of action points or ammo, or on a
/// broken weapon. When the targets run out first the unfired rounds are spent
/// anyway.
///
/// Every resolved shot earns `xp_gain_burst` experience. An entry that stops
/// before its roll (dead target, no ammo, broken weapon, no action points)
/// earns nothing, as with a single attack.
pub fn burst(
    ctx: &RulesContext<'_>,
    attacker: &mut Character,
    targets: &mut [BurstTarget<'_>],
    request: &FightRequest,
    dice: &mut dyn Dice,
) -> Result<Vec<FightHistory>> {
    let loadout = Loadout::load(ctx, attacker, request.weapon_slot)?;
    if request.weapon_slot == ItemType::Grenade {
        return blast(ctx, attacker, targets, request, &loadout, dice);
    }

    let count = loadout.weapon_item().map_or(0, |w| w.burst_count);
    ensure(count > 0, "the equipped weapon cannot fire bursts")?;

    let mut histories = Vec::new();
    let mut fired = 0;
    while fired < count {
        let alive: Vec<usize> = (0..targets.len())
            .filter(|&i| targets[i].character.is_alive())
            .collect();
        if alive.is_empty() {
            break;
        }
        let target = &mut targets[alive[dice.pick(alive.len())]];
        let shot = Shot {
            burst: true,
            index: fired as u32,
            consume: true,
            forced: false,
        };
        let request = FightRequest {
            range: target.range,
            ..*request
        };
        let history = fight_shot(ctx, attacker, target.character, None, &request, shot, dice)?;
        let stop = history.status.stops_burst();
        histories.push(history);
        fired += 1;
        if stop {
            return Ok(histories);
        }
    }

    if fired < count {
        let loadout = Loadout::load(ctx, attacker, request.weapon_slot)?;
        expend(attacker, &loadout, count - fired)?;
    }
    tracing::debug!(attacker = %attacker.name, fired, count, "burst fired");
    Ok(histories)
}

/// Every target takes one hit chance; the grenade is thrown once
fn blast(
    ctx: &RulesContext<'_>,
    attacker: &mut Character,
    targets: &mut [BurstTarget<'_>],
    request: &FightRequest,
    loadout: &Loadout<'_>,
    dice: &mut dyn Dice,
) -> Result<Vec<FightHistory>> {
    let mut histories = Vec::with_capacity(targets.len());
    for (index, target) in targets.iter_mut().enumerate() {
        let shot = Shot {
            burst: true,
            index: index as u32,
            consume: false,
            forced: false,
        };
        let request = FightRequest {
            range: target.range,
            ..*request
        };
        let history = fight_shot(ctx, attacker, target.character, None, &request, shot, dice)?;
        let stop = history.status.stops_burst();
        histories.push(history);
        if stop {
            break;
        }
    }
    if histories.iter().any(|h| !h.status.is_early_exit()) {
        expend(attacker, loadout, 1)?;
    }
    Ok(histories)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::body_part::BodyPart;
    use crate::combat::damage_type::DamageType;
    use crate::core::config::RulesConfig;
    use crate::core::dice::ScriptedDice;
    use crate::core::types::ItemId;
    use crate::history::FightStatus;
    use crate::items::equipment::Equipment;
    use crate::items::item::{DamageProfile, Item, WeaponMode};
    use crate::rules::loader::Catalog;
    use crate::stats::race::Race;

    const SMG: ItemId = ItemId(1);
    const ROUNDS: ItemId = ItemId(2);
    const GRENADE: ItemId = ItemId(3);

    fn catalog() -> Catalog {
        let mut catalog = Catalog::new();
        let mut smg = Item::new(SMG, "SMG", ItemType::Weapon);
        smg.mode = WeaponMode::Ranged;
        smg.max_range = 10;
        smg.clip_size = 30;
        smg.burst_count = 5;
        smg.ap_cost_burst = 6;
        smg.durability = 100.0;
        smg.damage = Some(DamageProfile::new(DamageType::Normal, 10.0, 0, 0));
        smg.ammunition = vec![ROUNDS];
        catalog.insert_item(smg).unwrap();
        catalog
            .insert_item(Item::new(ROUNDS, "10mm", ItemType::Ammo))
            .unwrap();
        let mut grenade = Item::new(GRENADE, "Frag Grenade", ItemType::Grenade);
        grenade.mode = WeaponMode::Throw;
        grenade.max_range = 5;
        grenade.damage = Some(DamageProfile::new(DamageType::Explosive, 40.0, 0, 0));
        catalog.insert_item(grenade).unwrap();
        catalog
    }

    fn gunner(catalog: &Catalog, weapon: ItemId, quantity: i64) -> Character {
        let mut character = Character::new("Gunner", Race::Human);
        character.health = 30;
        character.action_points = 10;
        let item = catalog.item(weapon).unwrap();
        let mut stack = Equipment::new(item, quantity);
        stack.slot = Some(item.kind);
        stack.clip_count = item.uses_clip().then_some(30);
        character.inventory.push(stack);
        character
    }

    fn target(name: &str, health: i64) -> Character {
        let mut character = Character::new(name, Race::Human);
        character.health = health;
        character
    }

    #[test]
    fn test_burst_stops_when_targets_are_down() {
        let config = RulesConfig::default();
        let catalog = catalog();
        let ctx = RulesContext::new(&config, &catalog);
        let mut attacker = gunner(&catalog, SMG, 1);
        let mut first = target("First", 5);
        let mut second = target("Second", 5);
        // pick, hit roll, weapon spread, damage spread: twice
        let mut dice = ScriptedDice::new([0, 10, 0, 0, 0, 10, 0, 0]);

        let mut targets = [BurstTarget::new(&mut first, 3), BurstTarget::new(&mut second, 3)];
        let request = FightRequest::default().aimed(BodyPart::Torso);
        let histories = burst(&ctx, &mut attacker, &mut targets, &request, &mut dice).unwrap();
        assert_eq!(histories.len(), 2);
        assert!(histories
            .iter()
            .all(|h| h.status == FightStatus::TargetKilled && h.burst));
        assert_eq!(histories[0].ap_cost, 6);
        assert_eq!(histories[1].ap_cost, 0);
        assert_eq!(histories[1].hit_count, 2);
        // Two shots fired, three unfired rounds spent after
        assert_eq!(attacker.inventory[0].rounds(), 25);
        assert!((attacker.inventory[0].wear() - 0.95).abs() < 1e-9);
        assert_eq!(attacker.action_points, 4);
    }

    #[test]
    fn test_burst_stops_on_empty_clip() {
        let config = RulesConfig::default();
        let catalog = catalog();
        let ctx = RulesContext::new(&config, &catalog);
        let mut attacker = gunner(&catalog, SMG, 1);
        attacker.inventory[0].clip_count = Some(1);
        let mut tough = target("Tough", 500);
        let mut dice = ScriptedDice::new([0, 90, 0]);

        let mut targets = [BurstTarget::new(&mut tough, 3)];
        let request = FightRequest::default().aimed(BodyPart::Torso);
        let histories = burst(&ctx, &mut attacker, &mut targets, &request, &mut dice).unwrap();
        assert_eq!(histories.len(), 2);
        assert_eq!(histories[1].status, FightStatus::NoMoreAmmo);
        assert_eq!(attacker.inventory[0].rounds(), 0);
        // The missed shot earns burst experience, the empty click nothing
        assert_eq!(histories[0].experience, config.xp_gain_burst);
        assert_eq!(histories[1].experience, 0);
        assert_eq!(attacker.experience, config.xp_gain_burst);
    }

    #[test]
    fn test_weapon_without_burst_is_refused() {
        let config = RulesConfig::default();
        let catalog = catalog();
        let ctx = RulesContext::new(&config, &catalog);
        let mut attacker = Character::new("Unarmed", Race::Human);
        let mut victim = target("Victim", 10);
        let mut targets = [BurstTarget::new(&mut victim, 1)];
        let mut dice = ScriptedDice::new([]);
        assert!(burst(&ctx, &mut attacker, &mut targets, &FightRequest::default(), &mut dice).is_err());
    }

    #[test]
    fn test_grenade_hits_everyone_once() {
        let config = RulesConfig::default();
        let catalog = catalog();
        let ctx = RulesContext::new(&config, &catalog);
        let mut attacker = gunner(&catalog, GRENADE, 2);
        let mut first = target("First", 100);
        let mut second = target("Second", 100);
        let mut third = target("Third", 100);
        // hit roll, then grenade and damage spread on a hit
        let mut dice = ScriptedDice::new([10, 0, 0, 90, 10, 0, 0]);

        let mut targets = [
            BurstTarget::new(&mut first, 2),
            BurstTarget::new(&mut second, 2),
            BurstTarget::new(&mut third, 2),
        ];
        let request = FightRequest::default().aimed(BodyPart::Torso).with_grenade();
        let histories = burst(&ctx, &mut attacker, &mut targets, &request, &mut dice).unwrap();
        assert_eq!(histories.len(), 3);
        assert_eq!(histories[1].status, FightStatus::HitFailed);
        assert_eq!(first.health, 60);
        assert_eq!(second.health, 100);
        assert_eq!(third.health, 60);
        assert_eq!(attacker.inventory[0].quantity, 1);
    }
}
