//! Equipment operations on a character's inventory
//!
//! Every operation checks its preconditions before touching anything, spends
//! action points only when `is_action` is set and prunes empty stacks.

use crate::core::dice::Dice;
use crate::core::error::{ensure, Result, RulesError};
use crate::core::types::{EquipmentId, LootId};
use crate::effects::engine::{affect, EffectOutcome};
use crate::entity::character::Character;
use crate::items::item::ItemType;
use crate::loot::LootPile;
use crate::rules::context::RulesContext;

fn check_ap(character: &Character, cost: i64, is_action: bool, what: &str) -> Result<()> {
    ensure(
        !is_action || character.action_points >= cost,
        format!(
            "{} needs {} action points to {}, {} left",
            character.name, cost, what, character.action_points
        ),
    )
}

fn spend_ap(character: &mut Character, cost: i64, is_action: bool) {
    if is_action {
        character.action_points -= cost;
    }
}

/// Take a stack out of its slot, moving loaded rounds back to the ammo stack
fn release(character: &mut Character, id: EquipmentId) -> Result<()> {
    let (slot, rounds) = {
        let stack = character.equipment(id)?;
        (stack.slot, stack.rounds())
    };
    match slot {
        Some(ItemType::Weapon) if rounds > 0 => {
            if let Some(ammo) = character.equipped_mut(ItemType::Ammo) {
                ammo.quantity += rounds;
                character.equipment_mut(id)?.clip_count = Some(0);
            }
        }
        Some(ItemType::Ammo) => {
            let unloaded = match character.equipped_mut(ItemType::Weapon) {
                Some(weapon) if weapon.rounds() > 0 => {
                    let rounds = weapon.rounds();
                    weapon.clip_count = Some(0);
                    rounds
                }
                _ => 0,
            };
            character.equipment_mut(id)?.quantity += unloaded;
        }
        _ => {}
    }
    character.equipment_mut(id)?.slot = None;
    Ok(())
}

/// Put a carried stack in the slot of its item type
///
/// Whatever occupied the slot is unequipped first. Ammunition and weapon must
/// be compatible with each other.
pub fn equip(ctx: &RulesContext<'_>, character: &mut Character, id: EquipmentId, is_action: bool) -> Result<()> {
    let config = ctx.config;
    let stack = character.equipment(id)?;
    let item = ctx.catalog.item(stack.item)?;
    ensure(
        item.kind.is_equipable(),
        format!("{} cannot be equipped", item.name),
    )?;
    ensure(!stack.is_equipped(), format!("{} is already equipped", item.name))?;
    check_ap(character, config.ap_cost_equip, is_action, "equip")?;

    match item.kind {
        ItemType::Ammo => {
            if let Some(weapon) = character.equipped(ItemType::Weapon) {
                let weapon = ctx.catalog.item(weapon.item)?;
                ensure(
                    weapon.accepts(item.id),
                    format!("{} does not fire {}", weapon.name, item.name),
                )?;
            }
        }
        ItemType::Weapon => {
            if let Some(ammo) = character.equipped(ItemType::Ammo) {
                let ammo = ctx.catalog.item(ammo.item)?;
                ensure(
                    item.accepts(ammo.id),
                    format!("{} does not fire {}", item.name, ammo.name),
                )?;
            }
        }
        _ => {}
    }

    if let Some(previous) = character.equipped(item.kind).map(|e| e.id) {
        release(character, previous)?;
    }
    character.equipment_mut(id)?.slot = Some(item.kind);
    spend_ap(character, config.ap_cost_equip, is_action);
    tracing::debug!(character = %character.name, item = %item.name, "equipped");
    Ok(())
}

/// Empty the slot holding `id`
pub fn unequip(ctx: &RulesContext<'_>, character: &mut Character, id: EquipmentId, is_action: bool) -> Result<()> {
    let config = ctx.config;
    ensure(
        character.equipment(id)?.is_equipped(),
        "only an equipped item can be unequipped",
    )?;
    check_ap(character, config.ap_cost_equip, is_action, "unequip")?;
    release(character, id)?;
    spend_ap(character, config.ap_cost_equip, is_action);
    Ok(())
}

/// Consume one unit of a food or chem, attaching its effects
pub fn use_item(
    ctx: &RulesContext<'_>,
    character: &mut Character,
    id: EquipmentId,
    is_action: bool,
    dice: &mut dyn Dice,
) -> Result<Vec<EffectOutcome>> {
    let config = ctx.config;
    let stack = character.equipment(id)?;
    let item = ctx.catalog.item(stack.item)?;
    ensure(item.kind.is_usable(), format!("{} cannot be used", item.name))?;
    ensure(stack.quantity > 0, format!("no {} left", item.name))?;
    check_ap(character, config.ap_cost_use, is_action, "use an item")?;

    let mut outcomes = Vec::with_capacity(item.effects.len());
    for effect in &item.effects {
        outcomes.push(affect(ctx, character, *effect, false, dice)?);
    }
    character.equipment_mut(id)?.quantity -= 1;
    character.prune_inventory();
    spend_ap(character, config.ap_cost_use, is_action);
    tracing::debug!(character = %character.name, item = %item.name, "item used");
    Ok(outcomes)
}

/// Leave `quantity` units of a stack on the ground
pub fn drop_item(
    ctx: &RulesContext<'_>,
    character: &mut Character,
    loots: &mut LootPile,
    id: EquipmentId,
    quantity: i64,
    is_action: bool,
) -> Result<LootId> {
    let config = ctx.config;
    let stack = character.equipment(id)?;
    let item = ctx.catalog.item(stack.item)?;
    ensure(
        quantity > 0 && quantity <= stack.quantity,
        format!("cannot drop {quantity} of {} {}", stack.quantity, item.name),
    )?;
    check_ap(character, config.ap_cost_drop, is_action, "drop an item")?;

    if stack.is_equipped() && quantity == stack.quantity {
        release(character, id)?;
    }
    let condition = character.equipment(id)?.condition;
    let loot = loots.create(item, quantity, condition);
    character.equipment_mut(id)?.quantity -= quantity;
    character.prune_inventory();
    spend_ap(character, config.ap_cost_drop, is_action);
    Ok(loot)
}

/// Fill the equipped weapon's clip from the equipped ammunition
///
/// Returns the number of rounds loaded.
pub fn reload(ctx: &RulesContext<'_>, character: &mut Character, is_action: bool) -> Result<i64> {
    let weapon_stack = character
        .equipped(ItemType::Weapon)
        .ok_or_else(|| RulesError::violation("no weapon equipped"))?;
    let weapon = ctx.catalog.item(weapon_stack.item)?;
    ensure(weapon.uses_clip(), format!("{} cannot be reloaded", weapon.name))?;
    check_ap(character, weapon.ap_cost_reload, is_action, "reload")?;
    let ammo_stack = character
        .equipped(ItemType::Ammo)
        .filter(|ammo| ammo.quantity > 0)
        .ok_or_else(|| RulesError::violation("no ammunition equipped"))?;
    ensure(
        weapon.accepts(ammo_stack.item),
        format!("{} does not fire the equipped ammunition", weapon.name),
    )?;

    let weapon_id = weapon_stack.id;
    let ammo_id = ammo_stack.id;
    let loaded = (weapon.clip_size - weapon_stack.rounds()).min(ammo_stack.quantity).max(0);
    character.equipment_mut(ammo_id)?.quantity -= loaded;
    let stack = character.equipment_mut(weapon_id)?;
    stack.clip_count = Some(stack.rounds() + loaded);
    character.prune_inventory();
    spend_ap(character, weapon.ap_cost_reload, is_action);
    tracing::debug!(character = %character.name, weapon = %weapon.name, loaded, "reloaded");
    Ok(loaded)
}

/// Set the condition of a repairable stack, clamped to `[0, 1]`
pub fn repair(
    ctx: &RulesContext<'_>,
    character: &mut Character,
    id: EquipmentId,
    condition: f64,
    is_action: bool,
) -> Result<()> {
    let config = ctx.config;
    let item = ctx.catalog.item(character.equipment(id)?.item)?;
    ensure(item.kind.is_repairable(), format!("{} cannot be repaired", item.name))?;
    check_ap(character, config.ap_cost_repair, is_action, "repair")?;
    character.equipment_mut(id)?.condition = Some(condition.clamp(0.0, 1.0));
    spend_ap(character, config.ap_cost_repair, is_action);
    Ok(())
}
