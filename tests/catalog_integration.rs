//! Bundled catalog integration tests
//!
//! Loads `data/catalog.toml` the way the binary does and checks the
//! templates reference each other consistently.

use std::path::PathBuf;

use wasteland_rules::core::types::{EffectId, ItemId, LootTemplateId};
use wasteland_rules::items::{ItemType, WeaponMode};
use wasteland_rules::stats::Protection;
use wasteland_rules::{Catalog, Campaign, RulesConfig, RulesError, ScriptedDice};

fn catalog_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data/catalog.toml")
}

fn bundled() -> Catalog {
    Catalog::load(&catalog_path()).expect("bundled catalog should load")
}

#[test]
fn test_bundled_catalog_loads() {
    let catalog = bundled();

    let pistol = catalog.item(ItemId(1)).unwrap();
    assert_eq!(pistol.kind, ItemType::Weapon);
    assert_eq!(pistol.mode, WeaponMode::Ranged);
    assert!(pistol.uses_clip());
    assert_eq!(pistol.ammunition, vec![ItemId(2)]);

    let grenade = catalog.item(ItemId(5)).unwrap();
    assert!(grenade.is_throwable());
    assert!(!grenade.uses_clip());

    let armor = catalog.item(ItemId(20)).unwrap();
    assert_eq!(armor.threshold(Protection::Normal), 2.0);
    assert_eq!(armor.resistance(Protection::Normal), 25.0);
    assert_eq!(armor.resistance(Protection::Laser), 0.0);

    assert!(catalog.items().all(|item| item.validate().is_ok()));
}

#[test]
fn test_effect_chains_resolve() {
    let catalog = bundled();
    let bleeding = catalog.effect(EffectId(10)).unwrap();
    assert_eq!(bleeding.chance, 30);
    assert_eq!(bleeding.interval, Some(300));

    let next = bleeding.next_effect.unwrap();
    let weakened = catalog.effect(next).unwrap();
    assert_eq!(weakened.name, "Weakened");
    assert!(weakened.next_effect.is_none());

    let stimpak = catalog.effect(EffectId(1)).unwrap();
    assert!(stimpak.is_one_shot());
    assert_eq!(stimpak.cancel_effect, Some(EffectId(10)));
}

#[test]
fn test_unknown_ids_are_errors() {
    let catalog = bundled();
    assert!(matches!(
        catalog.item(ItemId(999)),
        Err(RulesError::UnknownItem(ItemId(999)))
    ));
    assert!(matches!(
        catalog.effect(EffectId(999)),
        Err(RulesError::UnknownEffect(_))
    ));
    assert!(matches!(
        catalog.loot_template(LootTemplateId(999)),
        Err(RulesError::UnknownLootTemplate(_))
    ));
}

#[test]
fn test_missing_file_is_io_error() {
    let err = Catalog::load(&PathBuf::from("does/not/exist.toml")).unwrap_err();
    assert!(matches!(err, RulesError::Io(_)));
}

#[test]
fn test_malformed_catalog_is_rejected() {
    let err = Catalog::from_toml_str("[[item]]\nid = \"pistol\"").unwrap_err();
    assert!(matches!(err, RulesError::Toml(_)));

    let dangling = r#"
        [[item]]
        id = 1
        name = "Knife"
        type = "weapon"
        effects = [42]
    "#;
    assert!(Catalog::from_toml_str(dangling).is_err());
}

#[test]
fn test_supply_crate_drops_everything_on_low_rolls() {
    let config = RulesConfig::default();
    let catalog = bundled();
    let mut campaign = Campaign::new("Vault");
    // Per entry: luck shift, chance roll, quantity, condition
    let mut dice = ScriptedDice::new([0, 1, 2, 0, 0, 1, 3, 0, 0, 1, 4, 0]);

    let loots = campaign
        .spawn_loot(&config, &catalog, LootTemplateId(2), None, &mut dice)
        .unwrap();
    assert_eq!(loots.len(), 3);
    let quantities: Vec<i64> = campaign.loots.iter().map(|l| l.quantity).collect();
    assert_eq!(quantities, vec![2, 3, 4]);
    assert!(campaign.loots.iter().all(|l| l.condition.is_none()));
}
