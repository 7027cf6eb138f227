//! Loadout tests: supply, hands, unique equipment, extras.

use shiver_core::{
    config::Catalog,
    engine::RosterEngine,
    error::{EntityKind, RosterError},
    types::{TemplateKey, UnitId},
};
use std::sync::Arc;

fn build() -> RosterEngine {
    let _ = env_logger::builder().is_test(true).try_init();
    RosterEngine::new(Arc::new(Catalog::default_test()))
}

fn with_unit(template: &str) -> (RosterEngine, UnitId) {
    let mut engine = build();
    let id = engine.add_unit(&TemplateKey::from(template)).unwrap();
    (engine, id)
}

// ── Supply ─────────────────────────────────────────────────────────

#[test]
fn weapon_over_supply_is_rejected() {
    // Hammerhead carries 6 supply.
    let (mut engine, id) = with_unit("hammerhead");
    engine.add_weapon(id, "Trident").unwrap();

    let err = engine.add_weapon(id, "Torpedo Launcher").unwrap_err();

    assert_eq!(err, RosterError::InsufficientSupply { needed: 4, remaining: 3 });
    let unit = engine.roster().unit(id).unwrap();
    assert_eq!(unit.used_supply, 3);
    assert_eq!(unit.weapons.len(), 1);
}

#[test]
fn equipment_shares_the_supply_pool() {
    // Grunt carries 4 supply.
    let (mut engine, id) = with_unit("grunt");
    engine.add_weapon(id, "Cutlass").unwrap();
    engine.add_equipment(id, "Chum Bucket").unwrap();
    assert_eq!(engine.supply_remaining(id).unwrap(), 0);

    let err = engine.add_equipment(id, "Rebreather").unwrap_err();
    assert_eq!(err, RosterError::InsufficientSupply { needed: 1, remaining: 0 });

    // Free items still fit.
    engine.add_weapon(id, "Jaws").unwrap();
    assert_eq!(engine.roster().unit(id).unwrap().used_supply, 4);
}

#[test]
fn removing_items_releases_supply() {
    let (mut engine, id) = with_unit("hammerhead");
    engine.add_weapon(id, "Cutlass").unwrap();
    engine.add_weapon(id, "Harpoon Pistol").unwrap();
    engine.add_equipment(id, "Chum Bucket").unwrap();
    assert_eq!(engine.roster().unit(id).unwrap().used_supply, 5);

    let weapon = engine.remove_weapon(id, 0).unwrap();
    assert_eq!(weapon.name, "Cutlass");
    let item = engine.remove_equipment(id, 0).unwrap();
    assert_eq!(item.name, "Chum Bucket");

    let unit = engine.roster().unit(id).unwrap();
    assert_eq!(unit.used_supply, 1);
    assert_eq!(unit.weapons[0].name, "Harpoon Pistol");
    assert!(unit.equipment.is_empty());
}

#[test]
fn removing_out_of_range_index_fails() {
    let (mut engine, id) = with_unit("grunt");
    engine.add_weapon(id, "Cutlass").unwrap();

    assert_eq!(
        engine.remove_weapon(id, 1),
        Err(RosterError::IndexOutOfRange { kind: EntityKind::Weapon, index: 1, len: 1 })
    );
    assert_eq!(
        engine.remove_equipment(id, 0),
        Err(RosterError::IndexOutOfRange { kind: EntityKind::Equipment, index: 0, len: 0 })
    );
    assert_eq!(
        engine.remove_extra(id, 3),
        Err(RosterError::IndexOutOfRange { kind: EntityKind::Extra, index: 3, len: 0 })
    );
    assert_eq!(engine.roster().unit(id).unwrap().used_supply, 2);
}

#[test]
fn unknown_catalog_entries_are_not_found() {
    let (mut engine, id) = with_unit("grunt");
    assert_eq!(
        engine.add_weapon(id, "Laser"),
        Err(RosterError::NotFound { kind: EntityKind::Weapon, key: "Laser".into() })
    );
    assert_eq!(
        engine.add_equipment(id, "Jetpack"),
        Err(RosterError::NotFound { kind: EntityKind::Equipment, key: "Jetpack".into() })
    );
    assert_eq!(
        engine.add_extra(id, "Knighthood"),
        Err(RosterError::NotFound { kind: EntityKind::Extra, key: "Knighthood".into() })
    );
    assert!(engine.add_weapon(id + 7, "Cutlass").is_err());
}

#[test]
fn available_items_fit_remaining_supply() {
    let (mut engine, id) = with_unit("grunt");
    engine.add_weapon(id, "Cutlass").unwrap();
    engine.add_weapon(id, "Harpoon Pistol").unwrap();

    // One supply left.
    let weapons: Vec<_> = engine
        .available_weapons(id)
        .unwrap()
        .iter()
        .map(|w| w.name.clone())
        .collect();
    assert_eq!(weapons, vec!["Harpoon Pistol", "Jaws"]);

    let equipment: Vec<_> = engine
        .available_equipment(id)
        .unwrap()
        .iter()
        .map(|e| e.name.clone())
        .collect();
    assert_eq!(equipment, vec!["Buckler", "Rebreather"]);
}

// ── Hands ──────────────────────────────────────────────────────────

#[test]
fn two_hander_leaves_no_hand_free() {
    let (mut engine, id) = with_unit("hammerhead");
    engine.add_weapon(id, "Trident").unwrap();

    let err = engine.add_weapon(id, "Harpoon Pistol").unwrap_err();
    assert_eq!(err, RosterError::InsufficientHands { needed: 1, free: 0 });

    // Handless weapons are always fine.
    engine.add_weapon(id, "Jaws").unwrap();
}

#[test]
fn two_one_handers_fill_both_hands() {
    let (mut engine, id) = with_unit("hammerhead");
    engine.add_weapon(id, "Cutlass").unwrap();
    engine.add_weapon(id, "Harpoon Pistol").unwrap();

    let err = engine.add_equipment(id, "Buckler").unwrap_err();
    assert_eq!(err, RosterError::InsufficientHands { needed: 1, free: 0 });
}

#[test]
fn hand_items_count_against_weapons() {
    let (mut engine, id) = with_unit("hammerhead");
    engine.add_equipment(id, "Buckler").unwrap();

    let err = engine.add_weapon(id, "Trident").unwrap_err();
    assert_eq!(err, RosterError::InsufficientHands { needed: 2, free: 1 });

    engine.add_weapon(id, "Cutlass").unwrap();
    assert_eq!(engine.roster().unit(id).unwrap().hands_used(), 2);
}

#[test]
fn third_hand_item_is_rejected() {
    let (mut engine, id) = with_unit("hammerhead");
    engine.add_equipment(id, "Buckler").unwrap();
    engine.add_equipment(id, "Buckler").unwrap();

    let err = engine.add_equipment(id, "Buckler").unwrap_err();
    assert_eq!(err, RosterError::InsufficientHands { needed: 1, free: 0 });
    assert_eq!(engine.roster().unit(id).unwrap().used_supply, 2);
}

#[test]
fn mech_wields_a_two_hander_in_its_free_hand() {
    let (mut engine, id) = with_unit("mech");
    engine.add_weapon(id, "Harpoon Pistol").unwrap();

    engine.add_weapon(id, "Trident").unwrap();

    let unit = engine.roster().unit(id).unwrap();
    assert_eq!(unit.weapons.len(), 2);
    assert_eq!(unit.used_supply, 4);
    assert!(engine.check_invariants().is_empty());
}

#[test]
fn mech_still_needs_a_free_hand() {
    let (mut engine, id) = with_unit("mech");
    engine.add_weapon(id, "Trident").unwrap();

    let err = engine.add_weapon(id, "Torpedo Launcher").unwrap_err();
    assert_eq!(err, RosterError::InsufficientHands { needed: 2, free: 0 });

    let err = engine.add_weapon(id, "Cutlass").unwrap_err();
    assert_eq!(err, RosterError::InsufficientHands { needed: 1, free: 0 });
}

#[test]
fn exception_is_limited_to_dual_wield_templates() {
    let (mut engine, id) = with_unit("great_white");
    engine.add_weapon(id, "Harpoon Pistol").unwrap();

    let err = engine.add_weapon(id, "Trident").unwrap_err();
    assert_eq!(err, RosterError::InsufficientHands { needed: 2, free: 1 });
}

// ── Unique equipment ───────────────────────────────────────────────

#[test]
fn unique_equipment_only_once_per_unit() {
    let (mut engine, id) = with_unit("hammerhead");
    engine.add_equipment(id, "Rebreather").unwrap();

    let err = engine.add_equipment(id, "Rebreather").unwrap_err();
    assert_eq!(err, RosterError::DuplicateUnique { name: "Rebreather".into() });
    assert_eq!(engine.roster().unit(id).unwrap().used_supply, 1);

    // Another unit may still take one.
    let other = engine.add_unit(&TemplateKey::from("grunt")).unwrap();
    engine.add_equipment(other, "Rebreather").unwrap();
}

#[test]
fn non_unique_equipment_stacks() {
    let (mut engine, id) = with_unit("mech");
    engine.add_equipment(id, "Chum Bucket").unwrap();
    engine.add_equipment(id, "Chum Bucket").unwrap();
    assert_eq!(engine.roster().unit(id).unwrap().equipment.len(), 2);
}

// ── Extras ─────────────────────────────────────────────────────────

#[test]
fn extras_spend_roster_points_not_supply() {
    let (mut engine, id) = with_unit("hammerhead");

    engine.add_extra(id, "Battle Scars").unwrap();

    assert_eq!(engine.roster().points_used, 50);
    assert_eq!(engine.roster().unit(id).unwrap().used_supply, 0);
    assert_eq!(engine.supply_remaining(id).unwrap(), 6);
}

#[test]
fn extra_over_budget_is_rejected() {
    let (mut engine, id) = with_unit("great_white");
    engine.add_unit(&TemplateKey::from("grunt")).unwrap();
    engine.add_extra(id, "Veteran").unwrap();
    assert_eq!(engine.points_remaining(), 10);

    engine.add_extra(id, "Veteran").unwrap();
    let err = engine.add_extra(id, "Battle Scars").unwrap_err();

    assert_eq!(err, RosterError::InsufficientPoints { needed: 10, remaining: 5 });
    assert_eq!(engine.roster().points_used, 95);
    assert_eq!(engine.roster().unit(id).unwrap().extras.len(), 2);
}

#[test]
fn removing_extra_refunds_points() {
    let (mut engine, id) = with_unit("grunt");
    engine.add_extra(id, "Veteran").unwrap();
    engine.add_extra(id, "Battle Scars").unwrap();

    let extra = engine.remove_extra(id, 1).unwrap();

    assert_eq!(extra.name, "Battle Scars");
    assert_eq!(engine.roster().points_used, 20);
    let names: Vec<_> = engine.available_extras().iter().map(|x| x.name.clone()).collect();
    assert_eq!(names, vec!["Veteran", "Battle Scars"]);
}
