//! Property-based tests for the roster invariants.
//!
//! Random operation sequences are thrown at a fresh engine. Whatever
//! succeeds must keep every invariant; whatever fails must change nothing.

use proptest::prelude::*;

use shiver_core::{
    config::Catalog,
    engine::RosterEngine,
    types::{TemplateKey, UnitId},
};
use std::sync::Arc;

#[derive(Debug, Clone)]
enum Op {
    AddUnit(usize),
    RemoveUnit(usize),
    SetLeader(usize),
    UncheckLeader(usize),
    AddWeapon(usize, usize),
    RemoveWeapon(usize, usize),
    AddEquipment(usize, usize),
    RemoveEquipment(usize, usize),
    AddExtra(usize, usize),
    RemoveExtra(usize, usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0usize..8).prop_map(Op::AddUnit),
        1 => (0usize..8).prop_map(Op::RemoveUnit),
        1 => (0usize..8).prop_map(Op::SetLeader),
        1 => (0usize..8).prop_map(Op::UncheckLeader),
        4 => (0usize..8, 0usize..8).prop_map(|(u, i)| Op::AddWeapon(u, i)),
        1 => (0usize..8, 0usize..4).prop_map(|(u, i)| Op::RemoveWeapon(u, i)),
        3 => (0usize..8, 0usize..8).prop_map(|(u, i)| Op::AddEquipment(u, i)),
        1 => (0usize..8, 0usize..4).prop_map(|(u, i)| Op::RemoveEquipment(u, i)),
        2 => (0usize..8, 0usize..8).prop_map(|(u, i)| Op::AddExtra(u, i)),
        1 => (0usize..8, 0usize..4).prop_map(|(u, i)| Op::RemoveExtra(u, i)),
    ]
}

fn unit_at(engine: &RosterEngine, i: usize) -> UnitId {
    let units = &engine.roster().units;
    // Out-of-range ids exercise NotFound.
    if units.is_empty() { 999 } else { units[i % units.len()].id }
}

fn pick<'a>(mut names: impl ExactSizeIterator<Item = &'a str>, i: usize) -> String {
    let len = names.len();
    names.nth(i % len).unwrap_or_default().to_string()
}

/// Apply one op, resolving positions modulo what exists.
/// Returns whether the engine accepted it.
fn apply(engine: &mut RosterEngine, op: &Op) -> bool {
    let catalog = engine.catalog().clone();

    match *op {
        Op::AddUnit(t) => {
            let key = catalog.templates[t % catalog.templates.len()].key.clone();
            engine.add_unit(&key).is_ok()
        }
        Op::RemoveUnit(u) => {
            let id = unit_at(engine, u);
            engine.remove_unit(id).is_ok()
        }
        Op::SetLeader(u) => {
            let id = unit_at(engine, u);
            engine.set_leader(id).is_ok()
        }
        Op::UncheckLeader(u) => {
            let id = unit_at(engine, u);
            engine.set_leader_flag(id, false).is_ok()
        }
        Op::AddWeapon(u, w) => {
            let id = unit_at(engine, u);
            let name = pick(catalog.weapons.iter().map(|e| e.name.as_str()), w);
            engine.add_weapon(id, &name).is_ok()
        }
        Op::RemoveWeapon(u, i) => {
            let id = unit_at(engine, u);
            engine.remove_weapon(id, i).is_ok()
        }
        Op::AddEquipment(u, e) => {
            let id = unit_at(engine, u);
            let name = pick(catalog.equipment.iter().map(|x| x.name.as_str()), e);
            engine.add_equipment(id, &name).is_ok()
        }
        Op::RemoveEquipment(u, i) => {
            let id = unit_at(engine, u);
            engine.remove_equipment(id, i).is_ok()
        }
        Op::AddExtra(u, x) => {
            let id = unit_at(engine, u);
            let name = pick(catalog.extras.iter().map(|e| e.name.as_str()), x);
            engine.add_extra(id, &name).is_ok()
        }
        Op::RemoveExtra(u, i) => {
            let id = unit_at(engine, u);
            engine.remove_extra(id, i).is_ok()
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    /// Budget, supply, hand, leader, uniqueness and id invariants hold
    /// after every accepted operation.
    #[test]
    fn prop_invariants_hold(ops in prop::collection::vec(op(), 1..60)) {
        let mut engine = RosterEngine::new(Arc::new(Catalog::default_test()));

        for op in &ops {
            apply(&mut engine, op);
            let violations = engine.check_invariants();
            prop_assert!(violations.is_empty(), "after {:?}: {:?}", op, violations);
            prop_assert!(engine.roster().points_used <= engine.roster().total_points);
        }
    }

    /// A rejected operation leaves the roster exactly as it was.
    #[test]
    fn prop_rejections_do_not_mutate(ops in prop::collection::vec(op(), 1..60)) {
        let mut engine = RosterEngine::new(Arc::new(Catalog::default_test()));

        for op in &ops {
            let before = engine.roster().clone();
            if !apply(&mut engine, op) {
                prop_assert_eq!(engine.roster(), &before, "rejected {:?} mutated the roster", op);
            }
        }
    }

    /// Export followed by import reproduces any valid roster.
    #[test]
    fn prop_exchange_round_trip(ops in prop::collection::vec(op(), 1..40)) {
        let catalog = Arc::new(Catalog::default_test());
        let mut engine = RosterEngine::new(catalog.clone());
        engine.set_shiver_name("Round Trip");
        for op in &ops {
            apply(&mut engine, op);
        }
        prop_assume!(!engine.roster().is_empty());

        let text = engine.export_roster().unwrap().to_json().unwrap();
        let mut restored = RosterEngine::new(catalog);
        restored.import_json(&text).unwrap();

        prop_assert_eq!(restored.roster(), engine.roster());
    }
}

#[test]
fn mech_exception_is_the_only_way_past_two_hands() {
    let mut engine = RosterEngine::with_budget(Arc::new(Catalog::default_test()), 200);
    for key in ["grunt", "hammerhead", "mech"] {
        engine.add_unit(&TemplateKey::from(key)).unwrap();
    }
    let ids: Vec<_> = engine.roster().units.iter().map(|u| u.id).collect();

    for id in &ids {
        let _ = engine.add_weapon(*id, "Harpoon Pistol");
        let _ = engine.add_weapon(*id, "Trident");
        let _ = engine.add_equipment(*id, "Buckler");
    }

    for unit in &engine.roster().units {
        let limit = if unit.template.as_str() == "mech" { 3 } else { 2 };
        assert!(unit.hands_used() <= limit, "{} uses {} hands", unit.name, unit.hands_used());
    }
    assert_eq!(engine.roster().units[2].hands_used(), 3);
}
