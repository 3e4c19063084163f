//! End-to-end gameplay scenarios driven through the public session API.

use std::sync::Arc;

use bevy::math::Vec2;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

use crypt_core::combat::defense::monster_skill_hit_player;
use crypt_core::combat::DefenseOutcome;
use crypt_core::config::SimConfig;
use crypt_core::dungeon::{Dungeon, Tile};
use crypt_core::engine::{AttackOutcome, Session, SkillOutcome};
use crypt_core::loot::{EquipSlot, Item, Rarity, WeaponProfile};
use crypt_core::monster::{AiState, EnemyArena, Telegraph};
use crypt_core::player::{ClassKind, SkillKind};
use crypt_core::skilltree::{SkillTree, TreeRejection};
use crypt_core::stats::Bonuses;
use crypt_core::utils::{aim_angle_of, TilePos};

fn cleared_session(class: ClassKind, config: SimConfig) -> Session {
    let mut s = Session::with_seed(Arc::new(config), class, 2024).unwrap();
    s.enemies_mut().clear();
    s
}

fn training_sword() -> Item {
    Item {
        base_key: "short_sword".into(),
        name: "Training Sword".into(),
        slot: EquipSlot::Weapon,
        rarity: Rarity::Common,
        bonuses: Bonuses::new(),
        weapon: Some(WeaponProfile {
            damage: (10, 10),
            range: None,
            cooldown: None,
            arc: None,
        }),
        armor: 0,
        dodge: 0,
    }
}

#[test]
fn test_warrior_hits_enemy_directly_ahead() {
    let mut s = cleared_session(ClassKind::Warrior, SimConfig::default());
    s.player_mut().equipment.equip(training_sword());
    s.player_mut().recalculate(&Bonuses::new());
    s.player_mut().stats.crit_chance = 0.0;

    let start = TilePos::containing(s.player().pos);
    let id = s.spawn_enemy("skeleton", start.offset(0, 1)).unwrap();
    let (initial, armor) = {
        let e = s.enemies().get(id).unwrap();
        (e.hp, e.armor)
    };

    match s.attack(aim_angle_of(Vec2::Y)) {
        AttackOutcome::Hit(report) => {
            assert_eq!(report.target, id);
            // 10 + floor(16 / 5)
            assert_eq!(report.damage, (13 - armor).max(1));
            assert!(!report.crit);
        }
        other => panic!("Expected Hit, got {:?}", other),
    }
    assert_eq!(s.enemies().get(id).unwrap().hp, initial - (13 - armor).max(1));
}

#[test]
fn test_heavy_armor_still_takes_one() {
    let mut s = cleared_session(ClassKind::Warrior, SimConfig::default());
    s.player_mut().equipment.equip(training_sword());
    s.player_mut().recalculate(&Bonuses::new());
    s.player_mut().stats.crit_chance = 0.0;

    let start = TilePos::containing(s.player().pos);
    let id = s.spawn_enemy("skeleton", start.offset(0, 1)).unwrap();
    s.enemies_mut().get_mut(id).unwrap().armor = 500;
    let initial = s.enemies().get(id).unwrap().hp;

    match s.attack(0.0) {
        AttackOutcome::Hit(report) => assert_eq!(report.damage, 1),
        other => panic!("Expected Hit, got {:?}", other),
    }
    assert_eq!(s.enemies().get(id).unwrap().hp, initial - 1);
}

#[test]
fn test_chasing_enemy_gives_up_after_timeout() {
    let config = SimConfig::default();
    let mut d = Dungeon::filled(1, 30, 10);
    for x in 1..29 {
        for y in 1..9 {
            d.set_tile(TilePos::new(x, y), Tile::Floor);
        }
    }
    for y in 0..10 {
        d.set_tile(TilePos::new(15, y), Tile::Wall);
    }

    let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
    let mut arena = EnemyArena::new();
    let def = config.enemy("skeleton").unwrap();
    let id = arena.spawn(def, TilePos::new(10, 5), 1, &mut rng);
    {
        let e = arena.get_mut(id).unwrap();
        e.state = AiState::Chase;
        e.alert_timer = 3.0;
    }

    // Behind the wall: out of sight
    let player = TilePos::new(20, 5).center();
    arena.update_all(0.016, &d, player, &config, &mut rng);
    assert_eq!(arena.get(id).unwrap().state, AiState::Patrol);
}

#[test]
fn test_frost_shield_absorbs_before_health() {
    let mut config = SimConfig::default();
    let mage = config
        .classes
        .iter_mut()
        .find(|c| c.kind == ClassKind::Mage)
        .unwrap();
    if let SkillKind::FrostWard { shield, .. } = &mut mage.skills[1].kind {
        *shield = 30;
    }
    let mut s = cleared_session(ClassKind::Mage, config);

    assert!(matches!(s.use_skill(1, 0.0), SkillOutcome::Cast(_)));
    assert_eq!(s.player().shield, 30);

    let hp = s.player().hp;
    let telegraph = Telegraph::Circle {
        center: s.player().pos,
        radius: 1.0,
    };
    let outcome = monster_skill_hit_player(&telegraph, 50, s.player_mut());
    assert_eq!(
        outcome,
        Some(DefenseOutcome::Hit {
            damage: 20,
            absorbed: 30
        })
    );
    assert_eq!(s.player().shield, 0);
    assert_eq!(s.player().hp, hp - 20);
}

#[test]
fn test_non_adjacent_node_always_rejected() {
    let config = SimConfig::default();
    let tree = SkillTree::from_defs(&config.skill_tree).unwrap();
    let start = tree.start_id().to_string();
    let far: Vec<String> = tree
        .nodes()
        .map(|n| n.id.clone())
        .filter(|id| *id != start && !tree.neighbors(&start).contains(&id.as_str()))
        .collect();
    assert!(!far.is_empty());

    for id in &far {
        for points in [1, 5, 100] {
            assert!(!tree.can_allocate(id, points, 100), "{id}");
            assert_eq!(
                tree.check_allocate(id, points, 100),
                Err(TreeRejection::NotAdjacent)
            );
        }
    }
}
