//! Combat resolution between the player and enemies.
//!
//! - Targeting: cone checks against the player's aim
//! - Player basic attacks: roll, crit, armor, leech, poison
//! - Enemy attacks and monster skills: see [`defense`]
//! - Player skills: see [`skills`]

pub mod defense;
pub mod skills;

use bevy::math::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::monster::{Enemy, EnemyArena, EnemyId};
use crate::player::Player;
use crate::utils::angle_between;

pub use defense::{enemy_attack_player, monster_skill_hit_player, DefenseOutcome};
pub use skills::{execute_skill, SkillEffect, SkillHit};

/// Result of one landed basic attack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitResult {
    /// Damage after armor
    pub damage: i32,
    pub crit: bool,
    /// Poison damage after armor, when a coat charge was spent
    pub poison: Option<i32>,
    pub killed: bool,
}

/// Whether `target` is within `range` of `origin` and inside the cone of
/// width `arc` centred on `aim`
pub fn in_arc(origin: Vec2, aim: f32, arc: f32, range: f32, target: Vec2) -> bool {
    let delta = target - origin;
    delta.length() <= range && angle_between(aim, delta) <= arc / 2.0
}

/// Closest living enemy inside the cone
pub fn nearest_in_arc(
    enemies: &EnemyArena,
    origin: Vec2,
    aim: f32,
    arc: f32,
    range: f32,
) -> Option<EnemyId> {
    enemies
        .iter()
        .filter(|e| !e.is_dead() && in_arc(origin, aim, arc, range, e.pos))
        .min_by(|a, b| {
            origin
                .distance_squared(a.pos)
                .total_cmp(&origin.distance_squared(b.pos))
        })
        .map(|e| e.id)
}

/// Every living enemy inside the cone, in arena order
pub fn all_in_arc(
    enemies: &EnemyArena,
    origin: Vec2,
    aim: f32,
    arc: f32,
    range: f32,
) -> Vec<EnemyId> {
    enemies
        .iter()
        .filter(|e| !e.is_dead() && in_arc(origin, aim, arc, range, e.pos))
        .map(|e| e.id)
        .collect()
}

/// Resolve a basic attack that found `enemy`.
///
/// The attack cooldown is started here; callers start it themselves on a miss.
pub fn player_attack_enemy<R: Rng + ?Sized>(
    player: &mut Player,
    enemy: &mut Enemy,
    rng: &mut R,
) -> HitResult {
    let raw = player.roll_damage(rng);
    let (damage, crit) = player.apply_crit(raw, rng);
    let dealt = enemy.take_damage(damage);
    player.apply_on_hit();

    let poison = player.consume_poison().map(|p| enemy.take_damage(p));
    player.start_attack_cooldown();

    debug!(enemy = enemy.id, raw, dealt, crit, ?poison, hp = enemy.hp, "Player hit");
    HitResult {
        damage: dealt,
        crit,
        poison,
        killed: enemy.is_dead(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProgressionConfig;
    use crate::loot::{EquipSlot, Item, Rarity, WeaponProfile};
    use crate::monster::bestiary::default_enemies;
    use crate::player::class::default_classes;
    use crate::player::PoisonCoat;
    use crate::stats::Bonuses;
    use crate::utils::{aim_angle_of, TilePos};
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;
    use std::f32::consts::PI;

    fn fixed_warrior(damage: i32) -> Player {
        let mut p = Player::new(
            &default_classes()[0],
            &ProgressionConfig::default(),
            Vec2::new(5.5, 5.5),
        );
        p.equipment.equip(Item {
            base_key: "test".into(),
            name: "Test Blade".into(),
            slot: EquipSlot::Weapon,
            rarity: Rarity::Common,
            bonuses: Bonuses::new(),
            weapon: Some(WeaponProfile {
                damage: (damage, damage),
                range: None,
                cooldown: None,
                arc: None,
            }),
            armor: 0,
            dodge: 0,
        });
        p.stats.crit_chance = 0.0;
        p
    }

    #[test]
    fn test_in_arc_edges() {
        let o = Vec2::new(0.0, 0.0);
        // aim 0 points along +y
        assert!(in_arc(o, 0.0, PI / 2.0, 1.2, Vec2::new(0.0, 1.0)));
        assert!(in_arc(o, 0.0, PI / 2.0, 1.2, Vec2::new(0.7, 0.75)));
        assert!(!in_arc(o, 0.0, PI / 2.0, 1.2, Vec2::new(0.8, 0.5)));
        assert!(!in_arc(o, 0.0, PI / 2.0, 1.2, Vec2::new(0.0, 1.3)));
        assert!(!in_arc(o, 0.0, PI / 2.0, 1.2, Vec2::new(0.0, -1.0)));
        // wrap around +-PI
        assert!(in_arc(o, PI, PI / 2.0, 1.2, Vec2::new(0.1, -1.0)));
        assert!(in_arc(o, PI, PI / 2.0, 1.2, Vec2::new(-0.1, -1.0)));
    }

    #[test]
    fn test_nearest_in_arc_picks_closest() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(3);
        let def = &default_enemies()[0];
        let mut arena = EnemyArena::new();
        let far = arena.spawn(def, TilePos::new(5, 8), 1, &mut rng);
        let near = arena.spawn(def, TilePos::new(5, 6), 1, &mut rng);
        let _behind = arena.spawn(def, TilePos::new(5, 4), 1, &mut rng);
        let origin = Vec2::new(5.5, 5.5);
        let aim = aim_angle_of(Vec2::Y);
        assert_eq!(nearest_in_arc(&arena, origin, aim, PI / 2.0, 5.0), Some(near));
        assert_eq!(all_in_arc(&arena, origin, aim, PI / 2.0, 5.0), vec![far, near]);
        assert_eq!(nearest_in_arc(&arena, origin, aim, PI / 2.0, 0.5), None);
    }

    #[test]
    fn test_attack_applies_armor_and_cooldown() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(3);
        let mut p = fixed_warrior(10);
        let mut e = Enemy::spawn(0, &default_enemies()[0], TilePos::new(5, 6), 1, &mut rng);
        let hit = player_attack_enemy(&mut p, &mut e, &mut rng);
        // 10 + floor(16 / 5) = 13, armor 2
        assert_eq!(hit.damage, 11);
        assert!(!hit.crit);
        assert_eq!(e.hp, 25 - 11);
        assert!(!p.can_attack());
    }

    #[test]
    fn test_guaranteed_crit_multiplies() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(3);
        let mut p = fixed_warrior(10);
        p.stats.crit_chance = 100.0;
        let mut e = Enemy::spawn(0, &default_enemies()[4], TilePos::new(5, 6), 1, &mut rng);
        let hit = player_attack_enemy(&mut p, &mut e, &mut rng);
        // round(13 * 1.5) = 20, armor 8
        assert!(hit.crit);
        assert_eq!(hit.damage, 12);
    }

    #[test]
    fn test_poison_and_leech() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(3);
        let mut p = fixed_warrior(10);
        p.poison = Some(PoisonCoat { hits: 1, damage: 8 });
        p.stats.life_on_hit = 3.0;
        p.hp = 100;
        let mut e = Enemy::spawn(0, &default_enemies()[0], TilePos::new(5, 6), 1, &mut rng);
        let hit = player_attack_enemy(&mut p, &mut e, &mut rng);
        assert_eq!(hit.poison, Some(6));
        assert_eq!(e.hp, 25 - 11 - 6);
        assert_eq!(p.hp, 103);
        assert!(p.poison.is_none());
    }

    #[test]
    fn test_kill_flag() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(3);
        let mut p = fixed_warrior(100);
        let mut e = Enemy::spawn(0, &default_enemies()[1], TilePos::new(5, 6), 1, &mut rng);
        assert!(player_attack_enemy(&mut p, &mut e, &mut rng).killed);
        assert_eq!(e.hp, 0);
    }
}
