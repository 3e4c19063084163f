//! Enemy AI: patrol, chase and telegraphed casts.
//!
//! Chase priority each tick: start a ready in-range skill, else melee when
//! close enough, else step toward the player. A cast always runs its full
//! wind-up and then hands the telegraph back for hit-testing.

use bevy::math::Vec2;
use rand::Rng;
use tracing::{debug, trace};

use super::{random_dir, random_patrol_leg, AiState, CastRecord, Enemy, Telegraph};
use crate::config::SimConfig;
use crate::constants::{
    ALERT_TIMEOUT_SECS, ENEMY_ATTACK_COOLDOWN, ENEMY_ATTACK_RANGE, PATROL_PAUSE_SECS,
};
use crate::dungeon::Dungeon;
use crate::utils::TilePos;

/// What an enemy did this tick that the session has to resolve
#[derive(Debug, Clone, PartialEq)]
pub enum EnemyAction {
    Attack {
        damage: i32,
    },
    Skill {
        skill_id: String,
        name: String,
        damage: i32,
        telegraph: Telegraph,
        knockback: bool,
    },
}

/// Read-only view of the world around one enemy
pub struct Surroundings<'a> {
    pub dungeon: &'a Dungeon,
    pub player_pos: Vec2,
    /// Enemies stored before and after the one being updated
    pub before: &'a [Enemy],
    pub after: &'a [Enemy],
}

impl Surroundings<'_> {
    pub fn collides_enemy(&self, pos: Vec2, radius: f32) -> bool {
        self.before
            .iter()
            .chain(self.after)
            .filter(|e| !e.is_dead())
            .any(|e| pos.distance_squared(e.pos) < (radius + e.radius).powi(2))
    }
}

/// Advance one enemy by `dt`
pub fn update<R: Rng + ?Sized>(
    enemy: &mut Enemy,
    dt: f32,
    world: &Surroundings<'_>,
    config: &SimConfig,
    rng: &mut R,
) -> Option<EnemyAction> {
    if enemy.is_dead() {
        return None;
    }

    if enemy.hit_flash > 0.0 {
        enemy.hit_flash -= dt;
    }
    if enemy.attack_cooldown > 0.0 {
        enemy.attack_cooldown -= dt;
    }
    for cd in enemy.skill_cooldowns.values_mut() {
        if *cd > 0.0 {
            *cd -= dt;
        }
    }
    enemy.tick_slow(dt);

    if enemy.state == AiState::Cast {
        return tick_cast(enemy, dt, rng);
    }

    let dist = enemy.pos.distance(world.player_pos);
    let sees_player = dist <= enemy.sight_range
        && world.dungeon.line_of_sight(
            TilePos::containing(enemy.pos),
            TilePos::containing(world.player_pos),
        );

    if sees_player {
        if enemy.state != AiState::Chase {
            debug!(enemy = enemy.id, "Spotted player");
        }
        enemy.state = AiState::Chase;
        enemy.alert_timer = 0.0;
    } else if enemy.state == AiState::Chase {
        enemy.alert_timer += dt;
        if enemy.alert_timer > ALERT_TIMEOUT_SECS {
            debug!(enemy = enemy.id, "Lost the player");
            enemy.state = AiState::Patrol;
            enemy.idle_timer = 0.0;
        }
    }

    match enemy.state {
        AiState::Chase => chase(enemy, dt, world, dist, config, rng),
        _ => {
            patrol(enemy, dt, world, rng);
            None
        }
    }
}

fn tick_cast<R: Rng + ?Sized>(enemy: &mut Enemy, dt: f32, rng: &mut R) -> Option<EnemyAction> {
    let Some(cast) = enemy.cast.as_mut() else {
        enemy.state = AiState::Chase;
        return None;
    };
    cast.remaining -= dt;
    if cast.remaining > 0.0 {
        return None;
    }

    let cast = enemy.cast.take()?;
    let damage = (enemy.roll_damage(rng) as f32 * cast.damage_scale).round() as i32;
    enemy.skill_cooldowns.insert(cast.skill_id.clone(), cast.cooldown);
    enemy.state = AiState::Chase;
    debug!(enemy = enemy.id, skill = %cast.skill_id, damage, "Cast resolved");

    Some(EnemyAction::Skill {
        skill_id: cast.skill_id,
        name: cast.name,
        damage,
        telegraph: cast.telegraph,
        knockback: cast.knockback,
    })
}

fn chase<R: Rng + ?Sized>(
    enemy: &mut Enemy,
    dt: f32,
    world: &Surroundings<'_>,
    dist: f32,
    config: &SimConfig,
    rng: &mut R,
) -> Option<EnemyAction> {
    let ready = enemy
        .skills
        .iter()
        .filter(|id| enemy.skill_cooldowns.get(id.as_str()).copied().unwrap_or(0.0) <= 0.0)
        .filter_map(|id| config.monster_skill(id))
        .find(|skill| skill.in_range(dist));

    if let Some(skill) = ready {
        let telegraph =
            Telegraph::from_shape(skill.shape, enemy.pos, world.player_pos, skill.self_targeted());
        debug!(enemy = enemy.id, skill = %skill.id, "Casting");
        enemy.cast = Some(CastRecord {
            skill_id: skill.id.clone(),
            name: skill.name.clone(),
            remaining: skill.cast_time,
            cooldown: skill.cooldown,
            damage_scale: skill.damage_scale,
            knockback: skill.knockback,
            telegraph,
        });
        enemy.state = AiState::Cast;
        return None;
    }

    if dist < ENEMY_ATTACK_RANGE {
        if enemy.attack_cooldown <= 0.0 {
            enemy.attack_cooldown = ENEMY_ATTACK_COOLDOWN;
            return Some(EnemyAction::Attack {
                damage: enemy.roll_damage(rng),
            });
        }
        return None;
    }

    let delta = world.player_pos - enemy.pos;
    let len = delta.length();
    if len > 0.01 {
        let step = delta / len * enemy.chase_speed() * dt;
        enemy.push(step, world);
    }
    None
}

fn patrol<R: Rng + ?Sized>(enemy: &mut Enemy, dt: f32, world: &Surroundings<'_>, rng: &mut R) {
    enemy.idle_timer += dt;
    if enemy.idle_timer < PATROL_PAUSE_SECS {
        return;
    }

    enemy.patrol_walk += dt;
    if enemy.patrol_walk > enemy.patrol_leg {
        enemy.patrol_dir = random_dir(rng);
        enemy.patrol_leg = random_patrol_leg(rng);
        enemy.patrol_walk = 0.0;
        enemy.idle_timer = 0.0;
        return;
    }

    let step = enemy.patrol_dir * enemy.patrol_speed() * dt;
    if !enemy.push(step, world) {
        trace!(enemy = enemy.id, "Patrol bumped, reversing");
        enemy.patrol_dir = -enemy.patrol_dir;
        enemy.patrol_walk = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::Tile;
    use crate::monster::bestiary::default_enemies;
    use crate::monster::EnemyArena;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn hall() -> Dungeon {
        let mut d = Dungeon::filled(1, 30, 12);
        for y in 1..11 {
            for x in 1..29 {
                d.set_tile(TilePos::new(x, y), Tile::Floor);
            }
        }
        d
    }

    fn spawn(key: &str, tile: TilePos) -> (EnemyArena, Xoshiro256PlusPlus) {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(9);
        let mut arena = EnemyArena::new();
        let def = default_enemies().into_iter().find(|e| e.key == key).unwrap();
        arena.spawn(&def, tile, 1, &mut rng);
        (arena, rng)
    }

    fn lone(arena: &mut EnemyArena) -> &mut Enemy {
        arena.iter_mut().next().unwrap()
    }

    fn step(
        arena: &mut EnemyArena,
        d: &Dungeon,
        player: Vec2,
        dt: f32,
        rng: &mut Xoshiro256PlusPlus,
    ) -> Vec<EnemyAction> {
        arena
            .update_all(dt, d, player, &SimConfig::default(), rng)
            .into_iter()
            .map(|(_, a)| a)
            .collect()
    }

    #[test]
    fn test_sight_starts_chase() {
        let d = hall();
        let (mut arena, mut rng) = spawn("slime", TilePos::new(5, 5));
        // poison nova is self-targeted, so a seen player triggers it at once
        step(&mut arena, &d, Vec2::new(8.5, 5.5), 0.016, &mut rng);
        let e = lone(&mut arena);
        assert_eq!(e.state, AiState::Cast);
        assert!(matches!(e.cast.as_ref().unwrap().telegraph, Telegraph::Circle { center, .. } if center == e.pos));
    }

    #[test]
    fn test_wall_blocks_sight() {
        let mut d = hall();
        for y in 1..11 {
            d.set_tile(TilePos::new(7, y), Tile::Wall);
        }
        let (mut arena, mut rng) = spawn("skeleton", TilePos::new(5, 5));
        step(&mut arena, &d, Vec2::new(9.5, 5.5), 0.016, &mut rng);
        assert_eq!(lone(&mut arena).state, AiState::Patrol);
    }

    #[test]
    fn test_lost_player_returns_to_patrol() {
        let d = hall();
        let (mut arena, mut rng) = spawn("skeleton", TilePos::new(5, 5));
        {
            let e = lone(&mut arena);
            e.state = AiState::Chase;
            e.sight_range = 0.0;
            e.alert_timer = 3.0;
        }
        step(&mut arena, &d, Vec2::new(20.5, 5.5), 0.05, &mut rng);
        let e = lone(&mut arena);
        assert_eq!(e.state, AiState::Patrol);
        assert!(e.idle_timer < PATROL_PAUSE_SECS);
    }

    #[test]
    fn test_cast_resolves_after_wind_up() {
        let d = hall();
        let (mut arena, mut rng) = spawn("skeleton", TilePos::new(5, 5));
        let player = Vec2::new(8.5, 5.5);
        assert!(step(&mut arena, &d, player, 0.05, &mut rng).is_empty());
        assert_eq!(lone(&mut arena).state, AiState::Cast);

        let mut resolved = None;
        for _ in 0..19 {
            let actions = step(&mut arena, &d, player, 0.05, &mut rng);
            assert!(actions.is_empty());
        }
        for _ in 0..2 {
            if let Some(a) = step(&mut arena, &d, player, 0.05, &mut rng).pop() {
                resolved = Some(a);
            }
        }
        let Some(EnemyAction::Skill {
            skill_id,
            damage,
            knockback,
            ..
        }) = resolved
        else {
            panic!("charge should resolve");
        };
        assert_eq!(skill_id, "charge");
        assert!(knockback);
        // 5..=10 scaled by 1.2
        assert!((6..=12).contains(&damage));
        let e = lone(&mut arena);
        assert_eq!(e.state, AiState::Chase);
        assert!(e.skill_cooldowns["charge"] > 7.0);
    }

    #[test]
    fn test_cast_is_inert() {
        let d = hall();
        let (mut arena, mut rng) = spawn("skeleton", TilePos::new(5, 5));
        let player = Vec2::new(8.5, 5.5);
        step(&mut arena, &d, player, 0.05, &mut rng);
        let before = lone(&mut arena).pos;
        step(&mut arena, &d, player, 0.05, &mut rng);
        assert_eq!(lone(&mut arena).pos, before);
    }

    #[test]
    fn test_melee_when_skills_cooling() {
        let d = hall();
        let (mut arena, mut rng) = spawn("skeleton", TilePos::new(5, 5));
        lone(&mut arena).skill_cooldowns.insert("charge".into(), 100.0);
        let player = Vec2::new(6.0, 5.5);
        let actions = step(&mut arena, &d, player, 0.016, &mut rng);
        assert!(matches!(actions[..], [EnemyAction::Attack { damage }] if (5..=10).contains(&damage)));
        assert!(step(&mut arena, &d, player, 0.016, &mut rng).is_empty());
    }

    #[test]
    fn test_chase_moves_toward_player() {
        let d = hall();
        let (mut arena, mut rng) = spawn("goblin", TilePos::new(5, 5));
        lone(&mut arena).skill_cooldowns.insert("charge".into(), 100.0);
        let player = Vec2::new(10.5, 5.5);
        step(&mut arena, &d, player, 0.05, &mut rng);
        let e = lone(&mut arena);
        assert!(e.pos.x > 5.5);
        assert!((e.pos.x - 5.5 - 2.8 * 0.05).abs() < 1e-4);
    }

    #[test]
    fn test_enemies_do_not_overlap() {
        let d = hall();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(2);
        let def = default_enemies().remove(2);
        let mut arena = EnemyArena::new();
        arena.spawn(&def, TilePos::new(5, 5), 1, &mut rng);
        arena.spawn(&def, TilePos::new(6, 5), 1, &mut rng);
        for e in arena.iter_mut() {
            e.skill_cooldowns.insert("charge".into(), 100.0);
        }
        for _ in 0..60 {
            step(&mut arena, &d, Vec2::new(3.5, 5.5), 0.05, &mut rng);
        }
        let pos: Vec<Vec2> = arena.iter().map(|e| e.pos).collect();
        assert!(pos[0].distance(pos[1]) >= 0.56 - 1e-4);
    }
}
