//! Enemy entities and the arena that owns them.
//!
//! Enemies are stored in an [`EnemyArena`] and addressed by a stable
//! [`EnemyId`]. Stats are scaled by floor once at spawn; speeds are always
//! recomputed from the type multiplier and any active slow.

pub mod ai;
pub mod bestiary;

use std::collections::HashMap;
use std::f32::consts::TAU;

use bevy::math::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::SimConfig;
use crate::constants::{
    ENEMY_RADIUS, ENEMY_SPEED_BASE, ENEMY_SPEED_CHASE, FLOOR_STAT_SCALING, HIT_FLASH_SECS,
    IDLE_START_JITTER_SECS, PATROL_LEG_JITTER_SECS, PATROL_LEG_MIN_SECS, PATROL_SPEED_FACTOR,
};
use crate::dungeon::Dungeon;
use crate::utils::{distance_to_segment, roll_range, TilePos};

pub use ai::{EnemyAction, Surroundings};
pub use bestiary::{EnemyDef, FloorSpawnTable, MonsterSkillDef, SkillShape, BOSS_KEY};

/// Stable enemy handle, unique within a session
pub type EnemyId = u32;

/// AI state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AiState {
    Patrol,
    Chase,
    Cast,
}

/// Warning shape of a skill being wound up
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Telegraph {
    Circle { center: Vec2, radius: f32 },
    /// Segment from `origin` along unit vector `dir`
    Line {
        origin: Vec2,
        dir: Vec2,
        length: f32,
        width: f32,
    },
}

impl Telegraph {
    pub fn from_shape(shape: SkillShape, caster: Vec2, target: Vec2, self_targeted: bool) -> Self {
        match shape {
            SkillShape::Circle { radius } => Telegraph::Circle {
                center: if self_targeted { caster } else { target },
                radius,
            },
            SkillShape::Line { length, width } => {
                let dir = (target - caster).normalize_or_zero();
                Telegraph::Line {
                    origin: caster,
                    dir: if dir == Vec2::ZERO { Vec2::Y } else { dir },
                    length,
                    width,
                }
            }
        }
    }

    /// Whether a circle at `pos` with `radius` is caught by the shape
    pub fn hits(&self, pos: Vec2, radius: f32) -> bool {
        match *self {
            Telegraph::Circle { center, radius: r } => center.distance(pos) < r + radius,
            Telegraph::Line {
                origin,
                dir,
                length,
                width,
            } => distance_to_segment(pos, origin, origin + dir * length) < width / 2.0 + radius,
        }
    }
}

/// A skill in its wind-up
#[derive(Debug, Clone, PartialEq)]
pub struct CastRecord {
    pub skill_id: String,
    pub name: String,
    pub remaining: f32,
    pub cooldown: f32,
    pub damage_scale: f32,
    pub knockback: bool,
    pub telegraph: Telegraph,
}

/// Speed multiplier that expires on its own
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlowEffect {
    pub factor: f32,
    pub remaining: f32,
}

#[derive(Debug, Clone)]
pub struct Enemy {
    pub id: EnemyId,
    pub key: String,
    pub name: String,
    pub is_boss: bool,
    pub pos: Vec2,
    pub radius: f32,

    pub hp: i32,
    pub max_hp: i32,
    pub damage: (i32, i32),
    pub armor: i32,
    pub xp: u32,
    pub sight_range: f32,
    speed_mult: f32,
    pub skills: Vec<String>,

    pub state: AiState,
    pub idle_timer: f32,
    pub patrol_dir: Vec2,
    pub patrol_walk: f32,
    pub patrol_leg: f32,
    pub alert_timer: f32,
    pub attack_cooldown: f32,
    pub hit_flash: f32,
    pub skill_cooldowns: HashMap<String, f32>,
    pub cast: Option<CastRecord>,
    pub slow: Option<SlowEffect>,
}

fn floor_scale(floor: u32) -> f32 {
    1.0 + floor.saturating_sub(1) as f32 * FLOOR_STAT_SCALING
}

fn scaled(value: i32, scale: f32) -> i32 {
    (value as f32 * scale).round() as i32
}

pub(crate) fn random_dir<R: Rng + ?Sized>(rng: &mut R) -> Vec2 {
    Vec2::from_angle(rng.gen::<f32>() * TAU)
}

pub(crate) fn random_patrol_leg<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    PATROL_LEG_MIN_SECS + rng.gen::<f32>() * PATROL_LEG_JITTER_SECS
}

impl Enemy {
    /// Build an enemy of type `def` centred in `tile`, scaled for `floor`
    pub fn spawn<R: Rng + ?Sized>(
        id: EnemyId,
        def: &EnemyDef,
        tile: TilePos,
        floor: u32,
        rng: &mut R,
    ) -> Self {
        let scale = floor_scale(floor);
        let max_hp = scaled(def.hp, scale);
        Self {
            id,
            key: def.key.clone(),
            name: def.name.clone(),
            is_boss: def.is_boss,
            pos: tile.center(),
            radius: ENEMY_RADIUS,
            hp: max_hp,
            max_hp,
            damage: (scaled(def.damage.0, scale), scaled(def.damage.1, scale)),
            armor: scaled(def.armor, scale),
            xp: (def.xp as f32 * scale).round() as u32,
            sight_range: def.sight_range,
            speed_mult: def.speed,
            skills: def.skills.clone(),
            state: AiState::Patrol,
            idle_timer: rng.gen::<f32>() * IDLE_START_JITTER_SECS,
            patrol_dir: random_dir(rng),
            patrol_walk: 0.0,
            patrol_leg: random_patrol_leg(rng),
            alert_timer: 0.0,
            attack_cooldown: 0.0,
            hit_flash: 0.0,
            skill_cooldowns: HashMap::new(),
            cast: None,
            slow: None,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.hp <= 0
    }

    pub fn is_flashing(&self) -> bool {
        self.hit_flash > 0.0
    }

    /// Apply armor (minimum 1 lands), flash and aggro. Returns damage taken.
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        let reduced = (amount - self.armor).max(1);
        self.hp = (self.hp - reduced).max(0);
        self.hit_flash = HIT_FLASH_SECS;
        if self.state != AiState::Cast {
            self.state = AiState::Chase;
        }
        reduced
    }

    pub fn roll_damage<R: Rng + ?Sized>(&self, rng: &mut R) -> i32 {
        roll_range(rng, self.damage.0, self.damage.1)
    }

    fn slow_factor(&self) -> f32 {
        self.slow.map(|s| s.factor).unwrap_or(1.0)
    }

    pub fn patrol_speed(&self) -> f32 {
        ENEMY_SPEED_BASE * self.speed_mult * PATROL_SPEED_FACTOR * self.slow_factor()
    }

    pub fn chase_speed(&self) -> f32 {
        ENEMY_SPEED_CHASE * self.speed_mult * self.slow_factor()
    }

    /// Replace any running slow
    pub fn apply_slow(&mut self, factor: f32, duration: f32) {
        self.slow = Some(SlowEffect {
            factor,
            remaining: duration,
        });
    }

    pub(crate) fn tick_slow(&mut self, dt: f32) {
        if let Some(slow) = self.slow.as_mut() {
            slow.remaining -= dt;
            if slow.remaining <= 0.0 {
                self.slow = None;
                debug!(enemy = self.id, "Slow expired");
            }
        }
    }

    pub fn collides_wall(&self, pos: Vec2, dungeon: &Dungeon) -> bool {
        dungeon.collides_circle(pos, self.radius)
    }

    /// Displace by `offset` axis by axis; walls and other enemies stop each axis
    pub fn push(&mut self, offset: Vec2, world: &Surroundings<'_>) -> bool {
        let mut moved = false;
        let next = Vec2::new(self.pos.x + offset.x, self.pos.y);
        if !self.collides_wall(next, world.dungeon) && !world.collides_enemy(next, self.radius) {
            self.pos = next;
            moved = true;
        }
        let next = Vec2::new(self.pos.x, self.pos.y + offset.y);
        if !self.collides_wall(next, world.dungeon) && !world.collides_enemy(next, self.radius) {
            self.pos = next;
            moved = true;
        }
        moved
    }
}

/// Owns every enemy on the current floor
#[derive(Debug, Clone, Default)]
pub struct EnemyArena {
    enemies: Vec<Enemy>,
    next_id: EnemyId,
}

impl EnemyArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn an enemy and return its id
    pub fn spawn<R: Rng + ?Sized>(
        &mut self,
        def: &EnemyDef,
        tile: TilePos,
        floor: u32,
        rng: &mut R,
    ) -> EnemyId {
        let id = self.next_id;
        self.next_id += 1;
        self.enemies.push(Enemy::spawn(id, def, tile, floor, rng));
        id
    }

    /// Drop everything; ids keep counting up
    pub fn clear(&mut self) {
        self.enemies.clear();
    }

    pub fn len(&self) -> usize {
        self.enemies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.enemies.is_empty()
    }

    pub fn get(&self, id: EnemyId) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: EnemyId) -> Option<&mut Enemy> {
        self.enemies.iter_mut().find(|e| e.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Enemy> {
        self.enemies.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Enemy> {
        self.enemies.iter_mut()
    }

    /// Remove a dead enemy, handing it back
    pub fn remove(&mut self, id: EnemyId) -> Option<Enemy> {
        let idx = self.enemies.iter().position(|e| e.id == id)?;
        Some(self.enemies.remove(idx))
    }

    /// Run every enemy's AI in arena order. Each enemy sees the others at
    /// their current positions, including ones already moved this tick.
    pub fn update_all<R: Rng + ?Sized>(
        &mut self,
        dt: f32,
        dungeon: &Dungeon,
        player_pos: Vec2,
        config: &SimConfig,
        rng: &mut R,
    ) -> Vec<(EnemyId, EnemyAction)> {
        let mut actions = Vec::new();
        for i in 0..self.enemies.len() {
            let (before, rest) = self.enemies.split_at_mut(i);
            let Some((enemy, after)) = rest.split_first_mut() else {
                break;
            };
            let world = Surroundings {
                dungeon,
                player_pos,
                before,
                after,
            };
            if let Some(action) = ai::update(enemy, dt, &world, config, rng) {
                actions.push((enemy.id, action));
            }
        }
        actions
    }
}
