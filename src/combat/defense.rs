//! Damage taken by the player.
//!
//! - Melee: dodge roll, then armor (minimum 1), then shield, then health
//! - Monster skills: telegraph hit-test, no dodge, no armor, shield then health

use bevy::math::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::monster::Telegraph;
use crate::player::Player;
use crate::utils::roll_percent;

/// Result of damage aimed at the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DefenseOutcome {
    /// Dodge roll succeeded; nothing happened
    Dodged,
    /// Shield took all of it
    Absorbed { absorbed: i32 },
    /// Health took `damage`; the shield may have soaked part first
    Hit { damage: i32, absorbed: i32 },
}

impl DefenseOutcome {
    /// Damage that reached health
    pub fn health_damage(&self) -> i32 {
        match self {
            DefenseOutcome::Hit { damage, .. } => *damage,
            _ => 0,
        }
    }
}

/// Route damage through the shield into health
fn land(player: &mut Player, damage: i32) -> DefenseOutcome {
    let (absorbed, taken) = player.take_damage_with_shield(damage);
    if taken <= 0 {
        DefenseOutcome::Absorbed { absorbed }
    } else {
        DefenseOutcome::Hit {
            damage: taken,
            absorbed,
        }
    }
}

/// Resolve an enemy melee swing of `raw` damage
pub fn enemy_attack_player<R: Rng + ?Sized>(
    raw: i32,
    player: &mut Player,
    rng: &mut R,
) -> DefenseOutcome {
    if roll_percent(rng, player.stats.dodge) {
        debug!("Player dodged");
        return DefenseOutcome::Dodged;
    }
    let damage = (raw - player.stats.armor as i32).max(1);
    let outcome = land(player, damage);
    debug!(raw, damage, ?outcome, hp = player.hp, "Enemy hit player");
    outcome
}

/// Hit-test a resolved monster skill. `None` when the player stepped out.
pub fn monster_skill_hit_player(
    telegraph: &Telegraph,
    damage: i32,
    player: &mut Player,
) -> Option<DefenseOutcome> {
    if !telegraph.hits(player.pos, player.radius) {
        return None;
    }
    Some(land(player, damage.max(0)))
}

/// Offset that shoves the player away from `source`
pub fn knockback_offset(source: Vec2, target: Vec2, distance: f32) -> Vec2 {
    let delta = target - source;
    let len = delta.length();
    let dir = if len > 0.0 { delta / len } else { delta };
    dir * distance
}
