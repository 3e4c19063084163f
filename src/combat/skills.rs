//! Player skill execution.
//!
//! Each archetype turns (caster, enemies, parameters) into damage,
//! displacement or status. Mana and cooldown are paid by the caller;
//! XP and drops for kills are the caller's job too.

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::all_in_arc;
use crate::constants::{BLAST_MAX_THROW, DASH_STEPS};
use crate::dungeon::Dungeon;
use crate::events::{EffectKind, FeedbackQueue, TextTone};
use crate::monster::{EnemyArena, EnemyId};
use crate::player::{PlayerSkillDef, Player, PoisonCoat, SkillKind};
use crate::utils::{aim_vector, distance_to_segment};

/// Damage dealt to one enemy by a skill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillHit {
    pub enemy: EnemyId,
    /// Damage after armor
    pub damage: i32,
    pub killed: bool,
}

/// Everything a cast did
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillEffect {
    pub hits: Vec<SkillHit>,
    pub slowed: Vec<EnemyId>,
    /// Caster's derived stats need rebuilding
    pub stats_changed: bool,
}

impl SkillEffect {
    pub fn kills(&self) -> impl Iterator<Item = EnemyId> + '_ {
        self.hits.iter().filter(|h| h.killed).map(|h| h.enemy)
    }

    /// Every enemy touched, hit or slowed, without repeats
    pub fn affected(&self) -> Vec<EnemyId> {
        let mut ids: Vec<EnemyId> = self.hits.iter().map(|h| h.enemy).collect();
        for id in &self.slowed {
            if !ids.contains(id) {
                ids.push(*id);
            }
        }
        ids
    }
}

fn strike(
    enemies: &mut EnemyArena,
    id: EnemyId,
    damage: i32,
    feedback: &mut FeedbackQueue,
) -> Option<SkillHit> {
    let enemy = enemies.get_mut(id)?;
    let dealt = enemy.take_damage(damage);
    feedback.text(enemy.pos, dealt.to_string(), TextTone::Skill, true);
    Some(SkillHit {
        enemy: id,
        damage: dealt,
        killed: enemy.is_dead(),
    })
}

/// Run `skill` from the player's position along `player.aim`
pub fn execute_skill(
    skill: &PlayerSkillDef,
    player: &mut Player,
    enemies: &mut EnemyArena,
    dungeon: &Dungeon,
    feedback: &mut FeedbackQueue,
) -> SkillEffect {
    let mut effect = SkillEffect::default();
    let origin = player.pos;
    let aim = player.aim;

    match skill.kind {
        SkillKind::ArcStrike {
            damage,
            scaling,
            range,
            arc,
            knockback,
        } => {
            let amount = damage + scaling.bonus(&player.stats);
            for id in all_in_arc(enemies, origin, aim, arc, range) {
                let Some(hit) = strike(enemies, id, amount, feedback) else {
                    continue;
                };
                effect.hits.push(hit);
                if let Some(enemy) = enemies.get_mut(id) {
                    let delta = enemy.pos - origin;
                    let dist = delta.length();
                    if dist > 0.0 {
                        let kb = delta / dist * knockback;
                        let next = Vec2::new(enemy.pos.x + kb.x, enemy.pos.y);
                        if !enemy.collides_wall(next, dungeon) {
                            enemy.pos = next;
                        }
                        let next = Vec2::new(enemy.pos.x, enemy.pos.y + kb.y);
                        if !enemy.collides_wall(next, dungeon) {
                            enemy.pos = next;
                        }
                    }
                }
            }
            feedback.effect(origin, EffectKind::Shockwave { angle: aim, range, arc });
        }

        SkillKind::Dash {
            damage,
            scaling,
            distance,
            width,
        } => {
            let travel = aim_vector(aim) * distance;
            let mut landing = origin;
            for i in 1..=DASH_STEPS {
                let test = origin + travel * (i as f32 / DASH_STEPS as f32);
                if player.collides_at(test, dungeon) {
                    break;
                }
                landing = test;
            }

            let amount = damage + scaling.bonus(&player.stats);
            let in_path: Vec<EnemyId> = enemies
                .iter()
                .filter(|e| !e.is_dead() && distance_to_segment(e.pos, origin, landing) < width)
                .map(|e| e.id)
                .collect();
            for id in in_path {
                effect.hits.extend(strike(enemies, id, amount, feedback));
            }

            player.pos = landing;
            feedback.effect(
                origin,
                EffectKind::DashTrail {
                    to_x: landing.x,
                    to_y: landing.y,
                },
            );
        }

        SkillKind::Blast {
            damage,
            scaling,
            radius,
            range,
        } => {
            let center = origin + aim_vector(aim) * range.min(BLAST_MAX_THROW);
            let amount = damage + scaling.bonus(&player.stats);
            let caught: Vec<EnemyId> = enemies
                .iter()
                .filter(|e| !e.is_dead() && e.pos.distance(center) < radius)
                .map(|e| e.id)
                .collect();
            for id in caught {
                effect.hits.extend(strike(enemies, id, amount, feedback));
            }
            feedback.effect(center, EffectKind::Explosion { radius });
        }

        SkillKind::StatBuff {
            stat,
            value,
            duration,
        } => {
            player.add_buff(stat, value, duration);
            effect.stats_changed = true;
            feedback.effect(origin, EffectKind::Aura { radius: 1.2 });
        }

        SkillKind::PoisonCoat { hits, damage } => {
            player.poison = Some(PoisonCoat { hits, damage });
            feedback.effect(origin, EffectKind::Aura { radius: 1.2 });
        }

        SkillKind::FrostWard {
            shield,
            slow_radius,
            slow_factor,
            duration,
        } => {
            player.shield = shield;
            for enemy in enemies.iter_mut() {
                if !enemy.is_dead() && enemy.pos.distance(origin) < slow_radius {
                    enemy.apply_slow(slow_factor, duration);
                    effect.slowed.push(enemy.id);
                }
            }
            feedback.text(origin, format!("+{shield}"), TextTone::Shielded, false);
            feedback.effect(origin, EffectKind::FrostRing { radius: slow_radius });
        }
    }

    debug!(
        skill = %skill.id,
        hits = effect.hits.len(),
        slowed = effect.slowed.len(),
        "Skill executed"
    );
    effect
}
