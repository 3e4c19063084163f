//! Serializable per-tick views of a session.
//!
//! These mirror the live state with plain numbers instead of `Vec2` so a
//! renderer or test harness can consume them as JSON.

use serde::{Deserialize, Serialize};

use crate::dungeon::Tile;
use crate::events::{FloatingText, VisualEffect};
use crate::loot::Rarity;
use crate::monster::{AiState, Enemy, EnemyId, Telegraph};
use crate::player::{Buff, ClassKind, Equipment, Inventory, Player, PoisonCoat};
use crate::stats::StatBlock;
use crate::utils::TilePos;

use super::session::{RunRecord, RunState};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum TelegraphMsg {
    Circle {
        x: f32,
        y: f32,
        radius: f32,
    },
    Line {
        x: f32,
        y: f32,
        /// Direction as an aim angle
        angle: f32,
        length: f32,
        width: f32,
    },
}

impl From<&Telegraph> for TelegraphMsg {
    fn from(t: &Telegraph) -> Self {
        match *t {
            Telegraph::Circle { center, radius } => TelegraphMsg::Circle {
                x: center.x,
                y: center.y,
                radius,
            },
            Telegraph::Line {
                origin,
                dir,
                length,
                width,
            } => TelegraphMsg::Line {
                x: origin.x,
                y: origin.y,
                angle: crate::utils::aim_angle_of(dir),
                length,
                width,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub class: ClassKind,
    pub x: f32,
    pub y: f32,
    pub aim: f32,
    pub level: u32,
    pub xp: u32,
    pub xp_to_next: u32,
    pub skill_points: u32,
    pub hp: i32,
    pub max_hp: i32,
    pub mp: i32,
    pub max_mp: i32,
    pub shield: i32,
    pub stats: StatBlock,
    pub equipment: Equipment,
    pub inventory: Inventory,
    pub buffs: Vec<Buff>,
    pub poison: Option<PoisonCoat>,
    pub attack_cooldown: f32,
    pub skill_cooldowns: Vec<f32>,
}

impl From<&Player> for PlayerSnapshot {
    fn from(p: &Player) -> Self {
        Self {
            class: p.class.kind,
            x: p.pos.x,
            y: p.pos.y,
            aim: p.aim,
            level: p.level,
            xp: p.xp,
            xp_to_next: p.xp_to_next,
            skill_points: p.skill_points,
            hp: p.hp,
            max_hp: p.max_hp(),
            mp: p.mp,
            max_mp: p.max_mp(),
            shield: p.shield,
            stats: p.stats,
            equipment: p.equipment.clone(),
            inventory: p.inventory.clone(),
            buffs: p.buffs.clone(),
            poison: p.poison,
            attack_cooldown: p.attack_cooldown.max(0.0),
            skill_cooldowns: p.skill_cooldowns.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemySnapshot {
    pub id: EnemyId,
    pub key: String,
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub hp: i32,
    pub max_hp: i32,
    pub state: AiState,
    pub is_boss: bool,
    pub hit_flash: bool,
    pub slowed: bool,
    pub telegraph: Option<TelegraphMsg>,
    /// Wind-up left on the current cast
    pub cast_remaining: Option<f32>,
}

impl From<&Enemy> for EnemySnapshot {
    fn from(e: &Enemy) -> Self {
        Self {
            id: e.id,
            key: e.key.clone(),
            name: e.name.clone(),
            x: e.pos.x,
            y: e.pos.y,
            hp: e.hp,
            max_hp: e.max_hp,
            state: e.state,
            is_boss: e.is_boss,
            hit_flash: e.is_flashing(),
            slowed: e.slow.is_some(),
            telegraph: e.cast.as_ref().map(|c| TelegraphMsg::from(&c.telegraph)),
            cast_remaining: e.cast.as_ref().map(|c| c.remaining.max(0.0)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundItemSnapshot {
    pub x: f32,
    pub y: f32,
    pub name: String,
    pub rarity: Rarity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapSnapshot {
    pub width: i32,
    pub height: i32,
    /// Row-major
    pub tiles: Vec<Tile>,
    pub explored: Vec<bool>,
    pub visible: Vec<TilePos>,
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub floor: u32,
    pub state: RunState,
    pub record: RunRecord,
    pub map: MapSnapshot,
    pub player: PlayerSnapshot,
    pub enemies: Vec<EnemySnapshot>,
    pub ground_items: Vec<GroundItemSnapshot>,
    pub texts: Vec<FloatingText>,
    pub effects: Vec<VisualEffect>,
}

impl SessionSnapshot {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
