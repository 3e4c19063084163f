//! Player commands and their structured results.
//!
//! Nothing here is an error: every expected game condition (cooldown,
//! full bags, nothing to pick up) comes back as a variant.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::loot::{EquipSlot, PotionEffect};
use crate::monster::EnemyId;

/// A landed basic attack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackReport {
    pub target: EnemyId,
    /// Damage after armor
    pub damage: i32,
    pub crit: bool,
    /// Extra poison damage after armor, if a coat was consumed
    pub poison: Option<i32>,
    pub killed: bool,
    pub xp_gained: u32,
    pub level_ups: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttackOutcome {
    /// Attack cooldown still running; nothing happened
    NotReady,
    /// Swung at nothing; the cooldown was still spent
    Missed,
    Hit(AttackReport),
    RunOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum SkillRejection {
    #[error("no skill in that slot")]
    NoSkill,
    #[error("skill is on cooldown")]
    OnCooldown,
    #[error("not enough mana")]
    NotEnoughMana,
    #[error("the run is over")]
    RunOver,
}

/// What a cast did
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillReport {
    pub skill_id: String,
    pub mana_spent: i32,
    /// Enemies damaged or slowed
    pub affected: Vec<EnemyId>,
    pub kills: u32,
    pub level_ups: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SkillOutcome {
    Cast(SkillReport),
    Rejected(SkillRejection),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PickupOutcome {
    PickedUp { name: String, slot: usize },
    /// The item stays on the ground
    InventoryFull,
    NothingInRange,
}

/// Inventory interaction requested by the input layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InventoryAction {
    /// Drink a potion or equip gear from a bag slot
    Use(usize),
    /// Drop a bag slot on the ground
    Drop(usize),
    Unequip(EquipSlot),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InventoryOutcome {
    UsedPotion { name: String, effect: PotionEffect },
    Equipped { name: String, replaced: Option<String> },
    Dropped { name: String },
    Unequipped { name: String, slot: usize },
    /// Bag was full, so the item went to the ground
    UnequippedToGround { name: String },
    EmptySlot,
}
