//! Crypt - Simulation Core Library
//!
//! Deterministic game logic for a top-down action roguelike:
//! - Dungeon generation (rooms, corridors, spawns, chests, stairs)
//! - Field of view and exploration memory
//! - Player classes, derived stats, leveling
//! - Enemy AI (patrol, chase, telegraphed skills)
//! - Combat (cone attacks, crits, dodge, armor, shields, poison)
//! - Loot (rarity tiers, affixes, potions) and inventory
//! - Passive skill tree
//! - Session orchestration with a Bevy plugin
//! - Monte-Carlo balance survey

pub mod balance;
pub mod combat;
pub mod config;
pub mod constants;
pub mod dungeon;
pub mod engine;
pub mod events;
pub mod logging;
pub mod loot;
pub mod monster;
pub mod player;
pub mod skilltree;
pub mod stats;
pub mod utils;
