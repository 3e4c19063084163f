//! Centralized game constants for the crypt simulation core.
//!
//! Tunables that designers edit live in [`crate::config::SimConfig`]; the
//! values here are geometry and timing rules shared by several modules.

// =====================================================
// Dungeon
// =====================================================

/// Default map width in tiles
pub const MAP_WIDTH: i32 = 50;

/// Default map height in tiles
pub const MAP_HEIGHT: i32 = 40;

/// Smallest room side length
pub const MIN_ROOM_SIZE: i32 = 5;

/// Largest room side length
pub const MAX_ROOM_SIZE: i32 = 12;

/// Lower bound of the room count target
pub const MIN_ROOMS: u32 = 6;

/// Upper bound of the room count target
pub const MAX_ROOMS: u32 = 10;

/// Rejection sampling budget for room placement
pub const ROOM_PLACEMENT_ATTEMPTS: u32 = 200;

/// Margin kept free around every room
pub const ROOM_PADDING: i32 = 2;

/// Tiles carved on each side of a corridor's centre line (3 wide total)
pub const CORRIDOR_HALF_WIDTH: i32 = 1;

/// Number of floors in a run; the last one has no stairs
pub const MAX_FLOORS: u32 = 5;

/// Chest count bounds per floor
pub const MIN_CHESTS: u32 = 1;
pub const MAX_CHESTS: u32 = 3;

/// How often a spawn landing on the player start or stairs is re-rolled
pub const SPAWN_REROLL_LIMIT: u32 = 16;

/// Regular spawn count used when a floor has no spawn table entry
pub const FALLBACK_ENEMY_COUNT: u32 = 13;

// =====================================================
// Field of View
// =====================================================

/// Sight radius around the player in tiles
pub const FOV_RADIUS: i32 = 7;

/// Simulated seconds between FOV refreshes
pub const FOV_REFRESH_INTERVAL: f32 = 0.1;

/// Angular step of the FOV ray fan, in degrees
pub const FOV_RAY_STEP_DEGREES: u32 = 1;

// =====================================================
// Progression
// =====================================================

/// XP needed for the first level-up
pub const XP_PER_LEVEL: f32 = 50.0;

/// Threshold growth per level: round(XP_PER_LEVEL * XP_GROWTH^(level-1))
pub const XP_GROWTH: f32 = 1.5;

/// Skill points granted per level-up
pub const SKILL_POINTS_PER_LEVEL: u32 = 1;

// =====================================================
// Entities
// =====================================================

/// Player collision radius in tiles
pub const PLAYER_RADIUS: f32 = 0.3;

/// Enemy collision radius in tiles
pub const ENEMY_RADIUS: f32 = 0.28;

/// Patrol speed = ENEMY_SPEED_BASE * type speed * PATROL_SPEED_FACTOR
pub const ENEMY_SPEED_BASE: f32 = 1.5;
pub const PATROL_SPEED_FACTOR: f32 = 0.5;

/// Chase speed = ENEMY_SPEED_CHASE * type speed
pub const ENEMY_SPEED_CHASE: f32 = 2.8;

/// Enemy melee reach (strictly closer than this)
pub const ENEMY_ATTACK_RANGE: f32 = 0.8;

/// Seconds between enemy melee swings
pub const ENEMY_ATTACK_COOLDOWN: f32 = 1.0;

/// Per-floor stat scaling: 1 + (floor - 1) * FLOOR_STAT_SCALING
pub const FLOOR_STAT_SCALING: f32 = 0.25;

/// Idle pause before each patrol leg
pub const PATROL_PAUSE_SECS: f32 = 1.5;

/// Patrol leg length is PATROL_LEG_MIN_SECS + [0, PATROL_LEG_JITTER_SECS)
pub const PATROL_LEG_MIN_SECS: f32 = 2.0;
pub const PATROL_LEG_JITTER_SECS: f32 = 2.0;

/// Seconds out of sight before a chasing enemy gives up
pub const ALERT_TIMEOUT_SECS: f32 = 3.0;

/// Spawned enemies start with a random idle offset in [0, this)
pub const IDLE_START_JITTER_SECS: f32 = 3.0;

/// Duration of the hit flash after taking damage
pub const HIT_FLASH_SECS: f32 = 0.15;

/// Distance the player is shoved by a knockback monster skill
pub const MONSTER_KNOCKBACK_DISTANCE: f32 = 1.5;

// =====================================================
// Combat
// =====================================================

/// Damage range used when no weapon is equipped
pub const UNARMED_DAMAGE: (i32, i32) = (3, 6);

/// Non-mage classes add floor(str / STR_DAMAGE_DIVISOR) to basic attacks
pub const STR_DAMAGE_DIVISOR: f32 = 5.0;

/// Mages add floor(int / INT_DAMAGE_DIVISOR) to basic attacks
pub const INT_DAMAGE_DIVISOR: f32 = 4.0;

/// Speed bonus per point of dexterity above DEX_SPEED_PIVOT
pub const DEX_SPEED_PER_POINT: f32 = 0.01;
pub const DEX_SPEED_PIVOT: f32 = 10.0;

/// Sub-steps used to clip a dash against walls
pub const DASH_STEPS: u32 = 20;

/// Furthest a point-target skill lands ahead of the caster
pub const BLAST_MAX_THROW: f32 = 4.0;

// =====================================================
// Inventory & Loot
// =====================================================

/// Backpack slot count
pub const INVENTORY_SIZE: usize = 15;

/// Pickup reach around the player
pub const PICKUP_RANGE: f32 = 0.6;

/// Chance a regular enemy drops an item (bosses always do)
pub const ITEM_DROP_CHANCE: f64 = 0.35;

/// Independent chance an enemy drops a potion
pub const POTION_DROP_CHANCE: f64 = 0.25;

/// Chest contents: CHEST_MIN_LOOT..=CHEST_MAX_LOOT rolls
pub const CHEST_MIN_LOOT: u32 = 1;
pub const CHEST_MAX_LOOT: u32 = 2;

/// Chance each chest roll yields an item rather than a potion
pub const CHEST_ITEM_CHANCE: f64 = 0.6;

/// Legendary items add a second prefix at this magnitude
pub const LEGENDARY_EXTRA_PREFIX_MULT: f32 = 1.5;

/// Floor from which the full potion pool is available
pub const FULL_POTION_POOL_FLOOR: u32 = 3;

// =====================================================
// Session
// =====================================================

/// Largest simulated step accepted per tick
pub const MAX_TICK_DELTA: f32 = 0.05;

/// Distance from a chest centre that opens it
pub const CHEST_TRIGGER_RANGE: f32 = 0.5;

/// Distance from the stairs centre that descends
pub const STAIRS_TRIGGER_RANGE: f32 = 0.4;

/// Floating text lifetime drain per second (life starts at 1.0)
pub const FLOATING_TEXT_DECAY: f32 = 1.5;

/// Lifetime of a visual effect record in seconds
pub const VISUAL_EFFECT_SECS: f32 = 0.4;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_bounds_fit_map() {
        assert!(MAX_ROOM_SIZE + 3 < MAP_WIDTH);
        assert!(MAX_ROOM_SIZE + 3 < MAP_HEIGHT);
        assert!(MIN_ROOM_SIZE >= 3, "Spawns need an interior ring");
    }

    #[test]
    fn test_drop_chances_are_probabilities() {
        for p in [ITEM_DROP_CHANCE, POTION_DROP_CHANCE, CHEST_ITEM_CHANCE] {
            assert!((0.0..=1.0).contains(&p));
        }
    }

    #[test]
    fn test_trigger_ranges_smaller_than_pickup() {
        assert!(STAIRS_TRIGGER_RANGE < PICKUP_RANGE);
        assert!(CHEST_TRIGGER_RANGE < PICKUP_RANGE);
    }
}
