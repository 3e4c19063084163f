//! Rooms-and-corridors floor generator.
//!
//! 1. Fill with wall, place non-overlapping rooms by rejection sampling
//! 2. Join consecutive rooms with 3-wide L corridors
//! 3. Stairs in the last room (not on the final floor), player in the first
//! 4. Boss next to the stairs, regular spawns and chests in rooms 2..N
//!
//! Generation never fails; short room counts just yield a smaller floor.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info};

use super::{Chest, Dungeon, EnemySpawn, Room, Tile};
use crate::config::SimConfig;
use crate::constants::{CORRIDOR_HALF_WIDTH, FALLBACK_ENEMY_COUNT, ROOM_PADDING, SPAWN_REROLL_LIMIT};
use crate::utils::{roll_range, TilePos};

/// Build floor `floor` from the config's dungeon knobs and spawn tables
pub fn generate<R: Rng + ?Sized>(config: &SimConfig, floor: u32, rng: &mut R) -> Dungeon {
    let d = &config.dungeon;
    let mut dungeon = Dungeon::filled(floor, d.width, d.height);

    dungeon.rooms = place_rooms(config, rng);
    for i in 0..dungeon.rooms.len() {
        let room = dungeon.rooms[i];
        carve_room(&mut dungeon, &room);
    }
    connect_rooms(&mut dungeon, rng);

    if let Some(first) = dungeon.rooms.first() {
        dungeon.player_start = first.center();
    }
    if floor < d.max_floors {
        if let Some(last) = dungeon.rooms.last() {
            let stairs = last.center();
            dungeon.set_tile(stairs, Tile::StairsDown);
            dungeon.stairs = Some(stairs);
        }
    }

    place_enemies(&mut dungeon, config, rng);
    place_chests(&mut dungeon, config, rng);

    info!(
        floor,
        rooms = dungeon.rooms.len(),
        spawns = dungeon.spawns.len(),
        chests = dungeon.chests.len(),
        "Generated floor"
    );
    dungeon
}

fn place_rooms<R: Rng + ?Sized>(config: &SimConfig, rng: &mut R) -> Vec<Room> {
    let d = &config.dungeon;
    let target = roll_range(rng, d.min_rooms as i32, d.max_rooms as i32) as usize;
    let mut rooms: Vec<Room> = Vec::with_capacity(target);
    let mut attempts = 0;

    while rooms.len() < target && attempts < d.placement_attempts {
        attempts += 1;

        let w = roll_range(rng, d.min_room_size, d.max_room_size);
        let h = roll_range(rng, d.min_room_size, d.max_room_size);
        let x = roll_range(rng, 1, d.width - w - 2);
        let y = roll_range(rng, 1, d.height - h - 2);
        let candidate = Room::new(x, y, w, h);

        if rooms.iter().any(|r| candidate.overlaps_padded(r, ROOM_PADDING)) {
            continue;
        }
        rooms.push(candidate);
    }

    if rooms.len() < target {
        debug!(placed = rooms.len(), target, attempts, "Room placement ran out of attempts");
    }
    rooms
}

fn carve_room(dungeon: &mut Dungeon, room: &Room) {
    for y in room.y..room.y + room.h {
        for x in room.x..room.x + room.w {
            dungeon.set_tile(TilePos::new(x, y), Tile::Floor);
        }
    }
}

fn connect_rooms<R: Rng + ?Sized>(dungeon: &mut Dungeon, rng: &mut R) {
    for i in 0..dungeon.rooms.len().saturating_sub(1) {
        let a = dungeon.rooms[i].center();
        let b = dungeon.rooms[i + 1].center();

        // L-shaped corridor
        if rng.gen_bool(0.5) {
            carve_h_corridor(dungeon, a.x, b.x, a.y);
            carve_v_corridor(dungeon, a.y, b.y, b.x);
        } else {
            carve_v_corridor(dungeon, a.y, b.y, a.x);
            carve_h_corridor(dungeon, a.x, b.x, b.y);
        }
    }
}

/// Corridors only replace wall, so rooms keep their floor
fn carve_corridor_tile(dungeon: &mut Dungeon, pos: TilePos) {
    if dungeon.in_bounds(pos) && dungeon.tile(pos) == Tile::Wall {
        dungeon.set_tile(pos, Tile::Corridor);
    }
}

fn carve_h_corridor(dungeon: &mut Dungeon, x1: i32, x2: i32, y: i32) {
    for x in x1.min(x2)..=x1.max(x2) {
        for dy in -CORRIDOR_HALF_WIDTH..=CORRIDOR_HALF_WIDTH {
            carve_corridor_tile(dungeon, TilePos::new(x, y + dy));
        }
    }
}

fn carve_v_corridor(dungeon: &mut Dungeon, y1: i32, y2: i32, x: i32) {
    for y in y1.min(y2)..=y1.max(y2) {
        for dx in -CORRIDOR_HALF_WIDTH..=CORRIDOR_HALF_WIDTH {
            carve_corridor_tile(dungeon, TilePos::new(x + dx, y));
        }
    }
}

/// Random interior tile of a room other than the first
fn random_inner_tile<R: Rng + ?Sized>(rooms: &[Room], rng: &mut R) -> TilePos {
    let idx = roll_range(rng, 1, rooms.len() as i32 - 1) as usize;
    let room = &rooms[idx];
    TilePos::new(
        roll_range(rng, room.x + 1, room.x + room.w - 2),
        roll_range(rng, room.y + 1, room.y + room.h - 2),
    )
}

fn place_enemies<R: Rng + ?Sized>(dungeon: &mut Dungeon, config: &SimConfig, rng: &mut R) {
    let Some(last) = dungeon.rooms.last() else {
        return;
    };
    if let Some(boss) = config.boss() {
        dungeon.spawns.push(EnemySpawn {
            key: boss.key.clone(),
            pos: last.center().offset(1, 1),
        });
    }

    if dungeon.rooms.len() < 2 {
        return;
    }
    let (pool, count) = match config.floor_spawns(dungeon.floor) {
        Some(table) => (table.pool.as_slice(), table.count),
        None => (&[][..], FALLBACK_ENEMY_COUNT),
    };

    for _ in 0..count {
        let mut placed = None;
        for _ in 0..SPAWN_REROLL_LIMIT {
            let pos = random_inner_tile(&dungeon.rooms, rng);
            if pos != dungeon.player_start && Some(pos) != dungeon.stairs {
                placed = Some(pos);
                break;
            }
        }
        let (Some(pos), Some(key)) = (placed, pool.choose(rng)) else {
            continue;
        };
        dungeon.spawns.push(EnemySpawn {
            key: key.clone(),
            pos,
        });
    }
}

fn place_chests<R: Rng + ?Sized>(dungeon: &mut Dungeon, config: &SimConfig, rng: &mut R) {
    if dungeon.rooms.len() < 2 {
        return;
    }
    let d = &config.dungeon;
    let count = roll_range(rng, d.min_chests as i32, d.max_chests as i32);
    for _ in 0..count {
        let pos = random_inner_tile(&dungeon.rooms, rng);
        // No retry when the tile is taken
        if dungeon.tile(pos) == Tile::Floor {
            dungeon.set_tile(pos, Tile::Chest);
            dungeon.chests.push(Chest { pos, opened: false });
        }
    }
}
