//! Tile grid, rooms, chests and spawn points for one floor.
//!
//! A [`Dungeon`] is produced by [`generator::generate`] and keeps its
//! topology for the whole floor. The only later mutations are chests
//! turning into floor when opened and the explored grid filling in.
//! Queries outside the map answer as if the tile were Wall.

pub mod generator;

use std::collections::HashSet;

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

use crate::utils::{cast_fov, has_line_of_sight, TilePos};

pub use generator::generate;

/// Tile kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tile {
    Wall,
    Floor,
    Corridor,
    Door,
    StairsDown,
    Chest,
}

impl Tile {
    pub fn is_walkable(&self) -> bool {
        *self != Tile::Wall
    }

    pub fn blocks_sight(&self) -> bool {
        *self == Tile::Wall
    }

    /// Single-character map glyph
    pub fn glyph(&self) -> char {
        match self {
            Tile::Wall => '#',
            Tile::Floor => '.',
            Tile::Corridor => ',',
            Tile::Door => '+',
            Tile::StairsDown => '>',
            Tile::Chest => '$',
        }
    }
}

/// Axis-aligned room in tile coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Room {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    pub fn center(&self) -> TilePos {
        TilePos::new(self.x + self.w / 2, self.y + self.h / 2)
    }

    pub fn contains(&self, pos: TilePos) -> bool {
        pos.x >= self.x && pos.x < self.x + self.w && pos.y >= self.y && pos.y < self.y + self.h
    }

    /// True when `self` grown by `padding` on every side touches `other`
    pub fn overlaps_padded(&self, other: &Room, padding: i32) -> bool {
        self.x - padding < other.x + other.w
            && self.x + self.w + padding > other.x
            && self.y - padding < other.y + other.h
            && self.y + self.h + padding > other.y
    }
}

/// A chest; `opened` flips once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chest {
    pub pos: TilePos,
    pub opened: bool,
}

/// Where an enemy of `key` appears when the floor is populated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemySpawn {
    pub key: String,
    pub pos: TilePos,
}

/// One generated floor
#[derive(Debug, Clone)]
pub struct Dungeon {
    pub floor: u32,
    width: i32,
    height: i32,
    tiles: Vec<Tile>,
    explored: Vec<bool>,
    pub rooms: Vec<Room>,
    pub player_start: TilePos,
    pub stairs: Option<TilePos>,
    pub spawns: Vec<EnemySpawn>,
    pub chests: Vec<Chest>,
}

impl Dungeon {
    /// All-wall grid with nothing placed
    pub fn filled(floor: u32, width: i32, height: i32) -> Self {
        let cells = (width.max(0) * height.max(0)) as usize;
        Self {
            floor,
            width,
            height,
            tiles: vec![Tile::Wall; cells],
            explored: vec![false; cells],
            rooms: Vec::new(),
            player_start: TilePos::new(width / 2, height / 2),
            stairs: None,
            spawns: Vec::new(),
            chests: Vec::new(),
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn in_bounds(&self, pos: TilePos) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    fn index(&self, pos: TilePos) -> Option<usize> {
        self.in_bounds(pos)
            .then(|| (pos.y * self.width + pos.x) as usize)
    }

    /// Tile at `pos`; Wall outside the map
    pub fn tile(&self, pos: TilePos) -> Tile {
        self.index(pos).map(|i| self.tiles[i]).unwrap_or(Tile::Wall)
    }

    /// Overwrite a tile. Out-of-bounds writes are ignored.
    pub fn set_tile(&mut self, pos: TilePos, tile: Tile) {
        if let Some(i) = self.index(pos) {
            self.tiles[i] = tile;
        }
    }

    pub fn is_walkable(&self, pos: TilePos) -> bool {
        self.tile(pos).is_walkable()
    }

    pub fn is_explored(&self, pos: TilePos) -> bool {
        self.index(pos).map(|i| self.explored[i]).unwrap_or(false)
    }

    pub fn explored_count(&self) -> usize {
        self.explored.iter().filter(|&&e| e).count()
    }

    /// Row-major tiles
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Row-major explored flags
    pub fn explored(&self) -> &[bool] {
        &self.explored
    }

    /// Whether a circle at `center` overlaps any wall or leaves the map
    pub fn collides_circle(&self, center: Vec2, radius: f32) -> bool {
        let min_x = (center.x - radius).floor() as i32;
        let max_x = (center.x + radius).floor() as i32;
        let min_y = (center.y - radius).floor() as i32;
        let max_y = (center.y + radius).floor() as i32;

        for ty in min_y..=max_y {
            for tx in min_x..=max_x {
                let pos = TilePos::new(tx, ty);
                if !self.in_bounds(pos) {
                    return true;
                }
                if self.tile(pos) == Tile::Wall {
                    let closest = Vec2::new(
                        center.x.clamp(tx as f32, tx as f32 + 1.0),
                        center.y.clamp(ty as f32, ty as f32 + 1.0),
                    );
                    if center.distance_squared(closest) < radius * radius {
                        return true;
                    }
                }
            }
        }
        false
    }

    /// Unobstructed line between two tiles (endpoints excluded)
    pub fn line_of_sight(&self, from: TilePos, to: TilePos) -> bool {
        has_line_of_sight(from, to, |p| self.tile(p).blocks_sight())
    }

    /// Visible tiles around `center`; every returned tile becomes explored
    pub fn reveal_area(&mut self, center: TilePos, radius: i32) -> HashSet<TilePos> {
        let visible = cast_fov(
            center,
            radius,
            |p| self.in_bounds(p),
            |p| self.tile(p).blocks_sight(),
        );
        for &pos in &visible {
            if let Some(i) = self.index(pos) {
                self.explored[i] = true;
            }
        }
        visible
    }

    /// First unopened chest whose centre is within `range` of `pos`
    pub fn chest_near(&self, pos: Vec2, range: f32) -> Option<usize> {
        self.chests
            .iter()
            .position(|c| !c.opened && c.pos.center().distance(pos) < range)
    }

    /// Open a chest: flag it and turn its tile into floor.
    /// Returns false if it was already open or does not exist.
    pub fn open_chest(&mut self, idx: usize) -> bool {
        let pos = match self.chests.get_mut(idx) {
            Some(chest) if !chest.opened => {
                chest.opened = true;
                chest.pos
            }
            _ => return false,
        };
        self.set_tile(pos, Tile::Floor);
        true
    }

    /// Standing on the stairs tile, close enough to its centre
    pub fn on_stairs(&self, pos: Vec2, range: f32) -> bool {
        match self.stairs {
            Some(stairs) => {
                TilePos::containing(pos) == stairs
                    && self.tile(stairs) == Tile::StairsDown
                    && stairs.center().distance(pos) < range
            }
            None => false,
        }
    }

    /// Text rendering, one row per line
    pub fn render_ascii(&self) -> String {
        let mut out = String::with_capacity(((self.width + 1) * self.height) as usize);
        for y in 0..self.height {
            for x in 0..self.width {
                out.push(self.tile(TilePos::new(x, y)).glyph());
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_box() -> Dungeon {
        let mut d = Dungeon::filled(1, 10, 10);
        for y in 1..9 {
            for x in 1..9 {
                d.set_tile(TilePos::new(x, y), Tile::Floor);
            }
        }
        d
    }

    #[test]
    fn test_render_ascii_rows() {
        let mut d = Dungeon::filled(1, 4, 3);
        d.set_tile(TilePos::new(1, 1), Tile::Floor);
        d.set_tile(TilePos::new(2, 1), Tile::StairsDown);
        assert_eq!(d.render_ascii(), "####\n#.>#\n####\n");
    }

    #[test]
    fn test_render_ascii_matches_seeded_floor() {
        use rand::SeedableRng;
        use rand_xoshiro::Xoshiro256PlusPlus;

        let config = crate::config::SimConfig::default();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(11);
        let d = generate(&config, 1, &mut rng);
        let text = d.render_ascii();
        let rows: Vec<&str> = text.lines().collect();
        assert_eq!(rows.len(), d.height() as usize);
        assert!(rows.iter().all(|r| r.chars().count() == d.width() as usize));
        assert_eq!(text.matches('>').count(), d.stairs.iter().count());
        assert_eq!(text.matches('$').count(), d.chests.len());
        assert!(rows[0].chars().all(|c| c == '#'));
    }

    #[test]
    fn test_out_of_bounds_is_wall() {
        let d = open_box();
        assert_eq!(d.tile(TilePos::new(-1, 3)), Tile::Wall);
        assert_eq!(d.tile(TilePos::new(3, 99)), Tile::Wall);
        assert!(!d.is_walkable(TilePos::new(10, 10)));
        assert!(!d.is_explored(TilePos::new(-5, -5)));
    }

    #[test]
    fn test_room_padding_overlap() {
        let a = Room::new(5, 5, 5, 5);
        assert!(a.overlaps_padded(&Room::new(11, 5, 5, 5), 2));
        assert!(!a.overlaps_padded(&Room::new(12, 5, 5, 5), 2));
        assert_eq!(a.center(), TilePos::new(7, 7));
    }

    #[test]
    fn test_collides_circle_against_walls() {
        let d = open_box();
        assert!(!d.collides_circle(Vec2::new(5.0, 5.0), 0.3));
        assert!(d.collides_circle(Vec2::new(1.2, 5.0), 0.3));
        assert!(!d.collides_circle(Vec2::new(1.35, 5.0), 0.3));
        assert!(d.collides_circle(Vec2::new(-3.0, 5.0), 0.3));
    }

    #[test]
    fn test_reveal_marks_explored_monotonically() {
        let mut d = open_box();
        let seen = d.reveal_area(TilePos::new(4, 4), 3);
        assert!(seen.contains(&TilePos::new(4, 4)));
        let first = d.explored_count();
        assert_eq!(first, seen.len());
        d.reveal_area(TilePos::new(6, 6), 1);
        assert!(d.explored_count() >= first);
        assert!(d.is_explored(TilePos::new(4, 4)));
    }

    #[test]
    fn test_wall_blocks_line_of_sight() {
        let mut d = open_box();
        assert!(d.line_of_sight(TilePos::new(2, 4), TilePos::new(7, 4)));
        d.set_tile(TilePos::new(4, 4), Tile::Wall);
        assert!(!d.line_of_sight(TilePos::new(2, 4), TilePos::new(7, 4)));
    }

    #[test]
    fn test_open_chest_once() {
        let mut d = open_box();
        let pos = TilePos::new(3, 3);
        d.set_tile(pos, Tile::Chest);
        d.chests.push(Chest { pos, opened: false });
        assert_eq!(d.chest_near(pos.center(), 0.5), Some(0));
        assert!(d.open_chest(0));
        assert_eq!(d.tile(pos), Tile::Floor);
        assert!(!d.open_chest(0));
        assert_eq!(d.chest_near(pos.center(), 0.5), None);
    }

    #[test]
    fn test_on_stairs_requires_tile_and_range() {
        let mut d = open_box();
        let stairs = TilePos::new(6, 6);
        d.set_tile(stairs, Tile::StairsDown);
        d.stairs = Some(stairs);
        assert!(d.on_stairs(Vec2::new(6.5, 6.6), 0.4));
        assert!(!d.on_stairs(Vec2::new(6.05, 6.05), 0.4));
        assert!(!d.on_stairs(Vec2::new(5.9, 6.5), 0.4));
    }
}
