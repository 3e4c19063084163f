//! Plane geometry on the tile grid.
//!
//! World positions are `Vec2` in tile units (tile `(x, y)` spans
//! `[x, x+1) x [y, y+1)`). Aim angles follow the convention
//! `direction = (sin a, cos a)`, so angle 0 points along +y.

use std::f32::consts::{PI, TAU};

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

/// Integer tile coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TilePos {
    pub x: i32,
    pub y: i32,
}

impl TilePos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Tile containing a world position
    pub fn containing(pos: Vec2) -> Self {
        Self::new(pos.x.floor() as i32, pos.y.floor() as i32)
    }

    /// World-space centre of this tile
    pub fn center(self) -> Vec2 {
        Vec2::new(self.x as f32 + 0.5, self.y as f32 + 0.5)
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Unit direction for an aim angle
pub fn aim_vector(angle: f32) -> Vec2 {
    Vec2::new(angle.sin(), angle.cos())
}

/// Aim angle pointing along `delta`
pub fn aim_angle_of(delta: Vec2) -> f32 {
    delta.x.atan2(delta.y)
}

/// Wrap an angle into (-PI, PI]
pub fn wrap_angle(mut angle: f32) -> f32 {
    while angle > PI {
        angle -= TAU;
    }
    while angle <= -PI {
        angle += TAU;
    }
    angle
}

/// Absolute angle between an aim angle and the direction `delta`
pub fn angle_between(aim: f32, delta: Vec2) -> f32 {
    wrap_angle(aim_angle_of(delta) - aim).abs()
}

/// Shortest distance from `p` to the segment `a`-`b`
pub fn distance_to_segment(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Bresenham rasterization from `from` to `to`, both endpoints included.
pub fn line_tiles(from: TilePos, to: TilePos) -> Vec<TilePos> {
    let dx = (to.x - from.x).abs();
    let dy = (to.y - from.y).abs();
    let sx = if from.x < to.x { 1 } else { -1 };
    let sy = if from.y < to.y { 1 } else { -1 };
    let mut err = dx - dy;
    let (mut x, mut y) = (from.x, from.y);

    let mut points = Vec::with_capacity((dx.max(dy) + 1) as usize);
    loop {
        points.push(TilePos::new(x, y));
        if x == to.x && y == to.y {
            break;
        }
        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x += sx;
        }
        if e2 < dx {
            err += dx;
            y += sy;
        }
    }
    points
}

/// True when no tile strictly between the endpoints blocks sight.
pub fn has_line_of_sight(from: TilePos, to: TilePos, blocks: impl Fn(TilePos) -> bool) -> bool {
    let line = line_tiles(from, to);
    if line.len() <= 2 {
        return true;
    }
    !line[1..line.len() - 1].iter().any(|&p| blocks(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aim_vector_convention() {
        let up = aim_vector(0.0);
        assert!(up.x.abs() < 1e-6 && (up.y - 1.0).abs() < 1e-6);
        let right = aim_vector(PI / 2.0);
        assert!((right.x - 1.0).abs() < 1e-6 && right.y.abs() < 1e-6);
        assert!((aim_angle_of(Vec2::new(1.0, 0.0)) - PI / 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_wrap_angle() {
        assert!((wrap_angle(3.0 * PI) - PI).abs() < 1e-5);
        assert!((wrap_angle(-3.0 * PI / 2.0) - PI / 2.0).abs() < 1e-5);
        assert!(wrap_angle(0.25).abs() - 0.25 < 1e-6);
    }

    #[test]
    fn test_angle_between_crosses_seam() {
        // Aim just left of -y, target just right of -y
        let diff = angle_between(PI - 0.05, Vec2::new(-0.05, -1.0));
        assert!(diff < 0.2, "Seam wrap should give a small angle, got {diff}");
    }

    #[test]
    fn test_distance_to_segment() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(4.0, 0.0);
        assert!((distance_to_segment(Vec2::new(2.0, 3.0), a, b) - 3.0).abs() < 1e-6);
        assert!((distance_to_segment(Vec2::new(-3.0, 4.0), a, b) - 5.0).abs() < 1e-6);
        assert!((distance_to_segment(Vec2::new(1.0, 1.0), a, a) - 2f32.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn test_line_tiles_endpoints_and_continuity() {
        let line = line_tiles(TilePos::new(0, 0), TilePos::new(5, 3));
        assert_eq!(line.first(), Some(&TilePos::new(0, 0)));
        assert_eq!(line.last(), Some(&TilePos::new(5, 3)));
        for pair in line.windows(2) {
            assert!((pair[0].x - pair[1].x).abs() <= 1);
            assert!((pair[0].y - pair[1].y).abs() <= 1);
        }
    }

    #[test]
    fn test_line_of_sight_ignores_endpoints() {
        let wall = TilePos::new(2, 0);
        let blocks = |p: TilePos| p == wall;
        assert!(!has_line_of_sight(TilePos::new(0, 0), TilePos::new(4, 0), blocks));
        assert!(has_line_of_sight(TilePos::new(0, 0), wall, blocks));
        assert!(has_line_of_sight(wall, TilePos::new(4, 0), blocks));
    }

    #[test]
    fn test_tile_center_roundtrip() {
        let t = TilePos::new(7, 3);
        assert_eq!(TilePos::containing(t.center()), t);
    }
}
