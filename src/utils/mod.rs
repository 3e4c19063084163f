//! Stateless helpers shared by every subsystem: random draws, plane
//! geometry, grid line rasterization and the ray-fan field of view.

pub mod fov;
pub mod geometry;
pub mod rng;

pub use fov::cast_fov;
pub use geometry::{
    aim_angle_of, aim_vector, angle_between, distance_to_segment, has_line_of_sight, line_tiles,
    wrap_angle, TilePos,
};
pub use rng::{roll_chance, roll_percent, roll_range, weighted_choice};
