//! Ray-fan field of view.
//!
//! One ray per degree, stepped one tile per unit of radius. A ray stops
//! at the first blocking tile, which is itself visible. This is an
//! approximation of shadowcasting: diagonal seams can show small gaps
//! or overlaps, and callers rely on exactly this shape.

use std::collections::HashSet;

use super::geometry::TilePos;
use crate::constants::FOV_RAY_STEP_DEGREES;

/// Tiles visible from `center` within `radius`.
///
/// `in_bounds` ends a ray when it leaves the map; `blocks` ends it after
/// the blocking tile has been added.
pub fn cast_fov(
    center: TilePos,
    radius: i32,
    in_bounds: impl Fn(TilePos) -> bool,
    blocks: impl Fn(TilePos) -> bool,
) -> HashSet<TilePos> {
    let mut visible = HashSet::new();
    visible.insert(center);

    for degree in (0..360).step_by(FOV_RAY_STEP_DEGREES as usize) {
        let rad = (degree as f32).to_radians();
        let (dy, dx) = rad.sin_cos();

        for r in 1..=radius {
            let tile = TilePos::new(
                (center.x as f32 + dx * r as f32).round() as i32,
                (center.y as f32 + dy * r as f32).round() as i32,
            );
            if !in_bounds(tile) {
                break;
            }
            visible.insert(tile);
            if blocks(tile) {
                break;
            }
        }
    }
    visible
}
