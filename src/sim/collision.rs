//! Collision tests and responses
//!
//! Two shapes matter here: circular obstacles probed with the vehicle's
//! circle, and the rectangular map boundary the vehicle is kept inside.

use glam::Vec2;

/// Circle-circle overlap. Touching circles do not overlap.
#[inline]
pub fn circles_overlap(a: Vec2, radius_a: f32, b: Vec2, radius_b: f32) -> bool {
    let reach = radius_a + radius_b;
    (a - b).length_squared() < reach * reach
}

/// Result of clamping a point into the map
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryClamp {
    /// Position after clamping
    pub pos: Vec2,
    /// Number of walls that were hit (0-2, one per axis side)
    pub walls_hit: u32,
}

/// Clamp `pos` into `[margin, size - margin]` on both axes.
///
/// Each side is checked independently so a corner hit counts twice.
pub fn clamp_to_boundary(pos: Vec2, size: Vec2, margin: f32) -> BoundaryClamp {
    let mut out = pos;
    let mut walls_hit = 0;

    if out.x < margin {
        out.x = margin;
        walls_hit += 1;
    }
    if out.y < margin {
        out.y = margin;
        walls_hit += 1;
    }
    if out.x > size.x - margin {
        out.x = size.x - margin;
        walls_hit += 1;
    }
    if out.y > size.y - margin {
        out.y = size.y - margin;
        walls_hit += 1;
    }

    BoundaryClamp { pos: out, walls_hit }
}
