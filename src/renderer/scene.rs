//! World-space triangle list for one frame
//!
//! Everything is emitted in world units; the pipeline applies the camera.
//! Shapes are convex outlines fanned from their centre so translucent fills
//! (the vehicle shadow) never overlap themselves.

use glam::{Mat2, Vec2};
use std::f32::consts::{FRAC_PI_2, TAU};

use super::vertex::{Vertex, colors};
use crate::Rect;
use crate::settings::Settings;
use crate::sim::{GameState, Obstacle, ObstacleKind, Vehicle, VehicleMode};

const BOUNDARY_STROKE: f32 = 20.0;
const GRID_LINE: f32 = 1.0;

const CAR_HALF: Vec2 = Vec2::new(18.0, 35.0);
const CAR_CORNER: f32 = 8.0;
const WING: [Vec2; 3] = [
    Vec2::new(0.0, -20.0),
    Vec2::new(-60.0, 40.0),
    Vec2::new(60.0, 40.0),
];
const FUSELAGE_RADII: Vec2 = Vec2::new(15.0, 50.0);
/// Plane silhouette only once this high
const PLANE_SHAPE_ALTITUDE: f32 = 0.5;

const BARRIER_THICKNESS: f32 = 10.0;
const BLOCK_HALF: f32 = 15.0;
const HUMAN_RADIUS: f32 = 8.0;

/// Build the full frame: grid, boundary, visible obstacles, vehicle
pub fn build(state: &GameState, settings: &Settings, grid_size: f32) -> Vec<Vertex> {
    let segments = settings.quality.circle_segments();
    let view = state.camera.visible_rect();
    let mut out = Vec::with_capacity(4096);

    if settings.show_grid {
        grid(&mut out, view, state.map_size(), grid_size);
    }
    boundary(&mut out, state.map_size());
    for o in state.field.query_visible(view) {
        obstacle(&mut out, o, segments);
    }
    vehicle(&mut out, &state.vehicle, settings.shadows, segments);

    out
}

/// Grid lines inside the map, limited to the visible rectangle
pub fn grid(out: &mut Vec<Vertex>, view: Rect, map: Vec2, cell: f32) {
    if cell <= 0.0 {
        return;
    }
    let lo = view.min.max(Vec2::ZERO);
    let hi = view.max.min(map);
    if lo.x > hi.x || lo.y > hi.y {
        return;
    }
    let half = GRID_LINE * 0.5;

    let first_col = (lo.x / cell).ceil() as i64;
    let last_col = (hi.x / cell).floor() as i64;
    for c in first_col..=last_col {
        let x = c as f32 * cell;
        quad(out, Vec2::new(x - half, lo.y), Vec2::new(x + half, hi.y), colors::GRID);
    }

    let first_row = (lo.y / cell).ceil() as i64;
    let last_row = (hi.y / cell).floor() as i64;
    for r in first_row..=last_row {
        let y = r as f32 * cell;
        quad(out, Vec2::new(lo.x, y - half), Vec2::new(hi.x, y + half), colors::GRID);
    }
}

/// Red stroke centred on the map edge
pub fn boundary(out: &mut Vec<Vertex>, map: Vec2) {
    let h = BOUNDARY_STROKE * 0.5;
    let (w, ht) = (map.x, map.y);
    let c = colors::BOUNDARY;
    quad(out, Vec2::new(-h, -h), Vec2::new(w + h, h), c);
    quad(out, Vec2::new(-h, ht - h), Vec2::new(w + h, ht + h), c);
    quad(out, Vec2::new(-h, h), Vec2::new(h, ht - h), c);
    quad(out, Vec2::new(w - h, h), Vec2::new(w + h, ht - h), c);
}

pub fn obstacle(out: &mut Vec<Vertex>, o: &Obstacle, segments: u32) {
    let at = |p: Vec2| o.pos + p;
    match o.kind {
        ObstacleKind::Tree => {
            let outline = ellipse_outline(Vec2::splat(o.radius), segments);
            fan(out, &outline, at, colors::TREE);
        }
        ObstacleKind::Barrier => {
            let half = Vec2::new(o.radius, BARRIER_THICKNESS * 0.5);
            quad(out, o.pos - half, o.pos + half, colors::BARRIER);
        }
        ObstacleKind::Block => {
            let half = Vec2::splat(BLOCK_HALF);
            quad(out, o.pos - half, o.pos + half, colors::BLOCK);
        }
        ObstacleKind::Human => {
            let outline = ellipse_outline(Vec2::splat(HUMAN_RADIUS), segments);
            fan(out, &outline, at, colors::HUMAN);
        }
    }
}

/// Shadow then body, both rotated by heading
pub fn vehicle(out: &mut Vec<Vertex>, v: &Vehicle, shadows: bool, segments: u32) {
    let rot = Mat2::from_angle(v.heading);
    let plane_shape = v.mode == VehicleMode::Plane && v.altitude >= PLANE_SHAPE_ALTITUDE;

    if shadows {
        // Offset is applied in the rotated frame, unscaled
        let offset = Vec2::splat((10.0 + 40.0 * v.altitude) * 0.5);
        let to_world = |p: Vec2| v.pos + rot * (p + offset);
        vehicle_shape(out, plane_shape, segments, to_world, colors::SHADOW);
    }

    let scale = 1.0 + 0.15 * v.altitude;
    let color = colors::parse_hex(&v.color).unwrap_or([1.0, 1.0, 1.0, 1.0]);
    let to_world = |p: Vec2| v.pos + rot * (p * scale);
    vehicle_shape(out, plane_shape, segments, to_world, color);
}

fn vehicle_shape(
    out: &mut Vec<Vertex>,
    plane_shape: bool,
    segments: u32,
    to_world: impl Fn(Vec2) -> Vec2,
    color: [f32; 4],
) {
    if plane_shape {
        for p in WING {
            let w = to_world(p);
            out.push(Vertex::new(w.x, w.y, color));
        }
        fan(out, &ellipse_outline(FUSELAGE_RADII, segments), &to_world, color);
    } else {
        let corner_segments = (segments / 4).max(2);
        let outline = rounded_rect_outline(CAR_HALF, CAR_CORNER, corner_segments);
        fan(out, &outline, &to_world, color);
    }
}

/// Axis-aligned filled rectangle
pub fn quad(out: &mut Vec<Vertex>, min: Vec2, max: Vec2, color: [f32; 4]) {
    out.extend_from_slice(&[
        Vertex::new(min.x, min.y, color),
        Vertex::new(max.x, min.y, color),
        Vertex::new(min.x, max.y, color),
        Vertex::new(min.x, max.y, color),
        Vertex::new(max.x, min.y, color),
        Vertex::new(max.x, max.y, color),
    ]);
}

/// Triangle fan around the local origin of a convex outline
fn fan(out: &mut Vec<Vertex>, outline: &[Vec2], to_world: impl Fn(Vec2) -> Vec2, color: [f32; 4]) {
    let centre = to_world(Vec2::ZERO);
    for (i, p) in outline.iter().enumerate() {
        let a = to_world(*p);
        let b = to_world(outline[(i + 1) % outline.len()]);
        out.push(Vertex::new(centre.x, centre.y, color));
        out.push(Vertex::new(a.x, a.y, color));
        out.push(Vertex::new(b.x, b.y, color));
    }
}

fn ellipse_outline(radii: Vec2, segments: u32) -> Vec<Vec2> {
    let segments = segments.max(3);
    (0..segments)
        .map(|i| {
            let theta = i as f32 / segments as f32 * TAU;
            Vec2::new(radii.x * theta.cos(), radii.y * theta.sin())
        })
        .collect()
}

fn rounded_rect_outline(half: Vec2, radius: f32, corner_segments: u32) -> Vec<Vec2> {
    let radius = radius.min(half.x).min(half.y);
    let inner = half - Vec2::splat(radius);
    // Corner centres, walking clockwise in y-down space from bottom-right
    let corners = [
        (Vec2::new(inner.x, inner.y), 0.0),
        (Vec2::new(-inner.x, inner.y), FRAC_PI_2),
        (Vec2::new(-inner.x, -inner.y), 2.0 * FRAC_PI_2),
        (Vec2::new(inner.x, -inner.y), 3.0 * FRAC_PI_2),
    ];

    let mut points = Vec::with_capacity(4 * (corner_segments as usize + 1));
    for (centre, start) in corners {
        for i in 0..=corner_segments {
            let theta = start + i as f32 / corner_segments as f32 * FRAC_PI_2;
            points.push(centre + radius * Vec2::new(theta.cos(), theta.sin()));
        }
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::QualityPreset;
    use crate::sim::{ObstacleField, Viewport};

    fn state_with(obstacles: Vec<Obstacle>) -> GameState {
        let field = ObstacleField::from_obstacles(8000.0, 8000.0, 200.0, 100.0, obstacles);
        let mut state = GameState::from_field(field, false, "#ec4899");
        state.refresh_camera(Viewport::new(800.0, 600.0));
        state
    }

    fn count(vertices: &[Vertex], color: [f32; 4]) -> usize {
        vertices.iter().filter(|v| v.color == color).count()
    }

    #[test]
    fn test_only_visible_obstacles_drawn() {
        let state = state_with(vec![
            Obstacle::new(Vec2::new(4100.0, 4000.0), ObstacleKind::Block),
            Obstacle::new(Vec2::new(7000.0, 7000.0), ObstacleKind::Block),
            // Just off screen but inside the cull padding
            Obstacle::new(Vec2::new(4450.0, 4000.0), ObstacleKind::Barrier),
        ]);
        let verts = build(&state, &Settings::default(), 100.0);
        assert_eq!(count(&verts, colors::BLOCK), 6);
        assert_eq!(count(&verts, colors::BARRIER), 6);
    }

    #[test]
    fn test_grid_stays_inside_map() {
        let mut state = state_with(Vec::new());
        state.vehicle.pos = Vec2::new(50.0, 50.0);
        state.refresh_camera(Viewport::new(800.0, 600.0));
        let verts = build(&state, &Settings::default(), 100.0);

        let grid: Vec<_> = verts.iter().filter(|v| v.color == colors::GRID).collect();
        assert!(!grid.is_empty());
        for v in grid {
            assert!(v.position[0] >= -0.5 && v.position[1] >= -0.5);
            assert!(v.position[0] <= 450.5 && v.position[1] <= 350.5);
        }
    }

    #[test]
    fn test_grid_line_count() {
        let mut out = Vec::new();
        let view = Rect::new(Vec2::new(150.0, 150.0), Vec2::new(450.0, 350.0));
        grid(&mut out, view, Vec2::splat(8000.0), 100.0);
        // Columns 200, 300, 400 and rows 200, 300
        assert_eq!(out.len(), 5 * 6);
    }

    #[test]
    fn test_grid_and_shadow_toggles() {
        let state = state_with(Vec::new());
        let verts = build(&state, &Settings::from_preset(QualityPreset::Low), 100.0);
        assert_eq!(count(&verts, colors::GRID), 0);
        assert_eq!(count(&verts, colors::SHADOW), 0);

        let verts = build(&state, &Settings::default(), 100.0);
        assert!(count(&verts, colors::SHADOW) > 0);
    }

    #[test]
    fn test_plane_silhouette_needs_altitude() {
        let mut state = state_with(Vec::new());
        let body = colors::parse_hex("#ec4899").unwrap();
        let reach = |state: &GameState| {
            build(state, &Settings::default(), 100.0)
                .iter()
                .filter(|v| v.color == body)
                .map(|v| (Vec2::from(v.position) - state.vehicle.pos).x.abs())
                .fold(0.0_f32, f32::max)
        };

        // Car: half width 18
        assert!(reach(&state) <= 18.0 + 1e-3);

        // Plane mode but still low: car outline, scaled
        state.vehicle.mode = VehicleMode::Plane;
        state.vehicle.altitude = 0.3;
        assert!(reach(&state) < 20.0);

        // High enough: wing span 60 * (1 + 0.15 * alt)
        state.vehicle.altitude = 0.8;
        let expected = 60.0 * (1.0 + 0.15 * 0.8);
        assert!((reach(&state) - expected).abs() < 1e-2);
    }

    #[test]
    fn test_body_follows_heading() {
        let mut state = state_with(Vec::new());
        state.vehicle.heading = FRAC_PI_2;
        let body = colors::parse_hex("#ec4899").unwrap();
        let verts = build(&state, &Settings::default(), 100.0);
        // Rotated a quarter turn the car is 70 wide and 36 tall
        let max_x = verts
            .iter()
            .filter(|v| v.color == body)
            .map(|v| (v.position[0] - state.vehicle.pos.x).abs())
            .fold(0.0_f32, f32::max);
        assert!((max_x - 35.0).abs() < 1e-2);
    }

    #[test]
    fn test_rounded_rect_outline_bounds() {
        let pts = rounded_rect_outline(CAR_HALF, CAR_CORNER, 4);
        assert_eq!(pts.len(), 20);
        for p in pts {
            assert!(p.x.abs() <= 18.0 + 1e-4 && p.y.abs() <= 35.0 + 1e-4);
        }
    }
}
