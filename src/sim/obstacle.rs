//! Static obstacle field
//!
//! Obstacles are scattered once when the world is built and never change
//! afterwards. A uniform bucket grid keeps both the render cull and the
//! collision probe from walking every obstacle each frame.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::circles_overlap;
use crate::Rect;
use crate::tuning::WorldTuning;

/// Obstacle types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    Tree,
    Barrier,
    Block,
    Human,
}

impl ObstacleKind {
    /// Collision radius for this kind
    pub fn radius(&self) -> f32 {
        match self {
            ObstacleKind::Tree => 25.0,
            ObstacleKind::Barrier => 30.0,
            ObstacleKind::Block => 35.0,
            ObstacleKind::Human => 15.0,
        }
    }

    /// Pick a kind from a uniform roll in [0, 1):
    /// 60% tree, 20% barrier, 15% block, 5% human
    pub fn from_roll(roll: f32) -> Self {
        if roll < 0.6 {
            ObstacleKind::Tree
        } else if roll < 0.8 {
            ObstacleKind::Barrier
        } else if roll < 0.95 {
            ObstacleKind::Block
        } else {
            ObstacleKind::Human
        }
    }
}

/// A single hazard
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub pos: Vec2,
    pub radius: f32,
    pub kind: ObstacleKind,
}

impl Obstacle {
    pub fn new(pos: Vec2, kind: ObstacleKind) -> Self {
        Self {
            pos,
            radius: kind.radius(),
            kind,
        }
    }
}

/// Immutable set of obstacles over a bounded plane
#[derive(Debug, Clone)]
pub struct ObstacleField {
    width: f32,
    height: f32,
    cell_size: f32,
    cull_padding: f32,
    obstacles: Vec<Obstacle>,
    cols: usize,
    rows: usize,
    /// Obstacle indices per cell, row-major
    buckets: Vec<Vec<u32>>,
    /// Largest obstacle radius, bounds how far a probe must look
    max_radius: f32,
}

impl ObstacleField {
    /// Populate a field for the given map state.
    ///
    /// 300 obstacles on the base map, 800 once expanded, each kept
    /// `spawn_inset` away from every edge.
    pub fn generate<R: Rng>(tuning: &WorldTuning, upgraded: bool, rng: &mut R) -> Self {
        let (width, height) = tuning.map_size(upgraded);
        let count = tuning.obstacle_count(upgraded);
        let inset = tuning.spawn_inset;

        let mut obstacles = Vec::with_capacity(count);
        for _ in 0..count {
            let kind = ObstacleKind::from_roll(rng.random::<f32>());
            let x = rng.random::<f32>() * (width - inset * 2.0) + inset;
            let y = rng.random::<f32>() * (height - inset * 2.0) + inset;
            obstacles.push(Obstacle::new(Vec2::new(x, y), kind));
        }

        log::info!(
            "Generated {} obstacles on {}x{} map (expanded: {})",
            obstacles.len(),
            width,
            height,
            upgraded
        );

        Self::from_obstacles(width, height, tuning.index_cell, tuning.cull_padding, obstacles)
    }

    /// Build a field from an explicit obstacle list
    pub fn from_obstacles(
        width: f32,
        height: f32,
        cell_size: f32,
        cull_padding: f32,
        obstacles: Vec<Obstacle>,
    ) -> Self {
        let cols = ((width / cell_size).ceil() as usize).max(1);
        let rows = ((height / cell_size).ceil() as usize).max(1);
        let mut buckets = vec![Vec::new(); cols * rows];
        let mut max_radius: f32 = 0.0;

        for (i, o) in obstacles.iter().enumerate() {
            let col = Self::axis_cell(o.pos.x, cell_size, cols);
            let row = Self::axis_cell(o.pos.y, cell_size, rows);
            buckets[row * cols + col].push(i as u32);
            max_radius = max_radius.max(o.radius);
        }

        Self {
            width,
            height,
            cell_size,
            cull_padding,
            obstacles,
            cols,
            rows,
            buckets,
            max_radius,
        }
    }

    #[inline]
    fn axis_cell(v: f32, cell_size: f32, count: usize) -> usize {
        ((v / cell_size).floor().max(0.0) as usize).min(count - 1)
    }

    /// Half-open cell range covering [lo, hi] on one axis
    fn axis_span(&self, lo: f32, hi: f32, count: usize) -> std::ops::Range<usize> {
        if hi < 0.0 || lo.is_nan() || hi.is_nan() {
            return 0..0;
        }
        let start = (lo / self.cell_size).floor().max(0.0) as usize;
        let end = (((hi / self.cell_size).floor() as usize) + 1).min(count);
        start..end.max(start)
    }

    /// Obstacle indices in every cell overlapping `area`
    fn indices_in(&self, area: Rect) -> impl Iterator<Item = usize> + '_ {
        let cols = self.axis_span(area.min.x, area.max.x, self.cols);
        let rows = self.axis_span(area.min.y, area.max.y, self.rows);
        rows.flat_map(move |row| {
            cols.clone()
                .flat_map(move |col| self.buckets[row * self.cols + col].iter())
        })
        .map(|&i| i as usize)
    }

    /// Obstacles whose centre lies within the padded viewport rectangle.
    ///
    /// Recomputed on every call; order is unspecified.
    pub fn query_visible(&self, view: Rect) -> impl Iterator<Item = &Obstacle> + '_ {
        let area = view.padded(self.cull_padding);
        self.indices_in(area)
            .map(move |i| &self.obstacles[i])
            .filter(move |o| area.contains_strict(o.pos))
    }

    /// True if a probe circle of `extra_radius` at `point` overlaps any obstacle
    pub fn collides_with(&self, point: Vec2, extra_radius: f32) -> bool {
        let reach = self.max_radius + extra_radius;
        let area = Rect::new(point - Vec2::splat(reach), point + Vec2::splat(reach));
        self.indices_in(area).any(|i| {
            let o = &self.obstacles[i];
            circles_overlap(point, extra_radius, o.pos, o.radius)
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Obstacle> {
        self.obstacles.iter()
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }
}
