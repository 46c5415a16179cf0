//! Skydrive - a top-down car/plane roaming game
//!
//! Core modules:
//! - `sim`: Vehicle kinematics, obstacle field, camera and the fixed-step tick
//! - `progression`: Currency, playtime and cosmetic ownership, persisted
//! - `shop`: Fixed cosmetic catalogs
//! - `engine`: Top-level owner that drives one frame at a time
//! - `renderer`: WebGPU rendering pipeline
//! - `platform`: Browser/native platform abstraction
//! - `persistence`: Flat key-value storage
//! - `tuning`: Data-driven game balance

pub mod engine;
pub mod hud;
pub mod persistence;
pub mod platform;
pub mod progression;
pub mod renderer;
pub mod settings;
pub mod shop;
pub mod sim;
pub mod tuning;

pub use engine::Engine;
pub use progression::ProgressionStore;
pub use settings::{QualityPreset, Settings};
pub use tuning::Tuning;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep. Vehicle constants are expressed per tick at this rate.
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;
    /// Longest frame delta fed to the stepping accumulator (seconds)
    pub const MAX_FRAME_DT: f32 = 0.25;

    /// Base map dimensions
    pub const MAP_WIDTH: f32 = 8000.0;
    pub const MAP_HEIGHT: f32 = 8000.0;
    /// Added to each axis once the map expansion is bought
    pub const MAP_EXPANSION: f32 = 10000.0;

    /// Background grid cell size
    pub const GRID_SIZE: f32 = 100.0;

    /// Fixed collision radius of the vehicle
    pub const VEHICLE_PROBE_RADIUS: f32 = 15.0;
}

/// Axis-aligned rectangle in world units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Rectangle from a top-left corner and a size
    pub fn from_origin_size(origin: Vec2, size: Vec2) -> Self {
        Self {
            min: origin,
            max: origin + size,
        }
    }

    /// Grow the rectangle by `pad` on every side
    #[inline]
    pub fn padded(&self, pad: f32) -> Self {
        Self {
            min: self.min - Vec2::splat(pad),
            max: self.max + Vec2::splat(pad),
        }
    }

    /// Strict containment (points on the edge are outside)
    #[inline]
    pub fn contains_strict(&self, p: Vec2) -> bool {
        p.x > self.min.x && p.x < self.max.x && p.y > self.min.y && p.y < self.max.y
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }
}
