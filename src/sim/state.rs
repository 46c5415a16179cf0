//! World state and core simulation types

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::camera::{Camera, Viewport};
use super::obstacle::ObstacleField;
use super::vehicle::Vehicle;
use crate::tuning::WorldTuning;

/// Everything the simulation advances each tick
#[derive(Debug, Clone)]
pub struct GameState {
    /// Seed the obstacle layout was generated from, if any
    pub seed: Option<u64>,
    /// Whether this world was built with the map expansion
    pub expanded: bool,
    pub field: ObstacleField,
    pub vehicle: Vehicle,
    pub camera: Camera,
    /// Simulation tick counter
    pub time_ticks: u64,
}

impl GameState {
    /// Build a world with a reproducible obstacle layout
    pub fn new(seed: u64, expanded: bool, tuning: &WorldTuning, color: &str) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut state = Self::with_rng(&mut rng, expanded, tuning, color);
        state.seed = Some(seed);
        state
    }

    /// Build a world drawing obstacle positions from `rng`
    pub fn with_rng<R: Rng>(rng: &mut R, expanded: bool, tuning: &WorldTuning, color: &str) -> Self {
        let field = ObstacleField::generate(tuning, expanded, rng);
        Self::from_field(field, expanded, color)
    }

    /// Wrap an existing field; the vehicle spawns at its centre
    pub fn from_field(field: ObstacleField, expanded: bool, color: &str) -> Self {
        let centre = Vec2::new(field.width() / 2.0, field.height() / 2.0);
        let vehicle = Vehicle::new(centre, color);
        let camera = Camera::follow(centre, Viewport::new(0.0, 0.0));
        Self {
            seed: None,
            expanded,
            field,
            vehicle,
            camera,
            time_ticks: 0,
        }
    }

    /// Map size in world units
    pub fn map_size(&self) -> Vec2 {
        Vec2::new(self.field.width(), self.field.height())
    }

    /// Recentre the camera on the vehicle for the given viewport
    pub fn refresh_camera(&mut self, viewport: Viewport) {
        self.camera = Camera::follow(self.vehicle.pos, viewport);
    }
}
