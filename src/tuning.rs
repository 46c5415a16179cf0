//! Data-driven game balance
//!
//! Every physics, world-generation and economy constant lives here so a JSON
//! document can override any subset of them. `Tuning::default()` is the
//! shipped balance.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Errors raised when validating a tuning document.
#[derive(Debug, Error)]
pub enum TuningError {
    /// The document is not valid JSON for `Tuning`.
    #[error("malformed tuning document: {0}")]
    Parse(#[from] serde_json::Error),
    /// A value is outside its usable range.
    #[error("invalid tuning value: {0}")]
    Invalid(&'static str),
}

/// Per-mode movement constants (applied per fixed tick)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModeParams {
    /// Speed added per tick while throttle/brake is held
    pub accel: f32,
    /// Multiplicative speed retention per tick
    pub friction: f32,
    /// Speed magnitude cap
    pub max_speed: f32,
    /// Heading change per tick while steering (radians)
    pub turn_rate: f32,
}

impl ModeParams {
    pub const CAR: ModeParams = ModeParams {
        accel: 0.2,
        friction: 0.96,
        max_speed: 8.0,
        turn_rate: 0.05,
    };

    pub const PLANE: ModeParams = ModeParams {
        accel: 0.4,
        friction: 0.99,
        max_speed: 16.0,
        turn_rate: 0.04,
    };
}

/// Vehicle kinematics and collision response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleTuning {
    pub car: ModeParams,
    pub plane: ModeParams,
    /// Speeds below this magnitude snap to zero
    pub dead_zone: f32,
    /// Steering only works above this speed magnitude
    pub turn_threshold: f32,
    /// Collision radius added to each obstacle radius
    pub probe_radius: f32,
    /// Obstacles only collide below this altitude
    pub collision_altitude: f32,
    /// Speed multiplier on obstacle hit
    pub obstacle_bounce: f32,
    /// Speed multiplier per boundary clamp
    pub wall_bounce: f32,
    /// Distance kept from the map edge
    pub wall_margin: f32,
    /// Fraction of the remaining altitude gap closed per tick
    pub altitude_rate: f32,
}

impl Default for VehicleTuning {
    fn default() -> Self {
        Self {
            car: ModeParams::CAR,
            plane: ModeParams::PLANE,
            dead_zone: 0.1,
            turn_threshold: 0.5,
            probe_radius: VEHICLE_PROBE_RADIUS,
            collision_altitude: 0.4,
            obstacle_bounce: -0.4,
            wall_bounce: -0.2,
            wall_margin: 30.0,
            altitude_rate: 0.1,
        }
    }
}

/// Map size and obstacle scattering
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldTuning {
    pub base_width: f32,
    pub base_height: f32,
    /// Added to both axes when the map is expanded
    pub expansion: f32,
    pub base_obstacles: usize,
    pub expanded_obstacles: usize,
    /// No obstacle spawns closer than this to any edge
    pub spawn_inset: f32,
    /// Extra margin around the viewport when culling obstacles
    pub cull_padding: f32,
    /// Background grid cell size
    pub grid_size: f32,
    /// Bucket size of the obstacle spatial index
    pub index_cell: f32,
}

impl Default for WorldTuning {
    fn default() -> Self {
        Self {
            base_width: MAP_WIDTH,
            base_height: MAP_HEIGHT,
            expansion: MAP_EXPANSION,
            base_obstacles: 300,
            expanded_obstacles: 800,
            spawn_inset: 100.0,
            cull_padding: 100.0,
            grid_size: GRID_SIZE,
            index_cell: 200.0,
        }
    }
}

impl WorldTuning {
    /// Map size for the given expansion state
    pub fn map_size(&self, expanded: bool) -> (f32, f32) {
        if expanded {
            (
                self.base_width + self.expansion,
                self.base_height + self.expansion,
            )
        } else {
            (self.base_width, self.base_height)
        }
    }

    /// Obstacle count for the given expansion state
    pub fn obstacle_count(&self, expanded: bool) -> usize {
        if expanded {
            self.expanded_obstacles
        } else {
            self.base_obstacles
        }
    }
}

/// Currency accrual and persistence cadence
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyTuning {
    /// Currency earned per full day of play
    pub currency_per_day: f64,
    /// Playtime is flushed each time it crosses a multiple of this many seconds
    pub flush_interval_secs: u64,
    pub expansion_cost: f64,
}

impl Default for EconomyTuning {
    fn default() -> Self {
        Self {
            currency_per_day: 10.0,
            flush_interval_secs: 5,
            expansion_cost: 8000.0,
        }
    }
}

impl EconomyTuning {
    /// Currency earned per second of play
    #[inline]
    pub fn rate_per_second(&self) -> f64 {
        self.currency_per_day / 86400.0
    }
}

/// Complete balance table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub vehicle: VehicleTuning,
    pub world: WorldTuning,
    pub economy: EconomyTuning,
}

impl Tuning {
    /// Overlay a (possibly partial) JSON document on the defaults
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn validate(&self) -> Result<(), TuningError> {
        for params in [&self.vehicle.car, &self.vehicle.plane] {
            if params.max_speed <= 0.0 {
                return Err(TuningError::Invalid("max_speed must be positive"));
            }
            if params.friction <= 0.0 || params.friction > 1.0 {
                return Err(TuningError::Invalid("friction must be in (0, 1]"));
            }
        }
        if !(0.0..=1.0).contains(&self.vehicle.altitude_rate) || self.vehicle.altitude_rate == 0.0
        {
            return Err(TuningError::Invalid("altitude_rate must be in (0, 1]"));
        }
        let w = &self.world;
        if w.base_width <= 0.0 || w.base_height <= 0.0 || w.expansion < 0.0 {
            return Err(TuningError::Invalid("map dimensions must be positive"));
        }
        if w.spawn_inset * 2.0 >= w.base_width.min(w.base_height) {
            return Err(TuningError::Invalid("spawn_inset leaves no room to spawn"));
        }
        if self.vehicle.wall_margin * 2.0 >= w.base_width.min(w.base_height) {
            return Err(TuningError::Invalid("wall_margin leaves no room to drive"));
        }
        if w.grid_size <= 0.0 || w.index_cell <= 0.0 {
            return Err(TuningError::Invalid("cell sizes must be positive"));
        }
        if self.economy.flush_interval_secs == 0 {
            return Err(TuningError::Invalid("flush_interval_secs must be non-zero"));
        }
        Ok(())
    }
}
