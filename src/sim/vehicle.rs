//! Player vehicle kinematics
//!
//! Car and plane share one body: a signed speed along a heading. The mode
//! only selects the per-tick constants and whether the vehicle is high
//! enough to fly over obstacles.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::clamp_to_boundary;
use super::input::InputState;
use super::obstacle::ObstacleField;
use crate::tuning::{ModeParams, VehicleTuning};

/// Movement mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VehicleMode {
    #[default]
    Car,
    Plane,
}

impl VehicleMode {
    pub fn toggled(self) -> Self {
        match self {
            VehicleMode::Car => VehicleMode::Plane,
            VehicleMode::Plane => VehicleMode::Car,
        }
    }

    /// Altitude the vehicle settles at in this mode
    pub fn target_altitude(self) -> f32 {
        match self {
            VehicleMode::Car => 0.0,
            VehicleMode::Plane => 1.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleMode::Car => "CAR",
            VehicleMode::Plane => "PLANE",
        }
    }
}

/// What happened during one update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepOutcome {
    /// Candidate move was rejected by an obstacle
    pub hit_obstacle: bool,
    /// Number of boundary walls touched
    pub walls_hit: u32,
}

/// The player's vehicle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    pub pos: Vec2,
    /// Facing angle in radians, 0 = up on screen
    pub heading: f32,
    /// Signed speed along the heading (world units per tick)
    pub speed: f32,
    pub mode: VehicleMode,
    /// Smoothed altitude in [0, 1]
    pub altitude: f32,
    pub target_altitude: f32,
    /// Body colour, projected from the active cosmetic
    pub color: String,
}

impl Vehicle {
    pub fn new(pos: Vec2, color: impl Into<String>) -> Self {
        Self {
            pos,
            heading: 0.0,
            speed: 0.0,
            mode: VehicleMode::Car,
            altitude: 0.0,
            target_altitude: 0.0,
            color: color.into(),
        }
    }

    /// Switch mode; altitude then eases toward the new target
    pub fn toggle_mode(&mut self) {
        self.mode = self.mode.toggled();
        self.target_altitude = self.mode.target_altitude();
        log::debug!("Vehicle mode -> {}", self.mode.as_str());
    }

    /// Constants for the current mode
    pub fn params<'a>(&self, tuning: &'a VehicleTuning) -> &'a ModeParams {
        match self.mode {
            VehicleMode::Car => &tuning.car,
            VehicleMode::Plane => &tuning.plane,
        }
    }

    /// Unit vector of the heading (0 rad points to -Y)
    #[inline]
    pub fn forward(&self) -> Vec2 {
        Vec2::new(self.heading.sin(), -self.heading.cos())
    }

    /// True while low enough to hit obstacles
    #[inline]
    pub fn is_grounded(&self, tuning: &VehicleTuning) -> bool {
        self.altitude < tuning.collision_altitude
    }

    /// Advance one fixed tick
    pub fn update(
        &mut self,
        input: &InputState,
        field: &ObstacleField,
        tuning: &VehicleTuning,
    ) -> StepOutcome {
        let params = *self.params(tuning);
        let mut outcome = StepOutcome::default();

        // Throttle, friction, cap, dead zone
        if input.up {
            self.speed += params.accel;
        }
        if input.down {
            self.speed -= params.accel;
        }
        self.speed *= params.friction;
        self.speed = self.speed.clamp(-params.max_speed, params.max_speed);
        if self.speed.abs() < tuning.dead_zone {
            self.speed = 0.0;
        }

        // Steering needs momentum; reversing flips it
        if self.speed.abs() > tuning.turn_threshold {
            let mut dir = input.steer();
            if self.speed < 0.0 {
                dir = -dir;
            }
            self.heading += dir * params.turn_rate;
        }

        let candidate = self.pos + self.forward() * self.speed;

        if self.is_grounded(tuning) && field.collides_with(candidate, tuning.probe_radius) {
            // Bounce back and stay put
            self.speed *= tuning.obstacle_bounce;
            outcome.hit_obstacle = true;
        } else {
            self.pos = candidate;
        }

        self.altitude += (self.target_altitude - self.altitude) * tuning.altitude_rate;

        let size = Vec2::new(field.width(), field.height());
        let clamp = clamp_to_boundary(self.pos, size, tuning.wall_margin);
        self.pos = clamp.pos;
        for _ in 0..clamp.walls_hit {
            self.speed *= tuning.wall_bounce;
        }
        outcome.walls_hit = clamp.walls_hit;

        outcome
    }
}
