//! Simulation module
//!
//! All gameplay logic lives here. No rendering, storage or platform
//! dependencies:
//! - Fixed timestep only
//! - Injectable RNG for obstacle layouts
//! - One-shot input arrives as queued commands

pub mod camera;
pub mod collision;
pub mod input;
pub mod obstacle;
pub mod state;
pub mod tick;
pub mod vehicle;

pub use camera::{Camera, Viewport};
pub use collision::{BoundaryClamp, circles_overlap, clamp_to_boundary};
pub use input::{Command, CommandQueue, Direction, InputState};
pub use obstacle::{Obstacle, ObstacleField, ObstacleKind};
pub use state::GameState;
pub use tick::tick;
pub use vehicle::{StepOutcome, Vehicle, VehicleMode};
