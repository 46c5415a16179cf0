//! Fixed timestep simulation tick

use super::input::{Command, CommandQueue, InputState};
use super::state::GameState;
use super::vehicle::StepOutcome;
use crate::tuning::VehicleTuning;

/// Advance the game state by one fixed timestep.
///
/// Pending commands are applied first so a mode switch takes effect (speed
/// cap included) on the same tick.
pub fn tick(
    state: &mut GameState,
    input: &InputState,
    commands: &mut CommandQueue,
    tuning: &VehicleTuning,
) -> StepOutcome {
    for cmd in commands.drain() {
        match cmd {
            Command::ToggleMode => state.vehicle.toggle_mode(),
        }
    }

    state.time_ticks += 1;
    state.vehicle.update(input, &state.field, tuning)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::VehicleMode;
    use crate::tuning::WorldTuning;

    fn test_state() -> GameState {
        let field =
            crate::sim::ObstacleField::from_obstacles(8000.0, 8000.0, 200.0, 100.0, Vec::new());
        GameState::from_field(field, false, "#ec4899")
    }

    #[test]
    fn test_toggle_applies_once() {
        let mut state = test_state();
        let mut commands = CommandQueue::new();
        let tuning = VehicleTuning::default();
        let input = InputState::default();

        commands.toggle_pressed();
        tick(&mut state, &input, &mut commands, &tuning);
        assert_eq!(state.vehicle.mode, VehicleMode::Plane);
        assert_eq!(state.vehicle.target_altitude, 1.0);

        // Holding the key does not toggle back
        commands.toggle_pressed();
        tick(&mut state, &input, &mut commands, &tuning);
        assert_eq!(state.vehicle.mode, VehicleMode::Plane);

        commands.toggle_released();
        commands.toggle_pressed();
        tick(&mut state, &input, &mut commands, &tuning);
        assert_eq!(state.vehicle.mode, VehicleMode::Car);
        assert_eq!(state.vehicle.target_altitude, 0.0);
        assert_eq!(state.time_ticks, 3);
    }

    #[test]
    fn test_determinism() {
        // Two states with same seed should produce identical results
        let world = WorldTuning::default();
        let tuning = VehicleTuning::default();
        let mut state1 = GameState::new(99999, false, &world, "#fff");
        let mut state2 = GameState::new(99999, false, &world, "#fff");
        let mut q1 = CommandQueue::new();
        let mut q2 = CommandQueue::new();

        let inputs = [
            InputState { up: true, ..Default::default() },
            InputState { up: true, left: true, ..Default::default() },
            InputState { down: true, right: true, ..Default::default() },
            InputState::default(),
        ];

        for input in inputs.iter().cycle().take(400) {
            tick(&mut state1, input, &mut q1, &tuning);
            tick(&mut state2, input, &mut q2, &tuning);
        }

        assert_eq!(state1.time_ticks, state2.time_ticks);
        assert_eq!(state1.vehicle.pos, state2.vehicle.pos);
        assert_eq!(state1.vehicle.heading, state2.vehicle.heading);
    }
}
