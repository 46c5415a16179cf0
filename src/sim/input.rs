//! Logical input state and discrete commands
//!
//! Any input source (keyboard, touch buttons) writes held directions into
//! `InputState` and pushes one-shot `Command`s onto a `CommandQueue`. The tick
//! drains the queue, so a command fires exactly once per activation no matter
//! how long the key is held.

use std::collections::VecDeque;

/// A held steering/throttle direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Map a keyboard key name to a direction (case-insensitive)
    pub fn from_key(key: &str) -> Option<Self> {
        match key.to_lowercase().as_str() {
            "w" | "arrowup" => Some(Direction::Up),
            "s" | "arrowdown" => Some(Direction::Down),
            "a" | "arrowleft" => Some(Direction::Left),
            "d" | "arrowright" => Some(Direction::Right),
            _ => None,
        }
    }
}

/// Current press state of the four directions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl InputState {
    pub fn set(&mut self, dir: Direction, pressed: bool) {
        match dir {
            Direction::Up => self.up = pressed,
            Direction::Down => self.down = pressed,
            Direction::Left => self.left = pressed,
            Direction::Right => self.right = pressed,
        }
    }

    /// Steering sign: -1 left, +1 right, 0 none. Left wins when both are held.
    #[inline]
    pub fn steer(&self) -> f32 {
        if self.left {
            -1.0
        } else if self.right {
            1.0
        } else {
            0.0
        }
    }

    /// Release everything (e.g. on focus loss)
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// One-shot commands consumed by the tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Switch between car and plane
    ToggleMode,
}

/// Edge-triggered command buffer, drained once per tick
#[derive(Debug, Default)]
pub struct CommandQueue {
    pending: VecDeque<Command>,
    /// Toggle key is down and has already fired
    toggle_held: bool,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a command unconditionally (touch-start style activation)
    pub fn push(&mut self, cmd: Command) {
        self.pending.push_back(cmd);
    }

    /// Touch button tap. Fires every time, independent of the toggle key.
    pub fn toggle_tapped(&mut self) {
        self.push(Command::ToggleMode);
    }

    /// Key-down for the toggle key. Auto-repeat while held is ignored.
    pub fn toggle_pressed(&mut self) {
        if !self.toggle_held {
            self.toggle_held = true;
            self.push(Command::ToggleMode);
        }
    }

    /// Key-up for the toggle key. Never produces a command.
    pub fn toggle_released(&mut self) {
        self.toggle_held = false;
    }

    pub fn drain(&mut self) -> impl Iterator<Item = Command> + '_ {
        self.pending.drain(..)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_mapping() {
        assert_eq!(Direction::from_key("W"), Some(Direction::Up));
        assert_eq!(Direction::from_key("ArrowLeft"), Some(Direction::Left));
        assert_eq!(Direction::from_key("d"), Some(Direction::Right));
        assert_eq!(Direction::from_key("q"), None);
    }

    #[test]
    fn test_flags_follow_press_state() {
        let mut input = InputState::default();
        input.set(Direction::Up, true);
        input.set(Direction::Left, true);
        assert!(input.up && input.left);
        assert_eq!(input.steer(), -1.0);
        input.set(Direction::Left, false);
        input.set(Direction::Right, true);
        assert_eq!(input.steer(), 1.0);
        input.clear();
        assert_eq!(input, InputState::default());
    }

    #[test]
    fn test_toggle_fires_once_per_press() {
        let mut queue = CommandQueue::new();
        // Key-down plus two auto-repeats
        queue.toggle_pressed();
        queue.toggle_pressed();
        queue.toggle_pressed();
        assert_eq!(queue.drain().count(), 1);

        // Release never fires
        queue.toggle_released();
        assert!(queue.is_empty());

        // Next press fires again
        queue.toggle_pressed();
        assert_eq!(queue.drain().collect::<Vec<_>>(), vec![Command::ToggleMode]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_tap_fires_while_key_held() {
        let mut queue = CommandQueue::new();
        queue.toggle_pressed();
        queue.toggle_tapped();
        queue.toggle_tapped();
        assert_eq!(queue.drain().count(), 3);

        // Taps leave the key's held state alone
        queue.toggle_pressed();
        assert!(queue.is_empty());
        queue.toggle_released();
        queue.toggle_pressed();
        assert_eq!(queue.drain().count(), 1);
    }
}
