//! Keyboard handling for the player.
//!
//! Movement is event-driven rather than level-triggered: every press and
//! every OS key-repeat moves the player by one fixed step. Holding a key
//! therefore moves at the platform's repeat rate, not once per frame.

use crate::player::PlayerState;

pub const DEFAULT_STEP: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Press,
    Repeat,
    Release,
}

impl KeyAction {
    pub fn from_event(pressed: bool, repeat: bool) -> Self {
        match (pressed, repeat) {
            (false, _) => Self::Release,
            (true, false) => Self::Press,
            (true, true) => Self::Repeat,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputHandler {
    pub step: f32,
}

impl InputHandler {
    pub fn new(step: f32) -> Self {
        Self { step }
    }

    /// Applies one key event to the player. Returns true when the position
    /// changed.
    pub fn handle(&self, player: &mut PlayerState, key: Key, action: KeyAction) -> bool {
        if action == KeyAction::Release {
            return false;
        }
        match key {
            Key::Left => player.nudge(-self.step),
            Key::Right => player.nudge(self.step),
        }
        true
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new(DEFAULT_STEP)
    }
}
