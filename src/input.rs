//! Input routing during a match
//!
//! Keyboard events and polled pad snapshots become paddle velocities and
//! discrete commands. Keyboard motion is latched per paddle; pad axes are
//! read fresh every frame.

use crate::consts::{AXIS_DEADZONE, PADDLE_SPEED};
use crate::platform::PadState;
use crate::settings::{Action, Controls, KeyCode};
use crate::sim::{Mode, Side, TickInput};

/// Stick axis that drives a paddle
const PADDLE_AXIS: usize = 1;
/// Second stick on a lone pad, used for the right paddle
const SHARED_PAD_RIGHT_AXIS: usize = 3;

/// Pad buttons with fixed meanings during play
pub const BUTTON_RESET: usize = 0;
pub const BUTTON_MENU: usize = 1;
pub const BUTTON_DEBUG: usize = 2;

/// Discrete input, as delivered by the platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    KeyDown(KeyCode),
    KeyUp(KeyCode),
    PadButton { pad: usize, button: usize },
    MouseDown,
    /// Window/session close
    Quit,
}

impl InputEvent {
    pub fn key_down(code: &str) -> Self {
        InputEvent::KeyDown(KeyCode::new(code))
    }

    pub fn key_up(code: &str) -> Self {
        InputEvent::KeyUp(KeyCode::new(code))
    }

    /// Whether this counts as "any input" for skipping banners and closing screens
    pub fn is_press(&self) -> bool {
        matches!(
            self,
            InputEvent::KeyDown(_) | InputEvent::PadButton { .. } | InputEvent::MouseDown
        )
    }
}

/// Match-level commands produced by input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    ResetMatch,
    ReturnToMenu,
    ToggleDebug,
    Quit,
}

/// Analog axis to paddle velocity
pub fn axis_velocity(value: f32) -> f32 {
    if value.abs() < AXIS_DEADZONE {
        0.0
    } else {
        value * PADDLE_SPEED
    }
}

/// Velocity requested by `pad` through `axis`, with the hat taking over when pushed.
///
/// `None` when the pad has neither the axis nor a hat.
fn pad_velocity(pad: &PadState, axis: usize, use_hat: bool) -> Option<f32> {
    let mut velocity = pad.axis(axis).map(axis_velocity);
    if use_hat && pad.hats > 0 {
        if pad.hat_y != 0 {
            velocity = Some(-(pad.hat_y as f32) * PADDLE_SPEED);
        } else if velocity.is_none() {
            velocity = Some(0.0);
        }
    }
    velocity
}

/// Device command for one paddle given the connected pads
pub fn device_velocity(pads: &[PadState], side: Side) -> Option<f32> {
    match side {
        Side::Left => pads.first().and_then(|p| pad_velocity(p, PADDLE_AXIS, true)),
        Side::Right => match pads {
            [] => None,
            [only] => {
                if only.axes.len() > SHARED_PAD_RIGHT_AXIS {
                    pad_velocity(only, SHARED_PAD_RIGHT_AXIS, false)
                } else {
                    None
                }
            }
            [_, second, ..] => pad_velocity(second, PADDLE_AXIS, true),
        },
    }
}

/// Keyboard latch plus device merge for both paddles
#[derive(Debug, Clone, Default)]
pub struct InputRouter {
    /// Keyboard-held velocity per paddle [left, right]
    keys: [f32; 2],
}

impl InputRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget held keys (on match start or focus loss)
    pub fn clear(&mut self) {
        self.keys = [0.0; 2];
    }

    pub fn key_velocity(&self, side: Side) -> f32 {
        self.keys[side.index()]
    }

    /// Route one event. Returns a command when the event triggers one.
    pub fn handle_event(&mut self, event: &InputEvent, controls: &Controls, mode: Mode) -> Option<Command> {
        match event {
            InputEvent::Quit => Some(Command::Quit),
            InputEvent::PadButton { button, .. } => match *button {
                BUTTON_RESET => Some(Command::ResetMatch),
                BUTTON_MENU => Some(Command::ReturnToMenu),
                BUTTON_DEBUG => Some(Command::ToggleDebug),
                _ => None,
            },
            InputEvent::MouseDown => None,
            InputEvent::KeyDown(key) => self.key_down(key, controls, mode),
            InputEvent::KeyUp(key) => {
                self.key_up(key, controls);
                None
            }
        }
    }

    fn key_down(&mut self, key: &KeyCode, controls: &Controls, mode: Mode) -> Option<Command> {
        let action = Action::ALL.into_iter().find(|a| {
            let right = matches!(a, Action::RightUp | Action::RightDown);
            controls.is_bound(*a, key) && !(right && mode.right_is_ai())
        });

        match action {
            Some(Action::LeftUp) => self.keys[0] = -PADDLE_SPEED,
            Some(Action::LeftDown) => self.keys[0] = PADDLE_SPEED,
            Some(Action::RightUp) => self.keys[1] = -PADDLE_SPEED,
            Some(Action::RightDown) => self.keys[1] = PADDLE_SPEED,
            Some(Action::Reset) => return Some(Command::ResetMatch),
            Some(Action::Menu) => return Some(Command::ReturnToMenu),
            Some(Action::Debug) => return Some(Command::ToggleDebug),
            None if key.as_str() == "Escape" => return Some(Command::Quit),
            None => {}
        }
        None
    }

    /// Releasing a key stops the paddle only if it was moving that key's way
    fn key_up(&mut self, key: &KeyCode, controls: &Controls) {
        if controls.is_bound(Action::LeftUp, key) && self.keys[0] < 0.0 {
            self.keys[0] = 0.0;
        }
        if controls.is_bound(Action::LeftDown, key) && self.keys[0] > 0.0 {
            self.keys[0] = 0.0;
        }
        if controls.is_bound(Action::RightUp, key) && self.keys[1] < 0.0 {
            self.keys[1] = 0.0;
        }
        if controls.is_bound(Action::RightDown, key) && self.keys[1] > 0.0 {
            self.keys[1] = 0.0;
        }
    }

    /// Paddle velocities for this frame. A held key beats the pad.
    pub fn paddle_input(&self, pads: &[PadState], mode: Mode) -> TickInput {
        let resolve = |side: Side| {
            let key = self.keys[side.index()];
            if key != 0.0 {
                key
            } else {
                device_velocity(pads, side).unwrap_or(0.0)
            }
        };
        TickInput {
            left: resolve(Side::Left),
            right: if mode.right_is_ai() { 0.0 } else { resolve(Side::Right) },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn pad(index: usize, axes: Vec<f32>, buttons: Vec<bool>) -> PadState {
        PadState::new(index, "Pad", axes, buttons)
    }

    #[test]
    fn test_key_down_latches_velocity() {
        let controls = Controls::default();
        let mut router = InputRouter::new();
        assert_eq!(router.handle_event(&InputEvent::key_down("KeyW"), &controls, Mode::TwoPlayer), None);
        assert_eq!(router.key_velocity(Side::Left), -PADDLE_SPEED);
        router.handle_event(&InputEvent::key_down("ArrowDown"), &controls, Mode::TwoPlayer);
        assert_eq!(router.key_velocity(Side::Right), PADDLE_SPEED);
    }

    #[test]
    fn test_opposite_key_up_keeps_motion() {
        let controls = Controls::default();
        let mut router = InputRouter::new();
        router.handle_event(&InputEvent::key_down("KeyW"), &controls, Mode::TwoPlayer);
        router.handle_event(&InputEvent::key_down("KeyS"), &controls, Mode::TwoPlayer);
        // W released while S is the active direction
        router.handle_event(&InputEvent::key_up("KeyW"), &controls, Mode::TwoPlayer);
        assert_eq!(router.key_velocity(Side::Left), PADDLE_SPEED);
        router.handle_event(&InputEvent::key_up("KeyS"), &controls, Mode::TwoPlayer);
        assert_eq!(router.key_velocity(Side::Left), 0.0);
    }

    #[test]
    fn test_single_player_ignores_right_keys() {
        let controls = Controls::default();
        let mut router = InputRouter::new();
        router.handle_event(&InputEvent::key_down("ArrowUp"), &controls, Mode::SinglePlayer);
        assert_eq!(router.key_velocity(Side::Right), 0.0);
        let pads = [pad(0, vec![0.0; 2], vec![]), pad(1, vec![0.0, 0.9], vec![])];
        assert_eq!(router.paddle_input(&pads, Mode::SinglePlayer).right, 0.0);
    }

    #[test]
    fn test_commands() {
        let controls = Controls::default();
        let mut router = InputRouter::new();
        let mode = Mode::TwoPlayer;
        assert_eq!(router.handle_event(&InputEvent::key_down("KeyR"), &controls, mode), Some(Command::ResetMatch));
        assert_eq!(router.handle_event(&InputEvent::key_down("KeyM"), &controls, mode), Some(Command::ReturnToMenu));
        assert_eq!(router.handle_event(&InputEvent::key_down("F3"), &controls, mode), Some(Command::ToggleDebug));
        assert_eq!(router.handle_event(&InputEvent::key_down("Escape"), &controls, mode), Some(Command::Quit));
        assert_eq!(router.handle_event(&InputEvent::Quit, &controls, mode), Some(Command::Quit));
        assert_eq!(
            router.handle_event(&InputEvent::PadButton { pad: 1, button: 2 }, &controls, mode),
            Some(Command::ToggleDebug)
        );
        assert_eq!(router.handle_event(&InputEvent::PadButton { pad: 0, button: 7 }, &controls, mode), None);
    }

    #[test]
    fn test_unbound_key_does_nothing() {
        let mut controls = Controls::default();
        controls.set(Action::Reset, None);
        let mut router = InputRouter::new();
        assert_eq!(router.handle_event(&InputEvent::key_down("KeyR"), &controls, Mode::TwoPlayer), None);
    }

    #[test]
    fn test_device_mapping() {
        // Axis with deadzone
        let pads = [pad(0, vec![0.0, 0.1], vec![])];
        assert_eq!(device_velocity(&pads, Side::Left), Some(0.0));
        let pads = [pad(0, vec![0.0, -0.5], vec![])];
        assert_eq!(device_velocity(&pads, Side::Left), Some(-0.5 * PADDLE_SPEED));

        // Hat overrides the axis
        let mut buttons = vec![false; 16];
        buttons[13] = true;
        let pads = [pad(0, vec![0.0, -0.5], buttons)];
        assert_eq!(device_velocity(&pads, Side::Left), Some(PADDLE_SPEED));

        // Lone four-axis pad drives the right paddle with axis 3
        let pads = [pad(0, vec![0.0, 0.0, 0.0, 0.6], vec![])];
        assert_eq!(device_velocity(&pads, Side::Right), Some(0.6 * PADDLE_SPEED));
        let pads = [pad(0, vec![0.0, 0.0], vec![])];
        assert_eq!(device_velocity(&pads, Side::Right), None);
        assert_eq!(device_velocity(&[], Side::Left), None);
    }

    #[test]
    fn test_held_key_beats_device() {
        let controls = Controls::default();
        let mut router = InputRouter::new();
        let pads = [pad(0, vec![0.0, 0.8], vec![])];
        assert_eq!(router.paddle_input(&pads, Mode::TwoPlayer).left, 0.8 * PADDLE_SPEED);
        router.handle_event(&InputEvent::key_down("KeyW"), &controls, Mode::TwoPlayer);
        assert_eq!(router.paddle_input(&pads, Mode::TwoPlayer).left, -PADDLE_SPEED);
        router.clear();
        assert_eq!(router.paddle_input(&[], Mode::TwoPlayer), TickInput::default());
    }

    proptest! {
        #[test]
        fn prop_axis_deadzone(v in -1.0f32..1.0) {
            let out = axis_velocity(v);
            if v.abs() < AXIS_DEADZONE {
                prop_assert_eq!(out, 0.0);
            } else {
                prop_assert_eq!(out, v * PADDLE_SPEED);
            }
        }
    }
}
