//! Gamepad state snapshots
//!
//! The browser exposes pads only by polling, so each frame we take a snapshot
//! of every connected pad and diff button states to recover press events.

use std::collections::HashMap;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsCast;

/// Standard-mapping d-pad buttons, read as a single vertical hat
pub const DPAD_UP: usize = 12;
pub const DPAD_DOWN: usize = 13;

/// One polled controller
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PadState {
    /// Position among connected pads (0 = first); decides which paddle it drives
    pub index: usize,
    /// Stable device slot (browser `Gamepad.index`), survives other pads disconnecting
    pub slot: usize,
    pub name: String,
    pub axes: Vec<f32>,
    pub buttons: Vec<bool>,
    /// Number of hats the pad exposes (1 for standard-mapped pads)
    pub hats: usize,
    /// Vertical hat value: 1 = up, -1 = down
    pub hat_y: i32,
}

impl PadState {
    /// Build a snapshot, deriving the hat from the d-pad buttons when present
    pub fn new(index: usize, name: impl Into<String>, axes: Vec<f32>, buttons: Vec<bool>) -> Self {
        let hats = usize::from(buttons.len() > DPAD_DOWN);
        let hat_y = if hats == 0 {
            0
        } else {
            match (buttons[DPAD_UP], buttons[DPAD_DOWN]) {
                (true, false) => 1,
                (false, true) => -1,
                _ => 0,
            }
        };
        Self {
            index,
            slot: index,
            name: name.into(),
            axes,
            buttons,
            hats,
            hat_y,
        }
    }

    /// Same snapshot reporting a different device slot
    pub fn with_slot(mut self, slot: usize) -> Self {
        self.slot = slot;
        self
    }

    pub fn axis(&self, i: usize) -> Option<f32> {
        self.axes.get(i).copied()
    }

    /// Debug overlay line
    pub fn summary(&self) -> String {
        format!(
            "#{} {} axes={} buttons={} hats={}",
            self.index,
            self.name,
            self.axes.len(),
            self.buttons.len(),
            self.hats
        )
    }
}

/// Turns successive snapshots into button-press edges
///
/// Button history is keyed by device slot, so a pad keeps its history when an
/// earlier pad disconnects and its position shifts.
#[derive(Debug, Default)]
pub struct PadTracker {
    previous: HashMap<usize, Vec<bool>>,
}

impl PadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buttons that went down since the last call, as `(pad position, button)` pairs
    pub fn update(&mut self, pads: &[PadState]) -> Vec<(usize, usize)> {
        let mut pressed = Vec::new();
        for pad in pads {
            let before = self.previous.get(&pad.slot);
            for (button, &down) in pad.buttons.iter().enumerate() {
                let was_down = before
                    .and_then(|b| b.get(button))
                    .copied()
                    .unwrap_or(false);
                if down && !was_down {
                    pressed.push((pad.index, button));
                }
            }
        }

        self.previous = pads.iter().map(|p| (p.slot, p.buttons.clone())).collect();
        pressed
    }
}

/// Snapshot every connected pad. Pads that fail to read are skipped.
#[cfg(target_arch = "wasm32")]
pub fn poll() -> Vec<PadState> {
    let Some(window) = web_sys::window() else {
        return Vec::new();
    };
    let list = match window.navigator().get_gamepads() {
        Ok(list) => list,
        Err(e) => {
            log::debug!("Gamepad enumeration failed: {:?}", e);
            return Vec::new();
        }
    };

    let mut pads = Vec::new();
    for entry in list.iter() {
        let Ok(pad) = entry.dyn_into::<web_sys::Gamepad>() else {
            continue;
        };
        if !pad.connected() {
            continue;
        }
        let axes = pad
            .axes()
            .iter()
            .map(|v| v.as_f64().unwrap_or(0.0) as f32)
            .collect();
        let buttons = pad
            .buttons()
            .iter()
            .map(|b| {
                b.dyn_into::<web_sys::GamepadButton>()
                    .map(|b| b.pressed())
                    .unwrap_or(false)
            })
            .collect();
        pads.push(PadState::new(pads.len(), pad.id(), axes, buttons).with_slot(pad.index() as usize));
    }
    pads
}

/// Native builds have no pad backend
#[cfg(not(target_arch = "wasm32"))]
pub fn poll() -> Vec<PadState> {
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pad(index: usize, buttons: &[usize]) -> PadState {
        let mut b = vec![false; 16];
        for &i in buttons {
            b[i] = true;
        }
        PadState::new(index, "Test Pad", vec![0.0; 4], b)
    }

    #[test]
    fn test_hat_from_dpad() {
        assert_eq!(pad(0, &[DPAD_UP]).hat_y, 1);
        assert_eq!(pad(0, &[DPAD_DOWN]).hat_y, -1);
        assert_eq!(pad(0, &[DPAD_UP, DPAD_DOWN]).hat_y, 0);
        let bare = PadState::new(0, "Stick", vec![0.0, 0.5], vec![true; 4]);
        assert_eq!(bare.hats, 0);
        assert_eq!(bare.hat_y, 0);
    }

    #[test]
    fn test_tracker_reports_edges_once() {
        let mut tracker = PadTracker::new();
        assert_eq!(tracker.update(&[pad(0, &[0])]), vec![(0, 0)]);
        // Held: no repeat
        assert!(tracker.update(&[pad(0, &[0])]).is_empty());
        assert_eq!(tracker.update(&[pad(0, &[0, 2]), pad(1, &[1])]), vec![(0, 2), (1, 1)]);
        // Released then pressed again
        tracker.update(&[pad(0, &[]), pad(1, &[])]);
        assert_eq!(tracker.update(&[pad(0, &[0])]), vec![(0, 0)]);
    }

    #[test]
    fn test_history_follows_device_when_earlier_pad_leaves() {
        let mut tracker = PadTracker::new();
        let first = pad(0, &[]).with_slot(0);
        let second = pad(1, &[3]).with_slot(1);
        assert_eq!(tracker.update(&[first, second]), vec![(1, 3)]);

        // Slot 1 moves to position 0 while still holding button 3
        let shifted = pad(0, &[3]).with_slot(1);
        assert!(tracker.update(&[shifted]).is_empty());

        // A new press on the shifted pad reports its new position
        let pressed = pad(0, &[0, 3]).with_slot(1);
        assert_eq!(tracker.update(&[pressed]), vec![(0, 0)]);
    }

    #[test]
    fn test_summary_line() {
        assert_eq!(pad(1, &[]).summary(), "#1 Test Pad axes=4 buttons=16 hats=1");
    }
}
