//! Game settings and preferences
//!
//! Persisted through a [`SettingsStore`] (a JSON file on native, LocalStorage on web).

use serde::{Deserialize, Serialize};

use crate::consts::PADDLE_SPEED;
use crate::persistence::{self, PersistError, SettingsStore};

/// AI opponent difficulty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" | "medium" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Top AI paddle speed (px/s)
    pub fn max_speed(&self) -> f32 {
        let factor = match self {
            Difficulty::Easy => 0.7,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 1.35,
        };
        PADDLE_SPEED * factor
    }

    /// Distance (px) between paddle and ball centers the AI tolerates before moving
    pub fn deadzone(&self) -> f32 {
        match self {
            Difficulty::Easy => 14.0,
            Difficulty::Normal => 8.0,
            Difficulty::Hard => 4.0,
        }
    }
}

/// Particle quality levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ParticleQuality {
    Low,
    #[default]
    Normal,
    High,
}

impl ParticleQuality {
    pub const ALL: [ParticleQuality; 3] = [
        ParticleQuality::Low,
        ParticleQuality::Normal,
        ParticleQuality::High,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ParticleQuality::Low => "Low",
            ParticleQuality::Normal => "Normal",
            ParticleQuality::High => "High",
        }
    }

    /// Scale a base particle count. Only counts change with quality, never particle physics.
    pub fn scale_count(&self, base: usize) -> usize {
        match self {
            ParticleQuality::Low => ((base as f32 * 0.5) as usize).max(1),
            ParticleQuality::Normal => base,
            ParticleQuality::High => (base as f32 * 1.8) as usize,
        }
    }

    /// Lifetime of a ball trail sample (seconds)
    pub fn trail_life(&self) -> f32 {
        match self {
            ParticleQuality::Low => 0.10,
            ParticleQuality::Normal => 0.25,
            ParticleQuality::High => 0.45,
        }
    }
}

/// Step to the neighbouring entry of a value list, wrapping around
pub fn cycle<T: Copy + PartialEq>(values: &[T], current: T, forward: bool) -> T {
    let len = values.len();
    let i = values.iter().position(|v| *v == current).unwrap_or(0);
    let next = if forward { (i + 1) % len } else { (i + len - 1) % len };
    values[next]
}

/// Physical key identifier (a `KeyboardEvent.code` value such as `KeyW` or `ArrowUp`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyCode(String);

impl KeyCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short lowercase name for menus (`KeyW` -> `w`, `ArrowUp` -> `up`)
    pub fn display_name(&self) -> String {
        let code = self.0.as_str();
        let name = code
            .strip_prefix("Key")
            .or_else(|| code.strip_prefix("Digit"))
            .or_else(|| code.strip_prefix("Arrow"))
            .unwrap_or(code);
        match name {
            "Space" => "space".to_string(),
            "Enter" => "return".to_string(),
            "ShiftLeft" => "left shift".to_string(),
            "ShiftRight" => "right shift".to_string(),
            "ControlLeft" => "left ctrl".to_string(),
            "ControlRight" => "right ctrl".to_string(),
            _ => name.to_lowercase(),
        }
    }
}

impl From<&str> for KeyCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

/// Rebindable logical actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    LeftUp,
    LeftDown,
    RightUp,
    RightDown,
    Reset,
    Menu,
    Debug,
}

impl Action {
    /// Lookup order when a key is bound to several actions
    pub const ALL: [Action; 7] = [
        Action::LeftUp,
        Action::LeftDown,
        Action::RightUp,
        Action::RightDown,
        Action::Reset,
        Action::Menu,
        Action::Debug,
    ];

    /// Name used in the persisted record
    pub fn key(&self) -> &'static str {
        match self {
            Action::LeftUp => "left_up",
            Action::LeftDown => "left_down",
            Action::RightUp => "right_up",
            Action::RightDown => "right_down",
            Action::Reset => "reset",
            Action::Menu => "menu",
            Action::Debug => "debug",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Action::LeftUp => "Left Up",
            Action::LeftDown => "Left Down",
            Action::RightUp => "Right Up",
            Action::RightDown => "Right Down",
            Action::Reset => "Reset",
            Action::Menu => "Menu",
            Action::Debug => "Debug",
        }
    }
}

/// Keyboard bindings. `None` means the action is deliberately unbound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Controls {
    pub left_up: Option<KeyCode>,
    pub left_down: Option<KeyCode>,
    pub right_up: Option<KeyCode>,
    pub right_down: Option<KeyCode>,
    pub reset: Option<KeyCode>,
    pub menu: Option<KeyCode>,
    pub debug: Option<KeyCode>,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            left_up: Some("KeyW".into()),
            left_down: Some("KeyS".into()),
            right_up: Some("ArrowUp".into()),
            right_down: Some("ArrowDown".into()),
            reset: Some("KeyR".into()),
            menu: Some("KeyM".into()),
            debug: Some("F3".into()),
        }
    }
}

impl Controls {
    pub fn get(&self, action: Action) -> Option<&KeyCode> {
        self.slot(action).as_ref()
    }

    pub fn set(&mut self, action: Action, key: Option<KeyCode>) {
        *self.slot_mut(action) = key;
    }

    pub fn is_bound(&self, action: Action, key: &KeyCode) -> bool {
        self.get(action) == Some(key)
    }

    pub fn all_unbound(&self) -> bool {
        Action::ALL.iter().all(|a| self.get(*a).is_none())
    }

    fn slot(&self, action: Action) -> &Option<KeyCode> {
        match action {
            Action::LeftUp => &self.left_up,
            Action::LeftDown => &self.left_down,
            Action::RightUp => &self.right_up,
            Action::RightDown => &self.right_down,
            Action::Reset => &self.reset,
            Action::Menu => &self.menu,
            Action::Debug => &self.debug,
        }
    }

    fn slot_mut(&mut self, action: Action) -> &mut Option<KeyCode> {
        match action {
            Action::LeftUp => &mut self.left_up,
            Action::LeftDown => &mut self.left_down,
            Action::RightUp => &mut self.right_up,
            Action::RightDown => &mut self.right_down,
            Action::Reset => &mut self.reset,
            Action::Menu => &mut self.menu,
            Action::Debug => &mut self.debug,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// AI opponent difficulty (single player)
    pub ai_difficulty: Difficulty,
    /// Particle density and trail length
    pub particle_quality: ParticleQuality,
    /// Sound effects and menu music
    pub sound: bool,
    /// Keyboard bindings
    pub controls: Controls,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ai_difficulty: Difficulty::Normal,
            particle_quality: ParticleQuality::Normal,
            sound: true,
            controls: Controls::default(),
        }
    }
}

impl Settings {
    /// Load settings, falling back to defaults field by field
    pub fn load(store: &dyn SettingsStore) -> Self {
        match store.read() {
            Ok(Some(contents)) => {
                let settings = persistence::decode_settings(&contents);
                log::info!("Loaded settings from {}", store.describe());
                settings
            }
            Ok(None) => {
                log::info!("No settings at {}, using defaults", store.describe());
                Self::default()
            }
            Err(e) => {
                log::warn!("Failed to read settings from {}: {}", store.describe(), e);
                Self::default()
            }
        }
    }

    /// Save settings. Callers log and carry on when this fails.
    pub fn save(&self, store: &mut dyn SettingsStore) -> Result<(), PersistError> {
        let json = persistence::encode_settings(self)?;
        store.write(&json)?;
        log::info!("Settings saved to {}", store.describe());
        Ok(())
    }
}
