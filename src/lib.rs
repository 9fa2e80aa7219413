//! BOING! - a two-paddle arcade ball game
//!
//! Core modules:
//! - `sim`: Simulation (kinematics, collisions, particles, AI, frame orchestration)
//! - `input`: Keyboard/gamepad routing into paddle commands and game actions
//! - `ui`: Menu shell state machine and text view model
//! - `settings`: Player preferences and control bindings
//! - `persistence`: Versioned settings record and storage backends
//! - `platform`: Browser/native platform abstraction
//! - `renderer`: WebGPU rendering pipeline
//! - `audio`: Procedural sound effects

pub mod audio;
pub mod input;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod ui;

pub use settings::{Action, Controls, Difficulty, KeyCode, ParticleQuality, Settings};

/// Game configuration constants
pub mod consts {
    /// Logical canvas size
    pub const WIDTH: f32 = 900.0;
    pub const HEIGHT: f32 = 600.0;
    /// Target frame rate
    pub const FPS: f32 = 144.0;
    /// Largest frame delta fed to the simulation (hitches are clamped)
    pub const MAX_FRAME_DT: f32 = 0.05;

    /// Win condition (0 = endless)
    pub const SCORE_TO_WIN: u32 = 5;

    /// Paddle defaults (pixels, pixels per second)
    pub const PADDLE_WIDTH: i32 = 12;
    pub const PADDLE_HEIGHT: i32 = 100;
    pub const PADDLE_MARGIN: i32 = 20;
    pub const PADDLE_SPEED: f32 = 360.0;
    /// How long a paddle glows after a hit
    pub const PADDLE_FLASH_SECS: f32 = 0.12;

    /// Ball defaults
    pub const BALL_SIZE: i32 = 14;
    pub const BALL_SPEED_START: f32 = 300.0;
    pub const BALL_SPEED_INCREMENT: f32 = 0.8;
    /// Hard cap on ball speed
    pub const MAX_BALL_SPEED: f32 = 1200.0;
    /// Vertical deflection per unit of normalized paddle offset
    pub const DEFLECTION: f32 = 150.0;

    /// Analog stick deadzone
    pub const AXIS_DEADZONE: f32 = 0.20;

    /// Win banner wait before the next match starts
    pub const WIN_BANNER_SECS: f32 = 1.8;

    /// Frame-time samples kept for the debug overlay
    pub const MAX_FRAME_SAMPLES: usize = 200;

    /// Speed growth applied on every paddle hit
    #[inline]
    pub fn ball_growth() -> f32 {
        1.0 + BALL_SPEED_INCREMENT / 10.0
    }
}

/// Color palette (RGB, 0-255)
pub mod palette {
    pub const BG: [u8; 3] = [10, 10, 10];
    pub const WHITE: [u8; 3] = [240, 240, 240];
    pub const DARK: [u8; 3] = [30, 30, 30];
    pub const ACCENT: [u8; 3] = [100, 200, 255];
    pub const HIGHLIGHT: [u8; 3] = [200, 230, 255];
    pub const PARTICLES: [[u8; 3]; 4] = [
        [255, 220, 120],
        [255, 120, 180],
        [120, 200, 255],
        [200, 255, 150],
    ];

    /// Convert to a normalized RGBA color for the GPU
    #[inline]
    pub fn rgba(c: [u8; 3], alpha: f32) -> [f32; 4] {
        [
            c[0] as f32 / 255.0,
            c[1] as f32 / 255.0,
            c[2] as f32 / 255.0,
            alpha,
        ]
    }

    /// Linear blend between two colors (t = 0 gives `a`)
    pub fn lerp(a: [u8; 3], b: [u8; 3], t: f32) -> [u8; 3] {
        let t = t.clamp(0.0, 1.0);
        let mix = |x: u8, y: u8| (x as f32 * (1.0 - t) + y as f32 * t) as u8;
        [mix(a[0], b[0]), mix(a[1], b[1]), mix(a[2], b[2])]
    }
}
