//! Simulation module
//!
//! All gameplay logic lives here. Nothing in this module touches the
//! platform, the renderer or audio:
//! - Variable timestep, clamped by [`tick`]
//! - Seeded RNG owned by the match
//! - Feedback reported through [`GameEvent`]s

pub mod ai;
pub mod collision;
pub mod particles;
pub mod state;
pub mod tick;

pub use ai::ai_velocity;
pub use collision::{PaddleHit, check_score, impact_strength, paddle_collision};
pub use particles::{Particle, emit_impact, emit_score_burst, update_particles};
pub use state::{Ball, Paddle, Rect, Side, Trail, TrailSample};
pub use tick::{FrameStats, GameEvent, GameState, Mode, Phase, ScreenShake, TickInput, tick};
