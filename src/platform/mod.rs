//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Time (frame pacing and timings)
//! - Session seeds
//! - Gamepad polling

pub mod gamepad;

pub use gamepad::{PadState, PadTracker};

/// Monotonic milliseconds for frame timing
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or_else(js_sys::Date::now)
}

/// Monotonic milliseconds for frame timing
#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    use std::sync::OnceLock;
    use std::time::Instant;

    static START: OnceLock<Instant> = OnceLock::new();
    START.get_or_init(Instant::now).elapsed().as_secs_f64() * 1000.0
}

/// Time-based RNG seed for a new match
#[cfg(target_arch = "wasm32")]
pub fn session_seed() -> u64 {
    js_sys::Date::now() as u64
}

/// Time-based RNG seed for a new match
#[cfg(not(target_arch = "wasm32"))]
pub fn session_seed() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}
