//! Particle effects
//!
//! Visual only: particles never feed back into gameplay.

use std::f32::consts::{PI, TAU};

use glam::Vec2;
use rand::Rng;
use rand::seq::IndexedRandom;

use crate::palette;
use crate::settings::ParticleQuality;

/// Downward acceleration applied to particles (px/s²)
const GRAVITY: f32 = 60.0;
/// Per-second velocity damping
const DRAG_X: f32 = 0.3;
const DRAG_Y: f32 = 0.1;

/// Base particle count of an impact burst before quality/intensity scaling
pub const IMPACT_BASE: usize = 12;
/// Base particle count of a score burst
pub const SCORE_BASE: usize = 48;
/// Bounds on a single impact burst
pub const MIN_IMPACT_PARTICLES: usize = 2;
pub const MAX_IMPACT_PARTICLES: usize = 200;
/// Half-angle of the impact spray cone (radians)
const IMPACT_CONE: f32 = 0.9;

/// A particle for visual effects
#[derive(Debug, Clone)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Seconds alive
    pub age: f32,
    /// Lifetime in seconds
    pub life: f32,
    pub size: f32,
    pub color: [u8; 3],
}

impl Particle {
    pub fn update(&mut self, dt: f32) {
        self.age += dt;
        self.pos += self.vel * dt;
        self.vel.y += GRAVITY * dt;
        self.vel.x *= 1.0 - DRAG_X * dt;
        self.vel.y *= 1.0 - DRAG_Y * dt;
    }

    pub fn is_dead(&self) -> bool {
        self.age >= self.life
    }

    /// Remaining opacity (1 = fresh)
    pub fn alpha(&self) -> f32 {
        if self.life <= 0.0 {
            return 0.0;
        }
        (1.0 - self.age / self.life).clamp(0.0, 1.0)
    }
}

/// Number of particles in an impact burst
pub fn impact_count(quality: ParticleQuality, intensity: f32) -> usize {
    let scaled = quality.scale_count(IMPACT_BASE) as f32 * intensity.max(0.0);
    (scaled as usize).clamp(MIN_IMPACT_PARTICLES, MAX_IMPACT_PARTICLES)
}

/// Spray particles away from a paddle.
///
/// `direction` is the horizontal sign the spray travels in (1 = rightward).
pub fn emit_impact<R: Rng>(
    particles: &mut Vec<Particle>,
    pos: Vec2,
    direction: f32,
    quality: ParticleQuality,
    intensity: f32,
    rng: &mut R,
) -> usize {
    let count = impact_count(quality, intensity);
    let heading = if direction >= 0.0 { 0.0 } else { PI };
    particles.reserve(count);
    for _ in 0..count {
        let speed = rng.random_range(80.0f32..360.0) * (0.7 + rng.random::<f32>() * 0.8) * intensity;
        let angle = rng.random_range(-IMPACT_CONE..IMPACT_CONE) + heading;
        particles.push(Particle {
            pos,
            vel: Vec2::new(angle.cos(), angle.sin()) * speed,
            age: 0.0,
            life: rng.random_range(0.18..0.7),
            size: rng.random_range(2.0f32..6.0) * (0.6 + 0.8 * intensity.min(1.0)),
            color: random_color(rng),
        });
    }
    count
}

/// Full-circle burst at the board center after a point
pub fn emit_score_burst<R: Rng>(
    particles: &mut Vec<Particle>,
    pos: Vec2,
    quality: ParticleQuality,
    rng: &mut R,
) -> usize {
    let count = quality.scale_count(SCORE_BASE);
    particles.reserve(count);
    for _ in 0..count {
        let speed: f32 = rng.random_range(120.0..420.0);
        let angle = rng.random_range(0.0..TAU);
        particles.push(Particle {
            pos,
            vel: Vec2::new(angle.cos(), angle.sin()) * speed,
            age: 0.0,
            life: rng.random_range(0.5..1.1),
            size: rng.random_range(3.0..6.0),
            color: random_color(rng),
        });
    }
    count
}

/// Advance every particle and drop the dead ones
pub fn update_particles(particles: &mut Vec<Particle>, dt: f32) {
    for p in particles.iter_mut() {
        p.update(dt);
    }
    particles.retain(|p| !p.is_dead());
}

fn random_color<R: Rng>(rng: &mut R) -> [u8; 3] {
    *palette::PARTICLES
        .choose(rng)
        .unwrap_or(&palette::ACCENT)
}
