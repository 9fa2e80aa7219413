//! Frame-stepped match simulation
//!
//! One call to [`tick`] advances a match by a variable `dt`:
//! AI -> paddles -> ball -> trail -> collisions/scoring -> particles -> shake.

use std::collections::VecDeque;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::ai::ai_velocity;
use super::collision::{check_score, paddle_collision};
use super::particles::{Particle, emit_impact, emit_score_burst, update_particles};
use super::state::{Ball, Paddle, Side, Trail};
use crate::consts::*;
use crate::settings::{Difficulty, ParticleQuality, Settings};

/// Shake applied on a paddle hit (seconds); also the full-strength window for rendering
const HIT_SHAKE_SECS: f32 = 0.12;
const HIT_SHAKE_MAX: f32 = 18.0;
const HIT_SHAKE_PER_STRENGTH: f32 = 6.0;
const SCORE_SHAKE_SECS: f32 = 0.22;
const SCORE_SHAKE: f32 = 22.0;

/// Who controls the right paddle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Right paddle driven by the AI
    SinglePlayer,
    /// Both paddles driven by players
    TwoPlayer,
}

impl Mode {
    pub fn label(&self) -> &'static str {
        match self {
            Mode::SinglePlayer => "1P (vs AI)",
            Mode::TwoPlayer => "2P (Local)",
        }
    }

    pub fn right_is_ai(&self) -> bool {
        matches!(self, Mode::SinglePlayer)
    }
}

/// Match phase
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    Playing,
    /// Win banner is showing; the board is frozen until `remaining` runs out
    Won { winner: Side, remaining: f32 },
}

/// Things that happened during a tick, drained by audio and UI
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    PaddleHit { side: Side, strength: f32 },
    Scored { scorer: Side, scores: [u32; 2] },
    MatchWon { winner: Side },
}

/// Screen shake timer and magnitude (pixels)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScreenShake {
    pub timer: f32,
    pub magnitude: f32,
}

impl ScreenShake {
    /// Raise to at least the given timer and magnitude
    pub fn raise(&mut self, timer: f32, magnitude: f32) {
        self.timer = self.timer.max(timer);
        self.magnitude = self.magnitude.max(magnitude);
    }

    pub fn decay(&mut self, dt: f32) {
        if self.timer > 0.0 {
            self.timer = (self.timer - dt).max(0.0);
            if self.timer <= 0.0 {
                self.magnitude = 0.0;
            }
        }
    }

    /// Current amplitude, easing out over the last hit window
    pub fn amplitude(&self) -> f32 {
        if self.timer <= 0.0 || self.magnitude <= 0.0 {
            return 0.0;
        }
        self.magnitude * (self.timer / HIT_SHAKE_SECS).min(1.0)
    }

    /// Random whole-pixel render offset within the current amplitude
    pub fn offset<R: Rng>(&self, rng: &mut R) -> Vec2 {
        let m = self.amplitude();
        if m <= 0.0 {
            return Vec2::ZERO;
        }
        let ox = rng.random_range(-m..=m).trunc();
        let oy = rng.random_range(-m..=m).trunc();
        Vec2::new(ox, oy)
    }
}

/// Rolling frame timings for the debug overlay
#[derive(Debug, Clone)]
pub struct FrameStats {
    frame_ms: VecDeque<f32>,
    update_ms: VecDeque<f32>,
    draw_ms: VecDeque<f32>,
    /// Smoothed frames per second
    pub fps: f32,
}

impl Default for FrameStats {
    fn default() -> Self {
        Self {
            frame_ms: VecDeque::with_capacity(MAX_FRAME_SAMPLES),
            update_ms: VecDeque::with_capacity(MAX_FRAME_SAMPLES),
            draw_ms: VecDeque::with_capacity(MAX_FRAME_SAMPLES),
            fps: 0.0,
        }
    }
}

impl FrameStats {
    /// Record one frame. `interval` is the wall time since the previous frame (seconds).
    pub fn record(&mut self, interval: f32, frame_ms: f32, update_ms: f32, draw_ms: f32) {
        push_capped(&mut self.frame_ms, frame_ms);
        push_capped(&mut self.update_ms, update_ms);
        push_capped(&mut self.draw_ms, draw_ms);
        if interval > 0.0 {
            let instant = 1.0 / interval;
            self.fps = if self.fps <= 0.0 {
                instant
            } else {
                self.fps * 0.9 + instant * 0.1
            };
        }
    }

    pub fn samples(&self) -> usize {
        self.frame_ms.len()
    }

    pub fn avg_frame_ms(&self) -> f32 {
        mean(&self.frame_ms)
    }

    pub fn avg_update_ms(&self) -> f32 {
        mean(&self.update_ms)
    }

    pub fn avg_draw_ms(&self) -> f32 {
        mean(&self.draw_ms)
    }
}

fn push_capped(ring: &mut VecDeque<f32>, value: f32) {
    ring.push_back(value);
    while ring.len() > MAX_FRAME_SAMPLES {
        ring.pop_front();
    }
}

fn mean(ring: &VecDeque<f32>) -> f32 {
    ring.iter().sum::<f32>() / ring.len().max(1) as f32
}

/// Paddle velocities requested by players for one frame (px/s, positive = down)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickInput {
    pub left: f32,
    /// Ignored in single player
    pub right: f32,
}

/// Complete state of one match
#[derive(Debug, Clone)]
pub struct GameState {
    pub left: Paddle,
    pub right: Paddle,
    pub ball: Ball,
    /// Points for [left, right]
    pub scores: [u32; 2],
    pub mode: Mode,
    /// Ball frozen (paddles still move)
    pub paused: bool,
    pub phase: Phase,
    pub particles: Vec<Particle>,
    pub trail: Trail,
    pub shake: ScreenShake,
    pub stats: FrameStats,
    pub difficulty: Difficulty,
    pub quality: ParticleQuality,
    /// Points needed to win (0 = endless)
    pub score_to_win: u32,
    /// Pending events since the last [`GameState::drain_events`]
    pub events: Vec<GameEvent>,
    rng: Pcg32,
}

impl GameState {
    pub fn new(mode: Mode, settings: &Settings, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut ball = Ball::new();
        ball.serve(None, &mut rng);
        Self {
            left: Paddle::new(Side::Left),
            right: Paddle::new(Side::Right),
            ball,
            scores: [0, 0],
            mode,
            paused: false,
            phase: Phase::Playing,
            particles: Vec::new(),
            trail: Trail::new(settings.particle_quality.trail_life()),
            shake: ScreenShake::default(),
            stats: FrameStats::default(),
            difficulty: settings.ai_difficulty,
            quality: settings.particle_quality,
            score_to_win: SCORE_TO_WIN,
            events: Vec::new(),
            rng,
        }
    }

    /// Zero the scores and serve a fresh ball in a random direction
    pub fn reset_match(&mut self) {
        self.scores = [0, 0];
        self.ball.serve(None, &mut self.rng);
        self.trail.clear();
        self.phase = Phase::Playing;
        log::debug!("Match reset");
    }

    /// End the win banner early. Returns false when no banner was showing.
    pub fn skip_banner(&mut self) -> bool {
        if matches!(self.phase, Phase::Won { .. }) {
            self.finish_win();
            true
        } else {
            false
        }
    }

    /// Render offset for this frame's screen shake
    pub fn shake_offset(&mut self) -> Vec2 {
        self.shake.offset(&mut self.rng)
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn finish_win(&mut self) {
        self.reset_match();
        self.paused = false;
    }

    fn on_score(&mut self, scorer: Side) {
        self.scores[scorer.index()] += 1;
        let scores = self.scores;
        log::debug!("{} scores ({}-{})", scorer.name(), scores[0], scores[1]);

        emit_score_burst(
            &mut self.particles,
            Vec2::new((WIDTH as i32 / 2) as f32, (HEIGHT as i32 / 2) as f32),
            self.quality,
            &mut self.rng,
        );
        // Serve toward the side that lost the point
        self.ball.serve(Some(scorer.opponent().direction()), &mut self.rng);
        self.trail.clear();
        self.shake.raise(SCORE_SHAKE_SECS, SCORE_SHAKE);
        self.events.push(GameEvent::Scored { scorer, scores });

        if self.score_to_win > 0 && self.scores[scorer.index()] >= self.score_to_win {
            log::info!("{} wins {}-{}", scorer.name(), scores[0], scores[1]);
            self.phase = Phase::Won {
                winner: scorer,
                remaining: WIN_BANNER_SECS,
            };
            self.events.push(GameEvent::MatchWon { winner: scorer });
        }
    }
}

/// Advance the match by `dt` seconds (clamped to [`MAX_FRAME_DT`])
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    let dt = dt.min(MAX_FRAME_DT);
    if dt <= 0.0 {
        return;
    }

    if let Phase::Won { winner, remaining } = state.phase {
        // Board is frozen but effects keep fading
        update_particles(&mut state.particles, dt);
        state.shake.decay(dt);
        let remaining = remaining - dt;
        if remaining <= 0.0 {
            state.finish_win();
        } else {
            state.phase = Phase::Won { winner, remaining };
        }
        return;
    }

    state.left.speed = input.left;
    state.right.speed = if state.mode.right_is_ai() {
        ai_velocity(
            state.right.rect().center_y(),
            state.ball.rect().center_y(),
            state.difficulty,
        )
    } else {
        input.right
    };

    state.left.update(dt);
    state.right.update(dt);

    if !state.paused {
        state.ball.update(dt);
    }

    state.trail.record(state.ball.pos, dt);

    for paddle in [&mut state.left, &mut state.right] {
        let Some(hit) = paddle_collision(&mut state.ball, paddle) else {
            continue;
        };
        paddle.flash();
        emit_impact(
            &mut state.particles,
            hit.contact,
            -hit.side.direction(),
            state.quality,
            hit.strength,
            &mut state.rng,
        );
        state.shake.raise(
            HIT_SHAKE_SECS,
            (HIT_SHAKE_PER_STRENGTH * hit.strength).min(HIT_SHAKE_MAX),
        );
        state.events.push(GameEvent::PaddleHit {
            side: hit.side,
            strength: hit.strength,
        });
    }

    if let Some(scorer) = check_score(&state.ball) {
        state.on_score(scorer);
    }

    update_particles(&mut state.particles, dt);
    state.shake.decay(dt);
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const DT: f32 = 1.0 / FPS;

    fn two_player() -> GameState {
        GameState::new(Mode::TwoPlayer, &Settings::default(), 12345)
    }

    fn place_ball(state: &mut GameState, x: f32, y: f32, vx: f32, vy: f32) {
        state.ball.pos = Vec2::new(x, y);
        state.ball.vel = Vec2::new(vx, vy);
    }

    #[test]
    fn test_new_match_serves() {
        let state = two_player();
        assert_eq!(state.scores, [0, 0]);
        assert_eq!(state.phase, Phase::Playing);
        assert_eq!(state.ball.pos, Vec2::new(450.0, 300.0));
        assert!(state.ball.vel.x.abs() >= BALL_SPEED_START);
    }

    #[test]
    fn test_ball_frozen_while_paused() {
        let mut state = two_player();
        state.paused = true;
        let before = state.ball.pos;
        tick(&mut state, &TickInput { left: PADDLE_SPEED, right: 0.0 }, DT);
        assert_eq!(state.ball.pos, before);
        // Paddles keep moving
        assert!(state.left.y > 250.0);
    }

    #[test]
    fn test_paddle_hit_feedback() {
        let mut state = two_player();
        place_ball(&mut state, 40.0, 300.0, -300.0, 0.0);
        tick(&mut state, &TickInput::default(), DT);
        assert!(state.ball.vel.x > 0.0);
        assert!(state.left.flash_timer > 0.0);
        assert_eq!(state.particles.len(), 12);
        assert!(state.shake.magnitude > 0.0);
        let events = state.drain_events();
        assert!(matches!(events[..], [GameEvent::PaddleHit { side: Side::Left, .. }]));
        assert!(state.events.is_empty());
    }

    #[test]
    fn test_score_serves_toward_loser() {
        let mut state = two_player();
        tick(&mut state, &TickInput::default(), DT);
        assert!(!state.trail.is_empty());
        place_ball(&mut state, -20.0, 300.0, -300.0, 0.0);
        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.scores, [0, 1]);
        assert_eq!(state.ball.pos, Vec2::new(450.0, 300.0));
        assert!(state.ball.vel.x < 0.0);
        assert!(state.trail.is_empty());
        assert_eq!(state.shake.magnitude, SCORE_SHAKE);
        assert!(state.events.contains(&GameEvent::Scored {
            scorer: Side::Right,
            scores: [0, 1]
        }));

        place_ball(&mut state, 920.0, 300.0, 300.0, 0.0);
        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.scores, [1, 1]);
        assert!(state.ball.vel.x > 0.0);
    }

    #[test]
    fn test_win_banner_then_fresh_match() {
        let mut state = two_player();
        state.scores = [0, 4];
        state.paused = false;
        place_ball(&mut state, -20.0, 300.0, -300.0, 0.0);
        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.scores, [0, 5]);
        assert!(matches!(state.phase, Phase::Won { winner: Side::Right, .. }));
        assert!(state.events.contains(&GameEvent::MatchWon { winner: Side::Right }));

        // Frozen while the banner shows
        let frozen = state.ball.pos;
        for _ in 0..30 {
            tick(&mut state, &TickInput { left: PADDLE_SPEED, right: 0.0 }, 0.05);
        }
        assert!(matches!(state.phase, Phase::Won { .. }));
        assert_eq!(state.ball.pos, frozen);
        assert_eq!(state.left.y, 250.0);

        for _ in 0..10 {
            tick(&mut state, &TickInput::default(), 0.05);
        }
        assert_eq!(state.phase, Phase::Playing);
        assert_eq!(state.scores, [0, 0]);
    }

    #[test]
    fn test_effects_fade_during_banner() {
        let mut state = two_player();
        state.scores = [0, 4];
        place_ball(&mut state, -20.0, 300.0, -300.0, 0.0);
        tick(&mut state, &TickInput::default(), DT);
        assert!(matches!(state.phase, Phase::Won { .. }));
        assert_eq!(state.particles.len(), 48);
        assert!(state.shake.amplitude() > 0.0);

        for _ in 0..30 {
            tick(&mut state, &TickInput::default(), 0.05);
        }
        assert!(matches!(state.phase, Phase::Won { .. }));
        assert_eq!(state.shake.amplitude(), 0.0);
        let mut rng = Pcg32::seed_from_u64(1);
        assert_eq!(state.shake.offset(&mut rng), Vec2::ZERO);
        assert!(state.particles.is_empty());
    }

    #[test]
    fn test_skip_banner() {
        let mut state = two_player();
        assert!(!state.skip_banner());
        state.scores = [4, 0];
        state.paused = true;
        place_ball(&mut state, 920.0, 300.0, 300.0, 0.0);
        tick(&mut state, &TickInput::default(), DT);
        assert!(state.skip_banner());
        assert_eq!(state.scores, [0, 0]);
        assert!(!state.paused);
        assert_eq!(state.phase, Phase::Playing);
    }

    #[test]
    fn test_endless_play() {
        let mut state = two_player();
        state.score_to_win = 0;
        for _ in 0..7 {
            place_ball(&mut state, -20.0, 300.0, -300.0, 0.0);
            tick(&mut state, &TickInput::default(), DT);
        }
        assert_eq!(state.scores, [0, 7]);
        assert_eq!(state.phase, Phase::Playing);
    }

    #[test]
    fn test_single_player_right_follows_ball() {
        let mut state = GameState::new(Mode::SinglePlayer, &Settings::default(), 1);
        place_ball(&mut state, 450.0, 50.0, 0.0, 0.0);
        // Player input for the right paddle is ignored
        tick(&mut state, &TickInput { left: 0.0, right: PADDLE_SPEED }, DT);
        assert_eq!(state.right.speed, -PADDLE_SPEED);
        assert!(state.right.y < 250.0);
    }

    #[test]
    fn test_dt_is_clamped() {
        let mut state = two_player();
        place_ball(&mut state, 450.0, 300.0, 300.0, 0.0);
        tick(&mut state, &TickInput::default(), 2.0);
        assert!((state.ball.pos.x - (450.0 + 300.0 * MAX_FRAME_DT)).abs() < 1e-3);
        let before = state.ball.pos;
        tick(&mut state, &TickInput::default(), 0.0);
        assert_eq!(state.ball.pos, before);
    }

    #[test]
    fn test_shake_raise_and_decay() {
        let mut shake = ScreenShake::default();
        shake.raise(0.12, 6.0);
        shake.raise(0.05, 18.0);
        assert_eq!(shake, ScreenShake { timer: 0.12, magnitude: 18.0 });
        shake.decay(0.06);
        assert!((shake.amplitude() - 9.0).abs() < 1e-3);
        shake.decay(0.1);
        assert_eq!(shake, ScreenShake::default());
        let mut rng = Pcg32::seed_from_u64(0);
        assert_eq!(shake.offset(&mut rng), Vec2::ZERO);
    }

    #[test]
    fn test_frame_stats_ring_is_bounded() {
        let mut stats = FrameStats::default();
        for i in 0..500 {
            stats.record(1.0 / 144.0, i as f32, 1.0, 2.0);
        }
        assert_eq!(stats.samples(), MAX_FRAME_SAMPLES);
        assert_eq!(stats.avg_update_ms(), 1.0);
        assert_eq!(stats.avg_draw_ms(), 2.0);
        // Oldest samples dropped: mean of 300..500
        assert!((stats.avg_frame_ms() - 399.5).abs() < 1e-2);
        assert!((stats.fps - 144.0).abs() < 0.5);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_match_invariants(seed in any::<u64>(), steps in 100usize..600, left in -1.0f32..1.0) {
            let mut state = GameState::new(Mode::SinglePlayer, &Settings::default(), seed);
            state.score_to_win = 0;
            let input = TickInput { left: left * PADDLE_SPEED, right: 0.0 };
            for _ in 0..steps {
                let before: u32 = state.scores.iter().sum();
                tick(&mut state, &input, DT);
                let after: u32 = state.scores.iter().sum();
                prop_assert!(after - before <= 1);
                prop_assert!(state.ball.pos.y >= state.ball.half_size());
                prop_assert!(state.ball.pos.y <= HEIGHT - state.ball.half_size());
                prop_assert!(state.ball.speed() <= MAX_BALL_SPEED * 1.0001);
                prop_assert!(state.left.y >= 0.0 && state.left.y <= HEIGHT - PADDLE_HEIGHT as f32);
            }
        }

        #[test]
        fn prop_shake_offset_within_amplitude(timer in 0.0f32..0.3, magnitude in 0.0f32..30.0, seed in any::<u64>()) {
            let shake = ScreenShake { timer, magnitude };
            let mut rng = Pcg32::seed_from_u64(seed);
            let offset = shake.offset(&mut rng);
            let m = shake.amplitude();
            prop_assert!(offset.x.abs() <= m && offset.y.abs() <= m);
            prop_assert_eq!(offset.x, offset.x.trunc());
        }
    }
}
