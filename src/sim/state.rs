//! Entities and their kinematics
//!
//! Positions are continuous floats; collision uses integer-rounded render rects.

use std::collections::VecDeque;

use glam::Vec2;
use rand::Rng;

use crate::consts::*;

/// Which side of the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn index(self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => 1,
        }
    }

    pub fn opponent(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    /// Horizontal direction pointing toward this side (-1 = left)
    pub fn direction(self) -> f32 {
        match self {
            Side::Left => -1.0,
            Side::Right => 1.0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Side::Left => "Left",
            Side::Right => "Right",
        }
    }
}

/// Integer axis-aligned rectangle (render/collision bounds)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Rectangle of size `w`x`h` centered on `(cx, cy)`
    pub fn from_center(cx: i32, cy: i32, w: i32, h: i32) -> Self {
        Self::new(cx - w / 2, cy - h / 2, w, h)
    }

    pub fn left(&self) -> i32 {
        self.x
    }

    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    pub fn top(&self) -> i32 {
        self.y
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    pub fn center_x(&self) -> i32 {
        self.x + self.w / 2
    }

    pub fn center_y(&self) -> i32 {
        self.y + self.h / 2
    }

    /// Strict overlap (touching edges do not count)
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }
}

/// A player paddle
#[derive(Debug, Clone)]
pub struct Paddle {
    pub side: Side,
    /// Fixed horizontal position (left edge)
    pub x: i32,
    /// Continuous vertical position (top edge)
    pub y: f32,
    pub width: i32,
    pub height: i32,
    /// Vertical velocity (px/s, positive = down)
    pub speed: f32,
    /// Remaining hit glow (seconds)
    pub flash_timer: f32,
}

impl Paddle {
    pub fn new(side: Side) -> Self {
        let x = match side {
            Side::Left => PADDLE_MARGIN,
            Side::Right => WIDTH as i32 - PADDLE_MARGIN - PADDLE_WIDTH,
        };
        Self {
            side,
            x,
            y: (HEIGHT as i32 / 2 - PADDLE_HEIGHT / 2) as f32,
            width: PADDLE_WIDTH,
            height: PADDLE_HEIGHT,
            speed: 0.0,
            flash_timer: 0.0,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y as i32, self.width, self.height)
    }

    /// Integrate position. Clamping stops the paddle at the board edge but keeps its velocity.
    pub fn update(&mut self, dt: f32) {
        self.y += self.speed * dt;
        let max_y = HEIGHT - self.height as f32;
        self.y = self.y.clamp(0.0, max_y);
        if self.flash_timer > 0.0 {
            self.flash_timer = (self.flash_timer - dt).max(0.0);
        }
    }

    pub fn flash(&mut self) {
        self.flash_timer = PADDLE_FLASH_SECS;
    }

    /// Glow strength 0-1 for rendering
    pub fn flash_fraction(&self) -> f32 {
        (self.flash_timer / PADDLE_FLASH_SECS).clamp(0.0, 1.0)
    }
}

/// The ball
#[derive(Debug, Clone)]
pub struct Ball {
    /// Center position
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: i32,
}

impl Ball {
    /// A ball at the board center with no velocity; call [`Ball::serve`] to launch it
    pub fn new() -> Self {
        Self {
            pos: Self::center(),
            vel: Vec2::ZERO,
            size: BALL_SIZE,
        }
    }

    fn center() -> Vec2 {
        Vec2::new((WIDTH as i32 / 2) as f32, (HEIGHT as i32 / 2) as f32)
    }

    pub fn half_size(&self) -> f32 {
        self.size as f32 / 2.0
    }

    pub fn rect(&self) -> Rect {
        Rect::from_center(self.pos.x as i32, self.pos.y as i32, self.size, self.size)
    }

    pub fn speed(&self) -> f32 {
        self.vel.length()
    }

    /// Reset to the center with a randomized trajectory.
    ///
    /// `direction` is -1 (toward the left side) or 1 (toward the right); `None` picks one.
    pub fn serve<R: Rng>(&mut self, direction: Option<f32>, rng: &mut R) {
        self.pos = Self::center();
        let angle: f32 = rng.random_range(-0.5..0.5);
        let direction = direction.unwrap_or_else(|| if rng.random_bool(0.5) { 1.0 } else { -1.0 });
        self.vel = Vec2::new(
            direction.signum() * BALL_SPEED_START * (1.0 + angle.abs()),
            BALL_SPEED_START * angle * 2.0,
        );
    }

    /// Integrate position and bounce off the top and bottom walls
    pub fn update(&mut self, dt: f32) {
        self.pos += self.vel * dt;
        let half = self.half_size();
        if self.pos.y - half <= 0.0 {
            self.pos.y = half;
            self.vel.y = self.vel.y.abs();
        } else if self.pos.y + half >= HEIGHT {
            self.pos.y = HEIGHT - half;
            self.vel.y = -self.vel.y.abs();
        }
    }
}

impl Default for Ball {
    fn default() -> Self {
        Self::new()
    }
}

/// Trail sample for ball rendering
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailSample {
    pub pos: Vec2,
    /// Seconds since recorded
    pub age: f32,
}

/// Recent ball positions (newest first), used only for the fading tail
#[derive(Debug, Clone)]
pub struct Trail {
    samples: VecDeque<TrailSample>,
    /// Lifetime of one sample (seconds)
    pub life: f32,
}

impl Trail {
    pub fn new(life: f32) -> Self {
        Self {
            samples: VecDeque::new(),
            life,
        }
    }

    /// Record the current ball position and age out old samples
    pub fn record(&mut self, pos: Vec2, dt: f32) {
        self.samples.push_front(TrailSample { pos, age: 0.0 });
        for s in self.samples.iter_mut() {
            s.age += dt;
        }
        let life = self.life;
        self.samples.retain(|s| s.age < life);
        let cap = (life / dt.max(1e-6) + 1.0) as usize;
        self.samples.truncate(cap);
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &TrailSample> {
        self.samples.iter()
    }

    /// Fade fraction of a sample (1 = fresh, 0 = expired)
    pub fn fade(&self, sample: &TrailSample) -> f32 {
        (1.0 - sample.age / self.life.max(1e-6)).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_rect_overlap_is_strict() {
        let a = Rect::new(0, 0, 10, 10);
        assert!(a.intersects(&Rect::new(9, 9, 5, 5)));
        assert!(!a.intersects(&Rect::new(10, 0, 5, 5)));
        assert!(!a.intersects(&Rect::new(0, 10, 5, 5)));
        assert_eq!(Rect::from_center(450, 300, 14, 14), Rect::new(443, 293, 14, 14));
    }

    #[test]
    fn test_paddle_starting_positions() {
        let left = Paddle::new(Side::Left);
        let right = Paddle::new(Side::Right);
        assert_eq!(left.rect(), Rect::new(20, 250, 12, 100));
        assert_eq!(right.rect(), Rect::new(868, 250, 12, 100));
    }

    #[test]
    fn test_paddle_clamp_keeps_velocity() {
        let mut p = Paddle::new(Side::Left);
        p.speed = -PADDLE_SPEED;
        p.update(5.0);
        assert_eq!(p.y, 0.0);
        assert_eq!(p.speed, -PADDLE_SPEED);
        p.speed = PADDLE_SPEED;
        p.update(5.0);
        assert_eq!(p.y, HEIGHT - PADDLE_HEIGHT as f32);
    }

    #[test]
    fn test_flash_decays_to_zero() {
        let mut p = Paddle::new(Side::Right);
        p.flash();
        assert_eq!(p.flash_fraction(), 1.0);
        p.update(0.05);
        assert!(p.flash_timer > 0.0 && p.flash_timer < PADDLE_FLASH_SECS);
        p.update(1.0);
        assert_eq!(p.flash_timer, 0.0);
    }

    #[test]
    fn test_serve_heads_requested_way() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut ball = Ball::new();
        for _ in 0..50 {
            ball.serve(Some(-1.0), &mut rng);
            assert!(ball.vel.x < 0.0);
            assert_eq!(ball.pos, Vec2::new(450.0, 300.0));
            assert!(ball.vel.x.abs() >= BALL_SPEED_START);
            assert!(ball.vel.y.abs() <= BALL_SPEED_START);
            ball.serve(Some(1.0), &mut rng);
            assert!(ball.vel.x > 0.0);
        }
    }

    #[test]
    fn test_ball_bounces_off_top() {
        let mut ball = Ball::new();
        ball.pos = Vec2::new(300.0, 10.0);
        ball.vel = Vec2::new(0.0, -400.0);
        ball.update(0.02);
        assert_eq!(ball.pos.y, 7.0);
        assert_eq!(ball.vel.y, 400.0);
        // Next frame moves away without flipping again
        ball.update(0.001);
        assert_eq!(ball.vel.y, 400.0);
    }

    #[test]
    fn test_trail_ages_and_caps() {
        let mut trail = Trail::new(0.25);
        for i in 0..100 {
            trail.record(Vec2::new(i as f32, 0.0), 1.0 / 144.0);
        }
        assert!(trail.len() <= (0.25 * 144.0 + 1.0) as usize);
        let newest = trail.iter().next().unwrap();
        assert_eq!(newest.pos.x, 99.0);
        assert!(trail.iter().all(|s| s.age < 0.25));
        trail.clear();
        assert!(trail.is_empty());
    }

    proptest! {
        #[test]
        fn prop_paddle_stays_on_board(y in -2000.0f32..2000.0, speed in -5000.0f32..5000.0, dt in 0.0001f32..1.0) {
            let mut p = Paddle::new(Side::Left);
            p.y = y;
            p.speed = speed;
            p.update(dt);
            prop_assert!(p.y >= 0.0);
            prop_assert!(p.y <= HEIGHT - PADDLE_HEIGHT as f32);
        }

        #[test]
        fn prop_ball_stays_between_walls(y in 7.0f32..593.0, vy in -3000.0f32..3000.0, dt in 0.0001f32..0.05) {
            let mut ball = Ball::new();
            ball.pos.y = y;
            ball.vel = Vec2::new(100.0, vy);
            let before = ball.vel.y.signum();
            ball.update(dt);
            prop_assert!(ball.pos.y >= ball.half_size());
            prop_assert!(ball.pos.y <= HEIGHT - ball.half_size());
            // At most one reflection per frame
            let after = ball.vel.y.signum();
            prop_assert!(ball.vel.y.abs() == vy.abs());
            prop_assert!(before == after || before == -after);
        }
    }
}
