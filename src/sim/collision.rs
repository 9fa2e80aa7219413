//! Collision detection and response
//!
//! Ball vs paddle uses the integer render rects with strict overlap. The
//! response pushes the ball out to the paddle face, points it away from the
//! paddle, adds spin from the hit offset and scales the speed up to the cap.

use glam::Vec2;

use super::state::{Ball, Paddle, Side};
use crate::consts::*;

/// Speed range mapped onto impact strength
const STRENGTH_REFERENCE_SPEED: f32 = 300.0;
const MIN_STRENGTH: f32 = 0.8;
const MAX_STRENGTH: f32 = 3.0;

/// Result of a ball hitting a paddle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaddleHit {
    /// Paddle that was hit
    pub side: Side,
    /// Point on the paddle face level with the ball center
    pub contact: Vec2,
    /// Ball speed after deflection, before the speed-up
    pub speed: f32,
    /// Clamped feedback strength (drives particles and shake)
    pub strength: f32,
}

/// Resolve a ball/paddle overlap, returning the hit when one happened
pub fn paddle_collision(ball: &mut Ball, paddle: &Paddle) -> Option<PaddleHit> {
    let paddle_rect = paddle.rect();
    if !ball.rect().intersects(&paddle_rect) {
        return None;
    }

    let half = ball.half_size();
    let face = match paddle.side {
        Side::Left => {
            ball.pos.x = paddle_rect.right() as f32 + half;
            ball.vel.x = ball.vel.x.abs();
            paddle_rect.right()
        }
        Side::Right => {
            ball.pos.x = paddle_rect.left() as f32 - half;
            ball.vel.x = -ball.vel.x.abs();
            paddle_rect.left()
        }
    };

    let offset = (ball.rect().center_y() - paddle_rect.center_y()) as f32
        / (paddle.height as f32 / 2.0);
    ball.vel.y += offset.clamp(-1.0, 1.0) * DEFLECTION;

    let speed = ball.speed();
    scale_speed(&mut ball.vel, speed);

    Some(PaddleHit {
        side: paddle.side,
        contact: Vec2::new(face as f32, ball.rect().center_y() as f32),
        speed,
        strength: impact_strength(speed),
    })
}

/// Grow the velocity by the hit factor without ever passing the speed cap
fn scale_speed(vel: &mut Vec2, speed: f32) {
    if speed <= 0.0 {
        return;
    }
    let factor = if speed < MAX_BALL_SPEED {
        ball_growth().min(MAX_BALL_SPEED / speed)
    } else {
        MAX_BALL_SPEED / speed
    };
    *vel *= factor;
}

/// Feedback strength of a hit at `speed`
pub fn impact_strength(speed: f32) -> f32 {
    (speed / STRENGTH_REFERENCE_SPEED).clamp(MIN_STRENGTH, MAX_STRENGTH)
}

/// Side that scored, once the ball has fully left the board
pub fn check_score(ball: &Ball) -> Option<Side> {
    let rect = ball.rect();
    if rect.right() < 0 {
        Some(Side::Right)
    } else if rect.left() > WIDTH as i32 {
        Some(Side::Left)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ball_at(x: f32, y: f32, vx: f32, vy: f32) -> Ball {
        let mut ball = Ball::new();
        ball.pos = Vec2::new(x, y);
        ball.vel = Vec2::new(vx, vy);
        ball
    }

    #[test]
    fn test_left_paddle_pushes_ball_out() {
        let paddle = Paddle::new(Side::Left);
        let mut ball = ball_at(35.0, 300.0, -300.0, 0.0);
        let hit = paddle_collision(&mut ball, &paddle).unwrap();
        assert_eq!(hit.side, Side::Left);
        assert_eq!(ball.pos.x, 39.0);
        assert!(ball.vel.x > 0.0);
        // Centered hit adds no spin
        assert_eq!(ball.vel.y, 0.0);
        assert!((ball.speed() - 300.0 * ball_growth()).abs() < 1e-3);
        assert!(!ball.rect().intersects(&paddle.rect()));
    }

    #[test]
    fn test_right_paddle_mirrors() {
        let paddle = Paddle::new(Side::Right);
        let mut ball = ball_at(866.0, 260.0, 400.0, 0.0);
        let hit = paddle_collision(&mut ball, &paddle).unwrap();
        assert_eq!(ball.pos.x, 861.0);
        assert!(ball.vel.x < 0.0);
        // Upper half of the paddle deflects upward
        assert!(ball.vel.y < 0.0);
        assert_eq!(hit.contact, Vec2::new(868.0, 260.0));
    }

    #[test]
    fn test_no_hit_when_apart() {
        let paddle = Paddle::new(Side::Left);
        let mut ball = ball_at(450.0, 300.0, -300.0, 0.0);
        assert!(paddle_collision(&mut ball, &paddle).is_none());
        assert_eq!(ball.vel, Vec2::new(-300.0, 0.0));
    }

    #[test]
    fn test_speed_is_capped() {
        let paddle = Paddle::new(Side::Left);
        let mut ball = ball_at(35.0, 300.0, -1180.0, 0.0);
        paddle_collision(&mut ball, &paddle).unwrap();
        assert!((ball.speed() - MAX_BALL_SPEED).abs() < 1e-2);

        let mut fast = ball_at(35.0, 300.0, -2000.0, 0.0);
        let hit = paddle_collision(&mut fast, &paddle).unwrap();
        assert!((fast.speed() - MAX_BALL_SPEED).abs() < 1e-2);
        assert_eq!(hit.strength, 3.0);
    }

    #[test]
    fn test_impact_strength_clamps() {
        assert_eq!(impact_strength(0.0), 0.8);
        assert_eq!(impact_strength(600.0), 2.0);
        assert_eq!(impact_strength(5000.0), 3.0);
    }

    #[test]
    fn test_score_sides() {
        assert_eq!(check_score(&ball_at(-8.0, 300.0, -300.0, 0.0)), Some(Side::Right));
        assert_eq!(check_score(&ball_at(-6.0, 300.0, -300.0, 0.0)), None);
        assert_eq!(check_score(&ball_at(908.0, 300.0, 300.0, 0.0)), Some(Side::Left));
        assert_eq!(check_score(&ball_at(907.0, 300.0, 300.0, 0.0)), None);
        assert_eq!(check_score(&ball_at(450.0, 300.0, 300.0, 0.0)), None);
    }

    proptest! {
        #[test]
        fn prop_hit_points_away_and_respects_cap(
            dy in -55i32..55,
            vx in 50.0f32..3000.0,
            vy in -1500.0f32..1500.0,
            left in any::<bool>(),
        ) {
            let side = if left { Side::Left } else { Side::Right };
            let paddle = Paddle::new(side);
            let rect = paddle.rect();
            // Overlap the paddle face from the board side
            let (x, incoming) = match side {
                Side::Left => (rect.right() as f32 + 3.0, -vx),
                Side::Right => (rect.left() as f32 - 3.0, vx),
            };
            let mut ball = ball_at(x, (rect.center_y() + dy) as f32, incoming, vy);
            let hit = paddle_collision(&mut ball, &paddle).unwrap();
            match side {
                Side::Left => prop_assert!(ball.vel.x > 0.0),
                Side::Right => prop_assert!(ball.vel.x < 0.0),
            }
            let after = ball.speed();
            prop_assert!(after <= MAX_BALL_SPEED * 1.0001);
            prop_assert!(after <= hit.speed * ball_growth() * 1.0001);
            prop_assert!((0.8..=3.0).contains(&hit.strength));
        }
    }
}
