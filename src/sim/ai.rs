//! Reactive AI opponent
//!
//! Tracks the ball's vertical position with a difficulty-dependent speed and
//! tolerance. No prediction: the paddle chases where the ball is now.

use crate::settings::Difficulty;

/// Paddle velocity that steers `paddle_center_y` toward `ball_center_y`.
///
/// Positive is down the screen. Inside the deadzone the paddle stops.
pub fn ai_velocity(paddle_center_y: i32, ball_center_y: i32, difficulty: Difficulty) -> f32 {
    let paddle = paddle_center_y as f32;
    let ball = ball_center_y as f32;
    let deadzone = difficulty.deadzone();
    let max = difficulty.max_speed();

    if paddle < ball - deadzone {
        max
    } else if paddle > ball + deadzone {
        -max
    } else {
        0.0
    }
}
