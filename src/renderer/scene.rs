//! Board geometry for one frame
//!
//! Everything is emitted in logical pixels (900x600, y down); the pipeline
//! maps it to NDC.

use glam::Vec2;

use super::shapes::{self, DISC_SEGMENTS};
use super::vertex::Vertex;
use crate::consts::{HEIGHT, WIDTH};
use crate::palette::{self, rgba};
use crate::sim::{GameState, Paddle};

/// Dash layout of the center line
const DASH_WIDTH: f32 = 4.0;
const DASH_HEIGHT: f32 = 20.0;
const DASH_SPACING: usize = 30;
const DASH_TOP_INSET: f32 = 5.0;

const TRAIL_RADIUS: f32 = 6.0;
const TRAIL_ALPHA: f32 = 200.0 / 255.0;
const PADDLE_CORNER_RADIUS: f32 = 6.0;

/// Dashed center line
pub fn center_line(out: &mut Vec<Vertex>) {
    let x = (WIDTH as i32 / 2) as f32 - DASH_WIDTH / 2.0;
    let color = rgba(palette::DARK, 1.0);
    for y in (0..HEIGHT as usize).step_by(DASH_SPACING) {
        shapes::rect(
            Vec2::new(x, y as f32 + DASH_TOP_INSET),
            Vec2::new(DASH_WIDTH, DASH_HEIGHT),
            color,
            out,
        );
    }
}

fn paddle(p: &Paddle, out: &mut Vec<Vertex>) {
    let r = p.rect();
    let color = palette::lerp(palette::WHITE, palette::ACCENT, p.flash_fraction());
    shapes::rounded_rect(
        Vec2::new(r.x as f32, r.y as f32),
        Vec2::new(r.w as f32, r.h as f32),
        PADDLE_CORNER_RADIUS,
        rgba(color, 1.0),
        out,
    );
}

/// All match geometry, shifted by the screen-shake `offset`
pub fn build(game: &GameState, offset: Vec2) -> Vec<Vertex> {
    let mut out = Vec::with_capacity(4096);

    center_line(&mut out);

    // Oldest samples first so fresh ones draw on top
    for sample in game.trail.iter().rev() {
        let f = game.trail.fade(sample);
        shapes::circle(
            sample.pos,
            TRAIL_RADIUS * (0.4 + 0.6 * f),
            rgba(palette::ACCENT, TRAIL_ALPHA * f),
            DISC_SEGMENTS,
            &mut out,
        );
    }

    paddle(&game.left, &mut out);
    paddle(&game.right, &mut out);

    let ball = game.ball.rect();
    shapes::circle(
        Vec2::new(ball.x as f32, ball.y as f32) + Vec2::splat(game.ball.half_size()),
        game.ball.half_size(),
        rgba(palette::ACCENT, 1.0),
        DISC_SEGMENTS,
        &mut out,
    );

    for p in &game.particles {
        if p.is_dead() {
            continue;
        }
        shapes::circle(p.pos, p.size.max(1.0), rgba(p.color, p.alpha()), 8, &mut out);
    }

    if offset != Vec2::ZERO {
        for v in out.iter_mut() {
            *v = v.translated(offset);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::Mode;

    fn bounds(vertices: &[Vertex]) -> (Vec2, Vec2) {
        vertices.iter().fold(
            (Vec2::splat(f32::MAX), Vec2::splat(f32::MIN)),
            |(lo, hi), v| {
                let p = Vec2::from(v.position);
                (lo.min(p), hi.max(p))
            },
        )
    }

    #[test]
    fn test_center_line_dashes() {
        let mut out = Vec::new();
        center_line(&mut out);
        // 0, 30, ... 570
        assert_eq!(out.len(), 20 * 6);
        let (lo, hi) = bounds(&out);
        assert_eq!(lo, Vec2::new(448.0, 5.0));
        assert_eq!(hi, Vec2::new(452.0, 595.0));
    }

    #[test]
    fn test_shake_offsets_every_vertex() {
        let game = GameState::new(Mode::TwoPlayer, &Settings::default(), 3);
        let still = build(&game, Vec2::ZERO);
        let shaken = build(&game, Vec2::new(3.0, -2.0));
        assert_eq!(still.len(), shaken.len());
        for (a, b) in still.iter().zip(&shaken) {
            assert_eq!(b.position[0], a.position[0] + 3.0);
            assert_eq!(b.position[1], a.position[1] - 2.0);
        }
    }

    #[test]
    fn test_flashing_paddle_takes_accent() {
        let mut game = GameState::new(Mode::TwoPlayer, &Settings::default(), 3);
        game.left.flash();
        let mut out = Vec::new();
        paddle(&game.left, &mut out);
        assert_eq!(out[0].color, rgba(palette::ACCENT, 1.0));
        out.clear();
        paddle(&game.right, &mut out);
        assert_eq!(out[0].color, rgba(palette::WHITE, 1.0));
    }
}
