//! Triangle-list geometry for 2D primitives

use glam::Vec2;
use std::f32::consts::TAU;

use super::vertex::Vertex;

/// Segments used for small discs (ball, trail, particles)
pub const DISC_SEGMENTS: u32 = 16;

/// Axis-aligned rectangle with top-left corner `min`
pub fn rect(min: Vec2, size: Vec2, color: [f32; 4], out: &mut Vec<Vertex>) {
    let max = min + size;
    let tl = Vertex::new(min.x, min.y, color);
    let tr = Vertex::new(max.x, min.y, color);
    let bl = Vertex::new(min.x, max.y, color);
    let br = Vertex::new(max.x, max.y, color);
    out.extend_from_slice(&[tl, bl, tr, tr, bl, br]);
}

/// Filled circle as a triangle fan
pub fn circle(center: Vec2, radius: f32, color: [f32; 4], segments: u32, out: &mut Vec<Vertex>) {
    let segments = segments.max(3);
    let point = |i: u32| {
        let theta = (i as f32 / segments as f32) * TAU;
        center + Vec2::new(theta.cos(), theta.sin()) * radius
    };
    out.reserve((segments * 3) as usize);
    for i in 0..segments {
        out.push(Vertex::at(center, color));
        out.push(Vertex::at(point(i), color));
        out.push(Vertex::at(point(i + 1), color));
    }
}

/// Rectangle with rounded corners (radius clamped to half the short side)
pub fn rounded_rect(min: Vec2, size: Vec2, radius: f32, color: [f32; 4], out: &mut Vec<Vertex>) {
    let r = radius.min(size.x * 0.5).min(size.y * 0.5).max(0.0);
    if r <= 0.0 {
        rect(min, size, color, out);
        return;
    }
    // Cross of two rects plus four corner discs
    rect(Vec2::new(min.x + r, min.y), Vec2::new(size.x - 2.0 * r, size.y), color, out);
    rect(Vec2::new(min.x, min.y + r), Vec2::new(size.x, size.y - 2.0 * r), color, out);
    let max = min + size;
    for corner in [
        Vec2::new(min.x + r, min.y + r),
        Vec2::new(max.x - r, min.y + r),
        Vec2::new(min.x + r, max.y - r),
        Vec2::new(max.x - r, max.y - r),
    ] {
        circle(corner, r, color, 8, out);
    }
}
