//! The four-armed cyclone glyph drawn at both ends of a track.

use crate::common::Position;
use std::f64::consts::PI;

/// Samples along each spiral arm.
pub const SPIRAL_SAMPLES: usize = 150;
const ARM_ANGLES: [f64; 4] = [0., 90., 180., 270.];
const SPIRAL_TURNS: f64 = 8. * PI;

/// Vertices of four copies of one spiral, each turned a further 90 degrees.
/// The radius grows linearly from the center to `size` over four full turns.
/// `rotation` is in degrees, counter-clockwise as seen on a north-up map;
/// the y axis is flipped for the canvas.
pub fn typhoon_symbol(center: Position, size: f64, rotation: f64) -> Vec<Position> {
    let spiral: Vec<(f64, f64)> = (0..SPIRAL_SAMPLES)
        .map(|i| {
            let theta = SPIRAL_TURNS * i as f64 / (SPIRAL_SAMPLES - 1) as f64;
            let r = size * theta / SPIRAL_TURNS;
            (r * theta.cos(), r * theta.sin())
        })
        .collect();

    let mut vertices = Vec::with_capacity(SPIRAL_SAMPLES * ARM_ANGLES.len());
    for angle in ARM_ANGLES {
        let (sin, cos) = (angle + rotation).to_radians().sin_cos();
        for (x, y) in &spiral {
            let rot_x = x * cos - y * sin;
            let rot_y = x * sin + y * cos;
            vertices.push(Position {
                x: center.x + rot_x,
                y: center.y - rot_y,
            });
        }
    }

    vertices
}

/// The glyph is stroked as alternating short dashes: vertices (0, 1),
/// (2, 3), and so on. Arms hold an even number of samples, so no dash
/// bridges two arms.
pub fn glyph_strokes(vertices: &[Position]) -> impl Iterator<Item = (Position, Position)> + '_ {
    vertices.chunks_exact(2).map(|pair| (pair[0], pair[1]))
}
