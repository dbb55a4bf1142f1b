use crate::common::Position;
use crate::map::PixelRect;
use image::{Rgba, RgbaImage};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_filled_rect_mut, draw_line_segment_mut, draw_polygon_mut,
};
use imageproc::point::Point;
use imageproc::rect::Rect;

// below this a stroke is drawn as a plain one pixel line
const HAIRLINE: f64 = 1.5;

fn to_point(p: &Position) -> Point<i32> {
    Point::new(p.x.round() as i32, p.y.round() as i32)
}

/// Fills a closed ring. The ring may repeat vertices or collapse to fewer
/// than three distinct points after rounding; both are handled.
pub fn fill_polygon(canvas: &mut RgbaImage, ring: &[Position], color: Rgba<u8>) {
    let mut points: Vec<Point<i32>> = Vec::with_capacity(ring.len());
    for p in ring {
        let p = to_point(p);
        if points.last() != Some(&p) {
            points.push(p);
        }
    }
    while points.len() > 1 && points.first() == points.last() {
        points.pop();
    }

    match points.len() {
        0 => {}
        1 => {
            let p = points[0];
            if p.x >= 0 && p.y >= 0 && (p.x as u32) < canvas.width() && (p.y as u32) < canvas.height() {
                canvas.put_pixel(p.x as u32, p.y as u32, color);
            }
        }
        2 => {
            let (a, b) = (points[0], points[1]);
            draw_line_segment_mut(canvas, (a.x as f32, a.y as f32), (b.x as f32, b.y as f32), color);
        }
        _ => draw_polygon_mut(canvas, &points, color),
    }
}

/// The four corners of a `width` wide stroke from `from` to `to`, extended by
/// half the width past both ends (square, projecting caps).
pub fn segment_outline(from: Position, to: Position, width: f64) -> Option<[Position; 4]> {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let length = (dx * dx + dy * dy).sqrt();
    if length < f64::EPSILON || !length.is_finite() {
        return None;
    }

    let half = width / 2.;
    let (ux, uy) = (dx / length * half, dy / length * half);
    let (nx, ny) = (-uy, ux);
    let start = Position {
        x: from.x - ux,
        y: from.y - uy,
    };
    let end = Position {
        x: to.x + ux,
        y: to.y + uy,
    };

    Some([
        Position {
            x: start.x + nx,
            y: start.y + ny,
        },
        Position {
            x: end.x + nx,
            y: end.y + ny,
        },
        Position {
            x: end.x - nx,
            y: end.y - ny,
        },
        Position {
            x: start.x - nx,
            y: start.y - ny,
        },
    ])
}

pub fn stroke_segment(canvas: &mut RgbaImage, from: Position, to: Position, width: f64, color: Rgba<u8>) {
    if width <= HAIRLINE {
        draw_line_segment_mut(
            canvas,
            (from.x as f32, from.y as f32),
            (to.x as f32, to.y as f32),
            color,
        );
        return;
    }

    if let Some(outline) = segment_outline(from, to, width) {
        fill_polygon(canvas, &outline, color);
    }
}

pub fn stroke_ring(canvas: &mut RgbaImage, ring: &[Position], width: f64, color: Rgba<u8>) {
    for (i, from) in ring.iter().enumerate() {
        let to = ring[(i + 1) % ring.len()];
        stroke_segment(canvas, *from, to, width, color);
    }
}

pub fn fill_circle(canvas: &mut RgbaImage, center: Position, radius: f64, color: Rgba<u8>) {
    let radius = radius.round().max(1.) as i32;
    draw_filled_circle_mut(
        canvas,
        (center.x.round() as i32, center.y.round() as i32),
        radius,
        color,
    );
}

pub fn fill_rect(canvas: &mut RgbaImage, rect: &PixelRect, color: Rgba<u8>) {
    let width = rect.width.round().max(1.) as u32;
    let height = rect.height.round().max(1.) as u32;
    let rect = Rect::at(rect.left.round() as i32, rect.top.round() as i32).of_size(width, height);
    draw_filled_rect_mut(canvas, rect, color);
}
