pub mod draw;
pub mod proxy;
pub mod text;

use crate::common::Position;
use image::{imageops, ImageFormat::Png, ImageResult, Rgba, RgbaImage};
use rayon::prelude::*;
use std::io::Cursor;

pub use proxy::auto_proxy;

pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

pub fn points_to_pixels(points: f64, dpi: f64) -> f64 {
    points * dpi / 72.
}

/// A transparent scratch image covering part of a larger canvas. Shapes that
/// must be drawn translucent are drawn opaque here first, then blended onto
/// the canvas in one pass so overlapping parts of the same shape do not
/// stack their alpha.
pub struct Layer {
    pub image: RgbaImage,
    pub left: i64,
    pub top: i64,
}

impl Layer {
    /// Smallest layer holding every point plus `margin` pixels around it,
    /// clipped to a `canvas` of the given size. Nothing outside the canvas
    /// survives the blend, so it is never allocated.
    pub fn covering(points: &[Position], margin: f64, canvas: (u32, u32)) -> Layer {
        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for p in points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        if points.is_empty() || !(min_x <= max_x && min_y <= max_y) {
            return Layer {
                image: RgbaImage::new(1, 1),
                left: 0,
                top: 0,
            };
        }

        let (canvas_w, canvas_h) = (canvas.0 as f64, canvas.1 as f64);
        let left = (min_x - margin).floor().clamp(0., canvas_w);
        let top = (min_y - margin).floor().clamp(0., canvas_h);
        let right = (max_x + margin).ceil().clamp(0., canvas_w);
        let bottom = (max_y + margin).ceil().clamp(0., canvas_h);

        Layer {
            image: RgbaImage::new(((right - left) as u32).max(1), ((bottom - top) as u32).max(1)),
            left: left as i64,
            top: top as i64,
        }
    }

    /// Canvas position translated into this layer.
    pub fn local(&self, p: Position) -> Position {
        Position {
            x: p.x - self.left as f64,
            y: p.y - self.top as f64,
        }
    }
}

/// Blends `layer` onto `canvas` at `opacity`, clipping to the canvas.
pub fn overlay_layer(canvas: &mut RgbaImage, layer: &Layer, opacity: f32) {
    assert!((0.0..=1.0).contains(&opacity));
    let o_scale = opacity / 255f32;
    let opacity_inv = 1. - opacity;

    for (lx, ly, b_pixel) in layer.image.enumerate_pixels() {
        let x = layer.left + lx as i64;
        let y = layer.top + ly as i64;
        if x < 0 || y < 0 || x >= canvas.width() as i64 || y >= canvas.height() as i64 {
            continue;
        }

        // shapes are drawn fully opaque, so most pixels take the fast path
        let (o, inv_o) = match b_pixel[3] {
            255 => (opacity, opacity_inv),
            0 => continue,
            _ => {
                let o = b_pixel[3] as f32 * o_scale;
                (o, 1.0 - o)
            }
        };

        let a_pixel = canvas.get_pixel(x as u32, y as u32).0;
        let r = (a_pixel[0] as f32 * inv_o + b_pixel[0] as f32 * o) as u8;
        let g = (a_pixel[1] as f32 * inv_o + b_pixel[1] as f32 * o) as u8;
        let b = (a_pixel[2] as f32 * inv_o + b_pixel[2] as f32 * o) as u8;

        canvas.put_pixel(x as u32, y as u32, Rgba([r, g, b, a_pixel[3]]));
    }
}

/// Bounding box `(left, top, right, bottom)`, inclusive, of every pixel that
/// is not plain white. `None` for a blank image.
pub fn content_bounds(image: &RgbaImage) -> Option<(u32, u32, u32, u32)> {
    let width = image.width() as usize;
    if width == 0 {
        return None;
    }

    image
        .as_raw()
        .par_chunks(width * 4)
        .enumerate()
        .filter_map(|(y, row)| {
            let mut xs = row
                .chunks_exact(4)
                .enumerate()
                .filter(|(_, px)| px[..3] != [255, 255, 255])
                .map(|(x, _)| x as u32);
            let first = xs.next()?;
            let last = xs.last().unwrap_or(first);
            Some((first, y as u32, last, y as u32))
        })
        .reduce_with(|a, b| (a.0.min(b.0), a.1.min(b.1), a.2.max(b.2), a.3.max(b.3)))
}

/// Crops away the white margin, keeping `pad` pixels of it on every side.
pub fn tight_crop(image: &RgbaImage, pad: u32) -> RgbaImage {
    let Some((left, top, right, bottom)) = content_bounds(image) else {
        return image.clone();
    };

    let left = left.saturating_sub(pad);
    let top = top.saturating_sub(pad);
    let right = (right + pad).min(image.width() - 1);
    let bottom = (bottom + pad).min(image.height() - 1);

    imageops::crop_imm(image, left, top, right - left + 1, bottom - top + 1).to_image()
}

pub fn encode_png(image: &RgbaImage) -> ImageResult<Vec<u8>> {
    let mut buf = Vec::new();
    let mut cursor = Cursor::new(&mut buf);
    image.write_to(&mut cursor, Png)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlay_layer() {
        let mut canvas = RgbaImage::from_pixel(4, 4, WHITE);
        let mut layer = Layer {
            image: RgbaImage::new(3, 3),
            left: 2,
            top: 2,
        };
        layer.image.put_pixel(0, 0, Rgba([0, 0, 255, 255]));
        // lands outside the canvas
        layer.image.put_pixel(2, 2, Rgba([0, 0, 255, 255]));

        overlay_layer(&mut canvas, &layer, 0.5);

        assert_eq!(canvas.get_pixel(2, 2).0, [127, 127, 255, 255]);
        // transparent layer pixels leave the canvas alone
        assert_eq!(canvas.get_pixel(3, 3).0, [255, 255, 255, 255]);
        assert_eq!(canvas.get_pixel(0, 0).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_layer_covering() {
        let layer = Layer::covering(
            &[Position { x: 10.2, y: 5.0 }, Position { x: 20.0, y: 8.5 }],
            2.,
            (100, 100),
        );
        assert_eq!((layer.left, layer.top), (8, 3));
        assert_eq!(layer.image.dimensions(), (14, 8));
        let local = layer.local(Position { x: 10.2, y: 5.0 });
        assert!((local.x - 2.2).abs() < 1e-9 && (local.y - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_layer_covering_clips_to_canvas() {
        // a huge margin and a far away point stay within the canvas
        let layer = Layer::covering(
            &[Position { x: 10., y: 5. }, Position { x: 40., y: 1.0e12 }],
            1.0e9,
            (64, 48),
        );
        assert_eq!((layer.left, layer.top), (0, 0));
        assert_eq!(layer.image.dimensions(), (64, 48));

        // entirely off the canvas
        let layer = Layer::covering(&[Position { x: -500., y: -500. }], 3., (64, 48));
        assert_eq!((layer.left, layer.top), (0, 0));
        assert_eq!(layer.image.dimensions(), (1, 1));
    }

    #[test]
    fn test_tight_crop() {
        let mut image = RgbaImage::from_pixel(100, 50, WHITE);
        image.put_pixel(20, 10, Rgba([0, 0, 0, 255]));
        image.put_pixel(60, 30, Rgba([10, 200, 10, 255]));

        assert_eq!(content_bounds(&image), Some((20, 10, 60, 30)));

        let cropped = tight_crop(&image, 5);
        assert_eq!(cropped.dimensions(), (51, 31));
        assert_eq!(cropped.get_pixel(5, 5).0, [0, 0, 0, 255]);

        // padding never leaves the image
        let cropped = tight_crop(&image, 500);
        assert_eq!(cropped.dimensions(), (100, 50));

        let blank = RgbaImage::from_pixel(8, 8, WHITE);
        assert_eq!(content_bounds(&blank), None);
        assert_eq!(tight_crop(&blank, 1).dimensions(), (8, 8));
    }

    #[test]
    fn test_points_to_pixels() {
        assert_eq!(points_to_pixels(72., 300.), 300.);
        assert_eq!(points_to_pixels(12., 72.), 12.);
    }

    #[test]
    fn test_encode_png() {
        let image = RgbaImage::from_pixel(3, 2, WHITE);
        let bytes = encode_png(&image).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (3, 2));
    }
}
