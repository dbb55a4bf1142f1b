use crate::common::Position;
use ab_glyph::{FontVec, PxScale};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};
use std::f64::consts::PI;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

// bold faces first, every label on the map is bold
const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Bold.ttf",
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "/Library/Fonts/Arial Bold.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
];

const LINE_SPACING: f64 = 1.2;

fn read_font(path: &Path) -> Option<FontVec> {
    let data = fs::read(path).ok()?;
    match FontVec::try_from_vec(data) {
        Ok(font) => Some(font),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "not a usable font file");
            None
        }
    }
}

/// Loads `preferred` if given, otherwise the first font found in the usual
/// system locations.
pub fn load_font(preferred: Option<&Path>) -> Option<FontVec> {
    if let Some(path) = preferred {
        if let Some(font) = read_font(path) {
            debug!(path = %path.display(), "loaded label font");
            return Some(font);
        }
        warn!(path = %path.display(), "configured font could not be loaded, searching system fonts");
    }

    let found = FONT_CANDIDATES
        .iter()
        .map(PathBuf::from)
        .find_map(|path| read_font(&path).map(|font| (path, font)));

    match found {
        Some((path, font)) => {
            debug!(path = %path.display(), "loaded label font");
            Some(font)
        }
        None => {
            warn!("no font found, the storm map will be drawn without text");
            None
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

#[derive(Copy, Clone, Debug)]
pub struct TextStyle {
    /// em size in pixels
    pub size: f64,
    pub color: Rgba<u8>,
    pub align: Align,
    /// halo color and its full width in pixels
    pub outline: Option<(Rgba<u8>, f64)>,
}

fn scale(size: f64) -> PxScale {
    PxScale::from(size as f32)
}

pub fn line_height(size: f64) -> f64 {
    size * LINE_SPACING
}

/// Width and height of a possibly multi-line block of text.
pub fn measure(font: &FontVec, size: f64, text: &str) -> (f64, f64) {
    let lines: Vec<&str> = text.lines().collect();
    let width = lines
        .iter()
        .map(|line| text_size(scale(size), font, line).0 as f64)
        .fold(0., f64::max);
    (width, lines.len() as f64 * line_height(size))
}

/// Draws `text` so that its bottom edge sits on `anchor.y`, and its left edge,
/// center or right edge on `anchor.x` depending on the alignment.
pub fn draw_text_block(canvas: &mut RgbaImage, font: &FontVec, text: &str, anchor: Position, style: &TextStyle) {
    let lines: Vec<&str> = text.lines().collect();
    let top = anchor.y - lines.len() as f64 * line_height(style.size);

    for (i, line) in lines.iter().enumerate() {
        let width = text_size(scale(style.size), font, line).0 as f64;
        let x = match style.align {
            Align::Left => anchor.x,
            Align::Center => anchor.x - width / 2.,
            Align::Right => anchor.x - width,
        };
        let y = top + i as f64 * line_height(style.size);

        if let Some((halo, halo_width)) = style.outline {
            for (dx, dy) in halo_offsets(halo_width / 2.) {
                draw_text_mut(
                    canvas,
                    halo,
                    (x + dx).round() as i32,
                    (y + dy).round() as i32,
                    scale(style.size),
                    font,
                    line,
                );
            }
        }

        draw_text_mut(
            canvas,
            style.color,
            x.round() as i32,
            y.round() as i32,
            scale(style.size),
            font,
            line,
        );
    }
}

/// Offsets that stamp a glyph around a disc of `radius`, which reads as a
/// stroke of twice that width once the glyph is drawn on top.
pub(crate) fn halo_offsets(radius: f64) -> Vec<(f64, f64)> {
    if radius < 0.5 {
        return vec![];
    }

    let mut offsets = Vec::new();
    let mut r = radius;
    while r > 0.25 {
        let steps = ((2. * PI * r).ceil() as usize).max(8);
        for k in 0..steps {
            let angle = 2. * PI * k as f64 / steps as f64;
            offsets.push((r * angle.cos(), r * angle.sin()));
        }
        r -= 1.;
    }
    offsets
}
