use crate::common::{Coordinate, Position};
use crate::map::coastline::LAND_MASSES;
use crate::map::MapFrame;
use crate::util::draw::{fill_polygon, stroke_ring, stroke_segment};
use crate::util::points_to_pixels;
use crate::util::text::{draw_text_block, line_height, Align, TextStyle};
use ab_glyph::FontVec;
use image::{Rgba, RgbaImage};

pub const OCEAN: Rgba<u8> = Rgba([173, 232, 244, 255]); // #ADE8F4
pub const LAND: Rgba<u8> = Rgba([144, 190, 109, 255]); // #90BE6D
const COAST: Rgba<u8> = Rgba([128, 128, 128, 255]);
const INK: Rgba<u8> = Rgba([0, 0, 0, 255]);

// points
const COAST_WIDTH: f64 = 0.5;
const GRATICULE_WIDTH: f64 = 0.2;
const GRATICULE_DASH: f64 = 1.;
const BOUNDARY_WIDTH: f64 = 1.;
const GRATICULE_LABEL_SIZE: f64 = 10.;
const GRATICULE_LABEL_PAD: f64 = 4.;

// degrees, every 5
const PARALLELS: [f64; 5] = [0., 5., 10., 15., 20.];
const MERIDIANS: [f64; 9] = [105., 110., 115., 120., 125., 130., 135., 140., 145.];

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GraticuleAxis {
    /// a parallel, labelled left of the map
    Latitude,
    /// a meridian, labelled under the map
    Longitude,
}

#[derive(Clone, Debug)]
pub struct GraticuleLabel {
    pub axis: GraticuleAxis,
    pub text: String,
    /// where the line meets the map edge, relative to the map
    pub at: Position,
}

fn degree_text(value: f64, positive: char, negative: char) -> String {
    let hemisphere = if value > 0. {
        Some(positive)
    } else if value < 0. {
        Some(negative)
    } else {
        None
    };
    match hemisphere {
        Some(h) => format!("{}°{}", value.abs().round(), h),
        None => String::from("0°"),
    }
}

/// Graticule lines that fall on the map, with where their labels go.
pub fn graticule_labels(frame: &MapFrame) -> Vec<GraticuleLabel> {
    let [nw, se] = frame.bounds();
    let mut labels = Vec::new();

    for lat in PARALLELS.iter().filter(|lat| (se.lat..=nw.lat).contains(*lat)) {
        let at = frame.project(&Coordinate { lat: *lat, lon: nw.lon });
        labels.push(GraticuleLabel {
            axis: GraticuleAxis::Latitude,
            text: degree_text(*lat, 'N', 'S'),
            at,
        });
    }

    for lon in MERIDIANS.iter().filter(|lon| (nw.lon..=se.lon).contains(*lon)) {
        let at = frame.project(&Coordinate { lat: se.lat, lon: *lon });
        labels.push(GraticuleLabel {
            axis: GraticuleAxis::Longitude,
            text: degree_text(*lon, 'E', 'W'),
            at,
        });
    }

    labels
}

fn dashed_line(canvas: &mut RgbaImage, from: Position, to: Position, dash: f64, width: f64, color: Rgba<u8>) {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let length = (dx * dx + dy * dy).sqrt();
    if length < f64::EPSILON {
        return;
    }

    let mut t = 0.;
    while t < length {
        let end = (t + dash).min(length);
        let a = Position {
            x: from.x + dx * t / length,
            y: from.y + dy * t / length,
        };
        let b = Position {
            x: from.x + dx * end / length,
            y: from.y + dy * end / length,
        };
        stroke_segment(canvas, a, b, width, color);
        t += dash * 2.;
    }
}

/// Ocean, land, coastlines and the graticule, in a canvas the size of the
/// map itself. Everything outside the map region is cut off.
pub fn render_base_map(frame: &MapFrame, dpi: f64) -> RgbaImage {
    let (width, height) = frame.dimensions();
    let mut map = RgbaImage::from_pixel(width, height, OCEAN);

    let rings: Vec<Vec<Position>> = LAND_MASSES
        .iter()
        .map(|land| {
            land.outline
                .iter()
                .map(|(lon, lat)| frame.project(&Coordinate { lat: *lat, lon: *lon }))
                .collect()
        })
        .collect();

    for ring in &rings {
        fill_polygon(&mut map, ring, LAND);
    }
    let coast = points_to_pixels(COAST_WIDTH, dpi);
    for ring in &rings {
        stroke_ring(&mut map, ring, coast, COAST);
    }

    let (w, h) = (width as f64, height as f64);
    let dash = points_to_pixels(GRATICULE_DASH, dpi).max(1.);
    let line = points_to_pixels(GRATICULE_WIDTH, dpi);
    for label in graticule_labels(frame) {
        let (from, to) = match label.axis {
            GraticuleAxis::Latitude => (Position { x: 0., y: label.at.y }, Position { x: w, y: label.at.y }),
            GraticuleAxis::Longitude => (Position { x: label.at.x, y: 0. }, Position { x: label.at.x, y: h }),
        };
        dashed_line(&mut map, from, to, dash, line, INK);
    }

    let boundary = points_to_pixels(BOUNDARY_WIDTH, dpi);
    let corners = [
        Position { x: 0., y: 0. },
        Position { x: w - 1., y: 0. },
        Position { x: w - 1., y: h - 1. },
        Position { x: 0., y: h - 1. },
    ];
    stroke_ring(&mut map, &corners, boundary, INK);

    map
}

/// Degree labels around the map, drawn on the figure holding it.
pub fn paint_graticule_labels(figure: &mut RgbaImage, font: &FontVec, frame: &MapFrame, dpi: f64) {
    let size = points_to_pixels(GRATICULE_LABEL_SIZE, dpi);
    let pad = points_to_pixels(GRATICULE_LABEL_PAD, dpi);
    let rect = frame.rect;

    for label in graticule_labels(frame) {
        let (align, anchor) = match label.axis {
            GraticuleAxis::Latitude => (
                Align::Right,
                Position {
                    x: rect.left - pad,
                    y: rect.top + label.at.y + line_height(size) / 2.,
                },
            ),
            GraticuleAxis::Longitude => (
                Align::Center,
                Position {
                    x: rect.left + label.at.x,
                    y: rect.bottom() + pad + line_height(size),
                },
            ),
        };
        let style = TextStyle {
            size,
            color: INK,
            align,
            outline: None,
        };
        draw_text_block(figure, font, &label.text, anchor, &style);
    }
}
