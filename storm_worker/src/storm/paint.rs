use crate::common::Position;
use crate::map::{MapFrame, PixelRect};
use crate::storm::layout::{GlyphPass, Marker, RenderedTrack, StormScene};
use crate::storm::style::*;
use crate::storm::symbol::{glyph_strokes, typhoon_symbol};
use crate::util::draw::{fill_circle, fill_rect, stroke_segment};
use crate::util::text::{draw_text_block, line_height, measure, Align, TextStyle};
use crate::util::{overlay_layer, points_to_pixels, Layer, WHITE};
use ab_glyph::FontVec;
use image::{Rgba, RgbaImage};

// legend metrics, in multiples of the font size
const LEGEND_BORDER_PAD: f64 = 0.4;
const LEGEND_HANDLE_LENGTH: f64 = 2.;
const LEGEND_HANDLE_PAD: f64 = 0.8;
/// legend anchor inside the axes, as a fraction from the top-right corner
const LEGEND_INSET: f64 = 0.01;
/// gap between the axes and the annotation, as a fraction of the axes height
const ANNOTATION_DROP: f64 = 0.07;

/// Draws every track onto `map`, a canvas the size of `frame`.
pub fn paint_tracks(map: &mut RgbaImage, scene: &StormScene, frame: &MapFrame, dpi: f64) {
    for track in &scene.tracks {
        paint_segments(map, track, dpi);
        for marker in &track.markers {
            paint_marker(map, marker, track.color, dpi);
        }
        for glyph in &track.glyphs {
            paint_glyph(map, glyph, track.color, frame, dpi);
        }
    }
}

fn paint_segments(map: &mut RgbaImage, track: &RenderedTrack, dpi: f64) {
    if track.segments.is_empty() {
        return;
    }

    let widest = track
        .segments
        .iter()
        .map(|s| points_to_pixels(s.width, dpi))
        .fold(0., f64::max);
    let mut layer = Layer::covering(&track.points, widest + 2., map.dimensions());

    for segment in &track.segments {
        let from = layer.local(segment.from);
        let to = layer.local(segment.to);
        stroke_segment(&mut layer.image, from, to, points_to_pixels(segment.width, dpi), track.color);
    }

    overlay_layer(map, &layer, TRACK_ALPHA);
}

fn paint_marker(map: &mut RgbaImage, marker: &Marker, color: Rgba<u8>, dpi: f64) {
    let outer = points_to_pixels(marker.outer, dpi) / 2.;
    let edge = points_to_pixels(MARKER_EDGE, dpi) / 2.;

    // the edge straddles the marker outline
    fill_circle(map, marker.center, outer + edge, color);
    fill_circle(map, marker.center, (outer - edge).max(0.5), WHITE);
    fill_circle(map, marker.center, points_to_pixels(marker.inner, dpi) / 2., color);
}

fn paint_glyph(map: &mut RgbaImage, glyph: &GlyphPass, color: Rgba<u8>, frame: &MapFrame, dpi: f64) {
    let size = frame.distance_to_pixels(glyph.size);
    let vertices = typhoon_symbol(glyph.center, size, glyph.rotation);
    let width = points_to_pixels(glyph.width, dpi);

    let mut layer = Layer::covering(&vertices, width + 2., map.dimensions());
    for (from, to) in glyph_strokes(&vertices) {
        let (from, to) = (layer.local(from), layer.local(to));
        stroke_segment(&mut layer.image, from, to, width, color);
    }

    overlay_layer(map, &layer, glyph.alpha.clamp(0., 1.));
}

/// Start and end labels, drawn on the whole figure so they are not cut at
/// the map edge.
pub fn paint_labels(figure: &mut RgbaImage, font: &FontVec, scene: &StormScene, frame: &MapFrame, dpi: f64) {
    for track in &scene.tracks {
        for label in &track.labels {
            let anchor = Position {
                x: frame.rect.left + label.anchor.x,
                y: frame.rect.top + label.anchor.y,
            };
            let style = TextStyle {
                size: points_to_pixels(label.size, dpi),
                color: track.color,
                align: label.align,
                outline: Some((WHITE, points_to_pixels(label.outline, dpi))),
            };
            draw_text_block(figure, font, &label.text, anchor, &style);
        }
    }
}

/// Legend box in the upper right corner of the map. Nothing is drawn for an
/// empty legend.
pub fn paint_legend(figure: &mut RgbaImage, font: &FontVec, scene: &StormScene, frame: &MapFrame, dpi: f64) {
    if scene.legend.is_empty() {
        return;
    }

    let size = points_to_pixels(LEGEND_SIZE, dpi);
    let row = line_height(size);
    let pad = LEGEND_BORDER_PAD * size;
    let handle = LEGEND_HANDLE_LENGTH * size;
    let handle_pad = LEGEND_HANDLE_PAD * size;

    let text_width = scene
        .legend
        .iter()
        .map(|entry| measure(font, size, &entry.text).0)
        .fold(0., f64::max);

    let width = pad * 2. + handle + handle_pad + text_width;
    let height = pad * 2. + row * scene.legend.len() as f64;
    let right = frame.rect.right() - LEGEND_INSET * frame.rect.width;
    let top = frame.rect.top + LEGEND_INSET * frame.rect.height;
    let rect = PixelRect {
        left: right - width,
        top,
        width,
        height,
    };

    paint_box(figure, &rect, LEGEND_ALPHA);

    let line_width = points_to_pixels(LEGEND_LINE_WIDTH, dpi);
    for (i, entry) in scene.legend.iter().enumerate() {
        let row_top = rect.top + pad + row * i as f64;
        let mid = row_top + row / 2.;
        let handle_left = rect.left + pad;
        stroke_segment(
            figure,
            Position { x: handle_left, y: mid },
            Position {
                x: handle_left + handle,
                y: mid,
            },
            line_width,
            entry.color,
        );

        let style = TextStyle {
            size,
            color: Rgba([0, 0, 0, 255]),
            align: Align::Left,
            outline: None,
        };
        let anchor = Position {
            x: handle_left + handle + handle_pad,
            y: row_top + row,
        };
        draw_text_block(figure, font, &entry.text, anchor, &style);
    }
}

/// The explanatory note centered under the map.
pub fn paint_annotation(figure: &mut RgbaImage, font: &FontVec, frame: &MapFrame, dpi: f64) {
    let size = points_to_pixels(ANNOTATION_SIZE, dpi);
    let pad = points_to_pixels(ANNOTATION_PAD, dpi);
    let (width, height) = measure(font, size, ANNOTATION);

    let top = frame.rect.bottom() + ANNOTATION_DROP * frame.rect.height;
    let center = frame.rect.center_x();
    let rect = PixelRect {
        left: center - width / 2. - pad,
        top: top - pad,
        width: width + pad * 2.,
        height: height + pad * 2.,
    };
    paint_box(figure, &rect, LEGEND_ALPHA);

    let style = TextStyle {
        size,
        color: Rgba([0, 0, 0, 255]),
        align: Align::Center,
        outline: None,
    };
    draw_text_block(figure, font, ANNOTATION, Position { x: center, y: top + height }, &style);
}

fn paint_box(figure: &mut RgbaImage, rect: &PixelRect, opacity: f32) {
    let corners = [
        Position {
            x: rect.left,
            y: rect.top,
        },
        Position {
            x: rect.right(),
            y: rect.bottom(),
        },
    ];
    let mut layer = Layer::covering(&corners, 0., figure.dimensions());
    let local = PixelRect {
        left: rect.left - layer.left as f64,
        top: rect.top - layer.top as f64,
        ..*rect
    };
    fill_rect(&mut layer.image, &local, WHITE);
    overlay_layer(figure, &layer, opacity);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::PHILIPPINES;
    use crate::storm::layout::layout_scene;
    use serde_json::json;

    const OCEAN: Rgba<u8> = Rgba([173, 232, 244, 255]);

    fn frame() -> MapFrame {
        MapFrame::fit(
            PHILIPPINES,
            PixelRect {
                left: 0.,
                top: 0.,
                width: 480.,
                height: 330.,
            },
        )
    }

    #[test]
    fn test_paint_tracks_marks_the_map() {
        let frame = frame();
        let events = vec![json!({
            "title": "Typhoon Test",
            "geometry": [
                {"magnitudeValue": 130, "date": "2024-10-20T00:00:00Z", "coordinates": [135.0, 12.0]},
                {"magnitudeValue": 40, "date": "2024-10-20T06:00:00Z", "coordinates": [128.0, 14.0]}
            ]
        })];
        let scene = layout_scene(&events, &frame).unwrap();
        let (width, height) = frame.dimensions();
        let mut map = RgbaImage::from_pixel(width, height, OCEAN);

        paint_tracks(&mut map, &scene, &frame, 50.);

        let track = &scene.tracks[0];
        // the start marker is an inner dot in the track color, the glyph
        // passes on top of it only lose a little to rounding
        let start = track.points[0];
        let px = map.get_pixel(start.x.round() as u32, start.y.round() as u32);
        for c in 0..3 {
            assert!((px.0[c] as i32 - track.color.0[c] as i32).abs() <= 3);
        }

        // halfway along the segment the track is blended with the ocean
        let mid_x = (track.points[0].x + track.points[1].x) / 2.;
        let mid_y = (track.points[0].y + track.points[1].y) / 2.;
        let px = map.get_pixel(mid_x.round() as u32, mid_y.round() as u32);
        assert_ne!(px.0, OCEAN.0);
        assert_ne!(px.0, track.color.0);
    }

    #[test]
    fn test_paint_box_is_translucent() {
        let mut figure = RgbaImage::from_pixel(20, 20, Rgba([0, 0, 0, 255]));
        let rect = PixelRect {
            left: 5.,
            top: 5.,
            width: 10.,
            height: 10.,
        };
        paint_box(&mut figure, &rect, 0.5);
        assert_eq!(figure.get_pixel(10, 10).0, [127, 127, 127, 255]);
        assert_eq!(figure.get_pixel(2, 2).0, [0, 0, 0, 255]);
    }
}
