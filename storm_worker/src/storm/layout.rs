use crate::common::{Distance, Position};
use crate::eonet::{parse_events, StormEvent};
use crate::map::MapFrame;
use crate::storm::style::*;
use crate::storm::{normalize_magnitude, RenderError};
use crate::util::text::Align;
use chrono::{DateTime, Utc};
use image::Rgba;
use serde_json::Value;

/// One stretch of track, drawn at the intensity of its leading point.
#[derive(Clone, Debug)]
pub struct Segment {
    pub from: Position,
    pub to: Position,
    /// points
    pub width: f64,
}

/// White ring with a solid dot, sizes are diameters in points.
#[derive(Clone, Debug)]
pub struct Marker {
    pub center: Position,
    pub outer: f64,
    pub inner: f64,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GlyphAnchor {
    Start,
    End,
}

/// One stroke pass of a typhoon glyph.
#[derive(Clone, Debug)]
pub struct GlyphPass {
    pub anchor: GlyphAnchor,
    pub center: Position,
    pub size: Distance,
    /// degrees
    pub rotation: f64,
    pub alpha: f32,
    /// points
    pub width: f64,
}

#[derive(Clone, Debug)]
pub struct Label {
    pub anchor: Position,
    pub text: String,
    pub align: Align,
    pub size: f64,
    pub outline: f64,
}

#[derive(Clone, Debug)]
pub struct LegendEntry {
    pub color: Rgba<u8>,
    pub text: String,
}

/// A storm track laid out on the map, in map pixels.
#[derive(Clone, Debug)]
pub struct RenderedTrack {
    /// position of the event in the feed
    pub index: usize,
    pub title: String,
    pub color: Rgba<u8>,
    pub points: Vec<Position>,
    pub segments: Vec<Segment>,
    pub markers: Vec<Marker>,
    pub glyphs: Vec<GlyphPass>,
    pub labels: Vec<Label>,
    pub max_magnitude: f64,
}

impl RenderedTrack {
    pub fn legend_entry(&self) -> LegendEntry {
        LegendEntry {
            color: self.color,
            text: legend_text(&self.title, self.max_magnitude),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct StormScene {
    pub tracks: Vec<RenderedTrack>,
    pub legend: Vec<LegendEntry>,
}

pub fn legend_text(title: &str, max_magnitude: f64) -> String {
    format!("{} (Max: {:.0}kts)", title, max_magnitude)
}

pub fn label_text(title: &str, date: &DateTime<Utc>) -> String {
    format!("{}\n{}", title, date.format("%m/%d %H:%M UTC"))
}

fn start_glyphs(center: Position) -> Vec<GlyphPass> {
    START_GLYPH_PASSES
        .iter()
        .map(|&scale| GlyphPass {
            anchor: GlyphAnchor::Start,
            center,
            size: START_GLYPH_SIZE.scale(scale),
            rotation: if scale == 1.0 { START_GLYPH_TILT } else { 0. },
            alpha: GLYPH_ALPHA * scale as f32,
            width: if scale == 1.0 { 2. } else { 1. },
        })
        .collect()
}

fn end_glyph(center: Position) -> GlyphPass {
    GlyphPass {
        anchor: GlyphAnchor::End,
        center,
        size: END_GLYPH_SIZE,
        rotation: 0.,
        alpha: GLYPH_ALPHA,
        width: END_GLYPH_WIDTH,
    }
}

/// Projects one validated event. Fails when a point has no place on a
/// Mercator map at all (latitudes beyond the poles), which aborts the render.
pub fn layout_track(index: usize, event: &StormEvent, frame: &MapFrame) -> Result<RenderedTrack, RenderError> {
    let mut points = Vec::with_capacity(event.track.len());
    for (point, track_point) in event.track.iter().enumerate() {
        let projected = frame.project(&track_point.coordinate);
        if !projected.is_finite() {
            return Err(RenderError::Geometry {
                title: event.title.clone(),
                point,
            });
        }
        points.push(projected);
    }

    let color = storm_color(index);

    let segments = points
        .windows(2)
        .zip(&event.track)
        .map(|(pair, leading)| Segment {
            from: pair[0],
            to: pair[1],
            width: normalize_magnitude(leading.magnitude),
        })
        .collect();

    let markers = points
        .iter()
        .enumerate()
        .map(|(i, center)| Marker {
            center: *center,
            outer: if i == 0 { START_MARKER } else { MARKER },
            inner: if i == 0 { START_DOT } else { DOT },
        })
        .collect();

    let start = points[0];
    let end = points[points.len() - 1];
    let mut glyphs = start_glyphs(start);
    glyphs.push(end_glyph(end));

    let labels = vec![
        Label {
            anchor: start,
            text: label_text(&event.title, &event.start().date),
            align: Align::Right,
            size: START_LABEL_SIZE,
            outline: START_LABEL_OUTLINE,
        },
        Label {
            anchor: end,
            text: label_text(&event.title, &event.end().date),
            align: Align::Left,
            size: END_LABEL_SIZE,
            outline: END_LABEL_OUTLINE,
        },
    ];

    Ok(RenderedTrack {
        index,
        title: event.title.clone(),
        color,
        points,
        segments,
        markers,
        glyphs,
        labels,
        max_magnitude: event.max_magnitude(),
    })
}

/// Validates the raw feed records and lays out every usable one. Records
/// that fail validation are skipped, so the scene may well be empty.
pub fn layout_scene(events: &[Value], frame: &MapFrame) -> Result<StormScene, RenderError> {
    let mut scene = StormScene::default();

    for (index, event) in parse_events(events) {
        let track = layout_track(index, &event, frame)?;
        scene.legend.push(track.legend_entry());
        scene.tracks.push(track);
    }

    Ok(scene)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{PixelRect, PHILIPPINES};
    use approx::assert_abs_diff_eq;
    use serde_json::json;

    fn frame() -> MapFrame {
        MapFrame::fit(
            PHILIPPINES,
            PixelRect {
                left: 120.,
                top: 15.,
                width: 960.,
                height: 660.,
            },
        )
    }

    fn typhoon(title: &str) -> Value {
        json!({
            "title": title,
            "geometry": [
                {"magnitudeValue": 40, "date": "2024-10-20T00:00:00Z", "coordinates": [135.0, 12.0]},
                {"magnitudeValue": 70, "date": "2024-10-20T06:00:00Z", "coordinates": [131.5, 13.1]},
                {"magnitudeValue": 130, "date": "2024-10-20T12:00:00Z", "coordinates": [128.2, 14.6]}
            ]
        })
    }

    #[test]
    fn test_typhoon_scene() {
        let scene = layout_scene(&[typhoon("Typhoon Test")], &frame()).unwrap();
        assert_eq!(scene.tracks.len(), 1);
        assert_eq!(scene.legend.len(), 1);
        assert!(scene.legend[0].text.contains("Typhoon Test (Max: 130kts)"));

        let track = &scene.tracks[0];
        assert_eq!(track.markers.len(), 3);
        assert_eq!(track.segments.len(), 2);
        assert_eq!(track.color, storm_color(0));

        // segment widths follow the leading point
        assert_abs_diff_eq!(track.segments[0].width, normalize_magnitude(40.), epsilon = 1e-12);
        assert_abs_diff_eq!(track.segments[1].width, normalize_magnitude(70.), epsilon = 1e-12);

        assert_eq!(track.markers[0].outer, START_MARKER);
        assert_eq!(track.markers[1].outer, MARKER);
        assert_eq!(track.markers[2].inner, DOT);
    }

    #[test]
    fn test_glyph_placement() {
        let scene = layout_scene(&[typhoon("Typhoon Test")], &frame()).unwrap();
        let track = &scene.tracks[0];

        let start: Vec<&GlyphPass> = track
            .glyphs
            .iter()
            .filter(|g| g.anchor == GlyphAnchor::Start)
            .collect();
        assert_eq!(start.len(), 3);
        let sizes: Vec<f64> = start.iter().map(|g| g.size.to_km()).collect();
        assert_abs_diff_eq!(sizes[0], 168., epsilon = 1e-9);
        assert_abs_diff_eq!(sizes[1], 140., epsilon = 1e-9);
        assert_abs_diff_eq!(sizes[2], 112., epsilon = 1e-9);
        let rotations: Vec<f64> = start.iter().map(|g| g.rotation).collect();
        assert_eq!(rotations, vec![0., 45., 0.]);
        assert_eq!(start[1].width, 2.);
        assert!(start.iter().all(|g| g.center == track.points[0]));

        let end: Vec<&GlyphPass> = track
            .glyphs
            .iter()
            .filter(|g| g.anchor == GlyphAnchor::End)
            .collect();
        assert_eq!(end.len(), 1);
        assert_eq!(end[0].rotation, 0.);
        assert_abs_diff_eq!(end[0].size.to_km(), 80., epsilon = 1e-9);
        assert_eq!(end[0].center, track.points[2]);
        // the large glyph is larger than the small one
        assert!(start.iter().all(|g| g.size.to_km() > end[0].size.to_km()));
    }

    #[test]
    fn test_labels() {
        let scene = layout_scene(&[typhoon("Typhoon Test")], &frame()).unwrap();
        let labels = &scene.tracks[0].labels;
        assert_eq!(labels.len(), 2);

        assert_eq!(labels[0].text, "Typhoon Test\n10/20 00:00 UTC");
        assert_eq!(labels[0].align, Align::Right);
        assert_eq!(labels[1].text, "Typhoon Test\n10/20 12:00 UTC");
        assert_eq!(labels[1].align, Align::Left);
        assert!(labels[0].size > labels[1].size);
        assert!(labels[0].outline > labels[1].outline);
    }

    #[test]
    fn test_track_moves_west() {
        let scene = layout_scene(&[typhoon("Typhoon Test")], &frame()).unwrap();
        let points = &scene.tracks[0].points;
        // heading north-west: left and up on the canvas
        assert!(points[0].x > points[2].x);
        assert!(points[0].y > points[2].y);
    }

    #[test]
    fn test_malformed_events_are_skipped() {
        let events = vec![
            typhoon("Alpha"),
            json!({"title": "No Geometry"}),
            json!({"title": "Empty", "geometry": []}),
            typhoon("Bravo"),
            json!(null),
        ];
        let scene = layout_scene(&events, &frame()).unwrap();
        let titles: Vec<&str> = scene.tracks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Alpha", "Bravo"]);
        // color follows the position in the feed, not the drawn order
        assert_eq!(scene.tracks[1].color, storm_color(3));
        assert_eq!(scene.legend.len(), 2);
    }

    #[test]
    fn test_only_invalid_events_gives_empty_scene() {
        let events = vec![json!({"title": "A"}), json!({"title": "B", "geometry": []})];
        let scene = layout_scene(&events, &frame()).unwrap();
        assert!(scene.tracks.is_empty());
        assert!(scene.legend.is_empty());
    }

    #[test]
    fn test_single_point_track() {
        let event = json!({
            "title": "Lonely",
            "geometry": [{"magnitudeValue": 35, "date": "2024-10-20T00:00:00Z", "coordinates": [125.0, 10.0]}]
        });
        let scene = layout_scene(&[event], &frame()).unwrap();
        let track = &scene.tracks[0];
        assert!(track.segments.is_empty());
        assert_eq!(track.markers.len(), 1);
        assert_eq!(track.glyphs.len(), 4);
        assert_eq!(track.labels[0].anchor, track.labels[1].anchor);
    }

    #[test]
    fn test_unprojectable_point_aborts() {
        let mut event = typhoon("Broken");
        event["geometry"][1]["coordinates"] = json!([130.0, 100.0]);
        let result = layout_scene(&[event], &frame());
        assert!(matches!(result, Err(RenderError::Geometry { point: 1, .. })));
    }

    #[test]
    fn test_legend_text_rounds() {
        assert_eq!(legend_text("Kong-rey", 97.6), "Kong-rey (Max: 98kts)");
        assert_eq!(legend_text("Kong-rey", 130.), "Kong-rey (Max: 130kts)");
    }
}
