pub mod layout;
pub mod paint;
pub mod style;
pub mod symbol;

use crate::map::render::{paint_graticule_labels, render_base_map};
use crate::map::{MapFrame, PixelRect, PHILIPPINES};
use crate::storm::layout::{layout_scene, StormScene};
use crate::storm::paint::{paint_annotation, paint_labels, paint_legend, paint_tracks};
use crate::storm::style::{AXES_FRACTION, CROP_PAD_INCHES, DEFAULT_DPI, FIGURE_HEIGHT, FIGURE_WIDTH};
use crate::util::text::load_font;
use crate::util::{encode_png, tight_crop, WHITE};
use ab_glyph::FontVec;
use image::{GenericImage, ImageError, RgbaImage};
use serde_json::Value;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info};

pub const OUTPUT_FILE: &str = "storm_path.png";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("cannot create output directory {}: {source}", path.display())]
    OutputDir { path: PathBuf, source: io::Error },
    #[error("cannot write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("image error: {0}")]
    Image(#[from] ImageError),
    #[error("point {point} of \"{title}\" cannot be projected")]
    Geometry { title: String, point: usize },
}

/// Line width in points for a wind speed in knots. 0 kt is a 1 pt hairline,
/// a 130 kt super typhoon is 8 pt. Not clamped.
pub fn normalize_magnitude(magnitude: f64) -> f64 {
    1. + (magnitude / 130.) * 7.
}

/// A finished chart together with the scene it was drawn from.
pub struct StormChart {
    pub image: RgbaImage,
    pub scene: StormScene,
}

#[derive(Clone)]
pub struct StormRenderer {
    output_dir: PathBuf,
    pub dpi: f64,
    font: Option<Arc<FontVec>>,
}

pub struct StormRendererBuilder {
    output_dir: PathBuf,
    dpi: Option<f64>,
    font_path: Option<PathBuf>,
    draw_text: Option<bool>,
}

impl StormRenderer {
    pub fn builder(output_dir: impl Into<PathBuf>) -> StormRendererBuilder {
        StormRendererBuilder::new(output_dir.into())
    }

    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(OUTPUT_FILE)
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn figure_size(&self) -> (u32, u32) {
        (
            (FIGURE_WIDTH * self.dpi).round() as u32,
            (FIGURE_HEIGHT * self.dpi).round() as u32,
        )
    }

    fn frame(&self) -> MapFrame {
        let (width, height) = self.figure_size();
        let (width, height) = (width as f64, height as f64);
        let [left, bottom, w, h] = AXES_FRACTION;
        let axes = PixelRect {
            left: left * width,
            top: (1. - bottom - h) * height,
            width: w * width,
            height: h * height,
        };
        MapFrame::fit(PHILIPPINES, axes)
    }

    /// Draws the chart in memory, already cropped.
    pub fn compose(&self, events: &[Value]) -> Result<StormChart, RenderError> {
        let frame = self.frame();
        let scene = layout_scene(events, &frame)?;
        debug!(tracks = scene.tracks.len(), "storm scene laid out");

        let mut map = render_base_map(&frame, self.dpi);
        paint_tracks(&mut map, &scene, &frame, self.dpi);

        let (width, height) = self.figure_size();
        let mut figure = RgbaImage::from_pixel(width, height, WHITE);
        figure.copy_from(&map, frame.rect.left.round() as u32, frame.rect.top.round() as u32)?;
        drop(map);

        if let Some(font) = &self.font {
            paint_graticule_labels(&mut figure, font, &frame, self.dpi);
            paint_labels(&mut figure, font, &scene, &frame, self.dpi);
            paint_legend(&mut figure, font, &scene, &frame, self.dpi);
            paint_annotation(&mut figure, font, &frame, self.dpi);
        }

        let pad = (CROP_PAD_INCHES * self.dpi).round() as u32;
        let image = tight_crop(&figure, pad);

        Ok(StormChart { image, scene })
    }

    /// Renders `events` and writes the PNG, replacing any earlier one. Every
    /// render shares this one path, so overlapping renders can read back each
    /// other's image.
    pub fn render(&self, events: &[Value]) -> Result<PathBuf, RenderError> {
        let chart = self.compose(events)?;
        let png = encode_png(&chart.image)?;

        let path = self.output_path();
        fs::write(&path, png).map_err(|source| RenderError::Write {
            path: path.clone(),
            source,
        })?;

        info!(
            path = %path.display(),
            tracks = chart.scene.tracks.len(),
            width = chart.image.width(),
            height = chart.image.height(),
            "storm map written"
        );
        Ok(path)
    }

    /// Renders off the async runtime. `None` when there is nothing to draw
    /// or the render failed; failures are logged, never raised.
    pub async fn plot_storm_path(&self, events: Vec<Value>) -> Option<PathBuf> {
        if events.is_empty() {
            error!("no storm events to plot");
            return None;
        }

        let renderer = self.clone();
        let result = tokio::task::spawn_blocking(move || renderer.render(&events)).await;

        match result {
            Ok(Ok(path)) => Some(path),
            Ok(Err(e)) => {
                error!(error = %e, "failed to create storm visualization");
                None
            }
            Err(e) => {
                error!(error = %e, "storm render task did not finish");
                None
            }
        }
    }
}

impl StormRendererBuilder {
    fn new(output_dir: PathBuf) -> Self {
        Self {
            output_dir,
            dpi: None,
            font_path: None,
            draw_text: None,
        }
    }

    pub fn dpi(mut self, dpi: f64) -> Self {
        self.dpi = Some(dpi);
        self
    }

    pub fn font_path(mut self, font_path: Option<PathBuf>) -> Self {
        self.font_path = font_path;
        self
    }

    /// Turning text off skips the font search entirely.
    pub fn draw_text(mut self, draw_text: bool) -> Self {
        self.draw_text = Some(draw_text);
        self
    }

    pub fn build(self) -> Result<StormRenderer, RenderError> {
        fs::create_dir_all(&self.output_dir).map_err(|source| RenderError::OutputDir {
            path: self.output_dir.clone(),
            source,
        })?;

        let font = if self.draw_text.unwrap_or(true) {
            load_font(self.font_path.as_deref()).map(Arc::new)
        } else {
            None
        };

        Ok(StormRenderer {
            output_dir: self.output_dir,
            dpi: self.dpi.unwrap_or(DEFAULT_DPI),
            font,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::render::OCEAN;
    use approx::assert_abs_diff_eq;
    use rand::{rng, Rng};
    use serde_json::json;

    fn temp_output_dir() -> PathBuf {
        let suffix = rng().random::<u64>();
        std::env::temp_dir().join(format!("storm_worker_test_{:016x}", suffix))
    }

    fn renderer(dir: &Path) -> StormRenderer {
        StormRenderer::builder(dir).dpi(40.).draw_text(false).build().unwrap()
    }

    fn typhoon_test() -> Value {
        json!({
            "title": "Typhoon Test",
            "geometry": [
                {"magnitudeValue": 40, "date": "2024-10-20T00:00:00Z", "coordinates": [135.0, 12.0]},
                {"magnitudeValue": 70, "date": "2024-10-20T06:00:00Z", "coordinates": [131.5, 13.1]},
                {"magnitudeValue": 130, "date": "2024-10-20T12:00:00Z", "coordinates": [128.2, 14.6]}
            ]
        })
    }

    #[test]
    fn test_normalize_magnitude() {
        assert_abs_diff_eq!(normalize_magnitude(0.), 1., epsilon = 1e-12);
        assert_abs_diff_eq!(normalize_magnitude(130.), 8., epsilon = 1e-12);
        assert_abs_diff_eq!(normalize_magnitude(65.), 4.5, epsilon = 1e-12);
        // not clamped
        assert!(normalize_magnitude(200.) > 8.);
    }

    #[test]
    fn test_frame_fills_axes_width() {
        let dir = temp_output_dir();
        let renderer = renderer(&dir);
        let frame = renderer.frame();
        // 12 in at 40 dpi, axes 80 percent wide
        assert_abs_diff_eq!(frame.rect.width, 384., epsilon = 1e-9);
        assert_abs_diff_eq!(frame.rect.left, 48., epsilon = 1e-9);
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_render_typhoon() {
        let dir = temp_output_dir();
        let renderer = renderer(&dir);

        let path = renderer.render(&[typhoon_test()]).unwrap();
        assert_eq!(path, dir.join("storm_path.png"));
        assert!(path.exists());

        let decoded = image::open(&path).unwrap().to_rgba8();
        let (width, height) = renderer.figure_size();
        // cropped down to the map plus padding
        assert!(decoded.width() < width);
        assert!(decoded.height() < height);

        let chart = renderer.compose(&[typhoon_test()]).unwrap();
        assert_eq!(chart.scene.legend[0].text, "Typhoon Test (Max: 130kts)");
        assert_eq!(chart.scene.tracks[0].markers.len(), 3);

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_invalid_events_still_draw_a_map() {
        let dir = temp_output_dir();
        let renderer = renderer(&dir);

        let events = vec![json!({"title": "Nothing"}), json!({"geometry": []})];
        let chart = renderer.compose(&events).unwrap();
        assert!(chart.scene.tracks.is_empty());
        assert!(chart.image.pixels().any(|p| p.0 == OCEAN.0));

        let path = renderer.render(&events).unwrap();
        assert!(path.exists());

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_geometry_error_aborts() {
        let dir = temp_output_dir();
        let renderer = renderer(&dir);

        let mut event = typhoon_test();
        event["geometry"][0]["coordinates"] = json!([130.0, -95.0]);
        let result = renderer.render(&[event]);
        assert!(matches!(result, Err(RenderError::Geometry { point: 0, .. })));
        assert!(!renderer.output_path().exists());

        let _ = fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_plot_storm_path() {
        let dir = temp_output_dir();
        let renderer = renderer(&dir);

        assert!(renderer.plot_storm_path(vec![]).await.is_none());
        assert!(!renderer.output_path().exists());

        let path = renderer.plot_storm_path(vec![typhoon_test()]).await;
        assert_eq!(path, Some(dir.join("storm_path.png")));

        let mut broken = typhoon_test();
        broken["geometry"][2]["coordinates"] = json!([130.0, 120.0]);
        assert!(renderer.plot_storm_path(vec![broken]).await.is_none());

        let _ = fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_extreme_track_is_drawn_within_the_figure() {
        let dir = temp_output_dir();
        let renderer = renderer(&dir);

        // a runaway wind speed and a point next to the pole give a stroke and
        // an extent far larger than the figure
        let event = json!({
            "title": "Typhoon Runaway",
            "geometry": [
                {"magnitudeValue": 1.0e7, "date": "2024-10-20T00:00:00Z", "coordinates": [130.0, 12.0]},
                {"magnitudeValue": 1.0e7, "date": "2024-10-20T06:00:00Z", "coordinates": [128.0, 89.5]}
            ]
        });
        let path = renderer.plot_storm_path(vec![event]).await;
        assert_eq!(path, Some(dir.join("storm_path.png")));

        let _ = fs::remove_dir_all(dir);
    }
}
