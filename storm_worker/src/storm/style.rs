use crate::common::Distance;
use image::Rgba;

pub const STORM_COLORS: [Rgba<u8>; 4] = [
    Rgba([255, 51, 102, 255]), // #FF3366
    Rgba([51, 102, 255, 255]), // #3366FF
    Rgba([255, 153, 51, 255]), // #FF9933
    Rgba([51, 204, 51, 255]),  // #33CC33
];

/// Color of the event at `index` in the feed, cycling through the palette.
pub fn storm_color(index: usize) -> Rgba<u8> {
    STORM_COLORS[index % STORM_COLORS.len()]
}

// figure, in inches
pub const FIGURE_WIDTH: f64 = 12.;
pub const FIGURE_HEIGHT: f64 = 7.5;
/// left, bottom, width, height as fractions of the figure
pub const AXES_FRACTION: [f64; 4] = [0.1, 0.1, 0.8, 0.88];
pub const DEFAULT_DPI: f64 = 300.;
pub const CROP_PAD_INCHES: f64 = 0.1;

// everything below is in points unless noted
pub const TRACK_ALPHA: f32 = 0.7;

pub const START_MARKER: f64 = 20.;
pub const START_DOT: f64 = 8.;
pub const MARKER: f64 = 12.;
pub const DOT: f64 = 4.;
pub const MARKER_EDGE: f64 = 2.;

pub const START_GLYPH_SIZE: Distance = Distance::KM(140.);
pub const START_GLYPH_PASSES: [f64; 3] = [1.2, 1.0, 0.8];
pub const START_GLYPH_TILT: f64 = 45.;
pub const END_GLYPH_SIZE: Distance = Distance::KM(80.);
pub const END_GLYPH_WIDTH: f64 = 1.5;
pub const GLYPH_ALPHA: f32 = 0.7;

pub const START_LABEL_SIZE: f64 = 12.;
pub const START_LABEL_OUTLINE: f64 = 4.;
pub const END_LABEL_SIZE: f64 = 10.;
pub const END_LABEL_OUTLINE: f64 = 3.;

pub const LEGEND_SIZE: f64 = 10.;
pub const LEGEND_LINE_WIDTH: f64 = 1.5;
pub const LEGEND_ALPHA: f32 = 0.7;

pub const ANNOTATION: &str = "Points represent 6-hour intervals • Line width indicates storm intensity";
pub const ANNOTATION_SIZE: f64 = 11.;
pub const ANNOTATION_PAD: f64 = 2.;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storm_color_cycles() {
        assert_eq!(storm_color(0), Rgba([255, 51, 102, 255]));
        assert_eq!(storm_color(1), STORM_COLORS[1]);
        assert_eq!(storm_color(4), storm_color(0));
        assert_eq!(storm_color(7), storm_color(3));
    }
}
