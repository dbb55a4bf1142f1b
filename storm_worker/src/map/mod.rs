pub mod coastline;
pub mod render;
mod util;

use crate::common::{Coordinate, Distance, Position};
use crate::map::util::{mercator, mercator_range};

/// North-west and south-east corners of the only region the bot draws.
pub const PHILIPPINES: [Coordinate; 2] = [
    Coordinate { lat: 23., lon: 108. },
    Coordinate { lat: 2., lon: 145. },
];

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PixelRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl PixelRect {
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn center_x(&self) -> f64 {
        self.left + self.width / 2.
    }
}

/// Where the Mercator map sits on the figure. Projected positions are
/// relative to the map's own top-left corner, `rect` places the map on the
/// figure.
pub struct MapFrame {
    bounds: [Coordinate; 2],
    range: [Position; 2],
    pub rect: PixelRect,
}

impl MapFrame {
    /// Largest map with the region's true aspect ratio that fits `axes`,
    /// centered in it.
    pub fn fit(bounds: [Coordinate; 2], axes: PixelRect) -> Self {
        let range = mercator_range(&bounds);
        let aspect = (range[1].y - range[0].y) / (range[1].x - range[0].x);

        let (width, height) = if axes.height / axes.width > aspect {
            (axes.width, axes.width * aspect)
        } else {
            (axes.height / aspect, axes.height)
        };

        let rect = PixelRect {
            left: axes.left + (axes.width - width) / 2.,
            top: axes.top + (axes.height - height) / 2.,
            width,
            height,
        };

        Self { bounds, range, rect }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (
            (self.rect.width.round() as u32).max(1),
            (self.rect.height.round() as u32).max(1),
        )
    }

    pub fn bounds(&self) -> [Coordinate; 2] {
        self.bounds
    }

    pub fn project(&self, coord: &Coordinate) -> Position {
        let pos = mercator(coord);
        Position {
            x: (pos.x - self.range[0].x) / (self.range[1].x - self.range[0].x) * self.rect.width,
            y: (pos.y - self.range[0].y) / (self.range[1].y - self.range[0].y) * self.rect.height,
        }
    }

    pub fn pixels_per_degree_lon(&self) -> f64 {
        self.rect.width / (self.bounds[1].lon - self.bounds[0].lon)
    }

    /// Length in pixels of a distance measured along the map's x axis.
    pub fn distance_to_pixels(&self, distance: Distance) -> f64 {
        distance.to_degrees() * self.pixels_per_degree_lon()
    }
}
