use crate::common::{Coordinate, Position};
use std::f64::consts::PI;

/// Normalized spherical Mercator: x in [0, 1] west to east across the whole
/// globe, y growing southwards with the equator at 0.5.
pub fn mercator(coord: &Coordinate) -> Position {
    let x = (coord.lon + 180.) / 360.;
    let y_numerator = ((coord.lat * PI / 180.).tan() + 1. / (coord.lat * PI / 180.).cos()).ln();
    let y = (1. - y_numerator / PI) / 2.;

    Position { x, y }
}

pub fn mercator_range(bounds: &[Coordinate; 2]) -> [Position; 2] {
    [mercator(&bounds[0]), mercator(&bounds[1])]
}
