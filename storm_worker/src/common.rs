#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }
}

/// A point on the output canvas, in pixels, y growing downwards.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A distance on the map. Degrees are measured along the equator,
/// which is what a Mercator x axis is scaled by.
#[derive(Copy, Clone, Debug)]
pub enum Distance {
    KM(f64),
    Degrees(f64),
}

impl Distance {
    pub fn to_km(&self) -> f64 {
        match self {
            Self::Degrees(deg) => deg / 360.0 * 40075.0,
            Self::KM(km) => *km,
        }
    }

    pub fn to_degrees(&self) -> f64 {
        match self {
            Self::KM(km) => km / 40075.0 * 360.0,
            Self::Degrees(deg) => *deg,
        }
    }

    pub fn scale(&self, factor: f64) -> Distance {
        match self {
            Self::KM(km) => Self::KM(km * factor),
            Self::Degrees(deg) => Self::Degrees(deg * factor),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::common::{Coordinate, Distance};
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_distance() {
        let dist = Distance::KM(140.0);
        assert_abs_diff_eq!(dist.to_km(), 140.0, epsilon = f64::EPSILON);
        assert_abs_diff_eq!(dist.to_degrees(), 1.2576419213973799, epsilon = 1e-12);
        assert_abs_diff_eq!(
            Distance::Degrees(dist.to_degrees()).to_km(),
            140.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_distance_scale() {
        let dist = Distance::KM(140.0).scale(1.2);
        assert_abs_diff_eq!(dist.to_km(), 168.0, epsilon = 1e-9);
        let dist = Distance::Degrees(2.0).scale(0.5);
        assert_abs_diff_eq!(dist.to_degrees(), 1.0, epsilon = f64::EPSILON);
    }

    #[test]
    fn test_coordinate_finite() {
        assert!(Coordinate { lat: 12.0, lon: 125.0 }.is_finite());
        assert!(!Coordinate { lat: f64::NAN, lon: 125.0 }.is_finite());
        assert!(!Coordinate { lat: 12.0, lon: f64::INFINITY }.is_finite());
    }
}
