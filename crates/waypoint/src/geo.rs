//! Coordinates and great-circle distances.

use std::fmt;

/// Mean earth radius used for haversine distances, in kilometers.
const EARTH_RADIUS_KM: f64 = 6372.8;

/// A WGS84 coordinate in decimal degrees.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Haversine distance to `other` in meters.
    pub fn distance_to(&self, other: &Self) -> f64 {
        distance_meters(*self, *other)
    }
}

impl fmt::Display for LatLon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5}, {:.5}", self.lat, self.lon)
    }
}

/// Haversine distance between two coordinates in meters.
pub fn distance_meters(a: LatLon, b: LatLon) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + (d_lon / 2.0).sin().powi(2) * a.lat.to_radians().cos() * b.lat.to_radians().cos();
    2.0 * EARTH_RADIUS_KM * 1000.0 * h.sqrt().asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_is_zero_for_same_point() {
        let p = LatLon::new(52.3731, 4.8922);
        assert!(p.distance_to(&p).abs() < f64::EPSILON);
    }

    #[test]
    fn test_distance_amsterdam_utrecht() {
        let amsterdam = LatLon::new(52.3731, 4.8922);
        let utrecht = LatLon::new(52.0907, 5.1214);
        let d = distance_meters(amsterdam, utrecht);
        assert!((34_000.0..36_000.0).contains(&d), "got {d}");
        assert!((d - utrecht.distance_to(&amsterdam)).abs() < 1e-6);
    }

    #[test]
    fn test_one_degree_latitude() {
        let d = distance_meters(LatLon::new(0.0, 0.0), LatLon::new(1.0, 0.0));
        assert!((d - 111_226.0).abs() < 100.0, "got {d}");
    }
}
