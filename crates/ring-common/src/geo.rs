//! Geographic points, great-circle distances and boxes around a storm centre.

use serde::{Deserialize, Serialize};

/// Mean Earth radius used for all distance calculations (km).
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A longitude/latitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    pub fn is_finite(&self) -> bool {
        self.lon.is_finite() && self.lat.is_finite()
    }
}

/// Great-circle distance between two points in kilometres (haversine formula).
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

/// A lon/lat aligned box in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl GeoBox {
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    /// Smallest box containing the circle of `radius_km` around `center`.
    ///
    /// The longitude half-width widens with latitude (1/cos φ).
    pub fn around(center: GeoPoint, radius_km: f64) -> Self {
        let km_per_degree = EARTH_RADIUS_KM * std::f64::consts::PI / 180.0;
        let dlat = radius_km / km_per_degree;
        let cos_lat = center.lat.to_radians().cos().max(1e-6);
        let dlon = dlat / cos_lat;

        Self {
            min_lon: center.lon - dlon,
            min_lat: center.lat - dlat,
            max_lon: center.lon + dlon,
            max_lat: center.lat + dlat,
        }
    }

    /// Top-left corner (min lon, max lat).
    pub fn top_left(&self) -> GeoPoint {
        GeoPoint::new(self.min_lon, self.max_lat)
    }

    /// Bottom-right corner (max lon, min lat).
    pub fn bottom_right(&self) -> GeoPoint {
        GeoPoint::new(self.max_lon, self.min_lat)
    }

    pub fn width(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    pub fn height(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    pub fn contains(&self, point: GeoPoint) -> bool {
        point.lon >= self.min_lon
            && point.lon <= self.max_lon
            && point.lat >= self.min_lat
            && point.lat <= self.max_lat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_zero() {
        let p = GeoPoint::new(15.0, 36.0);
        assert!(haversine_km(p, p) < 1e-9);
    }

    #[test]
    fn test_haversine_one_degree_latitude() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(0.0, 1.0);
        // 2πR/360
        assert!((haversine_km(a, b) - 111.19).abs() < 0.05);
    }

    #[test]
    fn test_box_around_contains_center_and_widens_with_latitude() {
        let equator = GeoBox::around(GeoPoint::new(10.0, 0.0), 100.0);
        let north = GeoBox::around(GeoPoint::new(10.0, 60.0), 100.0);

        assert!(equator.contains(GeoPoint::new(10.0, 0.0)));
        assert!((equator.height() - north.height()).abs() < 1e-9);
        assert!(north.width() > equator.width() * 1.9);
    }
}
