use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in km between two points given in decimal degrees.
///
/// Inputs are not range-checked; use [`Coordinates::new`] at input boundaries.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (lat1, lon1, lat2, lon2) = (
        lat1.to_radians(),
        lon1.to_radians(),
        lat2.to_radians(),
        lon2.to_radians(),
    );
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Result<Self, AppError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(AppError::validation("Latitude must be between -90 and 90"));
        }
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(AppError::validation("Longitude must be between -180 and 180"));
        }
        Ok(Self { lat, lon })
    }

    pub fn distance_km(&self, other: &Coordinates) -> f64 {
        haversine_km(self.lat, self.lon, other.lat, other.lon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_to_self_is_zero() {
        assert_eq!(haversine_km(12.97, 77.59, 12.97, 77.59), 0.0);
        assert_eq!(haversine_km(-33.86, 151.2, -33.86, 151.2), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let points = [
            (12.97, 77.59, 12.97, 77.60),
            (51.5074, -0.1278, 48.8566, 2.3522),
            (-33.86, 151.2, 40.71, -74.0),
        ];
        for (a, b, c, d) in points {
            assert_eq!(haversine_km(a, b, c, d), haversine_km(c, d, a, b));
        }
    }

    #[test]
    fn bangalore_hundredth_degree_east_is_about_a_kilometer() {
        let d = haversine_km(12.97, 77.59, 12.97, 77.60);
        assert!((d - 1.084).abs() < 0.01, "got {d}");
    }

    #[test]
    fn london_to_paris() {
        let d = haversine_km(51.5074, -0.1278, 48.8566, 2.3522);
        assert!((d - 343.5).abs() < 1.0, "got {d}");
    }

    #[test]
    fn quarter_meridian() {
        let d = haversine_km(0.0, 0.0, 90.0, 0.0);
        let expected = std::f64::consts::PI / 2.0 * EARTH_RADIUS_KM;
        assert!((d - expected).abs() < 1e-6);
    }

    #[test]
    fn coordinates_reject_out_of_range() {
        assert!(Coordinates::new(12.97, 77.59).is_ok());
        assert!(Coordinates::new(90.0, -180.0).is_ok());
        assert!(matches!(Coordinates::new(91.0, 0.0), Err(AppError::Validation(_))));
        assert!(matches!(Coordinates::new(0.0, 181.0), Err(AppError::Validation(_))));
        assert!(Coordinates::new(f64::NAN, 0.0).is_err());
        assert!(Coordinates::new(0.0, f64::INFINITY).is_err());
    }
}
