use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Two-coordinate geographic value.
///
/// On the wire a `GeoPoint` travels as an object tagged with the `GeoPoint`
/// class key rather than as a generic entity; the codec recognizes the tag
/// before falling back to entity decoding.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// The wire class tag for the geo special form.
    pub const CLASS_TAG: &'static str = "GeoPoint";

    /// Create a geo point, validating coordinate ranges.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, TypeError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(TypeError::LatitudeOutOfRange(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(TypeError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_accepts_valid_coordinates() {
        let p = GeoPoint::new(40.7, -74.0).unwrap();
        assert_eq!(p.latitude, 40.7);
        assert_eq!(p.longitude, -74.0);
    }

    #[test]
    fn new_accepts_boundaries() {
        assert!(GeoPoint::new(90.0, 180.0).is_ok());
        assert!(GeoPoint::new(-90.0, -180.0).is_ok());
    }

    #[test]
    fn new_rejects_bad_latitude() {
        assert_eq!(
            GeoPoint::new(90.1, 0.0).unwrap_err(),
            TypeError::LatitudeOutOfRange(90.1)
        );
    }

    #[test]
    fn new_rejects_bad_longitude() {
        assert_eq!(
            GeoPoint::new(0.0, -180.5).unwrap_err(),
            TypeError::LongitudeOutOfRange(-180.5)
        );
    }

    #[test]
    fn display_format() {
        let p = GeoPoint::new(1.5, -2.5).unwrap();
        assert_eq!(format!("{p}"), "(1.5, -2.5)");
    }
}
