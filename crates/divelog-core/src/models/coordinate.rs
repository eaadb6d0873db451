//! Fixed-point geographic coordinates.
//!
//! Positions are stored as integer micro-degrees (1e-6 degree units) so that
//! values read from a dive log survive repeated load/save cycles unchanged.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{DivelogError, Result};

/// Micro-degrees per degree
pub const UDEG_PER_DEGREE: i32 = 1_000_000;

const MAX_LATITUDE_UDEG: i64 = 90 * UDEG_PER_DEGREE as i64;
const MAX_LONGITUDE_UDEG: i64 = 180 * UDEG_PER_DEGREE as i64;

/// An angle in micro-degrees
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Degrees(pub i32);

impl Degrees {
    /// Convert a floating point degree value, rounding to the nearest micro-degree
    pub fn from_degrees(value: f64) -> Self {
        Self((value * UDEG_PER_DEGREE as f64).round() as i32)
    }

    /// Raw micro-degree value
    pub fn udeg(&self) -> i32 {
        self.0
    }

    /// Value in degrees
    pub fn as_degrees(&self) -> f64 {
        self.0 as f64 / UDEG_PER_DEGREE as f64
    }

    /// Decimal representation with six fractional digits, as sent to geocoding providers
    pub fn to_query_string(&self) -> String {
        format!("{:.6}", self.as_degrees())
    }
}

impl fmt::Display for Degrees {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.to_query_string())
    }
}

/// A validated latitude/longitude pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate", into = "RawCoordinate")]
pub struct Coordinate {
    latitude: Degrees,
    longitude: Degrees,
}

impl Coordinate {
    /// Create a coordinate from micro-degree values
    pub fn new(latitude_udeg: i32, longitude_udeg: i32) -> Result<Self> {
        if (latitude_udeg as i64).abs() > MAX_LATITUDE_UDEG {
            return Err(DivelogError::LatitudeOutOfRange { udeg: latitude_udeg as i64 });
        }
        if (longitude_udeg as i64).abs() > MAX_LONGITUDE_UDEG {
            return Err(DivelogError::LongitudeOutOfRange { udeg: longitude_udeg as i64 });
        }

        Ok(Self {
            latitude: Degrees(latitude_udeg),
            longitude: Degrees(longitude_udeg),
        })
    }

    /// Create a coordinate from floating point degrees.
    ///
    /// Values are rounded to the nearest micro-degree before the range check,
    /// so input that rounds onto a limit is accepted.
    pub fn from_degrees(latitude: f64, longitude: f64) -> Result<Self> {
        let latitude_udeg = round_to_udeg(latitude);
        let longitude_udeg = round_to_udeg(longitude);

        if !latitude.is_finite() || latitude_udeg.unsigned_abs() > MAX_LATITUDE_UDEG as u64 {
            return Err(DivelogError::LatitudeOutOfRange { udeg: latitude_udeg });
        }
        if !longitude.is_finite() || longitude_udeg.unsigned_abs() > MAX_LONGITUDE_UDEG as u64 {
            return Err(DivelogError::LongitudeOutOfRange { udeg: longitude_udeg });
        }

        Self::new(latitude_udeg as i32, longitude_udeg as i32)
    }

    pub fn latitude(&self) -> Degrees {
        self.latitude
    }

    pub fn longitude(&self) -> Degrees {
        self.longitude
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.latitude, self.longitude)
    }
}

/// Saturating for input far outside any valid range
fn round_to_udeg(degrees: f64) -> i64 {
    (degrees * UDEG_PER_DEGREE as f64).round() as i64
}

/// Serialized form, validated on the way in
#[derive(Serialize, Deserialize)]
struct RawCoordinate {
    latitude: i32,
    longitude: i32,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = DivelogError;

    fn try_from(raw: RawCoordinate) -> Result<Self> {
        Coordinate::new(raw.latitude, raw.longitude)
    }
}

impl From<Coordinate> for RawCoordinate {
    fn from(coordinate: Coordinate) -> Self {
        Self {
            latitude: coordinate.latitude.0,
            longitude: coordinate.longitude.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_limits() {
        assert!(Coordinate::new(90_000_000, 180_000_000).is_ok());
        assert!(Coordinate::new(-90_000_000, -180_000_000).is_ok());
        assert!(matches!(
            Coordinate::new(90_000_001, 0),
            Err(DivelogError::LatitudeOutOfRange { .. })
        ));
        assert!(matches!(
            Coordinate::new(0, -180_000_001),
            Err(DivelogError::LongitudeOutOfRange { .. })
        ));
    }

    #[test]
    fn test_from_degrees_rounds_to_micro_degrees() {
        let coordinate = Coordinate::from_degrees(12.345678, 45.678912).unwrap();
        assert_eq!(coordinate.latitude().udeg(), 12_345_678);
        assert_eq!(coordinate.longitude().udeg(), 45_678_912);
    }

    #[test]
    fn test_from_degrees_rejects_non_finite() {
        assert!(Coordinate::from_degrees(f64::NAN, 0.0).is_err());
        assert!(Coordinate::from_degrees(0.0, f64::INFINITY).is_err());
        assert!(Coordinate::from_degrees(1.0e12, 0.0).is_err());
    }

    #[test]
    fn test_from_degrees_validates_after_rounding() {
        let edge = Coordinate::from_degrees(90.000_000_4, -180.000_000_4).unwrap();
        assert_eq!(edge.latitude().udeg(), 90_000_000);
        assert_eq!(edge.longitude().udeg(), -180_000_000);

        assert!(matches!(
            Coordinate::from_degrees(90.000_000_6, 0.0),
            Err(DivelogError::LatitudeOutOfRange { udeg: 90_000_001 })
        ));
        assert!(matches!(
            Coordinate::from_degrees(0.0, -1.0e30),
            Err(DivelogError::LongitudeOutOfRange { .. })
        ));
    }

    #[test]
    fn test_query_string_has_six_decimals() {
        assert_eq!(Degrees(-8_123_000).to_query_string(), "-8.123000");
        assert_eq!(Degrees(1).to_query_string(), "0.000001");
    }

    #[test]
    fn test_serde_validates() {
        let ok: Coordinate = serde_json::from_str(r#"{"latitude": 1, "longitude": 2}"#).unwrap();
        assert_eq!(ok.latitude(), Degrees(1));

        let bad = serde_json::from_str::<Coordinate>(r#"{"latitude": 95000000, "longitude": 0}"#);
        assert!(bad.is_err());
    }
}
