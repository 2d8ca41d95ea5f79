//! Core data types for route tracking

use chrono::{DateTime, Utc};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Geodetic position in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Both components finite and inside the valid degree ranges
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}°, {:.6}°)", self.latitude, self.longitude)
    }
}

/// Error returned when a `"lat,lon"` string cannot be parsed
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid coordinate string '{input}': {reason}")]
pub struct ParseGeoPointError {
    pub input: String,
    pub reason: String,
}

impl FromStr for GeoPoint {
    type Err = ParseGeoPointError;

    /// Parses `"48.8566,2.3522"`; whitespace around either number is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fail = |reason: &str| ParseGeoPointError {
            input: s.to_string(),
            reason: reason.to_string(),
        };

        let mut parts = s.split(',');
        let (lat, lon) = match (parts.next(), parts.next(), parts.next()) {
            (Some(lat), Some(lon), None) => (lat.trim(), lon.trim()),
            _ => return Err(fail("expected exactly two comma-separated values")),
        };

        let latitude = lat.parse::<f64>().map_err(|_| fail("latitude is not a number"))?;
        let longitude = lon.parse::<f64>().map_err(|_| fail("longitude is not a number"))?;

        let point = GeoPoint::new(latitude, longitude);
        if !point.is_valid() {
            return Err(fail("coordinates out of range"));
        }
        Ok(point)
    }
}

/// Position in the local tangent plane of a session origin, in meters.
///
/// Axes follow the scene convention used by AR renderers:
/// `x` = east, `y` = up, `z` = -north.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocalPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl LocalPoint {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn from_enu(east: f64, north: f64, up: f64) -> Self {
        Self::new(east, up, -north)
    }

    pub fn east(&self) -> f64 {
        self.x
    }

    pub fn north(&self) -> f64 {
        -self.z
    }

    pub fn up(&self) -> f64 {
        self.y
    }

    pub fn to_vector(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }

    /// Euclidean distance in the local frame
    pub fn distance_to(&self, other: &LocalPoint) -> f64 {
        (self.to_vector() - other.to_vector()).norm()
    }
}

impl From<Vector3<f64>> for LocalPoint {
    fn from(v: Vector3<f64>) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

/// Route as delivered by the routing provider.
///
/// `steps` are not index-aligned with `points`; step boundaries are
/// estimated from point counts during tracking.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Route {
    pub points: Vec<GeoPoint>,
    #[serde(default)]
    pub steps: Vec<String>,
}

impl Route {
    pub fn new(points: Vec<GeoPoint>, steps: Vec<String>) -> Self {
        Self { points, steps }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn destination(&self) -> Option<GeoPoint> {
        self.points.last().copied()
    }
}

/// Raw fix pushed by the device location source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationFix {
    pub latitude: f64,
    pub longitude: f64,
    /// Instantaneous ground speed (m/s), when the receiver reports one
    #[serde(default)]
    pub speed: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

impl LocationFix {
    pub fn new(latitude: f64, longitude: f64, speed: Option<f64>, timestamp: DateTime<Utc>) -> Self {
        Self {
            latitude,
            longitude,
            speed,
            timestamp,
        }
    }

    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

/// Driving action attached to a simplified waypoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ManeuverType {
    Start,
    Waypoint,
    TurnLeft,
    TurnRight,
    Continue,
    Destination,
}

impl ManeuverType {
    /// Whether the user has to act at this waypoint
    pub fn is_action(&self) -> bool {
        matches!(
            self,
            ManeuverType::TurnLeft | ManeuverType::TurnRight | ManeuverType::Destination
        )
    }
}

impl fmt::Display for ManeuverType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ManeuverType::Start => "START",
            ManeuverType::Waypoint => "WAYPOINT",
            ManeuverType::TurnLeft => "TURN_LEFT",
            ManeuverType::TurnRight => "TURN_RIGHT",
            ManeuverType::Continue => "CONTINUE",
            ManeuverType::Destination => "DESTINATION",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geo_point_display() {
        let p = GeoPoint::new(48.057440, -123.119625);
        assert_eq!(format!("{}", p), "(48.057440°, -123.119625°)");
    }

    #[test]
    fn test_parse_coordinates() {
        let p: GeoPoint = "48.8566, 2.3522".parse().unwrap();
        assert_eq!(p, GeoPoint::new(48.8566, 2.3522));

        assert!("48.8566".parse::<GeoPoint>().is_err());
        assert!("a,b".parse::<GeoPoint>().is_err());
        assert!("1,2,3".parse::<GeoPoint>().is_err());
        assert!("95.0,0.0".parse::<GeoPoint>().is_err());
    }

    #[test]
    fn test_local_point_axes() {
        let p = LocalPoint::from_enu(3.0, 4.0, 1.5);
        assert_eq!(p.east(), 3.0);
        assert_eq!(p.north(), 4.0);
        assert_eq!(p.up(), 1.5);
        assert_eq!(p.z, -4.0);

        let origin = LocalPoint::new(0.0, 1.5, 0.0);
        assert!((p.distance_to(&origin) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_route_json_defaults_steps() {
        let route: Route =
            serde_json::from_str(r#"{"points":[{"latitude":1.0,"longitude":2.0}]}"#).unwrap();
        assert_eq!(route.points.len(), 1);
        assert!(route.steps.is_empty());
        assert_eq!(route.destination(), Some(GeoPoint::new(1.0, 2.0)));
    }

    #[test]
    fn test_maneuver_serialization() {
        let json = serde_json::to_string(&ManeuverType::TurnLeft).unwrap();
        assert_eq!(json, "\"TURN_LEFT\"");
        assert!(ManeuverType::Destination.is_action());
        assert!(!ManeuverType::Continue.is_action());
    }
}
