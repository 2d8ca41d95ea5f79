//! Physical constants and navigation defaults

/// Spherical earth radius used by every great-circle computation (m)
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Meters per degree of latitude, used by both the local projection and its inverse
pub const METERS_PER_DEGREE_LAT: f64 = 111_320.0;

/// Distance below which the destination counts as reached (m)
pub const DEFAULT_ARRIVAL_THRESHOLD_M: f64 = 50.0;

/// Minimum spacing between kept waypoints (m)
pub const DEFAULT_SIMPLIFICATION_SPACING_M: f64 = 20.0;

/// Bearing delta below which a waypoint is a plain continuation (degrees)
pub const DEFAULT_TURN_ANGLE_THRESHOLD_DEG: f64 = 20.0;

/// Waypoints and guides further away than this are hidden (m)
pub const DEFAULT_MAX_VISIBILITY_DISTANCE_M: f64 = 100.0;

/// Fallback travel speed when no usable samples exist (km/h)
pub const DEFAULT_AVERAGE_SPEED_KMH: f64 = 30.0;

/// Rolling speed buffer size
pub const DEFAULT_SPEED_SAMPLE_WINDOW: usize = 10;

/// Mean speeds below this are treated as stationary (km/h)
pub const DEFAULT_MIN_MOVING_SPEED_KMH: f64 = 5.0;

/// Samples at or above this are discarded (km/h)
pub const DEFAULT_MAX_PLAUSIBLE_SPEED_KMH: f64 = 150.0;

/// Cross-track distance beyond which the user is considered off route (m)
pub const DEFAULT_OFF_ROUTE_THRESHOLD_M: f64 = 50.0;

/// Consecutive off-route updates needed before the event fires
pub const DEFAULT_OFF_ROUTE_CONFIRMATIONS: u32 = 3;

/// Spacing of directional arrow guides along a segment (m)
pub const DEFAULT_ARROW_SPACING_M: f64 = 8.0;

/// Smallest accepted arrow spacing (m)
pub const MIN_ARROW_SPACING_M: f64 = 0.5;

/// Upper bound on arrow intervals generated for a single segment
pub const MAX_ARROWS_PER_SEGMENT: usize = 1000;

/// Height of placed objects above the local ground plane (m)
pub const DEFAULT_OBJECT_HEIGHT_M: f64 = 0.2;

/// Scalar smoother process noise
pub const DEFAULT_PROCESS_NOISE: f64 = 0.008;

/// Scalar smoother measurement noise
pub const DEFAULT_MEASUREMENT_NOISE: f64 = 0.1;

/// Convert km/h to m/s
pub fn kmh_to_ms(kmh: f64) -> f64 {
    kmh / 3.6
}
