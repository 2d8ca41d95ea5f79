//! Spherical-earth geodesy and local tangent plane projection
//!
//! All computations use a spherical earth of radius [`EARTH_RADIUS_M`].
//! The local projection is equirectangular around a session origin:
//!
//! - `east  = Δlon · cos(origin.lat) · K`
//! - `north = Δlat · K`
//! - `up    = altitude`
//!
//! with `K` = [`METERS_PER_DEGREE_LAT`] for both directions. This is only
//! accurate within a few kilometers of the origin; the error grows with
//! distance and with |latitude| near the poles. That is a known property
//! of the approximation, not a defect.
//!
//! Longitude differences are always taken the short way round, so a frame
//! whose origin sits next to the antimeridian stays continuous across it.

use crate::core::{GeoPoint, LocalPoint, EARTH_RADIUS_M, METERS_PER_DEGREE_LAT};
use nalgebra::Vector2;

/// Below this, `cos(latitude)` is treated as zero and longitude offsets collapse.
const MIN_LONGITUDE_SCALE: f64 = 1e-12;

/// Great-circle distance in meters (haversine).
pub fn distance(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let lat_from = a.latitude.to_radians();
    let lat_to = b.latitude.to_radians();
    let delta_lat = (b.latitude - a.latitude).to_radians();
    let delta_lon = (b.longitude - a.longitude).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat_from.cos() * lat_to.cos() * (delta_lon / 2.0).sin().powi(2);

    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}

/// Initial bearing from `a` to `b` in degrees, `[0, 360)`, 0 = north.
///
/// Identical points yield 0.
pub fn bearing(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let lat_from = a.latitude.to_radians();
    let lat_to = b.latitude.to_radians();
    let delta_lon = (b.longitude - a.longitude).to_radians();

    let y = delta_lon.sin() * lat_to.cos();
    let x = lat_from.cos() * lat_to.sin() - lat_from.sin() * lat_to.cos() * delta_lon.cos();

    if y == 0.0 && x == 0.0 {
        return 0.0;
    }

    let heading = y.atan2(x).to_degrees();
    let normalized = (heading + 360.0) % 360.0;
    // -0.0 and values that round to exactly 360.0
    if normalized >= 360.0 {
        0.0
    } else {
        normalized.abs()
    }
}

/// Project `point` into the local frame anchored at `origin`.
pub fn project_to_local(origin: &GeoPoint, point: &GeoPoint, altitude: f64) -> LocalPoint {
    let d_lat = point.latitude - origin.latitude;
    let d_lon = normalize_angle_delta(point.longitude - origin.longitude);

    let east = d_lon * METERS_PER_DEGREE_LAT * origin.latitude.to_radians().cos();
    let north = d_lat * METERS_PER_DEGREE_LAT;

    LocalPoint::from_enu(east, north, altitude)
}

/// Inverse of [`project_to_local`]; altitude is dropped.
pub fn unproject(origin: &GeoPoint, local: &LocalPoint) -> GeoPoint {
    let latitude = origin.latitude + local.north() / METERS_PER_DEGREE_LAT;

    let lon_scale = METERS_PER_DEGREE_LAT * origin.latitude.to_radians().cos();
    let longitude = if lon_scale.abs() < MIN_LONGITUDE_SCALE {
        origin.longitude
    } else {
        wrap_longitude(origin.longitude + local.east() / lon_scale)
    };

    GeoPoint::new(latitude, longitude)
}

/// Point reached by travelling `distance_m` from `start` on initial `bearing_deg`.
pub fn destination_point(start: &GeoPoint, bearing_deg: f64, distance_m: f64) -> GeoPoint {
    let lat1 = start.latitude.to_radians();
    let lon1 = start.longitude.to_radians();
    let brng = bearing_deg.to_radians();
    let angular_distance = distance_m / EARTH_RADIUS_M;

    let lat2 = (lat1.sin() * angular_distance.cos()
        + lat1.cos() * angular_distance.sin() * brng.cos())
    .asin();

    let lon2 = lon1
        + (brng.sin() * angular_distance.sin() * lat1.cos())
            .atan2(angular_distance.cos() - lat1.sin() * lat2.sin());

    // Normalize longitude to -180..180
    let lon2_normalized = (lon2.to_degrees() + 540.0) % 360.0 - 180.0;

    GeoPoint::new(lat2.to_degrees(), lon2_normalized)
}

/// Linear interpolation in lat/lon space. Only acceptable for short segments.
pub fn interpolate(a: &GeoPoint, b: &GeoPoint, fraction: f64) -> GeoPoint {
    let d_lon = normalize_angle_delta(b.longitude - a.longitude);
    GeoPoint::new(
        a.latitude + (b.latitude - a.latitude) * fraction,
        wrap_longitude(a.longitude + d_lon * fraction),
    )
}

/// Bring a longitude back into `[-180, 180]`; in-range values are returned unchanged.
fn wrap_longitude(longitude: f64) -> f64 {
    if (-180.0..=180.0).contains(&longitude) {
        longitude
    } else {
        normalize_angle_delta(longitude)
    }
}

/// Whether two points are within `threshold_m` of each other.
pub fn is_near(a: &GeoPoint, b: &GeoPoint, threshold_m: f64) -> bool {
    distance(a, b) <= threshold_m
}

/// Degree offsets `(Δlat, Δlon)` spanning `distance_m` at `latitude`.
pub fn local_distance_to_offset(distance_m: f64, latitude: f64) -> (f64, f64) {
    let lat_offset = distance_m / METERS_PER_DEGREE_LAT;
    let lon_scale = METERS_PER_DEGREE_LAT * latitude.to_radians().cos();
    let lon_offset = if lon_scale.abs() < MIN_LONGITUDE_SCALE {
        0.0
    } else {
        distance_m / lon_scale
    };
    (lat_offset, lon_offset)
}

/// Sum of consecutive great-circle segment lengths.
pub fn path_length(points: &[GeoPoint]) -> f64 {
    points.windows(2).map(|w| distance(&w[0], &w[1])).sum()
}

/// Sum of segment lengths from `from` up to `to` (exclusive of segments past `to`).
///
/// Returns 0 when `from >= to`; indices past the end are clamped.
pub fn segment_sum(points: &[GeoPoint], from: usize, to: usize) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    let end = to.min(points.len() - 1);
    if from >= end {
        return 0.0;
    }
    path_length(&points[from..=end])
}

/// Minimum distance from `position` to the polyline `points`, in meters.
///
/// Each segment is projected into a local frame centered on `position`,
/// so the result inherits the equirectangular approximation.
/// Returns `None` for an empty polyline.
pub fn cross_track_distance(position: &GeoPoint, points: &[GeoPoint]) -> Option<f64> {
    match points {
        [] => None,
        [only] => Some(distance(position, only)),
        _ => points
            .windows(2)
            .map(|w| {
                let a = project_to_local(position, &w[0], 0.0);
                let b = project_to_local(position, &w[1], 0.0);
                point_segment_distance(
                    Vector2::zeros(),
                    Vector2::new(a.east(), a.north()),
                    Vector2::new(b.east(), b.north()),
                )
            })
            .reduce(f64::min),
    }
}

fn point_segment_distance(p: Vector2<f64>, a: Vector2<f64>, b: Vector2<f64>) -> f64 {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq == 0.0 {
        return (p - a).norm();
    }
    let t = ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    (p - (a + ab * t)).norm()
}

/// Normalize an angle difference into `(-180, 180]`.
pub fn normalize_angle_delta(delta_deg: f64) -> f64 {
    let mut angle = delta_deg % 360.0;
    if angle > 180.0 {
        angle -= 360.0;
    } else if angle <= -180.0 {
        angle += 360.0;
    }
    angle
}
