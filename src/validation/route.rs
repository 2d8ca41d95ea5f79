//! Input validation for routes and location fixes

use crate::core::{GeoPoint, LocationFix, Route};
use crate::validation::error::{NavigationError, NavigationResult};

/// Reject routes the tracker cannot work with.
///
/// A route needs at least one point and every point must be a valid
/// coordinate. Steps may be empty.
pub fn validate_route(route: &Route) -> NavigationResult<()> {
    if route.points.is_empty() {
        return Err(NavigationError::EmptyRoute);
    }

    if let Some((index, point)) = route.points.iter().enumerate().find(|(_, p)| !p.is_valid()) {
        return Err(NavigationError::InvalidCoordinate {
            index,
            latitude: point.latitude,
            longitude: point.longitude,
        });
    }

    Ok(())
}

pub fn validate_position(position: &GeoPoint) -> NavigationResult<()> {
    if position.is_valid() {
        Ok(())
    } else {
        Err(NavigationError::InvalidFix {
            reason: format!("coordinates out of range: {}", position),
        })
    }
}

/// A fix is usable when its coordinates are valid; a bad speed does not
/// invalidate the position.
pub fn validate_fix(fix: &LocationFix) -> NavigationResult<()> {
    validate_position(&fix.position())
}
