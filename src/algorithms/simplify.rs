//! Distance-based route downsampling

use crate::algorithms::geodesy;
use crate::core::{GeoPoint, DEFAULT_SIMPLIFICATION_SPACING_M};

/// Keeps a point whenever the distance accumulated since the last kept
/// point reaches the configured spacing.
#[derive(Debug, Clone, Copy)]
pub struct RouteSimplifier {
    /// Minimum accumulated distance between kept points (meters)
    pub spacing_m: f64,
}

impl Default for RouteSimplifier {
    fn default() -> Self {
        Self {
            spacing_m: DEFAULT_SIMPLIFICATION_SPACING_M,
        }
    }
}

impl RouteSimplifier {
    pub fn new(spacing_m: f64) -> Self {
        Self { spacing_m }
    }

    /// Downsample `points`.
    ///
    /// The first and last input points are always present in the output;
    /// duplicate points never trigger an emission on their own.
    pub fn simplify(&self, points: &[GeoPoint]) -> Vec<GeoPoint> {
        let Some((first, rest)) = points.split_first() else {
            return Vec::new();
        };

        let mut simplified = vec![*first];
        let mut accumulated = 0.0;
        let mut prev = first;

        for current in rest {
            accumulated += geodesy::distance(prev, current);
            if accumulated >= self.spacing_m {
                simplified.push(*current);
                accumulated = 0.0;
            }
            prev = current;
        }

        if let Some(last) = points.last() {
            if simplified.last() != Some(last) {
                simplified.push(*last);
            }
        }

        simplified
    }
}
