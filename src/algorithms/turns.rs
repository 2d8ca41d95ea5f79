//! Maneuver classification from adjacent bearings

use crate::algorithms::geodesy;
use crate::core::{GeoPoint, ManeuverType, DEFAULT_TURN_ANGLE_THRESHOLD_DEG};
use serde::{Deserialize, Serialize};

/// How a positive bearing delta maps onto left/right.
///
/// Compass bearings grow clockwise, so a positive `b2 - b1` is a right turn.
/// `Legacy` keeps the inverted mapping some older route renderers used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnSignConvention {
    #[default]
    Compass,
    Legacy,
}

#[derive(Debug, Clone, Copy)]
pub struct TurnClassifier {
    /// Deltas with a smaller magnitude are continuations (degrees)
    pub angle_threshold_deg: f64,
    pub convention: TurnSignConvention,
}

impl Default for TurnClassifier {
    fn default() -> Self {
        Self {
            angle_threshold_deg: DEFAULT_TURN_ANGLE_THRESHOLD_DEG,
            convention: TurnSignConvention::Compass,
        }
    }
}

impl TurnClassifier {
    pub fn new(angle_threshold_deg: f64, convention: TurnSignConvention) -> Self {
        Self {
            angle_threshold_deg,
            convention,
        }
    }

    /// Signed turn at `cur`, in `(-180, 180]`; positive is clockwise.
    pub fn turn_angle(prev: &GeoPoint, cur: &GeoPoint, next: &GeoPoint) -> f64 {
        let b1 = geodesy::bearing(prev, cur);
        let b2 = geodesy::bearing(cur, next);
        geodesy::normalize_angle_delta(b2 - b1)
    }

    /// Classify a signed turn angle.
    pub fn classify_angle(&self, turn_deg: f64) -> ManeuverType {
        if turn_deg.abs() < self.angle_threshold_deg {
            return ManeuverType::Continue;
        }

        let clockwise = turn_deg > 0.0;
        match (self.convention, clockwise) {
            (TurnSignConvention::Compass, true) | (TurnSignConvention::Legacy, false) => {
                ManeuverType::TurnRight
            }
            (TurnSignConvention::Compass, false) | (TurnSignConvention::Legacy, true) => {
                ManeuverType::TurnLeft
            }
        }
    }

    /// Label every point: first START, last DESTINATION, interior by angle.
    ///
    /// A single point is labelled START.
    pub fn classify(&self, points: &[GeoPoint]) -> Vec<ManeuverType> {
        let n = points.len();
        (0..n)
            .map(|i| {
                if i == 0 {
                    ManeuverType::Start
                } else if i == n - 1 {
                    ManeuverType::Destination
                } else {
                    let turn = Self::turn_angle(&points[i - 1], &points[i], &points[i + 1]);
                    self.classify_angle(turn)
                }
            })
            .collect()
    }
}
