//! Output types produced by the navigation engine

use crate::core::{GeoPoint, ManeuverType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Snapshot emitted on every accepted position update. Never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationUpdate {
    /// Instruction text of the current step
    pub next_instruction: String,
    /// Maneuver hint derived from the instruction text
    pub instruction_maneuver: InstructionManeuver,
    /// Route distance to the estimated end of the current step (m)
    pub distance_to_next_m: f64,
    /// Route distance left to the destination (m)
    pub remaining_distance_m: f64,
    /// Remaining distance over the average speed (s)
    pub remaining_time_s: f64,
    pub arrival_time: DateTime<Utc>,
    /// 0..=100
    pub progress_percent: u8,
    pub current_step_index: usize,
    /// Index of the route point nearest to the position
    pub closest_point_index: usize,
    /// Speed used for the time estimate (m/s)
    pub average_speed_ms: f64,
    /// Next turn or destination among the simplified waypoints
    pub upcoming: Option<UpcomingManeuver>,
    /// Distance from the position to the route polyline (m)
    pub cross_track_distance_m: Option<f64>,
    /// Smoothed position this snapshot was computed from
    pub position: GeoPoint,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UpcomingManeuver {
    pub waypoint_index: usize,
    pub maneuver: ManeuverType,
    /// Local-frame distance from the user (m)
    pub distance_m: f64,
}

/// Discrete events, returned in emission order by each engine call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum NavigationEvent {
    Started {
        waypoint_count: usize,
        step_count: usize,
        total_distance_m: f64,
    },
    Updated(NavigationUpdate),
    StepChanged {
        index: usize,
        instruction: String,
    },
    Arrived,
    OffRoute {
        distance_m: f64,
    },
    Stopped,
}

/// Maneuver guessed from free-form instruction text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstructionManeuver {
    Left,
    Right,
    Straight,
    UTurn,
    Roundabout,
    Exit,
    Arrive,
}

impl InstructionManeuver {
    /// Keyword match over English and French instruction texts.
    ///
    /// Unrecognized text is treated as going straight.
    pub fn from_instruction(text: &str) -> Self {
        let lower = text.to_lowercase();
        let has = |words: &[&str]| words.iter().any(|w| lower.contains(w));

        // U-turn and roundabout first: their texts often mention a side too
        if has(&["u-turn", "uturn", "demi-tour"]) {
            InstructionManeuver::UTurn
        } else if has(&["roundabout", "rotary", "rond-point", "giratoire"]) {
            InstructionManeuver::Roundabout
        } else if has(&["left", "gauche"]) {
            InstructionManeuver::Left
        } else if has(&["right", "droite"]) {
            InstructionManeuver::Right
        } else if has(&["straight", "continue", "tout droit", "continuer"]) {
            InstructionManeuver::Straight
        } else if has(&["exit", "sortir", "sortie"]) {
            InstructionManeuver::Exit
        } else if has(&["arrive", "destination"]) {
            InstructionManeuver::Arrive
        } else {
            InstructionManeuver::Straight
        }
    }
}
