//! Human-readable rendering of navigation output
//!
//! The engine itself only produces numbers; presentation layers use these
//! helpers (or [`UpdateFormatter`]) to turn them into display strings.

use crate::api::types::{InstructionManeuver, NavigationEvent, NavigationUpdate};
use crate::core::ManeuverType;
use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// `"850 m"` below one kilometer, `"1.2 km"` above
pub fn format_distance(meters: f64) -> String {
    if meters < 1000.0 {
        format!("{:.0} m", meters)
    } else {
        format!("{:.1} km", meters / 1000.0)
    }
}

/// `"1 h 5 min"`, `"12 min"`, `"< 1 min"`; negative durations read `"0 min"`
pub fn format_duration(seconds: f64) -> String {
    if !(seconds >= 0.0) {
        return "0 min".to_string();
    }

    let total = seconds as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;

    if hours > 0 {
        format!("{} h {} min", hours, minutes)
    } else if minutes > 0 {
        format!("{} min", minutes)
    } else {
        "< 1 min".to_string()
    }
}

/// `"HH:MM"` in the given time zone
pub fn format_clock<Tz: TimeZone>(time: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    time.with_timezone(tz).format("%H:%M").to_string()
}

pub fn maneuver_icon(maneuver: ManeuverType) -> &'static str {
    match maneuver {
        ManeuverType::Start => "🟢",
        ManeuverType::Destination => "🏁",
        ManeuverType::TurnLeft => "⬅️",
        ManeuverType::TurnRight => "➡️",
        ManeuverType::Continue => "⬆️",
        ManeuverType::Waypoint => "📍",
    }
}

pub fn instruction_icon(maneuver: InstructionManeuver) -> &'static str {
    match maneuver {
        InstructionManeuver::Left => "⬅️",
        InstructionManeuver::Right => "➡️",
        InstructionManeuver::Straight => "⬆️",
        InstructionManeuver::UTurn => "↩️",
        InstructionManeuver::Roundabout => "🔄",
        InstructionManeuver::Exit => "↗️",
        InstructionManeuver::Arrive => "🏁",
    }
}

/// Display-ready view of a [`NavigationUpdate`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedUpdate {
    pub instruction: String,
    pub icon: String,
    pub distance_to_next: String,
    pub remaining_distance: String,
    pub remaining_time: String,
    pub arrival_time: String,
    pub progress_percent: u8,
    pub upcoming: Option<String>,
}

/// Output style for event streams
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Text,
    Json,
}

/// Turns engine output into display strings
pub struct UpdateFormatter {
    pub format: OutputFormat,
    /// Render arrival times in UTC instead of the local zone
    pub utc_clock: bool,
}

impl Default for UpdateFormatter {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            utc_clock: false,
        }
    }
}

impl UpdateFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_utc_clock(mut self) -> Self {
        self.utc_clock = true;
        self
    }

    pub fn format_update(&self, update: &NavigationUpdate) -> FormattedUpdate {
        let arrival_time = if self.utc_clock {
            format_clock(&update.arrival_time, &Utc)
        } else {
            format_clock(&update.arrival_time, &Local)
        };

        FormattedUpdate {
            instruction: update.next_instruction.clone(),
            icon: instruction_icon(update.instruction_maneuver).to_string(),
            distance_to_next: format_distance(update.distance_to_next_m),
            remaining_distance: format_distance(update.remaining_distance_m),
            remaining_time: format_duration(update.remaining_time_s),
            arrival_time,
            progress_percent: update.progress_percent,
            upcoming: update.upcoming.map(|u| {
                format!(
                    "{} {} in {}",
                    maneuver_icon(u.maneuver),
                    u.maneuver,
                    format_distance(u.distance_m)
                )
            }),
        }
    }

    /// One line per event
    pub fn format_event(&self, event: &NavigationEvent) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string(event)
                .unwrap_or_else(|e| format!("{{\"error\":\"{}\"}}", e)),
            OutputFormat::Text => self.format_event_text(event),
        }
    }

    fn format_event_text(&self, event: &NavigationEvent) -> String {
        match event {
            NavigationEvent::Started {
                waypoint_count,
                step_count,
                total_distance_m,
            } => format!(
                "Navigation started: {} waypoints, {} steps, {}",
                waypoint_count,
                step_count,
                format_distance(*total_distance_m)
            ),
            NavigationEvent::Updated(update) => {
                let f = self.format_update(update);
                let mut line = format!(
                    "{} {} ({}) | remaining {} | {} | ETA {} | {}%",
                    f.icon,
                    f.instruction,
                    f.distance_to_next,
                    f.remaining_distance,
                    f.remaining_time,
                    f.arrival_time,
                    f.progress_percent
                );
                if let Some(upcoming) = f.upcoming {
                    line.push_str(" | next: ");
                    line.push_str(&upcoming);
                }
                line
            }
            NavigationEvent::StepChanged { index, instruction } => {
                format!("Step {}: {}", index, instruction)
            }
            NavigationEvent::Arrived => "Arrived at destination".to_string(),
            NavigationEvent::OffRoute { distance_m } => {
                format!("Off route by {}", format_distance(*distance_m))
            }
            NavigationEvent::Stopped => "Navigation stopped".to_string(),
        }
    }
}
