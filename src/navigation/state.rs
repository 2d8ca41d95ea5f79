//! Session lifecycle state

use crate::core::GeoPoint;
use serde::{Deserialize, Serialize};
use std::fmt;

/// `Idle -> Navigating -> {Arrived, Stopped}`; only a fresh start leaves a terminal state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationStatus {
    #[default]
    Idle,
    Navigating,
    Arrived,
    Stopped,
}

impl fmt::Display for NavigationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NavigationStatus::Idle => "idle",
            NavigationStatus::Navigating => "navigating",
            NavigationStatus::Arrived => "arrived",
            NavigationStatus::Stopped => "stopped",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NavigationState {
    /// Never decreases within a session
    pub current_step_index: usize,
    pub status: NavigationStatus,
    /// Local frame anchor; set on start and on recenter
    pub origin: Option<GeoPoint>,
    pub last_position: Option<GeoPoint>,
}

impl NavigationState {
    /// Fresh state for a session anchored at `origin`
    pub fn navigating(origin: GeoPoint) -> Self {
        Self {
            current_step_index: 0,
            status: NavigationStatus::Navigating,
            origin: Some(origin),
            last_position: None,
        }
    }

    pub fn is_navigating(&self) -> bool {
        self.status == NavigationStatus::Navigating
    }
}
