//! One navigation session: raw fixes in, events out

use crate::api::types::NavigationEvent;
use crate::core::{GeoPoint, LocationFix, Route};
use crate::navigation::state::NavigationStatus;
use crate::navigation::tracker::ProgressTracker;
use crate::processing::PositionFilter;
use crate::utils::config::NavigationConfig;
use crate::validation::{validate_fix, NavigationResult};
use tracing::{debug, warn};

/// Owns the position smoother and progress tracker for a single session.
///
/// Nothing is shared between sessions; build a new one (or call
/// [`start`](Self::start) again) for every route.
#[derive(Debug, Clone)]
pub struct NavigationSession {
    smoother: PositionFilter,
    tracker: ProgressTracker,
}

impl Default for NavigationSession {
    fn default() -> Self {
        Self::new(NavigationConfig::default())
    }
}

impl NavigationSession {
    pub fn new(config: NavigationConfig) -> Self {
        Self {
            smoother: config.position_filter(),
            tracker: ProgressTracker::new(config),
        }
    }

    /// Build a session from a configuration, rejecting invalid values
    pub fn with_validated_config(config: NavigationConfig) -> NavigationResult<Self> {
        config.validate()?;
        Ok(Self::new(config))
    }

    pub fn start(&mut self, route: Route) -> NavigationResult<Vec<NavigationEvent>> {
        let events = self.tracker.start(route)?;
        self.smoother.reset();
        Ok(events)
    }

    pub fn start_with_origin(
        &mut self,
        route: Route,
        origin: GeoPoint,
    ) -> NavigationResult<Vec<NavigationEvent>> {
        let events = self.tracker.start_with_origin(route, origin)?;
        self.smoother.reset();
        Ok(events)
    }

    /// Smooth a raw fix and feed it to the tracker.
    ///
    /// A malformed fix is reported and leaves the session untouched. Fixes
    /// outside an active session are ignored without touching the smoother.
    pub fn on_fix(&mut self, fix: &LocationFix) -> NavigationResult<Vec<NavigationEvent>> {
        if let Err(err) = validate_fix(fix) {
            warn!(%err, "rejecting location fix");
            return Err(err);
        }
        if self.tracker.status() != NavigationStatus::Navigating {
            debug!(status = %self.tracker.status(), "fix received outside an active session");
            return Ok(Vec::new());
        }

        let smoothed = self.smoother.filter(&fix.position());
        Ok(self.tracker.update(smoothed, fix.speed, fix.timestamp))
    }

    pub fn stop(&mut self) -> Vec<NavigationEvent> {
        self.tracker.stop()
    }

    /// Re-anchor the local frame and restart smoothing from the next fix
    pub fn recenter(&mut self, origin: GeoPoint) -> NavigationResult<()> {
        self.tracker.recenter(origin)?;
        self.smoother.reset();
        Ok(())
    }

    pub fn tracker(&self) -> &ProgressTracker {
        &self.tracker
    }

    pub fn smoother(&self) -> &PositionFilter {
        &self.smoother
    }

    pub fn status(&self) -> NavigationStatus {
        self.tracker.status()
    }
}
