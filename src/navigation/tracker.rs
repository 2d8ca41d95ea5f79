//! Route progress tracking
//!
//! [`ProgressTracker`] owns everything one navigation session mutates:
//! lifecycle state, the classified waypoint placement, the speed buffer
//! and off-route bookkeeping. Each call returns the events it produced,
//! in emission order.

use crate::algorithms::geodesy;
use crate::algorithms::placement::{PlacementRecord, RoutePlacement};
use crate::api::types::{InstructionManeuver, NavigationEvent, NavigationUpdate};
use crate::core::{GeoPoint, Route};
use crate::navigation::state::{NavigationState, NavigationStatus};
use crate::processing::SpeedEstimator;
use crate::utils::config::NavigationConfig;
use crate::validation::{validate_position, validate_route, NavigationError, NavigationResult};
use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, info, warn};

/// Instruction used when the route carries no step texts
pub const DEFAULT_INSTRUCTION: &str = "Continue straight";

#[derive(Debug, Clone)]
pub struct ProgressTracker {
    config: NavigationConfig,
    state: NavigationState,
    route: Route,
    placement: Option<RoutePlacement>,
    speed: SpeedEstimator,
    total_distance_m: f64,
    /// Consecutive updates beyond the off-route threshold
    off_route_count: u32,
    off_route_reported: bool,
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new(NavigationConfig::default())
    }
}

impl ProgressTracker {
    pub fn new(config: NavigationConfig) -> Self {
        let speed = config.speed_estimator();
        Self {
            config,
            state: NavigationState::default(),
            route: Route::default(),
            placement: None,
            speed,
            total_distance_m: 0.0,
            off_route_count: 0,
            off_route_reported: false,
        }
    }

    /// Start a session with the local frame anchored at the route's first point
    pub fn start(&mut self, route: Route) -> NavigationResult<Vec<NavigationEvent>> {
        let origin = route.points.first().copied().ok_or(NavigationError::EmptyRoute)?;
        self.start_with_origin(route, origin)
    }

    /// Start a session with an explicit local-frame origin.
    ///
    /// Any previous session state is discarded. On error the tracker is left untouched.
    pub fn start_with_origin(
        &mut self,
        route: Route,
        origin: GeoPoint,
    ) -> NavigationResult<Vec<NavigationEvent>> {
        validate_route(&route)?;
        validate_position(&origin)?;

        let simplified = self.config.simplifier().simplify(&route.points);
        let maneuvers = self.config.turn_classifier().classify(&simplified);
        let placement =
            RoutePlacement::build(origin, &simplified, &maneuvers, self.config.placement_params());

        self.total_distance_m = geodesy::path_length(&route.points);
        self.state = NavigationState::navigating(origin);
        self.speed.clear();
        self.off_route_count = 0;
        self.off_route_reported = false;

        info!(
            points = route.points.len(),
            waypoints = simplified.len(),
            steps = route.steps.len(),
            total_distance_m = self.total_distance_m,
            "navigation started"
        );

        let started = NavigationEvent::Started {
            waypoint_count: simplified.len(),
            step_count: route.steps.len(),
            total_distance_m: self.total_distance_m,
        };
        self.placement = Some(placement);
        self.route = route;

        Ok(vec![started])
    }

    /// Feed one smoothed position.
    ///
    /// Does nothing unless a session is navigating. Never fails: an invalid
    /// position is dropped, and missing speed data falls back to the default.
    pub fn update(
        &mut self,
        position: GeoPoint,
        speed_ms: Option<f64>,
        now: DateTime<Utc>,
    ) -> Vec<NavigationEvent> {
        let mut events = Vec::new();

        if !self.state.is_navigating() {
            return events;
        }
        let Some(destination) = self.route.destination() else {
            return events;
        };
        if !position.is_valid() {
            warn!(%position, "ignoring position with invalid coordinates");
            return events;
        }

        if let Some(speed) = speed_ms {
            self.speed.add_sample(speed);
        }
        self.state.last_position = Some(position);

        let to_destination = geodesy::distance(&position, &destination);
        if to_destination < self.config.arrival_threshold_m {
            info!(distance_m = to_destination, "arrived at destination");
            self.state.status = NavigationStatus::Arrived;
            events.push(NavigationEvent::Arrived);
            return events;
        }

        let points = &self.route.points;
        let total_points = points.len();
        let last_index = total_points - 1;
        let closest = closest_point_index(points, &position);

        let step_count = self.route.steps.len();
        let points_per_step = (total_points / step_count.max(1)).max(1);
        let estimated_step = closest / points_per_step;
        if estimated_step > self.state.current_step_index && estimated_step < step_count {
            self.state.current_step_index = estimated_step;
            let instruction = self.route.steps[estimated_step].clone();
            info!(index = estimated_step, %instruction, "step changed");
            events.push(NavigationEvent::StepChanged {
                index: estimated_step,
                instruction,
            });
        }
        let step = self.state.current_step_index;

        let mut remaining_distance_m = geodesy::segment_sum(points, closest, last_index);
        if self.config.remaining_distance_includes_offset {
            remaining_distance_m += geodesy::distance(&position, &points[closest]);
        }

        let next_step_point = ((step + 1) * points_per_step).min(last_index);
        let distance_to_next_m = geodesy::segment_sum(points, closest, next_step_point);

        let average_speed_ms = self.speed.average();
        let remaining_time_s = if average_speed_ms > 0.0 {
            remaining_distance_m / average_speed_ms
        } else {
            0.0
        };
        let arrival_time = TimeDelta::try_milliseconds((remaining_time_s * 1000.0).round() as i64)
            .and_then(|delta| now.checked_add_signed(delta))
            .unwrap_or(now);

        let progress_percent = ((closest as f64 / total_points as f64) * 100.0)
            .floor()
            .clamp(0.0, 100.0) as u8;

        let upcoming = self.placement.as_mut().and_then(|placement| {
            let user = placement.to_local(&position);
            placement.update_visibility(&user);
            placement.upcoming_maneuver(&user)
        });

        let cross_track_distance_m = geodesy::cross_track_distance(&position, points);
        if let Some(event) = self.check_off_route(cross_track_distance_m) {
            events.push(event);
        }

        let next_instruction = self
            .route
            .steps
            .get(step)
            .cloned()
            .unwrap_or_else(|| DEFAULT_INSTRUCTION.to_string());

        debug!(
            closest,
            step,
            remaining_distance_m,
            remaining_time_s,
            progress_percent,
            "navigation update"
        );

        events.push(NavigationEvent::Updated(NavigationUpdate {
            instruction_maneuver: InstructionManeuver::from_instruction(&next_instruction),
            next_instruction,
            distance_to_next_m,
            remaining_distance_m,
            remaining_time_s,
            arrival_time,
            progress_percent,
            current_step_index: step,
            closest_point_index: closest,
            average_speed_ms,
            upcoming,
            cross_track_distance_m,
            position,
            timestamp: now,
        }));

        events
    }

    /// Fires once after enough consecutive off-route updates; re-arms when back on route
    fn check_off_route(&mut self, cross_track_m: Option<f64>) -> Option<NavigationEvent> {
        let (Some(threshold), Some(distance_m)) = (self.config.off_route_threshold_m, cross_track_m)
        else {
            return None;
        };

        if distance_m > threshold {
            self.off_route_count = self.off_route_count.saturating_add(1);
            if !self.off_route_reported && self.off_route_count >= self.config.off_route_confirmations {
                self.off_route_reported = true;
                warn!(distance_m, threshold, "position is off route");
                return Some(NavigationEvent::OffRoute { distance_m });
            }
        } else {
            if self.off_route_reported {
                debug!(distance_m, "back on route");
            }
            self.off_route_count = 0;
            self.off_route_reported = false;
        }
        None
    }

    /// End the session from any state. Only the first call emits `Stopped`.
    pub fn stop(&mut self) -> Vec<NavigationEvent> {
        if self.state.status == NavigationStatus::Stopped {
            return Vec::new();
        }
        info!(from = %self.state.status, "navigation stopped");
        self.state.status = NavigationStatus::Stopped;
        vec![NavigationEvent::Stopped]
    }

    /// Re-anchor the local frame; step index, speed samples and off-route state are kept
    pub fn recenter(&mut self, origin: GeoPoint) -> NavigationResult<()> {
        validate_position(&origin)?;
        let placement = match (&mut self.placement, self.state.is_navigating()) {
            (Some(placement), true) => placement,
            _ => return Err(NavigationError::NotNavigating),
        };
        placement.recenter(origin);
        self.state.origin = Some(origin);
        info!(%origin, "local frame recentered");
        Ok(())
    }

    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    pub fn status(&self) -> NavigationStatus {
        self.state.status
    }

    pub fn current_step_index(&self) -> usize {
        self.state.current_step_index
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn placement(&self) -> Option<&RoutePlacement> {
        self.placement.as_ref()
    }

    /// Renderer-facing placement data; empty before the first start
    pub fn placement_records(&self) -> Vec<PlacementRecord> {
        self.placement.as_ref().map(RoutePlacement::records).unwrap_or_default()
    }

    pub fn total_distance_m(&self) -> f64 {
        self.total_distance_m
    }

    pub fn average_speed_ms(&self) -> f64 {
        self.speed.average()
    }

    pub fn config(&self) -> &NavigationConfig {
        &self.config
    }
}

/// Index of the route point nearest to `position`; the lowest index wins ties
fn closest_point_index(points: &[GeoPoint], position: &GeoPoint) -> usize {
    let mut best = (0, f64::INFINITY);
    for (index, point) in points.iter().enumerate() {
        let d = geodesy::distance(position, point);
        if d < best.1 {
            best = (index, d);
        }
    }
    best.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ManeuverType;
    use proptest::prelude::*;

    fn equator_route(count: usize, step_deg: f64, steps: &[&str]) -> Route {
        Route::new(
            (0..count).map(|i| GeoPoint::new(0.0, i as f64 * step_deg)).collect(),
            steps.iter().map(|s| s.to_string()).collect(),
        )
    }

    fn updated(events: &[NavigationEvent]) -> &NavigationUpdate {
        events
            .iter()
            .find_map(|e| match e {
                NavigationEvent::Updated(update) => Some(update),
                _ => None,
            })
            .expect("no Updated event")
    }

    fn started_tracker(route: Route) -> ProgressTracker {
        let mut tracker = ProgressTracker::default();
        tracker.start(route).unwrap();
        tracker
    }

    #[test]
    fn test_three_point_scenario() {
        let route = equator_route(3, 0.001, &["go", "arrive"]);
        let points = route.points.clone();
        let mut tracker = ProgressTracker::default();

        let started = tracker.start(route).unwrap();
        match &started[..] {
            [NavigationEvent::Started {
                waypoint_count,
                step_count,
                total_distance_m,
            }] => {
                assert_eq!(*waypoint_count, 3);
                assert_eq!(*step_count, 2);
                assert!((total_distance_m - geodesy::path_length(&points)).abs() < 1e-9);
            }
            other => panic!("unexpected {:?}", other),
        }

        let now = Utc::now();
        let events = tracker.update(GeoPoint::new(0.0, 0.0005), None, now);
        let update = updated(&events);

        // equidistant from points 0 and 1: the lower index wins
        assert_eq!(update.closest_point_index, 0);
        let expected_remaining = geodesy::path_length(&points);
        assert!((update.remaining_distance_m - expected_remaining).abs() < 1e-9);
        assert_eq!(update.current_step_index, 0);
        assert_eq!(update.progress_percent, 0);

        let default_speed = 30.0 / 3.6;
        assert!((update.average_speed_ms - default_speed).abs() < 1e-9);
        assert!((update.remaining_time_s - expected_remaining / default_speed).abs() < 1e-9);

        let eta_ms = (update.arrival_time - now).num_milliseconds();
        assert!((eta_ms as f64 - update.remaining_time_s * 1000.0).abs() <= 1.0);

        assert!(matches!(events.last(), Some(NavigationEvent::Updated(_))));
        assert_eq!(
            update.upcoming.map(|u| u.maneuver),
            Some(ManeuverType::Destination)
        );
    }

    #[test]
    fn test_closest_point_ties_resolve_to_lowest_index() {
        let points = vec![
            GeoPoint::new(0.0, -0.001),
            GeoPoint::new(0.0, 0.001),
            GeoPoint::new(0.0, 0.001),
        ];
        assert_eq!(closest_point_index(&points, &GeoPoint::new(0.0, 0.0)), 0);
        assert_eq!(closest_point_index(&points, &GeoPoint::new(0.0, 0.002)), 1);
        assert_eq!(closest_point_index(&points[..1], &GeoPoint::new(10.0, 10.0)), 0);
    }

    #[test]
    fn test_unvalidated_arrow_spacing_stays_bounded() {
        let config = NavigationConfig {
            arrow_spacing_m: 0.0,
            ..NavigationConfig::default()
        };
        let mut tracker = ProgressTracker::new(config);
        tracker.start(equator_route(2, 0.01, &["go"])).unwrap();

        let arrows = tracker.placement().unwrap().arrows().len();
        assert!(arrows <= crate::core::MAX_ARROWS_PER_SEGMENT + 1, "got {}", arrows);
        assert!(!tracker.update(GeoPoint::new(0.0, 0.001), None, Utc::now()).is_empty());
    }

    #[test]
    fn test_step_change_emitted_before_update() {
        let mut tracker = started_tracker(equator_route(3, 0.001, &["go", "arrive"]));
        let events = tracker.update(GeoPoint::new(0.0, 0.00095), None, Utc::now());

        assert_eq!(
            events[0],
            NavigationEvent::StepChanged {
                index: 1,
                instruction: "arrive".to_string()
            }
        );
        let update = updated(&events);
        assert_eq!(update.current_step_index, 1);
        assert_eq!(update.next_instruction, "arrive");
        assert_eq!(update.instruction_maneuver, InstructionManeuver::Arrive);
        assert_eq!(update.progress_percent, 33);
    }

    #[test]
    fn test_step_index_does_not_regress() {
        let mut tracker = started_tracker(equator_route(10, 0.001, &["a", "b", "c", "d", "e"]));
        let now = Utc::now();

        tracker.update(GeoPoint::new(0.0, 0.0045), None, now);
        assert_eq!(tracker.current_step_index(), 2);

        let events = tracker.update(GeoPoint::new(0.0, 0.0), None, now);
        assert_eq!(tracker.current_step_index(), 2);
        assert!(!events.iter().any(|e| matches!(e, NavigationEvent::StepChanged { .. })));
        assert_eq!(updated(&events).next_instruction, "c");
    }

    #[test]
    fn test_arrival_fires_once() {
        let mut tracker = started_tracker(equator_route(3, 0.001, &["go", "arrive"]));
        let now = Utc::now();

        // ~50.1 m from the destination
        let events = tracker.update(GeoPoint::new(0.0, 0.00155), None, now);
        assert!(!events.contains(&NavigationEvent::Arrived));
        assert_eq!(tracker.status(), NavigationStatus::Navigating);

        // ~49 m
        let events = tracker.update(GeoPoint::new(0.0, 0.00156), None, now);
        assert_eq!(events, vec![NavigationEvent::Arrived]);
        assert_eq!(tracker.status(), NavigationStatus::Arrived);

        assert!(tracker.update(GeoPoint::new(0.0, 0.002), None, now).is_empty());
        assert!(tracker.update(GeoPoint::new(0.0, 0.0), None, now).is_empty());
    }

    #[test]
    fn test_empty_route_rejected() {
        let mut tracker = ProgressTracker::default();
        assert_eq!(tracker.start(Route::default()), Err(NavigationError::EmptyRoute));
        assert_eq!(tracker.status(), NavigationStatus::Idle);
        assert!(tracker.update(GeoPoint::new(0.0, 0.0), None, Utc::now()).is_empty());
    }

    #[test]
    fn test_invalid_route_point_rejected() {
        let mut tracker = ProgressTracker::default();
        let route = Route::new(vec![GeoPoint::new(0.0, 0.0), GeoPoint::new(95.0, 0.0)], vec![]);
        assert!(matches!(
            tracker.start(route),
            Err(NavigationError::InvalidCoordinate { index: 1, .. })
        ));
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut tracker = started_tracker(equator_route(3, 0.001, &["go"]));

        assert_eq!(tracker.stop(), vec![NavigationEvent::Stopped]);
        assert!(tracker.stop().is_empty());
        assert_eq!(tracker.status(), NavigationStatus::Stopped);
        assert!(tracker.update(GeoPoint::new(0.0, 0.0005), None, Utc::now()).is_empty());

        // a fresh start leaves the terminal state
        tracker.start(equator_route(3, 0.001, &["go"])).unwrap();
        assert_eq!(tracker.status(), NavigationStatus::Navigating);
        assert_eq!(tracker.current_step_index(), 0);
    }

    #[test]
    fn test_restart_discards_speed_samples() {
        let mut tracker = started_tracker(equator_route(10, 0.001, &["go"]));
        tracker.update(GeoPoint::new(0.0, 0.0), Some(20.0), Utc::now());
        assert!((tracker.average_speed_ms() - 20.0).abs() < 1e-9);

        tracker.start(equator_route(10, 0.001, &["go"])).unwrap();
        assert!((tracker.average_speed_ms() - 30.0 / 3.6).abs() < 1e-9);
    }

    #[test]
    fn test_stop_from_idle() {
        let mut tracker = ProgressTracker::default();
        assert_eq!(tracker.stop(), vec![NavigationEvent::Stopped]);
        assert_eq!(tracker.status(), NavigationStatus::Stopped);
    }

    #[test]
    fn test_routes_without_steps_use_default_instruction() {
        let mut tracker = started_tracker(equator_route(5, 0.001, &[]));
        let events = tracker.update(GeoPoint::new(0.0, 0.002), None, Utc::now());

        assert_eq!(events.len(), 1);
        let update = updated(&events);
        assert_eq!(update.next_instruction, DEFAULT_INSTRUCTION);
        assert_eq!(update.current_step_index, 0);
    }

    #[test]
    fn test_speed_samples_drive_remaining_time() {
        let mut tracker = started_tracker(equator_route(10, 0.001, &["go"]));
        let now = Utc::now();

        tracker.update(GeoPoint::new(0.0, 0.0), Some(10.0), now);
        tracker.update(GeoPoint::new(0.0, 0.0), Some(500.0), now);
        let events = tracker.update(GeoPoint::new(0.0, 0.0), Some(10.0), now);

        let update = updated(&events);
        assert!((update.average_speed_ms - 10.0).abs() < 1e-9);
        assert!((update.remaining_time_s - update.remaining_distance_m / 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_remaining_distance_offset_flag() {
        let route = equator_route(3, 0.001, &["go"]);
        let position = GeoPoint::new(0.0002, 0.0);

        let mut plain = started_tracker(route.clone());
        let without = updated(&plain.update(position, None, Utc::now())).remaining_distance_m;

        let config = NavigationConfig {
            remaining_distance_includes_offset: true,
            ..NavigationConfig::default()
        };
        let mut with_offset = ProgressTracker::new(config);
        with_offset.start(route).unwrap();
        let with = updated(&with_offset.update(position, None, Utc::now())).remaining_distance_m;

        let offset = geodesy::distance(&position, &GeoPoint::new(0.0, 0.0));
        assert!((with - without - offset).abs() < 1e-9);
    }

    #[test]
    fn test_off_route_needs_confirmations_and_rearms() {
        let mut tracker = started_tracker(equator_route(11, 0.001, &["go"]));
        let now = Utc::now();
        let off = GeoPoint::new(0.001, 0.002);
        let on = GeoPoint::new(0.0, 0.002);

        let count_off_route = |events: &[NavigationEvent]| {
            events
                .iter()
                .filter(|e| matches!(e, NavigationEvent::OffRoute { .. }))
                .count()
        };

        assert_eq!(count_off_route(&tracker.update(off, None, now)), 0);
        assert_eq!(count_off_route(&tracker.update(off, None, now)), 0);
        let events = tracker.update(off, None, now);
        assert_eq!(count_off_route(&events), 1);
        match events.iter().find(|e| matches!(e, NavigationEvent::OffRoute { .. })) {
            Some(NavigationEvent::OffRoute { distance_m }) => assert!(*distance_m > 100.0),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(count_off_route(&tracker.update(off, None, now)), 0);

        tracker.update(on, None, now);
        for _ in 0..2 {
            assert_eq!(count_off_route(&tracker.update(off, None, now)), 0);
        }
        assert_eq!(count_off_route(&tracker.update(off, None, now)), 1);
    }

    #[test]
    fn test_off_route_disabled() {
        let config = NavigationConfig {
            off_route_threshold_m: None,
            ..NavigationConfig::default()
        };
        let mut tracker = ProgressTracker::new(config);
        tracker.start(equator_route(11, 0.001, &["go"])).unwrap();

        for _ in 0..10 {
            let events = tracker.update(GeoPoint::new(0.01, 0.002), None, Utc::now());
            assert!(!events.iter().any(|e| matches!(e, NavigationEvent::OffRoute { .. })));
        }
    }

    #[test]
    fn test_invalid_position_is_ignored() {
        let mut tracker = started_tracker(equator_route(3, 0.001, &["go"]));
        assert!(tracker.update(GeoPoint::new(f64::NAN, 0.0), None, Utc::now()).is_empty());
        assert_eq!(tracker.status(), NavigationStatus::Navigating);
        assert!(tracker.state().last_position.is_none());
    }

    #[test]
    fn test_visibility_and_records() {
        let mut tracker = started_tracker(equator_route(11, 0.001, &["go"]));
        assert!(!tracker.placement_records().is_empty());

        tracker.update(GeoPoint::new(0.0, 0.0), None, Utc::now());
        let placement = tracker.placement().unwrap();
        assert!(placement.waypoints()[0].visible);
        assert!(!placement.waypoints().last().unwrap().visible);
    }

    #[test]
    fn test_recenter_requires_session() {
        let mut tracker = ProgressTracker::default();
        assert_eq!(
            tracker.recenter(GeoPoint::new(0.0, 0.0)),
            Err(NavigationError::NotNavigating)
        );

        let mut tracker = started_tracker(equator_route(3, 0.001, &["go", "arrive"]));
        tracker.update(GeoPoint::new(0.0, 0.00095), None, Utc::now());
        let new_origin = GeoPoint::new(0.0, 0.001);
        tracker.recenter(new_origin).unwrap();

        assert_eq!(tracker.state().origin, Some(new_origin));
        assert_eq!(tracker.current_step_index(), 1);
        let second = &tracker.placement().unwrap().waypoints()[1];
        assert!(second.local.east().abs() < 1e-6);
    }

    proptest! {
        #[test]
        fn prop_step_index_never_decreases(lons in prop::collection::vec(0.0f64..0.04, 1..30)) {
            let mut tracker = started_tracker(equator_route(50, 0.001, &["a", "b", "c", "d", "e"]));
            let now = Utc::now();
            let mut previous = tracker.current_step_index();

            for lon in lons {
                tracker.update(GeoPoint::new(0.0, lon), None, now);
                let current = tracker.current_step_index();
                prop_assert!(current >= previous);
                prop_assert!(current < 5);
                previous = current;
            }
        }
    }
}
