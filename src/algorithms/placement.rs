//! Geometric placement of waypoints and directional arrow guides
//!
//! The engine only produces placement data; whatever draws it owns its
//! own drawable objects and rebuilds them from [`PlacementRecord`]s.

use crate::algorithms::geodesy;
use crate::api::types::UpcomingManeuver;
use crate::core::{
    GeoPoint, LocalPoint, ManeuverType, DEFAULT_ARROW_SPACING_M,
    DEFAULT_MAX_VISIBILITY_DISTANCE_M, DEFAULT_OBJECT_HEIGHT_M, MAX_ARROWS_PER_SEGMENT,
    MIN_ARROW_SPACING_M,
};
use serde::{Deserialize, Serialize};

/// Classified point along the simplified route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub position: GeoPoint,
    pub local: LocalPoint,
    pub maneuver: ManeuverType,
    /// Contiguous from 0 in route order
    pub index: usize,
    /// Local-frame distance to the user at the last update (m)
    pub distance_from_user_m: f64,
    pub visible: bool,
}

impl Waypoint {
    pub fn update_distance(&mut self, user: &LocalPoint) {
        self.distance_from_user_m = self.local.distance_to(user);
    }

    pub fn should_be_visible(&self, max_distance_m: f64) -> bool {
        self.distance_from_user_m <= max_distance_m
    }
}

/// Arrow placed at a regular spacing along a simplified segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrowGuide {
    pub position: GeoPoint,
    pub local: LocalPoint,
    /// Bearing of the segment the arrow sits on (degrees)
    pub bearing_deg: f64,
    /// Maneuver of the segment's start waypoint
    pub maneuver: ManeuverType,
    /// Index of the segment's start waypoint
    pub segment: usize,
    pub distance_from_user_m: f64,
    pub visible: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementKind {
    Waypoint,
    Arrow,
}

/// Everything a renderer needs to place one object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementRecord {
    pub kind: PlacementKind,
    pub index: usize,
    pub local: LocalPoint,
    pub maneuver: ManeuverType,
    pub bearing_deg: Option<f64>,
    pub visible: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementParams {
    pub arrow_spacing_m: f64,
    pub object_height_m: f64,
    pub max_visibility_distance_m: f64,
}

impl Default for PlacementParams {
    fn default() -> Self {
        Self {
            arrow_spacing_m: DEFAULT_ARROW_SPACING_M,
            object_height_m: DEFAULT_OBJECT_HEIGHT_M,
            max_visibility_distance_m: DEFAULT_MAX_VISIBILITY_DISTANCE_M,
        }
    }
}

/// Waypoints and arrow guides projected around one origin
#[derive(Debug, Clone)]
pub struct RoutePlacement {
    origin: GeoPoint,
    waypoints: Vec<Waypoint>,
    arrows: Vec<ArrowGuide>,
    params: PlacementParams,
}

impl RoutePlacement {
    /// Build placement for a simplified route and its per-point maneuvers.
    ///
    /// `maneuvers` must be the same length as `points`; missing entries
    /// default to `Waypoint`.
    pub fn build(
        origin: GeoPoint,
        points: &[GeoPoint],
        maneuvers: &[ManeuverType],
        params: PlacementParams,
    ) -> Self {
        let waypoints = points
            .iter()
            .enumerate()
            .map(|(index, position)| Waypoint {
                position: *position,
                local: geodesy::project_to_local(&origin, position, params.object_height_m),
                maneuver: maneuvers.get(index).copied().unwrap_or(ManeuverType::Waypoint),
                index,
                distance_from_user_m: 0.0,
                visible: true,
            })
            .collect::<Vec<_>>();

        let arrows = Self::build_arrows(&origin, &waypoints, &params);

        Self {
            origin,
            waypoints,
            arrows,
            params,
        }
    }

    /// Spacing is floored at [`MIN_ARROW_SPACING_M`] and each segment gets at
    /// most [`MAX_ARROWS_PER_SEGMENT`] intervals, whatever the params say.
    fn build_arrows(origin: &GeoPoint, waypoints: &[Waypoint], params: &PlacementParams) -> Vec<ArrowGuide> {
        let mut arrows = Vec::new();
        let spacing = params.arrow_spacing_m.max(MIN_ARROW_SPACING_M);

        for pair in waypoints.windows(2) {
            let (start, end) = (&pair[0], &pair[1]);
            let segment_length = geodesy::distance(&start.position, &end.position);
            let intervals = ((segment_length / spacing) as usize).clamp(1, MAX_ARROWS_PER_SEGMENT);
            let bearing = geodesy::bearing(&start.position, &end.position);

            for j in 0..=intervals {
                let fraction = j as f64 / intervals as f64;
                let position = geodesy::interpolate(&start.position, &end.position, fraction);
                arrows.push(ArrowGuide {
                    position,
                    local: geodesy::project_to_local(origin, &position, params.object_height_m),
                    bearing_deg: bearing,
                    maneuver: start.maneuver,
                    segment: start.index,
                    distance_from_user_m: 0.0,
                    visible: true,
                });
            }
        }

        arrows
    }

    /// Re-project everything around a new origin
    pub fn recenter(&mut self, origin: GeoPoint) {
        self.origin = origin;
        let height = self.params.object_height_m;
        for waypoint in &mut self.waypoints {
            waypoint.local = geodesy::project_to_local(&origin, &waypoint.position, height);
        }
        for arrow in &mut self.arrows {
            arrow.local = geodesy::project_to_local(&origin, &arrow.position, height);
        }
    }

    /// User position in this placement's local frame, at object height
    pub fn to_local(&self, position: &GeoPoint) -> LocalPoint {
        geodesy::project_to_local(&self.origin, position, self.params.object_height_m)
    }

    /// Refresh distances and visibility against the user position
    pub fn update_visibility(&mut self, user: &LocalPoint) {
        let max = self.params.max_visibility_distance_m;
        for waypoint in &mut self.waypoints {
            waypoint.update_distance(user);
            waypoint.visible = waypoint.should_be_visible(max);
        }
        for arrow in &mut self.arrows {
            arrow.distance_from_user_m = arrow.local.distance_to(user);
            arrow.visible = arrow.distance_from_user_m <= max;
        }
    }

    /// Index of the waypoint nearest to `user`; the lowest index wins ties
    pub fn closest_waypoint_index(&self, user: &LocalPoint) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for waypoint in &self.waypoints {
            let d = waypoint.local.distance_to(user);
            if best.map_or(true, |(_, min)| d < min) {
                best = Some((waypoint.index, d));
            }
        }
        best.map(|(index, _)| index)
    }

    /// First turn or destination at or after the waypoint nearest the user.
    ///
    /// Reads the distances from the last [`update_visibility`](Self::update_visibility).
    pub fn upcoming_maneuver(&self, user: &LocalPoint) -> Option<UpcomingManeuver> {
        let from = self.closest_waypoint_index(user)?;
        self.waypoints[from..]
            .iter()
            .find(|w| w.maneuver.is_action())
            .map(|w| UpcomingManeuver {
                waypoint_index: w.index,
                maneuver: w.maneuver,
                distance_m: w.distance_from_user_m,
            })
    }

    pub fn records(&self) -> Vec<PlacementRecord> {
        let waypoints = self.waypoints.iter().map(|w| PlacementRecord {
            kind: PlacementKind::Waypoint,
            index: w.index,
            local: w.local,
            maneuver: w.maneuver,
            bearing_deg: None,
            visible: w.visible,
        });
        let arrows = self.arrows.iter().enumerate().map(|(i, a)| PlacementRecord {
            kind: PlacementKind::Arrow,
            index: i,
            local: a.local,
            maneuver: a.maneuver,
            bearing_deg: Some(a.bearing_deg),
            visible: a.visible,
        });
        waypoints.chain(arrows).collect()
    }

    pub fn origin(&self) -> GeoPoint {
        self.origin
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn arrows(&self) -> &[ArrowGuide] {
        &self.arrows
    }

}
