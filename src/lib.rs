//! Route Navigation Engine
//!
//! Real-time route tracking in a local planar frame: simplifies and
//! classifies a geodetic route, smooths GPS fixes, tracks progress and
//! produces distance, time and arrival estimates on every fix.

pub mod core;
pub mod algorithms;
pub mod processing;
pub mod navigation;
pub mod validation;
pub mod utils;
pub mod api;

// Re-export commonly used types
pub use core::{GeoPoint, LocalPoint, LocationFix, ManeuverType, Route};
pub use algorithms::{PlacementRecord, RoutePlacement, RouteSimplifier, TurnClassifier, TurnSignConvention};
pub use processing::{PositionFilter, ScalarKalmanFilter, SpeedEstimator};
pub use navigation::{NavigationSession, NavigationState, NavigationStatus, ProgressTracker};
pub use validation::{NavigationError, NavigationResult};
pub use utils::{ConfigError, ConfigurationManager, NavigationConfig};
pub use api::{NavigationEvent, NavigationUpdate, OutputFormat, UpdateFormatter};
