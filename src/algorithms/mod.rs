//! Route geometry algorithms

pub mod geodesy;
pub mod placement;
pub mod simplify;
pub mod turns;

pub use placement::{PlacementParams, PlacementRecord, RoutePlacement};
pub use simplify::RouteSimplifier;
pub use turns::{TurnClassifier, TurnSignConvention};
