//! Error types for the navigation engine

use crate::utils::config::ConfigError;

/// Errors surfaced to callers of the engine.
///
/// Only session setup and configuration can fail; position updates
/// degrade instead of erroring.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NavigationError {
    #[error("route has no points")]
    EmptyRoute,

    #[error("route point {index} has invalid coordinates ({latitude}, {longitude})")]
    InvalidCoordinate {
        index: usize,
        latitude: f64,
        longitude: f64,
    },

    #[error("invalid location fix: {reason}")]
    InvalidFix { reason: String },

    #[error("no navigation session is active")]
    NotNavigating,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for engine operations
pub type NavigationResult<T> = Result<T, NavigationError>;
