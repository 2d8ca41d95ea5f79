//! Input validation and error types

pub mod error;
pub mod route;

pub use error::{NavigationError, NavigationResult};
pub use route::{validate_fix, validate_position, validate_route};
