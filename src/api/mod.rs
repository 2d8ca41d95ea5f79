//! Engine output types and presentation helpers
//!
//! Every engine call returns its events synchronously; the caller decides
//! where and how they are delivered.

pub mod formatting;
pub mod types;

pub use formatting::{FormattedUpdate, OutputFormat, UpdateFormatter};
pub use types::{InstructionManeuver, NavigationEvent, NavigationUpdate, UpcomingManeuver};
