//! Session state machine and progress tracking

pub mod session;
pub mod state;
pub mod tracker;

pub use session::NavigationSession;
pub use state::{NavigationState, NavigationStatus};
pub use tracker::ProgressTracker;
