//! Core types and constants for route tracking

pub mod types;
pub mod constants;

pub use types::*;
pub use constants::*;
