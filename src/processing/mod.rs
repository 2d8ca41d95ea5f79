//! Signal processing for noisy location input

pub mod kalman;
pub mod speed;

pub use kalman::{PositionFilter, ScalarKalmanFilter};
pub use speed::SpeedEstimator;
