use crate::core::{GeoPoint, DEFAULT_MEASUREMENT_NOISE, DEFAULT_PROCESS_NOISE};

/// One-dimensional Kalman filter with a constant-value motion model.
///
/// Used independently on latitude and longitude to damp receiver jitter.
#[derive(Debug, Clone)]
pub struct ScalarKalmanFilter {
    /// Current state estimate
    pub estimate: f64,
    /// Estimate variance
    pub error_covariance: f64,
    /// Variance added on every step
    pub process_noise: f64,
    /// Measurement variance
    pub measurement_noise: f64,
}

impl Default for ScalarKalmanFilter {
    fn default() -> Self {
        Self::with_noise_parameters(DEFAULT_PROCESS_NOISE, DEFAULT_MEASUREMENT_NOISE)
    }
}

impl ScalarKalmanFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create filter with custom noise parameters
    pub fn with_noise_parameters(process_noise: f64, measurement_noise: f64) -> Self {
        Self {
            estimate: 0.0,
            error_covariance: 1.0,
            process_noise,
            measurement_noise,
        }
    }

    /// Fold one measurement into the estimate and return the new estimate
    pub fn filter(&mut self, measurement: f64) -> f64 {
        // Predict
        self.error_covariance += self.process_noise;

        // Update
        let gain = self.error_covariance / (self.error_covariance + self.measurement_noise);
        self.estimate += gain * (measurement - self.estimate);
        self.error_covariance *= 1.0 - gain;

        self.estimate
    }

    /// Start the estimate at `value` instead of converging from zero.
    /// Covariance is left untouched.
    pub fn seed(&mut self, value: f64) {
        self.estimate = value;
    }

    /// Reset filter state
    pub fn reset(&mut self) {
        self.estimate = 0.0;
        self.error_covariance = 1.0;
    }
}

/// Smooths geodetic fixes with one scalar filter per axis
#[derive(Debug, Clone)]
pub struct PositionFilter {
    lat_filter: ScalarKalmanFilter,
    lon_filter: ScalarKalmanFilter,
    /// Seed both axes with the first fix after a reset
    seed_with_first_fix: bool,
    awaiting_first_fix: bool,
}

impl Default for PositionFilter {
    fn default() -> Self {
        Self::new(DEFAULT_PROCESS_NOISE, DEFAULT_MEASUREMENT_NOISE, false)
    }
}

impl PositionFilter {
    pub fn new(process_noise: f64, measurement_noise: f64, seed_with_first_fix: bool) -> Self {
        Self {
            lat_filter: ScalarKalmanFilter::with_noise_parameters(process_noise, measurement_noise),
            lon_filter: ScalarKalmanFilter::with_noise_parameters(process_noise, measurement_noise),
            seed_with_first_fix,
            awaiting_first_fix: true,
        }
    }

    pub fn filter(&mut self, position: &GeoPoint) -> GeoPoint {
        if self.seed_with_first_fix && self.awaiting_first_fix {
            self.lat_filter.seed(position.latitude);
            self.lon_filter.seed(position.longitude);
        }
        self.awaiting_first_fix = false;

        GeoPoint::new(
            self.lat_filter.filter(position.latitude),
            self.lon_filter.filter(position.longitude),
        )
    }

    pub fn reset(&mut self) {
        self.lat_filter.reset();
        self.lon_filter.reset();
        self.awaiting_first_fix = true;
    }

    pub fn latitude_filter(&self) -> &ScalarKalmanFilter {
        &self.lat_filter
    }

    pub fn longitude_filter(&self) -> &ScalarKalmanFilter {
        &self.lon_filter
    }
}
