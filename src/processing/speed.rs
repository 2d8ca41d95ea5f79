//! Rolling travel speed estimate for ETA computation

use crate::core::{
    kmh_to_ms, DEFAULT_AVERAGE_SPEED_KMH, DEFAULT_MAX_PLAUSIBLE_SPEED_KMH,
    DEFAULT_MIN_MOVING_SPEED_KMH, DEFAULT_SPEED_SAMPLE_WINDOW,
};
use std::collections::VecDeque;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct SpeedEstimator {
    samples: VecDeque<f64>,
    /// Maximum number of retained samples
    pub window: usize,
    /// Returned when the buffer is empty or the mean looks stationary (m/s)
    pub default_speed_ms: f64,
    /// Means below this count as stationary (m/s)
    pub min_moving_speed_ms: f64,
    /// Samples at or above this are discarded (m/s)
    pub max_plausible_speed_ms: f64,
}

impl Default for SpeedEstimator {
    fn default() -> Self {
        Self::new(
            DEFAULT_SPEED_SAMPLE_WINDOW,
            kmh_to_ms(DEFAULT_AVERAGE_SPEED_KMH),
            kmh_to_ms(DEFAULT_MIN_MOVING_SPEED_KMH),
            kmh_to_ms(DEFAULT_MAX_PLAUSIBLE_SPEED_KMH),
        )
    }
}

impl SpeedEstimator {
    pub fn new(
        window: usize,
        default_speed_ms: f64,
        min_moving_speed_ms: f64,
        max_plausible_speed_ms: f64,
    ) -> Self {
        let window = window.max(1);
        Self {
            samples: VecDeque::with_capacity(window),
            window,
            default_speed_ms,
            min_moving_speed_ms,
            max_plausible_speed_ms,
        }
    }

    /// Record an instantaneous speed. Implausible values are dropped;
    /// returns whether the sample was kept.
    pub fn add_sample(&mut self, speed_ms: f64) -> bool {
        if !(speed_ms >= 0.0 && speed_ms < self.max_plausible_speed_ms) {
            debug!(speed_ms, "discarding implausible speed sample");
            return false;
        }

        self.samples.push_back(speed_ms);
        while self.samples.len() > self.window {
            self.samples.pop_front();
        }
        true
    }

    /// Mean of retained samples, or the default when empty or near stationary
    pub fn average(&self) -> f64 {
        if self.samples.is_empty() {
            return self.default_speed_ms;
        }

        let mean = self.samples.iter().sum::<f64>() / self.samples.len() as f64;
        if mean < self.min_moving_speed_ms {
            self.default_speed_ms
        } else {
            mean
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_returns_default() {
        let est = SpeedEstimator::default();
        assert!((est.average() - 8.33).abs() < 0.01);
    }

    #[test]
    fn test_mean_of_samples() {
        let mut est = SpeedEstimator::default();
        for v in [10.0, 12.0, 11.0] {
            assert!(est.add_sample(v));
        }
        assert!((est.average() - 11.0).abs() < 1e-12);
    }

    #[test]
    fn test_stationary_falls_back_to_default() {
        let mut est = SpeedEstimator::default();
        for v in [0.0, 0.5, 1.2, 1.0] {
            est.add_sample(v);
        }
        assert_eq!(est.len(), 4);
        assert!((est.average() - 8.33).abs() < 0.01);
    }

    #[test]
    fn test_implausible_samples_dropped() {
        let mut est = SpeedEstimator::default();
        assert!(!est.add_sample(-1.0));
        assert!(!est.add_sample(42.0));
        assert!(!est.add_sample(f64::NAN));
        assert!(est.is_empty());
        assert!(est.add_sample(41.0));
    }

    #[test]
    fn test_window_evicts_oldest() {
        let mut est = SpeedEstimator::default();
        for _ in 0..10 {
            est.add_sample(2.0);
        }
        for _ in 0..10 {
            est.add_sample(20.0);
        }
        assert_eq!(est.len(), 10);
        assert!((est.average() - 20.0).abs() < 1e-12);

        est.add_sample(9.0);
        assert_eq!(est.len(), 10);
        assert!((est.average() - (9.0 * 20.0 + 9.0) / 10.0).abs() < 1e-12);
    }
}
