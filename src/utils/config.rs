use crate::algorithms::placement::PlacementParams;
use crate::algorithms::simplify::RouteSimplifier;
use crate::algorithms::turns::{TurnClassifier, TurnSignConvention};
use crate::core::*;
use crate::processing::{PositionFilter, SpeedEstimator};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Navigation engine parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// Distance below which arrival fires (meters)
    pub arrival_threshold_m: f64,
    /// Minimum spacing between kept waypoints (meters)
    pub simplification_spacing_m: f64,
    /// Bearing delta below which a waypoint is CONTINUE (degrees)
    pub turn_angle_threshold_deg: f64,
    /// Waypoints and arrows further away are marked not visible (meters)
    pub max_visibility_distance_m: f64,
    /// Fallback speed when no usable samples exist (km/h)
    pub default_average_speed_kmh: f64,
    /// Rolling speed buffer size
    pub speed_sample_window: usize,
    /// Mean speeds below this use the default instead (km/h)
    pub min_moving_speed_kmh: f64,
    /// Samples at or above this are discarded (km/h)
    pub max_plausible_speed_kmh: f64,
    /// Cross-track distance that counts as off route; `None` disables detection (meters)
    pub off_route_threshold_m: Option<f64>,
    /// Consecutive off-route updates before the event fires
    pub off_route_confirmations: u32,
    /// Spacing of arrow guides along segments (meters)
    pub arrow_spacing_m: f64,
    /// Height of placed objects in the local frame (meters)
    pub object_height_m: f64,
    /// Which side a positive bearing delta turns to
    pub turn_sign_convention: TurnSignConvention,
    /// Add the gap between the position and the nearest route point to the remaining distance
    pub remaining_distance_includes_offset: bool,
    /// Start the smoother at the first fix instead of converging from zero
    pub seed_smoother_with_first_fix: bool,
    pub smoother_process_noise: f64,
    pub smoother_measurement_noise: f64,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            arrival_threshold_m: DEFAULT_ARRIVAL_THRESHOLD_M,
            simplification_spacing_m: DEFAULT_SIMPLIFICATION_SPACING_M,
            turn_angle_threshold_deg: DEFAULT_TURN_ANGLE_THRESHOLD_DEG,
            max_visibility_distance_m: DEFAULT_MAX_VISIBILITY_DISTANCE_M,
            default_average_speed_kmh: DEFAULT_AVERAGE_SPEED_KMH,
            speed_sample_window: DEFAULT_SPEED_SAMPLE_WINDOW,
            min_moving_speed_kmh: DEFAULT_MIN_MOVING_SPEED_KMH,
            max_plausible_speed_kmh: DEFAULT_MAX_PLAUSIBLE_SPEED_KMH,
            off_route_threshold_m: Some(DEFAULT_OFF_ROUTE_THRESHOLD_M),
            off_route_confirmations: DEFAULT_OFF_ROUTE_CONFIRMATIONS,
            arrow_spacing_m: DEFAULT_ARROW_SPACING_M,
            object_height_m: DEFAULT_OBJECT_HEIGHT_M,
            turn_sign_convention: TurnSignConvention::Compass,
            remaining_distance_includes_offset: false,
            seed_smoother_with_first_fix: true,
            smoother_process_noise: DEFAULT_PROCESS_NOISE,
            smoother_measurement_noise: DEFAULT_MEASUREMENT_NOISE,
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// Invalid parameter value
    #[error("invalid {parameter} = {value}: {reason}")]
    InvalidParameter {
        parameter: String,
        value: String,
        reason: String,
    },
    /// Configuration file I/O error
    #[error("config I/O error: {message}")]
    IoError { message: String },
    /// JSON serialization/deserialization error
    #[error("config serialization error: {message}")]
    SerializationError { message: String },
}

fn invalid(parameter: &str, value: impl ToString, reason: &str) -> ConfigError {
    ConfigError::InvalidParameter {
        parameter: parameter.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Require `min < value <= max`
fn check_positive_up_to(parameter: &str, value: f64, max: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid(parameter, value, "must be a positive number"));
    }
    if value > max {
        return Err(invalid(parameter, value, &format!("must not exceed {}", max)));
    }
    Ok(())
}

impl NavigationConfig {
    /// Check every field; the first violation is returned
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_positive_up_to("arrival_threshold_m", self.arrival_threshold_m, 1000.0)?;
        check_positive_up_to("simplification_spacing_m", self.simplification_spacing_m, 10_000.0)?;
        check_positive_up_to("max_visibility_distance_m", self.max_visibility_distance_m, 10_000.0)?;
        check_positive_up_to("arrow_spacing_m", self.arrow_spacing_m, 1000.0)?;
        if self.arrow_spacing_m < MIN_ARROW_SPACING_M {
            return Err(invalid(
                "arrow_spacing_m",
                self.arrow_spacing_m,
                &format!("must be at least {} m", MIN_ARROW_SPACING_M),
            ));
        }
        check_positive_up_to("max_plausible_speed_kmh", self.max_plausible_speed_kmh, 1000.0)?;
        check_positive_up_to("smoother_process_noise", self.smoother_process_noise, f64::MAX)?;
        check_positive_up_to("smoother_measurement_noise", self.smoother_measurement_noise, f64::MAX)?;

        if !(self.turn_angle_threshold_deg > 0.0 && self.turn_angle_threshold_deg < 180.0) {
            return Err(invalid(
                "turn_angle_threshold_deg",
                self.turn_angle_threshold_deg,
                "must be between 0 and 180 degrees (exclusive)",
            ));
        }

        if !(self.default_average_speed_kmh > 0.0
            && self.default_average_speed_kmh < self.max_plausible_speed_kmh)
        {
            return Err(invalid(
                "default_average_speed_kmh",
                self.default_average_speed_kmh,
                "must be positive and below max_plausible_speed_kmh",
            ));
        }

        if !(self.min_moving_speed_kmh >= 0.0
            && self.min_moving_speed_kmh < self.default_average_speed_kmh)
        {
            return Err(invalid(
                "min_moving_speed_kmh",
                self.min_moving_speed_kmh,
                "must be non-negative and below default_average_speed_kmh",
            ));
        }

        if self.speed_sample_window == 0 || self.speed_sample_window > 1000 {
            return Err(invalid(
                "speed_sample_window",
                self.speed_sample_window,
                "must be between 1 and 1000",
            ));
        }

        if let Some(threshold) = self.off_route_threshold_m {
            check_positive_up_to("off_route_threshold_m", threshold, 10_000.0)?;
        }

        if self.off_route_confirmations == 0 || self.off_route_confirmations > 100 {
            return Err(invalid(
                "off_route_confirmations",
                self.off_route_confirmations,
                "must be between 1 and 100",
            ));
        }

        if !(self.object_height_m.is_finite() && self.object_height_m.abs() <= 100.0) {
            return Err(invalid(
                "object_height_m",
                self.object_height_m,
                "must be within 100 m of the ground plane",
            ));
        }

        Ok(())
    }

    pub fn default_average_speed_ms(&self) -> f64 {
        kmh_to_ms(self.default_average_speed_kmh)
    }

    pub fn min_moving_speed_ms(&self) -> f64 {
        kmh_to_ms(self.min_moving_speed_kmh)
    }

    pub fn max_plausible_speed_ms(&self) -> f64 {
        kmh_to_ms(self.max_plausible_speed_kmh)
    }

    pub fn simplifier(&self) -> RouteSimplifier {
        RouteSimplifier::new(self.simplification_spacing_m)
    }

    pub fn turn_classifier(&self) -> TurnClassifier {
        TurnClassifier::new(self.turn_angle_threshold_deg, self.turn_sign_convention)
    }

    pub fn speed_estimator(&self) -> SpeedEstimator {
        SpeedEstimator::new(
            self.speed_sample_window,
            self.default_average_speed_ms(),
            self.min_moving_speed_ms(),
            self.max_plausible_speed_ms(),
        )
    }

    pub fn placement_params(&self) -> PlacementParams {
        PlacementParams {
            arrow_spacing_m: self.arrow_spacing_m,
            object_height_m: self.object_height_m,
            max_visibility_distance_m: self.max_visibility_distance_m,
        }
    }

    pub fn position_filter(&self) -> PositionFilter {
        PositionFilter::new(
            self.smoother_process_noise,
            self.smoother_measurement_noise,
            self.seed_smoother_with_first_fix,
        )
    }
}

/// Holds the active configuration, its backing file and modification state
pub struct ConfigurationManager {
    config: NavigationConfig,
    config_file_path: Option<String>,
    is_modified: bool,
}

impl Default for ConfigurationManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigurationManager {
    pub fn new() -> Self {
        Self {
            config: NavigationConfig::default(),
            config_file_path: None,
            is_modified: false,
        }
    }

    /// Create configuration manager and load from file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut manager = Self::new();
        manager.load_from_file(path)?;
        Ok(manager)
    }

    pub fn config(&self) -> &NavigationConfig {
        &self.config
    }

    /// Replace the whole configuration after validating it
    pub fn update_config(&mut self, config: NavigationConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.config = config;
        self.is_modified = true;
        Ok(())
    }

    /// Load configuration from JSON file; missing fields take their defaults
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ConfigError> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let content = fs::read_to_string(&path).map_err(|e| ConfigError::IoError {
            message: format!("Failed to read config file '{}': {}", path_str, e),
        })?;

        let config: NavigationConfig =
            serde_json::from_str(&content).map_err(|e| ConfigError::SerializationError {
                message: format!("Failed to parse config file '{}': {}", path_str, e),
            })?;

        config.validate()?;

        self.config = config;
        self.config_file_path = Some(path_str);
        self.is_modified = false;
        Ok(())
    }

    /// Save configuration to JSON file
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ConfigError> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let content = serde_json::to_string_pretty(&self.config).map_err(|e| {
            ConfigError::SerializationError {
                message: format!("Failed to serialize config: {}", e),
            }
        })?;

        fs::write(&path, content).map_err(|e| ConfigError::IoError {
            message: format!("Failed to write config file '{}': {}", path_str, e),
        })?;

        self.config_file_path = Some(path_str);
        self.is_modified = false;
        Ok(())
    }

    /// Save to the currently loaded file path
    pub fn save(&mut self) -> Result<(), ConfigError> {
        match self.config_file_path.clone() {
            Some(path) => self.save_to_file(path),
            None => Err(ConfigError::IoError {
                message: "No file path set for saving configuration".to_string(),
            }),
        }
    }

    /// Check if configuration has been modified since last save
    pub fn is_modified(&self) -> bool {
        self.is_modified
    }

    /// Apply a single-field change, validate the result and return the previous value
    fn set_field<T: Clone>(
        &mut self,
        value: T,
        field: impl Fn(&mut NavigationConfig) -> &mut T,
    ) -> Result<T, ConfigError> {
        let mut candidate = self.config.clone();
        let old_value = std::mem::replace(field(&mut candidate), value);
        candidate.validate()?;
        self.config = candidate;
        self.is_modified = true;
        Ok(old_value)
    }

    pub fn set_arrival_threshold(&mut self, meters: f64) -> Result<f64, ConfigError> {
        self.set_field(meters, |c| &mut c.arrival_threshold_m)
    }

    pub fn set_simplification_spacing(&mut self, meters: f64) -> Result<f64, ConfigError> {
        self.set_field(meters, |c| &mut c.simplification_spacing_m)
    }

    pub fn set_turn_angle_threshold(&mut self, degrees: f64) -> Result<f64, ConfigError> {
        self.set_field(degrees, |c| &mut c.turn_angle_threshold_deg)
    }

    pub fn set_max_visibility_distance(&mut self, meters: f64) -> Result<f64, ConfigError> {
        self.set_field(meters, |c| &mut c.max_visibility_distance_m)
    }

    pub fn set_default_average_speed(&mut self, kmh: f64) -> Result<f64, ConfigError> {
        self.set_field(kmh, |c| &mut c.default_average_speed_kmh)
    }

    pub fn set_speed_sample_window(&mut self, samples: usize) -> Result<usize, ConfigError> {
        self.set_field(samples, |c| &mut c.speed_sample_window)
    }

    pub fn set_off_route_threshold(&mut self, meters: Option<f64>) -> Result<Option<f64>, ConfigError> {
        self.set_field(meters, |c| &mut c.off_route_threshold_m)
    }

    pub fn set_turn_sign_convention(&mut self, convention: TurnSignConvention) -> TurnSignConvention {
        self.is_modified = true;
        std::mem::replace(&mut self.config.turn_sign_convention, convention)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("route_nav_{}_{}.json", name, std::process::id()))
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = NavigationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.arrival_threshold_m, 50.0);
        assert_eq!(config.simplification_spacing_m, 20.0);
        assert_eq!(config.turn_angle_threshold_deg, 20.0);
        assert_eq!(config.max_visibility_distance_m, 100.0);
        assert_eq!(config.default_average_speed_kmh, 30.0);
        assert_eq!(config.speed_sample_window, 10);
        assert!((config.default_average_speed_ms() - 8.333).abs() < 0.001);
    }

    #[test]
    fn test_component_builders_follow_config() {
        let config = NavigationConfig {
            speed_sample_window: 4,
            turn_sign_convention: TurnSignConvention::Legacy,
            ..NavigationConfig::default()
        };
        assert_eq!(config.speed_estimator().window, 4);
        assert_eq!(config.turn_classifier().convention, TurnSignConvention::Legacy);
        assert_eq!(config.placement_params(), PlacementParams::default());
        assert!((config.speed_estimator().average() - 30.0 / 3.6).abs() < 1e-9);
    }

    #[test]
    fn test_setter_returns_old_value_and_marks_modified() {
        let mut manager = ConfigurationManager::new();
        assert!(!manager.is_modified());

        let old = manager.set_arrival_threshold(30.0).unwrap();
        assert_eq!(old, 50.0);
        assert_eq!(manager.config().arrival_threshold_m, 30.0);
        assert!(manager.is_modified());
    }

    #[test]
    fn test_invalid_setter_leaves_config_untouched() {
        let mut manager = ConfigurationManager::new();
        let err = manager.set_arrival_threshold(-5.0).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidParameter { ref parameter, .. } if parameter == "arrival_threshold_m"));
        assert_eq!(manager.config().arrival_threshold_m, 50.0);
        assert!(!manager.is_modified());

        assert!(manager.set_speed_sample_window(0).is_err());
        assert!(manager.set_turn_angle_threshold(180.0).is_err());
        assert!(manager.set_default_average_speed(200.0).is_err());
        assert!(manager.set_off_route_threshold(Some(0.0)).is_err());
        assert_eq!(manager.set_off_route_threshold(None).unwrap(), Some(50.0));
    }

    #[test]
    fn test_arrow_spacing_lower_bound() {
        let tiny = NavigationConfig {
            arrow_spacing_m: 0.001,
            ..NavigationConfig::default()
        };
        assert!(matches!(
            tiny.validate(),
            Err(ConfigError::InvalidParameter { ref parameter, .. }) if parameter == "arrow_spacing_m"
        ));

        let smallest = NavigationConfig {
            arrow_spacing_m: MIN_ARROW_SPACING_M,
            ..NavigationConfig::default()
        };
        assert!(smallest.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: NavigationConfig =
            serde_json::from_str(r#"{"arrival_threshold_m": 25.0, "turn_sign_convention": "legacy"}"#)
                .unwrap();
        assert_eq!(config.arrival_threshold_m, 25.0);
        assert_eq!(config.turn_sign_convention, TurnSignConvention::Legacy);
        assert_eq!(config.simplification_spacing_m, 20.0);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let path = temp_path("round_trip");

        let mut manager = ConfigurationManager::new();
        manager.set_simplification_spacing(35.0).unwrap();
        manager.save_to_file(&path).unwrap();
        assert!(!manager.is_modified());

        let loaded = ConfigurationManager::from_file(&path).unwrap();
        assert_eq!(loaded.config(), manager.config());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let path = temp_path("invalid");
        fs::write(&path, r#"{"speed_sample_window": 0}"#).unwrap();

        let result = ConfigurationManager::from_file(&path);
        assert!(matches!(result, Err(ConfigError::InvalidParameter { .. })));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_missing_file_and_bad_json() {
        assert!(matches!(
            ConfigurationManager::from_file("/nonexistent/route_nav.json"),
            Err(ConfigError::IoError { .. })
        ));

        let path = temp_path("bad_json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            ConfigurationManager::from_file(&path),
            Err(ConfigError::SerializationError { .. })
        ));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_save_without_path_fails() {
        let mut manager = ConfigurationManager::new();
        assert!(matches!(manager.save(), Err(ConfigError::IoError { .. })));
    }
}
