// ABOUTME: Integration tests for form analysis configuration defaults, validation and overrides
// ABOUTME: Environment override tests run serially since they mutate process-wide variables
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::env;

use form_coach::core::errors::ErrorCode;
use form_coach::intelligence::config::{ConfigError, SmoothingAlgorithm};
use form_coach::{FormAnalysisConfig, FormAnalysisService};
use serial_test::serial;

const OVERRIDES: [&str; 6] = [
    "FORM_COACH_SMOOTHING",
    "FORM_COACH_VELOCITY_THRESHOLD",
    "FORM_COACH_NEAR_ZERO_THRESHOLD",
    "FORM_COACH_MIN_HISTORY_FRAMES",
    "FORM_COACH_SOLVER_SEED",
    "FORM_COACH_HISTORY_CAPACITY",
];

fn clear_overrides() {
    for name in OVERRIDES {
        env::remove_var(name);
    }
}

// ============================================================================
// Defaults and validation
// ============================================================================

#[test]
fn test_default_config_validation() {
    let config = FormAnalysisConfig::default();
    assert!(config.validate().is_ok());

    assert_eq!(
        config.preprocessing.smoothing,
        SmoothingAlgorithm::SavitzkyGolay {
            window: 7,
            poly_order: 2
        }
    );
    assert_eq!(config.aggregation.history_capacity, 100);
    assert_eq!(config.complex_systems.min_history_frames, 10);
    assert!((config.aggregation.unified_weights.total() - 1.0).abs() < 1e-12);
}

#[test]
fn test_zero_history_capacity_is_invalid() {
    let mut config = FormAnalysisConfig::default();
    config.aggregation.history_capacity = 0;

    assert!(matches!(
        config.validate(),
        Err(ConfigError::ValueOutOfRange(_))
    ));
}

#[test]
fn test_inverted_phase_thresholds_are_invalid() {
    let mut config = FormAnalysisConfig::default();
    config.phase_detection.near_zero_threshold = config.phase_detection.velocity_threshold;

    assert!(matches!(config.validate(), Err(ConfigError::InvalidRange(_))));
}

#[test]
fn test_unified_weights_must_sum_to_one() {
    let mut config = FormAnalysisConfig::default();
    config.aggregation.unified_weights.physics_efficiency += 0.1;

    assert!(matches!(config.validate(), Err(ConfigError::InvalidWeights(_))));
}

#[test]
fn test_invalid_smoothing_window_is_rejected() {
    let mut config = FormAnalysisConfig::default();
    config.preprocessing.smoothing = SmoothingAlgorithm::SavitzkyGolay {
        window: 4,
        poly_order: 2,
    };

    assert!(config.validate().is_err());
}

#[test]
fn test_service_refuses_invalid_config() {
    let mut config = FormAnalysisConfig::default();
    config.optimization.path_steps = 0;

    let err = FormAnalysisService::new(config).unwrap_err();
    assert_eq!(err.code, ErrorCode::ConfigInvalid);
    assert!(!err.code.is_client_error());
    assert!(err.message.contains("path_steps"));
}

#[test]
fn test_config_serde_round_trip_preserves_sections() {
    let mut config = FormAnalysisConfig::default();
    config.optimization.seed = 7;
    config.preprocessing.smoothing = SmoothingAlgorithm::MovingAverage { window: 5 };

    let json = serde_json::to_string(&config).unwrap();
    let restored: FormAnalysisConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, config);
}

// ============================================================================
// Environment overrides
// ============================================================================

#[test]
#[serial]
fn test_environment_variable_override() {
    clear_overrides();
    env::set_var("FORM_COACH_SMOOTHING", "moving_average:5");
    env::set_var("FORM_COACH_SOLVER_SEED", "1234");
    env::set_var("FORM_COACH_HISTORY_CAPACITY", "60");

    let config = FormAnalysisConfig::from_env().unwrap();

    assert_eq!(
        config.preprocessing.smoothing,
        SmoothingAlgorithm::MovingAverage { window: 5 }
    );
    assert_eq!(config.optimization.seed, 1234);
    assert_eq!(config.aggregation.history_capacity, 60);

    clear_overrides();
}

#[test]
#[serial]
fn test_unparsable_override_is_an_error() {
    clear_overrides();
    env::set_var("FORM_COACH_MIN_HISTORY_FRAMES", "ten");

    let err = FormAnalysisConfig::from_env().unwrap_err();
    assert!(matches!(err, ConfigError::Parse(ref name) if name.contains("FORM_COACH_MIN_HISTORY_FRAMES")));

    let err = FormAnalysisService::from_env().unwrap_err();
    assert_eq!(err.code, ErrorCode::ConfigInvalid);

    clear_overrides();
}

#[test]
#[serial]
fn test_override_failing_validation_is_an_error() {
    clear_overrides();
    env::set_var("FORM_COACH_VELOCITY_THRESHOLD", "0.01");
    env::set_var("FORM_COACH_NEAR_ZERO_THRESHOLD", "0.05");

    assert!(matches!(
        FormAnalysisConfig::from_env(),
        Err(ConfigError::InvalidRange(_))
    ));

    clear_overrides();
}

#[test]
#[serial]
fn test_load_or_default_falls_back_on_bad_override() {
    clear_overrides();
    env::set_var("FORM_COACH_HISTORY_CAPACITY", "0");

    let config = FormAnalysisConfig::load_or_default();
    assert_eq!(config, FormAnalysisConfig::default());

    clear_overrides();
}

#[test]
#[serial]
fn test_no_overrides_yield_defaults() {
    clear_overrides();

    let config = FormAnalysisConfig::from_env().unwrap();
    assert_eq!(config, FormAnalysisConfig::default());
}
