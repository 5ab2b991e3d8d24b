// ABOUTME: Biomechanics configuration for muscle activation, movement quality, and coordination
// ABOUTME: Penalty factors are multiplicative and applied once per detected issue
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Biomechanics Configuration

use serde::{Deserialize, Serialize};

use super::error::ConfigError;

/// Biomechanics analyzer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiomechanicsConfig {
    /// Width of the activation bump around a muscle's peak angle (degrees)
    pub activation_sigma_degrees: f64,
    /// Joint force at which the force multiplier saturates (N)
    pub force_reference_newtons: f64,
    /// Frames a window needs before quality sub-scores are measured
    pub min_quality_frames: usize,
    /// Mean jerk that halves the smoothness score (units/s^3)
    pub jerk_scale: f64,
    /// Multiplier on centre-of-mass variance in the stability score
    pub stability_variance_scale: f64,
    /// Phase transitions per second above which coordination is penalized
    pub max_transition_rate: f64,
    /// Penalty for excessive transition frequency
    pub transition_penalty: f64,
    /// Activation coefficient of variation above which a stable phase is penalized
    pub activation_cv_threshold: f64,
    /// Penalty for unstable activation in a stationary phase
    pub activation_variability_penalty: f64,
    /// Penalty for trunk lean beyond the exercise limit
    pub spine_compensation_penalty: f64,
    /// Frontal-plane knee deviation that counts as misalignment (degrees)
    pub knee_misalignment_degrees: f64,
    /// Penalty for knee misalignment
    pub knee_misalignment_penalty: f64,
    /// Left/right knee angle difference that counts as asymmetry (degrees)
    pub asymmetry_degrees: f64,
    /// Penalty for left/right asymmetry
    pub asymmetry_penalty: f64,
}

impl Default for BiomechanicsConfig {
    fn default() -> Self {
        Self {
            activation_sigma_degrees: 30.0,
            force_reference_newtons: 1000.0,
            min_quality_frames: 5,
            jerk_scale: 50.0,
            stability_variance_scale: 100.0,
            max_transition_rate: 3.0,
            transition_penalty: 0.85,
            activation_cv_threshold: 0.25,
            activation_variability_penalty: 0.9,
            spine_compensation_penalty: 0.8,
            knee_misalignment_degrees: 10.0,
            knee_misalignment_penalty: 0.85,
            asymmetry_degrees: 15.0,
            asymmetry_penalty: 0.9,
        }
    }
}

impl BiomechanicsConfig {
    /// Validate biomechanics settings
    ///
    /// # Errors
    ///
    /// Returns an error for non-positive scales or penalties outside (0, 1].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.activation_sigma_degrees <= 0.0 || self.force_reference_newtons <= 0.0 {
            return Err(ConfigError::ValueOutOfRange(
                "activation sigma and force reference must be > 0",
            ));
        }
        if self.jerk_scale <= 0.0 || self.stability_variance_scale <= 0.0 {
            return Err(ConfigError::ValueOutOfRange(
                "jerk_scale and stability_variance_scale must be > 0",
            ));
        }
        if self.min_quality_frames < 3 {
            return Err(ConfigError::ValueOutOfRange(
                "min_quality_frames must be >= 3",
            ));
        }
        let penalties = [
            self.transition_penalty,
            self.activation_variability_penalty,
            self.spine_compensation_penalty,
            self.knee_misalignment_penalty,
            self.asymmetry_penalty,
        ];
        if penalties.iter().any(|p| !(*p > 0.0 && *p <= 1.0)) {
            return Err(ConfigError::ValueOutOfRange(
                "coordination penalties must be in (0, 1]",
            ));
        }
        Ok(())
    }
}
