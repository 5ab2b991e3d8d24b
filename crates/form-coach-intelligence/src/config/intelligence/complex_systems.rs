// ABOUTME: Complex-systems configuration for attractors, variability, entropy, and self-organization
// ABOUTME: Window sizes gate when metrics are measured instead of reported as insufficient
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Complex Systems Configuration

use serde::{Deserialize, Serialize};

use super::error::ConfigError;

/// Complex-systems analyzer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplexSystemsConfig {
    /// Frames required before any metric is measured
    pub min_history_frames: usize,
    /// Principal components kept in phase space
    pub pca_components: usize,
    /// Samples required before PCA is applied
    pub pca_min_samples: usize,
    /// Neighbourhood radius for attractor seeding (phase-space units)
    pub neighborhood_radius: f64,
    /// Fraction of all points a neighbourhood must hold to seed an attractor
    pub attractor_min_density: f64,
    /// Coefficient of variation at which adaptive variability peaks
    pub target_cv: f64,
    /// Width of the adaptive variability curve
    pub cv_sigma: f64,
    /// Mean absolute jerk at which harmful instability saturates
    pub jerk_reference: f64,
    /// Approximate entropy pattern length
    pub apen_pattern_length: usize,
    /// Approximate entropy tolerance as a fraction of the series std
    pub apen_tolerance_factor: f64,
    /// Largest autocorrelation lag used for predictability
    pub autocorrelation_max_lag: usize,
    /// Practice records required for self-organization metrics
    pub min_practice_records: usize,
    /// Multiple of the delta std that counts as a performance jump
    pub jump_std_multiplier: f64,
    /// Jumps at which the emergence score saturates
    pub emergence_saturation: f64,
}

impl Default for ComplexSystemsConfig {
    fn default() -> Self {
        Self {
            min_history_frames: 10,
            pca_components: 3,
            pca_min_samples: 20,
            neighborhood_radius: 0.5,
            attractor_min_density: 0.10,
            target_cv: 0.05,
            cv_sigma: 0.05,
            jerk_reference: 100.0,
            apen_pattern_length: 2,
            apen_tolerance_factor: 0.2,
            autocorrelation_max_lag: 5,
            min_practice_records: 5,
            jump_std_multiplier: 2.0,
            emergence_saturation: 3.0,
        }
    }
}

impl ComplexSystemsConfig {
    /// Validate complex-systems settings
    ///
    /// # Errors
    ///
    /// Returns an error for windows too small to measure or non-positive scales.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_history_frames < 3 {
            return Err(ConfigError::ValueOutOfRange(
                "min_history_frames must be >= 3",
            ));
        }
        if self.pca_components == 0 {
            return Err(ConfigError::ValueOutOfRange("pca_components must be >= 1"));
        }
        if self.neighborhood_radius <= 0.0 {
            return Err(ConfigError::ValueOutOfRange(
                "neighborhood_radius must be > 0",
            ));
        }
        if !(self.attractor_min_density > 0.0 && self.attractor_min_density <= 1.0) {
            return Err(ConfigError::ValueOutOfRange(
                "attractor_min_density must be in (0, 1]",
            ));
        }
        if self.cv_sigma <= 0.0 || self.jerk_reference <= 0.0 || self.emergence_saturation <= 0.0
        {
            return Err(ConfigError::ValueOutOfRange(
                "cv_sigma, jerk_reference and emergence_saturation must be > 0",
            ));
        }
        if self.apen_pattern_length == 0 || self.autocorrelation_max_lag == 0 {
            return Err(ConfigError::ValueOutOfRange(
                "pattern length and autocorrelation lag must be >= 1",
            ));
        }
        if self.min_practice_records < 3 {
            return Err(ConfigError::ValueOutOfRange(
                "min_practice_records must be >= 3",
            ));
        }
        Ok(())
    }
}
