// ABOUTME: Phase detection configuration for velocity thresholds and transition guards
// ABOUTME: Distances are in normalized body units (reference distance = 1)
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Phase Detection Configuration

use serde::{Deserialize, Serialize};

use super::error::ConfigError;

/// Phase state machine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseDetectionConfig {
    /// Speed that starts a descent or ascent (units/s)
    pub velocity_threshold: f64,
    /// Speed below which the tracked point counts as still (units/s)
    pub near_zero_threshold: f64,
    /// Displacement a descent must cover before a bottom is accepted
    pub min_descent_distance: f64,
    /// Fraction of `min_descent_distance` within which an ascent has returned
    pub return_tolerance_fraction: f64,
    /// Elapsed time below which a transition is suppressed (s)
    pub min_phase_duration: f64,
    /// Moving-average window applied to the velocity signal
    pub velocity_smoothing_window: usize,
    /// Velocity standard deviation that drives confidence to its floor
    pub confidence_velocity_cap: f64,
    /// Lowest reported phase confidence
    pub confidence_floor: f64,
}

impl Default for PhaseDetectionConfig {
    fn default() -> Self {
        Self {
            velocity_threshold: 0.15,
            near_zero_threshold: 0.05,
            min_descent_distance: 0.3,
            return_tolerance_fraction: 0.3,
            min_phase_duration: 0.2,
            velocity_smoothing_window: 5,
            confidence_velocity_cap: 0.5,
            confidence_floor: 0.3,
        }
    }
}

impl PhaseDetectionConfig {
    /// Validate phase detection settings
    ///
    /// # Errors
    ///
    /// Returns an error if thresholds are non-positive or out of order.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.velocity_threshold <= 0.0 || self.near_zero_threshold <= 0.0 {
            return Err(ConfigError::ValueOutOfRange(
                "velocity thresholds must be > 0",
            ));
        }
        if self.near_zero_threshold >= self.velocity_threshold {
            return Err(ConfigError::InvalidRange(
                "near_zero_threshold must be < velocity_threshold",
            ));
        }
        if self.min_descent_distance <= 0.0 {
            return Err(ConfigError::ValueOutOfRange(
                "min_descent_distance must be > 0",
            ));
        }
        if self.min_phase_duration < 0.0 {
            return Err(ConfigError::ValueOutOfRange(
                "min_phase_duration must be >= 0",
            ));
        }
        if self.velocity_smoothing_window == 0 {
            return Err(ConfigError::ValueOutOfRange(
                "velocity_smoothing_window must be >= 1",
            ));
        }
        if self.confidence_velocity_cap <= 0.0 || !(0.0..=1.0).contains(&self.confidence_floor) {
            return Err(ConfigError::ValueOutOfRange(
                "confidence cap must be > 0 and floor between 0 and 1",
            ));
        }
        Ok(())
    }
}
