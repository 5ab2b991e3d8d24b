// ABOUTME: Landmark preprocessing configuration for gap filling, smoothing, and normalization
// ABOUTME: Defaults follow a 0.5 visibility threshold and a 7-point quadratic Savitzky-Golay filter
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Preprocessing Configuration

use serde::{Deserialize, Serialize};

use super::error::ConfigError;
use crate::algorithms::SmoothingAlgorithm;

/// Reference distance that is scaled to 1 during normalization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceDistance {
    /// Left-to-right shoulder distance, falling back to hip width
    #[default]
    ShoulderWidth,
    /// Left-to-right hip distance, falling back to shoulder width
    HipWidth,
}

/// Landmark preprocessing settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreprocessingConfig {
    /// Visibility below which a landmark counts as missing
    pub visibility_threshold: f64,
    /// Scale coordinates by their pre-fill visibility after gap filling
    pub visibility_weighting: bool,
    /// Temporal smoothing filter
    pub smoothing: SmoothingAlgorithm,
    /// Distance scaled to 1 during normalization
    pub reference_distance: ReferenceDistance,
    /// Translate to mid-hip and scale to the reference distance
    pub normalize: bool,
}

impl Default for PreprocessingConfig {
    fn default() -> Self {
        Self {
            visibility_threshold: 0.5,
            visibility_weighting: false,
            smoothing: SmoothingAlgorithm::default(),
            reference_distance: ReferenceDistance::ShoulderWidth,
            normalize: true,
        }
    }
}

impl PreprocessingConfig {
    /// Validate preprocessing settings
    ///
    /// # Errors
    ///
    /// Returns an error if the threshold is outside [0, 1] or the smoothing
    /// window and polynomial order are inconsistent.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.visibility_threshold) {
            return Err(ConfigError::ValueOutOfRange(
                "visibility_threshold must be between 0 and 1",
            ));
        }
        self.smoothing.validate()
    }
}
