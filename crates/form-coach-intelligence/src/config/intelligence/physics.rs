// ABOUTME: Physics analysis configuration for moment arms, energy, and force distribution
// ABOUTME: Force distribution parameters describe a simplified lean-based allocation model
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Physics Configuration

use form_coach_core::constants::physics::GRAVITY_M_S2;
use serde::{Deserialize, Serialize};

use super::error::ConfigError;

/// How the moment arm between a load and a joint is measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MomentArmMode {
    /// Horizontal (x) distance only
    #[default]
    Horizontal,
    /// Full distance in the image plane
    Planar,
}

/// Physics analyzer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicsConfig {
    /// Gravitational acceleration (m/s^2)
    pub gravity_m_s2: f64,
    /// Moment arm measurement
    pub moment_arm_mode: MomentArmMode,
    /// Fraction of supported weight on the spine when upright
    pub spine_base_fraction: f64,
    /// Additional spine fraction at 90 degrees of trunk lean
    pub spine_lean_gain: f64,
    /// Upper bound on the spine fraction
    pub spine_max_fraction: f64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity_m_s2: GRAVITY_M_S2,
            moment_arm_mode: MomentArmMode::Horizontal,
            spine_base_fraction: 0.3,
            spine_lean_gain: 0.5,
            spine_max_fraction: 0.8,
        }
    }
}

impl PhysicsConfig {
    /// Validate physics settings
    ///
    /// # Errors
    ///
    /// Returns an error if gravity is not positive or spine fractions leave [0, 1].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gravity_m_s2 <= 0.0 {
            return Err(ConfigError::ValueOutOfRange("gravity_m_s2 must be > 0"));
        }
        if !(0.0..=1.0).contains(&self.spine_base_fraction)
            || !(0.0..=1.0).contains(&self.spine_max_fraction)
        {
            return Err(ConfigError::ValueOutOfRange(
                "spine fractions must be between 0 and 1",
            ));
        }
        if self.spine_base_fraction > self.spine_max_fraction {
            return Err(ConfigError::InvalidRange(
                "spine_base_fraction must be <= spine_max_fraction",
            ));
        }
        Ok(())
    }
}
