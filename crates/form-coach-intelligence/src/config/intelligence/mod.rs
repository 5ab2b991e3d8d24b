// ABOUTME: Form analysis configuration grouping every pipeline component's settings
// ABOUTME: Supports FORM_COACH_* environment overrides and whole-config validation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Form Analysis Configuration
//!
//! Configuration is an explicit value handed to each component constructor.
//! There is no process-wide instance: callers load a [`FormAnalysisConfig`]
//! once and pass it (or clones of its sections) to the analyzers they own.

/// Aggregation configuration
pub mod aggregation;
/// Biomechanics configuration
pub mod biomechanics;
/// Complex-systems configuration
pub mod complex_systems;
/// Configuration error types
pub mod error;
/// Optimization configuration
pub mod optimization;
/// Phase detection configuration
pub mod phase;
/// Physics configuration
pub mod physics;
/// Preprocessing configuration
pub mod preprocessing;

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use tracing::warn;

pub use crate::algorithms::SmoothingAlgorithm;
pub use aggregation::AggregationConfig;
pub use biomechanics::BiomechanicsConfig;
pub use complex_systems::ComplexSystemsConfig;
pub use error::ConfigError;
pub use optimization::{GoalMultipliers, ObjectiveWeights, OptimizationConfig};
pub use phase::PhaseDetectionConfig;
pub use physics::{MomentArmMode, PhysicsConfig};
pub use preprocessing::{PreprocessingConfig, ReferenceDistance};

/// Settings for every stage of the form analysis pipeline
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormAnalysisConfig {
    /// Landmark preprocessing
    pub preprocessing: PreprocessingConfig,
    /// Physics analysis
    pub physics: PhysicsConfig,
    /// Phase detection
    pub phase_detection: PhaseDetectionConfig,
    /// Biomechanics analysis
    pub biomechanics: BiomechanicsConfig,
    /// Complex-systems analysis
    pub complex_systems: ComplexSystemsConfig,
    /// Ideal-form optimization
    pub optimization: OptimizationConfig,
    /// Session aggregation and feedback
    pub aggregation: AggregationConfig,
}

impl FormAnalysisConfig {
    /// Load defaults with `FORM_COACH_*` environment overrides applied
    ///
    /// # Errors
    ///
    /// Returns an error if an override cannot be parsed or the result fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self::default().apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Load from the environment, falling back to defaults on any error
    #[must_use]
    pub fn load_or_default() -> Self {
        Self::from_env().unwrap_or_else(|e| {
            warn!("Failed to load form analysis config: {}, using defaults", e);
            Self::default()
        })
    }

    /// Validate every section
    ///
    /// # Errors
    ///
    /// Returns the first validation failure found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.preprocessing.validate()?;
        self.physics.validate()?;
        self.phase_detection.validate()?;
        self.biomechanics.validate()?;
        self.complex_systems.validate()?;
        self.optimization.validate()?;
        self.aggregation.validate()?;
        Ok(())
    }

    fn apply_env_var<T: FromStr>(env_var_name: &str, target: &mut T) -> Result<(), ConfigError> {
        if let Ok(val) = env::var(env_var_name) {
            *target = val
                .parse()
                .map_err(|_| ConfigError::Parse(format!("Invalid {env_var_name}")))?;
        }
        Ok(())
    }

    fn apply_env_overrides(mut self) -> Result<Self, ConfigError> {
        // Preprocessing
        Self::apply_env_var(
            "FORM_COACH_VISIBILITY_THRESHOLD",
            &mut self.preprocessing.visibility_threshold,
        )?;
        Self::apply_env_var(
            "FORM_COACH_VISIBILITY_WEIGHTING",
            &mut self.preprocessing.visibility_weighting,
        )?;
        Self::apply_env_var("FORM_COACH_SMOOTHING", &mut self.preprocessing.smoothing)?;

        // Phase detection
        Self::apply_env_var(
            "FORM_COACH_VELOCITY_THRESHOLD",
            &mut self.phase_detection.velocity_threshold,
        )?;
        Self::apply_env_var(
            "FORM_COACH_NEAR_ZERO_THRESHOLD",
            &mut self.phase_detection.near_zero_threshold,
        )?;
        Self::apply_env_var(
            "FORM_COACH_MIN_PHASE_DURATION",
            &mut self.phase_detection.min_phase_duration,
        )?;

        // Complex systems
        Self::apply_env_var(
            "FORM_COACH_MIN_HISTORY_FRAMES",
            &mut self.complex_systems.min_history_frames,
        )?;
        Self::apply_env_var(
            "FORM_COACH_NEIGHBORHOOD_RADIUS",
            &mut self.complex_systems.neighborhood_radius,
        )?;

        // Optimization
        Self::apply_env_var("FORM_COACH_SOLVER_SEED", &mut self.optimization.seed)?;
        Self::apply_env_var(
            "FORM_COACH_SOLVER_TIME_BUDGET_MS",
            &mut self.optimization.time_budget_ms,
        )?;

        // Aggregation
        Self::apply_env_var(
            "FORM_COACH_HISTORY_CAPACITY",
            &mut self.aggregation.history_capacity,
        )?;
        Self::apply_env_var("FORM_COACH_FEEDBACK_CAP", &mut self.aggregation.feedback_cap)?;

        Ok(self)
    }
}
