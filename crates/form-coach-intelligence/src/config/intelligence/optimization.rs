// ABOUTME: Optimization engine configuration for objective weights, solvers, and path generation
// ABOUTME: Goal multipliers reweight objectives before renormalization
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Optimization Configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::error::ConfigError;

/// Relative weights of the four objectives
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveWeights {
    /// Energy efficiency (deviation from neutral angles)
    pub energy_efficiency: f64,
    /// Joint stress near range boundaries
    pub joint_stress: f64,
    /// Force production around optimal angles
    pub force_production: f64,
    /// Postural stability
    pub stability: f64,
}

impl Default for ObjectiveWeights {
    fn default() -> Self {
        Self {
            energy_efficiency: 0.25,
            joint_stress: 0.25,
            force_production: 0.30,
            stability: 0.20,
        }
    }
}

impl ObjectiveWeights {
    /// Sum of the weights
    #[must_use]
    pub fn total(&self) -> f64 {
        self.energy_efficiency + self.joint_stress + self.force_production + self.stability
    }

    /// Weights scaled to sum to 1
    #[must_use]
    pub fn normalized(&self) -> Self {
        let total = self.total();
        if total <= 0.0 {
            return Self::default();
        }
        Self {
            energy_efficiency: self.energy_efficiency / total,
            joint_stress: self.joint_stress / total,
            force_production: self.force_production / total,
            stability: self.stability / total,
        }
    }
}

/// Objective multipliers applied per training goal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalMultipliers {
    /// Force production multiplier for strength
    pub strength_force: f64,
    /// Energy efficiency multiplier for endurance
    pub endurance_energy: f64,
    /// Force and stress multiplier for hypertrophy
    pub hypertrophy_force_stress: f64,
}

impl Default for GoalMultipliers {
    fn default() -> Self {
        Self {
            strength_force: 1.5,
            endurance_energy: 1.5,
            hypertrophy_force_stress: 1.2,
        }
    }
}

/// Optimization engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationConfig {
    /// Base objective weights
    pub weights: ObjectiveWeights,
    /// Per-goal objective multipliers
    pub goal_multipliers: GoalMultipliers,
    /// Width of the force-production bump (degrees)
    pub force_sigma_degrees: f64,
    /// Fraction of a joint's range treated as the stress margin at each end
    pub stress_margin_fraction: f64,
    /// Total fraction of range removed for a limited joint, split across both ends
    pub limited_range_narrowing: f64,
    /// Spine lean cap of the balance constraint (degrees)
    pub balance_spine_limit: f64,
    /// Hip angle below which the hip counts as hinged (degrees)
    pub hinged_hip_angle: f64,
    /// Spine safety limit when hinged (degrees)
    pub spine_safety_hinged: f64,
    /// Spine safety limit when upright (degrees)
    pub spine_safety_upright: f64,
    /// Allowed forward shoulder offset as a fraction of height
    pub reach_fraction_of_height: f64,
    /// Quadratic penalty weight on constraint violations
    pub penalty_weight: f64,
    /// Local solver iteration cap
    pub local_max_iterations: usize,
    /// Local solver convergence tolerance
    pub local_tolerance: f64,
    /// Global solver population per decision variable
    pub global_population_factor: usize,
    /// Global solver generation cap
    pub global_max_generations: usize,
    /// Differential weight of the global solver
    pub differential_weight: f64,
    /// Crossover probability of the global solver
    pub crossover_rate: f64,
    /// Seed of the global solver
    pub seed: u64,
    /// Wall-clock budget of one solve (ms)
    pub time_budget_ms: u64,
    /// Differences at or below this are not reported as priorities (degrees)
    pub priority_tolerance_degrees: f64,
    /// Maximum number of improvement priorities
    pub max_priorities: usize,
    /// Default number of path steps
    pub path_steps: usize,
}

impl Default for OptimizationConfig {
    fn default() -> Self {
        Self {
            weights: ObjectiveWeights::default(),
            goal_multipliers: GoalMultipliers::default(),
            force_sigma_degrees: 20.0,
            stress_margin_fraction: 0.1,
            limited_range_narrowing: 0.2,
            balance_spine_limit: 60.0,
            hinged_hip_angle: 120.0,
            spine_safety_hinged: 45.0,
            spine_safety_upright: 55.0,
            reach_fraction_of_height: 0.25,
            penalty_weight: 10.0,
            local_max_iterations: 200,
            local_tolerance: 1e-7,
            global_population_factor: 15,
            global_max_generations: 100,
            differential_weight: 0.7,
            crossover_rate: 0.9,
            seed: 42,
            time_budget_ms: 250,
            priority_tolerance_degrees: 5.0,
            max_priorities: 3,
            path_steps: 10,
        }
    }
}

impl OptimizationConfig {
    /// Solver time budget
    #[must_use]
    pub const fn time_budget(&self) -> Duration {
        Duration::from_millis(self.time_budget_ms)
    }

    /// Validate optimization settings
    ///
    /// # Errors
    ///
    /// Returns an error for non-positive weights or solver parameters out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let w = &self.weights;
        if [w.energy_efficiency, w.joint_stress, w.force_production, w.stability]
            .iter()
            .any(|v| *v < 0.0)
            || w.total() <= 0.0
        {
            return Err(ConfigError::InvalidWeights(
                "objective weights must be non-negative with a positive sum",
            ));
        }
        if self.force_sigma_degrees <= 0.0 {
            return Err(ConfigError::ValueOutOfRange("force_sigma_degrees must be > 0"));
        }
        if !(0.0..0.5).contains(&self.stress_margin_fraction)
            || !(0.0..1.0).contains(&self.limited_range_narrowing)
        {
            return Err(ConfigError::ValueOutOfRange(
                "stress margin must be in [0, 0.5) and narrowing in [0, 1)",
            ));
        }
        if self.spine_safety_hinged > self.spine_safety_upright {
            return Err(ConfigError::InvalidRange(
                "spine_safety_hinged must be <= spine_safety_upright",
            ));
        }
        if !(0.0..=2.0).contains(&self.differential_weight)
            || !(0.0..=1.0).contains(&self.crossover_rate)
        {
            return Err(ConfigError::ValueOutOfRange(
                "differential_weight must be in [0, 2] and crossover_rate in [0, 1]",
            ));
        }
        if self.global_population_factor == 0 || self.local_max_iterations == 0 {
            return Err(ConfigError::ValueOutOfRange(
                "solver iteration and population sizes must be >= 1",
            ));
        }
        if self.path_steps == 0 {
            return Err(ConfigError::ValueOutOfRange("path_steps must be >= 1"));
        }
        Ok(())
    }
}
