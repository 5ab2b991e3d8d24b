// ABOUTME: Analysis result records shared across stages: estimates, optimal form, scores, feedback
// ABOUTME: Missing-versus-zero is explicit through Estimate and optional fields
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::joint::JointAngleSet;
use crate::constants::numeric::NEUTRAL_SCORE;

/// A metric that was either measured or lacked the data to be measured
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Estimate {
    /// Measured value
    Measured(f64),
    /// Not enough frames or history to measure
    InsufficientData,
}

impl Estimate {
    /// Measured score clamped to [0, 1]
    #[must_use]
    pub fn score(value: f64) -> Self {
        if value.is_finite() {
            Self::Measured(value.clamp(0.0, 1.0))
        } else {
            Self::InsufficientData
        }
    }

    /// Value, reading `InsufficientData` as the neutral score 0.5
    #[must_use]
    pub const fn value_or_neutral(self) -> f64 {
        match self {
            Self::Measured(value) => value,
            Self::InsufficientData => NEUTRAL_SCORE,
        }
    }

    /// Measured value if any
    #[must_use]
    pub const fn value(self) -> Option<f64> {
        match self {
            Self::Measured(value) => Some(value),
            Self::InsufficientData => None,
        }
    }

    /// Whether the value was measured
    #[must_use]
    pub const fn is_measured(self) -> bool {
        matches!(self, Self::Measured(_))
    }
}

/// Which stage of the solver chain produced an optimal form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverOutcome {
    /// Local gradient solver converged
    Local,
    /// Global evolutionary solver produced the result
    Global,
    /// The current vector scored at least as well as any solver output
    CurrentRetained,
    /// Both solvers failed or timed out; current angles returned with score 0.5
    Fallback,
}

/// Normalized objective costs in [0, 1], lower is better
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ObjectiveScores {
    /// Deviation from neutral joint angles
    pub energy_efficiency: f64,
    /// Proximity to range-of-motion boundaries
    pub joint_stress: f64,
    /// Distance from the force-optimal angles
    pub force_production: f64,
    /// Trunk lean and knee-bend instability
    pub stability: f64,
}

/// Result of one optimization call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimalForm {
    /// Target joint angles
    pub joint_angles: JointAngleSet,
    /// Objective costs at the target
    pub objective_scores: ObjectiveScores,
    /// Satisfaction of every named constraint at the target
    pub constraint_satisfaction: BTreeMap<String, bool>,
    /// `1 - weighted cost`, clamped to [0, 1]
    pub overall_score: f64,
    /// Solver stage that produced the target
    pub solver: SolverOutcome,
}

impl OptimalForm {
    /// Whether every constraint holds
    #[must_use]
    pub fn all_constraints_satisfied(&self) -> bool {
        self.constraint_satisfaction.values().all(|ok| *ok)
    }
}

/// Fixed weights of the unified score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnifiedWeights {
    /// Weight of physics efficiency
    pub physics_efficiency: f64,
    /// Weight of biological optimality
    pub biological_optimality: f64,
    /// Weight of system stability
    pub system_stability: f64,
    /// Weight of mathematical optimization
    pub mathematical_optimization: f64,
}

impl Default for UnifiedWeights {
    fn default() -> Self {
        Self {
            physics_efficiency: 0.25,
            biological_optimality: 0.30,
            system_stability: 0.20,
            mathematical_optimization: 0.25,
        }
    }
}

impl UnifiedWeights {
    /// Sum of the four weights
    #[must_use]
    pub fn total(&self) -> f64 {
        self.physics_efficiency
            + self.biological_optimality
            + self.system_stability
            + self.mathematical_optimization
    }
}

/// Per-frame unified scores, every component in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnifiedScoreSet {
    /// Physics-derived efficiency
    pub physics_efficiency: f64,
    /// Muscle activation, movement quality and coordination
    pub biological_optimality: f64,
    /// Complex-systems stability
    pub system_stability: f64,
    /// Closeness to the optimized form
    pub mathematical_optimization: f64,
    /// Weighted sum of the four components
    pub overall: f64,
}

impl UnifiedScoreSet {
    /// Clamp the components and combine them with fixed weights
    #[must_use]
    pub fn combine(
        physics_efficiency: f64,
        biological_optimality: f64,
        system_stability: f64,
        mathematical_optimization: f64,
        weights: &UnifiedWeights,
    ) -> Self {
        let clamp = |v: f64| if v.is_finite() { v.clamp(0.0, 1.0) } else { NEUTRAL_SCORE };
        let physics_efficiency = clamp(physics_efficiency);
        let biological_optimality = clamp(biological_optimality);
        let system_stability = clamp(system_stability);
        let mathematical_optimization = clamp(mathematical_optimization);
        let overall = weights.mathematical_optimization.mul_add(
            mathematical_optimization,
            weights.system_stability.mul_add(
                system_stability,
                weights.biological_optimality.mul_add(
                    biological_optimality,
                    weights.physics_efficiency * physics_efficiency,
                ),
            ),
        );
        Self {
            physics_efficiency,
            biological_optimality,
            system_stability,
            mathematical_optimization,
            overall: overall.clamp(0.0, 1.0),
        }
    }
}

/// Source of a feedback item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackType {
    /// Posture or efficiency issue from physics analysis
    Physics,
    /// Activation, quality or coordination issue
    Biomechanics,
    /// Improvement toward the optimal form
    Optimization,
    /// Movement stability from complex-systems analysis
    Stability,
    /// Goal safety issue from the user profile
    Safety,
}

/// Feedback priority, ordered high to low
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackPriority {
    /// Address first
    High,
    /// Address soon
    Medium,
    /// Minor refinement
    Low,
}

impl fmt::Display for FeedbackPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        })
    }
}

/// One actionable feedback message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackItem {
    /// Originating analysis
    #[serde(rename = "type")]
    pub feedback_type: FeedbackType,
    /// Priority
    pub priority: FeedbackPriority,
    /// Human-readable message, also the deduplication key
    pub message: String,
    /// Metric the message refers to
    pub metric: String,
    /// Measured value of the metric
    pub current_value: Option<f64>,
    /// Target value of the metric
    pub optimal_value: Option<f64>,
}

impl FeedbackItem {
    /// Create a feedback item without values
    #[must_use]
    pub fn new(
        feedback_type: FeedbackType,
        priority: FeedbackPriority,
        metric: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            feedback_type,
            priority,
            message: message.into(),
            metric: metric.into(),
            current_value: None,
            optimal_value: None,
        }
    }

    /// Attach current and optimal values
    #[must_use]
    pub const fn with_values(mut self, current: f64, optimal: f64) -> Self {
        self.current_value = Some(current);
        self.optimal_value = Some(optimal);
        self
    }
}
