// ABOUTME: Objective functions of the form optimization problem over a joint-angle vector
// ABOUTME: Energy, joint stress, force production, and stability costs, each normalized to [0, 1]
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use form_coach_core::errors::{AppError, AppResult};
use form_coach_core::models::{
    ExerciseType, Joint, JointAngleSet, ObjectiveScores, TrainingGoal, UserProfile,
};

use super::constraints::ConstraintSet;
use crate::biomechanical_constants::{
    joint_range, neutral_angles, optimal_angles, table_angle, DEFAULT_SPINE_COMFORT,
    MODERATE_KNEE_BEND,
};
use crate::config::{ObjectiveWeights, OptimizationConfig};
use crate::statistics::{self, gaussian};

/// Decay scale of the stability terms (degrees)
const STABILITY_DECAY_DEGREES: f64 = 20.0;

/// Objective weights adjusted for the user's goals and renormalized
#[must_use]
pub fn goal_weights(config: &OptimizationConfig, user: &UserProfile) -> ObjectiveWeights {
    let multipliers = &config.goal_multipliers;
    let mut weights = config.weights;
    if user.has_goal(TrainingGoal::Strength) {
        weights.force_production *= multipliers.strength_force;
    }
    if user.has_goal(TrainingGoal::Endurance) {
        weights.energy_efficiency *= multipliers.endurance_energy;
    }
    if user.has_goal(TrainingGoal::Hypertrophy) {
        weights.force_production *= multipliers.hypertrophy_force_stress;
        weights.joint_stress *= multipliers.hypertrophy_force_stress;
    }
    weights.normalized()
}

/// One optimization problem: variables, targets, bounds, weights and constraints
#[derive(Debug, Clone)]
pub struct FormProblem {
    exercise: ExerciseType,
    joints: Vec<Joint>,
    current: Vec<f64>,
    neutral: Vec<f64>,
    optimal: Vec<f64>,
    ranges: Vec<(f64, f64)>,
    bounds: Vec<(f64, f64)>,
    weights: ObjectiveWeights,
    force_sigma: f64,
    stress_margin_fraction: f64,
    constraints: ConstraintSet,
}

impl FormProblem {
    /// Build the problem for joints present in both the current angles and the exercise table
    ///
    /// # Errors
    ///
    /// Returns an error if no current joint is relevant to the exercise.
    pub fn new(
        current: &JointAngleSet,
        user: &UserProfile,
        exercise: ExerciseType,
        config: &OptimizationConfig,
    ) -> AppResult<Self> {
        let optimal_table = optimal_angles(exercise);
        let neutral_table = neutral_angles(exercise);
        let joints: Vec<Joint> = current
            .joints()
            .filter(|joint| table_angle(optimal_table, *joint).is_some())
            .collect();
        if joints.is_empty() {
            return Err(AppError::invalid_input(format!(
                "No measured joint is relevant to {exercise}"
            )));
        }

        let mut current_values = Vec::with_capacity(joints.len());
        let mut optimal = Vec::with_capacity(joints.len());
        let mut neutral = Vec::with_capacity(joints.len());
        let mut ranges = Vec::with_capacity(joints.len());
        let mut bounds = Vec::with_capacity(joints.len());
        for &joint in &joints {
            let target = table_angle(optimal_table, joint).unwrap_or_default();
            current_values.push(current.get(joint).unwrap_or(target));
            optimal.push(target);
            neutral.push(table_angle(neutral_table, joint).unwrap_or(target));
            let (lo, hi) = joint_range(joint);
            ranges.push((lo, hi));
            bounds.push(if user.is_limited(joint) {
                let inset = (hi - lo) * config.limited_range_narrowing / 2.0;
                (lo + inset, hi - inset)
            } else {
                (lo, hi)
            });
        }

        let constraints = ConstraintSet::new(&joints, &bounds, config, user.height_cm > 0.0);
        Ok(Self {
            exercise,
            joints,
            current: current_values,
            neutral,
            optimal,
            ranges,
            bounds,
            weights: goal_weights(config, user),
            force_sigma: config.force_sigma_degrees,
            stress_margin_fraction: config.stress_margin_fraction,
            constraints,
        })
    }

    /// Decision variables in order
    #[must_use]
    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    /// Current angles of the decision variables
    #[must_use]
    pub fn current(&self) -> &[f64] {
        &self.current
    }

    /// Variable bounds, narrowed for limited joints
    #[must_use]
    pub fn bounds(&self) -> &[(f64, f64)] {
        &self.bounds
    }

    /// Effective objective weights
    #[must_use]
    pub const fn weights(&self) -> &ObjectiveWeights {
        &self.weights
    }

    /// Constraint set
    #[must_use]
    pub const fn constraints(&self) -> &ConstraintSet {
        &self.constraints
    }

    /// Angle vector as a named set
    #[must_use]
    pub fn to_angle_set(&self, x: &[f64]) -> JointAngleSet {
        self.joints.iter().copied().zip(x.iter().copied()).collect()
    }

    fn value(&self, x: &[f64], joint: Joint) -> Option<f64> {
        self.joints.iter().position(|j| *j == joint).map(|i| x[i])
    }

    /// Per-objective costs at `x`
    #[must_use]
    pub fn objective_scores(&self, x: &[f64]) -> ObjectiveScores {
        ObjectiveScores {
            energy_efficiency: self.energy_cost(x),
            joint_stress: self.stress_cost(x),
            force_production: self.force_cost(x),
            stability: self.stability_cost(x),
        }
    }

    /// Weighted objective in [0, 1]
    #[must_use]
    pub fn objective(&self, x: &[f64]) -> f64 {
        let s = self.objective_scores(x);
        let w = &self.weights;
        w.stability.mul_add(
            s.stability,
            w.force_production.mul_add(
                s.force_production,
                w.energy_efficiency
                    .mul_add(s.energy_efficiency, w.joint_stress * s.joint_stress),
            ),
        )
    }

    /// Objective plus a quadratic exterior penalty on constraint violations
    #[must_use]
    pub fn penalized(&self, x: &[f64], penalty_weight: f64) -> f64 {
        penalty_weight.mul_add(self.constraints.violation(x), self.objective(x))
    }

    /// `1 - objective`, clamped to [0, 1]
    #[must_use]
    pub fn score(&self, x: &[f64]) -> f64 {
        (1.0 - self.objective(x)).clamp(0.0, 1.0)
    }

    fn energy_cost(&self, x: &[f64]) -> f64 {
        let terms: Vec<f64> = x
            .iter()
            .zip(&self.neutral)
            .map(|(angle, neutral)| (((angle - neutral) / 90.0).powi(2)).min(1.0))
            .collect();
        statistics::mean(&terms)
    }

    fn stress_cost(&self, x: &[f64]) -> f64 {
        let terms: Vec<f64> = x
            .iter()
            .zip(&self.ranges)
            .map(|(angle, (lo, hi))| {
                let margin = (hi - lo) * self.stress_margin_fraction;
                if margin <= 0.0 {
                    return 0.0;
                }
                let intrusion = (lo + margin - angle).max(angle - (hi - margin)).max(0.0);
                ((intrusion / margin).powi(2)).min(1.0)
            })
            .collect();
        statistics::mean(&terms)
    }

    fn force_cost(&self, x: &[f64]) -> f64 {
        let terms: Vec<f64> = x
            .iter()
            .zip(&self.optimal)
            .map(|(angle, optimal)| gaussian(*angle, *optimal, self.force_sigma))
            .collect();
        1.0 - statistics::mean(&terms)
    }

    fn stability_cost(&self, x: &[f64]) -> f64 {
        let decay = |excess: f64| {
            let z = excess / STABILITY_DECAY_DEGREES;
            (-z * z).exp()
        };
        let comfort = self
            .exercise
            .spine_lean_limit()
            .unwrap_or(DEFAULT_SPINE_COMFORT);
        let spine_term = self
            .value(x, Joint::Spine)
            .map_or(1.0, |spine| decay((spine - comfort).max(0.0)));
        let (bend_lo, bend_hi) = MODERATE_KNEE_BEND;
        let knee_term = self.value(x, Joint::Knee).map_or(1.0, |knee| {
            decay((bend_lo - knee).max(knee - bend_hi).max(0.0))
        });
        1.0 - spine_term * knee_term
    }
}
