// ABOUTME: Inequality constraints on target joint angles: range of motion, balance, spine safety, reach
// ABOUTME: Every constraint is scaled so that a value of at least zero means satisfied
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Angle constraints are divided by 90 degrees and the reach constraint is
//! expressed in units of standing height, so penalties for different
//! constraints are on comparable scales.

use form_coach_core::models::Joint;
use std::collections::BTreeMap;

use crate::biomechanical_constants::segment_lengths;
use crate::config::OptimizationConfig;

/// Largest violation still reported as satisfied, in scaled units
pub const FEASIBILITY_TOLERANCE: f64 = 1e-4;

const ANGLE_SCALE: f64 = 90.0;

/// Ankle angle assumed when it is not a decision variable
const NEUTRAL_ANKLE: f64 = 90.0;

/// Forward shoulder displacement over the ankle, as a fraction of height
///
/// A planar shank-thigh-trunk linkage: the shank tilts forward by
/// `90 - ankle`, the thigh folds back by the knee flexion, and the trunk leans
/// forward by the spine angle.
#[must_use]
pub fn forward_shoulder_offset(ankle: f64, knee: f64, spine: f64) -> f64 {
    let shank_tilt = 90.0 - ankle;
    let thigh_tilt = shank_tilt - (180.0 - knee);
    segment_lengths::TRUNK.mul_add(
        spine.to_radians().sin(),
        segment_lengths::SHANK.mul_add(
            shank_tilt.to_radians().sin(),
            segment_lengths::THIGH * thigh_tilt.to_radians().sin(),
        ),
    )
}

/// Constraint set for one problem, indexed by decision-variable position
#[derive(Debug, Clone)]
pub struct ConstraintSet {
    joints: Vec<Joint>,
    bounds: Vec<(f64, f64)>,
    balance_spine_limit: f64,
    hinged_hip_angle: f64,
    spine_safety_hinged: f64,
    spine_safety_upright: f64,
    reach_fraction: Option<f64>,
}

impl ConstraintSet {
    /// Build constraints for the given variables and bounds
    ///
    /// The reach constraint is included only when both knee and spine are
    /// variables and a height is known.
    #[must_use]
    pub fn new(
        joints: &[Joint],
        bounds: &[(f64, f64)],
        config: &OptimizationConfig,
        height_known: bool,
    ) -> Self {
        let has = |joint: Joint| joints.contains(&joint);
        Self {
            joints: joints.to_vec(),
            bounds: bounds.to_vec(),
            balance_spine_limit: config.balance_spine_limit,
            hinged_hip_angle: config.hinged_hip_angle,
            spine_safety_hinged: config.spine_safety_hinged,
            spine_safety_upright: config.spine_safety_upright,
            reach_fraction: (height_known && has(Joint::Knee) && has(Joint::Spine))
                .then_some(config.reach_fraction_of_height),
        }
    }

    fn index(&self, joint: Joint) -> Option<usize> {
        self.joints.iter().position(|j| *j == joint)
    }

    /// Spine limit given the hip angle; tighter when the hip is hinged
    #[must_use]
    pub fn spine_safety_limit(&self, hip: Option<f64>) -> f64 {
        match hip {
            Some(hip) if hip < self.hinged_hip_angle => self.spine_safety_hinged,
            _ => self.spine_safety_upright,
        }
    }

    /// Scaled value of every constraint at `x`
    #[must_use]
    pub fn evaluate(&self, x: &[f64]) -> Vec<(String, f64)> {
        let value = |joint: Joint| self.index(joint).map(|i| x[i]);
        let mut values: Vec<(String, f64)> = self
            .joints
            .iter()
            .zip(&self.bounds)
            .zip(x)
            .map(|((joint, (lo, hi)), angle)| {
                let slack = (angle - lo).min(hi - angle) / ANGLE_SCALE;
                (format!("range_of_motion_{joint}"), slack)
            })
            .collect();

        if let Some(spine) = value(Joint::Spine) {
            values.push((
                "balance".to_owned(),
                (self.balance_spine_limit - spine) / ANGLE_SCALE,
            ));
            let limit = self.spine_safety_limit(value(Joint::Hip));
            values.push(("spine_safety".to_owned(), (limit - spine) / ANGLE_SCALE));
        }

        if let (Some(fraction), Some(knee), Some(spine)) =
            (self.reach_fraction, value(Joint::Knee), value(Joint::Spine))
        {
            let ankle = value(Joint::Ankle).unwrap_or(NEUTRAL_ANKLE);
            let offset = forward_shoulder_offset(ankle, knee, spine).abs();
            values.push(("reach".to_owned(), fraction - offset));
        }
        values
    }

    /// Sum of squared violations
    #[must_use]
    pub fn violation(&self, x: &[f64]) -> f64 {
        self.evaluate(x)
            .iter()
            .map(|(_, v)| v.min(0.0).powi(2))
            .sum()
    }

    /// Whether every constraint holds within tolerance
    #[must_use]
    pub fn is_feasible(&self, x: &[f64]) -> bool {
        self.evaluate(x)
            .iter()
            .all(|(_, v)| *v >= -FEASIBILITY_TOLERANCE)
    }

    /// Named satisfaction flags at `x`
    #[must_use]
    pub fn satisfaction(&self, x: &[f64]) -> BTreeMap<String, bool> {
        self.evaluate(x)
            .into_iter()
            .map(|(name, v)| (name, v >= -FEASIBILITY_TOLERANCE))
            .collect()
    }
}
