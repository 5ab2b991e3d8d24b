// ABOUTME: Rule-based feedback generation from per-frame analysis results
// ABOUTME: Merges physics, biomechanics, stability, optimization and safety feedback by priority
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Feedback rules
//!
//! Messages are phrased without frame-specific numbers so that the same issue
//! produces the same message on every frame; the measured and target values
//! travel in `current_value` and `optimal_value`.

use std::collections::HashSet;

use form_coach_core::models::{
    ExerciseType, FeedbackItem, FeedbackPriority, FeedbackType, Joint, UnifiedScoreSet,
};
use form_coach_intelligence::config::AggregationConfig;
use form_coach_intelligence::{
    BiomechanicsResult, Compensation, ComplexSystemsResult, ImprovementPriority, PhysicsResult,
    SafetyFlag, SafetyLevel,
};

/// Angle correction above which optimization feedback is high priority (degrees)
const HIGH_PRIORITY_CORRECTION: f64 = 20.0;
/// Angle correction above which optimization feedback is medium priority (degrees)
const MEDIUM_PRIORITY_CORRECTION: f64 = 10.0;

/// Everything the feedback rules read for one frame
#[derive(Debug, Clone, Copy)]
pub struct FeedbackInputs<'a> {
    /// Exercise being performed
    pub exercise: ExerciseType,
    /// Physics stage output
    pub physics: &'a PhysicsResult,
    /// Biomechanics stage output
    pub biomechanics: &'a BiomechanicsResult,
    /// Complex-systems stage output
    pub complex_systems: &'a ComplexSystemsResult,
    /// Unified scores of the frame
    pub scores: &'a UnifiedScoreSet,
    /// Ranked joint corrections
    pub priorities: &'a [ImprovementPriority],
    /// Goal safety findings for the session's profile
    pub safety_flags: &'a [SafetyFlag],
}

/// Turns analysis results into ranked feedback items
#[derive(Debug, Clone, Default)]
pub struct FeedbackGenerator {
    config: AggregationConfig,
}

impl FeedbackGenerator {
    /// Create a generator with the given thresholds and caps
    #[must_use]
    pub const fn new(config: AggregationConfig) -> Self {
        Self { config }
    }

    /// Feedback for one frame, deduplicated, sorted high to low and capped
    #[must_use]
    pub fn generate(&self, inputs: &FeedbackInputs<'_>) -> Vec<FeedbackItem> {
        let items = self
            .physics_feedback(inputs)
            .into_iter()
            .chain(self.biomechanics_feedback(inputs))
            .chain(self.stability_feedback(inputs))
            .chain(self.optimization_feedback(inputs.priorities))
            .chain(Self::safety_feedback(inputs.safety_flags));
        merge_feedback(items, self.config.feedback_cap)
    }

    /// Posture and efficiency feedback when physics efficiency is low
    fn physics_feedback(&self, inputs: &FeedbackInputs<'_>) -> Vec<FeedbackItem> {
        let mut feedback = Vec::new();
        if inputs.scores.physics_efficiency >= self.config.feedback_threshold {
            return feedback;
        }

        if let (Some(limit), Some(spine)) = (
            inputs.exercise.spine_lean_limit(),
            inputs.physics.joint_angles.get(Joint::Spine),
        ) {
            if spine > limit {
                feedback.push(
                    FeedbackItem::new(
                        FeedbackType::Physics,
                        FeedbackPriority::High,
                        "spine_angle",
                        "Keep your chest up: your trunk is leaning too far forward",
                    )
                    .with_values(spine, limit),
                );
            }
        }

        if let Some(efficiency) = inputs.physics.energy_efficiency.value() {
            if efficiency < self.config.feedback_threshold {
                feedback.push(
                    FeedbackItem::new(
                        FeedbackType::Physics,
                        FeedbackPriority::Medium,
                        "energy_efficiency",
                        "Move at a steady pace and avoid sudden changes of speed",
                    )
                    .with_values(efficiency, 1.0),
                );
            }
        }
        feedback
    }

    /// Compensation, range and coordination feedback when biological optimality is low
    fn biomechanics_feedback(&self, inputs: &FeedbackInputs<'_>) -> Vec<FeedbackItem> {
        let mut feedback = Vec::new();
        let threshold = self.config.feedback_threshold;
        if inputs.scores.biological_optimality >= threshold {
            return feedback;
        }

        for compensation in &inputs.biomechanics.compensations {
            feedback.push(compensation_feedback(compensation));
        }

        let quality = &inputs.biomechanics.movement_quality;
        if let Some(range) = quality.range_of_motion.value() {
            if range < threshold {
                feedback.push(
                    FeedbackItem::new(
                        FeedbackType::Biomechanics,
                        FeedbackPriority::Medium,
                        "range_of_motion",
                        "Use your full range of motion on every repetition",
                    )
                    .with_values(range, 1.0),
                );
            }
        }
        if let Some(tempo) = quality.tempo_consistency.value() {
            if tempo < threshold {
                feedback.push(
                    FeedbackItem::new(
                        FeedbackType::Biomechanics,
                        FeedbackPriority::Low,
                        "tempo_consistency",
                        "Keep the same tempo from one repetition to the next",
                    )
                    .with_values(tempo, 1.0),
                );
            }
        }
        if inputs.biomechanics.coordination_score < threshold {
            feedback.push(
                FeedbackItem::new(
                    FeedbackType::Biomechanics,
                    FeedbackPriority::Medium,
                    "coordination",
                    "Slow down and control each phase of the movement",
                )
                .with_values(inputs.biomechanics.coordination_score, 1.0),
            );
        }

        if feedback.is_empty() {
            feedback.push(
                FeedbackItem::new(
                    FeedbackType::Biomechanics,
                    FeedbackPriority::Medium,
                    "biological_optimality",
                    "Focus on engaging the target muscles through the whole movement",
                )
                .with_values(inputs.scores.biological_optimality, 1.0),
            );
        }
        feedback
    }

    /// Pattern consistency feedback when system stability was measured and is low
    fn stability_feedback(&self, inputs: &FeedbackInputs<'_>) -> Option<FeedbackItem> {
        let stability = inputs.complex_systems.system_stability().value()?;
        (stability < self.config.feedback_threshold).then(|| {
            FeedbackItem::new(
                FeedbackType::Stability,
                FeedbackPriority::Low,
                "system_stability",
                "Aim for the same movement pattern on every repetition",
            )
            .with_values(stability, 1.0)
        })
    }

    /// The leading joint corrections
    fn optimization_feedback(&self, priorities: &[ImprovementPriority]) -> Vec<FeedbackItem> {
        priorities
            .iter()
            .take(self.config.optimization_feedback_count)
            .map(|priority| {
                let magnitude = priority.difference.abs();
                let level = if magnitude > HIGH_PRIORITY_CORRECTION {
                    FeedbackPriority::High
                } else if magnitude > MEDIUM_PRIORITY_CORRECTION {
                    FeedbackPriority::Medium
                } else {
                    FeedbackPriority::Low
                };
                FeedbackItem::new(
                    FeedbackType::Optimization,
                    level,
                    format!("{}_angle", priority.joint),
                    joint_correction_message(priority.joint, priority.difference),
                )
                .with_values(priority.current_angle, priority.optimal_angle)
            })
            .collect()
    }

    fn safety_feedback(flags: &[SafetyFlag]) -> Vec<FeedbackItem> {
        flags
            .iter()
            .map(|flag| {
                let priority = match flag.level {
                    SafetyLevel::Critical => FeedbackPriority::High,
                    SafetyLevel::Caution => FeedbackPriority::Medium,
                    SafetyLevel::Safe => FeedbackPriority::Low,
                };
                FeedbackItem::new(
                    FeedbackType::Safety,
                    priority,
                    flag.check.as_str(),
                    flag.message.clone(),
                )
                .with_values(flag.value, flag.threshold)
            })
            .collect()
    }
}

fn compensation_feedback(compensation: &Compensation) -> FeedbackItem {
    match *compensation {
        Compensation::ExcessiveSpineLean { angle, limit } => FeedbackItem::new(
            FeedbackType::Biomechanics,
            FeedbackPriority::High,
            compensation.name(),
            "Brace your core to stop your back from rounding forward",
        )
        .with_values(angle, limit),
        Compensation::KneeMisalignment { deviation } => FeedbackItem::new(
            FeedbackType::Biomechanics,
            FeedbackPriority::High,
            compensation.name(),
            "Keep your knees tracking over your toes",
        )
        .with_values(deviation, 0.0),
        Compensation::KneeAsymmetry { difference } => FeedbackItem::new(
            FeedbackType::Biomechanics,
            FeedbackPriority::Medium,
            compensation.name(),
            "Distribute your weight evenly between both legs",
        )
        .with_values(difference, 0.0),
    }
}

fn joint_correction_message(joint: Joint, difference: f64) -> String {
    match (joint, difference < 0.0) {
        (Joint::Spine, true) => "Stay more upright through your torso".to_owned(),
        (Joint::Spine, false) => "Allow a little more forward lean from the hips".to_owned(),
        (joint, true) => format!("Bend your {joint} more"),
        (joint, false) => format!("Straighten your {joint} more"),
    }
}

/// Deduplicate by message keeping the most urgent copy, sort high to low, cap
///
/// The sort is stable, so items of equal priority keep their input order.
#[must_use]
pub fn merge_feedback(
    items: impl IntoIterator<Item = FeedbackItem>,
    cap: usize,
) -> Vec<FeedbackItem> {
    let mut sorted: Vec<FeedbackItem> = items.into_iter().collect();
    sorted.sort_by_key(|item| item.priority);
    let mut seen = HashSet::new();
    let mut merged: Vec<FeedbackItem> = sorted
        .into_iter()
        .filter(|item| seen.insert(item.message.clone()))
        .collect();
    merged.truncate(cap);
    merged
}
