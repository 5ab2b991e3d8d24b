// ABOUTME: Biomechanics analyzer scoring muscle activation, movement quality, and coordination
// ABOUTME: Detects compensation patterns such as excessive trunk lean and knee misalignment
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Biomechanics Analysis
//!
//! Muscle activation is a Gaussian bump around each muscle's peak joint angle,
//! boosted by the force through that joint. Movement-quality sub-scores need a
//! minimum window; below it they report [`Estimate::InsufficientData`] rather
//! than a fabricated value.

use form_coach_core::models::{
    Estimate, ExerciseType, Joint, JointAngleSet, LandmarkName, MovementPhase, MuscleGroup,
    PhaseInterval, PhaseTimeline, PoseFrame,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::biomechanical_constants::{exercise_muscles, muscle_peak_angles};
use crate::config::BiomechanicsConfig;
use crate::physics::{ForceDistribution, PhysicsAnalyzer};
use crate::statistics::{self, central_difference};

/// Left/right segments compared for symmetry, keyed by their proximal joint
const SYMMETRY_SEGMENTS: [(&str, [LandmarkName; 4]); 3] = [
    (
        "shoulders",
        [
            LandmarkName::LeftShoulder,
            LandmarkName::LeftHip,
            LandmarkName::RightShoulder,
            LandmarkName::RightHip,
        ],
    ),
    (
        "hips",
        [
            LandmarkName::LeftHip,
            LandmarkName::LeftKnee,
            LandmarkName::RightHip,
            LandmarkName::RightKnee,
        ],
    ),
    (
        "knees",
        [
            LandmarkName::LeftKnee,
            LandmarkName::LeftAnkle,
            LandmarkName::RightKnee,
            LandmarkName::RightAnkle,
        ],
    ),
];

/// A detected movement compensation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "pattern", rename_all = "snake_case")]
pub enum Compensation {
    /// Trunk lean beyond the exercise limit
    ExcessiveSpineLean {
        /// Measured lean (degrees)
        angle: f64,
        /// Exercise limit (degrees)
        limit: f64,
    },
    /// Knee drifting out of the hip-ankle line in the frontal plane
    KneeMisalignment {
        /// Largest deviation (degrees)
        deviation: f64,
    },
    /// Left and right knee angles disagree
    KneeAsymmetry {
        /// Absolute difference (degrees)
        difference: f64,
    },
}

impl Compensation {
    /// Short identifier
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ExcessiveSpineLean { .. } => "excessive_spine_lean",
            Self::KneeMisalignment { .. } => "knee_misalignment",
            Self::KneeAsymmetry { .. } => "knee_asymmetry",
        }
    }
}

/// Movement-quality sub-scores, each in [0, 1] when measured
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovementQuality {
    /// Inverse of mean hip jerk
    pub smoothness: Estimate,
    /// Inverse of centre-of-mass variance; only measured for standing lifts
    pub stability: Estimate,
    /// Left/right segment length similarity
    pub symmetry: Estimate,
    /// Inverse of phase-duration variance
    pub tempo_consistency: Estimate,
    /// Achieved over expected primary-joint range, capped at 1
    pub range_of_motion: Estimate,
}

impl MovementQuality {
    /// All sub-scores unmeasured
    #[must_use]
    pub const fn insufficient() -> Self {
        Self {
            smoothness: Estimate::InsufficientData,
            stability: Estimate::InsufficientData,
            symmetry: Estimate::InsufficientData,
            tempo_consistency: Estimate::InsufficientData,
            range_of_motion: Estimate::InsufficientData,
        }
    }

    fn all(&self) -> [Estimate; 5] {
        [
            self.smoothness,
            self.stability,
            self.symmetry,
            self.tempo_consistency,
            self.range_of_motion,
        ]
    }

    /// Mean of the measured sub-scores
    #[must_use]
    pub fn overall(&self) -> Estimate {
        let measured: Vec<f64> = self.all().iter().filter_map(|e| e.value()).collect();
        if measured.is_empty() {
            Estimate::InsufficientData
        } else {
            Estimate::score(statistics::mean(&measured))
        }
    }

    /// Whether any sub-score lacked data
    #[must_use]
    pub fn has_gaps(&self) -> bool {
        self.all().iter().any(|e| !e.is_measured())
    }
}

/// Output of the biomechanics analyzer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiomechanicsResult {
    /// Activation per scored muscle group in [0, 1]
    pub muscle_activation: BTreeMap<MuscleGroup, f64>,
    /// Movement-quality sub-scores
    pub movement_quality: MovementQuality,
    /// Coordination in [0, 1]
    pub coordination_score: f64,
    /// Compensations found in the current frame
    pub compensations: Vec<Compensation>,
}

impl BiomechanicsResult {
    /// Mean muscle activation, neutral when no muscle could be scored
    #[must_use]
    pub fn mean_activation(&self) -> Estimate {
        if self.muscle_activation.is_empty() {
            return Estimate::InsufficientData;
        }
        let values: Vec<f64> = self.muscle_activation.values().copied().collect();
        Estimate::score(statistics::mean(&values))
    }

    /// Biological optimality `0.4 activation + 0.4 quality + 0.2 coordination`
    #[must_use]
    pub fn biological_optimality(&self) -> f64 {
        let activation = self.mean_activation().value_or_neutral();
        let quality = self.movement_quality.overall().value_or_neutral();
        0.2f64
            .mul_add(self.coordination_score, 0.4 * (activation + quality))
            .clamp(0.0, 1.0)
    }
}

/// Scores activation, quality and coordination of a movement window
#[derive(Debug, Clone, Default)]
pub struct BiomechanicsAnalyzer {
    config: BiomechanicsConfig,
}

impl BiomechanicsAnalyzer {
    /// Create an analyzer with the given settings
    #[must_use]
    pub const fn new(config: BiomechanicsConfig) -> Self {
        Self { config }
    }

    /// Analyze the window ending at the current frame
    ///
    /// `phase_history` indexes frames from the start of the stream; the window
    /// is taken to be its last `window.len()` frames.
    #[must_use]
    pub fn analyze(
        &self,
        window: &[PoseFrame],
        joint_angles: &JointAngleSet,
        forces: &ForceDistribution,
        exercise: ExerciseType,
        phase_history: &PhaseTimeline,
    ) -> BiomechanicsResult {
        let muscle_activation = self.muscle_activation(joint_angles, forces, exercise);
        let movement_quality = self.movement_quality(window, exercise, phase_history);
        let compensations = window
            .last()
            .map(|frame| self.compensations(frame, joint_angles, exercise))
            .unwrap_or_default();
        let coordination_score =
            self.coordination(window, forces, exercise, phase_history, &compensations);
        debug!(
            muscles = muscle_activation.len(),
            coordination = coordination_score,
            compensations = compensations.len(),
            "Biomechanics window analyzed"
        );
        BiomechanicsResult {
            muscle_activation,
            movement_quality,
            coordination_score,
            compensations,
        }
    }

    /// Activation of the exercise's muscle groups
    ///
    /// Groups whose joints are all unmeasured are omitted.
    #[must_use]
    pub fn muscle_activation(
        &self,
        angles: &JointAngleSet,
        forces: &ForceDistribution,
        exercise: ExerciseType,
    ) -> BTreeMap<MuscleGroup, f64> {
        exercise_muscles(exercise)
            .iter()
            .filter_map(|&muscle| {
                muscle_peak_angles(muscle)
                    .iter()
                    .filter_map(|&(joint, peak)| {
                        let angle = angles.get(joint)?;
                        let shape =
                            statistics::gaussian(angle, peak, self.config.activation_sigma_degrees);
                        let force = (forces.joint_force(joint)
                            / self.config.force_reference_newtons)
                            .min(1.0);
                        Some(shape * (1.0 + force))
                    })
                    .reduce(f64::max)
                    .map(|activation| (muscle, activation.clamp(0.0, 1.0)))
            })
            .collect()
    }

    /// Movement-quality sub-scores over the window
    #[must_use]
    pub fn movement_quality(
        &self,
        window: &[PoseFrame],
        exercise: ExerciseType,
        phase_history: &PhaseTimeline,
    ) -> MovementQuality {
        if window.len() < self.config.min_quality_frames {
            return MovementQuality::insufficient();
        }
        MovementQuality {
            smoothness: self.smoothness(window),
            stability: if exercise.is_standing_lift() {
                self.stability(window)
            } else {
                Estimate::InsufficientData
            },
            symmetry: Self::symmetry(window),
            tempo_consistency: Self::tempo_consistency(window.len(), phase_history),
            range_of_motion: Self::range_of_motion(window, exercise),
        }
    }

    fn smoothness(&self, window: &[PoseFrame]) -> Estimate {
        let samples: Vec<(f64, [f64; 3])> = window
            .iter()
            .filter_map(|frame| {
                let hip = frame.landmarks.position(LandmarkName::Hip)?;
                Some((frame.timestamp, [hip.x, hip.y, hip.z]))
            })
            .collect();
        if samples.len() < self.config.min_quality_frames {
            return Estimate::InsufficientData;
        }
        let times: Vec<f64> = samples.iter().map(|(t, _)| *t).collect();
        let jerk_axes: Vec<Vec<f64>> = (0..3)
            .map(|axis| {
                let positions: Vec<f64> = samples.iter().map(|(_, p)| p[axis]).collect();
                let velocity = central_difference(&positions, &times);
                let acceleration = central_difference(&velocity, &times);
                central_difference(&acceleration, &times)
            })
            .collect();
        let magnitudes: Vec<f64> = (0..samples.len())
            .map(|i| {
                jerk_axes
                    .iter()
                    .map(|axis| axis[i] * axis[i])
                    .sum::<f64>()
                    .sqrt()
            })
            .collect();
        Estimate::score(1.0 / (1.0 + statistics::mean(&magnitudes) / self.config.jerk_scale))
    }

    fn stability(&self, window: &[PoseFrame]) -> Estimate {
        let trajectory = PhysicsAnalyzer::relative_com_trajectory(window);
        if trajectory.len() < self.config.min_quality_frames {
            return Estimate::InsufficientData;
        }
        let xs: Vec<f64> = trajectory.iter().map(|(_, p)| p.x).collect();
        let ys: Vec<f64> = trajectory.iter().map(|(_, p)| p.y).collect();
        let spread = statistics::variance(&xs) + statistics::variance(&ys);
        Estimate::score(1.0 / self.config.stability_variance_scale.mul_add(spread, 1.0))
    }

    fn symmetry(window: &[PoseFrame]) -> Estimate {
        let similarities: Vec<f64> = window
            .iter()
            .flat_map(|frame| {
                SYMMETRY_SEGMENTS
                    .iter()
                    .filter_map(|(_, [l1, l2, r1, r2])| {
                        let lm = &frame.landmarks;
                        let left = lm.position(*l1)?.distance(lm.position(*l2)?);
                        let right = lm.position(*r1)?.distance(lm.position(*r2)?);
                        let longest = left.max(right);
                        (longest > 0.0).then(|| 1.0 - (left - right).abs() / longest)
                    })
                    .collect::<Vec<_>>()
            })
            .collect();
        if similarities.is_empty() {
            Estimate::InsufficientData
        } else {
            Estimate::score(statistics::mean(&similarities))
        }
    }

    fn tempo_consistency(window_len: usize, phase_history: &PhaseTimeline) -> Estimate {
        let durations: Vec<f64> = completed_in_window(phase_history, window_len)
            .filter(|interval| !interval.phase.is_stationary())
            .map(|interval| interval.duration_seconds)
            .collect();
        if durations.len() < 2 {
            return Estimate::InsufficientData;
        }
        Estimate::score(1.0 / (1.0 + statistics::variance(&durations)))
    }

    fn range_of_motion(window: &[PoseFrame], exercise: ExerciseType) -> Estimate {
        let joint = exercise.primary_joint();
        let angles: Vec<f64> = window
            .iter()
            .filter_map(|frame| PhysicsAnalyzer::joint_angles(&frame.landmarks).get(joint))
            .collect();
        if angles.len() < 2 {
            return Estimate::InsufficientData;
        }
        let (lo, hi) = angles
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &a| {
                (lo.min(a), hi.max(a))
            });
        Estimate::score(((hi - lo) / exercise.expected_range_of_motion()).min(1.0))
    }

    /// Compensation patterns visible in the current frame
    #[must_use]
    pub fn compensations(
        &self,
        frame: &PoseFrame,
        angles: &JointAngleSet,
        exercise: ExerciseType,
    ) -> Vec<Compensation> {
        let mut found = Vec::new();
        if let (Some(limit), Some(angle)) = (exercise.spine_lean_limit(), angles.get(Joint::Spine))
        {
            if angle > limit {
                found.push(Compensation::ExcessiveSpineLean { angle, limit });
            }
        }
        if exercise.is_standing_lift() {
            if let Some(deviation) = PhysicsAnalyzer::frontal_knee_deviation(&frame.landmarks) {
                if deviation > self.config.knee_misalignment_degrees {
                    found.push(Compensation::KneeMisalignment { deviation });
                }
            }
            if let Some((left, right)) = PhysicsAnalyzer::knee_angles(&frame.landmarks) {
                let difference = (left - right).abs();
                if difference > self.config.asymmetry_degrees {
                    found.push(Compensation::KneeAsymmetry { difference });
                }
            }
        }
        found
    }

    fn coordination(
        &self,
        window: &[PoseFrame],
        forces: &ForceDistribution,
        exercise: ExerciseType,
        phase_history: &PhaseTimeline,
        compensations: &[Compensation],
    ) -> f64 {
        let cfg = &self.config;
        let mut score: f64 = 1.0;

        if let (Some(first), Some(last)) = (window.first(), window.last()) {
            let seconds = last.timestamp - first.timestamp;
            let overlapping = in_window(phase_history, window.len()).count();
            if seconds > 0.0 && overlapping > 1 {
                let rate = (overlapping - 1) as f64 / seconds;
                if rate > cfg.max_transition_rate {
                    score *= cfg.transition_penalty;
                }
            }
        }

        if let Some(cv) = self.stable_phase_activation_cv(window, forces, exercise, phase_history)
        {
            if cv > cfg.activation_cv_threshold {
                score *= cfg.activation_variability_penalty;
            }
        }

        for compensation in compensations {
            score *= match compensation {
                Compensation::ExcessiveSpineLean { .. } => cfg.spine_compensation_penalty,
                Compensation::KneeMisalignment { .. } => cfg.knee_misalignment_penalty,
                Compensation::KneeAsymmetry { .. } => cfg.asymmetry_penalty,
            };
        }
        score.clamp(0.0, 1.0)
    }

    /// Variability of mean activation across the frames of a current stationary phase
    fn stable_phase_activation_cv(
        &self,
        window: &[PoseFrame],
        forces: &ForceDistribution,
        exercise: ExerciseType,
        phase_history: &PhaseTimeline,
    ) -> Option<f64> {
        let current = phase_history.intervals().last()?;
        if !current.phase.is_stationary() || current.phase == MovementPhase::Setup {
            return None;
        }
        let window_start = window_start(phase_history, window.len());
        let first = current.start_frame.max(window_start) - window_start;
        let frames = window.get(first..)?;
        if frames.len() < 3 {
            return None;
        }
        let activations: Vec<f64> = frames
            .iter()
            .map(|frame| {
                let angles = PhysicsAnalyzer::joint_angles(&frame.landmarks);
                let per_muscle: Vec<f64> = self
                    .muscle_activation(&angles, forces, exercise)
                    .into_values()
                    .collect();
                statistics::mean(&per_muscle)
            })
            .collect();
        statistics::coefficient_of_variation(&activations)
    }
}

/// First stream frame index covered by a window of `window_len` frames
fn window_start(timeline: &PhaseTimeline, window_len: usize) -> usize {
    let total = timeline
        .intervals()
        .last()
        .map_or(0, |interval| interval.end_frame + 1);
    total.saturating_sub(window_len)
}

fn in_window(timeline: &PhaseTimeline, window_len: usize) -> impl Iterator<Item = &PhaseInterval> {
    let start = window_start(timeline, window_len);
    timeline
        .intervals()
        .iter()
        .filter(move |interval| interval.end_frame >= start)
}

/// Intervals overlapping the window, excluding the still-open last one
fn completed_in_window(
    timeline: &PhaseTimeline,
    window_len: usize,
) -> impl Iterator<Item = &PhaseInterval> {
    let open = timeline.len().saturating_sub(1);
    let start = window_start(timeline, window_len);
    timeline
        .intervals()
        .iter()
        .enumerate()
        .filter(move |(index, interval)| *index < open && interval.end_frame >= start)
        .map(|(_, interval)| interval)
}
