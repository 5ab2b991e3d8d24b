// ABOUTME: Core data models for the form analysis pipeline
// ABOUTME: Re-exports landmark, joint, phase, exercise, profile and result types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Data Models
//!
//! Every stage of the pipeline exchanges these explicit records instead of
//! loosely shaped maps, so an absent value is always distinguishable from a
//! measured zero.
//!
//! ## Core Models
//!
//! - `LandmarkFrame`: one `Option<Landmark>` slot per `LandmarkName`
//! - `PoseSequence`: timestamped frames plus nominal frame rate
//! - `JointAngleSet`: joint angles in degrees, absent when unmeasurable
//! - `PhaseTimeline`: gap-free phase intervals with repetition counting
//! - `UserProfile`: anthropometrics, goals and limitations
//! - `OptimalForm`, `UnifiedScoreSet`, `FeedbackItem`: analysis outputs

mod analysis;
mod exercise;
mod joint;
mod landmark;
mod phase;
mod profile;

pub use analysis::{
    Estimate, FeedbackItem, FeedbackPriority, FeedbackType, ObjectiveScores, OptimalForm,
    SolverOutcome, UnifiedScoreSet, UnifiedWeights,
};
pub use exercise::{ExerciseType, MuscleGroup, TrackedSignal};
pub use joint::{Joint, JointAngleSet};
pub use landmark::{Landmark, LandmarkFrame, LandmarkName, Point3, PoseFrame, PoseSequence};
pub use phase::{MovementPhase, PhaseInterval, PhaseTimeline};
pub use profile::{Gender, TrainingGoal, UserProfile};
