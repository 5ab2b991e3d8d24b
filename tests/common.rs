// ABOUTME: Shared fixtures for form analysis integration tests
// ABOUTME: Seeded synthetic sequences, standard profiles and quiet test logging
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]
//! Shared test utilities for `form_coach`
//!
//! Every sequence comes from a seeded generator so each test is reproducible.

use std::env;
use std::sync::Once;

use form_coach::core::models::{
    ExerciseType, Landmark, LandmarkFrame, LandmarkName, PoseFrame, PoseSequence, UserProfile,
};
use form_coach::intelligence::SyntheticPoseGenerator;
use form_coach::FormAnalysisService;
use tracing::Level;

static INIT_LOGGER: Once = Once::new();

/// Seed used by fixtures that do not care about the exact noise
pub const SEED: u64 = 7;

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => Level::TRACE,
            Ok("DEBUG") => Level::DEBUG,
            Ok("INFO") => Level::INFO,
            _ => Level::WARN,
        };
        let _ = tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .try_init();
    });
}

/// 178 cm, 80 kg, no goals
pub fn test_user() -> UserProfile {
    UserProfile::new(178.0, 80.0)
}

/// Service with default configuration
pub fn default_service() -> FormAnalysisService {
    init_test_logging();
    FormAnalysisService::new(form_coach::FormAnalysisConfig::default())
        .expect("default configuration is valid")
}

/// Five squat repetitions at 30 fps (750 frames)
pub fn five_rep_squat(seed: u64) -> PoseSequence {
    SyntheticPoseGenerator::new(seed)
        .squat_sequence()
        .expect("positive frame rate")
}

/// A shorter squat sequence
pub fn squat_reps(seed: u64, repetitions: usize) -> PoseSequence {
    SyntheticPoseGenerator::new(seed)
        .with_repetitions(repetitions)
        .squat_sequence()
        .expect("positive frame rate")
}

/// Still standing pose held for `frames` frames
pub fn standing_hold(seed: u64, frames: usize) -> PoseSequence {
    SyntheticPoseGenerator::new(seed)
        .standing_sequence(frames)
        .expect("positive frame rate")
}

/// Noise-free standing frame
pub fn standing_frame() -> LandmarkFrame {
    SyntheticPoseGenerator::new(SEED).standing_frame()
}

/// Noise-free squat bottom frame
pub fn bottom_frame() -> LandmarkFrame {
    SyntheticPoseGenerator::new(SEED).bottom_frame()
}

/// Copy of `frame` without the given landmarks
pub fn without(frame: &LandmarkFrame, names: &[LandmarkName]) -> LandmarkFrame {
    let mut out = frame.clone();
    for name in names {
        out.clear(*name);
    }
    out
}

/// Copy of `frame` with one landmark's visibility replaced
pub fn with_visibility(frame: &LandmarkFrame, name: LandmarkName, visibility: f64) -> LandmarkFrame {
    let mut out = frame.clone();
    if let Some(landmark) = frame.get(name) {
        out.set(name, landmark.with_visibility(visibility));
    }
    out
}

/// Copy of `frame` with one landmark moved
pub fn with_landmark(frame: &LandmarkFrame, name: LandmarkName, landmark: Landmark) -> LandmarkFrame {
    let mut out = frame.clone();
    out.set(name, landmark);
    out
}

/// Sequence of `frames` at 30 fps
pub fn sequence_of(frames: Vec<LandmarkFrame>) -> PoseSequence {
    PoseSequence::from_landmark_frames(frames, 30.0).expect("positive frame rate")
}

/// Frames of a sequence as timestamped pose frames
pub fn pose_frames(sequence: &PoseSequence) -> Vec<PoseFrame> {
    sequence.frames().to_vec()
}

/// Exercise used by most aggregator tests
pub const SQUAT: ExerciseType = ExerciseType::Squat;
