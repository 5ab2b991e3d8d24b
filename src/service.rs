// ABOUTME: Stateless form analysis facade for single frames, whole sequences and optimal form
// ABOUTME: Batch analysis runs the order-independent stages on rayon and re-sequences by frame
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Form Analysis Service
//!
//! Entry points for callers that do not keep a session of their own:
//!
//! - [`FormAnalysisService::analyze_frame`] scores one detector output in
//!   isolation; window-dependent metrics report insufficient data.
//! - [`FormAnalysisService::analyze_sequence`] scores a recorded sequence and
//!   summarizes it.
//! - [`FormAnalysisService::get_optimal_form`] solves for the optimal joint
//!   angles of a pose.
//!
//! Live capture should use [`FormAnalysisService::start_session`] instead, so
//! history accumulates across frames.

use std::sync::Arc;
use std::time::Instant;

use form_coach_core::constants::topology::DEFAULT_FRAME_RATE;
use form_coach_core::errors::{AppError, AppResult};
use form_coach_core::models::{
    ExerciseType, JointAngleSet, MovementPhase, PhaseTimeline, Point3, PoseFrame, PoseSequence,
    UserProfile,
};
use form_coach_intelligence::{FormAnalysisConfig, OptimalFormReport};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::aggregator::{
    checked_landmarks, AnalysisPipeline, FormAnalysisSession, FrameAnalysis, FrameContext,
    FrameOutcome, PoseDetection, PracticeTracker, SessionAccumulator, SessionSummary,
};

/// Result of analyzing a recorded sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceAnalysis {
    /// One analysis per frame with a pose, in frame order
    pub frames: Vec<FrameAnalysis>,
    /// Phase timeline over the analyzed frames
    pub timeline: PhaseTimeline,
    /// Session-level aggregate
    pub summary: SessionSummary,
}

/// Shared entry point to the analysis pipeline
#[derive(Debug, Clone)]
pub struct FormAnalysisService {
    pipeline: Arc<AnalysisPipeline>,
}

impl FormAnalysisService {
    /// Build a service from an explicit configuration
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the configuration fails validation.
    pub fn new(config: FormAnalysisConfig) -> AppResult<Self> {
        Ok(Self::from_pipeline(Arc::new(AnalysisPipeline::new(config)?)))
    }

    /// Build a service from defaults with `FORM_COACH_*` overrides
    ///
    /// # Errors
    ///
    /// Returns a configuration error if an override is unparsable or invalid.
    pub fn from_env() -> AppResult<Self> {
        Self::new(FormAnalysisConfig::from_env()?)
    }

    /// Wrap an existing pipeline
    #[must_use]
    pub const fn from_pipeline(pipeline: Arc<AnalysisPipeline>) -> Self {
        Self { pipeline }
    }

    /// Pipeline shared by every session of this service
    #[must_use]
    pub fn pipeline(&self) -> &AnalysisPipeline {
        &self.pipeline
    }

    /// Open a live session for one user and exercise
    ///
    /// # Errors
    ///
    /// Returns an error if the profile is invalid or the frame rate is not positive.
    pub fn start_session(
        &self,
        exercise: ExerciseType,
        user: UserProfile,
        frame_rate: f64,
    ) -> AppResult<FormAnalysisSession> {
        FormAnalysisSession::new(Arc::clone(&self.pipeline), exercise, user, frame_rate)
    }

    /// Analyze one detector output without history
    ///
    /// `load_position` is the external load in the normalized body frame.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown exercise, an invalid profile or a pose
    /// missing required landmarks.
    pub fn analyze_frame(
        &self,
        detection: PoseDetection,
        exercise: &str,
        user: &UserProfile,
        load_position: Option<Point3>,
    ) -> AppResult<FrameOutcome> {
        let exercise: ExerciseType = exercise.parse()?;
        let mut session = self.start_session(exercise, user.clone(), DEFAULT_FRAME_RATE)?;
        session.analyze_frame(0.0, detection, load_position)
    }

    /// Analyze a recorded sequence and summarize it
    ///
    /// Frames without any landmark count as no-pose frames. Phases come from
    /// the batch detector over the whole cleaned sequence; each frame's
    /// window is the configured history ending at that frame.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown exercise, an invalid profile, a frame
    /// missing required landmarks, or a sequence with no pose at all.
    pub fn analyze_sequence(
        &self,
        sequence: &PoseSequence,
        exercise: &str,
        user: &UserProfile,
    ) -> AppResult<SequenceAnalysis> {
        let started = Instant::now();
        let exercise: ExerciseType = exercise.parse()?;
        user.validate()?;

        let visibility_threshold = self.pipeline.config().preprocessing.visibility_threshold;
        let mut frames_without_pose = 0;
        let mut kept = Vec::with_capacity(sequence.len());
        for frame in sequence.frames() {
            if frame.landmarks.present_count() == 0 {
                frames_without_pose += 1;
                continue;
            }
            let landmarks =
                checked_landmarks(frame.landmarks.clone(), exercise, visibility_threshold)?;
            kept.push(PoseFrame::new(frame.timestamp, landmarks));
        }
        if kept.is_empty() {
            return Err(AppError::empty_session());
        }

        let raw = PoseSequence::new(kept, sequence.frame_rate())?;
        let clean = self.pipeline.preprocessor().preprocess(&raw)?;
        let timeline = self.pipeline.phase_detector().detect(&clean, exercise);
        let frames = clean.frames();
        let capacity = self.pipeline.config().aggregation.history_capacity;
        let window_of = |i: usize| &frames[(i + 1).saturating_sub(capacity)..=i];

        let stages = (0..frames.len())
            .into_par_iter()
            .map(|i| {
                self.pipeline
                    .frame_stages(window_of(i), &timeline.up_to(i), exercise, user, None)
            })
            .collect::<AppResult<Vec<_>>>()?;
        debug!(frames = stages.len(), "Parallel frame stages complete");

        let safety_flags = self.pipeline.safety_flags(user);
        let mut practice = PracticeTracker::default();
        let mut accumulator = SessionAccumulator::new();
        let mut analyses = Vec::with_capacity(stages.len());
        for (i, stage) in stages.into_iter().enumerate() {
            let window = window_of(i);
            let complex_systems =
                self.pipeline
                    .complex_systems()
                    .analyze(window, exercise, practice.records());
            let analysis = self.pipeline.assemble(
                FrameContext {
                    index: i,
                    timestamp: frames[i].timestamp,
                    phase: timeline.phase_at(i).unwrap_or(MovementPhase::Setup),
                    exercise,
                },
                stage,
                complex_systems,
                &safety_flags,
            );
            practice.observe(timeline.up_to(i).repetition_count(), analysis.scores.overall);
            accumulator.record(&analysis);
            analyses.push(analysis);
        }

        let summary = accumulator.finish(
            &timeline,
            frames_without_pose,
            &safety_flags,
            &self.pipeline.config().aggregation,
        )?;
        info!(
            exercise = exercise.as_str(),
            frames = summary.frames_analyzed,
            frames_without_pose,
            reps = summary.repetition_count,
            overall = summary.mean_scores.overall,
            elapsed_ms = started.elapsed().as_millis(),
            "Sequence analyzed"
        );
        Ok(SequenceAnalysis {
            frames: analyses,
            timeline,
            summary,
        })
    }

    /// Optimal joint angles for a pose, with priorities and a progression path
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown exercise, an invalid profile, or
    /// angles with no joint relevant to the exercise.
    pub fn get_optimal_form(
        &self,
        current: &JointAngleSet,
        user: &UserProfile,
        exercise: &str,
    ) -> AppResult<OptimalFormReport> {
        let exercise: ExerciseType = exercise.parse()?;
        self.pipeline.optimization().optimize(current, user, exercise)
    }
}
