// ABOUTME: Live form analysis session owning the rolling history of one user and exercise
// ABOUTME: Runs every pipeline stage per submitted frame in timestamp order
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::VecDeque;
use std::sync::Arc;

use form_coach_core::errors::{AppError, AppResult};
use form_coach_core::models::{
    ExerciseType, MovementPhase, PhaseTimeline, Point3, PoseFrame, PoseSequence, UserProfile,
};
use form_coach_intelligence::phase_detection::tracked_position;
use form_coach_intelligence::{PracticeRecord, SafetyFlag, StreamingPhaseTracker};
use tracing::{debug, info, info_span};

use super::frame::{FrameAnalysis, FrameOutcome, PoseDetection};
use super::pipeline::{checked_landmarks, AnalysisPipeline, FrameContext, PracticeTracker};
use super::summary::{SessionAccumulator, SessionSummary};

/// Analysis state of one user performing one exercise
///
/// Frames must arrive in non-decreasing timestamp order. The raw frame and
/// result histories are bounded by the configured capacity, oldest evicted;
/// session totals for the summary cover every frame.
#[derive(Debug)]
pub struct FormAnalysisSession {
    pipeline: Arc<AnalysisPipeline>,
    exercise: ExerciseType,
    user: UserProfile,
    frame_rate: f64,
    raw_history: VecDeque<PoseFrame>,
    results: VecDeque<FrameAnalysis>,
    tracker: StreamingPhaseTracker,
    practice: PracticeTracker,
    safety_flags: Vec<SafetyFlag>,
    accumulator: SessionAccumulator,
    frames_analyzed: usize,
    frames_without_pose: usize,
    last_timestamp: Option<f64>,
}

impl FormAnalysisSession {
    /// Start a session
    ///
    /// Goal safety is checked once here; its findings accompany every frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile holds impossible values or the frame
    /// rate is not positive.
    pub fn new(
        pipeline: Arc<AnalysisPipeline>,
        exercise: ExerciseType,
        user: UserProfile,
        frame_rate: f64,
    ) -> AppResult<Self> {
        user.validate()?;
        if !(frame_rate.is_finite() && frame_rate > 0.0) {
            return Err(AppError::value_out_of_range(
                "frame_rate",
                frame_rate,
                "a positive number of frames per second",
            ));
        }
        let capacity = pipeline.config().aggregation.history_capacity;
        let tracker =
            StreamingPhaseTracker::new(pipeline.config().phase_detection.clone(), frame_rate);
        let safety_flags = pipeline.safety_flags(&user);
        info!(
            exercise = exercise.as_str(),
            frame_rate,
            safety_flags = safety_flags.len(),
            "Form analysis session started"
        );
        Ok(Self {
            pipeline,
            exercise,
            user,
            frame_rate,
            raw_history: VecDeque::with_capacity(capacity),
            results: VecDeque::with_capacity(capacity),
            tracker,
            practice: PracticeTracker::default(),
            safety_flags,
            accumulator: SessionAccumulator::new(),
            frames_analyzed: 0,
            frames_without_pose: 0,
            last_timestamp: None,
        })
    }

    /// Seed practice records from earlier sessions
    #[must_use]
    pub fn with_practice_history(mut self, records: Vec<PracticeRecord>) -> Self {
        self.practice = PracticeTracker::with_history(records);
        self
    }

    /// Exercise being analyzed
    #[must_use]
    pub const fn exercise(&self) -> ExerciseType {
        self.exercise
    }

    /// Profile of the user
    #[must_use]
    pub const fn user(&self) -> &UserProfile {
        &self.user
    }

    /// Frames scored so far
    #[must_use]
    pub const fn frames_analyzed(&self) -> usize {
        self.frames_analyzed
    }

    /// Frames skipped for lack of a pose
    #[must_use]
    pub const fn frames_without_pose(&self) -> usize {
        self.frames_without_pose
    }

    /// Retained results, oldest first
    pub fn history(&self) -> impl Iterator<Item = &FrameAnalysis> {
        self.results.iter()
    }

    /// Retained raw frames, oldest first
    pub fn raw_history(&self) -> impl Iterator<Item = &PoseFrame> {
        self.raw_history.iter()
    }

    /// Most recent result
    #[must_use]
    pub fn latest(&self) -> Option<&FrameAnalysis> {
        self.results.back()
    }

    /// Phase timeline over every analyzed frame
    #[must_use]
    pub fn timeline(&self) -> PhaseTimeline {
        self.tracker.timeline()
    }

    /// Current movement phase
    #[must_use]
    pub const fn current_phase(&self) -> MovementPhase {
        self.tracker.current_phase()
    }

    /// Completed repetitions
    #[must_use]
    pub const fn repetition_count(&self) -> usize {
        self.practice.completed_reps()
    }

    /// Practice records, one per completed repetition after any seeded history
    #[must_use]
    pub fn practice_history(&self) -> &[PracticeRecord] {
        self.practice.records()
    }

    /// Goal safety findings of the profile
    #[must_use]
    pub fn safety_flags(&self) -> &[SafetyFlag] {
        &self.safety_flags
    }

    /// Analyze one frame from the pose detector
    ///
    /// `load_position` is the external load's position in the normalized body
    /// frame (mid-hip origin, unit reference width), used for moment arms.
    ///
    /// # Errors
    ///
    /// Returns an error for a non-finite or out-of-order timestamp, or a
    /// detected pose missing landmarks the exercise requires. A frame without
    /// a pose is not an error.
    pub fn analyze_frame(
        &mut self,
        timestamp: f64,
        detection: PoseDetection,
        load_position: Option<Point3>,
    ) -> AppResult<FrameOutcome> {
        let span = info_span!(
            "analyze_frame",
            exercise = self.exercise.as_str(),
            frame = self.frames_analyzed,
            timestamp
        );
        let _guard = span.enter();

        self.check_timestamp(timestamp)?;
        let landmarks = match detection {
            PoseDetection::Detected(landmarks) => landmarks,
            PoseDetection::NoPoseDetected => {
                self.frames_without_pose += 1;
                self.last_timestamp = Some(timestamp);
                debug!("No pose detected; frame skipped");
                return Ok(FrameOutcome::NoPoseDetected { timestamp });
            }
        };
        let landmarks = checked_landmarks(
            landmarks,
            self.exercise,
            self.pipeline.config().preprocessing.visibility_threshold,
        )?;
        let frame = PoseFrame::new(timestamp, landmarks);

        // Nothing below mutates the session until every fallible stage has run
        let capacity = self.pipeline.config().aggregation.history_capacity;
        let skip = (self.raw_history.len() + 1).saturating_sub(capacity);
        let mut pending: Vec<PoseFrame> = self.raw_history.iter().skip(skip).cloned().collect();
        pending.push(frame.clone());
        let raw = PoseSequence::new(pending, self.frame_rate)?;
        let clean = self.pipeline.preprocessor().preprocess(&raw)?;
        let window = clean.frames();
        let Some(current) = window.last() else {
            return Err(AppError::internal("Preprocessed window is empty"));
        };

        let mut tracker = self.tracker.clone();
        let phase = tracker.push(timestamp, tracked_position(&current.landmarks, self.exercise));
        let timeline = tracker.timeline();

        let stages = self.pipeline.frame_stages(
            window,
            &timeline,
            self.exercise,
            &self.user,
            load_position,
        )?;
        let complex_systems =
            self.pipeline
                .complex_systems()
                .analyze(window, self.exercise, self.practice.records());
        let analysis = self.pipeline.assemble(
            FrameContext {
                index: self.frames_analyzed,
                timestamp,
                phase,
                exercise: self.exercise,
            },
            stages,
            complex_systems,
            &self.safety_flags,
        );

        self.last_timestamp = Some(timestamp);
        self.push_raw(frame);
        self.tracker = tracker;
        self.frames_analyzed += 1;
        self.practice
            .observe(timeline.repetition_count(), analysis.scores.overall);
        self.accumulator.record(&analysis);
        self.push_result(analysis.clone());

        debug!(
            phase = phase.as_str(),
            overall = analysis.scores.overall,
            feedback = analysis.feedback.len(),
            low_confidence = analysis.low_confidence,
            "Frame analyzed"
        );
        Ok(FrameOutcome::Analyzed(Box::new(analysis)))
    }

    /// Summary over every analyzed frame
    ///
    /// # Errors
    ///
    /// Returns an empty-session error when no frame has been analyzed.
    pub fn summary(&self) -> AppResult<SessionSummary> {
        let summary = self.accumulator.finish(
            &self.tracker.timeline(),
            self.frames_without_pose,
            &self.safety_flags,
            &self.pipeline.config().aggregation,
        )?;
        info!(
            exercise = self.exercise.as_str(),
            frames = summary.frames_analyzed,
            reps = summary.repetition_count,
            overall = summary.mean_scores.overall,
            assessment = summary.assessment.as_str(),
            "Session summarized"
        );
        Ok(summary)
    }

    fn check_timestamp(&self, timestamp: f64) -> AppResult<()> {
        if !timestamp.is_finite() {
            return Err(AppError::invalid_input("Frame timestamp must be finite"));
        }
        match self.last_timestamp {
            Some(previous) if timestamp < previous => {
                Err(AppError::out_of_order(previous, timestamp))
            }
            _ => Ok(()),
        }
    }

    fn push_raw(&mut self, frame: PoseFrame) {
        if self.raw_history.len() == self.pipeline.config().aggregation.history_capacity {
            self.raw_history.pop_front();
        }
        self.raw_history.push_back(frame);
    }

    fn push_result(&mut self, analysis: FrameAnalysis) {
        if self.results.len() == self.pipeline.config().aggregation.history_capacity {
            self.results.pop_front();
        }
        self.results.push_back(analysis);
    }
}
