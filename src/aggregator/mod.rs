// ABOUTME: Unified aggregator orchestrating the analysis stages per frame and per session
// ABOUTME: Combines stage outputs into unified scores, ranked feedback and session summaries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Unified Aggregator
//!
//! Per frame: preprocess the rolling window, then physics, phase, biomechanics,
//! complex systems and optimization on its last frame, then unified scores
//! and feedback.
//!
//! Unified score components:
//!
//! | Component | Source |
//! |-----------|--------|
//! | physics efficiency | mean of energy efficiency and posture score |
//! | biological optimality | activation, movement quality and coordination |
//! | system stability | complex-systems stability |
//! | mathematical optimization | objective score of the current angles |
//!
//! A component without enough data reads as 0.5 and marks the frame
//! `low_confidence`.

mod feedback;
mod frame;
mod pipeline;
mod session;
mod summary;

pub use feedback::{merge_feedback, FeedbackGenerator, FeedbackInputs};
pub use frame::{FrameAnalysis, FrameOutcome, PoseDetection};
pub use pipeline::AnalysisPipeline;
pub use session::FormAnalysisSession;
pub use summary::{
    summarize, FormAssessment, FrameHighlight, RecurringIssue, SessionAccumulator, SessionSummary,
};

pub(crate) use pipeline::{checked_landmarks, FrameContext, PracticeTracker};
