// ABOUTME: Session-level aggregation of per-frame analyses into mean scores and recurring issues
// ABOUTME: Accumulates incrementally so a summary covers every frame, not just the rolling window
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::{BTreeSet, HashMap};

use form_coach_core::errors::{AppError, AppResult};
use form_coach_core::models::{
    FeedbackItem, FeedbackPriority, MovementPhase, PhaseTimeline, UnifiedScoreSet,
};
use form_coach_intelligence::config::AggregationConfig;
use form_coach_intelligence::SafetyFlag;
use serde::{Deserialize, Serialize};

use super::feedback::merge_feedback;
use super::frame::FrameAnalysis;

// ============================================================================
// Summary Types
// ============================================================================

/// Overall verdict keyed by the mean overall score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormAssessment {
    /// Mean overall at or above the excellent threshold
    Excellent,
    /// Mean overall at or above the good threshold
    Good,
    /// Mean overall at or above the needs-improvement threshold
    NeedsImprovement,
    /// Anything lower
    MajorIssues,
}

impl FormAssessment {
    /// Classify a mean overall score
    #[must_use]
    pub fn from_score(score: f64, config: &AggregationConfig) -> Self {
        if score >= config.excellent_threshold {
            Self::Excellent
        } else if score >= config.good_threshold {
            Self::Good
        } else if score >= config.needs_improvement_threshold {
            Self::NeedsImprovement
        } else {
            Self::MajorIssues
        }
    }

    /// String representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::NeedsImprovement => "needs_improvement",
            Self::MajorIssues => "major_issues",
        }
    }

    /// Human-readable assessment
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent form: keep training with this technique",
            Self::Good => "Good form with a few points to refine",
            Self::NeedsImprovement => {
                "Form needs improvement: work through the listed corrections with lighter load"
            }
            Self::MajorIssues => {
                "Major form issues: reduce the load and address the high-priority feedback first"
            }
        }
    }
}

/// A feedback message and how many frames raised it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringIssue {
    /// Feedback message
    pub message: String,
    /// Frames that raised it
    pub count: usize,
    /// Most urgent priority it was raised with
    pub priority: FeedbackPriority,
}

/// Score of one notable frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameHighlight {
    /// Index among analyzed frames
    pub frame_index: usize,
    /// Timestamp (s)
    pub timestamp: f64,
    /// Overall unified score
    pub overall: f64,
}

/// Aggregated result of a whole session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Frames that were scored
    pub frames_analyzed: usize,
    /// Frames skipped because no pose was detected
    pub frames_without_pose: usize,
    /// Scored frames with at least one neutral fallback score
    pub low_confidence_frames: usize,
    /// Mean of each unified score component
    pub mean_scores: UnifiedScoreSet,
    /// Distinct phases seen
    pub phases_observed: BTreeSet<MovementPhase>,
    /// Completed repetitions
    pub repetition_count: usize,
    /// Highest-scoring frame
    pub best_frame: FrameHighlight,
    /// Lowest-scoring frame
    pub worst_frame: FrameHighlight,
    /// Most frequent feedback messages
    pub top_issues: Vec<RecurringIssue>,
    /// Deduplicated feedback across the session, high priority first
    pub feedback: Vec<FeedbackItem>,
    /// Verdict keyed by the mean overall score
    pub assessment: FormAssessment,
    /// Human-readable verdict
    pub assessment_message: String,
    /// Goal safety findings of the session's profile
    pub safety_flags: Vec<SafetyFlag>,
}

// ============================================================================
// Accumulator
// ============================================================================

#[derive(Debug, Clone)]
struct IssueTally {
    count: usize,
    priority: FeedbackPriority,
    first_seen: usize,
}

/// Running totals over every analyzed frame of a session
#[derive(Debug, Clone, Default)]
pub struct SessionAccumulator {
    frames: usize,
    low_confidence: usize,
    sums: [f64; 5],
    best: Option<FrameHighlight>,
    worst: Option<FrameHighlight>,
    issues: HashMap<String, IssueTally>,
    feedback: Vec<FeedbackItem>,
}

impl SessionAccumulator {
    /// Empty accumulator
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames recorded so far
    #[must_use]
    pub const fn frames(&self) -> usize {
        self.frames
    }

    /// Fold one frame into the totals
    pub fn record(&mut self, analysis: &FrameAnalysis) {
        let scores = &analysis.scores;
        for (sum, value) in self.sums.iter_mut().zip([
            scores.physics_efficiency,
            scores.biological_optimality,
            scores.system_stability,
            scores.mathematical_optimization,
            scores.overall,
        ]) {
            *sum += value;
        }
        self.frames += 1;
        if analysis.low_confidence {
            self.low_confidence += 1;
        }

        let highlight = FrameHighlight {
            frame_index: analysis.frame_index,
            timestamp: analysis.timestamp,
            overall: scores.overall,
        };
        if !matches!(self.best, Some(best) if best.overall >= highlight.overall) {
            self.best = Some(highlight);
        }
        if !matches!(self.worst, Some(worst) if worst.overall <= highlight.overall) {
            self.worst = Some(highlight);
        }

        for item in &analysis.feedback {
            let order = self.issues.len();
            let tally = self
                .issues
                .entry(item.message.clone())
                .or_insert_with(|| IssueTally {
                    count: 0,
                    priority: item.priority,
                    first_seen: order,
                });
            tally.count += 1;
            tally.priority = tally.priority.min(item.priority);
            if tally.count == 1 {
                self.feedback.push(item.clone());
            }
        }
    }

    /// Build the summary
    ///
    /// # Errors
    ///
    /// Returns an empty-session error when no frame was analyzed.
    pub fn finish(
        &self,
        timeline: &PhaseTimeline,
        frames_without_pose: usize,
        safety_flags: &[SafetyFlag],
        config: &AggregationConfig,
    ) -> AppResult<SessionSummary> {
        let (Some(best_frame), Some(worst_frame)) = (self.best, self.worst) else {
            return Err(AppError::empty_session());
        };
        let n = self.frames as f64;
        let [physics, biological, stability, mathematical, overall] = self.sums.map(|s| s / n);
        let mean_scores = UnifiedScoreSet {
            physics_efficiency: physics,
            biological_optimality: biological,
            system_stability: stability,
            mathematical_optimization: mathematical,
            overall,
        };
        let assessment = FormAssessment::from_score(overall, config);

        Ok(SessionSummary {
            frames_analyzed: self.frames,
            frames_without_pose,
            low_confidence_frames: self.low_confidence,
            mean_scores,
            phases_observed: timeline.phases_observed(),
            repetition_count: timeline.repetition_count(),
            best_frame,
            worst_frame,
            top_issues: self.top_issues(config.top_issue_count),
            feedback: merge_feedback(self.feedback.iter().cloned(), config.feedback_cap),
            assessment,
            assessment_message: assessment.description().to_owned(),
            safety_flags: safety_flags.to_vec(),
        })
    }

    /// Most frequent messages; ties go to the more urgent, then the earlier one
    fn top_issues(&self, count: usize) -> Vec<RecurringIssue> {
        let mut tallies: Vec<(&String, &IssueTally)> = self.issues.iter().collect();
        tallies.sort_by(|(_, a), (_, b)| {
            b.count
                .cmp(&a.count)
                .then(a.priority.cmp(&b.priority))
                .then(a.first_seen.cmp(&b.first_seen))
        });
        tallies
            .into_iter()
            .take(count)
            .map(|(message, tally)| RecurringIssue {
                message: message.clone(),
                count: tally.count,
                priority: tally.priority,
            })
            .collect()
    }
}

/// Summarize a finished list of frame analyses
///
/// # Errors
///
/// Returns an empty-session error when `frames` is empty.
pub fn summarize(
    frames: &[FrameAnalysis],
    timeline: &PhaseTimeline,
    frames_without_pose: usize,
    safety_flags: &[SafetyFlag],
    config: &AggregationConfig,
) -> AppResult<SessionSummary> {
    let mut accumulator = SessionAccumulator::new();
    for frame in frames {
        accumulator.record(frame);
    }
    accumulator.finish(timeline, frames_without_pose, safety_flags, config)
}
