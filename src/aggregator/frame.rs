// ABOUTME: Per-frame input and output records of the unified aggregator
// ABOUTME: Separates analyzed frames from upstream no-pose frames explicitly
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use form_coach_core::models::{FeedbackItem, LandmarkFrame, MovementPhase, UnifiedScoreSet};
use form_coach_intelligence::{
    BiomechanicsResult, ComplexSystemsResult, OptimalFormReport, PhysicsResult, SafetyFlag,
};
use serde::{Deserialize, Serialize};

/// What the pose detector returned for one image
#[derive(Debug, Clone, PartialEq)]
pub enum PoseDetection {
    /// Landmarks of the detected body
    Detected(LandmarkFrame),
    /// No body found in the image
    NoPoseDetected,
}

impl From<Option<LandmarkFrame>> for PoseDetection {
    fn from(frame: Option<LandmarkFrame>) -> Self {
        frame.map_or(Self::NoPoseDetected, Self::Detected)
    }
}

/// Result of submitting one frame to a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FrameOutcome {
    /// The frame was scored
    Analyzed(Box<FrameAnalysis>),
    /// The frame had no pose and was skipped, not scored
    NoPoseDetected {
        /// Timestamp of the skipped frame (s)
        timestamp: f64,
    },
}

impl FrameOutcome {
    /// Analysis of a scored frame
    #[must_use]
    pub fn analysis(&self) -> Option<&FrameAnalysis> {
        match self {
            Self::Analyzed(analysis) => Some(analysis),
            Self::NoPoseDetected { .. } => None,
        }
    }

    /// Consume into the analysis of a scored frame
    #[must_use]
    pub fn into_analysis(self) -> Option<FrameAnalysis> {
        match self {
            Self::Analyzed(analysis) => Some(*analysis),
            Self::NoPoseDetected { .. } => None,
        }
    }
}

/// Full unified analysis of one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameAnalysis {
    /// Index among analyzed frames of the session
    pub frame_index: usize,
    /// Frame timestamp (s)
    pub timestamp: f64,
    /// Movement phase of the frame
    pub phase: MovementPhase,
    /// Joint angles, moment arms, centre of mass and forces
    pub physics: PhysicsResult,
    /// Muscle activation, movement quality and coordination
    pub biomechanics: BiomechanicsResult,
    /// Phase-space analysis of the rolling window
    pub complex_systems: ComplexSystemsResult,
    /// Optimal form for the frame's joint angles
    pub optimization: OptimalFormReport,
    /// Unified scores
    pub scores: UnifiedScoreSet,
    /// Ranked feedback
    pub feedback: Vec<FeedbackItem>,
    /// Goal safety findings of the session's profile
    pub safety_flags: Vec<SafetyFlag>,
    /// Set when a score component fell back to its neutral value for lack of data
    pub low_confidence: bool,
}
