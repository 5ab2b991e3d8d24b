// ABOUTME: Movement phase states and the gap-free phase timeline of a sequence
// ABOUTME: Includes repetition counting over the descent-bottom-ascent-top pattern
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::iter;

/// Stereotyped sub-state of a repeated exercise motion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementPhase {
    /// Before the first movement
    Setup,
    /// Moving down (eccentric for squats)
    Descent,
    /// Turnaround at the lowest point
    Bottom,
    /// Moving up
    Ascent,
    /// Lockout at the top of a rep
    Top,
}

impl MovementPhase {
    /// The sequence of phases that makes one complete repetition
    pub const REPETITION: [Self; 4] = [Self::Descent, Self::Bottom, Self::Ascent, Self::Top];

    /// Stable snake case name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::Descent => "descent",
            Self::Bottom => "bottom",
            Self::Ascent => "ascent",
            Self::Top => "top",
        }
    }

    /// Whether the tracked joint is nominally still in this phase
    #[must_use]
    pub const fn is_stationary(self) -> bool {
        matches!(self, Self::Setup | Self::Bottom | Self::Top)
    }
}

impl fmt::Display for MovementPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One phase interval, `start_frame..=end_frame`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseInterval {
    /// Phase of every frame in the interval
    pub phase: MovementPhase,
    /// First frame index (inclusive)
    pub start_frame: usize,
    /// Last frame index (inclusive)
    pub end_frame: usize,
    /// Duration from the first frame to the frame after the last one
    pub duration_seconds: f64,
    /// Confidence in [0.3, 1] derived from velocity spread
    pub confidence: f64,
}

impl PhaseInterval {
    /// Number of frames in the interval
    #[must_use]
    pub const fn frame_count(&self) -> usize {
        self.end_frame - self.start_frame + 1
    }

    /// Whether a frame index falls inside the interval
    #[must_use]
    pub const fn contains(&self, frame: usize) -> bool {
        frame >= self.start_frame && frame <= self.end_frame
    }
}

/// Ordered, contiguous phase intervals covering a whole sequence
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PhaseTimeline {
    intervals: Vec<PhaseInterval>,
}

impl PhaseTimeline {
    /// Wrap intervals produced by the phase detector
    #[must_use]
    pub const fn new(intervals: Vec<PhaseInterval>) -> Self {
        Self { intervals }
    }

    /// Intervals in order
    #[must_use]
    pub fn intervals(&self) -> &[PhaseInterval] {
        &self.intervals
    }

    /// Whether the timeline has no intervals
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Number of intervals
    #[must_use]
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    /// Phase of a given frame
    #[must_use]
    pub fn phase_at(&self, frame: usize) -> Option<MovementPhase> {
        self.intervals
            .iter()
            .find(|interval| interval.contains(frame))
            .map(|interval| interval.phase)
    }

    /// Phase of the last interval
    #[must_use]
    pub fn current_phase(&self) -> Option<MovementPhase> {
        self.intervals.last().map(|interval| interval.phase)
    }

    /// Per-frame phase labels, one per covered frame
    #[must_use]
    pub fn frame_phases(&self) -> Vec<MovementPhase> {
        self.intervals
            .iter()
            .flat_map(|interval| iter::repeat(interval.phase).take(interval.frame_count()))
            .collect()
    }

    /// Whether the intervals exactly tile frames `0..frame_count`
    #[must_use]
    pub fn covers(&self, frame_count: usize) -> bool {
        if frame_count == 0 {
            return self.intervals.is_empty();
        }
        let mut expected_start = 0;
        for interval in &self.intervals {
            if interval.start_frame != expected_start || interval.end_frame < interval.start_frame {
                return false;
            }
            expected_start = interval.end_frame + 1;
        }
        expected_start == frame_count
    }

    /// Count complete `[descent, bottom, ascent, top]` runs
    #[must_use]
    pub fn repetition_count(&self) -> usize {
        self.intervals
            .windows(MovementPhase::REPETITION.len())
            .filter(|window| {
                window
                    .iter()
                    .map(|interval| interval.phase)
                    .eq(MovementPhase::REPETITION)
            })
            .count()
    }

    /// Distinct phases seen
    #[must_use]
    pub fn phases_observed(&self) -> BTreeSet<MovementPhase> {
        self.intervals.iter().map(|interval| interval.phase).collect()
    }

    /// Durations of every interval of one phase
    #[must_use]
    pub fn durations_of(&self, phase: MovementPhase) -> Vec<f64> {
        self.intervals
            .iter()
            .filter(|interval| interval.phase == phase)
            .map(|interval| interval.duration_seconds)
            .collect()
    }

    /// Number of phase changes
    #[must_use]
    pub fn transition_count(&self) -> usize {
        self.intervals.len().saturating_sub(1)
    }

    /// Timeline as it stood when `last_frame` arrived
    ///
    /// The interval containing `last_frame` is cut there and its duration
    /// scaled by the share of frames kept.
    #[must_use]
    pub fn up_to(&self, last_frame: usize) -> Self {
        let intervals = self
            .intervals
            .iter()
            .take_while(|interval| interval.start_frame <= last_frame)
            .map(|interval| {
                if interval.end_frame <= last_frame {
                    return interval.clone();
                }
                let kept = (last_frame - interval.start_frame + 1) as f64;
                PhaseInterval {
                    end_frame: last_frame,
                    duration_seconds: interval.duration_seconds * kept
                        / interval.frame_count() as f64,
                    ..interval.clone()
                }
            })
            .collect();
        Self { intervals }
    }
}
