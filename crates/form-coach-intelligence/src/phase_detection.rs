// ABOUTME: Movement phase detection with a velocity-driven finite-state machine
// ABOUTME: Provides batch detection over a sequence and a streaming tracker for live sessions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Phase Detection
//!
//! The detector follows one vertical signal per exercise (see
//! [`TrackedSignal`]); positive velocity means "down" because image `y`
//! grows downward.
//!
//! ```text
//! setup --down--> descent --still & deep--> bottom --up--> ascent --still & returned--> top
//!   \--up--> ascent                                                       top --down--> descent
//! ```
//!
//! A transition is suppressed while the current phase is younger than the
//! minimum phase duration. The resulting [`PhaseTimeline`] covers every frame
//! exactly once; the last interval is left open at the final frame.

use form_coach_core::models::{
    ExerciseType, LandmarkFrame, LandmarkName, MovementPhase, PhaseInterval, PhaseTimeline,
    PoseSequence, TrackedSignal,
};
use std::collections::VecDeque;
use tracing::debug;

use crate::config::PhaseDetectionConfig;
use crate::statistics::{self, centered_moving_average, central_difference};

/// Vertical position of the tracked signal for an exercise
///
/// Hip minus ankle midpoint for lower-body lifts, wrist midpoint minus
/// shoulder midpoint for presses. Relative signals survive hip-centred
/// normalization.
#[must_use]
pub fn tracked_position(frame: &LandmarkFrame, exercise: ExerciseType) -> Option<f64> {
    let mid_y = |left: LandmarkName, right: LandmarkName| -> Option<f64> {
        match (frame.position(left), frame.position(right)) {
            (Some(l), Some(r)) => Some((l.y + r.y) / 2.0),
            (l, r) => l.or(r).map(|p| p.y),
        }
    };
    match exercise.tracked_signal() {
        TrackedSignal::HipOverAnkles => {
            let hip = mid_y(LandmarkName::LeftHip, LandmarkName::RightHip)?;
            let ankle = mid_y(LandmarkName::LeftAnkle, LandmarkName::RightAnkle)?;
            Some(hip - ankle)
        }
        TrackedSignal::WristsOverShoulders => {
            let wrist = mid_y(LandmarkName::LeftWrist, LandmarkName::RightWrist)?;
            let shoulder = mid_y(LandmarkName::LeftShoulder, LandmarkName::RightShoulder)?;
            Some(wrist - shoulder)
        }
    }
}

/// Incremental phase state machine fed with position and smoothed velocity
#[derive(Debug, Clone)]
pub struct PhaseStateMachine {
    config: PhaseDetectionConfig,
    frame_rate: f64,
    state: MovementPhase,
    phase_start_frame: usize,
    phase_start_time: f64,
    phase_start_position: f64,
    rep_start_position: Option<f64>,
    ascent_from_setup: bool,
    phase_velocities: Vec<f64>,
    closed: Vec<PhaseInterval>,
    last_frame: Option<(usize, f64)>,
}

impl PhaseStateMachine {
    /// Create a machine in the `setup` state
    #[must_use]
    pub fn new(config: PhaseDetectionConfig, frame_rate: f64) -> Self {
        Self {
            config,
            frame_rate: frame_rate.max(f64::EPSILON),
            state: MovementPhase::Setup,
            phase_start_frame: 0,
            phase_start_time: 0.0,
            phase_start_position: 0.0,
            rep_start_position: None,
            ascent_from_setup: false,
            phase_velocities: Vec::new(),
            closed: Vec::new(),
            last_frame: None,
        }
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> MovementPhase {
        self.state
    }

    /// Number of frames consumed
    #[must_use]
    pub fn frames_seen(&self) -> usize {
        self.last_frame.map_or(0, |(index, _)| index + 1)
    }

    /// Position where the current repetition started, once a sample has been seen
    #[must_use]
    pub const fn rep_start_position(&self) -> Option<f64> {
        self.rep_start_position
    }

    /// Consume one frame and return its phase
    ///
    /// The first measured frame anchors the start positions and never transitions.
    pub fn step(&mut self, timestamp: f64, position: f64, velocity: f64) -> MovementPhase {
        let frame = self.frames_seen();
        if frame == 0 {
            self.phase_start_time = timestamp;
        }
        if self.rep_start_position.is_none() {
            self.phase_start_position = position;
            self.rep_start_position = Some(position);
        } else if let Some(next) = self.transition(timestamp, position, velocity) {
            self.close_current(frame - 1, timestamp);
            self.enter(next, frame, timestamp, position);
        }
        self.phase_velocities.push(velocity);
        self.last_frame = Some((frame, timestamp));
        self.state
    }

    /// Consume one frame that carries no tracked signal, keeping the current phase
    pub fn hold(&mut self, timestamp: f64) -> MovementPhase {
        let frame = self.frames_seen();
        if frame == 0 {
            self.phase_start_time = timestamp;
        }
        self.phase_velocities.push(0.0);
        self.last_frame = Some((frame, timestamp));
        self.state
    }

    fn transition(&self, timestamp: f64, position: f64, velocity: f64) -> Option<MovementPhase> {
        let cfg = &self.config;
        if timestamp - self.phase_start_time < cfg.min_phase_duration {
            return None;
        }
        let still = velocity.abs() < cfg.near_zero_threshold;
        match self.state {
            MovementPhase::Setup => {
                if velocity > cfg.velocity_threshold {
                    Some(MovementPhase::Descent)
                } else if velocity < -cfg.velocity_threshold {
                    Some(MovementPhase::Ascent)
                } else {
                    None
                }
            }
            MovementPhase::Descent => (still
                && position - self.phase_start_position >= cfg.min_descent_distance)
                .then_some(MovementPhase::Bottom),
            MovementPhase::Bottom => {
                (velocity < -cfg.near_zero_threshold).then_some(MovementPhase::Ascent)
            }
            MovementPhase::Ascent => {
                let returned = if self.ascent_from_setup {
                    self.phase_start_position - position >= cfg.min_descent_distance
                } else {
                    self.rep_start_position.is_some_and(|start| {
                        (position - start).abs()
                            <= cfg.return_tolerance_fraction * cfg.min_descent_distance
                    })
                };
                (still && returned).then_some(MovementPhase::Top)
            }
            MovementPhase::Top => {
                (velocity > cfg.velocity_threshold).then_some(MovementPhase::Descent)
            }
        }
    }

    fn enter(&mut self, next: MovementPhase, frame: usize, timestamp: f64, position: f64) {
        match (self.state, next) {
            (MovementPhase::Setup, MovementPhase::Ascent) => self.ascent_from_setup = true,
            (MovementPhase::Bottom, MovementPhase::Ascent) => self.ascent_from_setup = false,
            (_, MovementPhase::Descent) => self.rep_start_position = Some(position),
            _ => {}
        }
        debug!(from = %self.state, to = %next, frame, "Phase transition");
        self.state = next;
        self.phase_start_frame = frame;
        self.phase_start_time = timestamp;
        self.phase_start_position = position;
        self.phase_velocities.clear();
    }

    fn close_current(&mut self, end_frame: usize, end_exclusive_time: f64) {
        let interval = self.interval(end_frame, end_exclusive_time);
        self.closed.push(interval);
    }

    fn interval(&self, end_frame: usize, end_exclusive_time: f64) -> PhaseInterval {
        let spread = statistics::std_dev(&self.phase_velocities);
        let confidence = (1.0 - (spread / self.config.confidence_velocity_cap).min(1.0))
            .max(self.config.confidence_floor);
        PhaseInterval {
            phase: self.state,
            start_frame: self.phase_start_frame,
            end_frame,
            duration_seconds: (end_exclusive_time - self.phase_start_time).max(0.0),
            confidence,
        }
    }

    /// Timeline so far with the current phase as an open final interval
    #[must_use]
    pub fn timeline(&self) -> PhaseTimeline {
        let mut intervals = self.closed.clone();
        if let Some((last_frame, last_time)) = self.last_frame {
            intervals.push(self.interval(last_frame, last_time + 1.0 / self.frame_rate));
        }
        PhaseTimeline::new(intervals)
    }

    /// Completed `[descent, bottom, ascent, top]` runs so far
    #[must_use]
    pub fn repetition_count(&self) -> usize {
        self.timeline().repetition_count()
    }
}

/// Batch phase detector
#[derive(Debug, Clone, Default)]
pub struct PhaseDetector {
    config: PhaseDetectionConfig,
}

impl PhaseDetector {
    /// Create a detector with the given settings
    #[must_use]
    pub const fn new(config: PhaseDetectionConfig) -> Self {
        Self { config }
    }

    /// Classify every frame of a sequence
    ///
    /// Frames where the tracked signal is missing reuse the nearest measured
    /// value; a sequence with no measurable frame stays in `setup`.
    #[must_use]
    pub fn detect(&self, sequence: &PoseSequence, exercise: ExerciseType) -> PhaseTimeline {
        let raw: Vec<Option<f64>> = sequence
            .frames()
            .iter()
            .map(|frame| tracked_position(&frame.landmarks, exercise))
            .collect();
        let positions = fill_missing(&raw);
        self.detect_signal(&positions, &sequence.timestamps(), sequence.frame_rate())
    }

    /// Classify a raw vertical signal sampled at `timestamps`
    #[must_use]
    pub fn detect_signal(
        &self,
        positions: &[f64],
        timestamps: &[f64],
        frame_rate: f64,
    ) -> PhaseTimeline {
        let n = positions.len().min(timestamps.len());
        let velocities = centered_moving_average(
            &central_difference(&positions[..n], &timestamps[..n]),
            self.config.velocity_smoothing_window,
        );
        let mut machine = PhaseStateMachine::new(self.config.clone(), frame_rate);
        for i in 0..n {
            machine.step(timestamps[i], positions[i], velocities[i]);
        }
        let timeline = machine.timeline();
        debug!(
            frames = n,
            intervals = timeline.len(),
            reps = timeline.repetition_count(),
            "Phase timeline detected"
        );
        timeline
    }
}

/// Streaming tracker for live sessions
///
/// Velocity is a trailing central difference (one frame of lag) averaged over
/// the configured window, so each frame's phase is known on arrival.
#[derive(Debug, Clone)]
pub struct StreamingPhaseTracker {
    machine: PhaseStateMachine,
    window: usize,
    samples: VecDeque<(f64, f64)>,
    velocities: VecDeque<f64>,
    last_position: Option<f64>,
}

impl StreamingPhaseTracker {
    /// Create a tracker
    #[must_use]
    pub fn new(config: PhaseDetectionConfig, frame_rate: f64) -> Self {
        let window = config.velocity_smoothing_window.max(1);
        Self {
            machine: PhaseStateMachine::new(config, frame_rate),
            window,
            samples: VecDeque::with_capacity(3),
            velocities: VecDeque::with_capacity(window),
            last_position: None,
        }
    }

    /// Consume one frame's tracked position, reusing the last value when it is missing
    ///
    /// Frames before the first measured position hold the current phase.
    pub fn push(&mut self, timestamp: f64, position: Option<f64>) -> MovementPhase {
        let Some(position) = position.or(self.last_position) else {
            return self.machine.hold(timestamp);
        };
        self.last_position = Some(position);
        self.samples.push_back((timestamp, position));
        if self.samples.len() > 3 {
            self.samples.pop_front();
        }
        let raw_velocity = match (self.samples.front(), self.samples.back()) {
            (Some((t0, x0)), Some((t1, x1))) if t1 - t0 > f64::EPSILON => (x1 - x0) / (t1 - t0),
            _ => 0.0,
        };
        self.velocities.push_back(raw_velocity);
        if self.velocities.len() > self.window {
            self.velocities.pop_front();
        }
        let velocity = self.velocities.iter().sum::<f64>() / self.velocities.len() as f64;
        self.machine.step(timestamp, position, velocity)
    }

    /// Timeline since the session started
    #[must_use]
    pub fn timeline(&self) -> PhaseTimeline {
        self.machine.timeline()
    }

    /// Current phase
    #[must_use]
    pub const fn current_phase(&self) -> MovementPhase {
        self.machine.state()
    }

    /// Position where the current repetition started, once a sample has been seen
    #[must_use]
    pub const fn rep_start_position(&self) -> Option<f64> {
        self.machine.rep_start_position()
    }
}

/// Replace gaps by the nearest earlier value, or the first later one at the start
fn fill_missing(values: &[Option<f64>]) -> Vec<f64> {
    let first = values.iter().flatten().copied().next().unwrap_or(0.0);
    let mut last = first;
    values
        .iter()
        .map(|value| {
            if let Some(v) = value {
                last = *v;
            }
            last
        })
        .collect()
}
