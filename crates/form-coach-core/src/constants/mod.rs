// ABOUTME: Physical and pipeline-wide constants shared by all analysis stages
// ABOUTME: Pure data constants; tunable heuristics live in the intelligence crate
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Constants module
//!
//! Values here are either physical constants or fixed properties of the
//! landmark topology. Tunable heuristics (activation peaks, segment ratios,
//! objective weights) belong to `form_coach_intelligence::biomechanical_constants`.

/// Physical constants
pub mod physics {
    /// Standard gravitational acceleration (m/s^2)
    pub const GRAVITY_M_S2: f64 = 9.81;

    /// Centimetres per metre
    pub const CM_PER_M: f64 = 100.0;
}

/// Landmark topology constants
pub mod topology {
    /// Number of points produced by the upstream pose detector
    pub const POSE_LANDMARK_COUNT: usize = 33;

    /// Number of derived midpoints appended after the detector points
    pub const DERIVED_LANDMARK_COUNT: usize = 3;

    /// Total number of landmark slots in a frame
    pub const TOTAL_LANDMARK_COUNT: usize = POSE_LANDMARK_COUNT + DERIVED_LANDMARK_COUNT;

    /// Capture rate assumed for single-frame analysis (Hz)
    pub const DEFAULT_FRAME_RATE: f64 = 30.0;
}

/// Numeric guards and neutral values
pub mod numeric {
    /// Guard against division by zero-length vectors
    pub const EPSILON: f64 = 1e-9;

    /// Score reported when a metric lacks the data to be measured
    pub const NEUTRAL_SCORE: f64 = 0.5;

    /// Smallest accepted reference distance when normalizing a frame
    pub const MIN_REFERENCE_DISTANCE: f64 = 1e-6;
}
