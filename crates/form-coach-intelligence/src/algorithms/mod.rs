// ABOUTME: Signal-processing algorithm selection for the form analysis pipeline
// ABOUTME: Contains the temporal smoothing filters used by the landmark preprocessor
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Temporal smoothing algorithms (Savitzky-Golay, moving average)
pub mod smoothing;

pub use smoothing::{SmoothingAlgorithm, SmoothingFilter};
