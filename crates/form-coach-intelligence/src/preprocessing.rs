// ABOUTME: Landmark preprocessor that gap-fills, weights, smooths, and normalizes pose sequences
// ABOUTME: Produces a body-centred, scale-invariant sequence with the same frame count and order
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Landmark Preprocessing
//!
//! Stages, in order:
//!
//! 1. **Gap fill**: per landmark, frames below the visibility threshold (or
//!    absent) are replaced by linear interpolation in time between the nearest
//!    valid frames, with flat extrapolation at the ends.
//! 2. **Visibility weighting** (optional): coordinates are scaled by their
//!    pre-fill visibility. This is a denoising heuristic, not a probabilistic
//!    operation; it shrinks low-confidence detections toward the origin.
//! 3. **Smoothing**: the configured [`SmoothingAlgorithm`] per axis per landmark.
//! 4. **Normalization**: mid-hip becomes the origin and the reference width
//!    is scaled to 1.
//!
//! [`SmoothingAlgorithm`]: crate::algorithms::SmoothingAlgorithm

use form_coach_core::constants::numeric::{EPSILON, MIN_REFERENCE_DISTANCE};
use form_coach_core::errors::AppResult;
use form_coach_core::models::{Landmark, LandmarkFrame, LandmarkName, Point3, PoseSequence};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::algorithms::SmoothingFilter;
use crate::config::{PreprocessingConfig, ReferenceDistance};

/// Preprocessed sequence plus what the preprocessor had to repair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreprocessOutput {
    /// Cleaned sequence
    pub sequence: PoseSequence,
    /// Landmark slots replaced by interpolation or constant fill
    pub filled_points: usize,
    /// Landmarks with exactly one valid frame, filled with that frame's value
    pub constant_filled: Vec<LandmarkName>,
    /// Landmarks with no valid frame, left untouched
    pub unrecoverable: Vec<LandmarkName>,
    /// Frames that could not be normalized (missing hips or zero width)
    pub unnormalized_frames: usize,
}

/// Cleans raw pose sequences before analysis
#[derive(Debug, Clone)]
pub struct LandmarkPreprocessor {
    config: PreprocessingConfig,
    smoothing: SmoothingFilter,
}

impl Default for LandmarkPreprocessor {
    fn default() -> Self {
        Self::new(PreprocessingConfig::default())
    }
}

impl LandmarkPreprocessor {
    /// Create a preprocessor with the given settings
    #[must_use]
    pub fn new(config: PreprocessingConfig) -> Self {
        Self {
            smoothing: SmoothingFilter::new(config.smoothing),
            config,
        }
    }

    /// Settings in use
    #[must_use]
    pub const fn config(&self) -> &PreprocessingConfig {
        &self.config
    }

    /// Gap-fill, weight, smooth and normalize a sequence
    ///
    /// # Errors
    ///
    /// Returns an error only if the rebuilt sequence loses frames, which
    /// indicates an internal fault.
    pub fn preprocess(&self, raw: &PoseSequence) -> AppResult<PoseSequence> {
        Ok(self.preprocess_with_report(raw)?.sequence)
    }

    /// Preprocess and report the repairs made
    ///
    /// # Errors
    ///
    /// Returns an error only if the rebuilt sequence loses frames.
    pub fn preprocess_with_report(&self, raw: &PoseSequence) -> AppResult<PreprocessOutput> {
        let timestamps = raw.timestamps();
        let mut frames: Vec<LandmarkFrame> =
            raw.frames().iter().map(|f| f.landmarks.clone()).collect();
        let original = frames.clone();

        let fill = self.gap_fill(&mut frames, &timestamps);

        if self.config.visibility_weighting {
            Self::apply_visibility_weighting(&mut frames, &original);
        }

        self.smooth(&mut frames);

        let mut unnormalized_frames = 0;
        let frames: Vec<LandmarkFrame> = frames
            .into_iter()
            .map(LandmarkFrame::with_derived_midpoints)
            .map(|frame| {
                if !self.config.normalize {
                    return frame;
                }
                self.normalize_frame(&frame).unwrap_or_else(|| {
                    unnormalized_frames += 1;
                    frame
                })
            })
            .collect();

        if unnormalized_frames > 0 {
            warn!(
                unnormalized_frames,
                "Frames left unnormalized: mid-hip missing or reference width degenerate"
            );
        }
        debug!(
            frames = raw.len(),
            filled = fill.filled_points,
            smoothing = self.config.smoothing.name(),
            "Preprocessed pose sequence"
        );

        Ok(PreprocessOutput {
            sequence: raw.with_landmarks(frames)?,
            filled_points: fill.filled_points,
            constant_filled: fill.constant_filled,
            unrecoverable: fill.unrecoverable,
            unnormalized_frames,
        })
    }

    /// Replace low-visibility, non-finite or absent detector landmarks in place
    fn gap_fill(&self, frames: &mut [LandmarkFrame], timestamps: &[f64]) -> FillReport {
        let threshold = self.config.visibility_threshold;
        let mut report = FillReport::default();

        for name in LandmarkName::ALL.into_iter().filter(|n| !n.is_derived()) {
            let valid: Vec<usize> = frames
                .iter()
                .enumerate()
                .filter(|(_, frame)| {
                    frame.get(name).is_some_and(|landmark| {
                        landmark.visibility >= threshold && landmark.position().is_finite()
                    })
                })
                .map(|(i, _)| i)
                .collect();

            if valid.len() == frames.len() {
                continue;
            }

            match valid.as_slice() {
                [] => {
                    if frames.iter().any(|frame| frame.contains(name)) {
                        warn!(
                            landmark = %name,
                            "No frame above visibility threshold; leaving raw values"
                        );
                        for frame in frames.iter_mut() {
                            if frame.get(name).is_some_and(|l| !l.position().is_finite()) {
                                frame.clear(name);
                            }
                        }
                        report.unrecoverable.push(name);
                    }
                }
                [only] => {
                    let Some(source) = frames[*only].get(name).copied() else {
                        continue;
                    };
                    warn!(landmark = %name, "Single valid frame; constant fill");
                    for (i, frame) in frames.iter_mut().enumerate() {
                        if i != *only {
                            frame.set(name, source);
                            report.filled_points += 1;
                        }
                    }
                    report.constant_filled.push(name);
                }
                _ => {
                    report.filled_points += interpolate_landmark(frames, timestamps, name, &valid);
                }
            }
        }
        report
    }

    /// Scale coordinates by their pre-fill visibility
    ///
    /// Slots that were absent before filling carry no detector visibility and
    /// are left unscaled.
    fn apply_visibility_weighting(frames: &mut [LandmarkFrame], original: &[LandmarkFrame]) {
        for (frame, raw) in frames.iter_mut().zip(original) {
            *frame = frame.map_landmarks(|name, landmark| match raw.get(name) {
                Some(source) if !name.is_derived() => {
                    landmark.with_position(landmark.position() * source.visibility)
                }
                _ => landmark,
            });
        }
    }

    /// Smooth every landmark present in all frames, per axis
    fn smooth(&self, frames: &mut [LandmarkFrame]) {
        if frames.len() < 3 {
            return;
        }
        for name in LandmarkName::ALL.into_iter().filter(|n| !n.is_derived()) {
            let Some(track) = frames
                .iter()
                .map(|frame| frame.get(name).copied())
                .collect::<Option<Vec<Landmark>>>()
            else {
                continue;
            };
            let xs = self
                .smoothing
                .apply(&track.iter().map(|l| l.x).collect::<Vec<_>>());
            let ys = self
                .smoothing
                .apply(&track.iter().map(|l| l.y).collect::<Vec<_>>());
            let zs = self
                .smoothing
                .apply(&track.iter().map(|l| l.z).collect::<Vec<_>>());
            for (i, frame) in frames.iter_mut().enumerate() {
                frame.set(
                    name,
                    track[i].with_position(Point3::new(xs[i], ys[i], zs[i])),
                );
            }
        }
    }

    /// Translate to mid-hip and scale the reference width to 1
    ///
    /// Returns `None` when the mid-hip is missing or both widths are degenerate.
    #[must_use]
    pub fn normalize_frame(&self, frame: &LandmarkFrame) -> Option<LandmarkFrame> {
        let frame = frame.clone().with_derived_midpoints();
        let origin = frame.position(LandmarkName::Hip)?;
        let reference = self.reference_distance(&frame)?;
        let normalized = frame.map_landmarks(|_, landmark| {
            landmark.with_position((landmark.position() - origin) * (1.0 / reference))
        });
        Some(normalized.with_derived_midpoints())
    }

    /// Reference width of a frame, falling back to the other width
    #[must_use]
    pub fn reference_distance(&self, frame: &LandmarkFrame) -> Option<f64> {
        let width = |left: LandmarkName, right: LandmarkName| {
            let d = frame.position(left)?.distance(frame.position(right)?);
            (d > MIN_REFERENCE_DISTANCE).then_some(d)
        };
        let shoulders = || width(LandmarkName::LeftShoulder, LandmarkName::RightShoulder);
        let hips = || width(LandmarkName::LeftHip, LandmarkName::RightHip);
        match self.config.reference_distance {
            ReferenceDistance::ShoulderWidth => shoulders().or_else(hips),
            ReferenceDistance::HipWidth => hips().or_else(shoulders),
        }
    }
}

#[derive(Debug, Default)]
struct FillReport {
    filled_points: usize,
    constant_filled: Vec<LandmarkName>,
    unrecoverable: Vec<LandmarkName>,
}

/// Fill the invalid frames of one landmark from its valid frames
fn interpolate_landmark(
    frames: &mut [LandmarkFrame],
    timestamps: &[f64],
    name: LandmarkName,
    valid: &[usize],
) -> usize {
    let mut filled = 0;
    for i in 0..frames.len() {
        if valid.binary_search(&i).is_ok() {
            continue;
        }
        let after = valid.partition_point(|&v| v < i);
        let prev = after.checked_sub(1).map(|k| valid[k]);
        let next = valid.get(after).copied();
        let replacement = match (prev, next) {
            (Some(p), Some(q)) => {
                let (Some(a), Some(b)) = (frames[p].get(name).copied(), frames[q].get(name).copied())
                else {
                    continue;
                };
                let span = timestamps[q] - timestamps[p];
                let t = if span.abs() < EPSILON {
                    (i - p) as f64 / (q - p) as f64
                } else {
                    (timestamps[i] - timestamps[p]) / span
                };
                Landmark::visible_at(a.position().lerp(b.position(), t))
                    .with_visibility(t.mul_add(b.visibility - a.visibility, a.visibility))
            }
            (Some(p), None) => match frames[p].get(name) {
                Some(landmark) => *landmark,
                None => continue,
            },
            (None, Some(q)) => match frames[q].get(name) {
                Some(landmark) => *landmark,
                None => continue,
            },
            (None, None) => continue,
        };
        frames[i].set(name, replacement);
        filled += 1;
    }
    filled
}
