// ABOUTME: Seeded synthetic pose generator for squat sequences and standing holds
// ABOUTME: Interpolates standing and bottom poses with S-curve timing and bounded landmark noise
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Synthetic data for tests and benchmarks. Every generator owns a
//! `ChaCha8Rng` seeded from an explicit value, so identical settings always
//! produce identical sequences.
//!
//! Poses are front-facing in image coordinates (`y` grows downward, negative
//! `z` toward the camera). The bottom of the squat moves the knees forward in
//! depth, so the frontal projection of each leg stays straight.

use form_coach_core::errors::AppResult;
use form_coach_core::models::{
    Landmark, LandmarkFrame, LandmarkName, Point3, PoseFrame, PoseSequence,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::f64::consts::PI;

const SHIN: f64 = 0.18;
const THIGH: f64 = 0.17;
const TRUNK: f64 = 0.25;
const ANKLE_Y: f64 = 0.90;

/// Seconds spent in each part of one repetition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RepTiming {
    /// Standing hold before the descent
    pub lead_hold: f64,
    /// Descent
    pub descent: f64,
    /// Hold at the bottom
    pub bottom_hold: f64,
    /// Ascent
    pub ascent: f64,
    /// Standing hold after the ascent
    pub trail_hold: f64,
}

impl Default for RepTiming {
    fn default() -> Self {
        Self {
            lead_hold: 0.45,
            descent: 1.8,
            bottom_hold: 0.5,
            ascent: 1.8,
            trail_hold: 0.45,
        }
    }
}

impl RepTiming {
    /// Length of one repetition
    #[must_use]
    pub fn total(&self) -> f64 {
        self.lead_hold + self.descent + self.bottom_hold + self.ascent + self.trail_hold
    }

    /// Squat depth in [0, 1] at `t` seconds into a repetition
    #[must_use]
    pub fn depth_at(&self, t: f64) -> f64 {
        let ease = |s: f64| 0.5 * (1.0 - (PI * s.clamp(0.0, 1.0)).cos());
        let down_start = self.lead_hold;
        let bottom_start = down_start + self.descent;
        let up_start = bottom_start + self.bottom_hold;
        let up_end = up_start + self.ascent;
        if t < down_start {
            0.0
        } else if t < bottom_start {
            ease((t - down_start) / self.descent)
        } else if t < up_start {
            1.0
        } else if t < up_end {
            1.0 - ease((t - up_start) / self.ascent)
        } else {
            0.0
        }
    }
}

/// Generates reproducible squat pose sequences
#[derive(Debug, Clone)]
pub struct SyntheticPoseGenerator {
    seed: u64,
    frame_rate: f64,
    repetitions: usize,
    timing: RepTiming,
    noise: f64,
    visibility: f64,
    bottom_knee_angle: f64,
    bottom_trunk_lean: f64,
}

impl SyntheticPoseGenerator {
    /// 30 fps, five repetitions, 90 degree knees and 30 degree lean at the bottom
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            frame_rate: 30.0,
            repetitions: 5,
            timing: RepTiming::default(),
            noise: 0.0005,
            visibility: 0.95,
            bottom_knee_angle: 90.0,
            bottom_trunk_lean: 30.0,
        }
    }

    /// Set the frame rate
    #[must_use]
    pub const fn with_frame_rate(mut self, frame_rate: f64) -> Self {
        self.frame_rate = frame_rate;
        self
    }

    /// Set the repetition count
    #[must_use]
    pub const fn with_repetitions(mut self, repetitions: usize) -> Self {
        self.repetitions = repetitions;
        self
    }

    /// Set the repetition timing
    #[must_use]
    pub const fn with_timing(mut self, timing: RepTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Set the half-width of the uniform coordinate noise
    #[must_use]
    pub const fn with_noise(mut self, noise: f64) -> Self {
        self.noise = noise;
        self
    }

    /// Set the visibility of every landmark
    #[must_use]
    pub const fn with_visibility(mut self, visibility: f64) -> Self {
        self.visibility = visibility;
        self
    }

    /// Set the knee angle at the bottom of the squat
    #[must_use]
    pub const fn with_bottom_knee_angle(mut self, degrees: f64) -> Self {
        self.bottom_knee_angle = degrees;
        self
    }

    /// Set the trunk lean at the bottom of the squat
    #[must_use]
    pub const fn with_bottom_trunk_lean(mut self, degrees: f64) -> Self {
        self.bottom_trunk_lean = degrees;
        self
    }

    /// Frame rate in use
    #[must_use]
    pub const fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    /// Noise-free standing pose
    #[must_use]
    pub fn standing_frame(&self) -> LandmarkFrame {
        self.pose_at_depth(0.0)
    }

    /// Noise-free bottom pose
    #[must_use]
    pub fn bottom_frame(&self) -> LandmarkFrame {
        self.pose_at_depth(1.0)
    }

    /// Noise-free pose interpolated between standing (0) and bottom (1)
    #[must_use]
    pub fn pose_at_depth(&self, depth: f64) -> LandmarkFrame {
        let standing = standing_points();
        let bottom = self.bottom_points();
        LandmarkFrame::from_named(standing.iter().zip(&bottom).map(|((name, a), (_, b))| {
            (
                *name,
                Landmark::visible_at(a.lerp(*b, depth)).with_visibility(self.visibility),
            )
        }))
        .with_derived_midpoints()
    }

    /// Squat repetitions at the configured frame rate
    ///
    /// # Errors
    ///
    /// Returns an error if the frame rate is not positive.
    pub fn squat_sequence(&self) -> AppResult<PoseSequence> {
        let duration = self.timing.total() * self.repetitions as f64;
        let count = (duration * self.frame_rate).round() as usize;
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let rep = self.timing.total();
        let frames = (0..count)
            .map(|i| {
                let t = i as f64 / self.frame_rate;
                let depth = self.timing.depth_at(t % rep);
                PoseFrame::new(t, self.noisy(self.pose_at_depth(depth), &mut rng))
            })
            .collect();
        PoseSequence::new(frames, self.frame_rate)
    }

    /// A still standing pose held for `frames` frames
    ///
    /// # Errors
    ///
    /// Returns an error if the frame rate is not positive.
    pub fn standing_sequence(&self, frames: usize) -> AppResult<PoseSequence> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let standing = self.standing_frame();
        let frames = (0..frames)
            .map(|i| {
                PoseFrame::new(
                    i as f64 / self.frame_rate,
                    self.noisy(standing.clone(), &mut rng),
                )
            })
            .collect();
        PoseSequence::new(frames, self.frame_rate)
    }

    fn noisy(&self, frame: LandmarkFrame, rng: &mut ChaCha8Rng) -> LandmarkFrame {
        if self.noise <= 0.0 {
            return frame;
        }
        let mut jitter = || {
            Point3::new(
                rng.gen_range(-self.noise..=self.noise),
                rng.gen_range(-self.noise..=self.noise),
                rng.gen_range(-self.noise..=self.noise),
            )
        };
        let mut out = LandmarkFrame::empty();
        for (name, landmark) in frame.iter().filter(|(name, _)| !name.is_derived()) {
            out.set(name, landmark.with_position(landmark.position() + jitter()));
        }
        out.with_derived_midpoints()
    }

    /// Bottom pose built from segment lengths, knee angle and trunk lean
    fn bottom_points(&self) -> Vec<(LandmarkName, Point3)> {
        let knee_flexion = (180.0 - self.bottom_knee_angle).to_radians();
        let shin_tilt = (knee_flexion / 2.0).min(0.6);
        let knee_dy = -SHIN * shin_tilt.cos();
        let knee_dz = -SHIN * shin_tilt.sin();
        let thigh_dir = shin_tilt - knee_flexion;
        let hip_dy = -THIGH * thigh_dir.cos();
        let hip_dz = -THIGH * thigh_dir.sin();
        let lean = self.bottom_trunk_lean.to_radians();

        let standing = standing_points();
        let standing_hip_y = ANKLE_Y - SHIN - THIGH;
        let hip_y = ANKLE_Y + knee_dy + hip_dy;
        let hip_z = knee_dz + hip_dz;
        let shoulder_y = TRUNK.mul_add(-lean.cos(), hip_y);
        let shoulder_z = TRUNK.mul_add(-lean.sin(), hip_z);
        let upper_shift = Point3::new(
            0.0,
            shoulder_y - (standing_hip_y - TRUNK),
            shoulder_z,
        );

        standing
            .into_iter()
            .map(|(name, p)| {
                use LandmarkName as L;
                let moved = match name {
                    L::LeftHip | L::RightHip => Point3::new(p.x, hip_y, hip_z),
                    L::LeftKnee | L::RightKnee => Point3::new(p.x, ANKLE_Y + knee_dy, knee_dz),
                    L::LeftAnkle
                    | L::RightAnkle
                    | L::LeftHeel
                    | L::RightHeel
                    | L::LeftFootIndex
                    | L::RightFootIndex => p,
                    _ => p + upper_shift,
                };
                (name, moved)
            })
            .collect()
    }
}

/// Standing pose: shoulders 0.16 apart, hips 0.10 apart, feet under hips
fn standing_points() -> Vec<(LandmarkName, Point3)> {
    use LandmarkName as L;
    let shoulder_y = ANKLE_Y - SHIN - THIGH - TRUNK;
    let hip_y = ANKLE_Y - SHIN - THIGH;
    let knee_y = ANKLE_Y - SHIN;
    let p = Point3::new;
    vec![
        (L::Nose, p(0.50, 0.15, -0.02)),
        (L::LeftEyeInner, p(0.49, 0.14, -0.01)),
        (L::LeftEye, p(0.485, 0.14, -0.01)),
        (L::LeftEyeOuter, p(0.48, 0.14, -0.01)),
        (L::RightEyeInner, p(0.51, 0.14, -0.01)),
        (L::RightEye, p(0.515, 0.14, -0.01)),
        (L::RightEyeOuter, p(0.52, 0.14, -0.01)),
        (L::LeftEar, p(0.47, 0.15, 0.0)),
        (L::RightEar, p(0.53, 0.15, 0.0)),
        (L::MouthLeft, p(0.49, 0.18, -0.01)),
        (L::MouthRight, p(0.51, 0.18, -0.01)),
        (L::LeftShoulder, p(0.42, shoulder_y, 0.0)),
        (L::RightShoulder, p(0.58, shoulder_y, 0.0)),
        (L::LeftElbow, p(0.40, shoulder_y + 0.12, 0.0)),
        (L::RightElbow, p(0.60, shoulder_y + 0.12, 0.0)),
        (L::LeftWrist, p(0.40, shoulder_y + 0.22, -0.02)),
        (L::RightWrist, p(0.60, shoulder_y + 0.22, -0.02)),
        (L::LeftPinky, p(0.395, shoulder_y + 0.25, -0.02)),
        (L::RightPinky, p(0.605, shoulder_y + 0.25, -0.02)),
        (L::LeftIndex, p(0.40, shoulder_y + 0.26, -0.02)),
        (L::RightIndex, p(0.60, shoulder_y + 0.26, -0.02)),
        (L::LeftThumb, p(0.405, shoulder_y + 0.24, -0.03)),
        (L::RightThumb, p(0.595, shoulder_y + 0.24, -0.03)),
        (L::LeftHip, p(0.45, hip_y, 0.0)),
        (L::RightHip, p(0.55, hip_y, 0.0)),
        (L::LeftKnee, p(0.45, knee_y, 0.0)),
        (L::RightKnee, p(0.55, knee_y, 0.0)),
        (L::LeftAnkle, p(0.45, ANKLE_Y, 0.0)),
        (L::RightAnkle, p(0.55, ANKLE_Y, 0.0)),
        (L::LeftHeel, p(0.45, ANKLE_Y + 0.02, 0.02)),
        (L::RightHeel, p(0.55, ANKLE_Y + 0.02, 0.02)),
        (L::LeftFootIndex, p(0.45, ANKLE_Y, -0.08)),
        (L::RightFootIndex, p(0.55, ANKLE_Y, -0.08)),
    ]
}
