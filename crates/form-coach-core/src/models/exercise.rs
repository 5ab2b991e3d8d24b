// ABOUTME: Exercise catalogue with tracked signal, required landmarks, and form limits
// ABOUTME: Unknown exercise names are rejected as input errors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::joint::Joint;
use super::landmark::LandmarkName;
use crate::errors::AppError;

const LOWER_BODY_LANDMARKS: [LandmarkName; 8] = [
    LandmarkName::LeftShoulder,
    LandmarkName::RightShoulder,
    LandmarkName::LeftHip,
    LandmarkName::RightHip,
    LandmarkName::LeftKnee,
    LandmarkName::RightKnee,
    LandmarkName::LeftAnkle,
    LandmarkName::RightAnkle,
];

const BENCH_LANDMARKS: [LandmarkName; 6] = [
    LandmarkName::LeftShoulder,
    LandmarkName::RightShoulder,
    LandmarkName::LeftElbow,
    LandmarkName::RightElbow,
    LandmarkName::LeftWrist,
    LandmarkName::RightWrist,
];

const OVERHEAD_LANDMARKS: [LandmarkName; 8] = [
    LandmarkName::LeftShoulder,
    LandmarkName::RightShoulder,
    LandmarkName::LeftElbow,
    LandmarkName::RightElbow,
    LandmarkName::LeftWrist,
    LandmarkName::RightWrist,
    LandmarkName::LeftHip,
    LandmarkName::RightHip,
];

/// Supported exercises
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseType {
    /// Back squat
    Squat,
    /// Conventional deadlift
    Deadlift,
    /// Flat bench press
    BenchPress,
    /// Standing overhead press
    OverheadPress,
    /// Forward lunge
    Lunge,
}

/// Vertical signal the phase detector follows for an exercise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackedSignal {
    /// Hip midpoint height relative to the ankle midpoint
    HipOverAnkles,
    /// Wrist midpoint height relative to the shoulder midpoint
    WristsOverShoulders,
}

/// Muscle groups scored by the biomechanics analyzer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MuscleGroup {
    /// Knee extensors
    Quadriceps,
    /// Hip extensors
    Glutes,
    /// Hip extensors and knee flexors
    Hamstrings,
    /// Spinal extensors
    ErectorSpinae,
    /// Ankle plantar flexors
    Calves,
    /// Trunk stabilisers
    Core,
    /// Chest
    Pectorals,
    /// Elbow extensors
    Triceps,
    /// Shoulder
    Deltoids,
    /// Latissimus dorsi
    Lats,
}

impl MuscleGroup {
    /// Stable snake case name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Quadriceps => "quadriceps",
            Self::Glutes => "glutes",
            Self::Hamstrings => "hamstrings",
            Self::ErectorSpinae => "erector_spinae",
            Self::Calves => "calves",
            Self::Core => "core",
            Self::Pectorals => "pectorals",
            Self::Triceps => "triceps",
            Self::Deltoids => "deltoids",
            Self::Lats => "lats",
        }
    }
}

impl fmt::Display for MuscleGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ExerciseType {
    /// Every supported exercise
    pub const ALL: [Self; 5] = [
        Self::Squat,
        Self::Deadlift,
        Self::BenchPress,
        Self::OverheadPress,
        Self::Lunge,
    ];

    /// Stable snake case name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Squat => "squat",
            Self::Deadlift => "deadlift",
            Self::BenchPress => "bench_press",
            Self::OverheadPress => "overhead_press",
            Self::Lunge => "lunge",
        }
    }

    /// Signal used for phase detection
    #[must_use]
    pub const fn tracked_signal(self) -> TrackedSignal {
        match self {
            Self::Squat | Self::Deadlift | Self::Lunge => TrackedSignal::HipOverAnkles,
            Self::BenchPress | Self::OverheadPress => TrackedSignal::WristsOverShoulders,
        }
    }

    /// Landmarks a frame must contain to be analysed for this exercise
    #[must_use]
    pub const fn required_landmarks(self) -> &'static [LandmarkName] {
        match self {
            Self::Squat | Self::Deadlift | Self::Lunge => &LOWER_BODY_LANDMARKS,
            Self::BenchPress => &BENCH_LANDMARKS,
            Self::OverheadPress => &OVERHEAD_LANDMARKS,
        }
    }

    /// Joint whose range of motion defines the exercise
    #[must_use]
    pub const fn primary_joint(self) -> Joint {
        match self {
            Self::Squat | Self::Lunge => Joint::Knee,
            Self::Deadlift => Joint::Hip,
            Self::BenchPress | Self::OverheadPress => Joint::Elbow,
        }
    }

    /// Expected primary-joint range of motion over one rep, in degrees
    #[must_use]
    pub const fn expected_range_of_motion(self) -> f64 {
        match self {
            Self::Squat => 85.0,
            Self::Deadlift | Self::OverheadPress | Self::Lunge => 80.0,
            Self::BenchPress => 90.0,
        }
    }

    /// Largest acceptable trunk lean from vertical, when trunk lean is meaningful
    ///
    /// Bench press is performed lying down, so it has no lean limit.
    #[must_use]
    pub const fn spine_lean_limit(self) -> Option<f64> {
        match self {
            Self::Squat => Some(45.0),
            Self::Deadlift => Some(60.0),
            Self::OverheadPress => Some(15.0),
            Self::Lunge => Some(30.0),
            Self::BenchPress => None,
        }
    }

    /// Whether centre-of-mass stability is meaningful for the exercise
    #[must_use]
    pub const fn is_standing_lift(self) -> bool {
        matches!(self, Self::Squat | Self::Deadlift | Self::Lunge)
    }
}

impl fmt::Display for ExerciseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExerciseType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "squat" | "back_squat" => Ok(Self::Squat),
            "deadlift" => Ok(Self::Deadlift),
            "bench_press" | "bench" => Ok(Self::BenchPress),
            "overhead_press" | "ohp" | "shoulder_press" => Ok(Self::OverheadPress),
            "lunge" => Ok(Self::Lunge),
            _ => Err(AppError::unknown_exercise(s)),
        }
    }
}
