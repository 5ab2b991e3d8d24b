// ABOUTME: Joint identifiers and the joint-angle set produced by physics analysis
// ABOUTME: Absent joints stay absent; angles are degrees in [0, 180]
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::errors::AppError;

/// Joints whose angle the pipeline measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Joint {
    /// Hip-knee-ankle angle
    Knee,
    /// Shoulder-hip-knee angle
    Hip,
    /// Shoulder-elbow-wrist angle
    Elbow,
    /// Trunk lean from vertical
    Spine,
    /// Knee-ankle-toe angle
    Ankle,
    /// Elbow-shoulder-hip angle
    Shoulder,
    /// Elbow-wrist-index angle
    Wrist,
}

impl Joint {
    /// All joints in canonical order
    pub const ALL: [Self; 7] = [
        Self::Knee,
        Self::Hip,
        Self::Elbow,
        Self::Spine,
        Self::Ankle,
        Self::Shoulder,
        Self::Wrist,
    ];

    /// Stable snake case name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Knee => "knee",
            Self::Hip => "hip",
            Self::Elbow => "elbow",
            Self::Spine => "spine",
            Self::Ankle => "ankle",
            Self::Shoulder => "shoulder",
            Self::Wrist => "wrist",
        }
    }
}

impl fmt::Display for Joint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Joint {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|joint| joint.as_str() == needle)
            .ok_or_else(|| AppError::invalid_input(format!("Unknown joint '{s}'")))
    }
}

/// Joint angles in degrees keyed by joint
///
/// A joint whose source landmarks were missing is simply not in the set.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JointAngleSet(BTreeMap<Joint, f64>);

impl JointAngleSet {
    /// Empty set
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Insert an angle, clamped to [0, 180]
    pub fn insert(&mut self, joint: Joint, degrees: f64) {
        self.0.insert(joint, degrees.clamp(0.0, 180.0));
    }

    /// Builder-style insert
    #[must_use]
    pub fn with(mut self, joint: Joint, degrees: f64) -> Self {
        self.insert(joint, degrees);
        self
    }

    /// Angle for a joint
    #[must_use]
    pub fn get(&self, joint: Joint) -> Option<f64> {
        self.0.get(&joint).copied()
    }

    /// Whether the joint is present
    #[must_use]
    pub fn contains(&self, joint: Joint) -> bool {
        self.0.contains_key(&joint)
    }

    /// Present joints in canonical order
    pub fn joints(&self) -> impl Iterator<Item = Joint> + '_ {
        self.0.keys().copied()
    }

    /// Iterate joints with their angles
    pub fn iter(&self) -> impl Iterator<Item = (Joint, f64)> + '_ {
        self.0.iter().map(|(joint, angle)| (*joint, *angle))
    }

    /// Number of present joints
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no joint is present
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(Joint, f64)> for JointAngleSet {
    fn from_iter<I: IntoIterator<Item = (Joint, f64)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (joint, angle) in iter {
            set.insert(joint, angle);
        }
        set
    }
}
