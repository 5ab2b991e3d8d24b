// ABOUTME: Landmark topology, 3D points, and per-frame landmark storage
// ABOUTME: Replaces detector index numbers with a typed LandmarkName keyed frame
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Sub};
use std::str::FromStr;

use crate::constants::numeric::EPSILON;
use crate::constants::topology::{POSE_LANDMARK_COUNT, TOTAL_LANDMARK_COUNT};
use crate::errors::{AppError, AppResult};

/// A point in normalized image or body coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    /// Horizontal coordinate
    pub x: f64,
    /// Vertical coordinate (grows downward in image space)
    pub y: f64,
    /// Depth coordinate
    pub z: f64,
}

impl Point3 {
    /// Create a new point
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Dot product
    #[must_use]
    pub fn dot(self, other: Self) -> f64 {
        self.x.mul_add(other.x, self.y.mul_add(other.y, self.z * other.z))
    }

    /// Euclidean length
    #[must_use]
    pub fn norm(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Euclidean distance to another point
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (self - other).norm()
    }

    /// Distance in the image (x-y) plane only
    #[must_use]
    pub fn planar_distance(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Midpoint between two points
    #[must_use]
    pub fn midpoint(self, other: Self) -> Self {
        self.lerp(other, 0.5)
    }

    /// Linear interpolation, `t = 0` yields `self`
    #[must_use]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        self + (other - self) * t
    }

    /// Angle at `vertex` formed by `a` and `c`, in degrees within [0, 180]
    ///
    /// Zero-length arms are guarded by an epsilon so degenerate input yields
    /// 90 degrees rather than NaN.
    #[must_use]
    pub fn angle_at(a: Self, vertex: Self, c: Self) -> f64 {
        let ba = a - vertex;
        let bc = c - vertex;
        let denom = (ba.norm() * bc.norm()).max(EPSILON);
        let cosine = (ba.dot(bc) / denom).clamp(-1.0, 1.0);
        cosine.acos().to_degrees().clamp(0.0, 180.0)
    }

    /// Whether every coordinate is finite
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Add for Point3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Point3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Point3 {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// A single tracked body point with a detector confidence
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    /// Horizontal coordinate
    pub x: f64,
    /// Vertical coordinate
    pub y: f64,
    /// Depth coordinate
    pub z: f64,
    /// Detector confidence in [0, 1]
    pub visibility: f64,
}

impl Landmark {
    /// Create a landmark, clamping visibility into [0, 1]
    #[must_use]
    pub fn new(x: f64, y: f64, z: f64, visibility: f64) -> Self {
        Self {
            x,
            y,
            z,
            visibility: visibility.clamp(0.0, 1.0),
        }
    }

    /// Create a fully visible landmark at a point
    #[must_use]
    pub fn visible_at(point: Point3) -> Self {
        Self::new(point.x, point.y, point.z, 1.0)
    }

    /// Position without the confidence
    #[must_use]
    pub const fn position(&self) -> Point3 {
        Point3::new(self.x, self.y, self.z)
    }

    /// Replace the position, keeping visibility
    #[must_use]
    pub const fn with_position(self, point: Point3) -> Self {
        Self {
            x: point.x,
            y: point.y,
            z: point.z,
            visibility: self.visibility,
        }
    }

    /// Replace the visibility, clamped to [0, 1]
    #[must_use]
    pub fn with_visibility(self, visibility: f64) -> Self {
        Self {
            visibility: visibility.clamp(0.0, 1.0),
            ..self
        }
    }
}

/// Semantic landmark names for the 33-point pose topology plus derived midpoints
///
/// Discriminants match the upstream detector's index order, so
/// `LandmarkName::LeftHip as usize == 23`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LandmarkName {
    /// Nose tip
    Nose = 0,
    /// Inner corner of the left eye
    LeftEyeInner,
    /// Left eye centre
    LeftEye,
    /// Outer corner of the left eye
    LeftEyeOuter,
    /// Inner corner of the right eye
    RightEyeInner,
    /// Right eye centre
    RightEye,
    /// Outer corner of the right eye
    RightEyeOuter,
    /// Left ear
    LeftEar,
    /// Right ear
    RightEar,
    /// Left mouth corner
    MouthLeft,
    /// Right mouth corner
    MouthRight,
    /// Left shoulder
    LeftShoulder,
    /// Right shoulder
    RightShoulder,
    /// Left elbow
    LeftElbow,
    /// Right elbow
    RightElbow,
    /// Left wrist
    LeftWrist,
    /// Right wrist
    RightWrist,
    /// Left little finger knuckle
    LeftPinky,
    /// Right little finger knuckle
    RightPinky,
    /// Left index finger knuckle
    LeftIndex,
    /// Right index finger knuckle
    RightIndex,
    /// Left thumb
    LeftThumb,
    /// Right thumb
    RightThumb,
    /// Left hip
    LeftHip,
    /// Right hip
    RightHip,
    /// Left knee
    LeftKnee,
    /// Right knee
    RightKnee,
    /// Left ankle
    LeftAnkle,
    /// Right ankle
    RightAnkle,
    /// Left heel
    LeftHeel,
    /// Right heel
    RightHeel,
    /// Left toe tip
    LeftFootIndex,
    /// Right toe tip
    RightFootIndex,
    /// Derived midpoint of the two hips
    Hip,
    /// Derived midpoint of the two shoulders
    Shoulder,
    /// Derived midpoint between `Shoulder` and `Hip`
    SpineMid,
}

impl LandmarkName {
    /// Every landmark slot in index order
    pub const ALL: [Self; TOTAL_LANDMARK_COUNT] = [
        Self::Nose,
        Self::LeftEyeInner,
        Self::LeftEye,
        Self::LeftEyeOuter,
        Self::RightEyeInner,
        Self::RightEye,
        Self::RightEyeOuter,
        Self::LeftEar,
        Self::RightEar,
        Self::MouthLeft,
        Self::MouthRight,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftWrist,
        Self::RightWrist,
        Self::LeftPinky,
        Self::RightPinky,
        Self::LeftIndex,
        Self::RightIndex,
        Self::LeftThumb,
        Self::RightThumb,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
        Self::LeftHeel,
        Self::RightHeel,
        Self::LeftFootIndex,
        Self::RightFootIndex,
        Self::Hip,
        Self::Shoulder,
        Self::SpineMid,
    ];

    /// Slot index of this landmark
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Landmark for a slot index
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Whether the landmark is computed from other landmarks
    #[must_use]
    pub const fn is_derived(self) -> bool {
        matches!(self, Self::Hip | Self::Shoulder | Self::SpineMid)
    }

    /// Stable snake case name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Nose => "nose",
            Self::LeftEyeInner => "left_eye_inner",
            Self::LeftEye => "left_eye",
            Self::LeftEyeOuter => "left_eye_outer",
            Self::RightEyeInner => "right_eye_inner",
            Self::RightEye => "right_eye",
            Self::RightEyeOuter => "right_eye_outer",
            Self::LeftEar => "left_ear",
            Self::RightEar => "right_ear",
            Self::MouthLeft => "mouth_left",
            Self::MouthRight => "mouth_right",
            Self::LeftShoulder => "left_shoulder",
            Self::RightShoulder => "right_shoulder",
            Self::LeftElbow => "left_elbow",
            Self::RightElbow => "right_elbow",
            Self::LeftWrist => "left_wrist",
            Self::RightWrist => "right_wrist",
            Self::LeftPinky => "left_pinky",
            Self::RightPinky => "right_pinky",
            Self::LeftIndex => "left_index",
            Self::RightIndex => "right_index",
            Self::LeftThumb => "left_thumb",
            Self::RightThumb => "right_thumb",
            Self::LeftHip => "left_hip",
            Self::RightHip => "right_hip",
            Self::LeftKnee => "left_knee",
            Self::RightKnee => "right_knee",
            Self::LeftAnkle => "left_ankle",
            Self::RightAnkle => "right_ankle",
            Self::LeftHeel => "left_heel",
            Self::RightHeel => "right_heel",
            Self::LeftFootIndex => "left_foot_index",
            Self::RightFootIndex => "right_foot_index",
            Self::Hip => "hip",
            Self::Shoulder => "shoulder",
            Self::SpineMid => "spine_mid",
        }
    }
}

impl fmt::Display for LandmarkName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LandmarkName {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|name| name.as_str() == needle)
            .ok_or_else(|| AppError::invalid_input(format!("Unknown landmark name '{s}'")))
    }
}

/// One frame of landmarks with an explicit slot for every name
///
/// Missing landmarks are `None`, never omitted, so every frame of a session
/// shares the same name set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandmarkFrame {
    slots: Vec<Option<Landmark>>,
}

impl Default for LandmarkFrame {
    fn default() -> Self {
        Self::empty()
    }
}

impl LandmarkFrame {
    /// Frame with every landmark missing
    #[must_use]
    pub fn empty() -> Self {
        Self {
            slots: vec![None; TOTAL_LANDMARK_COUNT],
        }
    }

    /// Convert the detector's index-ordered output once into a named frame
    ///
    /// Derived midpoints are computed from the converted points.
    ///
    /// # Errors
    ///
    /// Returns an error if the array does not hold exactly 33 entries.
    pub fn from_index_array(points: &[Option<Landmark>]) -> AppResult<Self> {
        if points.len() != POSE_LANDMARK_COUNT {
            return Err(AppError::invalid_input(format!(
                "Pose detector output must have {POSE_LANDMARK_COUNT} landmarks, got {}",
                points.len()
            )));
        }
        let mut frame = Self::empty();
        for (slot, point) in frame.slots.iter_mut().zip(points) {
            *slot = *point;
        }
        Ok(frame.with_derived_midpoints())
    }

    /// Build a frame from named landmarks
    #[must_use]
    pub fn from_named(points: impl IntoIterator<Item = (LandmarkName, Landmark)>) -> Self {
        let mut frame = Self::empty();
        for (name, landmark) in points {
            frame.set(name, landmark);
        }
        frame
    }

    /// Landmark for a name, if present
    #[must_use]
    pub fn get(&self, name: LandmarkName) -> Option<&Landmark> {
        self.slots.get(name.index()).and_then(Option::as_ref)
    }

    /// Position for a name, if present
    #[must_use]
    pub fn position(&self, name: LandmarkName) -> Option<Point3> {
        self.get(name).map(Landmark::position)
    }

    /// Position for a name when its visibility reaches `threshold`
    #[must_use]
    pub fn visible_position(&self, name: LandmarkName, threshold: f64) -> Option<Point3> {
        self.get(name)
            .filter(|landmark| landmark.visibility >= threshold)
            .map(Landmark::position)
    }

    /// Store a landmark
    pub fn set(&mut self, name: LandmarkName, landmark: Landmark) {
        if let Some(slot) = self.slots.get_mut(name.index()) {
            *slot = Some(landmark);
        }
    }

    /// Mark a landmark as missing
    pub fn clear(&mut self, name: LandmarkName) {
        if let Some(slot) = self.slots.get_mut(name.index()) {
            *slot = None;
        }
    }

    /// Whether a landmark is present
    #[must_use]
    pub fn contains(&self, name: LandmarkName) -> bool {
        self.get(name).is_some()
    }

    /// Names of the given landmarks that are absent
    #[must_use]
    pub fn missing(&self, names: &[LandmarkName]) -> Vec<LandmarkName> {
        names
            .iter()
            .copied()
            .filter(|name| !self.contains(*name))
            .collect()
    }

    /// Iterate present landmarks with their names
    pub fn iter(&self) -> impl Iterator<Item = (LandmarkName, &Landmark)> {
        LandmarkName::ALL
            .iter()
            .zip(&self.slots)
            .filter_map(|(name, slot)| slot.as_ref().map(|landmark| (*name, landmark)))
    }

    /// Number of present landmarks
    #[must_use]
    pub fn present_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Apply a transform to every present landmark
    #[must_use]
    pub fn map_landmarks(&self, transform: impl Fn(LandmarkName, Landmark) -> Landmark) -> Self {
        let slots = LandmarkName::ALL
            .iter()
            .zip(&self.slots)
            .map(|(name, slot)| slot.map(|landmark| transform(*name, landmark)))
            .collect();
        Self { slots }
    }

    /// Recompute `Hip`, `Shoulder` and `SpineMid` from the side landmarks
    ///
    /// A midpoint takes the lower visibility of its pair and is cleared when
    /// either side is missing.
    #[must_use]
    pub fn with_derived_midpoints(mut self) -> Self {
        let hip = self.pair_midpoint(LandmarkName::LeftHip, LandmarkName::RightHip);
        let shoulder = self.pair_midpoint(LandmarkName::LeftShoulder, LandmarkName::RightShoulder);
        let spine = match (hip, shoulder) {
            (Some(h), Some(s)) => Some(
                Landmark::visible_at(h.position().midpoint(s.position()))
                    .with_visibility(h.visibility.min(s.visibility)),
            ),
            _ => None,
        };
        for (name, value) in [
            (LandmarkName::Hip, hip),
            (LandmarkName::Shoulder, shoulder),
            (LandmarkName::SpineMid, spine),
        ] {
            match value {
                Some(landmark) => self.set(name, landmark),
                None => self.clear(name),
            }
        }
        self
    }

    fn pair_midpoint(&self, left: LandmarkName, right: LandmarkName) -> Option<Landmark> {
        let l = self.get(left)?;
        let r = self.get(right)?;
        Some(
            Landmark::visible_at(l.position().midpoint(r.position()))
                .with_visibility(l.visibility.min(r.visibility)),
        )
    }
}

/// A landmark frame stamped with its capture time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseFrame {
    /// Capture time in seconds
    pub timestamp: f64,
    /// Landmarks detected in this frame
    pub landmarks: LandmarkFrame,
}

impl PoseFrame {
    /// Create a pose frame
    #[must_use]
    pub const fn new(timestamp: f64, landmarks: LandmarkFrame) -> Self {
        Self {
            timestamp,
            landmarks,
        }
    }
}

/// Ordered frames plus the nominal frame rate of the capture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseSequence {
    frames: Vec<PoseFrame>,
    frame_rate: f64,
}

impl PoseSequence {
    /// Build a sequence, checking frame rate and timestamp order
    ///
    /// # Errors
    ///
    /// Returns an error if the frame rate is not positive, a timestamp is not
    /// finite, or timestamps decrease.
    pub fn new(frames: Vec<PoseFrame>, frame_rate: f64) -> AppResult<Self> {
        if !(frame_rate.is_finite() && frame_rate > 0.0) {
            return Err(AppError::value_out_of_range(
                "frame_rate",
                frame_rate,
                "positive",
            ));
        }
        if let Some(frame) = frames.iter().find(|frame| !frame.timestamp.is_finite()) {
            return Err(AppError::value_out_of_range(
                "timestamp",
                frame.timestamp,
                "finite",
            ));
        }
        for pair in frames.windows(2) {
            if pair[1].timestamp < pair[0].timestamp {
                return Err(AppError::out_of_order(pair[0].timestamp, pair[1].timestamp));
            }
        }
        Ok(Self { frames, frame_rate })
    }

    /// Build a sequence from bare landmark frames sampled at a fixed rate
    ///
    /// # Errors
    ///
    /// Returns an error if the frame rate is not positive.
    pub fn from_landmark_frames(frames: Vec<LandmarkFrame>, frame_rate: f64) -> AppResult<Self> {
        let frames = frames
            .into_iter()
            .enumerate()
            .map(|(i, landmarks)| PoseFrame::new(i as f64 / frame_rate, landmarks))
            .collect();
        Self::new(frames, frame_rate)
    }

    /// Frames in order
    #[must_use]
    pub fn frames(&self) -> &[PoseFrame] {
        &self.frames
    }

    /// Consume into frames
    #[must_use]
    pub fn into_frames(self) -> Vec<PoseFrame> {
        self.frames
    }

    /// Nominal frame rate in Hz
    #[must_use]
    pub const fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    /// Number of frames
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether the sequence holds no frames
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Timestamps in order
    #[must_use]
    pub fn timestamps(&self) -> Vec<f64> {
        self.frames.iter().map(|f| f.timestamp).collect()
    }

    /// Same timestamps and rate with replaced landmarks
    ///
    /// # Errors
    ///
    /// Returns an error if the number of landmark frames differs.
    pub fn with_landmarks(&self, landmarks: Vec<LandmarkFrame>) -> AppResult<Self> {
        if landmarks.len() != self.frames.len() {
            return Err(AppError::internal(format!(
                "Expected {} landmark frames, got {}",
                self.frames.len(),
                landmarks.len()
            )));
        }
        let frames = self
            .frames
            .iter()
            .zip(landmarks)
            .map(|(frame, landmarks)| PoseFrame::new(frame.timestamp, landmarks))
            .collect();
        Ok(Self {
            frames,
            frame_rate: self.frame_rate,
        })
    }
}
