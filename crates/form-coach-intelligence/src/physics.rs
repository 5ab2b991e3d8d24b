// ABOUTME: Physics analyzer computing joint angles, moment arms, centre of mass, and load distribution
// ABOUTME: Energy efficiency is derived from centre-of-mass acceleration over a frame window
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Physics Analysis
//!
//! Joint angles come from landmark triples and are averaged over the left and
//! right sides when both are visible. A joint whose landmarks are missing is
//! left out of the [`JointAngleSet`], never defaulted.
//!
//! The force distribution is a simplified lean-based allocation of supported
//! weight, not an inverse-dynamics solution. Coordinates are converted to
//! metres by multiplying by `height_cm / 100`.

use form_coach_core::constants::physics::CM_PER_M;
use form_coach_core::errors::{AppError, AppResult};
use form_coach_core::models::{
    Estimate, ExerciseType, Joint, JointAngleSet, LandmarkFrame, LandmarkName, Point3, PoseFrame,
    UserProfile,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::biomechanical_constants::segments;
use crate::config::{MomentArmMode, PhysicsConfig};
use crate::statistics::{self, centered_moving_average, central_difference};

type Triple = (LandmarkName, LandmarkName, LandmarkName);

const LEFT_TRIPLES: [(Joint, Triple); 6] = [
    (
        Joint::Knee,
        (LandmarkName::LeftHip, LandmarkName::LeftKnee, LandmarkName::LeftAnkle),
    ),
    (
        Joint::Hip,
        (LandmarkName::LeftShoulder, LandmarkName::LeftHip, LandmarkName::LeftKnee),
    ),
    (
        Joint::Elbow,
        (LandmarkName::LeftShoulder, LandmarkName::LeftElbow, LandmarkName::LeftWrist),
    ),
    (
        Joint::Ankle,
        (LandmarkName::LeftKnee, LandmarkName::LeftAnkle, LandmarkName::LeftFootIndex),
    ),
    (
        Joint::Shoulder,
        (LandmarkName::LeftElbow, LandmarkName::LeftShoulder, LandmarkName::LeftHip),
    ),
    (
        Joint::Wrist,
        (LandmarkName::LeftElbow, LandmarkName::LeftWrist, LandmarkName::LeftIndex),
    ),
];

const RIGHT_TRIPLES: [(Joint, Triple); 6] = [
    (
        Joint::Knee,
        (LandmarkName::RightHip, LandmarkName::RightKnee, LandmarkName::RightAnkle),
    ),
    (
        Joint::Hip,
        (LandmarkName::RightShoulder, LandmarkName::RightHip, LandmarkName::RightKnee),
    ),
    (
        Joint::Elbow,
        (LandmarkName::RightShoulder, LandmarkName::RightElbow, LandmarkName::RightWrist),
    ),
    (
        Joint::Ankle,
        (LandmarkName::RightKnee, LandmarkName::RightAnkle, LandmarkName::RightFootIndex),
    ),
    (
        Joint::Shoulder,
        (LandmarkName::RightElbow, LandmarkName::RightShoulder, LandmarkName::RightHip),
    ),
    (
        Joint::Wrist,
        (LandmarkName::RightElbow, LandmarkName::RightWrist, LandmarkName::RightIndex),
    ),
];

/// Image-space "up" (y grows downward)
const UP: Point3 = Point3::new(0.0, -1.0, 0.0);

/// How the centre of mass was estimated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CenterOfMassMethod {
    /// Segment-mass weighted model
    SegmentModel,
    /// Unweighted mean of present landmarks
    GeometricMean,
}

/// Allocation of supported weight across the spine, hips and knees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForceDistribution {
    /// Body weight plus load times gravity (N)
    pub total_newtons: f64,
    /// Fraction carried by the lumbar spine
    pub spine_fraction: f64,
    /// Load on the lumbar spine (N)
    pub spine_newtons: f64,
    /// Load on the knees (N)
    pub knee_newtons: f64,
    /// Load on the hips (N)
    pub hip_newtons: f64,
    /// External load through the arms (N)
    pub arm_newtons: f64,
}

impl ForceDistribution {
    /// Approximate force through a joint
    ///
    /// Ankles carry the whole supported weight; arm joints carry the external load.
    #[must_use]
    pub const fn joint_force(&self, joint: Joint) -> f64 {
        match joint {
            Joint::Spine => self.spine_newtons,
            Joint::Knee => self.knee_newtons,
            Joint::Hip => self.hip_newtons,
            Joint::Ankle => self.total_newtons,
            Joint::Shoulder | Joint::Elbow | Joint::Wrist => self.arm_newtons,
        }
    }
}

/// Output of the physics analyzer for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicsResult {
    /// Joint angles in degrees
    pub joint_angles: JointAngleSet,
    /// Moment arm from the load to each joint centre (m), empty without a load position
    pub moment_arms: BTreeMap<Joint, f64>,
    /// Centre of mass, absent for an empty frame
    pub center_of_mass: Option<Point3>,
    /// Estimation method of the centre of mass
    pub center_of_mass_method: CenterOfMassMethod,
    /// Supported weight allocation
    pub force_distribution: ForceDistribution,
    /// Centre-of-mass efficiency over the window
    pub energy_efficiency: Estimate,
}

impl PhysicsResult {
    /// Posture score in [0, 1] from trunk lean against the exercise limit
    ///
    /// Full marks within the limit, decaying with a 15 degree scale beyond it.
    #[must_use]
    pub fn posture_score(&self, exercise: ExerciseType) -> f64 {
        match (exercise.spine_lean_limit(), self.joint_angles.get(Joint::Spine)) {
            (Some(limit), Some(spine)) if spine > limit => {
                let excess = (spine - limit) / 15.0;
                (-excess * excess).exp()
            }
            _ => 1.0,
        }
    }
}

/// Computes kinematic and kinetic quantities from landmarks
#[derive(Debug, Clone, Default)]
pub struct PhysicsAnalyzer {
    config: PhysicsConfig,
}

impl PhysicsAnalyzer {
    /// Create an analyzer with the given settings
    #[must_use]
    pub const fn new(config: PhysicsConfig) -> Self {
        Self { config }
    }

    /// Analyze a single frame; energy efficiency needs a window and is reported as insufficient
    ///
    /// # Errors
    ///
    /// Returns an error if the user profile holds impossible values.
    pub fn analyze(
        &self,
        frame: &LandmarkFrame,
        user: &UserProfile,
        load_position: Option<Point3>,
    ) -> AppResult<PhysicsResult> {
        user.validate()?;
        Ok(self.analyze_unchecked(frame, user, load_position))
    }

    /// Analyze the last frame of a window and the window's energy efficiency
    ///
    /// # Errors
    ///
    /// Returns an error if the user profile holds impossible values or the window is empty.
    pub fn analyze_window(
        &self,
        window: &[PoseFrame],
        user: &UserProfile,
        load_position: Option<Point3>,
    ) -> AppResult<PhysicsResult> {
        user.validate()?;
        let Some(last) = window.last() else {
            return Err(AppError::invalid_input(
                "Physics window must contain at least one frame",
            ));
        };
        let mut result = self.analyze_unchecked(&last.landmarks, user, load_position);
        result.energy_efficiency = Self::energy_efficiency(window, user.height_cm);
        Ok(result)
    }

    fn analyze_unchecked(
        &self,
        frame: &LandmarkFrame,
        user: &UserProfile,
        load_position: Option<Point3>,
    ) -> PhysicsResult {
        let joint_angles = Self::joint_angles(frame);
        let moment_arms = load_position
            .map(|load| self.moment_arms(frame, load, user.height_cm))
            .unwrap_or_default();
        let (center_of_mass, center_of_mass_method) = Self::center_of_mass(frame);
        let force_distribution = self.force_distribution(&joint_angles, user);
        debug!(
            joints = joint_angles.len(),
            spine_fraction = force_distribution.spine_fraction,
            "Physics frame analyzed"
        );
        PhysicsResult {
            joint_angles,
            moment_arms,
            center_of_mass,
            center_of_mass_method,
            force_distribution,
            energy_efficiency: Estimate::InsufficientData,
        }
    }

    /// Joint angles of a frame, averaging both sides when available
    #[must_use]
    pub fn joint_angles(frame: &LandmarkFrame) -> JointAngleSet {
        let mut angles = JointAngleSet::new();
        for ((joint, left), (_, right)) in LEFT_TRIPLES.iter().zip(RIGHT_TRIPLES.iter()) {
            let sides: Vec<f64> = [left, right]
                .into_iter()
                .filter_map(|triple| Self::triple_angle(frame, *triple))
                .collect();
            if !sides.is_empty() {
                angles.insert(*joint, statistics::mean(&sides));
            }
        }
        if let Some(spine) = Self::spine_lean(frame) {
            angles.insert(Joint::Spine, spine);
        }
        angles
    }

    /// Angle at the middle landmark of a triple
    #[must_use]
    pub fn triple_angle(frame: &LandmarkFrame, (a, b, c): Triple) -> Option<f64> {
        Some(Point3::angle_at(
            frame.position(a)?,
            frame.position(b)?,
            frame.position(c)?,
        ))
    }

    /// Trunk lean from vertical in degrees (0 upright)
    #[must_use]
    pub fn spine_lean(frame: &LandmarkFrame) -> Option<f64> {
        let hip = frame.position(LandmarkName::Hip)?;
        let shoulder = frame.position(LandmarkName::Shoulder)?;
        Some(Point3::angle_at(hip + UP, hip, shoulder))
    }

    /// Left and right knee angles, when both are measurable
    #[must_use]
    pub fn knee_angles(frame: &LandmarkFrame) -> Option<(f64, f64)> {
        Some((
            Self::triple_angle(frame, LEFT_TRIPLES[0].1)?,
            Self::triple_angle(frame, RIGHT_TRIPLES[0].1)?,
        ))
    }

    /// Largest frontal-plane knee deviation from a straight hip-knee-ankle line (degrees)
    ///
    /// Measured in the image (x-y) plane, where valgus or varus collapse shows
    /// as a bend of the projected leg.
    #[must_use]
    pub fn frontal_knee_deviation(frame: &LandmarkFrame) -> Option<f64> {
        let flat = |name: LandmarkName| {
            frame
                .position(name)
                .map(|p| Point3::new(p.x, p.y, 0.0))
        };
        [LEFT_TRIPLES[0].1, RIGHT_TRIPLES[0].1]
            .into_iter()
            .filter_map(|(hip, knee, ankle)| {
                Some(180.0 - Point3::angle_at(flat(hip)?, flat(knee)?, flat(ankle)?))
            })
            .reduce(f64::max)
    }

    /// Moment arm from the load to each joint centre, in metres
    #[must_use]
    pub fn moment_arms(
        &self,
        frame: &LandmarkFrame,
        load: Point3,
        height_cm: f64,
    ) -> BTreeMap<Joint, f64> {
        let scale = height_cm / CM_PER_M;
        Joint::ALL
            .into_iter()
            .filter_map(|joint| {
                let center = Self::joint_center(frame, joint)?;
                let distance = match self.config.moment_arm_mode {
                    MomentArmMode::Horizontal => (load.x - center.x).abs(),
                    MomentArmMode::Planar => load.planar_distance(center),
                };
                Some((joint, distance * scale))
            })
            .collect()
    }

    /// Centre of a joint, the midpoint of both sides when both are present
    #[must_use]
    pub fn joint_center(frame: &LandmarkFrame, joint: Joint) -> Option<Point3> {
        let pair = |left: LandmarkName, right: LandmarkName| {
            match (frame.position(left), frame.position(right)) {
                (Some(l), Some(r)) => Some(l.midpoint(r)),
                (l, r) => l.or(r),
            }
        };
        match joint {
            Joint::Knee => pair(LandmarkName::LeftKnee, LandmarkName::RightKnee),
            Joint::Hip => frame.position(LandmarkName::Hip),
            Joint::Spine => frame.position(LandmarkName::SpineMid),
            Joint::Shoulder => frame.position(LandmarkName::Shoulder),
            Joint::Elbow => pair(LandmarkName::LeftElbow, LandmarkName::RightElbow),
            Joint::Ankle => pair(LandmarkName::LeftAnkle, LandmarkName::RightAnkle),
            Joint::Wrist => pair(LandmarkName::LeftWrist, LandmarkName::RightWrist),
        }
    }

    /// Centre of mass from segment-mass ratios, or the landmark mean when segments are incomplete
    #[must_use]
    pub fn center_of_mass(frame: &LandmarkFrame) -> (Option<Point3>, CenterOfMassMethod) {
        if let Some(com) = Self::segment_center_of_mass(frame) {
            return (Some(com), CenterOfMassMethod::SegmentModel);
        }
        let points: Vec<Point3> = frame
            .iter()
            .filter(|(name, _)| !name.is_derived())
            .map(|(_, landmark)| landmark.position())
            .collect();
        if points.is_empty() {
            return (None, CenterOfMassMethod::GeometricMean);
        }
        let sum = points
            .iter()
            .fold(Point3::default(), |acc, point| acc + *point);
        (
            Some(sum * (1.0 / points.len() as f64)),
            CenterOfMassMethod::GeometricMean,
        )
    }

    fn segment_center_of_mass(frame: &LandmarkFrame) -> Option<Point3> {
        use LandmarkName as L;
        let p = |name: L| frame.position(name);
        let along = |from: Point3, to: Point3, fraction: f64| from.lerp(to, fraction);

        let mut weighted = vec![
            (p(L::Nose)?, segments::HEAD_MASS_FRACTION),
            (
                along(p(L::Shoulder)?, p(L::Hip)?, segments::TRUNK_COM),
                segments::TRUNK_MASS_FRACTION,
            ),
        ];
        let sides = [
            (
                L::LeftShoulder,
                L::LeftElbow,
                L::LeftWrist,
                L::LeftIndex,
                L::LeftHip,
                L::LeftKnee,
                L::LeftAnkle,
                L::LeftFootIndex,
            ),
            (
                L::RightShoulder,
                L::RightElbow,
                L::RightWrist,
                L::RightIndex,
                L::RightHip,
                L::RightKnee,
                L::RightAnkle,
                L::RightFootIndex,
            ),
        ];
        for (shoulder, elbow, wrist, index, hip, knee, ankle, toe) in sides {
            let wrist_p = p(wrist)?;
            let ankle_p = p(ankle)?;
            weighted.extend([
                (
                    along(p(shoulder)?, p(elbow)?, segments::UPPER_ARM_COM),
                    segments::UPPER_ARM_MASS_FRACTION,
                ),
                (
                    along(p(elbow)?, wrist_p, segments::FOREARM_COM),
                    segments::FOREARM_MASS_FRACTION,
                ),
                (
                    p(index).map_or(wrist_p, |i| wrist_p.midpoint(i)),
                    segments::HAND_MASS_FRACTION,
                ),
                (
                    along(p(hip)?, p(knee)?, segments::THIGH_COM),
                    segments::THIGH_MASS_FRACTION,
                ),
                (
                    along(p(knee)?, ankle_p, segments::SHANK_COM),
                    segments::SHANK_MASS_FRACTION,
                ),
                (
                    p(toe).map_or(ankle_p, |t| ankle_p.midpoint(t)),
                    segments::FOOT_MASS_FRACTION,
                ),
            ]);
        }
        let total_mass: f64 = weighted.iter().map(|(_, m)| m).sum();
        let sum = weighted
            .iter()
            .fold(Point3::default(), |acc, (point, mass)| acc + *point * *mass);
        Some(sum * (1.0 / total_mass))
    }

    /// Lean-based allocation of supported weight
    ///
    /// The spine fraction grows linearly with trunk lean up to a cap; the rest
    /// is split between knees and hips in proportion to their flexion.
    #[must_use]
    pub fn force_distribution(
        &self,
        angles: &JointAngleSet,
        user: &UserProfile,
    ) -> ForceDistribution {
        let g = self.config.gravity_m_s2;
        let total_newtons = user.total_supported_mass_kg() * g;
        let lean = angles.get(Joint::Spine).unwrap_or(0.0).clamp(0.0, 90.0);
        let spine_fraction = self
            .config
            .spine_lean_gain
            .mul_add(lean / 90.0, self.config.spine_base_fraction)
            .min(self.config.spine_max_fraction);
        let remainder = total_newtons * (1.0 - spine_fraction);
        let knee_flexion = 180.0 - angles.get(Joint::Knee).unwrap_or(180.0);
        let hip_flexion = 180.0 - angles.get(Joint::Hip).unwrap_or(180.0);
        let flexion = knee_flexion + hip_flexion;
        let knee_share = if flexion > 0.0 { knee_flexion / flexion } else { 0.5 };
        ForceDistribution {
            total_newtons,
            spine_fraction,
            spine_newtons: total_newtons * spine_fraction,
            knee_newtons: remainder * knee_share,
            hip_newtons: remainder * (1.0 - knee_share),
            arm_newtons: user.external_load_kg * g,
        }
    }

    /// Centre-of-mass trajectory relative to the ankle midpoint
    #[must_use]
    pub fn relative_com_trajectory(window: &[PoseFrame]) -> Vec<(f64, Point3)> {
        window
            .iter()
            .filter_map(|frame| {
                let com = Self::center_of_mass(&frame.landmarks).0?;
                let base = Self::joint_center(&frame.landmarks, Joint::Ankle).unwrap_or_default();
                Some((frame.timestamp, com - base))
            })
            .collect()
    }

    /// Efficiency `1 / (1 + mean acceleration)` of the centre of mass, in metres
    ///
    /// Two frames are treated as motion from rest. Velocity is smoothed before
    /// differencing again so landmark jitter does not dominate.
    #[must_use]
    pub fn energy_efficiency(window: &[PoseFrame], height_cm: f64) -> Estimate {
        let trajectory = Self::relative_com_trajectory(window);
        if trajectory.len() < 2 {
            return Estimate::InsufficientData;
        }
        let scale = height_cm / CM_PER_M;
        let times: Vec<f64> = trajectory.iter().map(|(t, _)| *t).collect();

        let mean_acceleration = if trajectory.len() == 2 {
            let dt = times[1] - times[0];
            if dt <= 0.0 {
                return Estimate::InsufficientData;
            }
            trajectory[1].1.distance(trajectory[0].1) / (dt * dt)
        } else {
            let axis = |f: fn(&Point3) -> f64| -> Vec<f64> {
                let positions: Vec<f64> = trajectory.iter().map(|(_, p)| f(p)).collect();
                let velocity = centered_moving_average(&central_difference(&positions, &times), 5);
                central_difference(&velocity, &times)
            };
            let ax = axis(|p| p.x);
            let ay = axis(|p| p.y);
            let az = axis(|p| p.z);
            let magnitudes: Vec<f64> = (0..ax.len())
                .map(|i| Point3::new(ax[i], ay[i], az[i]).norm())
                .collect();
            statistics::mean(&magnitudes)
        };
        Estimate::score(1.0 / (1.0 + mean_acceleration * scale))
    }
}
