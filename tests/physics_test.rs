// ABOUTME: Integration tests for joint angles, centre of mass, load allocation and energy efficiency
// ABOUTME: Uses noise-free synthetic standing and bottom poses with known geometry
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use form_coach::core::errors::ErrorCode;
use form_coach::core::models::{
    Estimate, ExerciseType, Joint, JointAngleSet, Landmark, LandmarkFrame, LandmarkName, Point3,
    UserProfile,
};
use form_coach::intelligence::config::{MomentArmMode, PhysicsConfig};
use form_coach::intelligence::physics::CenterOfMassMethod;
use form_coach::intelligence::{PhysicsAnalyzer, SyntheticPoseGenerator};

use common::{bottom_frame, standing_frame, test_user, with_landmark, without};

fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() < tolerance,
        "expected {expected}, got {actual}"
    );
}

// ============================================================================
// Joint angles
// ============================================================================

#[test]
fn test_standing_pose_has_straight_knees_and_upright_trunk() {
    let angles = PhysicsAnalyzer::joint_angles(&standing_frame());

    assert_close(angles.get(Joint::Knee).unwrap(), 180.0, 1e-6);
    assert_close(angles.get(Joint::Spine).unwrap(), 0.0, 1e-6);
    assert!(angles.get(Joint::Hip).unwrap() > 170.0);
}

#[test]
fn test_bottom_pose_matches_generated_geometry() {
    let angles = PhysicsAnalyzer::joint_angles(&bottom_frame());

    assert_close(angles.get(Joint::Knee).unwrap(), 90.0, 1e-6);
    assert_close(angles.get(Joint::Spine).unwrap(), 30.0, 1e-6);
}

#[test]
fn test_every_angle_is_within_half_turn() {
    let generator = SyntheticPoseGenerator::new(5);
    for step in 0..=10 {
        let frame = generator.pose_at_depth(f64::from(step) / 10.0);
        for (joint, degrees) in PhysicsAnalyzer::joint_angles(&frame).iter() {
            assert!(
                (0.0..=180.0).contains(&degrees),
                "{joint:?} angle {degrees} out of range"
            );
        }
    }
}

#[test]
fn test_missing_elbows_omit_arm_joints() {
    let frame = without(
        &standing_frame(),
        &[LandmarkName::LeftElbow, LandmarkName::RightElbow],
    );
    let angles = PhysicsAnalyzer::joint_angles(&frame);

    assert!(!angles.contains(Joint::Elbow));
    assert!(!angles.contains(Joint::Shoulder));
    assert!(!angles.contains(Joint::Wrist));
    assert!(angles.contains(Joint::Knee));
    assert!(angles.contains(Joint::Spine));
}

#[test]
fn test_one_sided_joint_uses_remaining_side() {
    let frame = without(&bottom_frame(), &[LandmarkName::RightKnee]);
    let angles = PhysicsAnalyzer::joint_angles(&frame);

    assert_close(angles.get(Joint::Knee).unwrap(), 90.0, 1e-6);
    assert!(PhysicsAnalyzer::knee_angles(&frame).is_none());
}

#[test]
fn test_degenerate_triple_does_not_produce_nan() {
    let standing = standing_frame();
    let knee = standing.position(LandmarkName::LeftKnee).unwrap();
    let frame = with_landmark(&standing, LandmarkName::LeftHip, Landmark::visible_at(knee));
    let angle = PhysicsAnalyzer::triple_angle(
        &frame,
        (
            LandmarkName::LeftHip,
            LandmarkName::LeftKnee,
            LandmarkName::LeftAnkle,
        ),
    )
    .unwrap();

    assert!(angle.is_finite());
}

#[test]
fn test_frontal_knee_deviation_detects_collapse() {
    let bottom = bottom_frame();
    assert!(PhysicsAnalyzer::frontal_knee_deviation(&bottom).unwrap() < 1e-6);

    let knee = bottom.position(LandmarkName::LeftKnee).unwrap();
    let caved = with_landmark(
        &bottom,
        LandmarkName::LeftKnee,
        Landmark::visible_at(Point3::new(knee.x + 0.05, knee.y, knee.z)),
    );
    assert!(PhysicsAnalyzer::frontal_knee_deviation(&caved).unwrap() > 10.0);
}

// ============================================================================
// Centre of mass and moment arms
// ============================================================================

#[test]
fn test_full_frame_uses_segment_model() {
    let frame = standing_frame();
    let (com, method) = PhysicsAnalyzer::center_of_mass(&frame);
    let com = com.unwrap();

    assert_eq!(method, CenterOfMassMethod::SegmentModel);
    assert_close(com.x, 0.5, 1e-9);
    let shoulder_y = frame.position(LandmarkName::Shoulder).unwrap().y;
    let ankle_y = frame.position(LandmarkName::LeftAnkle).unwrap().y;
    assert!(com.y > shoulder_y && com.y < ankle_y);
}

#[test]
fn test_partial_frame_falls_back_to_landmark_mean() {
    let frame = LandmarkFrame::from_named([
        (LandmarkName::Nose, Landmark::new(0.0, 0.0, 0.0, 1.0)),
        (LandmarkName::LeftHip, Landmark::new(1.0, 2.0, 0.0, 1.0)),
    ]);
    let (com, method) = PhysicsAnalyzer::center_of_mass(&frame);
    let com = com.unwrap();

    assert_eq!(method, CenterOfMassMethod::GeometricMean);
    assert_close(com.x, 0.5, 1e-12);
    assert_close(com.y, 1.0, 1e-12);

    let (none, _) = PhysicsAnalyzer::center_of_mass(&LandmarkFrame::empty());
    assert!(none.is_none());
}

#[test]
fn test_moment_arms_need_a_load_position() {
    let analyzer = PhysicsAnalyzer::default();
    let user = test_user();
    let frame = standing_frame();

    let unloaded = analyzer.analyze(&frame, &user, None).unwrap();
    assert!(unloaded.moment_arms.is_empty());

    let hip = frame.position(LandmarkName::Hip).unwrap();
    let loaded = analyzer.analyze(&frame, &user, Some(hip)).unwrap();
    assert_close(loaded.moment_arms[&Joint::Hip], 0.0, 1e-12);
    assert!(loaded.moment_arms.contains_key(&Joint::Knee));
}

#[test]
fn test_moment_arms_scale_with_height() {
    let analyzer = PhysicsAnalyzer::new(PhysicsConfig {
        moment_arm_mode: MomentArmMode::Planar,
        ..PhysicsConfig::default()
    });
    let frame = standing_frame();
    let hip = frame.position(LandmarkName::Hip).unwrap();
    let load = Point3::new(hip.x + 0.1, hip.y, hip.z);

    let arms = analyzer.moment_arms(&frame, load, 200.0);
    assert_close(arms[&Joint::Hip], 0.2, 1e-9);
}

// ============================================================================
// Force distribution
// ============================================================================

#[test]
fn test_spine_share_grows_with_trunk_lean() {
    let analyzer = PhysicsAnalyzer::default();
    let user = test_user().with_external_load(60.0);

    let standing = analyzer.analyze(&standing_frame(), &user, None).unwrap();
    let bottom = analyzer.analyze(&bottom_frame(), &user, None).unwrap();

    assert!(bottom.force_distribution.spine_fraction > standing.force_distribution.spine_fraction);
    assert_close(standing.force_distribution.spine_fraction, 0.3, 1e-6);

    let forces = bottom.force_distribution;
    assert_close(forces.total_newtons, 140.0 * 9.81, 1e-9);
    assert_close(
        forces.spine_newtons + forces.knee_newtons + forces.hip_newtons,
        forces.total_newtons,
        1e-9,
    );
    assert_close(forces.arm_newtons, 60.0 * 9.81, 1e-9);
}

#[test]
fn test_spine_share_is_capped() {
    let analyzer = PhysicsAnalyzer::default();
    let angles = JointAngleSet::new().with(Joint::Spine, 150.0);
    let forces = analyzer.force_distribution(&angles, &test_user());

    assert!(forces.spine_fraction <= 0.8 + 1e-12);
}

#[test]
fn test_posture_score_penalizes_lean_beyond_limit() {
    let analyzer = PhysicsAnalyzer::default();
    let user = test_user();
    let deep_lean = SyntheticPoseGenerator::new(1)
        .with_bottom_trunk_lean(70.0)
        .bottom_frame();

    let ok = analyzer.analyze(&bottom_frame(), &user, None).unwrap();
    let leaning = analyzer.analyze(&deep_lean, &user, None).unwrap();

    assert_close(ok.posture_score(ExerciseType::Squat), 1.0, 1e-12);
    assert!(leaning.posture_score(ExerciseType::Squat) < 0.2);
    assert_close(leaning.posture_score(ExerciseType::BenchPress), 1.0, 1e-12);
}

#[test]
fn test_invalid_profile_is_rejected() {
    let err = PhysicsAnalyzer::default()
        .analyze(&standing_frame(), &UserProfile::new(0.0, 80.0), None)
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::ValueOutOfRange);
}

// ============================================================================
// Energy efficiency
// ============================================================================

#[test]
fn test_single_frame_efficiency_is_insufficient() {
    let result = PhysicsAnalyzer::default()
        .analyze(&standing_frame(), &test_user(), None)
        .unwrap();

    assert_eq!(result.energy_efficiency, Estimate::InsufficientData);
}

#[test]
fn test_still_window_is_fully_efficient() {
    let still = SyntheticPoseGenerator::new(2)
        .with_noise(0.0)
        .standing_sequence(20)
        .unwrap();
    let efficiency = PhysicsAnalyzer::energy_efficiency(still.frames(), 178.0);

    assert_close(efficiency.value().unwrap(), 1.0, 1e-9);
}

#[test]
fn test_squat_window_costs_efficiency() {
    let squat = common::squat_reps(4, 1);
    let result = PhysicsAnalyzer::default()
        .analyze_window(squat.frames(), &test_user(), None)
        .unwrap();
    let efficiency = result.energy_efficiency.value().unwrap();

    assert!((0.0..1.0).contains(&efficiency));
}

#[test]
fn test_empty_window_is_rejected() {
    let err = PhysicsAnalyzer::default()
        .analyze_window(&[], &test_user(), None)
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::InvalidInput);
}
