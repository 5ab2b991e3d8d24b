// ABOUTME: Integration tests for muscle activation, movement quality, coordination and compensations
// ABOUTME: Builds windows from synthetic squats and deliberately faulty poses
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use form_coach::core::models::{
    Estimate, ExerciseType, Landmark, LandmarkFrame, LandmarkName, MuscleGroup, PhaseTimeline,
    PoseFrame, PoseSequence,
};
use form_coach::intelligence::{
    BiomechanicsAnalyzer, BiomechanicsResult, Compensation, LandmarkPreprocessor, PhaseDetector,
    PhysicsAnalyzer, SyntheticPoseGenerator,
};

use common::{bottom_frame, sequence_of, standing_frame, test_user, with_landmark, without};

/// Run physics then biomechanics on the last frame of `window`
fn analyze_window(
    window: &[PoseFrame],
    exercise: ExerciseType,
    timeline: &PhaseTimeline,
) -> BiomechanicsResult {
    let physics = PhysicsAnalyzer::default()
        .analyze_window(window, &test_user(), None)
        .unwrap();
    BiomechanicsAnalyzer::default().analyze(
        window,
        &physics.joint_angles,
        &physics.force_distribution,
        exercise,
        timeline,
    )
}

fn analyze_frame(frame: LandmarkFrame, exercise: ExerciseType) -> BiomechanicsResult {
    let sequence = sequence_of(vec![frame]);
    analyze_window(sequence.frames(), exercise, &PhaseTimeline::default())
}

fn clean_squat(reps: usize) -> (PoseSequence, PhaseTimeline) {
    let sequence = LandmarkPreprocessor::default()
        .preprocess(&common::squat_reps(13, reps))
        .unwrap();
    let timeline = PhaseDetector::default().detect(&sequence, ExerciseType::Squat);
    (sequence, timeline)
}

// ============================================================================
// Muscle activation
// ============================================================================

#[test]
fn test_quadriceps_peak_at_parallel_depth() {
    let bottom = analyze_frame(bottom_frame(), ExerciseType::Squat);
    let standing = analyze_frame(standing_frame(), ExerciseType::Squat);

    let quads_bottom = bottom.muscle_activation[&MuscleGroup::Quadriceps];
    let quads_standing = standing.muscle_activation[&MuscleGroup::Quadriceps];
    assert!(quads_bottom > 0.9, "bottom activation {quads_bottom}");
    assert!(quads_standing < 0.1, "standing activation {quads_standing}");
}

#[test]
fn test_only_exercise_muscles_are_scored() {
    let result = analyze_frame(bottom_frame(), ExerciseType::Squat);

    assert!(result.muscle_activation.contains_key(&MuscleGroup::Glutes));
    assert!(!result.muscle_activation.contains_key(&MuscleGroup::Pectorals));
    for activation in result.muscle_activation.values() {
        assert!((0.0..=1.0).contains(activation));
    }
}

#[test]
fn test_muscle_without_measured_joint_is_omitted() {
    let frame = without(
        &bottom_frame(),
        &[LandmarkName::LeftFootIndex, LandmarkName::RightFootIndex],
    );
    let result = analyze_frame(frame, ExerciseType::Squat);

    assert!(!result.muscle_activation.contains_key(&MuscleGroup::Calves));
    assert!(result.muscle_activation.contains_key(&MuscleGroup::Quadriceps));
}

// ============================================================================
// Movement quality
// ============================================================================

#[test]
fn test_short_window_reports_insufficient_quality() {
    let result = analyze_frame(bottom_frame(), ExerciseType::Squat);
    let quality = result.movement_quality;

    assert_eq!(quality.overall(), Estimate::InsufficientData);
    assert!(quality.has_gaps());
    assert_eq!(quality.range_of_motion, Estimate::InsufficientData);
    let optimality = result.biological_optimality();
    assert!((0.0..=1.0).contains(&optimality));
}

#[test]
fn test_full_repetition_covers_expected_range() {
    let (sequence, timeline) = clean_squat(1);
    let result = analyze_window(sequence.frames(), ExerciseType::Squat, &timeline);
    let quality = result.movement_quality;

    assert!(quality.range_of_motion.value().unwrap() > 0.95);
    assert!(quality.smoothness.is_measured());
    assert!(quality.stability.is_measured());
    assert!(quality.symmetry.value().unwrap() > 0.95);
}

#[test]
fn test_still_window_has_no_range_of_motion() {
    let still = SyntheticPoseGenerator::new(3)
        .with_noise(0.0)
        .standing_sequence(20)
        .unwrap();
    let result = analyze_window(still.frames(), ExerciseType::Squat, &PhaseTimeline::default());

    assert!(result.movement_quality.range_of_motion.value().unwrap() < 1e-6);
    assert!(result.movement_quality.stability.value().unwrap() > 0.99);
}

#[test]
fn test_stability_is_not_scored_for_bench_press() {
    let still = common::standing_hold(3, 20);
    let result = analyze_window(
        still.frames(),
        ExerciseType::BenchPress,
        &PhaseTimeline::default(),
    );

    assert_eq!(result.movement_quality.stability, Estimate::InsufficientData);
    assert!(result.movement_quality.overall().is_measured());
}

#[test]
fn test_tempo_consistency_needs_completed_phases() {
    let (sequence, timeline) = clean_squat(3);
    let full = analyze_window(sequence.frames(), ExerciseType::Squat, &timeline);
    assert!(full.movement_quality.tempo_consistency.is_measured());

    let early = 10;
    let window = &sequence.frames()[..=early];
    let partial = analyze_window(window, ExerciseType::Squat, &timeline.up_to(early));
    assert_eq!(
        partial.movement_quality.tempo_consistency,
        Estimate::InsufficientData
    );
}

// ============================================================================
// Compensations and coordination
// ============================================================================

#[test]
fn test_clean_bottom_has_no_compensations() {
    let result = analyze_frame(bottom_frame(), ExerciseType::Squat);

    assert!(result.compensations.is_empty());
    assert!((result.coordination_score - 1.0).abs() < 1e-12);
}

#[test]
fn test_excessive_lean_is_flagged_and_penalized() {
    let leaning = SyntheticPoseGenerator::new(1)
        .with_bottom_trunk_lean(70.0)
        .bottom_frame();
    let result = analyze_frame(leaning, ExerciseType::Squat);

    let Some(Compensation::ExcessiveSpineLean { angle, limit }) = result.compensations.first()
    else {
        panic!("expected a spine lean compensation, got {:?}", result.compensations);
    };
    assert!((angle - 70.0).abs() < 1e-6);
    assert!((limit - 45.0).abs() < 1e-12);
    assert!(result.coordination_score <= 0.8 + 1e-12);
}

#[test]
fn test_knee_cave_is_flagged() {
    let bottom = bottom_frame();
    let knee = bottom.position(LandmarkName::LeftKnee).unwrap();
    let caved = with_landmark(
        &bottom,
        LandmarkName::LeftKnee,
        Landmark::new(knee.x + 0.05, knee.y, knee.z, 0.95),
    );
    let result = analyze_frame(caved, ExerciseType::Squat);

    assert!(result
        .compensations
        .iter()
        .any(|c| matches!(c, Compensation::KneeMisalignment { deviation } if *deviation > 10.0)));
}

#[test]
fn test_uneven_knees_are_flagged_as_asymmetry() {
    let bottom = bottom_frame();
    let hip = bottom.position(LandmarkName::RightHip).unwrap();
    let ankle = bottom.position(LandmarkName::RightAnkle).unwrap();
    // Straight right leg against a 90 degree left knee
    let uneven = with_landmark(
        &bottom,
        LandmarkName::RightKnee,
        Landmark::new(
            (hip.x + ankle.x) / 2.0,
            (hip.y + ankle.y) / 2.0,
            (hip.z + ankle.z) / 2.0,
            0.95,
        ),
    );
    let result = analyze_frame(uneven, ExerciseType::Squat);

    let names: Vec<&str> = result.compensations.iter().map(Compensation::name).collect();
    assert_eq!(names, vec!["knee_asymmetry"]);
    assert!((result.coordination_score - 0.9).abs() < 1e-9);
}

#[test]
fn test_knee_checks_skip_seated_lifts() {
    let leaning = SyntheticPoseGenerator::new(1)
        .with_bottom_trunk_lean(70.0)
        .bottom_frame();
    let result = analyze_frame(leaning, ExerciseType::BenchPress);

    assert!(result.compensations.is_empty());
}
