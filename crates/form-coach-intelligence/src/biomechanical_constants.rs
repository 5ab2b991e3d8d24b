// ABOUTME: Biomechanical constant tables for segments, joint ranges, exercises, and muscles
// ABOUTME: Literature-approximate heuristics kept as data so they can be tuned and tested
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Biomechanical constants based on anthropometry and strength-training literature
//!
//! These tables feed heuristic models. They are literature-approximate values,
//! not exact biomechanical truth: the force distribution, activation curves and
//! centre-of-mass estimates built on them reproduce qualitative behaviour only.

use form_coach_core::models::{ExerciseType, Joint, MuscleGroup, TrainingGoal};

/// Body-segment mass fractions and centre-of-mass locations
///
/// References:
/// - Dempster, W.T. (1955). Space requirements of the seated operator. WADC-TR-55-159
/// - Winter, D.A. (2009). Biomechanics and Motor Control of Human Movement, 4th Edition, Table 4.1
pub mod segments {
    /// Head and neck mass fraction
    pub const HEAD_MASS_FRACTION: f64 = 0.08;
    /// Trunk mass fraction
    pub const TRUNK_MASS_FRACTION: f64 = 0.497;
    /// Upper arm mass fraction (each side)
    pub const UPPER_ARM_MASS_FRACTION: f64 = 0.028;
    /// Forearm mass fraction (each side)
    pub const FOREARM_MASS_FRACTION: f64 = 0.016;
    /// Hand mass fraction (each side)
    pub const HAND_MASS_FRACTION: f64 = 0.006;
    /// Thigh mass fraction (each side)
    pub const THIGH_MASS_FRACTION: f64 = 0.100;
    /// Shank mass fraction (each side)
    pub const SHANK_MASS_FRACTION: f64 = 0.0465;
    /// Foot mass fraction (each side)
    pub const FOOT_MASS_FRACTION: f64 = 0.0145;

    /// Upper arm centre of mass, fraction from shoulder to elbow
    pub const UPPER_ARM_COM: f64 = 0.436;
    /// Forearm centre of mass, fraction from elbow to wrist
    pub const FOREARM_COM: f64 = 0.430;
    /// Thigh centre of mass, fraction from hip to knee
    pub const THIGH_COM: f64 = 0.433;
    /// Shank centre of mass, fraction from knee to ankle
    pub const SHANK_COM: f64 = 0.433;
    /// Trunk centre of mass, fraction from shoulder midpoint to hip midpoint
    pub const TRUNK_COM: f64 = 0.5;
}

/// Segment lengths as fractions of standing height
///
/// Reference: Drillis, R. & Contini, R. (1966). Body segment parameters. Technical Report 1166-03,
/// New York University School of Engineering and Science
pub mod segment_lengths {
    /// Ankle to knee
    pub const SHANK: f64 = 0.246;
    /// Knee to hip
    pub const THIGH: f64 = 0.245;
    /// Hip to shoulder
    pub const TRUNK: f64 = 0.288;
}

/// Physiological range of motion for a joint, in degrees
///
/// Reference: Norkin, C.C. & White, D.J. (2016). Measurement of Joint Motion, 5th Edition
#[must_use]
pub const fn joint_range(joint: Joint) -> (f64, f64) {
    match joint {
        Joint::Knee => (40.0, 180.0),
        Joint::Hip => (45.0, 180.0),
        Joint::Elbow => (30.0, 180.0),
        Joint::Spine => (0.0, 90.0),
        Joint::Ankle => (60.0, 130.0),
        Joint::Shoulder => (0.0, 180.0),
        Joint::Wrist => (130.0, 180.0),
    }
}

/// Force-optimal joint angles at the working position of each exercise
#[must_use]
pub const fn optimal_angles(exercise: ExerciseType) -> &'static [(Joint, f64)] {
    match exercise {
        ExerciseType::Squat => &[
            (Joint::Knee, 90.0),
            (Joint::Hip, 90.0),
            (Joint::Spine, 30.0),
            (Joint::Ankle, 70.0),
        ],
        ExerciseType::Deadlift => &[
            (Joint::Knee, 130.0),
            (Joint::Hip, 90.0),
            (Joint::Spine, 40.0),
            (Joint::Ankle, 80.0),
        ],
        ExerciseType::BenchPress => &[
            (Joint::Elbow, 90.0),
            (Joint::Shoulder, 75.0),
            (Joint::Wrist, 175.0),
        ],
        ExerciseType::OverheadPress => &[
            (Joint::Elbow, 110.0),
            (Joint::Shoulder, 150.0),
            (Joint::Wrist, 175.0),
            (Joint::Spine, 5.0),
        ],
        ExerciseType::Lunge => &[
            (Joint::Knee, 90.0),
            (Joint::Hip, 100.0),
            (Joint::Spine, 10.0),
            (Joint::Ankle, 80.0),
        ],
    }
}

/// Metabolically neutral joint angles for each exercise
///
/// Close to the force-optimal angles so an ideal form is not penalized
/// heavily on energy cost.
#[must_use]
pub const fn neutral_angles(exercise: ExerciseType) -> &'static [(Joint, f64)] {
    match exercise {
        ExerciseType::Squat => &[
            (Joint::Knee, 100.0),
            (Joint::Hip, 100.0),
            (Joint::Spine, 25.0),
            (Joint::Ankle, 75.0),
        ],
        ExerciseType::Deadlift => &[
            (Joint::Knee, 140.0),
            (Joint::Hip, 100.0),
            (Joint::Spine, 35.0),
            (Joint::Ankle, 85.0),
        ],
        ExerciseType::BenchPress => &[
            (Joint::Elbow, 100.0),
            (Joint::Shoulder, 70.0),
            (Joint::Wrist, 170.0),
        ],
        ExerciseType::OverheadPress => &[
            (Joint::Elbow, 120.0),
            (Joint::Shoulder, 140.0),
            (Joint::Wrist, 170.0),
            (Joint::Spine, 5.0),
        ],
        ExerciseType::Lunge => &[
            (Joint::Knee, 100.0),
            (Joint::Hip, 110.0),
            (Joint::Spine, 10.0),
            (Joint::Ankle, 85.0),
        ],
    }
}

/// Look up a joint in an angle table
#[must_use]
pub fn table_angle(table: &[(Joint, f64)], joint: Joint) -> Option<f64> {
    table
        .iter()
        .find(|(candidate, _)| *candidate == joint)
        .map(|(_, angle)| *angle)
}

/// Joint angles at which each muscle group produces peak activation
///
/// Reference: Escamilla, R.F. (2001). Knee biomechanics of the dynamic squat exercise.
/// *Med Sci Sports Exerc*, 33(1), 127-141; length-tension peaks elsewhere are approximate.
#[must_use]
pub const fn muscle_peak_angles(muscle: MuscleGroup) -> &'static [(Joint, f64)] {
    match muscle {
        MuscleGroup::Quadriceps => &[(Joint::Knee, 90.0)],
        MuscleGroup::Glutes => &[(Joint::Hip, 80.0)],
        MuscleGroup::Hamstrings => &[(Joint::Hip, 90.0), (Joint::Knee, 150.0)],
        MuscleGroup::ErectorSpinae => &[(Joint::Spine, 35.0)],
        MuscleGroup::Calves => &[(Joint::Ankle, 80.0)],
        MuscleGroup::Core => &[(Joint::Spine, 20.0)],
        MuscleGroup::Pectorals => &[(Joint::Shoulder, 80.0), (Joint::Elbow, 90.0)],
        MuscleGroup::Triceps => &[(Joint::Elbow, 110.0)],
        MuscleGroup::Deltoids => &[(Joint::Shoulder, 120.0)],
        MuscleGroup::Lats => &[(Joint::Shoulder, 60.0)],
    }
}

/// Muscle groups scored for each exercise
#[must_use]
pub const fn exercise_muscles(exercise: ExerciseType) -> &'static [MuscleGroup] {
    match exercise {
        ExerciseType::Squat => &[
            MuscleGroup::Quadriceps,
            MuscleGroup::Glutes,
            MuscleGroup::Hamstrings,
            MuscleGroup::ErectorSpinae,
            MuscleGroup::Core,
            MuscleGroup::Calves,
        ],
        ExerciseType::Deadlift => &[
            MuscleGroup::Hamstrings,
            MuscleGroup::Glutes,
            MuscleGroup::ErectorSpinae,
            MuscleGroup::Quadriceps,
            MuscleGroup::Lats,
            MuscleGroup::Core,
        ],
        ExerciseType::BenchPress => &[
            MuscleGroup::Pectorals,
            MuscleGroup::Triceps,
            MuscleGroup::Deltoids,
        ],
        ExerciseType::OverheadPress => &[
            MuscleGroup::Deltoids,
            MuscleGroup::Triceps,
            MuscleGroup::Core,
        ],
        ExerciseType::Lunge => &[
            MuscleGroup::Quadriceps,
            MuscleGroup::Glutes,
            MuscleGroup::Hamstrings,
            MuscleGroup::Calves,
            MuscleGroup::Core,
        ],
    }
}

/// Relative importance of correcting each joint
#[must_use]
pub const fn joint_importance(joint: Joint) -> f64 {
    match joint {
        Joint::Spine => 1.5,
        Joint::Knee | Joint::Hip => 1.2,
        Joint::Shoulder => 1.0,
        Joint::Elbow => 0.8,
        Joint::Ankle => 0.7,
        Joint::Wrist => 0.5,
    }
}

/// Importance multiplier a training goal applies to a joint
#[must_use]
pub const fn goal_importance_multiplier(goal: TrainingGoal, joint: Joint) -> f64 {
    match (goal, joint) {
        (TrainingGoal::Strength, Joint::Spine | Joint::Knee | Joint::Hip)
        | (TrainingGoal::Hypertrophy, Joint::Elbow | Joint::Shoulder) => 1.2,
        (TrainingGoal::Endurance, Joint::Ankle | Joint::Wrist) => 1.1,
        _ => 1.0,
    }
}

/// Knee angle band that counts as a stable moderate bend (degrees)
pub const MODERATE_KNEE_BEND: (f64, f64) = (70.0, 160.0);

/// Spine lean tolerated by the stability objective when an exercise has no limit
pub const DEFAULT_SPINE_COMFORT: f64 = 45.0;
