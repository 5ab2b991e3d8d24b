// ABOUTME: Integration tests for the form optimization engine, priorities and progression paths
// ABOUTME: Covers the solver chain, goal reweighting, limited joints and the no-regression guarantee
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use form_coach::core::errors::ErrorCode;
use form_coach::core::models::{
    ExerciseType, Joint, JointAngleSet, SolverOutcome, TrainingGoal, UserProfile,
};
use form_coach::intelligence::config::OptimizationConfig;
use form_coach::intelligence::optimization::{
    goal_weights, personalized_path, FormProblem, OptimizationEngine,
};

use common::{test_user, SQUAT};

fn squat_angles(knee: f64, hip: f64, spine: f64, ankle: f64) -> JointAngleSet {
    JointAngleSet::new()
        .with(Joint::Knee, knee)
        .with(Joint::Hip, hip)
        .with(Joint::Spine, spine)
        .with(Joint::Ankle, ankle)
}

// ============================================================================
// Solver chain
// ============================================================================

#[test]
fn test_optimal_squat_needs_no_correction() {
    common::init_test_logging();
    let current = squat_angles(90.0, 90.0, 30.0, 70.0);
    let report = OptimizationEngine::default()
        .optimize(&current, &test_user(), SQUAT)
        .unwrap();

    assert!(report.improvement_priorities.is_empty());
    assert!(report.current_score > 0.998, "score {}", report.current_score);
    assert!(report.optimal_form.overall_score >= report.current_score);
    assert!(report.optimal_form.all_constraints_satisfied());
}

#[test]
fn test_optimization_never_scores_below_current() {
    let engine = OptimizationEngine::default();
    let user = test_user();
    let cases = [
        squat_angles(150.0, 160.0, 10.0, 90.0),
        squat_angles(60.0, 70.0, 50.0, 65.0),
        squat_angles(100.0, 95.0, 35.0, 75.0),
    ];

    for current in &cases {
        let report = engine.optimize(current, &user, SQUAT).unwrap();
        let form = &report.optimal_form;
        if form.solver != SolverOutcome::Fallback {
            assert!(
                form.overall_score >= report.current_score - 1e-12,
                "{:?} regressed from {} to {}",
                form.solver,
                report.current_score,
                form.overall_score
            );
        }
        assert!((0.0..=1.0).contains(&form.overall_score));
    }
}

#[test]
fn test_poor_form_is_improved_toward_table() {
    let current = squat_angles(150.0, 160.0, 10.0, 90.0);
    let form = OptimizationEngine::default()
        .solve(&current, &test_user(), SQUAT)
        .unwrap();

    assert!(matches!(form.solver, SolverOutcome::Local | SolverOutcome::Global));
    let knee = form.joint_angles.get(Joint::Knee).unwrap();
    assert!(knee < 150.0, "knee target {knee}");
}

#[test]
fn test_exhausted_solvers_fall_back_to_current_angles() {
    let engine = OptimizationEngine::new(OptimizationConfig {
        local_max_iterations: 1,
        local_tolerance: 0.0,
        time_budget_ms: 0,
        ..OptimizationConfig::default()
    });
    let current = squat_angles(150.0, 160.0, 10.0, 90.0);
    let form = engine.solve(&current, &test_user(), SQUAT).unwrap();

    assert_eq!(form.solver, SolverOutcome::Fallback);
    assert!((form.overall_score - 0.5).abs() < 1e-12);
    assert_eq!(form.joint_angles, current);
}

#[test]
fn test_irrelevant_joints_are_rejected() {
    let knee_only = JointAngleSet::new().with(Joint::Knee, 120.0);
    let err = OptimizationEngine::default()
        .solve(&knee_only, &test_user(), ExerciseType::BenchPress)
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::InvalidInput);
}

#[test]
fn test_invalid_profile_is_rejected_before_solving() {
    let err = OptimizationEngine::default()
        .solve(
            &squat_angles(90.0, 90.0, 30.0, 70.0),
            &UserProfile::new(178.0, -1.0),
            SQUAT,
        )
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::ValueOutOfRange);
}

// ============================================================================
// Problem construction
// ============================================================================

#[test]
fn test_limited_joint_bounds_are_narrowed() {
    let config = OptimizationConfig::default();
    let current = squat_angles(100.0, 100.0, 30.0, 75.0);
    let limited = test_user().with_limitation(Joint::Knee);
    let problem = FormProblem::new(&current, &limited, SQUAT, &config).unwrap();

    let knee = problem
        .joints()
        .iter()
        .position(|joint| *joint == Joint::Knee)
        .unwrap();
    let (lo, hi) = problem.bounds()[knee];
    assert!((lo - 54.0).abs() < 1e-9);
    assert!((hi - 166.0).abs() < 1e-9);

    let hip = problem
        .joints()
        .iter()
        .position(|joint| *joint == Joint::Hip)
        .unwrap();
    assert_eq!(problem.bounds()[hip], (45.0, 180.0));
}

#[test]
fn test_strength_goal_raises_force_weight() {
    let config = OptimizationConfig::default();
    let base = goal_weights(&config, &test_user());
    let strength = goal_weights(&config, &test_user().with_goal(TrainingGoal::Strength));

    assert!((base.force_production - 0.30).abs() < 1e-12);
    assert!((strength.force_production - 0.45 / 1.15).abs() < 1e-12);
    assert!((strength.total() - 1.0).abs() < 1e-12);
    assert!(strength.energy_efficiency < base.energy_efficiency);
}

#[test]
fn test_objective_scores_are_normalized() {
    let config = OptimizationConfig::default();
    let current = squat_angles(45.0, 50.0, 85.0, 125.0);
    let problem = FormProblem::new(&current, &test_user(), SQUAT, &config).unwrap();
    let scores = problem.objective_scores(problem.current());

    for cost in [
        scores.energy_efficiency,
        scores.joint_stress,
        scores.force_production,
        scores.stability,
    ] {
        assert!((0.0..=1.0).contains(&cost));
    }
    assert!(!problem.constraints().is_feasible(problem.current()));
}

// ============================================================================
// Improvement priorities
// ============================================================================

#[test]
fn test_priorities_rank_weighted_differences() {
    let engine = OptimizationEngine::default();
    let current = squat_angles(120.0, 100.0, 33.0, 80.0).with(Joint::Elbow, 150.0);
    let optimal = squat_angles(90.0, 90.0, 30.0, 70.0);

    let priorities = engine.improvement_priorities(&current, &optimal, &test_user());
    let joints: Vec<Joint> = priorities.iter().map(|p| p.joint).collect();

    assert_eq!(joints, vec![Joint::Knee, Joint::Hip, Joint::Ankle]);
    assert!((priorities[0].difference + 30.0).abs() < 1e-12);
    assert!((priorities[0].priority - 36.0).abs() < 1e-9);
}

#[test]
fn test_priorities_are_capped_and_exceed_tolerance() {
    let engine = OptimizationEngine::default();
    let current = squat_angles(150.0, 160.0, 5.0, 100.0);
    let optimal = squat_angles(90.0, 90.0, 30.0, 70.0);

    let priorities = engine.improvement_priorities(&current, &optimal, &test_user());
    assert_eq!(priorities.len(), 3);
    for pair in priorities.windows(2) {
        assert!(pair[0].priority >= pair[1].priority);
    }
    assert!(priorities.iter().all(|p| p.difference.abs() > 5.0));
}

#[test]
fn test_strength_goal_reorders_priorities() {
    let engine = OptimizationEngine::default();
    // Ankle outweighs knee until strength boosts the knee
    let current = JointAngleSet::new()
        .with(Joint::Knee, 101.0)
        .with(Joint::Ankle, 90.0);
    let optimal = JointAngleSet::new()
        .with(Joint::Knee, 90.0)
        .with(Joint::Ankle, 70.0);

    let plain = engine.improvement_priorities(&current, &optimal, &test_user());
    let joints: Vec<Joint> = plain.iter().map(|p| p.joint).collect();
    assert_eq!(joints, vec![Joint::Ankle, Joint::Knee]);

    let strong = engine.improvement_priorities(
        &current,
        &optimal,
        &test_user().with_goal(TrainingGoal::Strength),
    );
    let joints: Vec<Joint> = strong.iter().map(|p| p.joint).collect();
    assert_eq!(joints, vec![Joint::Knee, Joint::Ankle]);
    assert!((strong[0].priority - 11.0 * 1.44).abs() < 1e-9);
    assert!((strong[1].priority - 14.0).abs() < 1e-9);
}

// ============================================================================
// Progression path
// ============================================================================

#[test]
fn test_path_follows_an_s_curve() {
    let current = squat_angles(150.0, 160.0, 10.0, 90.0).with(Joint::Elbow, 170.0);
    let optimal = squat_angles(90.0, 90.0, 30.0, 70.0);
    let path = personalized_path(&current, &optimal, 10).unwrap();

    assert_eq!(path.len(), 11);
    assert_eq!(path[0], current);

    let knee_at = |k: usize| path[k].get(Joint::Knee).unwrap();
    assert!((knee_at(10) - 90.0).abs() < 1e-9);
    let first_fraction = (150.0 - knee_at(1)) / 60.0;
    assert!(first_fraction < 0.1, "first step fraction {first_fraction}");
    assert!((knee_at(5) - 120.0).abs() < 1e-9);
    for k in 1..path.len() {
        assert!(knee_at(k) <= knee_at(k - 1));
    }

    // Joints without a target keep their current angle
    assert!(path.iter().all(|step| step.get(Joint::Elbow) == Some(170.0)));
}

#[test]
fn test_path_needs_a_step() {
    let angles = squat_angles(90.0, 90.0, 30.0, 70.0);
    let err = personalized_path(&angles, &angles, 0).unwrap_err();

    assert_eq!(err.code, ErrorCode::InvalidInput);
}

#[test]
fn test_report_path_uses_configured_steps() {
    let engine = OptimizationEngine::new(OptimizationConfig {
        path_steps: 4,
        ..OptimizationConfig::default()
    });
    let current = squat_angles(120.0, 110.0, 20.0, 80.0);
    let report = engine.optimize(&current, &test_user(), SQUAT).unwrap();

    assert_eq!(report.path.len(), 5);
    assert_eq!(report.path[0], current);
    assert!(report.improvement_priorities.len() <= 3);
}
