// ABOUTME: Integration tests for phase-space attractors, variability, divergence and self-organization
// ABOUTME: Checks the insufficient-history guard and bounded stability scores
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use form_coach::core::models::{Estimate, ExerciseType};
use form_coach::intelligence::config::ComplexSystemsConfig;
use form_coach::intelligence::{ComplexSystemsAnalyzer, LandmarkPreprocessor, PracticeRecord};

use common::{standing_hold, SQUAT};

fn records(scores: &[f64], variability: &[f64]) -> Vec<PracticeRecord> {
    scores
        .iter()
        .zip(variability)
        .map(|(score, variability)| PracticeRecord {
            score: *score,
            variability: *variability,
        })
        .collect()
}

// ============================================================================
// History guard
// ============================================================================

#[test]
fn test_short_window_reports_insufficient_history() {
    let window = standing_hold(5, 9);
    let result = ComplexSystemsAnalyzer::default().analyze(window.frames(), SQUAT, &[]);

    assert!(!result.sufficient_history);
    assert_eq!(result.phase_space_dimensions, 0);
    assert!(result.attractors.is_empty());
    assert_eq!(result.system_stability(), Estimate::InsufficientData);
    assert!(result.lyapunov_exponent.is_none());
    assert!(result.self_organization.is_none());
}

#[test]
fn test_practice_history_is_read_even_without_window_history() {
    let window = standing_hold(5, 3);
    let practice = records(&[0.6, 0.62, 0.64, 0.66, 0.7], &[0.2, 0.18, 0.1, 0.08, 0.05]);
    let result = ComplexSystemsAnalyzer::default().analyze(window.frames(), SQUAT, &practice);

    assert!(!result.sufficient_history);
    assert!(result.self_organization.is_some());
}

#[test]
fn test_minimum_history_is_configurable() {
    let analyzer = ComplexSystemsAnalyzer::new(ComplexSystemsConfig {
        min_history_frames: 4,
        ..ComplexSystemsConfig::default()
    });
    let result = analyzer.analyze(standing_hold(5, 6).frames(), SQUAT, &[]);

    assert!(result.sufficient_history);
}

// ============================================================================
// Phase space
// ============================================================================

#[test]
fn test_small_window_keeps_full_phase_space() {
    // Below the sample count that triggers principal component reduction
    let window = standing_hold(8, 15);
    let result = ComplexSystemsAnalyzer::default().analyze(window.frames(), SQUAT, &[]);

    assert!(result.sufficient_history);
    assert_eq!(result.phase_space_dimensions, 66);
}

#[test]
fn test_squat_window_is_reduced_and_stable_score_bounded() {
    let sequence = LandmarkPreprocessor::default()
        .preprocess(&common::squat_reps(9, 1))
        .unwrap();
    let result = ComplexSystemsAnalyzer::default().analyze(&sequence.frames()[..100], SQUAT, &[]);

    assert!(result.sufficient_history);
    assert_eq!(result.phase_space_dimensions, 3);
    assert!(result.complexity.unwrap() >= 0.0);

    let stability = result.system_stability().value().unwrap();
    assert!((0.0..=1.0).contains(&stability));

    let optimal = result.attractors.iter().filter(|a| a.optimal_form).count();
    assert_eq!(optimal, usize::from(!result.attractors.is_empty()));
    let strength: f64 = result.attractors.iter().map(|a| a.strength).sum();
    assert!(strength <= 1.0 + 1e-9);
}

#[test]
fn test_two_dense_regions_form_two_attractors() {
    let mut points = vec![vec![0.0, 0.0]; 10];
    points.extend(vec![vec![5.0, 5.0]; 10]);
    let attractors = ComplexSystemsAnalyzer::default().attractors(&points);

    assert_eq!(attractors.len(), 2);
    for attractor in &attractors {
        assert!((attractor.strength - 0.5).abs() < 1e-12);
        assert!((attractor.stability - 1.0).abs() < 1e-12);
        assert!(attractor.basin_radius.abs() < 1e-12);
    }
    assert_eq!(attractors.iter().filter(|a| a.optimal_form).count(), 1);
}

#[test]
fn test_sparse_points_form_no_attractor() {
    let points: Vec<Vec<f64>> = (0..20).map(|i| vec![f64::from(i) * 10.0]).collect();
    let attractors = ComplexSystemsAnalyzer::default().attractors(&points);

    assert!(attractors.is_empty());
}

// ============================================================================
// Dynamics
// ============================================================================

#[test]
fn test_variability_peaks_at_target_level() {
    let analyzer = ComplexSystemsAnalyzer::default();
    let tracked: Vec<f64> = (0..20).map(|i| if i % 2 == 0 { 0.95 } else { 1.05 }).collect();
    let times: Vec<f64> = (0..20).map(|i| f64::from(i) / 30.0).collect();

    let metrics = analyzer.variability(&tracked, &times);
    assert!((metrics.coefficient_of_variation.unwrap() - 0.05).abs() < 1e-9);
    assert!((metrics.adaptive_variability.value().unwrap() - 1.0).abs() < 1e-9);
    assert!(metrics.harmful_instability.is_measured());

    let rigid = analyzer.variability(&[1.0; 20], &times);
    assert!(rigid.adaptive_variability.value().unwrap() < 0.7);
    assert!(rigid.harmful_instability.value().unwrap() < 1e-12);
}

#[test]
fn test_slow_signal_is_predictable() {
    let analyzer = ComplexSystemsAnalyzer::default();
    let slow: Vec<f64> = (0..90).map(|i| (f64::from(i) / 30.0).sin()).collect();

    assert!(analyzer.predictability(&slow).value().unwrap() > 0.8);
    assert_eq!(analyzer.predictability(&[1.0, 2.0]), Estimate::InsufficientData);
}

#[test]
fn test_divergence_needs_four_points() {
    let points = vec![vec![0.0], vec![1.0], vec![2.0]];
    let times = [0.0, 0.1, 0.2];

    assert!(ComplexSystemsAnalyzer::lyapunov_exponent(&points, &times).is_none());
}

#[test]
fn test_periodic_orbit_does_not_diverge() {
    let times: Vec<f64> = (0..120).map(|i| f64::from(i) / 30.0).collect();
    let points: Vec<Vec<f64>> = times
        .iter()
        .map(|t| vec![(t * 2.0).sin(), (t * 2.0).cos()])
        .collect();
    let lambda = ComplexSystemsAnalyzer::lyapunov_exponent(&points, &times).unwrap();

    assert!(lambda.abs() < 1.0, "periodic orbit exponent {lambda}");
}

// ============================================================================
// Self-organization
// ============================================================================

#[test]
fn test_self_organization_needs_five_records() {
    let analyzer = ComplexSystemsAnalyzer::default();
    let four = records(&[0.5; 4], &[0.1; 4]);

    assert!(analyzer.self_organization(&four).is_none());
}

#[test]
fn test_falling_variability_reduces_degrees_of_freedom() {
    let analyzer = ComplexSystemsAnalyzer::default();
    let practice = records(&[0.6; 6], &[0.4, 0.4, 0.4, 0.1, 0.1, 0.1]);
    let organization = analyzer.self_organization(&practice).unwrap();

    assert!((organization.degrees_of_freedom_reduction - 0.75).abs() < 1e-9);
    assert!(organization.emergence_score.abs() < 1e-12);
    assert!((organization.pattern_stability - 1.0 / 1.22).abs() < 1e-9);
}

#[test]
fn test_sudden_improvement_counts_as_emergence() {
    let analyzer = ComplexSystemsAnalyzer::default();
    let practice = records(
        &[0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.9],
        &[0.1; 9],
    );
    let organization = analyzer.self_organization(&practice).unwrap();

    assert!((organization.emergence_score - 1.0 / 3.0).abs() < 1e-9);
}

#[test]
fn test_press_tracks_wrist_signal() {
    let window = standing_hold(2, 30);
    let result =
        ComplexSystemsAnalyzer::default().analyze(window.frames(), ExerciseType::BenchPress, &[]);

    assert!(result.sufficient_history);
    assert!(result.variability.coefficient_of_variation.is_some());
}
