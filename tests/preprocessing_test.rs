// ABOUTME: Integration tests for landmark gap filling, smoothing and normalization
// ABOUTME: Covers interpolation of low-visibility points, constant fill and reference scaling
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use form_coach::core::errors::ErrorCode;
use form_coach::core::models::{Landmark, LandmarkName, Point3};
use form_coach::intelligence::algorithms::SmoothingFilter;
use form_coach::intelligence::config::{PreprocessingConfig, ReferenceDistance, SmoothingAlgorithm};
use form_coach::intelligence::LandmarkPreprocessor;

use common::{sequence_of, standing_frame, standing_hold, with_landmark, with_visibility, without};

/// Preprocessor that only gap-fills, so coordinates can be compared exactly
fn fill_only() -> LandmarkPreprocessor {
    LandmarkPreprocessor::new(PreprocessingConfig {
        smoothing: SmoothingAlgorithm::Disabled,
        normalize: false,
        ..PreprocessingConfig::default()
    })
}

fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() < tolerance,
        "expected {expected}, got {actual}"
    );
}

// ============================================================================
// Gap filling
// ============================================================================

#[test]
fn test_low_visibility_knee_is_interpolated_from_neighbors() {
    common::init_test_logging();
    let standing = standing_frame();
    let original = standing.position(LandmarkName::LeftKnee).unwrap();

    // Garbage coordinates with a confidence below the 0.5 threshold
    let occluded = with_landmark(
        &standing,
        LandmarkName::LeftKnee,
        Landmark::new(0.95, 0.05, 0.3, 0.1),
    );
    let sequence = sequence_of(vec![standing.clone(), occluded, standing]);

    let output = fill_only().preprocess_with_report(&sequence).unwrap();
    let knee = output.sequence.frames()[1]
        .landmarks
        .get(LandmarkName::LeftKnee)
        .copied()
        .unwrap();

    assert_close(knee.x, original.x, 1e-9);
    assert_close(knee.y, original.y, 1e-9);
    assert_close(knee.z, original.z, 1e-9);
    assert!(knee.visibility >= 0.5, "filled point takes neighbor confidence");
    assert_eq!(output.filled_points, 1);
    assert!(output.constant_filled.is_empty());
    assert!(output.unrecoverable.is_empty());
}

#[test]
fn test_interpolation_is_linear_in_time() {
    let standing = standing_frame();
    let at = |x: f64, visibility: f64| {
        with_landmark(
            &standing,
            LandmarkName::LeftKnee,
            Landmark::new(x, 0.55, 0.0, visibility),
        )
    };
    let sequence = sequence_of(vec![at(0.40, 0.9), at(0.0, 0.1), at(0.0, 0.1), at(0.70, 0.9)]);

    let clean = fill_only().preprocess(&sequence).unwrap();
    let xs: Vec<f64> = clean
        .frames()
        .iter()
        .map(|f| f.landmarks.position(LandmarkName::LeftKnee).unwrap().x)
        .collect();

    assert_close(xs[1], 0.50, 1e-9);
    assert_close(xs[2], 0.60, 1e-9);
}

#[test]
fn test_leading_and_trailing_gaps_extrapolate_flat() {
    let standing = standing_frame();
    let knee = |x: f64, visibility: f64| {
        with_landmark(
            &standing,
            LandmarkName::LeftKnee,
            Landmark::new(x, 0.55, 0.0, visibility),
        )
    };
    let sequence = sequence_of(vec![
        knee(0.1, 0.2),
        knee(0.40, 0.9),
        knee(0.50, 0.9),
        knee(0.9, 0.2),
    ]);

    let clean = fill_only().preprocess(&sequence).unwrap();
    let x_at = |i: usize| {
        clean.frames()[i]
            .landmarks
            .position(LandmarkName::LeftKnee)
            .unwrap()
            .x
    };

    assert_close(x_at(0), 0.40, 1e-9);
    assert_close(x_at(3), 0.50, 1e-9);
}

#[test]
fn test_single_valid_frame_is_constant_filled() {
    let standing = standing_frame();
    let weak = with_visibility(&standing, LandmarkName::LeftKnee, 0.1);
    let anchored = with_landmark(
        &standing,
        LandmarkName::LeftKnee,
        Landmark::new(0.47, 0.70, 0.01, 0.9),
    );
    let sequence = sequence_of(vec![weak.clone(), anchored, weak]);

    let output = fill_only().preprocess_with_report(&sequence).unwrap();

    assert_eq!(output.constant_filled, vec![LandmarkName::LeftKnee]);
    assert_eq!(output.filled_points, 2);
    for frame in output.sequence.frames() {
        let knee = frame.landmarks.position(LandmarkName::LeftKnee).unwrap();
        assert_close(knee.x, 0.47, 1e-12);
        assert_close(knee.y, 0.70, 1e-12);
    }
}

#[test]
fn test_landmark_never_visible_is_reported_unrecoverable() {
    let weak = with_visibility(&standing_frame(), LandmarkName::LeftKnee, 0.1);
    let sequence = sequence_of(vec![weak.clone(), weak.clone(), weak]);

    let output = fill_only().preprocess_with_report(&sequence).unwrap();

    assert_eq!(output.unrecoverable, vec![LandmarkName::LeftKnee]);
    assert_eq!(output.filled_points, 0);
    // Raw values are kept rather than invented
    let knee = output.sequence.frames()[0]
        .landmarks
        .get(LandmarkName::LeftKnee)
        .unwrap();
    assert_close(knee.visibility, 0.1, 1e-12);
}

#[test]
fn test_non_finite_point_is_a_gap() {
    let standing = standing_frame();
    let original = standing.position(LandmarkName::LeftKnee).unwrap();
    let broken = with_landmark(
        &standing,
        LandmarkName::LeftKnee,
        Landmark::new(f64::NAN, f64::INFINITY, 0.0, 0.9),
    );
    let sequence = sequence_of(vec![standing.clone(), broken, standing]);

    let output = LandmarkPreprocessor::default()
        .preprocess_with_report(&sequence)
        .unwrap();

    assert_eq!(output.filled_points, 1);
    assert!(output.unrecoverable.is_empty());
    let raw = fill_only().preprocess(&sequence).unwrap();
    let knee = raw.frames()[1].landmarks.position(LandmarkName::LeftKnee).unwrap();
    assert_close(knee.x, original.x, 1e-9);
    assert_close(knee.y, original.y, 1e-9);
    for frame in output.sequence.frames() {
        for (_, landmark) in frame.landmarks.iter() {
            assert!(landmark.position().is_finite());
        }
    }
}

#[test]
fn test_non_finite_point_without_valid_neighbor_is_dropped() {
    let broken = with_landmark(
        &standing_frame(),
        LandmarkName::LeftKnee,
        Landmark::new(f64::NAN, f64::NAN, 0.0, 0.1),
    );
    let sequence = sequence_of(vec![broken.clone(), broken]);

    let output = fill_only().preprocess_with_report(&sequence).unwrap();

    assert_eq!(output.unrecoverable, vec![LandmarkName::LeftKnee]);
    assert!(output
        .sequence
        .frames()
        .iter()
        .all(|f| !f.landmarks.contains(LandmarkName::LeftKnee)));
}

#[test]
fn test_absent_landmark_stays_absent() {
    let frame = without(&standing_frame(), &[LandmarkName::LeftPinky]);
    let sequence = sequence_of(vec![frame.clone(), frame]);

    let output = fill_only().preprocess_with_report(&sequence).unwrap();

    assert!(output.unrecoverable.is_empty());
    assert!(output
        .sequence
        .frames()
        .iter()
        .all(|f| !f.landmarks.contains(LandmarkName::LeftPinky)));
}

// ============================================================================
// Normalization
// ============================================================================

#[test]
fn test_normalization_centres_on_hip_with_unit_shoulder_width() {
    let sequence = standing_hold(11, 30);
    let clean = LandmarkPreprocessor::default().preprocess(&sequence).unwrap();

    assert_eq!(clean.len(), sequence.len());
    assert_eq!(clean.timestamps(), sequence.timestamps());
    for frame in clean.frames() {
        let hip = frame.landmarks.position(LandmarkName::Hip).unwrap();
        assert!(hip.norm() < 1e-9, "mid-hip is the origin, got {hip:?}");

        let width = frame
            .landmarks
            .position(LandmarkName::LeftShoulder)
            .unwrap()
            .distance(frame.landmarks.position(LandmarkName::RightShoulder).unwrap());
        assert_close(width, 1.0, 1e-9);
    }
}

#[test]
fn test_hip_width_reference_and_shoulder_fallback() {
    let preprocessor = LandmarkPreprocessor::new(PreprocessingConfig {
        reference_distance: ReferenceDistance::HipWidth,
        ..PreprocessingConfig::default()
    });
    let standing = standing_frame();
    assert_close(preprocessor.reference_distance(&standing).unwrap(), 0.10, 1e-9);

    // Collapsed hips fall back to the shoulders
    let collapsed = with_landmark(
        &standing,
        LandmarkName::RightHip,
        Landmark::visible_at(standing.position(LandmarkName::LeftHip).unwrap()),
    );
    assert_close(
        preprocessor.reference_distance(&collapsed).unwrap(),
        0.16,
        1e-9,
    );
}

#[test]
fn test_frame_without_hips_is_left_unnormalized() {
    let frame = without(
        &standing_frame(),
        &[LandmarkName::LeftHip, LandmarkName::RightHip],
    );
    let sequence = sequence_of(vec![frame]);

    let output = LandmarkPreprocessor::default()
        .preprocess_with_report(&sequence)
        .unwrap();

    assert_eq!(output.unnormalized_frames, 1);
    let nose = output.sequence.frames()[0]
        .landmarks
        .position(LandmarkName::Nose)
        .unwrap();
    assert_close(nose.x, 0.50, 1e-12);
}

#[test]
fn test_visibility_weighting_shrinks_low_confidence_coordinates() {
    let preprocessor = LandmarkPreprocessor::new(PreprocessingConfig {
        visibility_weighting: true,
        smoothing: SmoothingAlgorithm::Disabled,
        normalize: false,
        ..PreprocessingConfig::default()
    });
    let frame = with_landmark(
        &standing_frame(),
        LandmarkName::Nose,
        Landmark::new(0.5, 0.2, 0.0, 0.6),
    );
    let clean = preprocessor.preprocess(&sequence_of(vec![frame])).unwrap();
    let nose = clean.frames()[0]
        .landmarks
        .position(LandmarkName::Nose)
        .unwrap();

    assert_close(nose.x, 0.30, 1e-12);
    assert_close(nose.y, 0.12, 1e-12);
}

// ============================================================================
// Smoothing
// ============================================================================

#[test]
fn test_smoothing_is_idempotent_on_constant_series() {
    let constant = vec![0.42; 25];
    for algorithm in [
        SmoothingAlgorithm::default(),
        SmoothingAlgorithm::MovingAverage { window: 5 },
        SmoothingAlgorithm::Disabled,
    ] {
        let smoothed = algorithm.apply(&constant);
        assert_eq!(smoothed.len(), constant.len());
        for value in smoothed {
            assert_close(value, 0.42, 1e-9);
        }
    }
}

#[test]
fn test_savitzky_golay_preserves_lines_with_clipped_window() {
    // Window 7 is clipped to the 4-sample series
    let line = [1.0, 2.0, 3.0, 4.0];
    let smoothed = SmoothingAlgorithm::default().apply(&line);

    assert_eq!(smoothed.len(), 4);
    for (value, expected) in smoothed.iter().zip(line) {
        assert_close(*value, expected, 1e-9);
    }
}

#[test]
fn test_prepared_filter_keeps_quadratics_at_every_length() {
    let filter = SmoothingFilter::new(SmoothingAlgorithm::default());
    assert_eq!(filter.algorithm(), SmoothingAlgorithm::default());

    // One filter serves series shorter and longer than its window
    for len in 3_u32..=12 {
        let quadratic: Vec<f64> = (0..len)
            .map(|i| {
                let x = f64::from(i);
                (0.5 * x).mul_add(x, 2.0 - x)
            })
            .collect();
        let smoothed = filter.apply(&quadratic);

        assert_eq!(smoothed.len(), quadratic.len());
        for (value, expected) in smoothed.iter().zip(&quadratic) {
            assert_close(*value, *expected, 1e-6);
        }
    }
}

#[test]
fn test_savitzky_golay_reduces_alternating_noise() {
    let noisy: Vec<f64> = (0..31)
        .map(|i| if i % 2 == 0 { 0.01 } else { -0.01 })
        .collect();
    let smoothed = SmoothingAlgorithm::default().apply(&noisy);
    let peak = smoothed[5..26].iter().fold(0.0_f64, |m, v| m.max(v.abs()));

    assert!(peak < 0.01, "interior peak {peak} not attenuated");
}

#[test]
fn test_moving_average_truncates_at_edges() {
    let smoothed = SmoothingAlgorithm::MovingAverage { window: 3 }.apply(&[0.0, 0.0, 3.0, 0.0, 0.0]);
    let expected = [0.0, 1.0, 1.0, 1.0, 0.0];

    for (value, want) in smoothed.iter().zip(expected) {
        assert_close(*value, want, 1e-12);
    }
}

#[test]
fn test_short_series_pass_through() {
    let pair = [1.0, 5.0];
    assert_eq!(SmoothingAlgorithm::default().apply(&pair), pair.to_vec());
    assert!(SmoothingAlgorithm::default().apply(&[]).is_empty());
}

#[test]
fn test_smoothing_parse_and_validate() {
    assert_eq!(
        "savitzky_golay:9:3".parse::<SmoothingAlgorithm>().unwrap(),
        SmoothingAlgorithm::SavitzkyGolay {
            window: 9,
            poly_order: 3
        }
    );
    assert_eq!(
        "moving_average:5".parse::<SmoothingAlgorithm>().unwrap(),
        SmoothingAlgorithm::MovingAverage { window: 5 }
    );
    assert_eq!(
        "disabled".parse::<SmoothingAlgorithm>().unwrap(),
        SmoothingAlgorithm::Disabled
    );
    assert_eq!(
        SmoothingAlgorithm::default().to_string(),
        "savitzky_golay:7:2"
    );

    for bad in ["savitzky_golay:6:2", "savitzky_golay:5:5", "moving_average:x", "kalman"] {
        let err = bad.parse::<SmoothingAlgorithm>().unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput, "{bad} should be rejected");
    }
}

#[test]
fn test_preprocessed_points_stay_finite() {
    let sequence = common::five_rep_squat(3);
    let clean = LandmarkPreprocessor::default().preprocess(&sequence).unwrap();

    assert_eq!(clean.len(), sequence.len());
    for frame in clean.frames() {
        for (_, landmark) in frame.landmarks.iter() {
            assert!(Point3::is_finite(landmark.position()));
        }
    }
}
