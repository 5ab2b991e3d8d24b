// ABOUTME: Integration tests for body-fat target and weekly weight-change safety classification
// ABOUTME: Verifies gender thresholds, severity ordering and that unsafe goals are flagged not rejected
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use form_coach::core::models::{Gender, UserProfile};
use form_coach::intelligence::{GoalSafetyValidator, SafetyCheck, SafetyLevel};

use common::test_user;

// ============================================================================
// Target body fat
// ============================================================================

#[test]
fn test_male_target_below_essential_fat_is_critical() {
    common::init_test_logging();
    let user = test_user().with_body_composition(Gender::Male, Some(18.0), Some(2.0));

    // Unsafe targets are not a validation error
    assert!(user.validate().is_ok());

    let flags = GoalSafetyValidator::new().validate(&user);
    assert_eq!(flags.len(), 1);
    let flag = &flags[0];
    assert_eq!(flag.check, SafetyCheck::TargetBodyFat);
    assert_eq!(flag.level, SafetyLevel::Critical);
    assert!((flag.threshold - 5.0).abs() < 1e-12);
    assert!((flag.value - 2.0).abs() < 1e-12);
    assert!(flag.message.contains("essential"));
    assert!(flag.level.is_unsafe());
}

#[test]
fn test_body_fat_thresholds_by_gender() {
    let cases = [
        (4.9, Some(Gender::Male), SafetyLevel::Critical),
        (5.0, Some(Gender::Male), SafetyLevel::Caution),
        (7.9, Some(Gender::Male), SafetyLevel::Caution),
        (8.0, Some(Gender::Male), SafetyLevel::Safe),
        (11.9, Some(Gender::Female), SafetyLevel::Critical),
        (12.0, Some(Gender::Female), SafetyLevel::Caution),
        (15.0, Some(Gender::Female), SafetyLevel::Safe),
    ];
    for (target, gender, expected) in cases {
        assert_eq!(
            GoalSafetyValidator::classify_target_body_fat(target, gender),
            expected,
            "{target}% for {gender:?}"
        );
    }
}

#[test]
fn test_unknown_gender_uses_stricter_thresholds() {
    assert_eq!(
        GoalSafetyValidator::classify_target_body_fat(10.0, None),
        SafetyLevel::Critical
    );
    assert_eq!(
        GoalSafetyValidator::classify_target_body_fat(13.0, None),
        SafetyLevel::Caution
    );
    assert_eq!(
        GoalSafetyValidator::classify_target_body_fat(10.0, Some(Gender::Male)),
        SafetyLevel::Safe
    );
}

// ============================================================================
// Weekly weight change
// ============================================================================

#[test]
fn test_weekly_change_levels() {
    let validator = GoalSafetyValidator::new();
    // 80 kg body weight: caution above 0.8 kg, critical above 1.2 kg
    let level = |change: f64| validator.overall_level(&test_user().with_weekly_weight_change(change));

    assert_eq!(level(0.5), SafetyLevel::Safe);
    assert_eq!(level(0.8), SafetyLevel::Safe);
    assert_eq!(level(1.0), SafetyLevel::Caution);
    assert_eq!(level(-1.0), SafetyLevel::Caution);
    assert_eq!(level(1.5), SafetyLevel::Critical);
}

#[test]
fn test_weekly_change_flag_reports_fraction() {
    let user = test_user().with_weekly_weight_change(-1.6);
    let flags = GoalSafetyValidator::new().validate(&user);

    assert_eq!(flags.len(), 1);
    assert_eq!(flags[0].check, SafetyCheck::WeeklyWeightChange);
    assert!((flags[0].value - 0.02).abs() < 1e-12);
    assert!((flags[0].threshold - 0.015).abs() < 1e-12);
}

// ============================================================================
// Combined verdicts
// ============================================================================

#[test]
fn test_flags_are_sorted_most_severe_first() {
    let user = test_user()
        .with_body_composition(Gender::Female, Some(28.0), Some(13.0))
        .with_weekly_weight_change(2.0);
    let flags = GoalSafetyValidator::new().validate(&user);

    let levels: Vec<SafetyLevel> = flags.iter().map(|f| f.level).collect();
    assert_eq!(levels, vec![SafetyLevel::Critical, SafetyLevel::Caution]);
    assert_eq!(flags[0].check, SafetyCheck::WeeklyWeightChange);
}

#[test]
fn test_profile_without_goals_is_safe() {
    let validator = GoalSafetyValidator::new();
    let user = UserProfile::new(165.0, 60.0);

    assert!(validator.validate(&user).is_empty());
    assert_eq!(validator.overall_level(&user), SafetyLevel::Safe);
    assert!(!SafetyLevel::Caution.is_unsafe());
}

#[test]
fn test_levels_serialize_as_snake_case() {
    assert_eq!(
        serde_json::to_string(&SafetyLevel::Critical).unwrap(),
        "\"critical\""
    );
    assert_eq!(
        serde_json::to_string(&SafetyCheck::TargetBodyFat).unwrap(),
        "\"target_body_fat\""
    );
    assert_eq!(SafetyLevel::Caution.as_str(), "caution");
}
