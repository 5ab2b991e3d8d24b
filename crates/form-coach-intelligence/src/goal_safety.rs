// ABOUTME: Safety classification of body-composition and weight-change goals
// ABOUTME: Flags targets below essential fat or weight change faster than recommended rates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Goal Safety
//!
//! Unsafe goals are reported, never silently accepted. When the gender is
//! unknown the female thresholds apply, which flag more targets.
//!
//! References:
//! - American Council on Exercise (2009). Percent body fat norms (essential fat ranges)
//! - ACSM (2009). Appropriate physical activity intervention strategies for weight loss.
//!   *Med Sci Sports Exerc*, 41(2), 459-471

use form_coach_core::models::{Gender, UserProfile};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Body fat below which a male target is critical (%)
pub const MALE_ESSENTIAL_FAT: f64 = 5.0;
/// Body fat below which a female target is critical (%)
pub const FEMALE_ESSENTIAL_FAT: f64 = 12.0;
/// Body fat below which a male target needs caution (%)
pub const MALE_ATHLETIC_FLOOR: f64 = 8.0;
/// Body fat below which a female target needs caution (%)
pub const FEMALE_ATHLETIC_FLOOR: f64 = 15.0;
/// Weekly change above this fraction of body weight needs caution
pub const CAUTION_WEEKLY_FRACTION: f64 = 0.01;
/// Weekly change above this fraction of body weight is critical
pub const CRITICAL_WEEKLY_FRACTION: f64 = 0.015;

// ============================================================================
// Verdict Types
// ============================================================================

/// Severity of a goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafetyLevel {
    /// Within recommended limits
    Safe,
    /// Achievable but outside the recommended range
    Caution,
    /// Below physiological minimums or dangerously fast
    Critical,
}

impl SafetyLevel {
    /// String representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Safe => "safe",
            Self::Caution => "caution",
            Self::Critical => "critical",
        }
    }

    /// Whether the goal should not be pursued as set
    #[must_use]
    pub const fn is_unsafe(&self) -> bool {
        matches!(self, Self::Critical)
    }
}

/// Which goal a flag concerns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafetyCheck {
    /// Target body fat percentage
    TargetBodyFat,
    /// Planned weekly weight change
    WeeklyWeightChange,
}

impl SafetyCheck {
    /// String representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TargetBodyFat => "target_body_fat",
            Self::WeeklyWeightChange => "weekly_weight_change",
        }
    }
}

/// One non-safe goal finding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyFlag {
    /// Goal checked
    pub check: SafetyCheck,
    /// Severity
    pub level: SafetyLevel,
    /// Human-readable explanation
    pub message: String,
    /// Value under test
    pub value: f64,
    /// Threshold that was crossed
    pub threshold: f64,
}

// ============================================================================
// Validator
// ============================================================================

/// Classifies a profile's body-composition and weight-change goals
#[derive(Debug, Clone, Copy, Default)]
pub struct GoalSafetyValidator;

impl GoalSafetyValidator {
    /// Create a validator
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Every non-safe finding for the profile, most severe first
    #[must_use]
    pub fn validate(&self, user: &UserProfile) -> Vec<SafetyFlag> {
        let mut flags: Vec<SafetyFlag> = [
            user.target_body_fat_percentage
                .and_then(|target| Self::check_target_body_fat(target, user.gender)),
            user.weekly_weight_change_kg
                .and_then(|change| Self::check_weekly_change(change, user.weight_kg)),
        ]
        .into_iter()
        .flatten()
        .collect();
        flags.sort_by(|a, b| b.level.cmp(&a.level));
        for flag in &flags {
            warn!(
                check = flag.check.as_str(),
                level = flag.level.as_str(),
                value = flag.value,
                "Unsafe goal"
            );
        }
        flags
    }

    /// Highest severity across all checks
    #[must_use]
    pub fn overall_level(&self, user: &UserProfile) -> SafetyLevel {
        self.validate(user)
            .iter()
            .map(|flag| flag.level)
            .max()
            .unwrap_or(SafetyLevel::Safe)
    }

    /// Classify a target body fat percentage
    #[must_use]
    pub fn classify_target_body_fat(target: f64, gender: Option<Gender>) -> SafetyLevel {
        Self::check_target_body_fat(target, gender).map_or(SafetyLevel::Safe, |flag| flag.level)
    }

    fn check_target_body_fat(target: f64, gender: Option<Gender>) -> Option<SafetyFlag> {
        let (essential, athletic) = match gender {
            Some(Gender::Male) => (MALE_ESSENTIAL_FAT, MALE_ATHLETIC_FLOOR),
            Some(Gender::Female) | None => (FEMALE_ESSENTIAL_FAT, FEMALE_ATHLETIC_FLOOR),
        };
        let (level, threshold, message) = if target < essential {
            (
                SafetyLevel::Critical,
                essential,
                format!("Target body fat {target:.1}% is below essential fat ({essential:.0}%)"),
            )
        } else if target < athletic {
            (
                SafetyLevel::Caution,
                athletic,
                format!("Target body fat {target:.1}% is below the athletic range ({athletic:.0}%)"),
            )
        } else {
            return None;
        };
        Some(SafetyFlag {
            check: SafetyCheck::TargetBodyFat,
            level,
            message,
            value: target,
            threshold,
        })
    }

    fn check_weekly_change(change_kg: f64, weight_kg: f64) -> Option<SafetyFlag> {
        if weight_kg <= 0.0 {
            return None;
        }
        let fraction = change_kg.abs() / weight_kg;
        let (level, threshold) = if fraction > CRITICAL_WEEKLY_FRACTION {
            (SafetyLevel::Critical, CRITICAL_WEEKLY_FRACTION)
        } else if fraction > CAUTION_WEEKLY_FRACTION {
            (SafetyLevel::Caution, CAUTION_WEEKLY_FRACTION)
        } else {
            return None;
        };
        Some(SafetyFlag {
            check: SafetyCheck::WeeklyWeightChange,
            level,
            message: format!(
                "Weekly change of {:.2} kg is {:.1}% of body weight",
                change_kg.abs(),
                fraction * 100.0
            ),
            value: fraction,
            threshold,
        })
    }
}
