// ABOUTME: User anthropometrics, training goals, and per-joint limitations
// ABOUTME: Supplied once per session by the caller and read-only to the pipeline
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::joint::Joint;
use crate::constants::physics::CM_PER_M;
use crate::errors::{AppError, AppResult};

/// Biological sex used for body-composition thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    /// Male thresholds
    Male,
    /// Female thresholds
    Female,
}

/// Training goal tags that reweight optimization objectives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingGoal {
    /// Maximal force production
    Strength,
    /// Sustained low-cost movement
    Endurance,
    /// Muscle growth
    Hypertrophy,
}

/// Anthropometric and goal data for one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Standing height in centimetres
    pub height_cm: f64,
    /// Body weight in kilograms
    pub weight_kg: f64,
    /// Current body fat percentage
    pub body_fat_percentage: Option<f64>,
    /// Target body fat percentage the user is working towards
    pub target_body_fat_percentage: Option<f64>,
    /// Planned weekly weight change in kilograms (negative for loss)
    pub weekly_weight_change_kg: Option<f64>,
    /// Sex for body-composition thresholds
    pub gender: Option<Gender>,
    /// Training goals
    pub goals: BTreeSet<TrainingGoal>,
    /// Joints with a physical limitation
    pub limitations: BTreeSet<Joint>,
    /// External load in kilograms
    pub external_load_kg: f64,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            height_cm: 175.0,
            weight_kg: 75.0,
            body_fat_percentage: None,
            target_body_fat_percentage: None,
            weekly_weight_change_kg: None,
            gender: None,
            goals: BTreeSet::new(),
            limitations: BTreeSet::new(),
            external_load_kg: 0.0,
        }
    }
}

impl UserProfile {
    /// Profile with height and weight and no goals, limitations or load
    #[must_use]
    pub fn new(height_cm: f64, weight_kg: f64) -> Self {
        Self {
            height_cm,
            weight_kg,
            ..Self::default()
        }
    }

    /// Add a training goal
    #[must_use]
    pub fn with_goal(mut self, goal: TrainingGoal) -> Self {
        self.goals.insert(goal);
        self
    }

    /// Flag a joint as limited
    #[must_use]
    pub fn with_limitation(mut self, joint: Joint) -> Self {
        self.limitations.insert(joint);
        self
    }

    /// Set the external load
    #[must_use]
    pub const fn with_external_load(mut self, load_kg: f64) -> Self {
        self.external_load_kg = load_kg;
        self
    }

    /// Set gender and body composition
    #[must_use]
    pub const fn with_body_composition(
        mut self,
        gender: Gender,
        body_fat_percentage: Option<f64>,
        target_body_fat_percentage: Option<f64>,
    ) -> Self {
        self.gender = Some(gender);
        self.body_fat_percentage = body_fat_percentage;
        self.target_body_fat_percentage = target_body_fat_percentage;
        self
    }

    /// Set the planned weekly weight change
    #[must_use]
    pub const fn with_weekly_weight_change(mut self, kg_per_week: f64) -> Self {
        self.weekly_weight_change_kg = Some(kg_per_week);
        self
    }

    /// Height in metres
    #[must_use]
    pub fn height_m(&self) -> f64 {
        self.height_cm / CM_PER_M
    }

    /// Body weight plus external load
    #[must_use]
    pub fn total_supported_mass_kg(&self) -> f64 {
        self.weight_kg + self.external_load_kg
    }

    /// Whether a goal is set
    #[must_use]
    pub fn has_goal(&self, goal: TrainingGoal) -> bool {
        self.goals.contains(&goal)
    }

    /// Whether a joint is flagged as limited
    #[must_use]
    pub fn is_limited(&self, joint: Joint) -> bool {
        self.limitations.contains(&joint)
    }

    /// Reject physically impossible values
    ///
    /// Target body fat is not range-checked here. Unsafe targets are the goal
    /// safety validator's concern and must be flagged rather than rejected.
    ///
    /// # Errors
    ///
    /// Returns an error for non-positive height or weight, a negative load, or a
    /// current body fat outside (0, 70).
    pub fn validate(&self) -> AppResult<()> {
        if !(self.height_cm.is_finite() && self.height_cm > 0.0) {
            return Err(AppError::value_out_of_range(
                "height_cm",
                self.height_cm,
                "positive",
            ));
        }
        if !(self.weight_kg.is_finite() && self.weight_kg > 0.0) {
            return Err(AppError::value_out_of_range(
                "weight_kg",
                self.weight_kg,
                "positive",
            ));
        }
        if !(self.external_load_kg.is_finite() && self.external_load_kg >= 0.0) {
            return Err(AppError::value_out_of_range(
                "external_load_kg",
                self.external_load_kg,
                "non-negative",
            ));
        }
        if let Some(body_fat) = self.body_fat_percentage {
            if !(body_fat > 0.0 && body_fat < 70.0) {
                return Err(AppError::value_out_of_range(
                    "body_fat_percentage",
                    body_fat,
                    "between 0 and 70",
                ));
            }
        }
        if let Some(target) = self.target_body_fat_percentage {
            if !target.is_finite() || target < 0.0 {
                return Err(AppError::value_out_of_range(
                    "target_body_fat_percentage",
                    target,
                    "non-negative",
                ));
            }
        }
        Ok(())
    }
}
