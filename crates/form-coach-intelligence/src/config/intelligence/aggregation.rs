// ABOUTME: Aggregation configuration for rolling history, feedback rules, and unified weights
// ABOUTME: Unified weights are fixed per configuration and never re-derived per frame
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Aggregation Configuration

use form_coach_core::models::UnifiedWeights;
use serde::{Deserialize, Serialize};

use super::error::ConfigError;

/// Unified aggregator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationConfig {
    /// Frames retained in the rolling history
    pub history_capacity: usize,
    /// Feedback items kept after deduplication
    pub feedback_cap: usize,
    /// Score below which physics or biomechanics feedback fires
    pub feedback_threshold: f64,
    /// Improvement priorities surfaced as feedback
    pub optimization_feedback_count: usize,
    /// Recurring issues reported in a session summary
    pub top_issue_count: usize,
    /// Weights of the unified score
    pub unified_weights: UnifiedWeights,
    /// Mean overall score for an "excellent" assessment
    pub excellent_threshold: f64,
    /// Mean overall score for a "good" assessment
    pub good_threshold: f64,
    /// Mean overall score below which form has major issues
    pub needs_improvement_threshold: f64,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            history_capacity: 100,
            feedback_cap: 10,
            feedback_threshold: 0.7,
            optimization_feedback_count: 2,
            top_issue_count: 3,
            unified_weights: UnifiedWeights::default(),
            excellent_threshold: 0.8,
            good_threshold: 0.6,
            needs_improvement_threshold: 0.4,
        }
    }
}

impl AggregationConfig {
    /// Validate aggregation settings
    ///
    /// # Errors
    ///
    /// Returns an error for a zero history, weights not summing to 1, or
    /// assessment thresholds out of order.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history_capacity == 0 {
            return Err(ConfigError::ValueOutOfRange("history_capacity must be >= 1"));
        }
        if (self.unified_weights.total() - 1.0).abs() > 1e-6 {
            return Err(ConfigError::InvalidWeights(
                "unified score weights must sum to 1.0",
            ));
        }
        if !(self.excellent_threshold > self.good_threshold
            && self.good_threshold > self.needs_improvement_threshold)
        {
            return Err(ConfigError::InvalidRange(
                "assessment thresholds must be strictly decreasing",
            ));
        }
        if !(0.0..=1.0).contains(&self.feedback_threshold) {
            return Err(ConfigError::ValueOutOfRange(
                "feedback_threshold must be between 0 and 1",
            ));
        }
        Ok(())
    }
}
