// ABOUTME: Unified error type for the form analysis pipeline with stable error codes
// ABOUTME: Hard input failures propagate as AppError; soft conditions are modelled as values
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Unified Error Handling
//!
//! Only truly invalid input crosses a component boundary as an error. Expected
//! conditions (not enough history, solver non-convergence, a missing optional
//! joint) are absorbed by the component that meets them and surface as explicit
//! values such as [`crate::models::Estimate`] instead.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// Standard error codes used by the analysis core
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    // Input validation (3000-3999)
    /// Generic malformed input
    #[serde(rename = "INVALID_INPUT")]
    InvalidInput = 3000,
    /// Landmarks required by the exercise are absent from the frame
    #[serde(rename = "MISSING_REQUIRED_FIELD")]
    MissingRequiredField = 3001,
    /// Numeric value outside its physical range (height, weight, load)
    #[serde(rename = "VALUE_OUT_OF_RANGE")]
    ValueOutOfRange = 3003,
    /// Exercise identifier not in the catalogue
    #[serde(rename = "UNKNOWN_EXERCISE")]
    UnknownExercise = 3004,
    /// Frame timestamp earlier than the previous frame of the same session
    #[serde(rename = "OUT_OF_ORDER_FRAME")]
    OutOfOrderFrame = 3005,

    // Aggregation (4000-4999)
    /// Session aggregation requested with zero analysed frames
    #[serde(rename = "EMPTY_SESSION")]
    EmptySession = 4000,

    // Configuration (6000-6999)
    /// Configuration failed validation
    #[serde(rename = "CONFIG_INVALID")]
    ConfigInvalid = 6002,

    // Internal (9000-9999)
    /// Unexpected internal failure
    #[serde(rename = "INTERNAL_ERROR")]
    InternalError = 9000,
}

impl ErrorCode {
    /// Whether the caller caused this error (as opposed to the analysis core)
    #[must_use]
    pub const fn is_client_error(self) -> bool {
        matches!(
            self,
            Self::InvalidInput
                | Self::MissingRequiredField
                | Self::ValueOutOfRange
                | Self::UnknownExercise
                | Self::OutOfOrderFrame
                | Self::EmptySession
        )
    }

    /// User-facing description of this error
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::InvalidInput => "The provided input is invalid",
            Self::MissingRequiredField => "Required landmarks are missing from the frame",
            Self::ValueOutOfRange => "The provided value is outside the acceptable range",
            Self::UnknownExercise => "The exercise type is not supported",
            Self::OutOfOrderFrame => "Frames must be submitted in timestamp order",
            Self::EmptySession => "The session contains no analysable frames",
            Self::ConfigInvalid => "Configuration is invalid",
            Self::InternalError => "An internal analysis error occurred",
        }
    }
}

/// Unified error type for the analysis core
#[derive(Debug, Error)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Structured details for the caller (field names, offending values)
    pub details: Value,
    /// Source error for error chaining
    #[source]
    pub source: Option<Box<dyn StdError + Send + Sync>>,
}

impl AppError {
    /// Create a new error with the given code and message
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: Value::Null,
            source: None,
        }
    }

    /// Attach structured details
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }

    /// Attach a source error for chaining
    #[must_use]
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Malformed input
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Landmarks required for the exercise are absent
    #[must_use]
    pub fn missing_landmarks(exercise: &str, missing: &[&str]) -> Self {
        Self::new(
            ErrorCode::MissingRequiredField,
            format!(
                "Frame is missing landmarks required for {exercise}: {}",
                missing.join(", ")
            ),
        )
        .with_details(json!({ "exercise": exercise, "missing": missing }))
    }

    /// Value outside its valid range
    #[must_use]
    pub fn value_out_of_range(field: &str, value: f64, expected: &str) -> Self {
        Self::new(
            ErrorCode::ValueOutOfRange,
            format!("{field} must be {expected}, got {value}"),
        )
        .with_details(json!({ "field": field, "value": value }))
    }

    /// Exercise name not in the catalogue
    #[must_use]
    pub fn unknown_exercise(name: &str) -> Self {
        Self::new(
            ErrorCode::UnknownExercise,
            format!("Unknown exercise type '{name}'"),
        )
        .with_details(json!({ "exercise": name }))
    }

    /// Frame submitted out of timestamp order
    #[must_use]
    pub fn out_of_order(previous: f64, received: f64) -> Self {
        Self::new(
            ErrorCode::OutOfOrderFrame,
            format!("Frame timestamp {received:.3}s precedes previous frame at {previous:.3}s"),
        )
        .with_details(json!({ "previous": previous, "received": received }))
    }

    /// Aggregation over zero frames
    #[must_use]
    pub fn empty_session() -> Self {
        Self::new(
            ErrorCode::EmptySession,
            "Cannot aggregate a session with zero analysed frames",
        )
    }

    /// Configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigInvalid, message)
    }

    /// Internal error
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Frame-level failure payload in the `{success:false, error}` shape
    #[must_use]
    pub fn to_failure_response(&self) -> Value {
        json!({
            "success": false,
            "error": {
                "code": self.code,
                "message": self.message,
                "details": self.details,
            }
        })
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;
