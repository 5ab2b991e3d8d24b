// ABOUTME: Main library entry point for the form-coach exercise form analysis engine
// ABOUTME: Exposes live sessions, batch sequence analysis, optimal form and logging setup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

// Crate-level attributes:
// - deny(unsafe_code): Zero-tolerance unsafe policy
#![deny(unsafe_code)]

//! # Form Coach
//!
//! Turns pose-detector landmarks into a multi-disciplinary assessment of
//! exercise form: physics, biomechanics, movement phases, complex-systems
//! stability and a constrained search for the optimal joint angles, unified
//! into scores and ranked coaching feedback.
//!
//! ## Architecture
//!
//! - **`form_coach_core`**: errors, landmark topology, models, constants
//! - **`form_coach_intelligence`**: one stateless analyzer per stage
//! - **aggregator**: per-session orchestration, feedback and summaries
//! - **service**: stateless facade for single frames, sequences and optimal form
//! - **logging**: `tracing-subscriber` setup
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use form_coach::service::FormAnalysisService;
//! use form_coach::core::errors::AppResult;
//! use form_coach::core::models::UserProfile;
//! use form_coach::intelligence::SyntheticPoseGenerator;
//!
//! fn main() -> AppResult<()> {
//!     let service = FormAnalysisService::from_env()?;
//!     let user = UserProfile::new(178.0, 80.0);
//!     let sequence = SyntheticPoseGenerator::new(42).squat_sequence()?;
//!
//!     let analysis = service.analyze_sequence(&sequence, "squat", &user)?;
//!     println!(
//!         "{} reps, overall {:.2}: {}",
//!         analysis.summary.repetition_count,
//!         analysis.summary.mean_scores.overall,
//!         analysis.summary.assessment_message
//!     );
//!     Ok(())
//! }
//! ```

/// Unified aggregator: sessions, feedback and summaries
pub mod aggregator;

/// Structured logging configuration
pub mod logging;

/// Stateless analysis facade
pub mod service;

pub use form_coach_core as core;
pub use form_coach_intelligence as intelligence;

pub use aggregator::{
    AnalysisPipeline, FeedbackGenerator, FormAnalysisSession, FormAssessment, FrameAnalysis,
    FrameOutcome, PoseDetection, SessionSummary,
};
pub use form_coach_intelligence::FormAnalysisConfig;
pub use service::{FormAnalysisService, SequenceAnalysis};
