// ABOUTME: Form analysis engine with one analyzer per pipeline stage
// ABOUTME: Preprocessing, physics, phases, biomechanics, complex systems, optimization, goal safety
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Form Coach Intelligence
//!
//! Stateless analyzers for exercise form. Each analyzer is constructed with
//! its own configuration section and holds no mutable state; per-session
//! history lives with the caller.
//!
//! ## Pipeline
//!
//! ```text
//! raw frames -> preprocessing -> physics -> phase detection -> biomechanics
//!            -> complex systems (window) -> optimization
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use form_coach_core::models::{ExerciseType, UserProfile};
//! use form_coach_intelligence::phase_detection::PhaseDetector;
//! use form_coach_intelligence::preprocessing::LandmarkPreprocessor;
//! use form_coach_intelligence::synthetic::SyntheticPoseGenerator;
//!
//! # fn main() -> form_coach_core::errors::AppResult<()> {
//! let raw = SyntheticPoseGenerator::new(7).squat_sequence()?;
//! let clean = LandmarkPreprocessor::default().preprocess(&raw)?;
//! let timeline = PhaseDetector::default().detect(&clean, ExerciseType::Squat);
//! println!("{} repetitions", timeline.repetition_count());
//! # Ok(())
//! # }
//! ```

/// Pluggable signal-processing algorithms
pub mod algorithms;

/// Literature-approximate biomechanical tables
pub mod biomechanical_constants;

/// Per-stage configuration with environment overrides
pub mod config;

/// Series statistics shared by the analyzers
pub mod statistics;

/// Gap filling, smoothing and normalization of landmark sequences
pub mod preprocessing;

/// Joint angles, moment arms, centre of mass and load distribution
pub mod physics;

/// Movement phase state machine
pub mod phase_detection;

/// Muscle activation, movement quality and coordination
pub mod biomechanics;

/// Phase-space attractors, variability, entropy and divergence
pub mod complex_systems;

/// Constrained search for optimal joint angles
pub mod optimization;

/// Body-composition and weight-change goal checks
pub mod goal_safety;

/// Seeded synthetic pose sequences
pub mod synthetic;

pub use biomechanics::{BiomechanicsAnalyzer, BiomechanicsResult, Compensation, MovementQuality};
pub use complex_systems::{ComplexSystemsAnalyzer, ComplexSystemsResult, PracticeRecord};
pub use config::FormAnalysisConfig;
pub use goal_safety::{GoalSafetyValidator, SafetyCheck, SafetyFlag, SafetyLevel};
pub use optimization::{ImprovementPriority, OptimalFormReport, OptimizationEngine};
pub use phase_detection::{PhaseDetector, StreamingPhaseTracker};
pub use physics::{PhysicsAnalyzer, PhysicsResult};
pub use preprocessing::LandmarkPreprocessor;
pub use synthetic::SyntheticPoseGenerator;
