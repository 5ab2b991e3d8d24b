// ABOUTME: Configuration module for the form-coach-intelligence crate
// ABOUTME: Re-exports per-component analysis configuration types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Form analysis configuration (preprocessing, physics, phases, scoring, optimization)
pub mod intelligence;

pub use intelligence::{
    AggregationConfig, BiomechanicsConfig, ComplexSystemsConfig, ConfigError, FormAnalysisConfig,
    GoalMultipliers, MomentArmMode, ObjectiveWeights, OptimizationConfig, PhaseDetectionConfig,
    PhysicsConfig, PreprocessingConfig, ReferenceDistance, SmoothingAlgorithm,
};
