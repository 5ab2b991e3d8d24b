// ABOUTME: Core types and constants for the form-coach analysis pipeline
// ABOUTME: Foundation crate with error handling, landmark topology, and analysis result models
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Form Coach Core
//!
//! Foundation crate providing the shared types used by every stage of the
//! form analysis pipeline. It holds no analysis logic and changes rarely,
//! which keeps incremental compilation of the workspace cheap.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError`, `ErrorCode`, and `AppResult`
//! - **constants**: Physical and pipeline-wide constants
//! - **models**: Landmarks, pose sequences, joint angles, phases, profiles, and results

/// Unified error handling system with stable error codes
pub mod errors;

/// Physical and pipeline-wide constants
pub mod constants;

/// Core data models (landmarks, joint angles, phases, profiles, results)
pub mod models;
