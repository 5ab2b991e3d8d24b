// ABOUTME: Analyzer bundle shared by live sessions and batch sequence analysis
// ABOUTME: Runs the per-frame stages and combines their outputs into unified scores and feedback
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use form_coach_core::errors::{AppError, AppResult};
use form_coach_core::models::{
    ExerciseType, LandmarkFrame, LandmarkName, MovementPhase, PhaseTimeline, Point3, PoseFrame,
    UnifiedScoreSet, UserProfile,
};
use form_coach_intelligence::{
    BiomechanicsAnalyzer, BiomechanicsResult, ComplexSystemsAnalyzer, ComplexSystemsResult,
    FormAnalysisConfig, GoalSafetyValidator, LandmarkPreprocessor, OptimalFormReport,
    OptimizationEngine, PhaseDetector, PhysicsAnalyzer, PhysicsResult, PracticeRecord,
    SafetyFlag,
};
use form_coach_intelligence::statistics;
use serde_json::json;
use tracing::debug;

use super::feedback::{FeedbackGenerator, FeedbackInputs};
use super::frame::FrameAnalysis;

/// Weight of energy efficiency within the physics score; posture takes the rest
const ENERGY_SHARE: f64 = 0.5;

/// Derive midpoints and reject a malformed pose or one lacking landmarks the exercise needs
///
/// A landmark at or above `visibility_threshold` must have finite coordinates;
/// less visible points are gaps the preprocessor fills.
pub(crate) fn checked_landmarks(
    landmarks: LandmarkFrame,
    exercise: ExerciseType,
    visibility_threshold: f64,
) -> AppResult<LandmarkFrame> {
    if let Some((name, landmark)) = landmarks.iter().find(|(_, landmark)| {
        landmark.visibility >= visibility_threshold && !landmark.position().is_finite()
    }) {
        return Err(AppError::invalid_input(format!(
            "Landmark {name} has non-finite coordinates"
        ))
        .with_details(json!({
            "landmark": name.as_str(),
            "visibility": landmark.visibility,
        })));
    }
    let landmarks = landmarks.with_derived_midpoints();
    let missing = landmarks.missing(exercise.required_landmarks());
    if missing.is_empty() {
        return Ok(landmarks);
    }
    let names: Vec<&str> = missing.into_iter().map(LandmarkName::as_str).collect();
    Err(AppError::missing_landmarks(exercise.as_str(), &names))
}

/// Order-independent stage outputs of one frame
#[derive(Debug, Clone)]
pub(crate) struct FrameStages {
    pub physics: PhysicsResult,
    pub biomechanics: BiomechanicsResult,
    pub optimization: OptimalFormReport,
}

/// Identity of a frame within its session
#[derive(Debug, Clone, Copy)]
pub(crate) struct FrameContext {
    pub index: usize,
    pub timestamp: f64,
    pub phase: MovementPhase,
    pub exercise: ExerciseType,
}

/// Every analyzer of the pipeline, built once from a validated configuration
///
/// Holds no mutable state and can be shared across threads and sessions.
#[derive(Debug, Clone)]
pub struct AnalysisPipeline {
    config: FormAnalysisConfig,
    preprocessor: LandmarkPreprocessor,
    physics: PhysicsAnalyzer,
    phase_detector: PhaseDetector,
    biomechanics: BiomechanicsAnalyzer,
    complex_systems: ComplexSystemsAnalyzer,
    optimization: OptimizationEngine,
    feedback: FeedbackGenerator,
    safety: GoalSafetyValidator,
}

impl AnalysisPipeline {
    /// Build every analyzer from its configuration section
    ///
    /// # Errors
    ///
    /// Returns a configuration error if any section fails validation.
    pub fn new(config: FormAnalysisConfig) -> AppResult<Self> {
        config.validate()?;
        Ok(Self {
            preprocessor: LandmarkPreprocessor::new(config.preprocessing.clone()),
            physics: PhysicsAnalyzer::new(config.physics.clone()),
            phase_detector: PhaseDetector::new(config.phase_detection.clone()),
            biomechanics: BiomechanicsAnalyzer::new(config.biomechanics.clone()),
            complex_systems: ComplexSystemsAnalyzer::new(config.complex_systems.clone()),
            optimization: OptimizationEngine::new(config.optimization.clone()),
            feedback: FeedbackGenerator::new(config.aggregation.clone()),
            safety: GoalSafetyValidator::new(),
            config,
        })
    }

    /// Configuration in use
    #[must_use]
    pub const fn config(&self) -> &FormAnalysisConfig {
        &self.config
    }

    /// Landmark preprocessor
    #[must_use]
    pub const fn preprocessor(&self) -> &LandmarkPreprocessor {
        &self.preprocessor
    }

    /// Batch phase detector
    #[must_use]
    pub const fn phase_detector(&self) -> &PhaseDetector {
        &self.phase_detector
    }

    /// Complex-systems analyzer
    #[must_use]
    pub const fn complex_systems(&self) -> &ComplexSystemsAnalyzer {
        &self.complex_systems
    }

    /// Optimization engine
    #[must_use]
    pub const fn optimization(&self) -> &OptimizationEngine {
        &self.optimization
    }

    /// Goal safety findings for a profile
    #[must_use]
    pub fn safety_flags(&self, user: &UserProfile) -> Vec<SafetyFlag> {
        self.safety.validate(user)
    }

    /// Physics, biomechanics and optimization for the last frame of `window`
    ///
    /// These stages depend only on the window and the phase history up to the
    /// frame, so batch analysis may run them for different frames in parallel.
    pub(crate) fn frame_stages(
        &self,
        window: &[PoseFrame],
        phase_history: &PhaseTimeline,
        exercise: ExerciseType,
        user: &UserProfile,
        load_position: Option<Point3>,
    ) -> AppResult<FrameStages> {
        let physics = self.physics.analyze_window(window, user, load_position)?;
        let biomechanics = self.biomechanics.analyze(
            window,
            &physics.joint_angles,
            &physics.force_distribution,
            exercise,
            phase_history,
        );
        let optimization = self
            .optimization
            .optimize(&physics.joint_angles, user, exercise)?;
        Ok(FrameStages {
            physics,
            biomechanics,
            optimization,
        })
    }

    /// Combine stage outputs into scores and feedback
    pub(crate) fn assemble(
        &self,
        frame: FrameContext,
        stages: FrameStages,
        complex_systems: ComplexSystemsResult,
        safety_flags: &[SafetyFlag],
    ) -> FrameAnalysis {
        let FrameStages {
            physics,
            biomechanics,
            optimization,
        } = stages;

        let energy = physics.energy_efficiency;
        let quality = biomechanics.movement_quality.overall();
        let stability = complex_systems.system_stability();

        let physics_efficiency = ENERGY_SHARE.mul_add(
            energy.value_or_neutral(),
            (1.0 - ENERGY_SHARE) * physics.posture_score(frame.exercise),
        );
        let scores = UnifiedScoreSet::combine(
            physics_efficiency,
            biomechanics.biological_optimality(),
            stability.value_or_neutral(),
            optimization.current_score,
            &self.config.aggregation.unified_weights,
        );

        let feedback = self.feedback.generate(&FeedbackInputs {
            exercise: frame.exercise,
            physics: &physics,
            biomechanics: &biomechanics,
            complex_systems: &complex_systems,
            scores: &scores,
            priorities: &optimization.improvement_priorities,
            safety_flags,
        });

        FrameAnalysis {
            frame_index: frame.index,
            timestamp: frame.timestamp,
            phase: frame.phase,
            physics,
            biomechanics,
            complex_systems,
            optimization,
            scores,
            feedback,
            safety_flags: safety_flags.to_vec(),
            low_confidence: !(energy.is_measured()
                && quality.is_measured()
                && stability.is_measured()),
        }
    }
}

/// Turns completed repetitions into practice records
///
/// A record scores the frame that completed the repetition; its variability
/// is the spread of overall scores across the repetition's frames.
#[derive(Debug, Clone, Default)]
pub(crate) struct PracticeTracker {
    records: Vec<PracticeRecord>,
    completed_reps: usize,
    rep_scores: Vec<f64>,
}

impl PracticeTracker {
    pub fn with_history(records: Vec<PracticeRecord>) -> Self {
        Self {
            records,
            ..Self::default()
        }
    }

    pub fn records(&self) -> &[PracticeRecord] {
        &self.records
    }

    pub const fn completed_reps(&self) -> usize {
        self.completed_reps
    }

    /// Record a frame's overall score given the repetitions completed so far
    pub fn observe(&mut self, repetitions: usize, overall: f64) {
        self.rep_scores.push(overall);
        if repetitions <= self.completed_reps {
            return;
        }
        self.completed_reps = repetitions;
        let record = PracticeRecord {
            score: overall,
            variability: statistics::std_dev(&self.rep_scores),
        };
        self.rep_scores.clear();
        debug!(
            repetition = repetitions,
            score = record.score,
            variability = record.variability,
            "Repetition completed"
        );
        self.records.push(record);
    }
}
