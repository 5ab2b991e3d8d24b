// ABOUTME: Optimization engine searching for the best target joint angles for an exercise
// ABOUTME: Runs a local solver, then a global solver, then falls back to the current angles
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Form Optimization
//!
//! Decision variables are the joints that are both measured and listed in the
//! exercise's optimal-angle table. The minimized objective is a weighted sum
//! of four normalized costs, so `overall_score = 1 - f(x*)` lies in [0, 1].
//!
//! Solver chain:
//!
//! 1. Projected-gradient local search with an increasing exterior penalty.
//! 2. Seeded differential evolution under a time budget.
//! 3. Fallback: the current angles with `overall_score = 0.5`.
//!
//! The current vector is returned instead of a solver result that scores
//! worse, so optimization never reports a regression.

mod constraints;
mod objectives;
mod solvers;

pub use constraints::{forward_shoulder_offset, ConstraintSet, FEASIBILITY_TOLERANCE};
pub use objectives::{goal_weights, FormProblem};
pub use solvers::{DifferentialEvolution, LocalSolver, SolverFailure};

use form_coach_core::constants::numeric::NEUTRAL_SCORE;
use form_coach_core::errors::{AppError, AppResult};
use form_coach_core::models::{
    ExerciseType, Joint, JointAngleSet, OptimalForm, SolverOutcome, UserProfile,
};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::time::Instant;
use tracing::{debug, warn};

use crate::biomechanical_constants::{goal_importance_multiplier, joint_importance};
use crate::config::OptimizationConfig;

/// Penalty multipliers applied in successive local-solver rounds
const PENALTY_SCHEDULE: [f64; 3] = [1.0, 10.0, 100.0];

/// A joint worth correcting, ranked by weighted angle difference
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImprovementPriority {
    /// Joint to correct
    pub joint: Joint,
    /// Current angle (degrees)
    pub current_angle: f64,
    /// Target angle (degrees)
    pub optimal_angle: f64,
    /// `optimal - current` (degrees)
    pub difference: f64,
    /// `|difference| * importance`
    pub priority: f64,
}

/// Full optimization answer for one set of current angles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimalFormReport {
    /// Solver result
    pub optimal_form: OptimalForm,
    /// Score of the current angles under the same weights
    pub current_score: f64,
    /// Largest corrections first
    pub improvement_priorities: Vec<ImprovementPriority>,
    /// S-curve progression from current to optimal angles, `steps + 1` points
    pub path: Vec<JointAngleSet>,
}

/// Finds target joint angles for a user and exercise
#[derive(Debug, Clone, Default)]
pub struct OptimizationEngine {
    config: OptimizationConfig,
}

impl OptimizationEngine {
    /// Create an engine with the given settings
    #[must_use]
    pub const fn new(config: OptimizationConfig) -> Self {
        Self { config }
    }

    /// Settings in use
    #[must_use]
    pub const fn config(&self) -> &OptimizationConfig {
        &self.config
    }

    /// Solve for the optimal form
    ///
    /// Solver failures never surface as errors; they end in the fallback result.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile is invalid or no measured joint is
    /// relevant to the exercise.
    pub fn solve(
        &self,
        current: &JointAngleSet,
        user: &UserProfile,
        exercise: ExerciseType,
    ) -> AppResult<OptimalForm> {
        user.validate()?;
        let problem = FormProblem::new(current, user, exercise, &self.config)?;
        Ok(self.solve_problem(&problem))
    }

    /// Solve and add priorities, the current score and a progression path
    ///
    /// # Errors
    ///
    /// Returns an error under the same conditions as [`Self::solve`], or if the
    /// configured path has zero steps.
    pub fn optimize(
        &self,
        current: &JointAngleSet,
        user: &UserProfile,
        exercise: ExerciseType,
    ) -> AppResult<OptimalFormReport> {
        user.validate()?;
        let problem = FormProblem::new(current, user, exercise, &self.config)?;
        let optimal_form = self.solve_problem(&problem);
        let improvement_priorities =
            self.improvement_priorities(current, &optimal_form.joint_angles, user);
        let path = personalized_path(current, &optimal_form.joint_angles, self.config.path_steps)?;
        Ok(OptimalFormReport {
            current_score: problem.score(problem.current()),
            optimal_form,
            improvement_priorities,
            path,
        })
    }

    /// Score of the current angles under the user's objective weights
    ///
    /// # Errors
    ///
    /// Returns an error if the profile is invalid or no joint is relevant.
    pub fn score_current(
        &self,
        current: &JointAngleSet,
        user: &UserProfile,
        exercise: ExerciseType,
    ) -> AppResult<f64> {
        user.validate()?;
        let problem = FormProblem::new(current, user, exercise, &self.config)?;
        Ok(problem.score(problem.current()))
    }

    fn solve_problem(&self, problem: &FormProblem) -> OptimalForm {
        let started = Instant::now();
        let deadline = started + self.config.time_budget();

        let solved = match self.local_search(problem) {
            Ok(x) => Some((x, SolverOutcome::Local)),
            Err(local) => {
                debug!(reason = %local, "Local solver failed; trying global solver");
                match self.global_search(problem, deadline) {
                    Ok(x) => Some((x, SolverOutcome::Global)),
                    Err(global) => {
                        warn!(reason = %global, "Both solvers failed; returning current angles");
                        None
                    }
                }
            }
        };

        let current = problem.current();
        let form = match solved {
            Some((x, outcome)) => {
                if problem.objective(current) <= problem.objective(&x) {
                    Self::form_at(problem, current, SolverOutcome::CurrentRetained)
                } else {
                    Self::form_at(problem, &x, outcome)
                }
            }
            None => OptimalForm {
                overall_score: NEUTRAL_SCORE,
                ..Self::form_at(problem, current, SolverOutcome::Fallback)
            },
        };
        debug!(
            solver = ?form.solver,
            score = form.overall_score,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Optimization finished"
        );
        form
    }

    fn form_at(problem: &FormProblem, x: &[f64], solver: SolverOutcome) -> OptimalForm {
        OptimalForm {
            joint_angles: problem.to_angle_set(x),
            objective_scores: problem.objective_scores(x),
            constraint_satisfaction: problem.constraints().satisfaction(x),
            overall_score: problem.score(x),
            solver,
        }
    }

    fn local_search(&self, problem: &FormProblem) -> Result<Vec<f64>, SolverFailure> {
        let solver = LocalSolver {
            max_iterations: self.config.local_max_iterations,
            tolerance: self.config.local_tolerance,
        };
        let mut x = problem.current().to_vec();
        for factor in PENALTY_SCHEDULE {
            let weight = self.config.penalty_weight * factor;
            x = solver.minimize(|v| problem.penalized(v, weight), &x, problem.bounds())?;
        }
        if problem.constraints().is_feasible(&x) {
            Ok(x)
        } else {
            Err(SolverFailure::Infeasible)
        }
    }

    fn global_search(
        &self,
        problem: &FormProblem,
        deadline: Instant,
    ) -> Result<Vec<f64>, SolverFailure> {
        let solver = DifferentialEvolution {
            population_factor: self.config.global_population_factor,
            max_generations: self.config.global_max_generations,
            differential_weight: self.config.differential_weight,
            crossover_rate: self.config.crossover_rate,
            seed: self.config.seed,
            tolerance: self.config.local_tolerance,
        };
        let weight = self.config.penalty_weight * PENALTY_SCHEDULE[PENALTY_SCHEDULE.len() - 1];
        let x = solver.minimize(
            |v| problem.penalized(v, weight),
            problem.current(),
            problem.bounds(),
            deadline,
        )?;
        if problem.constraints().is_feasible(&x) {
            Ok(x)
        } else {
            Err(SolverFailure::Infeasible)
        }
    }

    /// Joints whose correction matters most, largest first
    ///
    /// Only joints present in both sets count; differences within the
    /// configured tolerance are dropped.
    #[must_use]
    pub fn improvement_priorities(
        &self,
        current: &JointAngleSet,
        optimal: &JointAngleSet,
        user: &UserProfile,
    ) -> Vec<ImprovementPriority> {
        let mut priorities: Vec<ImprovementPriority> = current
            .iter()
            .filter_map(|(joint, current_angle)| {
                let optimal_angle = optimal.get(joint)?;
                let difference = optimal_angle - current_angle;
                if difference.abs() <= self.config.priority_tolerance_degrees {
                    return None;
                }
                let importance = user
                    .goals
                    .iter()
                    .fold(joint_importance(joint), |acc, goal| {
                        acc * goal_importance_multiplier(*goal, joint)
                    });
                Some(ImprovementPriority {
                    joint,
                    current_angle,
                    optimal_angle,
                    difference,
                    priority: difference.abs() * importance,
                })
            })
            .collect();
        priorities.sort_by(|a, b| b.priority.total_cmp(&a.priority));
        priorities.truncate(self.config.max_priorities);
        priorities
    }
}

/// S-curve interpolation `0.5 (1 - cos(pi t))` from current to optimal angles
///
/// Joints missing from either set keep their current value.
///
/// # Errors
///
/// Returns an error if `steps` is zero.
pub fn personalized_path(
    current: &JointAngleSet,
    optimal: &JointAngleSet,
    steps: usize,
) -> AppResult<Vec<JointAngleSet>> {
    if steps == 0 {
        return Err(AppError::invalid_input("Path needs at least one step"));
    }
    Ok((0..=steps)
        .map(|k| {
            let t = k as f64 / steps as f64;
            let eased = 0.5 * (1.0 - (PI * t).cos());
            current
                .iter()
                .map(|(joint, from)| {
                    let to = optimal.get(joint).unwrap_or(from);
                    (joint, eased.mul_add(to - from, from))
                })
                .collect()
        })
        .collect())
}
