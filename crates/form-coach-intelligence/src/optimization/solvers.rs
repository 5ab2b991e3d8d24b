// ABOUTME: Bound-constrained minimizers used by the optimization engine
// ABOUTME: Projected-gradient local search and seeded differential evolution with a deadline
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Both solvers minimize a scalar function over a box. Constraints other than
//! the box are folded into the function by the caller as penalties.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::time::Instant;
use thiserror::Error;

/// Why a solver gave up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SolverFailure {
    /// Iteration limit reached before the tolerance was met
    #[error("solver did not converge within {0} iterations")]
    NotConverged(usize),
    /// Result violates constraints
    #[error("solver ended outside the feasible region")]
    Infeasible,
    /// Deadline passed
    #[error("solver exceeded its time budget")]
    TimedOut,
}

/// Armijo sufficient-decrease constant
const ARMIJO: f64 = 1e-4;
/// Largest move per iteration in unit-box coordinates
const MAX_STEP: f64 = 0.1;
const MAX_BACKTRACKS: usize = 40;
const GRADIENT_STEP: f64 = 1e-6;

/// Projected gradient descent with backtracking line search
#[derive(Debug, Clone, Copy)]
pub struct LocalSolver {
    /// Iteration limit
    pub max_iterations: usize,
    /// Stop once an iteration improves the objective by less than this
    pub tolerance: f64,
}

impl LocalSolver {
    /// Minimize `f` over `bounds` starting from `start`
    ///
    /// Works in unit-box coordinates so every variable moves on the same scale.
    ///
    /// # Errors
    ///
    /// Returns [`SolverFailure::NotConverged`] when the iteration limit is reached.
    pub fn minimize(
        &self,
        f: impl Fn(&[f64]) -> f64,
        start: &[f64],
        bounds: &[(f64, f64)],
    ) -> Result<Vec<f64>, SolverFailure> {
        let to_box = |u: &[f64]| -> Vec<f64> {
            u.iter()
                .zip(bounds)
                .map(|(v, (lo, hi))| v.mul_add(hi - lo, *lo))
                .collect()
        };
        let g = |u: &[f64]| f(&to_box(u));
        let mut u: Vec<f64> = start
            .iter()
            .zip(bounds)
            .map(|(x, (lo, hi))| {
                let span = hi - lo;
                if span > 0.0 {
                    ((x - lo) / span).clamp(0.0, 1.0)
                } else {
                    0.0
                }
            })
            .collect();
        let mut fu = g(&u);

        for _ in 0..self.max_iterations {
            let gradient = unit_gradient(&g, &u);
            let projected: Vec<f64> = u
                .iter()
                .zip(&gradient)
                .map(|(ui, gi)| {
                    if (*ui <= 0.0 && *gi > 0.0) || (*ui >= 1.0 && *gi < 0.0) {
                        0.0
                    } else {
                        *gi
                    }
                })
                .collect();
            let largest = projected.iter().fold(0.0f64, |m, v| m.max(v.abs()));
            if largest < self.tolerance {
                return Ok(to_box(&u));
            }

            let mut alpha = MAX_STEP / largest;
            let mut accepted = None;
            for _ in 0..MAX_BACKTRACKS {
                let candidate: Vec<f64> = u
                    .iter()
                    .zip(&projected)
                    .map(|(ui, gi)| alpha.mul_add(-gi, *ui).clamp(0.0, 1.0))
                    .collect();
                let predicted: f64 = projected
                    .iter()
                    .zip(u.iter().zip(&candidate))
                    .map(|(gi, (a, b))| gi * (a - b))
                    .sum();
                let fc = g(&candidate);
                if fc <= ARMIJO.mul_add(-predicted, fu) {
                    accepted = Some((candidate, fc));
                    break;
                }
                alpha /= 2.0;
            }

            let Some((candidate, fc)) = accepted else {
                return Ok(to_box(&u));
            };
            let improvement = fu - fc;
            u = candidate;
            fu = fc;
            if improvement < self.tolerance {
                return Ok(to_box(&u));
            }
        }
        Err(SolverFailure::NotConverged(self.max_iterations))
    }
}

/// Central-difference gradient inside the unit box, one-sided at the faces
fn unit_gradient(g: &impl Fn(&[f64]) -> f64, u: &[f64]) -> Vec<f64> {
    let mut shifted = u.to_vec();
    (0..u.len())
        .map(|i| {
            let lo = (u[i] - GRADIENT_STEP).max(0.0);
            let hi = (u[i] + GRADIENT_STEP).min(1.0);
            shifted[i] = hi;
            let f_hi = g(&shifted);
            shifted[i] = lo;
            let f_lo = g(&shifted);
            shifted[i] = u[i];
            if hi > lo {
                (f_hi - f_lo) / (hi - lo)
            } else {
                0.0
            }
        })
        .collect()
}

/// `DE/rand/1/bin` differential evolution with a fixed seed
#[derive(Debug, Clone, Copy)]
pub struct DifferentialEvolution {
    /// Population size per variable
    pub population_factor: usize,
    /// Generation limit
    pub max_generations: usize,
    /// Mutation scale `F`
    pub differential_weight: f64,
    /// Crossover probability `CR`
    pub crossover_rate: f64,
    /// RNG seed
    pub seed: u64,
    /// Stop once the population's fitness spread falls below this
    pub tolerance: f64,
}

impl DifferentialEvolution {
    /// Minimize `f` over `bounds`, seeding the population with `start`
    ///
    /// # Errors
    ///
    /// Returns [`SolverFailure::TimedOut`] if `deadline` passes before the
    /// search finishes.
    pub fn minimize(
        &self,
        f: impl Fn(&[f64]) -> f64,
        start: &[f64],
        bounds: &[(f64, f64)],
        deadline: Instant,
    ) -> Result<Vec<f64>, SolverFailure> {
        let dims = bounds.len();
        let size = (self.population_factor * dims).max(4);
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);

        let mut population: Vec<Vec<f64>> = (0..size)
            .map(|k| {
                if k == 0 {
                    start
                        .iter()
                        .zip(bounds)
                        .map(|(x, (lo, hi))| x.clamp(*lo, *hi))
                        .collect()
                } else {
                    bounds
                        .iter()
                        .map(|(lo, hi)| rng.gen_range(*lo..=*hi))
                        .collect()
                }
            })
            .collect();
        let mut fitness: Vec<f64> = population.iter().map(|p| f(p)).collect();

        for _ in 0..self.max_generations {
            if Instant::now() >= deadline {
                return Err(SolverFailure::TimedOut);
            }
            for i in 0..size {
                let [a, b, c] = distinct_others(&mut rng, size, i);
                let forced = rng.gen_range(0..dims.max(1));
                let trial: Vec<f64> = (0..dims)
                    .map(|d| {
                        if d == forced || rng.gen::<f64>() < self.crossover_rate {
                            let (lo, hi) = bounds[d];
                            self.differential_weight
                                .mul_add(population[b][d] - population[c][d], population[a][d])
                                .clamp(lo, hi)
                        } else {
                            population[i][d]
                        }
                    })
                    .collect();
                let trial_fitness = f(&trial);
                if trial_fitness <= fitness[i] {
                    population[i] = trial;
                    fitness[i] = trial_fitness;
                }
            }
            let (lo, hi) = fitness
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                    (lo.min(*v), hi.max(*v))
                });
            if hi - lo < self.tolerance {
                break;
            }
        }

        let best = fitness
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.total_cmp(b.1))
            .map_or(0, |(i, _)| i);
        Ok(population.swap_remove(best))
    }
}

fn distinct_others(rng: &mut ChaCha8Rng, size: usize, exclude: usize) -> [usize; 3] {
    let mut picked = [exclude; 3];
    let mut filled = 0;
    while filled < 3 {
        let candidate = rng.gen_range(0..size);
        if candidate != exclude && !picked[..filled].contains(&candidate) {
            picked[filled] = candidate;
            filled += 1;
        }
    }
    picked
}
