// ABOUTME: Complex-systems analysis of movement windows in a PCA-reduced phase space
// ABOUTME: Finds attractors and scores variability, entropy, predictability, divergence, self-organization
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Complex-Systems Analysis
//!
//! Each frame's landmark `(x, y)` pairs form one point in phase space, reduced
//! to a few principal components once enough samples exist. Several measures
//! here are simplified estimators (approximate entropy, a one-step divergence
//! exponent) that reproduce qualitative behaviour, not textbook-exact values.
//!
//! With fewer frames than the configured minimum the analyzer reports
//! insufficient history instead of zeros.

use form_coach_core::constants::numeric::EPSILON;
use form_coach_core::models::{Estimate, ExerciseType, LandmarkName, PoseFrame};
use nalgebra::{DMatrix, SymmetricEigen};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use tracing::debug;

use crate::config::ComplexSystemsConfig;
use crate::phase_detection::tracked_position;
use crate::statistics::{self, central_difference};

/// One completed repetition's outcome, used for self-organization metrics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PracticeRecord {
    /// Overall score of the repetition in [0, 1]
    pub score: f64,
    /// Movement variability during the repetition
    pub variability: f64,
}

/// A dense region of phase space the movement keeps returning to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attractor {
    /// Mean of member points
    pub center: Vec<f64>,
    /// Fraction of all points in this attractor
    pub strength: f64,
    /// 90th-percentile member distance to the centre
    pub basin_radius: f64,
    /// Inverse of member distance variance
    pub stability: f64,
    /// Best-scoring attractor of the window
    pub optimal_form: bool,
}

/// Variability split into useful and harmful parts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VariabilityMetrics {
    /// Coefficient of variation of the tracked signal
    pub coefficient_of_variation: Option<f64>,
    /// Peaks when variability sits at the target level
    pub adaptive_variability: Estimate,
    /// Mean absolute jerk of the tracked signal against a reference, capped at 1
    pub harmful_instability: Estimate,
}

/// Learning signals read from practice history
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelfOrganization {
    /// Saturating count of sudden performance jumps
    pub emergence_score: f64,
    /// Relative drop in variability from early to late practice
    pub degrees_of_freedom_reduction: f64,
    /// Inverse of recent variability
    pub pattern_stability: f64,
}

/// Output of the complex-systems analyzer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplexSystemsResult {
    /// Whether the window met the minimum history length
    pub sufficient_history: bool,
    /// Phase-space dimensionality after reduction
    pub phase_space_dimensions: usize,
    /// Attractors ordered by discovery
    pub attractors: Vec<Attractor>,
    /// Variability metrics
    pub variability: VariabilityMetrics,
    /// Mean approximate entropy across landmark series
    pub complexity: Option<f64>,
    /// Mean absolute autocorrelation of the tracked signal
    pub predictability: Estimate,
    /// Mean one-step log divergence of nearest neighbours
    pub lyapunov_exponent: Option<f64>,
    /// Present once enough practice records exist
    pub self_organization: Option<SelfOrganization>,
}

impl ComplexSystemsResult {
    fn insufficient(self_organization: Option<SelfOrganization>) -> Self {
        Self {
            sufficient_history: false,
            phase_space_dimensions: 0,
            attractors: Vec::new(),
            variability: VariabilityMetrics {
                coefficient_of_variation: None,
                adaptive_variability: Estimate::InsufficientData,
                harmful_instability: Estimate::InsufficientData,
            },
            complexity: None,
            predictability: Estimate::InsufficientData,
            lyapunov_exponent: None,
            self_organization,
        }
    }

    /// Attractor tagged as the optimal form
    #[must_use]
    pub fn optimal_attractor(&self) -> Option<&Attractor> {
        self.attractors.iter().find(|a| a.optimal_form)
    }

    /// System stability in [0, 1]
    ///
    /// Mean of optimal-attractor stability, one minus harmful instability,
    /// adaptive variability, and `1 / (1 + max(lambda, 0))`, over whichever are measured.
    #[must_use]
    pub fn system_stability(&self) -> Estimate {
        if !self.sufficient_history {
            return Estimate::InsufficientData;
        }
        let terms: Vec<f64> = [
            self.optimal_attractor().map(|a| a.stability),
            self.variability.harmful_instability.value().map(|h| 1.0 - h),
            self.variability.adaptive_variability.value(),
            self.lyapunov_exponent.map(|l| 1.0 / (1.0 + l.max(0.0))),
        ]
        .into_iter()
        .flatten()
        .collect();
        if terms.is_empty() {
            Estimate::InsufficientData
        } else {
            Estimate::score(statistics::mean(&terms))
        }
    }
}

/// Phase-space and dynamical-systems analysis of a movement window
#[derive(Debug, Clone, Default)]
pub struct ComplexSystemsAnalyzer {
    config: ComplexSystemsConfig,
}

impl ComplexSystemsAnalyzer {
    /// Create an analyzer with the given settings
    #[must_use]
    pub const fn new(config: ComplexSystemsConfig) -> Self {
        Self { config }
    }

    /// Settings in use
    #[must_use]
    pub const fn config(&self) -> &ComplexSystemsConfig {
        &self.config
    }

    /// Analyze a window of frames in timestamp order
    #[must_use]
    pub fn analyze(
        &self,
        window: &[PoseFrame],
        exercise: ExerciseType,
        practice: &[PracticeRecord],
    ) -> ComplexSystemsResult {
        let self_organization = self.self_organization(practice);
        if window.len() < self.config.min_history_frames {
            debug!(
                frames = window.len(),
                required = self.config.min_history_frames,
                "Complex-systems analysis skipped: insufficient history"
            );
            return ComplexSystemsResult::insufficient(self_organization);
        }

        let (raw, series) = Self::phase_space(window);
        let points = self.reduce(raw);
        let phase_space_dimensions = points.first().map_or(0, Vec::len);
        let attractors = self.attractors(&points);

        let times: Vec<f64> = window.iter().map(|f| f.timestamp).collect();
        let tracked: Vec<f64> = window
            .iter()
            .filter_map(|f| tracked_position(&f.landmarks, exercise))
            .collect();
        let tracked_times: Vec<f64> = window
            .iter()
            .filter(|f| tracked_position(&f.landmarks, exercise).is_some())
            .map(|f| f.timestamp)
            .collect();

        let result = ComplexSystemsResult {
            sufficient_history: true,
            phase_space_dimensions,
            attractors,
            variability: self.variability(&tracked, &tracked_times),
            complexity: self.complexity(&series),
            predictability: self.predictability(&tracked),
            lyapunov_exponent: Self::lyapunov_exponent(&points, &times),
            self_organization,
        };
        debug!(
            dimensions = result.phase_space_dimensions,
            attractors = result.attractors.len(),
            lyapunov = ?result.lyapunov_exponent,
            "Complex-systems window analyzed"
        );
        result
    }

    /// Flatten `(x, y)` of landmarks present in every frame
    ///
    /// Returns the per-frame vectors and the per-coordinate time series.
    fn phase_space(window: &[PoseFrame]) -> (Vec<Vec<f64>>, Vec<Vec<f64>>) {
        let shared: Vec<LandmarkName> = LandmarkName::ALL
            .into_iter()
            .filter(|name| !name.is_derived())
            .filter(|name| window.iter().all(|f| f.landmarks.contains(*name)))
            .collect();
        let points: Vec<Vec<f64>> = window
            .iter()
            .map(|frame| {
                shared
                    .iter()
                    .filter_map(|name| frame.landmarks.position(*name))
                    .flat_map(|p| [p.x, p.y])
                    .collect()
            })
            .collect();
        let dims = shared.len() * 2;
        let series = (0..dims)
            .map(|d| points.iter().map(|p| p[d]).collect())
            .collect();
        (points, series)
    }

    /// Project onto the leading principal components when enough samples exist
    fn reduce(&self, points: Vec<Vec<f64>>) -> Vec<Vec<f64>> {
        let n = points.len();
        let d = points.first().map_or(0, Vec::len);
        let k = self.config.pca_components.min(d);
        if n < self.config.pca_min_samples || d <= k || k == 0 {
            return points;
        }
        let mut data = DMatrix::from_fn(n, d, |i, j| points[i][j]);
        let means: Vec<f64> = (0..d).map(|j| data.column(j).mean()).collect();
        for (j, mean) in means.iter().enumerate() {
            data.column_mut(j).add_scalar_mut(-mean);
        }
        let covariance = (data.transpose() * &data) / (n - 1) as f64;
        let eigen = SymmetricEigen::new(covariance);
        let mut order: Vec<usize> = (0..d).collect();
        order.sort_by(|&a, &b| eigen.eigenvalues[b].total_cmp(&eigen.eigenvalues[a]));
        let basis = DMatrix::from_fn(d, k, |row, col| eigen.eigenvectors[(row, order[col])]);
        let projected = data * basis;
        (0..n)
            .map(|i| projected.row(i).iter().copied().collect())
            .collect()
    }

    /// Density-seeded greedy clustering of phase-space points
    #[must_use]
    pub fn attractors(&self, points: &[Vec<f64>]) -> Vec<Attractor> {
        let n = points.len();
        if n == 0 {
            return Vec::new();
        }
        let radius = self.config.neighborhood_radius;
        let min_members = (self.config.attractor_min_density * n as f64).ceil().max(1.0) as usize;
        let neighborhoods: Vec<Vec<usize>> = (0..n)
            .into_par_iter()
            .map(|i| {
                (0..n)
                    .filter(|&j| euclidean(&points[i], &points[j]) <= radius)
                    .collect()
            })
            .collect();
        let mut seeds: Vec<usize> = (0..n).collect();
        seeds.sort_by_key(|&i| Reverse(neighborhoods[i].len()));

        let mut assigned = vec![false; n];
        let mut attractors = Vec::new();
        for seed in seeds {
            if assigned[seed] || neighborhoods[seed].len() < min_members {
                continue;
            }
            let members: Vec<usize> = neighborhoods[seed]
                .iter()
                .copied()
                .filter(|&j| !assigned[j])
                .collect();
            if members.len() < min_members {
                continue;
            }
            for &j in &members {
                assigned[j] = true;
            }
            attractors.push(Self::describe(points, &members, n));
        }

        let best = attractors
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| attractor_rank(a).total_cmp(&attractor_rank(b)))
            .map(|(i, _)| i);
        if let Some(best) = best {
            attractors[best].optimal_form = true;
        }
        attractors
    }

    fn describe(points: &[Vec<f64>], members: &[usize], total: usize) -> Attractor {
        let dims = points[members[0]].len();
        let center: Vec<f64> = (0..dims)
            .map(|d| statistics::mean(&members.iter().map(|&i| points[i][d]).collect::<Vec<_>>()))
            .collect();
        let distances: Vec<f64> = members
            .iter()
            .map(|&i| euclidean(&points[i], &center))
            .collect();
        Attractor {
            center,
            strength: members.len() as f64 / total as f64,
            basin_radius: statistics::percentile(&distances, 90.0),
            stability: 1.0 / (1.0 + statistics::variance(&distances)),
            optimal_form: false,
        }
    }

    /// Adaptive variability and harmful instability of the tracked signal
    #[must_use]
    pub fn variability(&self, tracked: &[f64], times: &[f64]) -> VariabilityMetrics {
        let magnitudes: Vec<f64> = tracked.iter().map(|v| v.abs()).collect();
        let coefficient_of_variation = statistics::coefficient_of_variation(&magnitudes);
        let adaptive_variability = coefficient_of_variation.map_or(Estimate::InsufficientData, |cv| {
            Estimate::score(statistics::gaussian(
                cv,
                self.config.target_cv,
                self.config.cv_sigma,
            ))
        });
        let harmful_instability = if tracked.len() < 4 {
            Estimate::InsufficientData
        } else {
            let velocity = central_difference(tracked, times);
            let acceleration = central_difference(&velocity, times);
            let jerk = central_difference(&acceleration, times);
            let mean_jerk =
                statistics::mean(&jerk.iter().map(|j| j.abs()).collect::<Vec<_>>());
            Estimate::score((mean_jerk / self.config.jerk_reference).min(1.0))
        };
        VariabilityMetrics {
            coefficient_of_variation,
            adaptive_variability,
            harmful_instability,
        }
    }

    /// Mean approximate entropy over the given series
    #[must_use]
    pub fn complexity(&self, series: &[Vec<f64>]) -> Option<f64> {
        let entropies: Vec<f64> = series
            .iter()
            .filter_map(|values| {
                let tolerance = self.config.apen_tolerance_factor * statistics::std_dev(values);
                statistics::approximate_entropy(values, self.config.apen_pattern_length, tolerance)
            })
            .collect();
        (!entropies.is_empty()).then(|| statistics::mean(&entropies))
    }

    /// Mean absolute autocorrelation at lags `1..=max_lag`
    #[must_use]
    pub fn predictability(&self, tracked: &[f64]) -> Estimate {
        let lags: Vec<f64> = (1..=self.config.autocorrelation_max_lag)
            .filter(|&lag| tracked.len() > lag + 1)
            .map(|lag| statistics::autocorrelation(tracked, lag).abs())
            .collect();
        if lags.is_empty() {
            Estimate::InsufficientData
        } else {
            Estimate::score(statistics::mean(&lags))
        }
    }

    /// Mean one-step log divergence of nearest phase-space neighbours, per second
    ///
    /// Temporal neighbours (adjacent frames) are excluded. Returns `None` when
    /// no neighbour pair has a positive separation.
    #[must_use]
    pub fn lyapunov_exponent(points: &[Vec<f64>], times: &[f64]) -> Option<f64> {
        let n = points.len().min(times.len());
        if n < 4 {
            return None;
        }
        let steps: Vec<f64> = times.windows(2).map(|w| w[1] - w[0]).collect();
        let dt = statistics::mean(&steps);
        if dt <= EPSILON {
            return None;
        }
        let divergences: Vec<f64> = (0..n - 1)
            .filter_map(|i| {
                let (j, d0) = (0..n - 1)
                    .filter(|&j| j.abs_diff(i) > 1)
                    .map(|j| (j, euclidean(&points[i], &points[j])))
                    .filter(|(_, d)| *d > EPSILON)
                    .min_by(|a, b| a.1.total_cmp(&b.1))?;
                let d1 = euclidean(&points[i + 1], &points[j + 1]);
                (d1 > EPSILON).then(|| (d1 / d0).ln())
            })
            .collect();
        (!divergences.is_empty()).then(|| statistics::mean(&divergences) / dt)
    }

    /// Learning signals from practice history, `None` below the minimum record count
    #[must_use]
    pub fn self_organization(&self, practice: &[PracticeRecord]) -> Option<SelfOrganization> {
        if practice.len() < self.config.min_practice_records {
            return None;
        }
        let scores: Vec<f64> = practice.iter().map(|r| r.score).collect();
        let deltas: Vec<f64> = scores.windows(2).map(|w| w[1] - w[0]).collect();
        let spread = statistics::std_dev(&deltas);
        let jumps = if spread > EPSILON {
            deltas
                .iter()
                .filter(|d| d.abs() > self.config.jump_std_multiplier * spread)
                .count()
        } else {
            0
        };

        let variability: Vec<f64> = practice.iter().map(|r| r.variability).collect();
        let half = variability.len() / 2;
        let early = statistics::mean(&variability[..half]);
        let late = statistics::mean(&variability[half..]);
        let degrees_of_freedom_reduction = if early > EPSILON {
            ((early - late) / early).clamp(0.0, 1.0)
        } else {
            0.0
        };

        let recent = &variability[variability.len() - self.config.min_practice_records..];
        Some(SelfOrganization {
            emergence_score: (jumps as f64 / self.config.emergence_saturation).min(1.0),
            degrees_of_freedom_reduction,
            pattern_stability: 1.0 / (1.0 + statistics::mean(recent)),
        })
    }
}

fn attractor_rank(attractor: &Attractor) -> f64 {
    0.7f64.mul_add(attractor.stability, 0.3 * attractor.strength)
}

fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}
