// ABOUTME: Statistical helpers for time-series analysis of landmark trajectories
// ABOUTME: Implements moments, percentiles, finite differences, autocorrelation, and approximate entropy
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Series statistics shared by the physics, phase, biomechanics and
//! complex-systems analyzers. Empty or degenerate input yields `0.0` (or
//! `None` where the caller must tell "undefined" apart from zero).

use form_coach_core::constants::numeric::EPSILON;

/// Arithmetic mean, `0.0` for an empty slice
#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population variance, `0.0` for fewer than two values
#[must_use]
pub fn variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64
}

/// Population standard deviation
#[must_use]
pub fn std_dev(values: &[f64]) -> f64 {
    variance(values).sqrt()
}

/// Standard deviation over the absolute mean, undefined when the mean is near zero
#[must_use]
pub fn coefficient_of_variation(values: &[f64]) -> Option<f64> {
    let m = mean(values).abs();
    if values.is_empty() || m < EPSILON {
        return None;
    }
    Some(std_dev(values) / m)
}

/// Percentile with linear interpolation, `p` in [0, 100]
#[must_use]
pub fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let rank = (p.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - lower as f64;
    fraction.mul_add(sorted[upper] - sorted[lower], sorted[lower])
}

/// Unnormalized Gaussian bump in [0, 1]
#[must_use]
pub fn gaussian(x: f64, center: f64, sigma: f64) -> f64 {
    let z = (x - center) / sigma.max(EPSILON);
    (-0.5 * z * z).exp()
}

/// Time derivative by central differences, one-sided at the ends
///
/// Samples with a zero time step get a zero derivative.
#[must_use]
pub fn central_difference(values: &[f64], times: &[f64]) -> Vec<f64> {
    let n = values.len().min(times.len());
    if n < 2 {
        return vec![0.0; n];
    }
    let slope = |a: usize, b: usize| {
        let dt = times[b] - times[a];
        if dt.abs() < EPSILON {
            0.0
        } else {
            (values[b] - values[a]) / dt
        }
    };
    (0..n)
        .map(|i| {
            if i == 0 {
                slope(0, 1)
            } else if i == n - 1 {
                slope(n - 2, n - 1)
            } else {
                slope(i - 1, i + 1)
            }
        })
        .collect()
}

/// Centred moving average with truncated edges
#[must_use]
pub fn centered_moving_average(values: &[f64], window: usize) -> Vec<f64> {
    if window <= 1 || values.len() < 2 {
        return values.to_vec();
    }
    let half = window / 2;
    let n = values.len();
    (0..n)
        .map(|i| {
            let lo = i.saturating_sub(half);
            let hi = (i + half).min(n - 1);
            mean(&values[lo..=hi])
        })
        .collect()
}

/// Sample autocorrelation at `lag`, `0.0` for a constant series
#[must_use]
pub fn autocorrelation(values: &[f64], lag: usize) -> f64 {
    let n = values.len();
    if lag == 0 {
        return 1.0;
    }
    if n <= lag + 1 {
        return 0.0;
    }
    let m = mean(values);
    let denominator: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    if denominator < EPSILON {
        return 0.0;
    }
    let numerator: f64 = (0..n - lag)
        .map(|i| (values[i] - m) * (values[i + lag] - m))
        .sum();
    (numerator / denominator).clamp(-1.0, 1.0)
}

/// Approximate entropy of a series
///
/// Self-matches are counted, following the original definition. Returns
/// `None` when the series is too short for patterns of length `m + 1`.
///
/// Reference: Pincus, S.M. (1991). Approximate entropy as a measure of system complexity.
/// *PNAS*, 88(6), 2297-2301.
#[must_use]
pub fn approximate_entropy(values: &[f64], m: usize, tolerance: f64) -> Option<f64> {
    let n = values.len();
    if m == 0 || n <= m + 1 {
        return None;
    }
    if tolerance <= 0.0 {
        return Some(0.0);
    }
    let phi = |len: usize| -> f64 {
        let count = n - len + 1;
        let total: f64 = (0..count)
            .map(|i| {
                let matches = (0..count)
                    .filter(|&j| {
                        (0..len).all(|k| (values[i + k] - values[j + k]).abs() <= tolerance)
                    })
                    .count();
                (matches as f64 / count as f64).ln()
            })
            .sum();
        total / count as f64
    };
    Some((phi(m) - phi(m + 1)).max(0.0))
}

/// Mean of absolute differences between consecutive values
#[must_use]
pub fn mean_absolute_delta(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let deltas: Vec<f64> = values.windows(2).map(|w| (w[1] - w[0]).abs()).collect();
    mean(&deltas)
}
