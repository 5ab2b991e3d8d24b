// ABOUTME: Temporal smoothing filters for landmark coordinate series
// ABOUTME: Implements least-squares Savitzky-Golay and centred moving average with edge handling
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use form_coach_core::errors::AppError;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

use crate::config::ConfigError;

/// Temporal smoothing algorithm applied per axis per landmark
///
/// Windows longer than the sequence are clipped to the sequence length and
/// made odd; the polynomial order is lowered below the clipped window. Both
/// filters reproduce a constant input exactly, so smoothing is idempotent on
/// constant sequences.
///
/// # Scientific References
///
/// - Savitzky, A. & Golay, M.J.E. (1964). "Smoothing and differentiation of data by simplified
///   least squares procedures." *Analytical Chemistry*, 36(8), 1627-1639.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "algorithm", rename_all = "snake_case")]
pub enum SmoothingAlgorithm {
    /// Local polynomial least-squares fit
    ///
    /// Preserves peaks better than a moving average of the same width.
    /// Edge samples are evaluated on the first or last full window.
    SavitzkyGolay {
        /// Odd window length
        window: usize,
        /// Polynomial order, below `window`
        poly_order: usize,
    },

    /// Centred moving average, truncated at the edges
    MovingAverage {
        /// Odd window length
        window: usize,
    },

    /// No smoothing
    Disabled,
}

impl Default for SmoothingAlgorithm {
    fn default() -> Self {
        Self::SavitzkyGolay {
            window: 7,
            poly_order: 2,
        }
    }
}

impl SmoothingAlgorithm {
    /// Smooth one series
    ///
    /// Builds the filter for this call only; reuse a [`SmoothingFilter`] when
    /// smoothing many series.
    #[must_use]
    pub fn apply(&self, signal: &[f64]) -> Vec<f64> {
        SmoothingFilter::new(*self).apply(signal)
    }

    /// Get algorithm name for logging and debugging
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SavitzkyGolay { .. } => "savitzky_golay",
            Self::MovingAverage { .. } => "moving_average",
            Self::Disabled => "disabled",
        }
    }

    /// Get algorithm description
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::SavitzkyGolay { .. } => "Savitzky-Golay: local polynomial least squares",
            Self::MovingAverage { .. } => "Moving average: centred mean, truncated at edges",
            Self::Disabled => "Disabled: raw coordinates",
        }
    }

    /// Validate window and polynomial order
    ///
    /// # Errors
    ///
    /// Returns an error for an even or zero window, or a polynomial order not
    /// below the window.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            Self::SavitzkyGolay { window, poly_order } => {
                if window < 3 || window % 2 == 0 {
                    return Err(ConfigError::ValueOutOfRange(
                        "Savitzky-Golay window must be odd and >= 3",
                    ));
                }
                if poly_order >= window {
                    return Err(ConfigError::InvalidRange(
                        "Savitzky-Golay poly_order must be < window",
                    ));
                }
                Ok(())
            }
            Self::MovingAverage { window } => {
                if window == 0 || window % 2 == 0 {
                    return Err(ConfigError::ValueOutOfRange(
                        "moving average window must be odd and >= 1",
                    ));
                }
                Ok(())
            }
            Self::Disabled => Ok(()),
        }
    }
}

impl fmt::Display for SmoothingAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SavitzkyGolay { window, poly_order } => {
                write!(f, "savitzky_golay:{window}:{poly_order}")
            }
            Self::MovingAverage { window } => write!(f, "moving_average:{window}"),
            Self::Disabled => f.write_str("disabled"),
        }
    }
}

impl FromStr for SmoothingAlgorithm {
    type Err = AppError;

    /// Parse `savitzky_golay[:window[:order]]`, `moving_average[:window]` or `disabled`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        let mut parts = lowered.split(':');
        let name = parts.next().unwrap_or_default();
        let mut next_usize = |default: usize| -> Result<usize, AppError> {
            parts.next().map_or(Ok(default), |p| {
                p.parse().map_err(|_| {
                    AppError::invalid_input(format!("Invalid smoothing parameter '{p}'"))
                })
            })
        };
        let algorithm = match name {
            "savitzky_golay" | "sg" => {
                let window = next_usize(7)?;
                let poly_order = next_usize(2)?;
                Self::SavitzkyGolay { window, poly_order }
            }
            "moving_average" | "ma" => Self::MovingAverage {
                window: next_usize(5)?,
            },
            "disabled" | "none" => Self::Disabled,
            _ => {
                return Err(AppError::invalid_input(format!(
                    "Unknown smoothing algorithm: {s}. Valid options: savitzky_golay, moving_average, disabled"
                )))
            }
        };
        algorithm
            .validate()
            .map_err(|e| AppError::invalid_input(e.to_string()))?;
        Ok(algorithm)
    }
}

/// Largest odd window not exceeding `window` or `len`
const fn clipped_odd_window(window: usize, len: usize) -> usize {
    let w = if window < len { window } else { len };
    if w % 2 == 0 {
        w.saturating_sub(1)
    } else {
        w
    }
}

/// Smoothing algorithm with its Savitzky-Golay projections built once
///
/// Holds one projection per odd window up to the configured length, so
/// series shorter than the window reuse a prepared matrix as well.
#[derive(Debug, Clone)]
pub struct SmoothingFilter {
    algorithm: SmoothingAlgorithm,
    projections: Vec<Option<DMatrix<f64>>>,
}

impl Default for SmoothingFilter {
    fn default() -> Self {
        Self::new(SmoothingAlgorithm::default())
    }
}

impl SmoothingFilter {
    /// Prepare a filter
    #[must_use]
    pub fn new(algorithm: SmoothingAlgorithm) -> Self {
        let projections = match algorithm {
            SmoothingAlgorithm::SavitzkyGolay { window, poly_order } => (0..=window)
                .map(|w| {
                    if w >= 3 && w % 2 == 1 {
                        projection_matrix(w, poly_order.min(w - 1))
                    } else {
                        None
                    }
                })
                .collect(),
            SmoothingAlgorithm::MovingAverage { .. } | SmoothingAlgorithm::Disabled => Vec::new(),
        };
        Self {
            algorithm,
            projections,
        }
    }

    /// Algorithm this filter applies
    #[must_use]
    pub const fn algorithm(&self) -> SmoothingAlgorithm {
        self.algorithm
    }

    /// Smooth one series
    #[must_use]
    pub fn apply(&self, signal: &[f64]) -> Vec<f64> {
        match self.algorithm {
            SmoothingAlgorithm::SavitzkyGolay { window, poly_order } => {
                self.savitzky_golay(signal, window, poly_order)
            }
            SmoothingAlgorithm::MovingAverage { window } => moving_average(signal, window),
            SmoothingAlgorithm::Disabled => signal.to_vec(),
        }
    }

    fn savitzky_golay(&self, signal: &[f64], window: usize, poly_order: usize) -> Vec<f64> {
        let n = signal.len();
        let w = clipped_odd_window(window, n);
        if w < 3 {
            return signal.to_vec();
        }
        let Some(hat) = self.projections.get(w).and_then(Option::as_ref) else {
            warn!(
                window = w,
                poly_order = poly_order.min(w - 1),
                "Savitzky-Golay normal equations are singular; leaving series unsmoothed"
            );
            return signal.to_vec();
        };

        let half = w / 2;
        (0..n)
            .map(|i| {
                let start = i.saturating_sub(half).min(n - w);
                let row = i - start;
                (0..w).map(|k| hat[(row, k)] * signal[start + k]).sum()
            })
            .collect()
    }
}

/// Least-squares projection `V (V^T V)^-1 V^T` for a polynomial fit over `w` points
///
/// Row `k` holds the weights that evaluate the fitted polynomial at window
/// position `k`, so the centre row gives the classic convolution coefficients
/// and the outer rows handle the sequence edges.
fn projection_matrix(w: usize, order: usize) -> Option<DMatrix<f64>> {
    let half = (w / 2) as f64;
    let vandermonde = DMatrix::from_fn(w, order + 1, |row, col| {
        let x = (row as f64 - half) / half.max(1.0);
        x.powi(col as i32)
    });
    let transpose = vandermonde.transpose();
    let normal = &transpose * &vandermonde;
    let inverse = normal.try_inverse()?;
    Some(&vandermonde * inverse * transpose)
}

fn moving_average(signal: &[f64], window: usize) -> Vec<f64> {
    let n = signal.len();
    let w = clipped_odd_window(window, n);
    if w < 2 {
        return signal.to_vec();
    }
    let half = w / 2;
    (0..n)
        .map(|i| {
            let lo = i.saturating_sub(half);
            let hi = (i + half).min(n - 1);
            let slice = &signal[lo..=hi];
            slice.iter().sum::<f64>() / slice.len() as f64
        })
        .collect()
}
