//! Shared numeric helpers for the analyzers.
//!
//! Every function here returns 0 (never NaN, never panics) for empty or
//! degenerate input, so callers do not need zero-count guards of their own.

use statrs::statistics::{Data, OrderStatistics, Statistics};

/// Gini coefficient of inequality over a set of non-negative values.
///
/// 0 means perfectly equal, 1 maximally unequal. Empty and all-zero inputs
/// return 0.
pub fn gini(values: &[f64]) -> f64 {
    let n = values.len();
    if n == 0 {
        return 0.0;
    }
    let total: f64 = values.iter().sum();
    if total <= 0.0 {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let weighted: f64 = sorted
        .iter()
        .enumerate()
        .map(|(i, v)| (i as f64 + 1.0) * v)
        .sum();
    let n = n as f64;
    (2.0 * weighted) / (n * total) - (n + 1.0) / n
}

/// Interpolated percentile (0..=100) of a value set. Empty input returns 0.
pub fn percentile(values: &[f64], p: usize) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut data = Data::new(values.to_vec());
    data.percentile(p)
}

/// Median of a value set. Empty input returns 0.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut data = Data::new(values.to_vec());
    data.median()
}

/// Arithmetic mean. Empty input returns 0.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    Statistics::mean(values)
}

/// Coefficient of variation (standard deviation / mean).
///
/// Needs at least two samples and a non-zero mean; returns 0 otherwise.
pub fn coefficient_of_variation(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = Statistics::mean(values);
    if !mean.is_finite() || mean.abs() < f64::EPSILON {
        return 0.0;
    }
    let sd = Statistics::std_dev(values);
    if !sd.is_finite() {
        return 0.0;
    }
    sd / mean
}
