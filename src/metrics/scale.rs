//! Slice-level error primitives behind the RMSSE pipeline.
//!
//! These work on one series (or one aggregated group) at a time. NaN entries
//! are skipped in every sum, and undefined results are reported as NaN.

use crate::config::MissingRatioPolicy;

/// One-step naive forecast: each date gets the previous date's actual.
///
/// The first date has no predecessor and unobserved predecessors are not
/// carried forward; both are forecast as zero.
pub fn naive_forecast(actual: &[f64]) -> Vec<f64> {
    let mut naive = Vec::with_capacity(actual.len());
    let mut previous = 0.0;
    for &a in actual {
        naive.push(previous);
        previous = if a.is_nan() { 0.0 } else { a };
    }
    naive
}

/// Dates from the first positive actual onward.
///
/// The actual at date `t` is the naive forecast issued for `t + 1`, so a date
/// is active once the series has issued a positive naive forecast. Once
/// active, a series stays active to the end of the window.
pub fn active_mask(actual: &[f64]) -> Vec<bool> {
    let mut active = false;
    actual
        .iter()
        .map(|&a| {
            active |= a > 0.0;
            active
        })
        .collect()
}

/// Mean squared one-step naive error over the active dates (the RMSSE scale).
///
/// `sum(active * (actual - naive)^2) / (n_active - 1)`. With fewer than two
/// active dates the scale is undefined and NaN is returned.
pub fn naive_mse(actual: &[f64]) -> f64 {
    let naive = naive_forecast(actual);
    let active = active_mask(actual);

    let n_active = active.iter().filter(|&&a| a).count();
    if n_active < 2 {
        return f64::NAN;
    }

    let sse: f64 = actual
        .iter()
        .zip(&naive)
        .zip(&active)
        .filter(|(_, &is_active)| is_active)
        .map(|((a, n), _)| (a - n).powi(2))
        .filter(|e| !e.is_nan())
        .sum();

    sse / (n_active - 1) as f64
}

/// Mean squared forecast error over the whole window.
///
/// Divides by the window length even when some errors are NaN (those are
/// skipped in the sum). Empty or mismatched inputs give NaN.
pub fn forecast_mse(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.len() != predicted.len() || actual.is_empty() {
        return f64::NAN;
    }
    let sse: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .filter(|e| !e.is_nan())
        .sum();
    sse / actual.len() as f64
}

/// `sqrt(numerator / denominator)`, or NaN when that is not a finite number.
///
/// Non-positive and non-finite denominators are checked up front rather than
/// divided through.
pub fn rmsse(numerator: f64, denominator: f64) -> f64 {
    if !denominator.is_finite() || denominator <= 0.0 || numerator.is_nan() {
        return f64::NAN;
    }
    let ratio = (numerator / denominator).sqrt();
    if ratio.is_finite() {
        ratio
    } else {
        f64::NAN
    }
}

/// Weighted sum of ratios, handling missing ratios per `policy`.
///
/// A pair contributes only when both weight and ratio are present. With
/// [`MissingRatioPolicy::Redistribute`] the present contributions are scaled
/// by `total weight / present weight`.
pub fn weighted_ratio_sum(weights: &[f64], ratios: &[f64], policy: MissingRatioPolicy) -> f64 {
    let mut contribution = 0.0;
    let mut present_weight = 0.0;
    let mut total_weight = 0.0;

    for (&w, &r) in weights.iter().zip(ratios) {
        if w.is_nan() {
            continue;
        }
        total_weight += w;
        if !r.is_nan() {
            contribution += w * r;
            present_weight += w;
        }
    }

    match policy {
        MissingRatioPolicy::Ignore => contribution,
        MissingRatioPolicy::Redistribute => {
            if present_weight > 0.0 {
                contribution * total_weight / present_weight
            } else {
                0.0
            }
        }
    }
}
