//! Scalar reductions over frame series.
//!
//! All helpers return 0 for an empty series so that a constant-length
//! feature vector can always be assembled.

/// Arithmetic mean.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population variance.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn population_variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64
}

/// Population standard deviation.
#[must_use]
pub fn population_std(values: &[f64]) -> f64 {
    population_variance(values).sqrt()
}

/// Smallest value.
#[must_use]
pub fn min(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().copied().fold(f64::INFINITY, f64::min)
}

/// Largest value.
#[must_use]
pub fn max(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

/// Mean of the second half minus mean of the first half.
///
/// The halves split at `n / 2`; a series of fewer than two values has no
/// trend.
#[must_use]
pub fn half_slope(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let (first, second) = values.split_at(values.len() / 2);
    mean(second) - mean(first)
}

/// `|Σ sign(v)| / n`, in `[0, 1]`; zero values count as neither sign.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn sign_consistency(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let net: f64 = values
        .iter()
        .map(|&v| {
            if v > 0.0 {
                1.0
            } else if v < 0.0 {
                -1.0
            } else {
                0.0
            }
        })
        .sum();
    net.abs() / values.len() as f64
}

/// Percentile with linear interpolation between closest ranks.
///
/// `q` is in `[0, 1]`.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn percentile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let frac = rank - lower as f64;
    frac.mul_add(sorted[upper] - sorted[lower], sorted[lower])
}

/// Trapezoidal integral of `y` over `x`.
#[must_use]
pub fn trapezoid(y: &[f64], x: &[f64]) -> f64 {
    y.windows(2)
        .zip(x.windows(2))
        .map(|(y, x)| (x[1] - x[0]) * (y[0] + y[1]) / 2.0)
        .sum()
}
