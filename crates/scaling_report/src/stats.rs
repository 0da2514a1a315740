//! Summary statistics over the values of one metric within one group.
//!
//! Every function here sorts its input before reducing it, so the result depends only on the
//! multiset of values and never on the order the runs appeared in the table.

use serde::Serialize;

#[cfg(test)]
#[path = "stats_test.rs"]
mod stats_test;

/// Count, mean, sample standard deviation and range of a set of values.
///
/// `mean`, `min` and `max` are undefined when no value contributed; `std` is undefined when fewer
/// than two values contributed. Undefined is never reported as zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct MetricSummary {
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl MetricSummary {
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Self {
        let sorted = sorted(values);
        let count = sorted.len();
        let mean = mean(&sorted);
        Self {
            count,
            mean,
            std: mean.and_then(|mean| sample_std(&sorted, mean)),
            min: sorted.first().copied(),
            max: sorted.last().copied(),
        }
    }
}

fn sorted(values: impl IntoIterator<Item = f64>) -> Vec<f64> {
    let mut values: Vec<f64> = values.into_iter().collect();
    values.sort_by(f64::total_cmp);
    values
}

/// Arithmetic mean. Falls back to summing `value / n` when the plain sum overflows, so the mean of
/// finite values is always finite.
#[allow(clippy::as_conversions)]
fn mean(sorted: &[f64]) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let n = sorted.len() as f64;
    let sum: f64 = sorted.iter().sum();
    if sum.is_finite() {
        return Some(sum / n);
    }
    Some(sorted.iter().map(|value| value / n).sum())
}

/// Standard deviation with the n - 1 denominator. Deviations are rescaled by the largest one when
/// their squares overflow; a deviation that is not representable leaves the result undefined.
#[allow(clippy::as_conversions)]
fn sample_std(sorted: &[f64], mean: f64) -> Option<f64> {
    if sorted.len() < 2 {
        return None;
    }
    let denominator = (sorted.len() - 1) as f64;
    let sum_of_squares: f64 = sorted.iter().map(|value| (value - mean).powi(2)).sum();
    if sum_of_squares.is_finite() {
        return Some((sum_of_squares / denominator).sqrt());
    }
    let scale = sorted.iter().map(|value| (value - mean).abs()).fold(0.0, f64::max);
    let scaled: f64 = sorted.iter().map(|value| ((value - mean) / scale).powi(2)).sum();
    Some(scale * (scaled / denominator).sqrt()).filter(|std| std.is_finite())
}

/// Quantile `q` in `[0, 1]` of sorted values, linearly interpolated between closest ranks.
#[allow(clippy::as_conversions)]
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let position = q.clamp(0.0, 1.0) * last as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let weight = position - position.floor();
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}

/// Whisker extent as a multiple of the interquartile range.
pub const WHISKER_IQR_FACTOR: f64 = 1.5;

/// Five-number summary used to draw one box of a boxplot.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BoxplotStats {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    /// Smallest value within `q1 - 1.5 * IQR`.
    pub whisker_low: f64,
    /// Largest value within `q3 + 1.5 * IQR`.
    pub whisker_high: f64,
    /// Values beyond the whiskers, ascending.
    pub fliers: Vec<f64>,
}

impl BoxplotStats {
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let sorted = sorted(values);
        let q1 = quantile(&sorted, 0.25)?;
        let median = quantile(&sorted, 0.5)?;
        let q3 = quantile(&sorted, 0.75)?;
        let reach = WHISKER_IQR_FACTOR * (q3 - q1);
        let (low_limit, high_limit) = (q1 - reach, q3 + reach);

        let inside = || sorted.iter().copied().filter(|&v| (low_limit..=high_limit).contains(&v));
        let whisker_low = inside().next().unwrap_or(q1);
        let whisker_high = inside().last().unwrap_or(q3);
        let fliers =
            sorted.iter().copied().filter(|&v| !(low_limit..=high_limit).contains(&v)).collect();

        Some(Self { q1, median, q3, whisker_low, whisker_high, fliers })
    }
}
