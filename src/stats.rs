//! The statistics kernel.
//!
//! Turns a bounded, possibly weighted sample — the output of a reservoir
//! snapshot — into a full descriptive summary: extrema, weighted moments,
//! interpolated percentiles, and an auto-binned distribution.  Weights come
//! from priority-sampling reservoirs; an unweighted sample carries weight
//! 1 per observation and every formula degenerates to the classic one.

use serde::Serialize;

/// A single weighted observation from a reservoir snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// The observed value.
    pub value: f64,
    /// The observation's weight; 1.0 unless the reservoir decays.
    pub weight: f64,
}

impl Sample {
    /// Creates a sample with unit weight.
    pub fn unweighted(value: f64) -> Sample {
        Sample { value, weight: 1.0 }
    }

    /// Creates a weighted sample.
    pub fn weighted(value: f64, weight: f64) -> Sample {
        Sample { value, weight }
    }
}

/// The percentile levels reported in every summary.
pub const PERCENTILE_LEVELS: [f64; 6] = [50.0, 75.0, 90.0, 95.0, 99.0, 99.9];

/// Descriptive statistics computed from one reservoir snapshot.
///
/// All fields are zero for an empty sample, with a single empty distribution
/// bin, so consumers never need a special case.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramSummary {
    /// Number of samples the summary was computed from.
    pub n: usize,
    /// Smallest sampled value.
    pub min: f64,
    /// Largest sampled value.
    pub max: f64,
    /// Weighted arithmetic mean.
    pub arithmetic_mean: f64,
    /// Weighted geometric mean; 0 unless every value is positive.
    pub geometric_mean: f64,
    /// Weighted harmonic mean; 0 unless every value is positive.
    pub harmonic_mean: f64,
    /// The 50th percentile.
    pub median: f64,
    /// Weighted sample variance (Bessel-corrected); 0 below two samples.
    pub variance: f64,
    /// Square root of the variance.
    pub standard_deviation: f64,
    /// Weighted third standardized moment; 0 when the variance is 0.
    pub skewness: f64,
    /// Weighted fourth standardized moment, excess form; 0 when the
    /// variance is 0.
    pub kurtosis: f64,
    /// `(level, value)` pairs for each of [`PERCENTILE_LEVELS`].
    pub percentile: Vec<(f64, f64)>,
    /// `(bin upper bound, weight in bin)` pairs covering `min..=max`.
    pub histogram: Vec<(f64, f64)>,
}

impl HistogramSummary {
    fn empty() -> HistogramSummary {
        HistogramSummary {
            n: 0,
            min: 0.0,
            max: 0.0,
            arithmetic_mean: 0.0,
            geometric_mean: 0.0,
            harmonic_mean: 0.0,
            median: 0.0,
            variance: 0.0,
            standard_deviation: 0.0,
            skewness: 0.0,
            kurtosis: 0.0,
            percentile: PERCENTILE_LEVELS.iter().map(|p| (*p, 0.0)).collect(),
            histogram: vec![(0.0, 0.0)],
        }
    }
}

/// Computes the full summary for a snapshot.
pub fn summarize(samples: &[Sample]) -> HistogramSummary {
    if samples.is_empty() {
        return HistogramSummary::empty();
    }

    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.value.total_cmp(&b.value));

    let n = sorted.len();
    let min = sorted[0].value;
    let max = sorted[n - 1].value;

    let total_weight = compensated_sum(sorted.iter().map(|s| s.weight));

    // A constant sample must reproduce its value bit-for-bit; summation
    // rounding would put the mean an ulp off and leak into the moments.
    let mean = if min == max {
        min
    } else {
        compensated_sum(sorted.iter().map(|s| s.weight * s.value)) / total_weight
    };

    let (variance, skewness, kurtosis) = if min == max {
        (0.0, 0.0, 0.0)
    } else {
        moments(&sorted, mean, total_weight)
    };
    let standard_deviation = variance.sqrt();

    let percentile: Vec<(f64, f64)> = {
        let positions = cumulative_positions(&sorted, total_weight);
        PERCENTILE_LEVELS
            .iter()
            .map(|p| (*p, percentile_at(&sorted, &positions, *p)))
            .collect()
    };
    let median = percentile[0].1;

    HistogramSummary {
        n,
        min,
        max,
        arithmetic_mean: mean,
        geometric_mean: geometric_mean(&sorted, total_weight),
        harmonic_mean: harmonic_mean(&sorted, total_weight),
        median,
        variance,
        standard_deviation,
        skewness,
        kurtosis,
        percentile,
        histogram: binned(&sorted),
    }
}

/// Neumaier-compensated summation; raw power sums are never formed.
fn compensated_sum<I>(values: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let mut sum = 0.0;
    let mut compensation = 0.0;
    for x in values {
        let t = sum + x;
        if sum.abs() >= x.abs() {
            compensation += (sum - t) + x;
        } else {
            compensation += (x - t) + sum;
        }
        sum = t;
    }
    sum + compensation
}

/// Second through fourth weighted central moments, standardized.
///
/// Two-pass: deviations are taken from the precomputed mean, and the sum of
/// squares is corrected by the (mathematically zero) sum of deviations.
fn moments(sorted: &[Sample], mean: f64, total_weight: f64) -> (f64, f64, f64) {
    let dev_sum = compensated_sum(sorted.iter().map(|s| s.weight * (s.value - mean)));
    let mut m2 = compensated_sum(sorted.iter().map(|s| s.weight * (s.value - mean).powi(2)));
    m2 -= dev_sum.powi(2) / total_weight;

    let variance = if sorted.len() < 2 || total_weight <= 1.0 || m2 < 0.0 {
        0.0
    } else {
        m2 / (total_weight - 1.0)
    };

    if variance == 0.0 {
        return (variance, 0.0, 0.0);
    }

    let m3 = compensated_sum(sorted.iter().map(|s| s.weight * (s.value - mean).powi(3)))
        / total_weight;
    let m4 = compensated_sum(sorted.iter().map(|s| s.weight * (s.value - mean).powi(4)))
        / total_weight;

    let sd = variance.sqrt();
    (variance, m3 / sd.powi(3), m4 / sd.powi(4) - 3.0)
}

fn geometric_mean(sorted: &[Sample], total_weight: f64) -> f64 {
    if sorted.iter().any(|s| s.value <= 0.0) {
        return 0.0;
    }
    (compensated_sum(sorted.iter().map(|s| s.weight * s.value.ln())) / total_weight).exp()
}

fn harmonic_mean(sorted: &[Sample], total_weight: f64) -> f64 {
    if sorted.iter().any(|s| s.value <= 0.0) {
        return 0.0;
    }
    total_weight / compensated_sum(sorted.iter().map(|s| s.weight / s.value))
}

/// Midpoint position of each order statistic in the cumulative weight
/// distribution: `(c_i − w_i/2) / W`.
fn cumulative_positions(sorted: &[Sample], total_weight: f64) -> Vec<f64> {
    let mut cumulative = 0.0;
    sorted
        .iter()
        .map(|s| {
            let position = (cumulative + s.weight / 2.0) / total_weight;
            cumulative += s.weight;
            position
        })
        .collect()
}

/// The `level`-th percentile, linearly interpolated between the two order
/// statistics surrounding the target position and clamped at the extremes.
fn percentile_at(sorted: &[Sample], positions: &[f64], level: f64) -> f64 {
    let q = level / 100.0;

    if q <= positions[0] {
        return sorted[0].value;
    }
    let last = positions.len() - 1;
    if q >= positions[last] {
        return sorted[last].value;
    }

    let upper = positions.partition_point(|p| *p < q);
    let lower = upper - 1;
    let span = positions[upper] - positions[lower];
    if span == 0.0 {
        return sorted[lower].value;
    }

    let fraction = (q - positions[lower]) / span;
    sorted[lower].value + fraction * (sorted[upper].value - sorted[lower].value)
}

/// Auto-binned distribution.
///
/// Bin width follows Sturges' rule on the sample's spread,
/// `max(1, round(3.5σ / n^(1/3)))`, with bounds extending from `min` until
/// `max` is covered.  Each sample lands in the first bin whose upper bound
/// is ≥ its value, contributing its weight.  Fewer than two samples do not
/// support a width estimate and yield a single empty bin.
///
/// The width uses the unweighted deviation: the spread of the stored
/// values bounds the bin count by a polynomial in `n` no matter how
/// lopsided the weights are, where a weight-collapsed deviation could ask
/// for one bin per unit of range.
fn binned(sorted: &[Sample]) -> Vec<(f64, f64)> {
    let n = sorted.len();
    if n < 2 {
        return vec![(0.0, 0.0)];
    }

    let min = sorted[0].value;
    let max = sorted[n - 1].value;

    let mean = compensated_sum(sorted.iter().map(|s| s.value)) / n as f64;
    let deviation =
        (compensated_sum(sorted.iter().map(|s| (s.value - mean).powi(2))) / (n as f64 - 1.0))
            .sqrt();

    let width = ((3.5 * deviation) / (n as f64).cbrt()).round().max(1.0);
    let bins = ((max - min) / width).round() as usize + 1;

    let mut histogram: Vec<(f64, f64)> =
        (1..=bins).map(|i| (min + width * i as f64, 0.0)).collect();

    for sample in sorted {
        if let Some(bin) = histogram.iter_mut().find(|(bound, _)| sample.value <= *bound) {
            bin.1 += sample.weight;
        }
    }

    histogram
}

#[cfg(test)]
mod tests {
    use super::{summarize, Sample, PERCENTILE_LEVELS};

    fn unweighted(values: &[f64]) -> Vec<Sample> {
        values.iter().copied().map(Sample::unweighted).collect()
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-7,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_empty_sample() {
        let summary = summarize(&[]);

        assert_eq!(summary.n, 0);
        assert_eq!(summary.min, 0.0);
        assert_eq!(summary.max, 0.0);
        assert_eq!(summary.arithmetic_mean, 0.0);
        assert_eq!(summary.variance, 0.0);
        assert_eq!(summary.skewness, 0.0);
        assert_eq!(summary.kurtosis, 0.0);
        assert_eq!(
            summary.percentile,
            PERCENTILE_LEVELS.iter().map(|p| (*p, 0.0)).collect::<Vec<_>>()
        );
        assert_eq!(summary.histogram, vec![(0.0, 0.0)]);
    }

    #[test]
    fn test_three_point_sample() {
        let summary = summarize(&unweighted(&[1.0, 2.0, 3.0]));

        assert_eq!(summary.n, 3);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 3.0);
        assert_close(summary.arithmetic_mean, 2.0);
        assert_close(summary.median, 2.0);
        assert_close(summary.variance, 1.0);
        assert_close(summary.standard_deviation, 1.0);
        assert_close(summary.skewness, 0.0);
        assert_close(summary.kurtosis, -2.3333333333333335);
        assert_close(summary.harmonic_mean, 1.6363636363636365);
        assert_close(summary.geometric_mean, 1.8171205928321397);
        assert_eq!(summary.histogram, vec![(3.0, 3.0), (5.0, 0.0)]);
    }

    #[test]
    fn test_wider_sample() {
        let summary = summarize(&unweighted(&[1.5, 2.5, 2.5, 2.75, 3.25, 3.26, 4.75]));

        assert_eq!(summary.n, 7);
        assert_close(summary.arithmetic_mean, 2.93);
        assert_close(summary.geometric_mean, 2.784379085700406);
        assert_close(summary.harmonic_mean, 2.6362666258180956);
        assert_close(summary.variance, 0.9951333333333333);
        assert_close(summary.standard_deviation, 0.9975636988851055);
        assert_close(summary.skewness, 0.4329020512437358);
        assert_close(summary.kurtosis, -0.8007344003569115);
        assert_close(summary.median, 2.75);
        assert_eq!(summary.histogram, vec![(3.5, 6.0), (5.5, 1.0), (7.5, 0.0)]);
    }

    #[test]
    fn test_constant_sample_round_trip() {
        let summary = summarize(&unweighted(&[4.2; 10]));

        assert_eq!(summary.n, 10);
        assert_eq!(summary.min, 4.2);
        assert_eq!(summary.max, 4.2);
        assert_eq!(summary.arithmetic_mean, 4.2);
        assert_eq!(summary.variance, 0.0);
        assert_eq!(summary.skewness, 0.0);
        assert_eq!(summary.kurtosis, 0.0);
        for (_, value) in &summary.percentile {
            assert_eq!(*value, 4.2);
        }
        // One unit-wide bin holds the whole sample.
        assert_eq!(summary.histogram, vec![(5.2, 10.0)]);
    }

    #[test]
    fn test_single_sample() {
        let summary = summarize(&unweighted(&[2.5]));

        assert_eq!(summary.n, 1);
        assert_eq!(summary.min, 2.5);
        assert_eq!(summary.max, 2.5);
        assert_eq!(summary.arithmetic_mean, 2.5);
        assert_eq!(summary.variance, 0.0);
        assert_eq!(summary.median, 2.5);
        assert_eq!(summary.histogram, vec![(0.0, 0.0)]);
    }

    #[test]
    fn test_percentile_interpolation() {
        let summary = summarize(&unweighted(&[1.5, 2.5, 2.5, 2.75, 3.25, 3.26, 4.75]));

        let levels: Vec<f64> = summary.percentile.iter().map(|(p, _)| *p).collect();
        assert_eq!(levels, PERCENTILE_LEVELS.to_vec());

        // Position 0.5 lands exactly on the fourth order statistic.
        assert_close(summary.percentile[0].1, 2.75);
        // 0.75 falls between the fifth and sixth: 3.25 + 0.75 · 0.01.
        assert_close(summary.percentile[1].1, 3.2575);
        // Levels past the last midpoint clamp to the maximum.
        assert_close(summary.percentile[4].1, 4.75);
        assert_close(summary.percentile[5].1, 4.75);
    }

    #[test]
    fn test_weights_shift_the_mean() {
        let heavy_tail = [
            Sample::weighted(1.0, 1.0),
            Sample::weighted(2.0, 1.0),
            Sample::weighted(10.0, 8.0),
        ];
        let summary = summarize(&heavy_tail);

        assert_eq!(summary.n, 3);
        assert_close(summary.arithmetic_mean, 8.3);
        // The heavy sample dominates the upper percentiles.
        assert_eq!(summary.percentile[5].1, 10.0);
        // And carries its full weight into its bin.
        let total: f64 = summary.histogram.iter().map(|(_, w)| w).sum();
        assert_close(total, 10.0);
    }

    #[test]
    fn test_weighted_median_tracks_weight_mass() {
        let samples = [Sample::weighted(1.0, 9.0), Sample::weighted(2.0, 1.0)];
        let summary = summarize(&samples);

        // Midpoint positions are 0.45 and 0.95; the median interpolates a
        // tenth of the way toward the light sample.
        assert_close(summary.median, 1.1);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 2.0);
    }
}
