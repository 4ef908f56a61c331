//! Sample statistics for the trial harness: summary, normal-approximation
//! confidence interval, one-sided z-test. Everything returns `None` below
//! its minimum sample size; nothing here produces NaN.

use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};

fn unit_normal() -> Normal {
    Normal::new(0.0, 1.0).expect("unit normal")
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct SampleSummary {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
}

/// Mean and sample standard deviation. Needs at least two samples for the
/// spread to be defined.
pub fn summarize(values: &[f64]) -> Option<SampleSummary> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    Some(SampleSummary {
        count: values.len(),
        mean,
        std_dev: variance.sqrt(),
    })
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ConfidenceInterval {
    pub confidence: f64,
    pub low: f64,
    pub high: f64,
}

/// Normal-approximation interval for the population mean. `confidence` is
/// the coverage, e.g. 0.95.
pub fn confidence_interval(summary: &SampleSummary, confidence: f64) -> Option<ConfidenceInterval> {
    if confidence <= 0.0 || confidence >= 1.0 {
        return None;
    }
    let quantile = unit_normal().inverse_cdf(0.5 + confidence / 2.0);
    let half_width = quantile * summary.std_dev / (summary.count as f64).sqrt();
    Some(ConfidenceInterval {
        confidence,
        low: summary.mean - half_width,
        high: summary.mean + half_width,
    })
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ZTest {
    pub z: f64,
    pub p_value: f64,
}

/// One-sided upper-tail z-test of whether the population mean exceeds
/// `threshold`. Undefined for a zero-spread sample (a point mass has no
/// standard error), so that case returns `None` instead of an infinite z.
pub fn upper_tail_z_test(summary: &SampleSummary, threshold: f64) -> Option<ZTest> {
    if summary.std_dev <= 0.0 {
        return None;
    }
    let standard_error = summary.std_dev / (summary.count as f64).sqrt();
    let z = (summary.mean - threshold) / standard_error;
    let p_value = 1.0 - unit_normal().cdf(z);
    Some(ZTest { z, p_value })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tol: f64) {
        assert!((a - b).abs() <= tol, "expected {b}, got {a}");
    }

    #[test]
    fn summarize_needs_two_samples() {
        assert!(summarize(&[]).is_none());
        assert!(summarize(&[5.0]).is_none());
        assert!(summarize(&[5.0, 5.0]).is_some());
    }

    #[test]
    fn summarize_matches_hand_computation() {
        let summary = summarize(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        approx_eq(summary.mean, 5.0, 1e-12);
        // Sample variance 32/7.
        approx_eq(summary.std_dev, (32.0_f64 / 7.0).sqrt(), 1e-12);
        assert_eq!(summary.count, 8);
    }

    #[test]
    fn confidence_interval_uses_the_normal_quantile() {
        let summary = SampleSummary {
            count: 100,
            mean: 50.0,
            std_dev: 10.0,
        };
        let ci = confidence_interval(&summary, 0.95).unwrap();
        approx_eq(ci.low, 50.0 - 1.959963984540054, 1e-9);
        approx_eq(ci.high, 50.0 + 1.959963984540054, 1e-9);
    }

    #[test]
    fn zero_spread_gives_a_degenerate_interval_but_no_test() {
        let summary = summarize(&[3.0, 3.0, 3.0]).unwrap();
        let ci = confidence_interval(&summary, 0.95).unwrap();
        approx_eq(ci.low, 3.0, 1e-12);
        approx_eq(ci.high, 3.0, 1e-12);
        assert!(upper_tail_z_test(&summary, 2.0).is_none());
    }

    #[test]
    fn bad_confidence_levels_are_rejected() {
        let summary = SampleSummary {
            count: 10,
            mean: 0.0,
            std_dev: 1.0,
        };
        assert!(confidence_interval(&summary, 0.0).is_none());
        assert!(confidence_interval(&summary, 1.0).is_none());
    }

    #[test]
    fn z_test_matches_hand_computation() {
        let summary = SampleSummary {
            count: 4,
            mean: 10.0,
            std_dev: 2.0,
        };
        let test = upper_tail_z_test(&summary, 8.0).unwrap();
        approx_eq(test.z, 2.0, 1e-12);
        approx_eq(test.p_value, 0.02275013194817921, 1e-9);
    }

    #[test]
    fn z_test_p_value_is_large_when_mean_is_below_threshold() {
        let summary = SampleSummary {
            count: 25,
            mean: 90.0,
            std_dev: 10.0,
        };
        let test = upper_tail_z_test(&summary, 100.0).unwrap();
        assert!(test.p_value > 0.99, "p={}", test.p_value);
    }
}
