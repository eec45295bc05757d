//! Entropy-rate anomaly over a series of signal windows.
//!
//! Each window component is mapped through `h(x) = x ln(x + eps)`. For every
//! consecutive pair of windows the summed absolute change in `h`, normalized
//! by `dt * width`, is a rate; rates above `tau` accumulate into an anomaly
//! total.
//!
//! # Fidelity gate
//!
//! After all pairs are scored a fidelity proxy `F = 1 - total * slope` is
//! derived. It is a heuristic confidence figure, not a measured quantity.
//! When `F` falls below the threshold the total is multiplied by the penalty
//! exactly once and a warning is logged. The gate never turns into an error.

use serde::{Deserialize, Serialize};

use crate::config::EntropyConfig;
use crate::error::ScoringError;

/// One time-sampled observation vector.
pub type SignalWindow = Vec<f64>;

/// Outcome of one estimation, including the fidelity gate state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntropyRateReport {
    /// Final score: penalized total divided by the number of pairs.
    pub score: f64,
    /// Accumulated anomaly before any penalty.
    pub raw_total: f64,
    /// Heuristic fidelity proxy.
    pub fidelity: f64,
    /// Whether the low-fidelity penalty was applied.
    pub penalized: bool,
    /// Consecutive window pairs evaluated.
    pub pairs: usize,
    /// Pairs whose rate exceeded tau.
    pub flagged_pairs: usize,
}

impl EntropyRateReport {
    fn degenerate() -> Self {
        Self {
            score: 0.0,
            raw_total: 0.0,
            fidelity: 1.0,
            penalized: false,
            pairs: 0,
            flagged_pairs: 0,
        }
    }
}

/// Entropy-rate estimator with a fidelity-gated penalty.
#[derive(Debug, Clone, Default)]
pub struct EntropyRateEstimator {
    config: EntropyConfig,
}

impl EntropyRateEstimator {
    pub fn new(config: EntropyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EntropyConfig {
        &self.config
    }

    /// Score only. See [`Self::estimate_detailed`].
    pub fn estimate(&self, series: &[SignalWindow]) -> Result<f64, ScoringError> {
        self.estimate_detailed(series).map(|r| r.score)
    }

    /// Score a series of equal-width windows.
    ///
    /// An empty series, an empty first window, or a single window score 0.0.
    /// Otherwise every window must match the first one's width, or the call
    /// fails with [`ScoringError::ShapeMismatch`].
    pub fn estimate_detailed(
        &self,
        series: &[SignalWindow],
    ) -> Result<EntropyRateReport, ScoringError> {
        let Some(first) = series.first() else {
            return Ok(EntropyRateReport::degenerate());
        };
        let width = first.len();
        if width == 0 || series.len() < 2 {
            return Ok(EntropyRateReport::degenerate());
        }
        if let Some(bad) = series.iter().find(|w| w.len() != width) {
            return Err(ScoringError::ShapeMismatch {
                what: "signal window",
                expected: width,
                got: bad.len(),
            });
        }

        let cfg = &self.config;
        let mut total = 0.0;
        let mut flagged_pairs = 0;
        for pair in series.windows(2) {
            let (prev, cur) = (&pair[0], &pair[1]);
            let delta: f64 = prev
                .iter()
                .zip(cur)
                .map(|(&a, &b)| (self.entropy_term(b) - self.entropy_term(a)).abs())
                .sum();
            let rate = delta / cfg.dt / width as f64;
            if rate > cfg.tau {
                total += rate;
                flagged_pairs += 1;
            }
        }

        let raw_total = total;
        let fidelity = 1.0 - total * cfg.fidelity_slope;
        let penalized = fidelity < cfg.fidelity_threshold;
        if penalized {
            log::warn!(
                target: "qsfm_core::entropy_rate",
                "low fidelity: F={fidelity:.3} < {:.3}, applying x{} penalty",
                cfg.fidelity_threshold,
                cfg.penalty
            );
            total *= cfg.penalty;
        }

        let pairs = series.len() - 1;
        Ok(EntropyRateReport {
            score: total / pairs as f64,
            raw_total,
            fidelity,
            penalized,
            pairs,
            flagged_pairs,
        })
    }

    fn entropy_term(&self, x: f64) -> f64 {
        x * (x + self.config.epsilon).ln()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn estimator() -> EntropyRateEstimator {
        EntropyRateEstimator::default()
    }

    fn h(x: f64) -> f64 {
        x * (x + 1e-10).ln()
    }

    // -----------------------------------------------------------------------
    // Base cases
    // -----------------------------------------------------------------------

    #[test]
    fn empty_series_is_zero() {
        assert_eq!(estimator().estimate(&[]).unwrap(), 0.0);
    }

    #[test]
    fn empty_windows_are_zero() {
        assert_eq!(estimator().estimate(&[vec![], vec![]]).unwrap(), 0.0);
    }

    #[test]
    fn empty_first_window_is_zero_regardless_of_rest() {
        assert_eq!(estimator().estimate(&[vec![], vec![0.5]]).unwrap(), 0.0);
        let r = estimator()
            .estimate_detailed(&[vec![], vec![0.1, 0.9], vec![0.3]])
            .unwrap();
        assert_eq!(r.score, 0.0);
        assert_eq!(r.pairs, 0);
    }

    #[test]
    fn later_empty_window_is_rejected() {
        let err = estimator().estimate(&[vec![0.5], vec![]]).unwrap_err();
        assert_eq!(
            err,
            ScoringError::ShapeMismatch {
                what: "signal window",
                expected: 1,
                got: 0
            }
        );
    }

    #[test]
    fn single_window_is_zero() {
        assert_eq!(estimator().estimate(&[vec![0.2, 0.7, 0.1]]).unwrap(), 0.0);
    }

    #[test]
    fn identical_windows_are_zero() {
        let w = vec![0.5; 5];
        let r = estimator().estimate_detailed(&[w.clone(), w]).unwrap();
        assert_eq!(r.score, 0.0);
        assert_eq!(r.fidelity, 1.0);
        assert!(!r.penalized);
        assert_eq!(r.pairs, 1);
    }

    #[test]
    fn constant_series_is_zero() {
        let series = vec![vec![0.5; 5]; 10];
        assert_eq!(estimator().estimate(&series).unwrap(), 0.0);
    }

    #[test]
    fn ragged_windows_are_rejected() {
        let err = estimator()
            .estimate(&[vec![0.1, 0.2], vec![0.1, 0.2], vec![0.3]])
            .unwrap_err();
        assert_eq!(
            err,
            ScoringError::ShapeMismatch {
                what: "signal window",
                expected: 2,
                got: 1
            }
        );
    }

    // -----------------------------------------------------------------------
    // Rate accumulation and the fidelity gate
    // -----------------------------------------------------------------------

    #[test]
    fn rate_below_tau_is_ignored() {
        // A tiny change with a large dt keeps the rate under tau.
        let est = EntropyRateEstimator::new(EntropyConfig {
            dt: 1.0,
            ..EntropyConfig::default()
        });
        let r = est
            .estimate_detailed(&[vec![0.5], vec![0.5001]])
            .unwrap();
        assert_eq!(r.score, 0.0);
        assert_eq!(r.flagged_pairs, 0);
    }

    #[test]
    fn high_fidelity_is_not_penalized() {
        let est = EntropyRateEstimator::new(EntropyConfig {
            dt: 1.0,
            ..EntropyConfig::default()
        });
        let a = vec![0.5, 0.5];
        let b = vec![0.6, 0.5];
        let r = est.estimate_detailed(&[a, b]).unwrap();
        let expected = (h(0.6) - h(0.5)).abs() / 2.0;
        assert!(expected > 0.01);
        assert!((r.raw_total - expected).abs() < 1e-12);
        assert!(!r.penalized);
        assert!((r.score - expected).abs() < 1e-12);
    }

    #[test]
    fn low_fidelity_penalty_applies_once() {
        // Default dt of 1us drives the rate far above tau and F well below 0.9.
        let series = vec![vec![0.2, 0.4], vec![0.3, 0.4], vec![0.2, 0.4]];
        let r = estimator().estimate_detailed(&series).unwrap();

        let per_pair = (h(0.3) - h(0.2)).abs() / 1e-6 / 2.0;
        let raw_total = 2.0 * per_pair;
        assert!((r.raw_total - raw_total).abs() / raw_total < 1e-12);
        assert!(r.fidelity < 0.9);
        assert!(r.penalized);
        assert_eq!(r.flagged_pairs, 2);

        let expected = raw_total * 1.2 / 2.0;
        assert!((r.score - expected).abs() / expected < 1e-12);
    }

    #[test]
    fn zero_tau_still_requires_positive_rate() {
        let est = EntropyRateEstimator::new(EntropyConfig {
            dt: 1.0,
            tau: 0.0,
            ..EntropyConfig::default()
        });
        let r = est.estimate_detailed(&[vec![0.0], vec![0.0]]).unwrap();
        assert_eq!(r.flagged_pairs, 0);
        assert!(!r.penalized);
        assert_eq!(r.fidelity, 1.0);
    }

    #[test]
    fn zero_component_is_finite() {
        let r = estimator()
            .estimate_detailed(&[vec![0.0, 0.5], vec![0.5, 0.0]])
            .unwrap();
        assert!(r.score.is_finite());
        assert!(r.penalized);
    }
}
