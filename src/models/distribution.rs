//! Probabilistic duration distributions for contingent constraints.
//!
//! A contingent constraint carries a [`DurationDistribution`] describing the
//! stochastic duration between its trigger and target timepoints. The risk
//! calibration LP consumes two views of a distribution:
//!
//! - [`quantile`](DurationDistribution::quantile): inverse CDF, used to turn
//!   a per-tail risk allowance into a duration bound
//! - [`tail_limits`](DurationDistribution::tail_limits): fixed extreme-tail
//!   bounds that cap how much interval width a slack variable may recover
//!
//! # References
//!
//! - Lund et al. (2017), "Robust Execution of Probabilistic Temporal Plans"
//! - Malcolm et al. (1959), "Application of a technique for R&D program evaluation"

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

/// Probability mass assumed to lie below the Gaussian upper tail limit.
///
/// Durations beyond the `[q(0.003), q(0.997)]` interval are treated as
/// unrecoverable; slack variables may not widen a bound past these limits.
const GAUSSIAN_TAIL_UPPER: f64 = 0.997;
const GAUSSIAN_TAIL_LOWER: f64 = 0.003;

/// Duration distribution of a contingent constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DurationDistribution {
    /// Normally distributed duration.
    Gaussian { mean: f64, std_dev: f64 },
    /// Uniformly distributed duration over `[lower, upper]`.
    Uniform { lower: f64, upper: f64 },
}

impl DurationDistribution {
    /// Creates a Gaussian duration distribution.
    pub fn gaussian(mean: f64, std_dev: f64) -> Self {
        Self::Gaussian { mean, std_dev }
    }

    /// Creates a uniform duration distribution.
    pub fn uniform(lower: f64, upper: f64) -> Self {
        Self::Uniform { lower, upper }
    }

    /// Expected duration.
    pub fn mean(&self) -> f64 {
        match self {
            Self::Gaussian { mean, .. } => *mean,
            Self::Uniform { lower, upper } => (lower + upper) / 2.0,
        }
    }

    /// Whether the distribution carries no uncertainty.
    ///
    /// A degenerate contingent duration behaves like a fixed requirement
    /// constraint of its mean.
    pub fn is_degenerate(&self) -> bool {
        match self {
            Self::Gaussian { std_dev, .. } => *std_dev == 0.0,
            Self::Uniform { lower, upper } => lower == upper,
        }
    }

    /// Inverse CDF: the value below which probability mass `p` lies.
    ///
    /// For the Gaussian family, `p <= 0` and `p >= 1` map to `-inf`/`+inf`;
    /// a degenerate distribution collapses to its mean. The uniform inverse
    /// CDF is linear interpolation over the support, with `p` clamped to
    /// `[0, 1]`.
    pub fn quantile(&self, p: f64) -> f64 {
        match self {
            Self::Gaussian { mean, std_dev } => {
                if !(*std_dev > 0.0) {
                    return *mean;
                }
                if p <= 0.0 {
                    return f64::NEG_INFINITY;
                }
                if p >= 1.0 {
                    return f64::INFINITY;
                }
                Normal::new(*mean, *std_dev)
                    .map(|n| n.inverse_cdf(p))
                    .unwrap_or(*mean)
            }
            Self::Uniform { lower, upper } => {
                let p = p.clamp(0.0, 1.0);
                lower + p * (upper - lower)
            }
        }
    }

    /// Fixed extreme-tail limits `(limit_ij, limit_ji)` for slack caps.
    ///
    /// `limit_ij` bounds the revised upper duration, `limit_ji` is the
    /// negated bound on the revised lower duration. For the Gaussian family
    /// the limits sit at the 0.997/0.003 quantiles; uniform support is
    /// finite, so the limits are the exact support bounds and no probability
    /// mass exists beyond them.
    pub fn tail_limits(&self) -> (f64, f64) {
        match self {
            Self::Gaussian { .. } => (
                self.quantile(GAUSSIAN_TAIL_UPPER),
                -self.quantile(GAUSSIAN_TAIL_LOWER),
            ),
            Self::Uniform { .. } => (self.quantile(1.0), -self.quantile(0.0)),
        }
    }

    /// Bounded `(lower, upper)` interval approximating the distribution.
    ///
    /// Gaussian durations are bounded at two standard deviations around the
    /// mean; uniform durations use their exact support. This is the
    /// contingent-interval view consumed by the strong-controllability LP.
    pub fn bounded_interval(&self) -> (f64, f64) {
        match self {
            Self::Gaussian { mean, std_dev } => (mean - 2.0 * std_dev, mean + 2.0 * std_dev),
            Self::Uniform { lower, upper } => (*lower, *upper),
        }
    }

    /// Draws a duration from the distribution.
    pub fn sample<R: rand::Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        use rand_distr::Distribution as _;

        match self {
            Self::Gaussian { mean, std_dev } => rand_distr::Normal::new(*mean, *std_dev)
                .map(|n| n.sample(rng))
                .unwrap_or(*mean),
            Self::Uniform { lower, upper } => {
                if lower == upper {
                    *lower
                } else {
                    rng.random_range(*lower..*upper)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_gaussian_quantile_values() {
        let d = DurationDistribution::gaussian(10.0, 2.0);

        // Median equals the mean
        assert!((d.quantile(0.5) - 10.0).abs() < 1e-9);

        // z(0.95) ~ 1.6449
        assert!((d.quantile(0.95) - 13.2897).abs() < 0.001);

        // Symmetry around the mean
        assert!((d.quantile(0.95) + d.quantile(0.05) - 20.0).abs() < 1e-6);
    }

    #[test]
    fn test_gaussian_quantile_extremes() {
        let d = DurationDistribution::gaussian(10.0, 2.0);
        assert_eq!(d.quantile(0.0), f64::NEG_INFINITY);
        assert_eq!(d.quantile(1.0), f64::INFINITY);
    }

    #[test]
    fn test_gaussian_degenerate_collapses_to_mean() {
        let d = DurationDistribution::gaussian(7.0, 0.0);
        assert!(d.is_degenerate());
        assert_eq!(d.quantile(0.01), 7.0);
        assert_eq!(d.quantile(0.99), 7.0);
    }

    #[test]
    fn test_uniform_quantile() {
        let d = DurationDistribution::uniform(8.0, 12.0);
        assert_eq!(d.quantile(0.0), 8.0);
        assert_eq!(d.quantile(0.5), 10.0);
        assert_eq!(d.quantile(1.0), 12.0);

        // Clamped outside [0, 1]
        assert_eq!(d.quantile(-0.5), 8.0);
        assert_eq!(d.quantile(1.5), 12.0);
    }

    #[test]
    fn test_gaussian_tail_limits() {
        let d = DurationDistribution::gaussian(10.0, 2.0);
        let (upper, lower) = d.tail_limits();

        // z(0.997) ~ 2.7478
        assert!((upper - 15.4956).abs() < 0.001);
        assert!((lower - (-4.5044)).abs() < 0.001);
    }

    #[test]
    fn test_uniform_tail_limits_are_support_bounds() {
        let d = DurationDistribution::uniform(8.0, 12.0);
        assert_eq!(d.tail_limits(), (12.0, -8.0));
    }

    #[test]
    fn test_bounded_interval() {
        let g = DurationDistribution::gaussian(10.0, 2.0);
        assert_eq!(g.bounded_interval(), (6.0, 14.0));

        let u = DurationDistribution::uniform(8.0, 12.0);
        assert_eq!(u.bounded_interval(), (8.0, 12.0));
    }

    #[test]
    fn test_mean() {
        assert_eq!(DurationDistribution::gaussian(10.0, 2.0).mean(), 10.0);
        assert_eq!(DurationDistribution::uniform(8.0, 12.0).mean(), 10.0);
    }

    #[test]
    fn test_sample_uniform_within_support() {
        let d = DurationDistribution::uniform(8.0, 12.0);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let v = d.sample(&mut rng);
            assert!((8.0..12.0).contains(&v));
        }
    }

    #[test]
    fn test_sample_degenerate() {
        let mut rng = StdRng::seed_from_u64(7);
        let d = DurationDistribution::uniform(5.0, 5.0);
        assert_eq!(d.sample(&mut rng), 5.0);
    }

    #[test]
    fn test_serde_roundtrip() {
        let d = DurationDistribution::gaussian(10.0, 2.0);
        let json = serde_json::to_string(&d).unwrap();
        assert!(json.contains("\"kind\":\"gaussian\""));

        let back: DurationDistribution = serde_json::from_str(&json).unwrap();
        assert_eq!(back, d);
    }
}
