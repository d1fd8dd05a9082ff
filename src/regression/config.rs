use num_traits::Float;
use tracing::debug;

use crate::{Kbn, Result, TrendError, helper::least_squares_series};

/// Points drawn per trial; two points determine a line
pub const MIN_SAMPLES: usize = 2;

/// Share of the window assumed to be outliers when deriving the trial count
pub const OUTLIER_RATIO: f64 = 0.5;

/// Floor for a derived residual threshold of exactly zero
pub const MIN_RESIDUAL_THRESHOLD: f64 = 1e-6;

/// How many trials a fit runs and how far a point may sit from a candidate line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrialBudget<T> {
    /// Derive both from the data on every fit.
    ///
    /// The trial count guarantees, with `desired_probability`, that at least one
    /// trial draws two inliers under [`OUTLIER_RATIO`]. The threshold is the
    /// root mean squared residual of a least squares line over the whole window.
    Adaptive {
        /// Confidence of drawing one all-inlier pair, in `(0, 1)`
        desired_probability: f64,
    },
    /// Pin both for determinism or domain knowledge.
    Fixed {
        /// Number of trials, at least 1
        max_trials: usize,
        /// Largest residual, exclusive, for a point to count as an inlier
        residual_threshold: T,
    },
}

impl<T: Float> TrialBudget<T> {
    /// Shorthand for [`TrialBudget::Adaptive`]
    pub const fn adaptive(desired_probability: f64) -> Self {
        Self::Adaptive {
            desired_probability,
        }
    }

    /// Shorthand for [`TrialBudget::Fixed`]
    pub const fn fixed(max_trials: usize, residual_threshold: T) -> Self {
        Self::Fixed {
            max_trials,
            residual_threshold,
        }
    }

    /// Checks the parameters
    ///
    /// # Returns
    ///
    /// * `Result<()>` - `InvalidProbability`, `InvalidMaxTrials` or `InvalidThreshold`
    ///   for out of range parameters
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::Adaptive {
                desired_probability,
            } => {
                if desired_probability > 0.0 && desired_probability < 1.0 {
                    Ok(())
                } else {
                    Err(TrendError::InvalidProbability(desired_probability))
                }
            }
            Self::Fixed {
                max_trials,
                residual_threshold,
            } => {
                if max_trials == 0 {
                    return Err(TrendError::InvalidMaxTrials(max_trials));
                }
                if !residual_threshold.is_finite() || residual_threshold <= T::zero() {
                    return Err(TrendError::InvalidThreshold(
                        residual_threshold.to_f64().unwrap_or(f64::NAN),
                    ));
                }
                Ok(())
            }
        }
    }
}

impl<T: Float + Default> TrialBudget<T> {
    /// Resolves the trial count and residual threshold for a series
    ///
    /// Returns `None` when the threshold has to be derived from fewer than two samples.
    pub(crate) fn resolve(&self, ys: &[T]) -> Option<(usize, T)> {
        match *self {
            Self::Adaptive {
                desired_probability,
            } => {
                let trials = required_trials(desired_probability);
                debug!(trials, desired_probability, "derived trial budget");
                Some((trials, derive_residual_threshold(ys)?))
            }
            Self::Fixed {
                max_trials,
                residual_threshold,
            } => Some((max_trials, residual_threshold)),
        }
    }
}

/// Returns the number of trials needed to draw one all-inlier pair
///
/// `ceil(ln(1 - p) / ln(1 - (1 - OUTLIER_RATIO)^MIN_SAMPLES))`, never below 1.
///
/// # Arguments
///
/// * `desired_probability` - The confidence `p`, in `(0, 1)`
///
/// # Examples
///
/// ```
/// use ta_trend::required_trials;
///
/// assert_eq!(required_trials(0.99), 17);
/// assert_eq!(required_trials(0.5), 3);
/// ```
pub fn required_trials(desired_probability: f64) -> usize {
    let inlier_pair = Float::powi(1.0 - OUTLIER_RATIO, MIN_SAMPLES as i32);
    let trials = Float::ceil(Float::ln(1.0 - desired_probability) / Float::ln(1.0 - inlier_pair));
    if trials.is_finite() && trials >= 1.0 {
        trials as usize
    } else {
        1
    }
}

/// Returns the root mean squared residual of a least squares line over the series
///
/// A result of exactly zero, as for a perfectly linear series, is floored at
/// [`MIN_RESIDUAL_THRESHOLD`] so the exact points still score as inliers.
///
/// # Returns
///
/// * `Option<T>` - The threshold, or `None` for fewer than two samples
pub fn derive_residual_threshold<T: Float + Default>(ys: &[T]) -> Option<T> {
    let line = least_squares_series(ys)?;

    let mut sum_sq = Kbn::<T>::default();
    for (i, &y) in ys.iter().enumerate() {
        let residual = y - line.at(T::from(i + 1)?);
        sum_sq += residual * residual;
    }
    let variance = sum_sq.total() / T::from(ys.len())?;
    let threshold = variance.sqrt();
    debug!(residual_threshold = ?threshold.to_f64(), "derived residual threshold");

    if threshold.is_zero() {
        debug!(floor = MIN_RESIDUAL_THRESHOLD, "residual threshold was zero, flooring");
        return T::from(MIN_RESIDUAL_THRESHOLD);
    }
    Some(threshold)
}
