use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = core::result::Result<T, TrendError>;

/// Errors raised by the smoothing, trend and regression calculators.
///
/// Configuration errors are raised at construction, everything else at the
/// call that hit the condition. Nothing is retried internally.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrendError {
    /// Smoothing period must be at least 1
    #[error("invalid period: {0} (must be >= 1)")]
    InvalidPeriod(usize),

    /// Smoothing coefficient must be positive and finite
    #[error("invalid smoothing coefficient: {0} (must be > 0 and finite)")]
    InvalidSmoothingCoefficient(f64),

    /// Flat range must be non-negative and finite
    #[error("invalid flat range: {0} (must be >= 0 and finite)")]
    InvalidFlatRange(f64),

    /// Window capacity is below the minimum
    #[error("invalid window capacity: {got} (must be at least {min})")]
    InvalidCapacity {
        /// Capacity provided
        got: usize,
        /// Minimum capacity
        min: usize,
    },

    /// Desired probability must lie strictly between 0 and 1
    #[error("invalid desired probability: {0} (must be > 0 and < 1)")]
    InvalidProbability(f64),

    /// Trial budget must be at least 1
    #[error("invalid max trials: {0} (must be >= 1)")]
    InvalidMaxTrials(usize),

    /// Residual threshold must be positive and finite
    #[error("invalid residual threshold: {0} (must be > 0 and finite)")]
    InvalidThreshold(f64),

    /// Fit requested on an empty window
    #[error("no data to fit the model")]
    NoData,

    /// Fit requested on fewer samples than a candidate line needs
    #[error("too few samples: got {got}, need at least {min}")]
    TooFewSamples {
        /// Samples available
        got: usize,
        /// Samples required
        min: usize,
    },

    /// No trial produced a single inlier; the previous fit, if any, is kept
    #[error("no model found after {trials} trials")]
    NoModelFound {
        /// Trials that were run
        trials: usize,
    },

    /// Prediction requested before any successful fit
    #[error("model has not been fitted")]
    NotFitted,
}

impl TrendError {
    /// Returns `true` for errors raised while validating construction parameters
    pub const fn is_config(&self) -> bool {
        matches!(
            self,
            Self::InvalidPeriod(_)
                | Self::InvalidSmoothingCoefficient(_)
                | Self::InvalidFlatRange(_)
                | Self::InvalidCapacity { .. }
                | Self::InvalidProbability(_)
                | Self::InvalidMaxTrials(_)
                | Self::InvalidThreshold(_)
        )
    }
}
