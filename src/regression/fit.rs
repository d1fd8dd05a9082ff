use alloc::vec::Vec;

use crate::Line;

/// Outcome of a successful robust fit.
///
/// Replaced wholesale by every successful fit and left untouched by a failed
/// one, so it may describe an older window than the regressor currently holds.
#[derive(Debug, Clone, PartialEq)]
pub struct FitResult<T> {
    /// Least squares line over the inliers
    pub(crate) line: Line<T>,
    /// 1-based positions of the inliers, ascending
    pub(crate) inliers: Vec<usize>,
    /// Number of samples in the fitted series
    pub(crate) sample_count: usize,
    /// Trials that were run
    pub(crate) trials: usize,
    /// Residual threshold the inliers were scored against
    pub(crate) residual_threshold: T,
}

impl<T: Copy> FitResult<T> {
    /// Returns the fitted line
    pub const fn line(&self) -> Line<T> {
        self.line
    }

    /// Returns the intercept of the fitted line
    pub const fn intercept(&self) -> T {
        self.line.intercept
    }

    /// Returns the slope of the fitted line
    pub const fn slope(&self) -> T {
        self.line.slope
    }

    /// Returns the 1-based positions that supported the winning candidate, ascending
    pub fn inliers(&self) -> &[usize] {
        &self.inliers
    }

    /// Returns `true` if the 1-based `position` was scored as an inlier
    pub fn is_inlier(&self, position: usize) -> bool {
        self.inliers.binary_search(&position).is_ok()
    }

    /// Returns the number of samples the model was fitted on
    pub const fn sample_count(&self) -> usize {
        self.sample_count
    }

    /// Returns the number of trials that were run
    pub const fn trials(&self) -> usize {
        self.trials
    }

    /// Returns the residual threshold used for inlier scoring
    pub const fn residual_threshold(&self) -> T {
        self.residual_threshold
    }
}
