use alloc::vec::Vec;

use num_traits::Float;
use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::{debug, warn};

use crate::{
    BoundedWindow, FitResult, Line, MIN_SAMPLES, Result, TrendError, TrialBudget,
    helper::{least_squares, line_through, positioned},
};

/// Sliding-window robust line regressor (random sample consensus).
///
/// Samples are appended to a [`BoundedWindow`]; [`fit`](Self::fit) places the
/// window contents at `x = 1..=n` and runs a fixed number of trials. Each trial
/// draws two distinct positions, takes the exact line through them and counts
/// the samples whose residual is strictly below the threshold. The candidate
/// with the most inliers (first found on ties) is refitted by least squares
/// over its inliers and kept until the next successful fit.
///
/// Randomness comes from the injected generator `R`, so a seeded generator
/// reproduces every trial, the winning candidate and its tie-break.
///
/// Not internally synchronized; share an instance across threads only behind
/// external locking.
#[derive(Debug, Clone)]
pub struct RobustLineRegressor<T, R = StdRng> {
    /// Trial count and threshold policy
    budget: TrialBudget<T>,
    /// Most recent samples
    window: BoundedWindow<T>,
    /// Source of trial draws
    rng: R,
    /// Last successful fit
    fit: Option<FitResult<T>>,
    /// Whether the last fit attempt failed after an earlier success
    stale: bool,
}

#[cfg(feature = "std")]
impl<T> RobustLineRegressor<T, StdRng>
where
    T: Float + Default,
{
    /// Creates a regressor seeded from the operating system
    ///
    /// # Arguments
    ///
    /// * `budget` - The trial count and threshold policy
    /// * `capacity` - The window capacity, at least 2
    ///
    /// # Returns
    ///
    /// * `Result<Self>` - The regressor, or a configuration error
    pub fn new(budget: TrialBudget<T>, capacity: usize) -> Result<Self> {
        Self::with_rng(budget, capacity, StdRng::from_os_rng())
    }
}

impl<T> RobustLineRegressor<T, StdRng>
where
    T: Float + Default,
{
    /// Creates a regressor with a deterministic generator
    ///
    /// # Arguments
    ///
    /// * `budget` - The trial count and threshold policy
    /// * `capacity` - The window capacity, at least 2
    /// * `seed` - The generator seed
    ///
    /// # Returns
    ///
    /// * `Result<Self>` - The regressor, or a configuration error
    pub fn seeded(budget: TrialBudget<T>, capacity: usize, seed: u64) -> Result<Self> {
        Self::with_rng(budget, capacity, StdRng::seed_from_u64(seed))
    }
}

impl<T, R> RobustLineRegressor<T, R>
where
    T: Float + Default,
    R: Rng,
{
    /// Creates a regressor drawing trials from `rng`
    ///
    /// # Arguments
    ///
    /// * `budget` - The trial count and threshold policy
    /// * `capacity` - The window capacity, at least 2
    /// * `rng` - The generator used for trial draws
    ///
    /// # Returns
    ///
    /// * `Result<Self>` - The regressor, or a configuration error
    pub fn with_rng(budget: TrialBudget<T>, capacity: usize, rng: R) -> Result<Self> {
        budget.validate()?;
        Ok(Self {
            budget,
            window: BoundedWindow::new(capacity)?,
            rng,
            fit: None,
            stale: false,
        })
    }

    /// Returns the trial count and threshold policy
    pub const fn budget(&self) -> &TrialBudget<T> {
        &self.budget
    }

    /// Returns the window of samples the next [`fit`](Self::fit) will use
    pub const fn window(&self) -> &BoundedWindow<T> {
        &self.window
    }

    /// Returns the generator used for trial draws
    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    /// Appends a sample to the window, evicting the oldest one when full
    ///
    /// # Returns
    ///
    /// * `&mut Self` - The regressor for method chaining
    pub fn append(&mut self, value: T) -> &mut Self {
        self.window.push(value);
        self
    }

    /// Fits a robust line over the current window
    ///
    /// # Returns
    ///
    /// * `Result<&FitResult<T>>` - The new fit, or
    ///   - `NoData` if the window is empty,
    ///   - `TooFewSamples` if it holds a single sample,
    ///   - `NoModelFound` if no trial found an inlier; the previous fit is kept
    ///
    /// # Examples
    ///
    /// ```
    /// use ta_trend::{RobustLineRegressor, TrialBudget};
    /// use assert_approx_eq::assert_approx_eq;
    ///
    /// let mut ransac = RobustLineRegressor::<f64>::seeded(TrialBudget::adaptive(0.99), 10, 42)?;
    /// let inputs = [1.0, 1.5, 2.0, 2.5, 30.0, 3.5, 4.0, 4.5, 5.0, 5.5];
    /// inputs.iter().for_each(|v| {
    ///     ransac.append(*v);
    /// });
    ///
    /// let fit = ransac.fit()?;
    /// assert_approx_eq!(fit.slope(), 0.5, 1e-9);
    /// assert_approx_eq!(fit.intercept(), 0.5, 1e-9);
    /// assert!(!fit.is_inlier(5));
    ///
    /// let next = ransac.next(2)?;
    /// assert_approx_eq!(next[0], 6.0, 1e-9);
    /// assert_approx_eq!(next[1], 6.5, 1e-9);
    /// # Ok::<(), ta_trend::TrendError>(())
    /// ```
    pub fn fit(&mut self) -> Result<&FitResult<T>> {
        let ys = self.window.to_vec();
        self.fit_values(&ys)
    }

    /// Fits a robust line over a caller-supplied series, bypassing the window
    ///
    /// Same semantics as [`fit`](Self::fit); the window is left untouched.
    ///
    /// # Arguments
    ///
    /// * `ys` - The series, sample `i` (0-based) placed at `x = i + 1`
    pub fn fit_series(&mut self, ys: &[T]) -> Result<&FitResult<T>> {
        self.fit_values(ys)
    }

    fn fit_values(&mut self, ys: &[T]) -> Result<&FitResult<T>> {
        match self.search(ys) {
            Ok(fit) => {
                self.stale = false;
                Ok(&*self.fit.insert(fit))
            }
            Err(err) => {
                self.stale = self.fit.is_some();
                Err(err)
            }
        }
    }

    fn search(&mut self, ys: &[T]) -> Result<FitResult<T>> {
        let n = ys.len();
        if n == 0 {
            return Err(TrendError::NoData);
        }
        let too_few = TrendError::TooFewSamples {
            got: n,
            min: MIN_SAMPLES,
        };
        if n < MIN_SAMPLES {
            return Err(too_few);
        }

        let (trials, threshold) = self.budget.resolve(ys).ok_or(too_few)?;
        let points: Vec<(T, T)> = positioned(ys).collect();

        let mut best: Option<(Line<T>, Vec<usize>)> = None;
        for _ in 0..trials {
            let (a, b) = sample_pair(&mut self.rng, n);
            let Some(candidate) = line_through(points[a], points[b]) else {
                continue;
            };
            let inliers = score(&candidate, &points, threshold);
            let best_count = best.as_ref().map_or(0, |(_, inliers)| inliers.len());
            if inliers.len() > best_count {
                best = Some((candidate, inliers));
            }
        }

        let Some((candidate, inliers)) = best else {
            warn!(trials, samples = n, "no model found, keeping previous fit");
            return Err(TrendError::NoModelFound { trials });
        };

        // A lone inlier leaves the normal equations singular
        let line = least_squares(inliers.iter().map(|&pos| points[pos - 1])).unwrap_or(candidate);
        debug!(
            trials,
            samples = n,
            inliers = inliers.len(),
            intercept = ?line.intercept.to_f64(),
            slope = ?line.slope.to_f64(),
            "fitted robust line"
        );

        Ok(FitResult {
            line,
            inliers,
            sample_count: n,
            trials,
            residual_threshold: threshold,
        })
    }
}

impl<T, R> RobustLineRegressor<T, R>
where
    T: Float + Default,
{
    /// Evaluates the fitted line at arbitrary coordinates
    ///
    /// # Arguments
    ///
    /// * `xs` - The coordinates, not restricted to the fitted window
    ///
    /// # Returns
    ///
    /// * `Result<Vec<T>>` - One prediction per coordinate, or `NotFitted`
    ///
    /// # Examples
    ///
    /// ```
    /// use ta_trend::{RobustLineRegressor, TrialBudget};
    ///
    /// let mut ransac = RobustLineRegressor::seeded(TrialBudget::fixed(20, 0.1), 4, 7)?;
    /// assert!(ransac.predict(&[1.0]).is_err());
    ///
    /// ransac.append(2.0).append(4.0).append(6.0).append(8.0);
    /// ransac.fit()?;
    /// assert_eq!(ransac.predict(&[0.0, 10.0])?, vec![0.0, 20.0]);
    /// # Ok::<(), ta_trend::TrendError>(())
    /// ```
    pub fn predict(&self, xs: &[T]) -> Result<Vec<T>> {
        let line = self.params()?;
        Ok(xs.iter().map(|&x| line.at(x)).collect())
    }

    /// Extrapolates `k` steps past the last fitted series
    ///
    /// # Arguments
    ///
    /// * `k` - The number of steps
    ///
    /// # Returns
    ///
    /// * `Result<Vec<T>>` - Predictions at positions `n + 1 ..= n + k`, where `n` is
    ///   the length of the fitted series, or `NotFitted`
    pub fn next(&self, k: usize) -> Result<Vec<T>> {
        let fit = self.fit.as_ref().ok_or(TrendError::NotFitted)?;
        let line = fit.line();
        Ok((fit.sample_count() + 1..=fit.sample_count() + k)
            .filter_map(|pos| T::from(pos))
            .map(|x| line.at(x))
            .collect())
    }

    /// Returns the fitted intercept and slope
    ///
    /// # Returns
    ///
    /// * `Result<Line<T>>` - The fitted line, or `NotFitted`
    pub fn params(&self) -> Result<Line<T>> {
        self.fit
            .as_ref()
            .map(FitResult::line)
            .ok_or(TrendError::NotFitted)
    }

    /// Returns the last successful fit, if any
    pub const fn fit_result(&self) -> Option<&FitResult<T>> {
        self.fit.as_ref()
    }

    /// Returns the 1-based inlier positions of the last successful fit
    pub fn inliers(&self) -> Option<&[usize]> {
        self.fit.as_ref().map(FitResult::inliers)
    }

    /// Returns the length of the last fitted series, or 0 before any fit
    pub fn last_fit_len(&self) -> usize {
        self.fit.as_ref().map_or(0, FitResult::sample_count)
    }

    /// Returns `true` if the latest fit attempt failed and the kept fit
    /// describes an older series
    pub const fn is_stale(&self) -> bool {
        self.stale
    }

    /// Clears the window and forgets the fit
    pub fn reset(&mut self) -> &mut Self {
        self.window.reset();
        self.fit = None;
        self.stale = false;
        self
    }
}

impl<T, R> RobustLineRegressor<T, R>
where
    R: SeedableRng,
{
    /// Replaces the generator with one seeded from `seed`
    pub fn reseed(&mut self, seed: u64) -> &mut Self {
        self.rng = R::seed_from_u64(seed);
        self
    }
}

/// Draws two distinct indices from `0..n` uniformly, `n >= 2`
fn sample_pair<R: Rng>(rng: &mut R, n: usize) -> (usize, usize) {
    let first = rng.random_range(0..n);
    let mut second = rng.random_range(0..n - 1);
    if second >= first {
        second += 1;
    }
    (first, second)
}

/// Returns the 1-based positions whose residual is strictly below `threshold`
fn score<T: Float>(line: &Line<T>, points: &[(T, T)], threshold: T) -> Vec<usize> {
    points
        .iter()
        .enumerate()
        .filter(|&(_, &p)| line.residual(p) < threshold)
        .map(|(i, _)| i + 1)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn line_with_outliers(n: usize, outliers: &[(usize, f64)]) -> Vec<f64> {
        let mut ys: Vec<f64> = (1..=n).map(|x| 2.0 + 0.5 * x as f64).collect();
        for &(pos, offset) in outliers {
            ys[pos - 1] += offset;
        }
        ys
    }

    #[test]
    fn test_rejects_invalid_config() {
        assert!(matches!(
            RobustLineRegressor::<f64>::seeded(TrialBudget::adaptive(1.0), 10, 0),
            Err(TrendError::InvalidProbability(_))
        ));
        assert!(matches!(
            RobustLineRegressor::<f64>::seeded(TrialBudget::fixed(0, 1.0), 10, 0),
            Err(TrendError::InvalidMaxTrials(0))
        ));
        assert!(matches!(
            RobustLineRegressor::<f64>::seeded(TrialBudget::fixed(5, 0.0), 10, 0),
            Err(TrendError::InvalidThreshold(_))
        ));
        assert!(matches!(
            RobustLineRegressor::<f64>::seeded(TrialBudget::adaptive(0.9), 1, 0),
            Err(TrendError::InvalidCapacity { got: 1, min: 2 })
        ));
    }

    #[test]
    fn test_unfitted_errors() {
        let ransac =
            RobustLineRegressor::<f64>::seeded(TrialBudget::adaptive(0.99), 10, 1).unwrap();
        assert_eq!(ransac.predict(&[1.0, 2.0]), Err(TrendError::NotFitted));
        assert_eq!(ransac.next(3), Err(TrendError::NotFitted));
        assert_eq!(ransac.params(), Err(TrendError::NotFitted));
        assert!(ransac.fit_result().is_none());
        assert_eq!(ransac.last_fit_len(), 0);
        assert!(!ransac.is_stale());
    }

    #[test]
    fn test_fit_empty_and_single() {
        let mut ransac =
            RobustLineRegressor::<f64>::seeded(TrialBudget::adaptive(0.99), 10, 1).unwrap();
        assert_eq!(ransac.fit().map(|_| ()), Err(TrendError::NoData));

        ransac.append(3.0);
        assert_eq!(
            ransac.fit().map(|_| ()),
            Err(TrendError::TooFewSamples { got: 1, min: 2 })
        );
        assert_eq!(ransac.params(), Err(TrendError::NotFitted));
    }

    #[test]
    fn test_constant_window() {
        let budgets = [TrialBudget::adaptive(0.99), TrialBudget::fixed(25, 0.5)];
        for budget in budgets {
            let mut ransac = RobustLineRegressor::seeded(budget, 10, 3).unwrap();
            for _ in 0..10 {
                ransac.append(5.0);
            }
            let fit = ransac.fit().unwrap();
            assert_approx_eq!(fit.slope(), 0.0, 1e-12);
            assert_approx_eq!(fit.intercept(), 5.0, 1e-12);
            assert_eq!(fit.inliers(), (1..=10).collect::<Vec<_>>().as_slice());
            assert_eq!(fit.sample_count(), 10);
        }
    }

    #[test]
    fn test_adaptive_budget_recorded() {
        let mut ransac = RobustLineRegressor::seeded(TrialBudget::adaptive(0.99), 10, 3).unwrap();
        for _ in 0..10 {
            ransac.append(5.0);
        }
        let fit = ransac.fit().unwrap();
        assert_eq!(fit.trials(), 17);
        assert_eq!(fit.residual_threshold(), 1e-6);
    }

    #[test]
    fn test_recovers_line_despite_outliers() {
        let outliers = [(3, 30.0), (8, -25.0), (15, 40.0), (19, 22.0)];
        let ys = line_with_outliers(20, &outliers);

        for seed in 0..5 {
            let mut ransac =
                RobustLineRegressor::seeded(TrialBudget::adaptive(0.99), 20, seed).unwrap();
            ys.iter().for_each(|&y| {
                ransac.append(y);
            });

            let fit = ransac.fit().unwrap();
            assert_approx_eq!(fit.intercept(), 2.0, 1e-9);
            assert_approx_eq!(fit.slope(), 0.5, 1e-9);
            for &(pos, _) in &outliers {
                assert!(!fit.is_inlier(pos));
            }
            assert_eq!(fit.inliers().len(), 20 - outliers.len());
        }
    }

    #[test]
    fn test_fixed_budget_recovers_line() {
        let outliers = [(2, -12.0), (6, 9.0), (7, 15.0)];
        let ys = line_with_outliers(12, &outliers);

        let mut ransac = RobustLineRegressor::seeded(TrialBudget::fixed(60, 1.0), 12, 11).unwrap();
        let fit = ransac.fit_series(&ys).unwrap();
        assert_approx_eq!(fit.intercept(), 2.0, 1e-9);
        assert_approx_eq!(fit.slope(), 0.5, 1e-9);
        assert_eq!(fit.inliers(), &[1, 3, 4, 5, 8, 9, 10, 11, 12]);
        assert!(ransac.window().is_empty());
    }

    #[test]
    fn test_same_seed_reproduces_fit() {
        let ys = [3.4, 2.5, 3.5, 4.5, 3.0, 2.7, 3.5, 8.5, 4.5, 2.0];
        let mut a = RobustLineRegressor::seeded(TrialBudget::adaptive(0.99), 10, 2024).unwrap();
        let mut b = RobustLineRegressor::seeded(TrialBudget::adaptive(0.99), 10, 2024).unwrap();
        let fit_a = a.fit_series(&ys).unwrap().clone();
        let fit_b = b.fit_series(&ys).unwrap().clone();
        assert_eq!(fit_a, fit_b);

        b.reseed(2024);
        a.reseed(2024);
        assert_eq!(a.fit_series(&ys).unwrap(), b.fit_series(&ys).unwrap());
    }

    #[test]
    fn test_predict_and_next() {
        let mut ransac = RobustLineRegressor::seeded(TrialBudget::adaptive(0.95), 6, 5).unwrap();
        for y in line_with_outliers(6, &[]) {
            ransac.append(y);
        }
        ransac.fit().unwrap();

        let line = ransac.params().unwrap();
        assert_approx_eq!(line.intercept, 2.0, 1e-9);
        assert_approx_eq!(line.slope, 0.5, 1e-9);

        let predicted = ransac.predict(&[-2.0, 0.0, 2.5]).unwrap();
        for (p, e) in predicted.iter().zip([1.0, 2.0, 3.25]) {
            assert_approx_eq!(p, e, 1e-9);
        }

        let next = ransac.next(3).unwrap();
        for (p, e) in next.iter().zip([5.5, 6.0, 6.5]) {
            assert_approx_eq!(p, e, 1e-9);
        }
        assert!(ransac.next(0).unwrap().is_empty());
    }

    #[test]
    fn test_fit_uses_sliding_window() {
        let mut ransac = RobustLineRegressor::seeded(TrialBudget::fixed(30, 0.01), 5, 9).unwrap();
        for x in 1..=12 {
            ransac.append(x as f64 * 3.0);
        }
        assert_eq!(ransac.window().to_vec(), vec![24.0, 27.0, 30.0, 33.0, 36.0]);

        let fit = ransac.fit().unwrap().clone();
        assert_eq!(ransac.last_fit_len(), 5);
        assert_approx_eq!(fit.slope(), 3.0, 1e-9);
        assert_approx_eq!(fit.intercept(), 21.0, 1e-9);

        let next = ransac.next(1).unwrap();
        assert_approx_eq!(next[0], 39.0, 1e-9);
    }

    #[test]
    fn test_failed_fit_keeps_previous_model() {
        let mut ransac = RobustLineRegressor::seeded(TrialBudget::adaptive(0.99), 4, 13).unwrap();
        ransac.append(1.0).append(2.0).append(3.0);
        ransac.fit().unwrap();
        let before = ransac.fit_result().cloned();
        assert!(!ransac.is_stale());

        for _ in 0..4 {
            ransac.append(f64::NAN);
        }
        assert_eq!(
            ransac.fit().map(|_| ()),
            Err(TrendError::NoModelFound { trials: 17 })
        );
        assert!(ransac.is_stale());
        assert_eq!(ransac.fit_result().cloned(), before);
        assert_eq!(ransac.last_fit_len(), 3);

        let next = ransac.next(1).unwrap();
        assert_approx_eq!(next[0], 4.0, 1e-9);
    }

    #[test]
    fn test_failed_first_fit_is_not_stale() {
        let mut ransac = RobustLineRegressor::seeded(TrialBudget::fixed(5, 1.0), 3, 13).unwrap();
        ransac.append(f64::NAN).append(f64::NAN);
        assert_eq!(
            ransac.fit().map(|_| ()),
            Err(TrendError::NoModelFound { trials: 5 })
        );
        assert!(!ransac.is_stale());
        assert_eq!(ransac.params(), Err(TrendError::NotFitted));
    }

    #[test]
    fn test_any_failed_attempt_marks_fit_stale() {
        let mut ransac = RobustLineRegressor::seeded(TrialBudget::fixed(10, 0.5), 4, 21).unwrap();
        ransac.fit_series(&[1.0, 2.0, 3.0]).unwrap();

        assert_eq!(
            ransac.fit_series(&[4.0]).map(|_| ()),
            Err(TrendError::TooFewSamples { got: 1, min: 2 })
        );
        assert!(ransac.is_stale());
        assert_eq!(ransac.last_fit_len(), 3);

        ransac.fit_series(&[2.0, 4.0]).unwrap();
        assert!(!ransac.is_stale());

        assert_eq!(ransac.fit().map(|_| ()), Err(TrendError::NoData));
        assert!(ransac.is_stale());
        assert_approx_eq!(ransac.params().unwrap().slope, 2.0, 1e-12);
    }

    #[test]
    fn test_ties_keep_first_found_candidate() {
        // Every pair of these points supports exactly two inliers
        let ys = [0.0, 0.0, 10.0, 10.0];
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let (a, b) = sample_pair(&mut rng, ys.len());
            let expected = [a.min(b) + 1, a.max(b) + 1];

            let mut ransac =
                RobustLineRegressor::seeded(TrialBudget::fixed(10, 0.5), 4, seed).unwrap();
            let fit = ransac.fit_series(&ys).unwrap();
            assert_eq!(fit.inliers(), &expected);
            assert_eq!(fit.trials(), 10);
        }
    }

    #[test]
    fn test_sample_pair_is_distinct_and_in_range() {
        let mut rng = StdRng::seed_from_u64(77);
        let mut seen = [[false; 4]; 4];
        for _ in 0..500 {
            let (a, b) = sample_pair(&mut rng, 4);
            assert_ne!(a, b);
            assert!(a < 4 && b < 4);
            seen[a][b] = true;
        }
        for a in 0..4 {
            for b in 0..4 {
                assert_eq!(seen[a][b], a != b);
            }
        }
    }

    #[test]
    fn test_score_is_strict() {
        let line = Line::new(0.0, 1.0);
        let points = [(1.0, 1.0), (2.0, 2.5), (3.0, 3.5), (4.0, 4.25)];
        assert_eq!(score(&line, &points, 0.5), vec![1, 4]);
    }

    #[test]
    fn test_reset() {
        let mut ransac = RobustLineRegressor::seeded(TrialBudget::adaptive(0.9), 4, 3).unwrap();
        ransac.append(1.0).append(3.0);
        ransac.fit().unwrap();
        ransac.reset();
        assert!(ransac.window().is_empty());
        assert_eq!(ransac.params(), Err(TrendError::NotFitted));
    }
}
