use num_traits::Float;

use crate::{Kbn, Result, Smoother, TrendError};

/// Default smoothing coefficient `C` in `K = C / (period + 1)`.
///
/// The conventional EMA uses 2; this crate defaults to 8, which shortens the
/// effective half-life of the filter. Override per instance with
/// [`Ema::with_coefficient`].
pub const SMOOTHING_COEFFICIENT: f64 = 8.0;

/// Incremental exponential moving average with a simple-average warm-up.
///
/// For the first `period` samples the value is the arithmetic mean of all
/// samples seen so far. After that every sample is blended in as
/// `K * sample + value * (1 - K)` with `K = C / (period + 1)`.
///
/// The warm-up sum is accumulated with the Kahan-Babuska-Neumaier algorithm.
#[derive(Debug, Clone)]
pub struct Ema<T> {
    /// Smoothing period
    period: usize,
    /// Smoothing coefficient `C`
    coefficient: f64,
    /// Smoothing constant `K`
    k: T,
    /// Number of samples seen
    count: usize,
    /// Sum of warm-up samples
    sum: Kbn<T>,
    /// Current smoothed value
    mean: T,
}

impl<T> Ema<T>
where
    T: Float + Default,
{
    /// Creates a new `Ema` with the default smoothing coefficient
    ///
    /// # Arguments
    ///
    /// * `period` - The smoothing period, at least 1
    ///
    /// # Returns
    ///
    /// * `Result<Self>` - The calculator, or `InvalidPeriod` if `period` is 0
    pub fn new(period: usize) -> Result<Self> {
        Self::with_coefficient(period, SMOOTHING_COEFFICIENT)
    }

    /// Creates a new `Ema` with an explicit smoothing coefficient
    ///
    /// # Arguments
    ///
    /// * `period` - The smoothing period, at least 1
    /// * `coefficient` - The coefficient `C` in `K = C / (period + 1)`
    ///
    /// # Returns
    ///
    /// * `Result<Self>` - The calculator, or a configuration error
    ///
    /// # Examples
    ///
    /// ```
    /// use ta_trend::{Ema, Smoother};
    /// use assert_approx_eq::assert_approx_eq;
    ///
    /// let mut ema = Ema::with_coefficient(3, 2.0)?;
    /// let mut results = vec![];
    /// [2.0, 4.0, 6.0, 8.0, 10.0].iter().for_each(|v| results.push(ema.next(*v).value()));
    ///
    /// let expected: [f64; 5] = [2.0, 3.0, 4.0, 6.0, 8.0];
    /// for (i, e) in expected.iter().enumerate() {
    ///     assert_approx_eq!(e, results[i], 1e-12);
    /// }
    /// # Ok::<(), ta_trend::TrendError>(())
    /// ```
    pub fn with_coefficient(period: usize, coefficient: f64) -> Result<Self> {
        if period == 0 {
            return Err(TrendError::InvalidPeriod(period));
        }
        if !coefficient.is_finite() || coefficient <= 0.0 {
            return Err(TrendError::InvalidSmoothingCoefficient(coefficient));
        }
        let k = T::from(coefficient / (period as f64 + 1.0))
            .ok_or(TrendError::InvalidSmoothingCoefficient(coefficient))?;

        Ok(Self {
            period,
            coefficient,
            k,
            count: 0,
            sum: Kbn::default(),
            mean: T::zero(),
        })
    }

    /// Returns the smoothing coefficient `C`
    pub const fn coefficient(&self) -> f64 {
        self.coefficient
    }

    /// Returns the smoothing constant `K = C / (period + 1)`
    pub fn smoothing_constant(&self) -> T {
        self.k
    }
}

impl<T> Smoother<T> for Ema<T>
where
    T: Float + Default,
{
    /// Updates the moving average with a new value
    ///
    /// # Examples
    ///
    /// ```
    /// use ta_trend::{Ema, Smoother};
    /// use assert_approx_eq::assert_approx_eq;
    ///
    /// let mut ema = Ema::new(3)?;
    /// let mut results = vec![];
    /// [1.55, 2.0, 1.58, 1.3, 1.0].iter().for_each(|v| results.push(ema.next(*v).value()));
    ///
    /// let expected: [f64; 5] = [1.55, 1.775, 1.71, 0.89, 1.11];
    /// for (i, e) in expected.iter().enumerate() {
    ///     assert_approx_eq!(e, results[i], 1e-9);
    /// }
    /// # Ok::<(), ta_trend::TrendError>(())
    /// ```
    fn next(&mut self, value: T) -> &mut Self {
        if self.count < self.period {
            self.sum += value;
            self.count += 1;
            if let Some(n) = T::from(self.count) {
                self.mean = self.sum.total() / n;
            }
        } else {
            self.count = self.count.saturating_add(1);
            self.mean = self.k * value + self.mean * (T::one() - self.k);
        }
        self
    }

    fn value(&self) -> T {
        self.mean
    }

    fn period(&self) -> usize {
        self.period
    }

    fn count(&self) -> usize {
        self.count
    }

    fn reset(&mut self) -> &mut Self {
        self.count = 0;
        self.sum = Kbn::default();
        self.mean = T::zero();
        self
    }
}
