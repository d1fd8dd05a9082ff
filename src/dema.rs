use num_traits::Float;

use crate::{Ema, Result, SMOOTHING_COEFFICIENT, Smoother};

/// Double exponential moving average.
///
/// Composes two [`Ema`]s with the same period: `inner` smooths the raw series
/// and `outer` smooths the output of `inner`. Once `inner` has seen `period`
/// samples the reported value is `2 * inner - outer`, which cancels most of the
/// first-order lag of a single EMA. Until then it is `inner`'s value.
#[derive(Debug, Clone)]
pub struct Dema<T> {
    /// EMA of the raw series
    inner: Ema<T>,
    /// EMA of the inner EMA
    outer: Ema<T>,
}

impl<T> Dema<T>
where
    T: Float + Default,
{
    /// Creates a new `Dema` with the default smoothing coefficient
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

    /// Creates a new `Dema` whose two stages share an explicit smoothing coefficient
    ///
    /// # Arguments
    ///
    /// * `period` - The smoothing period, at least 1
    /// * `coefficient` - The coefficient `C` in `K = C / (period + 1)`
    ///
    /// # Returns
    ///
    /// * `Result<Self>` - The calculator, or a configuration error
    pub fn with_coefficient(period: usize, coefficient: f64) -> Result<Self> {
        Ok(Self {
            inner: Ema::with_coefficient(period, coefficient)?,
            outer: Ema::with_coefficient(period, coefficient)?,
        })
    }

    /// Returns the EMA of the raw series
    pub const fn inner(&self) -> &Ema<T> {
        &self.inner
    }

    /// Returns the EMA of the inner EMA
    pub const fn outer(&self) -> &Ema<T> {
        &self.outer
    }
}

impl<T> Smoother<T> for Dema<T>
where
    T: Float + Default,
{
    fn next(&mut self, value: T) -> &mut Self {
        self.inner.next(value);
        self.outer.next(self.inner.value());
        self
    }

    /// Returns the double-smoothed value
    ///
    /// # Examples
    ///
    /// ```
    /// use ta_trend::{Dema, Smoother};
    /// use assert_approx_eq::assert_approx_eq;
    ///
    /// let mut dema = Dema::with_coefficient(2, 2.0)?;
    /// let mut results = vec![];
    /// [1.0, 2.0, 3.0, 4.0].iter().for_each(|v| results.push(dema.next(*v).value()));
    ///
    /// let expected: [f64; 4] = [1.0, 1.75, 35.0 / 12.0, 143.0 / 36.0];
    /// for (i, e) in expected.iter().enumerate() {
    ///     assert_approx_eq!(e, results[i], 1e-9);
    /// }
    /// # Ok::<(), ta_trend::TrendError>(())
    /// ```
    fn value(&self) -> T {
        if self.inner.count() < self.inner.period() {
            self.inner.value()
        } else {
            let _2 = T::one() + T::one();
            _2 * self.inner.value() - self.outer.value()
        }
    }

    fn period(&self) -> usize {
        self.inner.period()
    }

    fn count(&self) -> usize {
        self.inner.count()
    }

    fn reset(&mut self) -> &mut Self {
        self.inner.reset();
        self.outer.reset();
        self
    }
}
