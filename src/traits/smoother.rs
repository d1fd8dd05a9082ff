/// Streaming smoother trait for incremental moving averages
///
/// This trait is the seam between a smoothing calculator and the components
/// that consume its output, such as the trend classifier. Implementors update
/// their state one sample at a time and expose the current smoothed value at
/// any point, including before the warm-up phase has completed.
pub trait Smoother<T> {
    /// Updates the smoother with a new value in the time series
    ///
    /// # Arguments
    ///
    /// * `value` - The new sample
    ///
    /// # Returns
    ///
    /// * `&mut Self` - The updated smoother for method chaining
    fn next(&mut self, value: T) -> &mut Self
    where
        Self: Sized;

    /// Returns the current smoothed value
    ///
    /// Valid at any time; a smoother that has not seen a sample reports zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use ta_trend::{Ema, Smoother};
    ///
    /// let mut ema = Ema::new(3)?;
    /// assert_eq!(ema.value(), 0.0);
    /// assert_eq!(ema.next(4.0).value(), 4.0);
    /// # Ok::<(), ta_trend::TrendError>(())
    /// ```
    fn value(&self) -> T;

    /// Returns the smoothing period
    fn period(&self) -> usize;

    /// Returns the number of samples seen so far
    fn count(&self) -> usize;

    /// Returns `true` once at least `period` samples have been seen
    fn is_ready(&self) -> bool {
        self.count() >= self.period()
    }

    /// Resets the smoother to its freshly constructed state
    fn reset(&mut self) -> &mut Self
    where
        Self: Sized;
}
