use core::fmt;

use num_traits::Float;
use parking_lot::Mutex;
use tracing::trace;

use crate::{Dema, Result, Smoother, TrendError};

/// Direction reported by a [`TrendClassifier`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrendKind {
    /// Short-period smoothing sits above the long-period one
    Up,
    /// Short-period smoothing sits below the long-period one
    Down,
    /// Both smoothings agree within the flat range
    Flat,
    /// Not enough samples yet, or the ratio is undefined
    Na,
}

impl fmt::Display for TrendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Up => "UP",
            Self::Down => "DOWN",
            Self::Flat => "FLAT",
            Self::Na => "NA",
        };
        f.write_str(s)
    }
}

/// A classification result.
///
/// `value` is the short/long ratio for [`TrendKind::Up`] and [`TrendKind::Down`]
/// and zero otherwise. Every call to [`TrendClassifier::classify`] returns a
/// fresh value; nothing is shared between classifiers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trend<T> {
    /// Direction
    pub kind: TrendKind,
    /// Short/long ratio, or zero
    pub value: T,
}

impl<T: Float> Trend<T> {
    fn bare(kind: TrendKind) -> Self {
        Self {
            kind,
            value: T::zero(),
        }
    }

    /// Returns `true` for [`TrendKind::Up`]
    #[inline]
    pub fn is_up(&self) -> bool {
        self.kind == TrendKind::Up
    }

    /// Returns `true` for [`TrendKind::Down`]
    #[inline]
    pub fn is_down(&self) -> bool {
        self.kind == TrendKind::Down
    }
}

#[derive(Debug)]
struct State<S> {
    short: S,
    long: S,
    sample_count: usize,
}

/// Classifies a stream by comparing a short-period and a long-period smoothing.
///
/// Both smoothers and the sample count sit behind one lock, so `add` and
/// `classify` never interleave and always observe a consistent state. All
/// methods take `&self`; share a classifier across threads through an `Arc`.
///
/// The default smoother is [`Dema`]; any [`Smoother`], such as
/// [`Ema`](crate::Ema), can be plugged in with [`TrendClassifier::from_smoothers`].
///
/// # Examples
///
/// ```
/// use ta_trend::{TrendClassifier, TrendKind};
///
/// let trend = TrendClassifier::<f64>::new(5, 20)?;
/// for _ in 0..30 {
///     trend.add(100.0);
/// }
/// trend.add(150.0);
///
/// let t = trend.classify();
/// assert_eq!(t.kind, TrendKind::Up);
/// assert!(t.value > 1.0);
/// # Ok::<(), ta_trend::TrendError>(())
/// ```
#[derive(Debug)]
pub struct TrendClassifier<T, S = Dema<T>> {
    state: Mutex<State<S>>,
    /// Largest `|ratio - 1|` still classified as flat
    flat_range: T,
    /// Samples needed before a direction is reported
    warm_up: usize,
}

impl<T> TrendClassifier<T, Dema<T>>
where
    T: Float + Default,
{
    /// Creates a DEMA based classifier with a flat range of zero
    ///
    /// # Arguments
    ///
    /// * `short_period` - Period of the fast smoothing, at least 1
    /// * `long_period` - Period of the slow smoothing, at least 1
    ///
    /// # Returns
    ///
    /// * `Result<Self>` - The classifier, or `InvalidPeriod`
    pub fn new(short_period: usize, long_period: usize) -> Result<Self> {
        Self::with_flat_range(short_period, long_period, 0.0)
    }

    /// Creates a DEMA based classifier that reports ratios within `flat_range`
    /// of 1 as flat
    ///
    /// # Arguments
    ///
    /// * `short_period` - Period of the fast smoothing, at least 1
    /// * `long_period` - Period of the slow smoothing, at least 1
    /// * `flat_range` - Tolerance band around a ratio of 1, finite and non-negative
    ///
    /// # Returns
    ///
    /// * `Result<Self>` - The classifier, or a configuration error
    pub fn with_flat_range(
        short_period: usize,
        long_period: usize,
        flat_range: f64,
    ) -> Result<Self> {
        Self::from_smoothers(Dema::new(short_period)?, Dema::new(long_period)?, flat_range)
    }
}

impl<T, S> TrendClassifier<T, S>
where
    T: Float + Default,
    S: Smoother<T>,
{
    /// Creates a classifier over two caller-built smoothers
    ///
    /// # Arguments
    ///
    /// * `short` - The fast smoother
    /// * `long` - The slow smoother
    /// * `flat_range` - Tolerance band around a ratio of 1, finite and non-negative
    ///
    /// # Returns
    ///
    /// * `Result<Self>` - The classifier, or `InvalidFlatRange`
    ///
    /// # Examples
    ///
    /// ```
    /// use ta_trend::{Ema, TrendClassifier};
    ///
    /// let trend = TrendClassifier::from_smoothers(Ema::new(10)?, Ema::new(30)?, 0.0)?;
    /// (1..=60).for_each(|i| trend.add(100.0 + i as f64));
    ///
    /// assert!(trend.classify().is_up());
    /// # Ok::<(), ta_trend::TrendError>(())
    /// ```
    pub fn from_smoothers(short: S, long: S, flat_range: f64) -> Result<Self> {
        if !flat_range.is_finite() || flat_range < 0.0 {
            return Err(TrendError::InvalidFlatRange(flat_range));
        }
        let flat_range = T::from(flat_range).ok_or(TrendError::InvalidFlatRange(flat_range))?;
        let warm_up = short.period().max(long.period());

        Ok(Self {
            state: Mutex::new(State {
                short,
                long,
                sample_count: 0,
            }),
            flat_range,
            warm_up,
        })
    }

    /// Feeds a sample to both smoothers
    pub fn add(&self, value: T) {
        let mut state = self.state.lock();
        state.short.next(value);
        state.long.next(value);
        state.sample_count += 1;
        trace!(sample_count = state.sample_count, "trend sample added");
    }

    /// Classifies the current state
    ///
    /// Returns [`TrendKind::Na`] until `max(short_period, long_period)` samples
    /// have been added, or when the ratio is not a number. Otherwise the ratio
    /// `short / long` is flat within `flat_range` of 1, up above it and down below it.
    pub fn classify(&self) -> Trend<T> {
        let state = self.state.lock();
        if state.sample_count < self.warm_up {
            return Trend::bare(TrendKind::Na);
        }

        let ratio = state.short.value() / state.long.value();
        let trend = if ratio.is_nan() {
            Trend::bare(TrendKind::Na)
        } else if (ratio - T::one()).abs() <= self.flat_range {
            Trend::bare(TrendKind::Flat)
        } else if ratio > T::one() {
            Trend {
                kind: TrendKind::Up,
                value: ratio,
            }
        } else {
            Trend {
                kind: TrendKind::Down,
                value: ratio,
            }
        };
        trace!(kind = %trend.kind, ratio = ?ratio.to_f64(), "trend classified");
        trend
    }

    /// Returns the number of samples added since construction or reset
    pub fn sample_count(&self) -> usize {
        self.state.lock().sample_count
    }

    /// Returns the samples needed before a direction is reported
    pub const fn warm_up(&self) -> usize {
        self.warm_up
    }

    /// Returns the flat range
    pub const fn flat_range(&self) -> T {
        self.flat_range
    }

    /// Returns the current short and long smoothed values, read together
    pub fn values(&self) -> (T, T) {
        let state = self.state.lock();
        (state.short.value(), state.long.value())
    }

    /// Clears both smoothers and the sample count
    pub fn reset(&self) {
        let mut state = self.state.lock();
        state.short.reset();
        state.long.reset();
        state.sample_count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Ema;
    use std::{sync::Arc, thread};

    fn feed<S: Smoother<f64>>(
        trend: &TrendClassifier<f64, S>,
        values: impl IntoIterator<Item = f64>,
    ) {
        values.into_iter().for_each(|v| trend.add(v));
    }

    #[test]
    fn test_config_errors() {
        assert_eq!(
            TrendClassifier::<f64>::new(0, 5).map(|_| ()),
            Err(TrendError::InvalidPeriod(0))
        );
        assert_eq!(
            TrendClassifier::<f64>::new(5, 0).map(|_| ()),
            Err(TrendError::InvalidPeriod(0))
        );
        assert_eq!(
            TrendClassifier::<f64>::with_flat_range(3, 5, -0.1).map(|_| ()),
            Err(TrendError::InvalidFlatRange(-0.1))
        );
        assert!(TrendClassifier::<f64>::with_flat_range(3, 5, f64::NAN).is_err());
    }

    #[test]
    fn test_na_until_longest_period() {
        for (short, long) in [(3, 5), (5, 3), (4, 4), (1, 7)] {
            let rising = TrendClassifier::<f64>::new(short, long).unwrap();
            let falling = TrendClassifier::<f64>::new(short, long).unwrap();
            let warm_up = short.max(long);
            assert_eq!(rising.warm_up(), warm_up);

            for i in 1..=20 {
                rising.add(i as f64);
                falling.add(100.0 - i as f64);
                for trend in [&rising, &falling] {
                    let kind = trend.classify().kind;
                    if i < warm_up {
                        assert_eq!(kind, TrendKind::Na);
                    } else {
                        assert_ne!(kind, TrendKind::Na);
                    }
                }
            }
        }
    }

    #[test]
    fn test_step_up_and_down() {
        let up = TrendClassifier::<f64>::new(5, 20).unwrap();
        feed(&up, core::iter::repeat_n(100.0, 30));
        up.add(150.0);
        let t = up.classify();
        assert!(t.is_up());
        assert!((t.value - 1.103_986_135).abs() < 1e-6);

        let down = TrendClassifier::<f64>::new(5, 20).unwrap();
        feed(&down, core::iter::repeat_n(100.0, 30));
        down.add(50.0);
        let t = down.classify();
        assert!(t.is_down());
        assert!((t.value - 0.803_278_688).abs() < 1e-6);
    }

    #[test]
    fn test_accelerating_series() {
        let up = TrendClassifier::<f64>::new(5, 20).unwrap();
        feed(&up, (1..=40).map(|i| (i * i) as f64));
        assert!(up.classify().is_up());

        let down = TrendClassifier::<f64>::new(5, 20).unwrap();
        feed(&down, (1..=40).map(|i| 10_000.0 - (i * i) as f64));
        assert!(down.classify().is_down());
    }

    #[test]
    fn test_flat_band() {
        let trend = TrendClassifier::<f64>::with_flat_range(5, 20, 1e-9).unwrap();
        feed(&trend, core::iter::repeat_n(50.0, 40));
        assert_eq!(trend.classify(), Trend::bare(TrendKind::Flat));

        let wide = TrendClassifier::<f64>::with_flat_range(5, 20, 0.2).unwrap();
        feed(&wide, core::iter::repeat_n(100.0, 30));
        wide.add(110.0);
        assert_eq!(wide.classify().kind, TrendKind::Flat);
        assert_eq!(wide.classify().value, 0.0);
    }

    #[test]
    fn test_zero_series_is_na() {
        let trend = TrendClassifier::<f64>::new(2, 3).unwrap();
        feed(&trend, [0.0; 5]);
        assert_eq!(trend.classify().kind, TrendKind::Na);
    }

    #[test]
    fn test_ema_variant_on_ramp() {
        let up =
            TrendClassifier::from_smoothers(Ema::new(10).unwrap(), Ema::new(30).unwrap(), 0.0)
                .unwrap();
        feed(&up, (0..60).map(|i| 100.0 + i as f64));
        assert!(up.classify().is_up());

        let down =
            TrendClassifier::from_smoothers(Ema::new(10).unwrap(), Ema::new(30).unwrap(), 0.0)
                .unwrap();
        feed(&down, (0..60).map(|i| 200.0 - i as f64));
        assert!(down.classify().is_down());
    }

    #[test]
    fn test_results_are_independent_values() {
        let a = TrendClassifier::<f64>::new(5, 20).unwrap();
        let b = TrendClassifier::<f64>::new(5, 20).unwrap();
        feed(&a, core::iter::repeat_n(100.0, 30));
        feed(&b, core::iter::repeat_n(100.0, 30));
        a.add(150.0);
        b.add(50.0);

        let first = a.classify();
        let second = b.classify();
        assert!(first.is_up());
        assert!(second.is_down());
        assert_eq!(a.classify(), first);
    }

    #[test]
    fn test_concurrent_adds_stay_consistent() {
        let trend = Arc::new(TrendClassifier::<f64>::new(3, 8).unwrap());
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let trend = Arc::clone(&trend);
                thread::spawn(move || {
                    for i in 0..250 {
                        trend.add((t * 1000 + i) as f64);
                        let _ = trend.classify();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(trend.sample_count(), 1000);
        let state = trend.state.lock();
        assert_eq!(state.short.count(), 1000);
        assert_eq!(state.long.count(), 1000);
    }

    #[test]
    fn test_reset() {
        let trend = TrendClassifier::<f64>::new(2, 4).unwrap();
        feed(&trend, [1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_ne!(trend.classify().kind, TrendKind::Na);

        trend.reset();
        assert_eq!(trend.sample_count(), 0);
        assert_eq!(trend.values(), (0.0, 0.0));
        assert_eq!(trend.classify().kind, TrendKind::Na);
    }

    #[test]
    fn test_display() {
        assert_eq!(TrendKind::Up.to_string(), "UP");
        assert_eq!(TrendKind::Na.to_string(), "NA");
    }
}
