use num_traits::Float;

/// A fitted trend line `y = intercept + slope * x`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line<T> {
    /// Value of the line at `x = 0`
    pub intercept: T,
    /// Change in `y` per unit of `x`
    pub slope: T,
}

impl<T: Float> Line<T> {
    /// Creates a line from its intercept and slope
    pub const fn new(intercept: T, slope: T) -> Self {
        Self { intercept, slope }
    }

    /// Evaluates the line at `x`
    ///
    /// # Examples
    ///
    /// ```
    /// use ta_trend::Line;
    ///
    /// let line = Line::new(1.0, 0.5);
    /// assert_eq!(line.at(4.0), 3.0);
    /// assert_eq!(line.at(-2.0), 0.0);
    /// ```
    #[inline]
    pub fn at(&self, x: T) -> T {
        self.intercept + self.slope * x
    }

    /// Absolute vertical distance from `(x, y)` to the line
    #[inline]
    pub fn residual(&self, (x, y): (T, T)) -> T {
        (y - self.at(x)).abs()
    }
}
