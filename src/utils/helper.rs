use num_traits::Float;

use crate::{Kbn, Line};

/// Returns the exact line through two points
///
/// # Arguments
///
/// * `p1` - The first point `(x, y)`
/// * `p2` - The second point `(x, y)`
///
/// # Returns
///
/// * `Option<Line<T>>` - The line, or `None` if both points share an x coordinate
#[inline]
pub fn line_through<T: Float>((x1, y1): (T, T), (x2, y2): (T, T)) -> Option<Line<T>> {
    let dx = x2 - x1;
    if dx.is_zero() {
        return None;
    }
    let slope = (y2 - y1) / dx;
    Some(Line::new(y1 - slope * x1, slope))
}

/// Returns the ordinary least squares line through a set of points
///
/// Uses the centered two-pass form, with compensated sums, so the result stays
/// accurate when x coordinates are large compared to their spread.
///
/// # Arguments
///
/// * `points` - The `(x, y)` points, iterated twice
///
/// # Returns
///
/// * `Option<Line<T>>` - The line, or `None` if fewer than two distinct x
///   coordinates make the normal equations singular
pub fn least_squares<T, I>(points: I) -> Option<Line<T>>
where
    T: Float + Default,
    I: Iterator<Item = (T, T)> + Clone,
{
    let mut n = 0usize;
    let mut sum_x = Kbn::<T>::default();
    let mut sum_y = Kbn::<T>::default();
    for (x, y) in points.clone() {
        n += 1;
        sum_x += x;
        sum_y += y;
    }
    if n == 0 {
        return None;
    }
    let n_t = T::from(n)?;
    let mean_x = sum_x.total() / n_t;
    let mean_y = sum_y.total() / n_t;

    let mut sxx = Kbn::<T>::default();
    let mut sxy = Kbn::<T>::default();
    for (x, y) in points {
        let dx = x - mean_x;
        sxx += dx * dx;
        sxy += dx * (y - mean_y);
    }
    let sxx = sxx.total();
    if sxx.is_zero() {
        return None;
    }

    let slope = sxy.total() / sxx;
    Some(Line::new(mean_y - slope * mean_x, slope))
}

/// Returns the least squares line over a series at 1-based positions
///
/// # Arguments
///
/// * `ys` - The series, sample `i` (0-based) placed at `x = i + 1`
///
/// # Returns
///
/// * `Option<Line<T>>` - The line, or `None` for fewer than two samples
#[inline]
pub fn least_squares_series<T: Float + Default>(ys: &[T]) -> Option<Line<T>> {
    least_squares(positioned(ys))
}

/// Pairs every sample with its 1-based position
#[inline]
pub fn positioned<T: Float>(ys: &[T]) -> impl Iterator<Item = (T, T)> + Clone + '_ {
    ys.iter()
        .enumerate()
        .filter_map(|(i, &y)| T::from(i + 1).map(|x| (x, y)))
}
