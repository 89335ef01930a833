//! Linear trend — ordinary least-squares slope against bar position.

/// OLS slope of `prices` regressed on `0..len` (one unit = one bar).
///
/// Returns 0.0 for fewer than two points.
pub fn trend_slope(prices: &[f64]) -> f64 {
    let n = prices.len();
    if n < 2 {
        return 0.0;
    }
    let n_f = n as f64;
    let mean_x = (n_f - 1.0) / 2.0;
    let mean_y = prices.iter().sum::<f64>() / n_f;

    let mut num = 0.0;
    let mut den = 0.0;
    for (i, &y) in prices.iter().enumerate() {
        let dx = i as f64 - mean_x;
        num += dx * (y - mean_y);
        den += dx * dx;
    }
    num / den
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn single_point_is_flat() {
        assert_eq!(trend_slope(&[42.0]), 0.0);
        assert_eq!(trend_slope(&[]), 0.0);
    }

    #[test]
    fn perfect_line() {
        assert_approx(trend_slope(&[1.0, 3.0, 5.0, 7.0]), 2.0, DEFAULT_EPSILON);
        assert_approx(trend_slope(&[10.0, 9.5, 9.0]), -0.5, DEFAULT_EPSILON);
    }

    #[test]
    fn noisy_series() {
        // x = 0..4, y = [1, 3, 2, 5]: slope = 1.1
        assert_approx(trend_slope(&[1.0, 3.0, 2.0, 5.0]), 1.1, 1e-9);
    }

    #[test]
    fn constant_series_has_zero_slope() {
        assert_approx(trend_slope(&[4.0, 4.0, 4.0, 4.0, 4.0]), 0.0, DEFAULT_EPSILON);
    }
}
