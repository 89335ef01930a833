//! Simple daily returns.

/// `(c[i] - c[i-1]) / c[i-1]` as a fraction; index 0 is `NaN`.
///
/// A zero previous close yields `NaN` rather than infinity.
pub fn daily_returns(closes: &[f64]) -> Vec<f64> {
    let mut result = vec![f64::NAN; closes.len()];
    for (i, pair) in closes.windows(2).enumerate() {
        let (prev, curr) = (pair[0], pair[1]);
        if prev != 0.0 {
            result[i + 1] = (curr - prev) / prev;
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn returns_are_aligned_with_closes() {
        let r = daily_returns(&[100.0, 110.0, 99.0]);
        assert_eq!(r.len(), 3);
        assert!(r[0].is_nan());
        assert_approx(r[1], 0.10, DEFAULT_EPSILON);
        assert_approx(r[2], -0.10, DEFAULT_EPSILON);
    }

    #[test]
    fn zero_previous_close_is_undefined() {
        let r = daily_returns(&[0.0, 5.0]);
        assert!(r[1].is_nan());
    }

    #[test]
    fn empty_input() {
        assert!(daily_returns(&[]).is_empty());
    }
}
