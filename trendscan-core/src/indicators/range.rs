//! Position of a price inside a trading range.

/// `(price - low) / (high - low)`: 0.0 at the range low, 1.0 at the high.
///
/// A flat range (`high == low`) returns 0.5 so neither support nor resistance
/// is signalled. Prices outside the range are not clamped.
pub fn range_position(price: f64, low: f64, high: f64) -> f64 {
    let width = high - low;
    if width == 0.0 {
        return 0.5;
    }
    (price - low) / width
}
