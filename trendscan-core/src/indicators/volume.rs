//! Volume relative to its trailing average.

use serde::{Deserialize, Serialize};

pub const HIGH_VOLUME_RATIO: f64 = 1.5;
pub const LOW_VOLUME_RATIO: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeClass {
    High,
    Normal,
    Low,
}

/// Classify `current` against `average` with the default 1.5x / 0.5x bands.
pub fn volume_ratio_class(current: f64, average: f64) -> VolumeClass {
    classify_volume_with(current, average, HIGH_VOLUME_RATIO, LOW_VOLUME_RATIO)
}

/// Classify `current` against `average` with explicit bands.
///
/// A non-positive average carries no information and classifies as Normal.
pub fn classify_volume_with(
    current: f64,
    average: f64,
    high_ratio: f64,
    low_ratio: f64,
) -> VolumeClass {
    if average <= 0.0 {
        return VolumeClass::Normal;
    }
    if current > high_ratio * average {
        VolumeClass::High
    } else if current < low_ratio * average {
        VolumeClass::Low
    } else {
        VolumeClass::Normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bands() {
        assert_eq!(volume_ratio_class(1600.0, 1000.0), VolumeClass::High);
        assert_eq!(volume_ratio_class(1500.0, 1000.0), VolumeClass::Normal);
        assert_eq!(volume_ratio_class(500.0, 1000.0), VolumeClass::Normal);
        assert_eq!(volume_ratio_class(499.0, 1000.0), VolumeClass::Low);
    }

    #[test]
    fn non_positive_average_is_normal() {
        assert_eq!(volume_ratio_class(1_000_000.0, 0.0), VolumeClass::Normal);
        assert_eq!(volume_ratio_class(0.0, -1.0), VolumeClass::Normal);
    }

    #[test]
    fn custom_bands() {
        assert_eq!(classify_volume_with(1300.0, 1000.0, 1.2, 0.8), VolumeClass::High);
        assert_eq!(classify_volume_with(700.0, 1000.0, 1.2, 0.8), VolumeClass::Low);
    }
}
