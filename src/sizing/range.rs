//! Size ranges and the absolute size bounds.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SizingError};

// == Public Constants ==
/// Smallest size multiplier the engine will ever hand out
pub const MIN_SIZE: f32 = 0.25;

/// Largest size multiplier the engine will ever hand out
pub const MAX_SIZE: f32 = 4.0;

/// Multiplier that leaves host values untouched
pub const NEUTRAL_SIZE: f32 = 1.0;

/// Clamps a multiplier into `[MIN_SIZE, MAX_SIZE]`.
pub fn clamp_to_bounds(size: f32) -> f32 {
    size.clamp(MIN_SIZE, MAX_SIZE)
}

/// Rounds a multiplier to two decimal digits.
pub fn round_size(size: f64) -> f32 {
    ((size * 100.0).round() / 100.0) as f32
}

// == Size Range ==
/// Inclusive range a size is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeRange {
    pub min: f32,
    pub max: f32,
}

impl Default for SizeRange {
    fn default() -> Self {
        Self { min: 0.9, max: 1.1 }
    }
}

impl SizeRange {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn midpoint(&self) -> f64 {
        (f64::from(self.min) + f64::from(self.max)) / 2.0
    }

    pub fn span(&self) -> f64 {
        f64::from(self.max) - f64::from(self.min)
    }

    pub fn contains(&self, size: f32) -> bool {
        size >= self.min && size <= self.max
    }

    pub fn clamp(&self, size: f32) -> f32 {
        size.clamp(self.min, self.max)
    }

    // == Validate ==
    /// Checks the range is ordered, finite and inside the absolute bounds.
    pub fn validate(&self) -> Result<()> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(SizingError::InvalidSettings(
                "size range bounds must be finite".to_string(),
            ));
        }
        if self.min > self.max {
            return Err(SizingError::InvalidSettings(format!(
                "size range is inverted: {} > {}",
                self.min, self.max
            )));
        }
        if self.min < MIN_SIZE || self.max > MAX_SIZE {
            return Err(SizingError::InvalidSettings(format!(
                "size range [{}, {}] exceeds bounds [{}, {}]",
                self.min, self.max, MIN_SIZE, MAX_SIZE
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_range() {
        let range = SizeRange::default();
        assert_eq!(range.min, 0.9);
        assert_eq!(range.max, 1.1);
        assert!((range.midpoint() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_validate_accepts_bounds() {
        assert!(SizeRange::new(MIN_SIZE, MAX_SIZE).validate().is_ok());
        assert!(SizeRange::new(1.0, 1.0).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_inverted() {
        let result = SizeRange::new(1.2, 0.8).validate();
        assert!(matches!(result, Err(SizingError::InvalidSettings(_))));
    }

    #[test]
    fn test_validate_rejects_out_of_bounds() {
        assert!(SizeRange::new(0.1, 1.0).validate().is_err());
        assert!(SizeRange::new(1.0, 5.0).validate().is_err());
        assert!(SizeRange::new(f32::NAN, 1.0).validate().is_err());
    }

    #[test]
    fn test_round_size() {
        assert_eq!(round_size(1.0349), 1.03);
        assert_eq!(round_size(0.996), 1.0);
    }

    #[test]
    fn test_clamp_to_bounds() {
        assert_eq!(clamp_to_bounds(-1.0), MIN_SIZE);
        assert_eq!(clamp_to_bounds(9.0), MAX_SIZE);
        assert_eq!(clamp_to_bounds(1.5), 1.5);
    }
}
