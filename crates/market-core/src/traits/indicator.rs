//! Indicator trait definitions.

use crate::error::IndicatorError;

/// Trait for technical indicators over a close-price series.
///
/// Implementations are pure: the same input always yields the same bits.
pub trait Indicator: Send + Sync {
    /// Compute the latest indicator value.
    ///
    /// # Arguments
    /// * `closes` - Close prices ordered oldest to newest
    ///
    /// # Returns
    /// The indicator's value at the newest close. Each indicator documents
    /// what it returns when there is not enough data.
    fn value(&self, closes: &[f64]) -> f64;

    /// Get the minimum data points required.
    fn period(&self) -> usize;

    /// Get the name of the indicator.
    fn name(&self) -> &str;

    /// Validate that there's enough data.
    fn validate_data(&self, closes: &[f64]) -> Result<(), IndicatorError> {
        if closes.len() < self.period() {
            return Err(IndicatorError::InsufficientData {
                required: self.period(),
                available: closes.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct LastClose {
        period: usize,
    }

    impl Indicator for LastClose {
        fn value(&self, closes: &[f64]) -> f64 {
            closes.last().copied().unwrap_or(0.0)
        }

        fn period(&self) -> usize {
            self.period
        }

        fn name(&self) -> &str {
            "test"
        }
    }

    #[test]
    fn test_indicator_validation() {
        let indicator = LastClose { period: 5 };

        assert!(indicator.validate_data(&[1.0, 2.0, 3.0]).is_err());
        assert!(indicator.validate_data(&[1.0, 2.0, 3.0, 4.0, 5.0]).is_ok());
        assert_eq!(indicator.value(&[1.0, 2.0]), 2.0);
    }
}
