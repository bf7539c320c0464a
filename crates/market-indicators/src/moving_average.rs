//! Moving average indicators.

use market_core::traits::Indicator;

/// Arithmetic mean of the last `period` closes.
///
/// Returns 0.0 when fewer than `period` closes are available.
pub fn sma(closes: &[f64], period: usize) -> f64 {
    if period == 0 || closes.len() < period {
        return 0.0;
    }

    let window = &closes[closes.len() - period..];
    window.iter().sum::<f64>() / period as f64
}

/// Exponential moving average at the newest close.
///
/// Seeded with the SMA of the *oldest* `period` closes, then walked forward
/// through the remaining closes with multiplier `2 / (period + 1)`:
/// `ema = (close - ema) * multiplier + ema`. Starting the walk anywhere else
/// yields different numbers.
///
/// Returns 0.0 when fewer than `period` closes are available.
pub fn ema(closes: &[f64], period: usize) -> f64 {
    if period == 0 || closes.len() < period {
        return 0.0;
    }

    let mut ema = closes[..period].iter().sum::<f64>() / period as f64;
    let multiplier = 2.0 / (period as f64 + 1.0);

    for &close in &closes[period..] {
        ema = (close - ema) * multiplier + ema;
    }

    ema
}

/// Simple Moving Average (SMA).
#[derive(Debug, Clone, Copy)]
pub struct Sma {
    period: usize,
}

impl Sma {
    /// Create a new SMA with the specified period.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }
}

impl Indicator for Sma {
    fn value(&self, closes: &[f64]) -> f64 {
        sma(closes, self.period)
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "SMA"
    }
}

/// Exponential Moving Average (EMA), oldest-window seeded.
#[derive(Debug, Clone, Copy)]
pub struct Ema {
    period: usize,
}

impl Ema {
    /// Create a new EMA with the specified period.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }

    /// Smoothing factor 2/(n+1).
    pub fn multiplier(&self) -> f64 {
        2.0 / (self.period as f64 + 1.0)
    }
}

impl Indicator for Ema {
    fn value(&self, closes: &[f64]) -> f64 {
        ema(closes, self.period)
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "EMA"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wave(len: usize) -> Vec<f64> {
        (0..len)
            .map(|i| 100.0 + (i as f64 * 0.7).sin() * 8.0 + i as f64 * 0.05)
            .collect()
    }

    #[test]
    fn test_sma_uses_latest_window() {
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0];

        assert!((sma(&data, 3) - 4.0).abs() < 1e-10); // (3+4+5)/3
        assert!((sma(&data, 5) - 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_sma_insufficient_data() {
        assert_eq!(sma(&[1.0, 2.0, 3.0], 5), 0.0);
        assert_eq!(sma(&[1.0, 2.0, 3.0], 0), 0.0);
    }

    #[test]
    fn test_ema_seed_then_walk() {
        // seed = (1+2+3)/3 = 2, mult = 0.5
        // 4 -> (4-2)*0.5+2 = 3; 5 -> (5-3)*0.5+3 = 4
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        assert!((ema(&data, 3) - 4.0).abs() < 1e-10);
    }

    #[test]
    fn test_ema_exact_window_is_sma() {
        let data = vec![10.0, 20.0, 30.0];
        assert!((ema(&data, 3) - 20.0).abs() < 1e-10);
    }

    #[test]
    fn test_ema_seed_is_oldest_window() {
        // Seeding from the newest window instead would give a different value.
        let data = vec![1.0, 1.0, 1.0, 10.0, 10.0, 10.0];
        let forward = ema(&data, 3);
        assert!((forward - 8.875).abs() < 1e-10);
    }

    #[test]
    fn test_ema_insufficient_data() {
        assert_eq!(ema(&[1.0, 2.0], 3), 0.0);
    }

    #[test]
    fn test_ema_within_close_bounds() {
        let data = wave(120);
        let min = data.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = data.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

        for period in [1, 5, 12, 26, 50] {
            let value = ema(&data, period);
            assert!(value >= min && value <= max, "period {} gave {}", period, value);
        }
    }

    #[test]
    fn test_indicator_trait_matches_functions() {
        let data = wave(60);

        assert_eq!(Sma::new(20).value(&data).to_bits(), sma(&data, 20).to_bits());
        assert_eq!(Ema::new(12).value(&data).to_bits(), ema(&data, 12).to_bits());
        assert!((Ema::new(3).multiplier() - 0.5).abs() < 1e-12);
        assert!(Sma::new(50).validate_data(&data).is_ok());
        assert!(Sma::new(61).validate_data(&data).is_err());
    }
}
