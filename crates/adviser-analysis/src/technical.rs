//! Technical indicator analysis over a price series

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ta::{
    Next,
    indicators::{
        BollingerBands, ExponentialMovingAverage, RelativeStrengthIndex, SimpleMovingAverage,
    },
};

use adviser_core::error::{AdviserError, Result};
use adviser_core::series::PriceSeries;
use adviser_core::snapshot::{TechnicalSnapshot, Trend};

/// Tunables for the technical component
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechnicalConfig {
    /// Minimum number of bars required before any indicator is computed
    pub min_bars: usize,

    /// RSI lookback period
    pub rsi_period: usize,

    /// Short moving-average window for trend detection
    pub ma_short_period: usize,

    /// Long moving-average window for trend detection
    pub ma_long_period: usize,

    /// MACD fast EMA period
    pub macd_fast: usize,

    /// MACD slow EMA period
    pub macd_slow: usize,

    /// MACD signal EMA period
    pub macd_signal: usize,

    /// Bollinger band window
    pub bollinger_period: usize,

    /// Bollinger band width in standard deviations
    pub bollinger_stddev: f64,

    /// Bars required on each side of a pivot high/low
    pub pivot_span: usize,

    /// Trailing window scanned for support/resistance pivots
    pub pivot_window: usize,

    /// RSI level above which the trend can be called bullish
    pub rsi_bullish: f64,

    /// RSI level below which the trend can be called bearish
    pub rsi_bearish: f64,
}

impl Default for TechnicalConfig {
    fn default() -> Self {
        Self {
            min_bars: 20,
            rsi_period: 14,
            ma_short_period: 10,
            ma_long_period: 20,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            bollinger_period: 20,
            bollinger_stddev: 2.0,
            pivot_span: 2,
            pivot_window: 20,
            rsi_bullish: 55.0,
            rsi_bearish: 45.0,
        }
    }
}

impl TechnicalConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let periods = [
            self.min_bars,
            self.rsi_period,
            self.ma_short_period,
            self.ma_long_period,
            self.macd_fast,
            self.macd_slow,
            self.macd_signal,
            self.bollinger_period,
            self.pivot_span,
        ];
        if periods.contains(&0) {
            return Err(AdviserError::Config(
                "technical periods must be greater than 0".to_string(),
            ));
        }
        if self.ma_short_period >= self.ma_long_period {
            return Err(AdviserError::Config(
                "ma_short_period must be shorter than ma_long_period".to_string(),
            ));
        }
        if self.min_bars < self.ma_long_period || self.min_bars < self.bollinger_period {
            return Err(AdviserError::Config(
                "min_bars must cover the longest indicator window".to_string(),
            ));
        }
        if !self.bollinger_stddev.is_finite() || self.bollinger_stddev <= 0.0 {
            return Err(AdviserError::Config(
                "bollinger_stddev must be positive".to_string(),
            ));
        }
        if self.pivot_window <= 2 * self.pivot_span {
            return Err(AdviserError::Config(
                "pivot_window must exceed twice pivot_span".to_string(),
            ));
        }
        if self.rsi_bearish >= self.rsi_bullish
            || self.rsi_bearish <= 0.0
            || self.rsi_bullish >= 100.0
        {
            return Err(AdviserError::Config(
                "rsi thresholds must satisfy 0 < bearish < bullish < 100".to_string(),
            ));
        }
        Ok(())
    }
}

/// Computes the indicator snapshot and trend call for one series
pub struct TechnicalAnalyzer {
    config: TechnicalConfig,
}

impl TechnicalAnalyzer {
    pub fn new(config: TechnicalConfig) -> Self {
        Self { config }
    }

    /// Analyze a price series into indicators, trend, and pivot levels
    pub fn analyze(&self, series: &PriceSeries) -> Result<TechnicalSnapshot> {
        if series.len() < self.config.min_bars {
            return Err(AdviserError::InsufficientData {
                context: "technical indicators".to_string(),
                required: self.config.min_bars,
                actual: series.len(),
            });
        }

        let closes = series.closes();
        let mut indicators = BTreeMap::new();

        let mut rsi = RelativeStrengthIndex::new(self.config.rsi_period)
            .map_err(|e| AdviserError::Config(e.to_string()))?;
        let mut sma_short = SimpleMovingAverage::new(self.config.ma_short_period)
            .map_err(|e| AdviserError::Config(e.to_string()))?;
        let mut sma_long = SimpleMovingAverage::new(self.config.ma_long_period)
            .map_err(|e| AdviserError::Config(e.to_string()))?;
        let mut ema_fast = ExponentialMovingAverage::new(self.config.macd_fast)
            .map_err(|e| AdviserError::Config(e.to_string()))?;
        let mut ema_slow = ExponentialMovingAverage::new(self.config.macd_slow)
            .map_err(|e| AdviserError::Config(e.to_string()))?;
        let mut signal_ema = ExponentialMovingAverage::new(self.config.macd_signal)
            .map_err(|e| AdviserError::Config(e.to_string()))?;
        let mut bollinger =
            BollingerBands::new(self.config.bollinger_period, self.config.bollinger_stddev)
                .map_err(|e| AdviserError::Config(e.to_string()))?;

        let mut rsi_value = 50.0;
        let mut sma_short_value = 0.0;
        let mut sma_long_value = 0.0;
        let mut ema_fast_value = 0.0;
        let mut ema_slow_value = 0.0;
        let mut macd_value = 0.0;
        let mut signal_value = 0.0;
        let mut bollinger_out = None;

        for &close in &closes {
            rsi_value = rsi.next(close);
            sma_short_value = sma_short.next(close);
            sma_long_value = sma_long.next(close);
            ema_fast_value = ema_fast.next(close);
            ema_slow_value = ema_slow.next(close);
            // MACD as the fast/slow EMA spread, with its own signal EMA
            macd_value = ema_fast_value - ema_slow_value;
            signal_value = signal_ema.next(macd_value);
            bollinger_out = Some(bollinger.next(close));
        }

        indicators.insert("rsi".to_string(), rsi_value);
        indicators.insert("sma_short".to_string(), sma_short_value);
        indicators.insert("sma_long".to_string(), sma_long_value);
        indicators.insert("ema_fast".to_string(), ema_fast_value);
        indicators.insert("ema_slow".to_string(), ema_slow_value);
        indicators.insert("macd".to_string(), macd_value);
        indicators.insert("macd_signal".to_string(), signal_value);
        indicators.insert("macd_histogram".to_string(), macd_value - signal_value);
        if let Some(bands) = bollinger_out {
            indicators.insert("bollinger_upper".to_string(), bands.upper);
            indicators.insert("bollinger_middle".to_string(), bands.average);
            indicators.insert("bollinger_lower".to_string(), bands.lower);
        }

        let trend = self.classify_trend(rsi_value, sma_short_value, sma_long_value);
        let (support, resistance) = self.pivots(&closes);

        Ok(TechnicalSnapshot {
            trend,
            indicators,
            support,
            resistance,
        })
    }

    fn classify_trend(&self, rsi: f64, sma_short: f64, sma_long: f64) -> Trend {
        if rsi > self.config.rsi_bullish && sma_short > sma_long {
            Trend::Bullish
        } else if rsi < self.config.rsi_bearish && sma_short < sma_long {
            Trend::Bearish
        } else {
            Trend::Neutral
        }
    }

    /// Pivot highs/lows over the trailing window
    ///
    /// A close is a pivot when it is the strict extremum among the
    /// `pivot_span` closes on each side. The last `pivot_span` bars can
    /// never qualify, so levels lag the most recent bars slightly.
    fn pivots(&self, closes: &[f64]) -> (Vec<f64>, Vec<f64>) {
        let span = self.config.pivot_span;
        let window_start = closes.len().saturating_sub(self.config.pivot_window);
        let first = window_start.max(span);
        let last = closes.len().saturating_sub(span);

        let mut support = Vec::new();
        let mut resistance = Vec::new();

        for i in first..last {
            let center = closes[i];
            let neighborhood = &closes[i - span..=i + span];
            let is_high = neighborhood
                .iter()
                .enumerate()
                .all(|(k, &v)| i - span + k == i || v < center);
            let is_low = neighborhood
                .iter()
                .enumerate()
                .all(|(k, &v)| i - span + k == i || v > center);
            if is_high {
                resistance.push(center);
            }
            if is_low {
                support.push(center);
            }
        }

        (support, resistance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adviser_core::series::Bar;
    use chrono::{Duration, TimeZone, Utc};

    fn series(closes: &[f64]) -> PriceSeries {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar {
                timestamp: start + Duration::days(i as i64),
                open: close,
                high: close * 1.005,
                low: close * 0.995,
                close,
                volume: 10_000,
            })
            .collect();
        PriceSeries::new(bars).unwrap()
    }

    fn drifting_closes(bars: usize, up_step: f64, down_step: f64) -> Vec<f64> {
        let mut closes = Vec::with_capacity(bars);
        let mut price = 100.0;
        closes.push(price);
        for i in 1..bars {
            price *= if i % 2 == 1 { up_step } else { down_step };
            closes.push(price);
        }
        closes
    }

    #[test]
    fn rejects_short_series() {
        let analyzer = TechnicalAnalyzer::new(TechnicalConfig::default());
        let closes: Vec<f64> = (0..19).map(|i| 100.0 + f64::from(i)).collect();
        let err = analyzer.analyze(&series(&closes)).unwrap_err();
        assert!(matches!(
            err,
            AdviserError::InsufficientData {
                required: 20,
                actual: 19,
                ..
            }
        ));
    }

    #[test]
    fn accepts_exactly_min_bars() {
        let analyzer = TechnicalAnalyzer::new(TechnicalConfig::default());
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + f64::from(i) * 0.1).collect();
        assert!(analyzer.analyze(&series(&closes)).is_ok());
    }

    #[test]
    fn uptrend_reads_bullish() {
        let analyzer = TechnicalAnalyzer::new(TechnicalConfig::default());
        let closes = drifting_closes(30, 1.016, 0.991);
        let snapshot = analyzer.analyze(&series(&closes)).unwrap();

        let rsi = snapshot.rsi().unwrap();
        assert!(rsi > 55.0 && rsi < 75.0, "rsi was {rsi}");
        assert!(snapshot.indicator("sma_short").unwrap() > snapshot.indicator("sma_long").unwrap());
        assert_eq!(snapshot.trend, Trend::Bullish);
    }

    #[test]
    fn downtrend_reads_bearish() {
        let analyzer = TechnicalAnalyzer::new(TechnicalConfig::default());
        let closes = drifting_closes(30, 0.984, 1.009);
        let snapshot = analyzer.analyze(&series(&closes)).unwrap();

        let rsi = snapshot.rsi().unwrap();
        assert!(rsi < 45.0, "rsi was {rsi}");
        assert_eq!(snapshot.trend, Trend::Bearish);
    }

    #[test]
    fn sideways_series_reads_neutral() {
        let analyzer = TechnicalAnalyzer::new(TechnicalConfig::default());
        let closes = drifting_closes(30, 1.002, 0.998);
        let snapshot = analyzer.analyze(&series(&closes)).unwrap();
        assert_eq!(snapshot.trend, Trend::Neutral);
    }

    #[test]
    fn detects_pivot_levels_in_window() {
        let analyzer = TechnicalAnalyzer::new(TechnicalConfig::default());
        let mut closes = vec![100.0; 30];
        closes[25] = 104.0;
        closes[20] = 96.0;
        let snapshot = analyzer.analyze(&series(&closes)).unwrap();

        assert_eq!(snapshot.resistance, vec![104.0]);
        assert_eq!(snapshot.support, vec![96.0]);
        assert!((snapshot.nearest_resistance().unwrap() - 104.0).abs() < f64::EPSILON);
    }

    #[test]
    fn ignores_pivots_outside_trailing_window() {
        let analyzer = TechnicalAnalyzer::new(TechnicalConfig::default());
        let mut closes = vec![100.0; 30];
        closes[5] = 110.0;
        let snapshot = analyzer.analyze(&series(&closes)).unwrap();
        assert!(snapshot.resistance.is_empty());
        assert!(snapshot.support.is_empty());
    }

    #[test]
    fn validates_config_ranges() {
        let config = TechnicalConfig {
            ma_short_period: 25,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = TechnicalConfig {
            rsi_bearish: 60.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        assert!(TechnicalConfig::default().validate().is_ok());
    }
}
