// src/forecast.rs
//! Forecast series, prediction-interval band, outlier filter and forecast date window.
use crate::types::{BearingCatalog, SeriesPoint};
use chrono::NaiveDate;
use ndarray::ArrayView1;
use thiserror::Error;

/// Multiplier applied to σ for the interval half-width.
///
/// Presented as a t-like critical value but fixed, independent of sample size
/// or confidence level. Kept literal; it is not statistically justified.
pub const INTERVAL_MULTIPLIER: f64 = 2.1701;

/// Decimal places the half-width is rounded to before it is applied.
const HALF_WIDTH_DECIMALS: i32 = 8;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ForecastError {
    #[error("prediction interval needs at least one value")]
    EmptySeries,
    #[error("value at position {index} is not a finite number")]
    NonFiniteValue { index: usize },
    #[error("bearing selector {index} is out of range (catalog has {count} entries)")]
    UnknownBearing { index: usize, count: usize },
    #[error("forecast begin and end dates must differ")]
    SameDay,
    #[error("forecast begin date is after the end date")]
    BeginAfterEnd,
}

fn round_to(x: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (x * scale).round() / scale
}

/// Returns `(lower, upper)` = `values ∓ round(2.1701·σ, 8)`, σ being the population
/// standard deviation of `values`.
pub fn prediction_interval(values: &[f64]) -> Result<(Vec<f64>, Vec<f64>), ForecastError> {
    if values.is_empty() {
        return Err(ForecastError::EmptySeries);
    }
    if let Some(index) = values.iter().position(|v| !v.is_finite()) {
        return Err(ForecastError::NonFiniteValue { index });
    }

    let arr = ArrayView1::from(values);
    let sigma = arr.std(0.0);
    let half = round_to(INTERVAL_MULTIPLIER * sigma, HALF_WIDTH_DECIMALS);

    let lower = (&arr - half).to_vec();
    let upper = (&arr + half).to_vec();
    Ok((lower, upper))
}

/// Points whose value is strictly above the selected bearing's limit, in series order.
pub fn outliers(
    series: &ForecastSeries,
    catalog: &BearingCatalog,
    bearing: usize,
) -> Result<Vec<SeriesPoint>, ForecastError> {
    let limit = catalog.limit(bearing)?;
    Ok(series
        .points()
        .iter()
        .filter(|p| p.value > limit)
        .copied()
        .collect())
}

/// Forecast built once when the main window opens; never mutated afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct ForecastSeries {
    points: Vec<SeriesPoint>,
}

impl ForecastSeries {
    /// Placeholder ramp `1..=n` with a constant band of `half_width` on each side.
    pub fn ramp(n: u32, half_width: f64) -> Self {
        let points = (1..=n)
            .map(|i| {
                let value = f64::from(i);
                SeriesPoint {
                    index: i,
                    value,
                    lower_bound: value - half_width,
                    upper_bound: value + half_width,
                }
            })
            .collect();
        Self { points }
    }

    /// Series over `values` with the prediction-interval band.
    pub fn with_prediction_interval(values: &[f64]) -> Result<Self, ForecastError> {
        let (lower, upper) = prediction_interval(values)?;
        let points = values
            .iter()
            .zip(lower)
            .zip(upper)
            .enumerate()
            .map(|(i, ((&value, lower_bound), upper_bound))| SeriesPoint {
                index: i as u32 + 1,
                value,
                lower_bound,
                upper_bound,
            })
            .collect();
        Ok(Self { points })
    }

    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// `(min lower bound, max upper bound)`, or `None` for an empty series.
    pub fn y_range(&self) -> Option<(f64, f64)> {
        self.points.iter().fold(None, |acc, p| match acc {
            None => Some((p.lower_bound, p.upper_bound)),
            Some((lo, hi)) => Some((lo.min(p.lower_bound), hi.max(p.upper_bound))),
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ForecastWindow {
    begin: NaiveDate,
    end: NaiveDate,
}

impl ForecastWindow {
    pub fn new(begin: NaiveDate, end: NaiveDate) -> Result<Self, ForecastError> {
        if begin == end {
            return Err(ForecastError::SameDay);
        }
        if begin > end {
            return Err(ForecastError::BeginAfterEnd);
        }
        Ok(Self { begin, end })
    }

    pub fn begin(&self) -> NaiveDate {
        self.begin
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn days(&self) -> i64 {
        (self.end - self.begin).num_days()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp_values() -> Vec<f64> {
        (1..=10).map(f64::from).collect()
    }

    fn outlier_values(bearing: usize) -> Vec<f64> {
        let series = ForecastSeries::ramp(10, 1.0);
        outliers(&series, &BearingCatalog::default(), bearing)
            .unwrap()
            .iter()
            .map(|p| p.value)
            .collect()
    }

    #[test]
    fn test_interval_is_symmetric_around_values() {
        let values = [3.5, -1.0, 8.25, 0.0, 12.0, 4.4];
        let (lower, upper) = prediction_interval(&values).unwrap();
        assert_eq!(lower.len(), values.len());
        assert_eq!(upper.len(), values.len());
        for ((v, lo), hi) in values.iter().zip(&lower).zip(&upper) {
            assert!(lo <= v);
            assert!(hi >= v);
            assert!(((v - lo) - (hi - v)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_interval_on_ramp_uses_rounded_multiplier() {
        // population σ of 1..=10 is sqrt(8.25)
        let expected_half = round_to(2.1701 * 8.25f64.sqrt(), 8);
        let (lower, upper) = prediction_interval(&ramp_values()).unwrap();
        assert!((lower[0] - (1.0 - expected_half)).abs() < 1e-9);
        assert!((upper[9] - (10.0 + expected_half)).abs() < 1e-9);
        assert!((expected_half - 6.2331377).abs() < 1e-8);
    }

    #[test]
    fn test_constant_series_has_zero_width() {
        let (lower, upper) = prediction_interval(&[4.0, 4.0, 4.0]).unwrap();
        assert_eq!(lower, vec![4.0; 3]);
        assert_eq!(upper, vec![4.0; 3]);
    }

    #[test]
    fn test_empty_series_is_rejected() {
        assert_eq!(prediction_interval(&[]), Err(ForecastError::EmptySeries));
        assert_eq!(
            ForecastSeries::with_prediction_interval(&[]),
            Err(ForecastError::EmptySeries)
        );
    }

    #[test]
    fn test_nan_is_rejected() {
        assert_eq!(
            prediction_interval(&[1.0, f64::NAN]),
            Err(ForecastError::NonFiniteValue { index: 1 })
        );
    }

    #[test]
    fn test_ramp_outliers_per_bearing() {
        assert_eq!(outlier_values(0), vec![6.0, 7.0, 8.0, 9.0, 10.0]);
        assert_eq!(outlier_values(1), (3..=10).map(f64::from).collect::<Vec<_>>());
        assert_eq!(outlier_values(2), (4..=10).map(f64::from).collect::<Vec<_>>());
    }

    #[test]
    fn test_outliers_ignore_band_kind() {
        let fixed = ForecastSeries::ramp(10, 1.0);
        let interval = ForecastSeries::with_prediction_interval(&ramp_values()).unwrap();
        let catalog = BearingCatalog::default();
        for bearing in 0..catalog.len() {
            let a: Vec<u32> = outliers(&fixed, &catalog, bearing)
                .unwrap()
                .iter()
                .map(|p| p.index)
                .collect();
            let b: Vec<u32> = outliers(&interval, &catalog, bearing)
                .unwrap()
                .iter()
                .map(|p| p.index)
                .collect();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_limit_itself_is_not_an_outlier() {
        let series = ForecastSeries::ramp(10, 1.0);
        let found = outliers(&series, &BearingCatalog::default(), 0).unwrap();
        assert!(found.iter().all(|p| p.value != 5.0));
    }

    #[test]
    fn test_out_of_range_bearing_is_an_error() {
        let series = ForecastSeries::ramp(10, 1.0);
        assert_eq!(
            outliers(&series, &BearingCatalog::default(), 3),
            Err(ForecastError::UnknownBearing { index: 3, count: 3 })
        );
    }

    #[test]
    fn test_ramp_shape() {
        let series = ForecastSeries::ramp(10, 1.0);
        assert_eq!(series.len(), 10);
        let idx: Vec<u32> = series.points().iter().map(|p| p.index).collect();
        assert_eq!(idx, (1..=10).collect::<Vec<_>>());
        let first = series.points()[0];
        assert_eq!((first.lower_bound, first.value, first.upper_bound), (0.0, 1.0, 2.0));
        assert_eq!(series.y_range(), Some((0.0, 11.0)));
    }

    #[test]
    fn test_forecast_window_validation() {
        let d = |day| NaiveDate::from_ymd_opt(2024, 3, day).unwrap();
        assert_eq!(ForecastWindow::new(d(5), d(5)), Err(ForecastError::SameDay));
        assert_eq!(ForecastWindow::new(d(6), d(5)), Err(ForecastError::BeginAfterEnd));
        let w = ForecastWindow::new(d(5), d(6)).unwrap();
        assert_eq!(w.days(), 1);
        assert_eq!(w.begin(), d(5));
    }
}
