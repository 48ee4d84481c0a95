//! Series weights from trailing sales value.
//!
//! Only bottom-level series are weighted: aggregate levels reuse the summed
//! series weights instead of carrying their own share of the multi-level
//! scheme. Scores across levels are therefore comparable but are not the
//! official competition weights.

use crate::config::EvalConfig;
use crate::core::{nan_sum, Panel, SeriesValues};
use crate::error::{EvalError, Result};

/// Share of total sales value (quantity × price) over the last
/// `config.window_length` training dates, per series.
///
/// Weights are non-negative for non-negative inputs and sum to one. Unobserved
/// (NaN) quantities or prices contribute nothing.
pub fn series_weights(train: &Panel, config: &EvalConfig) -> Result<SeriesValues> {
    config.validate()?;
    train.expect_axis(&config.date_axis)?;
    if train.n_series() == 0 {
        return Err(EvalError::EmptyData);
    }

    let window = train.tail(config.window_length);
    let quantity = window.field(&config.target_field)?;
    let price = window.field(&config.price_field)?;

    let raw: Vec<f64> = quantity
        .iter()
        .zip(price)
        .map(|(q, p)| nan_sum(q.iter().zip(p).map(|(q, p)| q * p)))
        .collect();
    let total = nan_sum(raw.iter().copied());

    tracing::trace!(
        window = window.len(),
        series = raw.len(),
        total,
        "computed trailing sales value"
    );

    if total == 0.0 {
        return Err(EvalError::ZeroTotalWeight);
    }
    if !total.is_finite() {
        return Err(EvalError::InvalidParameter(
            "trailing sales value is not finite".to_string(),
        ));
    }

    let weights = raw.iter().map(|value| value / total).collect();
    SeriesValues::new(train.attributes().to_vec(), train.keys().to_vec(), weights)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SeriesKey;
    use approx::assert_relative_eq;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn dates(n: usize) -> Vec<DateTime<Utc>> {
        let base = Utc.with_ymd_and_hms(2016, 1, 1, 0, 0, 0).unwrap();
        (0..n).map(|i| base + Duration::days(i as i64)).collect()
    }

    fn panel() -> Panel {
        Panel::builder()
            .dates(dates(4))
            .attributes(["item_id"])
            .series(
                SeriesKey::new(["A"]),
                [
                    ("sales", vec![100.0, 1.0, 1.0, 2.0]),
                    ("price", vec![1.0, 2.0, 2.0, 2.0]),
                ],
            )
            .series(
                SeriesKey::new(["B"]),
                [
                    ("sales", vec![0.0, 4.0, 0.0, 0.0]),
                    ("price", vec![f64::NAN, 3.0, 3.0, 3.0]),
                ],
            )
            .series(
                SeriesKey::new(["C"]),
                [
                    ("sales", vec![5.0, 0.0, 0.0, 0.0]),
                    ("price", vec![1.0, 1.0, 1.0, 1.0]),
                ],
            )
            .build()
            .unwrap()
    }

    #[test]
    fn weights_use_trailing_window_only() {
        let config = EvalConfig::default().with_window_length(3);
        let weights = series_weights(&panel(), &config).unwrap();

        // A: 2 + 2 + 4 = 8, B: 12, C: 0
        assert_relative_eq!(weights.values()[0], 0.4, epsilon = 1e-12);
        assert_relative_eq!(weights.values()[1], 0.6, epsilon = 1e-12);
        assert_eq!(weights.values()[2], 0.0);
        assert_relative_eq!(weights.sum(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn window_longer_than_panel_uses_everything() {
        let weights = series_weights(&panel(), &EvalConfig::default()).unwrap();

        // A: 108, B: 12 (NaN price skipped), C: 5
        assert_relative_eq!(weights.values()[0], 108.0 / 125.0, epsilon = 1e-12);
        assert_relative_eq!(weights.values()[1], 12.0 / 125.0, epsilon = 1e-12);
        assert_relative_eq!(weights.values()[2], 5.0 / 125.0, epsilon = 1e-12);
    }

    #[test]
    fn zero_trailing_value_is_an_error() {
        let config = EvalConfig::default().with_window_length(1);
        let zero = Panel::builder()
            .dates(dates(2))
            .attributes(["item_id"])
            .series(
                SeriesKey::new(["A"]),
                [("sales", vec![3.0, 0.0]), ("price", vec![1.0, 1.0])],
            )
            .build()
            .unwrap();
        assert_eq!(
            series_weights(&zero, &config),
            Err(EvalError::ZeroTotalWeight)
        );
    }

    #[test]
    fn missing_price_field_is_reported() {
        let config = EvalConfig::default().with_price_field("sell_price");
        assert_eq!(
            series_weights(&panel(), &config),
            Err(EvalError::MissingField("sell_price".to_string()))
        );
    }
}
