//! Per-series RMSSE: naive-baseline scale, prediction error and their ratio.

use super::scale::{forecast_mse, naive_mse, rmsse};
use crate::config::EvalConfig;
use crate::core::{Panel, SeriesValues};
use crate::error::{EvalError, Result};

/// Naive-baseline mean squared error per series of the training panel.
///
/// This is the RMSSE denominator. Series with fewer than two active dates get
/// NaN.
pub fn naive_baseline_error(train: &Panel, config: &EvalConfig) -> Result<SeriesValues> {
    train.expect_axis(&config.date_axis)?;
    if train.is_empty() {
        return Err(EvalError::EmptyData);
    }
    let rows = train.field(&config.target_field)?;
    let values = rows.iter().map(|row| naive_mse(row)).collect();
    SeriesValues::new(train.attributes().to_vec(), train.keys().to_vec(), values)
}

/// Mean squared prediction error per series of the validation panel.
///
/// This is the RMSSE numerator.
pub fn prediction_error(valid: &Panel, config: &EvalConfig) -> Result<SeriesValues> {
    valid.expect_axis(&config.date_axis)?;
    if valid.is_empty() {
        return Err(EvalError::EmptyData);
    }
    let actual = valid.field(&config.target_field)?;
    let predicted = valid.field(&config.predicted_field)?;
    let values = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| forecast_mse(a, p))
        .collect();
    SeriesValues::new(valid.attributes().to_vec(), valid.keys().to_vec(), values)
}

/// Root mean squared scaled error per series, NaN where undefined.
///
/// Results follow the training panel's series order. The validation panel
/// must hold exactly the training series and start after training ends.
pub fn normalized_error_ratio(
    train: &Panel,
    valid: &Panel,
    config: &EvalConfig,
) -> Result<SeriesValues> {
    config.validate()?;
    let valid = aligned_validation(train, valid, config)?;
    ratios(train, &valid, config)
}

/// Ratios for panels already known to be aligned series by series.
pub(crate) fn ratios(train: &Panel, valid: &Panel, config: &EvalConfig) -> Result<SeriesValues> {
    let denominator = naive_baseline_error(train, config)?;
    let numerator = prediction_error(valid, config)?;

    let values = numerator
        .values()
        .iter()
        .zip(denominator.values())
        .map(|(&num, &den)| rmsse(num, den))
        .collect();
    SeriesValues::new(train.attributes().to_vec(), train.keys().to_vec(), values)
}

/// Check the training/validation preconditions and return the validation
/// panel reordered to the training series order.
pub(crate) fn aligned_validation(
    train: &Panel,
    valid: &Panel,
    config: &EvalConfig,
) -> Result<Panel> {
    train.expect_axis(&config.date_axis)?;
    valid.expect_axis(&config.date_axis)?;
    if train.is_empty() || valid.is_empty() || train.n_series() == 0 {
        return Err(EvalError::EmptyData);
    }

    if let (Some(train_end), Some(valid_start)) = (train.dates().last(), valid.dates().first()) {
        if train_end >= valid_start {
            return Err(EvalError::DateOverlap {
                train_end: train_end.to_rfc3339(),
                valid_start: valid_start.to_rfc3339(),
            });
        }
    }

    valid.align_to(train)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SeriesKey;
    use approx::assert_relative_eq;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn dates(start: usize, n: usize) -> Vec<DateTime<Utc>> {
        let base = Utc.with_ymd_and_hms(2016, 1, 1, 0, 0, 0).unwrap();
        (start..start + n)
            .map(|i| base + Duration::days(i as i64))
            .collect()
    }

    fn train_panel() -> Panel {
        Panel::builder()
            .dates(dates(0, 3))
            .attributes(["item_id"])
            .series(
                SeriesKey::new(["A"]),
                [("sales", vec![0.0, 5.0, 5.0]), ("price", vec![1.0; 3])],
            )
            .series(
                SeriesKey::new(["Z"]),
                [("sales", vec![0.0, 0.0, 0.0]), ("price", vec![1.0; 3])],
            )
            .build()
            .unwrap()
    }

    fn valid_panel() -> Panel {
        Panel::builder()
            .dates(dates(3, 2))
            .attributes(["item_id"])
            .series(
                SeriesKey::new(["Z"]),
                [("sales", vec![0.0, 0.0]), ("sales_hat", vec![1.0, 1.0])],
            )
            .series(
                SeriesKey::new(["A"]),
                [("sales", vec![10.0, 10.0]), ("sales_hat", vec![8.0, 12.0])],
            )
            .build()
            .unwrap()
    }

    #[test]
    fn baseline_and_prediction_errors_per_series() {
        let config = EvalConfig::default();

        let baseline = naive_baseline_error(&train_panel(), &config).unwrap();
        assert_relative_eq!(
            baseline.get(&SeriesKey::new(["A"])).unwrap(),
            25.0,
            epsilon = 1e-12
        );
        assert!(baseline.get(&SeriesKey::new(["Z"])).unwrap().is_nan());

        let prediction = prediction_error(&valid_panel(), &config).unwrap();
        assert_relative_eq!(
            prediction.get(&SeriesKey::new(["A"])).unwrap(),
            4.0,
            epsilon = 1e-12
        );
        assert_relative_eq!(
            prediction.get(&SeriesKey::new(["Z"])).unwrap(),
            1.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn ratio_follows_training_order_and_marks_degenerate_series() {
        let ratio =
            normalized_error_ratio(&train_panel(), &valid_panel(), &EvalConfig::default())
                .unwrap();

        assert_eq!(ratio.keys()[0], SeriesKey::new(["A"]));
        assert_relative_eq!(ratio.values()[0], 0.4, epsilon = 1e-12);
        assert!(ratio.values()[1].is_nan());
        assert_eq!(ratio.missing_count(), 1);
    }

    #[test]
    fn overlapping_dates_are_rejected() {
        let valid = Panel::builder()
            .dates(dates(2, 2))
            .attributes(["item_id"])
            .series(
                SeriesKey::new(["A"]),
                [("sales", vec![1.0, 1.0]), ("sales_hat", vec![1.0, 1.0])],
            )
            .series(
                SeriesKey::new(["Z"]),
                [("sales", vec![1.0, 1.0]), ("sales_hat", vec![1.0, 1.0])],
            )
            .build()
            .unwrap();

        let result = normalized_error_ratio(&train_panel(), &valid, &EvalConfig::default());
        assert!(matches!(result, Err(EvalError::DateOverlap { .. })));
    }

    #[test]
    fn validation_series_must_exist_in_training() {
        let valid = Panel::builder()
            .dates(dates(3, 1))
            .attributes(["item_id"])
            .series(
                SeriesKey::new(["A"]),
                [("sales", vec![1.0]), ("sales_hat", vec![1.0])],
            )
            .series(
                SeriesKey::new(["NEW"]),
                [("sales", vec![1.0]), ("sales_hat", vec![1.0])],
            )
            .build()
            .unwrap();

        let result = normalized_error_ratio(&train_panel(), &valid, &EvalConfig::default());
        assert!(matches!(result, Err(EvalError::SeriesMismatch(_))));
    }

    #[test]
    fn configured_names_are_enforced() {
        let config = EvalConfig::default().with_date_axis("day");
        assert!(matches!(
            naive_baseline_error(&train_panel(), &config),
            Err(EvalError::AxisMismatch { .. })
        ));

        let config = EvalConfig::default().with_predicted_field("forecast");
        assert_eq!(
            prediction_error(&valid_panel(), &config),
            Err(EvalError::MissingField("forecast".to_string()))
        );
    }
}
