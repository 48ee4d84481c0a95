//! One scalar per series or group.

use super::SeriesKey;
use crate::error::{EvalError, Result};
use serde::Serialize;
use std::collections::HashMap;

/// Scalar results keyed by series (or by group after aggregation).
///
/// NaN is the missing-value marker: it is what degenerate series produce and
/// it is skipped by [`SeriesValues::sum`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesValues {
    attributes: Vec<String>,
    keys: Vec<SeriesKey>,
    values: Vec<f64>,
}

impl SeriesValues {
    pub fn new(attributes: Vec<String>, keys: Vec<SeriesKey>, values: Vec<f64>) -> Result<Self> {
        if keys.len() != values.len() {
            return Err(EvalError::DimensionMismatch {
                expected: keys.len(),
                got: values.len(),
            });
        }
        for key in &keys {
            if key.len() != attributes.len() {
                return Err(EvalError::DimensionMismatch {
                    expected: attributes.len(),
                    got: key.len(),
                });
            }
        }
        Ok(Self {
            attributes,
            keys,
            values,
        })
    }

    /// Attribute names matching each key position.
    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    /// Series keys, in value order.
    pub fn keys(&self) -> &[SeriesKey] {
        &self.keys
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value for a key (NaN if present but missing).
    pub fn get(&self, key: &SeriesKey) -> Option<f64> {
        self.keys
            .iter()
            .position(|k| k == key)
            .map(|i| self.values[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SeriesKey, f64)> {
        self.keys.iter().zip(self.values.iter().copied())
    }

    /// Sum of all non-missing values.
    pub fn sum(&self) -> f64 {
        nan_sum(self.values.iter().copied())
    }

    /// Number of missing (NaN) entries.
    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_nan()).count()
    }

    /// Values reordered to follow `keys`.
    ///
    /// Fails if the key sets are not identical.
    pub fn aligned_to(&self, keys: &[SeriesKey]) -> Result<Vec<f64>> {
        if keys.len() != self.keys.len() {
            return Err(EvalError::SeriesMismatch(format!(
                "expected {} series, got {}",
                keys.len(),
                self.keys.len()
            )));
        }
        let lookup: HashMap<&SeriesKey, f64> = self.iter().collect();
        keys.iter()
            .map(|key| {
                lookup
                    .get(key)
                    .copied()
                    .ok_or_else(|| EvalError::SeriesMismatch(format!("no value for {}", key)))
            })
            .collect()
    }
}

/// Sum that skips NaN entries (an all-NaN input sums to zero).
pub(crate) fn nan_sum<I: IntoIterator<Item = f64>>(values: I) -> f64 {
    values.into_iter().filter(|v| !v.is_nan()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SeriesValues {
        SeriesValues::new(
            vec!["item_id".to_string()],
            vec![SeriesKey::new(["a"]), SeriesKey::new(["b"]), SeriesKey::new(["c"])],
            vec![1.0, f64::NAN, 2.5],
        )
        .unwrap()
    }

    #[test]
    fn sum_skips_missing_values() {
        let values = sample();
        assert_eq!(values.sum(), 3.5);
        assert_eq!(values.missing_count(), 1);
    }

    #[test]
    fn lookup_by_key() {
        let values = sample();
        assert_eq!(values.get(&SeriesKey::new(["c"])), Some(2.5));
        assert!(values.get(&SeriesKey::new(["b"])).unwrap().is_nan());
        assert_eq!(values.get(&SeriesKey::new(["z"])), None);
    }

    #[test]
    fn aligned_to_reorders_and_rejects_unknown_keys() {
        let values = sample();
        let reordered = values
            .aligned_to(&[SeriesKey::new(["c"]), SeriesKey::new(["a"]), SeriesKey::new(["b"])])
            .unwrap();
        assert_eq!(reordered[0], 2.5);
        assert_eq!(reordered[1], 1.0);

        let result = values.aligned_to(&[
            SeriesKey::new(["a"]),
            SeriesKey::new(["b"]),
            SeriesKey::new(["x"]),
        ]);
        assert!(matches!(result, Err(EvalError::SeriesMismatch(_))));
    }

    #[test]
    fn constructor_checks_lengths() {
        let result = SeriesValues::new(
            vec!["item_id".to_string()],
            vec![SeriesKey::new(["a"])],
            vec![1.0, 2.0],
        );
        assert!(matches!(result, Err(EvalError::DimensionMismatch { .. })));
    }
}
