//! Panel data structure: numeric fields over a date × series grid.

use super::SeriesKey;
use crate::error::{EvalError, Result};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap, HashSet};

/// A labeled date × series panel.
///
/// Every series is identified by a [`SeriesKey`] whose positions are named by
/// [`Panel::attributes`] (e.g. `item_id`, `store_id`, `cat_id`). Numeric fields
/// (`sales`, `sales_hat`, `price`, ...) are stored series-major:
/// `field[series][date]`. NaN marks an unobserved value.
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    date_axis: String,
    dates: Vec<DateTime<Utc>>,
    attributes: Vec<String>,
    keys: Vec<SeriesKey>,
    fields: BTreeMap<String, Vec<Vec<f64>>>,
}

/// Builder for constructing a [`Panel`] one series at a time.
#[derive(Debug, Clone)]
pub struct PanelBuilder {
    date_axis: String,
    dates: Vec<DateTime<Utc>>,
    attributes: Vec<String>,
    series: Vec<(SeriesKey, Vec<(String, Vec<f64>)>)>,
}

impl Default for PanelBuilder {
    fn default() -> Self {
        Self {
            date_axis: "date".to_string(),
            dates: Vec::new(),
            attributes: Vec::new(),
            series: Vec::new(),
        }
    }
}

impl PanelBuilder {
    /// Create an empty builder on a `"date"` axis.
    pub fn new() -> Self {
        Self::default()
    }

    /// Name of the date axis (defaults to `"date"`).
    pub fn date_axis(mut self, name: impl Into<String>) -> Self {
        self.date_axis = name.into();
        self
    }

    /// Set the dates, which must be strictly increasing.
    pub fn dates(mut self, dates: Vec<DateTime<Utc>>) -> Self {
        self.dates = dates;
        self
    }

    /// Names of the series-key attributes, in key order.
    pub fn attributes<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes = names.into_iter().map(Into::into).collect();
        self
    }

    /// Add one series with its named field rows.
    pub fn series<I, S>(mut self, key: SeriesKey, fields: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<f64>)>,
        S: Into<String>,
    {
        let fields = fields
            .into_iter()
            .map(|(name, values)| (name.into(), values))
            .collect();
        self.series.push((key, fields));
        self
    }

    /// Validate and assemble the panel.
    pub fn build(self) -> Result<Panel> {
        let mut keys = Vec::with_capacity(self.series.len());
        let mut fields: BTreeMap<String, Vec<Vec<f64>>> = BTreeMap::new();

        for (index, (key, series_fields)) in self.series.into_iter().enumerate() {
            let names: Vec<&String> = series_fields.iter().map(|(name, _)| name).collect();
            if index == 0 {
                for name in &names {
                    fields.insert((*name).clone(), Vec::new());
                }
                if fields.len() != names.len() {
                    return Err(EvalError::InvalidParameter(format!(
                        "series {} repeats a field name",
                        key
                    )));
                }
            } else if names.len() != fields.len()
                || names.iter().any(|name| !fields.contains_key(*name))
            {
                return Err(EvalError::InvalidParameter(format!(
                    "series {} does not carry the same fields as the first series",
                    key
                )));
            }

            for (name, values) in series_fields {
                if let Some(rows) = fields.get_mut(&name) {
                    rows.push(values);
                }
            }
            keys.push(key);
        }

        Panel::new(self.date_axis, self.dates, self.attributes, keys, fields)
    }
}

impl Panel {
    /// Start building a panel series by series.
    pub fn builder() -> PanelBuilder {
        PanelBuilder::new()
    }

    /// Create a panel from already-shaped parts.
    pub fn new(
        date_axis: String,
        dates: Vec<DateTime<Utc>>,
        attributes: Vec<String>,
        keys: Vec<SeriesKey>,
        fields: BTreeMap<String, Vec<Vec<f64>>>,
    ) -> Result<Self> {
        if date_axis.is_empty() {
            return Err(EvalError::InvalidParameter(
                "date axis name cannot be empty".to_string(),
            ));
        }

        for i in 1..dates.len() {
            if dates[i] <= dates[i - 1] {
                return Err(EvalError::TimestampError(
                    "dates must be strictly increasing".to_string(),
                ));
            }
        }

        let unique_attributes: HashSet<&String> = attributes.iter().collect();
        if unique_attributes.len() != attributes.len() {
            return Err(EvalError::InvalidParameter(
                "series key attribute names must be unique".to_string(),
            ));
        }

        let mut seen = HashSet::with_capacity(keys.len());
        for key in &keys {
            if key.len() != attributes.len() {
                return Err(EvalError::DimensionMismatch {
                    expected: attributes.len(),
                    got: key.len(),
                });
            }
            if !seen.insert(key) {
                return Err(EvalError::DuplicateSeries(key.to_string()));
            }
        }

        for rows in fields.values() {
            if rows.len() != keys.len() {
                return Err(EvalError::DimensionMismatch {
                    expected: keys.len(),
                    got: rows.len(),
                });
            }
            for row in rows {
                if row.len() != dates.len() {
                    return Err(EvalError::DimensionMismatch {
                        expected: dates.len(),
                        got: row.len(),
                    });
                }
            }
        }

        Ok(Self {
            date_axis,
            dates,
            attributes,
            keys,
            fields,
        })
    }

    /// Name of the date axis.
    pub fn date_axis(&self) -> &str {
        &self.date_axis
    }

    /// Dates, oldest first.
    pub fn dates(&self) -> &[DateTime<Utc>] {
        &self.dates
    }

    /// Number of dates.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Number of series.
    pub fn n_series(&self) -> usize {
        self.keys.len()
    }

    /// Names of the series-key attributes.
    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    /// Series keys, in row order.
    pub fn keys(&self) -> &[SeriesKey] {
        &self.keys
    }

    /// Names of the stored fields, sorted.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Rows of a field, one per series.
    pub fn field(&self, name: &str) -> Result<&[Vec<f64>]> {
        self.fields
            .get(name)
            .map(|rows| rows.as_slice())
            .ok_or_else(|| EvalError::MissingField(name.to_string()))
    }

    /// Key position of an attribute.
    pub fn attribute_index(&self, name: &str) -> Option<usize> {
        self.attributes.iter().position(|a| a == name)
    }

    /// Row position of a series.
    pub fn series_index(&self, key: &SeriesKey) -> Option<usize> {
        self.keys.iter().position(|k| k == key)
    }

    /// The panel restricted to its last `n` dates (the whole panel if shorter).
    pub fn tail(&self, n: usize) -> Panel {
        let start = self.len().saturating_sub(n);
        let fields = self
            .fields
            .iter()
            .map(|(name, rows)| {
                let rows = rows.iter().map(|row| row[start..].to_vec()).collect();
                (name.clone(), rows)
            })
            .collect();

        Panel {
            date_axis: self.date_axis.clone(),
            dates: self.dates[start..].to_vec(),
            attributes: self.attributes.clone(),
            keys: self.keys.clone(),
            fields,
        }
    }

    /// A copy with series reordered to follow `other`'s key order.
    ///
    /// Both panels must share attribute names and exactly the same series set.
    pub fn align_to(&self, other: &Panel) -> Result<Panel> {
        if self.attributes != other.attributes {
            return Err(EvalError::SchemaMismatch {
                left: self.attributes.clone(),
                right: other.attributes.clone(),
            });
        }
        if self.keys == other.keys {
            return Ok(self.clone());
        }

        let positions: HashMap<&SeriesKey, usize> =
            self.keys.iter().enumerate().map(|(i, k)| (k, i)).collect();
        let order = other
            .keys
            .iter()
            .map(|key| {
                positions.get(key).copied().ok_or_else(|| {
                    EvalError::SeriesMismatch(format!("series {} has no counterpart", key))
                })
            })
            .collect::<Result<Vec<usize>>>()?;

        if self.keys.len() != other.keys.len() {
            let wanted: HashSet<&SeriesKey> = other.keys.iter().collect();
            let extra = self
                .keys
                .iter()
                .find(|k| !wanted.contains(k))
                .map(|k| k.to_string())
                .unwrap_or_default();
            return Err(EvalError::SeriesMismatch(format!(
                "series {} has no counterpart",
                extra
            )));
        }

        let fields = self
            .fields
            .iter()
            .map(|(name, rows)| {
                let rows = order.iter().map(|&i| rows[i].clone()).collect();
                (name.clone(), rows)
            })
            .collect();

        Ok(Panel {
            date_axis: self.date_axis.clone(),
            dates: self.dates.clone(),
            attributes: self.attributes.clone(),
            keys: other.keys.clone(),
            fields,
        })
    }

    pub(crate) fn expect_axis(&self, axis: &str) -> Result<()> {
        if self.date_axis != axis {
            return Err(EvalError::AxisMismatch {
                expected: axis.to_string(),
                got: self.date_axis.clone(),
            });
        }
        Ok(())
    }

    /// A panel on the same dates with different series and fields.
    pub(crate) fn regrouped(
        &self,
        attributes: Vec<String>,
        keys: Vec<SeriesKey>,
        fields: BTreeMap<String, Vec<Vec<f64>>>,
    ) -> Result<Panel> {
        Panel::new(
            self.date_axis.clone(),
            self.dates.clone(),
            attributes,
            keys,
            fields,
        )
    }
}
