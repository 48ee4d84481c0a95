use super::{Grouping, Level};
use crate::core::{Panel, SeriesKey, SeriesValues};
use crate::error::{EvalError, Result};
use std::collections::{BTreeMap, HashMap};

/// Partition of a panel's series into the groups of one hierarchy level.
///
/// Groups are keyed by the tuple of the level's attribute values and appear in
/// order of first occurrence. Every series belongs to exactly one group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupIndex {
    /// Attribute names naming each group-key position.
    attributes: Vec<String>,
    /// One key per group.
    keys: Vec<SeriesKey>,
    /// Keys of the source series, in the order `membership` refers to.
    source_keys: Vec<SeriesKey>,
    /// Group position of each source series.
    membership: Vec<usize>,
}

impl GroupIndex {
    /// Build the partition of `panel`'s series for `level`.
    pub fn build(panel: &Panel, level: &Level) -> Result<Self> {
        level.validate_against(panel.attributes())?;
        let source_keys = panel.keys().to_vec();

        let attributes = match &level.grouping {
            Grouping::Series => {
                let membership = (0..source_keys.len()).collect();
                return Ok(Self {
                    attributes: panel.attributes().to_vec(),
                    keys: source_keys.clone(),
                    source_keys,
                    membership,
                });
            }
            Grouping::Attributes(attributes) => attributes,
        };

        let positions = attributes
            .iter()
            .map(|attribute| {
                panel
                    .attribute_index(attribute)
                    .ok_or_else(|| EvalError::UnknownAttribute {
                        level: level.name.clone(),
                        attribute: attribute.clone(),
                    })
            })
            .collect::<Result<Vec<usize>>>()?;

        let mut keys = Vec::new();
        let mut lookup: HashMap<SeriesKey, usize> = HashMap::new();
        let membership = source_keys
            .iter()
            .map(|key| {
                let group_key = if positions.is_empty() {
                    SeriesKey::total()
                } else {
                    key.project(&positions)
                };
                *lookup.entry(group_key.clone()).or_insert_with(|| {
                    keys.push(group_key);
                    keys.len() - 1
                })
            })
            .collect();

        Ok(Self {
            attributes: attributes.clone(),
            keys,
            source_keys,
            membership,
        })
    }

    /// Attribute names of the group keys.
    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    /// Group keys, in first-occurrence order.
    pub fn keys(&self) -> &[SeriesKey] {
        &self.keys
    }

    /// Number of groups.
    pub fn n_groups(&self) -> usize {
        self.keys.len()
    }

    /// Group position of each source series.
    pub fn membership(&self) -> &[usize] {
        &self.membership
    }

    /// Sum per-series rows into per-group rows, date by date, skipping NaN.
    pub fn sum_rows(&self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        self.check_len(rows.len())?;
        let width = rows.first().map_or(0, Vec::len);

        let mut sums = vec![vec![0.0; width]; self.n_groups()];
        for (row, &group) in rows.iter().zip(&self.membership) {
            if row.len() != width {
                return Err(EvalError::DimensionMismatch {
                    expected: width,
                    got: row.len(),
                });
            }
            for (acc, &v) in sums[group].iter_mut().zip(row) {
                if !v.is_nan() {
                    *acc += v;
                }
            }
        }
        Ok(sums)
    }

    /// Sum per-series scalars into per-group scalars, skipping NaN.
    pub fn sum_values(&self, values: &[f64]) -> Result<Vec<f64>> {
        self.check_len(values.len())?;
        let mut sums = vec![0.0; self.n_groups()];
        for (&v, &group) in values.iter().zip(&self.membership) {
            if !v.is_nan() {
                sums[group] += v;
            }
        }
        Ok(sums)
    }

    /// Aggregate the named fields of `panel` into one row per group.
    ///
    /// `panel` must hold the same series the index was built from (any order).
    pub fn aggregate_panel(&self, panel: &Panel, fields: &[&str]) -> Result<Panel> {
        let order = self.source_order(panel.keys())?;

        let mut grouped = BTreeMap::new();
        for &name in fields {
            let rows = panel.field(name)?;
            let ordered: Vec<Vec<f64>> = order.iter().map(|&i| rows[i].clone()).collect();
            grouped.insert(name.to_string(), self.sum_rows(&ordered)?);
        }

        panel.regrouped(self.attributes.clone(), self.keys.clone(), grouped)
    }

    /// Aggregate per-series scalars (e.g. weights) into per-group scalars.
    pub fn aggregate_values(&self, values: &SeriesValues) -> Result<SeriesValues> {
        let ordered = values.aligned_to(&self.source_keys)?;
        SeriesValues::new(
            self.attributes.clone(),
            self.keys.clone(),
            self.sum_values(&ordered)?,
        )
    }

    fn check_len(&self, got: usize) -> Result<()> {
        if got != self.membership.len() {
            return Err(EvalError::DimensionMismatch {
                expected: self.membership.len(),
                got,
            });
        }
        Ok(())
    }

    /// Positions in `keys` of each source series.
    fn source_order(&self, keys: &[SeriesKey]) -> Result<Vec<usize>> {
        if keys == self.source_keys.as_slice() {
            return Ok((0..keys.len()).collect());
        }
        if keys.len() != self.source_keys.len() {
            return Err(EvalError::SeriesMismatch(format!(
                "expected {} series, got {}",
                self.source_keys.len(),
                keys.len()
            )));
        }
        let positions: HashMap<&SeriesKey, usize> =
            keys.iter().enumerate().map(|(i, k)| (k, i)).collect();
        self.source_keys
            .iter()
            .map(|key| {
                positions
                    .get(key)
                    .copied()
                    .ok_or_else(|| EvalError::SeriesMismatch(format!("series {} is missing", key)))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn make_daily_dates(n: usize) -> Vec<DateTime<Utc>> {
        (0..n)
            .map(|i| Utc.with_ymd_and_hms(2016, 3, 1 + i as u32, 0, 0, 0).unwrap())
            .collect()
    }

    fn store_panel() -> Panel {
        Panel::builder()
            .dates(make_daily_dates(3))
            .attributes(["item_id", "store_id", "state_id"])
            .series(
                SeriesKey::new(["A", "CA_1", "CA"]),
                [("sales", vec![1.0, 2.0, 3.0])],
            )
            .series(
                SeriesKey::new(["B", "CA_1", "CA"]),
                [("sales", vec![10.0, f64::NAN, 30.0])],
            )
            .series(
                SeriesKey::new(["A", "TX_1", "TX"]),
                [("sales", vec![100.0, 200.0, 300.0])],
            )
            .build()
            .unwrap()
    }

    #[test]
    fn groups_follow_first_occurrence() {
        let panel = store_panel();
        let level = Level::new("state", Grouping::by(["state_id"]));
        let index = GroupIndex::build(&panel, &level).unwrap();

        assert_eq!(index.n_groups(), 2);
        assert_eq!(index.keys()[0], SeriesKey::new(["CA"]));
        assert_eq!(index.keys()[1], SeriesKey::new(["TX"]));
        assert_eq!(index.membership(), &[0, 0, 1]);
    }

    #[test]
    fn multi_attribute_keys_use_level_order() {
        let panel = store_panel();
        let level = Level::new("product-state", Grouping::by(["state_id", "item_id"]));
        let index = GroupIndex::build(&panel, &level).unwrap();

        assert_eq!(index.n_groups(), 3);
        assert_eq!(index.keys()[0], SeriesKey::new(["CA", "A"]));
        assert_eq!(index.attributes(), &["state_id", "item_id"]);
    }

    #[test]
    fn aggregate_panel_sums_members_skipping_nan() {
        let panel = store_panel();
        let level = Level::new("state", Grouping::by(["state_id"]));
        let index = GroupIndex::build(&panel, &level).unwrap();

        let grouped = index.aggregate_panel(&panel, &["sales"]).unwrap();
        let rows = grouped.field("sales").unwrap();
        assert_eq!(rows[0], vec![11.0, 2.0, 33.0]);
        assert_eq!(rows[1], vec![100.0, 200.0, 300.0]);
        assert_eq!(grouped.dates(), panel.dates());
    }

    #[test]
    fn total_collapses_everything() {
        let panel = store_panel();
        let index = GroupIndex::build(&panel, &Level::new("total", Grouping::total())).unwrap();

        assert_eq!(index.n_groups(), 1);
        assert_eq!(index.keys()[0], SeriesKey::total());
        let grouped = index.aggregate_panel(&panel, &["sales"]).unwrap();
        assert_eq!(grouped.field("sales").unwrap()[0], vec![111.0, 202.0, 333.0]);
    }

    #[test]
    fn series_sentinel_is_identity() {
        let panel = store_panel();
        let index =
            GroupIndex::build(&panel, &Level::new("product-store", Grouping::Series)).unwrap();
        assert_eq!(index.n_groups(), panel.n_series());
        assert_eq!(index.keys(), panel.keys());
    }

    #[test]
    fn aggregate_values_aligns_by_key() {
        let panel = store_panel();
        let index = GroupIndex::build(&panel, &Level::new("store", Grouping::by(["store_id"])))
            .unwrap();

        // Same series, different order
        let weights = SeriesValues::new(
            panel.attributes().to_vec(),
            vec![
                SeriesKey::new(["A", "TX_1", "TX"]),
                SeriesKey::new(["A", "CA_1", "CA"]),
                SeriesKey::new(["B", "CA_1", "CA"]),
            ],
            vec![0.5, 0.2, 0.3],
        )
        .unwrap();

        let grouped = index.aggregate_values(&weights).unwrap();
        assert_eq!(grouped.get(&SeriesKey::new(["CA_1"])), Some(0.5));
        assert_eq!(grouped.get(&SeriesKey::new(["TX_1"])), Some(0.5));
    }

    #[test]
    fn unknown_attribute_fails_fast() {
        let panel = store_panel();
        let level = Level::new("dept", Grouping::by(["dept_id"]));
        let result = GroupIndex::build(&panel, &level);
        assert!(matches!(result, Err(EvalError::UnknownAttribute { .. })));
    }

    #[test]
    fn repeated_attribute_fails_fast() {
        let panel = store_panel();
        let level = Level::new("state", Grouping::by(["state_id", "state_id"]));
        assert_eq!(
            GroupIndex::build(&panel, &level),
            Err(EvalError::DuplicateAttribute {
                level: "state".to_string(),
                attribute: "state_id".to_string(),
            })
        );
    }
}
