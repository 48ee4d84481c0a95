//! Categorical keys identifying one series (or one aggregated group).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered tuple of categorical attribute values.
///
/// The attribute names live on the owning [`Panel`](super::Panel) or
/// [`SeriesValues`](super::SeriesValues); the key only stores values, in the
/// same order. Equality is exact string equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SeriesKey(Vec<String>);

impl SeriesKey {
    /// Create a key from attribute values in key order.
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(values.into_iter().map(Into::into).collect())
    }

    /// Key of the single group produced by collapsing every series.
    pub fn total() -> Self {
        Self(Vec::new())
    }

    /// Attribute values, in key order.
    pub fn values(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Project onto a subset of positions, in the given order.
    pub fn project(&self, indices: &[usize]) -> SeriesKey {
        Self(indices.iter().map(|&i| self.0[i].clone()).collect())
    }
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.pad("<total>");
        }
        f.pad(&self.0.join("|"))
    }
}

impl<S: Into<String>> FromIterator<S> for SeriesKey {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_joins_values_with_pipes() {
        let key = SeriesKey::new(["HOBBIES_1_001", "CA_1"]);
        assert_eq!(key.to_string(), "HOBBIES_1_001|CA_1");
        assert_eq!(SeriesKey::total().to_string(), "<total>");
    }

    #[test]
    fn display_honours_width_and_alignment() {
        let key = SeriesKey::new(["A", "B"]);
        assert_eq!(format!("[{:<10}]", key), "[A|B       ]");
        assert_eq!(format!("[{:>5}]", key), "[  A|B]");
        assert_eq!(format!("[{:^9}]", SeriesKey::total()), "[ <total> ]");
    }

    #[test]
    fn project_keeps_requested_order() {
        let key = SeriesKey::new(["item", "store", "state"]);
        assert_eq!(key.project(&[2, 0]), SeriesKey::new(["state", "item"]));
        assert!(key.project(&[]).is_empty());
    }
}
