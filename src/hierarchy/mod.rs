//! Hierarchy definitions: named ways of grouping series for aggregate scoring.
//!
//! A [`Hierarchy`] is an ordered list of uniquely named [`Level`]s. Each level
//! either scores every series on its own ([`Grouping::Series`]), collapses all
//! series into one total (`Grouping::Attributes` with no attributes), or sums
//! series sharing the same values of the listed key attributes.

mod grouping;

pub use grouping::GroupIndex;

use crate::error::{EvalError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// How a level groups series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grouping {
    /// No aggregation: every series is its own group.
    Series,
    /// Group by these key attributes; empty means one group holding everything.
    Attributes(Vec<String>),
}

impl Grouping {
    /// Collapse every series into a single group.
    pub fn total() -> Self {
        Grouping::Attributes(Vec::new())
    }

    /// Group by the listed key attributes.
    pub fn by<I, S>(attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Grouping::Attributes(attributes.into_iter().map(Into::into).collect())
    }

    pub fn is_total(&self) -> bool {
        matches!(self, Grouping::Attributes(attrs) if attrs.is_empty())
    }

    /// Grouping attributes, or `None` for the no-aggregation sentinel.
    pub fn attributes(&self) -> Option<&[String]> {
        match self {
            Grouping::Series => None,
            Grouping::Attributes(attrs) => Some(attrs),
        }
    }
}

/// A named level of the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    pub name: String,
    pub grouping: Grouping,
}

impl Level {
    /// Create a level named `name`.
    pub fn new(name: impl Into<String>, grouping: Grouping) -> Self {
        Self {
            name: name.into(),
            grouping,
        }
    }

    /// Fail if the level groups by an attribute outside `attributes`, or by
    /// the same attribute twice.
    pub fn validate_against(&self, attributes: &[String]) -> Result<()> {
        if let Some(wanted) = self.grouping.attributes() {
            let mut seen = HashSet::with_capacity(wanted.len());
            for attribute in wanted {
                if !seen.insert(attribute) {
                    return Err(EvalError::DuplicateAttribute {
                        level: self.name.clone(),
                        attribute: attribute.clone(),
                    });
                }
                if !attributes.contains(attribute) {
                    return Err(EvalError::UnknownAttribute {
                        level: self.name.clone(),
                        attribute: attribute.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Ordered, uniquely named hierarchy levels.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<Level>", into = "Vec<Level>")]
pub struct Hierarchy {
    levels: Vec<Level>,
}

impl Hierarchy {
    /// Create an empty hierarchy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a hierarchy from levels in order, rejecting duplicate names.
    pub fn from_levels(levels: Vec<Level>) -> Result<Self> {
        let mut hierarchy = Self::new();
        for level in levels {
            hierarchy.push(level)?;
        }
        Ok(hierarchy)
    }

    /// Append a level, rejecting duplicate names.
    pub fn push(&mut self, level: Level) -> Result<()> {
        if self.levels.iter().any(|l| l.name == level.name) {
            return Err(EvalError::DuplicateLevel(level.name));
        }
        self.levels.push(level);
        Ok(())
    }

    /// Append a level, builder style.
    pub fn with_level(mut self, name: impl Into<String>, grouping: Grouping) -> Result<Self> {
        self.push(Level::new(name, grouping))?;
        Ok(self)
    }

    /// The twelve M5 accuracy levels over `item_id`, `store_id`, `state_id`,
    /// `cat_id` and `dept_id`. The finest level is scored per series.
    pub fn m5() -> Self {
        let levels = vec![
            Level::new("total", Grouping::total()),
            Level::new("state", Grouping::by(["state_id"])),
            Level::new("store", Grouping::by(["store_id"])),
            Level::new("cat", Grouping::by(["cat_id"])),
            Level::new("dept", Grouping::by(["dept_id"])),
            Level::new("state-cat", Grouping::by(["state_id", "cat_id"])),
            Level::new("state-dept", Grouping::by(["state_id", "dept_id"])),
            Level::new("store-cat", Grouping::by(["store_id", "cat_id"])),
            Level::new("store-dept", Grouping::by(["store_id", "dept_id"])),
            Level::new("product", Grouping::by(["item_id"])),
            Level::new("product-state", Grouping::by(["item_id", "state_id"])),
            Level::new("product-store", Grouping::Series),
        ];
        Self { levels }
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Level> {
        self.levels.iter()
    }

    /// Look up a level by name.
    pub fn get(&self, name: &str) -> Option<&Level> {
        self.levels.iter().find(|l| l.name == name)
    }

    /// Fail fast on the first level referencing an unknown attribute.
    pub fn validate_against(&self, attributes: &[String]) -> Result<()> {
        self.levels
            .iter()
            .try_for_each(|level| level.validate_against(attributes))
    }
}

impl TryFrom<Vec<Level>> for Hierarchy {
    type Error = EvalError;

    fn try_from(levels: Vec<Level>) -> Result<Self> {
        Self::from_levels(levels)
    }
}

impl From<Hierarchy> for Vec<Level> {
    fn from(hierarchy: Hierarchy) -> Self {
        hierarchy.levels
    }
}

impl<'a> IntoIterator for &'a Hierarchy {
    type Item = &'a Level;
    type IntoIter = std::slice::Iter<'a, Level>;

    fn into_iter(self) -> Self::IntoIter {
        self.levels.iter()
    }
}
