//! Weighted RMSSE: flat, per hierarchy level, and overall.

use super::rmsse::{aligned_validation, ratios};
use super::scale::weighted_ratio_sum;
use super::weights::series_weights;
use crate::config::EvalConfig;
use crate::core::{Panel, SeriesValues};
use crate::error::{EvalError, Result};
use crate::hierarchy::{GroupIndex, Grouping, Hierarchy, Level};
use serde::Serialize;

/// Score of one hierarchy level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelReport {
    /// Level name.
    pub name: String,
    /// Weighted sum of group ratios.
    pub score: f64,
    /// Number of groups the level was split into.
    pub groups: usize,
    /// Number of groups whose ratio was undefined.
    pub missing: usize,
}

/// Level scores in hierarchy order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct LevelScores {
    scores: Vec<(String, f64)>,
}

impl LevelScores {
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Score of the named level.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.scores
            .iter()
            .find(|(level, _)| level == name)
            .map(|(_, score)| *score)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.scores.iter().map(|(name, score)| (name.as_str(), *score))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.scores.iter().map(|(name, _)| name.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.scores.iter().map(|(_, score)| *score)
    }

    /// Unweighted mean of the level scores (NaN when empty).
    pub fn mean(&self) -> f64 {
        if self.scores.is_empty() {
            return f64::NAN;
        }
        self.values().sum::<f64>() / self.scores.len() as f64
    }
}

impl FromIterator<(String, f64)> for LevelScores {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self {
            scores: iter.into_iter().collect(),
        }
    }
}

/// Full result of a hierarchical evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    /// One entry per level, in hierarchy order.
    pub levels: Vec<LevelReport>,
    /// Mean of the level scores.
    pub overall: f64,
}

impl EvaluationReport {
    /// Level scores without group counts.
    pub fn scores(&self) -> LevelScores {
        self.levels
            .iter()
            .map(|level| (level.name.clone(), level.score))
            .collect()
    }

    /// Report of the named level.
    pub fn level(&self, name: &str) -> Option<&LevelReport> {
        self.levels.iter().find(|level| level.name == name)
    }
}

/// Weighted RMSSE over the ungrouped series.
///
/// Weights come from the training panel (see [`series_weights`]); missing
/// ratios are handled per `config.missing_ratios`.
pub fn weighted_score(train: &Panel, valid: &Panel, config: &EvalConfig) -> Result<f64> {
    config.validate()?;
    let valid = aligned_validation(train, valid, config)?;
    let weights = series_weights(train, config)?;
    let ratio = ratios(train, &valid, config)?;
    weighted_sum(&weights, &ratio, config)
}

/// Evaluate every hierarchy level and the overall mean.
pub fn evaluate(
    train: &Panel,
    valid: &Panel,
    hierarchy: &Hierarchy,
    config: &EvalConfig,
) -> Result<EvaluationReport> {
    config.validate()?;
    if hierarchy.is_empty() {
        return Err(EvalError::EmptyHierarchy);
    }
    hierarchy.validate_against(train.attributes())?;

    let valid = aligned_validation(train, valid, config)?;
    let weights = series_weights(train, config)?;

    let levels = hierarchy
        .iter()
        .map(|level| score_level(train, &valid, &weights, level, config))
        .collect::<Result<Vec<_>>>()?;

    let overall = levels
        .iter()
        .map(|level| (level.name.clone(), level.score))
        .collect::<LevelScores>()
        .mean();

    tracing::debug!(levels = levels.len(), overall, "evaluated hierarchy");

    Ok(EvaluationReport { levels, overall })
}

/// Weighted RMSSE per hierarchy level, in hierarchy order.
pub fn scores_per_level(
    train: &Panel,
    valid: &Panel,
    hierarchy: &Hierarchy,
    config: &EvalConfig,
) -> Result<LevelScores> {
    evaluate(train, valid, hierarchy, config).map(|report| report.scores())
}

/// Unweighted mean of [`scores_per_level`].
pub fn overall_score(
    train: &Panel,
    valid: &Panel,
    hierarchy: &Hierarchy,
    config: &EvalConfig,
) -> Result<f64> {
    evaluate(train, valid, hierarchy, config).map(|report| report.overall)
}

/// Score one level on panels already aligned series by series.
fn score_level(
    train: &Panel,
    valid: &Panel,
    weights: &SeriesValues,
    level: &Level,
    config: &EvalConfig,
) -> Result<LevelReport> {
    let (ratio, level_weights) = match level.grouping {
        Grouping::Series => (ratios(train, valid, config)?, weights.clone()),
        Grouping::Attributes(_) => {
            let index = GroupIndex::build(train, level)?;
            let train_groups = index.aggregate_panel(train, &[config.target_field.as_str()])?;
            let valid_groups = index.aggregate_panel(
                valid,
                &[
                    config.target_field.as_str(),
                    config.predicted_field.as_str(),
                ],
            )?;
            (
                ratios(&train_groups, &valid_groups, config)?,
                index.aggregate_values(weights)?,
            )
        }
    };

    let score = weighted_sum(&level_weights, &ratio, config)?;
    let report = LevelReport {
        name: level.name.clone(),
        score,
        groups: ratio.len(),
        missing: ratio.missing_count(),
    };

    if report.groups > 0 && report.missing == report.groups {
        tracing::warn!(level = %report.name, "every group in level has an undefined ratio");
    }
    tracing::debug!(
        level = %report.name,
        score = report.score,
        groups = report.groups,
        missing = report.missing,
        "scored hierarchy level"
    );

    Ok(report)
}

fn weighted_sum(weights: &SeriesValues, ratio: &SeriesValues, config: &EvalConfig) -> Result<f64> {
    let aligned = weights.aligned_to(ratio.keys())?;
    Ok(weighted_ratio_sum(
        &aligned,
        ratio.values(),
        config.missing_ratios,
    ))
}
