//! Weighted RMSSE evaluation.
//!
//! The pipeline, per series or per aggregated group:
//!
//! 1. [`naive_baseline_error`]: mean squared one-step naive error over the
//!    training window, counted from the first sale (the scale).
//! 2. [`prediction_error`]: mean squared forecast error over the validation
//!    window.
//! 3. [`normalized_error_ratio`]: `sqrt(prediction / baseline)`, NaN where
//!    undefined.
//! 4. [`series_weights`]: share of trailing sales value.
//! 5. [`weighted_score`], [`scores_per_level`], [`overall_score`]: weighted
//!    sums of ratios, per hierarchy level and averaged across levels.

mod rmsse;
pub mod scale;
mod weights;
mod wrmsse;

pub use rmsse::{naive_baseline_error, normalized_error_ratio, prediction_error};
pub use weights::series_weights;
pub use wrmsse::{
    evaluate, overall_score, scores_per_level, weighted_score, EvaluationReport, LevelReport,
    LevelScores,
};
