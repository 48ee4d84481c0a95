//! Evaluation configuration: field and axis names, weighting window, missing-ratio policy.

use crate::error::{EvalError, Result};
use serde::{Deserialize, Serialize};

/// How missing (NaN) ratios enter a level's weighted sum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingRatioPolicy {
    /// Missing ratios contribute nothing; weights are left as they are.
    #[default]
    Ignore,
    /// Weights of missing ratios are spread proportionally over the remaining
    /// groups, so the weight in play keeps its original total.
    Redistribute,
}

/// Names and parameters used by every evaluation call.
///
/// Nothing is inferred from the panels: the date axis named here must match
/// the panel's axis, and every field named here must exist where it is read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    /// Observed quantity field.
    pub target_field: String,
    /// Forecast field on the validation panel.
    pub predicted_field: String,
    /// Unit price field on the training panel, used for weights.
    pub price_field: String,
    /// Name of the date axis.
    pub date_axis: String,
    /// Number of trailing training dates used for weights.
    pub window_length: usize,
    /// Treatment of missing ratios in weighted sums.
    pub missing_ratios: MissingRatioPolicy,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            target_field: "sales".to_string(),
            predicted_field: "sales_hat".to_string(),
            price_field: "price".to_string(),
            date_axis: "date".to_string(),
            window_length: 28,
            missing_ratios: MissingRatioPolicy::Ignore,
        }
    }
}

impl EvalConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the field holding observed sales.
    pub fn with_target_field(mut self, name: impl Into<String>) -> Self {
        self.target_field = name.into();
        self
    }

    /// Set the field holding forecasts.
    pub fn with_predicted_field(mut self, name: impl Into<String>) -> Self {
        self.predicted_field = name.into();
        self
    }

    /// Set the field holding unit prices.
    pub fn with_price_field(mut self, name: impl Into<String>) -> Self {
        self.price_field = name.into();
        self
    }

    /// Set the expected name of the date axis.
    pub fn with_date_axis(mut self, name: impl Into<String>) -> Self {
        self.date_axis = name.into();
        self
    }

    /// Set the number of trailing training dates used for weights.
    pub fn with_window_length(mut self, window_length: usize) -> Self {
        self.window_length = window_length;
        self
    }

    /// Set how undefined ratios enter weighted sums.
    pub fn with_missing_ratios(mut self, policy: MissingRatioPolicy) -> Self {
        self.missing_ratios = policy;
        self
    }

    /// Check that the configuration is usable.
    pub fn validate(&self) -> Result<()> {
        if self.window_length == 0 {
            return Err(EvalError::InvalidParameter(
                "window_length must be positive".to_string(),
            ));
        }
        for (what, name) in [
            ("target_field", &self.target_field),
            ("predicted_field", &self.predicted_field),
            ("price_field", &self.price_field),
            ("date_axis", &self.date_axis),
        ] {
            if name.is_empty() {
                return Err(EvalError::InvalidParameter(format!(
                    "{} cannot be empty",
                    what
                )));
            }
        }
        if self.target_field == self.predicted_field {
            return Err(EvalError::InvalidParameter(
                "target_field and predicted_field must differ".to_string(),
            ));
        }
        Ok(())
    }
}
