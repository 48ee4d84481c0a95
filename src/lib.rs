//! # m5-eval
//!
//! Hierarchical weighted RMSSE for retail demand forecasts, as scored in the
//! M5 accuracy competition.
//!
//! Forecasts are compared against a one-step naive baseline per series,
//! weighted by each series' share of recent sales value, and scored at every
//! level of a product/location hierarchy. The overall score is the mean of the
//! level scores.
//!
//! ```
//! use chrono::{Duration, TimeZone, Utc};
//! use m5_eval::prelude::*;
//!
//! let start = Utc.with_ymd_and_hms(2016, 1, 1, 0, 0, 0).unwrap();
//! let days = |from: i64, n: i64| -> Vec<_> {
//!     (from..from + n).map(|i| start + Duration::days(i)).collect()
//! };
//!
//! let train = Panel::builder()
//!     .dates(days(0, 3))
//!     .attributes(["item_id"])
//!     .series(
//!         SeriesKey::new(["A"]),
//!         [("sales", vec![0.0, 5.0, 5.0]), ("price", vec![1.0; 3])],
//!     )
//!     .build()
//!     .unwrap();
//! let valid = Panel::builder()
//!     .dates(days(3, 2))
//!     .attributes(["item_id"])
//!     .series(
//!         SeriesKey::new(["A"]),
//!         [("sales", vec![10.0, 10.0]), ("sales_hat", vec![8.0, 12.0])],
//!     )
//!     .build()
//!     .unwrap();
//!
//! let score = weighted_score(&train, &valid, &EvalConfig::default()).unwrap();
//! assert!((score - 0.4).abs() < 1e-12);
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod hierarchy;
pub mod metrics;

pub use error::{EvalError, Result};

pub mod prelude {
    pub use crate::config::{EvalConfig, MissingRatioPolicy};
    pub use crate::core::{Panel, PanelBuilder, SeriesKey, SeriesValues};
    pub use crate::error::{EvalError, Result};
    pub use crate::hierarchy::{Grouping, Hierarchy, Level};
    pub use crate::metrics::{
        evaluate, naive_baseline_error, normalized_error_ratio, overall_score, prediction_error,
        scores_per_level, series_weights, weighted_score, EvaluationReport, LevelScores,
    };
}
