//! Error types for the m5-eval library.

use thiserror::Error;

/// Result type alias for evaluation operations.
pub type Result<T> = std::result::Result<T, EvalError>;

/// Errors that can occur while building panels or scoring forecasts.
///
/// Numeric degeneracies (a series with too few active observations, a zero
/// baseline) are not errors: they surface as NaN ratios. Everything here is a
/// structural problem with the inputs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Dimension mismatch between data structures.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Timestamp-related error.
    #[error("timestamp error: {0}")]
    TimestampError(String),

    /// A named field is not present on the panel.
    #[error("missing field: {0}")]
    MissingField(String),

    /// The configured date axis does not match the panel's axis.
    #[error("date axis mismatch: expected {expected:?}, got {got:?}")]
    AxisMismatch { expected: String, got: String },

    /// A hierarchy level groups by an attribute the series key does not carry.
    #[error("level {level:?} references unknown attribute {attribute:?}")]
    UnknownAttribute { level: String, attribute: String },

    /// A level lists the same grouping attribute more than once.
    #[error("level {level:?} groups by {attribute:?} more than once")]
    DuplicateAttribute { level: String, attribute: String },

    /// Two panels disagree on their series-key attributes.
    #[error("series key attributes differ: {left:?} vs {right:?}")]
    SchemaMismatch {
        left: Vec<String>,
        right: Vec<String>,
    },

    /// The same series key appears twice.
    #[error("duplicate series key: {0}")]
    DuplicateSeries(String),

    /// A series is present in one input but not in the other.
    #[error("series mismatch: {0}")]
    SeriesMismatch(String),

    /// Training dates do not strictly precede validation dates.
    #[error("training window ends at {train_end}, not before validation start {valid_start}")]
    DateOverlap {
        train_end: String,
        valid_start: String,
    },

    /// Two hierarchy levels share a name.
    #[error("duplicate hierarchy level: {0}")]
    DuplicateLevel(String),

    /// The hierarchy has no levels to average over.
    #[error("hierarchy has no levels")]
    EmptyHierarchy,

    /// Trailing sales value is zero across every series, so weights are undefined.
    #[error("total trailing value is zero; weights are undefined")]
    ZeroTotalWeight,
}
