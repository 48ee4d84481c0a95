//! Core data structures: panels, series keys and per-series results.

mod panel;
mod series_key;
mod series_values;

pub use panel::{Panel, PanelBuilder};
pub use series_key::SeriesKey;
pub use series_values::SeriesValues;

pub(crate) use series_values::nan_sum;
