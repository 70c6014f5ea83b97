// Loader module: ingestion of the upstream feature table.

pub mod csv_source;
pub mod traits;

pub use csv_source::CsvSource;
pub use traits::TableSource;

use chrono::{DateTime, Utc};

/// A feature row as read from the source. Missing cells stay `None` until the
/// normalizer decides what to keep.
#[derive(Debug, Clone, PartialEq)]
pub struct RawFeatureRecord {
    pub line: u64,
    pub time_trade: Option<DateTime<Utc>>,
    pub mid_price: Option<f64>,
    pub size_imbalance: Option<f64>,
    pub ewma_price_return: Option<f64>,
}
