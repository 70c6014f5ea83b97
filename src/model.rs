// Core structs: TradeFeatureRow, TradeFeatureTable, derived rows, results
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// One observation of the upstream feature table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TradeFeatureRow {
    pub time_trade: DateTime<Utc>,
    pub mid_price: f64,
    pub size_imbalance: f64,
    pub ewma_price_return: f64,
}

/// Feature rows ordered by `time_trade` ascending.
#[derive(Debug, Clone, Default)]
pub struct TradeFeatureTable {
    rows: Vec<TradeFeatureRow>,
}

impl TradeFeatureTable {
    /// Builds a table, sorting rows by time. The sort is stable so rows sharing
    /// a timestamp keep their input order.
    pub fn from_rows(mut rows: Vec<TradeFeatureRow>) -> Self {
        rows.sort_by_key(|r| r.time_trade);
        Self { rows }
    }

    pub fn rows(&self) -> &[TradeFeatureRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A row paired with the size imbalance observed `lag` rows earlier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LaggedRow {
    pub row: TradeFeatureRow,
    pub lagged: f64,
}

/// A lagged row with row-to-row price differences attached.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReturnRow {
    pub lagged_row: LaggedRow,
    pub log_return: f64,
    pub price_return: f64,
}

/// Inclusive time span shown on the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DisplayWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DisplayWindow {
    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        self.start <= t && t <= self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CorrelationStats {
    pub coefficient: f64,
    pub p_value: f64,
    pub sample_size: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Significance {
    Significant,
    NotSignificant,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SignAgreement {
    pub significant_count: usize,
    pub mismatched_count: usize,
    pub percent_mismatch: f64,
    pub percent_match: f64,
}

/// Everything one analysis run reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub window: DisplayWindow,
    pub windowed_rows: usize,
    pub correlation: CorrelationStats,
    pub significance: Significance,
    pub sign_agreement: SignAgreement,
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("insufficient data: need at least {required} rows, got {available}")]
    InsufficientData { required: usize, available: usize },
    #[error("no price change exceeds threshold {threshold}")]
    EmptySignificantSet { threshold: f64 },
    #[error("column `{column}` is constant, correlation is undefined")]
    DegenerateSeries { column: &'static str },
    #[error("statistics error: {0}")]
    Statistics(String),
    #[error(transparent)]
    Chart(#[from] ChartError),
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("required column `{0}` is missing")]
    MissingColumn(String),
    #[error("unparseable timestamp `{value}` on line {line}")]
    Timestamp { line: u64, value: String },
}

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("cannot prepare chart output: {0}")]
    Io(#[from] std::io::Error),
    #[error("chart backend error: {0}")]
    Backend(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
}
