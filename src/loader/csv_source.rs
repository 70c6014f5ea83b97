use crate::loader::{RawFeatureRecord, TableSource};
use crate::model::LoadError;
use crate::utils::parse_datetime;
use csv::{ReaderBuilder, StringRecord};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const REQUIRED_COLUMNS: [&str; 4] = ["time_trade", "mid_price", "size_imbalance", "ewma_price_return"];

#[derive(Debug, Deserialize)]
struct CsvRow {
    time_trade: Option<String>,
    mid_price: Option<f64>,
    size_imbalance: Option<f64>,
    ewma_price_return: Option<f64>,
}

/// Reads feature rows from a CSV file with a header line.
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl TableSource for CsvSource {
    fn load(&self) -> Result<Vec<RawFeatureRecord>, LoadError> {
        info!("Reading feature table from {}", self.path.display());
        let file = File::open(&self.path)?;
        let records = read_records(file)?;
        info!("Read {} raw rows", records.len());
        Ok(records)
    }
}

/// Parses CSV content. Extra columns are ignored; empty cells become `None`.
pub fn read_records<R: Read>(input: R) -> Result<Vec<RawFeatureRecord>, LoadError> {
    let mut reader = ReaderBuilder::new().trim(csv::Trim::All).from_reader(input);
    let headers = reader.headers()?.clone();
    debug!("CSV columns: {:?}", headers);
    if let Some(missing) = REQUIRED_COLUMNS
        .iter()
        .find(|col| !headers.iter().any(|h| h == **col))
    {
        return Err(LoadError::MissingColumn(missing.to_string()));
    }

    let mut record = StringRecord::new();
    let mut records = Vec::new();
    while reader.read_record(&mut record)? {
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let row: CsvRow = record.deserialize(Some(&headers))?;

        let time_trade = match row.time_trade.as_deref() {
            None | Some("") => None,
            Some(value) => Some(parse_datetime(value).ok_or_else(|| LoadError::Timestamp {
                line,
                value: value.to_string(),
            })?),
        };

        records.push(RawFeatureRecord {
            line,
            time_trade,
            mid_price: row.mid_price,
            size_imbalance: row.size_imbalance,
            ewma_price_return: row.ewma_price_return,
        });
    }

    Ok(records)
}
