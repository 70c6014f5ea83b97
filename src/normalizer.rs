use crate::loader::RawFeatureRecord;
use crate::model::{TradeFeatureRow, TradeFeatureTable};
use tracing::{info, warn};

/// Drops incomplete rows and returns a time-ordered table.
pub fn normalize_all(records: Vec<RawFeatureRecord>) -> TradeFeatureTable {
    let total = records.len();
    let rows: Vec<TradeFeatureRow> = records.into_iter().filter_map(normalize_record).collect();

    let dropped = total - rows.len();
    if dropped > 0 {
        warn!("Dropped {} of {} rows during normalization", dropped, total);
    }
    info!("Normalized table has {} rows", rows.len());

    let table = TradeFeatureTable::from_rows(rows);
    if table.is_empty() {
        warn!("No usable rows left after normalization");
    }
    table
}

fn normalize_record(record: RawFeatureRecord) -> Option<TradeFeatureRow> {
    let (Some(time_trade), Some(mid_price), Some(size_imbalance), Some(ewma_price_return)) = (
        record.time_trade,
        record.mid_price,
        record.size_imbalance,
        record.ewma_price_return,
    ) else {
        warn!("Line {}: incomplete row", record.line);
        return None;
    };

    if !(mid_price.is_finite() && size_imbalance.is_finite() && ewma_price_return.is_finite()) {
        warn!("Line {}: non-finite value", record.line);
        return None;
    }
    // log return needs a strictly positive price
    if mid_price <= 0.0 {
        warn!("Line {}: non-positive mid_price {}", record.line, mid_price);
        return None;
    }

    Some(TradeFeatureRow {
        time_trade,
        mid_price,
        size_imbalance,
        ewma_price_return,
    })
}
