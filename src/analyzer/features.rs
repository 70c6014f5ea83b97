use crate::model::{AnalysisError, DisplayWindow, LaggedRow, ReturnRow, TradeFeatureTable};
use chrono::Duration;

/// Pairs each row with the size imbalance `lag` rows earlier. The first `lag`
/// rows have nothing to pair with and are left out.
pub fn lag_imbalance(table: &TradeFeatureTable, lag: usize) -> Vec<LaggedRow> {
    let rows = table.rows();
    rows.iter()
        .skip(lag)
        .zip(rows.iter())
        .map(|(row, earlier)| LaggedRow {
            row: *row,
            lagged: earlier.size_imbalance,
        })
        .collect()
}

/// Window starting at the earliest timestamp and spanning `timeframe`.
pub fn display_window(rows: &[LaggedRow], timeframe: Duration) -> Result<DisplayWindow, AnalysisError> {
    let start = rows
        .iter()
        .map(|r| r.row.time_trade)
        .min()
        .ok_or(AnalysisError::InsufficientData {
            required: 1,
            available: 0,
        })?;
    let end = start.checked_add_signed(timeframe).ok_or_else(|| {
        AnalysisError::InvalidParameter(format!(
            "window of {} from {} ends past the representable time range",
            timeframe, start
        ))
    })?;
    Ok(DisplayWindow { start, end })
}

pub fn window_rows(rows: &[LaggedRow], window: &DisplayWindow) -> Vec<LaggedRow> {
    rows.iter()
        .filter(|r| window.contains(r.row.time_trade))
        .copied()
        .collect()
}

/// Row-to-row differences of `ln(mid_price)` and `mid_price`. The first row has
/// no predecessor and is left out.
pub fn with_returns(rows: &[LaggedRow]) -> Vec<ReturnRow> {
    rows.windows(2)
        .map(|pair| {
            let (prev, curr) = (pair[0].row, pair[1].row);
            ReturnRow {
                lagged_row: pair[1],
                log_return: curr.mid_price.ln() - prev.mid_price.ln(),
                price_return: curr.mid_price - prev.mid_price,
            }
        })
        .collect()
}
