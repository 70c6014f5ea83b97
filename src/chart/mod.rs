// Chart module: what to draw, and the backends that draw it.

pub mod plotters_renderer;

pub use plotters_renderer::PlottersRenderer;

use crate::model::{ChartError, DisplayWindow, LaggedRow};
use chrono::{DateTime, Utc};
use serde::Serialize;

pub type ChartPoint = (DateTime<Utc>, f64);

/// Backend-independent content of the price/SI chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub window: DisplayWindow,
    /// Mid price over every windowed row.
    pub price_line: Vec<ChartPoint>,
    /// Rows whose lagged imbalance is strictly positive.
    pub positive_si: Vec<ChartPoint>,
    /// Rows whose lagged imbalance is strictly negative.
    pub negative_si: Vec<ChartPoint>,
}

impl ChartSpec {
    pub fn from_window(rows: &[LaggedRow], window: DisplayWindow) -> Self {
        let point = |r: &LaggedRow| (r.row.time_trade, r.row.mid_price);

        Self {
            title: format!(
                "Price Movement with SI labels ({} - {})",
                window.start.format("%H:%M:%S"),
                window.end.format("%H:%M:%S")
            ),
            x_label: "Time".to_string(),
            y_label: "Price".to_string(),
            window,
            price_line: rows.iter().map(point).collect(),
            positive_si: rows.iter().filter(|r| r.lagged > 0.0).map(point).collect(),
            negative_si: rows.iter().filter(|r| r.lagged < 0.0).map(point).collect(),
        }
    }

    /// Lowest and highest plotted price, padded so a flat series still has a
    /// non-empty range.
    pub fn price_bounds(&self) -> (f64, f64) {
        let (min, max) = self
            .price_line
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(_, p)| (lo.min(p), hi.max(p)));
        if !min.is_finite() || !max.is_finite() {
            return (0.0, 1.0);
        }
        let pad = ((max - min) * 0.05).max(min.abs() * 1e-4).max(1e-9);
        (min - pad, max + pad)
    }
}

pub trait ChartRenderer {
    fn render(&mut self, chart: &ChartSpec) -> Result<(), ChartError>;
}

/// Keeps every chart it is asked to render.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub charts: Vec<ChartSpec>,
}

#[cfg(test)]
impl ChartRenderer for RecordingRenderer {
    fn render(&mut self, chart: &ChartSpec) -> Result<(), ChartError> {
        self.charts.push(chart.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TradeFeatureRow;
    use chrono::{Duration, TimeZone};

    fn lagged_rows(lagged: &[f64]) -> Vec<LaggedRow> {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 14, 5, 0).unwrap();
        lagged
            .iter()
            .enumerate()
            .map(|(i, &lagged)| LaggedRow {
                row: TradeFeatureRow {
                    time_trade: start + Duration::seconds(30 * i as i64),
                    mid_price: 100.0 + i as f64,
                    size_imbalance: 0.0,
                    ewma_price_return: 0.0,
                },
                lagged,
            })
            .collect()
    }

    fn window() -> DisplayWindow {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 14, 5, 0).unwrap();
        DisplayWindow {
            start,
            end: start + Duration::minutes(15),
        }
    }

    #[test]
    fn title_shows_window_clock_times() {
        let chart = ChartSpec::from_window(&lagged_rows(&[1.0]), window());
        assert_eq!(chart.title, "Price Movement with SI labels (14:05:00 - 14:20:00)");
        assert_eq!(chart.x_label, "Time");
        assert_eq!(chart.y_label, "Price");
    }

    #[test]
    fn markers_split_by_sign_and_skip_zero() {
        let rows = lagged_rows(&[0.5, -0.2, 0.0, 1.5, -3.0, 0.0]);
        let chart = ChartSpec::from_window(&rows, window());

        assert_eq!(chart.price_line.len(), 6);
        assert_eq!(chart.positive_si, vec![(rows[0].row.time_trade, 100.0), (rows[3].row.time_trade, 103.0)]);
        assert_eq!(chart.negative_si.len(), 2);
        assert!(chart.positive_si.len() + chart.negative_si.len() <= chart.price_line.len());
    }

    #[test]
    fn same_rows_give_same_chart() {
        let rows = lagged_rows(&[0.5, -0.2, 0.0]);
        assert_eq!(ChartSpec::from_window(&rows, window()), ChartSpec::from_window(&rows, window()));
    }

    #[test]
    fn flat_prices_still_get_a_range() {
        let mut rows = lagged_rows(&[1.0, 1.0]);
        for r in &mut rows {
            r.row.mid_price = 50.0;
        }
        let (lo, hi) = ChartSpec::from_window(&rows, window()).price_bounds();
        assert!(lo < 50.0 && hi > 50.0);
    }
}
