use crate::analyzer::features::{display_window, lag_imbalance, window_rows, with_returns};
use crate::analyzer::statistics::{correlation_p_value, is_constant, pearson, sign_agreement};
use crate::chart::{ChartRenderer, ChartSpec};
use crate::config::AnalysisParams;
use crate::model::{
    AnalysisError, AnalysisResult, CorrelationStats, Significance, TradeFeatureTable,
};
use tracing::{debug, info};

/// p-values below this make the correlation significant.
pub const SIGNIFICANCE_LEVEL: f64 = 0.05;

/// Pearson needs at least two aligned samples.
pub const MIN_CORRELATION_SAMPLES: usize = 2;

/// Trait defining the interface for an imbalance/price analyzer.
pub trait Analyzer {
    /// Renders the price/SI chart through `renderer`, then computes the
    /// correlation and sign agreement over the whole table.
    fn analyze(
        &self,
        table: &TradeFeatureTable,
        params: &AnalysisParams,
        renderer: &mut dyn ChartRenderer,
    ) -> Result<AnalysisResult, AnalysisError>;
}

/// Relates lagged size imbalance to subsequent price movement.
#[derive(Debug, Default)]
pub struct ImbalancePriceAnalyzer;

impl ImbalancePriceAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl Analyzer for ImbalancePriceAnalyzer {
    fn analyze(
        &self,
        table: &TradeFeatureTable,
        params: &AnalysisParams,
        renderer: &mut dyn ChartRenderer,
    ) -> Result<AnalysisResult, AnalysisError> {
        let lag = params.lag();
        // lag rows lost to the shift, one to differencing
        let required = lag + 1 + MIN_CORRELATION_SAMPLES;
        if table.len() < required {
            return Err(AnalysisError::InsufficientData {
                required,
                available: table.len(),
            });
        }

        let lagged = lag_imbalance(table, lag);
        let window = display_window(&lagged, params.timeframe())?;
        let windowed = window_rows(&lagged, &window);
        info!(
            "Display window {} - {} holds {} of {} rows",
            window.start,
            window.end,
            windowed.len(),
            lagged.len()
        );

        let chart = ChartSpec::from_window(&windowed, window);
        debug!(
            "Chart markers: {} positive, {} negative",
            chart.positive_si.len(),
            chart.negative_si.len()
        );
        renderer.render(&chart)?;

        let returns = with_returns(&lagged);
        let x: Vec<f64> = returns.iter().map(|r| r.lagged_row.lagged).collect();
        let y: Vec<f64> = returns
            .iter()
            .map(|r| r.lagged_row.row.ewma_price_return)
            .collect();

        let coefficient = match pearson(&x, &y) {
            Some(r) => r,
            None if is_constant(&x) => return Err(AnalysisError::DegenerateSeries { column: "lagged" }),
            None if is_constant(&y) => {
                return Err(AnalysisError::DegenerateSeries {
                    column: "ewma_price_return",
                });
            }
            None => {
                return Err(AnalysisError::Statistics(
                    "correlation is undefined for these series".to_string(),
                ));
            }
        };
        let p_value = correlation_p_value(coefficient, returns.len())?;
        let significance = if p_value < SIGNIFICANCE_LEVEL {
            Significance::Significant
        } else {
            Significance::NotSignificant
        };
        info!(
            "Correlation over {} rows: r = {:.4}, p = {:.4e}",
            returns.len(),
            coefficient,
            p_value
        );

        let agreement = sign_agreement(&returns, params.threshold())?;
        info!(
            "{} of {} significant changes had mismatched signs",
            agreement.mismatched_count, agreement.significant_count
        );

        Ok(AnalysisResult {
            window,
            windowed_rows: windowed.len(),
            correlation: CorrelationStats {
                coefficient,
                p_value,
                sample_size: returns.len(),
            },
            significance,
            sign_agreement: agreement,
        })
    }
}
