use crate::model::{AnalysisError, ReturnRow, SignAgreement};
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Calculates the Pearson correlation coefficient between two slices.
/// Returns None if slices have different lengths, are empty, or either one is
/// constant.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.is_empty() || is_constant(x) || is_constant(y) {
        return None;
    }
    let dx = scaled_deviations(x)?;
    let dy = scaled_deviations(y)?;
    let numerator: f64 = dx.iter().zip(dy.iter()).map(|(a, b)| a * b).sum();
    let denominator_x: f64 = dx.iter().map(|a| a * a).sum();
    let denominator_y: f64 = dy.iter().map(|b| b * b).sum();
    if denominator_x == 0.0 || denominator_y == 0.0 {
        return None;
    }
    Some((numerator / (denominator_x.sqrt() * denominator_y.sqrt())).clamp(-1.0, 1.0))
}

/// Deviations from the mean divided by the largest one, so squaring cannot
/// underflow or overflow. The coefficient is scale-invariant.
fn scaled_deviations(values: &[f64]) -> Option<Vec<f64>> {
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let deviations: Vec<f64> = values.iter().map(|v| v - mean).collect();
    let scale = deviations.iter().fold(0.0f64, |m, d| m.max(d.abs()));
    if scale == 0.0 || !scale.is_finite() {
        return None;
    }
    Some(deviations.into_iter().map(|d| d / scale).collect())
}

pub fn is_constant(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] == w[1])
}

/// Two-sided p-value of a Pearson coefficient over `n` samples, using
/// t = r * sqrt((n - 2) / (1 - r^2)) with n - 2 degrees of freedom.
pub fn correlation_p_value(r: f64, n: usize) -> Result<f64, AnalysisError> {
    if n < 2 {
        return Err(AnalysisError::InsufficientData {
            required: 2,
            available: n,
        });
    }
    // two points always lie on a line
    if n == 2 {
        return Ok(1.0);
    }
    if r.abs() >= 1.0 {
        return Ok(0.0);
    }

    let df = (n - 2) as f64;
    let t_stat = r * (df / (1.0 - r * r)).sqrt();
    let dist = StudentsT::new(0.0, 1.0, df).map_err(|e| AnalysisError::Statistics(e.to_string()))?;
    let p = 2.0 * dist.cdf(-t_stat.abs());
    Ok(p.clamp(0.0, 1.0))
}

/// Share of significant price changes whose sign agrees with the size imbalance.
///
/// A change is significant when `|ewma_price_return| > threshold`. It is
/// mismatched when imbalance and return are strictly opposite in sign; a zero
/// on either side never counts as a mismatch.
pub fn sign_agreement(rows: &[ReturnRow], threshold: f64) -> Result<SignAgreement, AnalysisError> {
    let significant: Vec<&ReturnRow> = rows
        .iter()
        .filter(|r| r.lagged_row.row.ewma_price_return.abs() > threshold)
        .collect();

    if significant.is_empty() {
        return Err(AnalysisError::EmptySignificantSet { threshold });
    }

    let mismatched_count = significant
        .iter()
        .filter(|r| {
            let si = r.lagged_row.row.size_imbalance;
            let ret = r.lagged_row.row.ewma_price_return;
            (si > 0.0 && ret < 0.0) || (si < 0.0 && ret > 0.0)
        })
        .count();

    let significant_count = significant.len();
    let percent_mismatch = mismatched_count as f64 / significant_count as f64 * 100.0;

    Ok(SignAgreement {
        significant_count,
        mismatched_count,
        percent_mismatch,
        percent_match: 100.0 - percent_mismatch,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LaggedRow, TradeFeatureRow};
    use chrono::{Duration, TimeZone, Utc};

    fn rows(imbalances: &[f64], returns: &[f64]) -> Vec<ReturnRow> {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        imbalances
            .iter()
            .zip(returns)
            .enumerate()
            .map(|(i, (&size_imbalance, &ewma_price_return))| ReturnRow {
                lagged_row: LaggedRow {
                    row: TradeFeatureRow {
                        time_trade: start + Duration::minutes(i as i64),
                        mid_price: 100.0,
                        size_imbalance,
                        ewma_price_return,
                    },
                    lagged: size_imbalance,
                },
                log_return: 0.0,
                price_return: 0.0,
            })
            .collect()
    }

    #[test]
    fn pearson_of_linear_series_is_one() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [2.0, 4.0, 6.0, 8.0];
        assert!((pearson(&x, &y).unwrap() - 1.0).abs() < 1e-12);
        let neg = [8.0, 6.0, 4.0, 2.0];
        assert!((pearson(&x, &neg).unwrap() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn pearson_known_value() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [2.0, 4.0, 5.0, 4.0, 5.0];
        assert!((pearson(&x, &y).unwrap() - 0.774_596_669_241_483_4).abs() < 1e-12);
    }

    #[test]
    fn pearson_survives_tiny_magnitudes() {
        let y = [0.02, -0.03, 0.01, -0.04, 0.02];
        let unit = pearson(&[1.0, -1.0, 2.0, -2.0, 3.0], &y).unwrap();
        let tiny = pearson(&[1e-200, -1e-200, 2e-200, -2e-200, 3e-200], &y).unwrap();
        assert!((unit - tiny).abs() < 1e-12);
    }

    #[test]
    fn pearson_rejects_degenerate_input() {
        assert!(pearson(&[], &[]).is_none());
        assert!(pearson(&[1.0, 2.0], &[1.0]).is_none());
        assert!(pearson(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]).is_none());
        assert!(is_constant(&[3.0, 3.0, 3.0]));
        assert!(!is_constant(&[3.0, 3.5]));
    }

    #[test]
    fn p_value_matches_reference() {
        // r = 0.7746 over 5 samples: t = 2.1213 with 3 df, two-sided p = 0.1240
        let p = correlation_p_value(0.774_596_669_241_483_4, 5).unwrap();
        assert!((p - 0.124_027_1).abs() < 1e-6, "p = {}", p);
    }

    #[test]
    fn p_value_edge_cases() {
        assert_eq!(correlation_p_value(1.0, 2).unwrap(), 1.0);
        assert_eq!(correlation_p_value(-1.0, 10).unwrap(), 0.0);
        assert!((correlation_p_value(0.0, 10).unwrap() - 1.0).abs() < 1e-12);
        assert!(matches!(
            correlation_p_value(0.5, 1),
            Err(AnalysisError::InsufficientData { .. })
        ));
    }

    #[test]
    fn all_significant_rows_matching_gives_full_agreement() {
        let r = rows(&[1.0, -1.0, 2.0], &[0.02, -0.005, 0.03]);
        let agreement = sign_agreement(&r, 0.01).unwrap();
        assert_eq!(agreement.significant_count, 2);
        assert_eq!(agreement.mismatched_count, 0);
        assert_eq!(agreement.percent_match, 100.0);
    }

    #[test]
    fn mismatches_reduce_agreement() {
        let r = rows(&[1.0, 1.0, -1.0, -2.0], &[0.02, -0.02, 0.03, -0.04]);
        let agreement = sign_agreement(&r, 0.01).unwrap();
        assert_eq!(agreement.significant_count, 4);
        assert_eq!(agreement.mismatched_count, 2);
        assert_eq!(agreement.percent_match, 50.0);
        assert_eq!(agreement.percent_match + agreement.percent_mismatch, 100.0);
    }

    #[test]
    fn zero_imbalance_is_never_a_mismatch() {
        let r = rows(&[0.0, 0.0, 1.0], &[0.02, -0.02, -0.02]);
        let agreement = sign_agreement(&r, 0.01).unwrap();
        assert_eq!(agreement.mismatched_count, 1);
        assert!((agreement.percent_match - 100.0 * 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn threshold_is_strict() {
        let r = rows(&[1.0, -1.0], &[0.01, -0.01]);
        assert!(matches!(
            sign_agreement(&r, 0.01),
            Err(AnalysisError::EmptySignificantSet { .. })
        ));
    }

    #[test]
    fn percentages_are_complementary() {
        let r = rows(
            &[1.0, -1.0, 1.0, -1.0, 1.0, 1.0, -1.0],
            &[0.5, 0.5, -0.5, -0.5, 0.5, -0.5, 0.5],
        );
        let agreement = sign_agreement(&r, 0.1).unwrap();
        assert_eq!(agreement.mismatched_count, 4);
        assert!((agreement.percent_match + agreement.percent_mismatch - 100.0).abs() < 1e-12);
    }
}
