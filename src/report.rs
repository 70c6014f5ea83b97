// Report: the human-readable summary printed after an analysis run.

use crate::model::{AnalysisResult, Significance};
use crate::utils::format_scientific;

/// Builds the report lines in print order.
pub fn report_lines(result: &AnalysisResult) -> Vec<String> {
    let verdict = match result.significance {
        Significance::Significant => "The correlation is statistically significant.",
        Significance::NotSignificant => "The correlation is not statistically significant.",
    };

    vec![
        format!(
            "Correlation between SI and price change: {:.4}",
            result.correlation.coefficient
        ),
        format!("P-value: {}", format_scientific(result.correlation.p_value, 4)),
        verdict.to_string(),
        format!(
            "Percentage of time SI and significant price change had same signs: {:.2}%",
            result.sign_agreement.percent_match
        ),
    ]
}
