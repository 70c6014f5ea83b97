// Utility functions
use chrono::{DateTime, NaiveDateTime, Utc};

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Parses a timestamp as RFC 3339, falling back to naive formats read as UTC.
pub fn parse_datetime(date_str: &str) -> Option<DateTime<Utc>> {
    let trimmed = date_str.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Scientific notation with a signed, at least two-digit exponent (`1.2346e-05`).
pub fn format_scientific(value: f64, precision: usize) -> String {
    let formatted = format!("{:.*e}", precision, value);
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => match exponent.parse::<i32>() {
            Ok(exp) => {
                let sign = if exp < 0 { '-' } else { '+' };
                format!("{}e{}{:02}", mantissa, sign, exp.abs())
            }
            Err(_) => formatted.clone(),
        },
        None => formatted,
    }
}
