use crate::model::{AnalysisError, ConfigError};
use serde::Deserialize;
use std::fs;

pub const DEFAULT_CHART_WIDTH: u32 = 1200;
pub const DEFAULT_CHART_HEIGHT: u32 = 600;

fn default_chart_width() -> u32 {
    DEFAULT_CHART_WIDTH
}

fn default_chart_height() -> u32 {
    DEFAULT_CHART_HEIGHT
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub input_path: String,
    pub chart_path: String,
    pub timeframe_minutes: f64,
    pub lag: i64,
    pub threshold: f64,
    #[serde(default = "default_chart_width")]
    pub chart_width: u32,
    #[serde(default = "default_chart_height")]
    pub chart_height: u32,
}

impl AppConfig {
    pub fn analysis_params(&self) -> Result<AnalysisParams, AnalysisError> {
        AnalysisParams::new(self.timeframe_minutes, self.lag, self.threshold)
    }
}

pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: AppConfig = serde_json::from_str(&content)?;
    Ok(config)
}

/// Validated analysis parameters. Only constructible through [`AnalysisParams::new`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisParams {
    timeframe_minutes: f64,
    timeframe: chrono::Duration,
    lag: usize,
    threshold: f64,
}

impl AnalysisParams {
    pub fn new(timeframe_minutes: f64, lag: i64, threshold: f64) -> Result<Self, AnalysisError> {
        if !timeframe_minutes.is_finite() || timeframe_minutes <= 0.0 {
            return Err(AnalysisError::InvalidParameter(format!(
                "timeframe_minutes must be positive, got {}",
                timeframe_minutes
            )));
        }
        if !threshold.is_finite() || threshold <= 0.0 {
            return Err(AnalysisError::InvalidParameter(format!(
                "threshold must be positive, got {}",
                threshold
            )));
        }
        let millis = (timeframe_minutes * 60_000.0).round();
        let timeframe = if millis < i64::MAX as f64 {
            chrono::Duration::try_milliseconds(millis as i64)
        } else {
            None
        }
        .ok_or_else(|| {
            AnalysisError::InvalidParameter(format!(
                "timeframe_minutes {} is out of range",
                timeframe_minutes
            ))
        })?;
        let lag = usize::try_from(lag).map_err(|_| {
            AnalysisError::InvalidParameter(format!("lag must be non-negative, got {}", lag))
        })?;

        Ok(Self {
            timeframe_minutes,
            timeframe,
            lag,
            threshold,
        })
    }

    pub fn timeframe_minutes(&self) -> f64 {
        self.timeframe_minutes
    }

    pub fn lag(&self) -> usize {
        self.lag
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Window length as a chrono duration, at millisecond resolution.
    pub fn timeframe(&self) -> chrono::Duration {
        self.timeframe
    }
}
