mod analyzer;
mod chart;
mod config;
mod loader;
mod model;
mod normalizer;
mod report;
mod utils;

use analyzer::{Analyzer, ImbalancePriceAnalyzer};
use chart::PlottersRenderer;
use clap::Parser;
use config::{load_config, AppConfig};
use loader::{CsvSource, TableSource};
use model::{AnalysisError, ConfigError, LoadError};
use normalizer::normalize_all;
use report::report_lines;
use std::process::ExitCode;
use thiserror::Error;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "si-lens")]
#[command(about = "Relates lagged order-book size imbalance to subsequent price moves", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "config.json")]
    config: String,
    /// Feature table CSV, overrides `input_path`
    #[arg(long)]
    input: Option<String>,
    /// Chart output file (.png or .svg), overrides `chart_path`
    #[arg(long)]
    chart: Option<String>,
    /// Display window in minutes, overrides `timeframe_minutes`
    #[arg(long)]
    timeframe: Option<f64>,
    /// Rows to shift size imbalance by, overrides `lag`
    #[arg(long, allow_negative_numbers = true)]
    lag: Option<i64>,
    /// Minimum |ewma_price_return| of a significant change, overrides `threshold`
    #[arg(long)]
    threshold: Option<f64>,
    /// Also print the full result as JSON
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(input) = &self.input {
            config.input_path = input.clone();
        }
        if let Some(chart) = &self.chart {
            config.chart_path = chart.clone();
        }
        if let Some(timeframe) = self.timeframe {
            config.timeframe_minutes = timeframe;
        }
        if let Some(lag) = self.lag {
            config.lag = lag;
        }
        if let Some(threshold) = self.threshold {
            config.threshold = threshold;
        }
    }
}

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
    #[error("cannot serialize result: {0}")]
    Json(#[from] serde_json::Error),
}

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Set panic hook to log details about any panic
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Panic occurred: {:?}", panic_info);
    }));

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Analysis failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), AppError> {
    let mut config = load_config(&cli.config)?;
    cli.apply_overrides(&mut config);
    let params = config.analysis_params()?;
    info!(
        "Parameters: timeframe = {} min, lag = {}, threshold = {}",
        params.timeframe_minutes(),
        params.lag(),
        params.threshold()
    );

    let records = CsvSource::new(&config.input_path).load()?;
    let table = normalize_all(records);

    let mut renderer = PlottersRenderer::new(&config.chart_path)
        .with_size(config.chart_width, config.chart_height);
    let result = ImbalancePriceAnalyzer::new().analyze(&table, &params, &mut renderer)?;

    for line in report_lines(&result) {
        println!("{}", line);
    }
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    }

    Ok(())
}
