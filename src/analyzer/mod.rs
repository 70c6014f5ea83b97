// Analyzer module: feature derivation, statistics and the analysis routine itself.

pub mod features;
pub mod price_analysis;
pub mod statistics;

// Re-export the main Analyzer implementation for ease of use.
pub use price_analysis::{Analyzer, ImbalancePriceAnalyzer};
