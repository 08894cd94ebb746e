//! Core analysis components: collection statistics and food-analysis records.

pub mod aggregator;
pub mod recorder;

pub use aggregator::compute_summary;
pub use recorder::AnalysisRecorder;
