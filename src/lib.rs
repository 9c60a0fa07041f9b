//! Flatten malformed contributor blobs into typed columns and rank the
//! resulting features by covariance eigen-decomposition.

pub mod analysis;
pub mod config;
pub mod data;
pub mod error;
pub mod pipeline;
pub mod report;

pub use analysis::{analyze, analyze_flat, Analysis, ComponentSummary, FeatureLoading};
pub use config::{AnalysisConfig, MissingValuePolicy, PipelineConfig};
pub use data::flatten::{flatten, Flattened};
pub use data::model::{CellValue, FlatTable, Table};
pub use data::parser::{parse, MetricValue, ParsedMetrics, ParseWarning};
pub use error::{AnalysisError, AnalysisResult};
pub use pipeline::{run, run_with, PipelineOutput};
pub use report::{emit, PcaSummary};
