use thiserror::Error;

use crate::config::MissingValuePolicy;

/// Fatal errors raised by the flatten / analysis pipeline.
///
/// Per-row parse problems are not errors; they are returned as
/// [`ParseWarning`](crate::data::parser::ParseWarning)s next to the result.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("column '{0}' not found in input table")]
    ColumnNotFound(String),

    #[error("column name '{0}' matches more than one column in the input table")]
    AmbiguousColumn(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("insufficient rows after applying missing-value policy '{policy}': need ≥2, got {rows}")]
    InsufficientRows {
        rows: usize,
        policy: MissingValuePolicy,
    },

    #[error("no feature columns to analyze: need ≥1, got 0")]
    NoFeatureColumns,

    #[error(
        "explained-variance ratio of component {component} is not finite ({ratio}); total variance is {total_variance}"
    )]
    DegenerateResult {
        component: usize,
        ratio: f64,
        total_variance: f64,
    },

    #[error("symmetric eigen-decomposition did not converge for a {dimension}x{dimension} covariance matrix")]
    DecompositionFailed { dimension: usize },
}

impl AnalysisError {
    /// Whether this is one of the "not enough data" failures.
    pub fn is_insufficient_data(&self) -> bool {
        matches!(
            self,
            AnalysisError::InsufficientRows { .. } | AnalysisError::NoFeatureColumns
        )
    }
}

/// Result type for pipeline operations
pub type AnalysisResult<T> = Result<T, AnalysisError>;
