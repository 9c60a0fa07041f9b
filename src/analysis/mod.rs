//! Covariance / eigen-decomposition feature ranking.
//!
//! ```text
//!   FlatTable + metric columns
//!        │
//!        ▼
//!   ┌───────────────┐
//!   │ FeatureMatrix  │  missing-value policy applied
//!   └───────────────┘
//!        │
//!        ▼
//!   ┌──────────────────┐
//!   │ CovarianceMatrix  │  sample covariance (n - 1)
//!   └──────────────────┘
//!        │
//!        ▼
//!   ┌────────────────────┐
//!   │ EigenDecomposition  │  symmetric solver, sorted descending
//!   └────────────────────┘
//!        │
//!        ▼
//!   ratios + ComponentSummary per leading component
//! ```
pub mod covariance;
pub mod eigen;

use log::{debug, info};

use crate::config::AnalysisConfig;
use crate::data::model::{FlatTable, Table};
use crate::error::{AnalysisError, AnalysisResult};

pub use covariance::{CovarianceMatrix, FeatureMatrix};
pub use eigen::{EigenDecomposition, EigenPair};

/// A feature and its absolute loading on one component.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureLoading {
    pub feature: String,
    pub loading: f64,
}

/// Summary of one leading component.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentSummary {
    /// Zero-based position in the sorted decomposition.
    pub index: usize,
    pub eigenvalue: f64,
    pub explained_variance_ratio: f64,
    /// Features ranked by absolute loading, largest first.
    pub top_features: Vec<FeatureLoading>,
}

/// Everything produced by one analysis run.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    /// Feature names, in the order used to index eigenvector entries.
    pub features: Vec<String>,
    pub rows_used: usize,
    pub dropped_rows: usize,
    pub covariance: CovarianceMatrix,
    pub eigen: EigenDecomposition,
    pub explained_variance_ratio: Vec<f64>,
    pub components: Vec<ComponentSummary>,
}

/// Rank `metric_columns` of `table` by their contribution to the leading
/// variance components.
///
/// Columns are looked up by name; a name carried by two columns is an
/// [`AnalysisError::AmbiguousColumn`]. Flattened tables should go through
/// [`analyze_flat`], which needs no lookup.
pub fn analyze(
    table: &Table,
    metric_columns: &[String],
    config: &AnalysisConfig,
) -> AnalysisResult<Analysis> {
    config.validate()?;
    let matrix = FeatureMatrix::from_table(table, metric_columns, config.missing_value_policy)?;
    analyze_matrix(matrix, config)
}

/// Rank the metric columns of a flattened table, taken by position.
pub fn analyze_flat(flat: &FlatTable, config: &AnalysisConfig) -> AnalysisResult<Analysis> {
    config.validate()?;
    let positions: Vec<usize> = flat.metric_positions().collect();
    let matrix = FeatureMatrix::from_positions(
        &flat.table,
        &positions,
        &flat.metric_columns,
        config.missing_value_policy,
    )?;
    analyze_matrix(matrix, config)
}

fn analyze_matrix(matrix: FeatureMatrix, config: &AnalysisConfig) -> AnalysisResult<Analysis> {
    let covariance = CovarianceMatrix::from_features(&matrix);
    for i in covariance.constant_features() {
        debug!("feature '{}' has zero variance", matrix.features[i]);
    }

    let eigen = EigenDecomposition::of(&covariance)?;
    let ratios = explained_variance_ratio(&eigen)?;
    let components = summarize_components(&eigen, &ratios, &matrix.features, config);

    info!(
        "analyzed {} features over {} rows ({} dropped)",
        matrix.n_features(),
        matrix.n_rows(),
        matrix.dropped_rows
    );

    Ok(Analysis {
        rows_used: matrix.n_rows(),
        dropped_rows: matrix.dropped_rows,
        features: matrix.features,
        covariance,
        eigen,
        explained_variance_ratio: ratios,
        components,
    })
}

/// `eigenvalue / sum(eigenvalues)` per component; any non-finite ratio is fatal.
pub fn explained_variance_ratio(eigen: &EigenDecomposition) -> AnalysisResult<Vec<f64>> {
    let total: f64 = eigen.pairs.iter().map(|p| p.eigenvalue).sum();
    eigen
        .pairs
        .iter()
        .enumerate()
        .map(|(component, p)| {
            let ratio = p.eigenvalue / total;
            if ratio.is_finite() {
                Ok(ratio)
            } else {
                Err(AnalysisError::DegenerateResult {
                    component,
                    ratio,
                    total_variance: total,
                })
            }
        })
        .collect()
}

fn summarize_components(
    eigen: &EigenDecomposition,
    ratios: &[f64],
    features: &[String],
    config: &AnalysisConfig,
) -> Vec<ComponentSummary> {
    eigen
        .pairs
        .iter()
        .zip(ratios)
        .take(config.top_k)
        .enumerate()
        .map(|(index, (pair, &ratio))| ComponentSummary {
            index,
            eigenvalue: pair.eigenvalue,
            explained_variance_ratio: ratio,
            top_features: rank_features(&pair.eigenvector, features, config.top_n_features),
        })
        .collect()
}

/// Stable sort by descending |loading|, so ties keep column order.
fn rank_features(eigenvector: &[f64], features: &[String], top_n: usize) -> Vec<FeatureLoading> {
    let mut loadings: Vec<FeatureLoading> = features
        .iter()
        .zip(eigenvector)
        .map(|(feature, v)| FeatureLoading {
            feature: feature.clone(),
            loading: v.abs(),
        })
        .collect();
    loadings.sort_by(|a, b| b.loading.total_cmp(&a.loading));
    loadings.truncate(top_n);
    loadings
}
