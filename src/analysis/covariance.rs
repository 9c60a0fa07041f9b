use log::debug;
use nalgebra::DMatrix;

use crate::config::MissingValuePolicy;
use crate::data::model::Table;
use crate::error::{AnalysisError, AnalysisResult};

// ---------------------------------------------------------------------------
// FeatureMatrix
// ---------------------------------------------------------------------------

/// Rows × features of real numbers with no missing cells.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    pub features: Vec<String>,
    pub values: DMatrix<f64>,
    /// Rows discarded by [`MissingValuePolicy::DropRow`].
    pub dropped_rows: usize,
}

impl FeatureMatrix {
    /// Pull `features` out of `table` by name, applying the missing-value policy.
    ///
    /// A name that matches more than one column is rejected rather than
    /// guessed; use [`FeatureMatrix::from_positions`] when positions are known.
    pub fn from_table(
        table: &Table,
        features: &[String],
        policy: MissingValuePolicy,
    ) -> AnalysisResult<Self> {
        let positions = features
            .iter()
            .map(|f| {
                let mut matches = table
                    .columns
                    .iter()
                    .enumerate()
                    .filter(|(_, c)| *c == f)
                    .map(|(i, _)| i);
                match (matches.next(), matches.next()) {
                    (Some(i), None) => Ok(i),
                    (Some(_), Some(_)) => Err(AnalysisError::AmbiguousColumn(f.clone())),
                    (None, _) => Err(AnalysisError::ColumnNotFound(f.clone())),
                }
            })
            .collect::<AnalysisResult<Vec<usize>>>()?;
        Self::from_positions(table, &positions, features, policy)
    }

    /// Pull the columns at `positions` out of `table`, labelled `features`.
    ///
    /// Non-numeric cells count as missing.
    pub fn from_positions(
        table: &Table,
        positions: &[usize],
        features: &[String],
        policy: MissingValuePolicy,
    ) -> AnalysisResult<Self> {
        if features.is_empty() || positions.is_empty() {
            return Err(AnalysisError::NoFeatureColumns);
        }

        let mut data: Vec<f64> = Vec::with_capacity(table.len() * positions.len());
        let mut kept = 0;
        for row in &table.rows {
            let values: Vec<Option<f64>> = positions
                .iter()
                .map(|&i| row.get(i).and_then(|c| c.as_f64()))
                .collect();
            match policy {
                MissingValuePolicy::DropRow => {
                    if values.iter().any(Option::is_none) {
                        continue;
                    }
                    data.extend(values.into_iter().flatten());
                }
                MissingValuePolicy::ZeroFill => {
                    data.extend(values.into_iter().map(|v| v.unwrap_or(0.0)));
                }
            }
            kept += 1;
        }

        let dropped_rows = table.len() - kept;
        debug!(
            "feature matrix {}x{} ({} rows dropped under {})",
            kept,
            features.len(),
            dropped_rows,
            policy
        );
        if kept < 2 {
            return Err(AnalysisError::InsufficientRows { rows: kept, policy });
        }

        Ok(Self {
            features: features.to_vec(),
            values: DMatrix::from_row_slice(kept, features.len(), &data),
            dropped_rows,
        })
    }

    pub fn n_rows(&self) -> usize {
        self.values.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.values.ncols()
    }
}

// ---------------------------------------------------------------------------
// CovarianceMatrix
// ---------------------------------------------------------------------------

/// Square, symmetric sample covariance (denominator `rows - 1`).
#[derive(Debug, Clone, PartialEq)]
pub struct CovarianceMatrix(DMatrix<f64>);

impl CovarianceMatrix {
    /// Requires at least two rows, which [`FeatureMatrix::from_table`] guarantees.
    pub fn from_features(features: &FeatureMatrix) -> Self {
        let x = &features.values;
        let (n, p) = x.shape();
        let means: Vec<f64> = (0..p).map(|j| x.column(j).mean()).collect();
        let denom = (n - 1) as f64;

        let mut cov = DMatrix::<f64>::zeros(p, p);
        for i in 0..p {
            for j in i..p {
                let sum: f64 = (0..n)
                    .map(|r| (x[(r, i)] - means[i]) * (x[(r, j)] - means[j]))
                    .sum();
                cov[(i, j)] = sum / denom;
                cov[(j, i)] = sum / denom;
            }
        }
        Self(cov)
    }

    pub fn dimension(&self) -> usize {
        self.0.nrows()
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.0[(i, j)]
    }

    pub fn trace(&self) -> f64 {
        self.0.trace()
    }

    /// Indices of features whose variance is exactly zero.
    pub fn constant_features(&self) -> Vec<usize> {
        (0..self.dimension())
            .filter(|&i| self.0[(i, i)] == 0.0)
            .collect()
    }

    pub fn as_matrix(&self) -> &DMatrix<f64> {
        &self.0
    }
}
