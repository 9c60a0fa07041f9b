use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, AnalysisResult};

// ---------------------------------------------------------------------------
// Missing-value policy
// ---------------------------------------------------------------------------

/// How rows with a missing metric are turned into feature-matrix rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingValuePolicy {
    /// Discard any row with at least one missing metric.
    #[default]
    DropRow,
    /// Substitute `0.0` for every missing metric.
    ZeroFill,
}

impl fmt::Display for MissingValuePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingValuePolicy::DropRow => write!(f, "drop_row"),
            MissingValuePolicy::ZeroFill => write!(f, "zero_fill"),
        }
    }
}

impl FromStr for MissingValuePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "drop_row" => Ok(MissingValuePolicy::DropRow),
            "zero_fill" => Ok(MissingValuePolicy::ZeroFill),
            other => Err(format!(
                "unknown missing-value policy '{other}' (expected drop_row or zero_fill)"
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Analysis configuration
// ---------------------------------------------------------------------------

/// Knobs for the covariance / eigen-decomposition step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub missing_value_policy: MissingValuePolicy,
    /// Number of leading components to summarise.
    pub top_k: usize,
    /// Number of features kept per component summary.
    pub top_n_features: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            missing_value_policy: MissingValuePolicy::DropRow,
            top_k: 3,
            top_n_features: 5,
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> AnalysisResult<()> {
        if self.top_k == 0 {
            return Err(AnalysisError::InvalidConfig(
                "top_k must be at least 1".to_string(),
            ));
        }
        if self.top_n_features == 0 {
            return Err(AnalysisError::InvalidConfig(
                "top_n_features must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Pipeline configuration
// ---------------------------------------------------------------------------

/// Everything the pipeline needs besides the input table itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Name of the column holding the malformed metrics blob.
    pub blob_column: String,
    /// Prefix prepended to every discovered metric column.
    pub metric_prefix: String,
    pub analysis: AnalysisConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            blob_column: "contributors".to_string(),
            metric_prefix: "contributors_".to_string(),
            analysis: AnalysisConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load a (possibly partial) configuration from a JSON file.
    /// Missing fields fall back to their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("parsing config file {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = PipelineConfig::default();
        assert_eq!(cfg.blob_column, "contributors");
        assert_eq!(cfg.metric_prefix, "contributors_");
        assert_eq!(cfg.analysis.top_k, 3);
        assert_eq!(cfg.analysis.top_n_features, 5);
        assert_eq!(cfg.analysis.missing_value_policy, MissingValuePolicy::DropRow);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg: PipelineConfig =
            serde_json::from_str(r#"{"analysis": {"missing_value_policy": "zero_fill"}}"#)
                .unwrap();
        assert_eq!(cfg.analysis.missing_value_policy, MissingValuePolicy::ZeroFill);
        assert_eq!(cfg.analysis.top_k, 3);
        assert_eq!(cfg.blob_column, "contributors");
    }

    #[test]
    fn policy_from_str_accepts_dashes() {
        assert_eq!(
            "zero-fill".parse::<MissingValuePolicy>().unwrap(),
            MissingValuePolicy::ZeroFill
        );
        assert_eq!(
            "DROP_ROW".parse::<MissingValuePolicy>().unwrap(),
            MissingValuePolicy::DropRow
        );
        assert!("mean_fill".parse::<MissingValuePolicy>().is_err());
    }

    #[test]
    fn validate_rejects_zero_counts() {
        let mut cfg = AnalysisConfig::default();
        assert!(cfg.validate().is_ok());
        cfg.top_k = 0;
        assert!(matches!(cfg.validate(), Err(AnalysisError::InvalidConfig(_))));
        cfg.top_k = 1;
        cfg.top_n_features = 0;
        assert!(matches!(cfg.validate(), Err(AnalysisError::InvalidConfig(_))));
    }
}
