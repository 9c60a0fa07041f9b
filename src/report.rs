use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::analysis::{ComponentSummary, EigenDecomposition};

/// The persisted summary record; arrays are aligned with the sorted
/// component order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PcaSummary {
    pub eigenvalues: Vec<f64>,
    pub explained_variance_ratio: Vec<f64>,
    pub features: Vec<String>,
}

/// Build the summary record from an analysis result.
pub fn emit(eigen: &EigenDecomposition, ratios: &[f64], metric_columns: &[String]) -> PcaSummary {
    PcaSummary {
        eigenvalues: eigen.eigenvalues(),
        explained_variance_ratio: ratios.to_vec(),
        features: metric_columns.to_vec(),
    }
}

impl PcaSummary {
    /// Pretty JSON with two-space indentation.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Plain-text listing of component summaries for console output.
pub fn render_components(components: &[ComponentSummary]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Top {} Principal Components by Contribution:",
        components.len()
    );
    for c in components {
        let _ = writeln!(out);
        let _ = writeln!(out, "Component {}:", c.index + 1);
        let _ = writeln!(out, "  Eigenvalue: {:.4}", c.eigenvalue);
        let _ = writeln!(
            out,
            "  Explained Variance: {:.2}%",
            c.explained_variance_ratio * 100.0
        );
        let _ = writeln!(out, "  Top Contributing Features:");
        let width = c
            .top_features
            .iter()
            .map(|f| f.feature.len())
            .max()
            .unwrap_or(0);
        for f in &c.top_features {
            let _ = writeln!(out, "    {:<width$}  {:.6}", f.feature, f.loading);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{EigenPair, FeatureLoading};

    fn decomposition() -> EigenDecomposition {
        EigenDecomposition {
            pairs: vec![
                EigenPair {
                    eigenvalue: 3.0,
                    eigenvector: vec![1.0, 0.0],
                },
                EigenPair {
                    eigenvalue: 1.0,
                    eigenvector: vec![0.0, 1.0],
                },
            ],
        }
    }

    #[test]
    fn emit_aligns_arrays() {
        let features = vec!["contributors_a".to_string(), "contributors_b".to_string()];
        let summary = emit(&decomposition(), &[0.75, 0.25], &features);
        assert_eq!(summary.eigenvalues, vec![3.0, 1.0]);
        assert_eq!(summary.explained_variance_ratio, vec![0.75, 0.25]);
        assert_eq!(summary.features, features);
    }

    #[test]
    fn json_has_exactly_three_fields() {
        let summary = emit(&decomposition(), &[0.75, 0.25], &["a".into(), "b".into()]);
        let value: serde_json::Value =
            serde_json::from_str(&summary.to_json_pretty().unwrap()).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 3);
        assert_eq!(obj["eigenvalues"], serde_json::json!([3.0, 1.0]));
        assert_eq!(obj["explained_variance_ratio"], serde_json::json!([0.75, 0.25]));
        assert_eq!(obj["features"], serde_json::json!(["a", "b"]));
    }

    #[test]
    fn render_lists_components_and_features() {
        let components = vec![ComponentSummary {
            index: 0,
            eigenvalue: 3.0,
            explained_variance_ratio: 0.75,
            top_features: vec![
                FeatureLoading {
                    feature: "contributors_a".into(),
                    loading: 1.0,
                },
                FeatureLoading {
                    feature: "b".into(),
                    loading: 0.0,
                },
            ],
        }];
        let text = render_components(&components);
        assert!(text.contains("Component 1:"));
        assert!(text.contains("Eigenvalue: 3.0000"));
        assert!(text.contains("Explained Variance: 75.00%"));
        assert!(text.contains("    contributors_a  1.000000"));
        assert!(text.contains("    b               0.000000"));
    }
}
