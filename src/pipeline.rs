use log::info;

use crate::analysis::{analyze_flat, Analysis};
use crate::config::PipelineConfig;
use crate::data::flatten::{flatten, Flattened};
use crate::data::model::{FlatTable, Table};
use crate::data::parser::ParseWarning;
use crate::error::AnalysisResult;
use crate::report::{emit, PcaSummary};

/// Everything produced by a full run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    pub flattened: FlatTable,
    pub warnings: Vec<ParseWarning>,
    pub analysis: Analysis,
    pub summary: PcaSummary,
}

/// Flatten the blob column, analyze the metric columns and build the summary.
///
/// Parse warnings are collected, never fatal. Any analysis error aborts the
/// run without a summary.
pub fn run(table: &Table, config: &PipelineConfig) -> AnalysisResult<PipelineOutput> {
    run_with(table, config, |_| {})
}

/// [`run`], calling `inspect` on the flattened table before it is analyzed.
///
/// `inspect` sees the flat table and its warnings even when the analysis
/// later fails.
pub fn run_with<F>(table: &Table, config: &PipelineConfig, inspect: F) -> AnalysisResult<PipelineOutput>
where
    F: FnOnce(&Flattened),
{
    let flat = flatten(table, &config.blob_column, &config.metric_prefix)?;
    info!(
        "discovered {} metric columns across {} rows",
        flat.table.metric_columns.len(),
        flat.table.table.len()
    );
    inspect(&flat);

    let analysis = analyze_flat(&flat.table, &config.analysis)?;
    let summary = emit(
        &analysis.eigen,
        &analysis.explained_variance_ratio,
        &analysis.features,
    );

    Ok(PipelineOutput {
        flattened: flat.table,
        warnings: flat.warnings,
        analysis,
        summary,
    })
}
