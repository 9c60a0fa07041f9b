use log::debug;
use rayon::prelude::*;

use super::model::{CellValue, FlatTable, Table};
use super::parser::{parse, MetricValue, ParseOutcome, ParseWarning};
use crate::error::{AnalysisError, AnalysisResult};

/// Result of flattening: the wide table plus every per-row parse warning.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Flattened {
    pub table: FlatTable,
    pub warnings: Vec<ParseWarning>,
}

/// Expand the blob column of `table` into one `prefix`-ed column per metric.
///
/// Rows are parsed in parallel; the metric schema is only fixed once every
/// row has been seen, since a metric missing from one row may appear in a
/// later one. Original columns keep their order, metric columns follow in
/// first-appearance order.
pub fn flatten(table: &Table, blob_column: &str, prefix: &str) -> AnalysisResult<Flattened> {
    let blob_idx = table
        .column_index(blob_column)
        .ok_or_else(|| AnalysisError::ColumnNotFound(blob_column.to_string()))?;

    let outcomes: Vec<ParseOutcome> = table
        .rows
        .par_iter()
        .map(|row| {
            let raw = row.get(blob_idx).and_then(CellValue::as_text);
            parse(raw.as_deref())
        })
        .collect();

    // Ordered union of metric keys
    let mut metric_keys: Vec<&str> = Vec::new();
    for outcome in &outcomes {
        for key in outcome.metrics.keys() {
            if !metric_keys.contains(&key) {
                metric_keys.push(key);
            }
        }
    }

    let mut columns: Vec<String> = table
        .columns
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != blob_idx)
        .map(|(_, c)| c.clone())
        .collect();
    let metric_columns: Vec<String> = metric_keys.iter().map(|k| format!("{prefix}{k}")).collect();
    columns.extend(metric_columns.iter().cloned());

    let mut flat = Table::new(columns);
    for (row, outcome) in table.rows.iter().zip(&outcomes) {
        let mut cells: Vec<CellValue> = row
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != blob_idx)
            .map(|(_, v)| v.clone())
            .collect();
        cells.extend(metric_keys.iter().map(|key| match outcome.metrics.get(key) {
            Some(MetricValue::Integer(i)) => CellValue::Integer(i),
            Some(MetricValue::Float(f)) => CellValue::Float(f),
            None => CellValue::Null,
        }));
        flat.push_row(cells);
    }

    let warnings: Vec<ParseWarning> = outcomes
        .iter()
        .enumerate()
        .flat_map(|(row, outcome)| {
            outcome.warnings.iter().cloned().map(move |mut w| {
                w.row = Some(row);
                w
            })
        })
        .collect();

    debug!(
        "flattened {} rows: {} metric columns, {} parse warnings",
        flat.len(),
        metric_columns.len(),
        warnings.len()
    );

    Ok(Flattened {
        table: FlatTable {
            table: flat,
            metric_columns,
        },
        warnings,
    })
}
