use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use super::model::{CellValue, Table};
use crate::report::PcaSummary;

/// Write `table` as CSV. Nulls become empty cells.
pub fn write_csv<W: Write>(table: &Table, writer: W, delimiter: u8) -> Result<()> {
    let mut out = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);
    out.write_record(&table.columns)
        .context("writing CSV header")?;
    for (row_no, row) in table.rows.iter().enumerate() {
        out.write_record(row.iter().map(cell_to_field))
            .with_context(|| format!("writing CSV row {row_no}"))?;
    }
    out.flush().context("flushing CSV output")?;
    Ok(())
}

pub fn write_csv_file(table: &Table, path: &Path, delimiter: u8) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    write_csv(table, file, delimiter)
}

fn cell_to_field(cell: &CellValue) -> String {
    match cell {
        CellValue::Null => String::new(),
        CellValue::Bool(true) => "True".to_string(),
        CellValue::Bool(false) => "False".to_string(),
        other => other.to_string(),
    }
}

/// Write the summary record as pretty JSON.
pub fn write_summary_file(summary: &PcaSummary, path: &Path) -> Result<()> {
    let json = summary.to_json_pretty().context("serializing summary")?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))
}
