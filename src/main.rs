use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};

use contrib_pca::data::{loader, writer};
use contrib_pca::report::render_components;
use contrib_pca::{run_with, MissingValuePolicy, PipelineConfig};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Flatten a contributors blob column and rank its metrics by covariance eigen-decomposition"
)]
struct Args {
    /// Input table (.csv, .json or .parquet)
    #[arg(short, long)]
    input: PathBuf,
    /// Field delimiter of CSV input
    #[arg(long, default_value_t = ';')]
    delimiter: char,
    /// JSON pipeline configuration; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    blob_column: Option<String>,
    #[arg(long)]
    metric_prefix: Option<String>,
    #[arg(long)]
    top_k: Option<usize>,
    #[arg(long)]
    top_n_features: Option<usize>,
    /// drop_row or zero_fill
    #[arg(long)]
    missing_value_policy: Option<MissingValuePolicy>,
    /// Where to write the flattened table as CSV
    #[arg(long)]
    flat_output: Option<PathBuf>,
    #[arg(long, default_value = "pca_summary.json")]
    summary_output: PathBuf,
}

impl Args {
    fn pipeline_config(&self) -> Result<PipelineConfig> {
        let mut cfg = match &self.config {
            Some(path) => PipelineConfig::from_json_file(path)?,
            None => PipelineConfig::default(),
        };
        if let Some(col) = &self.blob_column {
            cfg.blob_column = col.clone();
            if self.metric_prefix.is_none() {
                cfg.metric_prefix = format!("{col}_");
            }
        }
        if let Some(prefix) = &self.metric_prefix {
            cfg.metric_prefix = prefix.clone();
        }
        if let Some(k) = self.top_k {
            cfg.analysis.top_k = k;
        }
        if let Some(n) = self.top_n_features {
            cfg.analysis.top_n_features = n;
        }
        if let Some(policy) = self.missing_value_policy {
            cfg.analysis.missing_value_policy = policy;
        }
        Ok(cfg)
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let cfg = args.pipeline_config()?;
    let delimiter = u8::try_from(args.delimiter).context("delimiter must be a single-byte character")?;

    info!("loading {}", args.input.display());
    let table = loader::load_file(&args.input, delimiter)?;

    info!("parsing '{}' column", cfg.blob_column);
    let mut flat_written = Ok(());
    let result = run_with(&table, &cfg, |flat| {
        for warning in &flat.warnings {
            warn!("{warning}");
        }
        if let Some(path) = &args.flat_output {
            flat_written = writer::write_csv_file(&flat.table.table, path, b',')
                .map(|()| info!("flattened dataset written to {}", path.display()));
        }
        info!(
            "using {} contributor features for analysis",
            flat.table.metric_columns.len()
        );
    });
    flat_written?;
    let out = result?;

    println!("{}", render_components(&out.analysis.components));
    writer::write_summary_file(&out.summary, &args.summary_output)?;
    info!("summary saved to {}", args.summary_output.display());

    Ok(())
}
