use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use clap::Parser;
use parquet::arrow::ArrowWriter;

#[derive(Parser, Debug)]
#[command(about = "Write a synthetic daily-sleep export with a contributors blob column")]
struct Args {
    /// Output file; a .parquet extension writes Parquet, anything else `;` CSV
    #[arg(default_value = "dailysleep.csv")]
    output: PathBuf,
    /// Number of daily rows
    #[arg(default_value_t = 365)]
    rows: usize,
}

const METRICS: [&str; 7] = [
    "deep_sleep",
    "efficiency",
    "latency",
    "rem_sleep",
    "restfulness",
    "timing",
    "total_sleep",
];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

struct SampleRow {
    id: String,
    contributors: Option<String>,
    day: String,
    score: i64,
}

/// One night's contributors in the export's comma-less format.
fn contributors_blob(rng: &mut SimpleRng) -> (String, i64) {
    // A shared "sleep quality" factor drives most metrics so the analysis has
    // a dominant component.
    let quality = rng.gauss(0.0, 1.0);
    let mut parts = Vec::new();
    let mut total = 0.0;
    for (j, name) in METRICS.iter().enumerate() {
        let weight = 1.0 - j as f64 * 0.12;
        let value = (75.0 + 10.0 * weight * quality + rng.gauss(0.0, 4.0)).clamp(1.0, 100.0);
        total += value;
        // Occasionally drop a metric, as real exports do.
        if rng.next_f64() < 0.05 {
            continue;
        }
        if *name == "efficiency" {
            parts.push(format!("\"{name}\": {value:.1}"));
        } else {
            parts.push(format!("\"{name}\": {}", value.round() as i64));
        }
    }
    let score = (total / METRICS.len() as f64).round() as i64;
    (format!("{{{}}}", parts.join("  ")), score)
}

fn generate(rows: usize, rng: &mut SimpleRng) -> Vec<SampleRow> {
    (0..rows)
        .map(|i| {
            let (blob, score) = contributors_blob(rng);
            let contributors = match rng.next_f64() {
                p if p < 0.02 => None,
                p if p < 0.04 => Some("n/a".to_string()),
                _ => Some(blob),
            };
            SampleRow {
                id: format!("{:08x}", rng.next_u64() as u32),
                contributors,
                day: format!("2025-{:02}-{:02}", 1 + i / 28 % 12, 1 + i % 28),
                score,
            }
        })
        .collect()
}

fn write_csv(rows: &[SampleRow], path: &Path) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_path(path)
        .context("Failed to create output file")?;
    writer.write_record(["id", "contributors", "day", "score"])?;
    for row in rows {
        writer.write_record([
            row.id.as_str(),
            row.contributors.as_deref().unwrap_or(""),
            row.day.as_str(),
            row.score.to_string().as_str(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(rows: &[SampleRow], path: &Path) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("id", DataType::Utf8, false),
        Field::new("contributors", DataType::Utf8, true),
        Field::new("day", DataType::Utf8, false),
        Field::new("score", DataType::Int64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.id.as_str()))),
            Arc::new(StringArray::from(
                rows.iter()
                    .map(|r| r.contributors.as_deref())
                    .collect::<Vec<_>>(),
            )),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.day.as_str()))),
            Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.score))),
        ],
    )
    .context("Failed to create RecordBatch")?;

    let file = std::fs::File::create(path).context("Failed to create output file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("Failed to create writer")?;
    writer.write(&batch).context("Failed to write batch")?;
    writer.close().context("Failed to close writer")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();

    let mut rng = SimpleRng::new(42);
    let data = generate(args.rows, &mut rng);

    let path = args.output.as_path();
    if path.extension().is_some_and(|e| e.eq_ignore_ascii_case("parquet")) {
        write_parquet(&data, path)?;
    } else {
        write_csv(&data, path)?;
    }

    log::info!("Wrote {} daily sleep rows to {}", data.len(), path.display());
    Ok(())
}
