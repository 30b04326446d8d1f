use std::path::PathBuf;

use anyhow::{Context, Result};

use gem_scout::config::arg_value;
use gem_scout::export;
use gem_scout::sheets::{GoogleSheetsSink, SheetSink, SheetsConfig};
use gem_scout::telemetry;

const DEFAULT_INPUT: &str = "data/final/final_df.csv";

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    telemetry::init_tracing()?;

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let path = arg_value(&args, "--in")
        .or_else(|| std::env::var("GEM_OUTPUT_PATH").ok())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT));

    let config = SheetsConfig::from_env().context("sheet credentials")?;
    let sink = GoogleSheetsSink::new(config).context("sheet credentials")?;

    let (header, rows) = export::read_csv_table(&path)?;
    sink.replace_all(&header, &rows)
        .with_context(|| format!("upload {}", path.display()))?;

    println!("Data successfully uploaded ({} rows from {})", rows.len(), path.display());
    Ok(())
}
