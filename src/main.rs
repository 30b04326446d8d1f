use anyhow::{Context, Result};
use tracing::info;

use gem_scout::config::PipelineConfig;
use gem_scout::export;
use gem_scout::pipeline;
use gem_scout::sheets::{GoogleSheetsSink, SheetSink, SheetsConfig};
use gem_scout::telemetry;

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    telemetry::init_tracing()?;

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let config = PipelineConfig::from_args(&args).context("invalid configuration")?;

    // Resolve the sink before doing any work so missing credentials fail fast.
    let sink = if config.upload {
        let sheets = SheetsConfig::from_env().context("sheet upload requested")?;
        Some(GoogleSheetsSink::new(sheets).context("sheet upload requested")?)
    } else {
        None
    };

    let (output, load_report) = pipeline::run(&config)?;
    let report = output.report;

    println!("Gem score run complete ({})", config.scoring.run_date);
    println!(
        "Loaded: {} players, {} appearances ({} malformed values nulled)",
        report.players_loaded,
        report.appearances_loaded,
        load_report.players.malformed_values + load_report.appearances.malformed_values
    );
    println!(
        "Candidates: {} ({} aged <= {}, {} older)",
        report.candidates,
        report.juniors,
        config.scoring.eligibility.junior_max_age,
        report.seniors
    );
    println!("Eligible: {}", report.eligible);
    println!("Scored: {}", report.scored);
    println!("Output: {}", config.output_path.display());
    if let Some(path) = config.xlsx_path.as_ref() {
        println!("Workbook: {}", path.display());
    }

    if !output.top.is_empty() {
        println!("Top {}:", output.top.len());
        for detail in &output.top {
            println!(
                " {}. {} ({}, {}) age {} score {:.3}",
                detail.rank,
                detail.name,
                detail.sub_position,
                detail.current_club_name,
                detail.age,
                detail.gem_score
            );
        }
    }

    if let Some(sink) = sink {
        let rows = output.rows.iter().map(|r| r.record()).collect::<Vec<_>>();
        sink.replace_all(&export::header(), &rows)
            .context("sheet upload failed")?;
        info!("sheet upload complete");
        println!("Uploaded {} rows to sheet", rows.len());
    }

    Ok(())
}
