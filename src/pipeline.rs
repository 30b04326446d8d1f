use std::collections::HashMap;

use anyhow::{Context, Result};
use tracing::{debug, info, info_span};

use crate::aggregate::{self, AggregateInputs};
use crate::config::{PipelineConfig, ScoringSettings};
use crate::dataset::{self, Dataset, LoadReport, PlayerRecord};
use crate::eligibility::{self, AgeCohort};
use crate::export;
use crate::metrics;
use crate::ranking::{self, ExportRow, ScatterPoint, TopPlayerDetail};
use crate::scoring;

/// Row counts through each stage of one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    pub players_loaded: usize,
    pub appearances_loaded: usize,
    pub candidates: usize,
    pub juniors: usize,
    pub seniors: usize,
    pub eligible: usize,
    pub scored: usize,
}

#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub rows: Vec<ExportRow>,
    pub top: Vec<TopPlayerDetail>,
    pub scatter: Vec<ScatterPoint>,
    pub report: RunReport,
}

pub fn score_dataset(dataset: &Dataset, settings: &ScoringSettings) -> PipelineOutput {
    let today = settings.run_date;
    let players: HashMap<u64, &PlayerRecord> =
        dataset.players.iter().map(|p| (p.player_id, p)).collect();
    let index = dataset::index_by_player(&dataset.appearances);

    let candidates = eligibility::select_candidates(&dataset.players, &settings.eligibility, today);
    let juniors = candidates
        .iter()
        .filter(|c| c.cohort == AgeCohort::Junior)
        .count();
    debug!(
        "{} candidates ({} juniors, {} seniors)",
        candidates.len(),
        juniors,
        candidates.len() - juniors
    );

    let eligible = eligibility::eligible_players(&candidates, &index, &settings.eligibility);
    info!("{} of {} candidates eligible", eligible.len(), candidates.len());

    let rates = metrics::normalize_all(&index);
    let inputs = AggregateInputs {
        players: &players,
        rates: &rates,
        appearances: &index,
        rules: &settings.bonus,
        today,
    };
    let per_player = aggregate::aggregate_all(&eligible, &inputs);

    let mut scored = scoring::score_all(&per_player, &settings.weights);
    ranking::rank(&mut scored);

    let ages: HashMap<u64, i64> = candidates.iter().map(|c| (c.player_id, c.age)).collect();
    let top = ranking::top_details(&scored, settings.top_n, &players, &ages);
    let rows = ranking::build_export_rows(&scored, &players, &ages, today);
    let scatter = ranking::scatter_points(&rows);

    PipelineOutput {
        report: RunReport {
            players_loaded: dataset.players.len(),
            appearances_loaded: dataset.appearances.len(),
            candidates: candidates.len(),
            juniors,
            seniors: candidates.len() - juniors,
            eligible: eligible.len(),
            scored: rows.len(),
        },
        rows,
        top,
        scatter,
    }
}

/// One pipeline run. Owns the worker pool its parallel stages execute on; the
/// pool is released when the run is dropped, whether the run succeeded or not.
pub struct PipelineRun {
    pool: rayon::ThreadPool,
    settings: ScoringSettings,
}

impl PipelineRun {
    pub fn new(settings: ScoringSettings, threads: Option<usize>) -> Result<Self> {
        let mut builder =
            rayon::ThreadPoolBuilder::new().thread_name(|idx| format!("gem-scout-{idx}"));
        if let Some(threads) = threads {
            builder = builder.num_threads(threads);
        }
        let pool = builder.build().context("failed to build worker pool")?;
        Ok(Self { pool, settings })
    }

    pub fn settings(&self) -> &ScoringSettings {
        &self.settings
    }

    pub fn execute(&self, dataset: &Dataset) -> PipelineOutput {
        let span = info_span!("score", run_date = %self.settings.run_date);
        self.pool
            .install(|| span.in_scope(|| score_dataset(dataset, &self.settings)))
    }
}

/// Load, score and export. The CSV (and workbook, if configured) are written
/// only after scoring finished for the whole table.
pub fn run(config: &PipelineConfig) -> Result<(PipelineOutput, LoadReport)> {
    let run = PipelineRun::new(config.scoring.clone(), config.threads)?;

    info!("loading dataset from {}", config.data_dir.display());
    let (dataset, load_report) = dataset::load_dataset(&config.data_dir)
        .with_context(|| format!("failed to load dataset from {}", config.data_dir.display()))?;
    info!(
        "loaded {} players, {} appearances, {} valuations, {} game events",
        dataset.players.len(),
        dataset.appearances.len(),
        dataset.valuations.len(),
        dataset.game_events.len()
    );

    let output = run.execute(&dataset);

    export::write_csv(&config.output_path, &output.rows)?;
    info!(
        "wrote {} rows to {}",
        output.rows.len(),
        config.output_path.display()
    );

    if let Some(path) = config.xlsx_path.as_ref() {
        export::write_workbook(path, &output.rows, &output.top)?;
        info!("wrote workbook to {}", path.display());
    }

    Ok((output, load_report))
}
