use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use rust_xlsxwriter::{Chart, ChartType, Workbook, Worksheet};

use crate::ranking::{ExportRow, TopPlayerDetail};

pub const EXPORT_COLUMNS: [&str; 20] = [
    "player_id",
    "goals_p90",
    "assists_p90",
    "yellows_p90",
    "reds_p90",
    "euro_bonus",
    "ambi_bonus",
    "height_bonus",
    "contract_bonus",
    "gem_score",
    "market_value_in_eur",
    "market_value_log",
    "name",
    "sub_position",
    "age",
    "height_in_cm",
    "image_url",
    "current_club_name",
    "url",
    "date",
];

const SCORES_SHEET: &str = "Scores";
const GEM_SCORE_COL: u16 = 9;
const MARKET_VALUE_LOG_COL: u16 = 11;

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Int(i64),
    Number(f64),
    Text(String),
}

impl Cell {
    pub fn render(&self) -> String {
        match self {
            Cell::Int(v) => v.to_string(),
            Cell::Number(v) => format_number(*v),
            Cell::Text(s) => s.clone(),
        }
    }
}

pub fn format_number(v: f64) -> String {
    if !v.is_finite() || v == 0.0 {
        return "0".to_string();
    }
    v.to_string()
}

impl ExportRow {
    pub fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::Int(self.player_id as i64),
            Cell::Number(self.goals_p90),
            Cell::Number(self.assists_p90),
            Cell::Number(self.yellows_p90),
            Cell::Number(self.reds_p90),
            Cell::Number(self.euro_bonus),
            Cell::Number(self.ambi_bonus),
            Cell::Number(self.height_bonus),
            Cell::Number(self.contract_bonus),
            Cell::Number(self.gem_score),
            Cell::Number(self.market_value_in_eur),
            Cell::Number(self.market_value_log),
            Cell::Text(self.name.clone()),
            Cell::Text(self.sub_position.clone()),
            Cell::Int(self.age),
            Cell::Number(self.height_in_cm),
            Cell::Text(self.image_url.clone()),
            Cell::Text(self.current_club_name.clone()),
            Cell::Text(self.url.clone()),
            Cell::Text(self.date.clone()),
        ]
    }

    pub fn record(&self) -> Vec<String> {
        self.cells().iter().map(Cell::render).collect()
    }
}

pub fn header() -> Vec<String> {
    EXPORT_COLUMNS.iter().map(|c| c.to_string()).collect()
}

pub fn write_csv_to<W: Write>(writer: W, rows: &[ExportRow]) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(EXPORT_COLUMNS).context("write csv header")?;
    for row in rows {
        out.write_record(row.record())
            .with_context(|| format!("write csv row for player {}", row.player_id))?;
    }
    out.flush().context("flush csv")?;
    Ok(())
}

/// Replace `path` with the table. Written next to the target and renamed so a
/// failed run leaves the previous file intact.
pub fn write_csv(path: &Path, rows: &[ExportRow]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create output dir {}", parent.display()))?;
    }
    let tmp = path.with_extension("csv.tmp");
    let file = fs::File::create(&tmp).with_context(|| format!("create {}", tmp.display()))?;
    let result = write_csv_to(file, rows).and_then(|()| {
        fs::rename(&tmp, path).with_context(|| format!("swap {} into place", path.display()))
    });
    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}

pub fn read_csv_table(path: &Path) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let mut reader =
        csv::Reader::from_path(path).with_context(|| format!("open {}", path.display()))?;
    let header = reader
        .headers()
        .context("read csv header")?
        .iter()
        .map(str::to_string)
        .collect::<Vec<_>>();
    if header.is_empty() {
        return Err(anyhow!("{} has no header row", path.display()));
    }
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.with_context(|| format!("read row from {}", path.display()))?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok((header, rows))
}

pub fn write_workbook(path: &Path, rows: &[ExportRow], top: &[TopPlayerDetail]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create output dir {}", parent.display()))?;
    }

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name(SCORES_SHEET)?;
        write_header(sheet, &EXPORT_COLUMNS)?;
        for (idx, row) in rows.iter().enumerate() {
            write_cells(sheet, idx as u32 + 1, &row.cells())?;
        }
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Top")?;
        write_header(
            sheet,
            &["Rank", "Player ID", "Player", "Club", "Sub Position", "Age", "Market Value", "Gem Score"],
        )?;
        for (idx, detail) in top.iter().enumerate() {
            let cells = [
                Cell::Int(detail.rank as i64),
                Cell::Int(detail.player_id as i64),
                Cell::Text(detail.name.clone()),
                Cell::Text(detail.current_club_name.clone()),
                Cell::Text(detail.sub_position.clone()),
                Cell::Int(detail.age),
                Cell::Number(detail.market_value_in_eur),
                Cell::Number(detail.gem_score),
            ];
            write_cells(sheet, idx as u32 + 1, &cells)?;
        }
    }
    if !rows.is_empty() {
        let last = rows.len() as u32;
        let mut chart = Chart::new(ChartType::Scatter);
        chart
            .add_series()
            .set_categories((SCORES_SHEET, 1, GEM_SCORE_COL, last, GEM_SCORE_COL))
            .set_values((SCORES_SHEET, 1, MARKET_VALUE_LOG_COL, last, MARKET_VALUE_LOG_COL));
        chart.title().set_name("Performance Score vs Market Value");
        chart.x_axis().set_name("Performance Score");
        chart.y_axis().set_name("Log Market Value");
        chart.legend().set_hidden();

        let sheet = workbook.add_worksheet();
        sheet.set_name("Plot")?;
        sheet.insert_chart(1, 1, &chart).context("insert scatter chart")?;
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;
    Ok(())
}

fn write_header(worksheet: &mut Worksheet, columns: &[&str]) -> Result<()> {
    for (col_idx, name) in columns.iter().enumerate() {
        worksheet
            .write_string(0, col_idx as u16, *name)
            .with_context(|| format!("write header cell {col_idx}"))?;
    }
    Ok(())
}

fn write_cells(worksheet: &mut Worksheet, row_idx: u32, cells: &[Cell]) -> Result<()> {
    for (col_idx, cell) in cells.iter().enumerate() {
        let col = col_idx as u16;
        match cell {
            Cell::Int(v) => worksheet.write_number(row_idx, col, *v as f64),
            Cell::Number(v) => worksheet.write_number(row_idx, col, *v),
            Cell::Text(s) => worksheet.write_string(row_idx, col, s),
        }
        .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
    }
    Ok(())
}
