use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::dataset::Role;
use crate::stats::{RankedTeamTable, SeasonAggregate, TeamRate};

pub struct ExportReport {
    pub path: PathBuf,
    pub team_rows: usize,
    pub ranking_rows: usize,
    pub season_rows: usize,
}

/// The views currently on screen, with the menu labels they were chosen by.
pub struct ExportViews<'a> {
    pub team: Option<(&'a TeamRate, &'a str)>,
    pub ranking: (&'a RankedTeamTable, &'a str),
    pub seasons: (&'a SeasonAggregate, &'a str),
    pub headline: &'a str,
}

enum Cell {
    Text(String),
    Number(f64),
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

pub fn timestamped_path(dir: &Path) -> PathBuf {
    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    dir.join(format!("laliga_analysis_{stamp}.xlsx"))
}

pub fn export_views(path: &Path, views: &ExportViews<'_>) -> Result<ExportReport> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create export dir {}", parent.display()))?;
    }

    let mut team_rows: Vec<Vec<Cell>> = vec![vec![
        "Team".into(),
        "Statistic".into(),
        "Location".into(),
        "Column".into(),
        "Value".into(),
    ]];
    if let Some((rate, label)) = views.team {
        for role in Role::ALL {
            team_rows.push(vec![
                rate.team.clone().into(),
                label.into(),
                role.label().into(),
                rate.stat.column(role).into(),
                rate.get(role).into(),
            ]);
        }
    }

    let (ranking, ranking_label) = views.ranking;
    let mut ranking_rows: Vec<Vec<Cell>> = vec![vec![
        "Rank".into(),
        "Team".into(),
        format!("Home ({})", ranking.reducer.label()).into(),
        format!("Away ({})", ranking.reducer.label()).into(),
        format!("Total {ranking_label}").into(),
    ]];
    for (idx, row) in ranking.rows().iter().enumerate() {
        ranking_rows.push(vec![
            ((idx + 1) as f64).into(),
            row.team.clone().into(),
            row.home.into(),
            row.away.into(),
            row.total.into(),
        ]);
    }

    let (seasons, season_label) = views.seasons;
    let mut season_rows: Vec<Vec<Cell>> = vec![vec![
        "Season".into(),
        format!("{season_label} ({})", seasons.mode.label()).into(),
        "Matches".into(),
    ]];
    for point in &seasons.points {
        season_rows.push(vec![
            point.season.to_string().into(),
            point.value.into(),
            (point.matches as f64).into(),
        ]);
    }
    season_rows.push(Vec::new());
    season_rows.push(vec![views.headline.into()]);

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Team")?;
        write_rows(sheet, &team_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Comparison")?;
        write_rows(sheet, &ranking_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Seasons")?;
        write_rows(sheet, &season_rows)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    Ok(ExportReport {
        path: path.to_path_buf(),
        team_rows: team_rows.len() - 1,
        ranking_rows: ranking_rows.len() - 1,
        season_rows: seasons.points.len(),
    })
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<Cell>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, cell) in row.iter().enumerate() {
            let (r, c) = (row_idx as u32, col_idx as u16);
            match cell {
                Cell::Text(value) => worksheet.write_string(r, c, value),
                Cell::Number(value) => worksheet.write_number(r, c, *value),
            }
            .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
