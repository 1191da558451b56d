use std::collections::HashSet;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

pub const DEFAULT_FIRST_SEASON: u32 = 10;
pub const DEFAULT_LAST_SEASON: u32 = 18;

/// Season label as it appears in source file names, e.g. `season-1011`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeasonId(pub String);

impl SeasonId {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// `10` -> `season-1011`.
    pub fn from_start_year(start: u32) -> Self {
        Self(format!("season-{}{}", start, start + 1))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Compact label for chart axes (`season-1011` -> `1011`).
    pub fn short_label(&self) -> &str {
        self.0.strip_prefix("season-").unwrap_or(&self.0)
    }
}

impl fmt::Display for SeasonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn season_range(first: u32, last: u32) -> Vec<SeasonId> {
    (first..=last).map(SeasonId::from_start_year).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Home,
    Away,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::Home, Role::Away];

    pub fn label(self) -> &'static str {
        match self {
            Role::Home => "Home",
            Role::Away => "Away",
        }
    }
}

/// A statistic recorded once per side of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatPair {
    FullTimeGoals,
    HalfTimeGoals,
    ShotsOnTarget,
    Fouls,
    Corners,
}

impl StatPair {
    pub const ALL: [StatPair; 5] = [
        StatPair::FullTimeGoals,
        StatPair::HalfTimeGoals,
        StatPair::ShotsOnTarget,
        StatPair::Fouls,
        StatPair::Corners,
    ];

    pub fn home_column(self) -> &'static str {
        match self {
            StatPair::FullTimeGoals => "FTHG",
            StatPair::HalfTimeGoals => "HTHG",
            StatPair::ShotsOnTarget => "HST",
            StatPair::Fouls => "HF",
            StatPair::Corners => "HC",
        }
    }

    pub fn away_column(self) -> &'static str {
        match self {
            StatPair::FullTimeGoals => "FTAG",
            StatPair::HalfTimeGoals => "HTAG",
            StatPair::ShotsOnTarget => "AST",
            StatPair::Fouls => "AF",
            StatPair::Corners => "AC",
        }
    }

    pub fn column(self, role: Role) -> &'static str {
        match role {
            Role::Home => self.home_column(),
            Role::Away => self.away_column(),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StatPair::FullTimeGoals => "Goals",
            StatPair::HalfTimeGoals => "Halftime goals",
            StatPair::ShotsOnTarget => "Shots",
            StatPair::Fouls => "Fouls",
            StatPair::Corners => "Corners",
        }
    }
}

/// Home and away value of one statistic. `None` marks a gap in the source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SidePair {
    pub home: Option<u32>,
    pub away: Option<u32>,
}

impl SidePair {
    pub fn new(home: Option<u32>, away: Option<u32>) -> Self {
        Self { home, away }
    }

    pub fn get(&self, role: Role) -> Option<u32> {
        match role {
            Role::Home => self.home,
            Role::Away => self.away,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchRecord {
    pub season: SeasonId,
    pub home_team: String,
    pub away_team: String,
    pub full_time_goals: SidePair,
    pub half_time_goals: SidePair,
    pub shots_on_target: SidePair,
    pub fouls: SidePair,
    pub corners: SidePair,
}

impl MatchRecord {
    /// Record with every statistic missing; fill in with [`MatchRecord::with_stat`].
    pub fn new(season: SeasonId, home_team: impl Into<String>, away_team: impl Into<String>) -> Self {
        Self {
            season,
            home_team: home_team.into(),
            away_team: away_team.into(),
            full_time_goals: SidePair::default(),
            half_time_goals: SidePair::default(),
            shots_on_target: SidePair::default(),
            fouls: SidePair::default(),
            corners: SidePair::default(),
        }
    }

    pub fn with_stat(mut self, stat: StatPair, home: Option<u32>, away: Option<u32>) -> Self {
        *self.pair_mut(stat) = SidePair::new(home, away);
        self
    }

    pub fn pair(&self, stat: StatPair) -> SidePair {
        match stat {
            StatPair::FullTimeGoals => self.full_time_goals,
            StatPair::HalfTimeGoals => self.half_time_goals,
            StatPair::ShotsOnTarget => self.shots_on_target,
            StatPair::Fouls => self.fouls,
            StatPair::Corners => self.corners,
        }
    }

    fn pair_mut(&mut self, stat: StatPair) -> &mut SidePair {
        match stat {
            StatPair::FullTimeGoals => &mut self.full_time_goals,
            StatPair::HalfTimeGoals => &mut self.half_time_goals,
            StatPair::ShotsOnTarget => &mut self.shots_on_target,
            StatPair::Fouls => &mut self.fouls,
            StatPair::Corners => &mut self.corners,
        }
    }

    pub fn stat(&self, stat: StatPair, role: Role) -> Option<u32> {
        self.pair(stat).get(role)
    }

    pub fn team(&self, role: Role) -> &str {
        match role {
            Role::Home => &self.home_team,
            Role::Away => &self.away_team,
        }
    }
}

/// All loaded seasons concatenated. Read-only once built.
#[derive(Debug, Clone, Default)]
pub struct MatchTable {
    rows: Vec<MatchRecord>,
}

impl MatchTable {
    pub fn new(rows: Vec<MatchRecord>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[MatchRecord] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MatchRecord> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct home-team names in order of first appearance.
    pub fn home_teams(&self) -> Vec<&str> {
        distinct(self.rows.iter().map(|m| m.home_team.as_str()))
    }

    /// Distinct team names from either role, in order of first appearance.
    pub fn teams(&self) -> Vec<&str> {
        distinct(
            self.rows
                .iter()
                .flat_map(|m| [m.home_team.as_str(), m.away_team.as_str()]),
        )
    }

    /// Distinct seasons, sorted by label.
    pub fn seasons(&self) -> Vec<&SeasonId> {
        let mut out = distinct(self.rows.iter().map(|m| &m.season));
        out.sort();
        out
    }
}

impl FromIterator<MatchRecord> for MatchTable {
    fn from_iter<I: IntoIterator<Item = MatchRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

fn distinct<'a, T, I>(items: I) -> Vec<&'a T>
where
    T: ?Sized + Eq + std::hash::Hash,
    I: Iterator<Item = &'a T>,
{
    let mut seen = HashSet::new();
    items.filter(|item| seen.insert(*item)).collect()
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("file for {season} not found at {path}")]
    Missing { season: SeasonId, path: PathBuf },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },

    #[error("{path} is missing required columns: {columns}")]
    MissingColumns { path: PathBuf, columns: String },
}

#[derive(Debug, Clone)]
pub struct SeasonLoad {
    pub season: SeasonId,
    pub rows: Vec<MatchRecord>,
    pub skipped_rows: usize,
}

#[derive(Debug, Clone, Default)]
pub struct LoadSummary {
    pub data_dir: PathBuf,
    pub seasons_total: usize,
    pub seasons_loaded: Vec<SeasonId>,
    pub rows_loaded: usize,
    pub rows_skipped: usize,
    pub errors: Vec<String>,
}

impl LoadSummary {
    pub fn nothing_loaded(&self) -> bool {
        self.rows_loaded == 0
    }
}

// Source column names; everything else in the file is ignored.
#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct RawMatchRow {
    HomeTeam: String,
    AwayTeam: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    FTHG: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    FTAG: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    HTHG: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    HTAG: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    HST: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    AST: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    HF: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    AF: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    HC: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    AC: Option<f64>,
}

impl RawMatchRow {
    fn into_record(self, season: &SeasonId) -> Option<MatchRecord> {
        let home_team = self.HomeTeam.trim();
        let away_team = self.AwayTeam.trim();
        if home_team.is_empty() || away_team.is_empty() {
            return None;
        }
        Some(
            MatchRecord::new(season.clone(), home_team, away_team)
                .with_stat(StatPair::FullTimeGoals, count_cell(self.FTHG), count_cell(self.FTAG))
                .with_stat(StatPair::HalfTimeGoals, count_cell(self.HTHG), count_cell(self.HTAG))
                .with_stat(StatPair::ShotsOnTarget, count_cell(self.HST), count_cell(self.AST))
                .with_stat(StatPair::Fouls, count_cell(self.HF), count_cell(self.AF))
                .with_stat(StatPair::Corners, count_cell(self.HC), count_cell(self.AC)),
        )
    }
}

fn count_cell(raw: Option<f64>) -> Option<u32> {
    let v = raw?;
    if !v.is_finite() || v < 0.0 {
        return None;
    }
    Some(v.round() as u32)
}

pub fn season_file(data_dir: &Path, season: &SeasonId) -> PathBuf {
    data_dir.join(format!("{season}_csv.csv"))
}

pub fn load_season(data_dir: &Path, season: &SeasonId) -> Result<SeasonLoad, LoadError> {
    let path = season_file(data_dir, season);
    if !path.is_file() {
        return Err(LoadError::Missing {
            season: season.clone(),
            path,
        });
    }
    let file = File::open(&path).map_err(|source| LoadError::Io {
        path: path.clone(),
        source,
    })?;
    read_season_csv(file, season, &path)
}

/// Parse one season's CSV. `origin` is only used in error messages.
pub fn read_season_csv<R: std::io::Read>(
    reader: R,
    season: &SeasonId,
    origin: &Path,
) -> Result<SeasonLoad, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|source| LoadError::Csv {
            path: origin.to_path_buf(),
            source,
        })?
        .clone();

    let missing_required: Vec<&str> = ["HomeTeam", "AwayTeam"]
        .into_iter()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .collect();
    if !missing_required.is_empty() {
        return Err(LoadError::MissingColumns {
            path: origin.to_path_buf(),
            columns: missing_required.join(", "),
        });
    }

    let missing_stats: Vec<&str> = StatPair::ALL
        .iter()
        .flat_map(|s| [s.home_column(), s.away_column()])
        .filter(|col| !headers.iter().any(|h| h == *col))
        .collect();
    if !missing_stats.is_empty() {
        warn!(
            "{season}: columns {} absent, treating as gaps",
            missing_stats.join(", ")
        );
    }

    let mut rows = Vec::new();
    let mut skipped_rows = 0usize;
    for result in rdr.deserialize::<RawMatchRow>() {
        match result {
            Ok(raw) => match raw.into_record(season) {
                Some(record) => rows.push(record),
                None => skipped_rows += 1,
            },
            Err(err) => {
                debug!("{season}: skipping unreadable row: {err}");
                skipped_rows += 1;
            }
        }
    }

    Ok(SeasonLoad {
        season: season.clone(),
        rows,
        skipped_rows,
    })
}

/// Load every requested season from `data_dir`. Seasons that cannot be read
/// are skipped and reported in the summary; the rest are concatenated in
/// the order given.
pub fn load_match_table(data_dir: &Path, seasons: &[SeasonId]) -> (MatchTable, LoadSummary) {
    let results: Vec<Result<SeasonLoad, LoadError>> = seasons
        .par_iter()
        .map(|season| load_season(data_dir, season))
        .collect();

    let mut summary = LoadSummary {
        data_dir: data_dir.to_path_buf(),
        seasons_total: seasons.len(),
        ..LoadSummary::default()
    };
    let mut rows = Vec::new();

    for (season, result) in seasons.iter().zip(results) {
        match result {
            Ok(load) => {
                if load.skipped_rows > 0 {
                    warn!("{season}: skipped {} malformed rows", load.skipped_rows);
                    summary
                        .errors
                        .push(format!("season {season}: skipped {} rows", load.skipped_rows));
                }
                debug!("{season}: loaded {} matches", load.rows.len());
                summary.rows_loaded += load.rows.len();
                summary.rows_skipped += load.skipped_rows;
                summary.seasons_loaded.push(load.season);
                rows.extend(load.rows);
            }
            Err(err) => {
                warn!("{err}");
                summary.errors.push(format!("season {season}: {err}"));
            }
        }
    }

    (MatchTable::new(rows), summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn season_labels_follow_file_naming() {
        let seasons = season_range(10, 12);
        let labels: Vec<&str> = seasons.iter().map(|s| s.as_str()).collect();
        assert_eq!(labels, ["season-1011", "season-1112", "season-1213"]);
        assert_eq!(seasons[0].short_label(), "1011");
    }

    #[test]
    fn gap_cells_become_none() {
        assert_eq!(count_cell(Some(2.0)), Some(2));
        assert_eq!(count_cell(Some(f64::NAN)), None);
        assert_eq!(count_cell(Some(-1.0)), None);
        assert_eq!(count_cell(None), None);
    }

    #[test]
    fn csv_rows_map_onto_fixed_schema() {
        let raw = "Div,Date,HomeTeam,AwayTeam,FTHG,FTAG,HTHG,HTAG,HST,AST,HF,AF,HC,AC,B365H\n\
                   SP1,28/08/10,Hercules,Ath Bilbao,0,1,0,0,3,4,16,12,3,5,2.1\n\
                   SP1,28/08/10,Levante,Sevilla,1,4,,0,NaN,7,20,15,4,2,3.4\n\
                   SP1,29/08/10,,Getafe,1,1,0,0,1,1,1,1,1,1,2.0\n";
        let season = SeasonId::new("season-1011");
        let load = read_season_csv(raw.as_bytes(), &season, Path::new("inline.csv"))
            .expect("inline csv should parse");
        assert_eq!(load.rows.len(), 2);
        assert_eq!(load.skipped_rows, 1);

        let levante = &load.rows[1];
        assert_eq!(levante.home_team, "Levante");
        assert_eq!(levante.stat(StatPair::FullTimeGoals, Role::Away), Some(4));
        assert_eq!(levante.stat(StatPair::HalfTimeGoals, Role::Home), None);
        assert_eq!(levante.stat(StatPair::ShotsOnTarget, Role::Home), None);
        assert_eq!(levante.stat(StatPair::Corners, Role::Home), Some(4));
    }

    #[test]
    fn absent_stat_columns_load_as_gaps() {
        let raw = "HomeTeam,AwayTeam,FTHG,FTAG,HTHG,HTAG,HF,AF,HC,AC\n\
                   Sevilla,Betis,2,1,1,0,12,14,6,3\n";
        let season = SeasonId::new("season-1011");
        let load = read_season_csv(raw.as_bytes(), &season, Path::new("no_shots.csv"))
            .expect("optional columns may be absent");
        assert_eq!(load.rows.len(), 1);
        assert_eq!(load.skipped_rows, 0);

        let row = &load.rows[0];
        assert_eq!(row.stat(StatPair::ShotsOnTarget, Role::Home), None);
        assert_eq!(row.stat(StatPair::ShotsOnTarget, Role::Away), None);
        assert_eq!(row.stat(StatPair::Fouls, Role::Away), Some(14));
    }

    #[test]
    fn missing_team_columns_are_rejected() {
        let raw = "Div,FTHG,FTAG\nSP1,1,0\n";
        let season = SeasonId::new("season-1011");
        let err = read_season_csv(raw.as_bytes(), &season, Path::new("bad.csv")).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumns { .. }));
    }
}
