//! Aggregations over a loaded [`MatchTable`].
//!
//! Every function here is a pure reduction: nothing is cached and the table
//! is only ever borrowed, so results are recomputed per query and can be
//! produced concurrently from a shared table.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::dataset::{MatchTable, Role, SeasonId, StatPair};

/// Reduction applied within a team group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Reducer {
    Sum,
    Mean,
    Median,
    Max,
    Min,
}

impl Reducer {
    pub const ALL: [Reducer; 5] = [
        Reducer::Sum,
        Reducer::Mean,
        Reducer::Median,
        Reducer::Max,
        Reducer::Min,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Reducer::Sum => "Sum",
            Reducer::Mean => "Mean",
            Reducer::Median => "Median",
            Reducer::Max => "Max",
            Reducer::Min => "Min",
        }
    }

    /// Reduce the observed values of one group. An empty group reduces to 0.
    pub fn reduce(self, values: &[u32]) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        match self {
            Reducer::Sum => values.iter().map(|&v| f64::from(v)).sum(),
            Reducer::Mean => {
                values.iter().map(|&v| f64::from(v)).sum::<f64>() / values.len() as f64
            }
            Reducer::Median => {
                let mut sorted = values.to_vec();
                sorted.sort_unstable();
                let mid = sorted.len() / 2;
                if sorted.len() % 2 == 0 {
                    (f64::from(sorted[mid - 1]) + f64::from(sorted[mid])) / 2.0
                } else {
                    f64::from(sorted[mid])
                }
            }
            Reducer::Max => values.iter().copied().max().map_or(0.0, f64::from),
            Reducer::Min => values.iter().copied().min().map_or(0.0, f64::from),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SeasonMode {
    Absolute,
    PerGame,
}

impl SeasonMode {
    pub const ALL: [SeasonMode; 2] = [SeasonMode::Absolute, SeasonMode::PerGame];

    pub fn label(self) -> &'static str {
        match self {
            SeasonMode::Absolute => "Absolute",
            SeasonMode::PerGame => "Per Game",
        }
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Per-game average of `stat` for `team` in one role, rounded to 2 places.
/// A team with no games in that role yields 0.
pub fn compute_stat_per_game(table: &MatchTable, role: Role, stat: StatPair, team: &str) -> f64 {
    let mut games = 0usize;
    let mut total = 0u64;
    for m in table.iter().filter(|m| m.team(role) == team) {
        games += 1;
        total += u64::from(m.stat(stat, role).unwrap_or(0));
    }
    if games == 0 {
        return 0.0;
    }
    round2(total as f64 / games as f64)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamRate {
    pub team: String,
    pub stat: StatPair,
    pub home: f64,
    pub away: f64,
}

impl TeamRate {
    pub fn get(&self, role: Role) -> f64 {
        match role {
            Role::Home => self.home,
            Role::Away => self.away,
        }
    }
}

pub fn compute_rate(table: &MatchTable, stat: StatPair, team: &str) -> TeamRate {
    TeamRate {
        team: team.to_string(),
        stat,
        home: compute_stat_per_game(table, Role::Home, stat, team),
        away: compute_stat_per_game(table, Role::Away, stat, team),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedTeamRow {
    pub team: String,
    pub home: f64,
    pub away: f64,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedTeamTable {
    pub stat: StatPair,
    pub reducer: Reducer,
    rows: Vec<RankedTeamRow>,
}

impl RankedTeamTable {
    /// Rows sorted by `total`, highest first.
    pub fn rows(&self) -> &[RankedTeamRow] {
        &self.rows
    }

    pub fn get(&self, team: &str) -> Option<&RankedTeamRow> {
        self.rows.iter().find(|row| row.team == team)
    }

    pub fn position(&self, team: &str) -> Option<usize> {
        self.rows.iter().position(|row| row.team == team)
    }

    pub fn home_sum(&self) -> f64 {
        self.rows.iter().map(|row| row.home).sum()
    }

    pub fn away_sum(&self) -> f64 {
        self.rows.iter().map(|row| row.away).sum()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn reduce_by_team<'a>(
    table: &'a MatchTable,
    role: Role,
    stat: StatPair,
    reducer: Reducer,
) -> BTreeMap<&'a str, f64> {
    let mut groups: BTreeMap<&str, Vec<u32>> = BTreeMap::new();
    for m in table.iter() {
        let values = groups.entry(m.team(role)).or_default();
        if let Some(v) = m.stat(stat, role) {
            values.push(v);
        }
    }
    groups
        .into_iter()
        .map(|(team, values)| (team, reducer.reduce(&values)))
        .collect()
}

/// Reduce the home column per home team and the away column per away team,
/// union the two on team name (absent side = 0) and rank by their sum.
///
/// With `Max`/`Min` the total is the sum of the two per-role extrema, not an
/// extremum over all of a team's games.
pub fn rank_teams(table: &MatchTable, stat: StatPair, reducer: Reducer) -> RankedTeamTable {
    let home = reduce_by_team(table, Role::Home, stat, reducer);
    let away = reduce_by_team(table, Role::Away, stat, reducer);

    let mut merged: BTreeMap<&str, (f64, f64)> = BTreeMap::new();
    for (team, value) in home {
        merged.entry(team).or_default().0 = value;
    }
    for (team, value) in away {
        merged.entry(team).or_default().1 = value;
    }

    let mut rows: Vec<RankedTeamRow> = merged
        .into_iter()
        .map(|(team, (home, away))| RankedTeamRow {
            team: team.to_string(),
            home,
            away,
            total: home + away,
        })
        .collect();
    // Stable: equal totals keep the alphabetical grouping order.
    rows.sort_by(|a, b| b.total.total_cmp(&a.total));

    RankedTeamTable {
        stat,
        reducer,
        rows,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonPoint {
    pub season: SeasonId,
    pub value: f64,
    pub matches: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonBest {
    pub season: SeasonId,
    /// Rounded to 2 places.
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonAggregate {
    pub stat: StatPair,
    pub mode: SeasonMode,
    pub points: Vec<SeasonPoint>,
    pub best: Option<SeasonBest>,
}

impl SeasonAggregate {
    pub fn get(&self, season: &SeasonId) -> Option<&SeasonPoint> {
        self.points.iter().find(|p| &p.season == season)
    }
}

/// League-wide totals (or per-game rates) of `stat` for each season present
/// in the table, plus the season with the highest value. The first season
/// wins an exact tie.
pub fn aggregate_by_season(table: &MatchTable, stat: StatPair, mode: SeasonMode) -> SeasonAggregate {
    let mut groups: BTreeMap<&SeasonId, (u64, usize)> = BTreeMap::new();
    for m in table.iter() {
        let pair = m.pair(stat);
        let entry = groups.entry(&m.season).or_insert((0, 0));
        entry.0 += u64::from(pair.home.unwrap_or(0)) + u64::from(pair.away.unwrap_or(0));
        entry.1 += 1;
    }

    // Groups only exist for seasons with at least one row, so `matches > 0`.
    let points: Vec<SeasonPoint> = groups
        .into_iter()
        .map(|(season, (sum, matches))| {
            let value = match mode {
                SeasonMode::Absolute => sum as f64,
                SeasonMode::PerGame => sum as f64 / matches as f64,
            };
            SeasonPoint {
                season: season.clone(),
                value,
                matches,
            }
        })
        .collect();

    let mut best: Option<&SeasonPoint> = None;
    for point in &points {
        if best.is_none_or(|b| point.value > b.value) {
            best = Some(point);
        }
    }
    let best = best.map(|p| SeasonBest {
        season: p.season.clone(),
        value: round2(p.value),
    });

    SeasonAggregate {
        stat,
        mode,
        points,
        best,
    }
}
