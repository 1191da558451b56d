use std::str::FromStr;

use crate::dataset::{MatchTable, StatPair};
use crate::stats::{Reducer, SeasonMode};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("unknown team: {0}")]
    UnknownTeam(String),

    #[error("unknown statistic: {0} (expected one of goals, halftime-goals, shots, fouls, corners)")]
    UnknownStatistic(String),

    #[error("unknown metric: {0} (expected one of sum, mean, median, max, min)")]
    UnknownReducer(String),

    #[error("unknown mode: {0} (expected absolute or per-game)")]
    UnknownMode(String),
}

/// A menu entry: display label plus the statistic it selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatOption {
    pub label: &'static str,
    pub stat: StatPair,
}

const fn opt(label: &'static str, stat: StatPair) -> StatOption {
    StatOption { label, stat }
}

pub const TEAM_STAT_OPTIONS: [StatOption; 5] = [
    opt("Goals per Game", StatPair::FullTimeGoals),
    opt("Shots per Game", StatPair::ShotsOnTarget),
    opt("Fouls per Game", StatPair::Fouls),
    opt("Halftime Goals per Game", StatPair::HalfTimeGoals),
    opt("Corners per Game", StatPair::Corners),
];

pub const COMPARE_STAT_OPTIONS: [StatOption; 4] = [
    opt("Goals per game", StatPair::FullTimeGoals),
    opt("Shots per game", StatPair::ShotsOnTarget),
    opt("Halftime goals per game", StatPair::HalfTimeGoals),
    opt("Fouls per game", StatPair::Fouls),
];

pub const COMPARE_METRICS: [Reducer; 4] = [
    Reducer::Mean,
    Reducer::Median,
    Reducer::Max,
    Reducer::Min,
];

pub const SEASON_STAT_OPTIONS: [StatOption; 4] = [
    opt("Total Goals", StatPair::FullTimeGoals),
    opt("Total Shots", StatPair::ShotsOnTarget),
    opt("Halftime Goals", StatPair::HalfTimeGoals),
    opt("Total Fouls", StatPair::Fouls),
];

/// Label used for `stat` in the given menu, falling back to the statistic's own label.
pub fn label_in(options: &[StatOption], stat: StatPair) -> &'static str {
    options
        .iter()
        .find(|o| o.stat == stat)
        .map_or(stat.label(), |o| o.label)
}

fn normalize(raw: &str) -> String {
    raw.trim()
        .to_ascii_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

impl FromStr for StatPair {
    type Err = SelectionError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match normalize(raw).as_str() {
            "goals" | "fulltimegoals" | "ftg" | "fthg" | "ftag" => Ok(StatPair::FullTimeGoals),
            "halftimegoals" | "htgoals" | "htg" | "hthg" | "htag" => Ok(StatPair::HalfTimeGoals),
            "shots" | "shotsontarget" | "hst" | "ast" => Ok(StatPair::ShotsOnTarget),
            "fouls" | "hf" | "af" => Ok(StatPair::Fouls),
            "corners" | "hc" | "ac" => Ok(StatPair::Corners),
            _ => Err(SelectionError::UnknownStatistic(raw.to_string())),
        }
    }
}

impl FromStr for Reducer {
    type Err = SelectionError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match normalize(raw).as_str() {
            "sum" | "total" => Ok(Reducer::Sum),
            "mean" | "avg" | "average" => Ok(Reducer::Mean),
            "median" => Ok(Reducer::Median),
            "max" => Ok(Reducer::Max),
            "min" => Ok(Reducer::Min),
            _ => Err(SelectionError::UnknownReducer(raw.to_string())),
        }
    }
}

impl FromStr for SeasonMode {
    type Err = SelectionError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match normalize(raw).as_str() {
            "absolute" | "abs" => Ok(SeasonMode::Absolute),
            "pergame" | "game" => Ok(SeasonMode::PerGame),
            _ => Err(SelectionError::UnknownMode(raw.to_string())),
        }
    }
}

/// Resolve a user-typed team name against the table (exact, then case-insensitive).
pub fn resolve_team<'a>(table: &'a MatchTable, raw: &str) -> Result<&'a str, SelectionError> {
    let wanted = raw.trim();
    let teams = table.teams();
    if let Some(team) = teams.iter().find(|t| **t == wanted) {
        return Ok(*team);
    }
    teams
        .into_iter()
        .find(|t| t.eq_ignore_ascii_case(wanted))
        .ok_or_else(|| SelectionError::UnknownTeam(raw.to_string()))
}
