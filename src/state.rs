use std::collections::VecDeque;
use std::path::PathBuf;
use std::time::Instant;

use crate::dataset::{LoadSummary, MatchTable, Role, StatPair};
use crate::options::{
    COMPARE_METRICS, COMPARE_STAT_OPTIONS, SEASON_STAT_OPTIONS, StatOption, TEAM_STAT_OPTIONS,
};
use crate::stats::{
    RankedTeamTable, Reducer, SeasonAggregate, SeasonMode, TeamRate, aggregate_by_season,
    compute_rate, rank_teams,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Team,
    Compare,
    Seasons,
}

impl Screen {
    pub fn label(self) -> &'static str {
        match self {
            Screen::Team => "TEAM",
            Screen::Compare => "COMPARE",
            Screen::Seasons => "SEASONS",
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub screen: Screen,
    pub league_title: String,
    pub teams: Vec<String>,
    pub team_selected: usize,
    pub team_stat: usize,
    pub compare_stat: usize,
    pub compare_metric: usize,
    pub compare_scroll: usize,
    pub season_stat: usize,
    pub season_mode: SeasonMode,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
    pub demo: bool,
    pub export: ExportState,
}

impl AppState {
    pub fn new(table: &MatchTable, league_title: impl Into<String>) -> Self {
        Self {
            screen: Screen::Team,
            league_title: league_title.into(),
            teams: table.home_teams().into_iter().map(str::to_string).collect(),
            team_selected: 0,
            team_stat: 0,
            compare_stat: 0,
            compare_metric: 0,
            compare_scroll: 0,
            season_stat: 0,
            season_mode: SeasonMode::Absolute,
            logs: VecDeque::new(),
            help_overlay: false,
            demo: false,
            export: ExportState::new(),
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    pub fn log_load_summary(&mut self, summary: &LoadSummary) {
        self.push_log(format!(
            "[INFO] Loaded {} matches from {}/{} seasons ({})",
            summary.rows_loaded,
            summary.seasons_loaded.len(),
            summary.seasons_total,
            summary.data_dir.display()
        ));
        for err in &summary.errors {
            self.push_log(format!("[WARN] {err}"));
        }
    }

    pub fn cycle_screen(&mut self) {
        self.screen = match self.screen {
            Screen::Team => Screen::Compare,
            Screen::Compare => Screen::Seasons,
            Screen::Seasons => Screen::Team,
        };
    }

    pub fn selected_team(&self) -> Option<&str> {
        self.teams.get(self.team_selected).map(String::as_str)
    }

    pub fn select_next(&mut self) {
        match self.screen {
            Screen::Team => {
                if self.teams.is_empty() {
                    self.team_selected = 0;
                    return;
                }
                self.team_selected = (self.team_selected + 1) % self.teams.len();
            }
            Screen::Compare => self.compare_scroll = self.compare_scroll.saturating_add(1),
            Screen::Seasons => {}
        }
    }

    pub fn select_prev(&mut self) {
        match self.screen {
            Screen::Team => {
                if self.teams.is_empty() {
                    self.team_selected = 0;
                    return;
                }
                if self.team_selected == 0 {
                    self.team_selected = self.teams.len() - 1;
                } else {
                    self.team_selected -= 1;
                }
            }
            Screen::Compare => self.compare_scroll = self.compare_scroll.saturating_sub(1),
            Screen::Seasons => {}
        }
    }

    pub fn cycle_stat(&mut self) {
        match self.screen {
            Screen::Team => self.team_stat = (self.team_stat + 1) % TEAM_STAT_OPTIONS.len(),
            Screen::Compare => {
                self.compare_stat = (self.compare_stat + 1) % COMPARE_STAT_OPTIONS.len();
                self.compare_scroll = 0;
            }
            Screen::Seasons => {
                self.season_stat = (self.season_stat + 1) % SEASON_STAT_OPTIONS.len()
            }
        }
    }

    pub fn cycle_metric(&mut self) {
        self.compare_metric = (self.compare_metric + 1) % COMPARE_METRICS.len();
        self.compare_scroll = 0;
    }

    pub fn toggle_season_mode(&mut self) {
        self.season_mode = match self.season_mode {
            SeasonMode::Absolute => SeasonMode::PerGame,
            SeasonMode::PerGame => SeasonMode::Absolute,
        };
    }

    pub fn team_option(&self) -> StatOption {
        TEAM_STAT_OPTIONS[self.team_stat % TEAM_STAT_OPTIONS.len()]
    }

    pub fn compare_option(&self) -> StatOption {
        COMPARE_STAT_OPTIONS[self.compare_stat % COMPARE_STAT_OPTIONS.len()]
    }

    pub fn compare_reducer(&self) -> Reducer {
        COMPARE_METRICS[self.compare_metric % COMPARE_METRICS.len()]
    }

    pub fn season_option(&self) -> StatOption {
        SEASON_STAT_OPTIONS[self.season_stat % SEASON_STAT_OPTIONS.len()]
    }

    pub fn team_view(&self, table: &MatchTable) -> Option<TeamRate> {
        let team = self.selected_team()?;
        Some(compute_rate(table, self.team_option().stat, team))
    }

    pub fn compare_view(&self, table: &MatchTable) -> RankedTeamTable {
        rank_teams(table, self.compare_option().stat, self.compare_reducer())
    }

    pub fn season_view(&self, table: &MatchTable) -> SeasonAggregate {
        aggregate_by_season(table, self.season_option().stat, self.season_mode)
    }

    pub fn season_headline(&self, aggregate: &SeasonAggregate) -> String {
        season_headline(self.season_option().label, aggregate)
    }
}

/// Summary sentence for the season with the highest value.
pub fn season_headline(stat_label: &str, aggregate: &SeasonAggregate) -> String {
    let Some(best) = aggregate.best.as_ref() else {
        return "No matches loaded".to_string();
    };
    let stat = stat_label.to_lowercase();
    match aggregate.mode {
        SeasonMode::Absolute => format!(
            "The season with the most {stat} was {} with {:.0} {stat}.",
            best.season, best.value
        ),
        SeasonMode::PerGame => format!(
            "The season with the highest {stat} per game was {} with an average of {} {stat} per game.",
            best.season,
            average_text(best.value)
        ),
    }
}

// Whole averages keep one decimal ("3.0"); others print as rounded.
fn average_text(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

pub fn compare_title(label: &str, reducer: Reducer) -> String {
    format!("{label} ({}) for Each Team", reducer.label())
}

pub fn season_title(label: &str, mode: SeasonMode) -> String {
    match mode {
        SeasonMode::Absolute => format!("{label} per Season"),
        SeasonMode::PerGame => format!("{label} per Game per Season"),
    }
}

pub fn team_columns_hint(stat: StatPair) -> String {
    Role::ALL
        .iter()
        .map(|role| format!("{} {}", role.label(), stat.column(*role)))
        .collect::<Vec<_>>()
        .join(" / ")
}

#[derive(Debug, Clone)]
pub struct ExportState {
    pub active: bool,
    pub done: bool,
    pub path: Option<PathBuf>,
    pub message: String,
    pub last_updated: Option<Instant>,
}

impl Default for ExportState {
    fn default() -> Self {
        Self::new()
    }
}

impl ExportState {
    pub fn new() -> Self {
        Self {
            active: false,
            done: false,
            path: None,
            message: String::new(),
            last_updated: None,
        }
    }

    pub fn finish(&mut self, path: Option<PathBuf>, message: impl Into<String>) {
        self.active = true;
        self.done = true;
        self.path = path;
        self.message = message.into();
        self.last_updated = Some(Instant::now());
    }

    pub fn clear_if_done_for(&mut self, now: Instant, keep_secs: u64) {
        if !self.active || !self.done {
            return;
        }
        let Some(last) = self.last_updated else {
            return;
        };
        if now.duration_since(last).as_secs() >= keep_secs {
            *self = Self::new();
        }
    }
}
