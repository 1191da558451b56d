use std::env;
use std::path::PathBuf;

use crate::dataset::{DEFAULT_FIRST_SEASON, DEFAULT_LAST_SEASON, SeasonId, season_range};

const CACHE_DIR: &str = "laliga_terminal";
const DEFAULT_DATA_DIR: &str = "spanish-la-liga_zip/data";
// Season labels carry two-digit years, so the last usable start is 98 (`season-9899`).
pub const MAX_START_SEASON: u32 = 98;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub first_season: u32,
    pub last_season: u32,
    pub export_dir: PathBuf,
    pub league_title: String,
    pub demo: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            first_season: DEFAULT_FIRST_SEASON,
            last_season: DEFAULT_LAST_SEASON,
            export_dir: PathBuf::from("."),
            league_title: "La Liga".to_string(),
            demo: false,
        }
    }
}

impl AppConfig {
    /// Loads `.env.local` and `.env` (if present) before reading the process environment.
    pub fn load() -> Self {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| {
            lookup(key).and_then(|val| {
                let trimmed = val.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            })
        };
        let defaults = Self::default();

        let season = |key: &str| {
            get(key)
                .and_then(|val| val.parse::<u32>().ok())
                .filter(|start| *start <= MAX_START_SEASON)
        };
        let first_season = season("LALIGA_FIRST_SEASON").unwrap_or(defaults.first_season);
        let last_season = season("LALIGA_LAST_SEASON")
            .unwrap_or(defaults.last_season)
            .max(first_season);

        Self {
            data_dir: get("LALIGA_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            first_season,
            last_season,
            export_dir: get("LALIGA_EXPORT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.export_dir),
            league_title: get("LALIGA_TITLE").unwrap_or(defaults.league_title),
            demo: get("LALIGA_DEMO").is_some_and(|val| parse_bool(&val)),
        }
    }

    pub fn seasons(&self) -> Vec<SeasonId> {
        season_range(self.first_season, self.last_season)
    }

    /// Applies `--data=<dir>` / `--data <dir>` and `--demo` from the command line.
    pub fn apply_args(&mut self, args: &[String]) {
        for (idx, arg) in args.iter().enumerate() {
            if arg == "--demo" {
                self.demo = true;
            }
            if let Some(path) = arg.strip_prefix("--data=") {
                if !path.trim().is_empty() {
                    self.data_dir = PathBuf::from(path.trim());
                }
            }
            if arg == "--data" {
                if let Some(next) = args.get(idx + 1).filter(|v| !v.trim().is_empty()) {
                    self.data_dir = PathBuf::from(next);
                }
            }
        }
    }
}

fn parse_bool(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

pub fn app_cache_dir() -> Option<PathBuf> {
    if let Ok(base) = env::var("XDG_CACHE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(CACHE_DIR));
        }
    }
    let home = env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(CACHE_DIR))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn env_overrides_and_defaults() {
        let vars = HashMap::from([
            ("LALIGA_DATA_DIR", "/data/liga"),
            ("LALIGA_FIRST_SEASON", "12"),
            ("LALIGA_LAST_SEASON", "nope"),
            ("LALIGA_DEMO", "yes"),
            ("LALIGA_TITLE", "  "),
        ]);
        let cfg = AppConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(cfg.data_dir, PathBuf::from("/data/liga"));
        assert_eq!(cfg.first_season, 12);
        assert_eq!(cfg.last_season, DEFAULT_LAST_SEASON);
        assert!(cfg.demo);
        assert_eq!(cfg.league_title, "La Liga");
        assert_eq!(cfg.seasons().len(), 7);
    }

    #[test]
    fn out_of_range_seasons_fall_back_to_defaults() {
        let vars = HashMap::from([
            ("LALIGA_FIRST_SEASON", "4294967295"),
            ("LALIGA_LAST_SEASON", "4000000000"),
        ]);
        let cfg = AppConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(cfg.first_season, DEFAULT_FIRST_SEASON);
        assert_eq!(cfg.last_season, DEFAULT_LAST_SEASON);
        assert_eq!(cfg.seasons().len(), 9);

        let vars = HashMap::from([("LALIGA_FIRST_SEASON", "98"), ("LALIGA_LAST_SEASON", "99")]);
        let cfg = AppConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(cfg.first_season, 98);
        assert_eq!(cfg.last_season, 98);
        let labels: Vec<String> = cfg.seasons().iter().map(|s| s.to_string()).collect();
        assert_eq!(labels, ["season-9899"]);
    }

    #[test]
    fn cli_args_override_data_dir() {
        let mut cfg = AppConfig::default();
        cfg.apply_args(&["--data".to_string(), "csvs".to_string()]);
        assert_eq!(cfg.data_dir, PathBuf::from("csvs"));
        cfg.apply_args(&["--data=other".to_string(), "--demo".to_string()]);
        assert_eq!(cfg.data_dir, PathBuf::from("other"));
        assert!(cfg.demo);
    }
}
