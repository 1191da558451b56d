use anyhow::{Context, Result};
use log::{info, warn};
use serde::Serialize;

use laliga_terminal::config::AppConfig;
use laliga_terminal::dataset::{MatchTable, StatPair, load_match_table};
use laliga_terminal::demo_table::{DEMO_TEAMS, demo_table};
use laliga_terminal::options::{
    self, COMPARE_STAT_OPTIONS, SEASON_STAT_OPTIONS, TEAM_STAT_OPTIONS,
};
use laliga_terminal::state::season_headline;
use laliga_terminal::stats::{
    RankedTeamTable, Reducer, SeasonAggregate, SeasonMode, TeamRate, aggregate_by_season,
    compute_rate, rank_teams,
};

const DEMO_SEED: u64 = 2010;

#[derive(Serialize)]
struct Report {
    matches: usize,
    team: Option<TeamRate>,
    ranking: RankedTeamTable,
    seasons: SeasonAggregate,
    headline: String,
}

fn main() -> Result<()> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let verbose = args.iter().any(|a| a == "--verbose" || a == "-v");
    let log_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let mut config = AppConfig::load();
    config.apply_args(&args);

    // Validate every selection before touching the data.
    let team_stat = parse_arg(&args, "--stat")
        .map(|raw| raw.parse::<StatPair>())
        .transpose()?
        .unwrap_or(TEAM_STAT_OPTIONS[0].stat);
    let compare_stat = parse_arg(&args, "--compare-stat")
        .map(|raw| raw.parse::<StatPair>())
        .transpose()?
        .unwrap_or(COMPARE_STAT_OPTIONS[0].stat);
    let metric = parse_arg(&args, "--metric")
        .map(|raw| raw.parse::<Reducer>())
        .transpose()?
        .unwrap_or(Reducer::Mean);
    let season_stat = parse_arg(&args, "--season-stat")
        .map(|raw| raw.parse::<StatPair>())
        .transpose()?
        .unwrap_or(SEASON_STAT_OPTIONS[0].stat);
    let mode = parse_arg(&args, "--mode")
        .map(|raw| raw.parse::<SeasonMode>())
        .transpose()?
        .unwrap_or(SeasonMode::Absolute);

    let table = load_table(&config)?;

    let team = match parse_arg(&args, "--team") {
        Some(raw) => Some(options::resolve_team(&table, &raw)?),
        None => table.home_teams().first().copied(),
    };

    let team_rate = team.map(|t| compute_rate(&table, team_stat, t));
    let ranking = rank_teams(&table, compare_stat, metric);
    let seasons = aggregate_by_season(&table, season_stat, mode);
    let headline = season_headline(
        options::label_in(&SEASON_STAT_OPTIONS, season_stat),
        &seasons,
    );

    let report = Report {
        matches: table.len(),
        team: team_rate,
        ranking,
        seasons,
        headline,
    };

    if args.iter().any(|a| a == "--json") {
        let json = serde_json::to_string_pretty(&report).context("serialize report")?;
        println!("{json}");
    } else {
        print_report(&report);
    }
    Ok(())
}

fn load_table(config: &AppConfig) -> Result<MatchTable> {
    if config.demo {
        return Ok(demo_table(&config.seasons(), &DEMO_TEAMS, DEMO_SEED));
    }
    let (table, summary) = load_match_table(&config.data_dir, &config.seasons());
    // Loader warnings are already logged per season; this is the roll-up.
    info!(
        "seasons: {}/{} from {} ({} matches, {} rows skipped)",
        summary.seasons_loaded.len(),
        summary.seasons_total,
        summary.data_dir.display(),
        summary.rows_loaded,
        summary.rows_skipped
    );
    if summary.nothing_loaded() {
        warn!("no matches loaded; pass --demo to use synthetic data");
        anyhow::bail!(
            "no season files could be read from {}",
            summary.data_dir.display()
        );
    }
    Ok(table)
}

fn print_report(report: &Report) {
    println!("Matches: {}", report.matches);

    if let Some(rate) = &report.team {
        println!();
        println!(
            "{} by {}",
            options::label_in(&TEAM_STAT_OPTIONS, rate.stat),
            rate.team
        );
        println!("Home: {}", rate.home);
        println!("Away: {}", rate.away);
    }

    println!();
    println!(
        "{} ({})",
        options::label_in(&COMPARE_STAT_OPTIONS, report.ranking.stat),
        report.ranking.reducer.label()
    );
    println!("{:>3} {:<22} {:>8} {:>8} {:>8}", "#", "Team", "Home", "Away", "Total");
    for (idx, row) in report.ranking.rows().iter().enumerate() {
        println!(
            "{:>3} {:<22} {:>8.2} {:>8.2} {:>8.2}",
            idx + 1,
            row.team,
            row.home,
            row.away,
            row.total
        );
    }

    println!();
    println!(
        "{} ({})",
        options::label_in(&SEASON_STAT_OPTIONS, report.seasons.stat),
        report.seasons.mode.label()
    );
    for point in &report.seasons.points {
        println!(
            "{:<12} {:>10.2}  ({} matches)",
            point.season.as_str(),
            point.value,
            point.matches
        );
    }
    println!("{}", report.headline);
}

fn parse_arg(args: &[String], name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&prefix) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == name {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(next.trim().to_string());
            }
        }
    }
    None
}
