use std::fs;

use laliga_terminal::dataset::{StatPair, season_range};
use laliga_terminal::demo_table::{DEMO_TEAMS, demo_table};
use laliga_terminal::export::{ExportViews, export_views, timestamped_path};
use laliga_terminal::state::season_headline;
use laliga_terminal::stats::{
    Reducer, SeasonMode, aggregate_by_season, compute_rate, rank_teams,
};

#[test]
fn workbook_has_a_row_per_view_entry() {
    let table = demo_table(&season_range(10, 12), &DEMO_TEAMS[..4], 5);
    let rate = compute_rate(&table, StatPair::FullTimeGoals, DEMO_TEAMS[0]);
    let ranking = rank_teams(&table, StatPair::Fouls, Reducer::Median);
    let seasons = aggregate_by_season(&table, StatPair::Corners, SeasonMode::PerGame);
    let headline = season_headline("Corners", &seasons);

    let dir = std::env::temp_dir().join(format!("laliga_export_test_{}", std::process::id()));
    let path = timestamped_path(&dir);
    let views = ExportViews {
        team: Some((&rate, "Goals per Game")),
        ranking: (&ranking, "Fouls per game"),
        seasons: (&seasons, "Corners"),
        headline: &headline,
    };

    let report = export_views(&path, &views).expect("export should succeed");
    assert_eq!(report.team_rows, 2);
    assert_eq!(report.ranking_rows, 4);
    assert_eq!(report.season_rows, 3);
    assert!(report.path.is_file());
    assert!(
        report
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with("laliga_analysis_") && n.ends_with(".xlsx"))
    );

    let _ = fs::remove_dir_all(&dir);
}
