use laliga_terminal::dataset::{MatchRecord, MatchTable, Role, SeasonId, StatPair, season_range};
use laliga_terminal::demo_table::{DEMO_TEAMS, demo_table};
use laliga_terminal::stats::{
    Reducer, SeasonMode, aggregate_by_season, compute_rate, compute_stat_per_game, rank_teams,
};

fn goals(season: &str, home: &str, away: &str, fthg: u32, ftag: u32) -> MatchRecord {
    MatchRecord::new(SeasonId::new(season), home, away).with_stat(
        StatPair::FullTimeGoals,
        Some(fthg),
        Some(ftag),
    )
}

fn two_match_table() -> MatchTable {
    MatchTable::new(vec![
        goals("season-1011", "TeamA", "TeamB", 2, 1),
        goals("season-1011", "TeamB", "TeamA", 0, 0),
    ])
}

#[test]
fn rate_splits_home_and_away_games() {
    let table = two_match_table();
    let rate = compute_rate(&table, StatPair::FullTimeGoals, "TeamA");
    assert_eq!(rate.team, "TeamA");
    assert_eq!(rate.home, 2.0);
    assert_eq!(rate.away, 0.0);

    let rate = compute_rate(&table, StatPair::FullTimeGoals, "TeamB");
    assert_eq!(rate.home, 0.0);
    assert_eq!(rate.away, 1.0);
}

#[test]
fn rate_for_team_without_games_is_zero() {
    let table = two_match_table();
    let rate = compute_rate(&table, StatPair::FullTimeGoals, "Nobody");
    assert_eq!(rate.home, 0.0);
    assert_eq!(rate.away, 0.0);

    let empty = MatchTable::default();
    assert_eq!(
        compute_stat_per_game(&empty, Role::Home, StatPair::Fouls, "TeamA"),
        0.0
    );
}

#[test]
fn rate_is_rounded_to_two_places() {
    let table = MatchTable::new(vec![
        goals("season-1011", "TeamA", "TeamB", 1, 0),
        goals("season-1011", "TeamA", "TeamC", 0, 0),
        goals("season-1011", "TeamA", "TeamD", 0, 0),
    ]);
    let rate = compute_rate(&table, StatPair::FullTimeGoals, "TeamA");
    assert_eq!(rate.home, 0.33);
}

#[test]
fn gaps_count_as_zero_in_per_game_rate() {
    let table = MatchTable::new(vec![
        goals("season-1011", "TeamA", "TeamB", 3, 0),
        MatchRecord::new(SeasonId::new("season-1011"), "TeamA", "TeamC").with_stat(
            StatPair::FullTimeGoals,
            None,
            Some(1),
        ),
    ]);
    let rate = compute_rate(&table, StatPair::FullTimeGoals, "TeamA");
    assert_eq!(rate.home, 1.5);
}

#[test]
fn sum_ranking_orders_by_total() {
    let table = two_match_table();
    let ranked = rank_teams(&table, StatPair::FullTimeGoals, Reducer::Sum);
    let teams: Vec<&str> = ranked.rows().iter().map(|r| r.team.as_str()).collect();
    assert_eq!(teams, ["TeamA", "TeamB"]);

    let a = ranked.get("TeamA").expect("TeamA ranked");
    assert_eq!((a.home, a.away, a.total), (2.0, 0.0, 2.0));
    let b = ranked.get("TeamB").expect("TeamB ranked");
    assert_eq!((b.home, b.away, b.total), (0.0, 1.0, 1.0));
}

#[test]
fn ranking_includes_teams_seen_in_one_role_only() {
    let table = MatchTable::new(vec![
        goals("season-1011", "HomeOnly", "Both", 1, 2),
        goals("season-1011", "Both", "AwayOnly", 0, 3),
    ]);
    let ranked = rank_teams(&table, StatPair::FullTimeGoals, Reducer::Mean);
    assert_eq!(ranked.len(), 3);

    let home_only = ranked.get("HomeOnly").expect("home-only team");
    assert_eq!(home_only.away, 0.0);
    assert_eq!(home_only.total, home_only.home);

    let away_only = ranked.get("AwayOnly").expect("away-only team");
    assert_eq!(away_only.home, 0.0);
    assert_eq!(away_only.total, 3.0);
    assert_eq!(ranked.position("AwayOnly"), Some(0));
}

#[test]
fn ranking_totals_never_increase() {
    let table = demo_table(&season_range(10, 11), &DEMO_TEAMS, 7);
    for stat in StatPair::ALL {
        for reducer in Reducer::ALL {
            let ranked = rank_teams(&table, stat, reducer);
            assert!(
                ranked
                    .rows()
                    .windows(2)
                    .all(|w| w[0].total >= w[1].total),
                "{stat:?}/{reducer:?} not sorted"
            );
            for row in ranked.rows() {
                assert_eq!(row.total, row.home + row.away);
            }
        }
    }
}

#[test]
fn sum_ranking_preserves_column_totals() {
    let table = demo_table(&season_range(10, 10), &DEMO_TEAMS[..6], 11);
    let ranked = rank_teams(&table, StatPair::Corners, Reducer::Sum);
    let home_column: u32 = table
        .iter()
        .filter_map(|m| m.stat(StatPair::Corners, Role::Home))
        .sum();
    let away_column: u32 = table
        .iter()
        .filter_map(|m| m.stat(StatPair::Corners, Role::Away))
        .sum();
    assert_eq!(ranked.home_sum(), f64::from(home_column));
    assert_eq!(ranked.away_sum(), f64::from(away_column));
}

#[test]
fn equal_totals_keep_alphabetical_order() {
    let table = MatchTable::new(vec![
        goals("season-1011", "Zaragoza", "Betis", 1, 1),
        goals("season-1011", "Almeria", "Getafe", 1, 1),
    ]);
    let ranked = rank_teams(&table, StatPair::FullTimeGoals, Reducer::Sum);
    let teams: Vec<&str> = ranked.rows().iter().map(|r| r.team.as_str()).collect();
    assert_eq!(teams, ["Almeria", "Betis", "Getafe", "Zaragoza"]);
}

#[test]
fn max_ranking_sums_per_role_extrema() {
    // TeamA's best home game and best away game are different matches.
    let table = MatchTable::new(vec![
        goals("season-1011", "TeamA", "TeamB", 4, 0),
        goals("season-1011", "TeamA", "TeamB", 1, 0),
        goals("season-1011", "TeamB", "TeamA", 0, 3),
    ]);
    let max = rank_teams(&table, StatPair::FullTimeGoals, Reducer::Max);
    assert_eq!(max.get("TeamA").map(|r| r.total), Some(7.0));

    let min = rank_teams(&table, StatPair::FullTimeGoals, Reducer::Min);
    let a = min.get("TeamA").expect("TeamA ranked");
    assert_eq!((a.home, a.away, a.total), (1.0, 3.0, 4.0));
}

#[test]
fn median_ranking_uses_middle_value() {
    let table = MatchTable::new(vec![
        goals("season-1011", "TeamA", "TeamB", 0, 0),
        goals("season-1011", "TeamA", "TeamB", 5, 0),
        goals("season-1011", "TeamA", "TeamB", 2, 0),
    ]);
    let ranked = rank_teams(&table, StatPair::FullTimeGoals, Reducer::Median);
    assert_eq!(ranked.get("TeamA").map(|r| r.home), Some(2.0));
}

#[test]
fn ranking_empty_table_is_empty() {
    let ranked = rank_teams(&MatchTable::default(), StatPair::Fouls, Reducer::Sum);
    assert!(ranked.is_empty());
}

#[test]
fn absolute_season_total_counts_both_sides() {
    let table = two_match_table();
    let agg = aggregate_by_season(&table, StatPair::FullTimeGoals, SeasonMode::Absolute);
    assert_eq!(agg.points.len(), 1);
    assert_eq!(agg.points[0].value, 3.0);
    assert_eq!(agg.points[0].matches, 2);

    let best = agg.best.expect("one season present");
    assert_eq!(best.season.as_str(), "season-1011");
    assert_eq!(best.value, 3.0);
}

#[test]
fn per_game_equals_absolute_over_match_count() {
    let table = demo_table(&season_range(10, 13), &DEMO_TEAMS[..8], 3);
    for stat in StatPair::ALL {
        let absolute = aggregate_by_season(&table, stat, SeasonMode::Absolute);
        let per_game = aggregate_by_season(&table, stat, SeasonMode::PerGame);
        assert_eq!(absolute.points.len(), per_game.points.len());
        for (abs, pg) in absolute.points.iter().zip(&per_game.points) {
            assert_eq!(abs.season, pg.season);
            assert!((abs.value / abs.matches as f64 - pg.value).abs() < 1e-9);
        }
    }
}

#[test]
fn per_game_best_is_rounded() {
    let table = MatchTable::new(vec![
        goals("season-1011", "TeamA", "TeamB", 1, 0),
        goals("season-1011", "TeamB", "TeamA", 0, 0),
        goals("season-1011", "TeamA", "TeamC", 0, 0),
    ]);
    let agg = aggregate_by_season(&table, StatPair::FullTimeGoals, SeasonMode::PerGame);
    assert_eq!(agg.best.map(|b| b.value), Some(0.33));
}

#[test]
fn season_tie_goes_to_first_season() {
    let table = MatchTable::new(vec![
        goals("season-1213", "TeamA", "TeamB", 2, 0),
        goals("season-1011", "TeamA", "TeamB", 1, 1),
        goals("season-1112", "TeamA", "TeamB", 0, 1),
    ]);
    let agg = aggregate_by_season(&table, StatPair::FullTimeGoals, SeasonMode::Absolute);
    let seasons: Vec<&str> = agg.points.iter().map(|p| p.season.as_str()).collect();
    assert_eq!(seasons, ["season-1011", "season-1112", "season-1213"]);
    assert_eq!(
        agg.best.map(|b| b.season),
        Some(SeasonId::new("season-1011"))
    );
}

#[test]
fn empty_table_has_no_best_season() {
    let agg = aggregate_by_season(
        &MatchTable::default(),
        StatPair::FullTimeGoals,
        SeasonMode::Absolute,
    );
    assert!(agg.points.is_empty());
    assert!(agg.best.is_none());
}

#[test]
fn repeated_calls_give_identical_results() {
    let table = demo_table(&season_range(10, 12), &DEMO_TEAMS[..10], 99);
    assert_eq!(
        rank_teams(&table, StatPair::ShotsOnTarget, Reducer::Median),
        rank_teams(&table, StatPair::ShotsOnTarget, Reducer::Median)
    );
    assert_eq!(
        aggregate_by_season(&table, StatPair::Fouls, SeasonMode::PerGame),
        aggregate_by_season(&table, StatPair::Fouls, SeasonMode::PerGame)
    );
    assert_eq!(
        compute_rate(&table, StatPair::Corners, DEMO_TEAMS[0]),
        compute_rate(&table, StatPair::Corners, DEMO_TEAMS[0])
    );
}
