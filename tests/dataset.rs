use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use footval::dataset::ResultTable;
use footval::records::PlayerSeasonRecord;

fn record(player: &str, season: &str, stats: &[(&str, &str)]) -> PlayerSeasonRecord {
    let mut rec = PlayerSeasonRecord::new(player, season);
    for (col, val) in stats {
        rec.push_stat(*col, *val);
    }
    rec
}

fn key_set(table: &ResultTable) -> HashSet<(String, String)> {
    table
        .rows()
        .iter()
        .map(|row| (row.player.clone(), row.season.clone()))
        .collect()
}

#[test]
fn save_then_load_round_trips_keys_and_columns() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("players_stats.csv");

    let mut table = ResultTable::from_rows(vec![
        record("Bukayo Saka", "2021-2022", &[("Performance : Gls", "11")]),
        record("Bukayo Saka", "2022-2023", &[("Performance : Gls", "14")]),
        record(
            "Martin Odegaard",
            "2022-2023",
            &[("Performance : Gls", "15"), ("Performance : Ast", "7")],
        ),
    ]);
    table.save(&path).unwrap();

    let reloaded = ResultTable::load(&path).unwrap();
    assert_eq!(key_set(&reloaded), key_set(&table));
    assert_eq!(reloaded.columns(), table.columns());
    // Distinct columns stay distinct through the flatten/write/read cycle.
    assert_eq!(
        reloaded.columns(),
        ["Performance : Gls", "Performance : Ast"]
    );
}

#[test]
fn missing_file_loads_as_empty_table() {
    let table = ResultTable::load(&PathBuf::from("definitely/not/here.csv")).unwrap();
    assert!(table.is_empty());
}

#[test]
fn legacy_two_level_header_is_flattened_on_load() {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push("legacy_two_level.csv");

    let table = ResultTable::load(&path).unwrap();
    assert_eq!(table.len(), 3);
    assert_eq!(
        table.columns(),
        ["Squad", "Playing Time : MP", "Playing Time : Min", "Performance : Gls"]
    );
    let saka_2022 = table
        .rows()
        .iter()
        .find(|row| row.player == "Bukayo Saka" && row.season == "2022-2023")
        .unwrap();
    assert_eq!(saka_2022.stat("Performance : Gls"), Some("14"));
}

#[test]
fn merge_overrides_earlier_value_for_same_key() {
    let mut table = ResultTable::from_rows(vec![record(
        "A",
        "2021-2022",
        &[("Performance : Gls", "10")],
    )]);
    table.merge(vec![record("A", "2021-2022", &[("Performance : Gls", "12")])]);

    assert_eq!(table.len(), 1);
    assert_eq!(table.rows()[0].stat("Performance : Gls"), Some("12"));
}

#[test]
fn merge_twice_with_same_input_is_idempotent() {
    let newly = vec![
        record("A", "2021-2022", &[("Performance : Gls", "3")]),
        record("B", "2022-2023", &[("Performance : Gls", "8")]),
    ];
    let mut once = ResultTable::from_rows(vec![record(
        "A",
        "2020-2021",
        &[("Performance : Gls", "1")],
    )]);
    once.merge(newly.clone());
    let mut twice = once.clone();
    twice.merge(newly);

    assert_eq!(key_set(&once), key_set(&twice));
    assert_eq!(once.rows().len(), twice.rows().len());
}

#[test]
fn rewrite_over_existing_file_replaces_it() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("players_stats.csv");

    let table = ResultTable::from_rows(vec![record("A", "2021-2022", &[("Gls", "1")])]);
    table.save(&path).unwrap();
    let bigger = ResultTable::from_rows(vec![
        record("A", "2021-2022", &[("Gls", "2")]),
        record("B", "2021-2022", &[("Gls", "5")]),
    ]);
    bigger.save(&path).unwrap();

    let reloaded = ResultTable::load(&path).unwrap();
    assert_eq!(reloaded.len(), 2);
    let a = reloaded.rows().iter().find(|r| r.player == "A").unwrap();
    assert_eq!(a.stat("Gls"), Some("2"));
    // No stray temp file left behind.
    assert!(!fs::read_dir(dir.path())
        .unwrap()
        .any(|entry| entry.unwrap().file_name().to_string_lossy().ends_with(".tmp")));
}

#[test]
fn player_counts_are_distinct_per_season() {
    let table = ResultTable::from_rows(vec![
        record("A", "2021-2022", &[]),
        record("A", "2022-2023", &[]),
        record("B", "2022-2023", &[]),
    ]);
    let (total, per_season) = table.player_counts();
    assert_eq!(total, 2);
    assert_eq!(per_season.get("2021-2022"), Some(&1));
    assert_eq!(per_season.get("2022-2023"), Some(&2));
}
