use std::fs;
use std::path::PathBuf;

use footval::club::parse_player_list;
use footval::config::league_by_key;
use footval::error::ScrapeError;
use footval::league::parse_club_list;
use footval::player::parse_player_stats;

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn seasons(tokens: &[&str]) -> Vec<String> {
    tokens.iter().map(|t| t.to_string()).collect()
}

#[test]
fn parses_standings_fixture_into_clubs() {
    let raw = read_fixture("standings.html");
    let league = league_by_key("premier-league").unwrap();
    let clubs = parse_club_list(&raw, "https://fbref.com", league, "2022-2023")
        .expect("fixture should parse");

    assert_eq!(clubs.len(), 3);
    assert_eq!(clubs[0].name, "Manchester City");
    assert_eq!(
        clubs[1].url,
        "https://fbref.com/en/squads/18bb7c10/2022-2023/all_comps/Arsenal-Stats-All-Competitions"
    );
}

#[test]
fn standings_for_wrong_season_is_not_found() {
    let raw = read_fixture("standings.html");
    let league = league_by_key("premier-league").unwrap();
    let err = parse_club_list(&raw, "https://fbref.com", league, "2019-2020").unwrap_err();
    assert!(matches!(err, ScrapeError::NotFound { .. }));
}

#[test]
fn parses_squad_fixture_into_players() {
    let raw = read_fixture("squad.html");
    let players = parse_player_list(&raw, "https://fbref.com", "stats_standard_combined", "Arsenal");

    assert_eq!(players.len(), 2);
    assert_eq!(players[0].name, "Bukayo Saka");
    assert_eq!(
        players[0].url,
        "https://fbref.com/en/players/bc7dc64d/all_comps/Bukayo-Saka-Stats---All-Competitions"
    );
    assert_eq!(players[1].name, "Martin Odegaard");
}

#[test]
fn squad_fixture_with_wrong_table_id_is_empty() {
    let raw = read_fixture("squad.html");
    let players = parse_player_list(&raw, "https://fbref.com", "stats_standard_13", "Arsenal");
    assert!(players.is_empty());
}

#[test]
fn parses_player_fixture_with_season_filter() {
    let raw = read_fixture("player.html");
    let records = parse_player_stats(
        &raw,
        "Bukayo Saka",
        &seasons(&["2021-2022", "2022-2023", "2023-2024"]),
    );

    // 2009-2010 is off the allow-list, "Career" is not a season token, and the
    // repeated mid-table header row must not leak through.
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].season, "2021-2022");
    assert_eq!(records[0].player, "Bukayo Saka");
    assert_eq!(records[0].stat("Performance : Gls"), Some("11"));
    assert_eq!(records[1].season, "2022-2023");
    assert_eq!(records[1].stat("Playing Time : Min"), Some("3172"));
    assert_eq!(records[1].stat("Squad"), Some("Arsenal"));
}

#[test]
fn player_fixture_falls_back_to_domestic_table() {
    let raw = read_fixture("player_fallback.html");
    let records = parse_player_stats(&raw, "Naoufel El Hannach", &seasons(&["2023-2024"]));
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].stat("Squad"), Some("Paris S-G"));
}

#[test]
fn player_page_without_stats_table_is_empty() {
    let records = parse_player_stats(
        "<html><body><h1>404</h1></body></html>",
        "Ghost Player",
        &seasons(&["2022-2023"]),
    );
    assert!(records.is_empty());
}
