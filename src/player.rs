use std::collections::HashSet;

use scraper::Html;
use tracing::{debug, warn};

use crate::club::PlayerRef;
use crate::config::{PLAYER_TABLE_FALLBACK_ID, PLAYER_TABLE_ID, ScrapeConfig};
use crate::error::ScrapeResult;
use crate::fetch::Fetcher;
use crate::html::{StatTable, find_table, parse_stat_table};
use crate::records::PlayerSeasonRecord;

/// Fetch a player's season rows, unless the display name is already known.
/// The skip-list check happens before any network call.
///
/// Parsing trouble is never fatal here: a page without the expected tables,
/// or with a malformed one, yields an empty set with a warning.
pub fn fetch_player_stats(
    fetcher: &Fetcher,
    config: &ScrapeConfig,
    player: &PlayerRef,
    known: &HashSet<String>,
) -> ScrapeResult<Vec<PlayerSeasonRecord>> {
    if known.contains(&player.name) {
        debug!("skipping {} (already in the dataset)", player.name);
        return Ok(Vec::new());
    }
    let body = fetcher.fetch_page(&player.url)?;
    Ok(parse_player_stats(
        &body,
        &player.name,
        &config.seasons_to_keep,
    ))
}

pub fn parse_player_stats(
    html: &str,
    player_name: &str,
    seasons_to_keep: &[String],
) -> Vec<PlayerSeasonRecord> {
    let doc = Html::parse_document(html);
    let Some(table) =
        find_table(&doc, PLAYER_TABLE_ID).or_else(|| find_table(&doc, PLAYER_TABLE_FALLBACK_ID))
    else {
        warn!("no stats table for {player_name}");
        return Vec::new();
    };

    match parse_stat_table(table) {
        Ok(stat_table) => rows_to_records(&stat_table, player_name, seasons_to_keep),
        Err(err) => {
            warn!("error reading stats table for {player_name}: {err}");
            Vec::new()
        }
    }
}

/// Keep only rows whose season token is on the allow-list; everything else
/// (repeated headers, career totals, "2 Clubs" summaries) is dropped.
fn rows_to_records(
    table: &StatTable,
    player_name: &str,
    seasons_to_keep: &[String],
) -> Vec<PlayerSeasonRecord> {
    let Some(season_idx) = table
        .columns
        .iter()
        .position(|col| col == crate::dataset::SEASON_COLUMN)
    else {
        warn!("stats table for {player_name} has no Season column");
        return Vec::new();
    };

    let mut records = Vec::new();
    for row in &table.rows {
        let Some(season) = row.get(season_idx) else {
            continue;
        };
        if !seasons_to_keep.iter().any(|allowed| allowed == season) {
            continue;
        }
        let mut record = PlayerSeasonRecord::new(player_name, season.clone());
        for (idx, column) in table.columns.iter().enumerate() {
            if idx == season_idx {
                continue;
            }
            record.push_stat(column.clone(), row.get(idx).cloned().unwrap_or_default());
        }
        records.push(record);
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seasons(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn disallowed_season_rows_are_excluded() {
        let table = StatTable {
            columns: vec!["Season".to_string(), "Performance : Gls".to_string()],
            rows: vec![
                vec!["2021-2022".to_string(), "11".to_string()],
                vec!["Career".to_string(), "208".to_string()],
                vec!["2009-2010".to_string(), "4".to_string()],
            ],
        };
        let records = rows_to_records(&table, "Test Player", &seasons(&["2021-2022"]));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].season, "2021-2022");
        assert_eq!(records[0].player, "Test Player");
    }

    #[test]
    fn season_column_is_not_duplicated_into_stats() {
        let table = StatTable {
            columns: vec!["Season".to_string(), "Squad".to_string()],
            rows: vec![vec!["2021-2022".to_string(), "Arsenal".to_string()]],
        };
        let records = rows_to_records(&table, "Test Player", &seasons(&["2021-2022"]));
        assert_eq!(records[0].stats, vec![("Squad".to_string(), "Arsenal".to_string())]);
    }

    #[test]
    fn page_without_tables_is_soft_empty() {
        let records = parse_player_stats("<html></html>", "Test Player", &seasons(&["2021-2022"]));
        assert!(records.is_empty());
    }
}
