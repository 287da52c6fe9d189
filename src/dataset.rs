use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use csv::{ReaderBuilder, WriterBuilder};

use crate::html::{flatten_headers, is_placeholder_group};
use crate::records::{PlayerSeasonRecord, compare_seasons};

pub const PLAYER_COLUMN: &str = "Player";
pub const SEASON_COLUMN: &str = "Season";

/// The durable per-league table: one row per (player, season), identity
/// columns first, then the union of stat columns in first-seen order.
///
/// Lifecycle: loaded at crawl start (absent file means empty), extended in
/// memory, deduplicated last-write-wins, rewritten wholesale at the end.
#[derive(Debug, Clone, Default)]
pub struct ResultTable {
    columns: Vec<String>,
    rows: Vec<PlayerSeasonRecord>,
}

impl ResultTable {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[PlayerSeasonRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn from_rows(rows: Vec<PlayerSeasonRecord>) -> Self {
        let mut table = Self::default();
        table.merge(rows);
        table
    }

    /// Assemble a table whose rows were already restricted and deduplicated
    /// by the caller (the combiner's keep-first path).
    pub fn from_parts(columns: Vec<String>, rows: Vec<PlayerSeasonRecord>) -> Self {
        Self { columns, rows }
    }

    /// Load a result CSV. Accepts both the single-level header this crate
    /// writes and the legacy two-level export (group row + metric row, the
    /// group cells being "Unnamed: ..." placeholders for identity columns).
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)
            .with_context(|| format!("open result table {}", path.display()))?;

        let mut lines: Vec<Vec<String>> = Vec::new();
        for record in reader.records() {
            let record = record.context("read result table row")?;
            lines.push(record.iter().map(|cell| cell.to_string()).collect());
        }
        Self::from_lines(lines)
    }

    fn from_lines(lines: Vec<Vec<String>>) -> Result<Self> {
        let Some(first) = lines.first() else {
            return Ok(Self::default());
        };

        // A two-level header starts with an auto-generated group label where
        // the single-level variant would say "Player".
        let two_level = first
            .first()
            .is_some_and(|cell| cell != PLAYER_COLUMN && is_placeholder_group(cell));
        let (columns, data_start) = if two_level {
            let metric = lines
                .get(1)
                .context("two-level header is missing its metric row")?;
            (flatten_headers(first, metric), 2)
        } else {
            (first.clone(), 1)
        };

        let player_idx = columns
            .iter()
            .position(|col| col == PLAYER_COLUMN)
            .context("result table has no Player column")?;
        let season_idx = columns
            .iter()
            .position(|col| col == SEASON_COLUMN)
            .context("result table has no Season column")?;

        let stat_columns: Vec<(usize, String)> = columns
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != player_idx && *idx != season_idx)
            .map(|(idx, col)| (idx, col.clone()))
            .collect();

        let mut rows = Vec::with_capacity(lines.len().saturating_sub(data_start));
        for line in &lines[data_start..] {
            let player = line.get(player_idx).cloned().unwrap_or_default();
            let season = line.get(season_idx).cloned().unwrap_or_default();
            if player.is_empty() && season.is_empty() {
                continue;
            }
            let mut record = PlayerSeasonRecord::new(player, season);
            for (idx, col) in &stat_columns {
                record.push_stat(col.clone(), line.get(*idx).cloned().unwrap_or_default());
            }
            rows.push(record);
        }

        Ok(Self {
            columns: stat_columns.into_iter().map(|(_, col)| col).collect(),
            rows,
        })
    }

    /// Append newly scraped rows and drop duplicate (player, season) pairs,
    /// keeping the most recently appended copy.
    pub fn merge(&mut self, newly_scraped: Vec<PlayerSeasonRecord>) {
        for record in newly_scraped {
            self.absorb_columns(&record);
            self.rows.push(record);
        }
        self.dedupe_last_wins();
    }

    fn absorb_columns(&mut self, record: &PlayerSeasonRecord) {
        for (column, _) in &record.stats {
            if !self.columns.iter().any(|existing| existing == column) {
                self.columns.push(column.clone());
            }
        }
    }

    fn dedupe_last_wins(&mut self) {
        let mut seen: HashSet<(String, String)> = HashSet::with_capacity(self.rows.len());
        let mut keep = vec![false; self.rows.len()];
        for idx in (0..self.rows.len()).rev() {
            let row = &self.rows[idx];
            if seen.insert((row.player.clone(), row.season.clone())) {
                keep[idx] = true;
            }
        }
        let mut idx = 0;
        self.rows.retain(|_| {
            let kept = keep[idx];
            idx += 1;
            kept
        });
    }

    /// Atomic rewrite of the persisted location (write aside, then rename).
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create data directory {}", parent.display()))?;
        }
        let tmp = path.with_extension("csv.tmp");
        let mut writer = WriterBuilder::new()
            .from_path(&tmp)
            .with_context(|| format!("create result table {}", tmp.display()))?;

        let mut header = Vec::with_capacity(self.columns.len() + 2);
        header.push(PLAYER_COLUMN.to_string());
        header.push(SEASON_COLUMN.to_string());
        header.extend(self.columns.iter().cloned());
        writer.write_record(&header).context("write header")?;

        for row in &self.rows {
            let mut line = Vec::with_capacity(header.len());
            line.push(row.player.clone());
            line.push(row.season.clone());
            for column in &self.columns {
                line.push(row.stat(column).unwrap_or_default().to_string());
            }
            writer.write_record(&line).context("write row")?;
        }
        writer.flush().context("flush result table")?;
        drop(writer);

        fs::rename(&tmp, path)
            .with_context(|| format!("swap result table into {}", path.display()))?;
        Ok(())
    }

    /// Display names already captured, the crawl's skip-list.
    pub fn known_players(&self) -> HashSet<String> {
        self.rows.iter().map(|row| row.player.clone()).collect()
    }

    /// Distinct players overall and per season.
    pub fn player_counts(&self) -> (usize, BTreeMap<String, usize>) {
        let mut all: HashSet<&str> = HashSet::new();
        let mut per_season: BTreeMap<String, HashSet<&str>> = BTreeMap::new();
        for row in &self.rows {
            all.insert(row.player.as_str());
            per_season
                .entry(row.season.clone())
                .or_default()
                .insert(row.player.as_str());
        }
        let counts = per_season
            .into_iter()
            .map(|(season, players)| (season, players.len()))
            .collect();
        (all.len(), counts)
    }

    pub fn sort_by_player(&mut self) {
        self.rows.sort_by(|a, b| {
            a.player
                .cmp(&b.player)
                .then_with(|| compare_seasons(&a.season, &b.season))
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(player: &str, season: &str, goals: &str) -> PlayerSeasonRecord {
        let mut rec = PlayerSeasonRecord::new(player, season);
        rec.push_stat("Performance : Gls", goals);
        rec
    }

    #[test]
    fn merge_keeps_latest_copy() {
        let mut table = ResultTable::from_rows(vec![record("A", "2021-2022", "10")]);
        table.merge(vec![record("A", "2021-2022", "12")]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].stat("Performance : Gls"), Some("12"));
    }

    #[test]
    fn merge_is_idempotent() {
        let rows = vec![record("A", "2021-2022", "10"), record("B", "2021-2022", "3")];
        let mut table = ResultTable::from_rows(rows.clone());
        let first_pass: Vec<_> = table.rows().to_vec();
        table.merge(rows);
        assert_eq!(table.rows(), first_pass.as_slice());
    }

    #[test]
    fn column_union_preserves_first_seen_order() {
        let mut table = ResultTable::from_rows(vec![record("A", "2021-2022", "10")]);
        let mut extra = PlayerSeasonRecord::new("B", "2021-2022");
        extra.push_stat("Performance : Ast", "5");
        table.merge(vec![extra]);
        assert_eq!(
            table.columns(),
            ["Performance : Gls", "Performance : Ast"]
        );
    }
}
