use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};

use crate::dataset::ResultTable;
use crate::records::PlayerSeasonRecord;

/// Counters for the combine run summary.
#[derive(Debug, Clone)]
pub struct CombineSummary {
    pub inputs: usize,
    pub rows_in: usize,
    pub rows_out: usize,
    pub duplicates_dropped: usize,
    pub columns: usize,
}

/// Union several per-league tables into one: keep only the stat columns
/// common to every input (first input's order, duplicated names dropped),
/// concatenate rows in input order, drop duplicate (player, season) pairs
/// keeping the first occurrence, and sort by player.
pub fn combine_tables(tables: &[ResultTable]) -> (ResultTable, CombineSummary) {
    let mut summary = CombineSummary {
        inputs: tables.len(),
        rows_in: tables.iter().map(|table| table.len()).sum(),
        rows_out: 0,
        duplicates_dropped: 0,
        columns: 0,
    };
    let Some(first) = tables.first() else {
        return (ResultTable::default(), summary);
    };

    let mut common: Vec<String> = Vec::new();
    for column in first.columns() {
        if common.iter().any(|existing| existing == column) {
            continue;
        }
        if tables[1..]
            .iter()
            .all(|table| table.columns().iter().any(|other| other == column))
        {
            common.push(column.clone());
        }
    }
    summary.columns = common.len() + 2;

    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut rows: Vec<PlayerSeasonRecord> = Vec::new();
    for table in tables {
        for row in table.rows() {
            if !seen.insert((row.player.clone(), row.season.clone())) {
                summary.duplicates_dropped += 1;
                continue;
            }
            let mut record = PlayerSeasonRecord::new(row.player.clone(), row.season.clone());
            for column in &common {
                record.push_stat(column.clone(), row.stat(column).unwrap_or_default());
            }
            rows.push(record);
        }
    }
    summary.rows_out = rows.len();

    let mut combined = ResultTable::from_parts(common, rows);
    combined.sort_by_player();
    (combined, summary)
}

pub fn combine_files(inputs: &[PathBuf], out: &Path) -> Result<CombineSummary> {
    if inputs.is_empty() {
        return Err(anyhow!("no input tables given"));
    }
    let mut tables = Vec::with_capacity(inputs.len());
    for path in inputs {
        if !path.exists() {
            return Err(anyhow!("input table {} does not exist", path.display()));
        }
        let table =
            ResultTable::load(path).with_context(|| format!("load {}", path.display()))?;
        tables.push(table);
    }

    let (combined, summary) = combine_tables(&tables);
    combined
        .save(out)
        .with_context(|| format!("write combined table {}", out.display()))?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[(&str, &str, &[(&str, &str)])]) -> ResultTable {
        let mut out = Vec::new();
        for (player, season, stats) in rows {
            let mut rec = PlayerSeasonRecord::new(*player, *season);
            for (col, val) in *stats {
                rec.push_stat(*col, *val);
            }
            out.push(rec);
        }
        ResultTable::from_rows(out)
    }

    #[test]
    fn only_common_columns_survive() {
        let a = table(&[("A", "2021-2022", &[("Gls", "3"), ("Ast", "1")])]);
        let b = table(&[("B", "2021-2022", &[("Gls", "7")])]);
        let (combined, summary) = combine_tables(&[a, b]);
        assert_eq!(combined.columns(), ["Gls"]);
        assert_eq!(summary.columns, 3);
    }

    #[test]
    fn duplicate_keys_keep_first_input() {
        let a = table(&[("A", "2021-2022", &[("Gls", "3")])]);
        let b = table(&[("A", "2021-2022", &[("Gls", "99")])]);
        let (combined, summary) = combine_tables(&[a, b]);
        assert_eq!(combined.len(), 1);
        assert_eq!(combined.rows()[0].stat("Gls"), Some("3"));
        assert_eq!(summary.duplicates_dropped, 1);
    }

    #[test]
    fn output_is_sorted_by_player() {
        let a = table(&[
            ("Zidane", "2021-2022", &[("Gls", "5")]),
            ("Arnold", "2021-2022", &[("Gls", "2")]),
        ]);
        let (combined, _) = combine_tables(&[a]);
        assert_eq!(combined.rows()[0].player, "Arnold");
        assert_eq!(combined.rows()[1].player, "Zidane");
    }
}
