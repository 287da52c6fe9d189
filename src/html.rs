use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use crate::error::{ScrapeError, ScrapeResult};

static TABLE: Lazy<Selector> = Lazy::new(|| Selector::parse("table").expect("selector"));
static HEAD_ROW: Lazy<Selector> = Lazy::new(|| Selector::parse("thead tr").expect("selector"));
static BODY_ROW: Lazy<Selector> = Lazy::new(|| Selector::parse("tbody tr").expect("selector"));
static CELL: Lazy<Selector> = Lazy::new(|| Selector::parse("th, td").expect("selector"));

/// Group labels the source auto-generates for ungrouped columns. Pandas-era
/// exports spell them "Unnamed: ...", live pages leave them empty.
const PLACEHOLDER_PREFIX: &str = "Unnamed";

/// A statistics table lifted out of the page: flattened column names plus the
/// raw cell text of each data row.
#[derive(Debug, Clone, PartialEq)]
pub struct StatTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Locate a table by its `id` attribute. Ids are matched verbatim rather than
/// through a CSS selector, since season-templated ids contain characters that
/// would need escaping.
pub fn find_table<'a>(doc: &'a Html, table_id: &str) -> Option<ElementRef<'a>> {
    doc.select(&TABLE)
        .find(|table| table.value().id() == Some(table_id))
}

/// Read a table into columns and rows. Handles the site's one- and two-row
/// headers; with two rows the upper one is the group label row (expanded
/// through colspans) and the lower one the metric names.
pub fn parse_stat_table(table: ElementRef<'_>) -> ScrapeResult<StatTable> {
    let header_rows: Vec<Vec<String>> = table
        .select(&HEAD_ROW)
        .map(|row| expand_header_cells(row))
        .collect();

    let columns = match header_rows.len() {
        0 => return Err(ScrapeError::parse("table has no header rows")),
        1 => header_rows[0].clone(),
        n => flatten_headers(&header_rows[n - 2], &header_rows[n - 1]),
    };
    if columns.is_empty() {
        return Err(ScrapeError::parse("table header has no columns"));
    }

    let mut rows = Vec::new();
    for row in table.select(&BODY_ROW) {
        // Long tables repeat the header mid-body; those rows carry a marker class.
        if row.value().classes().any(|class| class == "thead") {
            continue;
        }
        let cells: Vec<String> = row.select(&CELL).map(|cell| cell_text(cell)).collect();
        if cells.is_empty() {
            continue;
        }
        rows.push(cells);
    }

    Ok(StatTable { columns, rows })
}

/// Flatten a (group, metric) header pair into single names: a placeholder or
/// empty group keeps the metric name alone, anything else joins the two.
pub fn flatten_headers(groups: &[String], metrics: &[String]) -> Vec<String> {
    metrics
        .iter()
        .enumerate()
        .map(|(idx, metric)| {
            let group = groups.get(idx).map(String::as_str).unwrap_or("");
            join_header(group, metric)
        })
        .collect()
}

pub fn join_header(group: &str, metric: &str) -> String {
    let group = group.trim();
    if group.is_empty() || group.starts_with(PLACEHOLDER_PREFIX) {
        metric.trim().to_string()
    } else {
        format!("{group} : {}", metric.trim())
    }
}

/// Inverse check used when loading a two-level CSV header.
pub fn is_placeholder_group(group: &str) -> bool {
    let group = group.trim();
    group.is_empty() || group.starts_with(PLACEHOLDER_PREFIX)
}

pub fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().collect::<String>().trim().to_string()
}

fn expand_header_cells(row: ElementRef<'_>) -> Vec<String> {
    let mut out = Vec::new();
    for cell in row.select(&CELL) {
        let text = cell_text(cell);
        let span = cell
            .value()
            .attr("colspan")
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(1)
            .max(1);
        for _ in 0..span {
            out.push(text.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
        <table id="stats_demo">
          <thead>
            <tr><th colspan="2"></th><th colspan="2">Performance</th></tr>
            <tr><th>Season</th><th>Squad</th><th>Gls</th><th>Ast</th></tr>
          </thead>
          <tbody>
            <tr><th>2021-2022</th><td>Arsenal</td><td>11</td><td>7</td></tr>
            <tr class="thead"><th>Season</th><td>Squad</td><td>Gls</td><td>Ast</td></tr>
            <tr><th>2022-2023</th><td>Arsenal</td><td>14</td><td>11</td></tr>
          </tbody>
        </table>
        </body></html>"#;

    #[test]
    fn finds_table_by_verbatim_id() {
        let doc = Html::parse_document(PAGE);
        assert!(find_table(&doc, "stats_demo").is_some());
        assert!(find_table(&doc, "stats_other").is_none());
    }

    #[test]
    fn two_row_header_is_flattened_through_colspans() {
        let doc = Html::parse_document(PAGE);
        let table = parse_stat_table(find_table(&doc, "stats_demo").unwrap()).unwrap();
        assert_eq!(
            table.columns,
            vec!["Season", "Squad", "Performance : Gls", "Performance : Ast"]
        );
    }

    #[test]
    fn repeated_header_rows_are_dropped_from_body() {
        let doc = Html::parse_document(PAGE);
        let table = parse_stat_table(find_table(&doc, "stats_demo").unwrap()).unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1], vec!["2022-2023", "Arsenal", "14", "11"]);
    }

    #[test]
    fn placeholder_groups_keep_metric_name() {
        assert_eq!(join_header("Unnamed: 0_level_0", "Season"), "Season");
        assert_eq!(join_header("", "Season"), "Season");
        assert_eq!(join_header("Playing Time", "MP"), "Playing Time : MP");
    }
}
