use once_cell::sync::Lazy;
use scraper::{Html, Selector};

use crate::config::{LeagueSpec, ScrapeConfig};
use crate::error::{ScrapeError, ScrapeResult};
use crate::fetch::Fetcher;
use crate::html::{cell_text, find_table};

static ROW: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").expect("selector"));
static TEAM_CELL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("td[data-stat=\"team\"]").expect("selector"));
static LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a").expect("selector"));

/// A club as enumerated from the standings page. The URL doubles as the
/// checkpoint identifier, so it must be derived deterministically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClubRef {
    pub name: String,
    pub url: String,
}

/// Resolve the league's standings page into its clubs, in standings order.
/// A missing standings table is fatal for the season run.
pub fn list_clubs(
    fetcher: &Fetcher,
    config: &ScrapeConfig,
    league: &LeagueSpec,
    season: &str,
) -> ScrapeResult<Vec<ClubRef>> {
    let url = league.standings_url(&config.base_url, season);
    let body = fetcher.fetch_page(&url)?;
    parse_club_list(&body, &config.base_url, league, season)
}

pub fn parse_club_list(
    html: &str,
    base_url: &str,
    league: &LeagueSpec,
    season: &str,
) -> ScrapeResult<Vec<ClubRef>> {
    let doc = Html::parse_document(html);
    let table_id = league.standings_table_id(season);
    let table = find_table(&doc, &table_id)
        .ok_or_else(|| ScrapeError::not_found(format!("clubs table {table_id}")))?;

    let mut clubs = Vec::new();
    for row in table.select(&ROW) {
        let Some(cell) = row.select(&TEAM_CELL).next() else {
            continue;
        };
        let Some(link) = cell.select(&LINK).next() else {
            continue;
        };
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        clubs.push(ClubRef {
            name: cell_text(link),
            url: club_stats_url(base_url, href, season, league.all_comps_squads),
        });
    }
    Ok(clubs)
}

/// Splice the season into a squad link, and for leagues crawled through the
/// all-competitions squad pages also splice the `all_comps` segment and
/// suffix. `/en/squads/<id>/<Club>-Stats` becomes
/// `/en/squads/<id>/<season>/<Club>-Stats` (domestic) or
/// `/en/squads/<id>/<season>/all_comps/<Club>-Stats-All-Competitions`.
fn club_stats_url(base_url: &str, href: &str, season: &str, all_comps: bool) -> String {
    let absolute = format!("{base_url}{href}");
    let mut parts: Vec<String> = absolute.split('/').map(|part| part.to_string()).collect();
    if parts.len() < 7 {
        return absolute;
    }
    parts.insert(6, season.to_string());
    if all_comps {
        parts.insert(7, "all_comps".to_string());
        if let Some(last) = parts.last_mut() {
            last.push_str("-All-Competitions");
        }
    }
    parts.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::league_by_key;

    #[test]
    fn domestic_club_url_gets_season_spliced() {
        assert_eq!(
            club_stats_url(
                "https://fbref.com",
                "/en/squads/d53c0b06/Lyon-Stats",
                "2022-2023",
                false,
            ),
            "https://fbref.com/en/squads/d53c0b06/2022-2023/Lyon-Stats"
        );
    }

    #[test]
    fn all_comps_club_url_gets_segment_and_suffix() {
        assert_eq!(
            club_stats_url(
                "https://fbref.com",
                "/en/squads/822bd0ba/Liverpool-Stats",
                "2021-2022",
                true,
            ),
            "https://fbref.com/en/squads/822bd0ba/2021-2022/all_comps/Liverpool-Stats-All-Competitions"
        );
    }

    #[test]
    fn missing_standings_table_is_not_found() {
        let league = league_by_key("serie-a").unwrap();
        let err = parse_club_list("<html><body></body></html>", "https://fbref.com", league, "2022-2023")
            .unwrap_err();
        assert!(matches!(err, ScrapeError::NotFound { .. }));
    }
}
