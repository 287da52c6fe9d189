use std::collections::HashSet;

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::warn;

use crate::config::{LeagueSpec, ScrapeConfig};
use crate::error::ScrapeResult;
use crate::fetch::Fetcher;
use crate::html::find_table;
use crate::league::ClubRef;

static ROW: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").expect("selector"));
static PLAYER_CELL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("th[data-stat=\"player\"]").expect("selector"));
static LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a").expect("selector"));

const PLAYER_URL_SUFFIX: &str = "-Stats---All-Competitions";

/// A squad member as enumerated from a club page. `name` is the display name
/// derived from the URL slug; it is the key of the known-players skip-list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerRef {
    pub name: String,
    pub url: String,
}

/// Resolve a club page into its players, in squad-listing order. A missing
/// squad table means "club has no players this run": warn and return empty
/// rather than failing the crawl.
pub fn list_players(
    fetcher: &Fetcher,
    config: &ScrapeConfig,
    league: &LeagueSpec,
    club: &ClubRef,
) -> ScrapeResult<Vec<PlayerRef>> {
    let body = fetcher.fetch_page(&club.url)?;
    Ok(parse_player_list(
        &body,
        &config.base_url,
        league.squad_table_id,
        &club.name,
    ))
}

pub fn parse_player_list(
    html: &str,
    base_url: &str,
    squad_table_id: &str,
    club_name: &str,
) -> Vec<PlayerRef> {
    let doc = Html::parse_document(html);
    let Some(table) = find_table(&doc, squad_table_id) else {
        warn!("no squad table {squad_table_id} for club {club_name}");
        return Vec::new();
    };

    let mut players = Vec::new();
    for row in table.select(&ROW) {
        let Some(cell) = row.select(&PLAYER_CELL).next() else {
            continue;
        };
        let Some(link) = cell.select(&LINK).next() else {
            continue;
        };
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        let url = player_stats_url(base_url, href);
        players.push(PlayerRef {
            name: display_name(&url),
            url,
        });
    }
    players
}

/// `/en/players/<id>/<Name>` becomes
/// `/en/players/<id>/all_comps/<Name>-Stats---All-Competitions`.
fn player_stats_url(base_url: &str, href: &str) -> String {
    let absolute = format!("{base_url}{href}");
    let mut parts: Vec<String> = absolute.split('/').map(|part| part.to_string()).collect();
    if parts.len() >= 7 {
        parts.insert(6, "all_comps".to_string());
    }
    let mut url = parts.join("/");
    url.push_str(PLAYER_URL_SUFFIX);
    url
}

/// Display name from the trailing URL slug: suffix stripped, dashes to spaces.
pub fn display_name(player_url: &str) -> String {
    player_url
        .rsplit('/')
        .next()
        .unwrap_or(player_url)
        .trim_end_matches(PLAYER_URL_SUFFIX)
        .replace('-', " ")
}

/// Which of the club's players are absent from an existing result table.
pub fn missing_players(players: &[PlayerRef], known: &HashSet<String>) -> Vec<String> {
    players
        .iter()
        .filter(|player| !known.contains(&player.name))
        .map(|player| player.name.clone())
        .collect()
}
