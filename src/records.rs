use std::cmp::Ordering;

/// Parse the starting year out of a "2021-2022" season token.
pub fn season_start_year(token: &str) -> Option<i32> {
    let (start, rest) = token.split_once('-')?;
    if start.len() != 4 || rest.len() != 4 {
        return None;
    }
    if !rest.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    start.parse::<i32>().ok()
}

pub fn is_season_token(token: &str) -> bool {
    season_start_year(token).is_some()
}

/// Seasons order by start year; malformed tokens sort last, then lexically,
/// so ordering is still total.
pub fn compare_seasons(a: &str, b: &str) -> Ordering {
    match (season_start_year(a), season_start_year(b)) {
        (Some(ya), Some(yb)) => ya.cmp(&yb).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// One scraped row: identity key (player, season) plus an open bag of
/// statistic columns in source order. Column sets vary by source page; the
/// result table unions them when persisting.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSeasonRecord {
    pub player: String,
    pub season: String,
    pub stats: Vec<(String, String)>,
}

impl PlayerSeasonRecord {
    pub fn new(player: impl Into<String>, season: impl Into<String>) -> Self {
        Self {
            player: player.into(),
            season: season.into(),
            stats: Vec::new(),
        }
    }

    pub fn key(&self) -> (&str, &str) {
        (self.player.as_str(), self.season.as_str())
    }

    pub fn stat(&self, column: &str) -> Option<&str> {
        self.stats
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    pub fn push_stat(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.stats.push((column.into(), value.into()));
    }
}
