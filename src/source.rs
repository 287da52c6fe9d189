use std::collections::HashSet;

use crate::club::{self, PlayerRef};
use crate::config::{LeagueSpec, ScrapeConfig};
use crate::error::ScrapeResult;
use crate::fetch::Fetcher;
use crate::league::{self, ClubRef};
use crate::player;
use crate::records::PlayerSeasonRecord;

/// Seam between the crawl driver and the statistics site: the three
/// enumerators of the league → club → player hierarchy. The production
/// implementation is [`FbrefSource`]; tests drive the crawl with a scripted
/// in-memory source.
pub trait StatSource {
    fn list_clubs(&self, season: &str) -> ScrapeResult<Vec<ClubRef>>;

    fn list_players(&self, club: &ClubRef) -> ScrapeResult<Vec<PlayerRef>>;

    /// Must not touch the network when `known` already contains the player's
    /// display name.
    fn player_stats(
        &self,
        player: &PlayerRef,
        known: &HashSet<String>,
    ) -> ScrapeResult<Vec<PlayerSeasonRecord>>;
}

pub struct FbrefSource<'a> {
    fetcher: Fetcher,
    config: &'a ScrapeConfig,
    league: &'static LeagueSpec,
}

impl<'a> FbrefSource<'a> {
    pub fn new(config: &'a ScrapeConfig, league: &'static LeagueSpec) -> ScrapeResult<Self> {
        Ok(Self {
            fetcher: Fetcher::new(config)?,
            config,
            league,
        })
    }

    pub fn league(&self) -> &'static LeagueSpec {
        self.league
    }
}

impl StatSource for FbrefSource<'_> {
    fn list_clubs(&self, season: &str) -> ScrapeResult<Vec<ClubRef>> {
        league::list_clubs(&self.fetcher, self.config, self.league, season)
    }

    fn list_players(&self, club: &ClubRef) -> ScrapeResult<Vec<PlayerRef>> {
        club::list_players(&self.fetcher, self.config, self.league, club)
    }

    fn player_stats(
        &self,
        player: &PlayerRef,
        known: &HashSet<String>,
    ) -> ScrapeResult<Vec<PlayerSeasonRecord>> {
        player::fetch_player_stats(&self.fetcher, self.config, player, known)
    }
}
