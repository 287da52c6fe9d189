use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://fbref.com";

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

const DEFAULT_DELAY_MIN_MS: u64 = 3_000;
const DEFAULT_DELAY_MAX_MS: u64 = 7_000;
const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// Season tokens worth keeping when filtering player stat rows. Anything
/// outside this list (header repeats, career totals, national-team rows with
/// odd labels) is dropped.
pub const DEFAULT_SEASONS: &[&str] = &[
    "2010-2011",
    "2011-2012",
    "2012-2013",
    "2013-2014",
    "2014-2015",
    "2015-2016",
    "2016-2017",
    "2017-2018",
    "2018-2019",
    "2019-2020",
    "2020-2021",
    "2021-2022",
    "2022-2023",
    "2023-2024",
    "2024-2025",
];

/// Player pages carry the all-competitions standard table under this id,
/// with an older domestic-league variant as fallback.
pub const PLAYER_TABLE_ID: &str = "stats_standard_expanded";
pub const PLAYER_TABLE_FALLBACK_ID: &str = "stats_standard_dom_lg";

/// Everything the crawl needs that used to live in per-script globals.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub base_url: String,
    pub user_agent: String,
    pub delay_min: Duration,
    pub delay_max: Duration,
    pub request_timeout: Duration,
    pub seasons_to_keep: Vec<String>,
    pub data_dir: PathBuf,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            delay_min: Duration::from_millis(DEFAULT_DELAY_MIN_MS),
            delay_max: Duration::from_millis(DEFAULT_DELAY_MAX_MS),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            seasons_to_keep: DEFAULT_SEASONS.iter().map(|s| s.to_string()).collect(),
            data_dir: PathBuf::from("."),
        }
    }
}

impl ScrapeConfig {
    /// Defaults overridden by `APP_SCRAPE_*` environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(base) = env_string("APP_SCRAPE_BASE_URL") {
            config.base_url = base.trim_end_matches('/').to_string();
        }
        if let Some(agent) = env_string("APP_SCRAPE_USER_AGENT") {
            config.user_agent = agent;
        }
        if let Some(ms) = env_u64("APP_SCRAPE_DELAY_MIN_MS") {
            config.delay_min = Duration::from_millis(ms);
        }
        if let Some(ms) = env_u64("APP_SCRAPE_DELAY_MAX_MS") {
            config.delay_max = Duration::from_millis(ms);
        }
        if config.delay_max < config.delay_min {
            config.delay_max = config.delay_min;
        }
        if let Some(secs) = env_u64("APP_SCRAPE_TIMEOUT_SECS") {
            config.request_timeout = Duration::from_secs(secs.max(1));
        }
        if let Some(dir) = env_string("APP_SCRAPE_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        config
    }

    pub fn result_path(&self, league: &LeagueSpec) -> PathBuf {
        self.data_dir.join(league.output_file)
    }

    /// One checkpoint slot per league so crawls of different leagues cannot
    /// clobber each other's resume point.
    pub fn checkpoint_path(&self, league: &LeagueSpec) -> PathBuf {
        self.data_dir
            .join(format!("scraping_progress_{}.json", league.key))
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}

fn env_u64(key: &str) -> Option<u64> {
    env_string(key).and_then(|val| val.parse::<u64>().ok())
}

/// Per-league page identifiers. The site templates its standings table id on
/// season and competition id, and serves club squads either as the domestic
/// standard table or (when the club URL is rewritten to the all-competitions
/// variant) as a combined one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeagueSpec {
    pub key: &'static str,
    pub name: &'static str,
    pub comp_id: u32,
    pub slug: &'static str,
    pub squad_table_id: &'static str,
    pub all_comps_squads: bool,
    pub output_file: &'static str,
}

impl LeagueSpec {
    pub fn standings_url(&self, base_url: &str, season: &str) -> String {
        format!(
            "{base_url}/en/comps/{}/{season}/{season}-{}-Stats",
            self.comp_id, self.slug
        )
    }

    pub fn standings_table_id(&self, season: &str) -> String {
        format!("results{season}{}1_overall", self.comp_id)
    }
}

pub const LEAGUES: &[LeagueSpec] = &[
    LeagueSpec {
        key: "premier-league",
        name: "Premier League",
        comp_id: 9,
        slug: "Premier-League",
        squad_table_id: "stats_standard_combined",
        all_comps_squads: true,
        output_file: "players_stats_PL.csv",
    },
    LeagueSpec {
        key: "ligue-1",
        name: "Ligue 1",
        comp_id: 13,
        slug: "Ligue-1",
        squad_table_id: "stats_standard_13",
        all_comps_squads: false,
        output_file: "players_stats_L1.csv",
    },
    LeagueSpec {
        key: "serie-a",
        name: "Serie A",
        comp_id: 11,
        slug: "Serie-A",
        squad_table_id: "stats_standard_11",
        all_comps_squads: false,
        output_file: "players_stats_serieA.csv",
    },
    LeagueSpec {
        key: "eredivisie",
        name: "Eredivisie",
        comp_id: 23,
        slug: "Eredivisie",
        squad_table_id: "stats_standard_23",
        all_comps_squads: false,
        output_file: "players_stats_eredivisie.csv",
    },
    LeagueSpec {
        key: "primeira-liga",
        name: "Primeira Liga",
        comp_id: 32,
        slug: "Primeira-Liga",
        squad_table_id: "stats_standard_32",
        all_comps_squads: false,
        output_file: "players_stats_primeiraliga.csv",
    },
];

pub fn league_by_key(key: &str) -> Option<&'static LeagueSpec> {
    LEAGUES.iter().find(|league| league.key == key)
}

pub fn league_keys() -> Vec<&'static str> {
    LEAGUES.iter().map(|league| league.key).collect()
}
