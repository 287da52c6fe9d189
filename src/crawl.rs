use std::collections::HashSet;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{info, warn};

use crate::checkpoint::{Checkpoint, CheckpointStore};
use crate::club::PlayerRef;
use crate::dataset::ResultTable;
use crate::league::ClubRef;
use crate::records::PlayerSeasonRecord;
use crate::source::StatSource;

/// Outcome of one season's crawl, feeding the run summary the binaries
/// print. Per-unit failures land in `errors` instead of aborting.
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub season: String,
    pub started_at: String,
    pub finished_at: String,
    pub resumed: bool,
    pub clubs_total: usize,
    pub clubs_processed: usize,
    pub clubs_failed: usize,
    pub players_seen: usize,
    pub players_skipped: usize,
    pub rows_added: usize,
    pub errors: Vec<String>,
}

impl CrawlReport {
    fn new(season: &str) -> Self {
        Self {
            season: season.to_string(),
            started_at: Utc::now().to_rfc3339(),
            finished_at: String::new(),
            resumed: false,
            clubs_total: 0,
            clubs_processed: 0,
            clubs_failed: 0,
            players_seen: 0,
            players_skipped: 0,
            rows_added: 0,
            errors: Vec::new(),
        }
    }
}

/// Crawl one season into `table`.
///
/// Checkpoint semantics: a stored checkpoint for a different season is reset,
/// never reused. Within the season, resume positions are found by identifier
/// match against the freshly re-enumerated club and player lists. The
/// checkpoint advances after every processed player, marks a club complete
/// with `last_player: None`, and is deleted once the whole season finished.
///
/// Failure semantics: a missing standings table is fatal for the run; any
/// error inside one club is logged and the crawl moves on to the next club.
pub fn crawl_season<S: StatSource>(
    source: &S,
    season: &str,
    table: &mut ResultTable,
    store: &CheckpointStore,
) -> Result<CrawlReport> {
    let mut report = CrawlReport::new(season);

    let mut checkpoint = store.load();
    if checkpoint.season.as_deref() != Some(season) {
        checkpoint = Checkpoint::fresh(season);
        store.save(&checkpoint).context("reset checkpoint")?;
    }
    let resume_from = checkpoint.clone();
    report.resumed = resume_from.last_club.is_some();

    let clubs = source
        .list_clubs(season)
        .with_context(|| format!("enumerate clubs for season {season}"))?;
    report.clubs_total = clubs.len();

    let club_start = resume_club_index(&clubs, &resume_from);
    if club_start > 0 {
        info!(
            "resuming season {season} at club {}/{}",
            club_start + 1,
            clubs.len()
        );
    }

    let mut state = SeasonState {
        known: table.known_players(),
        scraped: Vec::new(),
        report,
    };

    for club in &clubs[club_start.min(clubs.len())..] {
        match crawl_club(source, season, club, &resume_from, store, &mut state) {
            Ok(()) => state.report.clubs_processed += 1,
            Err(err) => {
                warn!("club {} failed: {err:#}", club.name);
                state.report.clubs_failed += 1;
                state
                    .report
                    .errors
                    .push(format!("club {}: {err:#}", club.name));
            }
        }
    }

    let mut report = state.report;
    table.merge(state.scraped);
    store.clear().context("clear checkpoint")?;
    report.finished_at = Utc::now().to_rfc3339();
    Ok(report)
}

struct SeasonState {
    known: HashSet<String>,
    scraped: Vec<PlayerSeasonRecord>,
    report: CrawlReport,
}

fn crawl_club<S: StatSource>(
    source: &S,
    season: &str,
    club: &ClubRef,
    resume_from: &Checkpoint,
    store: &CheckpointStore,
    state: &mut SeasonState,
) -> Result<()> {
    let players = source.list_players(club)?;
    let player_start = resume_player_index(&players, resume_from, club);
    if player_start > 0 {
        info!(
            "resuming club {} at player {}/{}",
            club.name,
            player_start + 1,
            players.len()
        );
    }

    for player in &players[player_start.min(players.len())..] {
        state.report.players_seen += 1;
        if state.known.contains(&player.name) {
            state.report.players_skipped += 1;
        }
        match source.player_stats(player, &state.known) {
            Ok(rows) => {
                if !rows.is_empty() {
                    state.known.insert(player.name.clone());
                    state.report.rows_added += rows.len();
                    state.scraped.extend(rows);
                }
            }
            Err(err) => {
                warn!("player {} failed: {err}", player.name);
                state
                    .report
                    .errors
                    .push(format!("player {}: {err}", player.name));
            }
        }
        store
            .save(&Checkpoint {
                season: Some(season.to_string()),
                last_club: Some(club.url.clone()),
                last_player: Some(player.url.clone()),
            })
            .context("save checkpoint")?;
    }

    // Club exhausted: record it as complete so a later resume moves past it.
    store
        .save(&Checkpoint {
            season: Some(season.to_string()),
            last_club: Some(club.url.clone()),
            last_player: None,
        })
        .context("save checkpoint")?;
    Ok(())
}

/// First club index to process. A checkpoint naming a completed club
/// (`last_player: None`) resumes at the club after the match; a checkpoint
/// interrupted mid-club re-enters that club. No match (or no checkpointed
/// club) starts from the beginning. Identifiers rather than positions, since
/// the enumerated order can shift between runs.
pub fn resume_club_index(clubs: &[ClubRef], checkpoint: &Checkpoint) -> usize {
    let Some(last_club) = checkpoint.last_club.as_deref() else {
        return 0;
    };
    let Some(idx) = clubs.iter().position(|club| club.url == last_club) else {
        return 0;
    };
    if checkpoint.last_player.is_some() {
        idx
    } else {
        idx + 1
    }
}

/// First player index within `club`, by the same identifier-match rule.
/// Only the checkpointed club itself gets an offset; every other club starts
/// from its first player.
pub fn resume_player_index(
    players: &[PlayerRef],
    checkpoint: &Checkpoint,
    club: &ClubRef,
) -> usize {
    if checkpoint.last_club.as_deref() != Some(club.url.as_str()) {
        return 0;
    }
    let Some(last_player) = checkpoint.last_player.as_deref() else {
        return 0;
    };
    players
        .iter()
        .position(|player| player.url == last_player)
        .map(|idx| idx + 1)
        .unwrap_or(0)
}
