use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use tracing_subscriber::EnvFilter;

use footval::checkpoint::CheckpointStore;
use footval::config::{LeagueSpec, ScrapeConfig, league_by_key, league_keys};
use footval::crawl::{CrawlReport, crawl_season};
use footval::dataset::ResultTable;
use footval::records::is_season_token;
use footval::source::FbrefSource;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = CliArgs::parse()?;
    let league = league_by_key(&args.league).ok_or_else(|| {
        anyhow!(
            "unknown league '{}', expected one of: {}",
            args.league,
            league_keys().join(", ")
        )
    })?;

    let mut config = ScrapeConfig::from_env();
    if let Some(dir) = args.data_dir {
        config.data_dir = dir;
    }

    let result_path = config.result_path(league);
    let mut table = ResultTable::load(&result_path)
        .with_context(|| format!("load existing table {}", result_path.display()))?;
    println!(
        "{}: {} existing rows in {}",
        league.name,
        table.len(),
        result_path.display()
    );

    let store = CheckpointStore::new(config.checkpoint_path(league));
    let source = FbrefSource::new(&config, league)?;

    for season in &args.seasons {
        let report = crawl_season(&source, season, &mut table, &store)
            .with_context(|| format!("crawl {} {season}", league.name))?;
        table
            .save(&result_path)
            .with_context(|| format!("save {}", result_path.display()))?;
        print_report(league, &report);
    }

    let (players, per_season) = table.player_counts();
    println!("Table now holds {} rows, {} distinct players", table.len(), players);
    for (season, count) in per_season {
        println!("  {season}: {count} players");
    }

    Ok(())
}

fn print_report(league: &LeagueSpec, report: &CrawlReport) {
    println!("Crawl complete: {} {}", league.name, report.season);
    if report.resumed {
        println!("  resumed from checkpoint");
    }
    println!(
        "  clubs: {}/{} processed, {} failed",
        report.clubs_processed, report.clubs_total, report.clubs_failed
    );
    println!(
        "  players: {} seen, {} already known, {} rows added",
        report.players_seen, report.players_skipped, report.rows_added
    );
    if !report.errors.is_empty() {
        println!("  errors: {}", report.errors.len());
        for err in report.errors.iter().take(8) {
            println!("   - {err}");
        }
    }
}

struct CliArgs {
    league: String,
    seasons: Vec<String>,
    data_dir: Option<PathBuf>,
}

impl CliArgs {
    fn parse() -> Result<Self> {
        let mut league = None;
        let mut seasons = Vec::new();
        let mut data_dir = None;

        let args = std::env::args().skip(1).collect::<Vec<_>>();
        let mut idx = 0;
        while idx < args.len() {
            let arg = &args[idx];
            if let Some(value) = flag_value(&args, &mut idx, "--league") {
                league = Some(value);
            } else if let Some(value) = flag_value(&args, &mut idx, "--season") {
                seasons.push(value);
            } else if let Some(value) = flag_value(&args, &mut idx, "--data-dir") {
                data_dir = Some(PathBuf::from(value));
            } else {
                return Err(anyhow!(
                    "unexpected argument '{arg}'\nusage: footval --league=<key> --season=<YYYY-YYYY> [--season=...] [--data-dir=<dir>]"
                ));
            }
            idx += 1;
        }

        let league = league.ok_or_else(|| {
            anyhow!("--league is required, one of: {}", league_keys().join(", "))
        })?;
        if seasons.is_empty() {
            return Err(anyhow!("at least one --season=<YYYY-YYYY> is required"));
        }
        for season in &seasons {
            if !is_season_token(season) {
                return Err(anyhow!(
                    "'{season}' is not a season token, expected the YYYY-YYYY form"
                ));
            }
        }
        Ok(Self {
            league,
            seasons,
            data_dir,
        })
    }
}

/// Accepts both `--flag=value` and `--flag value`, advancing `idx` past a
/// separate value argument.
fn flag_value(args: &[String], idx: &mut usize, flag: &str) -> Option<String> {
    let arg = &args[*idx];
    if let Some(value) = arg.strip_prefix(&format!("{flag}=")) {
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            return Some(trimmed.to_string());
        }
        return None;
    }
    if arg == flag {
        if let Some(next) = args.get(*idx + 1) {
            let trimmed = next.trim();
            if !trimmed.is_empty() {
                *idx += 1;
                return Some(trimmed.to_string());
            }
        }
    }
    None
}
