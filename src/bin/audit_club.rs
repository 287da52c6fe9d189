use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use tracing_subscriber::EnvFilter;

use footval::club::missing_players;
use footval::config::{ScrapeConfig, league_by_key, league_keys};
use footval::dataset::ResultTable;
use footval::source::{FbrefSource, StatSource};

/// Check whether all of a club's players are present in the persisted table;
/// prints the missing display names.
fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = parse_args()?;
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
    let table = ResultTable::load(&result_path)
        .with_context(|| format!("load {}", result_path.display()))?;
    let known = table.known_players();
    println!("Loaded {} players from {}", known.len(), result_path.display());

    let source = FbrefSource::new(&config, league)?;
    let clubs = source.list_clubs(&args.season)?;
    let club = clubs
        .iter()
        .find(|club| club.name.eq_ignore_ascii_case(&args.club))
        .ok_or_else(|| {
            anyhow!(
                "club '{}' not in {} {} standings",
                args.club,
                league.name,
                args.season
            )
        })?;

    let players = source.list_players(club)?;
    println!("Found {} players for {}", players.len(), club.name);

    let missing = missing_players(&players, &known);
    if missing.is_empty() {
        println!("All players from {} are present in the table", club.name);
    } else {
        println!("Missing {} players:", missing.len());
        for name in &missing {
            println!(" - {name}");
        }
    }
    Ok(())
}

struct CliArgs {
    league: String,
    season: String,
    club: String,
    data_dir: Option<PathBuf>,
}

fn parse_args() -> Result<CliArgs> {
    let mut league = None;
    let mut season = None;
    let mut club = None;
    let mut data_dir = None;

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let mut idx = 0;
    while idx < args.len() {
        let arg = &args[idx];
        if let Some(value) = flag_value(&args, &mut idx, "--league") {
            league = Some(value);
        } else if let Some(value) = flag_value(&args, &mut idx, "--season") {
            season = Some(value);
        } else if let Some(value) = flag_value(&args, &mut idx, "--club") {
            club = Some(value);
        } else if let Some(value) = flag_value(&args, &mut idx, "--data-dir") {
            data_dir = Some(PathBuf::from(value));
        } else {
            return Err(anyhow!(
                "unexpected argument '{arg}'\nusage: audit_club --league=<key> --season=<YYYY-YYYY> --club=<name> [--data-dir=<dir>]"
            ));
        }
        idx += 1;
    }

    Ok(CliArgs {
        league: league.ok_or_else(|| anyhow!("--league is required"))?,
        season: season.ok_or_else(|| anyhow!("--season is required"))?,
        club: club.ok_or_else(|| anyhow!("--club is required"))?,
        data_dir,
    })
}

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
