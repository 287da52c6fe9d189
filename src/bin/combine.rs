use std::path::PathBuf;

use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;

use footval::combine::combine_files;

const DEFAULT_OUT: &str = "players_stats_top7.csv";

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let (out, inputs) = parse_args()?;
    let summary = combine_files(&inputs, &out)?;

    println!("Combine complete");
    println!("Out: {}", out.display());
    println!("Inputs: {}", summary.inputs);
    println!(
        "Rows: {} in, {} out ({} duplicate player/season pairs dropped)",
        summary.rows_in, summary.rows_out, summary.duplicates_dropped
    );
    println!("Columns kept: {}", summary.columns);
    Ok(())
}

fn parse_args() -> Result<(PathBuf, Vec<PathBuf>)> {
    let mut out = PathBuf::from(DEFAULT_OUT);
    let mut inputs = Vec::new();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let mut idx = 0;
    while idx < args.len() {
        let arg = &args[idx];
        if let Some(path) = arg.strip_prefix("--out=") {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                out = PathBuf::from(trimmed);
            }
        } else if arg == "--out" {
            let Some(next) = args.get(idx + 1) else {
                return Err(anyhow!("--out needs a path"));
            };
            out = PathBuf::from(next.trim());
            idx += 1;
        } else if arg.starts_with("--") {
            return Err(anyhow!(
                "unexpected argument '{arg}'\nusage: combine [--out=<csv>] <table.csv> <table.csv> ..."
            ));
        } else {
            inputs.push(PathBuf::from(arg));
        }
        idx += 1;
    }

    if inputs.is_empty() {
        return Err(anyhow!(
            "no input tables given\nusage: combine [--out=<csv>] <table.csv> <table.csv> ..."
        ));
    }
    Ok((out, inputs))
}
