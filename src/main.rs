use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use serde_json::{Value, json};

use scout_report::engine::global_engine;
use scout_report::input::{PlayerInput, parse_player_input_json};
use scout_report::persist::{self, SqliteReportStore, analyze_cached};

const USAGE: &str = "usage: scout_report <input.json> [--db PATH] [--no-cache] [--compact]";

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    env_logger::init();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let input_path = parse_input_path_arg(&args).ok_or_else(|| anyhow!(USAGE))?;
    let no_cache = args.iter().any(|a| a == "--no-cache");
    let compact = args.iter().any(|a| a == "--compact");

    let raw = fs::read_to_string(&input_path)
        .with_context(|| format!("read input {}", input_path.display()))?;
    let engine = global_engine()?;

    let output = if raw.trim_start().starts_with('[') {
        let inputs = serde_json::from_str::<Vec<PlayerInput>>(&raw)
            .with_context(|| format!("parse player batch {}", input_path.display()))?;
        log::info!("analyzing batch of {} players", inputs.len());
        let results = engine
            .analyze_batch(&inputs)
            .into_iter()
            .map(|result| match result {
                Ok(report) => serde_json::to_value(report).context("encode report"),
                Err(err) => Ok(json!({ "error": err.to_string() })),
            })
            .collect::<Result<Vec<_>>>()?;
        Value::Array(results)
    } else {
        let input = parse_player_input_json(&raw)?;
        let report = if no_cache {
            engine.analyze_now(&input)?
        } else {
            let db_path = parse_db_path_arg(&args)
                .or_else(persist::default_db_path)
                .context("unable to resolve sqlite path")?;
            let store = SqliteReportStore::open(&db_path)?;
            analyze_cached(engine, &store, &input)?
        };
        serde_json::to_value(report).context("encode report")?
    };

    let rendered = if compact {
        serde_json::to_string(&output)?
    } else {
        serde_json::to_string_pretty(&output)?
    };
    println!("{rendered}");
    Ok(())
}

fn parse_input_path_arg(args: &[String]) -> Option<PathBuf> {
    let mut skip_next = false;
    for arg in args {
        if skip_next {
            skip_next = false;
            continue;
        }
        if arg == "--db" {
            skip_next = true;
            continue;
        }
        if arg.starts_with("--") {
            continue;
        }
        if !arg.trim().is_empty() {
            return Some(PathBuf::from(arg));
        }
    }
    None
}

fn parse_db_path_arg(args: &[String]) -> Option<PathBuf> {
    for (idx, arg) in args.iter().enumerate() {
        if let Some(path) = arg.strip_prefix("--db=") {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return Some(PathBuf::from(trimmed));
            }
        }
        if arg == "--db" {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(PathBuf::from(next));
            }
        }
    }
    None
}
