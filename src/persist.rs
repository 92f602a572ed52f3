use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};

use crate::engine::Engine;
use crate::input::PlayerInput;
use crate::report::AnalysisReport;
use crate::stats::normalize_name;

const CACHE_DIR: &str = "scout_report";
const DB_FILE: &str = "reports.sqlite";

pub fn app_cache_dir() -> Option<PathBuf> {
    // Prefer XDG cache.
    if let Ok(base) = std::env::var("XDG_CACHE_HOME")
        && !base.trim().is_empty()
    {
        return Some(PathBuf::from(base).join(CACHE_DIR));
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(CACHE_DIR))
}

pub fn default_db_path() -> Option<PathBuf> {
    app_cache_dir().map(|dir| dir.join(DB_FILE))
}

/// Where finished reports are kept, keyed by normalized player name.
pub trait ReportStore {
    fn load(&self, player_name: &str) -> Result<Option<AnalysisReport>>;
    fn save(&self, report: &AnalysisReport) -> Result<()>;
}

pub struct SqliteReportStore {
    conn: Connection,
}

impl SqliteReportStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let conn =
            Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory sqlite db")?;
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn count(&self) -> Result<usize> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM reports", [], |row| row.get(0))
            .context("count reports")?;
        Ok(n.max(0) as usize)
    }
}

fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        CREATE TABLE IF NOT EXISTS reports (
            player_key TEXT PRIMARY KEY,
            player_name TEXT NOT NULL,
            overall_rating INTEGER NOT NULL,
            report_json TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_reports_rating ON reports(overall_rating);
        "#,
    )
    .context("create sqlite schema")?;
    Ok(())
}

impl ReportStore for SqliteReportStore {
    fn load(&self, player_name: &str) -> Result<Option<AnalysisReport>> {
        let key = normalize_name(player_name);
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT report_json FROM reports WHERE player_key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .with_context(|| format!("query report {key}"))?;
        let Some(raw) = raw else {
            return Ok(None);
        };
        let report = serde_json::from_str::<AnalysisReport>(&raw)
            .with_context(|| format!("decode stored report {key}"))?;
        Ok(Some(report))
    }

    fn save(&self, report: &AnalysisReport) -> Result<()> {
        let key = normalize_name(&report.player_name);
        let json = serde_json::to_string(report).context("encode report")?;
        self.conn
            .execute(
                r#"
                INSERT INTO reports (player_key, player_name, overall_rating, report_json, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5)
                ON CONFLICT(player_key) DO UPDATE SET
                    player_name = excluded.player_name,
                    overall_rating = excluded.overall_rating,
                    report_json = excluded.report_json,
                    updated_at = excluded.updated_at
                "#,
                params![
                    key,
                    report.player_name,
                    i64::from(report.overall_rating),
                    json,
                    Utc::now().to_rfc3339(),
                ],
            )
            .with_context(|| format!("upsert report {key}"))?;
        Ok(())
    }
}

/// Return the stored report for this player, or analyze, stamp and store a
/// fresh one. Unnamed players are never cached.
pub fn analyze_cached(
    engine: &Engine,
    store: &dyn ReportStore,
    input: &PlayerInput,
) -> Result<AnalysisReport> {
    let Some(name) = input.player_name() else {
        return Ok(engine.analyze_now(input)?);
    };
    if let Some(report) = store.load(name)? {
        log::debug!("using stored report for {name}");
        return Ok(report);
    }
    let report = engine.analyze_now(input)?;
    store.save(&report)?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::input::parse_player_input_json;

    fn sample_input(name: &str) -> PlayerInput {
        parse_player_input_json(&format!(
            r#"{{
                "general_info":{{"name":"{name}","age":22,"position":"MF","club":"Club"}},
                "scouting_report":[
                    {{"stat":"Progressive Passes","per_90":"6.1","percentile":88}},
                    {{"stat":"Tackles","per_90":"1.9","percentile":54}}
                ]
            }}"#
        ))
        .unwrap()
    }

    #[test]
    fn save_then_load_by_normalized_name() {
        let engine = Engine::new(EngineConfig::default()).unwrap();
        let store = SqliteReportStore::open_in_memory().unwrap();
        let report = engine.analyze(&sample_input("Jude Example")).unwrap();
        store.save(&report).unwrap();
        let loaded = store.load("  jude   EXAMPLE ").unwrap().unwrap();
        assert_eq!(loaded, report);
        assert!(store.load("someone else").unwrap().is_none());
    }

    #[test]
    fn save_upserts() {
        let engine = Engine::new(EngineConfig::default()).unwrap();
        let store = SqliteReportStore::open_in_memory().unwrap();
        let report = engine.analyze(&sample_input("Same Name")).unwrap();
        store.save(&report).unwrap();
        store.save(&report).unwrap();
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn cached_analysis_is_reused() {
        let engine = Engine::new(EngineConfig::default()).unwrap();
        let store = SqliteReportStore::open_in_memory().unwrap();
        let input = sample_input("Cached Player");
        let first = analyze_cached(&engine, &store, &input).unwrap();
        assert!(first.generated_at.is_some());
        let second = analyze_cached(&engine, &store, &input).unwrap();
        assert_eq!(first, second);
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn unnamed_players_are_not_stored() {
        let engine = Engine::new(EngineConfig::default()).unwrap();
        let store = SqliteReportStore::open_in_memory().unwrap();
        let input = parse_player_input_json(
            r#"{"general_info":{"age":22,"position":"MF"},"scouting_report":[]}"#,
        )
        .unwrap();
        analyze_cached(&engine, &store, &input).unwrap();
        assert_eq!(store.count().unwrap(), 0);
    }
}
