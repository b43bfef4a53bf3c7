//! Workshop log: finalize outcomes recorded in a local SQLite database.
//!
//! Schema:
//! ```text
//! finalize_outcomes(id, ts, status, score, build, tests, zero_tag,
//!                   screenshots, design_guard_violations, profile, report, notes)
//! ```
//! `ts` is RFC 3339 UTC with second precision, e.g. `2026-10-16T09:30:00Z`.

use crate::error::Result;
use crate::io;
use chrono::{SecondsFormat, Utc};
use rusqlite::{params, Connection, Row};
use serde::Serialize;
use std::path::Path;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS finalize_outcomes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    ts TEXT,
    status TEXT NOT NULL,
    score INTEGER,
    build TEXT,
    tests TEXT,
    zero_tag TEXT,
    screenshots INTEGER,
    design_guard_violations INTEGER,
    profile TEXT,
    report TEXT,
    notes TEXT
)";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Everything a finalize run reports. Only `status` is required.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FinalizeOutcome {
    pub status: String,
    pub score: Option<i64>,
    pub build: Option<String>,
    pub tests: Option<String>,
    pub zero_tag: Option<String>,
    pub screenshots: Option<i64>,
    pub design_guard_violations: Option<i64>,
    pub profile: Option<String>,
    pub report: Option<String>,
    pub notes: Option<String>,
}

impl FinalizeOutcome {
    pub fn new(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutcomeRow {
    pub id: i64,
    pub ts: Option<String>,
    pub status: String,
    pub score: Option<i64>,
    pub build: Option<String>,
    pub tests: Option<String>,
    pub zero_tag: Option<String>,
    pub screenshots: Option<i64>,
    pub design_guard_violations: Option<i64>,
    pub profile: Option<String>,
    pub report: Option<String>,
    pub notes: Option<String>,
}

impl OutcomeRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            ts: row.get(1)?,
            status: row.get(2)?,
            score: row.get(3)?,
            build: row.get(4)?,
            tests: row.get(5)?,
            zero_tag: row.get(6)?,
            screenshots: row.get(7)?,
            design_guard_violations: row.get(8)?,
            profile: row.get(9)?,
            report: row.get(10)?,
            notes: row.get(11)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CuratorSummary {
    pub line: String,
    pub total: i64,
    pub rotated: bool,
}

pub fn now_ts() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

// ---------------------------------------------------------------------------
// WorkshopLog
// ---------------------------------------------------------------------------

pub struct WorkshopLog {
    conn: Connection,
}

impl WorkshopLog {
    /// Open or create the database at `path`, creating the table if absent.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Append one row stamped with the current UTC time. Returns the row id.
    pub fn finalize(&self, outcome: &FinalizeOutcome) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO finalize_outcomes (
                ts, status, score, build, tests, zero_tag, screenshots,
                design_guard_violations, profile, report, notes
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                now_ts(),
                outcome.status,
                outcome.score,
                outcome.build,
                outcome.tests,
                outcome.zero_tag,
                outcome.screenshots,
                outcome.design_guard_violations,
                outcome.profile,
                outcome.report,
                outcome.notes,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::debug!(id, status = %outcome.status, "finalize outcome recorded");
        Ok(id)
    }

    /// Most recent `limit` rows, newest first.
    pub fn query(&self, limit: usize) -> Result<Vec<OutcomeRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, ts, status, score, build, tests, zero_tag, screenshots,
                    design_guard_violations, profile, report, notes
             FROM finalize_outcomes ORDER BY id DESC LIMIT ?1",
        )?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = stmt
            .query_map(params![limit], OutcomeRow::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    pub fn status_counts(&self) -> Result<Vec<StatusCount>> {
        let mut stmt = self.conn.prepare(
            "SELECT status, COUNT(*) FROM finalize_outcomes GROUP BY status ORDER BY status",
        )?;
        let counts = stmt
            .query_map([], |row| {
                Ok(StatusCount {
                    status: row.get(0)?,
                    count: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(counts)
    }
}

// ---------------------------------------------------------------------------
// Curator
// ---------------------------------------------------------------------------

pub fn summary_line(ts: &str, counts: &[StatusCount]) -> String {
    let total: i64 = counts.iter().map(|c| c.count).sum();
    let mut line = format!("{ts} total={total}");
    for c in counts {
        line.push_str(&format!(" {}={}", c.status, c.count));
    }
    line
}

/// Append one summary line to `log_path`, rotating it first when it has
/// grown past `max_bytes`. Reads the database only.
pub fn curate(log: &WorkshopLog, log_path: &Path, max_bytes: u64) -> Result<CuratorSummary> {
    let counts = log.status_counts()?;
    let total = counts.iter().map(|c| c.count).sum();
    let line = summary_line(&now_ts(), &counts);
    let rotated = io::rotate_if_larger(log_path, max_bytes)?;
    if rotated {
        tracing::info!(path = %log_path.display(), "curator log rotated");
    }
    io::append_text(log_path, &format!("{line}\n"))?;
    Ok(CuratorSummary {
        line,
        total,
        rotated,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn finalize_then_query_latest() {
        let log = WorkshopLog::open_in_memory().unwrap();
        let mut outcome = FinalizeOutcome::new("PASS");
        outcome.score = Some(7);
        outcome.screenshots = Some(3);
        log.finalize(&outcome).unwrap();

        let rows = log.query(1).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, "PASS");
        assert_eq!(rows[0].score, Some(7));
        let ts = rows[0].ts.as_deref().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(ts).is_ok());
        assert!(ts.ends_with('Z'));
    }

    #[test]
    fn query_is_newest_first_and_limited() {
        let log = WorkshopLog::open_in_memory().unwrap();
        for status in ["PASS", "FAIL", "PASS"] {
            log.finalize(&FinalizeOutcome::new(status)).unwrap();
        }
        let rows = log.query(2).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].id > rows[1].id);
        assert_eq!(rows[0].status, "PASS");
        assert_eq!(rows[1].status, "FAIL");
    }

    #[test]
    fn open_creates_file_and_reopens() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/workshop.db");
        WorkshopLog::open(&path)
            .unwrap()
            .finalize(&FinalizeOutcome::new("PASS"))
            .unwrap();
        let again = WorkshopLog::open(&path).unwrap();
        assert_eq!(again.query(10).unwrap().len(), 1);
    }

    #[test]
    fn status_counts_group_by_status() {
        let log = WorkshopLog::open_in_memory().unwrap();
        for status in ["PASS", "FAIL", "PASS"] {
            log.finalize(&FinalizeOutcome::new(status)).unwrap();
        }
        let counts = log.status_counts().unwrap();
        assert_eq!(
            counts,
            vec![
                StatusCount {
                    status: "FAIL".into(),
                    count: 1
                },
                StatusCount {
                    status: "PASS".into(),
                    count: 2
                },
            ]
        );
        assert_eq!(
            summary_line("T", &counts),
            "T total=3 FAIL=1 PASS=2"
        );
    }

    #[test]
    fn curate_appends_and_rotates() {
        let dir = TempDir::new().unwrap();
        let log = WorkshopLog::open_in_memory().unwrap();
        log.finalize(&FinalizeOutcome::new("PASS")).unwrap();
        let path = dir.path().join("logs/curator.log");

        let first = curate(&log, &path, 1024).unwrap();
        assert!(!first.rotated);
        assert_eq!(first.total, 1);
        curate(&log, &path, 1024).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 2);

        let rotated = curate(&log, &path, 1).unwrap();
        assert!(rotated.rotated);
        assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 1);
        assert!(dir.path().join("logs/curator.log.1").exists());
    }

    #[test]
    fn curate_does_not_mutate_the_database() {
        let dir = TempDir::new().unwrap();
        let log = WorkshopLog::open_in_memory().unwrap();
        log.finalize(&FinalizeOutcome::new("PASS")).unwrap();
        curate(&log, &dir.path().join("c.log"), 1024).unwrap();
        assert_eq!(log.query(100).unwrap().len(), 1);
    }
}
