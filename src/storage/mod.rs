//! Storage layer for kata.
//!
//! One SQLite file holds everything the service persists: JSON cache
//! entries (the active question set and the leaderboard payload),
//! submissions with their verdicts, and per-user standings.

use std::path::Path;

use chrono::{NaiveDateTime, Utc};
use parking_lot::Mutex;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{KataError, Result};

/// Submission lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Queued,
    Running,
    Completed,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Completed => "completed",
        }
    }
}

impl ToSql for SubmissionStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for SubmissionStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "queued" => Ok(Self::Queued),
            "running" => Ok(Self::Running),
            "completed" => Ok(Self::Completed),
            other => Err(FromSqlError::Other(
                format!("invalid submission status {other}").into(),
            )),
        }
    }
}

/// One stored submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub job_id: String,
    pub problem_id: String,
    pub user_id: Option<String>,
    pub language: String,
    pub status: SubmissionStatus,
    /// Judge result JSON, present once the run completes.
    pub verdict: Option<Value>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Submission {
    /// A freshly queued submission.
    pub fn queued(job_id: &str, problem_id: &str, user_id: Option<&str>, language: &str) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            job_id: job_id.to_string(),
            problem_id: problem_id.to_string(),
            user_id: user_id.map(str::to_string),
            language: language.to_string(),
            status: SubmissionStatus::Queued,
            verdict: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// One user's leaderboard tally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    pub user_id: String,
    pub solved: u32,
    pub attempts: u32,
    pub last_solved_at: Option<NaiveDateTime>,
}

/// SQLite-backed store shared by the HTTP handlers and the judge worker.
///
/// rusqlite connections are not Sync, so the single connection sits behind
/// a mutex; every call holds the lock for one statement.
pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Open the store at the given path, creating parent directories and
    /// the schema as needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        Self::configure_pragmas(&conn)?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn configure_pragmas(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA temp_store = MEMORY;
             PRAGMA foreign_keys = ON;",
        )?;
        Ok(())
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS cache (
                 key        TEXT PRIMARY KEY,
                 value      TEXT NOT NULL,
                 updated_at TEXT NOT NULL
             );
             CREATE TABLE IF NOT EXISTS submissions (
                 job_id     TEXT PRIMARY KEY,
                 problem_id TEXT NOT NULL,
                 user_id    TEXT,
                 language   TEXT NOT NULL,
                 status     TEXT NOT NULL,
                 verdict    TEXT,
                 created_at TEXT NOT NULL,
                 updated_at TEXT NOT NULL
             );
             CREATE INDEX IF NOT EXISTS idx_submissions_status
                 ON submissions(status);
             CREATE TABLE IF NOT EXISTS standings (
                 user_id        TEXT PRIMARY KEY,
                 solved         INTEGER NOT NULL DEFAULT 0,
                 attempts       INTEGER NOT NULL DEFAULT 0,
                 last_solved_at TEXT
             );",
        )?;
        Ok(())
    }

    /// Reads a JSON cache entry. `Ok(None)` when the key is absent.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let conn = self.conn.lock();
        let raw: Option<String> = conn
            .query_row("SELECT value FROM cache WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        match raw {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Writes a JSON cache entry, replacing any previous value.
    pub fn set_json<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO cache (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET
                 value = excluded.value,
                 updated_at = excluded.updated_at",
            params![key, raw, Utc::now().naive_utc()],
        )?;
        Ok(())
    }

    pub fn insert_submission(&self, submission: &Submission) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO submissions
                 (job_id, problem_id, user_id, language, status, verdict,
                  created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                submission.job_id,
                submission.problem_id,
                submission.user_id,
                submission.language,
                submission.status,
                submission.verdict.as_ref().map(Value::to_string),
                submission.created_at,
                submission.updated_at,
            ],
        )?;
        Ok(())
    }

    pub fn set_submission_status(&self, job_id: &str, status: SubmissionStatus) -> Result<()> {
        let conn = self.conn.lock();
        let changed = conn.execute(
            "UPDATE submissions SET status = ?2, updated_at = ?3 WHERE job_id = ?1",
            params![job_id, status, Utc::now().naive_utc()],
        )?;
        if changed == 0 {
            return Err(KataError::SubmissionNotFound(job_id.to_string()));
        }
        Ok(())
    }

    /// Marks a submission completed and attaches the judge's verdict.
    pub fn finish_submission(&self, job_id: &str, verdict: &Value) -> Result<()> {
        let conn = self.conn.lock();
        let changed = conn.execute(
            "UPDATE submissions SET status = ?2, verdict = ?3, updated_at = ?4
             WHERE job_id = ?1",
            params![
                job_id,
                SubmissionStatus::Completed,
                verdict.to_string(),
                Utc::now().naive_utc(),
            ],
        )?;
        if changed == 0 {
            return Err(KataError::SubmissionNotFound(job_id.to_string()));
        }
        Ok(())
    }

    pub fn get_submission(&self, job_id: &str) -> Result<Submission> {
        let conn = self.conn.lock();
        let row = conn
            .query_row(
                "SELECT job_id, problem_id, user_id, language, status, verdict,
                        created_at, updated_at
                 FROM submissions WHERE job_id = ?1",
                [job_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, SubmissionStatus>(4)?,
                        row.get::<_, Option<String>>(5)?,
                        row.get::<_, NaiveDateTime>(6)?,
                        row.get::<_, NaiveDateTime>(7)?,
                    ))
                },
            )
            .optional()?
            .ok_or_else(|| KataError::SubmissionNotFound(job_id.to_string()))?;

        let verdict = match row.5 {
            Some(raw) => Some(serde_json::from_str(&raw)?),
            None => None,
        };

        Ok(Submission {
            job_id: row.0,
            problem_id: row.1,
            user_id: row.2,
            language: row.3,
            status: row.4,
            verdict,
            created_at: row.6,
            updated_at: row.7,
        })
    }

    /// Upserts one judged attempt into the standings.
    pub fn record_attempt(&self, user_id: &str, solved: bool, when: NaiveDateTime) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO standings (user_id, solved, attempts, last_solved_at)
             VALUES (?1, ?2, 1, ?3)
             ON CONFLICT(user_id) DO UPDATE SET
                 solved = solved + ?2,
                 attempts = attempts + 1,
                 last_solved_at = COALESCE(?3, last_solved_at)",
            params![user_id, i64::from(solved), solved.then_some(when)],
        )?;
        Ok(())
    }

    /// Top standings ordered by solved desc, then fewest attempts, then
    /// user id.
    pub fn top_standings(&self, limit: u32) -> Result<Vec<Standing>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT user_id, solved, attempts, last_solved_at FROM standings
             ORDER BY solved DESC, attempts ASC, user_id ASC LIMIT ?1",
        )?;
        let rows = stmt.query_map([limit], |row| {
            Ok(Standing {
                user_id: row.get(0)?,
                solved: row.get(1)?,
                attempts: row.get(2)?,
                last_solved_at: row.get(3)?,
            })
        })?;

        let mut standings = Vec::new();
        for row in rows {
            standings.push(row?);
        }
        Ok(standings)
    }
}
