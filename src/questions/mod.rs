//! Question data model and the daily rotation.
//!
//! A refresh pulls one list per difficulty from the upstream question API
//! and stamps the pair with the fetch day. The stamped set is the "active
//! set": it lives under a cache key in the store and rotates one position
//! per day until it goes stale and a new fetch replaces it.

pub mod client;

pub use client::UpstreamClient;

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::config::{Config, UpstreamConfig};
use crate::error::{KataError, Result};
use crate::storage::Store;

/// Cache key holding the current [`ActiveQuestions`] set.
pub const ACTIVE_QUESTIONS_KEY: &str = "active_questions";

/// Question difficulty as exposed on the HTTP surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Hard => "hard",
        }
    }

    /// The label the upstream API uses for this difficulty.
    pub fn upstream_name<'a>(&self, config: &'a UpstreamConfig) -> &'a str {
        match self {
            Self::Easy => &config.difficulty_easy,
            Self::Hard => &config.difficulty_hard,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = KataError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "hard" => Ok(Self::Hard),
            other => Err(KataError::Config(format!(
                "invalid difficulty {other} (expected easy|hard)"
            ))),
        }
    }
}

/// Test cases for one question. Each entry of `inputs` is the full argument
/// list for one call; `outputs` holds the expected results in the same order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestCases {
    #[serde(default)]
    pub inputs: Vec<Vec<Value>>,
    #[serde(default)]
    pub outputs: Vec<Value>,
}

impl TestCases {
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }
}

/// One practice question as delivered by the upstream API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub problem_id: String,
    #[serde(default)]
    pub title: Option<String>,
    /// Upstream's own difficulty label, carried as received.
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub starter_code: String,
    #[serde(default)]
    pub test_cases: TestCases,
}

impl Question {
    /// Built-in question served when nothing is cached and the upstream API
    /// is unreachable or unconfigured.
    pub fn fallback() -> Self {
        Self {
            problem_id: "123".to_string(),
            title: Some("Add Ten".to_string()),
            difficulty: None,
            description:
                "Define a function which adds 10 to the inputted integer and returns the result."
                    .to_string(),
            starter_code: "def add_ten(num):\n    pass\n".to_string(),
            test_cases: TestCases {
                inputs: vec![
                    vec![Value::from(-10)],
                    vec![Value::from(10)],
                    vec![Value::from(7)],
                ],
                outputs: vec![Value::from(0), Value::from(20), Value::from(17)],
            },
        }
    }
}

/// 00:00 UTC of the reference instant's day.
pub fn day_start(reference: NaiveDateTime) -> NaiveDateTime {
    reference.date().and_time(NaiveTime::MIN)
}

/// The cached question set served until it goes stale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveQuestions {
    /// Day-start stamp (00:00 UTC) of the fetch day.
    pub timestamp: NaiveDateTime,
    #[serde(default)]
    pub easy: Vec<Question>,
    #[serde(default)]
    pub hard: Vec<Question>,
}

impl ActiveQuestions {
    pub fn new(easy: Vec<Question>, hard: Vec<Question>, now: NaiveDateTime) -> Self {
        Self {
            timestamp: day_start(now),
            easy,
            hard,
        }
    }

    pub fn list(&self, difficulty: Difficulty) -> &[Question] {
        match difficulty {
            Difficulty::Easy => &self.easy,
            Difficulty::Hard => &self.hard,
        }
    }

    /// Whole days between the set's stamp and the reference day. Negative
    /// when the stamp is in the future.
    fn age_days(&self, today: NaiveDateTime) -> i64 {
        (day_start(today).date() - self.timestamp.date()).num_days()
    }

    /// Today's question for the difficulty. The set rotates one position per
    /// day so a multi-day-old set still serves fresh material.
    pub fn rotate(&self, difficulty: Difficulty, today: NaiveDateTime) -> Option<&Question> {
        let list = self.list(difficulty);
        if list.is_empty() {
            return None;
        }
        let idx = self.age_days(today).rem_euclid(list.len() as i64) as usize;
        list.get(idx)
    }

    /// True when the set should be refetched. A future stamp counts as
    /// stale.
    pub fn is_stale(&self, today: NaiveDateTime, max_age_days: u32) -> bool {
        let age = self.age_days(today);
        age < 0 || age >= i64::from(max_age_days)
    }
}

/// Fetches both difficulty lists from upstream and replaces the cached
/// active set.
pub async fn refresh_active(store: &Store, config: &Config) -> Result<ActiveQuestions> {
    let client = UpstreamClient::new(&config.upstream)?;
    let set = client.fetch_active(&config.upstream).await?;
    store.set_json(ACTIVE_QUESTIONS_KEY, &set)?;
    Ok(set)
}

/// Resolves today's question for a difficulty, refreshing the active set
/// from upstream when needed.
///
/// Resolution order: a fresh cached set wins; a stale or missing set
/// triggers an upstream fetch; when the fetch cannot run or fails, the
/// newest cached set still serves; with nothing cached at all, a built-in
/// question keeps the endpoint alive.
pub async fn daily_question(
    store: &Store,
    config: &Config,
    difficulty: Difficulty,
) -> Result<Question> {
    let now = Utc::now().naive_utc();
    let cached: Option<ActiveQuestions> = store.get_json(ACTIVE_QUESTIONS_KEY)?;

    if let Some(set) = cached.as_ref() {
        if !set.is_stale(now, config.cache.max_age_days) {
            if let Some(question) = set.rotate(difficulty, now) {
                return Ok(question.clone());
            }
        }
    }

    match refresh_active(store, config).await {
        Ok(set) => {
            if let Some(question) = set.rotate(difficulty, now) {
                return Ok(question.clone());
            }
        }
        Err(err) => {
            warn!(error = %err, "active set refresh failed; serving cached data");
        }
    }

    if let Some(set) = cached {
        if let Some(question) = set.rotate(difficulty, now) {
            return Ok(question.clone());
        }
    }

    Ok(Question::fallback())
}

/// Finds a question by id in the active set, checking both lists. The
/// built-in fallback question is also addressable.
pub fn find_question(store: &Store, problem_id: &str) -> Result<Option<Question>> {
    let cached: Option<ActiveQuestions> = store.get_json(ACTIVE_QUESTIONS_KEY)?;
    if let Some(set) = cached {
        if let Some(question) = set
            .easy
            .iter()
            .chain(set.hard.iter())
            .find(|q| q.problem_id == problem_id)
        {
            return Ok(Some(question.clone()));
        }
    }

    let fallback = Question::fallback();
    if fallback.problem_id == problem_id {
        return Ok(Some(fallback));
    }
    Ok(None)
}
