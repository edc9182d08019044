//! Leaderboard assembly and caching.

use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::questions::day_start;
use crate::storage::{Standing, Store};

/// Cache key holding the current [`Leaderboard`] payload.
pub const ACTIVE_LEADERBOARD_KEY: &str = "active_leaderboard";

/// The cached leaderboard: top standings stamped with the day they were
/// assembled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leaderboard {
    pub timestamp: NaiveDateTime,
    pub standings: Vec<Standing>,
}

/// Assembles the top standings straight from the store.
pub fn standings(store: &Store, limit: u32) -> Result<Vec<Standing>> {
    store.top_standings(limit)
}

/// Rebuilds the cached leaderboard payload and returns it.
pub fn refresh_cache(store: &Store, limit: u32) -> Result<Leaderboard> {
    let leaderboard = Leaderboard {
        timestamp: day_start(Utc::now().naive_utc()),
        standings: standings(store, limit)?,
    };
    store.set_json(ACTIVE_LEADERBOARD_KEY, &leaderboard)?;
    debug!(
        entries = leaderboard.standings.len(),
        "leaderboard cache refreshed"
    );
    Ok(leaderboard)
}

/// The cached leaderboard when it is from today, otherwise a fresh rebuild.
pub fn current(store: &Store, limit: u32) -> Result<Leaderboard> {
    if let Some(cached) = store.get_json::<Leaderboard>(ACTIVE_LEADERBOARD_KEY)? {
        if cached.timestamp == day_start(Utc::now().naive_utc()) {
            return Ok(cached);
        }
    }
    refresh_cache(store, limit)
}
